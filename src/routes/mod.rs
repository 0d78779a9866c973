use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};

use crate::handlers::{admin, auth, booking, catalog, contact};
use crate::middleware::auth::{auth_middleware, require_staff};
use crate::middleware::rate_limit::create_public_governor;
use crate::AppState;

pub fn create_router(state: AppState) -> Router {
    let public_governor = create_public_governor();

    let auth_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .layer(public_governor.clone());

    // Storefront: catalog, booking form and contact form
    let public_routes = Router::new()
        .route("/programs", get(catalog::list_programs))
        .route("/programs/{id}", get(catalog::get_program))
        .route("/booking/form", get(catalog::booking_form))
        .route("/bookings", post(booking::submit_booking))
        .route("/bookings/{id}", get(booking::get_booking))
        .route("/contact", post(contact::submit_contact))
        .layer(public_governor);

    // Management (requires auth + staff or admin role)
    let admin_routes = Router::new()
        // Bookings
        .route("/bookings", get(admin::list_bookings))
        .route("/bookings", post(admin::create_booking))
        .route("/bookings/{id}", delete(admin::delete_booking))
        .route("/bookings/{id}/items", post(admin::add_booking_item))
        .route("/bookings/{id}/addons", post(admin::add_booking_addon))
        .route("/booking-items/{id}", delete(admin::delete_booking_item))
        .route("/booking-addons/{id}", delete(admin::delete_booking_addon))
        // Catalog
        .route("/programs", post(admin::create_program))
        .route("/programs/{id}", put(admin::update_program))
        .route("/programs/{id}", delete(admin::delete_program))
        .route("/programs/{id}/rates", put(admin::set_rate))
        .route(
            "/programs/{id}/rates/{participant}/{age_group}",
            delete(admin::remove_rate),
        )
        .route("/programs/{id}/images", post(admin::add_program_image))
        .route("/addons", get(admin::list_addons))
        .route("/addons", post(admin::create_addon))
        .route("/addons/{id}", delete(admin::delete_addon))
        // Contacts
        .route("/contacts", get(admin::list_contacts))
        .route("/contacts/{id}", delete(admin::delete_contact))
        .route("/contacts/{id}/action", put(admin::save_contact_action))
        .route("/contacts/{id}/complete", post(admin::complete_contact))
        // Users
        .route("/users", get(admin::list_users))
        .route("/users", post(admin::create_user))
        .route("/users/{id}", put(admin::update_user))
        .route("/users/{id}", delete(admin::delete_user))
        .route("/users/{id}/role", put(admin::update_user_role))
        .layer(middleware::from_fn(require_staff))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .nest("/api/auth", auth_routes)
        .nest("/api", public_routes)
        .nest("/api/admin", admin_routes)
        .with_state(state)
}
