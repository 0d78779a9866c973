use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{EntityTrait, QueryOrder};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::program_rate::{AgeGroup, ParticipantType};
use crate::entities::user::{self, UserRole};
use crate::entities::{
    addon, booking, booking_addon, booking_item, contact_action, program, program_image, program_rate,
};
use crate::error::{AppError, AppResult};
use crate::handlers::booking::{submission_response, SubmitBookingRequest};
use crate::services::catalog::{self, NewAddon, NewImage, NewProgram, ProgramChanges, ProgramCreation};
use crate::services::contacts::{self, ContactEntry};
use crate::services::reports::{self, BookingFilter, BookingPage};
use crate::services::submission::{self, AddonIntent, ItemIntent, ProgramSelection};
use crate::services::users::{self, AccountChanges, Actor, NewAccount};
use crate::services::{bookings, rates};
use crate::utils::jwt::Claims;
use crate::AppState;

// ============ Bookings ============

#[derive(Debug, Deserialize)]
pub struct BookingListQuery {
    pub program: Option<String>,
    pub ride_date: Option<String>,
    pub page: Option<String>,
}

/// Filtered, paginated bookings with revenue statistics
pub async fn list_bookings(
    State(state): State<AppState>,
    Query(query): Query<BookingListQuery>,
) -> AppResult<Json<BookingPage>> {
    let filter = BookingFilter::from_raw(query.program.as_deref(), query.ride_date.as_deref());
    let page = reports::list_bookings(
        &state.db,
        filter,
        query.page.as_deref(),
        state.config.bookings_page_size,
    )
    .await?;

    Ok(Json(page))
}

/// Create a booking on behalf of a customer. Only the listed programs are read.
pub async fn create_booking(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<SubmitBookingRequest>,
) -> AppResult<Response> {
    let selection = ProgramSelection::Selected(payload.active_programs.unwrap_or_default());
    let submission = submission::submit_booking(&state.db, &payload.fields, &selection).await?;

    tracing::debug!(staff_id = %claims.sub, "Staff booking submitted");
    Ok(submission_response(submission))
}

pub async fn delete_booking(
    State(state): State<AppState>,
    Path(booking_id): Path<Uuid>,
) -> AppResult<Json<serde_json::Value>> {
    bookings::delete_booking(&state.db, booking_id).await?;
    Ok(Json(serde_json::json!({ "message": "Booking deleted" })))
}

/// Client-supplied prices are not part of the request; lines are always
/// priced from the catalog.
#[derive(Debug, Deserialize)]
pub struct AddItemRequest {
    pub program_id: i32,
    pub participant_type: ParticipantType,
    pub age_group: AgeGroup,
    pub quantity: i32,
}

#[derive(Debug, Deserialize)]
pub struct AddAddonRequest {
    pub addon_id: i32,
    pub quantity: i32,
}

#[derive(Debug, Serialize)]
pub struct ItemChange {
    pub item: booking_item::Model,
    pub booking: booking::Model,
}

#[derive(Debug, Serialize)]
pub struct AddonChange {
    pub addon: booking_addon::Model,
    pub booking: booking::Model,
}

pub async fn add_booking_item(
    State(state): State<AppState>,
    Path(booking_id): Path<Uuid>,
    Json(payload): Json<AddItemRequest>,
) -> AppResult<(StatusCode, Json<ItemChange>)> {
    let intent = ItemIntent {
        program_id: payload.program_id,
        participant_type: payload.participant_type,
        age_group: payload.age_group,
        quantity: payload.quantity,
    };
    let (item, booking) = bookings::create_booking_item(&state.db, booking_id, &intent).await?;

    Ok((StatusCode::CREATED, Json(ItemChange { item, booking })))
}

pub async fn delete_booking_item(
    State(state): State<AppState>,
    Path(item_id): Path<Uuid>,
) -> AppResult<Json<booking::Model>> {
    Ok(Json(bookings::delete_booking_item(&state.db, item_id).await?))
}

pub async fn add_booking_addon(
    State(state): State<AppState>,
    Path(booking_id): Path<Uuid>,
    Json(payload): Json<AddAddonRequest>,
) -> AppResult<(StatusCode, Json<AddonChange>)> {
    let intent = AddonIntent {
        addon_id: payload.addon_id,
        quantity: payload.quantity,
    };
    let (addon, booking) = bookings::create_booking_addon(&state.db, booking_id, &intent).await?;

    Ok((StatusCode::CREATED, Json(AddonChange { addon, booking })))
}

pub async fn delete_booking_addon(
    State(state): State<AppState>,
    Path(line_id): Path<Uuid>,
) -> AppResult<Json<booking::Model>> {
    Ok(Json(bookings::delete_booking_addon(&state.db, line_id).await?))
}

// ============ Catalog ============

/// Create a program; validation problems come back together as 422
pub async fn create_program(
    State(state): State<AppState>,
    Json(payload): Json<NewProgram>,
) -> AppResult<Response> {
    let response = match catalog::create_program(&state.db, &payload).await? {
        ProgramCreation::Created(program) => (StatusCode::CREATED, Json(program)).into_response(),
        ProgramCreation::Rejected(errors) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(serde_json::json!({ "errors": errors })),
        )
            .into_response(),
    };

    Ok(response)
}

pub async fn update_program(
    State(state): State<AppState>,
    Path(program_id): Path<i32>,
    Json(payload): Json<ProgramChanges>,
) -> AppResult<Json<program::Model>> {
    Ok(Json(catalog::update_program(&state.db, program_id, &payload).await?))
}

pub async fn delete_program(
    State(state): State<AppState>,
    Path(program_id): Path<i32>,
) -> AppResult<Json<serde_json::Value>> {
    catalog::delete_program(&state.db, program_id).await?;
    Ok(Json(serde_json::json!({ "message": "Program deleted" })))
}

#[derive(Debug, Deserialize)]
pub struct SetRateRequest {
    pub participant_type: ParticipantType,
    pub age_group: AgeGroup,
    pub price: Decimal,
}

pub async fn set_rate(
    State(state): State<AppState>,
    Path(program_id): Path<i32>,
    Json(payload): Json<SetRateRequest>,
) -> AppResult<Json<program_rate::Model>> {
    let rate = rates::set_rate(
        &state.db,
        program_id,
        payload.participant_type,
        payload.age_group,
        payload.price,
    )
    .await?;

    Ok(Json(rate))
}

pub async fn remove_rate(
    State(state): State<AppState>,
    Path((program_id, participant, age_group)): Path<(i32, String, String)>,
) -> AppResult<Json<serde_json::Value>> {
    let participant_type = ParticipantType::parse(&participant)
        .ok_or_else(|| AppError::BadRequest(format!("Unknown participant type: {}", participant)))?;
    let age_group = AgeGroup::parse(&age_group)
        .ok_or_else(|| AppError::BadRequest(format!("Unknown age group: {}", age_group)))?;

    rates::remove_rate(&state.db, program_id, participant_type, age_group).await?;
    Ok(Json(serde_json::json!({ "message": "Rate removed" })))
}

pub async fn add_program_image(
    State(state): State<AppState>,
    Path(program_id): Path<i32>,
    Json(payload): Json<NewImage>,
) -> AppResult<(StatusCode, Json<program_image::Model>)> {
    let image = catalog::add_image(&state.db, program_id, &payload).await?;
    Ok((StatusCode::CREATED, Json(image)))
}

pub async fn list_addons(State(state): State<AppState>) -> AppResult<Json<Vec<addon::Model>>> {
    Ok(Json(catalog::list_addons(&state.db).await?))
}

pub async fn create_addon(
    State(state): State<AppState>,
    Json(payload): Json<NewAddon>,
) -> AppResult<(StatusCode, Json<addon::Model>)> {
    let created = catalog::create_addon(&state.db, &payload).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn delete_addon(
    State(state): State<AppState>,
    Path(addon_id): Path<i32>,
) -> AppResult<Json<serde_json::Value>> {
    catalog::delete_addon(&state.db, addon_id).await?;
    Ok(Json(serde_json::json!({ "message": "Add-on deleted" })))
}

// ============ Contacts ============

pub async fn list_contacts(State(state): State<AppState>) -> AppResult<Json<Vec<ContactEntry>>> {
    Ok(Json(contacts::list_contacts(&state.db).await?))
}

#[derive(Debug, Deserialize)]
pub struct ContactActionRequest {
    #[serde(default)]
    pub detail: String,
}

pub async fn save_contact_action(
    State(state): State<AppState>,
    Path(contact_id): Path<i32>,
    Json(payload): Json<ContactActionRequest>,
) -> AppResult<Json<contact_action::Model>> {
    Ok(Json(contacts::save_action(&state.db, contact_id, &payload.detail).await?))
}

pub async fn complete_contact(
    State(state): State<AppState>,
    Path(contact_id): Path<i32>,
) -> AppResult<Json<serde_json::Value>> {
    contacts::mark_complete(&state.db, contact_id).await?;
    Ok(Json(serde_json::json!({ "message": "Contact marked complete" })))
}

pub async fn delete_contact(
    State(state): State<AppState>,
    Path(contact_id): Path<i32>,
) -> AppResult<Json<serde_json::Value>> {
    contacts::delete_contact(&state.db, contact_id).await?;
    Ok(Json(serde_json::json!({ "message": "Contact deleted" })))
}

// ============ Users ============

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
}

impl From<user::Model> for UserResponse {
    fn from(u: user::Model) -> Self {
        Self {
            id: u.id,
            email: u.email,
            name: u.name,
            role: u.role,
            created_at: u.created_at.with_timezone(&Utc),
        }
    }
}

pub async fn list_users(State(state): State<AppState>) -> AppResult<Json<Vec<UserResponse>>> {
    let users = user::Entity::find()
        .order_by_asc(user::Column::CreatedAt)
        .all(&state.db)
        .await?;

    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

fn actor(claims: &Claims) -> Actor {
    Actor {
        id: claims.sub,
        role: claims.role.clone(),
    }
}

pub async fn create_user(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<NewAccount>,
) -> AppResult<(StatusCode, Json<UserResponse>)> {
    let created = users::create_account(&state.db, &actor(&claims), &payload).await?;
    Ok((StatusCode::CREATED, Json(created.into())))
}

pub async fn update_user(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(user_id): Path<Uuid>,
    Json(payload): Json<AccountChanges>,
) -> AppResult<Json<UserResponse>> {
    let updated = users::update_account(&state.db, &actor(&claims), user_id, &payload).await?;
    Ok(Json(updated.into()))
}

#[derive(Debug, Deserialize)]
pub struct UpdateRoleRequest {
    pub role: UserRole,
}

pub async fn update_user_role(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(user_id): Path<Uuid>,
    Json(payload): Json<UpdateRoleRequest>,
) -> AppResult<Json<UserResponse>> {
    let updated = users::change_role(&state.db, &actor(&claims), user_id, payload.role).await?;
    Ok(Json(updated.into()))
}

pub async fn delete_user(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(user_id): Path<Uuid>,
) -> AppResult<Json<serde_json::Value>> {
    users::delete_account(&state.db, &actor(&claims), user_id).await?;
    Ok(Json(serde_json::json!({ "message": "User deleted" })))
}
