//! Shared helpers for the in-crate tests.
//!
//! Every test gets its own in-memory SQLite database with the schema derived
//! from the entity definitions, plus the unique indexes the migrations add.

use std::str::FromStr;

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    sea_query::Index, ActiveModelTrait, ConnectOptions, ConnectionTrait, Database,
    DatabaseConnection, EntityTrait, Schema, Set,
};

use crate::config::Config;
use crate::entities::program_rate::{AgeGroup, ParticipantType};
use crate::entities::{
    addon, booking, booking_addon, booking_item, contact, contact_action, program, program_image,
    program_rate, user,
};
use crate::services::rates;
use crate::AppState;

pub fn dec(value: &str) -> Decimal {
    Decimal::from_str(value).expect("valid decimal literal")
}

async fn create_table<E: EntityTrait>(db: &DatabaseConnection, entity: E) {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);
    db.execute(builder.build(&schema.create_table_from_entity(entity)))
        .await
        .expect("Failed to create table");
}

/// Fresh in-memory database with every table created.
pub async fn setup_test_db() -> DatabaseConnection {
    // A single pooled connection keeps the in-memory database alive and shared
    let mut options = ConnectOptions::new("sqlite::memory:");
    options.max_connections(1).min_connections(1).sqlx_logging(false);

    let db = Database::connect(options)
        .await
        .expect("Failed to open in-memory database");

    create_table(&db, user::Entity).await;
    create_table(&db, program::Entity).await;
    create_table(&db, program_rate::Entity).await;
    let rate_combination = Index::create()
        .name("uq_program_rate_combination")
        .table(program_rate::Entity)
        .col(program_rate::Column::ProgramId)
        .col(program_rate::Column::ParticipantType)
        .col(program_rate::Column::AgeGroup)
        .unique()
        .to_owned();
    db.execute(db.get_database_backend().build(&rate_combination))
        .await
        .expect("Failed to create rate index");
    create_table(&db, program_image::Entity).await;
    create_table(&db, addon::Entity).await;
    create_table(&db, booking::Entity).await;
    create_table(&db, booking_item::Entity).await;
    create_table(&db, booking_addon::Entity).await;
    create_table(&db, contact::Entity).await;
    create_table(&db, contact_action::Entity).await;

    db
}

pub fn test_config() -> Config {
    Config {
        database_url: "sqlite::memory:".to_string(),
        jwt_secret: "test-secret".to_string(),
        jwt_expiration_hours: 1,
        server_host: "127.0.0.1".to_string(),
        server_port: 0,
        admin_email: "admin@test.local".to_string(),
        admin_password: "admin-password".to_string(),
        bookings_page_size: 10,
    }
}

pub async fn setup_test_state() -> AppState {
    AppState {
        db: setup_test_db().await,
        config: test_config(),
    }
}

/// Active program with no rates and default copy.
pub async fn create_test_program(db: &DatabaseConnection, code: &str) -> program::Model {
    program::ActiveModel {
        code: Set(code.to_string()),
        name: Set(format!("{} adventure", code)),
        duration_minutes: Set(120),
        description: Set(String::new()),
        itinerary: Set(String::new()),
        schedule_details: Set(String::new()),
        tour_includes: Set(String::new()),
        tour_excludes: Set(String::new()),
        tour_notes: Set(String::new()),
        pricing_notes: Set(String::new()),
        active: Set(true),
        created_at: Set(Utc::now().into()),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to insert program")
}

/// Program with the given rider/passenger adult/child prices.
pub async fn create_priced_program(
    db: &DatabaseConnection,
    code: &str,
    prices: &[(ParticipantType, AgeGroup, &str)],
) -> program::Model {
    let program = create_test_program(db, code).await;
    for (participant_type, age_group, price) in prices {
        rates::set_rate(db, program.id, *participant_type, *age_group, dec(price))
            .await
            .expect("Failed to set rate");
    }
    program
}

pub async fn create_test_addon(db: &DatabaseConnection, code: &str, name: &str, price: &str) -> addon::Model {
    addon::ActiveModel {
        code: Set(code.to_string()),
        name: Set(name.to_string()),
        price: Set(dec(price)),
        active: Set(true),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to insert addon")
}
