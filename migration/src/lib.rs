pub use sea_orm_migration::prelude::*;

mod m20240601_000001_create_users;
mod m20240601_000002_create_programs;
mod m20240601_000003_create_program_rates;
mod m20240601_000004_create_program_images;
mod m20240601_000005_create_addons;
mod m20240601_000006_create_bookings;
mod m20240601_000007_create_booking_lines;
mod m20240601_000008_create_contacts;
mod m20240715_000001_add_program_details;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240601_000001_create_users::Migration),
            Box::new(m20240601_000002_create_programs::Migration),
            Box::new(m20240601_000003_create_program_rates::Migration),
            Box::new(m20240601_000004_create_program_images::Migration),
            Box::new(m20240601_000005_create_addons::Migration),
            Box::new(m20240601_000006_create_bookings::Migration),
            Box::new(m20240601_000007_create_booking_lines::Migration),
            Box::new(m20240601_000008_create_contacts::Migration),
            Box::new(m20240715_000001_add_program_details::Migration),
        ]
    }
}
