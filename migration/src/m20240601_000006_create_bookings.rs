use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Booking::Table)
                    .if_not_exists()
                    .col(uuid(Booking::Id).primary_key())
                    .col(string_len(Booking::FullName, 200).not_null())
                    .col(string_len(Booking::Email, 255).not_null())
                    .col(string_len(Booking::Phone, 50).not_null())
                    .col(date(Booking::RideDate).not_null())
                    // morning | noon | afternoon
                    .col(string_len_null(Booking::RideTime, 16))
                    .col(string_len(Booking::PickupPlace, 255).not_null().default(""))
                    .col(text(Booking::Notes).not_null().default(""))
                    .col(decimal_len(Booking::TotalAmount, 10, 2).not_null().default(0))
                    .col(
                        timestamp_with_time_zone(Booking::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_booking_ride_date")
                    .table(Booking::Table)
                    .col(Booking::RideDate)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Booking::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Booking {
    Table,
    Id,
    FullName,
    Email,
    Phone,
    RideDate,
    RideTime,
    PickupPlace,
    Notes,
    TotalAmount,
    CreatedAt,
}
