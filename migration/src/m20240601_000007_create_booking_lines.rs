use sea_orm_migration::{prelude::*, schema::*};

use super::m20240601_000002_create_programs::Program;
use super::m20240601_000005_create_addons::Addon;
use super::m20240601_000006_create_bookings::Booking;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(BookingItem::Table)
                    .if_not_exists()
                    .col(uuid(BookingItem::Id).primary_key())
                    .col(uuid(BookingItem::BookingId).not_null())
                    .col(integer(BookingItem::ProgramId).not_null())
                    .col(string_len(BookingItem::ParticipantType, 16).not_null())
                    .col(string_len(BookingItem::AgeGroup, 16).not_null())
                    .col(integer(BookingItem::Quantity).not_null())
                    .col(decimal_len(BookingItem::UnitPrice, 10, 2).not_null())
                    .col(decimal_len(BookingItem::LineTotal, 10, 2).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_booking_item_booking")
                            .from(BookingItem::Table, BookingItem::BookingId)
                            .to(Booking::Table, Booking::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_booking_item_program")
                            .from(BookingItem::Table, BookingItem::ProgramId)
                            .to(Program::Table, Program::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(BookingAddon::Table)
                    .if_not_exists()
                    .col(uuid(BookingAddon::Id).primary_key())
                    .col(uuid(BookingAddon::BookingId).not_null())
                    .col(integer(BookingAddon::AddonId).not_null())
                    .col(integer(BookingAddon::Quantity).not_null())
                    .col(decimal_len(BookingAddon::UnitPrice, 10, 2).not_null())
                    .col(decimal_len(BookingAddon::LineTotal, 10, 2).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_booking_addon_booking")
                            .from(BookingAddon::Table, BookingAddon::BookingId)
                            .to(Booking::Table, Booking::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_booking_addon_addon")
                            .from(BookingAddon::Table, BookingAddon::AddonId)
                            .to(Addon::Table, Addon::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_booking_item_program")
                    .table(BookingItem::Table)
                    .col(BookingItem::ProgramId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(BookingAddon::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(BookingItem::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum BookingItem {
    Table,
    Id,
    BookingId,
    ProgramId,
    ParticipantType,
    AgeGroup,
    Quantity,
    UnitPrice,
    LineTotal,
}

#[derive(DeriveIden)]
pub enum BookingAddon {
    Table,
    Id,
    BookingId,
    AddonId,
    Quantity,
    UnitPrice,
    LineTotal,
}
