use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Long-form program copy shown on the program detail page
        manager
            .alter_table(
                Table::alter()
                    .table(Program::Table)
                    .add_column(text(Program::Itinerary).not_null().default(""))
                    .add_column(text(Program::ScheduleDetails).not_null().default(""))
                    .add_column(text(Program::TourIncludes).not_null().default(""))
                    .add_column(text(Program::TourExcludes).not_null().default(""))
                    .add_column(text(Program::TourNotes).not_null().default(""))
                    .add_column(text(Program::PricingNotes).not_null().default(""))
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .alter_table(
                Table::alter()
                    .table(Program::Table)
                    .drop_column(Program::Itinerary)
                    .drop_column(Program::ScheduleDetails)
                    .drop_column(Program::TourIncludes)
                    .drop_column(Program::TourExcludes)
                    .drop_column(Program::TourNotes)
                    .drop_column(Program::PricingNotes)
                    .to_owned(),
            )
            .await
    }
}

#[derive(DeriveIden)]
enum Program {
    Table,
    Itinerary,
    ScheduleDetails,
    TourIncludes,
    TourExcludes,
    TourNotes,
    PricingNotes,
}
