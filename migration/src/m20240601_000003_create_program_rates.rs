use sea_orm_migration::{prelude::*, schema::*};

use super::m20240601_000002_create_programs::Program;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ProgramRate::Table)
                    .if_not_exists()
                    .col(pk_auto(ProgramRate::Id))
                    .col(integer(ProgramRate::ProgramId).not_null())
                    // rider | passenger
                    .col(string_len(ProgramRate::ParticipantType, 16).not_null())
                    // adult | child
                    .col(string_len(ProgramRate::AgeGroup, 16).not_null())
                    .col(decimal_len(ProgramRate::Price, 10, 2).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_program_rate_program")
                            .from(ProgramRate::Table, ProgramRate::ProgramId)
                            .to(Program::Table, Program::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // One price per (participant, age group) within a program
        manager
            .create_index(
                Index::create()
                    .name("uq_program_rate_combination")
                    .table(ProgramRate::Table)
                    .col(ProgramRate::ProgramId)
                    .col(ProgramRate::ParticipantType)
                    .col(ProgramRate::AgeGroup)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ProgramRate::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum ProgramRate {
    Table,
    Id,
    ProgramId,
    ParticipantType,
    AgeGroup,
    Price,
}
