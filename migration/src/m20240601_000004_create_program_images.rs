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
                    .table(ProgramImage::Table)
                    .if_not_exists()
                    .col(pk_auto(ProgramImage::Id))
                    .col(integer(ProgramImage::ProgramId).not_null())
                    .col(string_len(ProgramImage::Url, 500).not_null())
                    .col(string_len(ProgramImage::AltText, 150).not_null().default(""))
                    .col(integer(ProgramImage::DisplayOrder).not_null().default(0))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_program_image_program")
                            .from(ProgramImage::Table, ProgramImage::ProgramId)
                            .to(Program::Table, Program::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ProgramImage::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum ProgramImage {
    Table,
    Id,
    ProgramId,
    Url,
    AltText,
    DisplayOrder,
}
