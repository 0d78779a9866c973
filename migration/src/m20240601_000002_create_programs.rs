use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Program::Table)
                    .if_not_exists()
                    .col(pk_auto(Program::Id))
                    .col(string_len(Program::Code, 20).not_null().unique_key())
                    .col(string_len(Program::Name, 200).not_null())
                    .col(integer(Program::DurationMinutes).not_null().default(60))
                    .col(text(Program::Description).not_null().default(""))
                    .col(boolean(Program::Active).not_null().default(true))
                    .col(
                        timestamp_with_time_zone(Program::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Program::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Program {
    Table,
    Id,
    Code,
    Name,
    DurationMinutes,
    Description,
    Active,
    CreatedAt,
}
