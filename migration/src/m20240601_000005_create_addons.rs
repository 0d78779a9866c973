use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Addon::Table)
                    .if_not_exists()
                    .col(pk_auto(Addon::Id))
                    .col(string_len(Addon::Code, 20).not_null().unique_key())
                    .col(string_len(Addon::Name, 200).not_null())
                    .col(decimal_len(Addon::Price, 10, 2).not_null())
                    .col(boolean(Addon::Active).not_null().default(true))
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Addon::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Addon {
    Table,
    Id,
    Code,
    Name,
    Price,
    Active,
}
