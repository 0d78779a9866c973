use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Contact::Table)
                    .if_not_exists()
                    .col(pk_auto(Contact::Id))
                    .col(string_len(Contact::Topic, 200).not_null())
                    .col(string_len(Contact::Email, 255).not_null())
                    .col(text(Contact::Detail).not_null())
                    .col(boolean(Contact::Complete).not_null().default(false))
                    .col(
                        timestamp_with_time_zone(Contact::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ContactAction::Table)
                    .if_not_exists()
                    .col(pk_auto(ContactAction::Id))
                    .col(integer(ContactAction::ContactId).not_null().unique_key())
                    .col(text(ContactAction::Detail).not_null().default(""))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_contact_action_contact")
                            .from(ContactAction::Table, ContactAction::ContactId)
                            .to(Contact::Table, Contact::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ContactAction::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Contact::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Contact {
    Table,
    Id,
    Topic,
    Email,
    Detail,
    Complete,
    CreatedAt,
}

#[derive(DeriveIden)]
pub enum ContactAction {
    Table,
    Id,
    ContactId,
    Detail,
}
