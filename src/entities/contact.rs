use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Inbound enquiry from the public contact form.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "contact")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub topic: String,
    pub email: String,
    #[sea_orm(column_type = "Text")]
    pub detail: String,
    pub complete: bool,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_one = "super::contact_action::Entity")]
    Action,
}

impl Related<super::contact_action::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Action.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
