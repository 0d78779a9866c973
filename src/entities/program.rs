use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "program")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub code: String,
    pub name: String,
    pub duration_minutes: i32,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    #[sea_orm(column_type = "Text")]
    pub itinerary: String,
    #[sea_orm(column_type = "Text")]
    pub schedule_details: String,
    #[sea_orm(column_type = "Text")]
    pub tour_includes: String,
    #[sea_orm(column_type = "Text")]
    pub tour_excludes: String,
    #[sea_orm(column_type = "Text")]
    pub tour_notes: String,
    #[sea_orm(column_type = "Text")]
    pub pricing_notes: String,
    pub active: bool,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::program_rate::Entity")]
    Rates,
    #[sea_orm(has_many = "super::program_image::Entity")]
    Images,
    #[sea_orm(has_many = "super::booking_item::Entity")]
    BookingItems,
}

impl Related<super::program_rate::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Rates.def()
    }
}

impl Related<super::program_image::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Images.def()
    }
}

impl Related<super::booking_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BookingItems.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
