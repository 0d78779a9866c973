use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum RideSlot {
    #[sea_orm(string_value = "morning")]
    Morning,
    #[sea_orm(string_value = "noon")]
    Noon,
    #[sea_orm(string_value = "afternoon")]
    Afternoon,
}

impl RideSlot {
    pub const ALL: [RideSlot; 3] = [RideSlot::Morning, RideSlot::Noon, RideSlot::Afternoon];

    pub fn as_str(&self) -> &'static str {
        match self {
            RideSlot::Morning => "morning",
            RideSlot::Noon => "noon",
            RideSlot::Afternoon => "afternoon",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RideSlot::Morning => "09:00 - 11:00",
            RideSlot::Noon => "12:00 - 14:00",
            RideSlot::Afternoon => "15:00 - 17:00",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.as_str() == value)
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "booking")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub ride_date: Date,
    pub ride_time: Option<RideSlot>,
    pub pickup_place: String,
    #[sea_orm(column_type = "Text")]
    pub notes: String,
    /// Sum of every item and add-on line total. Only written by the
    /// booking service's recompute step.
    #[sea_orm(column_type = "Decimal(Some((10, 2)))")]
    pub total_amount: Decimal,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::booking_item::Entity")]
    Items,
    #[sea_orm(has_many = "super::booking_addon::Entity")]
    Addons,
}

impl Related<super::booking_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Items.def()
    }
}

impl Related<super::booking_addon::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Addons.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
