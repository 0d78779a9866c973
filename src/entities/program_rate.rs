use std::fmt;

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum ParticipantType {
    #[sea_orm(string_value = "rider")]
    Rider,
    #[sea_orm(string_value = "passenger")]
    Passenger,
}

impl ParticipantType {
    pub const ALL: [ParticipantType; 2] = [ParticipantType::Rider, ParticipantType::Passenger];

    pub fn as_str(&self) -> &'static str {
        match self {
            ParticipantType::Rider => "rider",
            ParticipantType::Passenger => "passenger",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ParticipantType::Rider => "Rider",
            ParticipantType::Passenger => "Passenger",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.as_str() == value)
    }
}

impl fmt::Display for ParticipantType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum AgeGroup {
    #[sea_orm(string_value = "adult")]
    Adult,
    #[sea_orm(string_value = "child")]
    Child,
}

impl AgeGroup {
    pub const ALL: [AgeGroup; 2] = [AgeGroup::Adult, AgeGroup::Child];

    pub fn as_str(&self) -> &'static str {
        match self {
            AgeGroup::Adult => "adult",
            AgeGroup::Child => "child",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AgeGroup::Adult => "Adult",
            AgeGroup::Child => "Child",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|a| a.as_str() == value)
    }
}

impl fmt::Display for AgeGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Price of one (participant, age group) cell of a program's rate table.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "program_rate")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub program_id: i32,
    pub participant_type: ParticipantType,
    pub age_group: AgeGroup,
    #[sea_orm(column_type = "Decimal(Some((10, 2)))")]
    pub price: Decimal,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::program::Entity",
        from = "Column::ProgramId",
        to = "super::program::Column::Id",
        on_delete = "Cascade"
    )]
    Program,
}

impl Related<super::program::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Program.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
