//! Rate catalog: the single source of truth for per-participant pricing.
//!
//! Lookups always hit the database so that catalog edits apply to the very
//! next booking.

use std::collections::HashMap;

use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, Set,
};
use serde::Serialize;

use crate::entities::program;
use crate::entities::program_rate::{self, AgeGroup, ParticipantType};
use crate::error::{AppError, AppResult};

/// Price of one (program, participant, age group) combination.
///
/// A missing row is a configuration error. It is never treated as a free line.
pub async fn get_rate<C: ConnectionTrait>(
    conn: &C,
    program_id: i32,
    participant_type: ParticipantType,
    age_group: AgeGroup,
) -> AppResult<Decimal> {
    let rate = program_rate::Entity::find()
        .filter(program_rate::Column::ProgramId.eq(program_id))
        .filter(program_rate::Column::ParticipantType.eq(participant_type))
        .filter(program_rate::Column::AgeGroup.eq(age_group))
        .one(conn)
        .await?;

    match rate {
        Some(rate) => Ok(rate.price),
        None => {
            tracing::error!(
                program_id,
                participant = %participant_type,
                age_group = %age_group,
                "No rate configured for booked combination"
            );
            Err(AppError::RateNotFound {
                program_id,
                participant_type,
                age_group,
            })
        }
    }
}

/// All configured prices of one program, keyed by combination.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RateTable {
    prices: HashMap<(ParticipantType, AgeGroup), Decimal>,
}

impl RateTable {
    pub fn from_rates<'a>(rates: impl IntoIterator<Item = &'a program_rate::Model>) -> Self {
        Self {
            prices: rates
                .into_iter()
                .map(|r| ((r.participant_type, r.age_group), r.price))
                .collect(),
        }
    }

    pub fn get(&self, participant_type: ParticipantType, age_group: AgeGroup) -> Option<Decimal> {
        self.prices.get(&(participant_type, age_group)).copied()
    }

    /// Cheapest configured price, used as the "from" price on program cards
    pub fn starting_price(&self) -> Option<Decimal> {
        self.prices.values().min().copied()
    }

    pub fn cells(&self) -> Vec<RateCell> {
        let mut cells = Vec::with_capacity(4);
        for participant_type in ParticipantType::ALL {
            for age_group in AgeGroup::ALL {
                cells.push(RateCell {
                    participant_type,
                    age_group,
                    price: self.get(participant_type, age_group),
                });
            }
        }
        cells
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RateCell {
    pub participant_type: ParticipantType,
    pub age_group: AgeGroup,
    pub price: Option<Decimal>,
}

pub async fn rate_table<C: ConnectionTrait>(conn: &C, program_id: i32) -> AppResult<RateTable> {
    let rates = program_rate::Entity::find()
        .filter(program_rate::Column::ProgramId.eq(program_id))
        .all(conn)
        .await?;

    Ok(RateTable::from_rates(&rates))
}

/// Rate tables for several programs in one query
pub async fn rate_tables<C: ConnectionTrait>(
    conn: &C,
    program_ids: &[i32],
) -> AppResult<HashMap<i32, RateTable>> {
    let rates = program_rate::Entity::find()
        .filter(program_rate::Column::ProgramId.is_in(program_ids.iter().copied()))
        .all(conn)
        .await?;

    let mut grouped: HashMap<i32, Vec<program_rate::Model>> = HashMap::new();
    for rate in rates {
        grouped.entry(rate.program_id).or_default().push(rate);
    }

    Ok(grouped
        .into_iter()
        .map(|(program_id, rates)| (program_id, RateTable::from_rates(&rates)))
        .collect())
}

/// Create or replace the price of one combination.
pub async fn set_rate<C: ConnectionTrait>(
    conn: &C,
    program_id: i32,
    participant_type: ParticipantType,
    age_group: AgeGroup,
    price: Decimal,
) -> AppResult<program_rate::Model> {
    if price.is_sign_negative() {
        return Err(AppError::BadRequest("Price must be non-negative".to_string()));
    }

    program::Entity::find_by_id(program_id)
        .one(conn)
        .await?
        .ok_or_else(|| AppError::NotFound("Program not found".to_string()))?;

    let existing = program_rate::Entity::find()
        .filter(program_rate::Column::ProgramId.eq(program_id))
        .filter(program_rate::Column::ParticipantType.eq(participant_type))
        .filter(program_rate::Column::AgeGroup.eq(age_group))
        .one(conn)
        .await?;

    let rate = match existing {
        Some(rate) => {
            let mut active: program_rate::ActiveModel = rate.into();
            active.price = Set(price);
            active.update(conn).await?
        }
        None => {
            program_rate::ActiveModel {
                program_id: Set(program_id),
                participant_type: Set(participant_type),
                age_group: Set(age_group),
                price: Set(price),
                ..Default::default()
            }
            .insert(conn)
            .await?
        }
    };

    tracing::info!(
        program_id,
        participant = %participant_type,
        age_group = %age_group,
        price = %rate.price,
        "Rate updated"
    );

    Ok(rate)
}

pub async fn remove_rate<C: ConnectionTrait>(
    conn: &C,
    program_id: i32,
    participant_type: ParticipantType,
    age_group: AgeGroup,
) -> AppResult<()> {
    let result = program_rate::Entity::delete_many()
        .filter(program_rate::Column::ProgramId.eq(program_id))
        .filter(program_rate::Column::ParticipantType.eq(participant_type))
        .filter(program_rate::Column::AgeGroup.eq(age_group))
        .exec(conn)
        .await?;

    if result.rows_affected == 0 {
        return Err(AppError::NotFound("Rate not found".to_string()));
    }

    Ok(())
}
