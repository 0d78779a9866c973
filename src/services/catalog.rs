//! Programs, rates, images and add-ons as the storefront and the staff see
//! them.

use std::collections::HashMap;
use std::str::FromStr;

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};

use crate::entities::booking::RideSlot;
use crate::entities::program_rate::{AgeGroup, ParticipantType};
use crate::entities::{addon, booking_addon, booking_item, program, program_image, program_rate};
use crate::error::{AppError, AppResult};
use crate::services::rates::{self, RateCell, RateTable};
use crate::services::submission::{addon_field, program_field};

pub const DEFAULT_DURATION_MINUTES: i32 = 60;

#[derive(Debug, Serialize)]
pub struct ProgramCard {
    pub id: i32,
    pub code: String,
    pub name: String,
    pub duration_minutes: i32,
    pub rates: Vec<RateCell>,
    pub starting_price: Option<Decimal>,
    pub primary_image: Option<String>,
}

/// Lowest display order wins; ties go to the older image.
fn primary_image(images: &[program_image::Model]) -> Option<String> {
    images
        .iter()
        .min_by_key(|i| (i.display_order, i.id))
        .map(|i| i.url.clone())
}

/// Active programs for the storefront listing.
pub async fn list_program_cards(db: &DatabaseConnection) -> AppResult<Vec<ProgramCard>> {
    let programs = program::Entity::find()
        .filter(program::Column::Active.eq(true))
        .order_by_asc(program::Column::Id)
        .all(db)
        .await?;

    let ids: Vec<i32> = programs.iter().map(|p| p.id).collect();
    let tables = rates::rate_tables(db, &ids).await?;

    let mut images: HashMap<i32, Vec<program_image::Model>> = HashMap::new();
    for image in program_image::Entity::find()
        .filter(program_image::Column::ProgramId.is_in(ids.clone()))
        .all(db)
        .await?
    {
        images.entry(image.program_id).or_default().push(image);
    }

    let cards = programs
        .into_iter()
        .map(|p| {
            let table = tables.get(&p.id).cloned().unwrap_or_default();
            ProgramCard {
                rates: table.cells(),
                starting_price: table.starting_price(),
                primary_image: images.get(&p.id).and_then(|i| primary_image(i)),
                id: p.id,
                code: p.code,
                name: p.name,
                duration_minutes: p.duration_minutes,
            }
        })
        .collect();

    Ok(cards)
}

#[derive(Debug, Serialize)]
pub struct ProgramDetail {
    #[serde(flatten)]
    pub program: program::Model,
    pub rates: Vec<RateCell>,
    pub starting_price: Option<Decimal>,
    pub images: Vec<program_image::Model>,
}

pub async fn program_detail(db: &DatabaseConnection, program_id: i32) -> AppResult<ProgramDetail> {
    let program = program::Entity::find_by_id(program_id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Program not found".to_string()))?;

    let table = rates::rate_table(db, program_id).await?;
    let images = program_image::Entity::find()
        .filter(program_image::Column::ProgramId.eq(program_id))
        .order_by_asc(program_image::Column::DisplayOrder)
        .order_by_asc(program_image::Column::Id)
        .all(db)
        .await?;

    Ok(ProgramDetail {
        program,
        rates: table.cells(),
        starting_price: table.starting_price(),
        images,
    })
}

// ============ Booking form schema ============

#[derive(Debug, Serialize)]
pub struct FormRateRow {
    pub field: String,
    pub participant_type: ParticipantType,
    pub age_group: AgeGroup,
    pub participant_label: &'static str,
    pub age_label: &'static str,
    pub price: Option<Decimal>,
}

#[derive(Debug, Serialize)]
pub struct FormProgram {
    pub id: i32,
    pub code: String,
    pub name: String,
    pub rows: Vec<FormRateRow>,
}

#[derive(Debug, Serialize)]
pub struct FormAddon {
    pub id: i32,
    pub field: String,
    pub name: String,
    pub price: Decimal,
}

#[derive(Debug, Serialize)]
pub struct FormSlot {
    pub value: RideSlot,
    pub label: &'static str,
}

#[derive(Debug, Serialize)]
pub struct BookingForm {
    pub programs: Vec<FormProgram>,
    pub addons: Vec<FormAddon>,
    pub ride_slots: Vec<FormSlot>,
}

fn form_rows(program_id: i32, table: &RateTable) -> Vec<FormRateRow> {
    table
        .cells()
        .into_iter()
        .map(|cell| FormRateRow {
            field: program_field(cell.participant_type, cell.age_group, program_id),
            participant_type: cell.participant_type,
            age_group: cell.age_group,
            participant_label: cell.participant_type.label(),
            age_label: cell.age_group.label(),
            price: cell.price,
        })
        .collect()
}

/// Everything a client needs to render the booking form and name its fields.
pub async fn booking_form(db: &DatabaseConnection) -> AppResult<BookingForm> {
    let programs = program::Entity::find()
        .filter(program::Column::Active.eq(true))
        .order_by_asc(program::Column::Id)
        .all(db)
        .await?;
    let ids: Vec<i32> = programs.iter().map(|p| p.id).collect();
    let tables = rates::rate_tables(db, &ids).await?;

    let addons = addon::Entity::find()
        .filter(addon::Column::Active.eq(true))
        .order_by_asc(addon::Column::Name)
        .all(db)
        .await?;

    Ok(BookingForm {
        programs: programs
            .into_iter()
            .map(|p| FormProgram {
                rows: form_rows(p.id, &tables.get(&p.id).cloned().unwrap_or_default()),
                id: p.id,
                code: p.code,
                name: p.name,
            })
            .collect(),
        addons: addons
            .into_iter()
            .map(|a| FormAddon {
                field: addon_field(a.id),
                id: a.id,
                name: a.name,
                price: a.price,
            })
            .collect(),
        ride_slots: RideSlot::ALL
            .into_iter()
            .map(|slot| FormSlot { value: slot, label: slot.label() })
            .collect(),
    })
}

// ============ Program management ============

/// Raw program form. Prices are keyed by `rate_{participant}_{age_group}`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewProgram {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub name: String,
    pub duration_minutes: Option<String>,
    #[serde(default)]
    pub description: String,
    pub active: Option<bool>,
    #[serde(default)]
    pub rates: HashMap<String, String>,
    #[serde(default)]
    pub image_urls: Vec<String>,
    #[serde(flatten)]
    pub text: ProgramText,
}

/// Long-form copy shown on the program page.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ProgramText {
    #[serde(default)]
    pub itinerary: String,
    #[serde(default)]
    pub schedule_details: String,
    #[serde(default)]
    pub tour_includes: String,
    #[serde(default)]
    pub tour_excludes: String,
    #[serde(default)]
    pub tour_notes: String,
    #[serde(default)]
    pub pricing_notes: String,
}

impl ProgramText {
    fn trimmed(&self) -> Self {
        Self {
            itinerary: self.itinerary.trim().to_string(),
            schedule_details: self.schedule_details.trim().to_string(),
            tour_includes: self.tour_includes.trim().to_string(),
            tour_excludes: self.tour_excludes.trim().to_string(),
            tour_notes: self.tour_notes.trim().to_string(),
            pricing_notes: self.pricing_notes.trim().to_string(),
        }
    }
}

pub fn rate_field(participant_type: ParticipantType, age_group: AgeGroup) -> String {
    format!("rate_{}_{}", participant_type, age_group)
}

#[derive(Debug, Clone, PartialEq)]
struct ValidProgram {
    code: String,
    name: String,
    duration_minutes: i32,
    description: String,
    active: bool,
    rates: Vec<(ParticipantType, AgeGroup, Decimal)>,
    image_urls: Vec<String>,
    text: ProgramText,
}

fn parse_duration(raw: &str) -> Option<i32> {
    raw.trim().parse::<i32>().ok().filter(|minutes| *minutes > 0)
}

const DURATION_ERROR: &str = "Duration must be a positive whole number (minutes).";

/// Check a program form, collecting every problem. `code_taken` reports
/// whether the trimmed code already exists.
fn validate_program(input: &NewProgram, code_taken: bool) -> Result<ValidProgram, Vec<String>> {
    let mut errors = Vec::new();

    let code = input.code.trim().to_string();
    if code.is_empty() {
        errors.push("Program code is required.".to_string());
    } else if code_taken {
        errors.push("Program code must be unique.".to_string());
    }

    let name = input.name.trim().to_string();
    if name.is_empty() {
        errors.push("Program name is required.".to_string());
    }

    let duration_raw = input.duration_minutes.as_deref().unwrap_or("60");
    let duration_minutes = parse_duration(duration_raw).unwrap_or_else(|| {
        errors.push(DURATION_ERROR.to_string());
        DEFAULT_DURATION_MINUTES
    });

    let mut parsed_rates = Vec::new();
    for participant_type in ParticipantType::ALL {
        for age_group in AgeGroup::ALL {
            let raw = input
                .rates
                .get(&rate_field(participant_type, age_group))
                .map(|v| v.trim())
                .unwrap_or("");
            if raw.is_empty() {
                continue;
            }
            match Decimal::from_str(raw) {
                Ok(price) if !price.is_sign_negative() => {
                    parsed_rates.push((participant_type, age_group, price));
                }
                _ => errors.push(format!(
                    "Price for {} - {} must be a non-negative number.",
                    participant_type.label(),
                    age_group.label()
                )),
            }
        }
    }

    if !errors.is_empty() {
        return Err(errors);
    }

    Ok(ValidProgram {
        code,
        name,
        duration_minutes,
        description: input.description.trim().to_string(),
        active: input.active.unwrap_or(true),
        rates: parsed_rates,
        image_urls: input
            .image_urls
            .iter()
            .map(|u| u.trim().to_string())
            .filter(|u| !u.is_empty())
            .collect(),
        text: input.text.trimmed(),
    })
}

pub enum ProgramCreation {
    Created(program::Model),
    Rejected(Vec<String>),
}

/// Validate and store a program with its rates and images.
pub async fn create_program(db: &DatabaseConnection, input: &NewProgram) -> AppResult<ProgramCreation> {
    let code = input.code.trim();
    let code_taken = !code.is_empty()
        && program::Entity::find()
            .filter(program::Column::Code.eq(code))
            .count(db)
            .await?
            > 0;

    let valid = match validate_program(input, code_taken) {
        Ok(valid) => valid,
        Err(errors) => return Ok(ProgramCreation::Rejected(errors)),
    };

    let txn = db.begin().await?;

    let alt_text = if valid.description.is_empty() {
        valid.name.clone()
    } else {
        valid.description.chars().take(140).collect()
    };

    let program = program::ActiveModel {
        code: Set(valid.code),
        name: Set(valid.name),
        duration_minutes: Set(valid.duration_minutes),
        description: Set(valid.description),
        itinerary: Set(valid.text.itinerary),
        schedule_details: Set(valid.text.schedule_details),
        tour_includes: Set(valid.text.tour_includes),
        tour_excludes: Set(valid.text.tour_excludes),
        tour_notes: Set(valid.text.tour_notes),
        pricing_notes: Set(valid.text.pricing_notes),
        active: Set(valid.active),
        created_at: Set(Utc::now().into()),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    for (participant_type, age_group, price) in valid.rates {
        rates::set_rate(&txn, program.id, participant_type, age_group, price).await?;
    }

    for (index, url) in valid.image_urls.into_iter().enumerate() {
        program_image::ActiveModel {
            program_id: Set(program.id),
            url: Set(url),
            alt_text: Set(alt_text.clone()),
            display_order: Set(index as i32),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
    }

    txn.commit().await?;
    tracing::info!(program_id = program.id, code = %program.code, "Program created");

    Ok(ProgramCreation::Created(program))
}

/// Partial edit of a program. Absent fields keep their stored value. The
/// code is fixed once created because booking lines report it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProgramChanges {
    pub name: Option<String>,
    pub duration_minutes: Option<String>,
    pub description: Option<String>,
    pub itinerary: Option<String>,
    pub schedule_details: Option<String>,
    pub tour_includes: Option<String>,
    pub tour_excludes: Option<String>,
    pub tour_notes: Option<String>,
    pub pricing_notes: Option<String>,
    pub active: Option<bool>,
}

fn set_text(column: &mut ActiveValue<String>, value: &Option<String>) {
    if let Some(value) = value {
        *column = Set(value.trim().to_string());
    }
}

pub async fn update_program(
    db: &DatabaseConnection,
    program_id: i32,
    changes: &ProgramChanges,
) -> AppResult<program::Model> {
    let program = program::Entity::find_by_id(program_id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Program not found".to_string()))?;

    let mut active: program::ActiveModel = program.into();

    if let Some(name) = &changes.name {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::BadRequest("Program name is required.".to_string()));
        }
        active.name = Set(name.to_string());
    }
    if let Some(raw) = &changes.duration_minutes {
        let minutes = parse_duration(raw).ok_or_else(|| AppError::BadRequest(DURATION_ERROR.to_string()))?;
        active.duration_minutes = Set(minutes);
    }
    set_text(&mut active.description, &changes.description);
    set_text(&mut active.itinerary, &changes.itinerary);
    set_text(&mut active.schedule_details, &changes.schedule_details);
    set_text(&mut active.tour_includes, &changes.tour_includes);
    set_text(&mut active.tour_excludes, &changes.tour_excludes);
    set_text(&mut active.tour_notes, &changes.tour_notes);
    set_text(&mut active.pricing_notes, &changes.pricing_notes);
    if let Some(flag) = changes.active {
        active.active = Set(flag);
    }

    let updated = active.update(db).await?;
    tracing::info!(program_id = updated.id, active = updated.active, "Program updated");
    Ok(updated)
}

#[derive(Debug, Deserialize)]
pub struct NewImage {
    pub url: String,
    #[serde(default)]
    pub alt_text: String,
    #[serde(default)]
    pub display_order: i32,
}

pub async fn add_image(
    db: &DatabaseConnection,
    program_id: i32,
    input: &NewImage,
) -> AppResult<program_image::Model> {
    let url = input.url.trim();
    if url.is_empty() {
        return Err(AppError::BadRequest("Image URL is required".to_string()));
    }

    let program = program::Entity::find_by_id(program_id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Program not found".to_string()))?;

    let alt_text = match input.alt_text.trim() {
        "" => program.name,
        text => text.to_string(),
    };

    let image = program_image::ActiveModel {
        program_id: Set(program_id),
        url: Set(url.to_string()),
        alt_text: Set(alt_text),
        display_order: Set(input.display_order),
        ..Default::default()
    }
    .insert(db)
    .await?;

    Ok(image)
}

/// Delete a program no booking refers to. Rates and images go with it.
pub async fn delete_program(db: &DatabaseConnection, program_id: i32) -> AppResult<()> {
    let txn = db.begin().await?;

    program::Entity::find_by_id(program_id)
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::NotFound("Program not found".to_string()))?;

    let references = booking_item::Entity::find()
        .filter(booking_item::Column::ProgramId.eq(program_id))
        .count(&txn)
        .await?;
    if references > 0 {
        return Err(AppError::Conflict(
            "Program is referenced by existing bookings".to_string(),
        ));
    }

    program_rate::Entity::delete_many()
        .filter(program_rate::Column::ProgramId.eq(program_id))
        .exec(&txn)
        .await?;
    program_image::Entity::delete_many()
        .filter(program_image::Column::ProgramId.eq(program_id))
        .exec(&txn)
        .await?;
    program::Entity::delete_by_id(program_id).exec(&txn).await?;

    txn.commit().await?;
    tracing::info!(program_id, "Program deleted");
    Ok(())
}

// ============ Add-ons ============

#[derive(Debug, Deserialize)]
pub struct NewAddon {
    pub code: String,
    pub name: String,
    pub price: Decimal,
    pub active: Option<bool>,
}

pub async fn create_addon(db: &DatabaseConnection, input: &NewAddon) -> AppResult<addon::Model> {
    let code = input.code.trim();
    let name = input.name.trim();
    if code.is_empty() || name.is_empty() {
        return Err(AppError::BadRequest("Add-on code and name are required".to_string()));
    }
    if input.price.is_sign_negative() {
        return Err(AppError::BadRequest("Price must be non-negative".to_string()));
    }

    let existing = addon::Entity::find()
        .filter(addon::Column::Code.eq(code))
        .one(db)
        .await?;
    if existing.is_some() {
        return Err(AppError::Conflict("Add-on code must be unique".to_string()));
    }

    let created = addon::ActiveModel {
        code: Set(code.to_string()),
        name: Set(name.to_string()),
        price: Set(input.price),
        active: Set(input.active.unwrap_or(true)),
        ..Default::default()
    }
    .insert(db)
    .await?;

    tracing::info!(addon_id = created.id, code = %created.code, "Add-on created");
    Ok(created)
}

pub async fn list_addons(db: &DatabaseConnection) -> AppResult<Vec<addon::Model>> {
    Ok(addon::Entity::find()
        .order_by_asc(addon::Column::Name)
        .all(db)
        .await?)
}

pub async fn delete_addon(db: &DatabaseConnection, addon_id: i32) -> AppResult<()> {
    let references = booking_addon::Entity::find()
        .filter(booking_addon::Column::AddonId.eq(addon_id))
        .count(db)
        .await?;
    if references > 0 {
        return Err(AppError::Conflict(
            "Add-on is referenced by existing bookings".to_string(),
        ));
    }

    let result = addon::Entity::delete_by_id(addon_id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound("Add-on not found".to_string()));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::services::bookings::create_booking;
    use crate::services::submission::{AddonIntent, BookingHeader, ItemIntent};
    use crate::test_utils::{create_priced_program, create_test_addon, dec, setup_test_db};

    fn form(code: &str, name: &str) -> NewProgram {
        NewProgram {
            code: code.to_string(),
            name: name.to_string(),
            ..Default::default()
        }
    }

    fn header() -> BookingHeader {
        BookingHeader {
            full_name: "Guest".to_string(),
            email: "guest@example.com".to_string(),
            phone: "0800000000".to_string(),
            ride_date: NaiveDate::from_ymd_opt(2026, 12, 1).unwrap(),
            ride_time: None,
            pickup_place: String::new(),
            notes: String::new(),
        }
    }

    #[test]
    fn test_validate_program_collects_every_error() {
        let mut input = form("  ", "");
        input.duration_minutes = Some("1.5".to_string());
        input
            .rates
            .insert(rate_field(ParticipantType::Rider, AgeGroup::Child), "-10".to_string());
        input
            .rates
            .insert(rate_field(ParticipantType::Passenger, AgeGroup::Adult), "cheap".to_string());

        let errors = validate_program(&input, false).unwrap_err();
        assert_eq!(
            errors,
            vec![
                "Program code is required.",
                "Program name is required.",
                "Duration must be a positive whole number (minutes).",
                "Price for Rider - Child must be a non-negative number.",
                "Price for Passenger - Adult must be a non-negative number.",
            ]
        );
    }

    #[test]
    fn test_validate_program_defaults() {
        let mut input = form(" ATV9 ", "Jungle loop");
        input
            .rates
            .insert(rate_field(ParticipantType::Rider, AgeGroup::Adult), " 1200 ".to_string());
        input
            .rates
            .insert(rate_field(ParticipantType::Rider, AgeGroup::Child), "".to_string());

        let valid = validate_program(&input, false).unwrap();
        assert_eq!(valid.code, "ATV9");
        assert_eq!(valid.duration_minutes, DEFAULT_DURATION_MINUTES);
        assert!(valid.active);
        assert_eq!(valid.rates, vec![(ParticipantType::Rider, AgeGroup::Adult, dec("1200"))]);
    }

    #[test]
    fn test_validate_program_rejects_taken_code() {
        let errors = validate_program(&form("ATV1", "Loop"), true).unwrap_err();
        assert_eq!(errors, vec!["Program code must be unique."]);
    }

    #[tokio::test]
    async fn test_create_program_with_rates_and_images() {
        let db = setup_test_db().await;
        let mut input = form("ATV1", "Mountain ride");
        input.duration_minutes = Some("90".to_string());
        input
            .rates
            .insert(rate_field(ParticipantType::Rider, AgeGroup::Adult), "1500.00".to_string());
        input.image_urls = vec!["https://img/2.jpg".to_string(), "https://img/1.jpg".to_string()];

        let ProgramCreation::Created(program) = create_program(&db, &input).await.unwrap() else {
            panic!("program should be created");
        };
        assert_eq!(program.duration_minutes, 90);

        let detail = program_detail(&db, program.id).await.unwrap();
        assert_eq!(detail.starting_price, Some(dec("1500.00")));
        assert_eq!(detail.images.len(), 2);
        assert_eq!(detail.images[0].url, "https://img/2.jpg");
        assert_eq!(detail.images[0].alt_text, "Mountain ride");

        let ProgramCreation::Rejected(errors) = create_program(&db, &input).await.unwrap() else {
            panic!("duplicate code should be rejected");
        };
        assert_eq!(errors, vec!["Program code must be unique."]);
    }

    #[tokio::test]
    async fn test_program_text_is_stored_and_editable() {
        let db = setup_test_db().await;
        let mut input = form("ATV2", "Sunset ride");
        input.text.itinerary = " 16:00 pickup\n16:30 ride ".to_string();
        input.text.tour_includes = "Helmet, water".to_string();
        input.text.pricing_notes = "Prices per person".to_string();

        let ProgramCreation::Created(program) = create_program(&db, &input).await.unwrap() else {
            panic!("program should be created");
        };

        let detail = program_detail(&db, program.id).await.unwrap();
        assert_eq!(detail.program.itinerary, "16:00 pickup\n16:30 ride");
        assert_eq!(detail.program.tour_includes, "Helmet, water");
        assert_eq!(detail.program.pricing_notes, "Prices per person");
        assert_eq!(detail.program.tour_excludes, "");

        let changes = ProgramChanges {
            schedule_details: Some(" Daily at 16:00 ".to_string()),
            tour_excludes: Some("Hotel transfer".to_string()),
            tour_notes: Some("Closed shoes".to_string()),
            active: Some(false),
            ..Default::default()
        };
        update_program(&db, program.id, &changes).await.unwrap();

        let detail = program_detail(&db, program.id).await.unwrap();
        assert_eq!(detail.program.schedule_details, "Daily at 16:00");
        assert_eq!(detail.program.tour_excludes, "Hotel transfer");
        assert_eq!(detail.program.tour_notes, "Closed shoes");
        assert_eq!(detail.program.itinerary, "16:00 pickup\n16:30 ride");
        assert!(!detail.program.active);
        assert!(list_program_cards(&db).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_program_rejects_bad_values() {
        let db = setup_test_db().await;
        let program = create_priced_program(&db, "ATV1", &[]).await;

        let blank = ProgramChanges {
            name: Some("  ".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            update_program(&db, program.id, &blank).await.unwrap_err(),
            AppError::BadRequest(_)
        ));

        let duration = ProgramChanges {
            duration_minutes: Some("0".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            update_program(&db, program.id, &duration).await.unwrap_err(),
            AppError::BadRequest(ref m) if m == DURATION_ERROR
        ));

        assert!(matches!(
            update_program(&db, program.id + 100, &ProgramChanges::default()).await.unwrap_err(),
            AppError::NotFound(_)
        ));
    }

    #[tokio::test]
    async fn test_program_cards_show_starting_price_and_primary_image() {
        let db = setup_test_db().await;
        let program = create_priced_program(
            &db,
            "ATV1",
            &[
                (ParticipantType::Rider, AgeGroup::Adult, "1500.00"),
                (ParticipantType::Passenger, AgeGroup::Child, "600.00"),
            ],
        )
        .await;
        for (url, order) in [("https://img/b.jpg", 2), ("https://img/a.jpg", 1)] {
            add_image(
                &db,
                program.id,
                &NewImage { url: url.to_string(), alt_text: String::new(), display_order: order },
            )
            .await
            .unwrap();
        }
        create_priced_program(&db, "ATV2", &[]).await;

        let cards = list_program_cards(&db).await.unwrap();
        assert_eq!(cards.len(), 2);
        assert_eq!(cards[0].starting_price, Some(dec("600.00")));
        assert_eq!(cards[0].primary_image.as_deref(), Some("https://img/a.jpg"));
        assert_eq!(cards[1].starting_price, None);
        assert_eq!(cards[1].primary_image, None);
    }

    #[tokio::test]
    async fn test_booking_form_names_fields() {
        let db = setup_test_db().await;
        let program = create_priced_program(
            &db,
            "ATV1",
            &[(ParticipantType::Rider, AgeGroup::Adult, "1500.00")],
        )
        .await;
        let water = create_test_addon(&db, "WATER", "Water", "20.00").await;
        create_test_addon(&db, "CAM", "Camera", "100.00").await;

        let schema = booking_form(&db).await.unwrap();
        let rows = &schema.programs[0].rows;
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[0].field, format!("rider_adult_{}", program.id));
        assert_eq!(rows[0].price, Some(dec("1500.00")));
        assert_eq!(rows[3].field, format!("passenger_child_{}", program.id));
        assert_eq!(rows[3].price, None);
        assert_eq!(schema.addons[0].name, "Camera");
        assert_eq!(schema.addons[1].field, format!("addon_{}", water.id));
        assert_eq!(schema.ride_slots.len(), 3);
    }

    #[tokio::test]
    async fn test_referenced_program_and_addon_cannot_be_deleted() {
        let db = setup_test_db().await;
        let program = create_priced_program(
            &db,
            "ATV1",
            &[(ParticipantType::Rider, AgeGroup::Adult, "1500.00")],
        )
        .await;
        let photos = create_test_addon(&db, "PHOTO", "Photos", "300.00").await;
        create_booking(
            &db,
            &header(),
            &[ItemIntent {
                program_id: program.id,
                participant_type: ParticipantType::Rider,
                age_group: AgeGroup::Adult,
                quantity: 1,
            }],
            &[AddonIntent { addon_id: photos.id, quantity: 1 }],
        )
        .await
        .unwrap();

        assert!(matches!(
            delete_program(&db, program.id).await.unwrap_err(),
            AppError::Conflict(_)
        ));
        assert!(matches!(
            delete_addon(&db, photos.id).await.unwrap_err(),
            AppError::Conflict(_)
        ));
    }

    #[tokio::test]
    async fn test_unreferenced_program_is_deleted_with_rates() {
        let db = setup_test_db().await;
        let program = create_priced_program(
            &db,
            "ATV1",
            &[(ParticipantType::Rider, AgeGroup::Adult, "1500.00")],
        )
        .await;

        delete_program(&db, program.id).await.unwrap();

        assert!(program::Entity::find().all(&db).await.unwrap().is_empty());
        assert!(program_rate::Entity::find().all(&db).await.unwrap().is_empty());
        assert!(matches!(
            program_detail(&db, program.id).await.unwrap_err(),
            AppError::NotFound(_)
        ));
    }

    #[tokio::test]
    async fn test_addon_codes_are_unique() {
        let db = setup_test_db().await;
        let input = NewAddon {
            code: "PHOTO".to_string(),
            name: "Photos".to_string(),
            price: dec("300.00"),
            active: None,
        };
        create_addon(&db, &input).await.unwrap();

        assert!(matches!(create_addon(&db, &input).await.unwrap_err(), AppError::Conflict(_)));
        assert_eq!(list_addons(&db).await.unwrap().len(), 1);
    }
}
