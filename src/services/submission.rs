//! Booking line builder.
//!
//! Turns the raw field map of a booking form into typed line intents. Every
//! problem is collected so the form can be shown again with all of them at
//! once. Nothing in here touches the database: the catalog snapshot is loaded
//! by [`load_catalog`] and committing is left to [`submit_booking`].

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::NaiveDate;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};
use serde::Serialize;

use crate::entities::booking::{self, RideSlot};
use crate::entities::program_rate::{AgeGroup, ParticipantType};
use crate::entities::{addon, program};
use crate::error::AppResult;
use crate::services::bookings;

pub const REQUIRED_FIELDS_ERROR: &str = "Full name, email, phone, and ride date are required.";
pub const DATE_FORMAT_ERROR: &str = "Ride date must be in YYYY-MM-DD format.";
pub const RIDE_SLOT_ERROR: &str = "Please select a valid ride time slot.";
pub const NO_PROGRAM_ERROR: &str = "Please select at least one program.";
pub const NO_PARTICIPANT_ERROR: &str = "Please select at least one rider or passenger.";

/// Form field carrying the quantity of one rate combination of a program.
pub fn program_field(participant_type: ParticipantType, age_group: AgeGroup, program_id: i32) -> String {
    format!("{}_{}_{}", participant_type, age_group, program_id)
}

pub fn addon_field(addon_id: i32) -> String {
    format!("addon_{}", addon_id)
}

#[derive(Debug, Clone)]
pub struct ProgramChoice {
    pub id: i32,
    pub code: String,
}

#[derive(Debug, Clone)]
pub struct AddonChoice {
    pub id: i32,
    pub name: String,
}

/// Programs and add-ons a submission may reference.
#[derive(Debug, Clone, Default)]
pub struct BookingCatalog {
    pub programs: Vec<ProgramChoice>,
    pub addons: Vec<AddonChoice>,
}

/// Which programs take part in a submission.
#[derive(Debug, Clone)]
pub enum ProgramSelection {
    /// Every catalog program is read from the form
    AllPrograms,
    /// Only the listed program ids are read. Raw values straight from the
    /// request: unparseable or unknown ids are dropped.
    Selected(Vec<String>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct BookingHeader {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub ride_date: NaiveDate,
    pub ride_time: Option<RideSlot>,
    pub pickup_place: String,
    pub notes: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemIntent {
    pub program_id: i32,
    pub participant_type: ParticipantType,
    pub age_group: AgeGroup,
    pub quantity: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddonIntent {
    pub addon_id: i32,
    pub quantity: i32,
}

/// A submission that passed validation and is ready to be persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct BookingDraft {
    pub header: BookingHeader,
    pub items: Vec<ItemIntent>,
    pub addons: Vec<AddonIntent>,
}

/// Trimmed header values, echoed back so the form keeps the user's input.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FormValues {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub ride_date: String,
    pub ride_time: String,
    pub pickup_place: String,
    pub notes: String,
}

#[derive(Debug, Clone, Default)]
pub struct SubmissionOutcome {
    pub form_values: FormValues,
    /// Accepted quantities per program field. Fields with invalid input are absent.
    pub quantities: BTreeMap<String, i32>,
    pub addon_quantities: BTreeMap<String, i32>,
    pub active_program_ids: Vec<i32>,
    pub errors: Vec<String>,
    /// Present only when `errors` is empty and the ride date parsed
    pub draft: Option<BookingDraft>,
}

enum QuantityInput {
    Empty,
    Valid(i32),
    NotANumber,
    Negative,
    TooLarge,
}

fn read_field(fields: &HashMap<String, String>, name: &str) -> String {
    fields
        .get(name)
        .map(|value| value.trim().to_string())
        .unwrap_or_default()
}

fn parse_quantity(raw: &str) -> QuantityInput {
    if raw.is_empty() {
        return QuantityInput::Empty;
    }
    match raw.parse::<i64>() {
        Ok(quantity) if quantity < 0 => QuantityInput::Negative,
        Ok(quantity) if quantity > i64::from(bookings::MAX_QUANTITY) => QuantityInput::TooLarge,
        Ok(quantity) => QuantityInput::Valid(quantity as i32),
        Err(_) => QuantityInput::NotANumber,
    }
}

fn resolve_active_programs(catalog: &BookingCatalog, selection: &ProgramSelection) -> Vec<i32> {
    match selection {
        ProgramSelection::AllPrograms => catalog.programs.iter().map(|p| p.id).collect(),
        ProgramSelection::Selected(raw_ids) => {
            let known: HashSet<i32> = catalog.programs.iter().map(|p| p.id).collect();
            let mut seen = HashSet::new();
            raw_ids
                .iter()
                .filter_map(|raw| raw.trim().parse::<i32>().ok())
                .filter(|id| known.contains(id) && seen.insert(*id))
                .collect()
        }
    }
}

/// Validate a raw booking form against the catalog snapshot.
pub fn build_submission(
    catalog: &BookingCatalog,
    fields: &HashMap<String, String>,
    selection: &ProgramSelection,
) -> SubmissionOutcome {
    let form_values = FormValues {
        full_name: read_field(fields, "full_name"),
        email: read_field(fields, "email"),
        phone: read_field(fields, "phone"),
        ride_date: read_field(fields, "ride_date"),
        ride_time: read_field(fields, "ride_time"),
        pickup_place: read_field(fields, "pickup_place"),
        notes: read_field(fields, "notes"),
    };

    let mut errors = Vec::new();
    let mut quantities = BTreeMap::new();
    let mut addon_quantities = BTreeMap::new();

    if form_values.full_name.is_empty()
        || form_values.email.is_empty()
        || form_values.phone.is_empty()
        || form_values.ride_date.is_empty()
    {
        errors.push(REQUIRED_FIELDS_ERROR.to_string());
    }

    let mut ride_date = None;
    if !form_values.ride_date.is_empty() {
        match NaiveDate::parse_from_str(&form_values.ride_date, "%Y-%m-%d") {
            Ok(date) => ride_date = Some(date),
            Err(_) => errors.push(DATE_FORMAT_ERROR.to_string()),
        }
    }

    // Empty slot means unscheduled
    let mut ride_time = None;
    if !form_values.ride_time.is_empty() {
        match RideSlot::parse(&form_values.ride_time) {
            Some(slot) => ride_time = Some(slot),
            None => errors.push(RIDE_SLOT_ERROR.to_string()),
        }
    }

    let active_program_ids = resolve_active_programs(catalog, selection);
    if matches!(selection, ProgramSelection::Selected(_)) && active_program_ids.is_empty() {
        errors.push(NO_PROGRAM_ERROR.to_string());
    }

    let mut items = Vec::new();
    for program_id in &active_program_ids {
        let Some(program) = catalog.programs.iter().find(|p| p.id == *program_id) else {
            continue;
        };

        for participant_type in ParticipantType::ALL {
            for age_group in AgeGroup::ALL {
                let field = program_field(participant_type, age_group, program.id);
                match parse_quantity(&read_field(fields, &field)) {
                    QuantityInput::Empty => {
                        quantities.insert(field, 0);
                    }
                    QuantityInput::NotANumber => errors.push(format!(
                        "Quantity for {} ({} {}) must be a number.",
                        program.code, participant_type, age_group
                    )),
                    QuantityInput::Negative => errors.push(format!(
                        "Quantity for {} ({} {}) cannot be negative.",
                        program.code, participant_type, age_group
                    )),
                    QuantityInput::TooLarge => errors.push(format!(
                        "Quantity for {} ({} {}) cannot exceed {}.",
                        program.code,
                        participant_type,
                        age_group,
                        bookings::MAX_QUANTITY
                    )),
                    QuantityInput::Valid(quantity) => {
                        quantities.insert(field, quantity);
                        if quantity > 0 {
                            items.push(ItemIntent {
                                program_id: program.id,
                                participant_type,
                                age_group,
                                quantity,
                            });
                        }
                    }
                }
            }
        }
    }

    if items.is_empty() && errors.is_empty() {
        errors.push(NO_PARTICIPANT_ERROR.to_string());
    }

    let mut addons = Vec::new();
    for addon in &catalog.addons {
        let field = addon_field(addon.id);
        match parse_quantity(&read_field(fields, &field)) {
            QuantityInput::Empty => {
                addon_quantities.insert(field, 0);
            }
            QuantityInput::NotANumber => {
                errors.push(format!("Quantity for {} must be a number.", addon.name))
            }
            QuantityInput::Negative => {
                errors.push(format!("Quantity for {} cannot be negative.", addon.name))
            }
            QuantityInput::TooLarge => errors.push(format!(
                "Quantity for {} cannot exceed {}.",
                addon.name,
                bookings::MAX_QUANTITY
            )),
            QuantityInput::Valid(quantity) => {
                addon_quantities.insert(field, quantity);
                if quantity > 0 {
                    addons.push(AddonIntent {
                        addon_id: addon.id,
                        quantity,
                    });
                }
            }
        }
    }

    let draft = match ride_date {
        Some(ride_date) if errors.is_empty() => Some(BookingDraft {
            header: BookingHeader {
                full_name: form_values.full_name.clone(),
                email: form_values.email.clone(),
                phone: form_values.phone.clone(),
                ride_date,
                ride_time,
                pickup_place: form_values.pickup_place.clone(),
                notes: form_values.notes.clone(),
            },
            items,
            addons,
        }),
        _ => None,
    };

    SubmissionOutcome {
        form_values,
        quantities,
        addon_quantities,
        active_program_ids,
        errors,
        draft,
    }
}

/// Active programs by id and active add-ons by name.
pub async fn load_catalog(db: &DatabaseConnection) -> AppResult<BookingCatalog> {
    let programs = program::Entity::find()
        .filter(program::Column::Active.eq(true))
        .order_by_asc(program::Column::Id)
        .all(db)
        .await?;

    let addons = addon::Entity::find()
        .filter(addon::Column::Active.eq(true))
        .order_by_asc(addon::Column::Name)
        .all(db)
        .await?;

    Ok(BookingCatalog {
        programs: programs
            .into_iter()
            .map(|p| ProgramChoice { id: p.id, code: p.code })
            .collect(),
        addons: addons
            .into_iter()
            .map(|a| AddonChoice { id: a.id, name: a.name })
            .collect(),
    })
}

pub enum Submission {
    Created(booking::Model),
    Rejected(SubmissionOutcome),
}

/// Validate a form and, when it is clean, persist the booking.
///
/// Validation problems come back as [`Submission::Rejected`]. Only
/// configuration and storage failures are errors.
pub async fn submit_booking(
    db: &DatabaseConnection,
    fields: &HashMap<String, String>,
    selection: &ProgramSelection,
) -> AppResult<Submission> {
    let catalog = load_catalog(db).await?;
    let mut outcome = build_submission(&catalog, fields, selection);

    match outcome.draft.take() {
        Some(draft) => {
            let booking =
                bookings::create_booking(db, &draft.header, &draft.items, &draft.addons).await?;
            Ok(Submission::Created(booking))
        }
        None => {
            tracing::debug!(errors = outcome.errors.len(), "Booking submission rejected");
            Ok(Submission::Rejected(outcome))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> BookingCatalog {
        BookingCatalog {
            programs: vec![
                ProgramChoice { id: 1, code: "ATV1".to_string() },
                ProgramChoice { id: 2, code: "ATV2".to_string() },
            ],
            addons: vec![AddonChoice { id: 5, name: "Photo package".to_string() }],
        }
    }

    fn form(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        let mut fields: HashMap<String, String> = [
            ("full_name", "Somchai Rider"),
            ("email", "somchai@example.com"),
            ("phone", "+66 89 874 0055"),
            ("ride_date", "2026-11-02"),
        ]
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        for (key, value) in pairs {
            fields.insert(key.to_string(), value.to_string());
        }
        fields
    }

    fn selected(ids: &[&str]) -> ProgramSelection {
        ProgramSelection::Selected(ids.iter().map(|id| id.to_string()).collect())
    }

    #[test]
    fn test_valid_submission_produces_draft() {
        let outcome = build_submission(
            &catalog(),
            &form(&[("rider_adult_1", "2"), ("ride_time", "morning"), ("addon_5", "1")]),
            &selected(&["1"]),
        );

        assert!(outcome.errors.is_empty(), "{:?}", outcome.errors);
        let draft = outcome.draft.expect("draft");
        assert_eq!(
            draft.items,
            vec![ItemIntent {
                program_id: 1,
                participant_type: ParticipantType::Rider,
                age_group: AgeGroup::Adult,
                quantity: 2,
            }]
        );
        assert_eq!(draft.addons, vec![AddonIntent { addon_id: 5, quantity: 1 }]);
        assert_eq!(draft.header.ride_time, Some(RideSlot::Morning));
        assert_eq!(draft.header.ride_date, NaiveDate::from_ymd_opt(2026, 11, 2).unwrap());
        assert_eq!(outcome.quantities.get("rider_adult_1"), Some(&2));
        assert_eq!(outcome.quantities.get("passenger_child_1"), Some(&0));
    }

    #[test]
    fn test_oversized_quantities_are_rejected() {
        let outcome = build_submission(
            &catalog(),
            &form(&[
                ("rider_adult_1", "100000"),
                ("rider_child_1", "99"),
                ("addon_5", "5000000000"),
            ]),
            &selected(&["1"]),
        );

        assert_eq!(
            outcome.errors,
            vec![
                "Quantity for ATV1 (rider adult) cannot exceed 99.",
                "Quantity for Photo package cannot exceed 99.",
            ]
        );
        assert!(outcome.draft.is_none());
        assert_eq!(outcome.quantities.get("rider_adult_1"), None);
        assert_eq!(outcome.quantities.get("rider_child_1"), Some(&99));
    }

    #[test]
    fn test_three_independent_defects_are_all_reported() {
        let outcome = build_submission(
            &catalog(),
            &form(&[("email", "  "), ("rider_adult_1", "-1"), ("addon_5", "two")]),
            &selected(&["1"]),
        );

        assert!(outcome.draft.is_none());
        assert_eq!(
            outcome.errors,
            vec![
                REQUIRED_FIELDS_ERROR.to_string(),
                "Quantity for ATV1 (rider adult) cannot be negative.".to_string(),
                "Quantity for Photo package must be a number.".to_string(),
            ]
        );
        // Echo keeps what the user typed, trimmed
        assert_eq!(outcome.form_values.full_name, "Somchai Rider");
        assert_eq!(outcome.form_values.email, "");
    }

    #[test]
    fn test_bad_date_and_slot_are_reported() {
        let outcome = build_submission(
            &catalog(),
            &form(&[("ride_date", "02/11/2026"), ("ride_time", "midnight"), ("rider_adult_1", "1")]),
            &selected(&["1"]),
        );

        assert!(outcome.draft.is_none());
        assert_eq!(
            outcome.errors,
            vec![DATE_FORMAT_ERROR.to_string(), RIDE_SLOT_ERROR.to_string()]
        );
    }

    #[test]
    fn test_empty_slot_is_unscheduled() {
        let outcome = build_submission(
            &catalog(),
            &form(&[("ride_time", "   "), ("passenger_child_2", "3")]),
            &selected(&["2"]),
        );

        let draft = outcome.draft.expect("draft");
        assert_eq!(draft.header.ride_time, None);
    }

    #[test]
    fn test_selection_is_deduplicated_and_unknown_ids_dropped() {
        let outcome = build_submission(
            &catalog(),
            &form(&[("rider_adult_2", "1")]),
            &selected(&["2", "abc", "99", "2", " 1 "]),
        );

        assert_eq!(outcome.active_program_ids, vec![2, 1]);
        assert!(outcome.errors.is_empty());
    }

    #[test]
    fn test_empty_selection_is_an_error() {
        let outcome = build_submission(&catalog(), &form(&[]), &selected(&["99", "x"]));

        assert_eq!(outcome.errors, vec![NO_PROGRAM_ERROR.to_string()]);
        assert!(outcome.draft.is_none());
    }

    #[test]
    fn test_unselected_program_quantities_are_ignored() {
        let outcome = build_submission(
            &catalog(),
            &form(&[("rider_adult_1", "1"), ("rider_adult_2", "oops")]),
            &selected(&["1"]),
        );

        assert!(outcome.errors.is_empty());
        assert!(!outcome.quantities.contains_key("rider_adult_2"));
    }

    #[test]
    fn test_all_programs_mode_reads_every_program() {
        let outcome = build_submission(
            &catalog(),
            &form(&[("rider_adult_1", "1"), ("passenger_adult_2", "x")]),
            &ProgramSelection::AllPrograms,
        );

        assert_eq!(outcome.active_program_ids, vec![1, 2]);
        assert_eq!(
            outcome.errors,
            vec!["Quantity for ATV2 (passenger adult) must be a number.".to_string()]
        );
    }

    #[test]
    fn test_no_participants_error_only_when_nothing_else_failed() {
        let outcome = build_submission(&catalog(), &form(&[]), &selected(&["1"]));
        assert_eq!(outcome.errors, vec![NO_PARTICIPANT_ERROR.to_string()]);

        let outcome = build_submission(
            &catalog(),
            &form(&[("ride_date", "not-a-date")]),
            &selected(&["1"]),
        );
        assert_eq!(outcome.errors, vec![DATE_FORMAT_ERROR.to_string()]);
    }

    #[test]
    fn test_addons_alone_do_not_make_a_booking() {
        let outcome = build_submission(&catalog(), &form(&[("addon_5", "2")]), &selected(&["1"]));

        assert_eq!(outcome.errors, vec![NO_PARTICIPANT_ERROR.to_string()]);
        assert_eq!(outcome.addon_quantities.get("addon_5"), Some(&2));
    }

    #[test]
    fn test_field_names() {
        assert_eq!(program_field(ParticipantType::Passenger, AgeGroup::Child, 12), "passenger_child_12");
        assert_eq!(addon_field(3), "addon_3");
    }
}
