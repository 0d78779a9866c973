//! Booking aggregator.
//!
//! Persists bookings with their priced lines and keeps `booking.total_amount`
//! equal to the sum of the line totals. Every write that touches a booking's
//! children runs in one transaction together with [`recompute_total`], and
//! mutations of an existing booking hold a row lock on its header so two
//! requests editing the same booking are serialized.

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction,
    EntityTrait, ModelTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use serde::Serialize;
use uuid::Uuid;

use crate::entities::program_rate::{AgeGroup, ParticipantType};
use crate::entities::{addon, booking, booking_addon, booking_item, program};
use crate::error::{AppError, AppResult};
use crate::services::rates;
use crate::services::submission::{AddonIntent, BookingHeader, ItemIntent};

/// `unit_price × quantity` in exact decimal arithmetic
pub fn line_total(unit_price: Decimal, quantity: i32) -> Decimal {
    unit_price * Decimal::from(quantity)
}

/// Largest quantity accepted on one line. Keeps line and booking totals
/// inside the `DECIMAL(10,2)` money columns.
pub const MAX_QUANTITY: i32 = 99;

fn ensure_valid_quantity(quantity: i32) -> AppResult<()> {
    if quantity < 1 {
        return Err(AppError::BadRequest("Quantity must be at least 1".to_string()));
    }
    if quantity > MAX_QUANTITY {
        return Err(AppError::BadRequest(format!(
            "Quantity cannot exceed {}",
            MAX_QUANTITY
        )));
    }
    Ok(())
}

/// Fetch a booking header with `SELECT ... FOR UPDATE`.
async fn lock_booking(txn: &DatabaseTransaction, booking_id: Uuid) -> AppResult<booking::Model> {
    booking::Entity::find_by_id(booking_id)
        .lock_exclusive()
        .one(txn)
        .await?
        .ok_or_else(|| AppError::NotFound("Booking not found".to_string()))
}

/// Price an item from the rate catalog and insert it. The caller recomputes.
async fn insert_item<C: ConnectionTrait>(
    conn: &C,
    booking_id: Uuid,
    intent: &ItemIntent,
) -> AppResult<booking_item::Model> {
    ensure_valid_quantity(intent.quantity)?;

    let unit_price =
        rates::get_rate(conn, intent.program_id, intent.participant_type, intent.age_group).await?;

    let item = booking_item::ActiveModel {
        id: Set(Uuid::new_v4()),
        booking_id: Set(booking_id),
        program_id: Set(intent.program_id),
        participant_type: Set(intent.participant_type),
        age_group: Set(intent.age_group),
        quantity: Set(intent.quantity),
        unit_price: Set(unit_price),
        line_total: Set(line_total(unit_price, intent.quantity)),
    }
    .insert(conn)
    .await?;

    Ok(item)
}

/// Copy the add-on's catalog price onto a new line. The caller recomputes.
async fn insert_addon<C: ConnectionTrait>(
    conn: &C,
    booking_id: Uuid,
    intent: &AddonIntent,
) -> AppResult<booking_addon::Model> {
    ensure_valid_quantity(intent.quantity)?;

    let catalog_addon = addon::Entity::find_by_id(intent.addon_id)
        .one(conn)
        .await?
        .ok_or_else(|| AppError::NotFound("Add-on not found".to_string()))?;

    let line = booking_addon::ActiveModel {
        id: Set(Uuid::new_v4()),
        booking_id: Set(booking_id),
        addon_id: Set(catalog_addon.id),
        quantity: Set(intent.quantity),
        unit_price: Set(catalog_addon.price),
        line_total: Set(line_total(catalog_addon.price, intent.quantity)),
    }
    .insert(conn)
    .await?;

    Ok(line)
}

/// Sum the current line totals of a booking and store the result.
pub async fn recompute_total<C: ConnectionTrait>(
    conn: &C,
    booking_id: Uuid,
) -> AppResult<booking::Model> {
    let booking = booking::Entity::find_by_id(booking_id)
        .one(conn)
        .await?
        .ok_or_else(|| AppError::NotFound("Booking not found".to_string()))?;

    let items_total: Decimal = booking_item::Entity::find()
        .filter(booking_item::Column::BookingId.eq(booking_id))
        .all(conn)
        .await?
        .iter()
        .map(|item| item.line_total)
        .sum();

    let addons_total: Decimal = booking_addon::Entity::find()
        .filter(booking_addon::Column::BookingId.eq(booking_id))
        .all(conn)
        .await?
        .iter()
        .map(|line| line.line_total)
        .sum();

    let mut active: booking::ActiveModel = booking.into();
    active.total_amount = Set(items_total + addons_total);
    Ok(active.update(conn).await?)
}

/// Create a booking with all of its lines in one transaction.
///
/// A missing rate aborts the whole booking; nothing is left behind.
pub async fn create_booking(
    db: &DatabaseConnection,
    header: &BookingHeader,
    items: &[ItemIntent],
    addons: &[AddonIntent],
) -> AppResult<booking::Model> {
    let txn = db.begin().await?;

    let booking = booking::ActiveModel {
        id: Set(Uuid::new_v4()),
        full_name: Set(header.full_name.clone()),
        email: Set(header.email.clone()),
        phone: Set(header.phone.clone()),
        ride_date: Set(header.ride_date),
        ride_time: Set(header.ride_time),
        pickup_place: Set(header.pickup_place.clone()),
        notes: Set(header.notes.clone()),
        total_amount: Set(Decimal::ZERO),
        created_at: Set(Utc::now().into()),
    }
    .insert(&txn)
    .await?;

    for item in items {
        insert_item(&txn, booking.id, item).await?;
    }
    for addon in addons {
        insert_addon(&txn, booking.id, addon).await?;
    }

    let booking = recompute_total(&txn, booking.id).await?;
    txn.commit().await?;

    tracing::info!(
        booking_id = %booking.id,
        items = items.len(),
        addons = addons.len(),
        total = %booking.total_amount,
        "Booking created"
    );

    Ok(booking)
}

/// Add one priced item to an existing booking.
pub async fn create_booking_item(
    db: &DatabaseConnection,
    booking_id: Uuid,
    intent: &ItemIntent,
) -> AppResult<(booking_item::Model, booking::Model)> {
    let txn = db.begin().await?;
    lock_booking(&txn, booking_id).await?;

    let item = insert_item(&txn, booking_id, intent).await?;
    let booking = recompute_total(&txn, booking_id).await?;
    txn.commit().await?;

    tracing::info!(booking_id = %booking_id, item_id = %item.id, total = %booking.total_amount, "Booking item added");
    Ok((item, booking))
}

/// Remove one item and return the booking with its new total.
pub async fn delete_booking_item(db: &DatabaseConnection, item_id: Uuid) -> AppResult<booking::Model> {
    let txn = db.begin().await?;

    let item = booking_item::Entity::find_by_id(item_id)
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::NotFound("Booking item not found".to_string()))?;
    let booking_id = item.booking_id;
    lock_booking(&txn, booking_id).await?;

    item.delete(&txn).await?;
    let booking = recompute_total(&txn, booking_id).await?;
    txn.commit().await?;

    tracing::info!(booking_id = %booking_id, item_id = %item_id, total = %booking.total_amount, "Booking item deleted");
    Ok(booking)
}

/// Add one add-on line to an existing booking.
pub async fn create_booking_addon(
    db: &DatabaseConnection,
    booking_id: Uuid,
    intent: &AddonIntent,
) -> AppResult<(booking_addon::Model, booking::Model)> {
    let txn = db.begin().await?;
    lock_booking(&txn, booking_id).await?;

    let line = insert_addon(&txn, booking_id, intent).await?;
    let booking = recompute_total(&txn, booking_id).await?;
    txn.commit().await?;

    tracing::info!(booking_id = %booking_id, addon_line_id = %line.id, total = %booking.total_amount, "Booking add-on added");
    Ok((line, booking))
}

pub async fn delete_booking_addon(db: &DatabaseConnection, line_id: Uuid) -> AppResult<booking::Model> {
    let txn = db.begin().await?;

    let line = booking_addon::Entity::find_by_id(line_id)
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::NotFound("Booking add-on not found".to_string()))?;
    let booking_id = line.booking_id;
    lock_booking(&txn, booking_id).await?;

    line.delete(&txn).await?;
    let booking = recompute_total(&txn, booking_id).await?;
    txn.commit().await?;

    tracing::info!(booking_id = %booking_id, addon_line_id = %line_id, total = %booking.total_amount, "Booking add-on deleted");
    Ok(booking)
}

/// Delete a booking together with all of its lines.
pub async fn delete_booking(db: &DatabaseConnection, booking_id: Uuid) -> AppResult<()> {
    let txn = db.begin().await?;
    lock_booking(&txn, booking_id).await?;

    booking_item::Entity::delete_many()
        .filter(booking_item::Column::BookingId.eq(booking_id))
        .exec(&txn)
        .await?;
    booking_addon::Entity::delete_many()
        .filter(booking_addon::Column::BookingId.eq(booking_id))
        .exec(&txn)
        .await?;
    booking::Entity::delete_by_id(booking_id).exec(&txn).await?;

    txn.commit().await?;
    tracing::info!(booking_id = %booking_id, "Booking deleted");
    Ok(())
}

#[derive(Debug, Serialize)]
pub struct ItemLine {
    pub id: Uuid,
    pub program_id: i32,
    pub program_code: String,
    pub program_name: String,
    pub participant_type: ParticipantType,
    pub age_group: AgeGroup,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub line_total: Decimal,
}

#[derive(Debug, Serialize)]
pub struct AddonLine {
    pub id: Uuid,
    pub addon_id: i32,
    pub addon_name: String,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub line_total: Decimal,
}

/// A booking with its lines, as shown on the confirmation page.
#[derive(Debug, Serialize)]
pub struct BookingDetail {
    #[serde(flatten)]
    pub booking: booking::Model,
    pub items: Vec<ItemLine>,
    pub addons: Vec<AddonLine>,
}

pub async fn get_booking_detail(db: &DatabaseConnection, booking_id: Uuid) -> AppResult<BookingDetail> {
    let booking = booking::Entity::find_by_id(booking_id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Booking not found".to_string()))?;

    let items = booking_item::Entity::find()
        .filter(booking_item::Column::BookingId.eq(booking_id))
        .find_also_related(program::Entity)
        .order_by_asc(booking_item::Column::ProgramId)
        .all(db)
        .await?
        .into_iter()
        .map(|(item, program)| ItemLine {
            id: item.id,
            program_id: item.program_id,
            program_code: program.as_ref().map(|p| p.code.clone()).unwrap_or_default(),
            program_name: program.map(|p| p.name).unwrap_or_default(),
            participant_type: item.participant_type,
            age_group: item.age_group,
            quantity: item.quantity,
            unit_price: item.unit_price,
            line_total: item.line_total,
        })
        .collect();

    let addons = booking_addon::Entity::find()
        .filter(booking_addon::Column::BookingId.eq(booking_id))
        .find_also_related(addon::Entity)
        .all(db)
        .await?
        .into_iter()
        .map(|(line, catalog_addon)| AddonLine {
            id: line.id,
            addon_id: line.addon_id,
            addon_name: catalog_addon.map(|a| a.name).unwrap_or_default(),
            quantity: line.quantity,
            unit_price: line.unit_price,
            line_total: line.line_total,
        })
        .collect();

    Ok(BookingDetail {
        booking,
        items,
        addons,
    })
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::entities::booking::RideSlot;
    use crate::test_utils::{create_priced_program, create_test_addon, dec, setup_test_db};

    fn header() -> BookingHeader {
        BookingHeader {
            full_name: "Mali Guest".to_string(),
            email: "mali@example.com".to_string(),
            phone: "0812345678".to_string(),
            ride_date: NaiveDate::from_ymd_opt(2026, 12, 1).unwrap(),
            ride_time: Some(RideSlot::Noon),
            pickup_place: "Kata Beach".to_string(),
            notes: String::new(),
        }
    }

    fn rider_adult(program_id: i32, quantity: i32) -> ItemIntent {
        ItemIntent {
            program_id,
            participant_type: ParticipantType::Rider,
            age_group: AgeGroup::Adult,
            quantity,
        }
    }

    async fn assert_total_matches_lines(db: &DatabaseConnection, booking_id: Uuid) {
        let booking = booking::Entity::find_by_id(booking_id).one(db).await.unwrap().unwrap();
        let items: Decimal = booking_item::Entity::find()
            .filter(booking_item::Column::BookingId.eq(booking_id))
            .all(db)
            .await
            .unwrap()
            .iter()
            .map(|i| i.line_total)
            .sum();
        let addons: Decimal = booking_addon::Entity::find()
            .filter(booking_addon::Column::BookingId.eq(booking_id))
            .all(db)
            .await
            .unwrap()
            .iter()
            .map(|a| a.line_total)
            .sum();
        assert_eq!(booking.total_amount, items + addons);
    }

    #[test]
    fn test_line_total_is_exact() {
        assert_eq!(line_total(dec("0.10"), 3), dec("0.30"));
        assert_eq!(line_total(dec("1500.00"), 2), dec("3000.00"));
    }

    #[tokio::test]
    async fn test_create_booking_prices_items_from_catalog() {
        let db = setup_test_db().await;
        let program = create_priced_program(
            &db,
            "ATV1",
            &[(ParticipantType::Rider, AgeGroup::Adult, "1500.00")],
        )
        .await;

        let booking = create_booking(&db, &header(), &[rider_adult(program.id, 2)], &[])
            .await
            .unwrap();

        assert_eq!(booking.total_amount, dec("3000.00"));
        let items = booking_item::Entity::find().all(&db).await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].unit_price, dec("1500.00"));
        assert_eq!(items[0].line_total, dec("3000.00"));
        assert_total_matches_lines(&db, booking.id).await;
    }

    #[tokio::test]
    async fn test_create_booking_includes_addons_in_total() {
        let db = setup_test_db().await;
        let program = create_priced_program(
            &db,
            "ATV1",
            &[(ParticipantType::Rider, AgeGroup::Adult, "1500.00")],
        )
        .await;
        let photos = create_test_addon(&db, "PHOTO", "Photo package", "250.50").await;

        let booking = create_booking(
            &db,
            &header(),
            &[rider_adult(program.id, 1)],
            &[AddonIntent { addon_id: photos.id, quantity: 2 }],
        )
        .await
        .unwrap();

        assert_eq!(booking.total_amount, dec("2001.00"));
        let line = booking_addon::Entity::find().one(&db).await.unwrap().unwrap();
        assert_eq!(line.unit_price, dec("250.50"));
        assert_eq!(line.line_total, dec("501.00"));
    }

    #[tokio::test]
    async fn test_missing_rate_rolls_back_everything() {
        let db = setup_test_db().await;
        let program = create_priced_program(
            &db,
            "ATV1",
            &[(ParticipantType::Rider, AgeGroup::Adult, "1500.00")],
        )
        .await;
        let passenger_child = ItemIntent {
            program_id: program.id,
            participant_type: ParticipantType::Passenger,
            age_group: AgeGroup::Child,
            quantity: 1,
        };

        let err = create_booking(&db, &header(), &[rider_adult(program.id, 1), passenger_child], &[])
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::RateNotFound { .. }));
        assert!(booking::Entity::find().all(&db).await.unwrap().is_empty());
        assert!(booking_item::Entity::find().all(&db).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_deleting_the_only_item_resets_total() {
        let db = setup_test_db().await;
        let program = create_priced_program(
            &db,
            "ATV1",
            &[(ParticipantType::Rider, AgeGroup::Adult, "1500.00")],
        )
        .await;
        let booking = create_booking(&db, &header(), &[rider_adult(program.id, 2)], &[])
            .await
            .unwrap();
        assert_eq!(booking.total_amount, dec("3000.00"));
        let item = booking_item::Entity::find().one(&db).await.unwrap().unwrap();

        let booking = delete_booking_item(&db, item.id).await.unwrap();

        assert_eq!(booking.total_amount, Decimal::ZERO);
        assert_total_matches_lines(&db, booking.id).await;
    }

    #[tokio::test]
    async fn test_child_mutations_keep_total_in_sync() {
        let db = setup_test_db().await;
        let program = create_priced_program(
            &db,
            "ATV1",
            &[
                (ParticipantType::Rider, AgeGroup::Adult, "1500.00"),
                (ParticipantType::Passenger, AgeGroup::Child, "700.00"),
            ],
        )
        .await;
        let photos = create_test_addon(&db, "PHOTO", "Photo package", "300.00").await;
        let booking = create_booking(&db, &header(), &[rider_adult(program.id, 1)], &[])
            .await
            .unwrap();

        let (_, after_item) = create_booking_item(
            &db,
            booking.id,
            &ItemIntent {
                program_id: program.id,
                participant_type: ParticipantType::Passenger,
                age_group: AgeGroup::Child,
                quantity: 2,
            },
        )
        .await
        .unwrap();
        assert_eq!(after_item.total_amount, dec("2900.00"));
        assert_total_matches_lines(&db, booking.id).await;

        let (line, after_addon) =
            create_booking_addon(&db, booking.id, &AddonIntent { addon_id: photos.id, quantity: 1 })
                .await
                .unwrap();
        assert_eq!(after_addon.total_amount, dec("3200.00"));
        assert_total_matches_lines(&db, booking.id).await;

        let after_delete = delete_booking_addon(&db, line.id).await.unwrap();
        assert_eq!(after_delete.total_amount, dec("2900.00"));
        assert_total_matches_lines(&db, booking.id).await;
    }

    #[tokio::test]
    async fn test_adding_unpriced_item_leaves_booking_untouched() {
        let db = setup_test_db().await;
        let program = create_priced_program(
            &db,
            "ATV1",
            &[(ParticipantType::Rider, AgeGroup::Adult, "1500.00")],
        )
        .await;
        let booking = create_booking(&db, &header(), &[rider_adult(program.id, 1)], &[])
            .await
            .unwrap();

        let err = create_booking_item(
            &db,
            booking.id,
            &ItemIntent {
                program_id: program.id,
                participant_type: ParticipantType::Rider,
                age_group: AgeGroup::Child,
                quantity: 1,
            },
        )
        .await
        .unwrap_err();

        assert!(matches!(err, AppError::RateNotFound { .. }));
        assert_eq!(booking_item::Entity::find().all(&db).await.unwrap().len(), 1);
        assert_total_matches_lines(&db, booking.id).await;
    }

    #[tokio::test]
    async fn test_item_quantity_must_be_positive() {
        let db = setup_test_db().await;
        let program = create_priced_program(
            &db,
            "ATV1",
            &[(ParticipantType::Rider, AgeGroup::Adult, "1500.00")],
        )
        .await;
        let booking = create_booking(&db, &header(), &[rider_adult(program.id, 1)], &[])
            .await
            .unwrap();

        let err = create_booking_item(&db, booking.id, &rider_adult(program.id, 0))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn test_oversized_line_quantity_is_rejected() {
        let db = setup_test_db().await;
        let program = create_priced_program(
            &db,
            "ATV1",
            &[(ParticipantType::Rider, AgeGroup::Adult, "1500.00")],
        )
        .await;
        let photos = create_test_addon(&db, "PHOTO", "Photos", "300.00").await;
        let booking = create_booking(&db, &header(), &[rider_adult(program.id, 1)], &[])
            .await
            .unwrap();

        let err = create_booking_item(&db, booking.id, &rider_adult(program.id, MAX_QUANTITY + 1))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(ref m) if m == "Quantity cannot exceed 99"));

        let err = create_booking_addon(
            &db,
            booking.id,
            &AddonIntent { addon_id: photos.id, quantity: 100_000 },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));

        let (_, at_limit) = create_booking_item(&db, booking.id, &rider_adult(program.id, MAX_QUANTITY))
            .await
            .unwrap();
        assert_eq!(at_limit.total_amount, dec("150000.00"));
        assert_total_matches_lines(&db, booking.id).await;
    }

    #[tokio::test]
    async fn test_unknown_booking_and_lines_are_not_found() {
        let db = setup_test_db().await;

        assert!(matches!(
            get_booking_detail(&db, Uuid::new_v4()).await.unwrap_err(),
            AppError::NotFound(_)
        ));
        assert!(matches!(
            delete_booking_item(&db, Uuid::new_v4()).await.unwrap_err(),
            AppError::NotFound(_)
        ));
        assert!(matches!(
            delete_booking(&db, Uuid::new_v4()).await.unwrap_err(),
            AppError::NotFound(_)
        ));
    }

    #[tokio::test]
    async fn test_delete_booking_removes_lines() {
        let db = setup_test_db().await;
        let program = create_priced_program(
            &db,
            "ATV1",
            &[(ParticipantType::Rider, AgeGroup::Adult, "1500.00")],
        )
        .await;
        let photos = create_test_addon(&db, "PHOTO", "Photo package", "300.00").await;
        let booking = create_booking(
            &db,
            &header(),
            &[rider_adult(program.id, 1)],
            &[AddonIntent { addon_id: photos.id, quantity: 1 }],
        )
        .await
        .unwrap();

        delete_booking(&db, booking.id).await.unwrap();

        assert!(booking::Entity::find().all(&db).await.unwrap().is_empty());
        assert!(booking_item::Entity::find().all(&db).await.unwrap().is_empty());
        assert!(booking_addon::Entity::find().all(&db).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_booking_detail_lists_named_lines() {
        let db = setup_test_db().await;
        let program = create_priced_program(
            &db,
            "ATV1",
            &[(ParticipantType::Rider, AgeGroup::Adult, "1500.00")],
        )
        .await;
        let photos = create_test_addon(&db, "PHOTO", "Photo package", "300.00").await;
        let booking = create_booking(
            &db,
            &header(),
            &[rider_adult(program.id, 1)],
            &[AddonIntent { addon_id: photos.id, quantity: 1 }],
        )
        .await
        .unwrap();

        let detail = get_booking_detail(&db, booking.id).await.unwrap();
        assert_eq!(detail.items.len(), 1);
        assert_eq!(detail.items[0].program_code, "ATV1");
        assert_eq!(detail.addons[0].addon_name, "Photo package");
        assert_eq!(detail.booking.total_amount, dec("1800.00"));
    }
}
