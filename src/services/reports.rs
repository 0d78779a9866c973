//! Read-side booking queries for the management views.

use chrono::{Local, NaiveDate};
use rust_decimal::Decimal;
use sea_orm::sea_query::Query;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Select,
};
use serde::Serialize;

use crate::entities::{booking, booking_item};
use crate::error::AppResult;

/// Optional listing filters. Both narrow the set when present.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BookingFilter {
    pub program_id: Option<i32>,
    pub ride_date: Option<NaiveDate>,
}

impl BookingFilter {
    /// Build a filter from raw query values. Values that do not parse are
    /// dropped instead of rejected.
    pub fn from_raw(program: Option<&str>, ride_date: Option<&str>) -> Self {
        Self {
            program_id: program.and_then(|p| p.trim().parse().ok()),
            ride_date: ride_date
                .and_then(|d| NaiveDate::parse_from_str(d.trim(), "%Y-%m-%d").ok()),
        }
    }

    fn apply(&self, mut query: Select<booking::Entity>) -> Select<booking::Entity> {
        if let Some(program_id) = self.program_id {
            // Bookings with at least one item of the program, each counted once
            query = query.filter(
                booking::Column::Id.in_subquery(
                    Query::select()
                        .column(booking_item::Column::BookingId)
                        .from(booking_item::Entity)
                        .and_where(booking_item::Column::ProgramId.eq(program_id))
                        .to_owned(),
                ),
            );
        }
        if let Some(ride_date) = self.ride_date {
            query = query.filter(booking::Column::RideDate.eq(ride_date));
        }
        query
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BookingStats {
    pub total_revenue: Decimal,
    pub booking_count: u64,
    pub average_revenue: Decimal,
    pub upcoming_count: u64,
}

/// Aggregate `(total_amount, ride_date)` rows. Ride dates on `today` count as
/// upcoming.
pub fn summarize(rows: &[(Decimal, NaiveDate)], today: NaiveDate) -> BookingStats {
    let total_revenue: Decimal = rows.iter().map(|(total, _)| *total).sum();
    let booking_count = rows.len() as u64;
    let average_revenue = if booking_count == 0 {
        Decimal::ZERO
    } else {
        (total_revenue / Decimal::from(booking_count)).round_dp(2)
    };
    let upcoming_count = rows.iter().filter(|(_, date)| *date >= today).count() as u64;

    BookingStats {
        total_revenue,
        booking_count,
        average_revenue,
        upcoming_count,
    }
}

/// Resolve a raw page number against the page count. Garbage means page 1,
/// anything outside `1..=num_pages` means the last page.
pub fn resolve_page(raw: Option<&str>, num_pages: u64) -> u64 {
    let num_pages = num_pages.max(1);
    match raw.map(|p| p.trim().parse::<i64>()) {
        None | Some(Err(_)) => 1,
        Some(Ok(page)) if page >= 1 && (page as u64) <= num_pages => page as u64,
        Some(Ok(_)) => num_pages,
    }
}

#[derive(Debug, Serialize)]
pub struct BookingPage {
    pub bookings: Vec<booking::Model>,
    pub page: u64,
    pub num_pages: u64,
    pub page_size: u64,
    pub filter_program_id: Option<i32>,
    pub filter_ride_date: Option<NaiveDate>,
    pub stats: BookingStats,
}

/// One page of bookings, newest first, with statistics over the whole
/// filtered set.
pub async fn list_bookings(
    db: &DatabaseConnection,
    filter: BookingFilter,
    raw_page: Option<&str>,
    page_size: u64,
) -> AppResult<BookingPage> {
    let page_size = page_size.max(1);

    let rows: Vec<(Decimal, NaiveDate)> = filter
        .apply(booking::Entity::find())
        .select_only()
        .column(booking::Column::TotalAmount)
        .column(booking::Column::RideDate)
        .into_tuple()
        .all(db)
        .await?;
    let stats = summarize(&rows, Local::now().date_naive());

    let paginator = filter
        .apply(booking::Entity::find())
        .order_by_desc(booking::Column::CreatedAt)
        .order_by_desc(booking::Column::Id)
        .paginate(db, page_size);
    let num_pages = paginator.num_pages().await?.max(1);
    let page = resolve_page(raw_page, num_pages);
    let bookings = paginator.fetch_page(page - 1).await?;

    tracing::debug!(
        program_id = ?filter.program_id,
        ride_date = ?filter.ride_date,
        page,
        num_pages,
        matched = stats.booking_count,
        "Bookings listed"
    );

    Ok(BookingPage {
        bookings,
        page,
        num_pages,
        page_size,
        filter_program_id: filter.program_id,
        filter_ride_date: filter.ride_date,
        stats,
    })
}
