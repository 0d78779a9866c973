use std::collections::HashMap;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppResult;
use crate::services::bookings::{self, BookingDetail};
use crate::services::submission::{self, ProgramSelection, Submission};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct SubmitBookingRequest {
    #[serde(default)]
    pub fields: HashMap<String, String>,
    /// When present only these programs are read from `fields`
    pub active_programs: Option<Vec<String>>,
}

/// 201 with the new booking, or 422 with everything needed to redisplay the form
pub(crate) fn submission_response(submission: Submission) -> Response {
    match submission {
        Submission::Created(booking) => (
            StatusCode::CREATED,
            Json(serde_json::json!({
                "booking_id": booking.id,
                "total_amount": booking.total_amount,
            })),
        )
            .into_response(),
        Submission::Rejected(outcome) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(serde_json::json!({
                "errors": outcome.errors,
                "form_values": outcome.form_values,
                "quantities": outcome.quantities,
                "addon_quantities": outcome.addon_quantities,
                "active_program_ids": outcome.active_program_ids,
            })),
        )
            .into_response(),
    }
}

/// Public booking form submission
pub async fn submit_booking(
    State(state): State<AppState>,
    Json(payload): Json<SubmitBookingRequest>,
) -> AppResult<Response> {
    let selection = match payload.active_programs {
        Some(ids) => ProgramSelection::Selected(ids),
        None => ProgramSelection::AllPrograms,
    };

    let submission = submission::submit_booking(&state.db, &payload.fields, &selection).await?;
    Ok(submission_response(submission))
}

/// Booking confirmation
pub async fn get_booking(
    State(state): State<AppState>,
    Path(booking_id): Path<Uuid>,
) -> AppResult<Json<BookingDetail>> {
    Ok(Json(bookings::get_booking_detail(&state.db, booking_id).await?))
}
