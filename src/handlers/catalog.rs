use axum::{
    extract::{Path, State},
    Json,
};

use crate::error::AppResult;
use crate::services::catalog::{self, BookingForm, ProgramCard, ProgramDetail};
use crate::AppState;

/// List active programs with prices and cover image
pub async fn list_programs(State(state): State<AppState>) -> AppResult<Json<Vec<ProgramCard>>> {
    Ok(Json(catalog::list_program_cards(&state.db).await?))
}

pub async fn get_program(
    State(state): State<AppState>,
    Path(program_id): Path<i32>,
) -> AppResult<Json<ProgramDetail>> {
    Ok(Json(catalog::program_detail(&state.db, program_id).await?))
}

/// Field names and prices needed to render the booking form
pub async fn booking_form(State(state): State<AppState>) -> AppResult<Json<BookingForm>> {
    Ok(Json(catalog::booking_form(&state.db).await?))
}
