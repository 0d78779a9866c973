use axum::{extract::State, http::StatusCode, Json};

use crate::error::AppResult;
use crate::services::contacts::{self, NewContact};
use crate::AppState;

/// Public contact form
pub async fn submit_contact(
    State(state): State<AppState>,
    Json(payload): Json<NewContact>,
) -> AppResult<(StatusCode, Json<serde_json::Value>)> {
    let contact = contacts::submit_contact(&state.db, &payload).await?;

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "id": contact.id,
            "message": "The message has been received",
        })),
    ))
}
