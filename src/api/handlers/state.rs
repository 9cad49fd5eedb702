//! State handlers: read state, change settings, reset history.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::{delete, get, patch};
use axum::{Json, Router};

use super::state_json;
use crate::api::dto::StateResponse;
use crate::app_state::AppState;
use crate::domain::SettingsPatch;
use crate::error::{ErrorResponse, PickerError};

/// `GET /state` — Current roster, absences, history and settings.
#[utoipa::path(
    get,
    path = "/api/v1/state",
    tag = "State",
    summary = "Get current state",
    description = "Returns the active class document plus the names eligible for the next draw.",
    responses(
        (status = 200, description = "Current state", body = StateResponse),
    )
)]
pub async fn get_state(State(state): State<AppState>) -> impl IntoResponse {
    let snapshot = state.snapshot();
    state_json(&state, &snapshot)
}

/// `PATCH /settings` — Shallow-merge settings.
///
/// # Errors
///
/// Returns [`PickerError::DrawInProgress`] while a draw is running.
#[utoipa::path(
    patch,
    path = "/api/v1/settings",
    tag = "State",
    summary = "Change settings",
    description = "Updates only the provided fields. A spin duration outside 500..=10000 ms is ignored.",
    request_body = SettingsPatch,
    responses(
        (status = 200, description = "Updated state", body = StateResponse),
        (status = 409, description = "A draw is in progress", body = ErrorResponse),
    )
)]
pub async fn update_settings(
    State(state): State<AppState>,
    Json(patch): Json<SettingsPatch>,
) -> Result<impl IntoResponse, PickerError> {
    let snapshot = state.picker_service.update_settings(patch)?;
    Ok(state_json(&state, &snapshot))
}

/// `DELETE /history` — Forget all past draws.
///
/// # Errors
///
/// Returns [`PickerError::DrawInProgress`] while a draw is running.
#[utoipa::path(
    delete,
    path = "/api/v1/history",
    tag = "State",
    summary = "Reset history",
    responses(
        (status = 200, description = "Updated state", body = StateResponse),
        (status = 409, description = "A draw is in progress", body = ErrorResponse),
    )
)]
pub async fn reset_history(State(state): State<AppState>) -> Result<impl IntoResponse, PickerError> {
    let snapshot = state.picker_service.reset_history()?;
    Ok(state_json(&state, &snapshot))
}

/// State routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/state", get(get_state))
        .route("/settings", patch(update_settings))
        .route("/history", delete(reset_history))
}
