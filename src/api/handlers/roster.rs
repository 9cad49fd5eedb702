//! Roster and absence handlers.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::routing::{delete, post, put};
use axum::{Json, Router};

use super::state_json;
use crate::api::dto::{AbsenceRequest, AddNamesRequest, StateResponse};
use crate::app_state::AppState;
use crate::domain::NameKey;
use crate::error::{ErrorResponse, PickerError};

/// `POST /names` — Merge names into the roster.
///
/// # Errors
///
/// - [`PickerError::Validation`] if the body has neither `text` nor `names`.
/// - [`PickerError::DrawInProgress`] while a draw is running.
#[utoipa::path(
    post,
    path = "/api/v1/names",
    tag = "Roster",
    summary = "Add names",
    description = "Merges names into the roster. A name whose derived key already exists replaces that entry's display text in place; new keys are appended.",
    request_body = AddNamesRequest,
    responses(
        (status = 200, description = "Updated state", body = StateResponse),
        (status = 400, description = "Empty request", body = ErrorResponse),
        (status = 409, description = "A draw is in progress", body = ErrorResponse),
    )
)]
pub async fn add_names(
    State(state): State<AppState>,
    Json(req): Json<AddNamesRequest>,
) -> Result<impl IntoResponse, PickerError> {
    let raw = req.into_raw_names()?;
    let snapshot = state.picker_service.add_names(raw)?;
    Ok(state_json(&state, &snapshot))
}

/// `DELETE /names/{key}` — Remove one name.
///
/// # Errors
///
/// - [`PickerError::NameNotFound`] if no roster entry has the key.
/// - [`PickerError::DrawInProgress`] while a draw is running.
#[utoipa::path(
    delete,
    path = "/api/v1/names/{key}",
    tag = "Roster",
    summary = "Remove a name",
    params(
        ("key" = String, Path, description = "Derived name key"),
    ),
    responses(
        (status = 200, description = "Updated state", body = StateResponse),
        (status = 404, description = "Name not found", body = ErrorResponse),
        (status = 409, description = "A draw is in progress", body = ErrorResponse),
    )
)]
pub async fn remove_name(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<impl IntoResponse, PickerError> {
    let snapshot = state
        .picker_service
        .remove_name(&NameKey::from_derived(key))?;
    Ok(state_json(&state, &snapshot))
}

/// `DELETE /names` — Empty the roster.
///
/// # Errors
///
/// Returns [`PickerError::DrawInProgress`] while a draw is running.
#[utoipa::path(
    delete,
    path = "/api/v1/names",
    tag = "Roster",
    summary = "Clear the roster",
    responses(
        (status = 200, description = "Updated state", body = StateResponse),
        (status = 409, description = "A draw is in progress", body = ErrorResponse),
    )
)]
pub async fn clear_roster(State(state): State<AppState>) -> Result<impl IntoResponse, PickerError> {
    let snapshot = state.picker_service.clear_roster()?;
    Ok(state_json(&state, &snapshot))
}

/// `PUT /absence/{key}` — Mark a name absent or present.
///
/// # Errors
///
/// - [`PickerError::NameNotFound`] if no roster entry has the key.
/// - [`PickerError::DrawInProgress`] while a draw is running.
#[utoipa::path(
    put,
    path = "/api/v1/absence/{key}",
    tag = "Roster",
    summary = "Toggle absence",
    params(
        ("key" = String, Path, description = "Derived name key"),
    ),
    request_body = AbsenceRequest,
    responses(
        (status = 200, description = "Updated state", body = StateResponse),
        (status = 404, description = "Name not found", body = ErrorResponse),
        (status = 409, description = "A draw is in progress", body = ErrorResponse),
    )
)]
pub async fn set_absence(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Json(req): Json<AbsenceRequest>,
) -> Result<impl IntoResponse, PickerError> {
    let snapshot = state
        .picker_service
        .set_absent(&NameKey::from_derived(key), req.absent)?;
    Ok(state_json(&state, &snapshot))
}

/// `DELETE /absence` — Mark everyone present.
///
/// # Errors
///
/// Returns [`PickerError::DrawInProgress`] while a draw is running.
#[utoipa::path(
    delete,
    path = "/api/v1/absence",
    tag = "Roster",
    summary = "Clear absences",
    responses(
        (status = 200, description = "Updated state", body = StateResponse),
        (status = 409, description = "A draw is in progress", body = ErrorResponse),
    )
)]
pub async fn clear_absence(State(state): State<AppState>) -> Result<impl IntoResponse, PickerError> {
    let snapshot = state.picker_service.clear_absent()?;
    Ok(state_json(&state, &snapshot))
}

/// Roster routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/names", post(add_names).delete(clear_roster))
        .route("/names/{key}", delete(remove_name))
        .route("/absence", delete(clear_absence))
        .route("/absence/{key}", put(set_absence))
}
