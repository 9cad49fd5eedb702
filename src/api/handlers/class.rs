//! Class handlers: switch class, list classes, import and export documents.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;
use axum::routing::{get, post, put};
use axum::{Json, Router};

use super::state_json;
use crate::api::dto::{ClassListResponse, ClassRequest, StateResponse};
use crate::app_state::AppState;
use crate::error::{ErrorResponse, PickerError};
use crate::persistence::SnapshotDocument;

/// `PUT /class` — Switch to another class.
///
/// # Errors
///
/// - [`PickerError::Validation`] for an unusable identifier.
/// - [`PickerError::DrawInProgress`] while a draw is running.
/// - [`PickerError::Parse`] / [`PickerError::Version`] if the saved
///   document for the class cannot be decoded.
#[utoipa::path(
    put,
    path = "/api/v1/class",
    tag = "Class",
    summary = "Switch class",
    description = "Loads the saved state for the class. A class with nothing saved starts empty and keeps the current settings.",
    request_body = ClassRequest,
    responses(
        (status = 200, description = "State of the new class", body = StateResponse),
        (status = 400, description = "Invalid class identifier or saved document", body = ErrorResponse),
        (status = 409, description = "A draw is in progress", body = ErrorResponse),
        (status = 422, description = "Saved document has an unsupported version", body = ErrorResponse),
    )
)]
pub async fn switch_class(
    State(state): State<AppState>,
    Json(req): Json<ClassRequest>,
) -> Result<impl IntoResponse, PickerError> {
    let snapshot = state
        .picker_service
        .switch_class(&req.class_identifier)
        .await?;
    Ok(state_json(&state, &snapshot))
}

/// `GET /classes` — List known classes.
///
/// # Errors
///
/// Returns [`PickerError::Storage`] if the data directory cannot be read.
#[utoipa::path(
    get,
    path = "/api/v1/classes",
    tag = "Class",
    summary = "List classes",
    responses(
        (status = 200, description = "Known classes", body = ClassListResponse),
        (status = 500, description = "Data directory unreadable", body = ErrorResponse),
    )
)]
pub async fn list_classes(State(state): State<AppState>) -> Result<impl IntoResponse, PickerError> {
    let classes = state.picker_service.list_classes().await?;
    Ok(Json(ClassListResponse {
        current: state.snapshot().class_id,
        classes,
    }))
}

/// `POST /import` — Replace the current state with an uploaded document.
///
/// # Errors
///
/// - [`PickerError::Parse`] if the body is not UTF-8 text holding a JSON
///   object.
/// - [`PickerError::Version`] if the document version is unsupported.
/// - [`PickerError::DrawInProgress`] while a draw is running.
#[utoipa::path(
    post,
    path = "/api/v1/import",
    tag = "Class",
    summary = "Import a document",
    description = "Sanitizes the uploaded document and replaces the current state with it. The active class identifier is kept. On error nothing changes.",
    request_body(content = SnapshotDocument, content_type = "application/json"),
    responses(
        (status = 200, description = "Imported state", body = StateResponse),
        (status = 400, description = "Malformed document", body = ErrorResponse),
        (status = 409, description = "A draw is in progress", body = ErrorResponse),
        (status = 422, description = "Unsupported schema version", body = ErrorResponse),
    )
)]
pub async fn import_document(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<impl IntoResponse, PickerError> {
    let text = std::str::from_utf8(&body)
        .map_err(|e| PickerError::Parse(format!("document is not valid UTF-8: {e}")))?;
    let snapshot = state.picker_service.import_document(text)?;
    Ok(state_json(&state, &snapshot))
}

/// `GET /export` — Download the current state as a document.
///
/// # Errors
///
/// Returns [`PickerError::Internal`] if encoding fails.
#[utoipa::path(
    get,
    path = "/api/v1/export",
    tag = "Class",
    summary = "Export the current document",
    description = "Returns the persisted document as an attachment named `<class-slug>-<YYYY-MM-DD>.json`.",
    responses(
        (status = 200, description = "Document attachment", body = SnapshotDocument, content_type = "application/json"),
    )
)]
pub async fn export_document(State(state): State<AppState>) -> Result<impl IntoResponse, PickerError> {
    let export = state.picker_service.export_document()?;
    let disposition = format!("attachment; filename=\"{}\"", export.file_name);
    Ok((
        [
            (header::CONTENT_TYPE, "application/json".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        export.body,
    ))
}

/// Class routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/class", put(switch_class))
        .route("/classes", get(list_classes))
        .route("/import", post(import_document))
        .route("/export", get(export_document))
}
