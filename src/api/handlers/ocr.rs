//! Text recognition handler.

use axum::body::Bytes;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};

use crate::api::dto::CandidatesResponse;
use crate::app_state::AppState;
use crate::error::{ErrorResponse, PickerError};

/// `POST /ocr` — Read candidate names from an image.
///
/// # Errors
///
/// - [`PickerError::OcrDisabled`] if recognition is turned off.
/// - [`PickerError::Validation`] for an empty body.
/// - [`PickerError::Recognition`] / [`PickerError::RecognitionTimeout`] if
///   the OCR worker fails.
#[utoipa::path(
    post,
    path = "/api/v1/ocr",
    tag = "OCR",
    summary = "Recognize names in an image",
    description = "Runs text recognition on the uploaded image and returns one candidate per line. The roster is not changed; add accepted candidates with `POST /api/v1/names`.",
    request_body(content = String, content_type = "application/octet-stream", description = "Raw image bytes"),
    responses(
        (status = 200, description = "Candidate names", body = CandidatesResponse),
        (status = 400, description = "Empty image", body = ErrorResponse),
        (status = 502, description = "Recognition failed", body = ErrorResponse),
        (status = 503, description = "Recognition disabled", body = ErrorResponse),
        (status = 504, description = "Recognition timed out", body = ErrorResponse),
    )
)]
pub async fn recognize(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<impl IntoResponse, PickerError> {
    let candidates = state.picker_service.recognize_names(body.to_vec()).await?;
    Ok(Json(CandidatesResponse { candidates }))
}

/// OCR routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/ocr", post(recognize))
}
