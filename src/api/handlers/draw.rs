//! Draw handlers: start a draw, stop a running spin.

use std::sync::Arc;

use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};

use crate::api::dto::{DrawResponse, StopResponse};
use crate::app_state::AppState;
use crate::error::{ErrorResponse, PickerError};

/// `POST /draw` — Draw a random present name.
///
/// Responds once the wheel has landed. The draw runs on its own task, so a
/// client that disconnects mid-spin does not cancel the recording.
///
/// # Errors
///
/// Returns [`PickerError::Internal`] if the draw task fails.
#[utoipa::path(
    post,
    path = "/api/v1/draw",
    tag = "Draw",
    summary = "Draw a name",
    description = "Picks uniformly among present names, animates the wheel over the configured spin duration and records the winner. With fewer than two present names, or while a draw is spinning, nothing happens and `status` says why.",
    responses(
        (status = 200, description = "Draw outcome", body = DrawResponse),
        (status = 500, description = "Draw task failed", body = ErrorResponse),
    )
)]
pub async fn draw(State(state): State<AppState>) -> Result<impl IntoResponse, PickerError> {
    let controller = Arc::clone(&state.draw_controller);
    let outcome = tokio::spawn(async move { controller.draw().await })
        .await
        .map_err(|e| PickerError::Internal(format!("draw task failed: {e}")))?;
    Ok(Json(DrawResponse::from(outcome)))
}

/// `POST /draw/stop` — Land the running spin immediately.
#[utoipa::path(
    post,
    path = "/api/v1/draw/stop",
    tag = "Draw",
    summary = "Stop the spin early",
    description = "The wheel lands on the winner chosen when the draw started.",
    responses(
        (status = 200, description = "Whether a spin was stopped", body = StopResponse),
    )
)]
pub async fn stop_draw(State(state): State<AppState>) -> impl IntoResponse {
    Json(StopResponse {
        stopped: state.draw_controller.stop(),
    })
}

/// Draw routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/draw", post(draw))
        .route("/draw/stop", post(stop_draw))
}
