//! REST endpoint handlers organized by resource.

pub mod class;
pub mod draw;
pub mod ocr;
pub mod roster;
pub mod state;
pub mod system;

use axum::{Json, Router};

use crate::api::dto::StateResponse;
use crate::app_state::AppState;
use crate::domain::Snapshot;

/// Composes all resource routes under `/api/v1`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(state::routes())
        .merge(roster::routes())
        .merge(class::routes())
        .merge(draw::routes())
        .merge(ocr::routes())
}

/// Wraps `snapshot` in the standard state response.
pub(crate) fn state_json(state: &AppState, snapshot: &Snapshot) -> Json<StateResponse> {
    Json(StateResponse::new(
        snapshot,
        state.picker_service.gate().is_drawing(),
        state.picker_service.ocr_enabled(),
    ))
}
