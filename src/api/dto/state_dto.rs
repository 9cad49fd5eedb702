//! State DTOs returned by reads and by every editing endpoint.

use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::{Name, Snapshot};
use crate::persistence::SnapshotDocument;

/// Response body for `GET /state` and all state-changing endpoints.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct StateResponse {
    /// Full snapshot in its document form.
    pub snapshot: SnapshotDocument,
    /// Names eligible for the next draw, in wheel order.
    pub present: Vec<Name>,
    /// Number of present names.
    pub present_count: usize,
    /// Whether a draw is spinning right now.
    pub drawing: bool,
    /// Whether text recognition is available.
    pub ocr_enabled: bool,
}

impl StateResponse {
    /// Builds the response for `snapshot`.
    #[must_use]
    pub fn new(snapshot: &Snapshot, drawing: bool, ocr_enabled: bool) -> Self {
        let present = snapshot.present_names();
        Self {
            snapshot: SnapshotDocument::from(snapshot),
            present_count: present.len(),
            present,
            drawing,
            ocr_enabled,
        }
    }
}
