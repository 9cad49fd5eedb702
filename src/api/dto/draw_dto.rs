//! Draw request outcome DTOs.

use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::Name;
use crate::persistence::HistoryRecord;
use crate::service::DrawOutcome;

/// How a draw request ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum DrawStatus {
    /// A winner was drawn and recorded.
    Completed,
    /// Fewer than two names are present; nothing happened.
    NotEnoughNames,
    /// A draw was already spinning; nothing happened.
    AlreadyDrawing,
}

/// Response body for `POST /draw`.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DrawResponse {
    /// Outcome of the request.
    pub status: DrawStatus,
    /// The winner, for completed draws.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub winner: Option<Name>,
    /// Wheel slot of the winner, for completed draws.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
    /// History entry recorded for the draw.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry: Option<HistoryRecord>,
    /// Present names when too few were available.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub present_count: Option<usize>,
}

impl From<DrawOutcome> for DrawResponse {
    fn from(outcome: DrawOutcome) -> Self {
        let empty = |status| Self {
            status,
            winner: None,
            index: None,
            entry: None,
            present_count: None,
        };
        match outcome {
            DrawOutcome::Completed(result) => Self {
                status: DrawStatus::Completed,
                entry: Some(HistoryRecord::from(&result.entry)),
                winner: Some(result.winner),
                index: Some(result.index),
                present_count: None,
            },
            DrawOutcome::NotEnoughNames { present } => Self {
                present_count: Some(present),
                ..empty(DrawStatus::NotEnoughNames)
            },
            DrawOutcome::AlreadyDrawing => empty(DrawStatus::AlreadyDrawing),
        }
    }
}

/// Response body for `POST /draw/stop`.
#[derive(Debug, Clone, Copy, Serialize, ToSchema)]
pub struct StopResponse {
    /// `false` if no draw was running.
    pub stopped: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_enough_names_serializes_compactly() {
        let response = DrawResponse::from(DrawOutcome::NotEnoughNames { present: 1 });
        let json = serde_json::to_value(&response).unwrap_or_default();
        assert_eq!(
            json,
            serde_json::json!({"status": "not_enough_names", "present_count": 1})
        );
    }
}
