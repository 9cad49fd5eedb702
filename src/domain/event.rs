//! Domain events pushed to the browser renderer.
//!
//! Every committed store mutation emits [`PickerEvent::StateChanged`]
//! through the [`super::EventBus`]; the draw flow adds wheel and spin
//! events so the browser can animate the spin the core already decided.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Name, Snapshot};
use crate::persistence::{HistoryRecord, SnapshotDocument};

/// Subscription topic an event belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventTopic {
    /// Snapshot changes.
    State,
    /// Wheel and spin progress.
    Draw,
}

impl EventTopic {
    /// Parses a topic name as sent by WebSocket clients.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "state" => Some(Self::State),
            "draw" => Some(Self::Draw),
            _ => None,
        }
    }
}

/// Event emitted after a state mutation or during a draw.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum PickerEvent {
    /// The snapshot changed.
    StateChanged {
        /// Full snapshot in its document form.
        snapshot: SnapshotDocument,
        /// Number of names eligible for the next draw.
        present_count: usize,
        /// When the mutation was committed.
        timestamp: DateTime<Utc>,
    },

    /// The wheel should show these names.
    WheelUpdated {
        /// Present names, in wheel order.
        names: Vec<Name>,
        /// Event timestamp.
        timestamp: DateTime<Utc>,
    },

    /// A spin started towards a winner that is already chosen.
    SpinStarted {
        /// Wheel slot of the winner.
        index: usize,
        /// The chosen name.
        winner: Name,
        /// Spin duration in milliseconds.
        duration_ms: u64,
        /// Whether the renderer should skip the animation.
        reduced_motion: bool,
        /// Event timestamp.
        timestamp: DateTime<Utc>,
    },

    /// The running spin was told to land immediately.
    SpinStopped {
        /// Event timestamp.
        timestamp: DateTime<Utc>,
    },

    /// A draw resolved and was recorded.
    DrawCompleted {
        /// The recorded history entry.
        entry: HistoryRecord,
        /// Display text of the winner.
        raw: String,
        /// Event timestamp.
        timestamp: DateTime<Utc>,
    },
}

impl PickerEvent {
    /// Builds the [`PickerEvent::StateChanged`] event for `snapshot`.
    #[must_use]
    pub fn state_changed(snapshot: &Snapshot) -> Self {
        Self::StateChanged {
            snapshot: SnapshotDocument::from(snapshot),
            present_count: snapshot.present_names().len(),
            timestamp: Utc::now(),
        }
    }

    /// Returns the subscription topic of this event.
    #[must_use]
    pub const fn topic(&self) -> EventTopic {
        match self {
            Self::StateChanged { .. } => EventTopic::State,
            Self::WheelUpdated { .. }
            | Self::SpinStarted { .. }
            | Self::SpinStopped { .. }
            | Self::DrawCompleted { .. } => EventTopic::Draw,
        }
    }

    /// Returns the event type as a static string slice.
    #[must_use]
    pub const fn event_type_str(&self) -> &'static str {
        match self {
            Self::StateChanged { .. } => "state_changed",
            Self::WheelUpdated { .. } => "wheel_updated",
            Self::SpinStarted { .. } => "spin_started",
            Self::SpinStopped { .. } => "spin_stopped",
            Self::DrawCompleted { .. } => "draw_completed",
        }
    }
}
