//! Draw orchestration: `Idle → Drawing → Idle`.
//!
//! A draw picks the winner up front from the present names, hands the
//! animation to the [`WheelRenderer`], keeps the [`DrawGate`] closed until
//! the wheel lands, then records the winner in the history.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;

use super::draw_gate::DrawGate;
use super::renderer::WheelRenderer;
use crate::domain::{
    EventBus, HistoryEntry, MotionMode, Name, PickerEvent, RandomSource, StateStore,
};
use crate::persistence::HistoryRecord;

/// Fewest present names for which a draw is meaningful.
pub const MIN_PRESENT_FOR_DRAW: usize = 2;

/// Draw controller state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawState {
    /// No draw running.
    Idle,
    /// A spin is in progress.
    Drawing,
}

/// A recorded draw.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrawResult {
    /// Position of the winner among the present names.
    pub index: usize,
    /// The drawn name.
    pub winner: Name,
    /// History entry recorded for the draw.
    pub entry: HistoryEntry,
}

/// Result of [`DrawController::draw`]. Only `Completed` changes state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DrawOutcome {
    /// The draw ran and was recorded.
    Completed(DrawResult),
    /// Fewer than [`MIN_PRESENT_FOR_DRAW`] names are present.
    NotEnoughNames {
        /// Names present at the time of the request.
        present: usize,
    },
    /// Another draw is still spinning.
    AlreadyDrawing,
}

/// Runs draws against a [`StateStore`].
#[derive(Debug)]
pub struct DrawController<R, W> {
    store: Arc<StateStore>,
    random: R,
    renderer: W,
    gate: DrawGate,
    events: EventBus,
}

impl<R: RandomSource, W: WheelRenderer> DrawController<R, W> {
    /// Creates a controller. `gate` should be shared with every service
    /// that edits the store.
    #[must_use]
    pub fn new(
        store: Arc<StateStore>,
        random: R,
        renderer: W,
        gate: DrawGate,
        events: EventBus,
    ) -> Self {
        Self {
            store,
            random,
            renderer,
            gate,
            events,
        }
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> DrawState {
        if self.gate.is_drawing() {
            DrawState::Drawing
        } else {
            DrawState::Idle
        }
    }

    /// Returns the renderer.
    #[must_use]
    pub fn renderer(&self) -> &W {
        &self.renderer
    }

    /// Runs one draw to completion.
    ///
    /// Returns without touching state when a draw is already running or
    /// fewer than [`MIN_PRESENT_FOR_DRAW`] names are present.
    pub async fn draw(&self) -> DrawOutcome {
        if self.gate.is_drawing() {
            return DrawOutcome::AlreadyDrawing;
        }
        let present = self.store.present_names();
        if present.len() < MIN_PRESENT_FOR_DRAW {
            tracing::debug!(present = present.len(), "not enough names to draw");
            return DrawOutcome::NotEnoughNames {
                present: present.len(),
            };
        }
        let Some(_permit) = self.gate.try_enter() else {
            return DrawOutcome::AlreadyDrawing;
        };

        let index = self.random.index(present.len());
        let Some(winner) = present.get(index).cloned() else {
            tracing::error!(index, present = present.len(), "random index out of range");
            return DrawOutcome::NotEnoughNames {
                present: present.len(),
            };
        };

        let settings = self.store.snapshot().settings;
        let reduced_motion = match settings.reduced_motion {
            MotionMode::On => true,
            MotionMode::Off => false,
            MotionMode::Auto => self.renderer.prefers_reduced_motion(),
        };
        let duration = Duration::from_millis(u64::from(settings.spin_duration_ms));

        tracing::info!(index, present = present.len(), reduced_motion, "draw started");
        self.renderer.update_wheel(&present);
        let landed = self.renderer.spin_to(index, duration, reduced_motion).await;
        if let Some(landed) = landed
            && landed.key != winner.key
        {
            tracing::warn!(
                chosen = %winner.key,
                landed = %landed.key,
                "renderer landed on a different name; keeping the chosen one"
            );
        }

        let entry = HistoryEntry::now(winner.key.clone());
        self.store.append_history(entry.clone());
        let _ = self.events.publish(PickerEvent::DrawCompleted {
            entry: HistoryRecord::from(&entry),
            raw: winner.raw.clone(),
            timestamp: Utc::now(),
        });
        tracing::info!(key = %winner.key, "draw completed");

        DrawOutcome::Completed(DrawResult {
            index,
            winner,
            entry,
        })
    }

    /// Asks a running spin to land immediately on its chosen winner.
    ///
    /// The request is recorded on the gate before the renderer is told, so
    /// a spin that has not started listening yet still sees it. Returns
    /// `false` when no draw is running.
    pub fn stop(&self) -> bool {
        if !self.gate.request_stop() {
            return false;
        }
        self.renderer.stop_early();
        true
    }
}
