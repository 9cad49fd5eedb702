//! The flag that is closed while a draw is running.
//!
//! The draw controller holds a [`DrawPermit`] for the whole spin. Service
//! entry points that edit state check [`DrawGate::ensure_idle`] first and
//! refuse while a draw is running. That check only protects the UI; the
//! store keeps its own invariants either way.
//!
//! The gate also carries the stop request for the running draw, so a stop
//! that arrives before the renderer is listening is not lost, and one that
//! arrives after the draw ended does not leak into the next.

use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};

use crate::error::PickerError;

const IDLE: u8 = 0;
const DRAWING: u8 = 1;
const STOP_REQUESTED: u8 = 2;

/// Shared draw-in-progress flag.
#[derive(Debug, Clone)]
pub struct DrawGate {
    state: Arc<AtomicU8>,
}

impl Default for DrawGate {
    fn default() -> Self {
        Self {
            state: Arc::new(AtomicU8::new(IDLE)),
        }
    }
}

impl DrawGate {
    /// Creates an open gate.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` while a draw holds the gate.
    #[must_use]
    pub fn is_drawing(&self) -> bool {
        self.state.load(Ordering::Acquire) != IDLE
    }

    /// Closes the gate, or returns `None` if it is already closed.
    ///
    /// The gate reopens when the returned permit is dropped.
    #[must_use]
    pub fn try_enter(&self) -> Option<DrawPermit> {
        self.state
            .compare_exchange(IDLE, DRAWING, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| DrawPermit {
                state: Arc::clone(&self.state),
            })
    }

    /// Marks the running draw as asked to stop.
    ///
    /// Returns `false` when no draw is running.
    pub fn request_stop(&self) -> bool {
        match self.state.compare_exchange(
            DRAWING,
            STOP_REQUESTED,
            Ordering::AcqRel,
            Ordering::Acquire,
        ) {
            Ok(_) => true,
            Err(current) => current == STOP_REQUESTED,
        }
    }

    /// Returns `true` once the running draw has been asked to stop.
    #[must_use]
    pub fn stop_requested(&self) -> bool {
        self.state.load(Ordering::Acquire) == STOP_REQUESTED
    }

    /// Fails if a draw is running.
    ///
    /// # Errors
    ///
    /// Returns [`PickerError::DrawInProgress`] while the gate is closed.
    pub fn ensure_idle(&self) -> Result<(), PickerError> {
        if self.is_drawing() {
            return Err(PickerError::DrawInProgress);
        }
        Ok(())
    }
}

/// Proof that the holder is the one running draw.
#[derive(Debug)]
pub struct DrawPermit {
    state: Arc<AtomicU8>,
}

impl Drop for DrawPermit {
    fn drop(&mut self) {
        self.state.store(IDLE, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_one_permit_at_a_time() {
        let gate = DrawGate::new();
        let permit = gate.try_enter();
        assert!(permit.is_some());
        assert!(gate.is_drawing());
        assert!(gate.try_enter().is_none());
        assert!(matches!(gate.ensure_idle(), Err(PickerError::DrawInProgress)));

        drop(permit);
        assert!(!gate.is_drawing());
        assert!(gate.ensure_idle().is_ok());
        assert!(gate.try_enter().is_some());
    }

    #[test]
    fn clones_share_state() {
        let gate = DrawGate::new();
        let other = gate.clone();
        let _permit = gate.try_enter();
        assert!(other.is_drawing());
    }

    #[test]
    fn stop_request_lasts_for_the_running_draw_only() {
        let gate = DrawGate::new();
        assert!(!gate.request_stop());
        assert!(!gate.stop_requested());

        let permit = gate.try_enter();
        assert!(gate.request_stop());
        assert!(gate.request_stop());
        assert!(gate.stop_requested());
        assert!(gate.is_drawing());
        assert!(gate.try_enter().is_none());

        drop(permit);
        assert!(!gate.stop_requested());
        let _next = gate.try_enter();
        assert!(!gate.stop_requested());
    }
}
