//! Wheel rendering collaborator.
//!
//! The core decides the winner; the renderer only animates towards it and
//! reports when the wheel has landed. [`BroadcastRenderer`] is the
//! production implementation: it publishes wheel and spin events for the
//! browser and resolves once the spin time has passed.

use std::future::Future;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::Utc;
use tokio::sync::oneshot;

use super::draw_gate::DrawGate;
use crate::domain::{EventBus, Name, PickerEvent};

/// How long a reduced-motion reveal takes instead of a full spin.
pub const REDUCED_MOTION_SETTLE: Duration = Duration::from_millis(300);

/// Interface the draw controller uses to show a spin.
pub trait WheelRenderer: Send + Sync {
    /// Shows `names` on the wheel, in order.
    fn update_wheel(&self, names: &[Name]);

    /// Spins to wheel slot `index` and resolves with the name it landed on.
    ///
    /// Resolves early after [`WheelRenderer::stop_early`].
    fn spin_to(
        &self,
        index: usize,
        duration: Duration,
        reduced_motion: bool,
    ) -> impl Future<Output = Option<Name>> + Send;

    /// Makes a running spin land on its winner immediately. No-op when
    /// nothing is spinning.
    fn stop_early(&self);

    /// The renderer's own reduced-motion preference, consulted when the
    /// setting is `auto`.
    fn prefers_reduced_motion(&self) -> bool {
        false
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Renderer that streams the spin to browser clients over the event bus.
///
/// A stop requested on `gate` before the spin starts listening lands the
/// spin as soon as it starts.
#[derive(Debug)]
pub struct BroadcastRenderer {
    events: EventBus,
    gate: DrawGate,
    wheel: Mutex<Vec<Name>>,
    stop: Mutex<Option<oneshot::Sender<()>>>,
}

impl BroadcastRenderer {
    /// Creates a renderer publishing on `events`. `gate` is the one the
    /// draw controller holds.
    #[must_use]
    pub fn new(events: EventBus, gate: DrawGate) -> Self {
        Self {
            events,
            gate,
            wheel: Mutex::new(Vec::new()),
            stop: Mutex::new(None),
        }
    }

    fn publish_stopped(&self) {
        let _ = self.events.publish(PickerEvent::SpinStopped {
            timestamp: Utc::now(),
        });
    }
}

impl WheelRenderer for BroadcastRenderer {
    fn update_wheel(&self, names: &[Name]) {
        *lock(&self.wheel) = names.to_vec();
        let _ = self.events.publish(PickerEvent::WheelUpdated {
            names: names.to_vec(),
            timestamp: Utc::now(),
        });
    }

    fn spin_to(
        &self,
        index: usize,
        duration: Duration,
        reduced_motion: bool,
    ) -> impl Future<Output = Option<Name>> + Send {
        async move {
            let winner = lock(&self.wheel).get(index).cloned()?;
            let (stop_tx, stop_rx) = oneshot::channel();
            *lock(&self.stop) = Some(stop_tx);

            let _ = self.events.publish(PickerEvent::SpinStarted {
                index,
                winner: winner.clone(),
                duration_ms: u64::try_from(duration.as_millis()).unwrap_or(u64::MAX),
                reduced_motion,
                timestamp: Utc::now(),
            });

            let wait = if reduced_motion {
                REDUCED_MOTION_SETTLE.min(duration)
            } else {
                duration
            };
            // a stop requested before the sender was stored finds no one to
            // notify, so it is picked up from the gate instead
            if self.gate.stop_requested() && lock(&self.stop).take().is_some() {
                tracing::debug!(index, "spin stopped before it started");
                self.publish_stopped();
                return Some(winner);
            }
            tokio::select! {
                () = tokio::time::sleep(wait) => {}
                _ = stop_rx => {
                    tracing::debug!(index, "spin stopped early");
                }
            }
            let _ = lock(&self.stop).take();
            Some(winner)
        }
    }

    fn stop_early(&self) {
        let Some(stop) = lock(&self.stop).take() else {
            return;
        };
        if stop.send(()).is_ok() {
            self.publish_stopped();
        }
    }
}
