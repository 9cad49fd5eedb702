//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::domain::{EventBus, OsRandomSource, PickerEvent, Snapshot, StateStore, SubscriptionId};
use crate::ocr::OcrClient;
use crate::persistence::FileStore;
use crate::service::{BroadcastRenderer, DrawController, DrawGate, PickerService};

/// The draw controller used by the running service.
pub type LiveDrawController = DrawController<OsRandomSource, BroadcastRenderer>;

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Picker service for all editing actions.
    pub picker_service: Arc<PickerService>,
    /// Draw controller for draw and stop requests.
    pub draw_controller: Arc<LiveDrawController>,
    /// Event bus for WebSocket subscriptions.
    pub event_bus: EventBus,
}

impl AppState {
    /// Wires the store, services and event bus together.
    ///
    /// Every committed store mutation is republished on `event_bus` as a
    /// [`PickerEvent::StateChanged`]. `ocr` is `None` when recognition is
    /// disabled.
    #[must_use]
    pub fn new(
        store: Arc<StateStore>,
        files: FileStore,
        ocr: Option<OcrClient>,
        event_bus: EventBus,
    ) -> Self {
        publish_state_changes(&store, event_bus.clone());

        let gate = DrawGate::new();
        let draw_controller = Arc::new(DrawController::new(
            Arc::clone(&store),
            OsRandomSource::new(),
            BroadcastRenderer::new(event_bus.clone(), gate.clone()),
            gate.clone(),
            event_bus.clone(),
        ));
        let picker_service = Arc::new(PickerService::new(store, files, gate, ocr));

        Self {
            picker_service,
            draw_controller,
            event_bus,
        }
    }

    /// Returns the shared store.
    #[must_use]
    pub fn store(&self) -> &Arc<StateStore> {
        self.picker_service.store()
    }

    /// Current state.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        self.picker_service.snapshot()
    }
}

/// Subscribes a listener that republishes every snapshot on `bus`.
pub fn publish_state_changes(store: &StateStore, bus: EventBus) -> SubscriptionId {
    store.subscribe(move |snapshot| {
        let _ = bus.publish(PickerEvent::state_changed(snapshot));
    })
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn store_mutations_reach_the_event_bus() {
        let Ok(dir) = tempfile::tempdir() else {
            panic!("tempdir failed");
        };
        let bus = EventBus::new(16);
        let mut rx = bus.subscribe();
        let state = AppState::new(
            Arc::new(StateStore::new(Snapshot::empty("4a"))),
            FileStore::new(dir.path()),
            None,
            bus,
        );

        // initial delivery on subscribe
        let Ok(first) = rx.recv().await else {
            panic!("expected initial state");
        };
        assert_eq!(first.event_type_str(), "state_changed");

        let _ = state.picker_service.add_names(["Ada"]);
        let Ok(PickerEvent::StateChanged { present_count, .. }) = rx.recv().await else {
            panic!("expected state_changed");
        };
        assert_eq!(present_count, 1);
    }
}
