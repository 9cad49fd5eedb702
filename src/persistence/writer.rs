//! Background persistence of store changes.
//!
//! A store listener hands every committed snapshot to a writer task over an
//! unbounded channel. The task coalesces bursts down to the newest
//! snapshot of each class, skips snapshots identical to the last one
//! written, and saves the rest in order. A class switch inside a burst
//! therefore still flushes the final state of the class being left. Failures are logged and dropped: the in-memory store stays
//! authoritative for the session.

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::FileStore;
use crate::domain::{Snapshot, StateStore, SubscriptionId};

/// Handle to the running writer task.
#[derive(Debug)]
pub struct PersistenceWriter {
    subscription: SubscriptionId,
    task: JoinHandle<()>,
}

impl PersistenceWriter {
    /// Subscribes to `store` and starts saving its snapshots to `files`.
    ///
    /// `already_saved` is the snapshot known to be on disk (typically the
    /// one just loaded), so the initial delivery does not rewrite it.
    #[must_use]
    pub fn spawn(store: &StateStore, files: FileStore, already_saved: Option<Snapshot>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel::<Snapshot>();
        let subscription = store.subscribe(move |snapshot| {
            // closed only after the writer task ends
            let _ = tx.send(snapshot.clone());
        });
        let task = tokio::spawn(run(rx, files, already_saved));
        Self { subscription, task }
    }

    /// Detaches from `store` and waits for pending writes to finish.
    pub async fn shutdown(self, store: &StateStore) {
        store.unsubscribe(self.subscription);
        if let Err(e) = self.task.await {
            tracing::warn!(error = %e, "persistence writer ended abnormally");
        }
    }
}

async fn run(
    mut rx: mpsc::UnboundedReceiver<Snapshot>,
    files: FileStore,
    mut last_saved: Option<Snapshot>,
) {
    let mut last_class = last_saved.as_ref().map(|s| s.class_id.clone());

    while let Some(first) = rx.recv().await {
        let mut batch = vec![first];
        while let Ok(newer) = rx.try_recv() {
            match batch.last_mut() {
                Some(pending) if pending.class_id == newer.class_id => *pending = newer,
                _ => batch.push(newer),
            }
        }
        for snapshot in batch {
            persist(&files, snapshot, &mut last_saved, &mut last_class).await;
        }
    }
    tracing::debug!("persistence writer stopped");
}

async fn persist(
    files: &FileStore,
    snapshot: Snapshot,
    last_saved: &mut Option<Snapshot>,
    last_class: &mut Option<String>,
) {
    if last_saved.as_ref() == Some(&snapshot) {
        return;
    }

    match files.save(&snapshot).await {
        Ok(()) => {
            tracing::debug!(
                class_id = %snapshot.class_id,
                names = snapshot.names.len(),
                "snapshot saved"
            );
        }
        Err(e) => {
            tracing::warn!(class_id = %snapshot.class_id, error = %e, "failed to save snapshot");
            return;
        }
    }

    if last_class.as_deref() != Some(snapshot.class_id.as_str()) {
        if let Err(e) = files.save_last_class(&snapshot.class_id).await {
            tracing::warn!(error = %e, "failed to record last class");
        }
        *last_class = Some(snapshot.class_id.clone());
    }
    *last_saved = Some(snapshot);
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::merge_names;

    #[tokio::test]
    async fn saves_mutations_and_records_class() {
        let Ok(dir) = tempfile::tempdir() else {
            panic!("tempdir failed");
        };
        let files = FileStore::new(dir.path());
        let store = StateStore::new(Snapshot::empty("4a"));

        let writer = PersistenceWriter::spawn(&store, files.clone(), None);
        store.set_roster(merge_names(&[], ["Ada", "Bea"]));
        writer.shutdown(&store).await;

        let Ok(Some(saved)) = files.load("4a").await else {
            panic!("expected saved snapshot");
        };
        assert_eq!(saved, store.snapshot());
        assert_eq!(files.load_last_class().await.as_deref(), Some("4a"));
    }

    #[tokio::test]
    async fn class_switch_in_a_burst_flushes_the_class_being_left() {
        let Ok(dir) = tempfile::tempdir() else {
            panic!("tempdir failed");
        };
        let files = FileStore::new(dir.path());
        let store = StateStore::new(Snapshot::empty("4a"));

        let writer = PersistenceWriter::spawn(&store, files.clone(), None);
        store.set_roster(merge_names(&[], ["Ada", "Bea"]));
        store.replace_from_document(Snapshot::empty("5b"));
        writer.shutdown(&store).await;

        let Ok(Some(left)) = files.load("4a").await else {
            panic!("class 4a should be saved");
        };
        assert_eq!(left.names.len(), 2);
        let Ok(Some(current)) = files.load("5b").await else {
            panic!("class 5b should be saved");
        };
        assert_eq!(current, store.snapshot());
        assert_eq!(files.load_last_class().await.as_deref(), Some("5b"));
    }

    #[tokio::test]
    async fn unchanged_initial_snapshot_is_not_rewritten() {
        let Ok(dir) = tempfile::tempdir() else {
            panic!("tempdir failed");
        };
        let files = FileStore::new(dir.path());
        let snapshot = Snapshot::empty("4a");
        let store = StateStore::new(snapshot.clone());

        let writer = PersistenceWriter::spawn(&store, files.clone(), Some(snapshot));
        writer.shutdown(&store).await;

        assert!(matches!(files.load("4a").await, Ok(None)));
    }

    #[tokio::test]
    async fn save_failures_do_not_touch_the_store() {
        let Ok(dir) = tempfile::tempdir() else {
            panic!("tempdir failed");
        };
        // A regular file where the data directory should be.
        let blocked = dir.path().join("data");
        let _ = std::fs::write(&blocked, b"not a directory");
        let store = StateStore::new(Snapshot::empty("4a"));

        let writer = PersistenceWriter::spawn(&store, FileStore::new(&blocked), None);
        store.set_roster(merge_names(&[], ["Ada"]));
        writer.shutdown(&store).await;

        assert_eq!(store.snapshot().names.len(), 1);
    }
}
