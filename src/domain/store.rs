//! Single owner of the live [`Snapshot`].
//!
//! [`StateStore`] keeps the snapshot and the registered listeners behind
//! one [`Mutex`]. Every mutator applies its change completely, then calls
//! each listener once with the new snapshot before releasing the lock, so
//! listeners see mutations in commit order and never a half-applied state.
//!
//! Listeners run while the lock is held and must not call back into the
//! store.

use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::snapshot::{HISTORY_LIMIT, spin_duration_in_range};
use super::{HistoryEntry, Name, NameKey, SettingsPatch, Snapshot};

/// Callback invoked with the committed snapshot.
pub type Listener = Box<dyn Fn(&Snapshot) + Send + Sync>;

/// Handle returned by [`StateStore::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

struct Inner {
    snapshot: Snapshot,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_id: u64,
}

impl Inner {
    fn notify(&self) {
        for (_, listener) in &self.listeners {
            listener(&self.snapshot);
        }
    }
}

/// Source of truth for roster, absences, history and settings.
pub struct StateStore {
    inner: Mutex<Inner>,
}

impl fmt::Debug for StateStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.lock();
        f.debug_struct("StateStore")
            .field("snapshot", &inner.snapshot)
            .field("listeners", &inner.listeners.len())
            .finish()
    }
}

impl StateStore {
    /// Creates a store holding `snapshot`, with dangling absence markers
    /// already pruned.
    #[must_use]
    pub fn new(mut snapshot: Snapshot) -> Self {
        snapshot.prune_absent();
        Self {
            inner: Mutex::new(Inner {
                snapshot,
                listeners: Vec::new(),
                next_id: 0,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // A panicking listener leaves the snapshot itself consistent, since
        // listeners only run after the mutation is applied.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn mutate(&self, f: impl FnOnce(&mut Snapshot)) {
        let mut inner = self.lock();
        f(&mut inner.snapshot);
        inner.notify();
    }

    /// Registers `listener`, calls it immediately with the current snapshot,
    /// and then after every mutation. Listeners run in subscription order.
    pub fn subscribe<F>(&self, listener: F) -> SubscriptionId
    where
        F: Fn(&Snapshot) + Send + Sync + 'static,
    {
        let mut inner = self.lock();
        let id = SubscriptionId(inner.next_id);
        inner.next_id = inner.next_id.wrapping_add(1);
        listener(&inner.snapshot);
        inner.listeners.push((id, Box::new(listener)));
        id
    }

    /// Removes a listener. Returns `false` if it was not registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut inner = self.lock();
        let before = inner.listeners.len();
        inner.listeners.retain(|(existing, _)| *existing != id);
        inner.listeners.len() != before
    }

    /// Returns a copy of the current snapshot.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        self.lock().snapshot.clone()
    }

    /// Roster members not marked absent, as of the last committed mutation.
    #[must_use]
    pub fn present_names(&self) -> Vec<Name> {
        self.lock().snapshot.present_names()
    }

    /// Replaces the roster and prunes absence markers for removed names.
    pub fn set_roster(&self, names: Vec<Name>) {
        self.mutate(|snapshot| {
            snapshot.names = names;
            snapshot.prune_absent();
        });
    }

    /// Replaces the roster with `f(current roster)` under a single lock.
    ///
    /// Used for read-modify-write edits such as merging new names, so two
    /// concurrent edits cannot overwrite each other.
    pub fn update_roster<F>(&self, f: F)
    where
        F: FnOnce(&[Name]) -> Vec<Name>,
    {
        self.mutate(|snapshot| {
            snapshot.names = f(&snapshot.names);
            snapshot.prune_absent();
        });
    }

    /// Marks `key` absent or present. Idempotent.
    ///
    /// Marking a key that is not in the roster absent is ignored.
    pub fn set_absent(&self, key: &NameKey, absent: bool) {
        self.mutate(|snapshot| {
            if !absent {
                snapshot.absent.remove(key);
            } else if snapshot.find(key).is_some() {
                snapshot.absent.insert(key.clone());
            } else {
                tracing::debug!(%key, "ignoring absence for unknown key");
            }
        });
    }

    /// Marks everyone present.
    pub fn clear_absent(&self) {
        self.mutate(|snapshot| snapshot.absent.clear());
    }

    /// Prepends `entry` to the history, keeping at most
    /// [`HISTORY_LIMIT`] entries.
    pub fn append_history(&self, entry: HistoryEntry) {
        self.mutate(|snapshot| {
            snapshot.history.insert(0, entry);
            snapshot.history.truncate(HISTORY_LIMIT);
        });
    }

    /// Empties the draw history.
    pub fn reset_history(&self) {
        self.mutate(|snapshot| snapshot.history.clear());
    }

    /// Shallow-merges the provided settings fields.
    ///
    /// A spin duration outside the allowed range is ignored and the current
    /// value kept.
    pub fn update_settings(&self, patch: SettingsPatch) {
        self.mutate(|snapshot| {
            let settings = &mut snapshot.settings;
            if let Some(ms) = patch.spin_duration_ms {
                if spin_duration_in_range(ms) {
                    settings.spin_duration_ms = ms;
                } else {
                    tracing::debug!(spin_ms = ms, "ignoring out-of-range spin duration");
                }
            }
            if let Some(mode) = patch.reduced_motion_mode {
                settings.reduced_motion = mode;
            }
            if let Some(theme) = patch.theme {
                settings.theme = theme;
            }
        });
    }

    /// Replaces the whole snapshot, as after a load, import or class
    /// switch. Skips merge logic but still prunes dangling absence markers.
    pub fn replace_from_document(&self, mut snapshot: Snapshot) {
        snapshot.prune_absent();
        self.mutate(move |current| *current = snapshot);
    }
}

impl Default for StateStore {
    fn default() -> Self {
        Self::new(Snapshot::default())
    }
}
