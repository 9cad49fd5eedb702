//! Domain layer: names, keys, snapshot, state store, and event system.
//!
//! This module holds the draw/state core: key derivation, the name set
//! merger, the random source, the snapshot model, the [`StateStore`] that
//! owns it, and the event bus used to broadcast changes.

pub mod event;
pub mod event_bus;
pub mod key;
pub mod name;
pub mod random;
pub mod roster;
pub mod snapshot;
pub mod store;

pub use event::{EventTopic, PickerEvent};
pub use event_bus::EventBus;
pub use key::{derive_key, slugify};
pub use name::{Name, NameKey, normalize_whitespace};
pub use random::{OsRandomSource, RandomSource};
pub use roster::{merge_names, split_name_list};
pub use snapshot::{
    DEFAULT_CLASS_ID, DEFAULT_SPIN_MS, HISTORY_LIMIT, HistoryEntry, MAX_SPIN_MS, MIN_SPIN_MS,
    MotionMode, Settings, SettingsPatch, Snapshot, Theme,
};
pub use store::{StateStore, SubscriptionId};
