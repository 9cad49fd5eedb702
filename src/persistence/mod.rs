//! Persistence layer: document codec and local file storage.
//!
//! Snapshots are stored as versioned JSON documents, one per class, in a
//! local data directory. [`codec`] converts between documents and
//! snapshots (including the defensive import path), [`FileStore`] reads and
//! writes them, and [`PersistenceWriter`] saves store changes in the
//! background.

pub mod codec;
pub mod document;
pub mod file_store;
pub mod writer;

pub use codec::{deserialize, migrate, sanitize_import, serialize};
pub use document::{HistoryRecord, SCHEMA_VERSION, SettingsRecord, SnapshotDocument};
pub use file_store::FileStore;
pub use writer::PersistenceWriter;
