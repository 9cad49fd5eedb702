//! Wire shape of the persisted, exported and imported document.
//!
//! ```json
//! {
//!   "version": 1,
//!   "classIdentifier": "4a",
//!   "names": [{ "raw": "Anna Nováková", "key": "anna-novakova" }],
//!   "absentKeys": ["anna-novakova"],
//!   "history": [{ "key": "anna-novakova", "ts": "2024-03-01T08:15:00Z", "id": "…" }],
//!   "settings": { "spinMs": 5000, "reducedMotionMode": "auto", "theme": "auto" }
//! }
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{HistoryEntry, MotionMode, Name, NameKey, Settings, Snapshot, Theme};

/// Schema version written by this build.
pub const SCHEMA_VERSION: u32 = 1;

/// Persisted form of a [`Snapshot`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotDocument {
    /// Schema version.
    pub version: u32,
    /// Class or group identifier.
    pub class_identifier: String,
    /// Roster in display order.
    pub names: Vec<Name>,
    /// Keys of absent roster members.
    pub absent_keys: Vec<NameKey>,
    /// Draw history, most recent first.
    pub history: Vec<HistoryRecord>,
    /// Picker settings.
    pub settings: SettingsRecord,
}

/// Persisted form of a [`HistoryEntry`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct HistoryRecord {
    /// Key of the drawn name.
    pub key: NameKey,
    /// ISO-8601 timestamp of the draw.
    pub ts: DateTime<Utc>,
    /// Unique entry identifier.
    pub id: String,
}

/// Persisted form of [`Settings`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SettingsRecord {
    /// Spin duration in milliseconds.
    pub spin_ms: u32,
    /// Reduced-motion preference.
    pub reduced_motion_mode: MotionMode,
    /// UI theme.
    pub theme: Theme,
}

impl From<&Snapshot> for SnapshotDocument {
    fn from(snapshot: &Snapshot) -> Self {
        Self {
            version: SCHEMA_VERSION,
            class_identifier: snapshot.class_id.clone(),
            names: snapshot.names.clone(),
            absent_keys: snapshot.absent.iter().cloned().collect(),
            history: snapshot.history.iter().map(HistoryRecord::from).collect(),
            settings: SettingsRecord::from(snapshot.settings),
        }
    }
}

impl From<SnapshotDocument> for Snapshot {
    fn from(doc: SnapshotDocument) -> Self {
        Self {
            class_id: doc.class_identifier,
            names: doc.names,
            absent: doc.absent_keys.into_iter().collect(),
            history: doc.history.into_iter().map(HistoryEntry::from).collect(),
            settings: Settings::from(doc.settings),
        }
    }
}

impl From<&HistoryEntry> for HistoryRecord {
    fn from(entry: &HistoryEntry) -> Self {
        Self {
            key: entry.key.clone(),
            ts: entry.timestamp,
            id: entry.id.clone(),
        }
    }
}

impl From<HistoryRecord> for HistoryEntry {
    fn from(record: HistoryRecord) -> Self {
        Self {
            key: record.key,
            timestamp: record.ts,
            id: record.id,
        }
    }
}

impl From<Settings> for SettingsRecord {
    fn from(settings: Settings) -> Self {
        Self {
            spin_ms: settings.spin_duration_ms,
            reduced_motion_mode: settings.reduced_motion,
            theme: settings.theme,
        }
    }
}

impl From<SettingsRecord> for Settings {
    fn from(record: SettingsRecord) -> Self {
        Self {
            spin_duration_ms: record.spin_ms,
            reduced_motion: record.reduced_motion_mode,
            theme: record.theme,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::merge_names;

    #[test]
    fn document_uses_camel_case_wire_names() {
        let mut snapshot = Snapshot::empty("4a");
        snapshot.names = merge_names(&[], ["Ada"]);
        let json = serde_json::to_value(SnapshotDocument::from(&snapshot)).unwrap_or_default();

        assert_eq!(json["version"], 1);
        assert_eq!(json["classIdentifier"], "4a");
        assert_eq!(json["names"][0]["raw"], "Ada");
        assert_eq!(json["names"][0]["key"], "ada");
        assert!(json["absentKeys"].is_array());
        assert_eq!(json["settings"]["spinMs"], 5000);
        assert_eq!(json["settings"]["reducedMotionMode"], "auto");
        assert_eq!(json["settings"]["theme"], "auto");
    }

    #[test]
    fn history_record_uses_ts_field() {
        let entry = HistoryEntry::now(NameKey::from_derived("ada"));
        let json = serde_json::to_value(HistoryRecord::from(&entry)).unwrap_or_default();
        assert_eq!(json["key"], "ada");
        assert!(json["ts"].is_string());
        assert_eq!(json["id"], entry.id.as_str());
    }
}
