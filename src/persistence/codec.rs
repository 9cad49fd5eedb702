//! Snapshot codec: serialize, deserialize, migrate, and sanitize imports.
//!
//! Two decoding paths exist:
//!
//! - [`deserialize`] is for documents this service wrote itself. After
//!   [`migrate`] fills in missing fields the document must match
//!   [`SnapshotDocument`] exactly; anything else is a [`PickerError::Parse`].
//! - [`sanitize_import`] is for user-supplied files. It walks the JSON
//!   leniently, rebuilds every key, and drops whatever does not fit instead
//!   of failing. Only non-JSON input and unsupported versions are errors.

use std::collections::{BTreeSet, HashMap, HashSet};

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use super::document::{SCHEMA_VERSION, SettingsRecord, SnapshotDocument};
use crate::domain::snapshot::spin_duration_in_range;
use crate::domain::{
    DEFAULT_CLASS_ID, HISTORY_LIMIT, HistoryEntry, MotionMode, Name, NameKey, Settings, Snapshot,
    Theme, normalize_whitespace,
};
use crate::error::PickerError;

/// Oldest schema version [`migrate`] can bring up to date.
pub const MIN_SUPPORTED_VERSION: u32 = 1;

/// Encodes `snapshot` as a pretty-printed JSON document.
///
/// # Errors
///
/// Returns [`PickerError::Internal`] if JSON encoding fails.
pub fn serialize(snapshot: &Snapshot) -> Result<String, PickerError> {
    serde_json::to_string_pretty(&SnapshotDocument::from(snapshot))
        .map_err(|e| PickerError::Internal(format!("encoding snapshot: {e}")))
}

/// Decodes a locally saved document.
///
/// # Errors
///
/// - [`PickerError::Parse`] if the text is not JSON, not an object, or does
///   not match the document shape after migration.
/// - [`PickerError::Version`] if the schema version is unsupported.
pub fn deserialize(text: &str) -> Result<Snapshot, PickerError> {
    let value = migrate(serde_json::from_str(text)?)?;
    let document: SnapshotDocument = serde_json::from_value(value)?;
    let mut snapshot = Snapshot::from(document);
    snapshot.history.truncate(HISTORY_LIMIT);
    Ok(snapshot)
}

/// Brings a document up to [`SCHEMA_VERSION`].
///
/// Version 1 is current, so this only supplies defaults for missing top
/// level fields and replaces invalid settings values with their defaults.
/// Older schema versions get their upgrade steps here.
///
/// # Errors
///
/// - [`PickerError::Parse`] if `document` is not a JSON object.
/// - [`PickerError::Version`] if the version cannot be migrated.
pub fn migrate(document: Value) -> Result<Value, PickerError> {
    let Value::Object(mut object) = document else {
        return Err(PickerError::Parse(
            "document must be a JSON object".to_string(),
        ));
    };
    let version = document_version(&object)?;
    if version != SCHEMA_VERSION {
        // no upgrade steps exist yet between supported versions
        tracing::debug!(from = version, to = SCHEMA_VERSION, "migrating document");
    }

    let class_id = class_identifier(&object);
    object.insert("version".into(), Value::from(SCHEMA_VERSION));
    object.insert("classIdentifier".into(), Value::String(class_id));
    for field in ["names", "absentKeys", "history"] {
        object
            .entry(field)
            .or_insert_with(|| Value::Array(Vec::new()));
    }
    let settings = SettingsRecord::from(settings_from_value(object.get("settings")));
    object.insert("settings".into(), serde_json::to_value(settings)?);

    Ok(Value::Object(object))
}

/// Decodes an untrusted, user-supplied document.
///
/// - Names are rebuilt from their raw text; blank entries and entries whose
///   key collides with an earlier one are dropped.
/// - Absence keys and history entries survive only if they reference a kept
///   name. A supplied key that differs from the rebuilt one still resolves
///   to the rebuilt name.
/// - History entries need a parseable timestamp; missing or duplicate ids
///   are regenerated; the list is ordered newest first and capped.
/// - Settings are defaulted per field.
///
/// # Errors
///
/// - [`PickerError::Parse`] if the text is not a JSON object.
/// - [`PickerError::Version`] if the schema version is unsupported.
pub fn sanitize_import(text: &str) -> Result<Snapshot, PickerError> {
    let value: Value = serde_json::from_str(text)?;
    let Value::Object(object) = value else {
        return Err(PickerError::Parse(
            "document must be a JSON object".to_string(),
        ));
    };
    document_version(&object)?;

    let roster = sanitize_names(object.get("names"));
    let absent: BTreeSet<NameKey> = object
        .get("absentKeys")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(|v| v.as_str().and_then(|s| roster.resolve(s)))
        .collect();
    let history = sanitize_history(object.get("history"), &roster);
    let settings = settings_from_value(object.get("settings"));

    tracing::debug!(
        names = roster.names.len(),
        dropped = roster.dropped,
        absent = absent.len(),
        history = history.len(),
        "sanitized imported document"
    );

    Ok(Snapshot {
        class_id: class_identifier(&object),
        names: roster.names,
        absent,
        history,
        settings,
    })
}

/// Reads the schema version. A document without one predates versioning
/// and is treated as version 1.
fn document_version(object: &Map<String, Value>) -> Result<u32, PickerError> {
    let raw = match object.get("version") {
        None | Some(Value::Null) => return Ok(MIN_SUPPORTED_VERSION),
        Some(raw) => raw,
    };
    raw.as_u64()
        .and_then(|v| u32::try_from(v).ok())
        .filter(|v| (MIN_SUPPORTED_VERSION..=SCHEMA_VERSION).contains(v))
        .ok_or_else(|| PickerError::Version {
            found: raw.to_string(),
        })
}

fn class_identifier(object: &Map<String, Value>) -> String {
    object
        .get("classIdentifier")
        .and_then(Value::as_str)
        .map(normalize_whitespace)
        .filter(|id| !id.is_empty())
        .unwrap_or_else(|| DEFAULT_CLASS_ID.to_string())
}

/// Reads settings field by field, substituting the default for anything
/// missing or out of range.
fn settings_from_value(value: Option<&Value>) -> Settings {
    let defaults = Settings::default();
    let Some(object) = value.and_then(Value::as_object) else {
        return defaults;
    };

    let spin_duration_ms = object
        .get("spinMs")
        .or_else(|| object.get("spinDurationMs"))
        .and_then(integral)
        .and_then(|ms| u32::try_from(ms).ok())
        .filter(|&ms| spin_duration_in_range(ms))
        .unwrap_or_else(|| {
            tracing::debug!("spin duration missing or invalid, using default");
            defaults.spin_duration_ms
        });
    let reduced_motion = object
        .get("reducedMotionMode")
        .and_then(Value::as_str)
        .and_then(|s| s.parse::<MotionMode>().ok())
        .unwrap_or(defaults.reduced_motion);
    let theme = object
        .get("theme")
        .and_then(Value::as_str)
        .and_then(|s| s.parse::<Theme>().ok())
        .unwrap_or(defaults.theme);

    Settings {
        spin_duration_ms,
        reduced_motion,
        theme,
    }
}

/// Accepts `5000` and `5000.0`, rejects fractions and negatives.
fn integral(value: &Value) -> Option<u64> {
    value.as_u64().or_else(|| {
        value
            .as_f64()
            .filter(|f| f.fract() == 0.0 && *f >= 0.0 && *f <= u32::MAX as f64)
            .map(|f| f as u64)
    })
}

/// Names accepted from an import, plus how to resolve keys that referenced
/// them in the source file.
#[derive(Debug, Default)]
struct SanitizedRoster {
    names: Vec<Name>,
    keys: HashSet<NameKey>,
    aliases: HashMap<String, NameKey>,
    dropped: usize,
}

impl SanitizedRoster {
    fn resolve(&self, key: &str) -> Option<NameKey> {
        let candidate = NameKey::from_derived(key);
        if self.keys.contains(&candidate) {
            return Some(candidate);
        }
        self.aliases.get(key).cloned()
    }
}

fn sanitize_names(value: Option<&Value>) -> SanitizedRoster {
    let mut roster = SanitizedRoster::default();
    for item in value.and_then(Value::as_array).into_iter().flatten() {
        let (raw, supplied_key) = match item {
            Value::String(raw) => (Some(raw.as_str()), None),
            Value::Object(fields) => (
                fields.get("raw").and_then(Value::as_str),
                fields.get("key").and_then(Value::as_str),
            ),
            _ => (None, None),
        };
        let Some(name) = raw.and_then(Name::parse) else {
            roster.dropped += 1;
            continue;
        };
        if let Some(supplied) = supplied_key
            && supplied != name.key.as_str()
        {
            roster
                .aliases
                .entry(supplied.to_string())
                .or_insert_with(|| name.key.clone());
        }
        if !roster.keys.insert(name.key.clone()) {
            roster.dropped += 1;
            continue;
        }
        roster.names.push(name);
    }
    roster
}

fn sanitize_history(value: Option<&Value>, roster: &SanitizedRoster) -> Vec<HistoryEntry> {
    let mut ids = HashSet::new();
    let mut history: Vec<HistoryEntry> = value
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(Value::as_object)
        .filter_map(|fields| {
            let key = fields
                .get("key")
                .and_then(Value::as_str)
                .and_then(|k| roster.resolve(k))?;
            let timestamp = fields.get("ts").and_then(parse_timestamp)?;
            let id = fields
                .get("id")
                .and_then(Value::as_str)
                .filter(|id| !id.trim().is_empty())
                .map(str::to_string)
                .filter(|id| !ids.contains(id))
                .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
            ids.insert(id.clone());
            Some(HistoryEntry { key, timestamp, id })
        })
        .collect();

    history.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    history.truncate(HISTORY_LIMIT);
    history
}

/// Accepts RFC 3339 strings and epoch milliseconds.
fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => DateTime::parse_from_rfc3339(s.trim())
            .ok()
            .map(|ts| ts.with_timezone(&Utc)),
        Value::Number(n) => n.as_i64().and_then(DateTime::from_timestamp_millis),
        _ => None,
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::domain::merge_names;

    fn key(s: &str) -> NameKey {
        NameKey::from_derived(s)
    }

    fn sample_snapshot() -> Snapshot {
        let mut snapshot = Snapshot::empty("4.A");
        snapshot.names = merge_names(&[], ["Anna Nováková", "Bořek", "Cyril"]);
        snapshot.absent.insert(key("borek"));
        for k in ["cyril", "anna-novakova"] {
            snapshot.history.insert(0, HistoryEntry::now(key(k)));
        }
        snapshot.settings = Settings {
            spin_duration_ms: 2_500,
            reduced_motion: MotionMode::Off,
            theme: Theme::Dark,
        };
        snapshot
    }

    fn import(value: &Value) -> Result<Snapshot, PickerError> {
        sanitize_import(&value.to_string())
    }

    #[test]
    fn serialize_then_deserialize_round_trips() {
        let snapshot = sample_snapshot();
        let Ok(text) = serialize(&snapshot) else {
            panic!("serialize failed");
        };
        let Ok(decoded) = deserialize(&text) else {
            panic!("deserialize failed");
        };
        assert_eq!(decoded, snapshot);
    }

    #[test]
    fn round_trip_of_empty_snapshot() {
        let snapshot = Snapshot::default();
        let decoded = serialize(&snapshot).and_then(|text| deserialize(&text));
        assert!(matches!(decoded, Ok(s) if s == snapshot));
    }

    #[test]
    fn whitespace_heavy_class_identifier_round_trips() {
        let snapshot = Snapshot::empty("  5 \t  B\n");
        assert_eq!(snapshot.class_id, "5 B");
        let decoded = serialize(&snapshot).and_then(|text| deserialize(&text));
        assert!(matches!(decoded, Ok(s) if s == snapshot));
    }

    #[test]
    fn deserialize_rejects_malformed_syntax() {
        assert!(matches!(deserialize("{\"version\": 1,"), Err(PickerError::Parse(_))));
        assert!(matches!(deserialize("[1, 2]"), Err(PickerError::Parse(_))));
    }

    #[test]
    fn deserialize_rejects_wrong_shape() {
        let doc = json!({ "version": 1, "names": [{ "raw": 7 }] });
        assert!(matches!(
            deserialize(&doc.to_string()),
            Err(PickerError::Parse(_))
        ));
    }

    #[test]
    fn deserialize_defaults_missing_fields_and_bad_settings() {
        let doc = json!({
            "version": 1,
            "names": [{ "raw": "Ada", "key": "ada" }],
            "settings": { "spinMs": 99_999, "theme": "light" }
        });
        let Ok(snapshot) = deserialize(&doc.to_string()) else {
            panic!("deserialize failed");
        };
        assert_eq!(snapshot.class_id, DEFAULT_CLASS_ID);
        assert_eq!(snapshot.names.len(), 1);
        assert!(snapshot.absent.is_empty());
        assert!(snapshot.history.is_empty());
        assert_eq!(snapshot.settings.spin_duration_ms, 5_000);
        assert_eq!(snapshot.settings.theme, Theme::Light);
        assert_eq!(snapshot.settings.reduced_motion, MotionMode::Auto);
    }

    #[test]
    fn unsupported_versions_are_rejected() {
        for version in [json!(0), json!(2), json!(-1), json!("1"), json!(1.5)] {
            let doc = json!({ "version": version, "names": [] });
            assert!(
                matches!(import(&doc), Err(PickerError::Version { .. })),
                "import accepted version {version}"
            );
            assert!(
                matches!(deserialize(&doc.to_string()), Err(PickerError::Version { .. })),
                "load accepted version {version}"
            );
        }
    }

    #[test]
    fn version_zero_error_names_the_version() {
        let doc = json!({ "version": 0 });
        let Err(err) = import(&doc) else {
            panic!("version 0 must fail");
        };
        assert_eq!(err.to_string(), "unsupported schema version 0");
    }

    #[test]
    fn missing_version_is_treated_as_first_version() {
        let doc = json!({ "names": ["Ada"] });
        let Ok(snapshot) = import(&doc) else {
            panic!("import failed");
        };
        assert_eq!(snapshot.names.len(), 1);
    }

    #[test]
    fn migrate_fills_current_shape() {
        let Ok(migrated) = migrate(json!({})) else {
            panic!("migrate failed");
        };
        assert_eq!(migrated["version"], SCHEMA_VERSION);
        assert_eq!(migrated["classIdentifier"], DEFAULT_CLASS_ID);
        assert_eq!(migrated["names"], json!([]));
        assert_eq!(migrated["settings"]["spinMs"], 5_000);
        assert!(matches!(migrate(json!("text")), Err(PickerError::Parse(_))));
    }

    #[test]
    fn import_rebuilds_keys_and_drops_blank_and_colliding_names() {
        let doc = json!({
            "version": 1,
            "names": [
                { "raw": "Anna  Nováková", "key": "whatever" },
                { "raw": "anna novakova" },
                { "raw": "   " },
                { "key": "no-raw" },
                "Petr",
                42,
                { "raw": "Olga", "key": "olga", "extra": true }
            ]
        });
        let Ok(snapshot) = import(&doc) else {
            panic!("import failed");
        };
        let names: Vec<(&str, &str)> = snapshot
            .names
            .iter()
            .map(|n| (n.raw.as_str(), n.key.as_str()))
            .collect();
        assert_eq!(
            names,
            [
                ("Anna Nováková", "anna-novakova"),
                ("Petr", "petr"),
                ("Olga", "olga")
            ]
        );
    }

    #[test]
    fn import_filters_absence_and_follows_aliases() {
        let doc = json!({
            "version": 1,
            "names": [
                { "raw": "Ada", "key": "ada" },
                { "raw": "Bea", "key": "legacy-bea-key" }
            ],
            "absentKeys": ["ada", "legacy-bea-key", "ghost", 17]
        });
        let Ok(snapshot) = import(&doc) else {
            panic!("import failed");
        };
        let absent: Vec<&str> = snapshot.absent.iter().map(NameKey::as_str).collect();
        assert_eq!(absent, ["ada", "bea"]);
    }

    #[test]
    fn import_filters_sorts_and_caps_history() {
        let mut history = vec![
            json!({ "key": "ada", "ts": "not a date", "id": "bad-ts" }),
            json!({ "key": "ghost", "ts": "2024-01-01T08:00:00Z", "id": "bad-key" }),
            json!({ "key": "ada", "ts": "2024-01-01T08:00:00Z" }),
            json!({ "key": "ada", "ts": 1_704_103_200_000_i64, "id": "epoch" }),
        ];
        for minute in 0..30 {
            history.push(json!({
                "key": "ada",
                "ts": format!("2024-02-01T09:{minute:02}:00+01:00"),
                "id": format!("m{minute}")
            }));
        }
        let doc = json!({
            "version": 1,
            "names": [{ "raw": "Ada" }],
            "history": history
        });
        let Ok(snapshot) = import(&doc) else {
            panic!("import failed");
        };

        assert_eq!(snapshot.history.len(), HISTORY_LIMIT);
        assert_eq!(snapshot.history.first().map(|e| e.id.as_str()), Some("m29"));
        assert!(
            snapshot
                .history
                .windows(2)
                .all(|pair| matches!(pair, [a, b] if a.timestamp >= b.timestamp))
        );
        assert!(snapshot.history.iter().all(|e| e.key.as_str() == "ada"));
        assert!(snapshot.history.iter().all(|e| e.id != "bad-ts" && e.id != "bad-key"));
    }

    #[test]
    fn import_assigns_missing_and_duplicate_ids() {
        let doc = json!({
            "version": 1,
            "names": ["Ada"],
            "history": [
                { "key": "ada", "ts": "2024-01-01T08:00:00Z", "id": "same" },
                { "key": "ada", "ts": "2024-01-01T07:00:00Z", "id": "same" },
                { "key": "ada", "ts": "2024-01-01T06:00:00Z" }
            ]
        });
        let Ok(snapshot) = import(&doc) else {
            panic!("import failed");
        };
        let ids: HashSet<&str> = snapshot.history.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(snapshot.history.len(), 3);
        assert_eq!(ids.len(), 3);
        assert!(ids.contains("same"));
    }

    #[test]
    fn import_defaults_settings_per_field() {
        let doc = json!({
            "version": 1,
            "settings": { "spinMs": 400, "reducedMotionMode": "on", "theme": "neon" }
        });
        let Ok(snapshot) = import(&doc) else {
            panic!("import failed");
        };
        assert_eq!(
            snapshot.settings,
            Settings {
                spin_duration_ms: 5_000,
                reduced_motion: MotionMode::On,
                theme: Theme::Auto,
            }
        );
    }

    #[test]
    fn import_tolerates_garbage_fields() {
        let doc = json!({
            "version": 1,
            "classIdentifier": 12,
            "names": "everyone",
            "absentKeys": { "a": 1 },
            "history": [null, 3, "x"],
            "settings": [],
            "unexpected": { "nested": true }
        });
        let Ok(snapshot) = import(&doc) else {
            panic!("import failed");
        };
        assert_eq!(snapshot, Snapshot::default());
    }

    #[test]
    fn import_rejects_non_object_documents() {
        assert!(matches!(sanitize_import("[]"), Err(PickerError::Parse(_))));
        assert!(matches!(sanitize_import("nope"), Err(PickerError::Parse(_))));
        assert!(matches!(sanitize_import(""), Err(PickerError::Parse(_))));
    }

    #[test]
    fn exported_document_imports_cleanly() {
        let snapshot = sample_snapshot();
        let Ok(text) = serialize(&snapshot) else {
            panic!("serialize failed");
        };
        let Ok(imported) = sanitize_import(&text) else {
            panic!("import failed");
        };
        assert_eq!(imported, snapshot);
    }
}
