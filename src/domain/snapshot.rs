//! The complete application state for one class.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{Name, NameKey, normalize_whitespace};

/// Maximum number of history entries kept, most recent first.
pub const HISTORY_LIMIT: usize = 20;

/// Shortest allowed spin, in milliseconds.
pub const MIN_SPIN_MS: u32 = 500;

/// Longest allowed spin, in milliseconds.
pub const MAX_SPIN_MS: u32 = 10_000;

/// Spin duration used when none (or an invalid one) is stored.
pub const DEFAULT_SPIN_MS: u32 = 5_000;

/// Class identifier used when nothing else is known.
pub const DEFAULT_CLASS_ID: &str = "default";

/// Whether the wheel animation should be replaced by an instant reveal.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum MotionMode {
    /// Follow the renderer's own preference (e.g. the OS setting).
    #[default]
    Auto,
    /// Always reduce motion.
    On,
    /// Never reduce motion.
    Off,
}

impl MotionMode {
    /// Returns the mode as its wire string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::On => "on",
            Self::Off => "off",
        }
    }
}

impl FromStr for MotionMode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "auto" => Ok(Self::Auto),
            "on" => Ok(Self::On),
            "off" => Ok(Self::Off),
            _ => Err(()),
        }
    }
}

impl fmt::Display for MotionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Colour theme of the picker UI.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    /// Follow the OS preference.
    #[default]
    Auto,
    /// Light theme.
    Light,
    /// Dark theme.
    Dark,
}

impl Theme {
    /// Returns the theme as its wire string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }
}

impl FromStr for Theme {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "auto" => Ok(Self::Auto),
            "light" => Ok(Self::Light),
            "dark" => Ok(Self::Dark),
            _ => Err(()),
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// User-adjustable picker settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settings {
    /// Spin duration in milliseconds, within `[MIN_SPIN_MS, MAX_SPIN_MS]`.
    pub spin_duration_ms: u32,
    /// Reduced-motion preference.
    pub reduced_motion: MotionMode,
    /// UI theme.
    pub theme: Theme,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            spin_duration_ms: DEFAULT_SPIN_MS,
            reduced_motion: MotionMode::Auto,
            theme: Theme::Auto,
        }
    }
}

/// Returns `true` if `ms` is an allowed spin duration.
#[must_use]
pub const fn spin_duration_in_range(ms: u32) -> bool {
    ms >= MIN_SPIN_MS && ms <= MAX_SPIN_MS
}

/// Partial settings update; `None` fields are left unchanged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SettingsPatch {
    /// New spin duration in milliseconds.
    #[serde(default, alias = "spinMs")]
    pub spin_duration_ms: Option<u32>,
    /// New reduced-motion preference.
    #[serde(default, alias = "reducedMotion")]
    pub reduced_motion_mode: Option<MotionMode>,
    /// New theme.
    #[serde(default)]
    pub theme: Option<Theme>,
}

/// One recorded draw.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    /// Key of the drawn name. May outlive the name itself.
    pub key: NameKey,
    /// When the draw resolved.
    pub timestamp: DateTime<Utc>,
    /// Unique entry identifier.
    pub id: String,
}

impl HistoryEntry {
    /// Creates an entry for `key` stamped with the current time and a
    /// fresh UUID v4 identifier.
    #[must_use]
    pub fn now(key: NameKey) -> Self {
        Self {
            key,
            timestamp: Utc::now(),
            id: uuid::Uuid::new_v4().to_string(),
        }
    }
}

/// Complete state for one class: roster, absences, history and settings.
///
/// The schema version lives on the persisted document, not here; a
/// `Snapshot` is always at the current version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    /// Class or group this roster belongs to.
    pub class_id: String,
    /// Ordered roster, keys unique.
    pub names: Vec<Name>,
    /// Keys of roster members excluded from draws.
    pub absent: BTreeSet<NameKey>,
    /// Draw history, most recent first, at most [`HISTORY_LIMIT`] entries.
    pub history: Vec<HistoryEntry>,
    /// Picker settings.
    pub settings: Settings,
}

impl Snapshot {
    /// Creates an empty snapshot for `class_id` with default settings.
    ///
    /// Whitespace in the identifier is collapsed the same way a saved
    /// document's identifier is read back.
    #[must_use]
    pub fn empty(class_id: impl Into<String>) -> Self {
        Self {
            class_id: normalize_whitespace(&class_id.into()),
            names: Vec::new(),
            absent: BTreeSet::new(),
            history: Vec::new(),
            settings: Settings::default(),
        }
    }

    /// Roster members not marked absent, in roster order.
    #[must_use]
    pub fn present_names(&self) -> Vec<Name> {
        self.names
            .iter()
            .filter(|name| !self.absent.contains(&name.key))
            .cloned()
            .collect()
    }

    /// Looks up a roster entry by key.
    #[must_use]
    pub fn find(&self, key: &NameKey) -> Option<&Name> {
        self.names.iter().find(|name| &name.key == key)
    }

    /// Display text for a history key, falling back to the raw key when the
    /// name has since been removed.
    #[must_use]
    pub fn display_name<'a>(&'a self, key: &'a NameKey) -> &'a str {
        self.find(key).map_or(key.as_str(), |name| name.raw.as_str())
    }

    /// Drops absence markers that no longer reference a roster entry.
    pub(crate) fn prune_absent(&mut self) {
        let names = &self.names;
        self.absent
            .retain(|key| names.iter().any(|name| &name.key == key));
    }
}

impl Default for Snapshot {
    fn default() -> Self {
        Self::empty(DEFAULT_CLASS_ID)
    }
}
