//! Picker service: the entry points behind every UI action.

use std::sync::Arc;

use chrono::Utc;

use super::draw_gate::DrawGate;
use crate::domain::{
    Name, NameKey, SettingsPatch, Snapshot, StateStore, merge_names, normalize_whitespace, slugify,
    split_name_list,
};
use crate::error::PickerError;
use crate::ocr::{OcrClient, candidate_names};
use crate::persistence::{FileStore, sanitize_import, serialize};

/// An exported document ready to be sent as an attachment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedDocument {
    /// Suggested file name, `<class-slug>-<YYYY-MM-DD>.json`.
    pub file_name: String,
    /// Pretty-printed JSON document.
    pub body: String,
}

/// Orchestration layer for roster, absence, settings, class and OCR
/// actions.
///
/// Owns references to the [`StateStore`] for state, the [`FileStore`] for
/// class switching, and the [`DrawGate`] it shares with the draw
/// controller. Every mutation follows the same pattern: refuse while a draw
/// is running, validate, apply with a single store call, return the new
/// snapshot. Saving is left to the persistence writer subscribed to the
/// store.
#[derive(Debug, Clone)]
pub struct PickerService {
    store: Arc<StateStore>,
    files: FileStore,
    gate: DrawGate,
    ocr: Option<OcrClient>,
}

impl PickerService {
    /// Creates a new `PickerService`. `ocr` is `None` when recognition is
    /// disabled.
    #[must_use]
    pub fn new(
        store: Arc<StateStore>,
        files: FileStore,
        gate: DrawGate,
        ocr: Option<OcrClient>,
    ) -> Self {
        Self {
            store,
            files,
            gate,
            ocr,
        }
    }

    /// Loads the snapshot to start with: the last used class if one was
    /// recorded, otherwise `default_class`.
    ///
    /// Never fails. A missing or unreadable document starts the class from
    /// defaults, with the problem logged.
    pub async fn restore(files: &FileStore, default_class: &str) -> Snapshot {
        let class_id = match files.load_last_class().await {
            Some(class_id) => normalize_whitespace(&class_id),
            None => normalize_whitespace(default_class),
        };
        match files.load(&class_id).await {
            Ok(Some(snapshot)) => {
                tracing::info!(
                    class_id = %snapshot.class_id,
                    names = snapshot.names.len(),
                    history = snapshot.history.len(),
                    "restored saved class"
                );
                snapshot
            }
            Ok(None) => {
                tracing::info!(%class_id, "no saved data, starting empty");
                Snapshot::empty(class_id)
            }
            Err(e) => {
                tracing::warn!(%class_id, error = %e, "saved class unusable, starting from defaults");
                Snapshot::empty(class_id)
            }
        }
    }

    /// Returns the shared [`StateStore`].
    #[must_use]
    pub fn store(&self) -> &Arc<StateStore> {
        &self.store
    }

    /// Returns the shared [`DrawGate`].
    #[must_use]
    pub fn gate(&self) -> &DrawGate {
        &self.gate
    }

    /// Returns `true` if text recognition is available.
    #[must_use]
    pub fn ocr_enabled(&self) -> bool {
        self.ocr.is_some()
    }

    /// Current state.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        self.store.snapshot()
    }

    /// Merges `incoming` raw names into the roster.
    ///
    /// Blank entries are skipped; a name whose key already exists replaces
    /// that entry's display text in place.
    ///
    /// # Errors
    ///
    /// Returns [`PickerError::DrawInProgress`] while a draw is running.
    pub fn add_names<I, S>(&self, incoming: I) -> Result<Snapshot, PickerError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.gate.ensure_idle()?;
        let before = self.store.snapshot().names.len();
        self.store
            .update_roster(|existing| merge_names(existing, incoming));
        let snapshot = self.store.snapshot();
        tracing::info!(
            class_id = %snapshot.class_id,
            added = snapshot.names.len().saturating_sub(before),
            total = snapshot.names.len(),
            "names merged"
        );
        Ok(snapshot)
    }

    /// Splits pasted `text` on newlines, commas and semicolons and merges
    /// the pieces into the roster.
    ///
    /// # Errors
    ///
    /// Returns [`PickerError::DrawInProgress`] while a draw is running.
    pub fn add_name_text(&self, text: &str) -> Result<Snapshot, PickerError> {
        self.add_names(split_name_list(text))
    }

    /// Removes one name from the roster.
    ///
    /// # Errors
    ///
    /// - [`PickerError::DrawInProgress`] while a draw is running.
    /// - [`PickerError::NameNotFound`] if no roster entry has `key`.
    pub fn remove_name(&self, key: &NameKey) -> Result<Snapshot, PickerError> {
        self.gate.ensure_idle()?;
        self.require_name(key)?;
        self.store.update_roster(|existing| {
            existing
                .iter()
                .filter(|name| &name.key != key)
                .cloned()
                .collect()
        });
        tracing::info!(%key, "name removed");
        Ok(self.store.snapshot())
    }

    /// Empties the roster. Absence markers go with it; history stays.
    ///
    /// # Errors
    ///
    /// Returns [`PickerError::DrawInProgress`] while a draw is running.
    pub fn clear_roster(&self) -> Result<Snapshot, PickerError> {
        self.gate.ensure_idle()?;
        self.store.set_roster(Vec::new());
        tracing::info!("roster cleared");
        Ok(self.store.snapshot())
    }

    /// Marks a roster member absent or present.
    ///
    /// # Errors
    ///
    /// - [`PickerError::DrawInProgress`] while a draw is running.
    /// - [`PickerError::NameNotFound`] if no roster entry has `key`.
    pub fn set_absent(&self, key: &NameKey, absent: bool) -> Result<Snapshot, PickerError> {
        self.gate.ensure_idle()?;
        self.require_name(key)?;
        self.store.set_absent(key, absent);
        tracing::debug!(%key, absent, "absence changed");
        Ok(self.store.snapshot())
    }

    /// Marks everyone present.
    ///
    /// # Errors
    ///
    /// Returns [`PickerError::DrawInProgress`] while a draw is running.
    pub fn clear_absent(&self) -> Result<Snapshot, PickerError> {
        self.gate.ensure_idle()?;
        self.store.clear_absent();
        Ok(self.store.snapshot())
    }

    /// Applies a partial settings update.
    ///
    /// # Errors
    ///
    /// Returns [`PickerError::DrawInProgress`] while a draw is running.
    pub fn update_settings(&self, patch: SettingsPatch) -> Result<Snapshot, PickerError> {
        self.gate.ensure_idle()?;
        self.store.update_settings(patch);
        Ok(self.store.snapshot())
    }

    /// Empties the draw history.
    ///
    /// # Errors
    ///
    /// Returns [`PickerError::DrawInProgress`] while a draw is running.
    pub fn reset_history(&self) -> Result<Snapshot, PickerError> {
        self.gate.ensure_idle()?;
        self.store.reset_history();
        tracing::info!("history reset");
        Ok(self.store.snapshot())
    }

    /// Switches to another class, loading its saved state.
    ///
    /// A class with nothing saved (or whose file cannot be read) starts
    /// empty and inherits the current settings.
    ///
    /// # Errors
    ///
    /// - [`PickerError::Validation`] for an identifier without letters or
    ///   digits, or one whose file name collides with a different saved
    ///   class (`5 B` and `5-b` both map to `class-5-b.json`).
    /// - [`PickerError::DrawInProgress`] while a draw is running.
    /// - [`PickerError::Parse`] / [`PickerError::Version`] if the saved
    ///   document is unusable; the current class stays active.
    pub async fn switch_class(&self, class_id: &str) -> Result<Snapshot, PickerError> {
        let class_id = normalize_whitespace(class_id);
        let class_id = class_id.as_str();
        if class_id.is_empty() {
            return Err(PickerError::Validation(
                "class identifier must not be empty".to_string(),
            ));
        }
        self.files.class_path(class_id)?;
        self.gate.ensure_idle()?;

        let current = self.store.snapshot();
        if current.class_id == class_id {
            return Ok(current);
        }

        let next = match self.files.load(class_id).await {
            Ok(Some(snapshot)) if snapshot.class_id != class_id => {
                return Err(PickerError::Validation(format!(
                    "class identifier `{class_id}` shares its file with class `{}`",
                    snapshot.class_id
                )));
            }
            Ok(Some(snapshot)) => snapshot,
            Ok(None) => fresh_class(class_id, &current),
            Err(PickerError::Storage(e)) => {
                tracing::warn!(class_id, error = %e, "cannot read saved class, starting empty");
                fresh_class(class_id, &current)
            }
            Err(e) => return Err(e),
        };
        // the gate may have closed while the file was read
        self.gate.ensure_idle()?;
        self.store.replace_from_document(next);
        tracing::info!(from = %current.class_id, to = class_id, "class switched");
        Ok(self.store.snapshot())
    }

    /// Lists every saved class plus the active one, sorted.
    ///
    /// # Errors
    ///
    /// Returns [`PickerError::Storage`] if the data directory cannot be
    /// listed.
    pub async fn list_classes(&self) -> Result<Vec<String>, PickerError> {
        let mut classes = self.files.list_classes().await?;
        classes.push(self.store.snapshot().class_id);
        classes.sort();
        classes.dedup();
        Ok(classes)
    }

    /// Replaces the current state with an imported document.
    ///
    /// The document is sanitized first; its class identifier is ignored and
    /// the current one kept.
    ///
    /// # Errors
    ///
    /// - [`PickerError::DrawInProgress`] while a draw is running.
    /// - [`PickerError::Parse`] / [`PickerError::Version`] if the document
    ///   cannot be used. State is left untouched.
    pub fn import_document(&self, text: &str) -> Result<Snapshot, PickerError> {
        self.gate.ensure_idle()?;
        let mut imported = sanitize_import(text)?;
        imported.class_id = self.store.snapshot().class_id;
        tracing::info!(
            class_id = %imported.class_id,
            names = imported.names.len(),
            absent = imported.absent.len(),
            history = imported.history.len(),
            "document imported"
        );
        self.store.replace_from_document(imported);
        Ok(self.store.snapshot())
    }

    /// Serializes the current state for download.
    ///
    /// # Errors
    ///
    /// Returns [`PickerError::Internal`] if encoding fails.
    pub fn export_document(&self) -> Result<ExportedDocument, PickerError> {
        let snapshot = self.store.snapshot();
        let body = serialize(&snapshot)?;
        let slug = slugify(&snapshot.class_id);
        let stem = if slug.is_empty() { "class" } else { slug.as_str() };
        Ok(ExportedDocument {
            file_name: format!("{stem}-{}.json", Utc::now().format("%Y-%m-%d")),
            body,
        })
    }

    /// Runs text recognition on `image` and returns candidate names.
    ///
    /// The roster is not touched; callers add the candidates they accept.
    ///
    /// # Errors
    ///
    /// - [`PickerError::OcrDisabled`] if recognition is turned off.
    /// - [`PickerError::Validation`] for an empty upload.
    /// - [`PickerError::Recognition`] / [`PickerError::RecognitionTimeout`]
    ///   if the worker fails.
    pub async fn recognize_names(&self, image: Vec<u8>) -> Result<Vec<Name>, PickerError> {
        let Some(ocr) = &self.ocr else {
            return Err(PickerError::OcrDisabled);
        };
        if image.is_empty() {
            return Err(PickerError::Validation("image is empty".to_string()));
        }
        let text = ocr.recognize(image).await?;
        let candidates = candidate_names(&text);
        tracing::info!(candidates = candidates.len(), "text recognized");
        Ok(candidates)
    }

    fn require_name(&self, key: &NameKey) -> Result<(), PickerError> {
        if self.store.snapshot().find(key).is_none() {
            return Err(PickerError::NameNotFound(key.to_string()));
        }
        Ok(())
    }
}

fn fresh_class(class_id: &str, current: &Snapshot) -> Snapshot {
    let mut snapshot = Snapshot::empty(class_id);
    snapshot.settings = current.settings;
    snapshot
}
