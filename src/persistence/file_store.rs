//! Local JSON file storage, one document per class.
//!
//! Layout under the data directory:
//!
//! ```text
//! data/
//!   class-4a.json        one SnapshotDocument per class
//!   class-5-b.json
//!   workspace.json       { "lastClass": "5 B" }
//! ```
//!
//! Writes go to a temporary file first and are renamed into place, so a
//! crash mid-write never leaves a truncated document behind.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tokio::fs;
use tokio::io::AsyncWriteExt;

use super::codec;
use crate::domain::{Snapshot, slugify};
use crate::error::PickerError;

const CLASS_FILE_PREFIX: &str = "class-";
const DOCUMENT_EXTENSION: &str = "json";
const WORKSPACE_FILE: &str = "workspace.json";

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WorkspaceRecord {
    last_class: String,
}

/// File-backed document storage rooted at a data directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Creates a store rooted at `dir`. Nothing is touched on disk until
    /// the first read or write.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Returns the data directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the document for `class_id`.
    ///
    /// # Errors
    ///
    /// Returns [`PickerError::Validation`] if the identifier has no letters
    /// or digits to build a file name from.
    pub fn class_path(&self, class_id: &str) -> Result<PathBuf, PickerError> {
        let slug = slugify(class_id);
        if slug.is_empty() {
            return Err(PickerError::Validation(format!(
                "class identifier `{class_id}` needs at least one letter or digit"
            )));
        }
        Ok(self
            .dir
            .join(format!("{CLASS_FILE_PREFIX}{slug}.{DOCUMENT_EXTENSION}")))
    }

    /// Loads the saved snapshot for `class_id`.
    ///
    /// Returns `Ok(None)` when nothing has been saved for the class yet.
    ///
    /// # Errors
    ///
    /// - [`PickerError::Storage`] if the file exists but cannot be read.
    /// - [`PickerError::Parse`] / [`PickerError::Version`] if the saved
    ///   document cannot be decoded.
    /// - [`PickerError::Validation`] for an unusable class identifier.
    pub async fn load(&self, class_id: &str) -> Result<Option<Snapshot>, PickerError> {
        let path = self.class_path(class_id)?;
        let text = match fs::read_to_string(&path).await {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(PickerError::Storage(format!(
                    "reading {}: {e}",
                    path.display()
                )));
            }
        };
        let snapshot = codec::deserialize(&text)?;
        tracing::debug!(class_id, path = %path.display(), names = snapshot.names.len(), "loaded class");
        Ok(Some(snapshot))
    }

    /// Saves `snapshot` under its class identifier.
    ///
    /// # Errors
    ///
    /// Returns [`PickerError::Storage`] on I/O failure and
    /// [`PickerError::Validation`] for an unusable class identifier.
    pub async fn save(&self, snapshot: &Snapshot) -> Result<(), PickerError> {
        let path = self.class_path(&snapshot.class_id)?;
        let text = codec::serialize(snapshot)?;
        self.write_atomic(&path, text.as_bytes()).await
    }

    /// Lists the identifiers of all saved classes, sorted.
    ///
    /// Unreadable or foreign files in the directory are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`PickerError::Storage`] if the directory cannot be listed.
    pub async fn list_classes(&self) -> Result<Vec<String>, PickerError> {
        let mut entries = match fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut classes = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            let is_document = path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| {
                    n.starts_with(CLASS_FILE_PREFIX)
                        && n.ends_with(&format!(".{DOCUMENT_EXTENSION}"))
                });
            if !is_document {
                continue;
            }
            let Ok(text) = fs::read_to_string(&path).await else {
                continue;
            };
            let class_id = serde_json::from_str::<serde_json::Value>(&text)
                .ok()
                .and_then(|v| v.get("classIdentifier")?.as_str().map(str::to_string));
            if let Some(class_id) = class_id {
                classes.push(class_id);
            }
        }
        classes.sort();
        classes.dedup();
        Ok(classes)
    }

    /// Returns the class used most recently, if one was recorded.
    ///
    /// Any read or decode problem counts as "nothing recorded".
    pub async fn load_last_class(&self) -> Option<String> {
        let text = fs::read_to_string(self.dir.join(WORKSPACE_FILE)).await.ok()?;
        let record: WorkspaceRecord = serde_json::from_str(&text).ok()?;
        Some(record.last_class).filter(|id| !id.trim().is_empty())
    }

    /// Records `class_id` as the class to open on next start.
    ///
    /// # Errors
    ///
    /// Returns [`PickerError::Storage`] on I/O failure.
    pub async fn save_last_class(&self, class_id: &str) -> Result<(), PickerError> {
        let record = WorkspaceRecord {
            last_class: class_id.to_string(),
        };
        let text = serde_json::to_string_pretty(&record)
            .map_err(|e| PickerError::Internal(e.to_string()))?;
        self.write_atomic(&self.dir.join(WORKSPACE_FILE), text.as_bytes())
            .await
    }

    async fn write_atomic(&self, path: &Path, bytes: &[u8]) -> Result<(), PickerError> {
        fs::create_dir_all(&self.dir).await.map_err(|e| {
            PickerError::Storage(format!("creating {}: {e}", self.dir.display()))
        })?;

        let tmp = path.with_extension("json.tmp");
        let result = async {
            let mut file = fs::File::create(&tmp).await?;
            file.write_all(bytes).await?;
            file.sync_all().await?;
            drop(file);
            fs::rename(&tmp, path).await
        }
        .await;

        if let Err(e) = result {
            let _ = fs::remove_file(&tmp).await;
            return Err(PickerError::Storage(format!(
                "writing {}: {e}",
                path.display()
            )));
        }
        Ok(())
    }
}
