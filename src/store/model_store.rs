use crate::classifiers::LogisticRegression;
use crate::core::instance_header::FEATURE_COLUMNS;
use crate::error::{DowntimeError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tempfile::NamedTempFile;
use tracing::{debug, info};

pub const MODEL_FORMAT: &str = "downtime-logreg";
pub const MODEL_FORMAT_VERSION: u32 = 1;

/// Envelope written to disk around the fitted classifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredModel {
    pub format: String,
    pub format_version: u32,
    pub trained_at: DateTime<Utc>,
    pub features: Vec<String>,
    pub model: LogisticRegression,
}

#[derive(Deserialize)]
struct EnvelopeTag {
    format: String,
    format_version: u32,
}

#[derive(Debug, Clone)]
pub struct LoadedModel {
    pub stored: StoredModel,
    /// Modification time of the file the model was read from.
    pub modified: SystemTime,
}

/// Single-slot on-disk model store. Every save replaces the previous model.
#[derive(Debug, Clone)]
pub struct ModelStore {
    path: PathBuf,
}

impl ModelStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// mtime of the stored model, `None` when nothing has been saved.
    pub fn modified(&self) -> Result<Option<SystemTime>> {
        match fs::metadata(&self.path) {
            Ok(meta) => meta
                .modified()
                .map(Some)
                .map_err(|e| DowntimeError::store(&self.path, e)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(DowntimeError::store(&self.path, e)),
        }
    }

    /// Writes `model` next to the target and renames it into place, so readers
    /// see either the old file or the new one. Returns the new mtime.
    pub fn save(&self, model: &LogisticRegression) -> Result<SystemTime> {
        let envelope = StoredModel {
            format: MODEL_FORMAT.to_string(),
            format_version: MODEL_FORMAT_VERSION,
            trained_at: Utc::now(),
            features: FEATURE_COLUMNS.iter().map(|f| f.to_string()).collect(),
            model: model.clone(),
        };
        let bytes = serde_json::to_vec_pretty(&envelope)?;

        let dir = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir).map_err(|e| DowntimeError::store(&dir, e))?;

        let mut tmp = NamedTempFile::new_in(&dir).map_err(|e| DowntimeError::store(&dir, e))?;
        tmp.write_all(&bytes)
            .and_then(|_| tmp.as_file().sync_all())
            .map_err(|e| DowntimeError::store(tmp.path(), e))?;
        tmp.persist(&self.path)
            .map_err(|e| DowntimeError::store(&self.path, e.error))?;

        let modified = self
            .modified()?
            .ok_or_else(|| DowntimeError::internal("Model file vanished right after saving"))?;
        info!(path = %self.path.display(), bytes = bytes.len(), "model persisted");
        Ok(modified)
    }

    /// Reads the stored model, `Ok(None)` if there is none.
    pub fn load(&self) -> Result<Option<LoadedModel>> {
        let modified = match self.modified()? {
            Some(m) => m,
            None => return Ok(None),
        };
        let bytes = match fs::read(&self.path) {
            Ok(b) => b,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(DowntimeError::store(&self.path, e)),
        };

        let tag: EnvelopeTag = serde_json::from_slice(&bytes).map_err(|e| {
            DowntimeError::internal(format!(
                "Stored model at {} is not a recognized model file: {e}",
                self.path.display()
            ))
        })?;
        if tag.format != MODEL_FORMAT || tag.format_version != MODEL_FORMAT_VERSION {
            return Err(DowntimeError::internal(format!(
                "Stored model at {} has format '{}' version {}, expected '{}' version {}",
                self.path.display(),
                tag.format,
                tag.format_version,
                MODEL_FORMAT,
                MODEL_FORMAT_VERSION
            )));
        }

        let stored: StoredModel = serde_json::from_slice(&bytes)?;
        if stored.model.number_of_features() != FEATURE_COLUMNS.len() {
            return Err(DowntimeError::internal(format!(
                "Stored model expects {} features, this service provides {}",
                stored.model.number_of_features(),
                FEATURE_COLUMNS.len()
            )));
        }

        debug!(path = %self.path.display(), trained_at = %stored.trained_at, "model loaded");
        Ok(Some(LoadedModel { stored, modified }))
    }
}
