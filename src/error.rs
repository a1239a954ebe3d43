use std::path::PathBuf;

use strum_macros::{Display, IntoStaticStr};
use thiserror::Error;

/// Coarse error category callers branch on instead of parsing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum ErrorKind {
    ValidationError,
    ModelNotTrained,
    InternalError,
}

#[derive(Debug, Error)]
pub enum DowntimeError {
    /// The caller sent something unusable: no file, missing columns, bad JSON fields.
    #[error("{0}")]
    Validation(String),

    #[error("Model is not trained yet. Please upload data and train the model first.")]
    ModelNotTrained,

    /// The dataset was well formed but the classifier could not be fitted on it.
    #[error("{0}")]
    Training(String),

    #[error("Model store at {path}: {source}")]
    Store {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Model serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("{0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, DowntimeError>;

impl DowntimeError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn training(msg: impl Into<String>) -> Self {
        Self::Training(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    pub fn store(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Store {
            path: path.into(),
            source,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            DowntimeError::Validation(_) => ErrorKind::ValidationError,
            DowntimeError::ModelNotTrained => ErrorKind::ModelNotTrained,
            DowntimeError::Training(_)
            | DowntimeError::Store { .. }
            | DowntimeError::Serialization(_)
            | DowntimeError::Internal(_) => ErrorKind::InternalError,
        }
    }
}
