//! Store error types.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by the defaults store and the in-memory persistence.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The home directory could not be determined.
    #[error("home directory not found")]
    HomeDirNotFound,

    /// Reading or writing the defaults file failed.
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The defaults file exists but is not valid JSON.
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Serializing the defaults failed.
    #[error("failed to serialize defaults: {0}")]
    Serialize(#[from] serde_json::Error),

    /// A subject with that name already exists.
    #[error("subject '{0}' already exists")]
    DuplicateSubject(String),

    /// No subject has that name.
    #[error("no subject named '{0}'")]
    UnknownSubject(String),

    /// Subject names must not be blank.
    #[error("subject name must not be empty")]
    EmptySubjectName,
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
