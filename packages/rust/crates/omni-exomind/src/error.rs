//! Error types for ExoMind indexing and recall.
//!
//! Follows ODF-REP: Library crates use `thiserror` for explicit error enums.
//! Only missing or unusable inputs surface here; unreadable notes,
//! unresolved links and empty recalls are absorbed into the data model.

use std::path::PathBuf;
use thiserror::Error;

/// Error types for the ExoMind core and its adapters.
#[derive(Error, Debug)]
pub enum ExomindError {
    /// Notes root passed to the index operation does not exist.
    #[error("Notes root not found: {}", .0.display())]
    NotesRootNotFound(PathBuf),

    /// Graph snapshot file does not exist.
    #[error("Graph not found: {}. Run `exom index` first.", .0.display())]
    GraphNotFound(PathBuf),

    /// Graph snapshot exists but is not a valid snapshot document.
    #[error("Graph snapshot is unreadable: {}: {source}", path.display())]
    GraphParse {
        /// Snapshot path.
        path: PathBuf,
        /// Underlying decode error.
        #[source]
        source: serde_json::Error,
    },

    /// Filesystem failure tied to a concrete path.
    #[error("IO error at {}: {source}", path.display())]
    Io {
        /// Path being read or written.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Serialization failure while rendering a snapshot or payload.
    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// YAML rendering failure (capture relation block).
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Invalid configuration file or override.
    #[error("Config error: {0}")]
    Config(String),
}

impl ExomindError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether this error means a required input is absent.
    #[must_use]
    pub fn is_missing_input(&self) -> bool {
        matches!(self, Self::NotesRootNotFound(_) | Self::GraphNotFound(_))
    }
}

/// Result alias used across the crate.
pub type ExomindResult<T> = Result<T, ExomindError>;
