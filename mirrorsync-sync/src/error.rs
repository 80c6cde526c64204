//! Error types for mirrorsync-sync.

use std::path::PathBuf;

use thiserror::Error;

use mirrorsync_core::{ConfigError, SourceError};

/// Run-level (fatal) errors. Per-file problems that only skip a file are
/// reported through [`crate::pipeline::FileOutcome`] instead.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Configuration was missing or invalid.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The remote listing could not be obtained.
    #[error("listing failed: {0}")]
    Listing(#[source] SourceError),

    /// The listing succeeded but no file matched the filter.
    #[error("no files under '{prefix}' with extension '{extension}' in {repo}")]
    EmptyListing {
        repo: String,
        prefix: String,
        extension: String,
    },

    /// The transformation prompt could not be loaded.
    #[error("failed to load prompt from {location}: {source}")]
    Prompt {
        location: String,
        #[source]
        source: SourceError,
    },

    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The fingerprint document exists but is not a path → fingerprint object.
    #[error("corrupt fingerprint store at {path}: {source}")]
    StoreParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// JSON serialization error (fingerprint store save path).
    #[error("fingerprint store JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A listed repository path would resolve outside the output directory.
    #[error("refusing to write unsafe path '{path}'")]
    UnsafePath { path: String },
}

/// Convenience constructor for [`SyncError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> SyncError {
    SyncError::Io {
        path: path.into(),
        source,
    }
}
