//! Error types for mirrorsync-core.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while assembling or validating [`crate::config::SyncConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// One or more required settings are unset. Every missing field is
    /// reported at once, each with the env var that supplies it.
    #[error("missing required configuration: {}", fields.join(", "))]
    Missing { fields: Vec<String> },

    /// A setting is present but unusable.
    #[error("invalid configuration value for {field}: {reason}")]
    Invalid { field: String, reason: String },

    /// The config file could not be read.
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The config file is not valid YAML for [`crate::config::FileConfig`].
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

/// Errors surfaced by the remote collaborators (listing, content fetch,
/// generation).
#[derive(Debug, Error)]
pub enum SourceError {
    /// The request never produced an HTTP response (DNS, connect, timeout).
    #[error("request to {url} failed: {message}")]
    Transport { url: String, message: String },

    /// The service answered with a non-success status.
    #[error("{url} returned HTTP {status}: {body}")]
    Status {
        url: String,
        status: u16,
        body: String,
    },

    /// The response body could not be read or decoded.
    #[error("unreadable response from {url}: {message}")]
    Body { url: String, message: String },

    /// The listing response was well-formed but unusable.
    #[error("invalid listing for {repo}: {reason}")]
    Listing { repo: String, reason: String },

    /// A local file could not be read (prompt documents given as paths).
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl SourceError {
    /// `true` when the failure was a timeout or connection problem rather
    /// than an answer from the service.
    pub fn is_transport(&self) -> bool {
        matches!(self, SourceError::Transport { .. })
    }
}

/// Convenience constructor for [`ConfigError::Invalid`].
pub(crate) fn invalid(field: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field: field.to_string(),
        reason: reason.into(),
    }
}
