//! mirrorsync core library: domain types, collaborator traits, configuration.
//!
//! - [`types`]: newtypes and listing/generation structs
//! - [`source`]: [`RepoLister`], [`ContentFetcher`], [`TextGenerator`]
//! - [`config`]: file + env configuration, [`SyncConfig`]
//! - [`error`]: [`ConfigError`], [`SourceError`]

pub mod config;
pub mod error;
pub mod source;
pub mod types;

pub use config::{LocalConfig, SyncConfig};
pub use error::{ConfigError, SourceError};
pub use source::{ContentFetcher, RepoLister, TextGenerator};
pub use types::{
    Candidate, FileDescriptor, Fingerprint, FingerprintMap, GenerateRequest, ListingFilter,
    RepoPath, RepoRef,
};
