//! Domain types for the mirror pipeline.
//!
//! Repository paths are kept as `String` newtypes rather than `PathBuf`: they
//! are remote, `/`-separated identifiers and only become filesystem paths in
//! the output writer.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// A repository-relative file path, e.g. `docs/guide/intro.md`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RepoPath(pub String);

impl RepoPath {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RepoPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for RepoPath {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for RepoPath {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// Opaque content-revision token supplied by the listing service.
///
/// Only ever compared for equality; never parsed.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(pub String);

impl Fingerprint {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for Fingerprint {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for Fingerprint {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// Persisted mapping of repository path to fingerprint.
///
/// `BTreeMap` keeps key order stable so an unchanged map re-serialises to the
/// same bytes.
pub type FingerprintMap = BTreeMap<String, String>;

// ---------------------------------------------------------------------------
// Listing
// ---------------------------------------------------------------------------

/// Coordinates of the remote repository being mirrored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoRef {
    pub owner: String,
    pub repo: String,
}

impl fmt::Display for RepoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

/// Which files of the repository are mirrored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingFilter {
    /// Path prefix; empty matches every path.
    pub path_prefix: String,
    /// Required file suffix, e.g. `.md`. Never empty once validated.
    pub extension: String,
}

impl ListingFilter {
    pub fn matches(&self, path: &str) -> bool {
        path.starts_with(&self.path_prefix) && path.ends_with(&self.extension)
    }
}

/// One remote file matching the listing filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileDescriptor {
    pub path: RepoPath,
    pub fingerprint: Fingerprint,
    /// URL the raw file content can be fetched from.
    pub content_ref: String,
}

impl FileDescriptor {
    pub fn new(
        path: impl Into<RepoPath>,
        fingerprint: impl Into<Fingerprint>,
        content_ref: impl Into<String>,
    ) -> Self {
        Self {
            path: path.into(),
            fingerprint: fingerprint.into(),
            content_ref: content_ref.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Generation
// ---------------------------------------------------------------------------

/// A single request to the generative service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateRequest {
    pub prompt_text: String,
    pub max_output_tokens: u32,
}

/// One alternative completion, split into text fragments.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Candidate {
    pub parts: Vec<String>,
}

impl Candidate {
    pub fn from_parts<I, S>(parts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            parts: parts.into_iter().map(Into::into).collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
