//! Collaborator seams between the sync pipeline and the outside world.
//!
//! The pipeline only ever sees these traits; concrete HTTP clients live in
//! `mirrorsync-remote` and tests substitute in-memory fakes. All three are
//! `Sync` so a bounded worker pool can share one instance.

use crate::error::SourceError;
use crate::types::{Candidate, FileDescriptor, GenerateRequest, ListingFilter, RepoRef};

/// Enumerates the files of a repository's default branch.
pub trait RepoLister: Send + Sync {
    /// Return every regular file on the default branch that matches
    /// `filter`, in the order the service reports them.
    fn list(&self, repo: &RepoRef, filter: &ListingFilter)
        -> Result<Vec<FileDescriptor>, SourceError>;
}

/// Fetches raw text from a content reference (URL).
pub trait ContentFetcher: Send + Sync {
    fn fetch_text(&self, content_ref: &str) -> Result<String, SourceError>;
}

/// Generative text service.
pub trait TextGenerator: Send + Sync {
    /// Submit one prompt and return every candidate in response order.
    /// An empty vector is a valid answer, not an error.
    fn generate(&self, request: &GenerateRequest) -> Result<Vec<Candidate>, SourceError>;
}
