//! # mirrorsync-sync
//!
//! Change detection, transformation, output writing and the atomic
//! fingerprint commit.
//!
//! Call [`run`] with a resolved [`mirrorsync_core::SyncConfig`] and a set of
//! [`Collaborators`] to perform one incremental sync.

pub mod detector;
pub mod error;
pub mod fingerprint_store;
pub mod pipeline;
pub mod transform;
pub mod writer;

pub use detector::DetectSummary;
pub use error::SyncError;
pub use pipeline::{run, Collaborators, FileOutcome, RunMode, Stage, SyncReport};
pub use transform::{PromptSource, TransformOutcome, Transformer};
pub use writer::WriteResult;
