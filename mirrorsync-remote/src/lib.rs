//! # mirrorsync-remote
//!
//! Blocking HTTP implementations of the collaborator traits in
//! `mirrorsync-core`:
//!
//! - [`GithubLister`]: default-branch resolution + recursive tree listing
//! - [`RawFetcher`]: plain `GET` of a content reference
//! - [`VertexGenerator`]: Vertex AI `generateContent`
//!
//! All three share one [`HttpClient`], which carries the per-request
//! timeout.

pub mod github;
pub mod http;
pub mod vertex;

pub use github::GithubLister;
pub use http::{HttpClient, RawFetcher};
pub use vertex::VertexGenerator;
