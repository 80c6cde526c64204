//! GitHub listing resolver.
//!
//! Two calls per run:
//!
//! 1. `GET /repos/{owner}/{repo}` → `default_branch`
//! 2. `GET /repos/{owner}/{repo}/git/trees/{branch}?recursive=1`
//!
//! Only `blob` entries are files; `tree` entries are directories and
//! `commit` entries are submodules. A truncated tree is rejected outright
//! since it would silently drop nested matches.

use std::collections::HashSet;

use serde::Deserialize;

use mirrorsync_core::{FileDescriptor, ListingFilter, RepoLister, RepoRef, SourceError};

use crate::http::HttpClient;

const GITHUB_ACCEPT: &str = "application/vnd.github+json";

#[derive(Debug, Deserialize)]
struct RepoInfo {
    default_branch: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TreeResponse {
    #[serde(default)]
    tree: Vec<TreeEntry>,
    #[serde(default)]
    truncated: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct TreeEntry {
    path: String,
    #[serde(rename = "type")]
    kind: String,
    sha: String,
}

/// Lists repository files through the GitHub REST API.
#[derive(Clone)]
pub struct GithubLister {
    http: HttpClient,
    api_url: String,
    raw_url: String,
    token: Option<String>,
}

impl GithubLister {
    pub fn new(
        http: HttpClient,
        api_url: impl Into<String>,
        raw_url: impl Into<String>,
        token: Option<String>,
    ) -> Self {
        Self {
            http,
            api_url: api_url.into().trim_end_matches('/').to_string(),
            raw_url: raw_url.into().trim_end_matches('/').to_string(),
            token,
        }
    }

    /// Resolve the repository's default branch name.
    pub fn default_branch(&self, repo: &RepoRef) -> Result<String, SourceError> {
        let url = format!("{}/repos/{}/{}", self.api_url, repo.owner, repo.repo);
        let info: RepoInfo = self.http.get_json(&url, &self.headers())?;
        info.default_branch
            .filter(|b| !b.is_empty())
            .ok_or_else(|| SourceError::Listing {
                repo: repo.to_string(),
                reason: "repository metadata has no default_branch".to_string(),
            })
    }

    fn tree(&self, repo: &RepoRef, branch: &str) -> Result<TreeResponse, SourceError> {
        let url = format!(
            "{}/repos/{}/{}/git/trees/{}?recursive=1",
            self.api_url,
            repo.owner,
            repo.repo,
            encode_segment(branch),
        );
        self.http.get_json(&url, &self.headers())
    }

    fn headers(&self) -> Vec<(&str, String)> {
        let mut headers = vec![("Accept", GITHUB_ACCEPT.to_string())];
        if let Some(token) = self.token.as_deref() {
            headers.push(("Authorization", format!("Bearer {token}")));
        }
        headers
    }
}

impl RepoLister for GithubLister {
    fn list(
        &self,
        repo: &RepoRef,
        filter: &ListingFilter,
    ) -> Result<Vec<FileDescriptor>, SourceError> {
        if filter.extension.is_empty() {
            return Err(SourceError::Listing {
                repo: repo.to_string(),
                reason: "extension filter is unset".to_string(),
            });
        }

        let branch = self.default_branch(repo)?;
        tracing::debug!("default branch of {repo} is {branch}");

        let tree = self.tree(repo, &branch)?;
        if tree.truncated {
            return Err(SourceError::Listing {
                repo: repo.to_string(),
                reason: format!(
                    "recursive tree for {branch} was truncated by the server ({} entries returned)",
                    tree.tree.len()
                ),
            });
        }

        let base = format!("{}/{}/{}/{}", self.raw_url, repo.owner, repo.repo, branch);
        select_files(repo, &tree.tree, filter, &base)
    }
}

/// Keep matching blobs, in service order, rejecting duplicate paths.
pub(crate) fn select_files(
    repo: &RepoRef,
    entries: &[TreeEntry],
    filter: &ListingFilter,
    raw_base: &str,
) -> Result<Vec<FileDescriptor>, SourceError> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for entry in entries {
        if entry.kind != "blob" || !filter.matches(&entry.path) {
            continue;
        }
        if !seen.insert(entry.path.as_str()) {
            return Err(SourceError::Listing {
                repo: repo.to_string(),
                reason: format!("duplicate path in tree: {}", entry.path),
            });
        }
        let content_ref = format!("{raw_base}/{}", encode_path(&entry.path));
        out.push(FileDescriptor::new(
            entry.path.as_str(),
            entry.sha.as_str(),
            content_ref,
        ));
    }
    Ok(out)
}

/// Percent-encode each segment of a repository path, keeping `/`
/// separators intact.
fn encode_path(path: &str) -> String {
    path.split('/')
        .map(encode_segment)
        .collect::<Vec<_>>()
        .join("/")
}

fn encode_segment(segment: &str) -> String {
    urlencoding::encode(segment).into_owned()
}
