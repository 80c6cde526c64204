//! In-memory collaborators for pipeline tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use mirrorsync_core::config::{GithubConfig, VertexConfig};
use mirrorsync_core::{
    Candidate, ContentFetcher, FileDescriptor, GenerateRequest, ListingFilter, RepoLister,
    RepoRef, SourceError, SyncConfig, TextGenerator,
};
use mirrorsync_sync::Collaborators;

pub const PROMPT: &str = "Translate to French:";

pub fn fd(path: &str, fingerprint: &str) -> FileDescriptor {
    FileDescriptor::new(path, fingerprint, raw_ref(path))
}

pub fn raw_ref(path: &str) -> String {
    format!("https://raw.test/acme/handbook/main/{path}")
}

/// Config rooted in `dir`, with the prompt written to `dir/prompt.txt`.
pub fn config_in(dir: &Path) -> SyncConfig {
    let prompt = dir.join("prompt.txt");
    std::fs::write(&prompt, PROMPT).unwrap();
    SyncConfig {
        repo: RepoRef {
            owner: "acme".into(),
            repo: "handbook".into(),
        },
        filter: ListingFilter {
            path_prefix: "docs/".into(),
            extension: ".md".into(),
        },
        store_path: dir.join("state").join("fingerprints.json"),
        output_dir: dir.join("out"),
        prompt: prompt.display().to_string(),
        timeout_secs: 5,
        jobs: 1,
        vertex: VertexConfig {
            project: "proj".into(),
            location: "us-central1".into(),
            model: "gemini-test".into(),
            max_output_tokens: 64,
            endpoint: None,
            access_token: None,
        },
        github: GithubConfig {
            api_url: "https://api.test".into(),
            raw_url: "https://raw.test".into(),
            token: None,
        },
    }
}

#[derive(Default)]
pub struct FakeLister {
    pub files: Vec<FileDescriptor>,
    pub fail: bool,
}

impl FakeLister {
    pub fn of(files: Vec<FileDescriptor>) -> Self {
        Self { files, fail: false }
    }
}

impl RepoLister for FakeLister {
    fn list(
        &self,
        repo: &RepoRef,
        filter: &ListingFilter,
    ) -> Result<Vec<FileDescriptor>, SourceError> {
        if self.fail {
            return Err(SourceError::Transport {
                url: format!("https://api.test/repos/{repo}"),
                message: "connection refused".into(),
            });
        }
        Ok(self
            .files
            .iter()
            .filter(|d| filter.matches(d.path.as_str()))
            .cloned()
            .collect())
    }
}

/// Serves content by reference; unknown references are 404s.
#[derive(Default)]
pub struct FakeFetcher {
    pub contents: HashMap<String, String>,
    pub calls: AtomicUsize,
}

impl FakeFetcher {
    pub fn serving(pairs: &[(&str, &str)]) -> Self {
        Self {
            contents: pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            calls: AtomicUsize::new(0),
        }
    }

    /// Content for repository paths, served at their raw references.
    pub fn for_paths(pairs: &[(&str, &str)]) -> Self {
        let mut fetcher = Self::default();
        for (path, content) in pairs {
            fetcher.contents.insert(raw_ref(path), content.to_string());
        }
        fetcher
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ContentFetcher for FakeFetcher {
    fn fetch_text(&self, content_ref: &str) -> Result<String, SourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.contents
            .get(content_ref)
            .cloned()
            .ok_or_else(|| SourceError::Status {
                url: content_ref.to_string(),
                status: 404,
                body: "Not Found".into(),
            })
    }
}

/// Echoes the prompt back as a single candidate, except for content that
/// contains one of the `empty_for` / `textless_for` / `fail_for` markers.
#[derive(Default)]
pub struct FakeGenerator {
    pub empty_for: Vec<String>,
    pub textless_for: Vec<String>,
    pub fail_for: Vec<String>,
    pub prompts: Mutex<Vec<String>>,
}

impl FakeGenerator {
    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

impl TextGenerator for FakeGenerator {
    fn generate(&self, request: &GenerateRequest) -> Result<Vec<Candidate>, SourceError> {
        let text = request.prompt_text.clone();
        self.prompts.lock().unwrap().push(text.clone());
        if self.fail_for.iter().any(|m| text.contains(m.as_str())) {
            return Err(SourceError::Transport {
                url: "https://vertex.test".into(),
                message: "timed out".into(),
            });
        }
        if self.empty_for.iter().any(|m| text.contains(m.as_str())) {
            return Ok(Vec::new());
        }
        if self.textless_for.iter().any(|m| text.contains(m.as_str())) {
            return Ok(vec![Candidate::default()]);
        }
        Ok(vec![Candidate::from_parts([text])])
    }
}

pub fn collaborators<'a>(
    lister: &'a FakeLister,
    fetcher: &'a FakeFetcher,
    generator: &'a FakeGenerator,
) -> Collaborators<'a> {
    Collaborators {
        lister,
        fetcher,
        prompt_fetcher: fetcher,
        generator,
    }
}
