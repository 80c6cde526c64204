//! Content transformer: raw file → prompt → generative service → text.

use std::path::PathBuf;

use mirrorsync_core::{
    Candidate, ContentFetcher, FileDescriptor, GenerateRequest, SourceError, TextGenerator,
};

use crate::SyncError;

/// Where the transformation prompt comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptSource {
    Url(String),
    File(PathBuf),
}

impl PromptSource {
    /// `http://` and `https://` locations are fetched; anything else is a
    /// local path.
    pub fn parse(location: &str) -> Self {
        let trimmed = location.trim();
        if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
            PromptSource::Url(trimmed.to_string())
        } else {
            PromptSource::File(PathBuf::from(trimmed))
        }
    }

    pub fn location(&self) -> String {
        match self {
            PromptSource::Url(url) => url.clone(),
            PromptSource::File(path) => path.display().to_string(),
        }
    }

    /// Load the prompt text. Failure is fatal to the run.
    pub fn load(&self, fetcher: &dyn ContentFetcher) -> Result<String, SyncError> {
        let result = match self {
            PromptSource::Url(url) => fetcher.fetch_text(url),
            PromptSource::File(path) => {
                std::fs::read_to_string(path).map_err(|source| SourceError::Io {
                    path: path.clone(),
                    source,
                })
            }
        };
        result.map_err(|source| SyncError::Prompt {
            location: self.location(),
            source,
        })
    }
}

/// Per-file result of [`Transformer::transform`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransformOutcome {
    /// The service produced text.
    Text(String),
    /// The service returned no candidates at all.
    Empty,
    /// Content fetch or generation failed; the file is skipped this run.
    Failed(String),
}

/// Prompt first, then the file content, separated by a line break.
pub fn build_prompt(prompt: &str, content: &str) -> String {
    format!("{prompt}\n{content}")
}

/// Concatenate every text part of every candidate, in response order.
///
/// `None` when there were no candidates at all.
pub fn join_candidates(candidates: &[Candidate]) -> Option<String> {
    if candidates.is_empty() {
        return None;
    }
    Some(
        candidates
            .iter()
            .flat_map(|c| c.parts.iter())
            .map(String::as_str)
            .collect(),
    )
}

/// Runs one file through fetch → prompt → generate → extract.
pub struct Transformer<'a> {
    fetcher: &'a dyn ContentFetcher,
    generator: &'a dyn TextGenerator,
    prompt: String,
    max_output_tokens: u32,
}

impl<'a> Transformer<'a> {
    pub fn new(
        fetcher: &'a dyn ContentFetcher,
        generator: &'a dyn TextGenerator,
        prompt: String,
        max_output_tokens: u32,
    ) -> Self {
        Self {
            fetcher,
            generator,
            prompt,
            max_output_tokens,
        }
    }

    pub fn transform(&self, descriptor: &FileDescriptor) -> TransformOutcome {
        let content = match self.fetcher.fetch_text(&descriptor.content_ref) {
            Ok(content) => content,
            Err(err) => return TransformOutcome::Failed(format!("fetch failed: {err}")),
        };

        let request = GenerateRequest {
            prompt_text: build_prompt(&self.prompt, &content),
            max_output_tokens: self.max_output_tokens,
        };
        let candidates = match self.generator.generate(&request) {
            Ok(candidates) => candidates,
            Err(err) => return TransformOutcome::Failed(format!("generation failed: {err}")),
        };

        match join_candidates(&candidates) {
            Some(text) => TransformOutcome::Text(text),
            None => TransformOutcome::Empty,
        }
    }
}
