//! Vertex AI `generateContent` client.

use serde::Deserialize;
use serde_json::json;

use mirrorsync_core::{
    config::VertexConfig, Candidate, GenerateRequest, SourceError, TextGenerator,
};

use crate::http::HttpClient;

#[derive(Debug, Default, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<ResponseCandidate>,
}

#[derive(Debug, Deserialize)]
struct ResponseCandidate {
    content: Option<ResponseContent>,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

impl GenerateResponse {
    /// Candidates in response order; non-text parts (function calls, inline
    /// data) are dropped.
    fn into_candidates(self) -> Vec<Candidate> {
        self.candidates
            .into_iter()
            .map(|c| Candidate {
                parts: c
                    .content
                    .map(|content| content.parts.into_iter().filter_map(|p| p.text).collect())
                    .unwrap_or_default(),
            })
            .collect()
    }
}

/// Calls a publisher model on a regional Vertex AI endpoint.
#[derive(Clone)]
pub struct VertexGenerator {
    http: HttpClient,
    url: String,
    access_token: Option<String>,
}

impl VertexGenerator {
    pub fn new(http: HttpClient, config: &VertexConfig) -> Self {
        let url = format!(
            "{}/v1/projects/{}/locations/{}/publishers/google/models/{}:generateContent",
            config.endpoint(),
            config.project,
            config.location,
            config.model,
        );
        Self {
            http,
            url,
            access_token: config.access_token.clone(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl TextGenerator for VertexGenerator {
    fn generate(&self, request: &GenerateRequest) -> Result<Vec<Candidate>, SourceError> {
        let body = json!({
            "contents": [
                {
                    "role": "user",
                    "parts": [{ "text": request.prompt_text }]
                }
            ],
            "generationConfig": {
                "maxOutputTokens": request.max_output_tokens
            }
        });

        let mut headers = Vec::new();
        if let Some(token) = self.access_token.as_deref() {
            headers.push(("Authorization", format!("Bearer {token}")));
        }

        let response: GenerateResponse = self.http.post_json(&self.url, &headers, &body)?;
        Ok(response.into_candidates())
    }
}
