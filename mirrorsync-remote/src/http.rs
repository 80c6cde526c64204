//! Shared `ureq` agent and error mapping.

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;

use mirrorsync_core::{ContentFetcher, SourceError};

/// Longest error body kept in [`SourceError::Status`].
const MAX_ERROR_BODY_CHARS: usize = 512;

/// Thin wrapper over a `ureq::Agent` with a fixed timeout and user agent.
///
/// Cloning is cheap; the underlying agent shares its connection pool.
#[derive(Clone)]
pub struct HttpClient {
    agent: ureq::Agent,
}

impl HttpClient {
    pub fn new(timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(timeout)
            .user_agent(concat!("mirrorsync/", env!("CARGO_PKG_VERSION")))
            .build();
        Self { agent }
    }

    /// `GET url` and return the body as text.
    pub fn get_text(&self, url: &str, headers: &[(&str, String)]) -> Result<String, SourceError> {
        tracing::debug!("GET {url}");
        let response = with_headers(self.agent.get(url), headers)
            .call()
            .map_err(|e| map_ureq_err(url, e))?;
        response.into_string().map_err(|e| SourceError::Body {
            url: url.to_string(),
            message: e.to_string(),
        })
    }

    /// `GET url` and decode the JSON body.
    pub fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        headers: &[(&str, String)],
    ) -> Result<T, SourceError> {
        tracing::debug!("GET {url}");
        let response = with_headers(self.agent.get(url), headers)
            .call()
            .map_err(|e| map_ureq_err(url, e))?;
        response.into_json::<T>().map_err(|e| SourceError::Body {
            url: url.to_string(),
            message: e.to_string(),
        })
    }

    /// `POST url` with a JSON body and decode the JSON response.
    pub fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        url: &str,
        headers: &[(&str, String)],
        body: &B,
    ) -> Result<T, SourceError> {
        tracing::debug!("POST {url}");
        let response = with_headers(self.agent.post(url), headers)
            .send_json(body)
            .map_err(|e| map_ureq_err(url, e))?;
        response.into_json::<T>().map_err(|e| SourceError::Body {
            url: url.to_string(),
            message: e.to_string(),
        })
    }
}

fn with_headers(mut request: ureq::Request, headers: &[(&str, String)]) -> ureq::Request {
    for (name, value) in headers {
        request = request.set(name, value.as_str());
    }
    request
}

fn map_ureq_err(url: &str, err: ureq::Error) -> SourceError {
    match err {
        ureq::Error::Status(status, response) => {
            let body = response.into_string().unwrap_or_default();
            SourceError::Status {
                url: url.to_string(),
                status,
                body: clip(body.trim()),
            }
        }
        ureq::Error::Transport(transport) => SourceError::Transport {
            url: url.to_string(),
            message: transport.to_string(),
        },
    }
}

fn clip(text: &str) -> String {
    if text.chars().count() <= MAX_ERROR_BODY_CHARS {
        return text.to_string();
    }
    let mut out: String = text.chars().take(MAX_ERROR_BODY_CHARS).collect();
    out.push('…');
    out
}

// ---------------------------------------------------------------------------
// RawFetcher
// ---------------------------------------------------------------------------

/// Fetches raw file content with a plain `GET`.
///
/// The optional token is sent as a bearer credential so private
/// repositories can be mirrored.
#[derive(Clone)]
pub struct RawFetcher {
    http: HttpClient,
    token: Option<String>,
}

impl RawFetcher {
    pub fn new(http: HttpClient, token: Option<String>) -> Self {
        Self { http, token }
    }
}

impl ContentFetcher for RawFetcher {
    fn fetch_text(&self, content_ref: &str) -> Result<String, SourceError> {
        let headers: Vec<(&str, String)> = self
            .token
            .as_deref()
            .map(|t| ("Authorization", format!("Bearer {t}")))
            .into_iter()
            .collect();
        self.http.get_text(content_ref, &headers)
    }
}
