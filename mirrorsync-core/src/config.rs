//! Run configuration: YAML file + environment overrides.
//!
//! # Resolution order
//!
//! ```text
//! defaults  <  config file  <  environment  <  CLI flags (applied by the binary)
//! ```
//!
//! The config file is `--config <path>` when given, else `./mirrorsync.yaml`,
//! else `<config_dir>/mirrorsync/config.yaml`. A missing file is fine; every
//! setting can come from the environment.
//!
//! # API pattern
//!
//! [`load_with`] takes an explicit env lookup so tests never touch the
//! process environment. [`load`] is the convenience wrapper over
//! `std::env::var`. [`load_local`] resolves only the local paths and
//! never fails on missing service settings.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{invalid, ConfigError};
use crate::types::{ListingFilter, RepoRef};

pub const DEFAULT_STORE_PATH: &str = ".mirrorsync/fingerprints.json";
pub const DEFAULT_MAX_OUTPUT_TOKENS: u32 = 8192;
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_GITHUB_API: &str = "https://api.github.com";
pub const DEFAULT_GITHUB_RAW: &str = "https://raw.githubusercontent.com";
pub const CONFIG_FILE_NAME: &str = "mirrorsync.yaml";

const REDACTED: &str = "<redacted>";

// ---------------------------------------------------------------------------
// File shape
// ---------------------------------------------------------------------------

/// On-disk config document. Every field is optional; the environment may
/// supply the rest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub owner: Option<String>,
    pub repo: Option<String>,
    pub path_prefix: Option<String>,
    pub extension: Option<String>,
    pub store_path: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub prompt: Option<String>,
    pub timeout_secs: Option<u64>,
    pub jobs: Option<usize>,
    pub vertex: FileVertexConfig,
    pub github: FileGithubConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileVertexConfig {
    pub project: Option<String>,
    pub location: Option<String>,
    pub model: Option<String>,
    pub max_output_tokens: Option<u32>,
    pub endpoint: Option<String>,
    pub access_token: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileGithubConfig {
    pub api_url: Option<String>,
    pub raw_url: Option<String>,
    pub token: Option<String>,
}

// ---------------------------------------------------------------------------
// Resolved shape
// ---------------------------------------------------------------------------

/// Fully resolved, validated configuration for one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncConfig {
    pub repo: RepoRef,
    pub filter: ListingFilter,
    pub store_path: PathBuf,
    pub output_dir: PathBuf,
    /// Prompt location: an `http(s)://` URL or a local file path.
    pub prompt: String,
    pub timeout_secs: u64,
    pub jobs: usize,
    pub vertex: VertexConfig,
    pub github: GithubConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VertexConfig {
    pub project: String,
    pub location: String,
    pub model: String,
    pub max_output_tokens: u32,
    /// Overrides `https://<location>-aiplatform.googleapis.com`.
    pub endpoint: Option<String>,
    pub access_token: Option<String>,
}

impl VertexConfig {
    /// Base URL of the regional Vertex AI endpoint, without trailing slash.
    pub fn endpoint(&self) -> String {
        match self.endpoint.as_deref() {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => format!("https://{}-aiplatform.googleapis.com", self.location),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GithubConfig {
    pub api_url: String,
    pub raw_url: String,
    pub token: Option<String>,
}

impl SyncConfig {
    /// Re-check the invariants that CLI overrides can break.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.filter.extension.is_empty() {
            return Err(invalid("extension", "must not be empty"));
        }
        if self.jobs == 0 {
            return Err(invalid("jobs", "must be at least 1"));
        }
        if self.timeout_secs == 0 {
            return Err(invalid("timeout_secs", "must be at least 1"));
        }
        if self.vertex.max_output_tokens == 0 {
            return Err(invalid("vertex.max_output_tokens", "must be at least 1"));
        }
        Ok(())
    }

    /// Copy with credentials replaced, for display.
    pub fn redacted(&self) -> SyncConfig {
        let mut out = self.clone();
        if out.vertex.access_token.is_some() {
            out.vertex.access_token = Some(REDACTED.to_string());
        }
        if out.github.token.is_some() {
            out.github.token = Some(REDACTED.to_string());
        }
        out
    }
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Pick the config file to read, if any.
pub fn resolve_config_path(explicit: Option<&Path>, cwd: &Path) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    let local = cwd.join(CONFIG_FILE_NAME);
    if local.is_file() {
        return Some(local);
    }
    let user = dirs::config_dir()?.join("mirrorsync").join("config.yaml");
    user.is_file().then_some(user)
}

/// Parse a YAML config document.
pub fn read_file_config(path: &Path) -> Result<FileConfig, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    if contents.trim().is_empty() {
        return Ok(FileConfig::default());
    }
    serde_yaml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Merge `file` with environment overrides from `env` and validate.
pub fn load_with(
    file: FileConfig,
    env: &dyn Fn(&str) -> Option<String>,
) -> Result<SyncConfig, ConfigError> {
    let lookup = |var: &str| non_blank(env(var));
    let pick = |var: &str, fallback: Option<String>| lookup(var).or_else(|| non_blank(fallback));
    let pick_first = |vars: &[&str], fallback: Option<String>| {
        vars.iter()
            .find_map(|var| lookup(var))
            .or_else(|| non_blank(fallback))
    };

    let mut missing = Vec::new();
    let mut require = |field: &str, var: &str, value: Option<String>| -> String {
        match value {
            Some(v) => v,
            None => {
                missing.push(format!("{field} ({var})"));
                String::new()
            }
        }
    };

    let owner = require("owner", "MIRRORSYNC_OWNER", pick("MIRRORSYNC_OWNER", file.owner));
    let repo = require("repo", "MIRRORSYNC_REPO", pick("MIRRORSYNC_REPO", file.repo));
    let extension = require(
        "extension",
        "MIRRORSYNC_EXTENSION",
        pick("MIRRORSYNC_EXTENSION", file.extension),
    );
    let prompt = require("prompt", "MIRRORSYNC_PROMPT", pick("MIRRORSYNC_PROMPT", file.prompt));
    let project = require(
        "vertex.project",
        "MIRRORSYNC_VERTEX_PROJECT",
        pick("MIRRORSYNC_VERTEX_PROJECT", file.vertex.project),
    );
    let location = require(
        "vertex.location",
        "MIRRORSYNC_VERTEX_LOCATION",
        pick("MIRRORSYNC_VERTEX_LOCATION", file.vertex.location),
    );
    let model = require(
        "vertex.model",
        "MIRRORSYNC_VERTEX_MODEL",
        pick("MIRRORSYNC_VERTEX_MODEL", file.vertex.model),
    );

    if !missing.is_empty() {
        return Err(ConfigError::Missing { fields: missing });
    }

    let path_prefix = pick("MIRRORSYNC_PATH_PREFIX", file.path_prefix).unwrap_or_default();
    let (store_path, output_dir) = local_paths(file.store_path, file.output_dir, env);

    let timeout_secs = parse_num(
        "timeout_secs",
        lookup("MIRRORSYNC_TIMEOUT_SECS"),
        file.timeout_secs,
    )?
    .unwrap_or(DEFAULT_TIMEOUT_SECS);
    let jobs = parse_num("jobs", lookup("MIRRORSYNC_JOBS"), file.jobs)?.unwrap_or(1);
    let max_output_tokens = parse_num(
        "vertex.max_output_tokens",
        lookup("MIRRORSYNC_MAX_OUTPUT_TOKENS"),
        file.vertex.max_output_tokens,
    )?
    .unwrap_or(DEFAULT_MAX_OUTPUT_TOKENS);

    let config = SyncConfig {
        repo: RepoRef { owner, repo },
        filter: ListingFilter {
            path_prefix,
            extension,
        },
        store_path,
        output_dir,
        prompt,
        timeout_secs,
        jobs,
        vertex: VertexConfig {
            project,
            location,
            model,
            max_output_tokens,
            endpoint: pick("MIRRORSYNC_VERTEX_ENDPOINT", file.vertex.endpoint),
            access_token: pick_first(
                &["MIRRORSYNC_VERTEX_TOKEN", "GOOGLE_OAUTH_ACCESS_TOKEN"],
                file.vertex.access_token,
            ),
        },
        github: GithubConfig {
            api_url: pick("MIRRORSYNC_GITHUB_API", file.github.api_url)
                .unwrap_or_else(|| DEFAULT_GITHUB_API.to_string())
                .trim_end_matches('/')
                .to_string(),
            raw_url: pick("MIRRORSYNC_GITHUB_RAW", file.github.raw_url)
                .unwrap_or_else(|| DEFAULT_GITHUB_RAW.to_string())
                .trim_end_matches('/')
                .to_string(),
            token: pick_first(
                &["MIRRORSYNC_GITHUB_TOKEN", "GITHUB_TOKEN"],
                file.github.token,
            ),
        },
    };
    config.validate()?;
    Ok(config)
}

/// Load configuration from the resolved config file and the process
/// environment.
pub fn load(explicit: Option<&Path>) -> Result<SyncConfig, ConfigError> {
    load_with(resolved_file(explicit)?, &|var| std::env::var(var).ok())
}

/// The settings needed to inspect local state without contacting any
/// service. Nothing here is required.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocalConfig {
    /// Set when both owner and repo are configured.
    pub repo: Option<RepoRef>,
    pub store_path: PathBuf,
    pub output_dir: PathBuf,
}

/// Merge `file` with `env` into a [`LocalConfig`].
pub fn load_local_with(file: FileConfig, env: &dyn Fn(&str) -> Option<String>) -> LocalConfig {
    let pick =
        |var: &str, fallback: Option<String>| non_blank(env(var)).or_else(|| non_blank(fallback));
    let repo = match (
        pick("MIRRORSYNC_OWNER", file.owner),
        pick("MIRRORSYNC_REPO", file.repo),
    ) {
        (Some(owner), Some(repo)) => Some(RepoRef { owner, repo }),
        _ => None,
    };
    let (store_path, output_dir) = local_paths(file.store_path, file.output_dir, env);
    LocalConfig {
        repo,
        store_path,
        output_dir,
    }
}

/// [`load_local_with`] over the resolved config file and the process
/// environment.
pub fn load_local(explicit: Option<&Path>) -> Result<LocalConfig, ConfigError> {
    Ok(load_local_with(resolved_file(explicit)?, &|var| {
        std::env::var(var).ok()
    }))
}

fn resolved_file(explicit: Option<&Path>) -> Result<FileConfig, ConfigError> {
    let cwd = std::env::current_dir().map_err(|source| ConfigError::Io {
        path: PathBuf::from("."),
        source,
    })?;
    match resolve_config_path(explicit, &cwd) {
        Some(path) => read_file_config(&path),
        None => Ok(FileConfig::default()),
    }
}

fn local_paths(
    store_path: Option<PathBuf>,
    output_dir: Option<PathBuf>,
    env: &dyn Fn(&str) -> Option<String>,
) -> (PathBuf, PathBuf) {
    let store_path = non_blank(env("MIRRORSYNC_STORE_PATH"))
        .map(PathBuf::from)
        .or(store_path)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_STORE_PATH));
    let output_dir = non_blank(env("MIRRORSYNC_OUTPUT_DIR"))
        .map(PathBuf::from)
        .or(output_dir)
        .unwrap_or_else(|| PathBuf::from("."));
    (store_path, output_dir)
}

/// Trimmed value, or `None` when blank. Applies to file and env values alike.
fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_num<T: std::str::FromStr>(
    field: &str,
    env_value: Option<String>,
    file_value: Option<T>,
) -> Result<Option<T>, ConfigError> {
    match env_value {
        Some(raw) => raw
            .parse::<T>()
            .map(Some)
            .map_err(|_| invalid(field, format!("`{raw}` is not a valid number"))),
        None => Ok(file_value),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
