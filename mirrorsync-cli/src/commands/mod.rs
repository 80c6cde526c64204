//! Subcommand implementations and the wiring they share.

pub mod config;
pub mod plan;
pub mod status;
pub mod sync;

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};

use mirrorsync_core::{config as core_config, LocalConfig, SyncConfig};
use mirrorsync_remote::{GithubLister, HttpClient, RawFetcher, VertexGenerator};
use mirrorsync_sync::Collaborators;

/// Resolve config file + environment into a validated [`SyncConfig`].
pub fn load_config(path: Option<&Path>) -> Result<SyncConfig> {
    core_config::load(path).context("failed to load configuration")
}

/// Resolve only the store path and output directory.
pub fn load_local_config(path: Option<&Path>) -> Result<LocalConfig> {
    core_config::load_local(path).context("failed to load configuration")
}

/// Concrete HTTP collaborators built from one configuration.
pub struct Clients {
    lister: GithubLister,
    fetcher: RawFetcher,
    prompt_fetcher: RawFetcher,
    generator: VertexGenerator,
}

impl Clients {
    pub fn from_config(config: &SyncConfig) -> Self {
        let http = HttpClient::new(Duration::from_secs(config.timeout_secs));
        Self {
            lister: GithubLister::new(
                http.clone(),
                config.github.api_url.clone(),
                config.github.raw_url.clone(),
                config.github.token.clone(),
            ),
            fetcher: RawFetcher::new(http.clone(), config.github.token.clone()),
            // The prompt may live on any host; never forward the repository token.
            prompt_fetcher: RawFetcher::new(http.clone(), None),
            generator: VertexGenerator::new(http, &config.vertex),
        }
    }

    pub fn collaborators(&self) -> Collaborators<'_> {
        Collaborators {
            lister: &self.lister,
            fetcher: &self.fetcher,
            prompt_fetcher: &self.prompt_fetcher,
            generator: &self.generator,
        }
    }
}
