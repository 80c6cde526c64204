//! `mirrorsync config`: show the resolved configuration.

use std::path::Path;

use anyhow::{Context, Result};
use clap::Args;

use super::load_config;

/// Arguments for `mirrorsync config`.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    /// Emit JSON instead of YAML.
    #[arg(long)]
    pub json: bool,
}

impl ConfigArgs {
    pub fn run(self, config_path: Option<&Path>) -> Result<()> {
        let config = load_config(config_path)?.redacted();
        let rendered = if self.json {
            serde_json::to_string_pretty(&config).context("failed to serialize configuration")?
        } else {
            serde_yaml::to_string(&config).context("failed to serialize configuration")?
        };
        println!("{}", rendered.trim_end());
        Ok(())
    }
}
