//! `mirrorsync plan`: the change set, without contacting the model.

use std::path::Path;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use mirrorsync_sync::{pipeline, FileOutcome, RunMode};

use super::{load_config, Clients};

/// Arguments for `mirrorsync plan`.
#[derive(Args, Debug)]
pub struct PlanArgs {
    /// Emit the plan as JSON.
    #[arg(long)]
    pub json: bool,
}

impl PlanArgs {
    pub fn run(self, config_path: Option<&Path>) -> Result<()> {
        let config = load_config(config_path)?;
        let clients = Clients::from_config(&config);
        let report = pipeline::run(&config, &clients.collaborators(), RunMode::Plan)
            .with_context(|| format!("plan failed for {}", config.repo))?;

        if self.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&report).context("failed to serialize plan")?
            );
            return Ok(());
        }

        println!(
            "{}: {} listed, {} to transform, {} unchanged",
            report.repo,
            report.listed,
            report.outcomes.len(),
            report.unchanged
        );
        for outcome in &report.outcomes {
            if let FileOutcome::Pending { path, new } = outcome {
                let tag = if *new {
                    "new".green().to_string()
                } else {
                    "modified".yellow().to_string()
                };
                println!("  {tag:>8}  {path}");
            }
        }
        Ok(())
    }
}
