//! `mirrorsync sync`: transform changed files, write outputs, commit.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use mirrorsync_sync::{pipeline, FileOutcome, RunMode, SyncReport};

use super::{load_config, Clients};

/// Arguments for `mirrorsync sync`.
#[derive(Args, Debug)]
pub struct SyncArgs {
    /// Transform but write no outputs and leave the fingerprint store alone.
    #[arg(long)]
    pub dry_run: bool,

    /// Process up to N files concurrently.
    #[arg(long, value_name = "N")]
    pub jobs: Option<usize>,

    /// Write outputs under DIR instead of the configured output directory.
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Emit the run report as JSON.
    #[arg(long)]
    pub json: bool,
}

impl SyncArgs {
    pub fn run(self, config_path: Option<&Path>) -> Result<()> {
        let mut config = load_config(config_path)?;
        if let Some(jobs) = self.jobs {
            config.jobs = jobs;
        }
        if let Some(dir) = self.output_dir {
            config.output_dir = dir;
        }

        let clients = Clients::from_config(&config);
        let mode = if self.dry_run {
            RunMode::DryRun
        } else {
            RunMode::Sync
        };
        let report = pipeline::run(&config, &clients.collaborators(), mode)
            .with_context(|| format!("sync failed for {}", config.repo))?;

        if self.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&report).context("failed to serialize sync report")?
            );
        } else {
            print_report(&report, self.dry_run);
        }
        Ok(())
    }
}

fn print_report(report: &SyncReport, dry_run: bool) {
    let prefix = if dry_run { "[dry-run] " } else { "" };
    if report.outcomes.is_empty() {
        println!(
            "{prefix}✓ {} — nothing changed ({} file(s) up to date)",
            report.repo, report.unchanged
        );
        return;
    }

    let written = report.count(|o| {
        matches!(
            o,
            FileOutcome::Written { .. } | FileOutcome::WouldWrite { .. }
        )
    });
    let skipped = report.outcomes.len() - written;
    let mark = if skipped == 0 {
        "✓".green().to_string()
    } else {
        "!".yellow().to_string()
    };
    println!(
        "{prefix}{mark} {} synced ({} written, {} skipped, {} unchanged)",
        report.repo, written, skipped, report.unchanged
    );

    for outcome in &report.outcomes {
        match outcome {
            FileOutcome::Written { output, .. } => println!("  ✎  {}", output.display()),
            FileOutcome::WouldWrite { output, .. } => println!("  ~  {}", output.display()),
            FileOutcome::Pending { path, .. } => println!("  ·  {path}"),
            FileOutcome::Empty { path } => {
                println!("  {}  {path} (empty result)", "∅".yellow())
            }
            FileOutcome::Failed { path, reason } => {
                println!("  {}  {path}: {reason}", "✗".red())
            }
        }
    }

    if report.committed > 0 {
        println!(
            "{} fingerprint(s) committed to {}",
            report.committed,
            report.store_path.display()
        );
    }
    if report.has_skips() {
        println!("Skipped files will be retried on the next run.");
    }
}
