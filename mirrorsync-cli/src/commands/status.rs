//! `mirrorsync status`: offline view of the fingerprint store.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use mirrorsync_core::LocalConfig;
use mirrorsync_sync::{fingerprint_store, writer};

use super::load_local_config;

/// Arguments for `mirrorsync status`.
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

impl StatusArgs {
    pub fn run(self, config_path: Option<&Path>) -> Result<()> {
        let config = load_local_config(config_path)?;
        let report = build_report(&config)?;
        if self.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&report).context("failed to serialize status JSON")?
            );
            return Ok(());
        }
        print_table(&report);
        Ok(())
    }
}

#[derive(Debug, Serialize)]
struct StatusReport {
    repo: Option<String>,
    store_exists: bool,
    store_path: String,
    last_sync_at: Option<String>,
    last_sync_age: String,
    tracked: usize,
    missing: usize,
    files: Vec<TrackedFile>,
}

#[derive(Debug, Serialize)]
struct TrackedFile {
    path: String,
    fingerprint: String,
    output: Option<String>,
    present: bool,
}

#[derive(Tabled)]
struct StatusTableRow {
    #[tabled(rename = "path")]
    path: String,
    #[tabled(rename = "fingerprint")]
    fingerprint: String,
    #[tabled(rename = "output")]
    output: String,
}

fn build_report(config: &LocalConfig) -> Result<StatusReport> {
    let store = fingerprint_store::load_at(&config.store_path).with_context(|| {
        format!(
            "failed to read fingerprint store {}",
            config.store_path.display()
        )
    })?;
    let (last_sync_at, last_sync_age) = last_sync(&config.store_path);

    let files: Vec<TrackedFile> = store
        .into_iter()
        .map(|(path, fingerprint)| {
            let output = writer::output_path(&config.output_dir, &path).ok();
            let present = output.as_deref().is_some_and(Path::is_file);
            TrackedFile {
                output: output.map(|p| p.display().to_string()),
                path,
                fingerprint,
                present,
            }
        })
        .collect();
    let missing = files.iter().filter(|f| !f.present).count();

    Ok(StatusReport {
        repo: config.repo.as_ref().map(ToString::to_string),
        store_exists: fingerprint_store::store_exists(&config.store_path),
        store_path: config.store_path.display().to_string(),
        last_sync_at,
        last_sync_age,
        tracked: files.len(),
        missing,
        files,
    })
}

/// Store modification time as RFC 3339 plus a short age; `never` when the
/// store does not exist yet.
fn last_sync(store_path: &Path) -> (Option<String>, String) {
    let Ok(modified) = std::fs::metadata(store_path).and_then(|m| m.modified()) else {
        return (None, "never".to_string());
    };
    let at: DateTime<Utc> = modified.into();
    (Some(at.to_rfc3339()), format_age(at))
}

fn format_age(timestamp: DateTime<Utc>) -> String {
    let seconds = Utc::now()
        .signed_duration_since(timestamp)
        .num_seconds()
        .max(0);
    match seconds {
        s if s < 60 => format!("{s}s ago"),
        s if s < 60 * 60 => format!("{}m ago", s / 60),
        s if s < 60 * 60 * 24 => format!("{}h ago", s / (60 * 60)),
        s => format!("{}d ago", s / (60 * 60 * 24)),
    }
}

fn short_fingerprint(fingerprint: &str) -> String {
    fingerprint.chars().take(12).collect()
}

fn print_table(report: &StatusReport) {
    println!(
        "mirrorsync v{} | {} | {} tracked | {} missing | last sync {}",
        env!("CARGO_PKG_VERSION"),
        report.repo.as_deref().unwrap_or("-"),
        report.tracked,
        report.missing,
        report.last_sync_age,
    );

    if !report.store_exists {
        println!("No fingerprint store at {}.", report.store_path);
    }
    if report.files.is_empty() {
        println!("No fingerprints recorded yet. Run 'mirrorsync sync' first.");
        return;
    }

    let rows: Vec<StatusTableRow> = report
        .files
        .iter()
        .map(|f| StatusTableRow {
            path: f.path.clone(),
            fingerprint: short_fingerprint(&f.fingerprint),
            output: if f.present {
                "■ present".green().to_string()
            } else {
                "■ missing".red().to_string()
            },
        })
        .collect();
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");

    if report.missing > 0 {
        println!(
            "{} output(s) missing locally; they are only rewritten when the source changes.",
            report.missing
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn age_buckets() {
        let now = Utc::now();
        assert_eq!(format_age(now), "0s ago");
        assert_eq!(format_age(now - Duration::minutes(5)), "5m ago");
        assert_eq!(format_age(now - Duration::hours(3)), "3h ago");
        assert_eq!(format_age(now - Duration::days(2)), "2d ago");
    }

    #[test]
    fn future_timestamps_clamp_to_zero() {
        assert_eq!(format_age(Utc::now() + Duration::hours(1)), "0s ago");
    }

    #[test]
    fn fingerprints_are_shortened() {
        assert_eq!(
            short_fingerprint("3b18e512dba79e4c8300dd08aeb37f8e728b8dad"),
            "3b18e512dba7"
        );
        assert_eq!(short_fingerprint("abc"), "abc");
    }
}
