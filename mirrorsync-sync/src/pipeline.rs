//! Orchestrator: the one sync entrypoint used by every CLI command.
//!
//! ```text
//! Init → Listing → Diffing → Processing(i) → Committing → Done
//! ```
//!
//! Per-file decision table for `Processing`:
//!
//! | transformer | writer      | action                      |
//! |-------------|-------------|-----------------------------|
//! | text        | ok          | record path → fingerprint   |
//! | text        | unsafe path | skip, not recorded          |
//! | text        | I/O error   | abort run, nothing committed|
//! | empty       | -           | skip, not recorded          |
//! | failed      | -           | skip, not recorded          |
//!
//! The committed document is the previous store with recorded entries
//! overwritten; entries for files not processed this run are carried
//! forward untouched.

use std::fmt;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use serde::Serialize;

use mirrorsync_core::{
    ContentFetcher, FileDescriptor, FingerprintMap, RepoLister, SyncConfig, TextGenerator,
};

use crate::detector::{self, DetectSummary};
use crate::fingerprint_store;
use crate::transform::{PromptSource, TransformOutcome, Transformer};
use crate::writer::{self, WriteResult};
use crate::SyncError;

/// External services a run talks to, passed in explicitly so tests can
/// substitute fakes.
#[derive(Clone, Copy)]
pub struct Collaborators<'a> {
    pub lister: &'a dyn RepoLister,
    /// Fetches file content (may carry repository credentials).
    pub fetcher: &'a dyn ContentFetcher,
    /// Fetches the prompt document when it is a URL.
    pub prompt_fetcher: &'a dyn ContentFetcher,
    pub generator: &'a dyn TextGenerator,
}

/// How far a run goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Full pipeline: transform, write, commit.
    Sync,
    /// Transform but write nothing and commit nothing.
    DryRun,
    /// List and diff only; the generative service is never called.
    Plan,
}

/// Orchestrator states, used for logging transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Init,
    Listing,
    Diffing,
    Processing,
    Committing,
    Done,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Stage::Init => "init",
            Stage::Listing => "listing",
            Stage::Diffing => "diffing",
            Stage::Processing => "processing",
            Stage::Committing => "committing",
            Stage::Done => "done",
        };
        f.write_str(label)
    }
}

/// What happened to one changed file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FileOutcome {
    /// Output written; fingerprint will be committed.
    Written {
        path: String,
        fingerprint: String,
        output: PathBuf,
    },
    /// Dry run: output would have been written.
    WouldWrite { path: String, output: PathBuf },
    /// Plan only: the file is in the change set.
    Pending { path: String, new: bool },
    /// The service returned nothing; retried next run.
    Empty { path: String },
    /// Fetch/generation failed or the path was unsafe; retried next run.
    Failed { path: String, reason: String },
}

impl FileOutcome {
    pub fn path(&self) -> &str {
        match self {
            FileOutcome::Written { path, .. }
            | FileOutcome::WouldWrite { path, .. }
            | FileOutcome::Pending { path, .. }
            | FileOutcome::Empty { path }
            | FileOutcome::Failed { path, .. } => path,
        }
    }
}

/// Result of a successful run.
#[derive(Debug, Clone, Serialize)]
pub struct SyncReport {
    pub repo: String,
    pub listed: usize,
    pub unchanged: usize,
    pub outcomes: Vec<FileOutcome>,
    /// Number of fingerprints written to the store this run.
    pub committed: usize,
    pub store_path: PathBuf,
}

impl SyncReport {
    pub fn count(&self, pred: impl Fn(&FileOutcome) -> bool) -> usize {
        self.outcomes.iter().filter(|o| pred(o)).count()
    }

    /// `true` when at least one file was skipped and will be retried.
    pub fn has_skips(&self) -> bool {
        self.outcomes
            .iter()
            .any(|o| matches!(o, FileOutcome::Empty { .. } | FileOutcome::Failed { .. }))
    }
}

/// Run the pipeline for `config`.
pub fn run(
    config: &SyncConfig,
    collaborators: &Collaborators<'_>,
    mode: RunMode,
) -> Result<SyncReport, SyncError> {
    enter(Stage::Init);
    config.validate()?;

    enter(Stage::Listing);
    let listing = collaborators
        .lister
        .list(&config.repo, &config.filter)
        .map_err(SyncError::Listing)?;
    if listing.is_empty() {
        return Err(SyncError::EmptyListing {
            repo: config.repo.to_string(),
            prefix: config.filter.path_prefix.clone(),
            extension: config.filter.extension.clone(),
        });
    }
    tracing::info!("{} matching file(s) in {}", listing.len(), config.repo);

    enter(Stage::Diffing);
    let stored = fingerprint_store::load_at(&config.store_path)?;
    let changes = detector::detect(&listing, &stored);
    let summary = detector::summarize(&listing, &stored);
    log_summary(&summary);

    let mut report = SyncReport {
        repo: config.repo.to_string(),
        listed: listing.len(),
        unchanged: summary.unchanged,
        outcomes: Vec::new(),
        committed: 0,
        store_path: config.store_path.clone(),
    };

    if changes.is_empty() {
        enter(Stage::Done);
        tracing::info!("nothing changed since last run");
        return Ok(report);
    }

    if mode == RunMode::Plan {
        report.outcomes = changes
            .iter()
            .map(|d| FileOutcome::Pending {
                path: d.path.0.clone(),
                new: !stored.contains_key(d.path.as_str()),
            })
            .collect();
        enter(Stage::Done);
        return Ok(report);
    }

    enter(Stage::Processing);
    let prompt_source = PromptSource::parse(&config.prompt);
    let prompt = prompt_source.load(collaborators.prompt_fetcher)?;
    let transformer = Transformer::new(
        collaborators.fetcher,
        collaborators.generator,
        prompt,
        config.vertex.max_output_tokens,
    );
    let dry_run = mode == RunMode::DryRun;
    let handle = |d: &FileDescriptor| process_file(config, &transformer, d, dry_run);
    report.outcomes = process_all(&changes, config.jobs, &handle)?;

    if dry_run {
        enter(Stage::Done);
        return Ok(report);
    }

    enter(Stage::Committing);
    let (next, committed) = merge_processed(&stored, &report.outcomes);
    if committed > 0 {
        fingerprint_store::save_at(&config.store_path, &next)?;
        tracing::info!(
            "committed {committed} fingerprint(s) to {}",
            config.store_path.display()
        );
    } else {
        tracing::warn!("no file produced output; fingerprint store left untouched");
    }
    report.committed = committed;

    enter(Stage::Done);
    Ok(report)
}

fn enter(stage: Stage) {
    tracing::debug!("stage: {stage}");
}

fn log_summary(summary: &DetectSummary) {
    tracing::info!(
        "{} changed ({} new), {} unchanged",
        summary.changed,
        summary.new,
        summary.unchanged
    );
}

fn process_file(
    config: &SyncConfig,
    transformer: &Transformer<'_>,
    descriptor: &FileDescriptor,
    dry_run: bool,
) -> Result<FileOutcome, SyncError> {
    let path = descriptor.path.0.clone();
    match transformer.transform(descriptor) {
        TransformOutcome::Text(text) => {
            match writer::write_output(&config.output_dir, &path, &text, dry_run) {
                Ok(WriteResult::Written { path: output }) => Ok(FileOutcome::Written {
                    path,
                    fingerprint: descriptor.fingerprint.0.clone(),
                    output,
                }),
                Ok(WriteResult::WouldWrite { path: output }) => {
                    Ok(FileOutcome::WouldWrite { path, output })
                }
                Err(err @ SyncError::UnsafePath { .. }) => {
                    tracing::warn!("skipping {path}: {err}");
                    Ok(FileOutcome::Failed {
                        path,
                        reason: err.to_string(),
                    })
                }
                Err(err) => Err(err),
            }
        }
        TransformOutcome::Empty => {
            tracing::warn!("skipping {path}: generative service returned no result");
            Ok(FileOutcome::Empty { path })
        }
        TransformOutcome::Failed(reason) => {
            tracing::warn!("skipping {path}: {reason}");
            Ok(FileOutcome::Failed { path, reason })
        }
    }
}

/// Apply `handle` to every change, in order, with up to `jobs` workers.
///
/// Outcomes come back in `changes` order regardless of completion order. The
/// first fatal error stops new files from starting and is returned once the
/// in-flight ones finish.
pub(crate) fn process_all(
    changes: &[FileDescriptor],
    jobs: usize,
    handle: &(dyn Fn(&FileDescriptor) -> Result<FileOutcome, SyncError> + Sync),
) -> Result<Vec<FileOutcome>, SyncError> {
    let workers = jobs.clamp(1, changes.len().max(1));
    if workers == 1 {
        return changes.iter().map(handle).collect();
    }

    let next = AtomicUsize::new(0);
    let abort = AtomicBool::new(false);
    let slots: Mutex<Vec<Option<FileOutcome>>> = Mutex::new(vec![None; changes.len()]);
    let failure: Mutex<Option<SyncError>> = Mutex::new(None);

    std::thread::scope(|scope| {
        for _ in 0..workers {
            scope.spawn(|| loop {
                if abort.load(Ordering::SeqCst) {
                    break;
                }
                let i = next.fetch_add(1, Ordering::SeqCst);
                let Some(descriptor) = changes.get(i) else {
                    break;
                };
                match handle(descriptor) {
                    Ok(outcome) => {
                        if let Ok(mut slots) = slots.lock() {
                            slots[i] = Some(outcome);
                        }
                    }
                    Err(err) => {
                        abort.store(true, Ordering::SeqCst);
                        if let Ok(mut failure) = failure.lock() {
                            failure.get_or_insert(err);
                        }
                        break;
                    }
                }
            });
        }
    });

    if let Some(err) = failure.into_inner().ok().flatten() {
        return Err(err);
    }
    let slots = slots.into_inner().unwrap_or_default();
    Ok(slots.into_iter().flatten().collect())
}

/// Previous store with every written file's fingerprint overwritten.
fn merge_processed(stored: &FingerprintMap, outcomes: &[FileOutcome]) -> (FingerprintMap, usize) {
    let mut next = stored.clone();
    let mut committed = 0;
    for outcome in outcomes {
        if let FileOutcome::Written {
            path, fingerprint, ..
        } = outcome
        {
            next.insert(path.clone(), fingerprint.clone());
            committed += 1;
        }
    }
    (next, committed)
}
