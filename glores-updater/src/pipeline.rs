//! The provisioning + update loop.
//!
//! ## Per-candidate protocol
//!
//! 1. `repo_dir = workspace_root / candidate`; skip if it is not a directory.
//! 2. Ensure `repo_dir/.github` exists; on failure record it and stop here.
//! 3. Invoke the update runner with `(workspace_root, repo_dir)`.
//!
//! Per-candidate failures become report entries and never leave the loop;
//! a panicking runner counts as a failed update for that candidate.
//! Only an unusable workspace root fails the run, before anything is touched.
//! Cancellation is checked before each candidate starts, never mid-candidate.

use std::any::Any;
use std::io::ErrorKind;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use glores_core::CandidateName;

use crate::context::RunContext;
use crate::error::RunError;
use crate::provision::{ensure_metadata_dir, plan_metadata_dir};
use crate::report::{CandidateReport, Outcome, RunReport};
use crate::runner::UpdateRunner;

/// Knobs that apply to every candidate of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunOptions {
    /// Report what would happen; create nothing and invoke nothing.
    pub dry_run: bool,
}

/// Fail fast unless `workspace_root` is an existing directory.
pub fn check_workspace_root(workspace_root: &Path) -> Result<(), RunError> {
    match std::fs::metadata(workspace_root) {
        Ok(md) if md.is_dir() => Ok(()),
        Ok(_) => Err(RunError::WorkspaceNotADirectory {
            path: workspace_root.to_path_buf(),
        }),
        Err(e) if e.kind() == ErrorKind::NotFound => Err(RunError::WorkspaceNotFound {
            path: workspace_root.to_path_buf(),
        }),
        Err(e) => Err(RunError::WorkspaceIo {
            path: workspace_root.to_path_buf(),
            source: e,
        }),
    }
}

/// Process a single candidate to its terminal state.
pub fn process_candidate(
    ctx: &RunContext,
    runner: &dyn UpdateRunner,
    options: RunOptions,
) -> CandidateReport {
    let started = Instant::now();
    let outcome = candidate_outcome(ctx, runner, options);

    match &outcome {
        Outcome::MetadataFailed { error } | Outcome::UpdateFailed { error, .. } => {
            tracing::warn!(candidate = %ctx.candidate(), outcome = outcome.label(), %error, "candidate failed");
        }
        other => {
            tracing::info!(candidate = %ctx.candidate(), outcome = other.label(), "candidate done");
        }
    }

    CandidateReport {
        candidate: ctx.candidate().clone(),
        outcome,
        duration_ms: u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
    }
}

fn candidate_outcome(ctx: &RunContext, runner: &dyn UpdateRunner, options: RunOptions) -> Outcome {
    if !ctx.repo_dir().is_dir() {
        tracing::debug!(candidate = %ctx.candidate(), path = %ctx.repo_dir().display(), "repository missing, skipping");
        return Outcome::Skipped;
    }

    if options.dry_run {
        return match plan_metadata_dir(ctx) {
            Ok(plan) => Outcome::Planned {
                would_create_metadata: plan.created(),
            },
            Err(err) => Outcome::MetadataFailed {
                error: err.to_string(),
            },
        };
    }

    let provisioned = match ensure_metadata_dir(ctx) {
        Ok(p) => p,
        Err(err) => {
            return Outcome::MetadataFailed {
                error: err.to_string(),
            }
        }
    };

    tracing::debug!(candidate = %ctx.candidate(), runner = %runner.describe(), "invoking update");
    let updated = panic::catch_unwind(AssertUnwindSafe(|| {
        runner.update(ctx.workspace_root(), ctx.repo_dir())
    }));
    match updated {
        Ok(Ok(())) => Outcome::Succeeded {
            metadata_created: provisioned.created(),
        },
        Ok(Err(err)) => Outcome::UpdateFailed {
            metadata_created: provisioned.created(),
            error: err.to_string(),
        },
        Err(payload) => Outcome::UpdateFailed {
            metadata_created: provisioned.created(),
            error: format!("updater panicked: {}", panic_message(payload.as_ref())),
        },
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        *msg
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.as_str()
    } else {
        "unknown panic"
    }
}

// ---------------------------------------------------------------------------
// Sequential
// ---------------------------------------------------------------------------

/// Run every candidate, strictly one after another, in list order.
pub fn run(
    workspace_root: &Path,
    candidates: &[CandidateName],
    runner: &dyn UpdateRunner,
    options: RunOptions,
    cancel: &CancellationToken,
) -> Result<RunReport, RunError> {
    check_workspace_root(workspace_root)?;
    let started_at = Utc::now();
    tracing::info!(
        workspace = %workspace_root.display(),
        candidates = candidates.len(),
        dry_run = options.dry_run,
        "run started"
    );

    let mut entries = Vec::with_capacity(candidates.len());
    let mut cancelled = false;
    for candidate in candidates {
        if cancel.is_cancelled() {
            tracing::warn!(next = %candidate, "run cancelled");
            cancelled = true;
            break;
        }
        let ctx = RunContext::new(workspace_root, candidate.clone());
        entries.push(process_candidate(&ctx, runner, options));
    }

    Ok(finish(workspace_root, started_at, options, cancelled, entries))
}

// ---------------------------------------------------------------------------
// Concurrent
// ---------------------------------------------------------------------------

/// Run candidates on a bounded pool of `jobs` blocking workers.
///
/// Each candidate is still processed by exactly one worker with the same
/// protocol as [`run`]; entries come back in list order regardless of
/// completion order.
pub async fn run_concurrent(
    workspace_root: PathBuf,
    candidates: Vec<CandidateName>,
    runner: Arc<dyn UpdateRunner>,
    options: RunOptions,
    jobs: usize,
    cancel: CancellationToken,
) -> Result<RunReport, RunError> {
    check_workspace_root(&workspace_root)?;
    let started_at = Utc::now();
    tracing::info!(
        workspace = %workspace_root.display(),
        candidates = candidates.len(),
        jobs,
        dry_run = options.dry_run,
        "concurrent run started"
    );

    let semaphore = Arc::new(Semaphore::new(jobs.max(1)));
    let mut workers = JoinSet::new();
    let mut cancelled = false;

    for (position, candidate) in candidates.into_iter().enumerate() {
        let permit = tokio::select! {
            biased;
            _ = cancel.cancelled() => None,
            permit = semaphore.clone().acquire_owned() => permit.ok(),
        };
        let Some(permit) = permit.filter(|_| !cancel.is_cancelled()) else {
            tracing::warn!(next = %candidate, "run cancelled");
            cancelled = true;
            break;
        };

        let ctx = RunContext::new(&workspace_root, candidate);
        let runner = runner.clone();
        workers.spawn_blocking(move || {
            let report = process_candidate(&ctx, runner.as_ref(), options);
            drop(permit);
            (position, report)
        });
    }

    let mut indexed = Vec::new();
    while let Some(joined) = workers.join_next().await {
        let entry = joined.map_err(|err| RunError::Worker(err.to_string()))?;
        indexed.push(entry);
    }
    indexed.sort_by_key(|(position, _)| *position);
    let entries = indexed.into_iter().map(|(_, report)| report).collect();

    Ok(finish(&workspace_root, started_at, options, cancelled, entries))
}

fn finish(
    workspace_root: &Path,
    started_at: chrono::DateTime<Utc>,
    options: RunOptions,
    cancelled: bool,
    entries: Vec<CandidateReport>,
) -> RunReport {
    let report = RunReport {
        workspace_root: workspace_root.to_path_buf(),
        started_at,
        finished_at: Utc::now(),
        dry_run: options.dry_run,
        cancelled,
        entries,
    };
    let counts = report.counts();
    tracing::info!(
        succeeded = counts.succeeded,
        skipped = counts.skipped,
        failed = counts.metadata_failed + counts.update_failed,
        cancelled,
        "run finished"
    );
    report
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
