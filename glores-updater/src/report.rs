//! Per-candidate outcomes and the overall run verdict.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::Serialize;

use glores_core::CandidateName;

/// Terminal state of one candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    Succeeded { metadata_created: bool },
    /// The repository directory does not exist; not a failure.
    Skipped,
    MetadataFailed { error: String },
    UpdateFailed { metadata_created: bool, error: String },
    /// Dry run: what a real run would have done.
    Planned { would_create_metadata: bool },
}

impl Outcome {
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            Outcome::MetadataFailed { .. } | Outcome::UpdateFailed { .. }
        )
    }

    /// `true` if the update collaborator was invoked.
    pub fn update_attempted(&self) -> bool {
        matches!(self, Outcome::Succeeded { .. } | Outcome::UpdateFailed { .. })
    }

    pub fn label(&self) -> &'static str {
        match self {
            Outcome::Succeeded { .. } => "succeeded",
            Outcome::Skipped => "skipped",
            Outcome::MetadataFailed { .. } => "metadata-error",
            Outcome::UpdateFailed { .. } => "update-error",
            Outcome::Planned { .. } => "planned",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CandidateReport {
    pub candidate: CandidateName,
    #[serde(flatten)]
    pub outcome: Outcome,
    pub duration_ms: u64,
}

/// Overall verdict, derived from every entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RunStatus {
    Success,
    PartialFailure { failed: Vec<CandidateName> },
    /// Stopped between candidates; `failed` covers the candidates that ran.
    Cancelled { failed: Vec<CandidateName> },
}

impl RunStatus {
    /// Process exit code: 0 success, 1 partial failure, 130 cancelled.
    ///
    /// Code 2 ("could not start") belongs to `RunError` and never appears here.
    pub fn exit_code(&self) -> i32 {
        match self {
            RunStatus::Success => 0,
            RunStatus::PartialFailure { .. } => 1,
            RunStatus::Cancelled { .. } => 130,
        }
    }
}

/// Everything a run did, in candidate-list order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub workspace_root: PathBuf,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub dry_run: bool,
    pub cancelled: bool,
    pub entries: Vec<CandidateReport>,
}

/// Entry counts by outcome.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Counts {
    pub succeeded: usize,
    pub skipped: usize,
    pub metadata_failed: usize,
    pub update_failed: usize,
    pub planned: usize,
}

impl RunReport {
    pub fn get(&self, candidate: &str) -> Option<&CandidateReport> {
        self.entries.iter().find(|e| e.candidate.as_str() == candidate)
    }

    pub fn failed(&self) -> Vec<CandidateName> {
        self.entries
            .iter()
            .filter(|e| e.outcome.is_failure())
            .map(|e| e.candidate.clone())
            .collect()
    }

    pub fn update_attempts(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| e.outcome.update_attempted())
            .count()
    }

    pub fn counts(&self) -> Counts {
        let mut counts = Counts::default();
        for entry in &self.entries {
            match entry.outcome {
                Outcome::Succeeded { .. } => counts.succeeded += 1,
                Outcome::Skipped => counts.skipped += 1,
                Outcome::MetadataFailed { .. } => counts.metadata_failed += 1,
                Outcome::UpdateFailed { .. } => counts.update_failed += 1,
                Outcome::Planned { .. } => counts.planned += 1,
            }
        }
        counts
    }

    /// A dry run that completes is a `Success` even when it found collisions;
    /// those stay visible as `metadata_failed` entries.
    pub fn status(&self) -> RunStatus {
        let failed = self.failed();
        if self.cancelled {
            RunStatus::Cancelled { failed }
        } else if failed.is_empty() || self.dry_run {
            RunStatus::Success
        } else {
            RunStatus::PartialFailure { failed }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
