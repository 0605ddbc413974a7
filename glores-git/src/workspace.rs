//! Workspace index operations.
//!
//! - [`update_index`] snapshots every repository in a workspace into one
//!   repository's `.git/glores.yaml`.
//! - [`apply_index`] checks every workspace repository out at the commit
//!   pinned in that index.

use std::path::{Path, PathBuf};

use serde::Serialize;

use glores_core::{index, IndexDocument, IndexError};

use crate::discover::discover_repos;
use crate::error::GitError;
use crate::repo;

// ---------------------------------------------------------------------------
// update
// ---------------------------------------------------------------------------

/// Result of a successful [`update_index`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateSummary {
    pub index_path: PathBuf,
    pub document: IndexDocument,
}

/// Rewrite `<repo>/.git/glores.yaml` from the current state of `workspace`.
///
/// `repo-info` holds `repo` itself; `ws-status` holds every discovered
/// repository whose snapshot differs from it. Repositories that cannot be
/// read are logged and left out; `repo` itself being unreadable is an error.
/// Detached checkouts are included with branch `HEAD` rather than dropped.
pub fn update_index(workspace: &Path, repo: &Path) -> Result<UpdateSummary, GitError> {
    let repos = discover_repos(workspace)?;
    let current = repo::repo_info(repo)?;

    let mut document = IndexDocument {
        repo_info: vec![current],
        ws_status: Vec::new(),
    };
    for path in &repos {
        match repo::repo_info(path) {
            Ok(info) => {
                if !document.repo_info.contains(&info) {
                    document.ws_status.push(info);
                }
            }
            Err(err) => {
                tracing::warn!(repo = %path.display(), error = %err, "skipping repository");
            }
        }
    }

    let index_path = index::save(repo, &document)?;
    tracing::info!(
        repo = %repo.display(),
        tracked = document.ws_status.len(),
        "workspace index updated"
    );
    Ok(UpdateSummary {
        index_path,
        document,
    })
}

// ---------------------------------------------------------------------------
// apply
// ---------------------------------------------------------------------------

/// Outcome for one workspace repository during [`apply_index`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ApplyOutcome {
    CheckedOut { commit: String },
    /// Pinned, but git reports the repository as bare.
    SkippedBare,
    Failed { error: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApplyEntry {
    pub name: String,
    pub path: PathBuf,
    #[serde(flatten)]
    pub outcome: ApplyOutcome,
}

impl ApplyEntry {
    pub fn is_failure(&self) -> bool {
        matches!(self.outcome, ApplyOutcome::Failed { .. })
    }
}

/// Check out every pinned repository in `workspace` at its indexed commit.
///
/// Only repositories whose directory name appears in the index with a
/// non-empty commit are touched. A failing checkout is recorded and the
/// remaining repositories are still processed.
pub fn apply_index(workspace: &Path, repo: &Path) -> Result<Vec<ApplyEntry>, GitError> {
    let document = index::load(repo)?;
    if document.repo_info.is_empty() {
        return Err(IndexError::MissingRepoInfo {
            path: index::index_path(repo),
        }
        .into());
    }
    let pins = document.commit_pins();
    let repos = discover_repos(workspace)?;

    let mut entries = Vec::new();
    for path in repos {
        let name = match path.file_name() {
            Some(name) => name.to_string_lossy().into_owned(),
            None => continue,
        };
        let Some((_, commit)) = pins.iter().find(|(pinned, _)| *pinned == name) else {
            tracing::debug!(repo = %name, "not pinned in index");
            continue;
        };
        if commit.is_empty() {
            continue;
        }

        let outcome = match repo::is_bare(&path) {
            Ok(true) => ApplyOutcome::SkippedBare,
            Ok(false) => match repo::checkout(&path, commit) {
                Ok(()) => {
                    tracing::info!(repo = %name, %commit, "checked out");
                    ApplyOutcome::CheckedOut {
                        commit: commit.clone(),
                    }
                }
                Err(err) => ApplyOutcome::Failed {
                    error: err.to_string(),
                },
            },
            Err(err) => ApplyOutcome::Failed {
                error: err.to_string(),
            },
        };
        if let ApplyOutcome::Failed { error } = &outcome {
            tracing::warn!(repo = %name, %error, "checkout failed");
        }
        entries.push(ApplyEntry {
            name,
            path,
            outcome,
        });
    }
    Ok(entries)
}
