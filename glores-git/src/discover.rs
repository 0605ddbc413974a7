//! Repository discovery under a workspace directory.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::GitError;

/// Every directory under `workspace` (the workspace itself included) that
/// contains a `.git` directory, sorted by path.
///
/// `.git` directories are never descended into. Nested checkouts are found
/// too. Unreadable subdirectories are logged and skipped.
pub fn discover_repos(workspace: &Path) -> Result<Vec<PathBuf>, GitError> {
    if !workspace.is_dir() {
        return Err(GitError::WorkspaceNotFound {
            path: workspace.to_path_buf(),
        });
    }

    let mut repos = Vec::new();
    let walker = WalkDir::new(workspace)
        .follow_links(false)
        .into_iter()
        .filter_entry(|entry| entry.file_name() != ".git");

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                tracing::warn!(error = %err, "skipping unreadable workspace entry");
                continue;
            }
        };
        if !entry.file_type().is_dir() {
            continue;
        }
        if entry.path().join(".git").is_dir() {
            repos.push(entry.into_path());
        }
    }

    repos.sort();
    Ok(repos)
}
