//! Workspace index persistence.
//!
//! # Storage layout
//!
//! ```text
//! <repo>/
//!   .git/
//!     glores.yaml     (index — rewritten on every update)
//! ```
//!
//! The index lives inside `.git` so it is never committed by accident.
//! Writes go through a `.tmp` sibling and a rename, so readers never observe a
//! half-written document.

use std::path::{Path, PathBuf};

use crate::error::{index_io, IndexError};
use crate::types::IndexDocument;

/// File name of the index inside a repository's `.git` directory.
pub const INDEX_FILE: &str = "glores.yaml";

/// `<repo>/.git/glores.yaml` — pure, no I/O.
pub fn index_path(repo: &Path) -> PathBuf {
    repo.join(".git").join(INDEX_FILE)
}

fn git_dir(repo: &Path) -> Result<PathBuf, IndexError> {
    let dir = repo.join(".git");
    if !dir.is_dir() {
        return Err(IndexError::NotAGitRepository {
            path: repo.to_path_buf(),
        });
    }
    Ok(dir)
}

/// Load the index of `repo`.
///
/// Returns an empty document when the repository has never been indexed,
/// `IndexError::NotAGitRepository` when `repo/.git` is missing and
/// `IndexError::Parse` when the YAML is malformed.
pub fn load(repo: &Path) -> Result<IndexDocument, IndexError> {
    git_dir(repo)?;
    let path = index_path(repo);
    if !path.exists() {
        return Ok(IndexDocument::default());
    }
    let contents = std::fs::read_to_string(&path).map_err(|e| index_io(&path, e))?;
    if contents.trim().is_empty() {
        return Ok(IndexDocument::default());
    }
    serde_yaml::from_str(&contents).map_err(|e| IndexError::Parse { path, source: e })
}

/// Atomically save `doc` as the index of `repo`.
///
/// Write flow: serialize → `glores.yaml.tmp` sibling → `rename`.
/// The tmp file is removed again if the rename fails.
pub fn save(repo: &Path, doc: &IndexDocument) -> Result<PathBuf, IndexError> {
    let dir = git_dir(repo)?;
    let path = dir.join(INDEX_FILE);
    let tmp = dir.join(format!("{INDEX_FILE}.tmp"));

    let yaml = serde_yaml::to_string(doc)?;
    std::fs::write(&tmp, yaml).map_err(|e| index_io(&tmp, e))?;
    if let Err(e) = std::fs::rename(&tmp, &path) {
        let _ = std::fs::remove_file(&tmp);
        return Err(index_io(&path, e));
    }
    tracing::debug!(path = %path.display(), "index written");
    Ok(path)
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
