//! Error types for glores-updater.
//!
//! Only [`RunError`] ever leaves a run. [`MetadataError`] and [`UpdateError`]
//! are per-candidate and end up as report entries.

use std::path::PathBuf;

use thiserror::Error;

use glores_git::GitError;

/// Whole-run failures: nothing was processed.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("workspace root {path} does not exist")]
    WorkspaceNotFound { path: PathBuf },

    #[error("workspace root {path} is not a directory")]
    WorkspaceNotADirectory { path: PathBuf },

    #[error("cannot access workspace root {path}: {source}")]
    WorkspaceIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A worker task panicked or was aborted in concurrent mode.
    #[error("worker task failed: {0}")]
    Worker(String),
}

/// The metadata directory of one candidate could not be provisioned.
#[derive(Debug, Error)]
pub enum MetadataError {
    /// Something other than a directory already occupies the path.
    #[error("{path} exists and is not a directory")]
    NotADirectory { path: PathBuf },

    #[error("failed to create {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// The update collaborator reported failure for one candidate.
#[derive(Debug, Error)]
pub enum UpdateError {
    #[error("failed to start `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// Non-zero exit; `code` is `None` when the process was killed by a signal.
    #[error("`{program}` exited with {}{}", exit_label(.code), stderr_suffix(.stderr))]
    Exit {
        program: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("builtin update failed: {0}")]
    Builtin(#[from] GitError),
}

fn exit_label(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("status {code}"),
        None => "a signal".to_string(),
    }
}

fn stderr_suffix(stderr: &str) -> String {
    if stderr.is_empty() {
        String::new()
    } else {
        format!(": {stderr}")
    }
}

pub(crate) fn metadata_io(path: impl Into<PathBuf>, source: std::io::Error) -> MetadataError {
    MetadataError::Io {
        path: path.into(),
        source,
    }
}
