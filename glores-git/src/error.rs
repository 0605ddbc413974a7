//! Error types for glores-git.

use std::path::PathBuf;

use thiserror::Error;

use glores_core::IndexError;

/// All errors that can arise from git probing and index operations.
#[derive(Debug, Error)]
pub enum GitError {
    /// The `git` executable could not be started.
    #[error("failed to run git in {path}: {source}")]
    Spawn {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// `git` ran but exited unsuccessfully.
    #[error("`git {args}` failed in {path}: {stderr}")]
    Command {
        args: String,
        path: PathBuf,
        stderr: String,
    },

    #[error("{path} is not a git repository")]
    NotARepository { path: PathBuf },

    #[error("workspace {path} is not a directory")]
    WorkspaceNotFound { path: PathBuf },

    #[error("index error: {0}")]
    Index(#[from] IndexError),
}
