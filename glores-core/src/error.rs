//! Error types for glores-core.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while locating, parsing or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Underlying I/O failure, annotated with the offending path.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// YAML parse error on load — includes file path and line context from serde_yaml.
    #[error("failed to parse config at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// An explicitly requested config file does not exist.
    #[error("config not found at {path}")]
    ConfigNotFound { path: PathBuf },

    /// `dirs::home_dir()` returned `None` — cannot locate `~/.glores/`.
    #[error("cannot determine home directory; set $HOME or equivalent")]
    HomeNotFound,

    /// No workspace root was given on the command line or in a config file.
    #[error("no workspace root configured; pass --workspace or set workspace_root in the config")]
    MissingWorkspaceRoot,

    #[error("invalid candidate name '{name}': {reason}")]
    InvalidCandidate { name: String, reason: String },

    #[error("candidate '{name}' is listed more than once")]
    DuplicateCandidate { name: String },

    #[error("jobs must be at least 1")]
    InvalidJobs,

    #[error("command updater has an empty program")]
    EmptyProgram,
}

/// Errors raised while reading or writing a `glores.yaml` index.
#[derive(Debug, Error)]
pub enum IndexError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// YAML serialization error (write path).
    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("failed to parse index at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// The repository has no `.git` directory to hold the index.
    #[error("{path} is not a git repository (no .git directory)")]
    NotAGitRepository { path: PathBuf },

    /// The index exists but names no owning repository.
    #[error("index at {path} has no repo-info entry")]
    MissingRepoInfo { path: PathBuf },
}

pub(crate) fn config_io(path: impl Into<PathBuf>, source: std::io::Error) -> ConfigError {
    ConfigError::Io {
        path: path.into(),
        source,
    }
}

pub(crate) fn index_io(path: impl Into<PathBuf>, source: std::io::Error) -> IndexError {
    IndexError::Io {
        path: path.into(),
        source,
    }
}
