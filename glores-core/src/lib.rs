//! glores core library — domain types, configuration, index persistence, errors.
//!
//! - [`types`] — candidate names and index documents
//! - [`config`] — config file discovery, overrides and validation
//! - [`index`] — `<repo>/.git/glores.yaml` load / save
//! - [`error`] — [`ConfigError`], [`IndexError`]

pub mod config;
pub mod error;
pub mod index;
pub mod types;

pub use config::{ConfigFile, Overrides, UpdaterConfig, WorkspaceConfig};
pub use error::{ConfigError, IndexError};
pub use types::{CandidateName, IndexDocument, RepoInfo};
