//! Git probing for glores.
//!
//! Everything here shells out to the `git` executable; no libgit bindings.
//! [`discover_repos`] walks a workspace, [`repo_info`] snapshots a single
//! checkout, and [`update_index`] / [`apply_index`] implement the workspace
//! index round trip.

pub mod discover;
mod error;
pub mod repo;
pub mod workspace;

pub use discover::discover_repos;
pub use error::GitError;
pub use repo::{checkout, repo_info};
pub use workspace::{apply_index, update_index, ApplyEntry, ApplyOutcome, UpdateSummary};
