//! # glores-updater
//!
//! Metadata provisioning and update orchestration over a workspace.
//!
//! Call [`run`] for the sequential pass or [`run_concurrent`] for a bounded
//! worker pool. Both return a [`RunReport`] with one entry per processed
//! candidate; only an unusable workspace root yields a [`RunError`].

pub mod context;
pub mod error;
pub mod pipeline;
pub mod provision;
pub mod report;
pub mod runner;

pub use context::{RunContext, METADATA_DIR};
pub use error::{MetadataError, RunError, UpdateError};
pub use pipeline::{run, run_concurrent, RunOptions};
pub use report::{CandidateReport, Counts, Outcome, RunReport, RunStatus};
pub use runner::{runner_from_config, CommandRunner, IndexRunner, UpdateRunner};
pub use tokio_util::sync::CancellationToken;
