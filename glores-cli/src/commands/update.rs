//! `glores update` — rewrite a repository's workspace index.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

/// Arguments for `glores update`.
#[derive(Args, Debug)]
pub struct UpdateArgs {
    /// Workspace scanned for sibling repositories.
    #[arg(long, short = 'w', value_name = "DIR")]
    pub workspace: PathBuf,

    /// Repository whose index is rewritten.
    #[arg(long, short = 'r', value_name = "DIR")]
    pub repo: PathBuf,
}

impl UpdateArgs {
    pub fn run(self) -> Result<ExitCode> {
        let summary = glores_git::update_index(&self.workspace, &self.repo).with_context(|| {
            format!("failed to update index of {}", self.repo.display())
        })?;

        println!(
            "{} {} ({} workspace entries)",
            "Updated".green().bold(),
            summary.index_path.display(),
            summary.document.ws_status.len(),
        );
        Ok(ExitCode::SUCCESS)
    }
}
