//! `glores apply` — check out workspace repositories at their indexed commits.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use glores_git::{ApplyEntry, ApplyOutcome};

/// Arguments for `glores apply`.
#[derive(Args, Debug)]
pub struct ApplyArgs {
    /// Workspace holding the repositories to check out.
    #[arg(long, short = 'w', value_name = "DIR")]
    pub workspace: PathBuf,

    /// Repository whose index supplies the pinned commits.
    #[arg(long, short = 'r', value_name = "DIR")]
    pub repo: PathBuf,

    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

impl ApplyArgs {
    pub fn run(self) -> Result<ExitCode> {
        let entries = glores_git::apply_index(&self.workspace, &self.repo).with_context(|| {
            format!("failed to apply index of {}", self.repo.display())
        })?;

        if self.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&entries).context("failed to serialize result")?
            );
        } else {
            print_entries(&entries);
        }

        if entries.iter().any(ApplyEntry::is_failure) {
            return Ok(ExitCode::from(1));
        }
        Ok(ExitCode::SUCCESS)
    }
}

fn print_entries(entries: &[ApplyEntry]) {
    if entries.is_empty() {
        println!("{}", "no pinned repositories found in workspace".dimmed());
        return;
    }
    for entry in entries {
        match &entry.outcome {
            ApplyOutcome::CheckedOut { commit } => {
                println!("{} {} at {}", "✓".green(), entry.name, short(commit));
            }
            ApplyOutcome::SkippedBare => {
                println!("{} {} (bare repository)", "-".dimmed(), entry.name);
            }
            ApplyOutcome::Failed { error } => {
                println!("{} {}: {}", "✗".red(), entry.name, error);
            }
        }
    }
}

fn short(commit: &str) -> &str {
    commit.get(..12).unwrap_or(commit)
}
