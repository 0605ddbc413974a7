//! `glores run` — provision `.github` in every present candidate, then update it.

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use glores_core::{CandidateName, WorkspaceConfig};
use glores_updater::{
    pipeline, runner_from_config, CancellationToken, Counts, Outcome, RunOptions, RunReport,
    RunStatus, UpdateRunner,
};

use crate::SelectionArgs;

/// Arguments for `glores run`.
#[derive(Args, Debug)]
pub struct RunArgs {
    #[command(flatten)]
    pub selection: SelectionArgs,

    /// Process up to N candidates at once (default 1: strictly sequential).
    #[arg(long, short = 'j', value_name = "N")]
    pub jobs: Option<usize>,

    /// Report what would happen without creating directories or running updates.
    #[arg(long)]
    pub dry_run: bool,

    /// Emit the run report as JSON.
    #[arg(long)]
    pub json: bool,
}

impl RunArgs {
    pub fn run(self) -> Result<ExitCode> {
        let config = self.selection.resolve(self.jobs)?;
        let runner = runner_from_config(&config.updater);
        let options = RunOptions {
            dry_run: self.dry_run,
        };
        tracing::info!(runner = %runner.describe(), jobs = config.jobs, "starting run");

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .context("failed to start async runtime")?;
        let report = runtime.block_on(execute(config, runner, options))?;

        let status = report.status();
        if self.json {
            print_json(&report, &status)?;
        } else {
            print_table(&report, &status);
        }
        Ok(ExitCode::from(u8::try_from(status.exit_code()).unwrap_or(1)))
    }
}

async fn execute(
    config: WorkspaceConfig,
    runner: Arc<dyn UpdateRunner>,
    options: RunOptions,
) -> Result<RunReport> {
    let cancel = CancellationToken::new();
    let ctrl_c = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("received ctrl-c, stopping after the current candidate");
                cancel.cancel();
            }
        })
    };

    let result = if config.jobs > 1 {
        pipeline::run_concurrent(
            config.workspace_root,
            config.candidates,
            runner,
            options,
            config.jobs,
            cancel,
        )
        .await
    } else {
        tokio::task::spawn_blocking(move || {
            pipeline::run(
                &config.workspace_root,
                &config.candidates,
                runner.as_ref(),
                options,
                &cancel,
            )
        })
        .await
        .context("run task failed")?
    };

    ctrl_c.abort();
    Ok(result?)
}

#[derive(Serialize)]
struct RunOutput<'a> {
    #[serde(flatten)]
    status: &'a RunStatus,
    counts: Counts,
    report: &'a RunReport,
}

fn print_json(report: &RunReport, status: &RunStatus) -> Result<()> {
    let payload = RunOutput {
        status,
        counts: report.counts(),
        report,
    };
    println!(
        "{}",
        serde_json::to_string_pretty(&payload).context("failed to serialize run report")?
    );
    Ok(())
}

#[derive(Tabled)]
struct RunTableRow {
    #[tabled(rename = "repository")]
    candidate: String,
    #[tabled(rename = "outcome")]
    outcome: String,
    #[tabled(rename = ".github")]
    metadata: String,
    #[tabled(rename = "detail")]
    detail: String,
    #[tabled(rename = "time")]
    time: String,
}

fn print_table(report: &RunReport, status: &RunStatus) {
    let counts = report.counts();
    let prefix = if report.dry_run { "[dry-run] " } else { "" };
    println!(
        "{prefix}glores v{} | {} | {} candidates | {} succeeded | {} skipped | {} failed",
        env!("CARGO_PKG_VERSION"),
        report.workspace_root.display(),
        report.entries.len(),
        counts.succeeded,
        counts.skipped,
        counts.metadata_failed + counts.update_failed,
    );

    if !report.entries.is_empty() {
        let rows: Vec<RunTableRow> = report
            .entries
            .iter()
            .map(|entry| RunTableRow {
                candidate: entry.candidate.to_string(),
                outcome: entry.outcome.label().to_string(),
                metadata: metadata_cell(&entry.outcome).to_string(),
                detail: detail_cell(&entry.outcome),
                time: format!("{}ms", entry.duration_ms),
            })
            .collect();
        let mut table = Table::new(rows);
        table.with(Style::rounded());
        println!("{table}");
    }

    match status {
        RunStatus::Success if report.dry_run => {
            println!("{}", "✓ plan complete".green().bold());
            let blocked = report.failed();
            if !blocked.is_empty() {
                println!("{} {}", "✗ would fail:".yellow().bold(), join_names(&blocked));
            }
        }
        RunStatus::Success => println!("{}", "✓ all present repositories updated".green().bold()),
        RunStatus::PartialFailure { failed } => println!(
            "{} {}",
            "✗ failed:".red().bold(),
            join_names(failed)
        ),
        RunStatus::Cancelled { failed } => {
            println!("{}", "■ cancelled before all candidates ran".yellow().bold());
            if !failed.is_empty() {
                println!("{} {}", "✗ failed:".red().bold(), join_names(failed));
            }
        }
    }
}

fn metadata_cell(outcome: &Outcome) -> &'static str {
    match outcome {
        Outcome::Succeeded { metadata_created: true }
        | Outcome::UpdateFailed { metadata_created: true, .. } => "created",
        Outcome::Succeeded { metadata_created: false }
        | Outcome::UpdateFailed { metadata_created: false, .. } => "present",
        Outcome::Planned { would_create_metadata: true } => "would create",
        Outcome::Planned { would_create_metadata: false } => "present",
        Outcome::MetadataFailed { .. } => "error",
        Outcome::Skipped => "-",
    }
}

fn detail_cell(outcome: &Outcome) -> String {
    match outcome {
        Outcome::Skipped => "directory not found".to_string(),
        Outcome::MetadataFailed { error } | Outcome::UpdateFailed { error, .. } => error.clone(),
        Outcome::Succeeded { .. } | Outcome::Planned { .. } => String::new(),
    }
}

fn join_names(names: &[CandidateName]) -> String {
    names
        .iter()
        .map(|n| n.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}
