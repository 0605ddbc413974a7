//! `glores status` — read-only preview of what a run would find.

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use glores_core::{index, CandidateName, WorkspaceConfig};
use glores_updater::{pipeline::check_workspace_root, RunContext};

use crate::SelectionArgs;

/// Arguments for `glores status`.
#[derive(Args, Debug)]
pub struct StatusArgs {
    #[command(flatten)]
    pub selection: SelectionArgs,

    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

impl StatusArgs {
    pub fn run(self) -> Result<ExitCode> {
        let config = self.selection.resolve(None)?;
        check_workspace_root(&config.workspace_root).context("workspace is not usable")?;

        let report = build_report(&config);
        if self.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&report).context("failed to serialize status")?
            );
        } else {
            print_table(&report);
        }
        Ok(ExitCode::SUCCESS)
    }
}

#[derive(Debug, Serialize)]
struct StatusReport {
    workspace_root: String,
    updater: String,
    candidates: Vec<CandidateStatus>,
}

#[derive(Debug, Serialize)]
struct CandidateStatus {
    candidate: CandidateName,
    present: bool,
    metadata_present: bool,
    index_present: bool,
}

fn build_report(config: &WorkspaceConfig) -> StatusReport {
    let candidates = config
        .candidates
        .iter()
        .map(|name| {
            let ctx = RunContext::new(&config.workspace_root, name.clone());
            let present = ctx.repo_dir().is_dir();
            CandidateStatus {
                candidate: name.clone(),
                present,
                metadata_present: present && ctx.meta_dir().is_dir(),
                index_present: present && index::index_path(ctx.repo_dir()).is_file(),
            }
        })
        .collect();

    StatusReport {
        workspace_root: config.workspace_root.display().to_string(),
        updater: describe_updater(config),
        candidates,
    }
}

fn describe_updater(config: &WorkspaceConfig) -> String {
    glores_updater::runner_from_config(&config.updater).describe()
}

#[derive(Tabled)]
struct StatusTableRow {
    #[tabled(rename = "repository")]
    candidate: String,
    #[tabled(rename = "directory")]
    present: String,
    #[tabled(rename = ".github")]
    metadata: String,
    #[tabled(rename = "index")]
    index: String,
}

fn mark(flag: bool) -> &'static str {
    if flag {
        "yes"
    } else {
        "no"
    }
}

fn print_table(report: &StatusReport) {
    let present = report.candidates.iter().filter(|c| c.present).count();
    println!(
        "glores v{} | {} | {} candidates | {} present | updater: {}",
        env!("CARGO_PKG_VERSION"),
        report.workspace_root,
        report.candidates.len(),
        present,
        report.updater,
    );

    if report.candidates.is_empty() {
        println!("{}", "no candidates configured".dimmed());
        return;
    }

    let rows: Vec<StatusTableRow> = report
        .candidates
        .iter()
        .map(|c| StatusTableRow {
            candidate: c.candidate.to_string(),
            present: if c.present {
                "present".to_string()
            } else {
                "missing".to_string()
            },
            metadata: mark(c.metadata_present).to_string(),
            index: mark(c.index_present).to_string(),
        })
        .collect();
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");

    let missing_metadata = report
        .candidates
        .iter()
        .filter(|c| c.present && !c.metadata_present)
        .count();
    if missing_metadata > 0 {
        println!(
            "{}",
            format!("{missing_metadata} repositories would get a new .github directory").yellow()
        );
    }
}
