//! glores — workspace bootstrap-and-update driver.
//!
//! # Usage
//!
//! ```text
//! glores run    [--config <file>] [--workspace <dir>] [--repo <name>]... [--jobs N] [--dry-run] [--json]
//! glores status [--config <file>] [--workspace <dir>] [--repo <name>]... [--json]
//! glores update --workspace <dir> --repo <dir>
//! glores apply  --workspace <dir> --repo <dir>
//! ```
//!
//! # Exit codes
//!
//! `0` success, `1` one or more repositories failed, `2` the command could not
//! start (bad config, unusable workspace), `130` cancelled with ctrl-c.

mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};

use commands::{apply::ApplyArgs, run::RunArgs, status::StatusArgs, update::UpdateArgs};
use glores_core::{
    config::{self, Overrides},
    WorkspaceConfig,
};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "glores",
    version,
    about = "Provision and update a fleet of repository checkouts",
    long_about = None,
)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug). RUST_LOG wins when set.
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Ensure every candidate has a .github directory, then update it.
    Run(RunArgs),

    /// Show what a run would find, without touching anything.
    Status(StatusArgs),

    /// Rewrite a repository's workspace index (.git/glores.yaml).
    Update(UpdateArgs),

    /// Check out workspace repositories at the commits pinned in an index.
    Apply(ApplyArgs),
}

// ---------------------------------------------------------------------------
// Shared candidate selection — config file + overrides
// ---------------------------------------------------------------------------

/// Where the workspace and candidate list come from.
#[derive(Args, Debug, Clone, Default)]
pub struct SelectionArgs {
    /// Config file. Defaults to ~/.glores/config.yaml when it exists.
    #[arg(long, short = 'c', env = "GLORES_CONFIG", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Workspace root holding the candidate repositories.
    #[arg(long, short = 'w', value_name = "DIR")]
    pub workspace: Option<PathBuf>,

    /// Candidate repository name; repeat for several. Replaces the config's list.
    #[arg(long = "repo", short = 'r', value_name = "NAME")]
    pub repos: Vec<String>,

    /// Use the builtin index updater even if the config names a command.
    #[arg(long)]
    pub builtin: bool,
}

impl SelectionArgs {
    pub fn resolve(&self, jobs: Option<usize>) -> Result<WorkspaceConfig> {
        let found = match (&self.config, dirs::home_dir()) {
            (Some(path), _) => config::discover(Some(path.as_path())),
            (None, Some(home)) => config::discover_at(&home, None),
            (None, None) => Ok(None),
        }
        .context("failed to load config")?;

        let overrides = Overrides {
            workspace_root: self.workspace.clone(),
            candidates: self.repos.clone(),
            jobs,
            builtin: self.builtin,
        };
        let resolved = config::resolve(found, overrides).context("invalid configuration")?;
        tracing::debug!(
            workspace = %resolved.workspace_root.display(),
            candidates = resolved.candidates.len(),
            source = ?resolved.source,
            "configuration resolved"
        );
        Ok(resolved)
    }
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Run(args) => args.run(),
        Commands::Status(args) => args.run(),
        Commands::Update(args) => args.run(),
        Commands::Apply(args) => args.run(),
    };

    match result {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::from(2)
        }
    }
}

fn init_tracing(verbose: u8) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
