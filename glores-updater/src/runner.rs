//! The update collaborator seam.
//!
//! The loop only ever sees [`UpdateRunner`]. [`CommandRunner`] spawns an
//! external program, [`IndexRunner`] writes the workspace index in-process.

use std::ffi::OsString;
use std::path::Path;
use std::process::{Command, Stdio};
use std::sync::Arc;

use glores_core::config::{REPO_PLACEHOLDER, WORKSPACE_PLACEHOLDER};
use glores_core::UpdaterConfig;

use crate::error::UpdateError;

/// Number of trailing stderr lines kept in an [`UpdateError::Exit`].
const STDERR_TAIL_LINES: usize = 20;

/// Synchronizes one repository against the workspace.
pub trait UpdateRunner: Send + Sync {
    fn update(&self, workspace_root: &Path, repo_dir: &Path) -> Result<(), UpdateError>;

    /// Short human-readable label for logs.
    fn describe(&self) -> String;
}

/// Build the runner a config asks for.
pub fn runner_from_config(config: &UpdaterConfig) -> Arc<dyn UpdateRunner> {
    match config {
        UpdaterConfig::Builtin => Arc::new(IndexRunner),
        UpdaterConfig::Command { program, args } => {
            Arc::new(CommandRunner::new(program.clone(), args.clone()))
        }
    }
}

// ---------------------------------------------------------------------------
// CommandRunner
// ---------------------------------------------------------------------------

/// Runs `program args…` once per repository.
///
/// An argument equal to `{workspace}` or `{repo}` is replaced by the path
/// verbatim; placeholders embedded in a longer argument are substituted
/// textually. The child runs in the workspace root with stdin closed and, on
/// unix, in its own process group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandRunner {
    program: String,
    args: Vec<String>,
}

impl CommandRunner {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    fn render_args(&self, workspace_root: &Path, repo_dir: &Path) -> Vec<OsString> {
        self.args
            .iter()
            .map(|arg| match arg.as_str() {
                WORKSPACE_PLACEHOLDER => workspace_root.as_os_str().to_owned(),
                REPO_PLACEHOLDER => repo_dir.as_os_str().to_owned(),
                other => OsString::from(
                    other
                        .replace(WORKSPACE_PLACEHOLDER, &workspace_root.to_string_lossy())
                        .replace(REPO_PLACEHOLDER, &repo_dir.to_string_lossy()),
                ),
            })
            .collect()
    }
}

impl UpdateRunner for CommandRunner {
    fn update(&self, workspace_root: &Path, repo_dir: &Path) -> Result<(), UpdateError> {
        let args = self.render_args(workspace_root, repo_dir);
        tracing::debug!(program = %self.program, ?args, "spawning updater");

        let mut command = Command::new(&self.program);
        command
            .args(&args)
            .current_dir(workspace_root)
            .stdin(Stdio::null());
        // Separate process group: a terminal ctrl-c must not reach the child.
        #[cfg(unix)]
        std::os::unix::process::CommandExt::process_group(&mut command, 0);

        let output = command
            .output()
            .map_err(|source| UpdateError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        if !stdout.trim().is_empty() {
            tracing::debug!(program = %self.program, stdout = %stdout.trim(), "updater output");
        }

        if output.status.success() {
            return Ok(());
        }
        Err(UpdateError::Exit {
            program: self.program.clone(),
            code: output.status.code(),
            stderr: stderr_tail(&String::from_utf8_lossy(&output.stderr)),
        })
    }

    fn describe(&self) -> String {
        format!("command `{}`", self.program)
    }
}

fn stderr_tail(stderr: &str) -> String {
    let lines: Vec<&str> = stderr.trim().lines().collect();
    let start = lines.len().saturating_sub(STDERR_TAIL_LINES);
    lines[start..].join("\n")
}

// ---------------------------------------------------------------------------
// IndexRunner
// ---------------------------------------------------------------------------

/// Writes `<repo>/.git/glores.yaml` in-process.
#[derive(Debug, Clone, Copy, Default)]
pub struct IndexRunner;

impl UpdateRunner for IndexRunner {
    fn update(&self, workspace_root: &Path, repo_dir: &Path) -> Result<(), UpdateError> {
        glores_git::update_index(workspace_root, repo_dir)?;
        Ok(())
    }

    fn describe(&self) -> String {
        "builtin index".to_string()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn default_args() -> Vec<String> {
        match UpdaterConfig::command("glores") {
            UpdaterConfig::Command { args, .. } => args,
            UpdaterConfig::Builtin => unreachable!(),
        }
    }

    #[test]
    fn placeholders_are_substituted() {
        let runner = CommandRunner::new("glores", default_args());
        let args = runner.render_args(Path::new("/ws"), Path::new("/ws/repo-1"));
        assert_eq!(
            args,
            vec!["update", "--workspace", "/ws", "--repo", "/ws/repo-1"]
                .into_iter()
                .map(OsString::from)
                .collect::<Vec<_>>()
        );
    }

    #[test]
    fn embedded_placeholders_are_substituted() {
        let runner = CommandRunner::new("tool", vec!["--target={repo}".to_string()]);
        let args = runner.render_args(Path::new("/ws"), Path::new("/ws/a"));
        assert_eq!(args, vec![OsString::from("--target=/ws/a")]);
    }

    #[test]
    fn stderr_tail_keeps_last_lines() {
        let text: String = (0..30).map(|i| format!("line {i}\n")).collect();
        let tail = stderr_tail(&text);
        assert_eq!(tail.lines().count(), STDERR_TAIL_LINES);
        assert!(tail.ends_with("line 29"));
    }

    #[test]
    fn missing_program_is_a_spawn_error() {
        let ws = TempDir::new().unwrap();
        let runner = CommandRunner::new("glores-definitely-not-installed", vec![]);
        let err = runner.update(ws.path(), ws.path()).unwrap_err();
        assert!(matches!(err, UpdateError::Spawn { .. }));
    }

    #[test]
    #[cfg(unix)]
    fn non_zero_exit_is_reported_with_stderr() {
        let ws = TempDir::new().unwrap();
        let runner = CommandRunner::new(
            "sh",
            vec!["-c".to_string(), "echo boom >&2; exit 4".to_string()],
        );
        match runner.update(ws.path(), ws.path()).unwrap_err() {
            UpdateError::Exit { code, stderr, .. } => {
                assert_eq!(code, Some(4));
                assert_eq!(stderr, "boom");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    #[cfg(unix)]
    fn child_runs_in_workspace_root() {
        let ws = TempDir::new().unwrap();
        let runner = CommandRunner::new(
            "sh",
            vec!["-c".to_string(), "pwd > cwd.txt".to_string()],
        );
        runner.update(ws.path(), ws.path()).expect("update");
        let cwd = fs::read_to_string(ws.path().join("cwd.txt")).unwrap();
        let expected = ws.path().canonicalize().unwrap();
        assert_eq!(
            Path::new(cwd.trim()).canonicalize().unwrap(),
            expected
        );
    }

    #[test]
    fn builtin_runner_fails_outside_git() {
        let ws = TempDir::new().unwrap();
        let repo = ws.path().join("plain");
        fs::create_dir(&repo).unwrap();
        let err = IndexRunner.update(ws.path(), &repo).unwrap_err();
        assert!(matches!(err, UpdateError::Builtin(_)));
    }

    #[test]
    fn config_selects_runner() {
        assert_eq!(runner_from_config(&UpdaterConfig::Builtin).describe(), "builtin index");
        assert_eq!(
            runner_from_config(&UpdaterConfig::command("sync-tool")).describe(),
            "command `sync-tool`"
        );
    }
}
