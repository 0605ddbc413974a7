//! Run configuration: file format, discovery and validation.
//!
//! # Storage layout
//!
//! ```text
//! ~/.glores/
//!   config.yaml      (optional default config)
//! ```
//!
//! A config file may also be passed explicitly (`--config`, `GLORES_CONFIG`).
//!
//! # API pattern
//!
//! As with every home-relative lookup in glores, discovery has two forms:
//! - `fn_at(home: &Path, …)` — explicit home; used in tests with `TempDir`
//! - `fn(…)` — derives home from `dirs::home_dir()`, delegates to `_at`

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{config_io, ConfigError};
use crate::types::CandidateName;

/// Placeholder replaced by the workspace root in command updater arguments.
pub const WORKSPACE_PLACEHOLDER: &str = "{workspace}";
/// Placeholder replaced by the repository directory in command updater arguments.
pub const REPO_PLACEHOLDER: &str = "{repo}";

// ---------------------------------------------------------------------------
// File format
// ---------------------------------------------------------------------------

/// Raw contents of a config file, before overrides and validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    /// Relative paths resolve against the directory holding the config file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workspace_root: Option<PathBuf>,
    #[serde(default)]
    pub candidates: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jobs: Option<usize>,
    #[serde(default)]
    pub updater: UpdaterConfig,
}

/// Which update collaborator a run delegates to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum UpdaterConfig {
    /// In-process workspace index writer.
    #[default]
    Builtin,
    /// External program; `{workspace}` and `{repo}` in `args` are substituted.
    Command {
        program: String,
        #[serde(default = "default_command_args")]
        args: Vec<String>,
    },
}

fn default_command_args() -> Vec<String> {
    vec![
        "update".to_string(),
        "--workspace".to_string(),
        WORKSPACE_PLACEHOLDER.to_string(),
        "--repo".to_string(),
        REPO_PLACEHOLDER.to_string(),
    ]
}

impl UpdaterConfig {
    /// Command updater with the default `update --workspace … --repo …` arguments.
    pub fn command(program: impl Into<String>) -> Self {
        UpdaterConfig::Command {
            program: program.into(),
            args: default_command_args(),
        }
    }
}

/// Values supplied on the command line; each one wins over the file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub workspace_root: Option<PathBuf>,
    /// Replaces the file's candidate list when non-empty.
    pub candidates: Vec<String>,
    pub jobs: Option<usize>,
    /// Force the builtin updater regardless of the file.
    pub builtin: bool,
}

/// Fully resolved and validated configuration for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceConfig {
    pub workspace_root: PathBuf,
    pub candidates: Vec<CandidateName>,
    pub jobs: usize,
    pub updater: UpdaterConfig,
    /// The config file this was loaded from, if any.
    pub source: Option<PathBuf>,
}

// ---------------------------------------------------------------------------
// Discovery + load
// ---------------------------------------------------------------------------

/// `<home>/.glores/config.yaml` — pure, no I/O.
pub fn default_config_path_at(home: &Path) -> PathBuf {
    home.join(".glores").join("config.yaml")
}

/// Parse the config file at `path`.
///
/// Returns `ConfigError::ConfigNotFound` if absent,
/// `ConfigError::Parse` (with path + line context) if malformed YAML.
pub fn load_file(path: &Path) -> Result<ConfigFile, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::ConfigNotFound {
            path: path.to_path_buf(),
        });
    }
    let contents = std::fs::read_to_string(path).map_err(|e| config_io(path, e))?;
    if contents.trim().is_empty() {
        return Ok(ConfigFile::default());
    }
    serde_yaml::from_str(&contents).map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Locate and parse the config file for a run.
///
/// An explicit path must exist. Otherwise `<home>/.glores/config.yaml` is used
/// when present, and `Ok(None)` is returned when it is not.
pub fn discover_at(
    home: &Path,
    explicit: Option<&Path>,
) -> Result<Option<(PathBuf, ConfigFile)>, ConfigError> {
    if let Some(path) = explicit {
        return Ok(Some((path.to_path_buf(), load_file(path)?)));
    }
    let path = default_config_path_at(home);
    if !path.exists() {
        tracing::debug!(path = %path.display(), "no default config file");
        return Ok(None);
    }
    let file = load_file(&path)?;
    Ok(Some((path, file)))
}

/// `discover_at` convenience wrapper.
///
/// A missing home directory is only an error when no explicit path is given.
pub fn discover(explicit: Option<&Path>) -> Result<Option<(PathBuf, ConfigFile)>, ConfigError> {
    if let Some(path) = explicit {
        return Ok(Some((path.to_path_buf(), load_file(path)?)));
    }
    let home = dirs::home_dir().ok_or(ConfigError::HomeNotFound)?;
    discover_at(&home, None)
}

// ---------------------------------------------------------------------------
// Resolve
// ---------------------------------------------------------------------------

/// Merge an optional config file with command-line overrides and validate.
///
/// The workspace root itself is not checked for existence here; that is a
/// run-time failure owned by the updater.
pub fn resolve(
    file: Option<(PathBuf, ConfigFile)>,
    overrides: Overrides,
) -> Result<WorkspaceConfig, ConfigError> {
    let (source, file) = match file {
        Some((path, file)) => (Some(path), file),
        None => (None, ConfigFile::default()),
    };

    let workspace_root = match overrides.workspace_root {
        Some(root) => root,
        None => {
            let root = file
                .workspace_root
                .clone()
                .ok_or(ConfigError::MissingWorkspaceRoot)?;
            match source.as_deref().and_then(Path::parent) {
                Some(base) if root.is_relative() => base.join(root),
                _ => root,
            }
        }
    };

    let raw_candidates = if overrides.candidates.is_empty() {
        file.candidates
    } else {
        overrides.candidates
    };
    let candidates = parse_candidates(&raw_candidates)?;

    let jobs = overrides.jobs.or(file.jobs).unwrap_or(1);
    if jobs == 0 {
        return Err(ConfigError::InvalidJobs);
    }

    let updater = if overrides.builtin {
        UpdaterConfig::Builtin
    } else {
        file.updater
    };
    if let UpdaterConfig::Command { program, .. } = &updater {
        if program.trim().is_empty() {
            return Err(ConfigError::EmptyProgram);
        }
    }

    Ok(WorkspaceConfig {
        workspace_root,
        candidates,
        jobs,
        updater,
        source,
    })
}

/// Validate names and reject duplicates, preserving order.
pub fn parse_candidates(raw: &[String]) -> Result<Vec<CandidateName>, ConfigError> {
    let mut seen = HashSet::new();
    let mut out = Vec::with_capacity(raw.len());
    for name in raw {
        let candidate = CandidateName::parse(name)?;
        if !seen.insert(candidate.clone()) {
            return Err(ConfigError::DuplicateCandidate { name: name.clone() });
        }
        out.push(candidate);
    }
    Ok(out)
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn overrides_with_root(root: &str) -> Overrides {
        Overrides {
            workspace_root: Some(PathBuf::from(root)),
            ..Overrides::default()
        }
    }

    #[test]
    fn default_config_path_is_correct() {
        let home = TempDir::new().expect("tempdir");
        let path = default_config_path_at(home.path());
        assert!(path.ends_with(".glores/config.yaml"));
    }

    #[test]
    fn discover_without_file_returns_none() {
        let home = TempDir::new().expect("tempdir");
        assert!(discover_at(home.path(), None).expect("discover").is_none());
    }

    #[test]
    fn explicit_missing_file_is_not_found() {
        let home = TempDir::new().expect("tempdir");
        let err = discover_at(home.path(), Some(&home.path().join("nope.yaml"))).unwrap_err();
        assert!(matches!(err, ConfigError::ConfigNotFound { .. }));
    }

    #[test]
    fn resolve_requires_a_workspace_root() {
        let err = resolve(None, Overrides::default()).unwrap_err();
        assert!(matches!(err, ConfigError::MissingWorkspaceRoot));
    }

    #[test]
    fn resolve_defaults_to_sequential_builtin() {
        let cfg = resolve(None, overrides_with_root("/ws")).expect("resolve");
        assert_eq!(cfg.jobs, 1);
        assert_eq!(cfg.updater, UpdaterConfig::Builtin);
        assert!(cfg.candidates.is_empty());
    }

    #[test]
    fn relative_root_resolves_against_config_dir() {
        let file = ConfigFile {
            workspace_root: Some(PathBuf::from("checkouts")),
            ..ConfigFile::default()
        };
        let cfg = resolve(
            Some((PathBuf::from("/etc/glores/config.yaml"), file)),
            Overrides::default(),
        )
        .expect("resolve");
        assert_eq!(cfg.workspace_root, PathBuf::from("/etc/glores/checkouts"));
    }

    #[test]
    fn overrides_win_over_file() {
        let file = ConfigFile {
            workspace_root: Some(PathBuf::from("/from-file")),
            candidates: vec!["a".into(), "b".into()],
            jobs: Some(4),
            updater: UpdaterConfig::command("glores"),
        };
        let cfg = resolve(
            Some((PathBuf::from("/cfg.yaml"), file)),
            Overrides {
                workspace_root: Some(PathBuf::from("/from-cli")),
                candidates: vec!["c".into()],
                jobs: Some(2),
                builtin: true,
            },
        )
        .expect("resolve");
        assert_eq!(cfg.workspace_root, PathBuf::from("/from-cli"));
        assert_eq!(cfg.candidates, vec![CandidateName::from("c")]);
        assert_eq!(cfg.jobs, 2);
        assert_eq!(cfg.updater, UpdaterConfig::Builtin);
    }

    #[test]
    fn duplicate_candidates_are_rejected() {
        let err = parse_candidates(&["a".into(), "b".into(), "a".into()]).unwrap_err();
        assert!(matches!(err, ConfigError::DuplicateCandidate { ref name } if name == "a"));
    }

    #[test]
    fn zero_jobs_is_rejected() {
        let mut overrides = overrides_with_root("/ws");
        overrides.jobs = Some(0);
        assert!(matches!(
            resolve(None, overrides).unwrap_err(),
            ConfigError::InvalidJobs
        ));
    }

    #[test]
    fn command_updater_gets_default_args() {
        let yaml = "workspace_root: /ws\nupdater:\n  kind: command\n  program: glores\n";
        let file: ConfigFile = serde_yaml::from_str(yaml).expect("parse");
        match file.updater {
            UpdaterConfig::Command { program, args } => {
                assert_eq!(program, "glores");
                assert_eq!(
                    args,
                    vec!["update", "--workspace", "{workspace}", "--repo", "{repo}"]
                );
            }
            other => panic!("expected command updater, got {other:?}"),
        }
    }

    #[test]
    fn empty_program_is_rejected() {
        let file = ConfigFile {
            workspace_root: Some(PathBuf::from("/ws")),
            updater: UpdaterConfig::Command {
                program: "  ".to_string(),
                args: vec![],
            },
            ..ConfigFile::default()
        };
        let err = resolve(Some((PathBuf::from("/c.yaml"), file)), Overrides::default())
            .unwrap_err();
        assert!(matches!(err, ConfigError::EmptyProgram));
    }
}
