//! Domain types shared by every glores crate.
//!
//! All path fields use `PathBuf`; never `&str` or `String` for filesystem paths.
//! Index types are serializable via serde + serde_yaml with the kebab-case keys
//! the `glores.yaml` index has always used.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// Name of a repository candidate, relative to the workspace root.
///
/// A candidate is always a single path component: never empty, never `.` or
/// `..`, and never containing a path separator. [`CandidateName::parse`]
/// enforces this; `From` impls exist for tests and trusted call sites.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CandidateName(pub String);

impl CandidateName {
    /// Validate `raw` as a single-component directory name.
    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        let invalid = |reason: &str| ConfigError::InvalidCandidate {
            name: raw.to_string(),
            reason: reason.to_string(),
        };
        if raw.trim().is_empty() {
            return Err(invalid("name is empty"));
        }
        if raw == "." || raw == ".." {
            return Err(invalid("name must not refer to the workspace or its parent"));
        }
        if raw.contains('/') || raw.contains('\\') {
            return Err(invalid("name must not contain a path separator"));
        }
        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CandidateName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for CandidateName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for CandidateName {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl AsRef<Path> for CandidateName {
    fn as_ref(&self) -> &Path {
        Path::new(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Index document
// ---------------------------------------------------------------------------

/// Snapshot of one git repository as recorded in the workspace index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoInfo {
    pub name: String,
    /// First URL of the first remote; empty when the repository has no remote.
    #[serde(default)]
    pub url: String,
    pub branch: String,
    #[serde(rename = "commit-hash")]
    pub commit_hash: String,
}

/// Contents of `<repo>/.git/glores.yaml`.
///
/// `repo_info` holds the repository the index belongs to (at most one entry);
/// `ws_status` holds every other repository found in the workspace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct IndexDocument {
    #[serde(rename = "repo-info", default)]
    pub repo_info: Vec<RepoInfo>,
    #[serde(rename = "ws-status", default)]
    pub ws_status: Vec<RepoInfo>,
}

impl IndexDocument {
    /// Map of repository name to pinned commit hash.
    ///
    /// The owning repository comes first; later `ws-status` entries overwrite
    /// earlier ones with the same name.
    pub fn commit_pins(&self) -> Vec<(String, String)> {
        let mut pins: Vec<(String, String)> = Vec::new();
        for info in self.repo_info.iter().take(1).chain(self.ws_status.iter()) {
            match pins.iter_mut().find(|(name, _)| *name == info.name) {
                Some(slot) => slot.1 = info.commit_hash.clone(),
                None => pins.push((info.name.clone(), info.commit_hash.clone())),
            }
        }
        pins
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
