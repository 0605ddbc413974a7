//! Immutable per-candidate run context.

use std::path::{Path, PathBuf};

use glores_core::CandidateName;

/// Name of the metadata directory every processed repository must carry.
pub const METADATA_DIR: &str = ".github";

/// Everything one candidate's processing step may look at.
///
/// Paths are derived once from the workspace root; nothing depends on the
/// process working directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunContext {
    workspace_root: PathBuf,
    candidate: CandidateName,
    repo_dir: PathBuf,
    meta_dir: PathBuf,
}

impl RunContext {
    pub fn new(workspace_root: &Path, candidate: CandidateName) -> Self {
        let repo_dir = workspace_root.join(&candidate);
        let meta_dir = repo_dir.join(METADATA_DIR);
        Self {
            workspace_root: workspace_root.to_path_buf(),
            candidate,
            repo_dir,
            meta_dir,
        }
    }

    pub fn workspace_root(&self) -> &Path {
        &self.workspace_root
    }

    pub fn candidate(&self) -> &CandidateName {
        &self.candidate
    }

    /// `<workspace_root>/<candidate>`
    pub fn repo_dir(&self) -> &Path {
        &self.repo_dir
    }

    /// `<workspace_root>/<candidate>/.github`
    pub fn meta_dir(&self) -> &Path {
        &self.meta_dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_derive_from_root_and_candidate() {
        let ctx = RunContext::new(Path::new("/ws"), CandidateName::from("repo-1"));
        assert_eq!(ctx.repo_dir(), Path::new("/ws/repo-1"));
        assert_eq!(ctx.meta_dir(), Path::new("/ws/repo-1/.github"));
        assert_eq!(ctx.workspace_root(), Path::new("/ws"));
        assert_eq!(ctx.candidate().as_str(), "repo-1");
    }
}
