//! Per-repository probes, all through the `git` CLI.

use std::path::Path;
use std::process::{Command, Stdio};

use glores_core::RepoInfo;

use crate::error::GitError;

/// Run `git <args>` inside `repo` and return trimmed stdout.
fn git(repo: &Path, args: &[&str]) -> Result<String, GitError> {
    let output = Command::new("git")
        .args(args)
        .current_dir(repo)
        .stdin(Stdio::null())
        .output()
        .map_err(|source| GitError::Spawn {
            path: repo.to_path_buf(),
            source,
        })?;

    if !output.status.success() {
        return Err(GitError::Command {
            args: args.join(" "),
            path: repo.to_path_buf(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

/// `true` if `repo` has a `.git` directory.
pub fn has_git_dir(repo: &Path) -> bool {
    repo.join(".git").is_dir()
}

/// `true` if git considers `repo` bare.
pub fn is_bare(repo: &Path) -> Result<bool, GitError> {
    Ok(git(repo, &["rev-parse", "--is-bare-repository"])? == "true")
}

/// Read name, remote URL, branch and HEAD commit of `repo`.
///
/// The URL is the first URL of the first configured remote, or empty when
/// there is none. A detached HEAD reports its branch as `HEAD` instead of
/// failing, so detached checkouts still get an index entry and a pin.
pub fn repo_info(repo: &Path) -> Result<RepoInfo, GitError> {
    if !has_git_dir(repo) {
        return Err(GitError::NotARepository {
            path: repo.to_path_buf(),
        });
    }

    let name = match repo.file_name() {
        Some(name) => name.to_string_lossy().into_owned(),
        None => repo
            .canonicalize()
            .ok()
            .and_then(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
            .unwrap_or_default(),
    };

    let remotes = git(repo, &["remote"])?;
    let url = match remotes.lines().next() {
        Some(remote) => git(repo, &["remote", "get-url", remote])?
            .lines()
            .next()
            .unwrap_or_default()
            .to_string(),
        None => String::new(),
    };

    let branch = git(repo, &["rev-parse", "--abbrev-ref", "HEAD"])?;
    let commit_hash = git(repo, &["rev-parse", "HEAD"])?;

    Ok(RepoInfo {
        name,
        url,
        branch,
        commit_hash,
    })
}

/// Check out `rev` in `repo` (detaching HEAD for commit hashes).
pub fn checkout(repo: &Path, rev: &str) -> Result<(), GitError> {
    git(repo, &["checkout", "--quiet", rev])?;
    Ok(())
}
