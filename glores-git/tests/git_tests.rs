//! Integration tests against real `git` repositories.
//!
//! Each test gets an isolated `TempDir` workspace — no shared state.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use glores_core::index;
use glores_git::{apply_index, discover_repos, repo_info, update_index, ApplyOutcome};
use rstest::{fixture, rstest};
use tempfile::TempDir;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn git(dir: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .args(["-c", "user.email=ops@example.com", "-c", "user.name=Ops"])
        .args(args)
        .current_dir(dir)
        .output()
        .expect("run git");
    assert!(
        output.status.success(),
        "git {args:?} failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

fn init_repo(root: &Path, name: &str) -> PathBuf {
    let dir = root.join(name);
    fs::create_dir_all(&dir).expect("mkdir");
    git(&dir, &["init", "-q"]);
    git(&dir, &["symbolic-ref", "HEAD", "refs/heads/main"]);
    commit(&dir, "initial");
    dir
}

fn commit(dir: &Path, message: &str) -> String {
    fs::write(dir.join("CHANGELOG"), message).expect("write");
    git(dir, &["add", "."]);
    git(dir, &["commit", "-q", "-m", message]);
    git(dir, &["rev-parse", "HEAD"])
}

#[fixture]
fn workspace() -> TempDir {
    TempDir::new().expect("tempdir")
}

// ---------------------------------------------------------------------------
// repo_info
// ---------------------------------------------------------------------------

#[rstest]
fn repo_info_without_remote_has_empty_url(workspace: TempDir) {
    let repo = init_repo(workspace.path(), "core");
    let info = repo_info(&repo).expect("info");

    assert_eq!(info.name, "core");
    assert_eq!(info.url, "");
    assert_eq!(info.branch, "main");
    assert_eq!(info.commit_hash, git(&repo, &["rev-parse", "HEAD"]));
}

#[rstest]
fn repo_info_reports_first_remote_url(workspace: TempDir) {
    let repo = init_repo(workspace.path(), "core");
    git(&repo, &["remote", "add", "origin", "https://example.com/org/core.git"]);

    let info = repo_info(&repo).expect("info");
    assert_eq!(info.url, "https://example.com/org/core.git");
}

#[rstest]
fn detached_head_reports_head_branch(workspace: TempDir) {
    let repo = init_repo(workspace.path(), "core");
    let first = git(&repo, &["rev-parse", "HEAD"]);
    commit(&repo, "second");
    git(&repo, &["checkout", "-q", &first]);

    let info = repo_info(&repo).expect("info");
    assert_eq!(info.branch, "HEAD");
    assert_eq!(info.commit_hash, first);
}

// ---------------------------------------------------------------------------
// update_index
// ---------------------------------------------------------------------------

#[rstest]
fn update_index_records_current_and_sibling_repos(workspace: TempDir) {
    let core = init_repo(workspace.path(), "core");
    init_repo(workspace.path(), "lib");
    init_repo(workspace.path(), "tools");
    fs::create_dir_all(workspace.path().join("not-a-repo")).unwrap();

    assert_eq!(discover_repos(workspace.path()).unwrap().len(), 3);

    let summary = update_index(workspace.path(), &core).expect("update");
    assert_eq!(summary.index_path, index::index_path(&core));

    let doc = index::load(&core).expect("load");
    assert_eq!(doc, summary.document);
    assert_eq!(doc.repo_info.len(), 1);
    assert_eq!(doc.repo_info[0].name, "core");
    let names: Vec<_> = doc.ws_status.iter().map(|i| i.name.as_str()).collect();
    assert_eq!(names, vec!["lib", "tools"]);
}

#[rstest]
fn update_index_keeps_detached_checkouts(workspace: TempDir) {
    let core = init_repo(workspace.path(), "core");
    let lib = init_repo(workspace.path(), "lib");
    let pinned = git(&lib, &["rev-parse", "HEAD"]);
    commit(&lib, "second");
    git(&lib, &["checkout", "-q", &pinned]);

    let doc = update_index(workspace.path(), &core).expect("update").document;

    let entry = doc
        .ws_status
        .iter()
        .find(|i| i.name == "lib")
        .expect("detached lib is indexed");
    assert_eq!(entry.branch, "HEAD");
    assert_eq!(entry.commit_hash, pinned);
}

#[rstest]
fn update_index_on_plain_directory_fails(workspace: TempDir) {
    let plain = workspace.path().join("plain");
    fs::create_dir_all(&plain).unwrap();
    assert!(update_index(workspace.path(), &plain).is_err());
    assert!(!plain.join(".git").exists());
}

// ---------------------------------------------------------------------------
// apply_index
// ---------------------------------------------------------------------------

#[rstest]
fn apply_index_checks_out_pinned_commits(workspace: TempDir) {
    let core = init_repo(workspace.path(), "core");
    let lib = init_repo(workspace.path(), "lib");
    let pinned = git(&lib, &["rev-parse", "HEAD"]);

    update_index(workspace.path(), &core).expect("update");
    commit(&lib, "moved on");

    let entries = apply_index(workspace.path(), &core).expect("apply");
    assert!(entries.iter().all(|e| !e.is_failure()), "{entries:?}");
    assert_eq!(git(&lib, &["rev-parse", "HEAD"]), pinned);
}

#[rstest]
fn apply_index_continues_past_a_failed_checkout(workspace: TempDir) {
    let core = init_repo(workspace.path(), "core");
    let lib = init_repo(workspace.path(), "lib");
    let tools = init_repo(workspace.path(), "tools");
    let tools_pin = git(&tools, &["rev-parse", "HEAD"]);

    let mut doc = update_index(workspace.path(), &core).expect("update").document;
    for info in doc.ws_status.iter_mut() {
        if info.name == "lib" {
            info.commit_hash = "0000000000000000000000000000000000000000".to_string();
        }
    }
    index::save(&core, &doc).expect("save");
    commit(&tools, "moved on");

    let entries = apply_index(workspace.path(), &core).expect("apply");
    let lib_entry = entries.iter().find(|e| e.path == lib).expect("lib entry");
    assert!(matches!(lib_entry.outcome, ApplyOutcome::Failed { .. }));
    assert_eq!(git(&tools, &["rev-parse", "HEAD"]), tools_pin);
}

#[rstest]
fn apply_without_index_is_an_error(workspace: TempDir) {
    let core = init_repo(workspace.path(), "core");
    assert!(apply_index(workspace.path(), &core).is_err());
}
