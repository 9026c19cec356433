//! Predefined repository scenarios and wiring for the code under test
//!
//! Each scenario returns a [`TestRepo`] in a known state; the wiring helpers bind a
//! coordinator or the CLI binary to it.

#![allow(dead_code)]

use super::repository::*;
use git_workspace::{
    DefaultFilesystemFactory, DirHandleRegistry, Environment, EventDispatcher, Git2Plumbing,
    GitCoordinator, StateStore, VirtualFsRegistry,
};
use git_workspace::fs::LocalDirectoryHandle;
use std::path::Path;
use std::process::Command;
use std::sync::Arc;

/// Scenario: one file in each status bucket
///
/// - `modified.txt`: changed in the working tree only
/// - `staged.txt`: changed and staged
/// - `deleted.txt`: removed from the working tree
/// - `added.txt`: new and staged
/// - `untracked.txt`: new, not staged
pub fn create_mixed_status_repo() -> anyhow::Result<TestRepo> {
    let repo = setup_test_repo()?;
    create_file(&repo.path, "modified.txt", "one\n")?;
    create_file(&repo.path, "staged.txt", "one\n")?;
    create_file(&repo.path, "deleted.txt", "one\n")?;
    git_commit_all(&repo.path, "Initial commit")?;

    create_file(&repo.path, "modified.txt", "one\ntwo\n")?;
    create_file(&repo.path, "staged.txt", "one\ntwo\nthree\n")?;
    git(&repo.path, &["add", "staged.txt"])?;
    remove_file(&repo.path, "deleted.txt")?;
    create_file(&repo.path, "added.txt", "new\n")?;
    git(&repo.path, &["add", "added.txt"])?;
    create_file(&repo.path, "untracked.txt", "loose\n")?;

    Ok(repo)
}

/// Scenario: `main` and `feature` both changed `shared.txt`, and `git merge feature`
/// stopped with a conflict
pub fn create_conflicted_repo() -> anyhow::Result<TestRepo> {
    let repo = setup_test_repo()?;
    create_file(&repo.path, "shared.txt", "start\nbase\nend\n")?;
    git_commit_all(&repo.path, "Initial commit")?;

    git(&repo.path, &["checkout", "-b", "feature"])?;
    create_file(&repo.path, "shared.txt", "start\nfeature\nend\n")?;
    git_commit_all(&repo.path, "Feature change")?;

    git(&repo.path, &["checkout", "main"])?;
    create_file(&repo.path, "shared.txt", "start\nmain\nend\n")?;
    git_commit_all(&repo.path, "Main change")?;

    git_unchecked(&repo.path, &["merge", "feature"])?;
    Ok(repo)
}

/// Coordinator over `repo` through a granted directory handle and the git2 plumbing.
pub fn open_coordinator(repo: &TestRepo) -> Arc<GitCoordinator> {
    coordinator_for(&repo.path, repo.data_dir.path())
}

pub fn coordinator_for(workspace: &Path, data_dir: &Path) -> Arc<GitCoordinator> {
    let workspace_path = workspace.to_string_lossy().into_owned();
    let handles = DirHandleRegistry::new();
    handles.register(
        workspace_path.clone(),
        Arc::new(LocalDirectoryHandle::new(workspace)),
    );

    let store = StateStore::new();
    store.set_workspace_path(workspace_path);

    Arc::new(GitCoordinator::new(
        store,
        EventDispatcher::new(),
        Arc::new(Git2Plumbing::new()),
        Arc::new(DefaultFilesystemFactory::new(
            Environment::with_directory_picker(),
            handles,
            VirtualFsRegistry::new(data_dir.join("virtual")),
        )),
    ))
}

/// Coordinator on the virtual backend only, storing namespaces under `data_dir`.
pub fn virtual_coordinator(data_dir: &Path, workspace_path: &str) -> Arc<GitCoordinator> {
    let store = StateStore::new();
    store.set_workspace_path(workspace_path);

    Arc::new(GitCoordinator::new(
        store,
        EventDispatcher::new(),
        Arc::new(Git2Plumbing::new()),
        Arc::new(DefaultFilesystemFactory::new(
            Environment::virtual_only(),
            DirHandleRegistry::new(),
            VirtualFsRegistry::new(data_dir.join("virtual")),
        )),
    ))
}

/// The CLI binary, run in `dir` with config and data kept inside `data_dir`.
pub fn workspace_cmd(dir: &Path, data_dir: &Path) -> anyhow::Result<Command> {
    use assert_cmd::prelude::*;

    let mut cmd = Command::cargo_bin("git-workspace")?;
    cmd.current_dir(dir)
        .env("XDG_CONFIG_HOME", data_dir.join("config"))
        .env("XDG_DATA_HOME", data_dir.join("data"))
        .env("NO_COLOR", "1");
    Ok(cmd)
}
