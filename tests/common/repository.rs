//! Git repository setup for integration tests
//!
//! Repositories are created with the `git` CLI in temporary directories, so the
//! library under test only ever sees what real git wrote.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

/// A repository in a temporary directory, plus a second directory for config and
/// virtual-filesystem data. Both are removed on drop.
pub struct TestRepo {
    pub temp_dir: TempDir,
    pub data_dir: TempDir,
    pub path: PathBuf,
}

impl TestRepo {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Run git in `dir`, failing on a non-zero exit. Returns trimmed stdout.
pub fn git(dir: &Path, args: &[&str]) -> anyhow::Result<String> {
    let output = Command::new("git").args(args).current_dir(dir).output()?;
    if !output.status.success() {
        anyhow::bail!(
            "git {} failed: {}",
            args.join(" "),
            String::from_utf8_lossy(&output.stderr)
        );
    }
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

/// Run git in `dir` and ignore the exit status (e.g. a merge expected to conflict).
pub fn git_unchecked(dir: &Path, args: &[&str]) -> anyhow::Result<()> {
    Command::new("git").args(args).current_dir(dir).output()?;
    Ok(())
}

fn configure(dir: &Path) -> anyhow::Result<()> {
    git(dir, &["config", "user.name", "Test User"])?;
    git(dir, &["config", "user.email", "test@example.com"])?;
    git(dir, &["config", "commit.gpgsign", "false"])?;
    Ok(())
}

/// Fresh repository on `main` with no commits.
pub fn setup_test_repo() -> anyhow::Result<TestRepo> {
    let temp_dir = TempDir::new()?;
    let data_dir = TempDir::new()?;
    let path = temp_dir.path().to_path_buf();

    git(&path, &["init"])?;
    git(&path, &["symbolic-ref", "HEAD", "refs/heads/main"])?;
    configure(&path)?;

    Ok(TestRepo {
        temp_dir,
        data_dir,
        path,
    })
}

/// Repository with `initial.txt` committed on `main`.
pub fn setup_test_repo_with_initial_commit() -> anyhow::Result<TestRepo> {
    let repo = setup_test_repo()?;
    create_file(&repo.path, "initial.txt", "initial content\n")?;
    git(&repo.path, &["add", "initial.txt"])?;
    git(&repo.path, &["commit", "-m", "Initial commit"])?;
    Ok(repo)
}

/// Bare repository usable as a remote.
pub fn setup_bare_remote() -> anyhow::Result<TempDir> {
    let temp_dir = TempDir::new()?;
    git(temp_dir.path(), &["init", "--bare"])?;
    git(temp_dir.path(), &["symbolic-ref", "HEAD", "refs/heads/main"])?;
    Ok(temp_dir)
}

/// Plain clone of `url` into a new temporary directory.
pub fn git_clone(url: &Path) -> anyhow::Result<TempDir> {
    let temp_dir = TempDir::new()?;
    let source = url.to_string_lossy();
    git(temp_dir.path(), &["clone", source.as_ref(), "."])?;
    configure(temp_dir.path())?;
    Ok(temp_dir)
}

pub fn create_file(repo_path: &Path, filename: &str, content: &str) -> anyhow::Result<()> {
    let target = repo_path.join(filename);
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(target, content)?;
    Ok(())
}

pub fn read_file(repo_path: &Path, filename: &str) -> anyhow::Result<String> {
    Ok(fs::read_to_string(repo_path.join(filename))?)
}

pub fn remove_file(repo_path: &Path, filename: &str) -> anyhow::Result<()> {
    fs::remove_file(repo_path.join(filename))?;
    Ok(())
}

pub fn git_commit_all(repo_path: &Path, message: &str) -> anyhow::Result<()> {
    git(repo_path, &["add", "-A"])?;
    git(repo_path, &["commit", "-m", message])?;
    Ok(())
}
