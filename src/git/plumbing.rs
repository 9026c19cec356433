//! The git capability the coordinator drives.
//!
//! Every call names the storage (`fs`) and the repository directory inside it
//! (`dir`), so one implementation serves every backend. [`Git2Plumbing`] is the
//! libgit2-backed implementation; tests substitute their own.
//!
//! [`Git2Plumbing`]: super::Git2Plumbing

use super::status_matrix::StatusMatrix;
use crate::core::{
    config::GitAuthor,
    error::Result,
    state::{CommitEntry, Credentials, RemoteEntry, StashEntry},
};
use crate::fs::FsAdapter;
use async_trait::async_trait;
use std::sync::Arc;

/// Objects (or bytes) transferred so far. `total` is `None` while unknown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferProgress {
    pub loaded: u64,
    pub total: Option<u64>,
}

impl TransferProgress {
    /// `round(loaded / total * 100)` clamped to 100, or `None` with no known total
    pub fn percent(&self) -> Option<u8> {
        let total = self.total.filter(|t| *t > 0)?;
        let percent = (self.loaded as f64 / total as f64 * 100.0).round();
        Some(percent.clamp(0.0, 100.0) as u8)
    }
}

pub type ProgressCallback = Arc<dyn Fn(TransferProgress) + Send + Sync>;

/// Options shared by network operations.
#[derive(Clone, Default)]
pub struct RemoteOptions {
    pub remote: String,
    pub credentials: Option<Credentials>,
    pub proxy: Option<String>,
    pub on_progress: Option<ProgressCallback>,
}

impl std::fmt::Debug for RemoteOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteOptions")
            .field("remote", &self.remote)
            .field("has_credentials", &self.credentials.is_some())
            .field("proxy", &self.proxy)
            .finish_non_exhaustive()
    }
}

/// A run of consecutive lines last changed by the same commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlameHunk {
    /// 1-based line in the committed file
    pub start_line: usize,
    pub lines: usize,
    pub commit: CommitEntry,
}

/// A shallow clone request.
#[derive(Debug, Clone, Default)]
pub struct CloneOptions {
    pub url: String,
    /// Branch to clone; the remote's default branch when `None`
    pub branch: Option<String>,
    pub depth: u32,
    pub single_branch: bool,
    pub remote: RemoteOptions,
}

#[async_trait]
pub trait GitPlumbing: Send + Sync {
    /// Directory of the repository containing `dir`.
    async fn find_root(&self, fs: &dyn FsAdapter, dir: &str) -> Result<String>;

    async fn init(&self, fs: &dyn FsAdapter, dir: &str, default_branch: &str) -> Result<()>;

    async fn clone_repo(&self, fs: &dyn FsAdapter, dir: &str, options: CloneOptions)
        -> Result<()>;

    /// Current branch name; `None` when HEAD is detached.
    async fn current_branch(&self, fs: &dyn FsAdapter, dir: &str) -> Result<Option<String>>;

    async fn status_matrix(&self, fs: &dyn FsAdapter, dir: &str) -> Result<StatusMatrix>;

    /// Stage a path. A path missing from the working tree stages its deletion.
    async fn add(&self, fs: &dyn FsAdapter, dir: &str, path: &str) -> Result<()>;

    /// Reset the index entry of a path to HEAD.
    async fn reset_index(&self, fs: &dyn FsAdapter, dir: &str, path: &str) -> Result<()>;

    /// Force-restore paths in the working tree and index from HEAD.
    async fn checkout_paths(&self, fs: &dyn FsAdapter, dir: &str, paths: &[String])
        -> Result<()>;

    /// Commit the index; returns the new commit id.
    async fn commit(
        &self,
        fs: &dyn FsAdapter,
        dir: &str,
        message: &str,
        author: &GitAuthor,
    ) -> Result<String>;

    async fn push(&self, fs: &dyn FsAdapter, dir: &str, branch: &str, options: RemoteOptions)
        -> Result<()>;

    /// Fetch then integrate `branch` from the remote.
    async fn pull(
        &self,
        fs: &dyn FsAdapter,
        dir: &str,
        branch: &str,
        author: &GitAuthor,
        options: RemoteOptions,
    ) -> Result<()>;

    async fn fetch(&self, fs: &dyn FsAdapter, dir: &str, options: RemoteOptions) -> Result<()>;

    async fn checkout_branch(&self, fs: &dyn FsAdapter, dir: &str, name: &str) -> Result<()>;

    async fn create_branch(&self, fs: &dyn FsAdapter, dir: &str, name: &str) -> Result<()>;

    async fn delete_branch(&self, fs: &dyn FsAdapter, dir: &str, name: &str) -> Result<()>;

    /// Local branch names, or the branches of `remote` without the remote prefix.
    async fn list_branches(
        &self,
        fs: &dyn FsAdapter,
        dir: &str,
        remote: Option<&str>,
    ) -> Result<Vec<String>>;

    async fn list_remotes(&self, fs: &dyn FsAdapter, dir: &str) -> Result<Vec<RemoteEntry>>;

    async fn add_remote(&self, fs: &dyn FsAdapter, dir: &str, name: &str, url: &str)
        -> Result<()>;

    /// Most recent commits first, at most `depth`.
    async fn log(&self, fs: &dyn FsAdapter, dir: &str, depth: usize) -> Result<Vec<CommitEntry>>;

    /// Commit id a reference resolves to.
    async fn resolve_ref(&self, fs: &dyn FsAdapter, dir: &str, reference: &str) -> Result<String>;

    /// Bytes of `path` in the tree of commit `oid`.
    async fn read_blob(&self, fs: &dyn FsAdapter, dir: &str, oid: &str, path: &str)
        -> Result<Vec<u8>>;

    /// Line attribution of `path` as committed at HEAD.
    async fn blame(&self, fs: &dyn FsAdapter, dir: &str, path: &str) -> Result<Vec<BlameHunk>>;

    /// Stash tracked and untracked changes; returns the stash commit id.
    async fn stash_save(
        &self,
        fs: &dyn FsAdapter,
        dir: &str,
        message: &str,
        author: &GitAuthor,
    ) -> Result<String>;

    /// Stashes, newest first.
    async fn stash_list(&self, fs: &dyn FsAdapter, dir: &str) -> Result<Vec<StashEntry>>;

    async fn stash_apply(&self, fs: &dyn FsAdapter, dir: &str, index: usize) -> Result<()>;

    /// Apply the stash at `index` and drop it when it applied cleanly.
    async fn stash_pop(&self, fs: &dyn FsAdapter, dir: &str, index: usize) -> Result<()>;

    async fn stash_drop(&self, fs: &dyn FsAdapter, dir: &str, index: usize) -> Result<()>;
}
