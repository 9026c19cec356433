//! State container and the data model it holds.
//!
//! This module defines the values the coordinator produces (status snapshots, branch
//! and commit lists, operation state) and [`StateStore`], the synchronous state
//! container every operation reads from and writes to.
//!
//! # Public API
//! - [`FileStatusEntry`]: One path with its status and staged flag
//! - [`GitStatusSnapshot`]: Whole-repository status, recomputed after each mutation
//! - [`OperationState`]: Progress and error reporting for long-running operations
//! - [`StateStore`]: `Arc<RwLock<GitState>>` with closure-based read/update access
//!
//! Writes through [`StateStore::update`] are visible to the next read immediately.

use crate::core::{
    config::{GitAuthor, GitSettings},
    git_status::FileStatus,
};
use crate::merge::ConflictRegion;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileStatusEntry {
    pub path: String,
    pub status: FileStatus,
    pub is_staged: bool,
}

impl FileStatusEntry {
    pub fn staged(path: impl Into<String>, status: FileStatus) -> Self {
        Self {
            path: path.into(),
            status,
            is_staged: true,
        }
    }

    pub fn unstaged(path: impl Into<String>, status: FileStatus) -> Self {
        Self {
            path: path.into(),
            status,
            is_staged: false,
        }
    }
}

/// Repository status as shown in the source-control panel.
///
/// A path may appear once in `staged_files` and once in `unstaged_files` when it is
/// partially staged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitStatusSnapshot {
    pub branch: String,
    pub is_repo_dirty: bool,
    pub staged_files: Vec<FileStatusEntry>,
    pub unstaged_files: Vec<FileStatusEntry>,
    pub untracked_files: Vec<FileStatusEntry>,
    pub ahead_by: usize,
    pub behind_by: usize,
    pub merge_in_progress: bool,
}

impl GitStatusSnapshot {
    pub fn changed_file_count(&self) -> usize {
        self.staged_files.len() + self.unstaged_files.len() + self.untracked_files.len()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchEntry {
    pub name: String,
    pub is_remote: bool,
    pub is_current: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteEntry {
    pub name: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitEntry {
    pub oid: String,
    pub message: String,
    pub author: GitAuthor,
    /// Seconds since the Unix epoch
    pub timestamp: i64,
}

/// Who last changed one line of a file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlameLine {
    /// 1-based
    pub line: usize,
    pub author: String,
    /// `YYYY-MM-DD`, UTC
    pub date: String,
    /// First 8 characters of the commit id
    pub commit_hash: String,
    pub commit_message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StashEntry {
    /// Position in the stash list, 0 being the newest
    pub index: usize,
    pub message: String,
    pub oid: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    Clone,
    Commit,
    Push,
    Pull,
    Fetch,
    Stash,
}

impl OperationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationKind::Clone => "clone",
            OperationKind::Commit => "commit",
            OperationKind::Push => "push",
            OperationKind::Pull => "pull",
            OperationKind::Fetch => "fetch",
            OperationKind::Stash => "stash",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationState {
    pub in_progress: bool,
    pub kind: Option<OperationKind>,
    /// Always within `0..=100`
    pub progress_percent: u8,
    pub error_message: Option<String>,
}

/// Username/token pair used for authenticated transport. Never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub token: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            token: token.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.username.is_empty() && self.token.is_empty()
    }
}

/// Everything the state container holds.
#[derive(Debug, Clone, Default)]
pub struct GitState {
    pub workspace_path: String,
    pub is_repo_initialized: bool,
    pub credentials: Option<Credentials>,
    pub author: GitAuthor,
    pub settings: GitSettings,
    pub current_branch: String,
    pub status: Option<GitStatusSnapshot>,
    pub branches: Vec<BranchEntry>,
    pub remotes: Vec<RemoteEntry>,
    pub commit_log: Vec<CommitEntry>,
    pub operation: OperationState,
    pub conflicts: Vec<ConflictRegion>,
    pub blame_data: Vec<BlameLine>,
    pub blame_visible: bool,
    pub stashes: Vec<StashEntry>,
}

/// Shared synchronous state container.
///
/// Cloning a `StateStore` yields another handle on the same state.
#[derive(Debug, Clone, Default)]
pub struct StateStore {
    state: Arc<RwLock<GitState>>,
}

impl StateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_state(state: GitState) -> Self {
        Self {
            state: Arc::new(RwLock::new(state)),
        }
    }

    /// Clone of the whole state, safe to hold across await points
    pub fn snapshot(&self) -> GitState {
        self.read_guard().clone()
    }

    /// Execute a function with read access to the state
    pub fn read<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&GitState) -> R,
    {
        let state = self.read_guard();
        f(&state)
    }

    /// Execute a function with write access to the state
    pub fn update<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut GitState) -> R,
    {
        let mut state = self.write_guard();
        f(&mut state)
    }

    pub fn workspace_path(&self) -> String {
        self.read(|s| s.workspace_path.clone())
    }

    pub fn set_workspace_path(&self, path: impl Into<String>) {
        let path = path.into();
        self.update(|s| s.workspace_path = path);
    }

    pub fn current_branch(&self) -> String {
        self.read(|s| s.current_branch.clone())
    }

    pub fn operation(&self) -> OperationState {
        self.read(|s| s.operation.clone())
    }

    pub fn status(&self) -> Option<GitStatusSnapshot> {
        self.read(|s| s.status.clone())
    }

    pub fn conflicts(&self) -> Vec<ConflictRegion> {
        self.read(|s| s.conflicts.clone())
    }

    pub fn set_conflicts(&self, conflicts: Vec<ConflictRegion>) {
        self.update(|s| s.conflicts = conflicts);
    }

    pub fn set_error(&self, message: Option<String>) {
        self.update(|s| s.operation.error_message = message);
    }

    // A panic while holding the lock leaves plain data behind; keep serving it.
    fn read_guard(&self) -> RwLockReadGuard<'_, GitState> {
        self.state.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write_guard(&self) -> RwLockWriteGuard<'_, GitState> {
        self.state.write().unwrap_or_else(|e| e.into_inner())
    }
}
