//! Git Workspace - git-backed version control for editor workspaces.
//!
//! The crate detects which storage host a workspace lives on (native shell, a granted
//! File System Access directory, or a namespaced virtual store), binds git plumbing
//! to it and exposes the source-control operations an editor needs through
//! [`GitCoordinator`]. Results land in a shared [`StateStore`] and are announced on
//! an [`EventDispatcher`].
//!
//! # Public API
//! - [`GitCoordinator`]: status, staging, commits, branches, remotes and auto-fetch
//! - [`translate_status_matrix`]: status matrix rows to staged/unstaged/untracked lists
//! - [`detect_conflicts`] and [`ConflictResolver`]: conflict markers in editor buffers
//! - [`resolve_filesystem`]: backend selection and adapter construction

pub mod commands;
pub mod coordinator;
pub mod core;
pub mod fs;
pub mod git;
pub mod merge;

pub use coordinator::{Diagnostic, DiagnosticHook, GitCoordinator, WorkspaceSession};

pub use core::{
    BlameLine, BranchEntry, CommitEntry, Credentials, EventDispatcher, FileStatus,
    FileStatusEntry, GitAuthor, GitConfig, GitEvent, GitSettings, GitState, GitStatusSnapshot,
    GitWorkspaceError, OperationKind, OperationState, RemoteEntry, Result, StashEntry,
    StateStore,
};

pub use fs::{
    detect_backend, resolve_filesystem, BackendKind, DefaultFilesystemFactory,
    DirHandleRegistry, Environment, FilesystemFactory, FsAdapter, ResolvedFs, VirtualFsRegistry,
};

pub use git::{
    translate_status_matrix, Git2Plumbing, GitPlumbing, StatusMatrix, StatusRow,
};

pub use merge::{
    apply_resolution, detect_conflicts, ConflictRegion, ConflictResolver, Resolution,
    StringBuffer, TextBuffer,
};
