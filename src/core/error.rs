//! Domain-specific error types and error handling utilities.
//!
//! This module defines [`GitWorkspaceError`] which covers every failure mode of the
//! workspace git core. It uses `thiserror` for ergonomic error definitions and includes
//! constructors for the failure scenarios the coordinator reports.
//!
//! # Public API
//! - [`GitWorkspaceError`]: Main error enum covering all failure modes
//! - [`Result<T>`]: Type alias for `std::result::Result<T, GitWorkspaceError>`
//!
//! # Error Categories
//! - **Git operations**: Repository not found, git2 library errors, merge conflicts
//! - **Storage**: Filesystem adapter I/O, missing backends, invalid UTF-8
//! - **Configuration**: Config directory and JSON persistence errors

use std::path::PathBuf;
use thiserror::Error;

/// Domain-specific error types for git-workspace
#[derive(Error, Debug)]
pub enum GitWorkspaceError {
    // Git repository errors
    #[error("Not in a git repository")]
    NotInGitRepo,

    #[error("{0}")]
    Git(#[from] git2::Error),

    #[error("Invalid UTF-8 path in repository")]
    InvalidUtf8Path,

    #[error("Could not find HEAD reference")]
    NoHead,

    #[error("Path not found at HEAD: {path}")]
    NotFoundAtHead { path: String },

    #[error("Blob at {path} is not valid UTF-8")]
    InvalidUtf8Blob { path: String },

    #[error("Automatic merge failed; fix conflicts in {count} file(s) and then commit the result")]
    MergeConflict { count: usize },

    #[error("Remote '{name}' not found")]
    RemoteNotFound { name: String },

    #[error("Branch '{name}' not found")]
    BranchNotFound { name: String },

    /// A captured operation error, surfaced again by the CLI host
    #[error("{message}")]
    OperationFailed { message: String },

    // Storage errors
    #[error("No filesystem available")]
    NoFilesystem,

    #[error("Filesystem backend has no on-disk location for '{dir}'")]
    NoRealPath { dir: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Background task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    // Configuration errors
    #[error("Could not find configuration directory")]
    ConfigDirectoryNotFound,

    #[error("Failed to create directory '{path}': {source}")]
    DirectoryCreationFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience type alias for Results using GitWorkspaceError
pub type Result<T> = std::result::Result<T, GitWorkspaceError>;

impl GitWorkspaceError {
    /// Create a path-not-found-at-HEAD error
    pub fn not_found_at_head(path: impl Into<String>) -> Self {
        Self::NotFoundAtHead { path: path.into() }
    }

    /// Create an invalid UTF-8 blob error
    pub fn invalid_utf8_blob(path: impl Into<String>) -> Self {
        Self::InvalidUtf8Blob { path: path.into() }
    }

    /// Create a remote not found error
    pub fn remote_not_found(name: impl Into<String>) -> Self {
        Self::RemoteNotFound { name: name.into() }
    }

    /// Create a branch not found error
    pub fn branch_not_found(name: impl Into<String>) -> Self {
        Self::BranchNotFound { name: name.into() }
    }

    /// Create an operation failed error from a recorded message
    pub fn operation_failed(message: impl Into<String>) -> Self {
        Self::OperationFailed {
            message: message.into(),
        }
    }

    /// Create a missing on-disk location error
    pub fn no_real_path(dir: impl Into<String>) -> Self {
        Self::NoRealPath { dir: dir.into() }
    }

    /// Create a directory creation failed error
    pub fn directory_creation_failed(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::DirectoryCreationFailed {
            path: path.into(),
            source,
        }
    }

    /// Message recorded in `OperationState::error_message` for this failure.
    ///
    /// git2 errors carry their class and code in `Display`; only the message text
    /// is surfaced.
    pub fn operation_message(&self) -> String {
        match self {
            GitWorkspaceError::Git(e) => e.message().to_string(),
            other => other.to_string(),
        }
    }
}
