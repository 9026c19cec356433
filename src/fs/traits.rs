//! Core filesystem adapter trait and metadata types.

use async_trait::async_trait;
use std::io;
use std::path::PathBuf;
use std::time::SystemTime;

/// Kind of filesystem entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FsEntryKind {
    File,
    Directory,
    Symlink,
}

/// Metadata returned by `stat` and `lstat`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FsStat {
    pub kind: FsEntryKind,
    /// Size in bytes (0 for directories).
    pub size: u64,
    /// Unix mode bits, e.g. `0o100644` for a regular file.
    pub mode: u32,
    pub modified: Option<SystemTime>,
}

impl FsStat {
    pub fn directory(modified: Option<SystemTime>) -> Self {
        Self {
            kind: FsEntryKind::Directory,
            size: 0,
            mode: 0o40755,
            modified,
        }
    }

    pub fn file(size: u64, modified: Option<SystemTime>) -> Self {
        Self {
            kind: FsEntryKind::File,
            size,
            mode: 0o100644,
            modified,
        }
    }

    pub fn is_file(&self) -> bool {
        self.kind == FsEntryKind::File
    }

    pub fn is_directory(&self) -> bool {
        self.kind == FsEntryKind::Directory
    }

    pub fn is_symbolic_link(&self) -> bool {
        self.kind == FsEntryKind::Symlink
    }
}

/// Storage capability shared by every backend.
///
/// Paths are POSIX-style, forward-slash separated and relative to the adapter's
/// root. `""`, `"/"` and `"."` all name the root. Errors from the underlying storage
/// are returned as-is; adapters never retry.
#[async_trait]
pub trait FsAdapter: Send + Sync {
    /// Read the entire contents of a file.
    async fn read_file(&self, path: &str) -> io::Result<Vec<u8>>;

    /// Write a file, creating it (and, where the backend allows, its parents).
    async fn write_file(&self, path: &str, data: &[u8]) -> io::Result<()>;

    /// Remove a file.
    async fn unlink(&self, path: &str) -> io::Result<()>;

    /// Names of the direct children of a directory, fully materialized.
    async fn readdir(&self, path: &str) -> io::Result<Vec<String>>;

    /// Create a directory and any missing parents.
    async fn mkdir(&self, path: &str) -> io::Result<()>;

    /// Remove a directory and everything under it.
    async fn rmdir(&self, path: &str) -> io::Result<()>;

    async fn stat(&self, path: &str) -> io::Result<FsStat>;

    /// Metadata without following symlinks.
    async fn lstat(&self, path: &str) -> io::Result<FsStat> {
        // Default: same as stat (for backends without symlinks)
        self.stat(path).await
    }

    /// On-disk location of a path, for libraries that need real paths (libgit2).
    ///
    /// Returns `None` for backends that are not reachable through the OS filesystem.
    fn real_path(&self, path: &str) -> Option<PathBuf> {
        let _ = path;
        None
    }
}

/// True for the synthetic root path spellings.
pub fn is_root_path(path: &str) -> bool {
    matches!(path, "" | "/" | ".")
}

/// Non-empty path segments, ignoring `.` components.
pub fn path_segments(path: &str) -> Vec<&str> {
    path.split('/')
        .filter(|segment| !segment.is_empty() && *segment != ".")
        .collect()
}
