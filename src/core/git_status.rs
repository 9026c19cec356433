//! Type-safe git file status enumeration.
//!
//! This module defines [`FileStatus`], the classification a path receives when the
//! status matrix is translated into the staged/unstaged/untracked UI lists.
//!
//! # Public API
//! - [`FileStatus`]: Enumeration of the statuses a file entry can carry
//!
//! # Key Features
//! - **Type safety**: Compile-time checking instead of runtime string comparisons
//! - **Display formatting**: Lowercase names used in summaries (`"modified: a.txt"`)
//! - **Sorting logic**: Built-in priority ordering for status display

use serde::{Deserialize, Serialize};
use std::fmt;

/// Status of a single path in the working tree or index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    /// Not in HEAD and not in the index
    Untracked,
    /// New in the index
    Added,
    /// Content differs from HEAD
    Modified,
    /// Removed from the working tree or index
    Deleted,
    /// Index holds conflict stages for this path
    Unmerged,
}

impl FileStatus {
    /// Lowercase name used in summaries and serialized state
    pub fn as_str(&self) -> &'static str {
        match self {
            FileStatus::Untracked => "untracked",
            FileStatus::Added => "added",
            FileStatus::Modified => "modified",
            FileStatus::Deleted => "deleted",
            FileStatus::Unmerged => "unmerged",
        }
    }

    /// Short code shown next to a path in terminal output
    pub fn short_code(&self) -> &'static str {
        match self {
            FileStatus::Untracked => "??",
            FileStatus::Added => "A",
            FileStatus::Modified => "M",
            FileStatus::Deleted => "D",
            FileStatus::Unmerged => "UU",
        }
    }

    /// Get sort priority for status ordering
    pub fn sort_priority(&self, staged: bool) -> u8 {
        match (self, staged) {
            // Conflicts need attention first
            (FileStatus::Unmerged, _) => 0,
            (FileStatus::Added, true) => 1,
            (FileStatus::Modified, true) => 2,
            (FileStatus::Deleted, true) => 3,
            (FileStatus::Modified, false) => 4,
            (FileStatus::Deleted, false) => 5,
            (FileStatus::Untracked, _) => 6,
            _ => 7,
        }
    }
}

impl fmt::Display for FileStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
