//! Status matrix to UI model translation.
//!
//! A status matrix row describes one path by three small integers: its presence in
//! HEAD, in the working directory and in the index. [`translate_status_matrix`] sorts
//! those rows into the staged, unstaged and untracked lists the source-control panel
//! shows. It is a pure function; nothing here touches a repository.

use crate::core::{
    git_status::FileStatus,
    state::{FileStatusEntry, GitStatusSnapshot},
};
use serde::{Deserialize, Serialize};

/// Absent from the tree/index/workdir being described.
pub const ABSENT: u8 = 0;
/// Identical to HEAD.
pub const UNCHANGED: u8 = 1;
/// Present and different from HEAD (or identical to the workdir, for the index).
pub const CHANGED: u8 = 2;
/// Index entry differs from both HEAD and the workdir.
pub const STAGE_PARTIAL: u8 = 3;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusRow {
    pub path: String,
    pub head: u8,
    pub workdir: u8,
    pub stage: u8,
}

impl StatusRow {
    pub fn new(path: impl Into<String>, head: u8, workdir: u8, stage: u8) -> Self {
        Self {
            path: path.into(),
            head,
            workdir,
            stage,
        }
    }
}

/// Everything the plumbing reports about the working tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusMatrix {
    pub rows: Vec<StatusRow>,
    /// Paths whose index entry holds conflict stages
    pub conflicted: Vec<String>,
    pub merge_in_progress: bool,
}

impl StatusMatrix {
    pub fn from_rows(rows: Vec<StatusRow>) -> Self {
        Self {
            rows,
            ..Default::default()
        }
    }
}

/// Where a single row lands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowClass {
    Untracked,
    Staged(FileStatus),
    Unstaged(FileStatus),
    /// Partially staged: listed as staged and unstaged modification
    StagedAndUnstaged(FileStatus),
    /// Combination outside the known shapes
    Unclassified,
}

/// Classify one `(head, workdir, stage)` triple. First matching rule wins.
pub fn classify_row(head: u8, workdir: u8, stage: u8) -> RowClass {
    match (head, workdir, stage) {
        (ABSENT, CHANGED, ABSENT) => RowClass::Untracked,
        (ABSENT, ABSENT | CHANGED, CHANGED) => RowClass::Staged(FileStatus::Added),
        (UNCHANGED, CHANGED, CHANGED) => RowClass::Staged(FileStatus::Modified),
        (UNCHANGED, CHANGED, STAGE_PARTIAL) => RowClass::StagedAndUnstaged(FileStatus::Modified),
        (UNCHANGED, CHANGED, UNCHANGED) => RowClass::Unstaged(FileStatus::Modified),
        (UNCHANGED, ABSENT, ABSENT) => RowClass::Staged(FileStatus::Deleted),
        (UNCHANGED, ABSENT, UNCHANGED) => RowClass::Unstaged(FileStatus::Deleted),
        _ => RowClass::Unclassified,
    }
}

/// Build a status snapshot from a matrix.
///
/// Conflicted paths are listed once, as unstaged `unmerged`, ahead of every other
/// rule. Rows no rule matches are dropped. Ahead/behind counts stay at zero.
pub fn translate_status_matrix(matrix: &StatusMatrix, branch: &str) -> GitStatusSnapshot {
    let mut staged_files = Vec::new();
    let mut unstaged_files = Vec::new();
    let mut untracked_files = Vec::new();

    for path in &matrix.conflicted {
        unstaged_files.push(FileStatusEntry::unstaged(path.clone(), FileStatus::Unmerged));
    }

    for row in &matrix.rows {
        if matrix.conflicted.contains(&row.path) {
            continue;
        }

        match classify_row(row.head, row.workdir, row.stage) {
            RowClass::Untracked => {
                untracked_files.push(FileStatusEntry::unstaged(
                    row.path.clone(),
                    FileStatus::Untracked,
                ));
            }
            RowClass::Staged(status) => {
                staged_files.push(FileStatusEntry::staged(row.path.clone(), status));
            }
            RowClass::Unstaged(status) => {
                unstaged_files.push(FileStatusEntry::unstaged(row.path.clone(), status));
            }
            RowClass::StagedAndUnstaged(status) => {
                staged_files.push(FileStatusEntry::staged(row.path.clone(), status));
                unstaged_files.push(FileStatusEntry::unstaged(row.path.clone(), status));
            }
            RowClass::Unclassified => {
                log::trace!(
                    "Dropping status row {} [{}, {}, {}]",
                    row.path,
                    row.head,
                    row.workdir,
                    row.stage
                );
            }
        }
    }

    let is_repo_dirty =
        !staged_files.is_empty() || !unstaged_files.is_empty() || !untracked_files.is_empty();

    GitStatusSnapshot {
        branch: branch.to_string(),
        is_repo_dirty,
        staged_files,
        unstaged_files,
        untracked_files,
        ahead_by: 0,
        behind_by: 0,
        merge_in_progress: matrix.merge_in_progress,
    }
}
