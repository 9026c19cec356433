//! Predicates for CLI output and helpers for reading coordinator state

#![allow(dead_code)]

use git_workspace::{FileStatus, FileStatusEntry, GitCoordinator, GitStatusSnapshot};
use predicates::prelude::*;

pub fn not_in_git_repo() -> impl Predicate<str> {
    predicates::str::contains("Not in a git repository")
}

pub fn has_error() -> impl Predicate<str> {
    predicates::str::contains("✕ Error:")
}

/// `<code> <path>` as printed by the status listing, colors disabled
pub fn has_file_line(code: &str, path: &str) -> impl Predicate<str> {
    predicates::str::contains(format!("{code:<2} {path}"))
}

fn pairs(entries: &[FileStatusEntry]) -> Vec<(String, FileStatus)> {
    let mut pairs: Vec<(String, FileStatus)> = entries
        .iter()
        .map(|e| (e.path.clone(), e.status))
        .collect();
    pairs.sort_by(|a, b| a.0.cmp(&b.0));
    pairs
}

fn snapshot(coordinator: &GitCoordinator) -> GitStatusSnapshot {
    coordinator.store().status().expect("status snapshot")
}

/// `(path, status)` of staged entries, sorted by path
pub fn staged(coordinator: &GitCoordinator) -> Vec<(String, FileStatus)> {
    pairs(&snapshot(coordinator).staged_files)
}

pub fn unstaged(coordinator: &GitCoordinator) -> Vec<(String, FileStatus)> {
    pairs(&snapshot(coordinator).unstaged_files)
}

pub fn untracked(coordinator: &GitCoordinator) -> Vec<(String, FileStatus)> {
    pairs(&snapshot(coordinator).untracked_files)
}

/// Shorthand for expected `(path, status)` lists
pub fn entries(items: &[(&str, FileStatus)]) -> Vec<(String, FileStatus)> {
    items.iter().map(|(p, s)| (p.to_string(), *s)).collect()
}
