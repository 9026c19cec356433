//! Status colors for terminal output.
//!
//! One mapping from [`FileStatus`] to a color, shared by every command that prints
//! file lists.
//!
//! # Color Scheme
//! - **Modified**: Yellow
//! - **Added**: Green
//! - **Deleted**: Red
//! - **Untracked**: Cyan
//! - **Unmerged**: Red bold

use crate::core::git_status::FileStatus;
use colored::*;

/// Color closure for a status, applicable to any text
pub fn get_status_color_style(status: FileStatus) -> Box<dyn Fn(&str) -> ColoredString> {
    match status {
        FileStatus::Modified => Box::new(|text: &str| text.yellow()),
        FileStatus::Untracked => Box::new(|text: &str| text.cyan()),
        FileStatus::Deleted => Box::new(|text: &str| text.red()),
        FileStatus::Added => Box::new(|text: &str| text.green()),
        FileStatus::Unmerged => Box::new(|text: &str| text.red().bold()),
    }
}

/// Colored short code padded to two columns
pub fn get_aligned_status(status: FileStatus) -> ColoredString {
    let color_fn = get_status_color_style(status);
    color_fn(&format!("{:<2}", status.short_code()))
}

pub fn get_colored_path(status: FileStatus, path: &str) -> ColoredString {
    let color_fn = get_status_color_style(status);
    color_fn(path)
}

/// `<code> <path>` line for a file list
pub fn format_file_status(status: FileStatus, path: &str) -> String {
    format!(
        "{} {}",
        get_aligned_status(status),
        get_colored_path(status, path)
    )
}
