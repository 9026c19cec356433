use super::context::CommandContext;
use crate::core::{
    error::Result, format_file_status, print_info, print_section_header,
    state::FileStatusEntry,
};
use colored::*;
use std::path::Path;

pub async fn execute_status(workspace: &Path) -> Result<()> {
    let context = CommandContext::open(workspace).await?;
    let Some(status) = context.coordinator.store().status() else {
        print_info("Status unavailable");
        return Ok(());
    };

    println!("\n{} {}", "On branch".bright_black(), status.branch.blue());
    if status.merge_in_progress {
        println!(
            "{}",
            "Merge in progress; resolve conflicts and commit".red()
        );
    }

    if !status.is_repo_dirty {
        print_info("Nothing to commit, working tree clean");
        return Ok(());
    }

    print_group("Staged changes", &status.staged_files);
    print_group("Unstaged changes", &status.unstaged_files);
    print_group("Untracked files", &status.untracked_files);
    println!();

    Ok(())
}

fn print_group(header: &str, entries: &[FileStatusEntry]) {
    if entries.is_empty() {
        return;
    }

    let mut entries: Vec<&FileStatusEntry> = entries.iter().collect();
    entries.sort_by(|a, b| {
        a.status
            .sort_priority(a.is_staged)
            .cmp(&b.status.sort_priority(b.is_staged))
            .then_with(|| a.path.cmp(&b.path))
    });

    print_section_header(header);
    for entry in entries {
        println!("  {}", format_file_status(entry.status, &entry.path));
    }
}

/// Line-count summary of what is staged.
pub async fn execute_summary(workspace: &Path) -> Result<()> {
    let context = CommandContext::open(workspace).await?;
    let summary = context.coordinator.get_staged_diff().await;

    if summary.is_empty() {
        print_info("Nothing staged");
    } else {
        println!("{summary}");
    }
    Ok(())
}
