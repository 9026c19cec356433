use super::context::CommandContext;
use crate::core::{error::Result, print_info, state::CommitEntry};
use chrono::DateTime;
use colored::*;
use std::path::Path;

pub async fn execute_log(workspace: &Path, limit: usize) -> Result<()> {
    let context = CommandContext::open(workspace).await?;
    context.coordinator.fetch_commit_log(limit).await;
    let commits = context.coordinator.store().read(|s| s.commit_log.clone());

    if commits.is_empty() {
        print_info("No commits yet");
        return Ok(());
    }

    println!();
    for commit in &commits {
        println!("{}", format_commit(commit));
    }
    println!();
    Ok(())
}

fn format_commit(commit: &CommitEntry) -> String {
    let short = &commit.oid[..commit.oid.len().min(7)];
    let subject = commit.message.lines().next().unwrap_or_default();
    let date = DateTime::from_timestamp(commit.timestamp, 0)
        .map(|d| d.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_default();

    format!(
        "{} {} {} {}",
        short.yellow(),
        subject.white(),
        format!("({})", commit.author.name).bright_black(),
        date.bright_black()
    )
}
