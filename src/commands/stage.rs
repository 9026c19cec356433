use super::context::CommandContext;
use crate::core::{error::Result, print_info, print_success};
use std::path::Path;

pub async fn execute_stage(workspace: &Path, path: &str) -> Result<()> {
    let context = CommandContext::open(workspace).await?;
    context.coordinator.stage_file(path).await;
    context.check()?;
    print_success(&format!("Staged {path}"));
    Ok(())
}

pub async fn execute_stage_all(workspace: &Path) -> Result<()> {
    let context = CommandContext::open(workspace).await?;
    let coordinator = &context.coordinator;

    let before = coordinator
        .store()
        .status()
        .map(|s| s.unstaged_files.len() + s.untracked_files.len())
        .unwrap_or(0);
    if before == 0 {
        print_info("Nothing to stage");
        return Ok(());
    }

    coordinator.stage_all_files().await;

    let staged = coordinator
        .store()
        .status()
        .map(|s| s.staged_files.len())
        .unwrap_or(0);
    print_success(&format!("{staged} file(s) staged"));
    Ok(())
}

pub async fn execute_unstage(workspace: &Path, path: &str) -> Result<()> {
    let context = CommandContext::open(workspace).await?;
    context.coordinator.unstage_file(path).await;
    context.check()?;
    print_success(&format!("Unstaged {path}"));
    Ok(())
}

pub async fn execute_discard(workspace: &Path, path: &str) -> Result<()> {
    let context = CommandContext::open(workspace).await?;
    context.coordinator.discard_file_changes(path).await;
    context.check()?;
    print_success(&format!("Discarded changes to {path}"));
    Ok(())
}
