use super::context::CommandContext;
use crate::core::{
    error::{GitWorkspaceError, Result},
    print_info, print_section_header, print_success,
};
use colored::*;
use std::path::Path;

pub async fn execute_stash_push(workspace: &Path, message: Option<&str>) -> Result<()> {
    let context = CommandContext::open(workspace).await?;
    if context.coordinator.stash_changes(message).await {
        print_success("Saved working directory and index state");
        return Ok(());
    }
    context.check()?;
    print_info("No local changes to save");
    Ok(())
}

pub async fn execute_stash_list(workspace: &Path) -> Result<()> {
    let context = CommandContext::open(workspace).await?;
    let stashes = context.coordinator.list_stashes().await;

    if stashes.is_empty() {
        print_info("No stashes");
        return Ok(());
    }

    print_section_header("Stashes");
    for stash in &stashes {
        println!(
            "    {} {}",
            format!("stash@{{{}}}:", stash.index).yellow(),
            stash.message.white()
        );
    }
    println!();
    Ok(())
}

pub async fn execute_stash_pop(workspace: &Path, index: usize) -> Result<()> {
    let context = CommandContext::open(workspace).await?;
    let done = context.coordinator.pop_stash(index).await;
    finish(&context, done, index, "Applied and dropped")
}

pub async fn execute_stash_apply(workspace: &Path, index: usize) -> Result<()> {
    let context = CommandContext::open(workspace).await?;
    let done = context.coordinator.apply_stash(index).await;
    finish(&context, done, index, "Applied")
}

pub async fn execute_stash_drop(workspace: &Path, index: usize) -> Result<()> {
    let context = CommandContext::open(workspace).await?;
    let done = context.coordinator.drop_stash(index).await;
    finish(&context, done, index, "Dropped")
}

pub async fn execute_stash_clear(workspace: &Path) -> Result<()> {
    let context = CommandContext::open(workspace).await?;
    context.coordinator.clear_all_stashes().await;
    context.check()?;
    print_success("Cleared all stashes");
    Ok(())
}

fn finish(context: &CommandContext, done: bool, index: usize, verb: &str) -> Result<()> {
    context.check()?;
    if !done {
        return Err(GitWorkspaceError::operation_failed(format!(
            "No stash entry at stash@{{{index}}}"
        )));
    }
    print_success(&format!("{verb} stash@{{{index}}}"));
    Ok(())
}
