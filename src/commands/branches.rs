use super::context::CommandContext;
use crate::core::{
    error::Result, print_info, print_section_header, print_success, state::BranchEntry,
};
use colored::*;
use std::path::Path;

pub async fn execute_branches(workspace: &Path) -> Result<()> {
    let context = CommandContext::open(workspace).await?;
    let branches = context.coordinator.store().read(|s| s.branches.clone());

    let (remote, local): (Vec<BranchEntry>, Vec<BranchEntry>) =
        branches.into_iter().partition(|b| b.is_remote);

    if local.is_empty() {
        print_info("No branches found. Make your first commit to create one.");
        return Ok(());
    }

    print_section_header("Local branches");
    for branch in &local {
        if branch.is_current {
            println!(
                "{}{}{} {}",
                "[".bright_black(),
                "*".white(),
                "]".bright_black(),
                branch.name.blue()
            );
        } else {
            println!("    {}", branch.name.white());
        }
    }

    if !remote.is_empty() {
        print_section_header("Remote branches");
        for branch in &remote {
            println!("    {}", branch.name.bright_black());
        }
    }
    println!();

    Ok(())
}

pub async fn execute_checkout(workspace: &Path, name: &str) -> Result<()> {
    let context = CommandContext::open(workspace).await?;
    context.coordinator.checkout_branch(name).await;
    context.check()?;
    print_success(&format!("Switched to branch '{name}'"));
    Ok(())
}

/// Create a branch, switch to it unless `no_checkout`; with `delete`, remove it.
pub async fn execute_branch(
    workspace: &Path,
    name: &str,
    delete: bool,
    no_checkout: bool,
) -> Result<()> {
    let context = CommandContext::open(workspace).await?;
    let coordinator = &context.coordinator;

    if delete {
        coordinator.delete_branch(name).await;
        context.check()?;
        print_success(&format!("Deleted branch '{name}'"));
        return Ok(());
    }

    coordinator.create_branch(name, !no_checkout).await;
    context.check()?;
    if no_checkout {
        print_success(&format!("Created branch '{name}'"));
    } else {
        print_success(&format!("Switched to a new branch '{name}'"));
    }
    Ok(())
}
