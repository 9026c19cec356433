use super::context::CommandContext;
use crate::core::{error::Result, print_success};
use std::path::Path;

pub async fn execute_commit(workspace: &Path, message: &str) -> Result<()> {
    let context = CommandContext::open(workspace).await?;
    let oid = context.coordinator.create_commit(message).await?;

    let branch = context.coordinator.store().current_branch();
    let short = &oid[..oid.len().min(7)];
    let subject = message.lines().next().unwrap_or_default();
    print_success(&format!("[{branch} {short}] {subject}"));
    Ok(())
}
