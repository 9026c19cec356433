use super::context::CommandContext;
use crate::core::{error::Result, print_info, state::BlameLine};
use colored::*;
use std::path::Path;

pub async fn execute_blame(workspace: &Path, path: &str) -> Result<()> {
    let context = CommandContext::open(workspace).await?;
    let lines = context.coordinator.get_blame_for_file(path).await;

    if lines.is_empty() {
        print_info(&format!("No committed history for {path}"));
        return Ok(());
    }

    for line in &lines {
        println!("{}", format_blame_line(line));
    }
    Ok(())
}

fn format_blame_line(line: &BlameLine) -> String {
    format!(
        "{} {:>4} {} {} {}",
        line.commit_hash.yellow(),
        line.line,
        line.date.bright_black(),
        format!("({})", line.author).bright_black(),
        line.commit_message.white()
    )
}
