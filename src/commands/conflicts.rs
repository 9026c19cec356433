//! Conflict listing and bulk resolution for a file on disk.
//!
//! These work on any file and need no repository.

use crate::core::{
    error::Result, events::EventDispatcher, print_detail, print_info, print_section_header,
    print_success, state::StateStore,
};
use crate::merge::{ConflictResolver, Resolution, StringBuffer};
use std::fs;
use std::path::Path;

pub fn execute_conflicts(file: &Path) -> Result<()> {
    let content = fs::read_to_string(file)?;
    let resolver = ConflictResolver::new(StateStore::new(), EventDispatcher::new());
    let conflicts = resolver.refresh_conflicts(&StringBuffer::new(content));

    if conflicts.is_empty() {
        print_info(&format!("No conflicts in {}", file.display()));
        return Ok(());
    }

    print_section_header(&format!("{} conflict(s) in {}", conflicts.len(), file.display()));
    for region in &conflicts {
        print_detail(&format!(
            "lines {}-{}: {} vs {}",
            region.start_line, region.end_line, region.current_label, region.incoming_label
        ));
    }
    println!();
    Ok(())
}

/// Resolve every conflict in `file` the same way and write it back.
pub fn execute_resolve(file: &Path, resolution: Resolution) -> Result<()> {
    let content = fs::read_to_string(file)?;
    let resolver = ConflictResolver::new(StateStore::new(), EventDispatcher::new());
    let mut buffer = StringBuffer::new(content);

    let count = resolver.refresh_conflicts(&buffer).len();
    if count == 0 {
        print_info(&format!("No conflicts in {}", file.display()));
        return Ok(());
    }

    resolver.resolve_all(&mut buffer, resolution);
    fs::write(file, buffer.into_string())?;

    print_success(&format!(
        "Resolved {count} conflict(s) in {} ({} left)",
        file.display(),
        resolver.conflict_count()
    ));
    Ok(())
}
