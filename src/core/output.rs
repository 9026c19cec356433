//! Terminal message helpers for the CLI host.
//!
//! Errors are red with a `✕ Error:` prefix, successes get a green check, headers and
//! plain lines are white. Every helper leaves a blank line before its output.

use colored::*;

/// ```text
///
/// ✕ Error: <message>
///
/// ```
pub fn print_error(message: &str) {
    println!("\n{} {}\n", "✕ Error:".red(), message.white());
}

/// ```text
///
/// ✓ <message>
/// ```
pub fn print_success(message: &str) {
    println!("\n{} {}", "✓".green(), message.white());
}

pub fn print_info(message: &str) {
    println!("\n{}\n", message.white());
}

/// Section title followed by a colon, e.g. `Staged changes:`
pub fn print_section_header(header: &str) {
    println!("\n{}:\n", header.white());
}

/// Indented, muted detail line under a header
pub fn print_detail(detail: &str) {
    println!("  {}", detail.bright_black());
}
