//! Merge conflict detection and resolution.
//!
//! Conflict blocks use the standard marker format:
//!
//! ```text
//! <<<<<<< ours-label
//! ours lines
//! =======
//! theirs lines
//! >>>>>>> theirs-label
//! ```
//!
//! [`detect_conflicts`] is a single forward scan over the lines. Resolution replaces the
//! whole block in a [`TextBuffer`] and then rescans the buffer; stored regions are never
//! shifted in place.

use crate::core::{
    events::{EventDispatcher, GitEvent},
    state::StateStore,
};
use serde::{Deserialize, Serialize};

const OURS_MARKER: &str = "<<<<<<<";
const SEPARATOR: &str = "=======";
const THEIRS_MARKER: &str = ">>>>>>>";

/// One conflict block. Line numbers are 1-based.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConflictRegion {
    pub start_line: usize,
    pub separator_line: usize,
    pub end_line: usize,
    pub current_content: String,
    pub incoming_content: String,
    pub current_label: String,
    pub incoming_label: String,
}

fn without_cr(line: &str) -> &str {
    line.strip_suffix('\r').unwrap_or(line)
}

fn marker_label(line: &str) -> String {
    without_cr(line)[OURS_MARKER.len()..].trim().to_string()
}

fn is_separator(line: &str) -> bool {
    without_cr(line) == SEPARATOR
}

/// Scan `content` for conflict blocks, in ascending line order.
///
/// An ours-marker without a later separator and theirs-marker is skipped and the scan
/// resumes on the next line.
pub fn detect_conflicts(content: &str) -> Vec<ConflictRegion> {
    let lines: Vec<&str> = content.split('\n').collect();
    let mut conflicts = Vec::new();

    let mut i = 0;
    while i < lines.len() {
        if !lines[i].starts_with(OURS_MARKER) {
            i += 1;
            continue;
        }

        let Some(sep) = (i + 1..lines.len()).find(|&j| is_separator(lines[j])) else {
            i += 1;
            continue;
        };
        let Some(end) = (sep + 1..lines.len()).find(|&k| lines[k].starts_with(THEIRS_MARKER))
        else {
            i += 1;
            continue;
        };

        conflicts.push(ConflictRegion {
            start_line: i + 1,
            separator_line: sep + 1,
            end_line: end + 1,
            current_content: lines[i + 1..sep].join("\n"),
            incoming_content: lines[sep + 1..end].join("\n"),
            current_label: marker_label(lines[i]),
            incoming_label: marker_label(lines[end]),
        });

        i = end + 1;
    }

    conflicts
}

/// The side(s) of a conflict to keep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Ours,
    Theirs,
    Both,
}

impl Resolution {
    /// Replacement text for `region`
    pub fn text_for(self, region: &ConflictRegion) -> String {
        match self {
            Resolution::Ours => region.current_content.clone(),
            Resolution::Theirs => region.incoming_content.clone(),
            Resolution::Both => format!("{}\n{}", region.current_content, region.incoming_content),
        }
    }
}

/// Editable text surface.
///
/// Lines and columns are 1-based. Columns count characters, and the max column of a
/// line is one past its last character.
pub trait TextBuffer {
    fn text(&self) -> String;

    fn line_max_column(&self, line: usize) -> usize;

    /// Replace the range as a single edit.
    fn replace_range(
        &mut self,
        start_line: usize,
        start_column: usize,
        end_line: usize,
        end_column: usize,
        text: &str,
    );
}

/// In-memory [`TextBuffer`] over a `String`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StringBuffer {
    content: String,
}

impl StringBuffer {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }

    pub fn into_string(self) -> String {
        self.content
    }

    fn line(&self, line: usize) -> Option<&str> {
        self.content.split('\n').nth(line.checked_sub(1)?)
    }

    // Byte offset of (line, column), clamped to the buffer and the line
    fn offset(&self, line: usize, column: usize) -> usize {
        let mut line_start = 0;
        for (index, text) in self.content.split('\n').enumerate() {
            if index + 1 == line.max(1) {
                let chars = column.saturating_sub(1);
                let within = text
                    .char_indices()
                    .nth(chars)
                    .map(|(byte, _)| byte)
                    .unwrap_or(text.len());
                return line_start + within;
            }
            line_start += text.len() + 1;
        }
        self.content.len()
    }
}

impl TextBuffer for StringBuffer {
    fn text(&self) -> String {
        self.content.clone()
    }

    fn line_max_column(&self, line: usize) -> usize {
        self.line(line).map(|l| l.chars().count() + 1).unwrap_or(1)
    }

    fn replace_range(
        &mut self,
        start_line: usize,
        start_column: usize,
        end_line: usize,
        end_column: usize,
        text: &str,
    ) {
        let start = self.offset(start_line, start_column);
        let end = self.offset(end_line, end_column).max(start);
        self.content.replace_range(start..end, text);
    }
}

/// Replace the block of `region` in `buffer`, markers included.
///
/// The edit spans column 1 of the ours-marker line to the end of the theirs-marker
/// line; the theirs-marker line terminator is kept.
pub fn apply_resolution(buffer: &mut dyn TextBuffer, region: &ConflictRegion, resolution: Resolution) {
    let end_column = buffer.line_max_column(region.end_line);
    buffer.replace_range(
        region.start_line,
        1,
        region.end_line,
        end_column,
        &resolution.text_for(region),
    );
}

/// Conflict list kept in the state store, with resolution events.
#[derive(Debug, Clone)]
pub struct ConflictResolver {
    store: StateStore,
    events: EventDispatcher,
}

impl ConflictResolver {
    pub fn new(store: StateStore, events: EventDispatcher) -> Self {
        Self { store, events }
    }

    pub fn accept_ours(&self, buffer: &mut dyn TextBuffer, region: &ConflictRegion) {
        self.resolve(buffer, region, Resolution::Ours);
    }

    pub fn accept_theirs(&self, buffer: &mut dyn TextBuffer, region: &ConflictRegion) {
        self.resolve(buffer, region, Resolution::Theirs);
    }

    pub fn accept_both(&self, buffer: &mut dyn TextBuffer, region: &ConflictRegion) {
        self.resolve(buffer, region, Resolution::Both);
    }

    /// Apply one resolution, rescan the buffer and publish what is left.
    pub fn resolve(
        &self,
        buffer: &mut dyn TextBuffer,
        region: &ConflictRegion,
        resolution: Resolution,
    ) -> Vec<ConflictRegion> {
        apply_resolution(buffer, region, resolution);

        let remaining = detect_conflicts(&buffer.text());
        self.store.set_conflicts(remaining.clone());
        log::debug!(
            "Resolved conflict at line {} ({} remaining)",
            region.start_line,
            remaining.len()
        );

        self.events.dispatch(GitEvent::ConflictResolved {
            resolved: region.clone(),
            remaining: remaining.clone(),
        });
        remaining
    }

    pub fn resolve_all_ours(&self, buffer: &mut dyn TextBuffer) {
        self.resolve_all(buffer, Resolution::Ours);
    }

    pub fn resolve_all_incoming(&self, buffer: &mut dyn TextBuffer) {
        self.resolve_all(buffer, Resolution::Theirs);
    }

    /// Apply `resolution` to every stored conflict, bottom-up so earlier regions
    /// keep their line numbers.
    pub fn resolve_all(&self, buffer: &mut dyn TextBuffer, resolution: Resolution) {
        let mut conflicts = self.store.conflicts();
        conflicts.sort_by(|a, b| b.start_line.cmp(&a.start_line));
        for region in &conflicts {
            self.resolve(buffer, region, resolution);
        }
    }

    /// Rescan `buffer` and store the result.
    pub fn refresh_conflicts(&self, buffer: &dyn TextBuffer) -> Vec<ConflictRegion> {
        let conflicts = detect_conflicts(&buffer.text());
        self.store.set_conflicts(conflicts.clone());
        conflicts
    }

    pub fn has_conflicts(&self) -> bool {
        self.conflict_count() > 0
    }

    pub fn conflict_count(&self) -> usize {
        self.store.read(|s| s.conflicts.len())
    }
}
