//! Per-line blame with a per-path cache.
//!
//! Cached results stay until the path is invalidated or the cache is cleared, which
//! also happens after a commit, a pull, a checkout or a session change.

use super::GitCoordinator;
use crate::core::{config::BLAME_MESSAGE_LIMIT, events::GitEvent, state::BlameLine};
use crate::git::BlameHunk;
use chrono::DateTime;
use std::collections::HashMap;
use std::sync::MutexGuard;

impl GitCoordinator {
    /// Flip blame visibility; hiding it also clears the shown blame.
    pub fn toggle_blame_view(&self) -> bool {
        self.store.update(|s| {
            s.blame_visible = !s.blame_visible;
            if !s.blame_visible {
                s.blame_data.clear();
            }
            s.blame_visible
        })
    }

    pub fn is_blame_visible(&self) -> bool {
        self.store.read(|s| s.blame_visible)
    }

    /// Blame of `path` as committed at HEAD, one entry per line.
    ///
    /// Empty when the file has no committed history; that failure is only
    /// diagnosed.
    pub async fn get_blame_for_file(&self, path: &str) -> Vec<BlameLine> {
        let cached = self.blame_cache().get(path).cloned();
        if let Some(cached) = cached {
            log::debug!("Blame cache hit for {path}");
            return cached;
        }
        let Some(fs) = self.filesystem() else {
            return Vec::new();
        };

        let hunks = match self.plumbing.blame(fs.adapter.as_ref(), &fs.dir, path).await {
            Ok(hunks) => hunks,
            Err(e) => {
                self.diagnose("blame", &e);
                return Vec::new();
            }
        };

        let lines = build_blame(&hunks);
        self.blame_cache().insert(path.to_string(), lines.clone());
        self.store.update(|s| s.blame_data = lines.clone());
        self.events.dispatch(GitEvent::BlameUpdated {
            lines: lines.clone(),
        });
        lines
    }

    pub fn clear_blame_cache(&self) {
        self.blame_cache().clear();
    }

    pub fn invalidate_blame_for_file(&self, path: &str) {
        self.blame_cache().remove(path);
    }

    fn blame_cache(&self) -> MutexGuard<'_, HashMap<String, Vec<BlameLine>>> {
        self.blame_cache.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Expand hunks into line entries ordered by line number.
pub fn build_blame(hunks: &[BlameHunk]) -> Vec<BlameLine> {
    let mut lines: Vec<BlameLine> = hunks
        .iter()
        .flat_map(|hunk| {
            let commit = &hunk.commit;
            let date = DateTime::from_timestamp(commit.timestamp, 0)
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default();
            let hash: String = commit.oid.chars().take(8).collect();
            let message = truncate_message(commit.message.lines().next().unwrap_or_default());

            (hunk.start_line..hunk.start_line + hunk.lines).map(move |line| BlameLine {
                line,
                author: commit.author.name.clone(),
                date: date.clone(),
                commit_hash: hash.clone(),
                commit_message: message.clone(),
            })
        })
        .collect();
    lines.sort_by_key(|l| l.line);
    lines
}

fn truncate_message(message: &str) -> String {
    if message.chars().count() > BLAME_MESSAGE_LIMIT {
        let head: String = message.chars().take(BLAME_MESSAGE_LIMIT).collect();
        format!("{head}...")
    } else {
        message.to_string()
    }
}
