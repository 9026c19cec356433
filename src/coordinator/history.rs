//! Commits, history and HEAD content.

use super::GitCoordinator;
use crate::core::{
    config::COMMIT_FETCH_LIMIT,
    error::{GitWorkspaceError, Result},
    events::GitEvent,
    git_status::FileStatus,
    state::OperationKind,
};

impl GitCoordinator {
    /// Commit the index as the configured author and return the new commit id.
    ///
    /// Unlike the other mutating operations the failure is returned as well as
    /// recorded.
    pub async fn create_commit(&self, message: &str) -> Result<String> {
        let fs = self.filesystem().ok_or(GitWorkspaceError::NoFilesystem)?;
        let _guard = self.begin(Some(OperationKind::Commit), true);
        let author = self.store.read(|s| s.author.clone());

        match self
            .plumbing
            .commit(fs.adapter.as_ref(), &fs.dir, message, &author)
            .await
        {
            Ok(oid) => {
                log::info!("Committed {oid}");
                self.clear_blame_cache();
                self.refresh_status().await;
                self.fetch_commit_log(COMMIT_FETCH_LIMIT).await;
                self.events.dispatch(GitEvent::OperationComplete {
                    operation: OperationKind::Commit,
                    oid: Some(oid.clone()),
                });
                Ok(oid)
            }
            Err(e) => {
                self.record_failure("commit", &e);
                Err(e)
            }
        }
    }

    /// Load up to `limit` commits reachable from HEAD, newest first.
    pub async fn fetch_commit_log(&self, limit: usize) {
        let Some(fs) = self.filesystem() else {
            return;
        };
        let log = match self.plumbing.log(fs.adapter.as_ref(), &fs.dir, limit).await {
            Ok(log) => log,
            Err(e) => {
                self.diagnose("commit-log", &e);
                Vec::new()
            }
        };
        self.store.update(|s| s.commit_log = log);
    }

    /// Content of `path` in the HEAD commit, `None` when it cannot be produced.
    pub async fn get_file_at_head(&self, path: &str) -> Option<String> {
        let fs = self.filesystem()?;
        let result: Result<String> = async {
            let head = self
                .plumbing
                .resolve_ref(fs.adapter.as_ref(), &fs.dir, "HEAD")
                .await?;
            let blob = self
                .plumbing
                .read_blob(fs.adapter.as_ref(), &fs.dir, &head, path)
                .await?;
            String::from_utf8(blob).map_err(|_| GitWorkspaceError::invalid_utf8_blob(path))
        }
        .await;

        result
            .map_err(|e| self.diagnose("file-at-head", &e))
            .ok()
    }

    /// Plain-text summary of the staged changes, one `<status>: <path>` line per
    /// file.
    ///
    /// Modified files get an extra `(+N lines)` / `(-N lines)` line when the working
    /// copy has a different line count than HEAD. This is not a diff.
    pub async fn get_staged_diff(&self) -> String {
        let Some(status) = self.store.status() else {
            return String::new();
        };
        if status.staged_files.is_empty() {
            return String::new();
        }

        let mut parts = Vec::new();
        for file in &status.staged_files {
            parts.push(format!("{}: {}", file.status, file.path));

            if file.status != FileStatus::Modified {
                continue;
            }
            let Some(head) = self.get_file_at_head(&file.path).await else {
                continue;
            };
            let current = self.working_copy(&file.path).await.unwrap_or_default();

            let added = line_count(&current) as i64 - line_count(&head) as i64;
            if added != 0 {
                let sign = if added > 0 { "+" } else { "" };
                parts.push(format!("  ({sign}{added} lines)"));
            }
        }

        parts.join("\n")
    }

    async fn working_copy(&self, path: &str) -> Option<String> {
        let fs = self.filesystem()?;
        let full = format!("{}/{}", fs.dir.trim_end_matches('/'), path);
        let bytes = fs.adapter.read_file(&full).await.ok()?;
        String::from_utf8(bytes).ok()
    }
}

// Pieces between newlines, so "" counts as one line
fn line_count(text: &str) -> usize {
    text.split('\n').count()
}
