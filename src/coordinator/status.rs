//! Repository detection, initialization and working-tree status operations.

use super::GitCoordinator;
use crate::core::{
    config::{COMMIT_FETCH_LIMIT, DEFAULT_BRANCH, DETACHED_BRANCH},
    events::GitEvent,
};
use crate::git::translate_status_matrix;
use futures::future::join_all;

impl GitCoordinator {
    /// Whether the workspace directory is inside a repository. Never fails.
    pub async fn detect_repo(&self) -> bool {
        let Some(fs) = self.filesystem() else {
            return false;
        };
        self.plumbing
            .find_root(fs.adapter.as_ref(), &fs.dir)
            .await
            .is_ok()
    }

    /// Re-resolve storage for the workspace and load status, branches and history
    /// when it holds a repository.
    pub async fn init_workspace(&self) {
        self.invalidate_session();
        if self.filesystem().is_none() {
            return;
        }

        let is_repo = self.detect_repo().await;
        self.store.update(|s| s.is_repo_initialized = is_repo);
        log::debug!("Workspace repository detected: {is_repo}");

        if is_repo {
            self.refresh_status().await;
            self.refresh_branches().await;
            self.fetch_commit_log(COMMIT_FETCH_LIMIT).await;
        }
    }

    /// Create a repository on the default branch.
    pub async fn initialize_repository(&self) {
        let Some(fs) = self.filesystem() else {
            return;
        };
        let _guard = self.begin(None, true);

        match self
            .plumbing
            .init(fs.adapter.as_ref(), &fs.dir, DEFAULT_BRANCH)
            .await
        {
            Ok(()) => {
                log::info!("Initialized repository in {}", fs.dir);
                self.store.update(|s| {
                    s.is_repo_initialized = true;
                    s.current_branch = DEFAULT_BRANCH.to_string();
                });
                self.refresh_status().await;
            }
            Err(e) => self.record_failure("init", &e),
        }
    }

    /// Recompute the status snapshot. Any failure clears it.
    pub async fn refresh_status(&self) {
        let Some(fs) = self.filesystem() else {
            return;
        };
        if !self.store.read(|s| s.is_repo_initialized) {
            return;
        }

        match self
            .plumbing
            .current_branch(fs.adapter.as_ref(), &fs.dir)
            .await
        {
            Ok(branch) => {
                let branch = branch
                    .filter(|b| !b.is_empty())
                    .unwrap_or_else(|| DETACHED_BRANCH.to_string());
                self.store.update(|s| s.current_branch = branch);
            }
            // Keep the last known branch
            Err(e) => log::debug!("Could not read current branch: {e}"),
        }

        match self
            .plumbing
            .status_matrix(fs.adapter.as_ref(), &fs.dir)
            .await
        {
            Ok(matrix) => {
                let snapshot = translate_status_matrix(&matrix, &self.store.current_branch());
                self.store.update(|s| s.status = Some(snapshot));
                self.events.dispatch(GitEvent::RepoStatusChanged);
            }
            Err(e) => {
                log::debug!("Status refresh failed: {e}");
                self.store.update(|s| s.status = None);
            }
        }
    }

    pub async fn stage_file(&self, path: &str) {
        let Some(fs) = self.filesystem() else {
            return;
        };
        match self.plumbing.add(fs.adapter.as_ref(), &fs.dir, path).await {
            Ok(()) => self.refresh_status().await,
            Err(e) => self.record_failure("stage", &e),
        }
    }

    /// Stage every unstaged and untracked path concurrently, then refresh once.
    ///
    /// Individual failures do not stop the others and are not recorded as errors.
    pub async fn stage_all_files(&self) {
        let Some(status) = self.store.status() else {
            return;
        };
        let Some(fs) = self.filesystem() else {
            return;
        };

        let paths: Vec<String> = status
            .unstaged_files
            .iter()
            .chain(status.untracked_files.iter())
            .map(|entry| entry.path.clone())
            .collect();

        let adds = paths
            .iter()
            .map(|path| self.plumbing.add(fs.adapter.as_ref(), &fs.dir, path));
        let results = join_all(adds).await;

        for (path, result) in paths.iter().zip(results) {
            if let Err(e) = result {
                log::debug!("Could not stage {path}: {e}");
            }
        }

        self.refresh_status().await;
    }

    pub async fn unstage_file(&self, path: &str) {
        let Some(fs) = self.filesystem() else {
            return;
        };
        match self
            .plumbing
            .reset_index(fs.adapter.as_ref(), &fs.dir, path)
            .await
        {
            Ok(()) => self.refresh_status().await,
            Err(e) => self.record_failure("unstage", &e),
        }
    }

    /// Restore a path from HEAD, dropping its working-tree changes.
    pub async fn discard_file_changes(&self, path: &str) {
        let Some(fs) = self.filesystem() else {
            return;
        };
        let paths = [path.to_string()];
        match self
            .plumbing
            .checkout_paths(fs.adapter.as_ref(), &fs.dir, &paths)
            .await
        {
            Ok(()) => self.refresh_status().await,
            Err(e) => self.record_failure("discard", &e),
        }
    }
}
