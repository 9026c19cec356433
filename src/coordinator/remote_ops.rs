//! Clone and the network operations against remotes.

use super::GitCoordinator;
use crate::core::{
    config::{COMMIT_FETCH_LIMIT, DEFAULT_REMOTE},
    error::{GitWorkspaceError, Result},
    events::GitEvent,
    state::{Credentials, OperationKind, RemoteEntry},
};
use crate::fs::FsAdapter;
use crate::git::{CloneOptions, RemoteOptions};
use std::sync::Arc;

/// Clones are shallow: only the tip commit is fetched.
pub const CLONE_DEPTH: u32 = 1;

impl GitCoordinator {
    /// Transport options for `remote`, with explicit credentials taking precedence
    /// over stored ones.
    fn remote_options(&self, remote: &str, credentials: Option<Credentials>) -> RemoteOptions {
        let (stored, proxy) = self.store.read(|s| {
            (
                s.credentials.clone(),
                s.settings.proxy_url().map(str::to_string),
            )
        });
        RemoteOptions {
            remote: remote.to_string(),
            credentials: credentials.or(stored),
            proxy,
            on_progress: Some(self.progress_reporter()),
        }
    }

    /// Shallow, single-branch clone of `url` into `dir` of `adapter`.
    ///
    /// The failure is recorded and returned.
    pub async fn clone_repository(
        &self,
        url: &str,
        adapter: Arc<dyn FsAdapter>,
        dir: &str,
        credentials: Option<Credentials>,
    ) -> Result<()> {
        let _guard = self.begin(Some(OperationKind::Clone), true);

        let options = CloneOptions {
            url: url.to_string(),
            branch: None,
            depth: CLONE_DEPTH,
            single_branch: true,
            remote: self.remote_options(DEFAULT_REMOTE, credentials),
        };

        match self.plumbing.clone_repo(adapter.as_ref(), dir, options).await {
            Ok(()) => {
                log::info!("Cloned {url} into {dir}");
                self.store.update(|s| s.is_repo_initialized = true);
                self.events.dispatch(GitEvent::OperationComplete {
                    operation: OperationKind::Clone,
                    oid: None,
                });
                Ok(())
            }
            Err(e) => {
                self.record_failure("clone", &e);
                Err(e)
            }
        }
    }

    /// Push the current branch.
    pub async fn push_to_remote(&self, remote: &str) {
        let Some(fs) = self.filesystem() else {
            return;
        };
        let _guard = self.begin(Some(OperationKind::Push), true);
        let branch = self.store.current_branch();
        let options = self.remote_options(remote, None);

        match self
            .plumbing
            .push(fs.adapter.as_ref(), &fs.dir, &branch, options)
            .await
        {
            Ok(()) => {
                log::info!("Pushed {branch} to {remote}");
                self.refresh_status().await;
                self.events.dispatch(GitEvent::OperationComplete {
                    operation: OperationKind::Push,
                    oid: None,
                });
            }
            Err(e) => self.record_failure("push", &e),
        }
    }

    /// Fetch and integrate the current branch from `remote`.
    pub async fn pull_from_remote(&self, remote: &str) {
        let Some(fs) = self.filesystem() else {
            return;
        };
        let _guard = self.begin(Some(OperationKind::Pull), true);
        let (branch, author) = self
            .store
            .read(|s| (s.current_branch.clone(), s.author.clone()));
        let options = self.remote_options(remote, None);

        match self
            .plumbing
            .pull(fs.adapter.as_ref(), &fs.dir, &branch, &author, options)
            .await
        {
            Ok(()) => {
                log::info!("Pulled {branch} from {remote}");
                self.clear_blame_cache();
                self.refresh_status().await;
                self.fetch_commit_log(COMMIT_FETCH_LIMIT).await;
                self.events.dispatch(GitEvent::OperationComplete {
                    operation: OperationKind::Pull,
                    oid: None,
                });
            }
            Err(e) => {
                self.record_failure("pull", &e);
                if matches!(e, GitWorkspaceError::MergeConflict { .. }) {
                    // The merge is left in progress; show the conflicted paths
                    self.refresh_status().await;
                }
            }
        }
    }

    pub async fn fetch_from_remote(&self, remote: &str) {
        if let Err(e) = self.run_fetch(remote, true).await {
            self.record_failure("fetch", &e);
        }
    }

    /// One fetch; `clear_error` is false for background fetches, which must leave
    /// the recorded error alone.
    pub(super) async fn run_fetch(&self, remote: &str, clear_error: bool) -> Result<()> {
        let Some(fs) = self.filesystem() else {
            return Ok(());
        };
        let _guard = self.begin(Some(OperationKind::Fetch), clear_error);
        let options = self.remote_options(remote, None);

        self.plumbing
            .fetch(fs.adapter.as_ref(), &fs.dir, options)
            .await?;

        log::info!("Fetched {remote}");
        self.refresh_branches().await;
        self.events.dispatch(GitEvent::OperationComplete {
            operation: OperationKind::Fetch,
            oid: None,
        });
        Ok(())
    }

    /// Configured remotes; empty on any failure.
    pub async fn list_remotes(&self) -> Vec<RemoteEntry> {
        let Some(fs) = self.filesystem() else {
            return Vec::new();
        };
        match self.plumbing.list_remotes(fs.adapter.as_ref(), &fs.dir).await {
            Ok(remotes) => remotes,
            Err(e) => {
                self.diagnose("remotes", &e);
                Vec::new()
            }
        }
    }

    pub async fn add_remote(&self, name: &str, url: &str) {
        let Some(fs) = self.filesystem() else {
            return;
        };
        match self
            .plumbing
            .add_remote(fs.adapter.as_ref(), &fs.dir, name, url)
            .await
        {
            Ok(()) => {
                log::info!("Added remote {name} -> {url}");
                self.refresh_branches().await;
            }
            Err(e) => self.record_failure("add remote", &e),
        }
    }
}
