//! Branch switching, creation, deletion and the branch list.

use super::GitCoordinator;
use crate::core::{
    config::{COMMIT_FETCH_LIMIT, DEFAULT_REMOTE},
    events::GitEvent,
    state::BranchEntry,
};

impl GitCoordinator {
    pub async fn checkout_branch(&self, name: &str) {
        let Some(fs) = self.filesystem() else {
            return;
        };
        self.clear_error();

        match self
            .plumbing
            .checkout_branch(fs.adapter.as_ref(), &fs.dir, name)
            .await
        {
            Ok(()) => {
                log::info!("Switched to branch {name}");
                self.store.update(|s| s.current_branch = name.to_string());
                self.clear_blame_cache();
                self.refresh_status().await;
                self.fetch_commit_log(COMMIT_FETCH_LIMIT).await;
                self.refresh_branches().await;
                self.events.dispatch(GitEvent::BranchChanged {
                    branch: name.to_string(),
                });
            }
            Err(e) => self.record_failure("checkout", &e),
        }
    }

    /// Create `name` at HEAD and optionally switch to it.
    pub async fn create_branch(&self, name: &str, checkout: bool) {
        let Some(fs) = self.filesystem() else {
            return;
        };
        self.clear_error();

        match self
            .plumbing
            .create_branch(fs.adapter.as_ref(), &fs.dir, name)
            .await
        {
            Ok(()) => {
                log::info!("Created branch {name}");
                if checkout {
                    self.checkout_branch(name).await;
                } else {
                    self.refresh_branches().await;
                }
            }
            Err(e) => self.record_failure("create branch", &e),
        }
    }

    pub async fn delete_branch(&self, name: &str) {
        let Some(fs) = self.filesystem() else {
            return;
        };
        self.clear_error();

        match self
            .plumbing
            .delete_branch(fs.adapter.as_ref(), &fs.dir, name)
            .await
        {
            Ok(()) => {
                log::info!("Deleted branch {name}");
                self.refresh_branches().await;
            }
            Err(e) => self.record_failure("delete branch", &e),
        }
    }

    /// Reload local branches, `origin/*` remote branches and remotes.
    ///
    /// Only the local listing is required; remote failures leave those parts empty.
    pub async fn refresh_branches(&self) {
        let Some(fs) = self.filesystem() else {
            return;
        };

        let local = match self
            .plumbing
            .list_branches(fs.adapter.as_ref(), &fs.dir, None)
            .await
        {
            Ok(local) => local,
            Err(e) => {
                self.diagnose("branches", &e);
                return;
            }
        };

        let remote = self
            .plumbing
            .list_branches(fs.adapter.as_ref(), &fs.dir, Some(DEFAULT_REMOTE))
            .await
            .unwrap_or_else(|e| {
                self.diagnose("remote-branches", &e);
                Vec::new()
            });

        let remotes = self
            .plumbing
            .list_remotes(fs.adapter.as_ref(), &fs.dir)
            .await
            .unwrap_or_else(|e| {
                self.diagnose("remotes", &e);
                Vec::new()
            });

        let current = self.store.current_branch();
        let mut branches: Vec<BranchEntry> = local
            .into_iter()
            .map(|name| BranchEntry {
                is_current: name == current,
                name,
                is_remote: false,
            })
            .collect();
        branches.extend(remote.into_iter().map(|name| BranchEntry {
            name: format!("{DEFAULT_REMOTE}/{name}"),
            is_remote: true,
            is_current: false,
        }));

        self.store.update(|s| {
            s.branches = branches;
            s.remotes = remotes;
        });
    }
}
