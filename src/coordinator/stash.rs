//! Stash list and stash operations.

use super::GitCoordinator;
use crate::core::{events::GitEvent, state::OperationKind, state::StashEntry};

#[derive(Debug, Clone, Copy)]
enum StashAction {
    Apply,
    Pop,
    Drop,
}

impl StashAction {
    fn as_str(self) -> &'static str {
        match self {
            StashAction::Apply => "apply stash",
            StashAction::Pop => "pop stash",
            StashAction::Drop => "drop stash",
        }
    }
}

impl GitCoordinator {
    /// Stash every change, untracked files included.
    ///
    /// Returns `false` without touching the repository when there is nothing to
    /// stash. The message defaults to `WIP on <branch>`.
    pub async fn stash_changes(&self, message: Option<&str>) -> bool {
        let Some(fs) = self.filesystem() else {
            return false;
        };
        let changed = self
            .store
            .status()
            .map(|s| s.changed_file_count())
            .unwrap_or(0);
        if changed == 0 {
            return false;
        }

        let _guard = self.begin(Some(OperationKind::Stash), true);
        let (branch, author) = self
            .store
            .read(|s| (s.current_branch.clone(), s.author.clone()));
        let message = match message {
            Some(message) if !message.trim().is_empty() => message.to_string(),
            _ => format!("WIP on {branch}"),
        };

        match self
            .plumbing
            .stash_save(fs.adapter.as_ref(), &fs.dir, &message, &author)
            .await
        {
            Ok(oid) => {
                log::info!("Stashed changes as {oid}");
                self.after_stash_change().await;
                true
            }
            Err(e) => {
                self.record_failure("stash", &e);
                false
            }
        }
    }

    /// Apply the stash at `index` and remove it from the list.
    pub async fn pop_stash(&self, index: usize) -> bool {
        self.on_stash(StashAction::Pop, index).await
    }

    /// Apply the stash at `index`, keeping it in the list.
    pub async fn apply_stash(&self, index: usize) -> bool {
        self.on_stash(StashAction::Apply, index).await
    }

    pub async fn drop_stash(&self, index: usize) -> bool {
        self.on_stash(StashAction::Drop, index).await
    }

    /// Reload the stash list from the repository. Failures leave an empty list.
    pub async fn list_stashes(&self) -> Vec<StashEntry> {
        let Some(fs) = self.filesystem() else {
            return Vec::new();
        };
        let stashes = match self.plumbing.stash_list(fs.adapter.as_ref(), &fs.dir).await {
            Ok(stashes) => stashes,
            Err(e) => {
                self.diagnose("stashes", &e);
                Vec::new()
            }
        };
        self.store.update(|s| s.stashes = stashes.clone());
        stashes
    }

    /// Number of stashes as of the last reload.
    pub fn stash_count(&self) -> usize {
        self.store.read(|s| s.stashes.len())
    }

    /// Drop every stash.
    pub async fn clear_all_stashes(&self) {
        let Some(fs) = self.filesystem() else {
            return;
        };
        self.clear_error();

        let count = self.list_stashes().await.len();
        for _ in 0..count {
            if let Err(e) = self
                .plumbing
                .stash_drop(fs.adapter.as_ref(), &fs.dir, 0)
                .await
            {
                self.record_failure("clear stashes", &e);
                break;
            }
        }
        self.list_stashes().await;
        self.dispatch_stashes();
    }

    async fn on_stash(&self, action: StashAction, index: usize) -> bool {
        let Some(fs) = self.filesystem() else {
            return false;
        };
        if index >= self.list_stashes().await.len() {
            return false;
        }

        let _guard = self.begin(Some(OperationKind::Stash), true);
        let (adapter, dir) = (fs.adapter.as_ref(), fs.dir.as_str());
        let result = match action {
            StashAction::Apply => self.plumbing.stash_apply(adapter, dir, index).await,
            StashAction::Pop => self.plumbing.stash_pop(adapter, dir, index).await,
            StashAction::Drop => self.plumbing.stash_drop(adapter, dir, index).await,
        };
        match result {
            Ok(()) => {
                log::info!("{} stash@{{{index}}}", action.as_str());
                self.after_stash_change().await;
                true
            }
            Err(e) => {
                self.record_failure(action.as_str(), &e);
                false
            }
        }
    }

    async fn after_stash_change(&self) {
        self.refresh_status().await;
        self.list_stashes().await;
        self.dispatch_stashes();
    }

    fn dispatch_stashes(&self) {
        let stashes = self.store.read(|s| s.stashes.clone());
        self.events.dispatch(GitEvent::StashChanged { stashes });
    }
}
