use crate::coordinator::GitCoordinator;
use crate::core::{
    config::GitConfig,
    dirs::get_data_directory,
    error::{GitWorkspaceError, Result},
    events::EventDispatcher,
    state::{GitState, StateStore},
};
use crate::fs::{
    DefaultFilesystemFactory, DirHandleRegistry, Environment, LocalDirectoryHandle,
    VirtualFsRegistry,
};
use crate::git::Git2Plumbing;
use std::path::Path;
use std::sync::Arc;

/// A coordinator bound to the directory the CLI was started in.
///
/// The directory is registered as a granted directory handle, so the coordinator
/// runs against the File System Access backend over the real working tree.
pub struct CommandContext {
    pub coordinator: Arc<GitCoordinator>,
}

impl CommandContext {
    /// Build the coordinator and load status, branches and history.
    pub async fn open(workspace: &Path) -> Result<Self> {
        let context = Self::bind(workspace)?;
        context.coordinator.init_workspace().await;

        if !context.coordinator.store().read(|s| s.is_repo_initialized) {
            return Err(GitWorkspaceError::NotInGitRepo);
        }
        Ok(context)
    }

    /// Build the coordinator without touching the repository.
    pub fn bind(workspace: &Path) -> Result<Self> {
        let config = GitConfig::load_or_create().unwrap_or_else(|e| {
            log::warn!("Using default git settings: {e}");
            GitConfig::default()
        });

        let workspace_path = workspace.to_string_lossy().into_owned();
        let handles = DirHandleRegistry::new();
        handles.register(
            workspace_path.clone(),
            Arc::new(LocalDirectoryHandle::new(workspace)),
        );
        let virtuals = VirtualFsRegistry::new(get_data_directory()?.join("virtual"));

        let store = StateStore::with_state(GitState {
            workspace_path,
            author: config.author,
            settings: config.settings,
            ..Default::default()
        });

        let coordinator = GitCoordinator::new(
            store,
            EventDispatcher::new(),
            Arc::new(Git2Plumbing::new()),
            Arc::new(DefaultFilesystemFactory::new(
                Environment::with_directory_picker(),
                handles,
                virtuals,
            )),
        );

        Ok(Self {
            coordinator: Arc::new(coordinator),
        })
    }

    /// Turn an error captured in the operation state back into a `Result`.
    pub fn check(&self) -> Result<()> {
        match self.coordinator.store().operation().error_message {
            Some(message) => Err(GitWorkspaceError::operation_failed(message)),
            None => Ok(()),
        }
    }
}
