//! The cached storage binding for the active workspace.

use crate::fs::{BackendKind, FsAdapter, ResolvedFs};
use std::sync::Arc;

/// Backend, adapter and repository directory resolved for one workspace path.
///
/// Sessions are immutable. A workspace switch or an explicit invalidation replaces
/// the whole value.
#[derive(Clone)]
pub struct WorkspaceSession {
    path: String,
    backend: BackendKind,
    adapter: Option<Arc<dyn FsAdapter>>,
    dir: String,
}

impl WorkspaceSession {
    /// Session for a workspace whose backend lives outside this crate.
    pub fn unavailable(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            backend: BackendKind::Native,
            adapter: None,
            dir: String::new(),
        }
    }

    pub fn from_resolved(path: impl Into<String>, resolved: ResolvedFs) -> Self {
        Self {
            path: path.into(),
            backend: resolved.backend,
            adapter: Some(resolved.adapter),
            dir: resolved.dir,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn backend(&self) -> BackendKind {
        self.backend
    }

    pub fn dir(&self) -> &str {
        &self.dir
    }

    /// Cache hit test.
    pub fn is_for(&self, workspace_path: &str) -> bool {
        self.path == workspace_path
    }

    /// Adapter and directory, or `None` when the backend is unavailable.
    pub fn filesystem(&self) -> Option<ResolvedFs> {
        self.adapter.as_ref().map(|adapter| ResolvedFs {
            backend: self.backend,
            adapter: Arc::clone(adapter),
            dir: self.dir.clone(),
        })
    }
}

impl std::fmt::Debug for WorkspaceSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkspaceSession")
            .field("path", &self.path)
            .field("backend", &self.backend)
            .field("has_adapter", &self.adapter.is_some())
            .field("dir", &self.dir)
            .finish()
    }
}
