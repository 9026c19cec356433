//! Filesystem backends for workspace storage.
//!
//! Three hosts, one contract:
//!
//! - **Native**: the host shell owns the filesystem; this crate only sees a sentinel
//!   and resolves to no adapter
//! - **WebFs**: [`WebFsAdapter`] over File System Access directory handles
//! - **Virtual**: [`VirtualFs`] namespaces managed by a [`VirtualFsRegistry`]
//!
//! [`FilesystemFactory`] turns a workspace path into an adapter plus the directory
//! git should operate in. The coordinator caches what it returns.

mod backend;
mod traits;
mod virtual_fs;
mod web;

pub use backend::{detect_backend, BackendKind, Environment};
pub use traits::{is_root_path, path_segments, FsAdapter, FsEntryKind, FsStat};
pub use virtual_fs::{VirtualFs, VirtualFsRegistry};
pub use web::{DirHandleRegistry, DirectoryHandle, FileHandle, LocalDirectoryHandle, WebFsAdapter};

use crate::core::config::DEFAULT_VIRTUAL_NAMESPACE;
use std::io;
use std::sync::Arc;

/// An adapter together with the repository directory inside it.
#[derive(Clone)]
pub struct ResolvedFs {
    pub backend: BackendKind,
    pub adapter: Arc<dyn FsAdapter>,
    pub dir: String,
}

impl std::fmt::Debug for ResolvedFs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolvedFs")
            .field("backend", &self.backend)
            .field("dir", &self.dir)
            .finish_non_exhaustive()
    }
}

/// Produces the storage for a workspace.
///
/// `Ok(None)` means the backend is not wired into this crate (native shell).
pub trait FilesystemFactory: Send + Sync {
    fn resolve(&self, workspace_path: &str) -> io::Result<Option<ResolvedFs>>;
}

/// Factory that consults the environment on every call.
#[derive(Clone)]
pub struct DefaultFilesystemFactory {
    env: Environment,
    handles: DirHandleRegistry,
    virtuals: VirtualFsRegistry,
}

impl DefaultFilesystemFactory {
    pub fn new(env: Environment, handles: DirHandleRegistry, virtuals: VirtualFsRegistry) -> Self {
        Self {
            env,
            handles,
            virtuals,
        }
    }

    pub fn handles(&self) -> &DirHandleRegistry {
        &self.handles
    }

    pub fn virtuals(&self) -> &VirtualFsRegistry {
        &self.virtuals
    }
}

impl FilesystemFactory for DefaultFilesystemFactory {
    fn resolve(&self, workspace_path: &str) -> io::Result<Option<ResolvedFs>> {
        resolve_filesystem(&self.env, workspace_path, &self.handles, &self.virtuals)
    }
}

/// Pick the backend for the environment and build its adapter.
///
/// A directory-picker host without a registered handle for the workspace falls
/// through to the virtual store.
pub fn resolve_filesystem(
    env: &Environment,
    workspace_path: &str,
    handles: &DirHandleRegistry,
    virtuals: &VirtualFsRegistry,
) -> io::Result<Option<ResolvedFs>> {
    let backend = detect_backend(env);

    if backend == BackendKind::Native {
        return Ok(None);
    }

    if backend == BackendKind::WebFs {
        if let Some(handle) = handles.get(workspace_path) {
            return Ok(Some(ResolvedFs {
                backend,
                adapter: Arc::new(WebFsAdapter::new(handle)),
                // Paths are relative to the root handle
                dir: "/".to_string(),
            }));
        }
    }

    let namespace = if workspace_path.is_empty() {
        DEFAULT_VIRTUAL_NAMESPACE
    } else {
        workspace_path
    };
    let dir = if workspace_path.is_empty() {
        "/".to_string()
    } else {
        workspace_path.to_string()
    };

    Ok(Some(ResolvedFs {
        backend: BackendKind::Virtual,
        adapter: virtuals.get(namespace)?,
        dir,
    }))
}
