//! File System Access API backend.
//!
//! The host grants access to a folder by handing over a [`DirectoryHandle`]. The
//! adapter never caches child handles: every call walks the path from the root
//! handle again, so renames or deletions done behind its back are always observed.
//!
//! [`LocalDirectoryHandle`] implements the handle contract over a real directory,
//! which is what a desktop host grants and what the tests use.

use super::traits::{is_root_path, path_segments, FsAdapter, FsStat};
use async_trait::async_trait;
use std::collections::HashMap;
use std::io;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};
use std::time::SystemTime;

/// A directory handle in the File System Access API sense.
#[async_trait]
pub trait DirectoryHandle: Send + Sync {
    fn name(&self) -> &str;

    /// Child directory handle; with `create` a missing child is created.
    async fn get_directory_handle(
        &self,
        name: &str,
        create: bool,
    ) -> io::Result<Arc<dyn DirectoryHandle>>;

    /// Child file handle; with `create` a missing file is created empty.
    async fn get_file_handle(&self, name: &str, create: bool) -> io::Result<Arc<dyn FileHandle>>;

    /// Remove a child. Non-empty directories need `recursive`.
    async fn remove_entry(&self, name: &str, recursive: bool) -> io::Result<()>;

    /// Names of all children.
    async fn entries(&self) -> io::Result<Vec<String>>;

    /// On-disk location, when the handle is backed by the OS filesystem.
    fn real_path(&self) -> Option<PathBuf> {
        None
    }
}

/// A file handle in the File System Access API sense.
#[async_trait]
pub trait FileHandle: Send + Sync {
    async fn read(&self) -> io::Result<Vec<u8>>;

    /// Replace the whole file content.
    async fn write(&self, data: &[u8]) -> io::Result<()>;

    async fn metadata(&self) -> io::Result<FsStat>;
}

fn validate_entry_name(name: &str) -> io::Result<()> {
    if name.is_empty() || name == "." || name == ".." || name.contains('/') {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("invalid entry name: '{name}'"),
        ));
    }
    Ok(())
}

/// Directory handle over a real directory.
#[derive(Debug, Clone)]
pub struct LocalDirectoryHandle {
    name: String,
    path: PathBuf,
}

impl LocalDirectoryHandle {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self { name, path }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

#[async_trait]
impl DirectoryHandle for LocalDirectoryHandle {
    fn name(&self) -> &str {
        &self.name
    }

    async fn get_directory_handle(
        &self,
        name: &str,
        create: bool,
    ) -> io::Result<Arc<dyn DirectoryHandle>> {
        validate_entry_name(name)?;
        let child = self.path.join(name);

        if create {
            match tokio::fs::create_dir(&child).await {
                Ok(()) => {}
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {}
                Err(e) => return Err(e),
            }
        }

        let meta = tokio::fs::metadata(&child).await?;
        if !meta.is_dir() {
            return Err(io::Error::new(
                io::ErrorKind::NotADirectory,
                format!("not a directory: {}", child.display()),
            ));
        }

        Ok(Arc::new(LocalDirectoryHandle {
            name: name.to_string(),
            path: child,
        }))
    }

    async fn get_file_handle(&self, name: &str, create: bool) -> io::Result<Arc<dyn FileHandle>> {
        validate_entry_name(name)?;
        let child = self.path.join(name);

        match tokio::fs::metadata(&child).await {
            Ok(meta) if meta.is_dir() => {
                return Err(io::Error::new(
                    io::ErrorKind::IsADirectory,
                    format!("is a directory: {}", child.display()),
                ));
            }
            Ok(_) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound && create => {
                tokio::fs::write(&child, b"").await?;
            }
            Err(e) => return Err(e),
        }

        Ok(Arc::new(LocalFileHandle { path: child }))
    }

    async fn remove_entry(&self, name: &str, recursive: bool) -> io::Result<()> {
        validate_entry_name(name)?;
        let child = self.path.join(name);
        let meta = tokio::fs::symlink_metadata(&child).await?;

        if meta.is_dir() {
            if recursive {
                tokio::fs::remove_dir_all(&child).await
            } else {
                tokio::fs::remove_dir(&child).await
            }
        } else {
            tokio::fs::remove_file(&child).await
        }
    }

    async fn entries(&self) -> io::Result<Vec<String>> {
        let mut dir = tokio::fs::read_dir(&self.path).await?;
        let mut names = Vec::new();
        while let Some(entry) = dir.next_entry().await? {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
        Ok(names)
    }

    fn real_path(&self) -> Option<PathBuf> {
        Some(self.path.clone())
    }
}

#[derive(Debug, Clone)]
struct LocalFileHandle {
    path: PathBuf,
}

#[async_trait]
impl FileHandle for LocalFileHandle {
    async fn read(&self) -> io::Result<Vec<u8>> {
        tokio::fs::read(&self.path).await
    }

    async fn write(&self, data: &[u8]) -> io::Result<()> {
        tokio::fs::write(&self.path, data).await
    }

    async fn metadata(&self) -> io::Result<FsStat> {
        let meta = tokio::fs::metadata(&self.path).await?;
        Ok(FsStat::file(meta.len(), meta.modified().ok()))
    }
}

/// [`FsAdapter`] over a root [`DirectoryHandle`].
#[derive(Clone)]
pub struct WebFsAdapter {
    root: Arc<dyn DirectoryHandle>,
}

impl WebFsAdapter {
    pub fn new(root: Arc<dyn DirectoryHandle>) -> Self {
        Self { root }
    }

    /// Walk every segment as a directory.
    async fn resolve_dir(&self, path: &str, create: bool) -> io::Result<Arc<dyn DirectoryHandle>> {
        let mut current = Arc::clone(&self.root);
        for segment in path_segments(path) {
            current = current.get_directory_handle(segment, create).await?;
        }
        Ok(current)
    }

    /// Walk to the parent directory and return it with the final segment.
    async fn resolve_parent(
        &self,
        path: &str,
        create: bool,
    ) -> io::Result<(Arc<dyn DirectoryHandle>, String)> {
        let mut segments = path_segments(path);
        let name = segments.pop().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("path has no final component: '{path}'"),
            )
        })?;

        let mut current = Arc::clone(&self.root);
        for segment in segments {
            current = current.get_directory_handle(segment, create).await?;
        }
        Ok((current, name.to_string()))
    }
}

#[async_trait]
impl FsAdapter for WebFsAdapter {
    async fn read_file(&self, path: &str) -> io::Result<Vec<u8>> {
        let (dir, name) = self.resolve_parent(path, false).await?;
        let file = dir.get_file_handle(&name, false).await?;
        file.read().await
    }

    async fn write_file(&self, path: &str, data: &[u8]) -> io::Result<()> {
        let (dir, name) = self.resolve_parent(path, true).await?;
        let file = dir.get_file_handle(&name, true).await?;
        file.write(data).await
    }

    async fn unlink(&self, path: &str) -> io::Result<()> {
        let (dir, name) = self.resolve_parent(path, false).await?;
        dir.remove_entry(&name, false).await
    }

    async fn readdir(&self, path: &str) -> io::Result<Vec<String>> {
        let dir = if is_root_path(path) {
            Arc::clone(&self.root)
        } else {
            self.resolve_dir(path, false).await?
        };
        dir.entries().await
    }

    async fn mkdir(&self, path: &str) -> io::Result<()> {
        self.resolve_dir(path, true).await.map(|_| ())
    }

    async fn rmdir(&self, path: &str) -> io::Result<()> {
        let (dir, name) = self.resolve_parent(path, false).await?;
        dir.remove_entry(&name, true).await
    }

    async fn stat(&self, path: &str) -> io::Result<FsStat> {
        if is_root_path(path) {
            return Ok(FsStat::directory(Some(SystemTime::now())));
        }

        if self.resolve_dir(path, false).await.is_ok() {
            return Ok(FsStat::directory(Some(SystemTime::now())));
        }

        let (dir, name) = self.resolve_parent(path, false).await?;
        let file = dir.get_file_handle(&name, false).await?;
        file.metadata().await
    }

    fn real_path(&self, path: &str) -> Option<PathBuf> {
        let mut real = self.root.real_path()?;
        for segment in path_segments(path) {
            real.push(segment);
        }
        Some(real)
    }
}

/// Directory handles granted by the host, keyed by workspace path.
#[derive(Clone, Default)]
pub struct DirHandleRegistry {
    handles: Arc<RwLock<HashMap<String, Arc<dyn DirectoryHandle>>>>,
}

impl DirHandleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, workspace_path: impl Into<String>, handle: Arc<dyn DirectoryHandle>) {
        let mut handles = self.handles.write().unwrap_or_else(|e| e.into_inner());
        handles.insert(workspace_path.into(), handle);
    }

    pub fn get(&self, workspace_path: &str) -> Option<Arc<dyn DirectoryHandle>> {
        let handles = self.handles.read().unwrap_or_else(|e| e.into_inner());
        handles.get(workspace_path).cloned()
    }

    pub fn remove(&self, workspace_path: &str) -> Option<Arc<dyn DirectoryHandle>> {
        let mut handles = self.handles.write().unwrap_or_else(|e| e.into_inner());
        handles.remove(workspace_path)
    }
}
