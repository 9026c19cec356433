//! Namespaced virtual filesystem.
//!
//! Each workspace without a granted directory gets its own namespace. Namespaces
//! are persisted under the data directory, one directory per namespace named by the
//! md5 of the namespace string. [`VirtualFsRegistry::get`] always hands back the same
//! instance for a namespace; [`VirtualFsRegistry::delete`] drops the instance and
//! wipes everything it persisted.

use super::traits::{is_root_path, path_segments, FsAdapter, FsStat};
use async_trait::async_trait;
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

#[derive(Debug)]
pub struct VirtualFs {
    namespace: String,
    root: PathBuf,
}

impl VirtualFs {
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map a POSIX path onto the namespace directory. `..` is rejected.
    fn resolve(&self, path: &str) -> io::Result<PathBuf> {
        let mut resolved = self.root.clone();
        for segment in path_segments(path) {
            if segment == ".." {
                return Err(io::Error::new(
                    io::ErrorKind::PermissionDenied,
                    format!("path escapes namespace: {path}"),
                ));
            }
            resolved.push(segment);
        }
        Ok(resolved)
    }
}

#[async_trait]
impl FsAdapter for VirtualFs {
    async fn read_file(&self, path: &str) -> io::Result<Vec<u8>> {
        tokio::fs::read(self.resolve(path)?).await
    }

    async fn write_file(&self, path: &str, data: &[u8]) -> io::Result<()> {
        let target = self.resolve(path)?;
        if target == self.root {
            return Err(io::Error::new(
                io::ErrorKind::IsADirectory,
                format!("is a directory: {path}"),
            ));
        }
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(target, data).await
    }

    async fn unlink(&self, path: &str) -> io::Result<()> {
        tokio::fs::remove_file(self.resolve(path)?).await
    }

    async fn readdir(&self, path: &str) -> io::Result<Vec<String>> {
        let mut dir = tokio::fs::read_dir(self.resolve(path)?).await?;
        let mut names = Vec::new();
        while let Some(entry) = dir.next_entry().await? {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
        names.sort();
        Ok(names)
    }

    async fn mkdir(&self, path: &str) -> io::Result<()> {
        tokio::fs::create_dir_all(self.resolve(path)?).await
    }

    async fn rmdir(&self, path: &str) -> io::Result<()> {
        if is_root_path(path) {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                "cannot remove namespace root",
            ));
        }
        tokio::fs::remove_dir_all(self.resolve(path)?).await
    }

    async fn stat(&self, path: &str) -> io::Result<FsStat> {
        if is_root_path(path) {
            let modified = tokio::fs::metadata(&self.root)
                .await
                .ok()
                .and_then(|m| m.modified().ok());
            return Ok(FsStat::directory(modified));
        }

        let meta = tokio::fs::metadata(self.resolve(path)?).await?;
        if meta.is_dir() {
            Ok(FsStat::directory(meta.modified().ok()))
        } else {
            Ok(FsStat::file(meta.len(), meta.modified().ok()))
        }
    }

    fn real_path(&self, path: &str) -> Option<PathBuf> {
        self.resolve(path).ok()
    }
}

/// Owner of every live [`VirtualFs`] namespace.
#[derive(Debug, Clone)]
pub struct VirtualFsRegistry {
    base_dir: PathBuf,
    instances: Arc<RwLock<HashMap<String, Arc<VirtualFs>>>>,
}

impl VirtualFsRegistry {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            instances: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn namespace_dir(&self, namespace: &str) -> PathBuf {
        let hash = format!("{:x}", md5::compute(namespace.as_bytes()));
        self.base_dir.join(hash)
    }

    /// Same namespace, same instance.
    pub fn get(&self, namespace: &str) -> io::Result<Arc<VirtualFs>> {
        if let Some(existing) = self
            .instances
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(namespace)
        {
            return Ok(Arc::clone(existing));
        }

        let mut instances = self.instances.write().unwrap_or_else(|e| e.into_inner());
        if let Some(existing) = instances.get(namespace) {
            return Ok(Arc::clone(existing));
        }

        let root = self.namespace_dir(namespace);
        std::fs::create_dir_all(&root)?;
        log::debug!("Opened virtual namespace '{namespace}' at {}", root.display());

        let fs = Arc::new(VirtualFs {
            namespace: namespace.to_string(),
            root,
        });
        instances.insert(namespace.to_string(), Arc::clone(&fs));
        Ok(fs)
    }

    pub fn contains(&self, namespace: &str) -> bool {
        self.instances
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .contains_key(namespace)
    }

    /// Forget the instance and remove every persisted byte of the namespace.
    pub async fn delete(&self, namespace: &str) -> io::Result<()> {
        self.instances
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .remove(namespace);

        let root = self.namespace_dir(namespace);
        match tokio::fs::remove_dir_all(&root).await {
            Ok(()) => {
                log::debug!("Deleted virtual namespace '{namespace}'");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }
}
