//! [`GitPlumbing`] on libgit2.
//!
//! libgit2 needs a real directory, so the adapter must expose one through
//! [`FsAdapter::real_path`]. Each call opens the repository afresh and runs on the
//! blocking pool. Calls that write the index or refs take a per-directory lock first,
//! so concurrent callers queue instead of clobbering each other's index writes.

use super::{
    plumbing::{BlameHunk, CloneOptions, GitPlumbing, RemoteOptions},
    repo::GitRepo,
    status_matrix::StatusMatrix,
};
use crate::core::{
    config::{GitAuthor, DEFAULT_REMOTE},
    error::{GitWorkspaceError, Result},
    state::{CommitEntry, RemoteEntry, StashEntry},
};
use crate::fs::FsAdapter;
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

type WriteLocks = HashMap<PathBuf, Arc<tokio::sync::Mutex<()>>>;

#[derive(Debug, Clone, Default)]
pub struct Git2Plumbing {
    write_locks: Arc<Mutex<WriteLocks>>,
}

impl Git2Plumbing {
    pub fn new() -> Self {
        Self::default()
    }

    fn write_lock(&self, path: &Path) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self.write_locks.lock().unwrap_or_else(|e| e.into_inner());
        Arc::clone(locks.entry(path.to_path_buf()).or_default())
    }

    /// [`with_repo`] holding the write lock of `dir` for the whole call.
    async fn writing<T, F>(&self, fs: &dyn FsAdapter, dir: &str, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut GitRepo) -> Result<T> + Send + 'static,
    {
        let path = location(fs, dir)?;
        let lock = self.write_lock(&path);
        let _guard = lock.lock().await;
        blocking(move || {
            let mut repo = GitRepo::open(&path)?;
            f(&mut repo)
        })
        .await
    }
}

fn location(fs: &dyn FsAdapter, dir: &str) -> Result<PathBuf> {
    fs.real_path(dir)
        .ok_or_else(|| GitWorkspaceError::no_real_path(dir))
}

async fn blocking<T, F>(f: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T> + Send + 'static,
{
    tokio::task::spawn_blocking(f).await?
}

/// Open the repository at `dir` and run `f` on the blocking pool.
async fn with_repo<T, F>(fs: &dyn FsAdapter, dir: &str, f: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce(&GitRepo) -> Result<T> + Send + 'static,
{
    let path = location(fs, dir)?;
    blocking(move || {
        let repo = GitRepo::open(&path)?;
        f(&repo)
    })
    .await
}

#[async_trait]
impl GitPlumbing for Git2Plumbing {
    async fn find_root(&self, fs: &dyn FsAdapter, dir: &str) -> Result<String> {
        with_repo(fs, dir, |repo| repo.workdir_string()).await
    }

    async fn init(&self, fs: &dyn FsAdapter, dir: &str, default_branch: &str) -> Result<()> {
        let path = location(fs, dir)?;
        let default_branch = default_branch.to_string();
        blocking(move || GitRepo::init(&path, &default_branch).map(|_| ())).await
    }

    async fn clone_repo(
        &self,
        fs: &dyn FsAdapter,
        dir: &str,
        options: CloneOptions,
    ) -> Result<()> {
        let path = location(fs, dir)?;
        blocking(move || GitRepo::clone_into(&path, &options).map(|_| ())).await
    }

    async fn current_branch(&self, fs: &dyn FsAdapter, dir: &str) -> Result<Option<String>> {
        with_repo(fs, dir, |repo| repo.current_branch()).await
    }

    async fn status_matrix(&self, fs: &dyn FsAdapter, dir: &str) -> Result<StatusMatrix> {
        with_repo(fs, dir, |repo| repo.status_matrix()).await
    }

    async fn add(&self, fs: &dyn FsAdapter, dir: &str, path: &str) -> Result<()> {
        let path = path.to_string();
        self.writing(fs, dir, move |repo| repo.add_path(&path)).await
    }

    async fn reset_index(&self, fs: &dyn FsAdapter, dir: &str, path: &str) -> Result<()> {
        let path = path.to_string();
        self.writing(fs, dir, move |repo| repo.reset_path(&path)).await
    }

    async fn checkout_paths(
        &self,
        fs: &dyn FsAdapter,
        dir: &str,
        paths: &[String],
    ) -> Result<()> {
        let paths = paths.to_vec();
        self.writing(fs, dir, move |repo| repo.checkout_paths(&paths)).await
    }

    async fn commit(
        &self,
        fs: &dyn FsAdapter,
        dir: &str,
        message: &str,
        author: &GitAuthor,
    ) -> Result<String> {
        let message = message.to_string();
        let author = author.clone();
        self.writing(fs, dir, move |repo| repo.commit(&message, &author)).await
    }

    async fn push(
        &self,
        fs: &dyn FsAdapter,
        dir: &str,
        branch: &str,
        options: RemoteOptions,
    ) -> Result<()> {
        let branch = branch.to_string();
        with_repo(fs, dir, move |repo| repo.push(&branch, &options)).await
    }

    async fn pull(
        &self,
        fs: &dyn FsAdapter,
        dir: &str,
        branch: &str,
        author: &GitAuthor,
        options: RemoteOptions,
    ) -> Result<()> {
        let branch = branch.to_string();
        let author = author.clone();
        self.writing(fs, dir, move |repo| repo.pull(&branch, &author, &options)).await
    }

    async fn fetch(&self, fs: &dyn FsAdapter, dir: &str, options: RemoteOptions) -> Result<()> {
        self.writing(fs, dir, move |repo| repo.fetch(&options)).await
    }

    async fn checkout_branch(&self, fs: &dyn FsAdapter, dir: &str, name: &str) -> Result<()> {
        let name = name.to_string();
        self.writing(fs, dir, move |repo| repo.checkout_branch(&name, DEFAULT_REMOTE)).await
    }

    async fn create_branch(&self, fs: &dyn FsAdapter, dir: &str, name: &str) -> Result<()> {
        let name = name.to_string();
        self.writing(fs, dir, move |repo| repo.create_branch(&name)).await
    }

    async fn delete_branch(&self, fs: &dyn FsAdapter, dir: &str, name: &str) -> Result<()> {
        let name = name.to_string();
        self.writing(fs, dir, move |repo| repo.delete_branch(&name)).await
    }

    async fn list_branches(
        &self,
        fs: &dyn FsAdapter,
        dir: &str,
        remote: Option<&str>,
    ) -> Result<Vec<String>> {
        let remote = remote.map(str::to_string);
        with_repo(fs, dir, move |repo| match remote {
            Some(remote) => repo.remote_branches(&remote),
            None => repo.local_branches(),
        })
        .await
    }

    async fn list_remotes(&self, fs: &dyn FsAdapter, dir: &str) -> Result<Vec<RemoteEntry>> {
        with_repo(fs, dir, |repo| repo.remotes()).await
    }

    async fn add_remote(
        &self,
        fs: &dyn FsAdapter,
        dir: &str,
        name: &str,
        url: &str,
    ) -> Result<()> {
        let name = name.to_string();
        let url = url.to_string();
        self.writing(fs, dir, move |repo| repo.add_remote(&name, &url)).await
    }

    async fn log(&self, fs: &dyn FsAdapter, dir: &str, depth: usize) -> Result<Vec<CommitEntry>> {
        with_repo(fs, dir, move |repo| repo.log(depth)).await
    }

    async fn resolve_ref(&self, fs: &dyn FsAdapter, dir: &str, reference: &str) -> Result<String> {
        let reference = reference.to_string();
        with_repo(fs, dir, move |repo| repo.resolve_ref(&reference)).await
    }

    async fn read_blob(
        &self,
        fs: &dyn FsAdapter,
        dir: &str,
        oid: &str,
        path: &str,
    ) -> Result<Vec<u8>> {
        let oid = oid.to_string();
        let path = path.to_string();
        with_repo(fs, dir, move |repo| repo.read_blob(&oid, &path)).await
    }

    async fn blame(&self, fs: &dyn FsAdapter, dir: &str, path: &str) -> Result<Vec<BlameHunk>> {
        let path = path.to_string();
        with_repo(fs, dir, move |repo| repo.blame(&path)).await
    }

    async fn stash_save(
        &self,
        fs: &dyn FsAdapter,
        dir: &str,
        message: &str,
        author: &GitAuthor,
    ) -> Result<String> {
        let message = message.to_string();
        let author = author.clone();
        self.writing(fs, dir, move |repo| repo.stash_save(&message, &author)).await
    }

    async fn stash_list(&self, fs: &dyn FsAdapter, dir: &str) -> Result<Vec<StashEntry>> {
        // Iterating stashes needs a mutable repository
        self.writing(fs, dir, |repo| repo.stash_list()).await
    }

    async fn stash_apply(&self, fs: &dyn FsAdapter, dir: &str, index: usize) -> Result<()> {
        self.writing(fs, dir, move |repo| repo.stash_apply(index)).await
    }

    async fn stash_pop(&self, fs: &dyn FsAdapter, dir: &str, index: usize) -> Result<()> {
        self.writing(fs, dir, move |repo| repo.stash_pop(index)).await
    }

    async fn stash_drop(&self, fs: &dyn FsAdapter, dir: &str, index: usize) -> Result<()> {
        self.writing(fs, dir, move |repo| repo.stash_drop(index)).await
    }
}
