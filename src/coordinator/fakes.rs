//! In-memory plumbing and a counting factory for coordinator tests.

use super::{Diagnostic, DiagnosticHook, GitCoordinator};
use crate::core::{
    config::GitAuthor,
    error::{GitWorkspaceError, Result},
    events::EventDispatcher,
    state::{CommitEntry, RemoteEntry, StashEntry, StateStore},
};
use crate::fs::{
    DefaultFilesystemFactory, DirHandleRegistry, Environment, FilesystemFactory, FsAdapter,
    ResolvedFs, VirtualFsRegistry,
};
use crate::git::{
    BlameHunk, CloneOptions, GitPlumbing, RemoteOptions, StatusMatrix, TransferProgress,
};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

/// Factory that counts resolutions.
pub struct CountingFactory {
    inner: Option<DefaultFilesystemFactory>,
    calls: AtomicUsize,
}

impl CountingFactory {
    pub fn new(inner: DefaultFilesystemFactory) -> Self {
        Self {
            inner: Some(inner),
            calls: AtomicUsize::new(0),
        }
    }

    /// Every resolution fails with an I/O error.
    pub fn failing() -> Self {
        Self {
            inner: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl FilesystemFactory for CountingFactory {
    fn resolve(&self, workspace_path: &str) -> io::Result<Option<ResolvedFs>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.inner {
            Some(inner) => inner.resolve(workspace_path),
            None => Err(io::Error::other("storage unavailable")),
        }
    }
}

#[derive(Default)]
struct FakeState {
    calls: Vec<String>,
    failing: HashSet<&'static str>,
    is_repo: bool,
    branch: Option<String>,
    matrix: StatusMatrix,
    local_branches: Vec<String>,
    remote_branches: Vec<String>,
    remotes: Vec<RemoteEntry>,
    log: Vec<CommitEntry>,
    head: Option<String>,
    blobs: HashMap<String, Vec<u8>>,
    progress: Vec<TransferProgress>,
    progress_observer: Option<Arc<dyn Fn() + Send + Sync>>,
    commits: usize,
    blame: HashMap<String, Vec<BlameHunk>>,
    stashes: Vec<StashEntry>,
}

/// Scriptable [`GitPlumbing`] that records every call.
#[derive(Default)]
pub struct FakePlumbing {
    state: Mutex<FakeState>,
}

impl FakePlumbing {
    fn with<R>(&self, f: impl FnOnce(&mut FakeState) -> R) -> R {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        f(&mut state)
    }

    /// Record `call` and fail if `method` was scripted to fail.
    fn record(&self, method: &'static str, call: String) -> Result<()> {
        self.with(|s| {
            s.calls.push(call);
            if s.failing.contains(method) {
                Err(GitWorkspaceError::Git(git2::Error::from_str(&format!(
                    "{method} failed"
                ))))
            } else {
                Ok(())
            }
        })
    }

    fn emit_progress(&self, options: &RemoteOptions) {
        let (progress, observer) = self.with(|s| (s.progress.clone(), s.progress_observer.clone()));
        if let Some(report) = &options.on_progress {
            for step in progress {
                report(step);
                if let Some(observer) = &observer {
                    observer();
                }
            }
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.with(|s| s.calls.clone())
    }

    pub fn fail(&self, method: &'static str) {
        self.with(|s| s.failing.insert(method));
    }

    pub fn set_repo(&self, branch: &str) {
        let branch = branch.to_string();
        self.with(|s| {
            s.is_repo = true;
            s.branch = Some(branch);
        });
    }

    pub fn set_detached(&self) {
        self.with(|s| s.branch = None);
    }

    pub fn set_matrix(&self, matrix: StatusMatrix) {
        self.with(|s| s.matrix = matrix);
    }

    pub fn set_branches(&self, local: &[&str], remote: &[&str]) {
        self.with(|s| {
            s.local_branches = local.iter().map(|b| b.to_string()).collect();
            s.remote_branches = remote.iter().map(|b| b.to_string()).collect();
        });
    }

    pub fn set_remotes(&self, remotes: Vec<RemoteEntry>) {
        self.with(|s| s.remotes = remotes);
    }

    pub fn set_log(&self, log: Vec<CommitEntry>) {
        self.with(|s| s.log = log);
    }

    pub fn set_blob(&self, head: &str, path: &str, content: &str) {
        let (head, path, content) = (head.to_string(), path.to_string(), content.as_bytes().to_vec());
        self.with(|s| {
            s.head = Some(head);
            s.blobs.insert(path, content);
        });
    }

    pub fn set_progress(&self, progress: Vec<TransferProgress>) {
        self.with(|s| s.progress = progress);
    }

    pub fn set_blame(&self, path: &str, hunks: Vec<BlameHunk>) {
        let path = path.to_string();
        self.with(|s| s.blame.insert(path, hunks));
    }

    pub fn stash_messages(&self) -> Vec<String> {
        self.with(|s| s.stashes.iter().map(|e| e.message.clone()).collect())
    }

    /// Called after each progress step is reported.
    pub fn set_progress_observer(&self, observer: Arc<dyn Fn() + Send + Sync>) {
        self.with(|s| s.progress_observer = Some(observer));
    }
}

#[async_trait]
impl GitPlumbing for FakePlumbing {
    async fn find_root(&self, _fs: &dyn FsAdapter, dir: &str) -> Result<String> {
        self.record("find_root", format!("find_root {dir}"))?;
        if self.with(|s| s.is_repo) {
            Ok(dir.to_string())
        } else {
            Err(GitWorkspaceError::NotInGitRepo)
        }
    }

    async fn init(&self, _fs: &dyn FsAdapter, _dir: &str, default_branch: &str) -> Result<()> {
        self.record("init", format!("init {default_branch}"))?;
        self.set_repo(default_branch);
        Ok(())
    }

    async fn clone_repo(&self, _fs: &dyn FsAdapter, dir: &str, options: CloneOptions) -> Result<()> {
        self.emit_progress(&options.remote);
        self.record("clone", format!("clone {} {dir} depth={}", options.url, options.depth))
    }

    async fn current_branch(&self, _fs: &dyn FsAdapter, _dir: &str) -> Result<Option<String>> {
        self.record("current_branch", "current_branch".to_string())?;
        Ok(self.with(|s| s.branch.clone()))
    }

    async fn status_matrix(&self, _fs: &dyn FsAdapter, _dir: &str) -> Result<StatusMatrix> {
        self.record("status_matrix", "status_matrix".to_string())?;
        Ok(self.with(|s| s.matrix.clone()))
    }

    async fn add(&self, _fs: &dyn FsAdapter, _dir: &str, path: &str) -> Result<()> {
        // Yield so concurrent stage calls interleave
        tokio::task::yield_now().await;
        self.record("add", format!("add {path}"))?;
        if path.starts_with("bad") {
            return Err(GitWorkspaceError::not_found_at_head(path));
        }
        Ok(())
    }

    async fn reset_index(&self, _fs: &dyn FsAdapter, _dir: &str, path: &str) -> Result<()> {
        self.record("reset_index", format!("reset_index {path}"))
    }

    async fn checkout_paths(&self, _fs: &dyn FsAdapter, _dir: &str, paths: &[String]) -> Result<()> {
        self.record("checkout_paths", format!("checkout_paths {}", paths.join(",")))
    }

    async fn commit(
        &self,
        _fs: &dyn FsAdapter,
        _dir: &str,
        message: &str,
        author: &GitAuthor,
    ) -> Result<String> {
        self.record("commit", format!("commit {message} by {}", author.name))?;
        let count = self.with(|s| {
            s.commits += 1;
            s.commits
        });
        Ok(format!("{count:040x}"))
    }

    async fn push(&self, _fs: &dyn FsAdapter, _dir: &str, branch: &str, options: RemoteOptions) -> Result<()> {
        self.emit_progress(&options);
        let auth = options.credentials.map(|c| c.token).unwrap_or_default();
        self.record("push", format!("push {} {branch} auth={auth}", options.remote))
    }

    async fn pull(
        &self,
        _fs: &dyn FsAdapter,
        _dir: &str,
        branch: &str,
        author: &GitAuthor,
        options: RemoteOptions,
    ) -> Result<()> {
        self.emit_progress(&options);
        self.record("pull", format!("pull {} {branch} as {}", options.remote, author.name))
    }

    async fn fetch(&self, _fs: &dyn FsAdapter, _dir: &str, options: RemoteOptions) -> Result<()> {
        self.emit_progress(&options);
        self.record("fetch", format!("fetch {}", options.remote))
    }

    async fn checkout_branch(&self, _fs: &dyn FsAdapter, _dir: &str, name: &str) -> Result<()> {
        self.record("checkout_branch", format!("checkout_branch {name}"))?;
        let name = name.to_string();
        self.with(|s| s.branch = Some(name));
        Ok(())
    }

    async fn create_branch(&self, _fs: &dyn FsAdapter, _dir: &str, name: &str) -> Result<()> {
        self.record("create_branch", format!("create_branch {name}"))?;
        let name = name.to_string();
        self.with(|s| s.local_branches.push(name));
        Ok(())
    }

    async fn delete_branch(&self, _fs: &dyn FsAdapter, _dir: &str, name: &str) -> Result<()> {
        self.record("delete_branch", format!("delete_branch {name}"))?;
        self.with(|s| s.local_branches.retain(|b| b != name));
        Ok(())
    }

    async fn list_branches(
        &self,
        _fs: &dyn FsAdapter,
        _dir: &str,
        remote: Option<&str>,
    ) -> Result<Vec<String>> {
        match remote {
            Some(remote) => {
                self.record("list_remote_branches", format!("list_branches {remote}"))?;
                Ok(self.with(|s| s.remote_branches.clone()))
            }
            None => {
                self.record("list_branches", "list_branches".to_string())?;
                Ok(self.with(|s| s.local_branches.clone()))
            }
        }
    }

    async fn list_remotes(&self, _fs: &dyn FsAdapter, _dir: &str) -> Result<Vec<RemoteEntry>> {
        self.record("list_remotes", "list_remotes".to_string())?;
        Ok(self.with(|s| s.remotes.clone()))
    }

    async fn add_remote(&self, _fs: &dyn FsAdapter, _dir: &str, name: &str, url: &str) -> Result<()> {
        self.record("add_remote", format!("add_remote {name} {url}"))?;
        let remote = RemoteEntry {
            name: name.to_string(),
            url: url.to_string(),
        };
        self.with(|s| s.remotes.push(remote));
        Ok(())
    }

    async fn log(&self, _fs: &dyn FsAdapter, _dir: &str, depth: usize) -> Result<Vec<CommitEntry>> {
        self.record("log", format!("log {depth}"))?;
        Ok(self.with(|s| s.log.iter().take(depth).cloned().collect()))
    }

    async fn resolve_ref(&self, _fs: &dyn FsAdapter, _dir: &str, reference: &str) -> Result<String> {
        self.record("resolve_ref", format!("resolve_ref {reference}"))?;
        self.with(|s| s.head.clone()).ok_or(GitWorkspaceError::NoHead)
    }

    async fn read_blob(&self, _fs: &dyn FsAdapter, _dir: &str, oid: &str, path: &str) -> Result<Vec<u8>> {
        self.record("read_blob", format!("read_blob {oid} {path}"))?;
        self.with(|s| s.blobs.get(path).cloned())
            .ok_or_else(|| GitWorkspaceError::not_found_at_head(path))
    }

    async fn blame(&self, _fs: &dyn FsAdapter, _dir: &str, path: &str) -> Result<Vec<BlameHunk>> {
        self.record("blame", format!("blame {path}"))?;
        self.with(|s| s.blame.get(path).cloned())
            .ok_or_else(|| GitWorkspaceError::not_found_at_head(path))
    }

    async fn stash_save(
        &self,
        _fs: &dyn FsAdapter,
        _dir: &str,
        message: &str,
        author: &GitAuthor,
    ) -> Result<String> {
        self.record("stash_save", format!("stash_save {message} by {}", author.name))?;
        let message = message.to_string();
        Ok(self.with(|s| {
            let oid = format!("{:040x}", s.stashes.len() + 1000);
            s.stashes.insert(
                0,
                StashEntry {
                    index: 0,
                    message,
                    oid: oid.clone(),
                },
            );
            reindex(&mut s.stashes);
            oid
        }))
    }

    async fn stash_list(&self, _fs: &dyn FsAdapter, _dir: &str) -> Result<Vec<StashEntry>> {
        self.record("stash_list", "stash_list".to_string())?;
        Ok(self.with(|s| s.stashes.clone()))
    }

    async fn stash_apply(&self, _fs: &dyn FsAdapter, _dir: &str, index: usize) -> Result<()> {
        self.record("stash_apply", format!("stash_apply {index}"))
    }

    async fn stash_pop(&self, _fs: &dyn FsAdapter, _dir: &str, index: usize) -> Result<()> {
        self.record("stash_pop", format!("stash_pop {index}"))?;
        self.with(|s| {
            s.stashes.remove(index);
            reindex(&mut s.stashes);
        });
        Ok(())
    }

    async fn stash_drop(&self, _fs: &dyn FsAdapter, _dir: &str, index: usize) -> Result<()> {
        self.record("stash_drop", format!("stash_drop {index}"))?;
        self.with(|s| {
            s.stashes.remove(index);
            reindex(&mut s.stashes);
        });
        Ok(())
    }
}

fn reindex(stashes: &mut [StashEntry]) {
    for (index, entry) in stashes.iter_mut().enumerate() {
        entry.index = index;
    }
}

/// Coordinator over a virtual store in `temp_dir`, with a counting factory and
/// fake plumbing.
pub fn coordinator(
    temp_dir: &TempDir,
    env: Environment,
) -> (Arc<GitCoordinator>, Arc<CountingFactory>, Arc<FakePlumbing>) {
    build(temp_dir, env, None)
}

fn build(
    temp_dir: &TempDir,
    env: Environment,
    hook: Option<DiagnosticHook>,
) -> (Arc<GitCoordinator>, Arc<CountingFactory>, Arc<FakePlumbing>) {
    let factory = Arc::new(CountingFactory::new(DefaultFilesystemFactory::new(
        env,
        DirHandleRegistry::new(),
        VirtualFsRegistry::new(temp_dir.path().join("virtual")),
    )));
    let plumbing = Arc::new(FakePlumbing::default());
    let mut coordinator = GitCoordinator::new(
        StateStore::new(),
        EventDispatcher::new(),
        plumbing.clone(),
        factory.clone(),
    );
    if let Some(hook) = hook {
        coordinator = coordinator.with_diagnostics(hook);
    }
    (Arc::new(coordinator), factory, plumbing)
}

fn detected(coordinator: &GitCoordinator, plumbing: &FakePlumbing) {
    plumbing.set_repo("main");
    coordinator.store().update(|s| {
        s.workspace_path = "/ws".to_string();
        s.is_repo_initialized = true;
        s.current_branch = "main".to_string();
    });
}

/// Same as [`coordinator`], with a repository already detected on `main`.
pub fn repo_coordinator(temp_dir: &TempDir) -> (Arc<GitCoordinator>, Arc<FakePlumbing>) {
    let (coordinator, _, plumbing) = coordinator(temp_dir, Environment::virtual_only());
    detected(&coordinator, &plumbing);
    (coordinator, plumbing)
}

/// [`repo_coordinator`] that also collects the scopes of swallowed failures.
pub fn diagnosed_repo_coordinator(
    temp_dir: &TempDir,
) -> (Arc<GitCoordinator>, Arc<FakePlumbing>, Arc<Mutex<Vec<&'static str>>>) {
    let scopes = Arc::new(Mutex::new(Vec::new()));
    let sink = scopes.clone();
    let hook: DiagnosticHook = Arc::new(move |d: &Diagnostic| {
        sink.lock().unwrap_or_else(|e| e.into_inner()).push(d.scope);
    });
    let (coordinator, _, plumbing) = build(temp_dir, Environment::virtual_only(), Some(hook));
    detected(&coordinator, &plumbing);
    (coordinator, plumbing, scopes)
}
