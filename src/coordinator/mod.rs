//! Operation coordinator.
//!
//! [`GitCoordinator`] binds the state container, the event dispatcher, a filesystem
//! factory and the git plumbing together and exposes the workspace operations. Each
//! mutating operation follows the same shape: mark the operation in progress and clear
//! the previous error, run the plumbing, refresh dependent state and publish an event
//! on success, record the error on failure, and always reset the operation state.
//!
//! The storage binding is cached in a [`WorkspaceSession`] and re-resolved lazily
//! whenever the workspace path changes or [`GitCoordinator::invalidate_session`] is
//! called.

mod auto_fetch;
mod blame;
mod branches;
mod history;
mod remote_ops;
mod session;
mod stash;
mod status;

#[cfg(test)]
mod fakes;

pub use session::WorkspaceSession;

use crate::core::{
    error::GitWorkspaceError,
    events::EventDispatcher,
    state::{BlameLine, OperationKind, StateStore},
};
use crate::fs::{FilesystemFactory, ResolvedFs};
use crate::git::{GitPlumbing, ProgressCallback, TransferProgress};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::task::JoinHandle;

/// A failure that was swallowed instead of being recorded as the operation error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Sub-step that failed, e.g. `remote-branches`
    pub scope: &'static str,
    pub message: String,
}

pub type DiagnosticHook = Arc<dyn Fn(&Diagnostic) + Send + Sync>;

pub struct GitCoordinator {
    store: StateStore,
    events: EventDispatcher,
    plumbing: Arc<dyn GitPlumbing>,
    factory: Arc<dyn FilesystemFactory>,
    session: Mutex<Option<Arc<WorkspaceSession>>>,
    diagnostics: Option<DiagnosticHook>,
    auto_fetch: Mutex<Option<JoinHandle<()>>>,
    blame_cache: Mutex<HashMap<String, Vec<BlameLine>>>,
}

impl GitCoordinator {
    pub fn new(
        store: StateStore,
        events: EventDispatcher,
        plumbing: Arc<dyn GitPlumbing>,
        factory: Arc<dyn FilesystemFactory>,
    ) -> Self {
        Self {
            store,
            events,
            plumbing,
            factory,
            session: Mutex::new(None),
            diagnostics: None,
            auto_fetch: Mutex::new(None),
            blame_cache: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_diagnostics(mut self, hook: DiagnosticHook) -> Self {
        self.diagnostics = Some(hook);
        self
    }

    pub fn store(&self) -> &StateStore {
        &self.store
    }

    pub fn events(&self) -> &EventDispatcher {
        &self.events
    }

    /// Drop the cached session; the next operation resolves storage again.
    pub fn invalidate_session(&self) {
        let mut session = self.session.lock().unwrap_or_else(|e| e.into_inner());
        if session.take().is_some() {
            log::debug!("Workspace session invalidated");
        }
        drop(session);
        self.clear_blame_cache();
    }

    /// Session for the current workspace path, resolving it on a cache miss.
    ///
    /// `None` only when resolution itself failed; that failure is not cached.
    pub fn session(&self) -> Option<Arc<WorkspaceSession>> {
        let workspace_path = self.store.workspace_path();
        let mut cached = self.session.lock().unwrap_or_else(|e| e.into_inner());

        if let Some(session) = cached.as_ref() {
            if session.is_for(&workspace_path) {
                return Some(Arc::clone(session));
            }
        }

        let session = match self.factory.resolve(&workspace_path) {
            Ok(Some(resolved)) => WorkspaceSession::from_resolved(&workspace_path, resolved),
            Ok(None) => WorkspaceSession::unavailable(&workspace_path),
            Err(e) => {
                self.diagnose("resolve-filesystem", &GitWorkspaceError::Io(e));
                *cached = None;
                return None;
            }
        };

        log::debug!(
            "Resolved {} backend for workspace '{}'",
            session.backend(),
            workspace_path
        );
        let session = Arc::new(session);
        *cached = Some(Arc::clone(&session));
        Some(session)
    }

    /// Adapter and directory to operate on, `None` when no backend is available.
    pub(crate) fn filesystem(&self) -> Option<ResolvedFs> {
        self.session()?.filesystem()
    }

    /// Clear a previously recorded operation error.
    pub fn clear_error(&self) {
        self.store.set_error(None);
    }

    fn begin(&self, kind: Option<OperationKind>, clear_error: bool) -> OperationGuard<'_> {
        self.store.update(|s| {
            s.operation.in_progress = true;
            s.operation.kind = kind;
            s.operation.progress_percent = 0;
            if clear_error {
                s.operation.error_message = None;
            }
        });
        if let Some(kind) = kind {
            log::debug!("Starting {}", kind.as_str());
        }
        OperationGuard { store: &self.store }
    }

    fn record_failure(&self, operation: &str, error: &GitWorkspaceError) {
        log::warn!("{operation} failed: {error}");
        self.store.set_error(Some(error.operation_message()));
    }

    fn diagnose(&self, scope: &'static str, error: &GitWorkspaceError) {
        log::debug!("Ignoring {scope} failure: {error}");
        if let Some(hook) = &self.diagnostics {
            hook(&Diagnostic {
                scope,
                message: error.operation_message(),
            });
        }
    }

    /// Progress sink that keeps the stored percentage non-decreasing.
    fn progress_reporter(&self) -> ProgressCallback {
        let store = self.store.clone();
        Arc::new(move |progress: TransferProgress| {
            if let Some(percent) = progress.percent() {
                store.update(|s| {
                    if percent > s.operation.progress_percent {
                        s.operation.progress_percent = percent;
                    }
                });
            }
        })
    }
}

impl Drop for GitCoordinator {
    fn drop(&mut self) {
        self.stop_auto_fetch();
    }
}

/// Resets the operation state when the operation ends, however it ends.
struct OperationGuard<'a> {
    store: &'a StateStore,
}

impl Drop for OperationGuard<'_> {
    fn drop(&mut self) {
        self.store.update(|s| {
            s.operation.in_progress = false;
            s.operation.kind = None;
            s.operation.progress_percent = 0;
        });
    }
}
