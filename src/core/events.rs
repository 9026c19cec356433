//! Event delivery from the coordinator to whoever renders state.
//!
//! [`EventDispatcher`] is injected into the coordinator instead of being a global bus.
//! Dispatch is synchronous and fire-and-forget: having no subscribers is not an error.

use crate::core::state::{BlameLine, OperationKind, StashEntry};
use crate::merge::ConflictRegion;
use tokio::sync::broadcast;

const EVENT_CHANNEL_CAPACITY: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GitEvent {
    /// `repo-status-changed`
    RepoStatusChanged,
    /// `branch-changed`
    BranchChanged { branch: String },
    /// `operation-complete`
    OperationComplete {
        operation: OperationKind,
        oid: Option<String>,
    },
    /// `conflict-resolved`
    ConflictResolved {
        resolved: ConflictRegion,
        remaining: Vec<ConflictRegion>,
    },
    /// `blame-updated`
    BlameUpdated { lines: Vec<BlameLine> },
    /// `stash-changed`
    StashChanged { stashes: Vec<StashEntry> },
}

impl GitEvent {
    /// Wire name of the event
    pub fn name(&self) -> &'static str {
        match self {
            GitEvent::RepoStatusChanged => "repo-status-changed",
            GitEvent::BranchChanged { .. } => "branch-changed",
            GitEvent::OperationComplete { .. } => "operation-complete",
            GitEvent::ConflictResolved { .. } => "conflict-resolved",
            GitEvent::BlameUpdated { .. } => "blame-updated",
            GitEvent::StashChanged { .. } => "stash-changed",
        }
    }
}

#[derive(Debug, Clone)]
pub struct EventDispatcher {
    tx: broadcast::Sender<GitEvent>,
}

impl Default for EventDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl EventDispatcher {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self { tx }
    }

    pub fn dispatch(&self, event: GitEvent) {
        log::debug!("Dispatching {}", event.name());
        // No receivers is fine
        let _ = self.tx.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<GitEvent> {
        self.tx.subscribe()
    }
}
