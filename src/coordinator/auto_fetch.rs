//! Periodic background fetch.
//!
//! At most one timer task is alive per coordinator. Starting replaces the previous
//! task; the task only holds a weak reference, so dropping the coordinator ends it.
//! A host owns one coordinator per workspace, so this is also one timer per process
//! for the CLI. Hosts that keep several coordinators get one timer each.

use super::GitCoordinator;
use crate::core::config::DEFAULT_REMOTE;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

impl GitCoordinator {
    /// (Re)start the timer using the current settings.
    ///
    /// With auto-fetch disabled this only stops the previous timer. Needs a tokio
    /// runtime; without one the timer is not started.
    pub fn start_auto_fetch(self: &Arc<Self>) {
        self.stop_auto_fetch();

        let settings = self.store.read(|s| s.settings.clone());
        if !settings.auto_fetch {
            log::debug!("Auto-fetch disabled");
            return;
        }

        let runtime = match tokio::runtime::Handle::try_current() {
            Ok(runtime) => runtime,
            Err(e) => {
                log::warn!("Auto-fetch not started: {e}");
                return;
            }
        };

        let period = Duration::from_millis(settings.auto_fetch_interval_ms.max(1));
        let coordinator = Arc::downgrade(self);
        let handle = runtime.spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let Some(coordinator) = coordinator.upgrade() else {
                    break;
                };
                coordinator.auto_fetch_tick().await;
            }
        });

        log::debug!("Auto-fetch every {}ms", period.as_millis());
        *self.auto_fetch.lock().unwrap_or_else(|e| e.into_inner()) = Some(handle);
    }

    pub fn stop_auto_fetch(&self) {
        let handle = self
            .auto_fetch
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take();
        if let Some(handle) = handle {
            handle.abort();
            log::debug!("Auto-fetch stopped");
        }
    }

    pub fn is_auto_fetch_running(&self) -> bool {
        self.auto_fetch
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// One timer tick. Skipped without a repository or while another operation runs;
    /// a failure never reaches the recorded error.
    async fn auto_fetch_tick(&self) {
        let ready = self
            .store
            .read(|s| s.is_repo_initialized && !s.operation.in_progress);
        if !ready {
            log::trace!("Auto-fetch tick skipped");
            return;
        }

        if let Err(e) = self.run_fetch(DEFAULT_REMOTE, false).await {
            self.diagnose("auto-fetch", &e);
        }
    }
}
