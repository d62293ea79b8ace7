//! Inactivity watchdog.
//!
//! A background task ticking the store's expiry check against the wall
//! clock. The handle aborts the task on shutdown **and** on drop, so
//! re-initializing the session layer can never leak a timer.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;

use korbly_core::Redirect;

use crate::storage::SessionStorage;
use crate::store::SessionStore;

/// Watchdog tuning.
#[derive(Debug, Clone, Copy)]
pub struct WatchdogConfig {
    /// How often the expiry check runs. Expiry precision is bounded by this.
    pub poll_interval: Duration,
}

impl Default for WatchdogConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(30),
        }
    }
}

/// Handle owning the watchdog task.
#[derive(Debug)]
pub struct WatchdogHandle {
    task: JoinHandle<()>,
}

impl WatchdogHandle {
    /// Stop the watchdog. Idempotent.
    pub fn shutdown(&self) {
        self.task.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for WatchdogHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Spawn the watchdog over a shared session store.
///
/// Expiry redirects are delivered on the returned channel; the embedding
/// application performs the actual navigation. Storage failures inside the
/// tick are logged and the watchdog keeps running.
pub fn spawn_watchdog<S>(
    store: Arc<Mutex<SessionStore<S>>>,
    config: WatchdogConfig,
) -> (WatchdogHandle, mpsc::UnboundedReceiver<Redirect>)
where
    S: SessionStorage + Send + 'static,
{
    let (tx, rx) = mpsc::unbounded_channel();

    let task = tokio::spawn(async move {
        let mut interval = tokio::time::interval(config.poll_interval);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        // The first tick fires immediately; skip it so a freshly restored
        // session is not checked twice in the same instant.
        interval.tick().await;

        loop {
            interval.tick().await;
            let mut store = store.lock().await;
            match store.check_expiry(Utc::now()) {
                Ok(Some(redirect)) => {
                    // Receiver gone means the app is shutting down; keep
                    // ticking, the handle will abort us.
                    let _ = tx.send(redirect);
                }
                Ok(None) => {}
                Err(error) => {
                    tracing::warn!(%error, "watchdog expiry check failed");
                }
            }
        }
    });

    (WatchdogHandle { task }, rx)
}
