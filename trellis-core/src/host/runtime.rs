//! Tokio idle host.
//!
//! Each request becomes a task that yields to the runtime once, so other
//! ready tasks get the thread first, then runs the callback under a
//! [`TimeSlice`]. There is no browser-style idle period here; the slice is
//! the budget.

use std::time::Duration;

use tokio::runtime::Handle;

use super::{IdleCallback, IdleScheduler, TimeSlice};
use crate::config::SchedulerConfig;

/// Idle host backed by a tokio runtime.
#[derive(Debug, Clone)]
pub struct TokioScheduler {
    handle: Handle,
    slice: Duration,
}

impl TokioScheduler {
    /// Use the given runtime with bursts of `slice`.
    pub fn new(handle: Handle, slice: Duration) -> Self {
        Self { handle, slice }
    }

    /// Use the runtime the caller is running on.
    ///
    /// # Panics
    ///
    /// Panics when called outside a tokio runtime.
    pub fn current(config: &SchedulerConfig) -> Self {
        Self::new(Handle::current(), config.idle_slice())
    }

    /// Length of each burst.
    pub fn slice(&self) -> Duration {
        self.slice
    }
}

impl IdleScheduler for TokioScheduler {
    fn request_idle(&self, callback: IdleCallback) {
        let slice = self.slice;
        self.handle.spawn(async move {
            tokio::task::yield_now().await;
            let deadline = TimeSlice::new(slice);
            if let Err(err) = callback(&deadline) {
                tracing::warn!(error = %err, "idle callback failed");
            }
        });
    }
}
