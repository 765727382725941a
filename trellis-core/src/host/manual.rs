//! Manually pumped idle host.
//!
//! Callbacks are queued in request order and run only when the embedder
//! asks. Tests use it to control exactly how much work each burst gets.

use std::collections::VecDeque;
use std::fmt;
use std::time::Duration;

use parking_lot::Mutex;

use super::{Deadline, IdleCallback, IdleScheduler, TimeSlice, UnitBudget};
use crate::error::Result;

/// Idle host whose callbacks run when [`ManualScheduler::run_next`] is called.
#[derive(Default)]
pub struct ManualScheduler {
    queue: Mutex<VecDeque<IdleCallback>>,
}

impl ManualScheduler {
    /// Create an empty host.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of callbacks waiting to run.
    pub fn pending(&self) -> usize {
        self.queue.lock().len()
    }

    /// Run the oldest queued callback with `deadline`.
    ///
    /// Returns `None` if nothing was queued.
    pub fn run_next(&self, deadline: &dyn Deadline) -> Option<Result<()>> {
        // The callback may queue its own continuation; release the lock first.
        let callback = self.queue.lock().pop_front()?;
        Some(callback(deadline))
    }

    /// Run callbacks until none are queued, giving each burst `units` units.
    ///
    /// Returns the number of bursts run. Stops at the first error.
    pub fn run_bursts(&self, units: usize) -> Result<usize> {
        let mut bursts = 0;
        while let Some(result) = self.run_next(&UnitBudget::new(units)) {
            result?;
            bursts += 1;
        }
        Ok(bursts)
    }

    /// Run callbacks until none are queued, giving each burst a `slice`.
    pub fn run_until_idle(&self, slice: Duration) -> Result<usize> {
        let mut bursts = 0;
        while let Some(result) = self.run_next(&TimeSlice::new(slice)) {
            result?;
            bursts += 1;
        }
        Ok(bursts)
    }
}

impl IdleScheduler for ManualScheduler {
    fn request_idle(&self, callback: IdleCallback) {
        self.queue.lock().push_back(callback);
    }
}

impl fmt::Debug for ManualScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManualScheduler")
            .field("pending", &self.pending())
            .finish()
    }
}
