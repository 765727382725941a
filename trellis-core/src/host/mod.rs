//! Host Idle Scheduling
//!
//! The reconciler never blocks and never decides on its own when to run. It
//! hands a callback to an [`IdleScheduler`]; the host invokes it at some later
//! point with a [`Deadline`] the loop polls before every unit of work.
//!
//! # Hosts
//!
//! - [`ManualScheduler`] queues callbacks until the embedder pumps them.
//! - [`TokioScheduler`] yields to a tokio runtime once per burst.
//!
//! # Deadlines
//!
//! - [`UnitBudget`] grants capacity to a fixed number of queries, which makes
//!   "one unit per burst" schedules reproducible in tests.
//! - [`TimeSlice`] measures a slice on the monotonic clock.
//! - [`Unbounded`] never runs out.

mod manual;
mod runtime;

use std::cell::Cell;
use std::time::{Duration, Instant};

pub use manual::ManualScheduler;
pub use runtime::TokioScheduler;

use crate::error::Result;

/// Capacity reported while a [`UnitBudget`] still has queries left.
const BUDGET_CAPACITY: Duration = Duration::from_millis(50);

/// Time-remaining signal handed to the loop callback.
pub trait Deadline {
    /// How much of the current idle period is left.
    fn time_remaining(&self) -> Duration;
}

/// Work handed to the host; invoked once with the burst's deadline.
pub type IdleCallback = Box<dyn FnOnce(&dyn Deadline) -> Result<()> + Send>;

/// Host facility that runs callbacks when the host has time to spare.
pub trait IdleScheduler: Send + Sync {
    /// Invoke `callback` at a host-chosen future point.
    fn request_idle(&self, callback: IdleCallback);
}

/// Deadline that grants capacity to exactly `n` queries.
#[derive(Debug)]
pub struct UnitBudget {
    remaining: Cell<usize>,
}

impl UnitBudget {
    /// Allow `units` queries to report capacity.
    pub fn new(units: usize) -> Self {
        Self {
            remaining: Cell::new(units),
        }
    }

    /// Queries still granted.
    pub fn remaining(&self) -> usize {
        self.remaining.get()
    }
}

impl Deadline for UnitBudget {
    fn time_remaining(&self) -> Duration {
        match self.remaining.get() {
            0 => Duration::ZERO,
            n => {
                self.remaining.set(n - 1);
                BUDGET_CAPACITY
            }
        }
    }
}

/// Deadline measured on the monotonic clock.
#[derive(Debug, Clone, Copy)]
pub struct TimeSlice {
    ends_at: Instant,
}

impl TimeSlice {
    /// A slice of `length` starting now.
    pub fn new(length: Duration) -> Self {
        Self {
            ends_at: Instant::now() + length,
        }
    }
}

impl Deadline for TimeSlice {
    fn time_remaining(&self) -> Duration {
        self.ends_at.saturating_duration_since(Instant::now())
    }
}

/// Deadline that never runs out.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unbounded;

impl Deadline for Unbounded {
    fn time_remaining(&self) -> Duration {
        Duration::MAX
    }
}
