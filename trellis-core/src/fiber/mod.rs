//! Fiber Scheduler
//!
//! This module implements the incremental reconciliation engine: it turns a
//! VNode tree into output nodes one unit of work at a time, yielding to the
//! host between bursts.
//!
//! # Overview
//!
//! A pass walks the tree breadth-first. Each VNode becomes a [`WorkUnit`];
//! units are processed in FIFO order, archived in processing order, and the
//! archive of the last completed pass becomes the snapshot the next pass is
//! compared against.
//!
//! # Design Decisions
//!
//! 1. Units live in flat vectors and refer to each other by index. Nothing
//!    holds a pointer into the tree, so a suspended pass is plain data.
//!
//! 2. All state for a mount target sits behind one lock in the
//!    [`RootRegistry`]. A burst holds the lock for its whole duration; the
//!    host never sees a half-processed unit.
//!
//! 3. Output nodes are attached as soon as they are created, except at the
//!    top level: top-level nodes are collected and attached to the mount
//!    target in one step when the pass commits.

mod diff;
mod reconciler;
mod registry;
mod state;
mod unit;

pub use diff::{diff_props, mount_props};
pub use reconciler::{work_loop, LoopStatus};
pub use registry::{RootRegistry, SharedState};
pub use state::{Phase, ScheduleState};
pub use unit::{UnitIndex, WorkUnit};

pub(crate) use state::Request;
pub(crate) use unit::host_outputs;
