//! Schedule State
//!
//! Everything the scheduler carries for one mount target between bursts and
//! between passes. One instance exists per mount target; it is reused, never
//! replaced, while the target stays registered.

use std::collections::VecDeque;

use smallvec::SmallVec;

use super::unit::WorkUnit;
use crate::dom::{Document, Node, NodeId, WeakNode};
use crate::vnode::VNode;

/// Where a schedule state is in its pass lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Nothing pending and nothing scheduled.
    Idle,

    /// Units are pending and the loop is (or is about to be) draining them.
    Draining,

    /// The budget ran out; the loop is waiting for the next idle callback.
    Suspended,

    /// The queue drained; the produced nodes are being attached.
    Committing,
}

/// A render or update request.
#[derive(Debug, Clone)]
pub(crate) enum Request {
    /// Clear the mount target and reconcile `VNode` against nothing.
    Render(VNode),

    /// Reconcile the previous pass's root again, against the previous pass.
    Update,
}

/// Per-mount-target scheduler state.
#[derive(Debug)]
pub struct ScheduleState {
    pub(crate) phase: Phase,
    pub(crate) pending: VecDeque<WorkUnit>,
    pub(crate) previous: Vec<WorkUnit>,
    pub(crate) archive: Vec<WorkUnit>,
    pub(crate) produced_roots: SmallVec<[Node; 1]>,
    pub(crate) mount: WeakNode,
    pub(crate) mount_id: NodeId,
    pub(crate) document: Document,
    pub(crate) queued: Option<Request>,
    pub(crate) detached: bool,
    pub(crate) passes: u64,
}

impl ScheduleState {
    /// Fresh, idle state for `mount`. Holds the mount target weakly.
    pub fn new(mount: &Node) -> Self {
        Self {
            phase: Phase::Idle,
            pending: VecDeque::new(),
            previous: Vec::new(),
            archive: Vec::new(),
            produced_roots: SmallVec::new(),
            mount: mount.downgrade(),
            mount_id: mount.id(),
            document: Document::of(mount),
            queued: None,
            detached: false,
            passes: 0,
        }
    }

    /// Current phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Whether no pass is in flight.
    pub fn is_idle(&self) -> bool {
        self.phase == Phase::Idle
    }

    /// Units waiting to be processed.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Units in the previous snapshot.
    pub fn previous_len(&self) -> usize {
        self.previous.len()
    }

    /// Units processed so far in the current pass.
    pub fn archived_len(&self) -> usize {
        self.archive.len()
    }

    /// Completed passes.
    pub fn passes(&self) -> u64 {
        self.passes
    }

    /// ID of the mount target.
    pub fn mount_id(&self) -> NodeId {
        self.mount_id
    }

    /// Whether a request is waiting for the in-flight pass to end.
    pub fn has_queued(&self) -> bool {
        self.queued.is_some()
    }

    /// Root VNode of the last completed pass.
    pub fn last_root(&self) -> Option<&VNode> {
        self.previous.first().map(WorkUnit::vnode)
    }

    /// Queue a request behind the in-flight pass. An update never displaces
    /// a queued render; anything else replaces what was queued.
    pub(crate) fn enqueue(&mut self, request: Request) {
        self.queued = match (self.queued.take(), request) {
            (Some(Request::Render(vnode)), Request::Update) => Some(Request::Render(vnode)),
            (_, request) => Some(request),
        };
    }

    /// Start a pass rooted at `vnode`. A fresh pass forgets the previous
    /// snapshot.
    pub(crate) fn seed(&mut self, vnode: VNode, fresh: bool) {
        if fresh {
            self.previous.clear();
        }
        self.pending.clear();
        self.archive.clear();
        self.produced_roots.clear();

        let previous = (!self.previous.is_empty()).then_some(0);
        self.pending.push_back(WorkUnit::root(vnode, previous));
        self.phase = Phase::Draining;
    }

    /// Drop the in-flight pass, keeping the previous snapshot.
    pub(crate) fn abort(&mut self) {
        self.pending.clear();
        self.archive.clear();
        self.produced_roots.clear();
        self.phase = Phase::Idle;
    }

    /// Rotate this pass's archive into the previous snapshot.
    pub(crate) fn finish(&mut self) {
        self.previous = std::mem::take(&mut self.archive);
        self.produced_roots.clear();
        self.passes += 1;
        self.phase = Phase::Idle;
    }
}
