//! Roots
//!
//! A [`Root`] binds a mount target to an idle host and drives reconciliation
//! passes into it.
//!
//! # Lifecycle
//!
//! 1. `render(vnode)` clears the mount target and starts a fresh pass.
//! 2. The pass runs in bursts, one per idle callback, until it commits.
//! 3. `update()` reconciles the last committed tree again, against itself.
//! 4. `unmount()` forgets the mount target and removes what was committed.
//!
//! A request that arrives while a pass is in flight waits in a single slot
//! and starts once the pass ends. A later request replaces a waiting one,
//! except that an update never replaces a waiting render.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use trellis_core::{acquire_root, create_element, Document, ManualScheduler};
//!
//! let doc = Document::new();
//! let mount = doc.create_element("main");
//! let host = Arc::new(ManualScheduler::new());
//!
//! let root = acquire_root(&mount, host.clone(), None);
//! root.render(create_element("p", None, ["hello"])?)?;
//! host.run_bursts(1)?;
//!
//! assert_eq!(mount.to_markup(), "<main><p>hello</p></main>");
//! ```

use std::fmt;
use std::sync::Arc;

use crate::config::RootOptions;
use crate::dom::{Node, NodeId, WeakNode};
use crate::error::{Error, Result};
use crate::fiber::{
    host_outputs, work_loop, LoopStatus, Phase, Request, RootRegistry, ScheduleState, SharedState,
};
use crate::host::{Deadline, IdleScheduler};
use crate::vnode::VNode;

/// Acquire a root for `mount` in the process-wide registry.
///
/// Acquiring twice for the same mount target drives the same schedule state.
pub fn acquire_root(
    mount: &Node,
    host: Arc<dyn IdleScheduler>,
    options: Option<RootOptions>,
) -> Root {
    RootRegistry::global().acquire_root(mount, host, options)
}

impl RootRegistry {
    /// Acquire a root for `mount` in this registry.
    pub fn acquire_root(
        &self,
        mount: &Node,
        host: Arc<dyn IdleScheduler>,
        options: Option<RootOptions>,
    ) -> Root {
        self.acquire(mount);
        Root {
            inner: Arc::new(RootInner {
                registry: self.clone(),
                mount: mount.downgrade(),
                mount_id: mount.id(),
                host,
                options: options.unwrap_or_default(),
            }),
        }
    }
}

struct RootInner {
    registry: RootRegistry,
    mount: WeakNode,
    mount_id: NodeId,
    host: Arc<dyn IdleScheduler>,
    options: RootOptions,
}

/// Handle for rendering into one mount target.
///
/// Cloning is cheap; clones drive the same target.
#[derive(Clone)]
pub struct Root {
    inner: Arc<RootInner>,
}

impl Root {
    /// Clear the mount target and render `vnode` into it.
    ///
    /// The pass runs when the host next grants idle time. If a pass is in
    /// flight, the request waits for it.
    ///
    /// # Errors
    ///
    /// [`Error::MissingMountTarget`] if the mount target has been dropped.
    pub fn render(&self, vnode: VNode) -> Result<()> {
        self.submit(Request::Render(vnode))
    }

    /// Reconcile the root of the last completed pass again.
    ///
    /// Components run again; nodes whose props did not change are left
    /// untouched.
    ///
    /// # Errors
    ///
    /// - [`Error::NothingToUpdate`] if no pass has completed.
    /// - [`Error::MissingMountTarget`] if the mount target has been dropped.
    pub fn update(&self) -> Result<()> {
        self.submit(Request::Update)
    }

    /// Forget the mount target.
    ///
    /// Removes what the last pass committed, drops any waiting request and
    /// stops an in-flight pass at its next burst without committing it. A
    /// later `render` starts over with fresh state.
    pub fn unmount(&self) {
        let Some(shared) = self.inner.registry.release_id(self.inner.mount_id) else {
            return;
        };
        let mut state = shared.lock();
        state.detached = true;
        state.queued = None;

        if let Some(mount) = state.mount.upgrade() {
            if !state.previous.is_empty() {
                for node in host_outputs(&state.previous, 0) {
                    if node.parent().is_some_and(|parent| parent.ptr_eq(&mount)) {
                        mount.remove_child(&node);
                    }
                }
            }
        }
        state.previous.clear();
        tracing::debug!(mount = %self.inner.mount_id, "root unmounted");
    }

    /// Whether no pass is in flight.
    pub fn is_idle(&self) -> bool {
        self.phase() == Phase::Idle
    }

    /// Phase of the mount target's schedule state.
    pub fn phase(&self) -> Phase {
        self.shared().map_or(Phase::Idle, |shared| shared.lock().phase())
    }

    /// Number of passes committed into the mount target.
    pub fn passes(&self) -> u64 {
        self.shared().map_or(0, |shared| shared.lock().passes())
    }

    /// ID of the mount target.
    pub fn mount_id(&self) -> NodeId {
        self.inner.mount_id
    }

    /// The configured identifier prefix.
    pub fn identifier_prefix(&self) -> Option<&str> {
        self.inner.options.identifier_prefix.as_deref()
    }

    /// The options this root was acquired with.
    pub fn options(&self) -> &RootOptions {
        &self.inner.options
    }

    fn shared(&self) -> Option<SharedState> {
        let mount = self.inner.mount.upgrade()?;
        self.inner.registry.get(&mount)
    }

    fn submit(&self, request: Request) -> Result<()> {
        let mount = self
            .inner
            .mount
            .upgrade()
            .ok_or(Error::MissingMountTarget(self.inner.mount_id))?;
        let shared = self.inner.registry.acquire(&mount);

        {
            let mut state = shared.lock();
            if !state.is_idle() {
                defer(&mut state, request);
                return Ok(());
            }
            begin(&mut state, request)?;
        }

        schedule(Arc::clone(&self.inner), shared);
        Ok(())
    }
}

impl fmt::Debug for Root {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Root")
            .field("mount", &self.inner.mount_id)
            .field("options", &self.inner.options)
            .finish()
    }
}

/// Park a request behind the in-flight pass.
fn defer(state: &mut ScheduleState, request: Request) {
    if state.has_queued() {
        tracing::warn!(mount = %state.mount_id, "request queued behind another waiting request");
    } else {
        tracing::debug!(mount = %state.mount_id, "pass in flight, request queued");
    }
    state.enqueue(request);
}

/// Seed a pass for `request`.
fn begin(state: &mut ScheduleState, request: Request) -> Result<()> {
    match request {
        Request::Render(vnode) => {
            let mount = state
                .mount
                .upgrade()
                .ok_or(Error::MissingMountTarget(state.mount_id))?;
            mount.clear_children();
            state.seed(vnode, true);
        }
        Request::Update => {
            let root = state.last_root().cloned().ok_or(Error::NothingToUpdate)?;
            state.seed(root, false);
        }
    }
    tracing::debug!(mount = %state.mount_id, pass = state.passes() + 1, "pass started");
    Ok(())
}

fn schedule(inner: Arc<RootInner>, shared: SharedState) {
    let host = Arc::clone(&inner.host);
    host.request_idle(Box::new(move |deadline| burst(&inner, &shared, deadline)));
}

/// One idle callback: run the loop, then decide what happens next.
fn burst(inner: &Arc<RootInner>, shared: &SharedState, deadline: &dyn Deadline) -> Result<()> {
    let mut errors = Vec::new();
    let (outcome, reschedule) = {
        let mut state = shared.lock();
        let outcome = work_loop(&mut state, deadline, &inner.options.scheduler);
        let reschedule = match &outcome {
            Ok(LoopStatus::Suspended) => true,
            // The pass is over either way; start whatever arrived meanwhile.
            Ok(LoopStatus::Committed) | Err(_) => match state.queued.take() {
                Some(request) => match begin(&mut state, request) {
                    Ok(()) => true,
                    Err(err) => {
                        errors.push(err);
                        false
                    }
                },
                None => false,
            },
            // Unmounted or already idle: nothing queued may run.
            Ok(LoopStatus::Idle) => {
                state.queued = None;
                false
            }
        };
        (outcome, reschedule)
    };

    // The hook may call back into the root; the state lock is released.
    if let Err(err) = &outcome {
        report(inner, err);
    }
    for err in &errors {
        report(inner, err);
    }
    if reschedule {
        schedule(Arc::clone(inner), Arc::clone(shared));
    }

    // The loop's own error takes precedence over a failed restart.
    match (outcome, errors.pop()) {
        (Err(err), _) | (Ok(_), Some(err)) => Err(err),
        (Ok(_), None) => Ok(()),
    }
}

fn report(inner: &RootInner, err: &Error) {
    if err.aborts_pass() {
        tracing::warn!(mount = %inner.mount_id, error = %err, "pass abandoned");
    } else {
        tracing::warn!(mount = %inner.mount_id, error = %err, "queued request could not start");
    }
    if let Some(hook) = &inner.options.on_recoverable_error {
        hook(err);
    }
}
