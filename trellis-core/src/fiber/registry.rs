//! Root Registry
//!
//! Maps each mount target to its [`ScheduleState`], so a root acquired twice
//! for the same target drives the same state and `update()` can find the
//! previous pass.
//!
//! # Lifetime
//!
//! Entries are keyed by the mount node's identity and hold the node only
//! weakly: registering a target never keeps it alive. Entries whose target
//! has been dropped are purged whenever a root is acquired; `release` is the
//! explicit removal path used by unmount.

use std::fmt;
use std::sync::{Arc, OnceLock};

use dashmap::DashMap;
use parking_lot::Mutex;

use super::state::ScheduleState;
use crate::dom::{Node, NodeId, WeakNode};

/// Schedule state shared between a root and the loop callbacks it schedules.
pub type SharedState = Arc<Mutex<ScheduleState>>;

struct Entry {
    mount: WeakNode,
    state: SharedState,
}

/// Mount target → schedule state.
///
/// Cloning the registry clones the handle; clones share entries.
#[derive(Clone, Default)]
pub struct RootRegistry {
    roots: Arc<DashMap<NodeId, Entry>>,
}

static GLOBAL: OnceLock<RootRegistry> = OnceLock::new();

impl RootRegistry {
    /// Create an isolated registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide registry.
    pub fn global() -> &'static RootRegistry {
        GLOBAL.get_or_init(RootRegistry::new)
    }

    /// The state for `mount`, created if the target is not registered yet.
    pub fn acquire(&self, mount: &Node) -> SharedState {
        self.purge();
        let entry = self.roots.entry(mount.id()).or_insert_with(|| {
            tracing::debug!(mount = %mount.id(), "registering mount target");
            Entry {
                mount: mount.downgrade(),
                state: Arc::new(Mutex::new(ScheduleState::new(mount))),
            }
        });
        Arc::clone(&entry.state)
    }

    /// The state for `mount`, if registered.
    pub fn get(&self, mount: &Node) -> Option<SharedState> {
        self.roots
            .get(&mount.id())
            .map(|entry| Arc::clone(&entry.state))
    }

    /// Remove the association for `mount`, returning the state it had.
    pub fn release(&self, mount: &Node) -> Option<SharedState> {
        self.release_id(mount.id())
    }

    /// Remove the association for a mount target by ID.
    pub fn release_id(&self, mount: NodeId) -> Option<SharedState> {
        self.roots.remove(&mount).map(|(_, entry)| entry.state)
    }

    /// Whether `mount` is registered.
    pub fn contains(&self, mount: &Node) -> bool {
        self.roots.contains_key(&mount.id())
    }

    /// Drop entries whose mount target no longer exists.
    ///
    /// Returns the number of entries removed.
    pub fn purge(&self) -> usize {
        let before = self.roots.len();
        self.roots.retain(|_, entry| !entry.mount.is_dangling());
        let purged = before - self.roots.len();
        if purged > 0 {
            tracing::debug!(purged, "purged roots of dropped mount targets");
        }
        purged
    }

    /// Number of registered mount targets.
    pub fn len(&self) -> usize {
        self.roots.len()
    }

    /// Whether no mount target is registered.
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }
}

impl fmt::Debug for RootRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RootRegistry")
            .field("roots", &self.len())
            .finish()
    }
}
