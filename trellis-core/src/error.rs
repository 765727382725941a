//! Error Types
//!
//! Every failure the builder, the scheduler and the root surface can report.
//! All of them surface to whoever triggered the operation: the builder caller
//! for construction errors, the host pumping the idle loop for errors raised
//! while a pass is drained.

use thiserror::Error;

use crate::dom::NodeId;

/// Boxed error returned by component render functions.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Crate-wide result alias.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors raised by the node builder, the reconciler and the root surface.
#[derive(Debug, Error)]
pub enum Error {
    /// A `key` prop was supplied that is neither a string nor a number.
    #[error("key should be a number or a string, got {found}")]
    InvalidKeyType {
        /// Name of the type that was supplied.
        found: &'static str,
    },

    /// An event handler was supplied under a prop name without the `on` prefix.
    #[error("prop `{name}` holds an event handler but is not named `on<Event>`")]
    InvalidListenerName {
        /// The offending prop name.
        name: String,
    },

    /// A component function failed while the scheduler was rendering it.
    #[error("component `{component}` failed to render")]
    ComponentRenderFailure {
        /// Name of the component that failed.
        component: String,
        /// The error the component returned.
        #[source]
        source: BoxError,
    },

    /// The mount target was dropped before the pass could be committed.
    #[error("mount target {0} is no longer alive")]
    MissingMountTarget(NodeId),

    /// `update()` was requested before any pass completed.
    #[error("nothing to update: the root has no completed render")]
    NothingToUpdate,

    /// Scheduler configuration could not be parsed.
    #[error("invalid scheduler configuration: {0}")]
    Config(#[from] serde_json::Error),
}

impl Error {
    /// Whether this error aborted a reconciliation pass.
    pub fn aborts_pass(&self) -> bool {
        matches!(
            self,
            Self::ComponentRenderFailure { .. } | Self::MissingMountTarget(_)
        )
    }
}
