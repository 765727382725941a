//! Mutation records.
//!
//! When the owning document journals, every primitive applied to the output
//! tree leaves one record there. The reconciler never reads the journal; it is
//! there for embedders that forward patches and for tests that count writes.

use serde::Serialize;

use super::node::NodeId;

/// One primitive operation applied to the output tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Mutation {
    /// An element node was created.
    CreateElement { node: NodeId, tag: String },
    /// A text node was created.
    CreateText { node: NodeId },
    /// An attribute-like property was written.
    SetAttribute { node: NodeId, name: String },
    /// An attribute-like property was removed.
    RemoveAttribute { node: NodeId, name: String },
    /// A listener was registered.
    AddListener { node: NodeId, event: String },
    /// A listener was removed.
    RemoveListener { node: NodeId, event: String },
    /// A node was attached as the last child of another.
    AppendChild { parent: NodeId, child: NodeId },
    /// A child was detached.
    RemoveChild { parent: NodeId, child: NodeId },
    /// A child was swapped for another in place.
    ReplaceChild {
        parent: NodeId,
        old: NodeId,
        new: NodeId,
    },
    /// All children of a node were removed.
    ClearChildren { node: NodeId },
}

impl Mutation {
    /// Attribute or listener writes, the operations prop diffing performs.
    pub fn is_prop_write(&self) -> bool {
        matches!(
            self,
            Self::SetAttribute { .. }
                | Self::RemoveAttribute { .. }
                | Self::AddListener { .. }
                | Self::RemoveListener { .. }
        )
    }

    /// Node creations.
    pub fn is_creation(&self) -> bool {
        matches!(self, Self::CreateElement { .. } | Self::CreateText { .. })
    }

    /// Operations that change the shape of the tree.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            Self::AppendChild { .. }
                | Self::RemoveChild { .. }
                | Self::ReplaceChild { .. }
                | Self::ClearChildren { .. }
        )
    }
}
