//! Output Tree
//!
//! A thread-safe, in-memory stand-in for the host document. The reconciler
//! only ever touches it through the primitives below:
//!
//! - create a text node / create an element ([`Document`])
//! - set or remove an attribute-like property by name
//! - add or remove a named listener
//! - attach a node as the last child of another
//! - clear all children of a node
//!
//! plus `remove_child` / `replace_child`, which keyed matching and root
//! replacement need. Each primitive is journaled as a [`Mutation`].

mod document;
mod mutation;
mod node;

pub use document::Document;
pub use mutation::Mutation;
pub use node::{Event, Node, NodeId, NodeType, WeakNode, NODE_VALUE};
