//! Output Nodes
//!
//! This module defines the live, mutable nodes of the output tree.
//!
//! A [`Node`] is a shared handle: cloning it clones the handle, not the node.
//! Children are owned by their parent; the parent link is weak so a subtree
//! never keeps its ancestors (or the mount target) alive.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use indexmap::IndexMap;
use parking_lot::Mutex;
use serde::Serialize;

use super::document::Journal;
use super::mutation::Mutation;
use crate::vnode::{Listener, PropValue};

/// Property name that carries the text of a text node.
pub const NODE_VALUE: &str = "nodeValue";

/// Unique identifier for an output node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeId(u64);

impl NodeId {
    /// Generate a new unique node ID.
    pub fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw ID value.
    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<u64> for NodeId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What kind of output node this is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeType {
    /// An element with a tag name.
    Element(String),

    /// A text node.
    Text,
}

/// Event delivered to listeners by [`Node::dispatch`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    /// Event name, lower-case (`"click"`).
    pub name: String,

    /// The node the event was dispatched on.
    pub target: NodeId,
}

#[derive(Default)]
struct NodeState {
    parent: Option<Weak<NodeData>>,
    children: Vec<Node>,
    attributes: IndexMap<String, PropValue>,
    listeners: Vec<(String, Listener)>,
    text: String,
}

struct NodeData {
    id: NodeId,
    node_type: NodeType,
    journal: Arc<Journal>,
    state: Mutex<NodeState>,
}

/// Shared handle to a live output node.
#[derive(Clone)]
pub struct Node(Arc<NodeData>);

/// Non-owning handle to an output node.
#[derive(Clone, Default)]
pub struct WeakNode(Weak<NodeData>);

impl Node {
    pub(super) fn new(node_type: NodeType, journal: Arc<Journal>) -> Self {
        Self(Arc::new(NodeData {
            id: NodeId::new(),
            node_type,
            journal,
            state: Mutex::new(NodeState::default()),
        }))
    }

    /// Get the node's ID.
    pub fn id(&self) -> NodeId {
        self.0.id
    }

    /// Get the node's type.
    pub fn node_type(&self) -> &NodeType {
        &self.0.node_type
    }

    /// Tag name for elements, `None` for text nodes.
    pub fn tag(&self) -> Option<&str> {
        match &self.0.node_type {
            NodeType::Element(tag) => Some(tag),
            NodeType::Text => None,
        }
    }

    /// Whether this is a text node.
    pub fn is_text(&self) -> bool {
        self.0.node_type == NodeType::Text
    }

    pub(super) fn journal(&self) -> &Arc<Journal> {
        &self.0.journal
    }

    /// Text content of a text node (empty for elements).
    pub fn text(&self) -> String {
        self.0.state.lock().text.clone()
    }

    /// Current value of an attribute.
    pub fn attribute(&self, name: &str) -> Option<PropValue> {
        self.0.state.lock().attributes.get(name).cloned()
    }

    /// All attributes in insertion order.
    pub fn attributes(&self) -> Vec<(String, PropValue)> {
        self.0
            .state
            .lock()
            .attributes
            .iter()
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect()
    }

    /// Snapshot of the children.
    pub fn children(&self) -> Vec<Node> {
        self.0.state.lock().children.clone()
    }

    /// Number of children.
    pub fn child_count(&self) -> usize {
        self.0.state.lock().children.len()
    }

    /// The parent node, if attached and still alive.
    pub fn parent(&self) -> Option<Node> {
        self.0
            .state
            .lock()
            .parent
            .as_ref()
            .and_then(Weak::upgrade)
            .map(Node)
    }

    /// Number of listeners registered for `event`.
    pub fn listener_count(&self, event: &str) -> usize {
        self.0
            .state
            .lock()
            .listeners
            .iter()
            .filter(|(name, _)| name == event)
            .count()
    }

    /// Create a non-owning handle.
    pub fn downgrade(&self) -> WeakNode {
        WeakNode(Arc::downgrade(&self.0))
    }

    /// Whether two handles point at the same node.
    pub fn ptr_eq(&self, other: &Node) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    fn record(&self, mutation: Mutation) {
        self.0.journal.record(mutation);
    }

    /// Set an attribute-like property.
    ///
    /// On text nodes, `nodeValue` replaces the text.
    pub fn set_attribute(&self, name: &str, value: &PropValue) {
        {
            let mut state = self.0.state.lock();
            if self.is_text() && name == NODE_VALUE {
                state.text = value.to_string();
            } else {
                state.attributes.insert(name.to_owned(), value.clone());
            }
        }
        self.record(Mutation::SetAttribute {
            node: self.id(),
            name: name.to_owned(),
        });
    }

    /// Remove an attribute-like property.
    pub fn remove_attribute(&self, name: &str) {
        {
            let mut state = self.0.state.lock();
            if self.is_text() && name == NODE_VALUE {
                state.text.clear();
            } else {
                state.attributes.shift_remove(name);
            }
        }
        self.record(Mutation::RemoveAttribute {
            node: self.id(),
            name: name.to_owned(),
        });
    }

    /// Register a listener for `event`.
    pub fn add_listener(&self, event: &str, listener: &Listener) {
        self.0
            .state
            .lock()
            .listeners
            .push((event.to_owned(), listener.clone()));
        self.record(Mutation::AddListener {
            node: self.id(),
            event: event.to_owned(),
        });
    }

    /// Remove a listener previously registered for `event`.
    ///
    /// Removing a listener that is not registered is a no-op on the tree but
    /// is still journaled, like the host call it models.
    pub fn remove_listener(&self, event: &str, listener: &Listener) {
        {
            let mut state = self.0.state.lock();
            if let Some(pos) = state
                .listeners
                .iter()
                .position(|(name, registered)| name == event && registered == listener)
            {
                state.listeners.remove(pos);
            }
        }
        self.record(Mutation::RemoveListener {
            node: self.id(),
            event: event.to_owned(),
        });
    }

    /// Invoke every listener registered for `event`.
    ///
    /// Returns the number of listeners called.
    pub fn dispatch(&self, event: &str) -> usize {
        let listeners: Vec<Listener> = self
            .0
            .state
            .lock()
            .listeners
            .iter()
            .filter(|(name, _)| name == event)
            .map(|(_, listener)| listener.clone())
            .collect();

        let payload = Event {
            name: event.to_owned(),
            target: self.id(),
        };
        for listener in &listeners {
            listener.call(&payload);
        }
        listeners.len()
    }

    /// Remove `child` from its current parent without journaling.
    fn unlink(child: &Node) -> Option<Node> {
        let parent = child.parent()?;
        parent
            .0
            .state
            .lock()
            .children
            .retain(|existing| !existing.ptr_eq(child));
        child.0.state.lock().parent = None;
        Some(parent)
    }

    /// Attach `child` as the last child of this node.
    ///
    /// A child that already has a parent is moved.
    pub fn append_child(&self, child: &Node) {
        debug_assert!(!self.ptr_eq(child), "a node cannot be its own child");
        Self::unlink(child);
        self.0.state.lock().children.push(child.clone());
        child.0.state.lock().parent = Some(Arc::downgrade(&self.0));
        self.record(Mutation::AppendChild {
            parent: self.id(),
            child: child.id(),
        });
    }

    /// Remove `child` from this node. Returns `false` if it was not a child.
    pub fn remove_child(&self, child: &Node) -> bool {
        let removed = {
            let mut state = self.0.state.lock();
            let before = state.children.len();
            state.children.retain(|existing| !existing.ptr_eq(child));
            before != state.children.len()
        };
        if !removed {
            return false;
        }
        child.0.state.lock().parent = None;
        self.record(Mutation::RemoveChild {
            parent: self.id(),
            child: child.id(),
        });
        true
    }

    /// Put `new` where `old` is. Falls back to appending when `old` is not a
    /// child of this node.
    pub fn replace_child(&self, old: &Node, new: &Node) {
        let is_child = old.parent().is_some_and(|parent| parent.ptr_eq(self));
        if !is_child {
            self.append_child(new);
            return;
        }

        Self::unlink(new);
        {
            let mut state = self.0.state.lock();
            if let Some(pos) = state.children.iter().position(|c| c.ptr_eq(old)) {
                state.children[pos] = new.clone();
            }
        }
        old.0.state.lock().parent = None;
        new.0.state.lock().parent = Some(Arc::downgrade(&self.0));
        self.record(Mutation::ReplaceChild {
            parent: self.id(),
            old: old.id(),
            new: new.id(),
        });
    }

    /// Detach this node from its parent, if any.
    pub fn detach(&self) -> bool {
        match self.parent() {
            Some(parent) => parent.remove_child(self),
            None => false,
        }
    }

    /// Remove every child of this node.
    pub fn clear_children(&self) {
        let children = std::mem::take(&mut self.0.state.lock().children);
        for child in &children {
            child.0.state.lock().parent = None;
        }
        self.record(Mutation::ClearChildren { node: self.id() });
    }

    /// Render the subtree as HTML-like markup.
    pub fn to_markup(&self) -> String {
        let mut out = String::new();
        self.write_markup(&mut out);
        out
    }

    fn write_markup(&self, out: &mut String) {
        match &self.0.node_type {
            NodeType::Text => out.push_str(&escape(&self.text())),
            NodeType::Element(tag) => {
                out.push('<');
                out.push_str(tag);
                for (name, value) in self.attributes() {
                    out.push(' ');
                    out.push_str(&name);
                    out.push_str("=\"");
                    out.push_str(&escape(&value.to_string()));
                    out.push('"');
                }
                out.push('>');
                for child in self.children() {
                    child.write_markup(out);
                }
                out.push_str("</");
                out.push_str(tag);
                out.push('>');
            }
        }
    }
}

fn escape(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("id", &self.id())
            .field("type", &self.0.node_type)
            .field("children", &self.child_count())
            .finish()
    }
}

impl WeakNode {
    /// Upgrade to a strong handle if the node is still alive.
    pub fn upgrade(&self) -> Option<Node> {
        self.0.upgrade().map(Node)
    }

    /// Whether the node has been dropped.
    pub fn is_dangling(&self) -> bool {
        self.0.strong_count() == 0
    }
}

impl fmt::Debug for WeakNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.upgrade() {
            Some(node) => write!(f, "WeakNode({})", node.id()),
            None => f.write_str("WeakNode(<dropped>)"),
        }
    }
}
