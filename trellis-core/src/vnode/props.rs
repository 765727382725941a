//! Props
//!
//! Values, listeners and the normalized prop bag carried by a VNode.
//!
//! Event-style props are resolved once, when the node is built: a prop is
//! either an [`Prop::Attribute`] or a [`Prop::Listener`], and nothing
//! downstream re-inspects prop names to tell the two apart.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::node::Children;
use crate::dom::Event;

/// Prefix that marks an event-style prop (`onClick`).
pub const EVENT_PREFIX: &str = "on";

/// A primitive prop value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropValue {
    /// Absent value; children of this kind render nothing.
    Null,
    /// Boolean.
    Bool(bool),
    /// Integer.
    Int(i64),
    /// Floating point number.
    Float(f64),
    /// String.
    Str(String),
}

impl PropValue {
    /// Name of the value's type, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "boolean",
            Self::Int(_) | Self::Float(_) => "number",
            Self::Str(_) => "string",
        }
    }

    /// Borrow the string, if this is one.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Get the integer, if this is one.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Whether the value renders to nothing when used as a child.
    pub fn is_empty_child(&self) -> bool {
        matches!(self, Self::Null | Self::Bool(_))
    }
}

impl fmt::Display for PropValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(n) => write!(f, "{n}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Str(s) => f.write_str(s),
        }
    }
}

impl From<&str> for PropValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_owned())
    }
}

impl From<String> for PropValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<bool> for PropValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for PropValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for PropValue {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<u32> for PropValue {
    fn from(value: u32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<f64> for PropValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl<T: Into<PropValue>> From<Option<T>> for PropValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

/// An event handler.
///
/// Two listeners are equal only if they are the same handler object, so a
/// listener cloned from another compares equal and a fresh closure does not.
#[derive(Clone)]
pub struct Listener {
    handler: Arc<dyn Fn(&Event) + Send + Sync>,
}

impl Listener {
    /// Wrap a handler function.
    pub fn new<F>(handler: F) -> Self
    where
        F: Fn(&Event) + Send + Sync + 'static,
    {
        Self {
            handler: Arc::new(handler),
        }
    }

    /// Invoke the handler.
    pub fn call(&self, event: &Event) {
        (self.handler)(event);
    }

    fn addr(&self) -> *const () {
        Arc::as_ptr(&self.handler).cast::<()>()
    }
}

impl PartialEq for Listener {
    fn eq(&self, other: &Self) -> bool {
        self.addr() == other.addr()
    }
}

impl fmt::Debug for Listener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Listener({:p})", self.addr())
    }
}

/// Opaque out-parameter attached to a node. The core never reads it.
#[derive(Clone)]
pub struct Ref(Arc<dyn Any + Send + Sync>);

impl Ref {
    /// Wrap any shareable value.
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self(Arc::new(value))
    }

    /// Borrow the wrapped value if it has type `T`.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.downcast_ref()
    }
}

impl PartialEq for Ref {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Ref {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Ref(..)")
    }
}

/// A resolved prop.
#[derive(Debug, Clone, PartialEq)]
pub enum Prop {
    /// Written to the output node as an attribute-like property.
    Attribute(PropValue),

    /// Registered on the output node as a listener.
    Listener {
        /// Event name, lower-case.
        event: String,
        /// The handler.
        handler: Listener,
    },
}

impl Prop {
    /// Whether this prop is a listener.
    pub fn is_listener(&self) -> bool {
        matches!(self, Self::Listener { .. })
    }
}

/// The normalized, immutable prop bag of a VNode.
///
/// `key` and `ref` never appear here; children live in their own slot.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Props {
    entries: IndexMap<String, Prop>,
    children: Children,
}

impl Props {
    pub(crate) fn from_parts(entries: IndexMap<String, Prop>, children: Children) -> Self {
        Self { entries, children }
    }

    /// Look up a prop by name.
    pub fn get(&self, name: &str) -> Option<&Prop> {
        self.entries.get(name)
    }

    /// Look up an attribute value by name.
    pub fn value(&self, name: &str) -> Option<&PropValue> {
        match self.entries.get(name)? {
            Prop::Attribute(value) => Some(value),
            Prop::Listener { .. } => None,
        }
    }

    /// Look up a string attribute by name.
    pub fn str(&self, name: &str) -> Option<&str> {
        self.value(name).and_then(PropValue::as_str)
    }

    /// The children slot.
    pub fn children(&self) -> &Children {
        &self.children
    }

    /// Iterate props in insertion order (children excluded).
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Prop)> {
        self.entries.iter().map(|(name, prop)| (name.as_str(), prop))
    }

    /// Number of props (children excluded).
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether there are no props (children excluded).
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A raw prop as handed to the builder.
#[derive(Debug, Clone)]
pub enum RawProp {
    /// A plain value.
    Value(PropValue),
    /// An event handler.
    Handler(Listener),
}

/// Unvalidated props collected before a VNode is built.
///
/// ```rust,ignore
/// let props = RawProps::new()
///     .attr("id", "x")
///     .on("onClick", |_| println!("clicked"))
///     .key("row-1");
/// ```
#[derive(Debug, Clone, Default)]
pub struct RawProps {
    pub(crate) entries: IndexMap<String, RawProp>,
    pub(crate) node_ref: Option<Ref>,
}

impl RawProps {
    /// Create an empty prop bag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a plain value.
    pub fn attr(mut self, name: &str, value: impl Into<PropValue>) -> Self {
        self.insert(name, RawProp::Value(value.into()));
        self
    }

    /// Add an event handler under an `on<Event>` name.
    pub fn on<F>(mut self, name: &str, handler: F) -> Self
    where
        F: Fn(&Event) + Send + Sync + 'static,
    {
        self.insert(name, RawProp::Handler(Listener::new(handler)));
        self
    }

    /// Add an existing listener under an `on<Event>` name.
    pub fn listener(mut self, name: &str, listener: Listener) -> Self {
        self.insert(name, RawProp::Handler(listener));
        self
    }

    /// Set the key. Validated when the node is built.
    pub fn key(self, key: impl Into<PropValue>) -> Self {
        self.attr("key", key)
    }

    /// Attach an opaque ref.
    pub fn with_ref(mut self, node_ref: Ref) -> Self {
        self.node_ref = Some(node_ref);
        self
    }

    /// Insert a raw prop, replacing any previous one with the same name.
    pub fn insert(&mut self, name: &str, prop: RawProp) {
        self.entries.insert(name.to_owned(), prop);
    }
}

/// Event name for an event-style prop name (`onClick` → `click`).
pub fn event_name(prop_name: &str) -> Option<String> {
    prop_name
        .strip_prefix(EVENT_PREFIX)
        .filter(|rest| !rest.is_empty())
        .map(str::to_lowercase)
}
