//! Virtual Nodes
//!
//! The immutable declarative description of one tree node.

use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use smallvec::SmallVec;

use super::props::{Prop, PropValue, Props, Ref};
use crate::error::BoxError;

/// What a component render function returns.
pub type RenderResult = Result<Children, BoxError>;

type RenderFn = dyn Fn(&Props) -> RenderResult + Send + Sync;

/// A pure function from props to rendered children.
///
/// Components never own an output node; whatever they render is attached
/// under the component's own parent.
#[derive(Clone)]
pub struct Component {
    name: Cow<'static, str>,
    render: Arc<RenderFn>,
}

impl Component {
    /// Create a component from a render function.
    pub fn new<F>(name: impl Into<Cow<'static, str>>, render: F) -> Self
    where
        F: Fn(&Props) -> RenderResult + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            render: Arc::new(render),
        }
    }

    /// The component's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Run the render function.
    pub fn render(&self, props: &Props) -> RenderResult {
        (self.render)(props)
    }

    /// Whether two handles wrap the same render function.
    pub fn same(&self, other: &Component) -> bool {
        std::ptr::eq(
            Arc::as_ptr(&self.render).cast::<()>(),
            Arc::as_ptr(&other.render).cast::<()>(),
        )
    }
}

impl PartialEq for Component {
    fn eq(&self, other: &Self) -> bool {
        self.same(other)
    }
}

impl fmt::Debug for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Component({})", self.name)
    }
}

/// The type of a VNode.
#[derive(Debug, Clone, PartialEq)]
pub enum Kind {
    /// A concrete element tag.
    Tag(Cow<'static, str>),

    /// The text-node sentinel.
    Text,

    /// A component function.
    Component(Component),
}

impl Kind {
    /// Whether this kind is a component.
    pub fn is_component(&self) -> bool {
        matches!(self, Self::Component(_))
    }

    /// Human-readable name for logs.
    pub fn name(&self) -> &str {
        match self {
            Self::Tag(tag) => tag,
            Self::Text => super::TEXT_TAG,
            Self::Component(component) => component.name(),
        }
    }
}

impl From<&'static str> for Kind {
    fn from(tag: &'static str) -> Self {
        Self::Tag(Cow::Borrowed(tag))
    }
}

impl From<String> for Kind {
    fn from(tag: String) -> Self {
        Self::Tag(Cow::Owned(tag))
    }
}

impl From<Component> for Kind {
    fn from(component: Component) -> Self {
        Self::Component(component)
    }
}

/// A validated key: the string form of a string or number.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Key(String);

impl Key {
    /// Build a key from a prop value, rejecting anything but strings and numbers.
    pub fn from_value(value: &PropValue) -> Option<Self> {
        match value {
            PropValue::Str(s) => Some(Self(s.clone())),
            PropValue::Int(n) => Some(Self(n.to_string())),
            PropValue::Float(x) => Some(Self(x.to_string())),
            PropValue::Null | PropValue::Bool(_) => None,
        }
    }

    /// The key as a string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The children slot of a prop bag.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Children {
    /// No children.
    #[default]
    None,

    /// Exactly one child.
    One(VNode),

    /// An ordered sequence of children.
    Many(SmallVec<[VNode; 4]>),
}

impl Children {
    /// Children as a slice, in order.
    pub fn as_slice(&self) -> &[VNode] {
        match self {
            Self::None => &[],
            Self::One(node) => std::slice::from_ref(node),
            Self::Many(nodes) => nodes,
        }
    }

    /// Iterate children in order.
    pub fn iter(&self) -> std::slice::Iter<'_, VNode> {
        self.as_slice().iter()
    }

    /// Number of children.
    pub fn len(&self) -> usize {
        self.as_slice().len()
    }

    /// Whether there are no children.
    pub fn is_empty(&self) -> bool {
        self.as_slice().is_empty()
    }
}

impl From<VNode> for Children {
    fn from(node: VNode) -> Self {
        Self::One(node)
    }
}

impl From<Vec<VNode>> for Children {
    fn from(nodes: Vec<VNode>) -> Self {
        Self::Many(SmallVec::from_vec(nodes))
    }
}

impl FromIterator<VNode> for Children {
    fn from_iter<I: IntoIterator<Item = VNode>>(iter: I) -> Self {
        Self::Many(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Children {
    type Item = &'a VNode;
    type IntoIter = std::slice::Iter<'a, VNode>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

struct VNodeInner {
    kind: Kind,
    props: Props,
    key: Option<Key>,
    node_ref: Option<Ref>,
}

/// Immutable declarative node. Cloning is cheap and shares the node.
#[derive(Clone)]
pub struct VNode(Arc<VNodeInner>);

impl VNode {
    pub(crate) fn from_parts(
        kind: Kind,
        props: Props,
        key: Option<Key>,
        node_ref: Option<Ref>,
    ) -> Self {
        Self(Arc::new(VNodeInner {
            kind,
            props,
            key,
            node_ref,
        }))
    }

    /// The node's type.
    pub fn kind(&self) -> &Kind {
        &self.0.kind
    }

    /// The node's props.
    pub fn props(&self) -> &Props {
        &self.0.props
    }

    /// The node's children.
    pub fn children(&self) -> &Children {
        self.0.props.children()
    }

    /// The node's key, if any.
    pub fn key(&self) -> Option<&Key> {
        self.0.key.as_ref()
    }

    /// The node's ref, if any.
    pub fn node_ref(&self) -> Option<&Ref> {
        self.0.node_ref.as_ref()
    }

    /// Whether this is a component node.
    pub fn is_component(&self) -> bool {
        self.0.kind.is_component()
    }

    /// Whether this is a text node.
    pub fn is_text(&self) -> bool {
        self.0.kind == Kind::Text
    }

    /// Value of a text node.
    pub fn text(&self) -> Option<&PropValue> {
        if !self.is_text() {
            return None;
        }
        match self.0.props.get(crate::dom::NODE_VALUE)? {
            Prop::Attribute(value) => Some(value),
            Prop::Listener { .. } => None,
        }
    }

    /// Whether two nodes share a type: same tag, both text, or the same
    /// component function.
    pub fn same_type(&self, other: &VNode) -> bool {
        self.0.kind == other.0.kind
    }

    /// Whether two handles point at the same node.
    pub fn ptr_eq(&self, other: &VNode) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl PartialEq for VNode {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
            || (self.0.kind == other.0.kind
                && self.0.key == other.0.key
                && self.0.props == other.0.props)
    }
}

impl fmt::Debug for VNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("VNode");
        s.field("kind", &self.0.kind);
        if let Some(key) = &self.0.key {
            s.field("key", key);
        }
        s.field("props", &self.0.props.len())
            .field("children", &self.children().len())
            .finish()
    }
}
