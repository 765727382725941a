//! Node builder.
//!
//! Turns a type, a raw prop bag and loose children into a normalized VNode:
//!
//! - primitives become text nodes carrying `nodeValue`
//! - `null` and booleans are dropped
//! - lists are flattened in order
//! - `key` and `ref` are pulled out of the props and `key` is validated
//! - handler-valued props become listeners

use indexmap::IndexMap;
use smallvec::SmallVec;

use super::node::{Children, Key, Kind, VNode};
use super::props::{event_name, Prop, PropValue, Props, RawProp, RawProps, Ref};
use crate::dom::NODE_VALUE;
use crate::error::{Error, Result};

/// A child as handed to the builder.
#[derive(Debug, Clone)]
pub enum Child {
    /// An already-built node.
    Node(VNode),
    /// A primitive; strings and numbers become text nodes.
    Value(PropValue),
    /// A list of children, flattened in order.
    List(Vec<Child>),
}

impl From<VNode> for Child {
    fn from(node: VNode) -> Self {
        Self::Node(node)
    }
}

impl From<PropValue> for Child {
    fn from(value: PropValue) -> Self {
        Self::Value(value)
    }
}

impl From<&str> for Child {
    fn from(value: &str) -> Self {
        Self::Value(value.into())
    }
}

impl From<String> for Child {
    fn from(value: String) -> Self {
        Self::Value(value.into())
    }
}

impl From<i64> for Child {
    fn from(value: i64) -> Self {
        Self::Value(value.into())
    }
}

impl From<i32> for Child {
    fn from(value: i32) -> Self {
        Self::Value(value.into())
    }
}

impl From<f64> for Child {
    fn from(value: f64) -> Self {
        Self::Value(value.into())
    }
}

impl From<bool> for Child {
    fn from(value: bool) -> Self {
        Self::Value(value.into())
    }
}

impl From<()> for Child {
    fn from((): ()) -> Self {
        Self::Value(PropValue::Null)
    }
}

impl<T: Into<Child>> From<Option<T>> for Child {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Value(PropValue::Null), Into::into)
    }
}

impl<T: Into<Child>> From<Vec<T>> for Child {
    fn from(values: Vec<T>) -> Self {
        Self::List(values.into_iter().map(Into::into).collect())
    }
}

/// Build a text node directly.
pub fn text(value: impl Into<PropValue>) -> VNode {
    let mut entries = IndexMap::with_capacity(1);
    entries.insert(NODE_VALUE.to_owned(), Prop::Attribute(value.into()));
    VNode::from_parts(Kind::Text, Props::from_parts(entries, Children::None), None, None)
}

/// Build a normalized VNode.
///
/// Zero children leave `children` absent, one child is stored as is, two or
/// more (or a single list) are stored as an ordered sequence. Children that
/// render to nothing are dropped; if nothing is left, `children` is absent.
///
/// # Errors
///
/// - [`Error::InvalidKeyType`] if `key` is neither a string nor a number.
/// - [`Error::InvalidListenerName`] if a handler is given under a name
///   without the `on` prefix.
pub fn create_element<I>(kind: impl Into<Kind>, props: Option<RawProps>, children: I) -> Result<VNode>
where
    I: IntoIterator,
    I::Item: Into<Child>,
{
    let RawProps {
        entries: raw,
        node_ref,
    } = props.unwrap_or_default();

    let mut key = None;
    let mut node_ref = node_ref;
    let mut entries = IndexMap::with_capacity(raw.len());

    for (name, prop) in raw {
        match (name.as_str(), prop) {
            ("key", RawProp::Value(value)) => {
                key = Some(Key::from_value(&value).ok_or(Error::InvalidKeyType {
                    found: value.type_name(),
                })?);
            }
            ("key", RawProp::Handler(_)) => {
                return Err(Error::InvalidKeyType { found: "function" });
            }
            ("ref", RawProp::Value(value)) => node_ref = Some(Ref::new(value)),
            ("ref", RawProp::Handler(listener)) => node_ref = Some(Ref::new(listener)),
            (_, RawProp::Value(value)) => {
                entries.insert(name, Prop::Attribute(value));
            }
            (_, RawProp::Handler(handler)) => {
                let event = event_name(&name).ok_or_else(|| Error::InvalidListenerName {
                    name: name.clone(),
                })?;
                entries.insert(name, Prop::Listener { event, handler });
            }
        }
    }

    let children: Vec<Child> = children.into_iter().map(Into::into).collect();
    let children = normalize_children(children);

    Ok(VNode::from_parts(
        kind.into(),
        Props::from_parts(entries, children),
        key,
        node_ref,
    ))
}

fn normalize_children(mut children: Vec<Child>) -> Children {
    if children.len() == 1 {
        match children.pop() {
            Some(Child::Node(node)) => return Children::One(node),
            Some(Child::Value(value)) => {
                return normalize_value(value).map_or(Children::None, Children::One);
            }
            Some(list @ Child::List(_)) => children.push(list),
            None => {}
        }
    }

    let mut nodes = SmallVec::new();
    flatten_into(children, &mut nodes);
    if nodes.is_empty() {
        Children::None
    } else {
        Children::Many(nodes)
    }
}

fn flatten_into(children: Vec<Child>, out: &mut SmallVec<[VNode; 4]>) {
    for child in children {
        match child {
            Child::Node(node) => out.push(node),
            Child::Value(value) => out.extend(normalize_value(value)),
            Child::List(list) => flatten_into(list, out),
        }
    }
}

fn normalize_value(value: PropValue) -> Option<VNode> {
    if value.is_empty_child() {
        None
    } else {
        Some(text(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vnode::Component;

    fn no_children() -> Vec<Child> {
        Vec::new()
    }

    #[test]
    fn primitive_children_become_text_nodes() {
        for (child, expected) in [
            (Child::from("hello"), PropValue::from("hello")),
            (Child::from(7), PropValue::from(7)),
            (Child::from(2.5), PropValue::from(2.5)),
        ] {
            let node = create_element("p", None, [child]).unwrap();
            let Children::One(text_node) = node.children() else {
                panic!("expected a single child");
            };
            assert!(text_node.is_text());
            assert_eq!(text_node.text(), Some(&expected));
            assert!(text_node.children().is_empty());
        }
    }

    #[test]
    fn empty_children_are_dropped() {
        let node = create_element(
            "p",
            None,
            [Child::from(()), Child::from(false), Child::from("x"), Child::from(true)],
        )
        .unwrap();

        assert_eq!(node.children().len(), 1);
        assert!(matches!(node.children(), Children::Many(_)));

        let only_empty = create_element("p", None, [Child::from(None::<&str>)]).unwrap();
        assert!(only_empty.children().is_empty());
    }

    #[test]
    fn children_slot_shape_follows_count() {
        let zero = create_element("div", None, no_children()).unwrap();
        assert_eq!(zero.children(), &Children::None);

        let one = create_element("div", None, ["a"]).unwrap();
        assert!(matches!(one.children(), Children::One(_)));

        let many = create_element("div", None, ["a", "b", "c"]).unwrap();
        let values: Vec<_> = many
            .children()
            .iter()
            .map(|c| c.text().unwrap().to_string())
            .collect();
        assert_eq!(values, ["a", "b", "c"]);
    }

    #[test]
    fn a_single_list_is_a_sequence() {
        let node = create_element("ul", None, [Child::from(vec!["a", "b"])]).unwrap();
        assert!(matches!(node.children(), Children::Many(items) if items.len() == 2));
    }

    #[test]
    fn lists_are_flattened_in_order() {
        let node = create_element(
            "ul",
            None,
            [Child::from("a"), Child::from(vec!["b", "c"]), Child::from("d")],
        )
        .unwrap();

        let values: Vec<_> = node
            .children()
            .iter()
            .map(|c| c.text().unwrap().to_string())
            .collect();
        assert_eq!(values, ["a", "b", "c", "d"]);
    }

    #[test]
    fn key_must_be_string_or_number() {
        let err = create_element("li", Some(RawProps::new().key(true)), no_children()).unwrap_err();
        assert!(matches!(err, Error::InvalidKeyType { found: "boolean" }));

        let err = create_element(
            "li",
            Some(RawProps::new().listener("key", crate::vnode::Listener::new(|_| {}))),
            no_children(),
        )
        .unwrap_err();
        assert!(matches!(err, Error::InvalidKeyType { found: "function" }));

        let by_str = create_element("li", Some(RawProps::new().key("a")), no_children()).unwrap();
        let by_num = create_element("li", Some(RawProps::new().key(1)), no_children()).unwrap();
        assert_eq!(by_str.key().unwrap().as_str(), "a");
        assert_eq!(by_num.key().unwrap().as_str(), "1");
    }

    #[test]
    fn key_and_ref_are_stripped_from_props() {
        let node = create_element(
            "li",
            Some(
                RawProps::new()
                    .attr("id", "x")
                    .key("k")
                    .with_ref(Ref::new("slot")),
            ),
            no_children(),
        )
        .unwrap();

        assert!(node.props().get("key").is_none());
        assert!(node.props().get("ref").is_none());
        assert_eq!(node.props().str("id"), Some("x"));
        assert!(node.node_ref().is_some());
    }

    #[test]
    fn handlers_resolve_to_listeners() {
        let node = create_element(
            "button",
            Some(RawProps::new().on("onClick", |_| {}).attr("online", true)),
            no_children(),
        )
        .unwrap();

        assert!(matches!(
            node.props().get("onClick"),
            Some(Prop::Listener { event, .. }) if event == "click"
        ));
        assert!(matches!(node.props().get("online"), Some(Prop::Attribute(_))));
    }

    #[test]
    fn handler_without_event_prefix_is_rejected() {
        let err = create_element("button", Some(RawProps::new().on("click", |_| {})), no_children())
            .unwrap_err();
        assert!(matches!(err, Error::InvalidListenerName { name } if name == "click"));
    }

    #[test]
    fn components_keep_props_for_render() {
        let greet = Component::new("Greet", |props| {
            let name = props.str("name").unwrap_or("nobody").to_owned();
            Ok(text(name).into())
        });
        let node = create_element(greet.clone(), Some(RawProps::new().attr("name", "ada")), no_children())
            .unwrap();

        assert!(node.is_component());
        let rendered = greet.render(node.props()).unwrap();
        let Children::One(child) = rendered else {
            panic!("expected one child");
        };
        assert_eq!(child.text(), Some(&PropValue::from("ada")));
    }
}
