//! Node Model
//!
//! This module implements the declarative side of the runtime: the immutable
//! [`VNode`] tree that callers build and hand to a root.
//!
//! # Concepts
//!
//! ## VNodes
//!
//! A VNode is `{ kind, props, key, ref }`. The kind is a tag, the text-node
//! sentinel, or a [`Component`]. Props are ordered and already resolved into
//! attributes and listeners; children live in a reserved slot of the props.
//!
//! ## Components
//!
//! A component is a pure function from props to children. It has no state
//! and owns no output node: what it renders is placed under its parent.
//!
//! ## Building
//!
//! [`create_element`] is the only way to get a non-text VNode. It validates
//! the key, strips `key`/`ref` out of the props and normalizes children, so
//! every VNode the scheduler sees already satisfies these invariants.

mod builder;
mod node;
mod props;

pub use builder::{create_element, text, Child};
pub use node::{Children, Component, Key, Kind, RenderResult, VNode};
pub use props::{event_name, Listener, Prop, PropValue, Props, RawProp, RawProps, Ref, EVENT_PREFIX};

/// Tag name reported for text nodes.
pub const TEXT_TAG: &str = "#text";
