//! Prop Mounting and Diffing
//!
//! Writes a VNode's props onto an output node, either all at once for a new
//! node or as the difference between two prop bags for a reused one.
//!
//! # Rules
//!
//! - A prop whose value is unchanged is not touched.
//! - A changed attribute is set; a changed listener is removed then added.
//! - A prop that switched between attribute and listener has the old form
//!   removed before the new one is applied.
//! - A prop that disappeared is removed.

use crate::dom::Node;
use crate::vnode::{Prop, Props};

/// Apply every prop to a freshly created node.
///
/// Returns the number of writes performed.
pub fn mount_props(node: &Node, props: &Props) -> usize {
    let mut writes = 0;
    for (name, prop) in props.iter() {
        apply(node, name, prop);
        writes += 1;
    }
    writes
}

/// Bring `node` from `old` to `new`.
///
/// Returns the number of writes performed.
pub fn diff_props(node: &Node, old: &Props, new: &Props) -> usize {
    let mut writes = 0;

    for (name, prop) in new.iter() {
        match old.get(name) {
            Some(previous) if previous == prop => {}
            Some(Prop::Attribute(_)) if matches!(prop, Prop::Attribute(_)) => {
                apply(node, name, prop);
                writes += 1;
            }
            Some(previous) => {
                retract(node, name, previous);
                apply(node, name, prop);
                writes += 2;
            }
            None => {
                apply(node, name, prop);
                writes += 1;
            }
        }
    }

    for (name, previous) in old.iter() {
        if new.get(name).is_none() {
            retract(node, name, previous);
            writes += 1;
        }
    }

    writes
}

fn apply(node: &Node, name: &str, prop: &Prop) {
    match prop {
        Prop::Attribute(value) => node.set_attribute(name, value),
        Prop::Listener { event, handler } => node.add_listener(event, handler),
    }
}

fn retract(node: &Node, name: &str, prop: &Prop) {
    match prop {
        Prop::Attribute(_) => node.remove_attribute(name),
        Prop::Listener { event, handler } => node.remove_listener(event, handler),
    }
}
