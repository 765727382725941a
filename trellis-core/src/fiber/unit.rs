//! Work Units
//!
//! A work unit pairs a VNode with the output node it must be attached under.
//! Units are created when a pass is seeded or when a processed unit expands
//! its children, consumed exactly once, then archived. The archive of one
//! pass is the "previous" snapshot the next pass diffs against.

use smallvec::SmallVec;

use crate::dom::Node;
use crate::vnode::VNode;

/// Position of a unit in a pass's archive.
pub type UnitIndex = usize;

/// The per-node scheduling record of one reconciliation pass.
#[derive(Debug, Clone)]
pub struct WorkUnit {
    /// The node this unit realizes.
    pub(crate) vnode: VNode,

    /// Where this unit's output goes. `None` only at the top level.
    pub(crate) parent_output: Option<Node>,

    /// The output node, once materialized. Always `None` for components.
    pub(crate) output: Option<Node>,

    /// Archive index of the unit that expanded this one.
    pub(crate) parent_unit: Option<UnitIndex>,

    /// Counterpart in the previous snapshot, assigned by keyed matching.
    pub(crate) previous: Option<UnitIndex>,

    /// Archive indices of the units this one expanded into, in order.
    pub(crate) children: SmallVec<[UnitIndex; 4]>,

    /// Siblings changed order; a reused node must be moved into place.
    pub(crate) reorder: bool,
}

impl WorkUnit {
    /// The unit that seeds a pass.
    pub(crate) fn root(vnode: VNode, previous: Option<UnitIndex>) -> Self {
        Self {
            vnode,
            parent_output: None,
            output: None,
            parent_unit: None,
            previous,
            children: SmallVec::new(),
            reorder: false,
        }
    }

    /// A unit expanded from `parent_unit`.
    pub(crate) fn child(
        vnode: VNode,
        parent_output: Option<Node>,
        parent_unit: UnitIndex,
        previous: Option<UnitIndex>,
        reorder: bool,
    ) -> Self {
        Self {
            vnode,
            parent_output,
            output: None,
            parent_unit: Some(parent_unit),
            previous,
            children: SmallVec::new(),
            reorder,
        }
    }

    /// The node this unit realizes.
    pub fn vnode(&self) -> &VNode {
        &self.vnode
    }

    /// The output node this unit attaches under.
    pub fn parent_output(&self) -> Option<&Node> {
        self.parent_output.as_ref()
    }

    /// The unit's own output node.
    pub fn output(&self) -> Option<&Node> {
        self.output.as_ref()
    }

    /// Whether the unit renders a component.
    pub fn is_component(&self) -> bool {
        self.vnode.is_component()
    }
}

/// Output nodes a unit contributes to its parent: its own node, or for a
/// component, the nodes its rendered subtree contributes.
pub(crate) fn host_outputs(archive: &[WorkUnit], index: UnitIndex) -> Vec<Node> {
    let mut out = Vec::new();
    collect_host_outputs(archive, index, &mut out);
    out
}

fn collect_host_outputs(archive: &[WorkUnit], index: UnitIndex, out: &mut Vec<Node>) {
    let Some(unit) = archive.get(index) else {
        return;
    };
    match &unit.output {
        Some(node) => out.push(node.clone()),
        None => {
            for &child in &unit.children {
                collect_host_outputs(archive, child, out);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::Document;
    use crate::vnode::{create_element, Child, Component};

    #[test]
    fn host_outputs_descend_through_components() {
        let doc = Document::new();
        let wrapper = Component::new("Wrapper", |props| Ok(props.children().clone()));
        let component = create_element(wrapper, None, Vec::<Child>::new()).unwrap();
        let tag = create_element("p", None, Vec::<Child>::new()).unwrap();

        let first = doc.create_element("p");
        let second = doc.create_element("p");

        let mut archive = vec![WorkUnit::root(component, None)];
        for node in [&first, &second] {
            let mut unit = WorkUnit::child(tag.clone(), None, 0, None, false);
            unit.output = Some(node.clone());
            archive.push(unit);
        }
        archive[0].children.extend([1, 2]);

        let outputs = host_outputs(&archive, 0);
        assert_eq!(outputs.len(), 2);
        assert!(outputs[0].ptr_eq(&first));
        assert!(outputs[1].ptr_eq(&second));
        assert!(host_outputs(&archive, 9).is_empty());
    }
}
