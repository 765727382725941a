//! Reconciler
//!
//! The cooperative work loop that turns a queue of work units into output
//! nodes.
//!
//! # Algorithm
//!
//! Each burst:
//!
//! 1. While units are pending and the deadline reports at least
//!    `min_remaining`, pop the front unit and process it:
//!    - Component: call it with its props. It creates no node; its rendered
//!      children inherit its parent output node.
//!    - Tag or text: find the counterpart from the previous pass. Same type:
//!      reuse its node and diff props. Otherwise: create a node, mount its
//!      props, and attach it under the parent output node (or record it as a
//!      produced root at the top level).
//!    - Append the unit's children to the back of the queue.
//!    - Archive the unit.
//! 2. If units remain, suspend; the caller asks the host for another burst.
//! 3. Otherwise commit: attach the produced roots to the mount target and
//!    rotate the archive into the previous snapshot.
//!
//! The queue is FIFO, so units are processed level by level across the whole
//! tree, and suspending between bursts never reorders it.

use std::collections::{HashMap, HashSet, VecDeque};

use super::diff::{diff_props, mount_props};
use super::state::{Phase, ScheduleState};
use super::unit::{host_outputs, UnitIndex, WorkUnit};
use crate::config::{ChildMatching, SchedulerConfig};
use crate::dom::{Document, Node};
use crate::error::{Error, Result};
use crate::host::Deadline;
use crate::vnode::{Children, Key, Kind, Props, VNode};

/// Outcome of one burst.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopStatus {
    /// There was nothing to do.
    Idle,

    /// The budget ran out with units still pending.
    Suspended,

    /// The queue drained and the pass was committed.
    Committed,
}

/// Run one burst of the work loop over `state`.
///
/// On error the in-flight pass is dropped and `state` is back to idle with
/// its previous snapshot intact.
///
/// # Errors
///
/// - [`Error::ComponentRenderFailure`] if a component fails.
/// - [`Error::MissingMountTarget`] if the pass produced nodes but the mount
///   target is gone.
pub fn work_loop(
    state: &mut ScheduleState,
    deadline: &dyn Deadline,
    config: &SchedulerConfig,
) -> Result<LoopStatus> {
    if state.detached {
        if !state.is_idle() {
            tracing::debug!(mount = %state.mount_id, "root unmounted, abandoning pass");
            state.abort();
        }
        return Ok(LoopStatus::Idle);
    }
    if state.is_idle() {
        return Ok(LoopStatus::Idle);
    }

    match drain(state, deadline, config) {
        Ok(status) => Ok(status),
        Err(err) => {
            tracing::warn!(mount = %state.mount_id, error = %err, "reconciliation pass aborted");
            state.abort();
            Err(err)
        }
    }
}

fn drain(
    state: &mut ScheduleState,
    deadline: &dyn Deadline,
    config: &SchedulerConfig,
) -> Result<LoopStatus> {
    state.phase = Phase::Draining;
    let min_remaining = config.min_remaining();
    let mut processed = 0_usize;

    // At least one unit per burst, so a slice shorter than the margin
    // still moves the pass forward.
    while !state.pending.is_empty() {
        if deadline.time_remaining() < min_remaining && processed > 0 {
            break;
        }
        let Some(unit) = state.pending.pop_front() else {
            break;
        };
        process_unit(state, unit, config.matching)?;
        processed += 1;
    }

    if !state.pending.is_empty() {
        state.phase = Phase::Suspended;
        tracing::debug!(
            mount = %state.mount_id,
            processed,
            pending = state.pending.len(),
            "budget exhausted, suspending"
        );
        return Ok(LoopStatus::Suspended);
    }

    commit(state)?;
    Ok(LoopStatus::Committed)
}

/// Process one work unit and archive it.
fn process_unit(state: &mut ScheduleState, mut unit: WorkUnit, matching: ChildMatching) -> Result<()> {
    let index = state.archive.len();
    let counterpart = match matching {
        ChildMatching::Positional => (index < state.previous.len()).then_some(index),
        ChildMatching::Keyed => unit.previous,
    };
    let vnode = unit.vnode.clone();
    tracing::trace!(unit = index, kind = vnode.kind().name(), ?counterpart, "processing unit");

    // Components render in place; their output hangs off the parent's node.

    let (children, child_parent, matched) = match vnode.kind() {
        Kind::Component(component) => {
            let rendered = component.render(vnode.props()).map_err(|source| {
                Error::ComponentRenderFailure {
                    component: component.name().to_owned(),
                    source,
                }
            })?;
            let matched = counterpart.filter(|&p| state.previous[p].vnode.same_type(&vnode));
            // A different component under the same key leaves its old output behind.
            if matching == ChildMatching::Keyed && matched.is_none() {
                if let Some(stale) = counterpart {
                    detach_all(&host_outputs(&state.previous, stale));
                }
            }
            (rendered, unit.parent_output.clone(), matched)
        }
        Kind::Tag(_) | Kind::Text => {
            // Same type as the counterpart: keep its node and diff props.
            let reused = counterpart.and_then(|p| {
                let previous = &state.previous[p];
                if previous.vnode.same_type(&vnode) {
                    previous.output.clone().map(|node| (p, node))
                } else {
                    None
                }
            });

            let node = match &reused {
                Some((p, node)) => {
                    diff_props(node, state.previous[*p].vnode.props(), vnode.props());
                    match &unit.parent_output {
                        Some(parent) => {
                            let moved = !node.parent().is_some_and(|p| p.ptr_eq(parent));
                            if unit.reorder || moved {
                                parent.append_child(node);
                            }
                        }
                        // Cleared from the mount target since the last pass.
                        None if node.parent().is_none() => state.produced_roots.push(node.clone()),
                        None => {}
                    }
                    node.clone()
                }
                // No usable counterpart: create a fresh node.
                None => {
                    let tag = match vnode.kind() {
                        Kind::Tag(tag) => Some(&**tag),
                        _ => None,
                    };
                    let node = materialize(&state.document, tag, vnode.props());
                    place(state, &unit, counterpart, &node, matching);
                    node
                }
            };

            unit.output = Some(node.clone());
            (vnode.children().clone(), Some(node), reused.map(|(p, _)| p))
        }
    };

    expand(state, index, &children, child_parent, matched, matching);

    // Link into the parent's child list before archiving.
    if let Some(parent) = unit.parent_unit {
        if let Some(parent) = state.archive.get_mut(parent) {
            parent.children.push(index);
        }
    }
    state.archive.push(unit);
    Ok(())
}

/// Create a node for a tag (or text, when `tag` is `None`) and mount props.
fn materialize(document: &Document, tag: Option<&str>, props: &Props) -> Node {
    let node = match tag {
        Some(tag) => document.create_element(tag),
        None => document.create_text(""),
    };
    mount_props(&node, props);
    node
}

/// Attach a freshly created node.
fn place(
    state: &mut ScheduleState,
    unit: &WorkUnit,
    counterpart: Option<UnitIndex>,
    node: &Node,
    matching: ChildMatching,
) {
    let Some(parent) = &unit.parent_output else {
        // Top level: attached to the mount target at commit.
        state.produced_roots.push(node.clone());
        return;
    };

    if matching == ChildMatching::Positional {
        parent.append_child(node);
        return;
    }

    let stale = counterpart
        .map(|p| host_outputs(&state.previous, p))
        .unwrap_or_default();
    match stale.as_slice() {
        [old] if !unit.reorder && old.parent().is_some_and(|p| p.ptr_eq(parent)) => {
            parent.replace_child(old, node);
        }
        _ => {
            detach_all(&stale);
            parent.append_child(node);
        }
    }
}

/// Queue a processed unit's children.
fn expand(
    state: &mut ScheduleState,
    index: UnitIndex,
    children: &Children,
    parent_output: Option<Node>,
    matched: Option<UnitIndex>,
    matching: ChildMatching,
) {
    if children.is_empty() && (matching == ChildMatching::Positional || matched.is_none()) {
        return;
    }

    match matching {
        ChildMatching::Positional => {
            for child in children {
                state.pending.push_back(WorkUnit::child(
                    child.clone(),
                    parent_output.clone(),
                    index,
                    None,
                    false,
                ));
            }
        }
        ChildMatching::Keyed => {
            let previous_children = matched
                .map(|p| state.previous[p].children.as_slice())
                .unwrap_or_default();
            let plan = match_children(&state.previous, previous_children, children.as_slice());

            for stale in &plan.unmatched {
                detach_all(&host_outputs(&state.previous, *stale));
            }
            for (child, previous) in children.iter().zip(plan.matched) {
                state.pending.push_back(WorkUnit::child(
                    child.clone(),
                    parent_output.clone(),
                    index,
                    previous,
                    plan.reorder,
                ));
            }
        }
    }
}

/// Pairing of new children with the previous pass's siblings.
#[derive(Debug, Default, PartialEq, Eq)]
struct ChildPlan {
    /// Counterpart of each new child, in order.
    matched: Vec<Option<UnitIndex>>,
    /// Previous siblings nothing paired with.
    unmatched: Vec<UnitIndex>,
    /// Reused nodes are out of order, or new nodes precede reused ones.
    reorder: bool,
}

fn match_children(previous: &[WorkUnit], siblings: &[UnitIndex], children: &[VNode]) -> ChildPlan {
    let mut keyed: HashMap<&Key, UnitIndex> = HashMap::new();
    let mut unkeyed: VecDeque<UnitIndex> = VecDeque::new();
    for &sibling in siblings {
        match previous[sibling].vnode.key() {
            Some(key) => {
                keyed.insert(key, sibling);
            }
            None => unkeyed.push_back(sibling),
        }
    }

    let matched: Vec<Option<UnitIndex>> = children
        .iter()
        .map(|child| match child.key() {
            Some(key) => keyed.remove(key),
            None => unkeyed.pop_front(),
        })
        .collect();

    let used: HashSet<UnitIndex> = matched.iter().flatten().copied().collect();
    let unmatched = siblings
        .iter()
        .copied()
        .filter(|sibling| !used.contains(sibling))
        .collect();

    let mut reorder = false;
    let mut last: Option<UnitIndex> = None;
    let mut seen_new = false;
    for pairing in &matched {
        match *pairing {
            Some(sibling) => {
                if seen_new || last.is_some_and(|last| last > sibling) {
                    reorder = true;
                }
                last = Some(sibling);
            }
            None => seen_new = true,
        }
    }

    ChildPlan {
        matched,
        unmatched,
        reorder,
    }
}

fn detach_all(nodes: &[Node]) {
    for node in nodes {
        node.detach();
    }
}

/// Swap the pass's top-level nodes into the mount target and rotate the archive.
fn commit(state: &mut ScheduleState) -> Result<()> {
    state.phase = Phase::Committing;

    let mount = state.mount.upgrade();
    if mount.is_none() && !state.produced_roots.is_empty() {
        return Err(Error::MissingMountTarget(state.mount_id));
    }

    if let Some(mount) = mount {
        // Top-level nodes of the previous pass that this pass no longer
        // produces, including passes that produced nothing new.
        if !state.previous.is_empty() {
            let kept = host_outputs(&state.archive, 0);
            for old in host_outputs(&state.previous, 0) {
                let replaced = !kept.iter().any(|node| node.ptr_eq(&old));
                if replaced && old.parent().is_some_and(|p| p.ptr_eq(&mount)) {
                    mount.remove_child(&old);
                }
            }
        }

        for root in &state.produced_roots {
            mount.append_child(root);
        }
    }

    tracing::debug!(
        mount = %state.mount_id,
        units = state.archive.len(),
        roots = state.produced_roots.len(),
        "pass committed"
    );
    state.finish();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::Mutation;
    use crate::host::{UnitBudget, Unbounded};
    use crate::vnode::{create_element, text, Child, Component, RawProps};
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    fn el(tag: &'static str, props: RawProps, children: Vec<Child>) -> VNode {
        create_element(tag, Some(props), children).unwrap()
    }

    fn id(value: &str) -> RawProps {
        RawProps::new().attr("id", value)
    }

    fn setup() -> (Document, Node, ScheduleState) {
        let doc = Document::with_journal();
        let mount = doc.create_element("main");
        let state = ScheduleState::new(&mount);
        (doc, mount, state)
    }

    fn run_to_completion(state: &mut ScheduleState, config: &SchedulerConfig) {
        assert_eq!(
            work_loop(state, &Unbounded, config).unwrap(),
            LoopStatus::Committed
        );
    }

    fn run_one_unit_per_burst(state: &mut ScheduleState, config: &SchedulerConfig) -> usize {
        let mut bursts = 0;
        loop {
            bursts += 1;
            match work_loop(state, &UnitBudget::new(1), config).unwrap() {
                LoopStatus::Suspended => continue,
                LoopStatus::Committed => return bursts,
                LoopStatus::Idle => panic!("loop went idle without committing"),
            }
        }
    }

    fn three_levels() -> VNode {
        el(
            "root",
            RawProps::new(),
            vec![
                el(
                    "a",
                    RawProps::new(),
                    vec![el("a1", RawProps::new(), vec![]).into(), el("a2", RawProps::new(), vec![]).into()],
                )
                .into(),
                el(
                    "b",
                    RawProps::new(),
                    vec![el("b1", RawProps::new(), vec![]).into(), el("b2", RawProps::new(), vec![]).into()],
                )
                .into(),
            ],
        )
    }

    fn created_tags(doc: &Document) -> Vec<String> {
        doc.mutations()
            .into_iter()
            .filter_map(|m| match m {
                Mutation::CreateElement { tag, .. } => Some(tag),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn renders_element_with_text_child() {
        let (_doc, mount, mut state) = setup();
        state.seed(el("div", id("x"), vec!["hello".into()]), true);

        run_to_completion(&mut state, &SchedulerConfig::default());

        assert!(state.is_idle());
        assert_eq!(mount.child_count(), 1);
        let div = &mount.children()[0];
        assert_eq!(div.tag(), Some("div"));
        assert_eq!(div.attribute("id"), Some("x".into()));
        let children = div.children();
        assert_eq!(children.len(), 1);
        assert!(children[0].is_text());
        assert_eq!(children[0].text(), "hello");
    }

    #[test]
    fn creation_follows_level_order() {
        let (doc, mount, mut state) = setup();
        state.seed(three_levels(), true);

        let bursts = run_one_unit_per_burst(&mut state, &SchedulerConfig::default());

        assert_eq!(bursts, 7);
        assert_eq!(created_tags(&doc), ["main", "root", "a", "b", "a1", "a2", "b1", "b2"]);
        assert_eq!(
            mount.to_markup(),
            "<main><root><a><a1></a1><a2></a2></a><b><b1></b1><b2></b2></b></root></main>"
        );
    }

    #[test]
    fn nothing_is_committed_until_the_queue_drains() {
        let (_doc, mount, mut state) = setup();
        state.seed(three_levels(), true);
        let config = SchedulerConfig::default();

        assert_eq!(
            work_loop(&mut state, &UnitBudget::new(3), &config).unwrap(),
            LoopStatus::Suspended
        );
        assert_eq!(state.phase(), Phase::Suspended);
        assert_eq!(mount.child_count(), 0);
        assert_eq!(state.archived_len(), 3);
        assert_eq!(state.pending_len(), 4);
    }

    #[test]
    fn interrupted_and_uninterrupted_passes_agree() {
        let config = SchedulerConfig::default();

        let (_doc, fast_mount, mut fast) = setup();
        fast.seed(three_levels(), true);
        run_to_completion(&mut fast, &config);

        let (_doc, slow_mount, mut slow) = setup();
        slow.seed(three_levels(), true);
        for budget in [2, 0, 1] {
            assert_eq!(
                work_loop(&mut slow, &UnitBudget::new(budget), &config).unwrap(),
                LoopStatus::Suspended
            );
        }
        assert_eq!(slow.archived_len(), 4);
        run_one_unit_per_burst(&mut slow, &config);

        assert_eq!(fast_mount.to_markup(), slow_mount.to_markup());
    }

    #[test]
    fn exhausted_deadline_still_processes_one_unit() {
        let (_doc, mount, mut state) = setup();
        state.seed(three_levels(), true);
        let config = SchedulerConfig::default();

        let mut bursts = 0;
        loop {
            bursts += 1;
            assert!(bursts <= 7, "pass made no progress");
            let before = state.archived_len();
            match work_loop(&mut state, &UnitBudget::new(0), &config).unwrap() {
                LoopStatus::Suspended => assert_eq!(state.archived_len(), before + 1),
                LoopStatus::Committed => break,
                LoopStatus::Idle => panic!("loop went idle without committing"),
            }
        }

        assert_eq!(bursts, 7);
        assert_eq!(
            mount.to_markup(),
            "<main><root><a><a1></a1><a2></a2></a><b><b1></b1><b2></b2></b></root></main>"
        );
    }

    #[test]
    fn components_are_transparent() {
        let (_doc, mount, mut state) = setup();
        let c = Component::new("C", |props| {
            let label = props.str("text").unwrap_or_default().to_owned();
            Ok(create_element("span", None, [label])?.into())
        });
        let tree = el(
            "section",
            RawProps::new(),
            vec![create_element(c, Some(RawProps::new().attr("text", "hi")), Vec::<Child>::new())
                .unwrap()
                .into()],
        );
        state.seed(tree, true);

        run_to_completion(&mut state, &SchedulerConfig::default());

        let section = &mount.children()[0];
        let span = &section.children()[0];
        assert_eq!(span.tag(), Some("span"));
        assert!(span.parent().is_some_and(|p| p.ptr_eq(section)));
        assert_eq!(mount.to_markup(), "<main><section><span>hi</span></section></main>");
    }

    #[test]
    fn component_at_the_root_commits_every_rendered_node() {
        let (_doc, mount, mut state) = setup();
        let pair = Component::new("Pair", |_| Ok(vec![text("a"), text("b")].into()));
        state.seed(create_element(pair, None, Vec::<Child>::new()).unwrap(), true);

        run_to_completion(&mut state, &SchedulerConfig::default());

        assert_eq!(mount.to_markup(), "<main>ab</main>");
    }

    #[test]
    fn dropped_top_level_output_leaves_the_mount_without_new_roots() {
        let config = SchedulerConfig::default();
        let (_doc, mount, mut state) = setup();
        let short = Arc::new(AtomicBool::new(false));
        let flag = short.clone();
        let list = Component::new("List", move |_| {
            if flag.load(Ordering::SeqCst) {
                Ok(vec![text("a")].into())
            } else {
                Ok(vec![text("a"), text("b")].into())
            }
        });
        let root = create_element(list, None, Vec::<Child>::new()).unwrap();
        state.seed(root.clone(), true);
        run_to_completion(&mut state, &config);
        assert_eq!(mount.to_markup(), "<main>ab</main>");
        let kept = mount.children()[0].clone();

        short.store(true, Ordering::SeqCst);
        state.seed(root, false);
        run_to_completion(&mut state, &config);

        assert_eq!(mount.to_markup(), "<main>a</main>");
        assert!(mount.children()[0].ptr_eq(&kept));
    }

    #[test]
    fn second_pass_over_same_tree_writes_no_props() {
        for matching in [ChildMatching::Positional, ChildMatching::Keyed] {
            let config = SchedulerConfig::default().with_matching(matching);
            let (doc, mount, mut state) = setup();
            let tree = el(
                "div",
                id("x").on("onClick", |_| {}),
                vec!["hello".into(), el("p", id("y"), vec![]).into()],
            );
            state.seed(tree.clone(), true);
            run_to_completion(&mut state, &config);
            doc.take_mutations();

            state.seed(tree, false);
            run_to_completion(&mut state, &config);

            assert!(doc.take_mutations().is_empty(), "{matching:?} wrote to the tree");
            assert_eq!(mount.child_count(), 1);
        }
    }

    #[test]
    fn update_diffs_changed_props_in_place() {
        let config = SchedulerConfig::default();
        let (doc, mount, mut state) = setup();
        state.seed(el("div", RawProps::new().attr("a", 1).attr("b", 2), vec![]), true);
        run_to_completion(&mut state, &config);
        let div = mount.children()[0].clone();
        doc.take_mutations();

        state.seed(el("div", RawProps::new().attr("a", 1).attr("c", 3), vec![]), false);
        run_to_completion(&mut state, &config);

        let writes: Vec<_> = doc.take_mutations().into_iter().filter(Mutation::is_prop_write).collect();
        assert_eq!(writes.len(), 2);
        assert!(mount.children()[0].ptr_eq(&div));
        assert_eq!(div.to_markup(), "<div a=\"1\" c=\"3\"></div>");
    }

    #[test]
    fn failing_component_resets_to_idle() {
        let config = SchedulerConfig::default();
        let (_doc, mount, mut state) = setup();
        state.seed(el("div", id("x"), vec![]), true);
        run_to_completion(&mut state, &config);

        let broken = Component::new("Broken", |_| Err("boom".into()));
        let tree = el(
            "div",
            id("x"),
            vec![create_element(broken, None, Vec::<Child>::new()).unwrap().into()],
        );
        state.seed(tree, false);
        let err = work_loop(&mut state, &Unbounded, &config).unwrap_err();

        assert!(matches!(err, Error::ComponentRenderFailure { ref component, .. } if component == "Broken"));
        assert!(state.is_idle());
        assert_eq!(state.pending_len(), 0);
        assert_eq!(state.archived_len(), 0);
        assert_eq!(state.previous_len(), 1);
        assert_eq!(mount.child_count(), 1);
    }

    #[test]
    fn dropped_mount_target_fails_commit() {
        let config = SchedulerConfig::default();
        let (_doc, mount, mut state) = setup();
        state.seed(el("div", RawProps::new(), vec![]), true);
        drop(mount);

        let err = work_loop(&mut state, &Unbounded, &config).unwrap_err();

        assert!(matches!(err, Error::MissingMountTarget(mount_id) if mount_id == state.mount_id()));
        assert!(state.is_idle());
    }

    #[test]
    fn detached_state_abandons_pass() {
        let config = SchedulerConfig::default();
        let (_doc, mount, mut state) = setup();
        state.seed(three_levels(), true);
        work_loop(&mut state, &UnitBudget::new(1), &config).unwrap();

        state.detached = true;
        assert_eq!(work_loop(&mut state, &Unbounded, &config).unwrap(), LoopStatus::Idle);
        assert!(state.is_idle());
        assert_eq!(mount.child_count(), 0);
    }

    #[test]
    fn root_type_change_replaces_committed_root() {
        let config = SchedulerConfig::default();
        let (_doc, mount, mut state) = setup();
        state.seed(el("div", RawProps::new(), vec!["a".into()]), true);
        run_to_completion(&mut state, &config);

        state.seed(el("section", RawProps::new(), vec!["a".into()]), false);
        run_to_completion(&mut state, &config);

        assert_eq!(mount.to_markup(), "<main><section>a</section></main>");
    }

    #[test]
    fn positional_type_change_leaves_stale_sibling() {
        let config = SchedulerConfig::default();
        let (_doc, mount, mut state) = setup();
        state.seed(el("ul", RawProps::new(), vec![el("li", RawProps::new(), vec![]).into()]), true);
        run_to_completion(&mut state, &config);

        state.seed(el("ul", RawProps::new(), vec![el("p", RawProps::new(), vec![]).into()]), false);
        run_to_completion(&mut state, &config);

        assert_eq!(mount.to_markup(), "<main><ul><li></li><p></p></ul></main>");
    }

    fn list(keys: &[&'static str]) -> VNode {
        let items: Vec<Child> = keys
            .iter()
            .map(|key| el("li", RawProps::new().key(*key), vec![(*key).into()]).into())
            .collect();
        el("ul", RawProps::new(), items)
    }

    fn keyed() -> SchedulerConfig {
        SchedulerConfig::default().with_matching(ChildMatching::Keyed)
    }

    #[test]
    fn keyed_reorder_moves_existing_nodes() {
        let config = keyed();
        let (doc, mount, mut state) = setup();
        state.seed(list(&["a", "b", "c"]), true);
        run_to_completion(&mut state, &config);
        let before: Vec<_> = mount.children()[0].children();
        doc.take_mutations();

        state.seed(list(&["c", "a", "b"]), false);
        run_to_completion(&mut state, &config);

        assert_eq!(mount.to_markup(), "<main><ul><li>c</li><li>a</li><li>b</li></ul></main>");
        let after = mount.children()[0].children();
        assert!(after[0].ptr_eq(&before[2]));
        assert!(after[1].ptr_eq(&before[0]));
        assert!(doc.mutations().iter().all(|m| !m.is_creation()));
    }

    #[test]
    fn keyed_removal_detaches_unmatched_siblings() {
        let config = keyed();
        let (_doc, mount, mut state) = setup();
        state.seed(list(&["a", "b", "c"]), true);
        run_to_completion(&mut state, &config);

        state.seed(list(&["a", "c"]), false);
        run_to_completion(&mut state, &config);

        assert_eq!(mount.to_markup(), "<main><ul><li>a</li><li>c</li></ul></main>");
    }

    #[test]
    fn keyed_insertion_lands_in_place() {
        let config = keyed();
        let (_doc, mount, mut state) = setup();
        state.seed(list(&["a", "c"]), true);
        run_to_completion(&mut state, &config);

        state.seed(list(&["a", "b", "c"]), false);
        run_to_completion(&mut state, &config);

        assert_eq!(
            mount.to_markup(),
            "<main><ul><li>a</li><li>b</li><li>c</li></ul></main>"
        );
    }

    #[test]
    fn keyed_type_change_replaces_in_place() {
        let config = keyed();
        let (_doc, mount, mut state) = setup();
        let tree = |middle: &'static str| {
            el(
                "div",
                RawProps::new(),
                vec![
                    el("b", RawProps::new(), vec![]).into(),
                    el(middle, RawProps::new(), vec![]).into(),
                    el("i", RawProps::new(), vec![]).into(),
                ],
            )
        };
        state.seed(tree("span"), true);
        run_to_completion(&mut state, &config);

        state.seed(tree("em"), false);
        run_to_completion(&mut state, &config);

        assert_eq!(mount.to_markup(), "<main><div><b></b><em></em><i></i></div></main>");
    }

    #[test]
    fn keyed_component_swap_detaches_old_output() {
        let config = keyed();
        let (_doc, mount, mut state) = setup();
        let banner = Component::new("Banner", |_| Ok(create_element("h1", None, ["hi"])?.into()));
        state.seed(
            el(
                "div",
                RawProps::new(),
                vec![create_element(banner, None, Vec::<Child>::new()).unwrap().into()],
            ),
            true,
        );
        run_to_completion(&mut state, &config);

        state.seed(el("div", RawProps::new(), vec![el("p", RawProps::new(), vec![]).into()]), false);
        run_to_completion(&mut state, &config);

        assert_eq!(mount.to_markup(), "<main><div><p></p></div></main>");
    }

    #[test]
    fn components_rerun_on_every_pass() {
        let config = SchedulerConfig::default();
        let (_doc, mount, mut state) = setup();
        let flag = Arc::new(AtomicBool::new(false));
        let flag_clone = flag.clone();
        let toggle = Component::new("Toggle", move |_| {
            let label = if flag_clone.load(Ordering::SeqCst) { "on" } else { "off" };
            Ok(text(label).into())
        });
        let tree = el(
            "p",
            RawProps::new(),
            vec![create_element(toggle, None, Vec::<Child>::new()).unwrap().into()],
        );
        state.seed(tree.clone(), true);
        run_to_completion(&mut state, &config);
        assert_eq!(mount.to_markup(), "<main><p>off</p></main>");

        flag.store(true, Ordering::SeqCst);
        state.seed(tree, false);
        run_to_completion(&mut state, &config);
        assert_eq!(mount.to_markup(), "<main><p>on</p></main>");
    }

    #[test]
    fn match_children_pairs_keys_then_order() {
        let (_doc, _mount, mut state) = setup();
        state.seed(
            el(
                "ul",
                RawProps::new(),
                vec![
                    el("li", RawProps::new().key("x"), vec![]).into(),
                    el("li", RawProps::new(), vec![]).into(),
                    el("li", RawProps::new().key("y"), vec![]).into(),
                ],
            ),
            true,
        );
        run_to_completion(&mut state, &keyed());
        let siblings = state.previous[0].children.clone();

        let next = [
            el("li", RawProps::new().key("y"), vec![]),
            el("li", RawProps::new(), vec![]),
            el("li", RawProps::new().key("z"), vec![]),
        ];
        let plan = match_children(&state.previous, &siblings, &next);

        assert_eq!(plan.matched, vec![Some(siblings[2]), Some(siblings[1]), None]);
        assert_eq!(plan.unmatched, vec![siblings[0]]);
        assert!(plan.reorder);
    }
}
