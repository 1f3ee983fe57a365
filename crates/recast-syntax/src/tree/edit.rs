//! Structural replacement and node id allocation.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::sync::Arc;

use super::node::Element;
use super::{Node, NodeId, Tree};
use crate::error::TreeError;

/// Hands out node ids and tracks which ones are taken.
pub(super) struct IdAllocator {
    next: u32,
    used: HashSet<NodeId>,
}

impl IdAllocator {
    pub(super) fn starting_after(last: u32) -> Self {
        Self {
            next: last.saturating_add(1),
            used: HashSet::new(),
        }
    }

    pub(super) const fn next(&self) -> u32 {
        self.next
    }

    fn reserve(&mut self, id: NodeId) {
        self.used.insert(id);
        if id.get() >= self.next {
            self.next = id.get().saturating_add(1);
        }
    }

    fn fresh(&mut self) -> NodeId {
        let id = NodeId::new(self.next);
        self.next = self.next.saturating_add(1);
        self.used.insert(id);
        id
    }

    /// Gives fresh ids to unassigned nodes and to nodes whose id is already
    /// taken, returning the original `Arc` when nothing changed.
    pub(super) fn renumber(&mut self, node: &Arc<Node>) -> Arc<Node> {
        let keep = node.id().is_assigned() && !self.used.contains(&node.id());
        let id = if keep {
            self.reserve(node.id());
            node.id()
        } else {
            self.fresh()
        };

        let mut changed = !keep;
        let children = node
            .children()
            .iter()
            .map(|child| match child.element() {
                Element::Node(inner) => {
                    let numbered = self.renumber(inner);
                    changed |= !Arc::ptr_eq(&numbered, inner);
                    child.with_element(numbered)
                }
                Element::Token(_) => child.clone(),
            })
            .collect();

        if changed {
            Arc::new(node.with_children(children).with_id(id))
        } else {
            Arc::clone(node)
        }
    }
}

/// Pushes the nodes below the last entry of `path` that lead to `id`.
pub(super) fn descend_to<'a>(node: &'a Arc<Node>, id: NodeId, path: &mut Vec<&'a Arc<Node>>) -> bool {
    if node.id() == id {
        return true;
    }
    for child in node.child_nodes() {
        path.push(child);
        if descend_to(child, id, path) {
            return true;
        }
        path.pop();
    }
    false
}

fn reserve_outside(node: &Arc<Node>, edits: &BTreeMap<NodeId, Arc<Node>>, ids: &mut IdAllocator) {
    if edits.contains_key(&node.id()) {
        return;
    }
    ids.reserve(node.id());
    for child in node.child_nodes() {
        reserve_outside(child, edits, ids);
    }
}

fn substitute(
    node: &Arc<Node>,
    edits: &BTreeMap<NodeId, Arc<Node>>,
    found: &mut BTreeSet<NodeId>,
) -> Arc<Node> {
    if let Some(replacement) = edits.get(&node.id()) {
        found.insert(node.id());
        return Arc::clone(replacement);
    }

    let mut changed = false;
    let children = node
        .children()
        .iter()
        .map(|child| match child.element() {
            Element::Node(inner) => {
                let next = substitute(inner, edits, found);
                changed |= !Arc::ptr_eq(&next, inner);
                child.with_element(next)
            }
            Element::Token(_) => child.clone(),
        })
        .collect();

    if changed {
        Arc::new(node.with_children(children))
    } else {
        Arc::clone(node)
    }
}

pub(super) fn replace_all(tree: &Tree, edits: &BTreeMap<NodeId, Arc<Node>>) -> Result<Tree, TreeError> {
    let mut ids = IdAllocator::starting_after(tree.next_id.saturating_sub(1));
    reserve_outside(&tree.root, edits, &mut ids);

    let numbered: BTreeMap<NodeId, Arc<Node>> = edits
        .iter()
        .map(|(id, replacement)| (*id, ids.renumber(replacement)))
        .collect();

    let mut found = BTreeSet::new();
    let root = substitute(&tree.root, &numbered, &mut found);
    if let Some(missing) = edits.keys().find(|id| !found.contains(id)) {
        return Err(TreeError::UnknownNode { id: *missing });
    }

    Ok(Tree {
        root,
        eof: tree.eof.clone(),
        next_id: ids.next(),
    })
}
