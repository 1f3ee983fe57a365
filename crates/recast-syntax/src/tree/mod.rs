//! The immutable, lossless syntax tree.
//!
//! A [`Tree`] owns one compilation unit. Every byte of the source lives in
//! exactly one [`Token`]: the token's `prefix` holds the whitespace and
//! comments that precede it, and its `text` holds the lexeme. Printing the
//! tree concatenates prefixes and texts in order, followed by the unit's
//! end-of-file space, which reproduces the parsed source byte for byte.
//!
//! Nodes are shared behind [`Arc`]. Edits never mutate a node; the `with_*`
//! methods return a new node that shares every unchanged child with the
//! original.

mod edit;
mod node;

use std::fmt;
use std::sync::Arc;

pub use node::{Child, Element, Node, Preorder, Token};

/// A stable node identity, unrelated to content.
///
/// Ids are unique within a tree and are preserved when a node is carried
/// into a later snapshot. Nodes built by templates start out
/// [`NodeId::UNASSIGNED`] and receive a fresh id when spliced into a tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(u32);

impl NodeId {
    /// The id carried by nodes that have not been placed in a tree yet.
    pub const UNASSIGNED: Self = Self(0);

    /// Wraps a raw id value.
    #[must_use]
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Returns the raw id value.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }

    /// Returns `true` once the node has been placed in a tree.
    #[must_use]
    pub const fn is_assigned(self) -> bool {
        self.0 != 0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One parsed compilation unit.
#[derive(Debug, Clone)]
pub struct Tree {
    root: Arc<Node>,
    eof: String,
    next_id: u32,
}

impl Tree {
    /// Builds a tree, assigning fresh ids to unassigned or duplicated nodes.
    #[must_use]
    pub fn new(root: Node, eof: impl Into<String>) -> Self {
        let mut allocator = edit::IdAllocator::starting_after(0);
        let numbered = allocator.renumber(&Arc::new(root));
        Self {
            root: numbered,
            eof: eof.into(),
            next_id: allocator.next(),
        }
    }

    /// Returns the root node.
    #[must_use]
    pub const fn root(&self) -> &Arc<Node> {
        &self.root
    }

    /// Returns the whitespace and comments after the last token.
    #[must_use]
    pub fn eof(&self) -> &str {
        &self.eof
    }

    /// Prints the tree back to source text.
    #[must_use]
    pub fn print(&self) -> String {
        let mut out = String::new();
        self.root.write_source(&mut out);
        out.push_str(&self.eof);
        out
    }

    /// Iterates over every node in pre-order.
    #[must_use]
    pub fn preorder(&self) -> Preorder<'_> {
        Preorder::new(&self.root)
    }

    /// Finds the node with the given id.
    #[must_use]
    pub fn find(&self, id: NodeId) -> Option<&Arc<Node>> {
        self.preorder().find(|node| node.id() == id)
    }

    /// Returns the chain of nodes from the root down to `id`, inclusive.
    #[must_use]
    pub fn path_to(&self, id: NodeId) -> Option<Vec<&Arc<Node>>> {
        let mut path = vec![&self.root];
        edit::descend_to(&self.root, id, &mut path).then_some(path)
    }

    /// Returns a new tree with the subtree `id` swapped for `replacement`.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::UnknownNode`](crate::TreeError::UnknownNode) if
    /// the tree does not contain `id`.
    pub fn replace(&self, id: NodeId, replacement: Arc<Node>) -> Result<Self, crate::TreeError> {
        let mut edits = std::collections::BTreeMap::new();
        edits.insert(id, replacement);
        self.replace_all(&edits)
    }

    /// Returns a new tree with several disjoint subtrees swapped at once.
    ///
    /// Ancestors of the replaced subtrees are rebuilt; every other node is
    /// shared with `self`. Replacement nodes that are unassigned, or whose id
    /// already appears elsewhere in the result, receive fresh ids.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::UnknownNode`](crate::TreeError::UnknownNode) for
    /// the first id that is not reachable, including ids nested inside
    /// another replaced subtree.
    pub fn replace_all(
        &self,
        edits: &std::collections::BTreeMap<NodeId, Arc<Node>>,
    ) -> Result<Self, crate::TreeError> {
        edit::replace_all(self, edits)
    }

    /// Returns a tree sharing this tree's id allocator with a new root.
    ///
    /// The caller guarantees that `root` keeps the ids of the current root.
    pub(crate) fn with_root(&self, root: Arc<Node>) -> Self {
        Self {
            root,
            eof: self.eof.clone(),
            next_id: self.next_id,
        }
    }
}

#[cfg(test)]
mod tests;
