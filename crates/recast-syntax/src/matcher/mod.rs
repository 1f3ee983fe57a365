//! Structural matching over syntax trees.
//!
//! [`Pattern`] matching compares a parsed fragment with tree nodes and
//! yields [`Bindings`]. [`Predicate`]s compose patterns with kind, ancestry
//! and type tests, evaluated against a [`NodeRef`] with three-valued
//! [`Verdict`]s.

mod capture;
mod matching;
mod predicate;

use std::sync::Arc;

use recast_core::Span;

use crate::pattern::Pattern;
use crate::source_map::SourceMap;
use crate::tree::{Node, NodeId, Tree};

pub use capture::{Binding, Bindings};
pub(crate) use matching::elements_match;
pub use predicate::{NodeRef, Predicate, Quantifier, TextTest, TypeTest, Verdict};

/// Result of a successful pattern match.
#[derive(Debug, Clone)]
pub struct MatchResult {
    node: Arc<Node>,
    bindings: Bindings,
}

impl MatchResult {
    /// Creates a match result.
    #[must_use]
    pub const fn new(node: Arc<Node>, bindings: Bindings) -> Self {
        Self { node, bindings }
    }

    /// Returns the matched node.
    #[must_use]
    pub const fn node(&self) -> &Arc<Node> {
        &self.node
    }

    /// Returns the identity of the matched node.
    #[must_use]
    pub fn id(&self) -> NodeId {
        self.node.id()
    }

    /// Returns the text of the matched node without its leading space.
    #[must_use]
    pub fn text(&self) -> String {
        self.node.text()
    }

    /// Returns the location of the match in the source `map` was built from.
    #[must_use]
    pub fn span(&self, map: &SourceMap) -> Option<Span> {
        map.span(self.node.id())
    }

    /// Gets a captured metavariable by name.
    #[must_use]
    pub fn capture(&self, name: &str) -> Option<&Binding> {
        self.bindings.get(name)
    }

    /// Returns all captured metavariables.
    #[must_use]
    pub const fn bindings(&self) -> &Bindings {
        &self.bindings
    }

    /// Consumes the result, returning its bindings.
    #[must_use]
    pub fn into_bindings(self) -> Bindings {
        self.bindings
    }
}

/// Pattern matcher that finds occurrences in a tree.
#[derive(Debug, Clone, Copy)]
pub struct Matcher<'p> {
    pattern: &'p Pattern,
}

impl<'p> Matcher<'p> {
    /// Creates a new matcher for the given pattern.
    #[must_use]
    pub const fn new(pattern: &'p Pattern) -> Self {
        Self { pattern }
    }

    /// Finds all matches in pre-order, outer matches before inner ones.
    #[must_use]
    pub fn find_all(&self, tree: &Tree) -> Vec<MatchResult> {
        tree.preorder()
            .filter_map(|node| {
                self.pattern
                    .matches(node)
                    .map(|bindings| MatchResult::new(Arc::clone(node), bindings))
            })
            .collect()
    }

    /// Finds the first match in pre-order.
    #[must_use]
    pub fn find_first(&self, tree: &Tree) -> Option<MatchResult> {
        tree.preorder().find_map(|node| {
            self.pattern
                .matches(node)
                .map(|bindings| MatchResult::new(Arc::clone(node), bindings))
        })
    }
}

impl Pattern {
    /// Finds all matches of this pattern in the tree.
    #[must_use]
    pub fn find_all(&self, tree: &Tree) -> Vec<MatchResult> {
        Matcher::new(self).find_all(tree)
    }

    /// Finds the first match of this pattern in the tree.
    #[must_use]
    pub fn find_first(&self, tree: &Tree) -> Option<MatchResult> {
        Matcher::new(self).find_first(tree)
    }
}

#[cfg(test)]
mod tests;
