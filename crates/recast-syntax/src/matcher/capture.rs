//! Bindings produced by matching a pattern against a tree.
//!
//! Bound values are the tree's own elements, shared by reference. Templates
//! splice them back in verbatim, so a bound subtree keeps its node ids, its
//! resolved types and its formatting.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::tree::{Element, Node};

/// The value bound to one metavariable.
#[derive(Debug, Clone)]
pub enum Binding {
    /// A single element (`$NAME`).
    Single(Element),
    /// A possibly empty run of sibling elements (`$$$NAME`).
    Multiple(Vec<Element>),
}

impl Binding {
    /// Returns the element of a single binding.
    #[must_use]
    pub const fn as_single(&self) -> Option<&Element> {
        match self {
            Self::Single(element) => Some(element),
            Self::Multiple(_) => None,
        }
    }

    /// Returns the node of a single binding, if it bound a node.
    #[must_use]
    pub fn as_node(&self) -> Option<&Arc<Node>> {
        self.as_single().and_then(Element::as_node)
    }

    /// Returns the elements of a sequence binding.
    #[must_use]
    pub fn as_multiple(&self) -> Option<&[Element]> {
        match self {
            Self::Multiple(elements) => Some(elements),
            Self::Single(_) => None,
        }
    }

    /// Returns the bound source text without its leading space.
    #[must_use]
    pub fn text(&self) -> String {
        match self {
            Self::Single(element) => element.text(),
            Self::Multiple(elements) => {
                let mut out = String::new();
                for element in elements {
                    element.write_source(&mut out);
                }
                let leading = elements.first().map_or(0, |first| first.prefix().len());
                out.split_off(leading)
            }
        }
    }

    fn same_shape(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Single(a), Self::Single(b)) => a.same_shape(b),
            (Self::Multiple(a), Self::Multiple(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(left, right)| left.same_shape(right))
            }
            _ => false,
        }
    }
}

/// Metavariable bindings of one match.
#[derive(Debug, Clone, Default)]
pub struct Bindings {
    inner: BTreeMap<String, Binding>,
}

impl Bindings {
    /// Creates an empty binding set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the binding for `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Binding> {
        self.inner.get(name)
    }

    /// Returns the node bound to `name`, if it is a single node binding.
    #[must_use]
    pub fn node(&self, name: &str) -> Option<&Arc<Node>> {
        self.get(name).and_then(Binding::as_node)
    }

    /// Returns the bound text for `name`.
    #[must_use]
    pub fn text(&self, name: &str) -> Option<String> {
        self.get(name).map(Binding::text)
    }

    /// Binds `name`, replacing any earlier value.
    pub fn insert(&mut self, name: impl Into<String>, binding: Binding) {
        self.inner.insert(name.into(), binding);
    }

    /// Binds a single element, requiring agreement with an earlier binding
    /// of the same name. The wildcard `_` never binds.
    pub fn bind_single(&mut self, name: &str, element: Element) -> bool {
        self.bind_consistent(name, Binding::Single(element))
    }

    /// Binds a run of elements, requiring agreement with an earlier binding
    /// of the same name. The wildcard `_` never binds.
    pub fn bind_multiple(&mut self, name: &str, elements: Vec<Element>) -> bool {
        self.bind_consistent(name, Binding::Multiple(elements))
    }

    fn bind_consistent(&mut self, name: &str, next: Binding) -> bool {
        if name == "_" {
            return true;
        }
        match self.inner.get(name) {
            Some(existing) => existing.same_shape(&next),
            None => {
                self.inner.insert(name.to_owned(), next);
                true
            }
        }
    }

    /// Iterates over bound names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.inner.keys().map(String::as_str)
    }

    /// Returns the number of bound names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Returns `true` if nothing is bound.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}
