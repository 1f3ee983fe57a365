//! Tokens, nodes and the elements that connect them.

use std::sync::Arc;

use super::NodeId;
use crate::kind::SyntaxKind;
use crate::types::TypeDescriptor;

/// A lexeme together with the space that precedes it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    prefix: String,
    text: String,
    synthetic: bool,
}

impl Token {
    /// Creates a token taken from parsed source.
    #[must_use]
    pub fn new(prefix: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            text: text.into(),
            synthetic: false,
        }
    }

    /// Creates a token produced by a template whose prefix is still written
    /// relative to the template rather than to its destination.
    #[must_use]
    pub fn synthetic(prefix: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            text: text.into(),
            synthetic: true,
        }
    }

    /// Returns the whitespace and comments before the lexeme.
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Returns the lexeme.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Returns `true` if the prefix has not been reconciled yet.
    #[must_use]
    pub const fn is_synthetic(&self) -> bool {
        self.synthetic
    }

    /// Returns a copy with a different prefix.
    #[must_use]
    pub fn with_prefix(&self, prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            text: self.text.clone(),
            synthetic: self.synthetic,
        }
    }

    /// Returns a copy with a different lexeme.
    #[must_use]
    pub fn with_text(&self, text: impl Into<String>) -> Self {
        Self {
            prefix: self.prefix.clone(),
            text: text.into(),
            synthetic: self.synthetic,
        }
    }

    pub(crate) fn reconciled(&self, prefix: String) -> Self {
        Self {
            prefix,
            text: self.text.clone(),
            synthetic: false,
        }
    }
}

/// A child slot: either a nested node or a bare token.
#[derive(Debug, Clone)]
pub enum Element {
    /// A grammar production.
    Node(Arc<Node>),
    /// A keyword, operator or punctuation lexeme.
    Token(Arc<Token>),
}

impl Element {
    /// Returns the node, if this element is one.
    #[must_use]
    pub const fn as_node(&self) -> Option<&Arc<Node>> {
        match self {
            Self::Node(node) => Some(node),
            Self::Token(_) => None,
        }
    }

    /// Returns the token, if this element is one.
    #[must_use]
    pub const fn as_token(&self) -> Option<&Arc<Token>> {
        match self {
            Self::Token(token) => Some(token),
            Self::Node(_) => None,
        }
    }

    /// Returns the node kind, or `None` for bare tokens.
    #[must_use]
    pub fn kind(&self) -> Option<SyntaxKind> {
        self.as_node().map(|node| node.kind())
    }

    /// Returns `true` if this is a bare token with the given lexeme.
    #[must_use]
    pub fn is_token(&self, text: &str) -> bool {
        self.as_token().is_some_and(|token| token.text() == text)
    }

    /// Returns the first token of the element.
    #[must_use]
    pub fn first_token(&self) -> Option<&Token> {
        match self {
            Self::Node(node) => node.first_token(),
            Self::Token(token) => Some(token),
        }
    }

    /// Returns the leading space of the element.
    #[must_use]
    pub fn prefix(&self) -> &str {
        self.first_token().map_or("", Token::prefix)
    }

    /// Returns a copy whose leading space is `prefix`.
    #[must_use]
    pub fn with_prefix(&self, prefix: &str) -> Self {
        self.map_first_token(&|token| token.with_prefix(prefix))
    }

    /// Returns a copy with the first token replaced by `map` of itself.
    pub(crate) fn map_first_token(&self, map: &impl Fn(&Token) -> Token) -> Self {
        match self {
            Self::Node(node) => Self::Node(Arc::new(node.map_first_token(map))),
            Self::Token(token) => Self::Token(Arc::new(map(token))),
        }
    }

    /// Appends the printed element, including its leading space.
    pub fn write_source(&self, out: &mut String) {
        match self {
            Self::Node(node) => node.write_source(out),
            Self::Token(token) => {
                out.push_str(token.prefix());
                out.push_str(token.text());
            }
        }
    }

    /// Prints the element without its leading space.
    #[must_use]
    pub fn text(&self) -> String {
        let mut out = String::new();
        self.write_source(&mut out);
        out.split_off(self.prefix().len())
    }

    /// Calls `visit` for every token in source order.
    pub fn for_each_token<'a>(&'a self, visit: &mut impl FnMut(&'a Token)) {
        match self {
            Self::Node(node) => node.for_each_token(visit),
            Self::Token(token) => visit(token.as_ref()),
        }
    }

    /// Returns `true` when both elements have the same kinds and lexemes,
    /// ignoring space.
    #[must_use]
    pub fn same_shape(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Token(a), Self::Token(b)) => a.text() == b.text(),
            (Self::Node(a), Self::Node(b)) => a.same_shape(b),
            _ => false,
        }
    }
}

impl From<Node> for Element {
    fn from(node: Node) -> Self {
        Self::Node(Arc::new(node))
    }
}

impl From<Arc<Node>> for Element {
    fn from(node: Arc<Node>) -> Self {
        Self::Node(node)
    }
}

impl From<Token> for Element {
    fn from(token: Token) -> Self {
        Self::Token(Arc::new(token))
    }
}

/// An element together with the grammar field it occupies.
#[derive(Debug, Clone)]
pub struct Child {
    field: Option<&'static str>,
    element: Element,
}

impl Child {
    /// Creates a child in the named grammar field.
    #[must_use]
    pub const fn new(field: Option<&'static str>, element: Element) -> Self {
        Self { field, element }
    }

    /// Creates a child outside any grammar field.
    #[must_use]
    pub fn unnamed(element: impl Into<Element>) -> Self {
        Self::new(None, element.into())
    }

    /// Returns the grammar field name, if any.
    #[must_use]
    pub const fn field(&self) -> Option<&'static str> {
        self.field
    }

    /// Returns the element.
    #[must_use]
    pub const fn element(&self) -> &Element {
        &self.element
    }

    /// Returns a child in the same field holding a different element.
    #[must_use]
    pub fn with_element(&self, element: impl Into<Element>) -> Self {
        Self::new(self.field, element.into())
    }
}

/// An immutable grammar production.
#[derive(Debug, Clone)]
pub struct Node {
    id: NodeId,
    kind: SyntaxKind,
    children: Vec<Child>,
    ty: Option<Arc<TypeDescriptor>>,
    pending_format: bool,
}

impl Node {
    /// Creates an unassigned node with the given children.
    #[must_use]
    pub const fn new(kind: SyntaxKind, children: Vec<Child>) -> Self {
        Self {
            id: NodeId::UNASSIGNED,
            kind,
            children,
            ty: None,
            pending_format: false,
        }
    }

    /// Creates an unassigned node wrapping a single token.
    #[must_use]
    pub fn leaf(kind: SyntaxKind, token: Token) -> Self {
        Self::new(kind, vec![Child::unnamed(token)])
    }

    /// Returns the node id.
    #[must_use]
    pub const fn id(&self) -> NodeId {
        self.id
    }

    /// Returns the node kind.
    #[must_use]
    pub const fn kind(&self) -> SyntaxKind {
        self.kind
    }

    /// Returns the ordered children.
    #[must_use]
    pub fn children(&self) -> &[Child] {
        &self.children
    }

    /// Returns the resolved type, if an attribution pass attached one.
    #[must_use]
    pub fn ty(&self) -> Option<&TypeDescriptor> {
        self.ty.as_deref()
    }

    /// Returns the shared handle to the resolved type.
    #[must_use]
    pub const fn ty_handle(&self) -> Option<&Arc<TypeDescriptor>> {
        self.ty.as_ref()
    }

    /// Returns `true` while the node's space still needs reconciling.
    #[must_use]
    pub const fn is_pending_format(&self) -> bool {
        self.pending_format
    }

    /// Iterates over child nodes, skipping bare tokens.
    pub fn child_nodes(&self) -> impl DoubleEndedIterator<Item = &Arc<Node>> {
        self.children.iter().filter_map(|child| child.element.as_node())
    }

    /// Returns the first element in the named field.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&Element> {
        self.fields(name).next()
    }

    /// Returns the first node in the named field.
    #[must_use]
    pub fn field_node(&self, name: &str) -> Option<&Arc<Node>> {
        self.fields(name).find_map(Element::as_node)
    }

    /// Iterates over every element in the named field.
    pub fn fields<'a>(&'a self, name: &str) -> impl Iterator<Item = &'a Element> {
        self.children
            .iter()
            .filter(move |child| child.field == Some(name))
            .map(|child| &child.element)
    }

    /// Returns the first child node of the given kind.
    #[must_use]
    pub fn child_of_kind(&self, kind: SyntaxKind) -> Option<&Arc<Node>> {
        self.child_nodes().find(|node| node.kind == kind)
    }

    /// Iterates over child nodes of the given kind.
    pub fn children_of_kind(&self, kind: SyntaxKind) -> impl Iterator<Item = &Arc<Node>> {
        self.child_nodes().filter(move |node| node.kind == kind)
    }

    /// Returns `true` if a direct child is a bare token with this lexeme.
    #[must_use]
    pub fn has_token(&self, text: &str) -> bool {
        self.children.iter().any(|child| child.element.is_token(text))
    }

    /// Returns the first token in source order.
    #[must_use]
    pub fn first_token(&self) -> Option<&Token> {
        self.children
            .iter()
            .find_map(|child| child.element.first_token())
    }

    /// Returns the leading space of the node.
    #[must_use]
    pub fn prefix(&self) -> &str {
        self.first_token().map_or("", Token::prefix)
    }

    /// Returns the lexeme of a node that wraps exactly one token.
    #[must_use]
    pub fn token_text(&self) -> Option<&str> {
        match self.children.as_slice() {
            [only] => only.element.as_token().map(|token| token.text()),
            _ => None,
        }
    }

    /// Appends the printed node, including its leading space.
    pub fn write_source(&self, out: &mut String) {
        for child in &self.children {
            child.element.write_source(out);
        }
    }

    /// Prints the node including its leading space.
    #[must_use]
    pub fn to_source(&self) -> String {
        let mut out = String::new();
        self.write_source(&mut out);
        out
    }

    /// Prints the node without its leading space.
    #[must_use]
    pub fn text(&self) -> String {
        let mut out = self.to_source();
        out.split_off(self.prefix().len())
    }

    /// Calls `visit` for every token in source order.
    pub fn for_each_token<'a>(&'a self, visit: &mut impl FnMut(&'a Token)) {
        for child in &self.children {
            child.element.for_each_token(visit);
        }
    }

    /// Returns `true` when both nodes have the same kinds and lexemes,
    /// ignoring space and ids.
    #[must_use]
    pub fn same_shape(&self, other: &Self) -> bool {
        self.kind == other.kind
            && self.children.len() == other.children.len()
            && self
                .children
                .iter()
                .zip(&other.children)
                .all(|(a, b)| a.element.same_shape(&b.element))
    }

    /// Returns a copy with different children.
    #[must_use]
    pub fn with_children(&self, children: Vec<Child>) -> Self {
        Self {
            id: self.id,
            kind: self.kind,
            children,
            ty: self.ty.clone(),
            pending_format: self.pending_format,
        }
    }

    /// Returns a copy with the child at `index` replaced.
    ///
    /// An out-of-range index returns an unchanged copy.
    #[must_use]
    pub fn with_child(&self, index: usize, element: impl Into<Element>) -> Self {
        let mut children = self.children.clone();
        if let Some(slot) = children.get_mut(index) {
            *slot = slot.with_element(element);
        }
        self.with_children(children)
    }

    /// Returns a copy with the first element of a field replaced.
    ///
    /// A missing field returns an unchanged copy.
    #[must_use]
    pub fn with_field(&self, name: &str, element: impl Into<Element>) -> Self {
        self.children
            .iter()
            .position(|child| child.field == Some(name))
            .map_or_else(|| self.clone(), |index| self.with_child(index, element))
    }

    /// Returns a copy whose leading space is `prefix`.
    #[must_use]
    pub fn with_prefix(&self, prefix: &str) -> Self {
        self.map_first_token(&|token| token.with_prefix(prefix))
    }

    pub(crate) fn map_first_token(&self, map: &impl Fn(&Token) -> Token) -> Self {
        let position = self
            .children
            .iter()
            .position(|child| child.element.first_token().is_some());
        position.map_or_else(
            || self.clone(),
            |index| {
                let mut children = self.children.clone();
                if let Some(slot) = children.get_mut(index) {
                    *slot = slot.with_element(slot.element.map_first_token(map));
                }
                self.with_children(children)
            },
        )
    }

    /// Returns a copy carrying a resolved type.
    #[must_use]
    pub fn with_ty(&self, ty: Option<Arc<TypeDescriptor>>) -> Self {
        let mut copy = self.clone();
        copy.ty = ty;
        copy
    }

    /// Returns a copy flagged for space reconciliation.
    #[must_use]
    pub fn with_pending_format(&self, pending: bool) -> Self {
        let mut copy = self.clone();
        copy.pending_format = pending;
        copy
    }

    pub(crate) fn with_id(&self, id: NodeId) -> Self {
        let mut copy = self.clone();
        copy.id = id;
        copy
    }
}

/// Pre-order iterator over the nodes of a subtree.
#[derive(Debug)]
pub struct Preorder<'a> {
    stack: Vec<&'a Arc<Node>>,
}

impl<'a> Preorder<'a> {
    /// Starts a traversal at `root`.
    #[must_use]
    pub fn new(root: &'a Arc<Node>) -> Self {
        Self { stack: vec![root] }
    }
}

impl<'a> Iterator for Preorder<'a> {
    type Item = &'a Arc<Node>;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.child_nodes().rev());
        Some(node)
    }
}
