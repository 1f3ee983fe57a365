//! Composable, type-aware node predicates.
//!
//! A [`Predicate`] is evaluated against a [`NodeRef`], a node together with
//! its chain of ancestors, and yields a three-valued [`Verdict`]. Type tests
//! answer [`Verdict::Unknown`] when the node carries no resolved type or the
//! oracle cannot decide; `Unknown` propagates through the combinators with
//! Kleene logic and is never treated as a match.

use std::fmt;
use std::ops::Not;
use std::sync::Arc;

use crate::kind::SyntaxKind;
use crate::matcher::capture::{Binding, Bindings};
use crate::pattern::Pattern;
use crate::tree::{Element, Node};
use crate::types::{PrimitiveType, TypeDescriptor, TypeOracle};

/// Result of evaluating a predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// The predicate holds.
    Match,
    /// The predicate does not hold.
    NoMatch,
    /// The predicate depends on information that is not available.
    Unknown,
}

impl Verdict {
    /// Converts a decided boolean.
    #[must_use]
    pub const fn from_bool(value: bool) -> Self {
        if value { Self::Match } else { Self::NoMatch }
    }

    /// Converts an oracle answer, mapping `None` to [`Verdict::Unknown`].
    #[must_use]
    pub const fn from_option(value: Option<bool>) -> Self {
        match value {
            Some(decided) => Self::from_bool(decided),
            None => Self::Unknown,
        }
    }

    /// Kleene conjunction.
    #[must_use]
    pub const fn and(self, other: Self) -> Self {
        match (self, other) {
            (Self::NoMatch, _) | (_, Self::NoMatch) => Self::NoMatch,
            (Self::Unknown, _) | (_, Self::Unknown) => Self::Unknown,
            (Self::Match, Self::Match) => Self::Match,
        }
    }

    /// Kleene disjunction.
    #[must_use]
    pub const fn or(self, other: Self) -> Self {
        match (self, other) {
            (Self::Match, _) | (_, Self::Match) => Self::Match,
            (Self::Unknown, _) | (_, Self::Unknown) => Self::Unknown,
            (Self::NoMatch, Self::NoMatch) => Self::NoMatch,
        }
    }

    /// Returns `true` only for a definite match.
    #[must_use]
    pub const fn is_match(self) -> bool {
        matches!(self, Self::Match)
    }
}

impl Not for Verdict {
    type Output = Self;

    fn not(self) -> Self {
        match self {
            Self::Match => Self::NoMatch,
            Self::NoMatch => Self::Match,
            Self::Unknown => Self::Unknown,
        }
    }
}

/// How a nested predicate is applied to a group of nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quantifier {
    /// Every node must satisfy the predicate (vacuously true when empty).
    All,
    /// At least one node must satisfy the predicate.
    Any,
    /// No node may satisfy the predicate.
    None,
}

/// A test on a node's resolved type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeTest {
    /// The type is exactly the named class or primitive keyword.
    Exact(String),
    /// The type is assignable to the named class.
    SubtypeOf(String),
    /// The named type is an interface and the type implements it.
    Implements(String),
    /// The type is a primitive wrapper such as `java.lang.Integer`.
    BoxedPrimitive,
    /// The type is a primitive, optionally a specific one.
    Primitive(Option<PrimitiveType>),
    /// The node carries a resolved type at all.
    Resolved,
}

/// A plain function over a node's text, usable inside a [`Predicate`].
#[derive(Clone, Copy)]
pub struct TextTest(pub fn(&str) -> bool);

impl fmt::Debug for TextTest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("TextTest(..)")
    }
}

/// A node predicate built from primitive tests and combinators.
#[derive(Debug, Clone)]
pub enum Predicate {
    /// Always matches.
    Any,
    /// The node has this kind.
    Kind(SyntaxKind),
    /// The node has one of these kinds.
    KindIn(Vec<SyntaxKind>),
    /// The node's text, without leading space, equals this string.
    Text(String),
    /// The node's text satisfies a function.
    TextWith(TextTest),
    /// The node's named field holds a node satisfying the predicate.
    Field(&'static str, Box<Predicate>),
    /// A quantified test over the child nodes.
    Children(Quantifier, Box<Predicate>),
    /// A quantified test over the other child nodes of the parent.
    Siblings(Quantifier, Box<Predicate>),
    /// The parent satisfies the predicate.
    Parent(Box<Predicate>),
    /// Some ancestor satisfies the predicate.
    Ancestor(Box<Predicate>),
    /// The nearest enclosing type declaration satisfies the predicate.
    EnclosingClass(Box<Predicate>),
    /// A test on the node's resolved type.
    Type(TypeTest),
    /// The node matches a structural pattern, adding its bindings.
    Pattern(Arc<Pattern>),
    /// The node bound to a metavariable satisfies the predicate.
    Capture(String, Box<Predicate>),
    /// Every operand holds.
    And(Vec<Predicate>),
    /// Some operand holds.
    Or(Vec<Predicate>),
    /// The operand does not hold.
    Not(Box<Predicate>),
}

impl Predicate {
    /// Matches nodes of one kind.
    #[must_use]
    pub const fn kind(kind: SyntaxKind) -> Self {
        Self::Kind(kind)
    }

    /// Matches nodes of any of the given kinds.
    #[must_use]
    pub fn kinds(kinds: impl IntoIterator<Item = SyntaxKind>) -> Self {
        Self::KindIn(kinds.into_iter().collect())
    }

    /// Matches nodes whose text equals `text`.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    /// Matches nodes whose text satisfies `test`.
    #[must_use]
    pub const fn text_with(test: fn(&str) -> bool) -> Self {
        Self::TextWith(TextTest(test))
    }

    /// Applies `inner` to the node in a grammar field.
    #[must_use]
    pub fn field(name: &'static str, inner: Self) -> Self {
        Self::Field(name, Box::new(inner))
    }

    /// Applies `inner` to the child nodes.
    #[must_use]
    pub fn children(quantifier: Quantifier, inner: Self) -> Self {
        Self::Children(quantifier, Box::new(inner))
    }

    /// Applies `inner` to the sibling nodes.
    #[must_use]
    pub fn siblings(quantifier: Quantifier, inner: Self) -> Self {
        Self::Siblings(quantifier, Box::new(inner))
    }

    /// Applies `inner` to the parent.
    #[must_use]
    pub fn parent(inner: Self) -> Self {
        Self::Parent(Box::new(inner))
    }

    /// Applies `inner` to each ancestor.
    #[must_use]
    pub fn ancestor(inner: Self) -> Self {
        Self::Ancestor(Box::new(inner))
    }

    /// Applies `inner` to the nearest enclosing type declaration.
    #[must_use]
    pub fn enclosing_class(inner: Self) -> Self {
        Self::EnclosingClass(Box::new(inner))
    }

    /// Tests the resolved type.
    #[must_use]
    pub const fn type_test(test: TypeTest) -> Self {
        Self::Type(test)
    }

    /// Matches a compiled structural pattern.
    #[must_use]
    pub fn pattern(pattern: Pattern) -> Self {
        Self::Pattern(Arc::new(pattern))
    }

    /// Applies `inner` to the value bound to `name` by an earlier pattern.
    #[must_use]
    pub fn capture(name: impl Into<String>, inner: Self) -> Self {
        Self::Capture(name.into(), Box::new(inner))
    }

    /// Conjunction with `other`, flattening nested conjunctions.
    #[must_use]
    pub fn and(self, other: Self) -> Self {
        match self {
            Self::And(mut operands) => {
                operands.push(other);
                Self::And(operands)
            }
            first => Self::And(vec![first, other]),
        }
    }

    /// Disjunction with `other`, flattening nested disjunctions.
    #[must_use]
    pub fn or(self, other: Self) -> Self {
        match self {
            Self::Or(mut operands) => {
                operands.push(other);
                Self::Or(operands)
            }
            first => Self::Or(vec![first, other]),
        }
    }

    /// Evaluates the predicate, returning bindings on a definite match.
    #[must_use]
    pub fn test(&self, node: &NodeRef<'_>, oracle: &dyn TypeOracle) -> Option<Bindings> {
        let mut bindings = Bindings::new();
        self.evaluate(node, oracle, &mut bindings)
            .is_match()
            .then_some(bindings)
    }

    /// Evaluates the predicate, accumulating pattern bindings.
    ///
    /// Bindings are only meaningful when the result is [`Verdict::Match`].
    pub fn evaluate(
        &self,
        node: &NodeRef<'_>,
        oracle: &dyn TypeOracle,
        bindings: &mut Bindings,
    ) -> Verdict {
        match self {
            Self::Any => Verdict::Match,
            Self::Kind(kind) => Verdict::from_bool(node.node().kind() == *kind),
            Self::KindIn(kinds) => Verdict::from_bool(kinds.contains(&node.node().kind())),
            Self::Text(text) => Verdict::from_bool(node.node().text() == *text),
            Self::TextWith(test) => Verdict::from_bool((test.0)(&node.node().text())),
            Self::Field(name, inner) => node
                .node()
                .children()
                .iter()
                .enumerate()
                .filter(|(_, child)| child.field() == Some(*name))
                .find_map(|(index, child)| child.element().as_node().map(|found| (index, found)))
                .map_or(Verdict::NoMatch, |(index, found)| {
                    inner.evaluate(&node.child(found, index), oracle, bindings)
                }),
            Self::Children(quantifier, inner) => {
                let verdicts = child_refs(node)
                    .map(|child| inner.evaluate(&child.view(node), oracle, bindings))
                    .collect::<Vec<_>>();
                quantify(*quantifier, verdicts)
            }
            Self::Siblings(quantifier, inner) => {
                let verdicts = node.parent().map_or_else(Vec::new, |parent| {
                    child_refs(parent)
                        .filter(|sibling| sibling.index != node.index())
                        .map(|sibling| inner.evaluate(&sibling.view(parent), oracle, bindings))
                        .collect()
                });
                quantify(*quantifier, verdicts)
            }
            Self::Parent(inner) => node
                .parent()
                .map_or(Verdict::NoMatch, |parent| inner.evaluate(parent, oracle, bindings)),
            Self::Ancestor(inner) => node
                .ancestors()
                .map(|ancestor| inner.evaluate(ancestor, oracle, bindings))
                .fold(Verdict::NoMatch, Verdict::or),
            Self::EnclosingClass(inner) => node
                .ancestors()
                .find(|ancestor| ancestor.node().kind().is_type_declaration())
                .map_or(Verdict::NoMatch, |class| inner.evaluate(class, oracle, bindings)),
            Self::Type(test) => evaluate_type(test, node.node().ty(), oracle),
            Self::Pattern(pattern) => {
                let mut trial = bindings.clone();
                if pattern.matches_into(node.node(), &mut trial) {
                    *bindings = trial;
                    Verdict::Match
                } else {
                    Verdict::NoMatch
                }
            }
            Self::Capture(name, inner) => evaluate_capture(name, inner, oracle, bindings),
            Self::And(operands) => {
                let mut verdict = Verdict::Match;
                for operand in operands {
                    verdict = verdict.and(operand.evaluate(node, oracle, bindings));
                    if verdict == Verdict::NoMatch {
                        break;
                    }
                }
                verdict
            }
            Self::Or(operands) => {
                let mut verdict = Verdict::NoMatch;
                for operand in operands {
                    let mut trial = bindings.clone();
                    let outcome = operand.evaluate(node, oracle, &mut trial);
                    if outcome.is_match() {
                        *bindings = trial;
                        return Verdict::Match;
                    }
                    verdict = verdict.or(outcome);
                }
                verdict
            }
            Self::Not(inner) => {
                let mut scratch = bindings.clone();
                !inner.evaluate(node, oracle, &mut scratch)
            }
        }
    }
}

impl Not for Predicate {
    type Output = Self;

    fn not(self) -> Self {
        Self::Not(Box::new(self))
    }
}

fn quantify(quantifier: Quantifier, verdicts: Vec<Verdict>) -> Verdict {
    let any = verdicts.iter().copied().fold(Verdict::NoMatch, Verdict::or);
    match quantifier {
        Quantifier::All => verdicts.into_iter().fold(Verdict::Match, Verdict::and),
        Quantifier::Any => any,
        Quantifier::None => !any,
    }
}

fn evaluate_capture(
    name: &str,
    inner: &Predicate,
    oracle: &dyn TypeOracle,
    bindings: &mut Bindings,
) -> Verdict {
    let nodes: Vec<Arc<Node>> = match bindings.get(name) {
        Some(Binding::Single(Element::Node(node))) => vec![Arc::clone(node)],
        Some(Binding::Multiple(elements)) => elements
            .iter()
            .filter_map(Element::as_node)
            .cloned()
            .collect(),
        Some(Binding::Single(Element::Token(_))) | None => return Verdict::NoMatch,
    };
    nodes
        .iter()
        .map(|captured| inner.evaluate(&NodeRef::root(captured), oracle, bindings))
        .fold(Verdict::Match, Verdict::and)
}

fn evaluate_type(
    test: &TypeTest,
    resolved: Option<&TypeDescriptor>,
    oracle: &dyn TypeOracle,
) -> Verdict {
    let Some(ty) = resolved else {
        return Verdict::Unknown;
    };
    match test {
        TypeTest::Exact(name) => Verdict::from_bool(
            PrimitiveType::from_keyword(name).map_or_else(
                || ty.is_class(name),
                |primitive| ty.as_primitive() == Some(primitive),
            ),
        ),
        TypeTest::SubtypeOf(name) => Verdict::from_option(oracle.is_subtype(ty, name)),
        TypeTest::Implements(name) => match oracle.is_interface(name) {
            Some(true) => Verdict::from_option(oracle.is_subtype(ty, name)),
            Some(false) => Verdict::NoMatch,
            None => Verdict::Unknown,
        },
        TypeTest::BoxedPrimitive => Verdict::from_bool(ty.boxed_primitive().is_some()),
        TypeTest::Primitive(expected) => Verdict::from_bool(match (ty.as_primitive(), expected) {
            (Some(PrimitiveType::Void) | None, _) => false,
            (Some(_), None) => true,
            (Some(found), Some(wanted)) => found == *wanted,
        }),
        TypeTest::Resolved => Verdict::Match,
    }
}

/// A child node and its position among the parent's children.
struct ChildSlot<'a> {
    node: &'a Arc<Node>,
    index: usize,
}

impl<'a> ChildSlot<'a> {
    fn view<'p>(&self, parent: &'p NodeRef<'a>) -> NodeRef<'p>
    where
        'a: 'p,
    {
        parent.child(self.node, self.index)
    }
}

fn child_refs<'a>(node: &NodeRef<'a>) -> impl Iterator<Item = ChildSlot<'a>> {
    node.node()
        .children()
        .iter()
        .enumerate()
        .filter_map(|(index, child)| child.element().as_node().map(|found| ChildSlot { node: found, index }))
}

/// A node viewed together with its ancestors.
#[derive(Debug, Clone, Copy)]
pub struct NodeRef<'a> {
    node: &'a Arc<Node>,
    parent: Option<&'a NodeRef<'a>>,
    index: usize,
}

impl<'a> NodeRef<'a> {
    /// Views `node` with no known parent.
    #[must_use]
    pub const fn root(node: &'a Arc<Node>) -> Self {
        Self {
            node,
            parent: None,
            index: 0,
        }
    }

    /// Views `node`, the child at `index` of this node.
    #[must_use]
    pub const fn child<'b>(&'b self, node: &'b Arc<Node>, index: usize) -> NodeRef<'b>
    where
        'a: 'b,
    {
        NodeRef {
            node,
            parent: Some(self),
            index,
        }
    }

    /// Returns the node.
    #[must_use]
    pub const fn node(&self) -> &'a Arc<Node> {
        self.node
    }

    /// Returns the parent view, if known.
    #[must_use]
    pub const fn parent(&self) -> Option<&'a NodeRef<'a>> {
        self.parent
    }

    /// Returns the position of the node among its parent's children.
    #[must_use]
    pub const fn index(&self) -> usize {
        self.index
    }

    /// Iterates over ancestors, nearest first.
    pub fn ancestors(&self) -> impl Iterator<Item = &'a NodeRef<'a>> {
        std::iter::successors(self.parent, |ancestor| ancestor.parent)
    }

    /// Returns the number of known ancestors.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.ancestors().count()
    }
}
