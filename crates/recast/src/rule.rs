//! The rule contract consumed by the pass driver.

use std::fmt;
use std::sync::Arc;

use recast_syntax::{IndentStyle, MatchResult, Node, NodeRef, Predicate, TypeOracle};

use crate::error::RuleError;

/// A named, configured unit of change.
///
/// The driver evaluates [`Rule::predicate`] against every node of a pass
/// snapshot. For each definite match it calls [`Rule::rewrite`], which
/// either proposes a replacement for the matched node or declines with
/// `Ok(None)`. Declining is the normal way to say "does not apply here";
/// errors are reserved for genuine failures and cost only this application.
///
/// Implementations must not keep state between calls: the same rule value
/// is shared by every worker thread of a batch.
pub trait Rule: Send + Sync {
    /// Stable identifying name.
    fn name(&self) -> &str;

    /// Predicate selecting candidate nodes.
    fn predicate(&self) -> &Predicate;

    /// Builds the replacement for a matched node.
    ///
    /// The returned node replaces `found.node()` as a whole. Its leading
    /// space is overwritten with the target's and synthetic indentation is
    /// re-anchored by the driver.
    ///
    /// # Errors
    ///
    /// Returns [`RuleError`] when the replacement cannot be produced.
    fn rewrite(
        &self,
        found: &MatchResult,
        cx: &RewriteContext<'_>,
    ) -> Result<Option<Arc<Node>>, RuleError>;
}

/// What a rule sees about the site it rewrites.
#[derive(Clone, Copy)]
pub struct RewriteContext<'a> {
    oracle: &'a dyn TypeOracle,
    node: &'a NodeRef<'a>,
    style: &'a IndentStyle,
    indent: &'a str,
}

impl<'a> RewriteContext<'a> {
    /// Creates a context for the node viewed through `node`.
    #[must_use]
    pub const fn new(
        oracle: &'a dyn TypeOracle,
        node: &'a NodeRef<'a>,
        style: &'a IndentStyle,
        indent: &'a str,
    ) -> Self {
        Self {
            oracle,
            node,
            style,
            indent,
        }
    }

    /// Type oracle for the current snapshot, including local declarations.
    #[must_use]
    pub const fn oracle(&self) -> &'a dyn TypeOracle {
        self.oracle
    }

    /// The matched node with its ancestors.
    #[must_use]
    pub const fn node_ref(&self) -> &'a NodeRef<'a> {
        self.node
    }

    /// The matched node's parent.
    #[must_use]
    pub fn parent(&self) -> Option<&'a Arc<Node>> {
        self.node.parent().map(NodeRef::node)
    }

    /// Ancestors of the matched node, nearest first.
    pub fn ancestors(&self) -> impl Iterator<Item = &'a Arc<Node>> {
        self.node.ancestors().map(NodeRef::node)
    }

    /// Indentation style detected for the unit.
    #[must_use]
    pub const fn style(&self) -> &'a IndentStyle {
        self.style
    }

    /// Indentation of the line on which the matched node starts.
    #[must_use]
    pub const fn indent(&self) -> &'a str {
        self.indent
    }
}

impl fmt::Debug for RewriteContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RewriteContext")
            .field("node", &self.node.node().kind())
            .field("indent", &self.indent)
            .finish_non_exhaustive()
    }
}

/// An ordered set of active rules.
///
/// Declaration order is significant: it breaks ties between conflicting
/// matches of equal depth.
#[derive(Clone, Default)]
pub struct RuleSet {
    rules: Vec<Arc<dyn Rule>>,
}

impl RuleSet {
    /// Creates an empty rule set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a rule after every rule already present.
    pub fn push(&mut self, rule: Arc<dyn Rule>) {
        self.rules.push(rule);
    }

    /// Returns the set with `rule` appended.
    #[must_use]
    pub fn with(mut self, rule: impl Rule + 'static) -> Self {
        self.push(Arc::new(rule));
        self
    }

    /// Iterates over the rules in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn Rule>> {
        self.rules.iter()
    }

    /// Names of the rules in declaration order.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.rules.iter().map(|rule| rule.name()).collect()
    }

    /// Number of rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Returns `true` when the set holds no rules.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl FromIterator<Arc<dyn Rule>> for RuleSet {
    fn from_iter<I: IntoIterator<Item = Arc<dyn Rule>>>(iter: I) -> Self {
        Self {
            rules: iter.into_iter().collect(),
        }
    }
}

impl fmt::Debug for RuleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}
