//! Pattern compilation for structural code matching.
//!
//! Patterns are Java fragments with metavariables standing in for code:
//!
//! - `$VAR` matches any single element and captures it as `VAR`
//! - `$_` matches any single element without capturing
//! - `$$$VAR` matches zero or more sibling elements and captures the run
//!
//! Metavariable names must start with an uppercase letter or underscore,
//! followed by uppercase letters, digits, or underscores. A name used twice
//! in one pattern must bind structurally equal code both times.

use std::sync::Arc;

use crate::context::InsertionContext;
use crate::error::SyntaxError;
use crate::matcher::{Bindings, elements_match};
use crate::metavariables::{MetaVariable, normalise};
use crate::tree::{Element, Node};

/// A compiled structural pattern.
///
/// The fragment is parsed once under its [`InsertionContext`]; matching then
/// compares node kinds and token lexemes, ignoring whitespace and comments.
#[derive(Debug, Clone)]
pub struct Pattern {
    source: String,
    context: InsertionContext,
    metavariables: Vec<MetaVariable>,
    root: Arc<Node>,
}

impl Pattern {
    /// Compiles a pattern fragment parsed under `context`.
    ///
    /// # Errors
    ///
    /// Returns [`SyntaxError::InvalidMetavariable`] for malformed
    /// metavariables, and [`SyntaxError::PatternCompile`] when the fragment
    /// does not parse or does not consist of exactly one syntax node.
    ///
    /// # Examples
    ///
    /// ```
    /// use recast_syntax::{InsertionContext, Pattern};
    ///
    /// let pattern = Pattern::compile("$A.equals($B)", InsertionContext::Expression)?;
    /// assert_eq!(pattern.metavariables().len(), 2);
    /// # Ok::<(), recast_syntax::SyntaxError>(())
    /// ```
    pub fn compile(source: &str, context: InsertionContext) -> Result<Self, SyntaxError> {
        let (normalised, metavariables) =
            normalise(source).map_err(SyntaxError::invalid_metavariable)?;
        let nodes = context
            .parse_fragment(&normalised)
            .map_err(|err| SyntaxError::pattern_compile(context, err.to_string()))?;
        let root = match nodes.as_slice() {
            [only] => Arc::clone(only),
            [] => return Err(SyntaxError::pattern_compile(context, "pattern is empty")),
            many => {
                return Err(SyntaxError::pattern_compile(
                    context,
                    format!("pattern must be a single node, found {}", many.len()),
                ));
            }
        };
        Ok(Self {
            source: source.to_owned(),
            context,
            metavariables,
            root,
        })
    }

    /// Compiles an expression pattern.
    ///
    /// # Errors
    ///
    /// See [`Pattern::compile`].
    pub fn expression(source: &str) -> Result<Self, SyntaxError> {
        Self::compile(source, InsertionContext::Expression)
    }

    /// Compiles a statement pattern.
    ///
    /// # Errors
    ///
    /// See [`Pattern::compile`].
    pub fn statement(source: &str) -> Result<Self, SyntaxError> {
        Self::compile(source, InsertionContext::Statement)
    }

    /// Returns the original pattern source.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Returns the context the pattern was parsed under.
    #[must_use]
    pub const fn context(&self) -> InsertionContext {
        self.context
    }

    /// Returns the metavariables in order of appearance.
    #[must_use]
    pub fn metavariables(&self) -> &[MetaVariable] {
        &self.metavariables
    }

    /// Returns whether this pattern has any metavariables.
    #[must_use]
    pub fn has_metavariables(&self) -> bool {
        !self.metavariables.is_empty()
    }

    /// Returns the parsed pattern fragment.
    #[must_use]
    pub const fn root(&self) -> &Arc<Node> {
        &self.root
    }

    /// Matches the pattern against `node` itself, not its descendants.
    #[must_use]
    pub fn matches(&self, node: &Arc<Node>) -> Option<Bindings> {
        let mut bindings = Bindings::new();
        self.matches_into(node, &mut bindings).then_some(bindings)
    }

    /// Matches against `node`, extending `bindings` consistently.
    ///
    /// On failure `bindings` may hold partial captures; callers that need to
    /// retry should pass a copy.
    pub fn matches_into(&self, node: &Arc<Node>, bindings: &mut Bindings) -> bool {
        elements_match(
            &Element::Node(Arc::clone(&self.root)),
            &Element::Node(Arc::clone(node)),
            bindings,
        )
    }
}
