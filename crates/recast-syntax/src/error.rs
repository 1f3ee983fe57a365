//! Error types for parsing, tree editing, and template instantiation.
//!
//! Parse and pattern failures are reported through [`SyntaxError`]. Template
//! failures get their own [`TemplateError`] because the driver scopes them to
//! a single rule application, and [`TreeError`] covers structural edits that
//! address nodes the tree does not contain.

use std::ops::Range;

use thiserror::Error;

use crate::context::InsertionContext;
use crate::tree::NodeId;

/// Errors from parsing Java source and compiling patterns.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum SyntaxError {
    /// Failed to initialise the Tree-sitter parser.
    #[error("failed to initialise Java parser: {message}")]
    ParserInit {
        /// Description of the failure.
        message: String,
    },

    /// The source contains a syntax error.
    #[error("parse error at {line}:{column}: {message} near `{context}`")]
    Parse {
        /// Byte range of the offending region.
        byte_range: Range<usize>,
        /// One-based line of the first error.
        line: u32,
        /// One-based column of the first error.
        column: u32,
        /// A snippet of the offending source text.
        context: String,
        /// Human-readable description of the error.
        message: String,
    },

    /// Pattern contains invalid metavariable syntax.
    #[error("invalid metavariable syntax: {message}")]
    InvalidMetavariable {
        /// Description of the metavariable error.
        message: String,
    },

    /// Pattern compilation failed.
    #[error("invalid {context} pattern: {message}")]
    PatternCompile {
        /// Grammar entry point the pattern was compiled under.
        context: InsertionContext,
        /// Description of the compilation failure.
        message: String,
    },
}

impl SyntaxError {
    /// Creates a parser initialisation error.
    #[must_use]
    pub fn parser_init(message: impl Into<String>) -> Self {
        Self::ParserInit {
            message: message.into(),
        }
    }

    /// Creates a parse error.
    #[must_use]
    pub fn parse(
        byte_range: Range<usize>,
        (line, column): (u32, u32),
        context: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::Parse {
            byte_range,
            line,
            column,
            context: context.into(),
            message: message.into(),
        }
    }

    /// Creates an invalid metavariable error.
    #[must_use]
    pub fn invalid_metavariable(message: impl Into<String>) -> Self {
        Self::InvalidMetavariable {
            message: message.into(),
        }
    }

    /// Creates a pattern compilation error.
    #[must_use]
    pub fn pattern_compile(context: InsertionContext, message: impl Into<String>) -> Self {
        Self::PatternCompile {
            context,
            message: message.into(),
        }
    }

    /// Returns the one-based line and column of a parse error.
    #[must_use]
    pub const fn position(&self) -> Option<(u32, u32)> {
        match self {
            Self::Parse { line, column, .. } => Some((*line, *column)),
            _ => None,
        }
    }
}

/// Errors raised while compiling or instantiating a template.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum TemplateError {
    /// The template references a placeholder with no binding.
    #[error("template references unbound placeholder ${name}")]
    UnboundPlaceholder {
        /// Name of the placeholder, without the `$` prefix.
        name: String,
    },

    /// A placeholder is bound to a value of the wrong arity.
    #[error("placeholder ${name} expects {expected} binding")]
    BindingArity {
        /// Name of the placeholder.
        name: String,
        /// Either `"a single"` or `"a sequence"`.
        expected: &'static str,
    },

    /// The template source does not parse under the requested context.
    #[error("template does not parse as {context}: {message}")]
    Parse {
        /// Grammar entry point the template was compiled under.
        context: InsertionContext,
        /// Description of the parse failure.
        message: String,
    },

    /// The template source is empty.
    #[error("template is empty")]
    Empty,

    /// The template yields more or fewer than one node.
    #[error("template yields {found} nodes under {context}, expected exactly one")]
    Arity {
        /// Grammar entry point the template was compiled under.
        context: InsertionContext,
        /// Number of nodes the template produced.
        found: usize,
    },

    /// The template uses malformed metavariable syntax.
    #[error("invalid template placeholder: {message}")]
    InvalidPlaceholder {
        /// Description of the placeholder error.
        message: String,
    },
}

impl TemplateError {
    /// Creates an unbound placeholder error.
    #[must_use]
    pub fn unbound(name: impl Into<String>) -> Self {
        Self::UnboundPlaceholder { name: name.into() }
    }

    /// Creates a template parse error.
    #[must_use]
    pub fn parse(context: InsertionContext, message: impl Into<String>) -> Self {
        Self::Parse {
            context,
            message: message.into(),
        }
    }
}

/// Errors raised by structural tree edits.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum TreeError {
    /// The edit addressed a node that is not in the tree.
    #[error("node {id} is not present in the tree")]
    UnknownNode {
        /// The missing node id.
        id: NodeId,
    },
}
