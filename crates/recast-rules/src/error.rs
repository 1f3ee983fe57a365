//! Errors raised while constructing built-in rules.

use recast_syntax::{SyntaxError, TemplateError};
use thiserror::Error;

/// Failure to build a rule from its snippets or options.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RuleBuildError {
    /// A pattern snippet does not compile.
    #[error("pattern `{pattern}` does not compile: {source}")]
    Pattern {
        /// The pattern source.
        pattern: String,
        /// Why compilation failed.
        #[source]
        source: SyntaxError,
    },

    /// A template snippet does not compile.
    #[error("template `{template}` does not compile: {source}")]
    Template {
        /// The template source.
        template: String,
        /// Why compilation failed.
        #[source]
        source: TemplateError,
    },

    /// The template refers to metavariables the pattern never binds.
    #[error("template uses metavariables the pattern does not bind: {}", .names.join(", "))]
    UnboundMetavariables {
        /// The offending names, without `$`.
        names: Vec<String>,
    },

    /// The requested insertion context is not known.
    #[error("unknown insertion context '{name}'")]
    UnknownContext {
        /// The rejected name.
        name: String,
    },
}

impl RuleBuildError {
    /// Renders the error as option validation reasons.
    #[must_use]
    pub fn into_reasons(self) -> Vec<String> {
        vec![self.to_string()]
    }
}
