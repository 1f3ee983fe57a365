//! Error types for rule application, rule registration and unit processing.
//!
//! Every error here is scoped: a [`RuleError`] costs one rule application,
//! an [`OptionValidationError`] excludes one rule from the active set and a
//! [`UnitError`] fails one compilation unit. None of them stops a batch.

use recast_core::{Diagnostic, DiagnosticCode, Span};
use recast_syntax::{SyntaxError, TemplateError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure of a single rule application.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum RuleError {
    /// The rule's template could not be compiled or instantiated.
    #[error(transparent)]
    Template(#[from] TemplateError),

    /// The rule hit a condition it cannot handle.
    #[error("{message}")]
    Failed {
        /// Description of the failure.
        message: String,
    },

    /// The rule panicked while matching or rewriting.
    #[error("rule panicked: {message}")]
    Panicked {
        /// The panic payload rendered as text.
        message: String,
    },
}

impl RuleError {
    /// Creates a rule-specific failure.
    #[must_use]
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed {
            message: message.into(),
        }
    }

    /// Returns the diagnostic code this failure is reported under.
    #[must_use]
    pub const fn code(&self) -> DiagnosticCode {
        match self {
            Self::Template(_) => DiagnosticCode::Template,
            Self::Failed { .. } | Self::Panicked { .. } => DiagnosticCode::RuleFailed,
        }
    }
}

/// Rejection of a rule's options at registration time.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid options for rule '{rule}': {}", .reasons.join("; "))]
pub struct OptionValidationError {
    rule: String,
    reasons: Vec<String>,
}

impl OptionValidationError {
    /// Creates a validation error for `rule`.
    #[must_use]
    pub fn new(rule: impl Into<String>, reasons: Vec<String>) -> Self {
        Self {
            rule: rule.into(),
            reasons,
        }
    }

    /// Name of the rejected rule.
    #[must_use]
    pub fn rule(&self) -> &str {
        &self.rule
    }

    /// Why the options were rejected.
    #[must_use]
    pub fn reasons(&self) -> &[String] {
        &self.reasons
    }

    /// Converts the rejection into a registration diagnostic.
    #[must_use]
    pub fn to_diagnostic(&self) -> Diagnostic {
        self.reasons.iter().fold(
            Diagnostic::new(DiagnosticCode::InvalidOptions, self.to_string()).with_rule(&self.rule),
            |diagnostic, reason| diagnostic.with_note(reason),
        )
    }
}

/// Errors raised while assembling a rule catalogue.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum CatalogError {
    /// Two descriptors share a name.
    #[error("rule '{name}' is already registered")]
    DuplicateRule {
        /// The contested name.
        name: String,
    },
}

/// Terminal failure of one compilation unit.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
#[non_exhaustive]
pub enum UnitError {
    /// The unit does not parse; it is excluded from rewriting.
    #[error("parse error at {line}:{column}: {message}")]
    Parse {
        /// Parser message.
        message: String,
        /// One-based line of the first error.
        line: u32,
        /// One-based column of the first error.
        column: u32,
    },

    /// The rule set kept editing until the pass budget ran out.
    #[error("no fixed point after {passes} passes; the last pass made {last_pass_edits} edits")]
    NonConvergence {
        /// Passes run, equal to the budget.
        passes: u32,
        /// Edits applied by the final pass.
        last_pass_edits: usize,
    },

    /// Accepted edits could not be applied to the tree.
    #[error("failed to apply edits: {message}")]
    Edit {
        /// Description of the failure.
        message: String,
    },
}

impl UnitError {
    /// Converts a parser failure into a unit error.
    #[must_use]
    pub fn from_syntax(error: &SyntaxError) -> Self {
        let (line, column) = error.position().unwrap_or((1, 1));
        let message = match error {
            SyntaxError::Parse {
                message, context, ..
            } => format!("{message} near `{context}`"),
            other => other.to_string(),
        };
        Self::Parse {
            message,
            line,
            column,
        }
    }

    /// Returns the diagnostic code this failure is reported under.
    #[must_use]
    pub const fn code(&self) -> DiagnosticCode {
        match self {
            Self::Parse { .. } => DiagnosticCode::Parse,
            Self::NonConvergence { .. } => DiagnosticCode::NonConvergence,
            Self::Edit { .. } => DiagnosticCode::RuleFailed,
        }
    }

    /// Converts the failure into a diagnostic, located at `span` if known.
    #[must_use]
    pub fn to_diagnostic(&self, span: Option<Span>) -> Diagnostic {
        span.into_iter().fold(
            Diagnostic::new(self.code(), self.to_string()),
            Diagnostic::with_span,
        )
    }
}
