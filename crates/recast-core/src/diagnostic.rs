//! Diagnostic types for structured error reporting.
//!
//! Every non-fatal problem encountered while rewriting a batch is surfaced
//! as a [`Diagnostic`]: rule failures, options that did not validate,
//! overlapping edits that lost conflict resolution, and units that failed to
//! parse or converge. Each diagnostic carries a stable [`DiagnosticCode`], a
//! message, the name of the rule involved when there is one, an optional
//! source location, and supplementary notes.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::Span;

/// Stable error codes for Recast diagnostics.
///
/// # Example
///
/// ```
/// use recast_core::DiagnosticCode;
///
/// let code = DiagnosticCode::NonConvergence;
/// assert_eq!(format!("{code}"), "E_RECAST_NON_CONVERGENCE");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
pub enum DiagnosticCode {
    /// A compilation unit could not be parsed.
    #[serde(rename = "E_RECAST_PARSE")]
    Parse,
    /// A template failed to instantiate.
    #[serde(rename = "E_RECAST_TEMPLATE")]
    Template,
    /// A candidate edit overlapped another and was deferred to a later pass.
    #[serde(rename = "E_RECAST_MATCH_CONFLICT")]
    MatchConflict,
    /// A unit still produced edits when the pass budget ran out.
    #[serde(rename = "E_RECAST_NON_CONVERGENCE")]
    NonConvergence,
    /// A rule activation request carried invalid options.
    #[serde(rename = "E_RECAST_INVALID_OPTIONS")]
    InvalidOptions,
    /// A rule returned an error or panicked during rewrite.
    #[serde(rename = "E_RECAST_RULE_FAILED")]
    RuleFailed,
}

impl DiagnosticCode {
    /// Returns the stable string form of the code.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Parse => "E_RECAST_PARSE",
            Self::Template => "E_RECAST_TEMPLATE",
            Self::MatchConflict => "E_RECAST_MATCH_CONFLICT",
            Self::NonConvergence => "E_RECAST_NON_CONVERGENCE",
            Self::InvalidOptions => "E_RECAST_INVALID_OPTIONS",
            Self::RuleFailed => "E_RECAST_RULE_FAILED",
        }
    }

    /// Returns `true` when the code describes a recoverable condition that
    /// did not prevent the unit from producing output.
    #[must_use]
    pub const fn is_advisory(self) -> bool {
        matches!(self, Self::MatchConflict)
    }
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single diagnostic entry.
///
/// # Example
///
/// ```
/// use recast_core::{Diagnostic, DiagnosticCode};
///
/// let diag = Diagnostic::new(DiagnosticCode::RuleFailed, "boom")
///     .with_rule("inline-variable")
///     .with_note("the rule panicked");
/// assert_eq!(diag.code(), DiagnosticCode::RuleFailed);
/// assert_eq!(diag.rule(), Some("inline-variable"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// The stable error code.
    code: DiagnosticCode,
    /// A human-readable description of the problem.
    message: String,
    /// The rule that produced or triggered the diagnostic, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    rule: Option<String>,
    /// The source location where the problem was detected, if available.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    span: Option<Span>,
    /// Additional notes providing context.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    notes: Vec<String>,
}

impl Diagnostic {
    /// Creates a diagnostic with no rule, span, or notes.
    #[must_use]
    pub fn new(code: DiagnosticCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            rule: None,
            span: None,
            notes: Vec::new(),
        }
    }

    /// Attaches the name of the rule involved.
    #[must_use]
    pub fn with_rule(mut self, rule: impl Into<String>) -> Self {
        self.rule = Some(rule.into());
        self
    }

    /// Attaches a source span.
    #[must_use]
    pub const fn with_span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    /// Appends a supplementary note.
    #[must_use]
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    /// Returns the diagnostic code.
    #[must_use]
    pub const fn code(&self) -> DiagnosticCode {
        self.code
    }

    /// Returns the diagnostic message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the rule name, if any.
    #[must_use]
    pub fn rule(&self) -> Option<&str> {
        self.rule.as_deref()
    }

    /// Returns the source span, if available.
    #[must_use]
    pub const fn span(&self) -> Option<&Span> {
        self.span.as_ref()
    }

    /// Returns the supplementary notes.
    #[must_use]
    pub fn notes(&self) -> &[String] {
        &self.notes
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code)?;
        if let Some(rule) = &self.rule {
            write!(f, " [{rule}]")?;
        }
        if let Some(span) = &self.span {
            write!(f, " at {}", span.start)?;
        }
        write!(f, ": {}", self.message)
    }
}

/// Summarises the first diagnostic in a report for the `Display` impl.
fn diagnostic_summary(diagnostics: &[Diagnostic]) -> String {
    match diagnostics {
        [] => String::from("empty diagnostic report"),
        [only] => only.to_string(),
        [first, rest @ ..] => format!("{first} (and {} more)", rest.len()),
    }
}

/// A collection of diagnostics returned when a whole request fails.
///
/// # Example
///
/// ```
/// use recast_core::{Diagnostic, DiagnosticCode, DiagnosticReport};
///
/// let report = DiagnosticReport::new(vec![Diagnostic::new(
///     DiagnosticCode::InvalidOptions,
///     "unknown rule 'nope'",
/// )]);
/// assert_eq!(report.len(), 1);
/// assert_eq!(
///     report.to_string(),
///     "E_RECAST_INVALID_OPTIONS: unknown rule 'nope'"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("{}", diagnostic_summary(&self.diagnostics))]
pub struct DiagnosticReport {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticReport {
    /// Creates a report from a vector of diagnostics.
    #[must_use]
    pub const fn new(diagnostics: Vec<Diagnostic>) -> Self {
        Self { diagnostics }
    }

    /// Returns the diagnostics in this report.
    #[must_use]
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Consumes the report and returns its diagnostics.
    #[must_use]
    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }

    /// Returns `true` if the report contains no diagnostics.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Returns the number of diagnostics in the report.
    #[must_use]
    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }
}
