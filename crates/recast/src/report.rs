//! Structured per-unit results.

use camino::Utf8PathBuf;
use recast_core::{Diagnostic, Span};
use serde::{Deserialize, Serialize};

use crate::error::UnitError;

/// One applied edit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditRecord {
    rule: String,
    span: Option<Span>,
    pass: u32,
}

impl EditRecord {
    /// Records an edit by `rule` at `span` of the snapshot `pass` scanned.
    #[must_use]
    pub fn new(rule: impl Into<String>, span: Option<Span>, pass: u32) -> Self {
        Self {
            rule: rule.into(),
            span,
            pass,
        }
    }

    /// Name of the rule that made the edit.
    #[must_use]
    pub fn rule(&self) -> &str {
        &self.rule
    }

    /// Location of the replaced node in the pass snapshot.
    #[must_use]
    pub const fn span(&self) -> Option<&Span> {
        self.span.as_ref()
    }

    /// One-based pass number.
    #[must_use]
    pub const fn pass(&self) -> u32 {
        self.pass
    }
}

/// A unit that reached a fixed point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rewritten {
    source: String,
    edits: Vec<EditRecord>,
    passes: u32,
}

impl Rewritten {
    /// Creates a result.
    #[must_use]
    pub const fn new(source: String, edits: Vec<EditRecord>, passes: u32) -> Self {
        Self {
            source,
            edits,
            passes,
        }
    }

    /// Printed source after every edit.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Applied edits in pass order.
    #[must_use]
    pub fn edits(&self) -> &[EditRecord] {
        &self.edits
    }

    /// Passes run, including the final pass that found nothing to do.
    #[must_use]
    pub const fn passes(&self) -> u32 {
        self.passes
    }

    /// Returns `true` when at least one edit was applied.
    #[must_use]
    pub fn is_changed(&self) -> bool {
        !self.edits.is_empty()
    }
}

/// Outcome of running the engine over one compilation unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitReport {
    path: Utf8PathBuf,
    outcome: Result<Rewritten, UnitError>,
    diagnostics: Vec<Diagnostic>,
}

impl UnitReport {
    /// Creates a report.
    #[must_use]
    pub const fn new(
        path: Utf8PathBuf,
        outcome: Result<Rewritten, UnitError>,
        diagnostics: Vec<Diagnostic>,
    ) -> Self {
        Self {
            path,
            outcome,
            diagnostics,
        }
    }

    /// Path of the unit.
    #[must_use]
    pub fn path(&self) -> &Utf8PathBuf {
        &self.path
    }

    /// Rewritten unit or terminal error.
    #[must_use]
    pub const fn outcome(&self) -> Result<&Rewritten, &UnitError> {
        self.outcome.as_ref()
    }

    /// Consumes the report, returning the outcome.
    #[must_use]
    pub fn into_outcome(self) -> Result<Rewritten, UnitError> {
        self.outcome
    }

    /// Non-fatal events and the terminal error, in the order they occurred.
    #[must_use]
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }
}
