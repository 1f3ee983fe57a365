//! Core data model shared by every layer of the Recast rewrite engine.
//!
//! This crate holds the plain value types that cross crate boundaries:
//! source locations, structured diagnostics, and the engine limits that
//! bound a rewrite run. It has no knowledge of syntax trees or rules, so the
//! syntax layer, the pass driver, and external reporting tools can all
//! depend on it without pulling in parsers.
//!
//! # Core types
//!
//! - [`Span`] and [`LineCol`]: byte and line/column source positions
//! - [`Diagnostic`], [`DiagnosticCode`], and [`DiagnosticReport`]:
//!   structured reporting for rule, unit, and registration failures
//! - [`EngineConfig`]: pass budget and worker pool sizing
//!
//! # Example
//!
//! ```
//! use recast_core::{LineCol, Span};
//!
//! let span = Span::new(0, 10, LineCol::new(1, 1), LineCol::new(1, 11));
//! assert_eq!(span.len(), 10);
//! ```

mod config;
mod diagnostic;
mod span;

pub use config::{DEFAULT_MAX_PASSES, EngineConfig};
pub use diagnostic::{Diagnostic, DiagnosticCode, DiagnosticReport};
pub use span::{LineCol, Span};

#[cfg(test)]
mod tests;
