//! Recast: a fixed-point rewrite engine for Java compilation units.
//!
//! This crate drives [`Rule`]s over trees produced by [`recast_syntax`]. A
//! rule pairs a [`recast_syntax::Predicate`] with a rewrite function; the
//! [`Driver`] evaluates every active rule against every node of an immutable
//! snapshot, resolves overlapping edits, applies the rest in one structural
//! replacement and repeats until a pass changes nothing.
//!
//! # Core types
//!
//! - [`Rule`], [`RewriteContext`] and [`RuleSet`]: the rule contract
//! - [`OptionSpec`], [`RuleOptions`] and [`validate_options`]: typed options
//!   validated before any matching
//! - [`Catalog`] and [`RuleDescriptor`]: the explicit name-to-rule table
//! - [`Driver`]: the per-unit pass loop
//! - [`Engine`] and [`SourceUnit`]: parsing, driving and parallel batches
//! - [`UnitReport`], [`Rewritten`] and [`EditRecord`]: structured results
//! - [`bootstrap`] and [`Host`]: layered configuration, telemetry and an
//!   engine limited by both
//!
//! # Failure scoping
//!
//! A rule that fails or panics costs one application and yields a
//! [`Diagnostic`]. Overlapping edits lose to the outermost edit, then to the
//! earlier-declared rule, and are reported. A unit that does not parse or
//! does not converge fails alone with a [`UnitError`]; the batch continues.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use recast::{Engine, MatchResult, Predicate, RewriteContext, Rule, RuleError, RuleSet, SourceUnit};
//! use recast_syntax::{Node, SyntaxKind, TypeTable};
//!
//! struct UpperLong(Predicate);
//!
//! impl Rule for UpperLong {
//!     fn name(&self) -> &str {
//!         "upper-long"
//!     }
//!
//!     fn predicate(&self) -> &Predicate {
//!         &self.0
//!     }
//!
//!     fn rewrite(
//!         &self,
//!         found: &MatchResult,
//!         _cx: &RewriteContext<'_>,
//!     ) -> Result<Option<Arc<Node>>, RuleError> {
//!         let text = found.node().text();
//!         let Some(digits) = text.strip_suffix('l') else {
//!             return Ok(None);
//!         };
//!         let token = recast_syntax::Token::synthetic("", format!("{digits}L"));
//!         Ok(Some(Arc::new(Node::leaf(found.node().kind(), token))))
//!     }
//! }
//!
//! let rules = RuleSet::new().with(UpperLong(Predicate::kind(SyntaxKind::DecimalIntegerLiteral)));
//! let engine = Engine::new(rules, Arc::new(TypeTable::with_jdk()));
//! let report = engine.run(&SourceUnit::new("A.java", "class A { long x = 1l; }"));
//! let rewritten = report.outcome().expect("converges");
//! assert_eq!(rewritten.source(), "class A { long x = 1L; }");
//! assert_eq!(rewritten.passes(), 2);
//! ```

mod bootstrap;
mod catalog;
mod driver;
mod engine;
mod error;
mod options;
mod report;
mod rule;
pub mod telemetry;

pub use bootstrap::{
    BootstrapError, ConfigLoader, Host, SystemConfigLoader, bootstrap, bootstrap_with,
};
pub use catalog::{Activation, Catalog, RuleDescriptor, RuleFactory, RuleRequest};
pub use driver::{Driven, Driver};
pub use engine::{Engine, SourceUnit};
pub use error::{CatalogError, OptionValidationError, RuleError, UnitError};
pub use options::{OptionKind, OptionSpec, OptionValue, RuleOptions, validate_options};
pub use recast_core::{Diagnostic, DiagnosticCode, DiagnosticReport, EngineConfig, Span};
pub use recast_syntax::{MatchResult, Predicate};
pub use report::{EditRecord, Rewritten, UnitReport};
pub use rule::{RewriteContext, Rule, RuleSet};

#[cfg(test)]
mod tests;
