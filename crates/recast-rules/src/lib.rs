//! Built-in Java rewrite rules for the recast engine.
//!
//! Every rule here is an ordinary [`recast::Rule`]; [`catalog`] returns a
//! [`Catalog`] with all of them registered under stable names so callers can
//! activate them from configuration.
//!
//! | Name | Rewrite |
//! |---|---|
//! | `add-serial-version-uid` | adds `serialVersionUID` to serialisable classes |
//! | `default-comes-last` | moves `default` to the end of a colon-style switch |
//! | `string-literal-equality` | `s == "x"` becomes `"x".equals(s)` |
//! | `equals-avoids-null` | `s.equals("x")` becomes `"x".equals(s)` |
//! | `upper-case-literal-suffixes` | `1l` becomes `1L` |
//! | `octal-literal-to-decimal` | `010` becomes `8` |
//! | `inline-variable` | `T v = e; return v;` becomes `return e;` |
//! | `catch-clause-only-rethrows` | drops catch clauses that only rethrow |
//! | `pattern-rewrite` | replaces a configured pattern with a template |
//!
//! The rules that consult types (`add-serial-version-uid`,
//! `string-literal-equality`, `equals-avoids-null` and
//! `catch-clause-only-rethrows`) decline wherever the type oracle cannot
//! decide.

mod alternatives;
pub mod catch_rethrow;
pub mod default_comes_last;
pub mod equals_avoids_null;
mod error;
pub mod inline_variable;
pub mod literals;
pub mod pattern_rewrite;
pub mod serial_version_uid;
pub mod string_literal_equality;

use recast::{Catalog, RuleDescriptor};
use tracing::warn;

pub use alternatives::Alternatives;
pub use catch_rethrow::CatchClauseOnlyRethrows;
pub use default_comes_last::DefaultComesLast;
pub use equals_avoids_null::equals_avoids_null;
pub use error::RuleBuildError;
pub use inline_variable::InlineVariable;
pub use literals::{OctalToDecimal, UpperCaseLiteralSuffixes};
pub use pattern_rewrite::pattern_rewrite;
pub use serial_version_uid::AddSerialVersionUid;
pub use string_literal_equality::string_literal_equality;

const RULES_TARGET: &str = "recast::rules";

const DESCRIPTORS: [RuleDescriptor; 9] = [
    serial_version_uid::DESCRIPTOR,
    default_comes_last::DESCRIPTOR,
    string_literal_equality::DESCRIPTOR,
    equals_avoids_null::DESCRIPTOR,
    literals::UPPER_CASE_DESCRIPTOR,
    literals::OCTAL_DESCRIPTOR,
    inline_variable::DESCRIPTOR,
    catch_rethrow::DESCRIPTOR,
    pattern_rewrite::DESCRIPTOR,
];

/// Returns a catalogue holding every built-in rule.
#[must_use]
pub fn catalog() -> Catalog {
    let mut catalog = Catalog::new();
    for descriptor in DESCRIPTORS {
        if let Err(err) = catalog.register(descriptor) {
            warn!(target: RULES_TARGET, error = %err, "built-in rule not registered");
        }
    }
    catalog
}

#[cfg(test)]
mod test_support;

#[cfg(test)]
mod tests;
