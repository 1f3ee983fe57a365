//! `s.equals("lit")` becomes `"lit".equals(s)`.
//!
//! With the literal as receiver the comparison is null-safe, which also
//! makes a preceding `s != null &&` guard redundant; the guarded form
//! collapses to the bare call. Receivers must be attributed exactly as
//! `java.lang.String` and must not themselves be literals.

use recast::{Predicate, Rule, RuleDescriptor, RuleOptions};
use recast_syntax::{InsertionContext, SyntaxKind};

use crate::alternatives::{Alternatives, Arm, pattern, string_typed, template};
use crate::error::RuleBuildError;

/// Stable rule name.
pub const NAME: &str = "equals-avoids-null";

const METHODS: [&str; 2] = ["equals", "equalsIgnoreCase"];

const GUARDS: [&str; 2] = ["$S != null && $S.{method}($LIT)", "null != $S && $S.{method}($LIT)"];

fn operands() -> Predicate {
    Predicate::capture(
        "S",
        string_typed().and(!Predicate::kind(SyntaxKind::StringLiteral)),
    )
    .and(Predicate::capture("LIT", Predicate::kind(SyntaxKind::StringLiteral)))
}

/// Builds the rule.
///
/// # Errors
///
/// Returns [`RuleBuildError`] if one of the built-in snippets fails to
/// compile.
pub fn equals_avoids_null() -> Result<Alternatives, RuleBuildError> {
    let mut guards = Vec::new();
    let mut calls = Vec::new();
    for method in METHODS {
        let replacement = template(&format!("$LIT.{method}($S)"), InsertionContext::Expression)?;
        for guard in GUARDS {
            let shape = Predicate::pattern(pattern(
                &guard.replace("{method}", method),
                InsertionContext::Expression,
            )?);
            guards.push(Arm::new(shape.and(operands()), replacement.clone()));
        }
        let call = pattern(&format!("$S.{method}($LIT)"), InsertionContext::Expression)?;
        calls.push(Arm::new(Predicate::pattern(call).and(operands()), replacement));
    }

    // A call under a null guard is rewritten together with its guard.
    let under_guard = Predicate::parent(Predicate::Or(
        guards.iter().map(|arm| arm.predicate().clone()).collect(),
    ));
    let arms = guards
        .into_iter()
        .chain(calls.into_iter().map(|arm| arm.unless(under_guard.clone())))
        .collect();
    Ok(Alternatives::new(NAME, arms))
}

fn build(_options: &RuleOptions) -> Result<Box<dyn Rule>, Vec<String>> {
    equals_avoids_null()
        .map(|rule| Box::new(rule) as Box<dyn Rule>)
        .map_err(RuleBuildError::into_reasons)
}

pub(crate) const DESCRIPTOR: RuleDescriptor = RuleDescriptor::new(
    NAME,
    "Puts string literals on the receiver side of `equals` calls.",
    &[],
    build,
);
