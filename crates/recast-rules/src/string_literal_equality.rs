//! `x == "lit"` becomes `"lit".equals(x)`.
//!
//! Reference comparison of strings is almost always a mistake. The literal
//! moves to the receiver position whichever side it was written on, so the
//! rewritten call cannot throw on a null operand. The other operand must be
//! attributed exactly as `java.lang.String`; anything unresolved is left
//! alone.

use recast::{Predicate, Rule, RuleDescriptor, RuleOptions};
use recast_syntax::{InsertionContext, SyntaxKind};

use crate::alternatives::{Alternatives, Arm, pattern, string_typed, template};
use crate::error::RuleBuildError;

/// Stable rule name.
pub const NAME: &str = "string-literal-equality";

const SHAPES: [(&str, &str); 4] = [
    ("$X == $LIT", "$LIT.equals($X)"),
    ("$LIT == $X", "$LIT.equals($X)"),
    ("$X != $LIT", "!$LIT.equals($X)"),
    ("$LIT != $X", "!$LIT.equals($X)"),
];

/// Builds the rule.
///
/// # Errors
///
/// Returns [`RuleBuildError`] if one of the built-in snippets fails to
/// compile.
pub fn string_literal_equality() -> Result<Alternatives, RuleBuildError> {
    let arms = SHAPES
        .iter()
        .map(|(shape, replacement)| {
            let predicate = Predicate::pattern(pattern(shape, InsertionContext::Expression)?)
                .and(Predicate::capture("LIT", Predicate::kind(SyntaxKind::StringLiteral)))
                .and(Predicate::capture("X", string_typed()));
            Ok(Arm::new(
                predicate,
                template(replacement, InsertionContext::Expression)?,
            ))
        })
        .collect::<Result<Vec<_>, RuleBuildError>>()?;
    Ok(Alternatives::new(NAME, arms))
}

fn build(_options: &RuleOptions) -> Result<Box<dyn Rule>, Vec<String>> {
    string_literal_equality()
        .map(|rule| Box::new(rule) as Box<dyn Rule>)
        .map_err(RuleBuildError::into_reasons)
}

pub(crate) const DESCRIPTOR: RuleDescriptor = RuleDescriptor::new(
    NAME,
    "Compares strings against literals with `equals` instead of `==`.",
    &[],
    build,
);
