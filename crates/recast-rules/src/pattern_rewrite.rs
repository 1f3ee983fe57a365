//! A rule configured entirely from a pattern and a template.

use recast::{OptionKind, OptionSpec, Predicate, Rule, RuleDescriptor, RuleOptions};
use recast_syntax::InsertionContext;
use tracing::debug;

use crate::alternatives::{Alternatives, Arm, pattern, template};
use crate::error::RuleBuildError;

const PATTERN_TARGET: &str = "recast::rules::pattern_rewrite";

/// Stable rule name.
pub const NAME: &str = "pattern-rewrite";

const DEFAULT_CONTEXT: &str = "expression";

const OPTIONS: &[OptionSpec] = &[
    OptionSpec::required("pattern", OptionKind::Text, "structural pattern to match"),
    OptionSpec::required("template", OptionKind::Text, "replacement template"),
    OptionSpec::optional(
        "context",
        OptionKind::Text,
        "syntactic context of both snippets: expression, statement or member",
    ),
];

/// Builds a rule replacing every match of `pattern` with `template`.
///
/// Both snippets are compiled in the insertion context named by
/// `context_name`.
///
/// # Errors
///
/// Returns [`RuleBuildError`] if the context is unknown, either snippet
/// fails to compile, or the template uses a metavariable the pattern does
/// not bind.
pub fn pattern_rewrite(
    pattern_source: &str,
    template_source: &str,
    context_name: &str,
) -> Result<Alternatives, RuleBuildError> {
    let context = InsertionContext::from_name(context_name).ok_or_else(|| {
        RuleBuildError::UnknownContext {
            name: context_name.to_owned(),
        }
    })?;
    let compiled = pattern(pattern_source, context)?;
    let replacement = template(template_source, context)?;

    let mut unbound: Vec<String> = Vec::new();
    for variable in replacement.metavariables() {
        let bound = compiled
            .metavariables()
            .iter()
            .any(|candidate| candidate.name == variable.name);
        if !bound && !unbound.contains(&variable.name) {
            unbound.push(variable.name.clone());
        }
    }
    if !unbound.is_empty() {
        return Err(RuleBuildError::UnboundMetavariables { names: unbound });
    }

    debug!(
        target: PATTERN_TARGET,
        pattern = pattern_source,
        template = template_source,
        context = context.as_str(),
        "compiled pattern rewrite"
    );
    Ok(Alternatives::new(
        NAME,
        vec![Arm::new(Predicate::pattern(compiled), replacement)],
    ))
}

fn build(options: &RuleOptions) -> Result<Box<dyn Rule>, Vec<String>> {
    let pattern_source = options.text("pattern").unwrap_or_default();
    let template_source = options.text("template").unwrap_or_default();
    let context = options.text("context").unwrap_or(DEFAULT_CONTEXT);
    pattern_rewrite(pattern_source, template_source, context)
        .map(|rule| Box::new(rule) as Box<dyn Rule>)
        .map_err(RuleBuildError::into_reasons)
}

pub(crate) const DESCRIPTOR: RuleDescriptor = RuleDescriptor::new(
    NAME,
    "Replaces matches of a structural pattern with a template.",
    OPTIONS,
    build,
);
