//! Helpers for running rules in unit tests.

use std::sync::Arc;

use recast::{Engine, Rule, RuleSet, SourceUnit, UnitReport};
use recast_syntax::TypeTable;

/// Runs `rules` over `source` with the JDK type table.
pub(crate) fn run(rules: RuleSet, source: &str) -> UnitReport {
    Engine::new(rules, Arc::new(TypeTable::with_jdk())).run(&SourceUnit::new("Example.java", source))
}

/// Runs a single rule to a fixed point and returns the printed unit.
pub(crate) fn rewrite(rule: impl Rule + 'static, source: &str) -> String {
    let report = run(RuleSet::new().with(rule), source);
    let rewritten = report
        .outcome()
        .unwrap_or_else(|err| panic!("unit should converge: {err}"));
    assert!(
        report.diagnostics().is_empty(),
        "unexpected diagnostics: {:?}",
        report.diagnostics()
    );
    rewritten.source().to_owned()
}
