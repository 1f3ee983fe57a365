//! Unit-level behaviour of the engine: passes, conflicts, failures, batches.

use insta::assert_snapshot;
use recast_syntax::{Predicate, SyntaxKind, TypeTest};
use rstest::rstest;

use super::support::{Broken, DropAddZero, Echo, Fault, Rename, engine};
use crate::{DiagnosticCode, EngineConfig, RuleSet, SourceUnit, UnitError, UnitReport};

fn unit(source: &str) -> SourceUnit {
    SourceUnit::new("Example.java", source)
}

fn edits_by_pass(report: &UnitReport) -> Vec<(String, u32)> {
    report
        .outcome()
        .expect("unit converges")
        .edits()
        .iter()
        .map(|edit| (edit.rule().to_owned(), edit.pass()))
        .collect()
}

/// Renders a report as the pass log a host would print.
fn pass_log(report: &UnitReport) -> String {
    let mut lines = vec![format!("path: {}", report.path())];
    match report.outcome() {
        Ok(rewritten) => {
            lines.push(format!("passes: {}", rewritten.passes()));
            lines.extend(
                rewritten
                    .edits()
                    .iter()
                    .map(|edit| format!("edit pass={} rule={}", edit.pass(), edit.rule())),
            );
        }
        Err(error) => lines.push(format!("failed: {error}")),
    }
    lines.extend(report.diagnostics().iter().map(|diagnostic| {
        format!(
            "diagnostic {} rule={}",
            diagnostic.code(),
            diagnostic.rule().unwrap_or("-")
        )
    }));
    if let Ok(rewritten) = report.outcome() {
        lines.push(String::from("---"));
        lines.push(rewritten.source().to_owned());
    }
    lines.join("\n")
}

#[test]
fn disjoint_edits_land_in_one_pass() {
    let rules = RuleSet::new()
        .with(Rename::new("a", "x"))
        .with(Rename::new("b", "y"));
    let report = engine(rules).run(&unit("class A { int a; int b; }"));

    let rewritten = report.outcome().expect("unit converges");
    assert_eq!(rewritten.source(), "class A { int x; int y; }");
    assert_eq!(rewritten.passes(), 2);
    assert_eq!(
        edits_by_pass(&report),
        vec![(String::from("rename-a-x"), 1), (String::from("rename-b-y"), 1)]
    );
    assert!(report.diagnostics().is_empty());
}

#[test]
fn untouched_text_survives_byte_for_byte() {
    let source = "class A {\n\t// keep\n\tint a;   /* odd */\n\n\tint  keep = 0x1F;\n}\n";
    let report = engine(RuleSet::new().with(Rename::new("a", "renamed"))).run(&unit(source));
    assert_eq!(
        report.outcome().expect("unit converges").source(),
        "class A {\n\t// keep\n\tint renamed;   /* odd */\n\n\tint  keep = 0x1F;\n}\n"
    );
}

#[rstest]
#[case::outer_rule_first(RuleSet::new().with(DropAddZero::new()).with(Rename::new("a", "x")))]
#[case::outer_rule_last(RuleSet::new().with(Rename::new("a", "x")).with(DropAddZero::new()))]
fn outermost_edit_wins_and_the_inner_one_retries(#[case] rules: RuleSet) {
    let report = engine(rules).run(&unit("class A { int f(int a) { return a + 0; } }"));

    let rewritten = report.outcome().expect("unit converges");
    assert_eq!(rewritten.source(), "class A { int f(int x) { return x; } }");
    assert_eq!(rewritten.passes(), 3);
    assert_eq!(
        edits_by_pass(&report),
        vec![
            (String::from("rename-a-x"), 1),
            (String::from("drop-add-zero"), 1),
            (String::from("rename-a-x"), 2),
        ]
    );

    let [conflict] = report.diagnostics() else {
        panic!("expected one diagnostic, got {:?}", report.diagnostics());
    };
    assert_eq!(conflict.code(), DiagnosticCode::MatchConflict);
    assert_eq!(conflict.rule(), Some("rename-a-x"));
}

#[test]
fn conflict_resolution_is_repeatable() {
    let engine = engine(
        RuleSet::new()
            .with(Rename::new("a", "x"))
            .with(DropAddZero::new()),
    );
    let input = unit("class A { int f(int a) { return (a + 0) + 0; } }");
    let first = engine.run(&input);
    for _ in 0..5 {
        assert_eq!(engine.run(&input), first);
    }
}

#[test]
fn a_second_run_over_the_output_is_a_no_op() {
    let engine = engine(
        RuleSet::new()
            .with(DropAddZero::new())
            .with(Rename::new("a", "x")),
    );
    let first = engine.run(&unit("class A { int f(int a) { return a + 0; } }"));
    let output = first.outcome().expect("unit converges").source().to_owned();

    let second = engine.run(&unit(&output));
    let rewritten = second.outcome().expect("unit converges");
    assert_eq!(rewritten.source(), output);
    assert_eq!(rewritten.passes(), 1);
    assert!(!rewritten.is_changed());
}

#[test]
fn oscillating_rules_fail_with_non_convergence() {
    let rules = RuleSet::new()
        .with(Rename::new("a", "b"))
        .with(Rename::new("b", "a"));
    let report = engine(rules)
        .with_max_passes(4)
        .run(&unit("class A { int a; }"));

    assert_eq!(
        report.outcome(),
        Err(&UnitError::NonConvergence {
            passes: 4,
            last_pass_edits: 1,
        })
    );
    let last = report.diagnostics().last().expect("terminal diagnostic");
    assert_eq!(last.code(), DiagnosticCode::NonConvergence);
}

#[rstest]
#[case::panic_in_rewrite(Fault::PanicInRewrite, DiagnosticCode::RuleFailed)]
#[case::panic_in_predicate(Fault::PanicInPredicate, DiagnosticCode::RuleFailed)]
#[case::rule_error(Fault::Fail, DiagnosticCode::RuleFailed)]
#[case::unbound_template(Fault::UnboundTemplate, DiagnosticCode::Template)]
fn failing_rules_cost_only_their_own_application(
    #[case] fault: Fault,
    #[case] code: DiagnosticCode,
) {
    let rules = RuleSet::new()
        .with(Broken::new(fault))
        .with(Rename::new("a", "x"));
    let report = engine(rules).run(&unit("class A { int boom; long a; }"));

    assert_eq!(
        report.outcome().expect("unit converges").source(),
        "class A { int boom; long x; }"
    );
    let failures: Vec<_> = report
        .diagnostics()
        .iter()
        .filter(|diagnostic| diagnostic.rule() == Some("broken"))
        .collect();
    assert!(!failures.is_empty());
    assert!(failures.iter().all(|diagnostic| diagnostic.code() == code));
}

#[test]
fn repeated_failures_at_one_site_are_reported_once() {
    let rules = RuleSet::new()
        .with(Broken::new(Fault::Fail))
        .with(Rename::new("a", "x"));
    let report = engine(rules).run(&unit("class A { int boom; long a; }"));
    assert_eq!(report.diagnostics().len(), 1);
}

#[test]
fn identical_replacements_are_not_edits() {
    let rules = RuleSet::new().with(Echo(Predicate::kind(SyntaxKind::ClassDeclaration)));
    let report = engine(rules).run(&unit("class A { int a; }"));
    let rewritten = report.outcome().expect("unit converges");
    assert_eq!(rewritten.passes(), 1);
    assert!(!rewritten.is_changed());
}

#[test]
fn type_gated_rules_apply_where_the_type_is_known() {
    let rules = RuleSet::new().with(Rename::gated(
        "s",
        "t",
        TypeTest::Exact(String::from("java.lang.String")),
    ));
    let report = engine(rules).run(&unit("class A { String f(String s) { return s; } }"));
    assert_eq!(
        report.outcome().expect("unit converges").source(),
        "class A { String f(String s) { return t; } }"
    );
}

#[test]
fn type_gated_rules_decline_when_the_type_is_unknown() {
    let rules = RuleSet::new().with(Rename::gated(
        "m",
        "n",
        TypeTest::SubtypeOf(String::from("java.io.Serializable")),
    ));
    let source = "class A { Object f(Missing m) { return m; } }";
    let report = engine(rules).run(&unit(source));

    let rewritten = report.outcome().expect("unit converges");
    assert_eq!(rewritten.source(), source);
    assert!(report.diagnostics().is_empty());
}

#[test]
fn unparsable_units_are_excluded_without_blocking_the_batch() {
    let engine = engine(RuleSet::new().with(Rename::new("a", "x")));
    let units = vec![
        SourceUnit::new("Broken.java", "class Broken { int = ; }"),
        SourceUnit::new("Fine.java", "class Fine { int a; }"),
    ];
    let reports = engine.run_batch(&units);

    let [broken, fine] = reports.as_slice() else {
        panic!("expected two reports, got {}", reports.len());
    };
    assert_eq!(broken.path().as_str(), "Broken.java");
    assert!(matches!(broken.outcome(), Err(UnitError::Parse { .. })));
    assert_eq!(
        broken.diagnostics().last().map(crate::Diagnostic::code),
        Some(DiagnosticCode::Parse)
    );
    assert_eq!(
        fine.outcome().expect("unit converges").source(),
        "class Fine { int x; }"
    );
}

#[test]
fn dedicated_worker_pools_preserve_input_order() {
    let engine = engine(RuleSet::new().with(Rename::new("a", "x")))
        .with_config(EngineConfig::new(10, Some(2)));
    let units: Vec<SourceUnit> = (0..8)
        .map(|index| SourceUnit::new(format!("U{index}.java"), format!("class U{index} {{ int a; }}")))
        .collect();

    let reports = engine.run_batch(&units);
    let outputs: Vec<String> = reports
        .iter()
        .map(|report| report.outcome().expect("unit converges").source().to_owned())
        .collect();
    let expected: Vec<String> = (0..8)
        .map(|index| format!("class U{index} {{ int x; }}"))
        .collect();
    assert_eq!(outputs, expected);
}

#[test]
fn conflicting_edits_leave_a_readable_pass_log() {
    let rules = RuleSet::new()
        .with(DropAddZero::new())
        .with(Rename::new("a", "x"));
    let report = engine(rules).run(&unit("class A { int f(int a) { return a + 0; } }"));

    assert_snapshot!(pass_log(&report), @r"
    path: Example.java
    passes: 3
    edit pass=1 rule=rename-a-x
    edit pass=1 rule=drop-add-zero
    edit pass=2 rule=rename-a-x
    diagnostic E_RECAST_MATCH_CONFLICT rule=rename-a-x
    ---
    class A { int f(int x) { return x; } }
    ");
}

#[test]
fn batch_reports_read_in_input_order() {
    let engine = engine(RuleSet::new().with(Rename::new("a", "x")))
        .with_config(EngineConfig::new(10, Some(2)));
    let units = vec![
        SourceUnit::new("First.java", "class First { int a; }"),
        SourceUnit::new("Second.java", "class Second { int b; }"),
    ];
    let logs: Vec<String> = engine.run_batch(&units).iter().map(pass_log).collect();

    assert_snapshot!(logs.join("\n"), @r"
    path: First.java
    passes: 2
    edit pass=1 rule=rename-a-x
    ---
    class First { int x; }
    path: Second.java
    passes: 1
    ---
    class Second { int b; }
    ");
}
