//! Unit tests for the built-in catalogue.

use recast::{DiagnosticCode, RuleOptions, RuleRequest};
use rstest::rstest;

use crate::catalog;

const OPTIONLESS: [&str; 8] = [
    "add-serial-version-uid",
    "default-comes-last",
    "string-literal-equality",
    "equals-avoids-null",
    "upper-case-literal-suffixes",
    "octal-literal-to-decimal",
    "inline-variable",
    "catch-clause-only-rethrows",
];

#[test]
fn every_built_in_rule_is_registered_once() {
    let names = catalog().names();
    let mut expected = OPTIONLESS.to_vec();
    expected.push("pattern-rewrite");
    assert_eq!(names, expected);
}

#[test]
fn optionless_rules_activate_under_their_catalogue_names() {
    let requests: Vec<RuleRequest> = OPTIONLESS.iter().copied().map(RuleRequest::new).collect();
    let activation = catalog().activate(&requests);
    assert!(activation.rejected().is_empty(), "{:?}", activation.rejected());
    assert_eq!(activation.rules().names(), OPTIONLESS.to_vec());
}

#[rstest]
#[case::missing_template(
    RuleOptions::new().with("pattern", "$X + 0"),
    "missing required option 'template'"
)]
#[case::unknown_context(
    RuleOptions::new().with("pattern", "$X").with("template", "$X").with("context", "file"),
    "unknown insertion context 'file'"
)]
#[case::wrong_kind(
    RuleOptions::new().with("pattern", "$X").with("template", 1_i64),
    "option 'template' expects text, got integer"
)]
#[case::unexpected_option(
    RuleOptions::new().with("pattern", "$X").with("template", "$X").with("limit", 2_i64),
    "unknown option 'limit'"
)]
fn pattern_rewrite_options_are_validated(#[case] options: RuleOptions, #[case] reason: &str) {
    let request = RuleRequest::new("pattern-rewrite").with_options(options);
    let activation = catalog().activate(&[request]);

    assert!(activation.rules().is_empty());
    let [rejected] = activation.rejected() else {
        panic!("expected one rejection, got {:?}", activation.rejected());
    };
    assert_eq!(rejected.reasons(), [reason]);
    let diagnostics = activation.diagnostics();
    assert!(
        diagnostics
            .iter()
            .all(|diagnostic| diagnostic.code() == DiagnosticCode::InvalidOptions)
    );
}

#[test]
fn statement_patterns_activate_with_a_context() {
    let options = RuleOptions::new()
        .with("pattern", "if ($C) { return true; } else { return false; }")
        .with("template", "return $C;")
        .with("context", "statement");
    let activation = catalog().activate(&[RuleRequest::new("pattern-rewrite").with_options(options)]);
    assert!(activation.rejected().is_empty(), "{:?}", activation.rejected());
    assert_eq!(activation.rules().names(), vec!["pattern-rewrite"]);
}
