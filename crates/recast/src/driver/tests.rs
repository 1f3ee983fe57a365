//! Unit tests for the pass loop.

use std::sync::{Arc, Mutex};

use recast_syntax::{MatchResult, Node, Predicate, SyntaxKind, TypeTable, parse};

use super::*;
use crate::tests::support::Rename;

/// Records what the driver tells a rule about each site, then declines.
struct Probe {
    predicate: Predicate,
    seen: Mutex<Vec<(String, Vec<SyntaxKind>)>>,
}

impl Probe {
    fn new(kind: SyntaxKind) -> Self {
        Self {
            predicate: Predicate::kind(kind),
            seen: Mutex::new(Vec::new()),
        }
    }
}

impl Rule for Probe {
    fn name(&self) -> &str {
        "probe"
    }

    fn predicate(&self) -> &Predicate {
        &self.predicate
    }

    fn rewrite(
        &self,
        _found: &MatchResult,
        cx: &RewriteContext<'_>,
    ) -> Result<Option<Arc<Node>>, RuleError> {
        let ancestors = cx.ancestors().map(|node| node.kind()).collect();
        self.seen
            .lock()
            .expect("probe lock")
            .push((cx.indent().to_owned(), ancestors));
        Ok(None)
    }
}

fn drive(rules: &RuleSet, source: &str, max_passes: u32) -> (Result<Driven, UnitError>, Vec<Diagnostic>) {
    let tree = parse(source).expect("source parses");
    let oracle = TypeTable::with_jdk();
    let mut diagnostics = Vec::new();
    let outcome = Driver::new(rules, &oracle, max_passes).run(&tree, &mut diagnostics);
    (outcome, diagnostics)
}

#[test]
fn rules_see_the_indentation_and_ancestors_of_their_site() {
    let probe = Arc::new(Probe::new(SyntaxKind::ReturnStatement));
    let rules: RuleSet = std::iter::once(Arc::clone(&probe) as Arc<dyn Rule>).collect();
    let (outcome, _) = drive(
        &rules,
        "class A {\n    void f() {\n        return;\n    }\n}\n",
        10,
    );
    assert_eq!(outcome.expect("converges").passes(), 1);

    let seen = probe.seen.lock().expect("probe lock");
    let [(indent, ancestors)] = seen.as_slice() else {
        panic!("expected one visit, got {seen:?}");
    };
    assert_eq!(indent, "        ");
    assert_eq!(ancestors.first(), Some(&SyntaxKind::Block));
    assert!(ancestors.contains(&SyntaxKind::MethodDeclaration));
    assert_eq!(ancestors.last(), Some(&SyntaxKind::Program));
}

#[test]
fn edit_records_locate_the_replaced_node_in_its_snapshot() {
    let rules = RuleSet::new().with(Rename::new("a", "x"));
    let (outcome, diagnostics) = drive(&rules, "class A { int a; }", 10);
    let driven = outcome.expect("converges");

    assert_eq!(driven.tree().print(), "class A { int x; }");
    let [edit] = driven.edits() else {
        panic!("expected one edit, got {:?}", driven.edits());
    };
    assert_eq!(edit.rule(), "rename-a-x");
    assert_eq!(edit.pass(), 1);
    let span = edit.span().expect("edit span");
    assert_eq!((span.start_byte, span.end_byte), (14, 15));
    assert!(diagnostics.is_empty());
}

#[test]
fn a_zero_budget_still_scans_once() {
    let (outcome, _) = drive(&RuleSet::new(), "class A {}", 0);
    assert_eq!(outcome.expect("converges").passes(), 1);
}

#[test]
fn the_budget_counts_the_confirming_pass() {
    let rules = RuleSet::new().with(Rename::new("a", "x"));
    let (outcome, diagnostics) = drive(&rules, "class A { int a; }", 1);
    assert!(matches!(
        outcome,
        Err(UnitError::NonConvergence {
            passes: 1,
            last_pass_edits: 1
        })
    ));
    assert!(diagnostics.is_empty());
}

#[test]
fn panic_payloads_are_rendered_as_text() {
    let owned: Box<dyn Any + Send> = Box::new(String::from("owned"));
    let borrowed: Box<dyn Any + Send> = Box::new("borrowed");
    let opaque: Box<dyn Any + Send> = Box::new(7_u8);
    assert_eq!(panic_message(owned.as_ref()), "owned");
    assert_eq!(panic_message(borrowed.as_ref()), "borrowed");
    assert_eq!(panic_message(opaque.as_ref()), "non-string panic payload");
}
