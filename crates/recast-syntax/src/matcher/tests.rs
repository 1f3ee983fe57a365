use rstest::rstest;

use super::*;

use crate::context::InsertionContext;
use crate::kind::SyntaxKind;
use crate::parser::parse;
use crate::types::{PrimitiveType, TypeDescriptor, TypeTable};

fn tree(source: &str) -> Tree {
    parse(source).expect("parse")
}

fn method_body(statements: &str) -> Tree {
    tree(&format!("class A {{\n    void f(String s) {{\n        {statements}\n    }}\n}}\n"))
}

#[test]
fn find_literal_pattern() {
    let source = method_body("int x = 1;");
    let pattern = Pattern::statement("int x = 1;").expect("pattern");

    assert_eq!(pattern.find_all(&source).len(), 1);
}

#[test]
fn whitespace_and_comments_are_ignored() {
    let source = method_body("int   x =\n /* one */ 1;");
    let pattern = Pattern::statement("int x = 1;").expect("pattern");

    assert!(pattern.find_first(&source).is_some());
}

#[test]
fn capture_metavariable_text() {
    let source = method_body("s.equals(\"a\");");
    let pattern = Pattern::expression("$X.equals($Y)").expect("pattern");

    let found = pattern.find_first(&source).expect("should find a match");
    assert_eq!(found.bindings().text("X").as_deref(), Some("s"));
    assert_eq!(found.bindings().text("Y").as_deref(), Some("\"a\""));
    assert_eq!(found.text(), "s.equals(\"a\")");
}

#[test]
fn no_match_returns_empty() {
    let source = method_body("s.hashCode();");
    let pattern = Pattern::expression("$X.equals($Y)").expect("pattern");

    assert!(pattern.find_all(&source).is_empty());
}

#[test]
fn operator_tokens_must_match() {
    let source = method_body("int x = 1 - 2;");
    let pattern = Pattern::expression("1 + 2").expect("pattern");

    assert!(pattern.find_first(&source).is_none());
}

#[rstest]
#[case::same("a == a", true)]
#[case::spaced("a ==  a", true)]
#[case::different("a == b", false)]
fn repeated_metavariable_requires_equal_code(#[case] expression: &str, #[case] expected: bool) {
    let source = method_body(&format!("boolean t = {expression};"));
    let pattern = Pattern::expression("$X == $X").expect("pattern");

    assert_eq!(pattern.find_first(&source).is_some(), expected);
}

#[test]
fn wildcard_never_binds() {
    let source = method_body("boolean t = a == b;");
    let pattern = Pattern::expression("$_ == $_").expect("pattern");

    let found = pattern.find_first(&source).expect("match");
    assert!(found.bindings().is_empty());
}

#[test]
fn sequence_metavariable_captures_arguments() {
    let source = method_body("call(a, b, c);");
    let pattern = Pattern::expression("call($$$ARGS)").expect("pattern");

    let found = pattern.find_first(&source).expect("match");
    let args = found.capture("ARGS").expect("ARGS bound");
    assert_eq!(args.text(), "a, b, c");
    assert_eq!(args.as_multiple().map(<[_]>::len), Some(5));
}

#[test]
fn sequence_metavariable_can_match_empty() {
    let source = method_body("call();");
    let pattern = Pattern::expression("call($$$ARGS)").expect("pattern");

    let found = pattern.find_first(&source).expect("match");
    let args = found.capture("ARGS").expect("ARGS bound");
    assert_eq!(args.as_multiple().map(<[_]>::len), Some(0));
    assert_eq!(args.text(), "");
}

#[test]
fn sequence_metavariable_respects_following_element() {
    let source = method_body("call(a, b, last);");
    let pattern = Pattern::expression("call($$$REST, last)").expect("pattern");

    let found = pattern.find_first(&source).expect("match");
    assert_eq!(found.bindings().text("REST").as_deref(), Some("a, b"));
}

#[test]
fn outer_matches_come_before_inner_ones() {
    let source = method_body("boolean t = a.equals(b.equals(c));");
    let pattern = Pattern::expression("$X.equals($Y)").expect("pattern");

    let found = pattern.find_all(&source);
    let texts: Vec<String> = found.iter().map(MatchResult::text).collect();
    assert_eq!(texts, vec!["a.equals(b.equals(c))", "b.equals(c)"]);
}

#[test]
fn match_span_is_one_based() {
    let source = method_body("s.equals(\"a\");");
    let map = SourceMap::new(&source);
    let pattern = Pattern::expression("$X.equals($Y)").expect("pattern");

    let found = pattern.find_first(&source).expect("match");
    let span = found.span(&map).expect("span");
    assert_eq!(span.start().line(), 3);
    assert_eq!(span.start().column(), 9);
}

#[rstest]
#[case::dollar_pair("$$X")]
#[case::lowercase("$x")]
#[case::bare("$")]
fn malformed_metavariables_are_rejected(#[case] source: &str) {
    let err = Pattern::expression(source).expect_err("should fail");
    assert!(matches!(err, crate::SyntaxError::InvalidMetavariable { .. }));
}

#[test]
fn multi_statement_pattern_is_rejected() {
    let err = Pattern::statement("a(); b();").expect_err("two statements");
    assert!(matches!(
        err,
        crate::SyntaxError::PatternCompile {
            context: InsertionContext::Statement,
            ..
        }
    ));
}

#[rstest]
#[case(Verdict::Match, Verdict::Unknown, Verdict::Unknown, Verdict::Match)]
#[case(Verdict::NoMatch, Verdict::Unknown, Verdict::NoMatch, Verdict::Unknown)]
#[case(Verdict::Match, Verdict::NoMatch, Verdict::NoMatch, Verdict::Match)]
#[case(Verdict::Unknown, Verdict::Unknown, Verdict::Unknown, Verdict::Unknown)]
fn verdicts_follow_kleene_logic(
    #[case] left: Verdict,
    #[case] right: Verdict,
    #[case] conjunction: Verdict,
    #[case] disjunction: Verdict,
) {
    assert_eq!(left.and(right), conjunction);
    assert_eq!(left.or(right), disjunction);
}

#[test]
fn negation_keeps_unknown() {
    assert_eq!(!Verdict::Unknown, Verdict::Unknown);
    assert_eq!(!Verdict::Match, Verdict::NoMatch);
}

/// Evaluates `predicate` at every node and collects the text of matches.
fn matching_texts(source: &Tree, predicate: &Predicate) -> Vec<String> {
    fn walk(node: &NodeRef<'_>, predicate: &Predicate, oracle: &TypeTable, out: &mut Vec<String>) {
        if predicate.test(node, oracle).is_some() {
            out.push(node.node().text());
        }
        for (index, child) in node.node().children().iter().enumerate() {
            if let Some(child_node) = child.element().as_node() {
                walk(&node.child(child_node, index), predicate, oracle, out);
            }
        }
    }
    let oracle = TypeTable::with_jdk();
    let mut out = Vec::new();
    walk(&NodeRef::root(source.root()), predicate, &oracle, &mut out);
    out
}

#[test]
fn kind_and_ancestor_predicates_compose() {
    let source = method_body("int x = 1;\n        if (x > 0) { int y = 2; }");
    let predicate = Predicate::kind(SyntaxKind::LocalVariableDeclaration)
        .and(Predicate::ancestor(Predicate::kind(SyntaxKind::IfStatement)));

    assert_eq!(matching_texts(&source, &predicate), vec!["int y = 2;"]);
}

#[test]
fn negated_ancestor_excludes_nested_nodes() {
    let source = method_body("int x = 1;\n        if (x > 0) { int y = 2; }");
    let predicate = Predicate::kind(SyntaxKind::LocalVariableDeclaration)
        .and(!Predicate::ancestor(Predicate::kind(SyntaxKind::IfStatement)));

    assert_eq!(matching_texts(&source, &predicate), vec!["int x = 1;"]);
}

#[test]
fn field_predicate_follows_grammar_field() {
    let source = method_body("boolean t = a == null;");
    let predicate = Predicate::kind(SyntaxKind::BinaryExpression)
        .and(Predicate::field("right", Predicate::kind(SyntaxKind::NullLiteral)));

    assert_eq!(matching_texts(&source, &predicate), vec!["a == null"]);
}

#[test]
fn children_quantifiers() {
    let source = method_body("call(a, b);\n        call();");
    let all_identifiers = Predicate::kind(SyntaxKind::ArgumentList).and(Predicate::children(
        Quantifier::All,
        Predicate::kind(SyntaxKind::Identifier),
    ));
    let any_identifier = Predicate::kind(SyntaxKind::ArgumentList).and(Predicate::children(
        Quantifier::Any,
        Predicate::kind(SyntaxKind::Identifier),
    ));

    assert_eq!(matching_texts(&source, &all_identifiers), vec!["(a, b)", "()"]);
    assert_eq!(matching_texts(&source, &any_identifier), vec!["(a, b)"]);
}

#[test]
fn enclosing_class_sees_nearest_type_declaration() {
    let source = tree("class Outer { class Inner { int x; } int y; }");
    let predicate = Predicate::kind(SyntaxKind::FieldDeclaration).and(Predicate::enclosing_class(
        Predicate::field("name", Predicate::text("Inner")),
    ));

    assert_eq!(matching_texts(&source, &predicate), vec!["int x;"]);
}

#[test]
fn pattern_predicate_binds_and_capture_tests_the_binding() {
    let source = method_body("a.equals(\"x\");\n        \"y\".equals(b);");
    let pattern = Pattern::expression("$RECV.equals($ARG)").expect("pattern");
    let predicate = Predicate::pattern(pattern).and(Predicate::capture(
        "ARG",
        Predicate::kind(SyntaxKind::StringLiteral),
    ));

    assert_eq!(matching_texts(&source, &predicate), vec!["a.equals(\"x\")"]);
}

#[test]
fn text_with_runs_the_function() {
    let source = method_body("long a = 1l;\n        long b = 2L;");
    let predicate = Predicate::kind(SyntaxKind::DecimalIntegerLiteral)
        .and(Predicate::text_with(|text| text.ends_with('l')));

    assert_eq!(matching_texts(&source, &predicate), vec!["1l"]);
}

#[test]
fn type_test_is_unknown_without_a_resolved_type() {
    let node = Arc::new(Node::leaf(SyntaxKind::Identifier, crate::tree::Token::new("", "s")));
    let predicate = Predicate::type_test(TypeTest::Exact(crate::types::STRING.to_owned()));
    let oracle = TypeTable::with_jdk();

    let mut bindings = Bindings::new();
    let verdict = predicate.evaluate(&NodeRef::root(&node), &oracle, &mut bindings);
    assert_eq!(verdict, Verdict::Unknown);
    assert_eq!((!predicate).evaluate(&NodeRef::root(&node), &oracle, &mut bindings), Verdict::Unknown);
}

#[rstest]
#[case::exact_string(TypeDescriptor::string(), TypeTest::Exact("java.lang.String".into()), Verdict::Match)]
#[case::exact_primitive(TypeDescriptor::Primitive(PrimitiveType::Int), TypeTest::Exact("int".into()), Verdict::Match)]
#[case::subtype(TypeDescriptor::string(), TypeTest::SubtypeOf("java.io.Serializable".into()), Verdict::Match)]
#[case::not_subtype(TypeDescriptor::string(), TypeTest::SubtypeOf("java.lang.Number".into()), Verdict::NoMatch)]
#[case::unknown_class(TypeDescriptor::class("com.example.Thing"), TypeTest::SubtypeOf("java.io.Serializable".into()), Verdict::Unknown)]
#[case::implements(TypeDescriptor::string(), TypeTest::Implements("java.lang.CharSequence".into()), Verdict::Match)]
#[case::implements_class(TypeDescriptor::string(), TypeTest::Implements("java.lang.Object".into()), Verdict::NoMatch)]
#[case::boxed(TypeDescriptor::class("java.lang.Integer"), TypeTest::BoxedPrimitive, Verdict::Match)]
#[case::primitive(TypeDescriptor::Primitive(PrimitiveType::Long), TypeTest::Primitive(Some(PrimitiveType::Long)), Verdict::Match)]
#[case::primitive_other(TypeDescriptor::Primitive(PrimitiveType::Long), TypeTest::Primitive(Some(PrimitiveType::Int)), Verdict::NoMatch)]
fn type_tests_consult_the_oracle(
    #[case] ty: TypeDescriptor,
    #[case] test: TypeTest,
    #[case] expected: Verdict,
) {
    let node = Arc::new(
        Node::leaf(SyntaxKind::Identifier, crate::tree::Token::new("", "v")).with_ty(Some(Arc::new(ty))),
    );
    let oracle = TypeTable::with_jdk();
    let mut bindings = Bindings::new();

    let verdict = Predicate::type_test(test).evaluate(&NodeRef::root(&node), &oracle, &mut bindings);
    assert_eq!(verdict, expected);
}
