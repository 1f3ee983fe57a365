//! End-to-end tests for recast-syntax through its public API.
//!
//! These cover lossless printing, pattern search, template instantiation
//! and reconciled replacement, with inline snapshots for printed output.

use std::sync::Arc;

use insta::assert_snapshot;
use rstest::{fixture, rstest};

use recast_syntax::{
    IndentStyle, InsertionContext, JavaParser, NodeRef, Pattern, Predicate, SourceMap, SyntaxError,
    SyntaxKind, Template, Tree, TypeTable, TypeTest, Verdict, attribute, reconcile,
};

#[fixture]
fn parser() -> JavaParser {
    JavaParser::new().unwrap_or_else(|err| panic!("parser init: {err}"))
}

fn parse_with(parser: &mut JavaParser, source: &str) -> Tree {
    parser
        .parse(source)
        .unwrap_or_else(|err| panic!("parse: {err}"))
}

// =============================================================================
// Lossless printing
// =============================================================================

#[rstest]
#[case::minimal("class A {}")]
#[case::comments("// head\npackage p;\n\n/** doc */\nclass A { /* inner */ int x; // tail\n}\n")]
#[case::text_block("class A {\n    String s = \"\"\"\n        hello\n        \"\"\";\n}\n")]
#[case::crlf("class A {\r\n\tint x = 0x1F;\r\n}\r\n")]
#[case::unicode("class A { String s = \"h\u{e9}llo \u{1f600}\"; char c = '\\u0041'; }")]
#[case::trailing_space("class A {}\n\n   \n")]
#[case::generics("import java.util.*;\nclass A<T extends Comparable<T>> { List<? super T> xs; }")]
fn printing_reproduces_the_input(mut parser: JavaParser, #[case] source: &str) {
    let tree = parse_with(&mut parser, source);
    assert_eq!(tree.print(), source);
}

#[rstest]
fn parse_errors_carry_a_position(mut parser: JavaParser) {
    let err = parser
        .parse("class A {\n    void f( {\n}\n")
        .expect_err("broken source");

    assert!(matches!(err, SyntaxError::Parse { .. }));
    assert!(err.position().is_some_and(|(line, column)| line >= 1 && column >= 1));
}

// =============================================================================
// Pattern search
// =============================================================================

#[rstest]
fn finds_every_match_with_captures(mut parser: JavaParser) {
    let tree = parse_with(
        &mut parser,
        "class A {\n    void f() {\n        log(a, 1);\n        log(b, 2, 3);\n        log(c);\n        other(d, 4);\n    }\n}\n",
    );
    let pattern = Pattern::expression("log($FIRST, $$$REST)")
        .unwrap_or_else(|err| panic!("pattern: {err}"));
    let map = SourceMap::new(&tree);

    let found: Vec<String> = pattern
        .find_all(&tree)
        .iter()
        .map(|m| {
            let span = m.span(&map).unwrap_or_else(|| panic!("span"));
            format!(
                "{}:{} FIRST={} REST=[{}]",
                span.start.line,
                span.start.column,
                m.bindings().text("FIRST").unwrap_or_default(),
                m.bindings().text("REST").unwrap_or_default(),
            )
        })
        .collect();

    assert_snapshot!(found.join("\n"), @r"
    3:9 FIRST=a REST=[1]
    4:9 FIRST=b REST=[2, 3]
    ");
}

#[rstest]
fn typed_predicate_selects_string_operands(mut parser: JavaParser) {
    let tree = parse_with(
        &mut parser,
        "class A {\n    boolean f(String s, Object o) {\n        return s == \"x\" || o == \"y\";\n    }\n}\n",
    );
    let jdk = TypeTable::with_jdk();
    let attribution = attribute(&tree, &jdk);
    let oracle = attribution.oracle(&jdk);

    let pattern = Pattern::expression("$OPERAND == $LITERAL")
        .unwrap_or_else(|err| panic!("pattern: {err}"));
    let predicate = Predicate::pattern(pattern).and(Predicate::capture(
        "OPERAND",
        Predicate::type_test(TypeTest::Exact(String::from("java.lang.String"))),
    ));

    let mut selected = Vec::new();
    visit(
        &NodeRef::root(attribution.tree().root()),
        &mut |node: &NodeRef<'_>| {
            let mut bindings = recast_syntax::Bindings::new();
            if predicate.evaluate(node, &oracle, &mut bindings) == Verdict::Match {
                selected.push(node.node().text());
            }
        },
    );

    assert_eq!(selected, vec![String::from("s == \"x\"")]);
}

fn visit(node: &NodeRef<'_>, action: &mut impl FnMut(&NodeRef<'_>)) {
    action(node);
    for (index, child) in node.node().child_nodes().enumerate() {
        visit(&node.child(child, index), action);
    }
}

// =============================================================================
// Templates and reconciled replacement
// =============================================================================

fn rewrite_first(tree: &Tree, pattern: &Pattern, template: &Template) -> Tree {
    let found = pattern
        .find_first(tree)
        .unwrap_or_else(|| panic!("no match for {}", pattern.source()));
    let replacement = template
        .instantiate(found.bindings())
        .unwrap_or_else(|err| panic!("instantiate: {err}"));
    let map = SourceMap::new(tree);
    let span = found.span(&map).unwrap_or_else(|| panic!("span"));
    let base = map.line_indent(span.start_byte);
    let style = IndentStyle::detect(map.text());
    let placed: Arc<_> = reconcile(&replacement, found.node().prefix(), base, &style);
    tree.replace(found.id(), placed)
        .unwrap_or_else(|err| panic!("replace: {err}"))
}

#[rstest]
fn expression_template_swaps_operands(mut parser: JavaParser) {
    let tree = parse_with(
        &mut parser,
        "class A {\n    boolean f(String s) {\n        return s.equals(\"x\");\n    }\n}\n",
    );
    let pattern = Pattern::expression("$S.equals($L)").unwrap_or_else(|err| panic!("{err}"));
    let template = Template::parse("$L.equals($S)", InsertionContext::Expression)
        .unwrap_or_else(|err| panic!("{err}"));

    let rewritten = rewrite_first(&tree, &pattern, &template);

    assert_snapshot!(rewritten.print(), @r#"
    class A {
        boolean f(String s) {
            return "x".equals(s);
        }
    }
    "#);
}

#[rstest]
fn multi_line_template_is_reindented_at_the_target(mut parser: JavaParser) {
    let tree = parse_with(
        &mut parser,
        "class A {\n    void f() {\n        m.lock();\n    }\n}\n",
    );
    let pattern = Pattern::statement("$X.lock();").unwrap_or_else(|err| panic!("{err}"));
    let template = Template::parse(
        "synchronized ($X) {\n    $X.run();\n}",
        InsertionContext::Statement,
    )
    .unwrap_or_else(|err| panic!("{err}"));

    let rewritten = rewrite_first(&tree, &pattern, &template);

    assert_snapshot!(rewritten.print(), @r"
    class A {
        void f() {
            synchronized (m) {
                m.run();
            }
        }
    }
    ");
    let ids: Vec<_> = rewritten.preorder().map(|node| node.id()).collect();
    let unique: std::collections::HashSet<_> = ids.iter().copied().collect();
    assert_eq!(ids.len(), unique.len());
}

#[rstest]
fn untouched_regions_keep_their_exact_text(mut parser: JavaParser) {
    let source = "class A {\n\tvoid f() {\n\t\tm.lock();   // keep\n\t}\n\n\n\tint   odd ;\n}\n";
    let tree = parse_with(&mut parser, source);
    let pattern = Pattern::statement("$X.lock();").unwrap_or_else(|err| panic!("{err}"));
    let template = Template::parse("$X.unlock();", InsertionContext::Statement)
        .unwrap_or_else(|err| panic!("{err}"));

    let rewritten = rewrite_first(&tree, &pattern, &template);

    assert_eq!(
        rewritten.print(),
        "class A {\n\tvoid f() {\n\t\tm.unlock();   // keep\n\t}\n\n\n\tint   odd ;\n}\n"
    );
    let field = rewritten
        .preorder()
        .find(|node| node.kind() == SyntaxKind::FieldDeclaration)
        .unwrap_or_else(|| panic!("field"));
    let original = tree
        .find(field.id())
        .unwrap_or_else(|| panic!("field kept its id"));
    assert!(Arc::ptr_eq(field, original));
}
