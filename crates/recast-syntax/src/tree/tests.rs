use std::collections::{BTreeMap, HashSet};

use super::*;
use crate::kind::SyntaxKind;
use crate::parser::parse;

fn first(tree: &Tree, kind: SyntaxKind) -> Arc<Node> {
    tree.preorder()
        .find(|node| node.kind() == kind)
        .map(Arc::clone)
        .expect("node of kind")
}

fn ids(tree: &Tree) -> Vec<NodeId> {
    tree.preorder().map(|node| node.id()).collect()
}

#[test]
fn parsed_ids_are_unique_and_assigned() {
    let tree = parse("class A { void f() { g(1, 2); } }").expect("parse");
    let all = ids(&tree);
    let unique: HashSet<_> = all.iter().copied().collect();

    assert_eq!(all.len(), unique.len());
    assert!(all.iter().all(|id| id.is_assigned()));
}

#[test]
fn replace_swaps_one_subtree_and_shares_the_rest() {
    let tree = parse("class A {\n    int a = 1;\n    int b = 2;\n}\n").expect("parse");
    let literal = first(&tree, SyntaxKind::DecimalIntegerLiteral);
    let replacement = Arc::new(literal.with_children(vec![Child::unnamed(Token::new(" ", "42"))]));

    let edited = tree.replace(literal.id(), replacement).expect("replace");

    assert_eq!(edited.print(), "class A {\n    int a = 42;\n    int b = 2;\n}\n");
    let untouched = tree
        .preorder()
        .filter(|node| node.kind() == SyntaxKind::FieldDeclaration)
        .nth(1)
        .expect("second field");
    let shared = edited.find(untouched.id()).expect("still present");
    assert!(Arc::ptr_eq(untouched, shared));
}

#[test]
fn replacement_keeps_its_id_when_free() {
    let tree = parse("class A { int a = 1; }").expect("parse");
    let literal = first(&tree, SyntaxKind::DecimalIntegerLiteral);
    let replacement = Arc::new(literal.with_prefix("  "));

    let edited = tree.replace(literal.id(), replacement).expect("replace");
    assert!(edited.find(literal.id()).is_some());
}

#[test]
fn unassigned_and_duplicate_ids_are_renumbered() {
    let tree = parse("class A { int a = 1; int b = 2; }").expect("parse");
    let literals: Vec<_> = tree
        .preorder()
        .filter(|node| node.kind() == SyntaxKind::DecimalIntegerLiteral)
        .map(Arc::clone)
        .collect();
    let [one, two] = literals.as_slice() else {
        panic!("expected two literals");
    };
    let fresh = Arc::new(Node::leaf(SyntaxKind::DecimalIntegerLiteral, Token::new(" ", "7")));

    let mut edits = BTreeMap::new();
    edits.insert(one.id(), fresh);
    edits.insert(two.id(), Arc::clone(one));
    let edited = tree.replace_all(&edits).expect("replace");

    assert_eq!(edited.print(), "class A { int a = 7; int b = 1; }");
    let all = ids(&edited);
    let unique: HashSet<_> = all.iter().copied().collect();
    assert_eq!(all.len(), unique.len());
    assert!(all.iter().all(|id| id.is_assigned()));
}

#[test]
fn unknown_id_is_an_error() {
    let tree = parse("class A {}").expect("parse");
    let node = Arc::new(Node::leaf(SyntaxKind::Identifier, Token::new("", "x")));
    let missing = NodeId::new(9_999);

    assert_eq!(
        tree.replace(missing, node).expect_err("unknown"),
        crate::TreeError::UnknownNode { id: missing }
    );
}

#[test]
fn path_to_lists_ancestors_root_first() {
    let tree = parse("class A { int a = 1; }").expect("parse");
    let literal = first(&tree, SyntaxKind::DecimalIntegerLiteral);

    let kinds: Vec<_> = tree
        .path_to(literal.id())
        .expect("path")
        .iter()
        .map(|node| node.kind())
        .collect();
    assert_eq!(
        kinds,
        vec![
            SyntaxKind::Program,
            SyntaxKind::ClassDeclaration,
            SyntaxKind::ClassBody,
            SyntaxKind::FieldDeclaration,
            SyntaxKind::VariableDeclarator,
            SyntaxKind::DecimalIntegerLiteral,
        ]
    );
}

#[test]
fn same_shape_ignores_space() {
    let left = parse("class A { int a = 1 ; }").expect("parse");
    let right = parse("class A {\n  int a=1;\n}").expect("parse");
    assert!(left.root().same_shape(right.root()));
}
