//! Java parsing into the lossless tree model.
//!
//! Tree-sitter produces a concrete syntax tree whose leaves carry byte
//! ranges. The conversion here walks that tree once, slicing the source
//! between consecutive leaves into token prefixes, so every byte of the
//! input ends up either in a token or in the tree's end-of-file space.

use crate::error::SyntaxError;
use crate::kind::SyntaxKind;
use crate::position::point_to_one_based;
use crate::tree::{Child, Element, Node, Token, Tree};

/// Longest error context snippet reported before truncation.
const MAX_CONTEXT_CHARS: usize = 50;

/// Tree-sitter parser configured for Java.
pub struct JavaParser {
    inner: tree_sitter::Parser,
}

impl JavaParser {
    /// Creates a new Java parser.
    ///
    /// # Errors
    ///
    /// Returns an error if the Tree-sitter parser cannot be initialised with
    /// the Java grammar.
    pub fn new() -> Result<Self, SyntaxError> {
        let mut inner = tree_sitter::Parser::new();
        inner
            .set_language(&tree_sitter_java::LANGUAGE.into())
            .map_err(|e| SyntaxError::parser_init(e.to_string()))?;
        Ok(Self { inner })
    }

    /// Parses a compilation unit.
    ///
    /// # Errors
    ///
    /// Returns [`SyntaxError::Parse`] carrying the location of the first
    /// error or missing node. Partial trees are never returned.
    pub fn parse(&mut self, source: &str) -> Result<Tree, SyntaxError> {
        let raw = self
            .inner
            .parse(source, None)
            .ok_or_else(|| SyntaxError::parse(0..0, (1, 1), "", "parsing failed"))?;
        let root = raw.root_node();
        if root.has_error() {
            return Err(first_error(root, source));
        }

        let mut converter = Converter { source, pos: 0 };
        let node = match converter.element(root) {
            Element::Node(node) => std::sync::Arc::unwrap_or_clone(node),
            Element::Token(token) => {
                Node::leaf(SyntaxKind::Program, std::sync::Arc::unwrap_or_clone(token))
            }
        };
        let eof = source.get(converter.pos..).unwrap_or_default();
        Ok(Tree::new(node, eof))
    }
}

impl std::fmt::Debug for JavaParser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JavaParser").finish_non_exhaustive()
    }
}

/// Parses a Java compilation unit with a fresh parser.
///
/// # Errors
///
/// Returns an error if the parser cannot be initialised or the source does
/// not parse cleanly.
///
/// # Example
///
/// ```
/// let source = "class A {\n    int x = 1; // one\n}\n";
/// let tree = recast_syntax::parse(source)?;
/// assert_eq!(recast_syntax::print(&tree), source);
/// # Ok::<(), recast_syntax::SyntaxError>(())
/// ```
pub fn parse(source: &str) -> Result<Tree, SyntaxError> {
    JavaParser::new()?.parse(source)
}

/// Prints a tree back to source text.
#[must_use]
pub fn print(tree: &Tree) -> String {
    tree.print()
}

struct Converter<'s> {
    source: &'s str,
    pos: usize,
}

impl Converter<'_> {
    fn element(&mut self, raw: tree_sitter::Node<'_>) -> Element {
        let kind = SyntaxKind::from_grammar(raw.kind());
        if raw.child_count() == 0 || kind.is_atomic() {
            let token = self.token(raw);
            return if raw.is_named() {
                Element::from(Node::leaf(kind, token))
            } else {
                Element::from(token)
            };
        }

        let mut children = Vec::with_capacity(raw.child_count());
        let mut cursor = raw.walk();
        if cursor.goto_first_child() {
            loop {
                let child = cursor.node();
                if !child.is_extra() {
                    children.push(Child::new(cursor.field_name(), self.element(child)));
                }
                if !cursor.goto_next_sibling() {
                    break;
                }
            }
        }
        Element::from(Node::new(kind, children))
    }

    fn token(&mut self, raw: tree_sitter::Node<'_>) -> Token {
        let range = raw.byte_range();
        let prefix = self.source.get(self.pos..range.start).unwrap_or_default();
        let text = self.source.get(range.clone()).unwrap_or_default();
        self.pos = range.end;
        Token::new(prefix, text)
    }
}

fn first_error(root: tree_sitter::Node<'_>, source: &str) -> SyntaxError {
    let mut pending = vec![root];
    while let Some(node) = pending.pop() {
        if node.is_error() || node.is_missing() {
            return error_at(node, source);
        }
        let mut cursor = node.walk();
        let children: Vec<_> = node.children(&mut cursor).collect();
        pending.extend(children.into_iter().rev().filter(|child| child.has_error()));
    }
    error_at(root, source)
}

fn error_at(node: tree_sitter::Node<'_>, source: &str) -> SyntaxError {
    let byte_range = node.byte_range();
    let context = source
        .get(byte_range.clone())
        .map(|text| {
            if text.chars().count() > MAX_CONTEXT_CHARS {
                let truncated: String = text.chars().take(MAX_CONTEXT_CHARS - 3).collect();
                format!("{truncated}...")
            } else {
                text.to_owned()
            }
        })
        .unwrap_or_default();
    let message = if node.is_missing() {
        format!("missing {}", node.kind())
    } else {
        String::from("syntax error")
    };
    SyntaxError::parse(
        byte_range,
        point_to_one_based(node.start_position()),
        context,
        message,
    )
}
