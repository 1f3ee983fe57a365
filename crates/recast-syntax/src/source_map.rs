//! Byte and line positions for the nodes of one tree snapshot.

use std::collections::HashMap;

use recast_core::{LineCol, Span};

use crate::position::line_col;
use crate::tree::{Element, Node, NodeId, Tree};

/// Positions of every node in a printed tree snapshot.
///
/// Node spans cover the node's text and exclude its leading space. A
/// source map describes exactly one snapshot; it must be rebuilt after the
/// tree changes.
///
/// # Example
///
/// ```
/// use recast_syntax::{SourceMap, SyntaxKind};
///
/// let tree = recast_syntax::parse("class A {\n    int x;\n}")?;
/// let map = SourceMap::new(&tree);
/// let field = tree
///     .preorder()
///     .find(|node| node.kind() == SyntaxKind::FieldDeclaration)
///     .expect("field");
/// let span = map.span(field.id()).expect("span");
/// assert_eq!(span.start.line, 2);
/// assert_eq!(span.start.column, 5);
/// assert_eq!(map.line_indent(span.start_byte), "    ");
/// # Ok::<(), recast_syntax::SyntaxError>(())
/// ```
#[derive(Debug, Clone)]
pub struct SourceMap {
    text: String,
    line_starts: Vec<usize>,
    ranges: HashMap<NodeId, (usize, usize)>,
}

impl SourceMap {
    /// Computes positions for `tree`.
    #[must_use]
    pub fn new(tree: &Tree) -> Self {
        let mut builder = Builder {
            text: String::new(),
            ranges: HashMap::new(),
        };
        builder.visit(tree.root());
        let mut text = builder.text;
        text.push_str(tree.eof());
        let line_starts = std::iter::once(0)
            .chain(
                text.char_indices()
                    .filter(|(_, ch)| *ch == '\n')
                    .map(|(index, _)| index + 1),
            )
            .collect();
        Self {
            text,
            line_starts,
            ranges: builder.ranges,
        }
    }

    /// Returns the printed snapshot.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Returns the span of a node's text, excluding its leading space.
    #[must_use]
    pub fn span(&self, id: NodeId) -> Option<Span> {
        let (start, end) = *self.ranges.get(&id)?;
        Some(Span::new(start, end, self.line_col(start), self.line_col(end)))
    }

    /// Converts a byte offset into a one-based line and column.
    #[must_use]
    pub fn line_col(&self, offset: usize) -> LineCol {
        let row = self.row_of(offset);
        let start = self.line_starts.get(row).copied().unwrap_or_default();
        line_col(row, offset.saturating_sub(start))
    }

    /// Returns the leading whitespace of the line containing `offset`.
    #[must_use]
    pub fn line_indent(&self, offset: usize) -> &str {
        let row = self.row_of(offset);
        let start = self.line_starts.get(row).copied().unwrap_or_default();
        let line = self.text.get(start..).unwrap_or_default();
        let width = line
            .find(|ch: char| ch != ' ' && ch != '\t')
            .unwrap_or(line.len());
        line.get(..width).unwrap_or_default()
    }

    fn row_of(&self, offset: usize) -> usize {
        self.line_starts
            .partition_point(|start| *start <= offset)
            .saturating_sub(1)
    }
}

struct Builder {
    text: String,
    ranges: HashMap<NodeId, (usize, usize)>,
}

impl Builder {
    fn visit(&mut self, node: &Node) -> usize {
        let mut start = None;
        for child in node.children() {
            match child.element() {
                Element::Node(inner) => {
                    let inner_start = self.visit(inner);
                    start.get_or_insert(inner_start);
                }
                Element::Token(token) => {
                    self.text.push_str(token.prefix());
                    start.get_or_insert(self.text.len());
                    self.text.push_str(token.text());
                }
            }
        }
        let begin = start.unwrap_or(self.text.len());
        self.ranges.insert(node.id(), (begin, self.text.len()));
        begin
    }
}
