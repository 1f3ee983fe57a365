//! Conversions from tree-sitter points to display positions.
//!
//! Points count rows and byte columns from zero; diagnostics and source maps
//! report one-based lines and columns.

use recast_core::LineCol;

/// Returns the one-based `(line, column)` of a tree-sitter point.
#[must_use]
pub(crate) fn point_to_one_based(pos: tree_sitter::Point) -> (u32, u32) {
    // Saturates; no Java unit comes near u32::MAX lines.
    let line = u32::try_from(pos.row.saturating_add(1)).unwrap_or(u32::MAX);
    let column = u32::try_from(pos.column.saturating_add(1)).unwrap_or(u32::MAX);
    (line, column)
}

/// One-based [`LineCol`] for a zero-based row and byte column.
#[must_use]
pub(crate) fn line_col(row: usize, column: usize) -> LineCol {
    let (line, col) = point_to_one_based(tree_sitter::Point { row, column });
    LineCol::new(line, col)
}
