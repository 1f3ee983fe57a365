//! Metavariable parsing helpers shared by patterns and templates.
//!
//! Patterns and templates use `$NAME` and `$$$NAME` metavariables. Before a
//! snippet is handed to the Java grammar, each metavariable is rewritten into
//! a placeholder identifier so the snippet parses as ordinary Java; the
//! placeholder is recognised again when walking the parsed fragment.

use crate::kind::SyntaxKind;
use crate::tree::{Element, Node};

const SINGLE_PREFIX: &str = "__RC_MV_";
const MULTIPLE_PREFIX: &str = "__RC_MVS_";
const PLACEHOLDER_SUFFIX: &str = "__";

/// A metavariable in a pattern or template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetaVariable {
    /// The name of the metavariable (without the `$` prefix).
    pub name: String,
    /// Whether the metavariable binds one element or a run of them.
    pub kind: MetaVarKind,
    /// Byte offset where this metavariable appears in the snippet source.
    pub offset: usize,
}

/// The kind of metavariable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetaVarKind {
    /// Matches a single element (`$VAR`).
    Single,
    /// Matches zero or more sibling elements (`$$$VAR`).
    Multiple,
}

/// Returns whether `c` is a valid first character for a metavariable name.
const fn is_valid_start(c: char) -> bool {
    c.is_ascii_uppercase() || c == '_'
}

/// Returns whether `c` may continue a metavariable name.
const fn is_valid_continuation(c: char) -> bool {
    c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_'
}

/// Builds the identifier standing in for a metavariable.
#[must_use]
pub(crate) fn placeholder_for(name: &str, kind: MetaVarKind) -> String {
    let prefix = match kind {
        MetaVarKind::Single => SINGLE_PREFIX,
        MetaVarKind::Multiple => MULTIPLE_PREFIX,
    };
    format!("{prefix}{name}{PLACEHOLDER_SUFFIX}")
}

/// Recovers the metavariable encoded in a placeholder identifier.
#[must_use]
pub(crate) fn from_placeholder(text: &str) -> Option<(&str, MetaVarKind)> {
    let (rest, kind) = text
        .strip_prefix(MULTIPLE_PREFIX)
        .map(|rest| (rest, MetaVarKind::Multiple))
        .or_else(|| {
            text.strip_prefix(SINGLE_PREFIX)
                .map(|rest| (rest, MetaVarKind::Single))
        })?;
    let name = rest.strip_suffix(PLACEHOLDER_SUFFIX)?;
    (!name.is_empty()).then_some((name, kind))
}

/// Returns the metavariable a snippet node stands for.
///
/// A placeholder identifier is a metavariable; so is an expression
/// statement made of a placeholder alone (`$S;`), and any node whose only
/// child is a metavariable node.
#[must_use]
pub(crate) fn metavariable_of(node: &Node) -> Option<(&str, MetaVarKind)> {
    if matches!(
        node.kind(),
        SyntaxKind::Identifier | SyntaxKind::TypeIdentifier
    ) {
        return node.token_text().and_then(from_placeholder);
    }
    match node.children() {
        [only] => only.element().as_node().and_then(|inner| metavariable_of(inner)),
        [expression, semicolon]
            if node.kind() == SyntaxKind::ExpressionStatement
                && semicolon.element().is_token(";") =>
        {
            expression
                .element()
                .as_node()
                .and_then(|inner| metavariable_of(inner))
        }
        _ => None,
    }
}

/// Returns the metavariable an element stands for.
#[must_use]
pub(crate) fn element_metavariable(element: &Element) -> Option<(&str, MetaVarKind)> {
    element.as_node().and_then(|node| metavariable_of(node))
}

/// Rewrites every metavariable in `source` into its placeholder identifier.
///
/// Returns the rewritten source and the metavariables in order of
/// appearance, or a description of the first malformed metavariable.
pub(crate) fn normalise(source: &str) -> Result<(String, Vec<MetaVariable>), String> {
    let mut out = String::with_capacity(source.len());
    let mut found = Vec::new();
    let mut chars = source.char_indices().peekable();

    while let Some((offset, ch)) = chars.next() {
        if ch != '$' {
            out.push(ch);
            continue;
        }

        let mut dollar_count = 1;
        while chars.peek().is_some_and(|(_, c)| *c == '$') {
            chars.next();
            dollar_count += 1;
        }

        if dollar_count == 2 || dollar_count > 3 {
            return Err(format!(
                "metavariable at offset {offset} has invalid '$' prefix length ({dollar_count})"
            ));
        }

        let mut name = String::new();
        if chars.peek().is_some_and(|(_, c)| is_valid_start(*c)) {
            while let Some((_, c)) = chars.peek().copied() {
                if !is_valid_continuation(c) {
                    break;
                }
                name.push(c);
                chars.next();
            }
        }
        if name.is_empty() {
            return Err(format!("metavariable at offset {offset} has no valid name"));
        }

        let kind = if dollar_count == 3 {
            MetaVarKind::Multiple
        } else {
            MetaVarKind::Single
        };
        out.push_str(&placeholder_for(&name, kind));
        found.push(MetaVariable { name, kind, offset });
    }

    Ok((out, found))
}
