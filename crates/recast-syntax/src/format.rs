//! Formatting reconciliation for structural edits.
//!
//! Replacement subtrees arrive with two kinds of space: space copied from the
//! matched tree, which is already correct, and synthetic space written
//! relative to a template. Reconciliation rewrites only the synthetic space,
//! anchoring each new line at the indentation of the line where the edit
//! starts. Everything outside the replacement is left byte-identical.

use std::sync::Arc;

use crate::tree::{Child, Element, Node, Token};

const DEFAULT_WIDTH: usize = 4;
const TEMPLATE_LEVEL: &str = "    ";

/// The indentation unit of a compilation unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndentStyle {
    unit: String,
}

impl Default for IndentStyle {
    fn default() -> Self {
        Self::spaces(DEFAULT_WIDTH)
    }
}

impl IndentStyle {
    /// An indentation unit of `width` spaces.
    #[must_use]
    pub fn spaces(width: usize) -> Self {
        Self {
            unit: " ".repeat(width.max(1)),
        }
    }

    /// A single tab per level.
    #[must_use]
    pub fn tabs() -> Self {
        Self {
            unit: String::from("\t"),
        }
    }

    /// Infers the unit from the indented lines of `source`.
    ///
    /// Tab indentation wins if the first indented line starts with a tab;
    /// otherwise the narrowest space indentation is used. Sources without
    /// indented lines get four spaces.
    #[must_use]
    pub fn detect(source: &str) -> Self {
        let mut indents = source
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| {
                let trimmed = line.trim_start_matches([' ', '\t']);
                line.get(..line.len() - trimmed.len()).unwrap_or_default()
            })
            .filter(|indent| !indent.is_empty())
            .peekable();
        if indents.peek().is_some_and(|indent| indent.starts_with('\t')) {
            return Self::tabs();
        }
        indents
            .filter(|indent| indent.bytes().all(|byte| byte == b' '))
            .map(str::len)
            .min()
            .map_or_else(Self::default, Self::spaces)
    }

    /// Returns the text of one indentation level.
    #[must_use]
    pub fn unit(&self) -> &str {
        &self.unit
    }

    /// Converts template-relative indentation into this style.
    fn convert(&self, relative: &str) -> String {
        let mut rest = relative;
        let mut out = String::new();
        loop {
            if let Some(stripped) = rest.strip_prefix(TEMPLATE_LEVEL) {
                rest = stripped;
            } else if let Some(stripped) = rest.strip_prefix('\t') {
                rest = stripped;
            } else {
                break;
            }
            out.push_str(&self.unit);
        }
        out.push_str(rest);
        out
    }
}

/// Derives final space for a replacement subtree.
///
/// The replacement's leading space becomes `target_prefix`, the space of the
/// node it replaces. Synthetic space that starts new lines is re-anchored at
/// `base_indent`, the indentation of the line where the target starts.
/// Pending and synthetic markers are cleared.
#[must_use]
pub fn reconcile(
    replacement: &Arc<Node>,
    target_prefix: &str,
    base_indent: &str,
    style: &IndentStyle,
) -> Arc<Node> {
    let reconciled = reconcile_node(replacement, base_indent, style)
        .map_or_else(|| Arc::clone(replacement), Arc::new);
    if reconciled.prefix() == target_prefix {
        reconciled
    } else {
        Arc::new(reconciled.with_prefix(target_prefix))
    }
}

/// Returns `None` when nothing under `node` needed reconciling.
fn reconcile_node(node: &Node, base: &str, style: &IndentStyle) -> Option<Node> {
    let mut changed = node.is_pending_format();
    let children: Vec<Child> = node
        .children()
        .iter()
        .map(|child| {
            let updated = match child.element() {
                Element::Node(inner) => reconcile_node(inner, base, style).map(Element::from),
                Element::Token(token) => token
                    .is_synthetic()
                    .then(|| Element::from(token.reconciled(reindent(token.prefix(), base, style)))),
            };
            updated.map_or_else(
                || child.clone(),
                |element| {
                    changed = true;
                    child.with_element(element)
                },
            )
        })
        .collect();
    changed.then(|| node.with_children(children).with_pending_format(false))
}

/// Re-anchors every line of a template-relative prefix at `base`.
fn reindent(prefix: &str, base: &str, style: &IndentStyle) -> String {
    let segments: Vec<&str> = prefix.split('\n').collect();
    let last = segments.len().saturating_sub(1);
    let mut out = String::with_capacity(prefix.len() + base.len());
    for (index, segment) in segments.iter().enumerate() {
        if index == 0 {
            out.push_str(segment);
            continue;
        }
        out.push('\n');
        let trimmed = segment.trim_start_matches([' ', '\t']);
        if trimmed.is_empty() && index != last {
            continue;
        }
        let leading = segment.get(..segment.len() - trimmed.len()).unwrap_or_default();
        out.push_str(base);
        out.push_str(&style.convert(leading));
        out.push_str(trimmed);
    }
    out
}

/// Returns the indentation after the last line break of `prefix`.
#[must_use]
pub fn trailing_indent(prefix: &str) -> Option<&str> {
    prefix.rfind('\n').and_then(|index| prefix.get(index + 1..))
}

/// Inserts `element` into `parent` before the child at `index`.
///
/// The new element takes a line of its own at the indentation of the
/// sibling it is inserted before. Inserting before a closing brace indents
/// one level deeper than the brace. In a body written on one line the
/// element is separated by a single space. Synthetic space inside the
/// element is reconciled against its new line.
#[must_use]
pub fn insert_child(parent: &Node, index: usize, element: &Element, style: &IndentStyle) -> Node {
    let mut children = parent.children().to_vec();
    let Some(sibling) = children.get(index).cloned() else {
        return parent.clone();
    };

    let sibling_prefix = sibling.element().prefix().to_owned();
    let closes = sibling.element().is_token("}");
    let (prefix, indent) = match trailing_indent(&sibling_prefix) {
        Some(indent) if closes => {
            let deeper = format!("{indent}{}", style.unit());
            (format!("\n{deeper}"), deeper)
        }
        Some(indent) => (format!("\n{indent}"), indent.to_owned()),
        None => {
            if closes && sibling_prefix.is_empty()
                && let Some(slot) = children.get_mut(index)
            {
                *slot = slot.with_element(slot.element().with_prefix(" "));
            }
            (String::from(" "), String::new())
        }
    };

    let placed = match element {
        Element::Node(node) => Element::Node(reconcile(node, &prefix, &indent, style)),
        Element::Token(token) => Element::from(token.reconciled(prefix)),
    };
    children.insert(index, Child::new(None, placed));
    parent.with_children(children)
}

/// Replaces the leading `from` indentation of every line inside `element`
/// with `to`. The element's own leading space is left alone.
#[must_use]
pub fn shift_indent(element: &Element, from: &str, to: &str) -> Element {
    let mut first = true;
    shift_element(element, from, to, &mut first)
}

fn shift_element(element: &Element, from: &str, to: &str, first: &mut bool) -> Element {
    match element {
        Element::Token(token) => {
            let skip = std::mem::replace(first, false);
            if skip || !token.prefix().contains('\n') {
                return element.clone();
            }
            Element::from(shift_token(token, from, to))
        }
        Element::Node(node) => {
            let children = node
                .children()
                .iter()
                .map(|child| child.with_element(shift_element(child.element(), from, to, first)))
                .collect();
            Element::from(node.with_children(children))
        }
    }
}

fn shift_token(token: &Token, from: &str, to: &str) -> Token {
    let shifted = token
        .prefix()
        .split('\n')
        .enumerate()
        .map(|(index, line)| match line.strip_prefix(from) {
            Some(rest) if index > 0 => format!("{to}{rest}"),
            _ => line.to_owned(),
        })
        .collect::<Vec<_>>()
        .join("\n");
    token.with_prefix(shifted)
}
