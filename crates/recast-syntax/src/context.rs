//! Grammar entry points for parsing code fragments.
//!
//! Patterns and templates are snippets, not compilation units. Each snippet
//! is parsed inside a small host declaration chosen by its
//! [`InsertionContext`], and the fragment is then lifted back out of the
//! host tree by following grammar fields.

use std::fmt;
use std::sync::Arc;

use crate::error::SyntaxError;
use crate::kind::SyntaxKind;
use crate::parser::JavaParser;
use crate::tree::Node;

const HOST_CLASS: &str = "__RcHost__";
const HOST_MEMBER: &str = "__rc_host__";

/// The syntactic position a fragment will occupy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InsertionContext {
    /// An expression, such as a method argument or an operand.
    Expression,
    /// A statement inside a block.
    Statement,
    /// A member of a class body.
    Member,
    /// A type reference.
    Type,
    /// A whole compilation unit.
    CompilationUnit,
}

impl InsertionContext {
    /// Returns the lowercase name used in messages and options.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Expression => "expression",
            Self::Statement => "statement",
            Self::Member => "member",
            Self::Type => "type",
            Self::CompilationUnit => "compilation unit",
        }
    }

    /// Parses the lowercase name of a context.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "expression" => Self::Expression,
            "statement" => Self::Statement,
            "member" => Self::Member,
            "type" => Self::Type,
            "compilation_unit" | "compilation unit" => Self::CompilationUnit,
            _ => return None,
        })
    }

    fn wrap(self, fragment: &str) -> String {
        match self {
            Self::Expression => {
                format!("class {HOST_CLASS} {{ Object {HOST_MEMBER} = {fragment}\n; }}")
            }
            Self::Statement => {
                format!("class {HOST_CLASS} {{ void {HOST_MEMBER}() {{\n{fragment}\n}} }}")
            }
            Self::Member => format!("class {HOST_CLASS} {{\n{fragment}\n}}"),
            Self::Type => format!("class {HOST_CLASS} {{ {fragment} {HOST_MEMBER}; }}"),
            Self::CompilationUnit => fragment.to_owned(),
        }
    }

    /// Parses `fragment` under this context and returns the nodes it
    /// contributes, with the first node's leading space cleared.
    ///
    /// # Errors
    ///
    /// Returns a [`SyntaxError`] if the wrapped fragment does not parse or if
    /// the fragment cannot be located in the host tree.
    pub fn parse_fragment(self, fragment: &str) -> Result<Vec<Arc<Node>>, SyntaxError> {
        let wrapped = self.wrap(fragment);
        let tree = JavaParser::new()?.parse(&wrapped)?;
        let nodes = self
            .extract(tree.root())
            .ok_or_else(|| SyntaxError::pattern_compile(self, "fragment not found in host"))?;
        Ok(nodes
            .into_iter()
            .enumerate()
            .map(|(index, node)| {
                if index == 0 {
                    Arc::new(node.with_prefix(""))
                } else {
                    node
                }
            })
            .collect())
    }

    fn extract(self, root: &Arc<Node>) -> Option<Vec<Arc<Node>>> {
        if self == Self::CompilationUnit {
            return Some(vec![Arc::clone(root)]);
        }
        let body = root
            .child_of_kind(SyntaxKind::ClassDeclaration)?
            .field_node("body")?;
        match self {
            Self::Expression => {
                let value = body
                    .child_of_kind(SyntaxKind::FieldDeclaration)?
                    .field_node("declarator")?
                    .field_node("value")?;
                Some(vec![Arc::clone(value)])
            }
            Self::Statement => {
                let block = body
                    .child_of_kind(SyntaxKind::MethodDeclaration)?
                    .field_node("body")?;
                Some(block.child_nodes().cloned().collect())
            }
            Self::Member => Some(body.child_nodes().cloned().collect()),
            Self::Type => {
                let ty = body
                    .child_of_kind(SyntaxKind::FieldDeclaration)?
                    .field_node("type")?;
                Some(vec![Arc::clone(ty)])
            }
            Self::CompilationUnit => None,
        }
    }
}

impl fmt::Display for InsertionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
