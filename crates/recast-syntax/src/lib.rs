//! Lossless Java syntax trees for the Recast rewrite engine.
//!
//! This crate owns everything that touches source text:
//!
//! - **Parsing** via [`JavaParser`] into an immutable [`Tree`] whose tokens
//!   carry their leading space, so [`print`] reproduces the input exactly
//! - **Attribution** via [`attribute`], which stamps resolved
//!   [`TypeDescriptor`]s on declarations and expressions using a
//!   [`TypeOracle`]
//! - **Matching** via [`Pattern`] fragments with metavariables and
//!   composable [`Predicate`]s with three-valued [`Verdict`]s
//! - **Templating** via [`Template`], which instantiates replacement
//!   subtrees from captured [`Bindings`]
//! - **Formatting** via [`reconcile`], which re-anchors the indentation of
//!   synthesised tokens inside an edited region
//!
//! # Pattern language
//!
//! Patterns and templates are Java fragments parsed in an
//! [`InsertionContext`]. Metavariables stand for code elements:
//!
//! - `$VAR` matches any single node and captures it
//! - `$_` matches any single node without capturing
//! - `$$$VAR` matches zero or more sibling nodes
//!
//! # Example
//!
//! ```
//! use recast_syntax::{IndentStyle, InsertionContext, Pattern, Template, parse, reconcile};
//!
//! let tree = parse("class A { boolean f(String s) { return s.equals(\"x\"); } }")?;
//! let pattern = Pattern::expression("$S.equals($L)")?;
//! let found = pattern.find_first(&tree).ok_or("no match")?;
//!
//! let template = Template::parse("$L.equals($S)", InsertionContext::Expression)?;
//! let replacement = template.instantiate(found.bindings())?;
//! let placed = reconcile(&replacement, found.node().prefix(), "", &IndentStyle::default());
//! let rewritten = tree.replace(found.id(), placed)?;
//!
//! assert_eq!(
//!     rewritten.print(),
//!     "class A { boolean f(String s) { return \"x\".equals(s); } }",
//! );
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod attribution;
mod context;
mod error;
mod format;
mod kind;
mod matcher;
mod metavariables;
mod parser;
mod pattern;
mod position;
mod source_map;
mod template;
mod tree;
mod types;

pub use attribution::{Attribution, attribute};
pub use context::InsertionContext;
pub use error::{SyntaxError, TemplateError, TreeError};
pub use format::{IndentStyle, insert_child, reconcile, shift_indent, trailing_indent};
pub use kind::SyntaxKind;
pub use matcher::{
    Binding, Bindings, MatchResult, Matcher, NodeRef, Predicate, Quantifier, TextTest, TypeTest,
    Verdict,
};
pub use metavariables::{MetaVarKind, MetaVariable};
pub use parser::{JavaParser, parse, print};
pub use pattern::Pattern;
pub use source_map::SourceMap;
pub use template::{Template, compile as compile_template};
pub use tree::{Child, Element, Node, NodeId, Preorder, Token, Tree};
pub use types::{
    ClassInfo, ClassKind, LayeredOracle, MethodSignature, OBJECT, PrimitiveType, STRING,
    TypeDescriptor, TypeOracle, TypeTable,
};
