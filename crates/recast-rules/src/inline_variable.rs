//! `T v = expr; return v;` becomes `return expr;`.
//!
//! The rule rewrites whole statement lists so that every adjacent
//! declaration and exit pair of a block is inlined in the same pass. The
//! return or throw statement keeps its identity and inherits the
//! declaration's leading space, comments included.

use std::sync::Arc;

use recast::{
    MatchResult, Predicate, RewriteContext, Rule, RuleDescriptor, RuleError, RuleOptions,
};
use recast_syntax::{Child, Element, Node, Quantifier, SyntaxKind};
use tracing::debug;

const INLINE_TARGET: &str = "recast::rules::inline_variable";

/// Stable rule name.
pub const NAME: &str = "inline-variable";

/// Inlines a local variable that is returned or thrown immediately.
#[derive(Debug, Clone)]
pub struct InlineVariable {
    predicate: Predicate,
}

impl InlineVariable {
    /// Creates the rule.
    #[must_use]
    pub fn new() -> Self {
        let predicate = Predicate::kinds([SyntaxKind::Block, SyntaxKind::ConstructorBody])
            .and(Predicate::children(
                Quantifier::Any,
                Predicate::kind(SyntaxKind::LocalVariableDeclaration),
            ))
            .and(Predicate::children(
                Quantifier::Any,
                Predicate::kinds([SyntaxKind::ReturnStatement, SyntaxKind::ThrowStatement]),
            ));
        Self { predicate }
    }
}

impl Default for InlineVariable {
    fn default() -> Self {
        Self::new()
    }
}

impl Rule for InlineVariable {
    fn name(&self) -> &str {
        NAME
    }

    fn predicate(&self) -> &Predicate {
        &self.predicate
    }

    fn rewrite(
        &self,
        found: &MatchResult,
        _cx: &RewriteContext<'_>,
    ) -> Result<Option<Arc<Node>>, RuleError> {
        let body = found.node();
        let mut children = Vec::with_capacity(body.children().len());
        let mut inlined = 0_usize;
        let mut rest = body.children().iter().peekable();
        while let Some(child) = rest.next() {
            match rest.peek().and_then(|next| inline_pair(child, next)) {
                Some(merged) => {
                    children.push(merged);
                    rest.next();
                    inlined += 1;
                }
                None => children.push(child.clone()),
            }
        }
        if inlined == 0 {
            return Ok(None);
        }
        debug!(target: INLINE_TARGET, block = %body.id(), inlined, "inlined returned variables");
        Ok(Some(Arc::new(body.with_children(children))))
    }
}

/// Merges a declaration and the statement after it, if the statement
/// returns or throws exactly the declared variable.
fn inline_pair(declaration: &Child, exit: &Child) -> Option<Child> {
    let declared = declaration
        .element()
        .as_node()
        .filter(|node| node.kind() == SyntaxKind::LocalVariableDeclaration)?;
    let statement = exit.element().as_node().filter(|node| {
        matches!(
            node.kind(),
            SyntaxKind::ReturnStatement | SyntaxKind::ThrowStatement
        )
    })?;
    let (name, value) = sole_initialised_declarator(declared)?;
    let (index, operand) = statement
        .children()
        .iter()
        .enumerate()
        .find_map(|(index, child)| child.element().as_node().map(|node| (index, node)))?;

    let names_variable =
        operand.kind() == SyntaxKind::Identifier && operand.token_text() == Some(name);
    if !names_variable || !is_blank(statement.prefix()) || !is_blank(operand.prefix()) {
        return None;
    }
    if !keeps_its_type(declared, value) {
        debug!(target: INLINE_TARGET, variable = name, "initialiser relies on the declared type");
        return None;
    }

    let spacing = if value.prefix().is_empty() { " " } else { value.prefix() };
    let rebuilt = statement
        .with_child(index, value.with_prefix(spacing))
        .with_prefix(declared.prefix());
    Some(exit.with_element(rebuilt))
}

/// Returns the name and initialiser of a declaration with one declarator.
fn sole_initialised_declarator(declared: &Node) -> Option<(&str, &Element)> {
    let mut declarators = declared.fields("declarator");
    let declarator = declarators.next()?.as_node()?;
    if declarators.next().is_some() || declarator.field("dimensions").is_some() {
        return None;
    }
    let name = declarator.field_node("name")?.token_text()?;
    let value = declarator.field("value")?;
    if value.kind() == Some(SyntaxKind::Other("array_initializer")) {
        return None;
    }
    Some((name, value))
}

/// Whether the initialiser means the same thing without its declaration.
///
/// Lambdas and method references need the declared type as their target,
/// and a primitive initialiser of another type would skip a widening.
fn keeps_its_type(declared: &Node, value: &Element) -> bool {
    let Some(node) = value.as_node() else {
        return false;
    };
    if matches!(
        node.kind(),
        SyntaxKind::LambdaExpression | SyntaxKind::Other("method_reference")
    ) {
        return false;
    }
    match declared.ty() {
        Some(ty) if ty.as_primitive().is_some() => node.ty() == Some(ty),
        _ => true,
    }
}

fn is_blank(prefix: &str) -> bool {
    prefix.trim().is_empty()
}

fn build(_options: &RuleOptions) -> Result<Box<dyn Rule>, Vec<String>> {
    Ok(Box::new(InlineVariable::new()))
}

pub(crate) const DESCRIPTOR: RuleDescriptor = RuleDescriptor::new(
    NAME,
    "Inlines a local variable that is immediately returned or thrown.",
    &[],
    build,
);
