//! Removes catch clauses that only rethrow what they caught.
//!
//! A clause `catch (E e) { throw e; }` is a no-op unless a later clause of
//! the same `try` would otherwise catch the exception. Whether a later
//! clause catches a supertype is asked of the type oracle; any clause whose
//! types cannot be resolved is kept. When the last clause of a plain `try`
//! without `finally` goes, the `try` itself is unwrapped into the enclosing
//! statement list and its statements are re-indented to take its place.

use std::collections::HashSet;
use std::sync::Arc;

use recast::{
    MatchResult, Predicate, RewriteContext, Rule, RuleDescriptor, RuleError, RuleOptions,
};
use recast_syntax::{
    Child, Element, Node, NodeId, Preorder, Quantifier, SyntaxKind, TypeDescriptor,
    TypeOracle, shift_indent, trailing_indent,
};
use tracing::debug;

const CATCH_TARGET: &str = "recast::rules::catch_rethrow";

/// Stable rule name.
pub const NAME: &str = "catch-clause-only-rethrows";

const CONTAINERS: [SyntaxKind; 3] = [
    SyntaxKind::Block,
    SyntaxKind::ConstructorBody,
    SyntaxKind::SwitchBlockStatementGroup,
];

const TRY_KINDS: [SyntaxKind; 2] = [
    SyntaxKind::TryStatement,
    SyntaxKind::TryWithResourcesStatement,
];

/// Removes catch clauses whose body is `throw` of their own parameter.
#[derive(Debug, Clone)]
pub struct CatchClauseOnlyRethrows {
    predicate: Predicate,
}

impl CatchClauseOnlyRethrows {
    /// Creates the rule.
    #[must_use]
    pub fn new() -> Self {
        let try_with_catch = Predicate::kinds(TRY_KINDS).and(Predicate::children(
            Quantifier::Any,
            Predicate::kind(SyntaxKind::CatchClause),
        ));
        Self {
            predicate: Predicate::kinds(CONTAINERS)
                .and(Predicate::children(Quantifier::Any, try_with_catch)),
        }
    }
}

impl Default for CatchClauseOnlyRethrows {
    fn default() -> Self {
        Self::new()
    }
}

/// What happened to one `try` statement.
enum Simplified {
    Unchanged,
    Trimmed(Node),
    Unwrapped(Vec<Child>),
}

impl Rule for CatchClauseOnlyRethrows {
    fn name(&self) -> &str {
        NAME
    }

    fn predicate(&self) -> &Predicate {
        &self.predicate
    }

    fn rewrite(
        &self,
        found: &MatchResult,
        cx: &RewriteContext<'_>,
    ) -> Result<Option<Arc<Node>>, RuleError> {
        let container = found.node();
        let mut children = Vec::with_capacity(container.children().len());
        let mut changed = false;
        for child in container.children() {
            let statement = child
                .element()
                .as_node()
                .filter(|node| TRY_KINDS.contains(&node.kind()));
            let simplified = statement.map_or(Simplified::Unchanged, |statement| {
                simplify(statement, container, cx.oracle())
            });
            match simplified {
                Simplified::Unchanged => children.push(child.clone()),
                Simplified::Trimmed(node) => {
                    children.push(child.with_element(node));
                    changed = true;
                }
                Simplified::Unwrapped(statements) => {
                    children.extend(statements);
                    changed = true;
                }
            }
        }
        Ok(changed.then(|| Arc::new(container.with_children(children))))
    }
}

fn simplify(statement: &Node, container: &Node, oracle: &dyn TypeOracle) -> Simplified {
    let clauses: Vec<&Arc<Node>> = statement.children_of_kind(SyntaxKind::CatchClause).collect();
    let removable: HashSet<NodeId> = clauses
        .iter()
        .enumerate()
        .filter(|(index, clause)| {
            let later = clauses.get(index + 1..).unwrap_or_default();
            only_rethrows(clause) && !later_clause_may_catch(clause, later, oracle)
        })
        .map(|(_, clause)| clause.id())
        .collect();
    if removable.is_empty() {
        return Simplified::Unchanged;
    }

    let remaining: Vec<Child> = statement
        .children()
        .iter()
        .filter(|child| {
            child
                .element()
                .as_node()
                .is_none_or(|node| !removable.contains(&node.id()))
        })
        .cloned()
        .collect();
    let keeps_handlers = remaining.iter().any(|child| {
        matches!(
            child.element().kind(),
            Some(SyntaxKind::CatchClause | SyntaxKind::FinallyClause)
        )
    });
    debug!(
        target: CATCH_TARGET,
        statement = %statement.id(),
        removed = removable.len(),
        "removing rethrow-only catch clauses"
    );
    if keeps_handlers || statement.kind() == SyntaxKind::TryWithResourcesStatement {
        return Simplified::Trimmed(statement.with_children(remaining));
    }
    unwrap(statement, container).map_or_else(
        || {
            debug!(target: CATCH_TARGET, statement = %statement.id(), "try cannot be unwrapped here");
            Simplified::Unchanged
        },
        Simplified::Unwrapped,
    )
}

/// Whether the clause body is exactly `throw <parameter>;`.
fn only_rethrows(clause: &Node) -> bool {
    let name = clause
        .child_of_kind(SyntaxKind::CatchFormalParameter)
        .and_then(|parameter| parameter.field_node("name"))
        .and_then(|name| name.token_text());
    let Some((name, body)) = name.zip(clause.field_node("body")) else {
        return false;
    };
    let mut statements = body.child_nodes();
    let (Some(statement), None) = (statements.next(), statements.next()) else {
        return false;
    };
    let rethrown = statement.kind() == SyntaxKind::ThrowStatement
        && statement.child_nodes().next().is_some_and(|operand| {
            operand.kind() == SyntaxKind::Identifier && operand.token_text() == Some(name)
        });
    rethrown && !has_comments(clause)
}

/// Whether removing `clause` could hand its exceptions to a later clause.
fn later_clause_may_catch(clause: &Node, later: &[&Arc<Node>], oracle: &dyn TypeOracle) -> bool {
    if later.is_empty() {
        return false;
    }
    let Some(caught) = caught_types(clause) else {
        return true;
    };
    later.iter().any(|other| {
        caught_types(other).is_none_or(|wider| {
            wider.iter().any(|wide| {
                wide.erasure().is_none_or(|fqn| {
                    caught
                        .iter()
                        .any(|narrow| oracle.is_subtype(narrow, fqn) != Some(false))
                })
            })
        })
    })
}

/// The resolved alternatives of a clause's catch type.
fn caught_types(clause: &Node) -> Option<Vec<&TypeDescriptor>> {
    clause
        .child_of_kind(SyntaxKind::CatchFormalParameter)?
        .child_of_kind(SyntaxKind::CatchType)?
        .child_nodes()
        .map(|alternative| alternative.ty())
        .collect()
}

/// Splices the body of a handler-less `try` into its container.
fn unwrap(statement: &Node, container: &Node) -> Option<Vec<Child>> {
    let body = statement.field_node("body")?;
    let inner: Vec<&Arc<Node>> = body.child_nodes().collect();
    let closing = body.children().last()?.element();
    if !is_blank(closing.prefix()) || clashes(&inner, container, statement.id()) {
        return None;
    }
    let Some(first) = inner.first() else {
        return is_blank(statement.prefix()).then(Vec::new);
    };

    let outer = trailing_indent(statement.prefix());
    let nested = trailing_indent(first.prefix());
    let lead = if is_blank(first.prefix()) {
        statement.prefix().to_owned()
    } else if is_blank(statement.prefix()) {
        let own = shift(first.prefix(), nested, outer);
        format!("{}{}", statement.prefix(), own.trim_start())
    } else {
        return None;
    };

    let statements = inner
        .iter()
        .enumerate()
        .map(|(position, node)| {
            let element = Element::from(Arc::clone(node));
            let prefix = if position == 0 {
                lead.clone()
            } else {
                shift(node.prefix(), nested, outer)
            };
            let shifted = match (nested, outer) {
                (Some(from), Some(to)) => shift_indent(&element, from, to),
                _ => element,
            };
            Child::unnamed(shifted.with_prefix(&prefix))
        })
        .collect();
    Some(statements)
}

/// Re-indents every line of a prefix after its first line break.
fn shift(prefix: &str, from: Option<&str>, to: Option<&str>) -> String {
    let (Some(from), Some(to)) = (from, to) else {
        return prefix.to_owned();
    };
    prefix
        .split('\n')
        .enumerate()
        .map(|(index, line)| match line.strip_prefix(from) {
            Some(rest) if index > 0 => format!("{to}{rest}"),
            _ => line.to_owned(),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Whether unwrapping would put two locals of one name in the same scope.
///
/// Locals the `try` body declares at its top level move into the container,
/// where they are in scope for every later sibling and everything nested in
/// it. A local declared in a switch group is in scope for the later groups
/// too, so those unwraps are refused outright.
fn clashes(inner: &[&Arc<Node>], container: &Node, statement: NodeId) -> bool {
    let unwrapped: HashSet<String> = inner.iter().flat_map(|node| scope_names(node)).collect();
    if unwrapped.is_empty() {
        return false;
    }
    if container.kind() == SyntaxKind::SwitchBlockStatementGroup {
        return true;
    }
    container
        .child_nodes()
        .skip_while(|sibling| sibling.id() != statement)
        .skip(1)
        .flat_map(Preorder::new)
        .flat_map(declared_names)
        .any(|name| unwrapped.contains(&name))
}

/// Names a block statement adds to the scope it sits in.
fn scope_names(node: &Node) -> Vec<String> {
    match node.kind() {
        SyntaxKind::LocalVariableDeclaration => node
            .children_of_kind(SyntaxKind::VariableDeclarator)
            .filter_map(|declarator| declarator.field_node("name"))
            .map(|name| name.text())
            .collect(),
        SyntaxKind::ClassDeclaration | SyntaxKind::RecordDeclaration => {
            node.field_node("name").map(|name| name.text()).into_iter().collect()
        }
        _ => Vec::new(),
    }
}

/// Names a single node declares, wherever it is nested.
fn declared_names(node: &Arc<Node>) -> Vec<String> {
    match node.kind() {
        SyntaxKind::VariableDeclarator
        | SyntaxKind::FormalParameter
        | SyntaxKind::CatchFormalParameter
        | SyntaxKind::EnhancedForStatement
        | SyntaxKind::InstanceofExpression
        | SyntaxKind::ClassDeclaration
        | SyntaxKind::RecordDeclaration
        | SyntaxKind::Other("resource") => {
            node.field_node("name").map(|name| name.text()).into_iter().collect()
        }
        SyntaxKind::LambdaExpression => match node.field_node("parameters") {
            Some(single) if single.kind() == SyntaxKind::Identifier => vec![single.text()],
            Some(parameters) => parameters
                .children_of_kind(SyntaxKind::Identifier)
                .map(|name| name.text())
                .collect(),
            None => Vec::new(),
        },
        _ => Vec::new(),
    }
}

fn has_comments(node: &Node) -> bool {
    let mut found = false;
    node.for_each_token(&mut |token| {
        found |= !is_blank(token.prefix());
    });
    found
}

fn is_blank(prefix: &str) -> bool {
    prefix.trim().is_empty()
}

fn build(_options: &RuleOptions) -> Result<Box<dyn Rule>, Vec<String>> {
    Ok(Box::new(CatchClauseOnlyRethrows::new()))
}

pub(crate) const DESCRIPTOR: RuleDescriptor = RuleDescriptor::new(
    NAME,
    "Removes catch clauses that only rethrow the caught exception.",
    &[],
    build,
);

#[cfg(test)]
mod tests;
