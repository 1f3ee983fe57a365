//! Moves the `default` group of a colon-style switch to the end.
//!
//! Only switches where the move cannot change control flow are touched:
//! nothing may fall into the `default` group, the group itself must not
//! fall through, and `default` must not share its group with case labels.
//! If the group that used to be last can complete normally it would now
//! fall into `default`, so it gets a `break;`. When its completion cannot be
//! told from the syntax alone the switch is left as it is.

use std::sync::Arc;

use recast::{
    MatchResult, Predicate, RewriteContext, Rule, RuleDescriptor, RuleError, RuleOptions,
};
use recast_syntax::{
    Bindings, Child, IndentStyle, InsertionContext, Node, Preorder, Quantifier,
    SyntaxKind, Template, reconcile, trailing_indent,
};
use tracing::debug;

use crate::alternatives::template;
use crate::error::RuleBuildError;

const SWITCH_TARGET: &str = "recast::rules::default_comes_last";

/// Stable rule name.
pub const NAME: &str = "default-comes-last";

/// Moves `default:` after every `case:` group.
#[derive(Debug, Clone)]
pub struct DefaultComesLast {
    predicate: Predicate,
    seam: Template,
}

impl DefaultComesLast {
    /// Creates the rule.
    ///
    /// # Errors
    ///
    /// Returns [`RuleBuildError`] if the `break` template fails to compile.
    pub fn new() -> Result<Self, RuleBuildError> {
        let default_label = Predicate::kind(SyntaxKind::SwitchLabel).and(Predicate::text("default"));
        let default_group = Predicate::kind(SyntaxKind::SwitchBlockStatementGroup)
            .and(Predicate::children(Quantifier::Any, default_label));
        let predicate = Predicate::kind(SyntaxKind::SwitchBlock)
            .and(Predicate::children(
                Quantifier::None,
                Predicate::kind(SyntaxKind::SwitchRule),
            ))
            .and(Predicate::children(Quantifier::Any, default_group));
        Ok(Self {
            predicate,
            seam: template("break;", InsertionContext::Statement)?,
        })
    }

    /// Appends `break;` after the last statement of `group`.
    ///
    /// The `break` goes on its own line when the last statement is, and
    /// otherwise follows it on the same line.
    fn close(&self, group: &Node, style: &IndentStyle) -> Result<Node, RuleError> {
        let last = group
            .child_nodes()
            .next_back()
            .filter(|node| node.kind() != SyntaxKind::SwitchLabel);
        let own_line = last.and_then(|node| trailing_indent(node.prefix()));
        let (prefix, indent) = match (own_line, trailing_indent(group.prefix())) {
            (Some(indent), _) => (format!("\n{indent}"), indent.to_owned()),
            (None, Some(label)) if last.is_none() => {
                let deeper = format!("{label}{}", style.unit());
                (format!("\n{deeper}"), deeper)
            }
            _ => (String::from(" "), String::new()),
        };
        let seam = self.seam.instantiate(&Bindings::new())?;
        let placed = reconcile(&seam, &prefix, &indent, style);
        let mut children = group.children().to_vec();
        children.push(Child::unnamed(placed));
        Ok(group.with_children(children))
    }
}

impl Rule for DefaultComesLast {
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
        let block = found.node();
        let groups: Vec<(usize, &Arc<Node>)> = block
            .children()
            .iter()
            .enumerate()
            .filter_map(|(index, child)| child.element().as_node().map(|node| (index, node)))
            .filter(|(_, node)| node.kind() == SyntaxKind::SwitchBlockStatementGroup)
            .collect();
        let Some(position) = groups.iter().position(|(_, group)| has_default(group)) else {
            return Ok(None);
        };
        let (Some(&(default_index, default_group)), Some(&(last_index, last_group))) =
            (groups.get(position), groups.last())
        else {
            return Ok(None);
        };
        if default_index == last_index {
            return Ok(None);
        }
        if let Some(reason) = blocker(&groups, position, default_group) {
            debug!(target: SWITCH_TARGET, switch = %block.id(), reason, "default group left in place");
            return Ok(None);
        }

        let closed_last = match completion(last_group) {
            Completion::Completes => Some(self.close(last_group, cx.style())?),
            Completion::Exits => None,
            Completion::Undecided => {
                debug!(
                    target: SWITCH_TARGET,
                    switch = %block.id(),
                    reason = "cannot tell whether the last group falls through",
                    "default group left in place"
                );
                return Ok(None);
            }
        };
        let mut children = Vec::with_capacity(block.children().len());
        for (index, child) in block.children().iter().enumerate() {
            if index == default_index {
                continue;
            }
            if child.element().is_token("}") {
                children.push(Child::unnamed(Arc::clone(default_group)));
            }
            match (&closed_last, index == last_index) {
                (Some(closed), true) => children.push(child.with_element(closed.clone())),
                _ => children.push(child.clone()),
            }
        }
        Ok(Some(Arc::new(block.with_children(children))))
    }
}

/// Explains why moving the default group could change behaviour.
fn blocker(groups: &[(usize, &Arc<Node>)], position: usize, default_group: &Node) -> Option<&'static str> {
    if default_group.children_of_kind(SyntaxKind::SwitchLabel).count() > 1 {
        return Some("default shares its group with case labels");
    }
    let preceding = position
        .checked_sub(1)
        .and_then(|previous| groups.get(previous));
    if preceding.is_some_and(|(_, group)| completion(group) != Completion::Exits) {
        return Some("the preceding group may fall into default");
    }
    if completion(default_group) != Completion::Exits {
        return Some("the default group may fall through");
    }
    None
}

fn has_default(group: &Node) -> bool {
    group
        .children_of_kind(SyntaxKind::SwitchLabel)
        .any(|label| label.text() == "default")
}

/// Whether control can reach the end of a statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Completion {
    Completes,
    Exits,
    Undecided,
}

impl Completion {
    const fn from_bool(completes: bool) -> Self {
        if completes { Self::Completes } else { Self::Exits }
    }

    /// Completion of a construct that completes when any path does.
    fn any(paths: impl IntoIterator<Item = Self>) -> Self {
        paths.into_iter().fold(Self::Exits, |acc, path| match (acc, path) {
            (Self::Completes, _) | (_, Self::Completes) => Self::Completes,
            (Self::Undecided, _) | (_, Self::Undecided) => Self::Undecided,
            (Self::Exits, Self::Exits) => Self::Exits,
        })
    }
}

/// Whether control can reach the end of a group.
fn completion(group: &Node) -> Completion {
    group
        .child_nodes()
        .filter(|node| node.kind() != SyntaxKind::SwitchLabel)
        .next_back()
        .map_or(Completion::Completes, |last| statement_completion(last))
}

/// Reads the "can complete normally" rules of the language for the
/// statements a switch group usually ends with. Anything else that might
/// not complete is undecided.
fn statement_completion(statement: &Node) -> Completion {
    match statement.kind() {
        SyntaxKind::BreakStatement
        | SyntaxKind::ContinueStatement
        | SyntaxKind::ReturnStatement
        | SyntaxKind::ThrowStatement
        | SyntaxKind::YieldStatement => Completion::Exits,
        SyntaxKind::Block => statement
            .child_nodes()
            .next_back()
            .map_or(Completion::Completes, |last| statement_completion(last)),
        SyntaxKind::SynchronizedStatement => statement
            .field_node("body")
            .or_else(|| statement.child_of_kind(SyntaxKind::Block))
            .map_or(Completion::Undecided, |body| statement_completion(body)),
        SyntaxKind::IfStatement => match statement.field_node("alternative") {
            None => Completion::Completes,
            Some(otherwise) => Completion::any(
                statement
                    .field_node("consequence")
                    .map(|then| statement_completion(then))
                    .into_iter()
                    .chain([statement_completion(otherwise)]),
            ),
        },
        SyntaxKind::TryStatement | SyntaxKind::TryWithResourcesStatement => try_completion(statement),
        SyntaxKind::LabeledStatement => labeled_completion(statement),
        SyntaxKind::WhileStatement | SyntaxKind::ForStatement => loop_completion(statement, None),
        SyntaxKind::DoStatement => {
            let body = statement
                .field_node("body")
                .map_or(Completion::Undecided, |body| statement_completion(body));
            let runs_on = match body {
                Completion::Undecided => Completion::Undecided,
                _ => Completion::from_bool(
                    body == Completion::Completes || targets(statement, SyntaxKind::ContinueStatement),
                ),
            };
            loop_completion(statement, Some(runs_on))
        }
        SyntaxKind::SwitchExpression => Completion::Undecided,
        _ => Completion::Completes,
    }
}

fn try_completion(statement: &Node) -> Completion {
    let finally = statement
        .child_of_kind(SyntaxKind::FinallyClause)
        .map_or(Completion::Completes, |clause| {
            clause
                .child_of_kind(SyntaxKind::Block)
                .map_or(Completion::Undecided, |block| statement_completion(block))
        });
    let guarded = Completion::any(
        statement
            .field_node("body")
            .into_iter()
            .chain(
                statement
                    .children_of_kind(SyntaxKind::CatchClause)
                    .filter_map(|clause| clause.field_node("body")),
            )
            .map(|block| statement_completion(block)),
    );
    match (guarded, finally) {
        (Completion::Exits, _) | (_, Completion::Exits) => Completion::Exits,
        (Completion::Completes, Completion::Completes) => Completion::Completes,
        _ => Completion::Undecided,
    }
}

/// A labelled statement also completes when a `break` names its label.
fn labeled_completion(statement: &Node) -> Completion {
    let label = statement
        .child_of_kind(SyntaxKind::Identifier)
        .map(|identifier| identifier.text());
    let Some(inner) = statement.child_nodes().next_back() else {
        return Completion::Undecided;
    };
    let broken = label.is_some_and(|name| {
        Preorder::new(inner).any(|node| {
            node.kind() == SyntaxKind::BreakStatement
                && node
                    .child_of_kind(SyntaxKind::Identifier)
                    .is_some_and(|target| target.text() == name)
        })
    });
    if broken {
        Completion::Completes
    } else {
        statement_completion(inner)
    }
}

/// Completion of `while`, `for` and `do` statements. `runs_on` is set for
/// `do` and says whether control can reach the condition.
fn loop_completion(statement: &Node, runs_on: Option<Completion>) -> Completion {
    let escapes = targets(statement, SyntaxKind::BreakStatement);
    match (condition(statement), runs_on) {
        _ if escapes => Completion::Completes,
        (Condition::AlwaysTrue, _) => Completion::Exits,
        (Condition::Varies, None) => Completion::Completes,
        (Condition::Varies, Some(reaches_condition)) => reaches_condition,
        (Condition::Undecided, _) => Completion::Undecided,
    }
}

/// What can be told about a loop condition without evaluating constants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Condition {
    AlwaysTrue,
    Varies,
    Undecided,
}

fn condition(statement: &Node) -> Condition {
    let Some(mut expression) = statement.field_node("condition") else {
        return if statement.kind() == SyntaxKind::ForStatement {
            Condition::AlwaysTrue
        } else {
            Condition::Undecided
        };
    };
    while expression.kind() == SyntaxKind::ParenthesizedExpression {
        let Some(inner) = expression.child_nodes().next() else {
            return Condition::Undecided;
        };
        expression = inner;
    }
    if expression.kind() == SyntaxKind::True {
        return Condition::AlwaysTrue;
    }
    let not_constant = Preorder::new(expression).any(|node| {
        matches!(
            node.kind(),
            SyntaxKind::MethodInvocation
                | SyntaxKind::ObjectCreationExpression
                | SyntaxKind::ArrayAccess
                | SyntaxKind::AssignmentExpression
                | SyntaxKind::InstanceofExpression
                | SyntaxKind::LambdaExpression
                | SyntaxKind::This
                | SyntaxKind::Other("update_expression")
        )
    });
    if not_constant {
        return Condition::Varies;
    }
    let assigned = assigned_names(statement);
    let reads_assigned = Preorder::new(expression).any(|node| {
        node.kind() == SyntaxKind::Identifier && assigned.contains(&node.text())
    });
    if reads_assigned {
        Condition::Varies
    } else {
        Condition::Undecided
    }
}

/// Names a loop assigns to. Constant variables are never assigned.
fn assigned_names(statement: &Node) -> Vec<String> {
    statement
        .child_nodes()
        .flat_map(Preorder::new)
        .filter_map(|node| match node.kind() {
            SyntaxKind::AssignmentExpression => node.field_node("left"),
            SyntaxKind::Other("update_expression") => node.child_of_kind(SyntaxKind::Identifier),
            _ => None,
        })
        .filter(|target| target.kind() == SyntaxKind::Identifier)
        .map(|target| target.text())
        .collect()
}

/// Whether an unlabelled `break` or `continue` inside `statement` targets it.
fn targets(statement: &Node, jump: SyntaxKind) -> bool {
    fn reaches(node: &Node, jump: SyntaxKind) -> bool {
        node.child_nodes().any(|child| match child.kind() {
            kind if kind == jump => child.child_of_kind(SyntaxKind::Identifier).is_none(),
            SyntaxKind::WhileStatement
            | SyntaxKind::DoStatement
            | SyntaxKind::ForStatement
            | SyntaxKind::EnhancedForStatement
            | SyntaxKind::LambdaExpression
            | SyntaxKind::ClassBody => false,
            SyntaxKind::SwitchExpression => {
                jump == SyntaxKind::ContinueStatement && reaches(child, jump)
            }
            _ => reaches(child, jump),
        })
    }
    statement
        .field_node("body")
        .is_some_and(|body| body.kind() == jump || reaches(body, jump))
}

fn build(_options: &RuleOptions) -> Result<Box<dyn Rule>, Vec<String>> {
    DefaultComesLast::new()
        .map(|rule| Box::new(rule) as Box<dyn Rule>)
        .map_err(RuleBuildError::into_reasons)
}

pub(crate) const DESCRIPTOR: RuleDescriptor = RuleDescriptor::new(
    NAME,
    "Moves the default group of a switch after the case groups.",
    &[],
    build,
);

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::test_support::rewrite;

    fn switch(groups: &str) -> String {
        format!(
            "class A {{\n    int f(int x) {{\n        switch (x) {{\n{groups}        }}\n        return 0;\n    }}\n}}\n"
        )
    }

    #[rstest]
    #[case::adds_break_at_seam(
        "            default:\n                return -1;\n            case 1:\n                a();\n                break;\n            case 3:\n                b();\n",
        "            case 1:\n                a();\n                break;\n            case 3:\n                b();\n                break;\n            default:\n                return -1;\n"
    )]
    #[case::no_break_when_last_exits(
        "            case 1:\n                return 1;\n            default:\n                a();\n                break;\n            case 3:\n                return 3;\n",
        "            case 1:\n                return 1;\n            case 3:\n                return 3;\n            default:\n                a();\n                break;\n"
    )]
    #[case::if_else_both_exit(
        "            default:\n                break;\n            case 3:\n                if (x > 4) {\n                    return 1;\n                } else {\n                    return 2;\n                }\n",
        "            case 3:\n                if (x > 4) {\n                    return 1;\n                } else {\n                    return 2;\n                }\n            default:\n                break;\n"
    )]
    #[case::synchronized_body_exits(
        "            default:\n                return 0;\n            case 3:\n                synchronized (this) {\n                    return 3;\n                }\n",
        "            case 3:\n                synchronized (this) {\n                    return 3;\n                }\n            default:\n                return 0;\n"
    )]
    #[case::endless_while(
        "            default:\n                return 0;\n            case 3:\n                while (true) {\n                    g();\n                }\n",
        "            case 3:\n                while (true) {\n                    g();\n                }\n            default:\n                return 0;\n"
    )]
    #[case::endless_for(
        "            default:\n                return 0;\n            case 3:\n                for (;;) {\n                    g();\n                }\n",
        "            case 3:\n                for (;;) {\n                    g();\n                }\n            default:\n                return 0;\n"
    )]
    #[case::endless_do(
        "            default:\n                return 0;\n            case 3:\n                do {\n                    g();\n                } while ((true));\n",
        "            case 3:\n                do {\n                    g();\n                } while ((true));\n            default:\n                return 0;\n"
    )]
    #[case::endless_while_with_break(
        "            default:\n                return 0;\n            case 3:\n                while (true) {\n                    if (g()) {\n                        break;\n                    }\n                }\n",
        "            case 3:\n                while (true) {\n                    if (g()) {\n                        break;\n                    }\n                }\n                break;\n            default:\n                return 0;\n"
    )]
    #[case::inner_break_leaves_inner_loop(
        "            default:\n                return 0;\n            case 3:\n                while (true) {\n                    for (int i = 0; i < x; i++) {\n                        break;\n                    }\n                }\n",
        "            case 3:\n                while (true) {\n                    for (int i = 0; i < x; i++) {\n                        break;\n                    }\n                }\n            default:\n                return 0;\n"
    )]
    #[case::labeled_break(
        "            default:\n                return 0;\n            case 3:\n                spin: while (true) {\n                    break spin;\n                }\n",
        "            case 3:\n                spin: while (true) {\n                    break spin;\n                }\n                break;\n            default:\n                return 0;\n"
    )]
    #[case::counted_for(
        "            default:\n                return 0;\n            case 3:\n                for (int i = 0; i < x; i++) {\n                    g();\n                }\n",
        "            case 3:\n                for (int i = 0; i < x; i++) {\n                    g();\n                }\n                break;\n            default:\n                return 0;\n"
    )]
    #[case::try_with_resources_exits(
        "            default:\n                return 0;\n            case 3:\n                try (java.io.Reader r = open()) {\n                    return 3;\n                }\n",
        "            case 3:\n                try (java.io.Reader r = open()) {\n                    return 3;\n                }\n            default:\n                return 0;\n"
    )]
    fn moves_default_last(#[case] before: &str, #[case] after: &str) {
        let rule = DefaultComesLast::new().expect("rule builds");
        assert_eq!(rewrite(rule, &switch(before)), switch(after));
    }

    #[rstest]
    #[case::already_last("            case 1:\n                return 1;\n            default:\n                return 0;\n")]
    #[case::shares_group("            case 1:\n            default:\n                return 0;\n            case 2:\n                return 2;\n")]
    #[case::falls_into_default("            case 1:\n                a();\n            default:\n                return 0;\n            case 2:\n                return 2;\n")]
    #[case::default_falls_through("            default:\n                a();\n            case 2:\n                return 2;\n")]
    #[case::nested_switch_last("            default:\n                return 0;\n            case 3:\n                switch (x) {\n                    case 4:\n                        return 4;\n                    default:\n                        return 5;\n                }\n")]
    #[case::condition_not_decidable("            default:\n                return 0;\n            case 3:\n                while (DONE) {\n                    g();\n                }\n")]
    #[case::preceding_loop_may_end("            case 1:\n                while (DONE) {\n                    g();\n                }\n            default:\n                return 0;\n            case 2:\n                return 2;\n")]
    fn leaves_switch_alone(#[case] groups: &str) {
        let rule = DefaultComesLast::new().expect("rule builds");
        let source = switch(groups);
        assert_eq!(rewrite(rule, &source), source);
    }

    #[test]
    fn one_line_switches_stay_on_one_line() {
        let rule = DefaultComesLast::new().expect("rule builds");
        let source = "class A { void f(int x) { switch (x) { default: return; case 1: g(); } } void g() {} }";
        assert_eq!(
            rewrite(rule, source),
            "class A { void f(int x) { switch (x) { case 1: g(); break; default: return; } } void g() {} }"
        );
    }

    #[test]
    fn arrow_switches_are_not_matched() {
        let rule = DefaultComesLast::new().expect("rule builds");
        let source = "class A { int f(int x) { return switch (x) { default -> 0; case 1 -> 1; }; } }";
        assert_eq!(rewrite(rule, source), source);
    }
}
