//! Overlap resolution between candidate edits of one pass.
//!
//! Two candidates overlap when one target lies on the other's root path,
//! that is when one subtree contains the other. The outermost candidate
//! wins; among candidates at the same depth the earlier-declared rule wins,
//! then the earlier node in traversal order. The ordering depends only on
//! tree structure and rule order, so repeated runs resolve identically.

use std::sync::Arc;

use recast_core::{Diagnostic, DiagnosticCode, Span};
use recast_syntax::{Node, NodeId};
use tracing::warn;

const CONFLICT_TARGET: &str = "recast::driver::conflict";

/// A proposed replacement awaiting conflict resolution.
#[derive(Debug, Clone)]
pub(crate) struct Candidate {
    pub(crate) rule_index: usize,
    pub(crate) rule: String,
    /// Pre-order position of the target in the pass snapshot.
    pub(crate) order: usize,
    /// Ids from the root down to the target, inclusive.
    pub(crate) path: Vec<NodeId>,
    pub(crate) target: NodeId,
    pub(crate) replacement: Arc<Node>,
    pub(crate) span: Option<Span>,
}

impl Candidate {
    const fn depth(&self) -> usize {
        self.path.len()
    }

    fn overlaps(&self, other: &Self) -> bool {
        self.path.contains(&other.target) || other.path.contains(&self.target)
    }
}

/// Keeps a set of pairwise disjoint candidates, reporting every drop.
pub(super) fn resolve(
    mut candidates: Vec<Candidate>,
    pass: u32,
    diagnostics: &mut Vec<Diagnostic>,
) -> Vec<Candidate> {
    candidates.sort_by_key(|candidate| (candidate.depth(), candidate.rule_index, candidate.order));

    let mut accepted: Vec<Candidate> = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        if let Some(winner) = accepted.iter().find(|kept| kept.overlaps(&candidate)) {
            warn!(
                target: CONFLICT_TARGET,
                rule = candidate.rule.as_str(),
                kept = winner.rule.as_str(),
                pass,
                "overlapping edit dropped"
            );
            diagnostics.push(dropped(&candidate, winner));
            continue;
        }
        accepted.push(candidate);
    }
    accepted
}

fn dropped(loser: &Candidate, winner: &Candidate) -> Diagnostic {
    let diagnostic = Diagnostic::new(
        DiagnosticCode::MatchConflict,
        format!(
            "edit by rule '{}' overlaps an edit by rule '{}' and was dropped",
            loser.rule, winner.rule
        ),
    )
    .with_rule(loser.rule.as_str())
    .with_note(format!("kept node {} rewritten by '{}'", winner.target, winner.rule));
    loser
        .span
        .into_iter()
        .fold(diagnostic, Diagnostic::with_span)
}

#[cfg(test)]
mod tests {
    use recast_syntax::{SyntaxKind, Token};
    use rstest::rstest;

    use super::*;

    fn candidate(rule_index: usize, path: &[u32]) -> Candidate {
        let ids: Vec<NodeId> = path.iter().copied().map(NodeId::new).collect();
        Candidate {
            rule_index,
            rule: format!("rule-{rule_index}"),
            order: path.len(),
            target: ids.last().copied().unwrap_or(NodeId::UNASSIGNED),
            path: ids,
            replacement: Arc::new(Node::leaf(SyntaxKind::Identifier, Token::synthetic("", "x"))),
            span: None,
        }
    }

    fn winners(candidates: Vec<Candidate>) -> (Vec<(usize, u32)>, usize) {
        let mut diagnostics = Vec::new();
        let mut kept: Vec<(usize, u32)> = resolve(candidates, 1, &mut diagnostics)
            .into_iter()
            .map(|found| (found.rule_index, found.target.get()))
            .collect();
        kept.sort_unstable();
        (kept, diagnostics.len())
    }

    #[test]
    fn disjoint_edits_all_survive() {
        let (kept, dropped) = winners(vec![candidate(0, &[1, 2]), candidate(1, &[1, 3])]);
        assert_eq!(kept, vec![(0, 2), (1, 3)]);
        assert_eq!(dropped, 0);
    }

    #[rstest]
    #[case::outer_declared_first(vec![candidate(0, &[1, 2]), candidate(1, &[1, 2, 5])])]
    #[case::outer_declared_last(vec![candidate(1, &[1, 2, 5]), candidate(0, &[1, 2])])]
    #[case::outer_from_later_rule(vec![candidate(0, &[1, 2, 5]), candidate(1, &[1, 2])])]
    fn outermost_edit_wins(#[case] candidates: Vec<Candidate>) {
        let (kept, dropped) = winners(candidates);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept.first().map(|(_, target)| *target), Some(2));
        assert_eq!(dropped, 1);
    }

    #[test]
    fn declaration_order_breaks_ties_on_the_same_node() {
        let (kept, dropped) = winners(vec![candidate(2, &[1, 4]), candidate(0, &[1, 4])]);
        assert_eq!(kept, vec![(0, 4)]);
        assert_eq!(dropped, 1);
    }

    #[test]
    fn dropped_edits_are_reported_against_the_loser() {
        let mut diagnostics = Vec::new();
        let _kept = resolve(
            vec![candidate(1, &[1, 4]), candidate(0, &[1, 4])],
            3,
            &mut diagnostics,
        );
        let [diagnostic] = diagnostics.as_slice() else {
            panic!("expected one diagnostic, got {diagnostics:?}");
        };
        assert_eq!(diagnostic.code(), DiagnosticCode::MatchConflict);
        assert_eq!(diagnostic.rule(), Some("rule-1"));
    }
}
