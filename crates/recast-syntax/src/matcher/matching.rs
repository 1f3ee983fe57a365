//! Structural matching of pattern fragments against tree nodes.
//!
//! Matching compares node kinds and token lexemes while ignoring space.
//! Placeholder nodes in the pattern bind whatever they line up with, and
//! sequence placeholders are matched by backtracking over child runs.

use crate::matcher::capture::Bindings;
use crate::metavariables::{MetaVarKind, element_metavariable};
use crate::tree::{Child, Element};

/// Matches one pattern element against one target element.
pub(crate) fn elements_match(pattern: &Element, target: &Element, bindings: &mut Bindings) -> bool {
    if let Some((name, kind)) = element_metavariable(pattern) {
        return match kind {
            MetaVarKind::Single => bindings.bind_single(name, target.clone()),
            MetaVarKind::Multiple => bindings.bind_multiple(name, vec![target.clone()]),
        };
    }

    match (pattern, target) {
        (Element::Token(p), Element::Token(t)) => p.text() == t.text(),
        (Element::Node(p), Element::Node(t)) => {
            p.kind() == t.kind() && children_match(p.children(), t.children(), bindings)
        }
        _ => false,
    }
}

/// Matches pattern children against target children, delegating to
/// [`SequenceMatcher`] when the pattern contains a sequence placeholder.
fn children_match(pattern: &[Child], target: &[Child], bindings: &mut Bindings) -> bool {
    let has_multiple = pattern.iter().any(|child| {
        element_metavariable(child.element()).is_some_and(|(_, kind)| kind == MetaVarKind::Multiple)
    });

    if has_multiple {
        return SequenceMatcher { pattern, target }.matches(0, 0, bindings);
    }

    pattern.len() == target.len()
        && pattern
            .iter()
            .zip(target)
            .all(|(p, t)| elements_match(p.element(), t.element(), bindings))
}

/// Backtracking matcher for child sequences containing `$$$NAME`.
struct SequenceMatcher<'c> {
    pattern: &'c [Child],
    target: &'c [Child],
}

impl SequenceMatcher<'_> {
    fn matches(&self, target_idx: usize, pattern_idx: usize, bindings: &mut Bindings) -> bool {
        let Some(pattern_child) = self.pattern.get(pattern_idx) else {
            return target_idx == self.target.len();
        };

        match element_metavariable(pattern_child.element()) {
            Some((name, MetaVarKind::Multiple)) => {
                self.matches_multiple(target_idx, pattern_idx, name, bindings)
            }
            _ => self.matches_single(target_idx, pattern_idx, bindings),
        }
    }

    /// Tries every run length for a sequence placeholder, shortest first.
    fn matches_multiple(
        &self,
        target_idx: usize,
        pattern_idx: usize,
        name: &str,
        bindings: &mut Bindings,
    ) -> bool {
        for end in target_idx..=self.target.len() {
            let Some(run) = self.target.get(target_idx..end) else {
                continue;
            };
            let mut trial = bindings.clone();
            let elements = run.iter().map(|child| child.element().clone()).collect();
            if !trial.bind_multiple(name, elements) {
                continue;
            }
            if self.matches(end, pattern_idx + 1, &mut trial) {
                *bindings = trial;
                return true;
            }
        }
        false
    }

    fn matches_single(&self, target_idx: usize, pattern_idx: usize, bindings: &mut Bindings) -> bool {
        let (Some(pattern_child), Some(target_child)) =
            (self.pattern.get(pattern_idx), self.target.get(target_idx))
        else {
            return false;
        };

        let mut trial = bindings.clone();
        if !elements_match(pattern_child.element(), target_child.element(), &mut trial) {
            return false;
        }
        if self.matches(target_idx + 1, pattern_idx + 1, &mut trial) {
            *bindings = trial;
            return true;
        }
        false
    }
}
