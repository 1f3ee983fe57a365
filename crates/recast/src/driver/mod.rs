//! The per-unit pass loop.
//!
//! Each pass attributes the current tree, scans every node in pre-order with
//! every active rule, and only then resolves conflicts and applies the
//! surviving edits in one structural replacement. Rules therefore always see
//! the unedited snapshot of their pass. The loop stops at the first pass that
//! accepts no edit, or fails with [`UnitError::NonConvergence`] when the pass
//! budget runs out.

mod conflict;

use std::any::Any;
use std::collections::BTreeMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use recast_core::{Diagnostic, Span};
use recast_syntax::{
    Bindings, IndentStyle, LayeredOracle, MatchResult, NodeId, NodeRef, SourceMap, Tree,
    TypeOracle, Verdict, attribute, reconcile,
};
use tracing::{debug, debug_span, error, info, warn};

use crate::error::{RuleError, UnitError};
use crate::report::EditRecord;
use crate::rule::{RewriteContext, Rule, RuleSet};

use conflict::Candidate;

const DRIVER_TARGET: &str = "recast::driver";

/// Runs a rule set over one parsed unit until it reaches a fixed point.
///
/// # Example
///
/// ```
/// use recast::{Driver, RuleSet};
/// use recast_syntax::{TypeTable, parse};
///
/// let tree = parse("class A {}\n")?;
/// let rules = RuleSet::new();
/// let oracle = TypeTable::with_jdk();
/// let mut diagnostics = Vec::new();
/// let driven = Driver::new(&rules, &oracle, 10).run(&tree, &mut diagnostics)?;
/// assert_eq!(driven.passes(), 1);
/// assert!(driven.edits().is_empty());
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Clone, Copy)]
pub struct Driver<'r> {
    rules: &'r RuleSet,
    oracle: &'r dyn TypeOracle,
    max_passes: u32,
}

/// A unit driven to its fixed point.
#[derive(Debug, Clone)]
pub struct Driven {
    tree: Tree,
    edits: Vec<EditRecord>,
    passes: u32,
}

impl Driven {
    /// The final tree.
    #[must_use]
    pub const fn tree(&self) -> &Tree {
        &self.tree
    }

    /// Applied edits in pass order, then traversal order.
    #[must_use]
    pub fn edits(&self) -> &[EditRecord] {
        &self.edits
    }

    /// Passes run, including the pass that accepted nothing.
    #[must_use]
    pub const fn passes(&self) -> u32 {
        self.passes
    }

    /// Splits the result into its parts.
    #[must_use]
    pub fn into_parts(self) -> (Tree, Vec<EditRecord>, u32) {
        (self.tree, self.edits, self.passes)
    }
}

impl<'r> Driver<'r> {
    /// Creates a driver. A zero pass budget is raised to one.
    #[must_use]
    pub const fn new(rules: &'r RuleSet, oracle: &'r dyn TypeOracle, max_passes: u32) -> Self {
        Self {
            rules,
            oracle,
            max_passes: if max_passes == 0 { 1 } else { max_passes },
        }
    }

    /// Rewrites `tree` until no rule proposes an edit.
    ///
    /// Rule failures, template failures and dropped conflicts are appended to
    /// `diagnostics` and never abort the run.
    ///
    /// # Errors
    ///
    /// Returns [`UnitError::NonConvergence`] when the last permitted pass
    /// still applied edits, and [`UnitError::Edit`] when accepted edits
    /// could not be spliced into the tree.
    pub fn run(&self, tree: &Tree, diagnostics: &mut Vec<Diagnostic>) -> Result<Driven, UnitError> {
        let mut current = tree.clone();
        let mut edits = Vec::new();
        let mut last_pass_edits = 0;

        for pass in 1..=self.max_passes {
            let _span = debug_span!(target: DRIVER_TARGET, "pass", pass).entered();
            let Some((next, applied)) = self.pass(&current, pass, diagnostics)? else {
                info!(
                    target: DRIVER_TARGET,
                    passes = pass,
                    edits = edits.len(),
                    "fixed point reached"
                );
                return Ok(Driven {
                    tree: current,
                    edits,
                    passes: pass,
                });
            };
            last_pass_edits = applied.len();
            debug!(target: DRIVER_TARGET, pass, edits = last_pass_edits, "pass applied edits");
            edits.extend(applied);
            current = next;
        }

        error!(
            target: DRIVER_TARGET,
            passes = self.max_passes,
            last_pass_edits,
            "rule set did not converge"
        );
        Err(UnitError::NonConvergence {
            passes: self.max_passes,
            last_pass_edits,
        })
    }

    /// Runs one scan-collect-apply cycle. `None` means the pass accepted
    /// nothing.
    fn pass(
        &self,
        tree: &Tree,
        pass: u32,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Result<Option<(Tree, Vec<EditRecord>)>, UnitError> {
        let (snapshot, local) = attribute(tree, self.oracle).into_parts();
        let oracle = LayeredOracle::new(&local, self.oracle);
        let map = SourceMap::new(&snapshot);
        let style = IndentStyle::detect(map.text());

        let mut scanner = Scanner {
            rules: self.rules,
            oracle: &oracle,
            map: &map,
            style: &style,
            pass,
            path: Vec::new(),
            order: 0,
            candidates: Vec::new(),
            diagnostics,
        };
        scanner.visit(&NodeRef::root(snapshot.root()));
        let candidates = scanner.candidates;

        let mut accepted = conflict::resolve(candidates, pass, diagnostics);
        if accepted.is_empty() {
            return Ok(None);
        }
        accepted.sort_by_key(|candidate| candidate.order);

        let mut replacements = BTreeMap::new();
        let mut records = Vec::with_capacity(accepted.len());
        for candidate in accepted {
            debug!(
                target: DRIVER_TARGET,
                rule = candidate.rule.as_str(),
                pass,
                node = %candidate.target,
                "edit accepted"
            );
            records.push(EditRecord::new(candidate.rule, candidate.span, pass));
            replacements.insert(candidate.target, candidate.replacement);
        }

        let next = snapshot
            .replace_all(&replacements)
            .map_err(|err| UnitError::Edit {
                message: err.to_string(),
            })?;
        Ok(Some((next, records)))
    }
}

impl std::fmt::Debug for Driver<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Driver")
            .field("rules", self.rules)
            .field("max_passes", &self.max_passes)
            .finish_non_exhaustive()
    }
}

/// Pre-order walk over one snapshot collecting candidate edits.
struct Scanner<'s> {
    rules: &'s RuleSet,
    oracle: &'s dyn TypeOracle,
    map: &'s SourceMap,
    style: &'s IndentStyle,
    pass: u32,
    /// Ids from the root down to the node being visited.
    path: Vec<NodeId>,
    order: usize,
    candidates: Vec<Candidate>,
    diagnostics: &'s mut Vec<Diagnostic>,
}

impl Scanner<'_> {
    fn visit(&mut self, node: &NodeRef<'_>) {
        self.path.push(node.node().id());
        self.order += 1;
        let rules = self.rules;
        for (rule_index, rule) in rules.iter().enumerate() {
            if let Some(found) = self.probe(rule.as_ref(), node)
                && let Some(candidate) = self.propose(rule_index, rule.as_ref(), node, &found)
            {
                self.candidates.push(candidate);
            }
        }
        for (index, child) in node.node().children().iter().enumerate() {
            if let Some(inner) = child.element().as_node() {
                self.visit(&node.child(inner, index));
            }
        }
        self.path.pop();
    }

    /// Evaluates the rule's predicate. Only a definite match proceeds.
    fn probe(&mut self, rule: &dyn Rule, node: &NodeRef<'_>) -> Option<MatchResult> {
        let oracle = self.oracle;
        let mut bindings = Bindings::new();
        let verdict = panic::catch_unwind(AssertUnwindSafe(|| {
            rule.predicate().evaluate(node, oracle, &mut bindings)
        }));
        match verdict {
            Ok(Verdict::Match) => Some(MatchResult::new(Arc::clone(node.node()), bindings)),
            Ok(Verdict::NoMatch) => None,
            Ok(Verdict::Unknown) => {
                debug!(
                    target: DRIVER_TARGET,
                    rule = rule.name(),
                    node = %node.node().id(),
                    "type information unavailable; treated as no match"
                );
                None
            }
            Err(payload) => {
                let span = self.map.span(node.node().id());
                self.rule_failed(rule.name(), span, &RuleError::Panicked {
                    message: panic_message(payload.as_ref()),
                });
                None
            }
        }
    }

    /// Asks the rule for a replacement and places it at the target.
    fn propose(
        &mut self,
        rule_index: usize,
        rule: &dyn Rule,
        node: &NodeRef<'_>,
        found: &MatchResult,
    ) -> Option<Candidate> {
        let map = self.map;
        let style = self.style;
        let target = node.node();
        let span = map.span(target.id());
        let indent = span.map_or("", |located| map.line_indent(located.start_byte));
        let cx = RewriteContext::new(self.oracle, node, style, indent);

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| rule.rewrite(found, &cx)));
        let replacement = match outcome {
            Ok(Ok(Some(replacement))) => replacement,
            Ok(Ok(None)) => return None,
            Ok(Err(err)) => {
                self.rule_failed(rule.name(), span, &err);
                return None;
            }
            Err(payload) => {
                self.rule_failed(rule.name(), span, &RuleError::Panicked {
                    message: panic_message(payload.as_ref()),
                });
                return None;
            }
        };

        let placed = reconcile(&replacement, target.prefix(), indent, style);
        if placed.to_source() == target.to_source() {
            debug!(
                target: DRIVER_TARGET,
                rule = rule.name(),
                node = %target.id(),
                "replacement prints identically; skipped"
            );
            return None;
        }

        Some(Candidate {
            rule_index,
            rule: rule.name().to_owned(),
            order: self.order,
            path: self.path.clone(),
            target: target.id(),
            replacement: placed,
            span,
        })
    }

    fn rule_failed(&mut self, rule: &str, span: Option<Span>, err: &RuleError) {
        warn!(
            target: DRIVER_TARGET,
            rule,
            pass = self.pass,
            error = %err,
            "rule application failed"
        );
        let diagnostic = span.into_iter().fold(
            Diagnostic::new(err.code(), err.to_string()).with_rule(rule),
            Diagnostic::with_span,
        );
        if !self.diagnostics.contains(&diagnostic) {
            self.diagnostics.push(diagnostic);
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|text| (*text).to_owned())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| String::from("non-string panic payload"))
}

#[cfg(test)]
mod tests;
