//! Rules made of predicate and template pairs tried in order.
//!
//! Several built-in rewrites are a handful of structural shapes, each with
//! its own replacement. The combined predicate is the disjunction of the
//! arms. At rewrite time the arms are re-tested in declaration order and the
//! first arm that matches instantiates its template with its own bindings.

use std::sync::Arc;

use recast::{MatchResult, Predicate, RewriteContext, Rule, RuleError};
use recast_syntax::{InsertionContext, Node, Pattern, STRING, Template, TypeTest};

use crate::error::RuleBuildError;

/// Compiles a pattern snippet.
pub(crate) fn pattern(source: &str, context: InsertionContext) -> Result<Pattern, RuleBuildError> {
    Pattern::compile(source, context).map_err(|err| RuleBuildError::Pattern {
        pattern: source.to_owned(),
        source: err,
    })
}

/// Compiles a template snippet.
pub(crate) fn template(source: &str, context: InsertionContext) -> Result<Template, RuleBuildError> {
    Template::parse(source, context).map_err(|err| RuleBuildError::Template {
        template: source.to_owned(),
        source: err,
    })
}

/// Matches nodes attributed exactly as `java.lang.String`.
pub(crate) fn string_typed() -> Predicate {
    Predicate::type_test(TypeTest::Exact(STRING.to_owned()))
}

/// One shape and its replacement.
#[derive(Debug, Clone)]
pub(crate) struct Arm {
    predicate: Predicate,
    template: Template,
}

impl Arm {
    pub(crate) const fn new(predicate: Predicate, template: Template) -> Self {
        Self {
            predicate,
            template,
        }
    }

    pub(crate) const fn predicate(&self) -> &Predicate {
        &self.predicate
    }

    /// Narrows the arm so it declines wherever `excluded` holds.
    pub(crate) fn unless(self, excluded: Predicate) -> Self {
        Self {
            predicate: self.predicate.and(!excluded),
            template: self.template,
        }
    }
}

/// An ordered list of shapes and replacements acting as one rule.
///
/// Built by [`string_literal_equality`](crate::string_literal_equality),
/// [`equals_avoids_null`](crate::equals_avoids_null) and
/// [`pattern_rewrite`](crate::pattern_rewrite).
#[derive(Debug, Clone)]
pub struct Alternatives {
    name: &'static str,
    arms: Vec<Arm>,
    predicate: Predicate,
}

impl Alternatives {
    pub(crate) fn new(name: &'static str, arms: Vec<Arm>) -> Self {
        let predicate = Predicate::Or(arms.iter().map(|arm| arm.predicate.clone()).collect());
        Self {
            name,
            arms,
            predicate,
        }
    }
}

impl Rule for Alternatives {
    fn name(&self) -> &str {
        self.name
    }

    fn predicate(&self) -> &Predicate {
        &self.predicate
    }

    fn rewrite(
        &self,
        _found: &MatchResult,
        cx: &RewriteContext<'_>,
    ) -> Result<Option<Arc<Node>>, RuleError> {
        for arm in &self.arms {
            if let Some(bindings) = arm.predicate.test(cx.node_ref(), cx.oracle()) {
                return Ok(Some(arm.template.instantiate(&bindings)?));
            }
        }
        Ok(None)
    }
}
