//! Small rules exercising the driver's control flow.

use std::sync::Arc;

use recast_syntax::{
    InsertionContext, MatchResult, Node, Pattern, Predicate, SyntaxKind, Template, Token,
    TypeTable, TypeTest,
};

use crate::{Engine, RewriteContext, Rule, RuleError, RuleSet};

pub(crate) fn engine(rules: RuleSet) -> Engine {
    Engine::new(rules, Arc::new(TypeTable::with_jdk()))
}

fn identifier(text: &str) -> Predicate {
    Predicate::kind(SyntaxKind::Identifier).and(Predicate::text(text))
}

/// Renames every identifier spelled `from` to `to`.
pub(crate) struct Rename {
    name: String,
    to: String,
    predicate: Predicate,
}

impl Rename {
    pub(crate) fn new(from: &str, to: &str) -> Self {
        Self {
            name: format!("rename-{from}-{to}"),
            to: to.to_owned(),
            predicate: identifier(from),
        }
    }

    /// Renames only identifiers whose resolved type passes `test`.
    pub(crate) fn gated(from: &str, to: &str, test: TypeTest) -> Self {
        Self {
            predicate: identifier(from).and(Predicate::type_test(test)),
            ..Self::new(from, to)
        }
    }
}

impl Rule for Rename {
    fn name(&self) -> &str {
        &self.name
    }

    fn predicate(&self) -> &Predicate {
        &self.predicate
    }

    fn rewrite(
        &self,
        _found: &MatchResult,
        _cx: &RewriteContext<'_>,
    ) -> Result<Option<Arc<Node>>, RuleError> {
        let token = Token::synthetic("", self.to.as_str());
        Ok(Some(Arc::new(Node::leaf(SyntaxKind::Identifier, token))))
    }
}

/// Folds `$X + 0` to `$X`.
pub(crate) struct DropAddZero {
    predicate: Predicate,
}

impl DropAddZero {
    pub(crate) fn new() -> Self {
        let pattern = Pattern::expression("$X + 0").expect("pattern compiles");
        Self {
            predicate: Predicate::pattern(pattern),
        }
    }
}

impl Rule for DropAddZero {
    fn name(&self) -> &str {
        "drop-add-zero"
    }

    fn predicate(&self) -> &Predicate {
        &self.predicate
    }

    fn rewrite(
        &self,
        found: &MatchResult,
        _cx: &RewriteContext<'_>,
    ) -> Result<Option<Arc<Node>>, RuleError> {
        Ok(found.bindings().node("X").cloned())
    }
}

/// Proposes the matched node itself.
pub(crate) struct Echo(pub(crate) Predicate);

impl Rule for Echo {
    fn name(&self) -> &str {
        "echo"
    }

    fn predicate(&self) -> &Predicate {
        &self.0
    }

    fn rewrite(
        &self,
        found: &MatchResult,
        _cx: &RewriteContext<'_>,
    ) -> Result<Option<Arc<Node>>, RuleError> {
        Ok(Some(Arc::clone(found.node())))
    }
}

/// How [`Broken`] misbehaves.
#[derive(Clone, Copy)]
pub(crate) enum Fault {
    PanicInRewrite,
    PanicInPredicate,
    Fail,
    UnboundTemplate,
}

/// A rule matching identifiers spelled `boom` that never succeeds.
pub(crate) struct Broken {
    fault: Fault,
    predicate: Predicate,
}

impl Broken {
    pub(crate) fn new(fault: Fault) -> Self {
        let predicate = match fault {
            Fault::PanicInPredicate => Predicate::kind(SyntaxKind::Identifier)
                .and(Predicate::text_with(|_| panic!("predicate exploded"))),
            Fault::PanicInRewrite | Fault::Fail | Fault::UnboundTemplate => identifier("boom"),
        };
        Self { fault, predicate }
    }
}

impl Rule for Broken {
    fn name(&self) -> &str {
        "broken"
    }

    fn predicate(&self) -> &Predicate {
        &self.predicate
    }

    fn rewrite(
        &self,
        found: &MatchResult,
        _cx: &RewriteContext<'_>,
    ) -> Result<Option<Arc<Node>>, RuleError> {
        match self.fault {
            Fault::PanicInRewrite | Fault::PanicInPredicate => panic!("rewrite exploded"),
            Fault::Fail => Err(RuleError::failed("cannot rewrite boom")),
            Fault::UnboundTemplate => {
                let template = Template::parse("$MISSING", InsertionContext::Expression)?;
                Ok(Some(template.instantiate(found.bindings())?))
            }
        }
    }
}
