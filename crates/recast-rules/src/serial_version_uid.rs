//! Gives serialisable classes a `serialVersionUID`.
//!
//! Applies to class declarations assignable to `java.io.Serializable` that
//! are not exceptions; interfaces, enums and records are never touched. A
//! class whose supertypes cannot all be resolved is left alone. An existing
//! field of that name is normalised to `private static final long` with its
//! initialiser kept.

use std::sync::Arc;

use recast::{
    MatchResult, Predicate, RewriteContext, Rule, RuleDescriptor, RuleError, RuleOptions,
};
use recast_syntax::{
    Binding, Bindings, Element, InsertionContext, Node, SyntaxKind, Template, TypeTest,
    insert_child, reconcile, trailing_indent,
};
use tracing::debug;

use crate::alternatives::template;
use crate::error::RuleBuildError;

const SERIAL_TARGET: &str = "recast::rules::serial_version_uid";

/// Stable rule name.
pub const NAME: &str = "add-serial-version-uid";

const FIELD: &str = "serialVersionUID";
const SERIALIZABLE: &str = "java.io.Serializable";
const THROWABLE: &str = "java.lang.Throwable";
const MODIFIERS: [&str; 3] = ["private", "static", "final"];

/// Adds or normalises `private static final long serialVersionUID`.
#[derive(Debug, Clone)]
pub struct AddSerialVersionUid {
    predicate: Predicate,
    member: Template,
    normalised: Template,
}

impl AddSerialVersionUid {
    /// Creates the rule.
    ///
    /// # Errors
    ///
    /// Returns [`RuleBuildError`] if a member template fails to compile.
    pub fn new() -> Result<Self, RuleBuildError> {
        let predicate = Predicate::kind(SyntaxKind::ClassDeclaration)
            .and(Predicate::type_test(TypeTest::SubtypeOf(SERIALIZABLE.to_owned())))
            .and(!Predicate::type_test(TypeTest::SubtypeOf(THROWABLE.to_owned())));
        Ok(Self {
            predicate,
            member: template(
                "private static final long serialVersionUID = 1;",
                InsertionContext::Member,
            )?,
            normalised: template(
                "private static final long serialVersionUID = $VALUE;",
                InsertionContext::Member,
            )?,
        })
    }

    /// Rewrites an existing field, or `None` if it is already canonical or
    /// cannot be rewritten without losing something.
    fn normalise(&self, field: &Node) -> Result<Option<Arc<Node>>, RuleError> {
        if is_canonical(field) {
            return Ok(None);
        }
        let mut declarators = field.fields("declarator").filter_map(Element::as_node);
        let (Some(declarator), None) = (declarators.next(), declarators.next()) else {
            debug!(target: SERIAL_TARGET, "serialVersionUID shares its declaration");
            return Ok(None);
        };
        let annotated = field
            .child_of_kind(SyntaxKind::Modifiers)
            .is_some_and(|modifiers| modifiers.child_nodes().next().is_some());
        if annotated {
            debug!(target: SERIAL_TARGET, "serialVersionUID carries annotations");
            return Ok(None);
        }
        let replacement = match declarator.field("value") {
            Some(value) => {
                let mut bindings = Bindings::new();
                bindings.insert("VALUE", Binding::Single(value.clone()));
                self.normalised.instantiate(&bindings)?
            }
            None => self.member.instantiate(&Bindings::new())?,
        };
        Ok(Some(replacement))
    }
}

impl Rule for AddSerialVersionUid {
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
        let class = found.node();
        let Some(body) = class.field_node("body") else {
            return Ok(None);
        };
        let existing = body.children().iter().enumerate().find_map(|(index, child)| {
            child
                .element()
                .as_node()
                .filter(|member| declares_field(member))
                .map(|member| (index, member))
        });

        let rebuilt = match existing {
            None => {
                let member = self.member.instantiate(&Bindings::new())?;
                insert_child(body, 1, &Element::from(member), cx.style())
            }
            Some((index, field)) => {
                let Some(replacement) = self.normalise(field)? else {
                    return Ok(None);
                };
                let indent = trailing_indent(field.prefix()).unwrap_or_default();
                let placed = reconcile(&replacement, field.prefix(), indent, cx.style());
                body.with_child(index, placed)
            }
        };
        Ok(Some(Arc::new(class.with_field("body", rebuilt))))
    }
}

fn declares_field(member: &Node) -> bool {
    member.kind() == SyntaxKind::FieldDeclaration
        && member
            .fields("declarator")
            .filter_map(Element::as_node)
            .filter_map(|declarator| declarator.field_node("name"))
            .any(|name| name.token_text() == Some(FIELD))
}

fn is_canonical(field: &Node) -> bool {
    let modifiers_ok = field
        .child_of_kind(SyntaxKind::Modifiers)
        .is_some_and(|modifiers| MODIFIERS.iter().all(|keyword| modifiers.has_token(keyword)));
    let type_ok = field
        .field_node("type")
        .is_some_and(|ty| ty.kind() == SyntaxKind::IntegralType && ty.text() == "long");
    modifiers_ok && type_ok && field.fields("declarator").count() == 1
}

fn build(_options: &RuleOptions) -> Result<Box<dyn Rule>, Vec<String>> {
    AddSerialVersionUid::new()
        .map(|rule| Box::new(rule) as Box<dyn Rule>)
        .map_err(RuleBuildError::into_reasons)
}

pub(crate) const DESCRIPTOR: RuleDescriptor = RuleDescriptor::new(
    NAME,
    "Adds a serialVersionUID to serialisable classes.",
    &[],
    build,
);

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::test_support::rewrite;

    const IMPORT: &str = "import java.io.Serializable;\n";

    fn with_import(unit: &str) -> String {
        format!("{IMPORT}{unit}")
    }

    #[rstest]
    #[case::one_line(
        "class Example implements Serializable { private String fred; }",
        "class Example implements Serializable { private static final long serialVersionUID = 1; private String fred; }"
    )]
    #[case::multi_line(
        "class Example implements Serializable {\n    private String fred;\n}\n",
        "class Example implements Serializable {\n    private static final long serialVersionUID = 1;\n    private String fred;\n}\n"
    )]
    #[case::empty_body(
        "class Example implements Serializable {}",
        "class Example implements Serializable { private static final long serialVersionUID = 1; }"
    )]
    #[case::inherited(
        "class Base implements Serializable {}\nclass Derived extends Base {}\n",
        "class Base implements Serializable { private static final long serialVersionUID = 1; }\nclass Derived extends Base { private static final long serialVersionUID = 1; }\n"
    )]
    #[case::normalises_modifiers(
        "class Example implements Serializable {\n    static long serialVersionUID = 42L;\n}\n",
        "class Example implements Serializable {\n    private static final long serialVersionUID = 42L;\n}\n"
    )]
    #[case::normalises_type(
        "class Example implements Serializable {\n    private static final int serialVersionUID = 7;\n}\n",
        "class Example implements Serializable {\n    private static final long serialVersionUID = 7;\n}\n"
    )]
    fn adds_or_fixes_the_field(#[case] before: &str, #[case] after: &str) {
        let rule = AddSerialVersionUid::new().expect("rule builds");
        assert_eq!(rewrite(rule, &with_import(before)), with_import(after));
    }

    #[rstest]
    #[case::interface("interface Example extends Serializable {}")]
    #[case::exception("class MyException extends Exception implements Serializable {}")]
    #[case::not_serializable("class Plain { int x; }")]
    #[case::enumeration("enum Colour implements Serializable { RED }")]
    #[case::record("record Point(int x) implements Serializable {}")]
    #[case::canonical(
        "class Example implements Serializable { private static final long serialVersionUID = 3L; }"
    )]
    #[case::annotated("class Example implements Serializable { @Deprecated static long serialVersionUID = 3L; }")]
    #[case::unresolved_supertype("class Example extends Missing {}")]
    fn declines(#[case] unit: &str) {
        let rule = AddSerialVersionUid::new().expect("rule builds");
        let source = with_import(unit);
        assert_eq!(rewrite(rule, &source), source);
    }

    #[test]
    fn unresolved_interfaces_are_not_guessed() {
        let rule = AddSerialVersionUid::new().expect("rule builds");
        let source = "class Example implements Serializable { private String fred; }";
        assert_eq!(rewrite(rule, source), source);
    }
}
