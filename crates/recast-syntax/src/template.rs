//! Templates: parameterised snippets compiled into replacement subtrees.
//!
//! A template is parsed once under an [`InsertionContext`]. Instantiating it
//! splices bound elements from a match into the placeholders. Bound elements
//! are the matched tree's own subtrees, so they keep their ids, resolved
//! types and formatting; only the placeholder's leading space is carried
//! over. Template-authored tokens are marked synthetic and template nodes
//! pending, which tells the reconciler which space still needs deriving.
//!
//! A statement-level sequence placeholder is written as `$$$BODY;`, the
//! same way a pattern writes it.

use std::sync::Arc;

use crate::context::InsertionContext;
use crate::error::TemplateError;
use crate::matcher::{Binding, Bindings};
use crate::metavariables::{MetaVarKind, MetaVariable, element_metavariable, metavariable_of, normalise};
use crate::tree::{Child, Element, Node, Token};

/// A parsed template.
///
/// # Examples
///
/// ```
/// use recast_syntax::{InsertionContext, Pattern, Template, parse};
///
/// let tree = parse("class A { boolean f(String s) { return s == \"x\"; } }")?;
/// let found = Pattern::expression("$S == $LIT")?.find_first(&tree).expect("match");
/// let template = Template::parse("$LIT.equals($S)", InsertionContext::Expression)?;
/// let replacement = template.instantiate(found.bindings())?;
/// assert_eq!(replacement.to_source(), "\"x\".equals(s)");
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone)]
pub struct Template {
    source: String,
    context: InsertionContext,
    metavariables: Vec<MetaVariable>,
    root: Arc<Node>,
}

impl Template {
    /// Parses `source` under `context`.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError::Empty`] for blank source,
    /// [`TemplateError::InvalidPlaceholder`] for malformed metavariables,
    /// [`TemplateError::Parse`] when the snippet does not parse under
    /// `context` and [`TemplateError::Arity`] unless it yields exactly one
    /// node.
    pub fn parse(source: &str, context: InsertionContext) -> Result<Self, TemplateError> {
        if source.trim().is_empty() {
            return Err(TemplateError::Empty);
        }
        let (normalised, metavariables) = normalise(source)
            .map_err(|message| TemplateError::InvalidPlaceholder { message })?;
        let nodes = context
            .parse_fragment(&normalised)
            .map_err(|err| TemplateError::parse(context, err.to_string()))?;
        let root = match nodes.as_slice() {
            [only] => Arc::new(synthesise(only)),
            other => {
                return Err(TemplateError::Arity {
                    context,
                    found: other.len(),
                });
            }
        };
        Ok(Self {
            source: source.to_owned(),
            context,
            metavariables,
            root,
        })
    }

    /// Returns the template source.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Returns the context the template was parsed under.
    #[must_use]
    pub const fn context(&self) -> InsertionContext {
        self.context
    }

    /// Returns the placeholders in order of appearance.
    #[must_use]
    pub fn metavariables(&self) -> &[MetaVariable] {
        &self.metavariables
    }

    /// Returns the names of placeholders not bound by `bindings`.
    #[must_use]
    pub fn unbound<'t>(&'t self, bindings: &Bindings) -> Vec<&'t str> {
        self.metavariables
            .iter()
            .map(|var| var.name.as_str())
            .filter(|name| bindings.get(name).is_none())
            .collect()
    }

    /// Builds the replacement subtree for one match.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError::UnboundPlaceholder`] when a placeholder has
    /// no binding and [`TemplateError::BindingArity`] when a single-element
    /// placeholder is bound to a run.
    pub fn instantiate(&self, bindings: &Bindings) -> Result<Arc<Node>, TemplateError> {
        if let Some((name, _)) = metavariable_of(&self.root) {
            return match lookup(name, bindings)? {
                Binding::Single(Element::Node(node)) => Ok(Arc::clone(node)),
                Binding::Single(Element::Token(_)) | Binding::Multiple(_) => {
                    Err(TemplateError::BindingArity {
                        name: name.to_owned(),
                        expected: "a single",
                    })
                }
            };
        }
        instantiate_node(&self.root, bindings).map(Arc::new)
    }
}

/// Parses `source` under `context` and instantiates it with `bindings`.
///
/// # Errors
///
/// Any error of [`Template::parse`] or [`Template::instantiate`].
pub fn compile(
    source: &str,
    bindings: &Bindings,
    context: InsertionContext,
) -> Result<Arc<Node>, TemplateError> {
    Template::parse(source, context)?.instantiate(bindings)
}

fn synthesise(node: &Node) -> Node {
    let children = node
        .children()
        .iter()
        .map(|child| match child.element() {
            Element::Node(inner) => Child::new(child.field(), Element::from(synthesise(inner))),
            Element::Token(token) => Child::new(
                child.field(),
                Element::from(Token::synthetic(token.prefix(), token.text())),
            ),
        })
        .collect();
    Node::new(node.kind(), children).with_pending_format(true)
}

fn lookup<'b>(name: &str, bindings: &'b Bindings) -> Result<&'b Binding, TemplateError> {
    bindings.get(name).ok_or_else(|| TemplateError::unbound(name))
}

fn instantiate_node(node: &Node, bindings: &Bindings) -> Result<Node, TemplateError> {
    let mut out: Vec<Child> = Vec::with_capacity(node.children().len());
    let mut carried_prefix: Option<String> = None;
    let mut skip_comma = false;

    for (index, child) in node.children().iter().enumerate() {
        if skip_comma {
            skip_comma = false;
            if child.element().is_token(",") {
                continue;
            }
        }

        let emitted = match element_metavariable(child.element()) {
            Some((name, kind)) => {
                let elements = splice(name, kind, bindings)?;
                if elements.is_empty() {
                    let next_is_comma = node
                        .children()
                        .get(index + 1)
                        .is_some_and(|next| next.element().is_token(","));
                    if next_is_comma {
                        skip_comma = true;
                        carried_prefix = Some(child.element().prefix().to_owned());
                    } else if out.last().is_some_and(|last| last.element().is_token(",")) {
                        out.pop();
                    }
                    continue;
                }
                let prefix = child.element().prefix();
                elements
                    .into_iter()
                    .enumerate()
                    .map(|(position, element)| {
                        let placed = if position == 0 {
                            with_placeholder_prefix(&element, prefix)
                        } else {
                            element
                        };
                        Child::new(child.field(), placed)
                    })
                    .collect()
            }
            None => match child.element() {
                Element::Node(inner) => vec![Child::new(
                    child.field(),
                    Element::from(instantiate_node(inner, bindings)?),
                )],
                Element::Token(_) => vec![child.clone()],
            },
        };

        for (position, placed) in emitted.into_iter().enumerate() {
            match carried_prefix.take() {
                Some(prefix) if position == 0 => {
                    out.push(placed.with_element(with_placeholder_prefix(placed.element(), &prefix)));
                }
                _ => out.push(placed),
            }
        }
    }

    Ok(node.with_children(out))
}

/// Gives a spliced element the placeholder's space. Multi-line space is
/// still relative to the template, so it is left for the reconciler.
fn with_placeholder_prefix(element: &Element, prefix: &str) -> Element {
    if prefix.contains('\n') {
        element.map_first_token(&|token| Token::synthetic(prefix, token.text()))
    } else {
        element.with_prefix(prefix)
    }
}

fn splice(name: &str, kind: MetaVarKind, bindings: &Bindings) -> Result<Vec<Element>, TemplateError> {
    match (lookup(name, bindings)?, kind) {
        (Binding::Single(element), _) => Ok(vec![element.clone()]),
        (Binding::Multiple(elements), MetaVarKind::Multiple) => Ok(elements.clone()),
        (Binding::Multiple(_), MetaVarKind::Single) => Err(TemplateError::BindingArity {
            name: name.to_owned(),
            expected: "a single",
        }),
    }
}
