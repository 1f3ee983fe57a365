//! Source-level type attribution.
//!
//! The attributor is the engine's stand-in for a compiler front end. It
//! resolves the type names a unit uses against its package, its imports,
//! `java.lang` and the types it declares itself, then attaches a
//! [`TypeDescriptor`] to declarations, type references and the expressions
//! it can type. Anything it cannot resolve is left without a descriptor,
//! which type-gated predicates treat as unknown.
//!
//! Node ids are preserved, so attribution can be re-run on every pass
//! without disturbing identity.

mod declarations;
mod expressions;
mod names;

use std::collections::HashMap;
use std::sync::Arc;

use crate::kind::SyntaxKind;
use crate::tree::{Child, Element, Node, Tree};
use crate::types::{LayeredOracle, OBJECT, PrimitiveType, TypeDescriptor, TypeOracle, TypeTable};

use declarations::FieldTable;
use names::{NameResolver, compact, declared_types, type_parameter_names};

/// An attributed tree together with metadata for the types it declares.
#[derive(Debug, Clone)]
pub struct Attribution {
    tree: Tree,
    local: TypeTable,
}

impl Attribution {
    /// Returns the attributed tree.
    #[must_use]
    pub const fn tree(&self) -> &Tree {
        &self.tree
    }

    /// Returns metadata for the types declared in the unit.
    #[must_use]
    pub const fn local_types(&self) -> &TypeTable {
        &self.local
    }

    /// Returns an oracle that answers for local types first, then `base`.
    #[must_use]
    pub fn oracle<'a>(&'a self, base: &'a dyn TypeOracle) -> LayeredOracle<'a> {
        LayeredOracle::new(&self.local, base)
    }

    /// Splits the attribution into its tree and local type table.
    #[must_use]
    pub fn into_parts(self) -> (Tree, TypeTable) {
        (self.tree, self.local)
    }
}

/// Attributes `tree` using `oracle` for types declared elsewhere.
///
/// # Examples
///
/// ```
/// use recast_syntax::{SyntaxKind, TypeTable, attribute, parse};
///
/// let tree = parse("class A { boolean f(String s) { return s.isEmpty(); } }")?;
/// let attributed = attribute(&tree, &TypeTable::with_jdk());
/// let call = attributed
///     .tree()
///     .preorder()
///     .find(|node| node.kind() == SyntaxKind::MethodInvocation)
///     .expect("call");
/// assert_eq!(call.ty().map(ToString::to_string).as_deref(), Some("boolean"));
/// # Ok::<(), recast_syntax::SyntaxError>(())
/// ```
#[must_use]
pub fn attribute(tree: &Tree, oracle: &dyn TypeOracle) -> Attribution {
    let types = declared_types(tree.root());
    let names = NameResolver::new(tree.root(), &types, oracle);
    let (local, fields) = declarations::collect(&types, &names);
    let layered = LayeredOracle::new(&local, oracle);
    let mut annotator = Annotator {
        names: &names,
        oracle: &layered,
        fields: &fields,
        scopes: Vec::new(),
        classes: Vec::new(),
        type_vars: Vec::new(),
    };
    let root = annotator.annotate(tree.root(), None);
    Attribution {
        tree: tree.with_root(root),
        local,
    }
}

type Scope = HashMap<String, Option<TypeDescriptor>>;

struct Annotator<'a> {
    names: &'a NameResolver<'a>,
    oracle: &'a dyn TypeOracle,
    fields: &'a FieldTable,
    scopes: Vec<Scope>,
    classes: Vec<String>,
    type_vars: Vec<String>,
}

impl Annotator<'_> {
    fn annotate(&mut self, node: &Arc<Node>, field: Option<&str>) -> Arc<Node> {
        let kind = node.kind();
        let rebuilt = if kind.is_type_declaration() {
            self.type_declaration(node)
        } else {
            match kind {
                SyntaxKind::MethodDeclaration | SyntaxKind::ConstructorDeclaration => {
                    self.method(node)
                }
                SyntaxKind::EnhancedForStatement
                | SyntaxKind::CatchClause
                | SyntaxKind::LambdaExpression => {
                    let scope = self.predeclared(node);
                    self.scoped(node, scope)
                }
                SyntaxKind::Block
                | SyntaxKind::ConstructorBody
                | SyntaxKind::SwitchBlock
                | SyntaxKind::SwitchBlockStatementGroup
                | SyntaxKind::ForStatement
                | SyntaxKind::TryWithResourcesStatement => self.scoped(node, Scope::new()),
                _ => self.children(node),
            }
        };

        let ty = self.type_of(&rebuilt, field);
        if matches!(kind, SyntaxKind::LocalVariableDeclaration | SyntaxKind::Other("resource")) {
            self.declare_locals(&rebuilt);
        }
        Arc::new(rebuilt.with_ty(ty.map(Arc::new)))
    }

    fn children(&mut self, node: &Node) -> Node {
        let mut children: Vec<Child> = Vec::with_capacity(node.children().len());
        for child in node.children() {
            children.push(match child.element() {
                Element::Node(inner) => {
                    child.with_element(self.annotate(inner, child.field()))
                }
                Element::Token(_) => child.clone(),
            });
        }
        node.with_children(children)
    }

    fn scoped(&mut self, node: &Node, scope: Scope) -> Node {
        self.scopes.push(scope);
        let rebuilt = self.children(node);
        self.scopes.pop();
        rebuilt
    }

    fn type_declaration(&mut self, node: &Node) -> Node {
        let fqn = self.names.fqn_of(node.id()).map(str::to_owned);
        let scope: Scope = fqn
            .as_ref()
            .and_then(|fqn| self.fields.get(fqn))
            .map(|fields| {
                fields
                    .iter()
                    .map(|(name, ty)| (name.clone(), Some(ty.clone())))
                    .collect()
            })
            .unwrap_or_default();
        let vars = type_parameter_names(node);
        let var_count = vars.len();
        self.type_vars.extend(vars);
        self.classes.push(fqn.unwrap_or_else(|| String::from(OBJECT)));
        let rebuilt = self.scoped(node, scope);
        self.classes.pop();
        self.type_vars.truncate(self.type_vars.len().saturating_sub(var_count));
        rebuilt
    }

    fn method(&mut self, node: &Node) -> Node {
        let vars = type_parameter_names(node);
        let var_count = vars.len();
        self.type_vars.extend(vars);
        let mut scope = Scope::new();
        if let Some(parameters) = node.field_node("parameters") {
            for parameter in parameters.child_nodes() {
                if let Some((name, ty)) = self.parameter(parameter) {
                    scope.insert(name, ty);
                }
            }
        }
        let rebuilt = self.scoped(node, scope);
        self.type_vars.truncate(self.type_vars.len().saturating_sub(var_count));
        rebuilt
    }

    /// Declares the variables a statement introduces before its body.
    fn predeclared(&self, node: &Node) -> Scope {
        let mut scope = Scope::new();
        match node.kind() {
            SyntaxKind::EnhancedForStatement => {
                if let Some(name) = node.field_node("name").and_then(|name| name.token_text()) {
                    scope.insert(name.to_owned(), self.declared_type(node));
                }
            }
            SyntaxKind::CatchClause => {
                let parameter = node.child_of_kind(SyntaxKind::CatchFormalParameter);
                let name = parameter
                    .and_then(|parameter| parameter.field_node("name"))
                    .and_then(|name| name.token_text());
                if let Some(name) = name {
                    let ty = parameter.and_then(|parameter| self.catch_type(parameter));
                    scope.insert(name.to_owned(), ty);
                }
            }
            SyntaxKind::LambdaExpression => {
                if let Some(parameters) = node.field_node("parameters") {
                    if parameters.kind() == SyntaxKind::Identifier
                        && let Some(name) = parameters.token_text()
                    {
                        scope.insert(name.to_owned(), None);
                    }
                    for parameter in parameters.child_nodes() {
                        if let Some((name, ty)) = self.parameter(parameter) {
                            scope.insert(name, ty);
                        } else if let Some(name) = parameter.token_text() {
                            scope.insert(name.to_owned(), None);
                        }
                    }
                }
            }
            _ => {}
        }
        scope
    }

    fn parameter(&self, parameter: &Node) -> Option<(String, Option<TypeDescriptor>)> {
        match parameter.kind() {
            SyntaxKind::FormalParameter => {
                let name = parameter.field_node("name")?.token_text()?.to_owned();
                Some((name, self.declared_type(parameter)))
            }
            SyntaxKind::Other("spread_parameter") => {
                let name = parameter
                    .child_of_kind(SyntaxKind::VariableDeclarator)?
                    .field_node("name")?
                    .token_text()?
                    .to_owned();
                let ty = parameter
                    .child_nodes()
                    .find(|child| child.kind() != SyntaxKind::Modifiers)
                    .and_then(|ty| self.names.resolve_type(ty, &self.type_vars))
                    .map(|ty| TypeDescriptor::Array(Box::new(ty)));
                Some((name, ty))
            }
            _ => None,
        }
    }

    fn declared_type(&self, node: &Node) -> Option<TypeDescriptor> {
        node.field_node("type")
            .and_then(|ty| self.names.resolve_type(ty, &self.type_vars))
    }

    fn catch_type(&self, parameter: &Node) -> Option<TypeDescriptor> {
        let alternatives: Vec<_> = parameter
            .child_of_kind(SyntaxKind::CatchType)?
            .child_nodes()
            .collect();
        match alternatives.as_slice() {
            [only] => self.names.resolve_type(only, &self.type_vars),
            _ => None,
        }
    }

    fn declare_locals(&mut self, declaration: &Node) {
        let declared = self.declared_type(declaration);
        let mut introduced = Vec::new();
        if declaration.kind() == SyntaxKind::Other("resource")
            && let Some(name) = declaration.field_node("name").and_then(|name| name.token_text())
        {
            let ty = declared.clone().or_else(|| {
                declaration.field_node("value").and_then(|value| value.ty().cloned())
            });
            introduced.push((name.to_owned(), ty));
        }
        for declarator in declaration.children_of_kind(SyntaxKind::VariableDeclarator) {
            let Some(name) = declarator.field_node("name").and_then(|name| name.token_text()) else {
                continue;
            };
            let ty = declared.clone().or_else(|| {
                declarator.field_node("value").and_then(|value| value.ty().cloned())
            });
            introduced.push((name.to_owned(), ty));
        }
        if let Some(scope) = self.scopes.last_mut() {
            scope.extend(introduced);
        }
    }

    fn lookup(&self, name: &str) -> Option<TypeDescriptor> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.get(name))
            .cloned()
            .flatten()
    }

    fn type_of(&self, node: &Node, field: Option<&str>) -> Option<TypeDescriptor> {
        let child_ty = |name: &str| node.field_node(name).and_then(|child| child.ty());
        match node.kind() {
            kind if kind.is_type_declaration() => self
                .names
                .fqn_of(node.id())
                .map(TypeDescriptor::class),
            SyntaxKind::MethodDeclaration
            | SyntaxKind::LocalVariableDeclaration
            | SyntaxKind::FieldDeclaration
            | SyntaxKind::FormalParameter => self.declared_type(node),
            SyntaxKind::CatchFormalParameter => self.catch_type(node),
            SyntaxKind::IntegralType
            | SyntaxKind::FloatingPointType
            | SyntaxKind::BooleanType
            | SyntaxKind::VoidType
            | SyntaxKind::TypeIdentifier
            | SyntaxKind::ScopedTypeIdentifier
            | SyntaxKind::GenericType
            | SyntaxKind::ArrayType => self.names.resolve_type(node, &self.type_vars),
            SyntaxKind::Identifier => {
                if matches!(field, Some("name" | "field")) {
                    None
                } else {
                    node.token_text().and_then(|name| self.lookup(name))
                }
            }
            SyntaxKind::This => self.classes.last().map(TypeDescriptor::class),
            SyntaxKind::ParenthesizedExpression => {
                node.child_nodes().next().and_then(|inner| inner.ty()).cloned()
            }
            SyntaxKind::CastExpression | SyntaxKind::ObjectCreationExpression => {
                self.declared_type(node)
            }
            SyntaxKind::MethodInvocation => self.invocation(node),
            SyntaxKind::FieldAccess => self.field_access(node),
            SyntaxKind::BinaryExpression => {
                let operator = node.field("operator").and_then(|op| op.as_token())?;
                expressions::binary(operator.text(), child_ty("left"), child_ty("right"))
            }
            SyntaxKind::UnaryExpression => {
                let operator = node.field("operator").and_then(|op| op.as_token())?;
                expressions::unary(operator.text(), child_ty("operand"))
            }
            SyntaxKind::AssignmentExpression => child_ty("left").cloned(),
            SyntaxKind::InstanceofExpression => Some(TypeDescriptor::Primitive(PrimitiveType::Boolean)),
            SyntaxKind::TernaryExpression => {
                let consequence = child_ty("consequence")?;
                (Some(consequence) == child_ty("alternative")).then(|| consequence.clone())
            }
            SyntaxKind::ArrayAccess => match child_ty("array")? {
                TypeDescriptor::Array(element) => Some(element.as_ref().clone()),
                _ => None,
            },
            SyntaxKind::Other("update_expression") => {
                node.child_nodes().next().and_then(|operand| operand.ty()).cloned()
            }
            _ => expressions::literal(node),
        }
    }

    fn invocation(&self, node: &Node) -> Option<TypeDescriptor> {
        let name = node.field_node("name")?.token_text()?;
        let arity = node.field_node("arguments")?.child_nodes().count();
        let owner = match node.field_node("object") {
            Some(object) => match object.ty() {
                Some(TypeDescriptor::TypeVariable { .. }) => String::from(OBJECT),
                Some(ty) => ty.erasure()?.to_owned(),
                None => match self.names.resolve_name(&compact(object), &self.type_vars)? {
                    TypeDescriptor::Class { fqn } => fqn,
                    _ => return None,
                },
            },
            None => self.classes.last()?.clone(),
        };
        self.oracle
            .method(&owner, name, arity)
            .map(|method| method.return_type.clone())
    }

    fn field_access(&self, node: &Node) -> Option<TypeDescriptor> {
        let name = node.field_node("field")?.token_text()?;
        let object = node.field_node("object")?;
        match object.ty()? {
            TypeDescriptor::Array(_) if name == "length" => {
                Some(TypeDescriptor::Primitive(PrimitiveType::Int))
            }
            ty => self
                .fields
                .get(ty.erasure()?)
                .and_then(|fields| fields.get(name))
                .cloned(),
        }
    }
}
