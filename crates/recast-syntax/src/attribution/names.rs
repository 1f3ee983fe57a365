//! Type name resolution for one compilation unit.

use std::collections::HashMap;
use std::sync::Arc;

use crate::kind::SyntaxKind;
use crate::tree::{Node, NodeId};
use crate::types::{PrimitiveType, TypeDescriptor, TypeOracle};

const JAVA_LANG: &str = "java.lang";

/// A type declared in the unit, with its qualified name.
#[derive(Debug, Clone)]
pub(super) struct DeclaredType {
    pub(super) fqn: String,
    pub(super) node: Arc<Node>,
}

/// Resolves simple and qualified type names in the scope of one unit.
pub(super) struct NameResolver<'o> {
    package: Option<String>,
    single_imports: HashMap<String, String>,
    on_demand: Vec<String>,
    declared: HashMap<String, String>,
    by_node: HashMap<NodeId, String>,
    oracle: &'o dyn TypeOracle,
}

impl<'o> NameResolver<'o> {
    pub(super) fn new(root: &Arc<Node>, types: &[DeclaredType], oracle: &'o dyn TypeOracle) -> Self {
        let mut single_imports = HashMap::new();
        let mut on_demand = Vec::new();
        for import in root.children_of_kind(SyntaxKind::ImportDeclaration) {
            if import.has_token("static") {
                continue;
            }
            let Some(name) = import
                .child_nodes()
                .find(|child| {
                    matches!(child.kind(), SyntaxKind::Identifier | SyntaxKind::ScopedIdentifier)
                })
                .map(|child| compact(child))
            else {
                continue;
            };
            if import.child_nodes().any(|child| child.kind() == SyntaxKind::Other("asterisk")) {
                on_demand.push(name);
            } else {
                let simple = name.rsplit('.').next().unwrap_or_default().to_owned();
                single_imports.insert(simple, name);
            }
        }

        let declared = types
            .iter()
            .map(|declared| {
                let simple = declared.fqn.rsplit('.').next().unwrap_or_default().to_owned();
                (simple, declared.fqn.clone())
            })
            .collect();
        let by_node = types
            .iter()
            .map(|declared| (declared.node.id(), declared.fqn.clone()))
            .collect();

        Self {
            package: package_of(root),
            single_imports,
            on_demand,
            declared,
            by_node,
            oracle,
        }
    }

    /// Returns the qualified name of a type declaration node.
    pub(super) fn fqn_of(&self, id: NodeId) -> Option<&str> {
        self.by_node.get(&id).map(String::as_str)
    }

    fn known(&self, fqn: &str) -> bool {
        self.declared.values().any(|declared| declared == fqn) || self.oracle.class(fqn).is_some()
    }

    /// Resolves a type name as written in source.
    pub(super) fn resolve_name(&self, name: &str, type_vars: &[String]) -> Option<TypeDescriptor> {
        if let Some((head, rest)) = name.split_once('.') {
            if self.known(name) {
                return Some(TypeDescriptor::class(name));
            }
            return match self.resolve_name(head, type_vars) {
                Some(TypeDescriptor::Class { fqn }) => {
                    Some(TypeDescriptor::class(format!("{fqn}.{rest}")))
                }
                _ => Some(TypeDescriptor::class(name)),
            };
        }
        if type_vars.iter().any(|var| var == name) {
            return Some(TypeDescriptor::TypeVariable {
                name: name.to_owned(),
            });
        }
        if let Some(fqn) = self
            .declared
            .get(name)
            .or_else(|| self.single_imports.get(name))
        {
            return Some(TypeDescriptor::class(fqn.clone()));
        }
        let same_package = self
            .package
            .as_ref()
            .map(|package| format!("{package}.{name}"))
            .filter(|fqn| self.oracle.class(fqn).is_some());
        let java_lang = Some(format!("{JAVA_LANG}.{name}")).filter(|fqn| self.oracle.class(fqn).is_some());
        same_package
            .or(java_lang)
            .or_else(|| {
                self.on_demand
                    .iter()
                    .map(|package| format!("{package}.{name}"))
                    .find(|fqn| self.oracle.class(fqn).is_some())
            })
            .map(TypeDescriptor::class)
    }

    /// Resolves a type node to a descriptor.
    pub(super) fn resolve_type(&self, node: &Node, type_vars: &[String]) -> Option<TypeDescriptor> {
        match node.kind() {
            SyntaxKind::IntegralType
            | SyntaxKind::FloatingPointType
            | SyntaxKind::BooleanType
            | SyntaxKind::VoidType => {
                PrimitiveType::from_keyword(node.text().trim()).map(TypeDescriptor::Primitive)
            }
            SyntaxKind::TypeIdentifier | SyntaxKind::ScopedTypeIdentifier => {
                let name = compact(node);
                if name == "var" {
                    return None;
                }
                self.resolve_name(&name, type_vars)
            }
            SyntaxKind::GenericType => {
                let base = node
                    .child_nodes()
                    .find(|child| child.kind() != SyntaxKind::TypeArguments)
                    .and_then(|child| self.resolve_type(child, type_vars))?;
                let fqn = base.erasure()?.to_owned();
                let arguments: Option<Vec<TypeDescriptor>> = node
                    .child_of_kind(SyntaxKind::TypeArguments)
                    .map(|arguments| {
                        arguments
                            .child_nodes()
                            .map(|argument| self.resolve_type(argument, type_vars))
                            .collect()
                    })
                    .unwrap_or_default();
                Some(match arguments {
                    Some(arguments) if !arguments.is_empty() => {
                        TypeDescriptor::Parameterized { fqn, arguments }
                    }
                    _ => TypeDescriptor::Class { fqn },
                })
            }
            SyntaxKind::ArrayType => {
                let element = node
                    .field_node("element")
                    .and_then(|element| self.resolve_type(element, type_vars))?;
                let depth = node
                    .field_node("dimensions")
                    .map_or(1, |dimensions| dimensions.to_source().matches('[').count());
                Some((0..depth).fold(element, |inner, _| TypeDescriptor::Array(Box::new(inner))))
            }
            SyntaxKind::Other("annotated_type") => node
                .child_nodes()
                .last()
                .and_then(|inner| self.resolve_type(inner, type_vars)),
            _ => None,
        }
    }
}

/// Returns the dotted package name of the unit.
fn package_of(root: &Node) -> Option<String> {
    root.child_of_kind(SyntaxKind::PackageDeclaration)?
        .child_nodes()
        .find(|child| matches!(child.kind(), SyntaxKind::Identifier | SyntaxKind::ScopedIdentifier))
        .map(|name| compact(name))
}

/// Prints a name without any space or comments.
pub(super) fn compact(node: &Node) -> String {
    let mut out = String::new();
    node.for_each_token(&mut |token| out.push_str(token.text()));
    out
}

/// Lists the unit's type declarations, outer before nested.
pub(super) fn declared_types(root: &Arc<Node>) -> Vec<DeclaredType> {
    let prefix = package_of(root);
    let mut out = Vec::new();
    for child in root.child_nodes() {
        collect_declared(child, prefix.as_deref(), &mut out);
    }
    out
}

fn collect_declared(node: &Arc<Node>, outer: Option<&str>, out: &mut Vec<DeclaredType>) {
    if !node.kind().is_type_declaration() {
        return;
    }
    let Some(name) = node.field_node("name").and_then(|name| name.token_text()) else {
        return;
    };
    let fqn = outer.map_or_else(|| name.to_owned(), |outer| format!("{outer}.{name}"));
    out.push(DeclaredType {
        fqn: fqn.clone(),
        node: Arc::clone(node),
    });
    for member in members(node) {
        collect_declared(member, Some(&fqn), out);
    }
}

/// Iterates over the member declarations of a type declaration.
pub(super) fn members(declaration: &Node) -> Vec<&Arc<Node>> {
    let Some(body) = declaration.field_node("body") else {
        return Vec::new();
    };
    body.child_nodes()
        .flat_map(|child| {
            if child.kind() == SyntaxKind::Other("enum_body_declarations") {
                child.child_nodes().collect::<Vec<_>>()
            } else {
                vec![child]
            }
        })
        .collect()
}

/// Returns the names declared by a type parameter list.
pub(super) fn type_parameter_names(declaration: &Node) -> Vec<String> {
    declaration
        .field_node("type_parameters")
        .or_else(|| declaration.child_of_kind(SyntaxKind::TypeParameters))
        .map(|parameters| {
            parameters
                .children_of_kind(SyntaxKind::TypeParameter)
                .filter_map(|parameter| {
                    parameter
                        .child_nodes()
                        .find(|child| {
                            matches!(child.kind(), SyntaxKind::TypeIdentifier | SyntaxKind::Identifier)
                        })
                        .and_then(|name| name.token_text())
                        .map(str::to_owned)
                })
                .collect()
        })
        .unwrap_or_default()
}
