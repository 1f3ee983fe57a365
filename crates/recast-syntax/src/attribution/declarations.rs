//! Class metadata for the types a unit declares.

use std::collections::HashMap;

use super::names::{DeclaredType, NameResolver, members, type_parameter_names};
use crate::kind::SyntaxKind;
use crate::tree::Node;
use crate::types::{ClassInfo, ClassKind, MethodSignature, TypeDescriptor, TypeTable};

/// Field types keyed by declaring class, then by field name.
pub(super) type FieldTable = HashMap<String, HashMap<String, TypeDescriptor>>;

/// Builds class metadata and field tables for every declared type.
pub(super) fn collect(types: &[DeclaredType], names: &NameResolver<'_>) -> (TypeTable, FieldTable) {
    let mut table = TypeTable::new();
    let mut fields = FieldTable::new();
    for declared in types {
        let (info, class_fields) = describe(declared, names);
        table.insert(info);
        fields.insert(declared.fqn.clone(), class_fields);
    }
    (table, fields)
}

fn class_kind(kind: SyntaxKind) -> ClassKind {
    match kind {
        SyntaxKind::InterfaceDeclaration => ClassKind::Interface,
        SyntaxKind::EnumDeclaration => ClassKind::Enum,
        SyntaxKind::RecordDeclaration => ClassKind::Record,
        SyntaxKind::AnnotationTypeDeclaration => ClassKind::Annotation,
        _ => ClassKind::Class,
    }
}

fn describe(
    declared: &DeclaredType,
    names: &NameResolver<'_>,
) -> (ClassInfo, HashMap<String, TypeDescriptor>) {
    let node = &declared.node;
    let type_vars = type_parameter_names(node);
    let mut info = ClassInfo::new(declared.fqn.clone(), class_kind(node.kind()));
    let mut unresolved = false;

    let superclass = match node.kind() {
        SyntaxKind::EnumDeclaration => Some(Ok(String::from("java.lang.Enum"))),
        SyntaxKind::RecordDeclaration => Some(Ok(String::from("java.lang.Record"))),
        _ => node
            .field_node("superclass")
            .and_then(|clause| clause.child_nodes().next())
            .map(|ty| erased(ty, names, &type_vars)),
    };
    match superclass {
        Some(Ok(fqn)) => info = info.extends(fqn),
        Some(Err(())) => unresolved = true,
        None => {}
    }

    for ty in interface_types(node) {
        match erased(ty, names, &type_vars) {
            Ok(fqn) => info = info.implements(fqn),
            Err(()) => unresolved = true,
        }
    }

    let mut fields = HashMap::new();
    if let Some(components) = node.field_node("parameters") {
        for component in components.children_of_kind(SyntaxKind::FormalParameter) {
            if let Some((name, ty)) = parameter(component, names, &type_vars) {
                fields.insert(name, ty);
            }
        }
    }

    for member in members(node) {
        match member.kind() {
            SyntaxKind::FieldDeclaration | SyntaxKind::Other("constant_declaration") => {
                let Some(ty) = member
                    .field_node("type")
                    .and_then(|ty| names.resolve_type(ty, &type_vars))
                else {
                    continue;
                };
                for declarator in member.children_of_kind(SyntaxKind::VariableDeclarator) {
                    if let Some(name) = declarator.field_node("name").and_then(|name| name.token_text()) {
                        fields.insert(name.to_owned(), ty.clone());
                    }
                }
            }
            SyntaxKind::MethodDeclaration => {
                if let Some(method) = method_signature(member, names, &type_vars) {
                    info = info.with_method(method);
                }
            }
            _ => {}
        }
    }

    (info.with_unresolved_supertypes(unresolved), fields)
}

fn interface_types(node: &Node) -> Vec<&std::sync::Arc<Node>> {
    let clause = node
        .field_node("interfaces")
        .or_else(|| node.child_of_kind(SyntaxKind::ExtendsInterfaces));
    clause
        .and_then(|clause| clause.child_of_kind(SyntaxKind::TypeList))
        .map(|list| list.child_nodes().collect())
        .unwrap_or_default()
}

fn erased(ty: &Node, names: &NameResolver<'_>, type_vars: &[String]) -> Result<String, ()> {
    names
        .resolve_type(ty, type_vars)
        .and_then(|resolved| resolved.erasure().map(str::to_owned))
        .ok_or(())
}

fn parameter(
    node: &Node,
    names: &NameResolver<'_>,
    type_vars: &[String],
) -> Option<(String, TypeDescriptor)> {
    let ty = names.resolve_type(node.field_node("type")?, type_vars)?;
    let name = node.field_node("name")?.token_text()?.to_owned();
    Some((name, ty))
}

fn method_signature(
    method: &Node,
    names: &NameResolver<'_>,
    class_vars: &[String],
) -> Option<MethodSignature> {
    let mut type_vars = class_vars.to_vec();
    type_vars.extend(type_parameter_names(method));
    let name = method.field_node("name")?.token_text()?;
    let return_type = names.resolve_type(method.field_node("type")?, &type_vars)?;
    let parameters = method
        .field_node("parameters")?
        .child_nodes()
        .map(|parameter| match parameter.kind() {
            SyntaxKind::FormalParameter => parameter
                .field_node("type")
                .and_then(|ty| names.resolve_type(ty, &type_vars)),
            _ => parameter
                .child_nodes()
                .find(|child| child.kind() != SyntaxKind::Modifiers)
                .and_then(|ty| names.resolve_type(ty, &type_vars))
                .map(|ty| TypeDescriptor::Array(Box::new(ty))),
        })
        .collect::<Option<Vec<_>>>()?;
    Some(MethodSignature::new(name, parameters, return_type))
}
