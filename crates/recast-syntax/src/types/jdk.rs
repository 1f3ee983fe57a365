//! A small built-in model of commonly referenced JDK types.

use super::oracle::{ClassInfo, ClassKind, MethodSignature};
use super::{OBJECT, PrimitiveType, STRING, TypeDescriptor};

const SERIALIZABLE: &str = "java.io.Serializable";
const COMPARABLE: &str = "java.lang.Comparable";
const CHAR_SEQUENCE: &str = "java.lang.CharSequence";

fn primitive(primitive: PrimitiveType) -> TypeDescriptor {
    TypeDescriptor::Primitive(primitive)
}

fn method(name: &str, parameters: Vec<TypeDescriptor>, return_type: TypeDescriptor) -> MethodSignature {
    MethodSignature::new(name, parameters, return_type)
}

fn object() -> ClassInfo {
    ClassInfo::new(OBJECT, ClassKind::Class)
        .with_method(method(
            "equals",
            vec![TypeDescriptor::class(OBJECT)],
            primitive(PrimitiveType::Boolean),
        ))
        .with_method(method("hashCode", vec![], primitive(PrimitiveType::Int)))
        .with_method(method("toString", vec![], TypeDescriptor::string()))
        .with_method(method("getClass", vec![], TypeDescriptor::class("java.lang.Class")))
}

fn string() -> ClassInfo {
    let boolean = primitive(PrimitiveType::Boolean);
    ClassInfo::new(STRING, ClassKind::Class)
        .extends(OBJECT)
        .implements(SERIALIZABLE)
        .implements(COMPARABLE)
        .implements(CHAR_SEQUENCE)
        .with_method(method(
            "equalsIgnoreCase",
            vec![TypeDescriptor::string()],
            boolean.clone(),
        ))
        .with_method(method(
            "contentEquals",
            vec![TypeDescriptor::class(CHAR_SEQUENCE)],
            boolean.clone(),
        ))
        .with_method(method("isEmpty", vec![], boolean.clone()))
        .with_method(method("isBlank", vec![], boolean.clone()))
        .with_method(method(
            "startsWith",
            vec![TypeDescriptor::string()],
            boolean.clone(),
        ))
        .with_method(method("endsWith", vec![TypeDescriptor::string()], boolean))
        .with_method(method("length", vec![], primitive(PrimitiveType::Int)))
        .with_method(method("trim", vec![], TypeDescriptor::string()))
        .with_method(method("strip", vec![], TypeDescriptor::string()))
        .with_method(method("toLowerCase", vec![], TypeDescriptor::string()))
        .with_method(method("toUpperCase", vec![], TypeDescriptor::string()))
        .with_method(method(
            "substring",
            vec![primitive(PrimitiveType::Int)],
            TypeDescriptor::string(),
        ))
        .with_method(method(
            "charAt",
            vec![primitive(PrimitiveType::Int)],
            primitive(PrimitiveType::Char),
        ))
}

fn class(fqn: &str, superclass: &str) -> ClassInfo {
    ClassInfo::new(fqn, ClassKind::Class).extends(superclass)
}

fn interface(fqn: &str) -> ClassInfo {
    ClassInfo::new(fqn, ClassKind::Interface)
}

fn boxed(primitive_type: PrimitiveType, superclass: &str) -> Option<ClassInfo> {
    let fqn = primitive_type.boxed()?;
    Some(
        class(fqn, superclass)
            .implements(SERIALIZABLE)
            .implements(COMPARABLE)
            .with_method(method(
                &format!("{}Value", primitive_type.keyword()),
                vec![],
                primitive(primitive_type),
            )),
    )
}

/// Returns the built-in JDK class models.
pub(super) fn classes() -> Vec<ClassInfo> {
    let mut classes = vec![
        object(),
        string(),
        interface(SERIALIZABLE),
        interface(COMPARABLE),
        interface(CHAR_SEQUENCE),
        interface("java.lang.Cloneable"),
        interface("java.lang.Iterable"),
        interface("java.lang.AutoCloseable"),
        interface("java.lang.Runnable"),
        interface("java.io.Closeable").implements("java.lang.AutoCloseable"),
        class("java.lang.Class", OBJECT).implements(SERIALIZABLE),
        class("java.lang.Enum", OBJECT).implements(SERIALIZABLE).implements(COMPARABLE),
        class("java.lang.Record", OBJECT),
        class("java.lang.Throwable", OBJECT).implements(SERIALIZABLE),
        class("java.lang.Exception", "java.lang.Throwable"),
        class("java.lang.Error", "java.lang.Throwable"),
        class("java.lang.RuntimeException", "java.lang.Exception"),
        class("java.lang.IllegalArgumentException", "java.lang.RuntimeException"),
        class("java.lang.IllegalStateException", "java.lang.RuntimeException"),
        class("java.lang.NullPointerException", "java.lang.RuntimeException"),
        class("java.lang.UnsupportedOperationException", "java.lang.RuntimeException"),
        class("java.lang.InterruptedException", "java.lang.Exception"),
        class("java.io.IOException", "java.lang.Exception"),
        class("java.io.FileNotFoundException", "java.io.IOException"),
        class("java.io.UncheckedIOException", "java.lang.RuntimeException"),
        class("java.sql.SQLException", "java.lang.Exception"),
        class("java.lang.Number", OBJECT).implements(SERIALIZABLE),
        interface("java.util.Collection").implements("java.lang.Iterable"),
        interface("java.util.List").implements("java.util.Collection"),
        interface("java.util.Set").implements("java.util.Collection"),
        interface("java.util.Map"),
        class("java.util.ArrayList", OBJECT)
            .implements("java.util.List")
            .implements(SERIALIZABLE)
            .implements("java.lang.Cloneable"),
        class("java.util.HashMap", OBJECT)
            .implements("java.util.Map")
            .implements(SERIALIZABLE)
            .implements("java.lang.Cloneable"),
        class("java.util.HashSet", OBJECT)
            .implements("java.util.Set")
            .implements(SERIALIZABLE)
            .implements("java.lang.Cloneable"),
    ];
    classes.extend(
        [
            (PrimitiveType::Byte, "java.lang.Number"),
            (PrimitiveType::Short, "java.lang.Number"),
            (PrimitiveType::Int, "java.lang.Number"),
            (PrimitiveType::Long, "java.lang.Number"),
            (PrimitiveType::Float, "java.lang.Number"),
            (PrimitiveType::Double, "java.lang.Number"),
            (PrimitiveType::Boolean, OBJECT),
            (PrimitiveType::Char, OBJECT),
        ]
        .into_iter()
        .filter_map(|(primitive_type, superclass)| boxed(primitive_type, superclass)),
    );
    classes
}
