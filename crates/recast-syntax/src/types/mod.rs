//! Resolved type metadata attached to declarations and expressions.
//!
//! A [`TypeDescriptor`] describes the static type an attribution pass
//! resolved for a node. Descriptors are immutable once attached and are
//! shared between tree snapshots by reference. Subtype and member questions
//! are answered by a [`TypeOracle`], which may not know every class; callers
//! must treat an unanswered question as unknown rather than false.

mod jdk;
mod oracle;

use std::fmt;

pub use oracle::{ClassInfo, ClassKind, LayeredOracle, MethodSignature, TypeOracle, TypeTable};

/// Fully qualified name of `java.lang.Object`.
pub const OBJECT: &str = "java.lang.Object";
/// Fully qualified name of `java.lang.String`.
pub const STRING: &str = "java.lang.String";

/// A Java primitive type, including `void` for method returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PrimitiveType {
    /// `boolean`
    Boolean,
    /// `byte`
    Byte,
    /// `short`
    Short,
    /// `char`
    Char,
    /// `int`
    Int,
    /// `long`
    Long,
    /// `float`
    Float,
    /// `double`
    Double,
    /// `void`
    Void,
}

impl PrimitiveType {
    /// Parses a primitive keyword.
    #[must_use]
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        Some(match keyword {
            "boolean" => Self::Boolean,
            "byte" => Self::Byte,
            "short" => Self::Short,
            "char" => Self::Char,
            "int" => Self::Int,
            "long" => Self::Long,
            "float" => Self::Float,
            "double" => Self::Double,
            "void" => Self::Void,
            _ => return None,
        })
    }

    /// Returns the Java keyword for this primitive.
    #[must_use]
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::Boolean => "boolean",
            Self::Byte => "byte",
            Self::Short => "short",
            Self::Char => "char",
            Self::Int => "int",
            Self::Long => "long",
            Self::Float => "float",
            Self::Double => "double",
            Self::Void => "void",
        }
    }

    /// Returns the wrapper class for this primitive, if it has one.
    #[must_use]
    pub const fn boxed(self) -> Option<&'static str> {
        match self {
            Self::Boolean => Some("java.lang.Boolean"),
            Self::Byte => Some("java.lang.Byte"),
            Self::Short => Some("java.lang.Short"),
            Self::Char => Some("java.lang.Character"),
            Self::Int => Some("java.lang.Integer"),
            Self::Long => Some("java.lang.Long"),
            Self::Float => Some("java.lang.Float"),
            Self::Double => Some("java.lang.Double"),
            Self::Void => None,
        }
    }

    /// Returns the primitive boxed by the named wrapper class.
    #[must_use]
    pub fn unboxed(fqn: &str) -> Option<Self> {
        [
            Self::Boolean,
            Self::Byte,
            Self::Short,
            Self::Char,
            Self::Int,
            Self::Long,
            Self::Float,
            Self::Double,
        ]
        .into_iter()
        .find(|primitive| primitive.boxed() == Some(fqn))
    }

    /// Returns `true` for the numeric primitives, including `char`.
    #[must_use]
    pub const fn is_numeric(self) -> bool {
        !matches!(self, Self::Boolean | Self::Void)
    }
}

/// A resolved static type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeDescriptor {
    /// A primitive type.
    Primitive(PrimitiveType),
    /// A raw or non-generic class or interface type.
    Class {
        /// Fully qualified, dot separated name.
        fqn: String,
    },
    /// A class type with type arguments.
    Parameterized {
        /// Fully qualified name of the generic class.
        fqn: String,
        /// Resolved type arguments. Unresolvable arguments are omitted from
        /// the descriptor entirely by the attributor.
        arguments: Vec<TypeDescriptor>,
    },
    /// An array of the component type.
    Array(Box<TypeDescriptor>),
    /// A type variable declared by an enclosing class or method.
    TypeVariable {
        /// The declared name of the variable.
        name: String,
    },
    /// The type of the `null` literal.
    Null,
}

impl TypeDescriptor {
    /// Creates a class type.
    #[must_use]
    pub fn class(fqn: impl Into<String>) -> Self {
        Self::Class { fqn: fqn.into() }
    }

    /// Returns `java.lang.String`.
    #[must_use]
    pub fn string() -> Self {
        Self::class(STRING)
    }

    /// Returns the erased class name of a class or parameterized type.
    #[must_use]
    pub fn erasure(&self) -> Option<&str> {
        match self {
            Self::Class { fqn } | Self::Parameterized { fqn, .. } => Some(fqn),
            Self::Primitive(_) | Self::Array(_) | Self::TypeVariable { .. } | Self::Null => None,
        }
    }

    /// Returns the primitive, if this is a primitive type.
    #[must_use]
    pub const fn as_primitive(&self) -> Option<PrimitiveType> {
        match self {
            Self::Primitive(primitive) => Some(*primitive),
            _ => None,
        }
    }

    /// Returns `true` when the type is exactly the named class.
    #[must_use]
    pub fn is_class(&self, fqn: &str) -> bool {
        self.erasure() == Some(fqn)
    }

    /// Returns the primitive this type boxes, if it is a wrapper class.
    #[must_use]
    pub fn boxed_primitive(&self) -> Option<PrimitiveType> {
        self.erasure().and_then(PrimitiveType::unboxed)
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Primitive(primitive) => f.write_str(primitive.keyword()),
            Self::Class { fqn } => f.write_str(fqn),
            Self::Parameterized { fqn, arguments } => {
                write!(f, "{fqn}<")?;
                for (index, argument) in arguments.iter().enumerate() {
                    if index > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{argument}")?;
                }
                f.write_str(">")
            }
            Self::Array(component) => write!(f, "{component}[]"),
            Self::TypeVariable { name } => f.write_str(name),
            Self::Null => f.write_str("null"),
        }
    }
}
