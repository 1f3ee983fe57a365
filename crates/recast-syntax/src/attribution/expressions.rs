//! Static typing rules for literals and operators.

use crate::kind::SyntaxKind;
use crate::tree::Node;
use crate::types::{PrimitiveType, STRING, TypeDescriptor};

fn primitive(primitive: PrimitiveType) -> TypeDescriptor {
    TypeDescriptor::Primitive(primitive)
}

/// Types a literal node from its kind and lexeme.
pub(super) fn literal(node: &Node) -> Option<TypeDescriptor> {
    let text = node.token_text().unwrap_or_default();
    let ty = match node.kind() {
        SyntaxKind::DecimalIntegerLiteral
        | SyntaxKind::HexIntegerLiteral
        | SyntaxKind::OctalIntegerLiteral
        | SyntaxKind::BinaryIntegerLiteral => {
            if text.ends_with(['l', 'L']) {
                primitive(PrimitiveType::Long)
            } else {
                primitive(PrimitiveType::Int)
            }
        }
        SyntaxKind::DecimalFloatingPointLiteral | SyntaxKind::HexFloatingPointLiteral => {
            if text.ends_with(['f', 'F']) {
                primitive(PrimitiveType::Float)
            } else {
                primitive(PrimitiveType::Double)
            }
        }
        SyntaxKind::StringLiteral | SyntaxKind::TextBlock => TypeDescriptor::string(),
        SyntaxKind::CharacterLiteral => primitive(PrimitiveType::Char),
        SyntaxKind::True | SyntaxKind::False => primitive(PrimitiveType::Boolean),
        SyntaxKind::NullLiteral => TypeDescriptor::Null,
        _ => return None,
    };
    Some(ty)
}

fn numeric(ty: &TypeDescriptor) -> Option<PrimitiveType> {
    ty.as_primitive()
        .or_else(|| ty.boxed_primitive())
        .filter(|primitive| primitive.is_numeric())
}

fn is_boolean(ty: &TypeDescriptor) -> bool {
    matches!(numeric_or_boolean(ty), Some(PrimitiveType::Boolean))
}

fn numeric_or_boolean(ty: &TypeDescriptor) -> Option<PrimitiveType> {
    ty.as_primitive().or_else(|| ty.boxed_primitive())
}

/// Unary numeric promotion: narrow integral types widen to `int`.
fn promote(primitive: PrimitiveType) -> PrimitiveType {
    match primitive {
        PrimitiveType::Byte | PrimitiveType::Short | PrimitiveType::Char => PrimitiveType::Int,
        other => other,
    }
}

/// Binary numeric promotion.
fn widen(left: PrimitiveType, right: PrimitiveType) -> PrimitiveType {
    let rank = |primitive: PrimitiveType| match primitive {
        PrimitiveType::Double => 3,
        PrimitiveType::Float => 2,
        PrimitiveType::Long => 1,
        _ => 0,
    };
    if rank(left) >= rank(right) {
        promote(left)
    } else {
        promote(right)
    }
}

/// Types a binary expression from its operator and operand types.
pub(super) fn binary(
    operator: &str,
    left: Option<&TypeDescriptor>,
    right: Option<&TypeDescriptor>,
) -> Option<TypeDescriptor> {
    match operator {
        "==" | "!=" | "<" | ">" | "<=" | ">=" | "&&" | "||" => {
            Some(primitive(PrimitiveType::Boolean))
        }
        "+" if left.is_some_and(|ty| ty.is_class(STRING))
            || right.is_some_and(|ty| ty.is_class(STRING)) =>
        {
            Some(TypeDescriptor::string())
        }
        "<<" | ">>" | ">>>" => left.and_then(numeric).map(promote).map(primitive),
        "&" | "|" | "^" if left.is_some_and(is_boolean) && right.is_some_and(is_boolean) => {
            Some(primitive(PrimitiveType::Boolean))
        }
        "+" | "-" | "*" | "/" | "%" | "&" | "|" | "^" => {
            let (Some(left), Some(right)) = (left.and_then(numeric), right.and_then(numeric)) else {
                return None;
            };
            Some(primitive(widen(left, right)))
        }
        _ => None,
    }
}

/// Types a unary expression from its operator and operand type.
pub(super) fn unary(operator: &str, operand: Option<&TypeDescriptor>) -> Option<TypeDescriptor> {
    match operator {
        "!" => Some(primitive(PrimitiveType::Boolean)),
        "+" | "-" | "~" => operand.and_then(numeric).map(promote).map(primitive),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn int() -> TypeDescriptor {
        primitive(PrimitiveType::Int)
    }

    #[rstest]
    #[case::string_concat("+", TypeDescriptor::string(), int(), Some(TypeDescriptor::string()))]
    #[case::int_sum("+", int(), int(), Some(int()))]
    #[case::long_wins("*", int(), primitive(PrimitiveType::Long), Some(primitive(PrimitiveType::Long)))]
    #[case::unboxes("-", TypeDescriptor::class("java.lang.Double"), int(), Some(primitive(PrimitiveType::Double)))]
    #[case::char_promotes("+", primitive(PrimitiveType::Char), primitive(PrimitiveType::Char), Some(int()))]
    #[case::comparison("<", int(), int(), Some(primitive(PrimitiveType::Boolean)))]
    #[case::logical_and("&", primitive(PrimitiveType::Boolean), primitive(PrimitiveType::Boolean), Some(primitive(PrimitiveType::Boolean)))]
    #[case::not_numeric("-", TypeDescriptor::class("java.util.List"), int(), None)]
    fn types_binary_operators(
        #[case] operator: &str,
        #[case] left: TypeDescriptor,
        #[case] right: TypeDescriptor,
        #[case] expected: Option<TypeDescriptor>,
    ) {
        assert_eq!(binary(operator, Some(&left), Some(&right)), expected);
    }

    #[test]
    fn unknown_operand_leaves_arithmetic_untyped() {
        assert_eq!(binary("+", None, Some(&int())), None);
        assert_eq!(binary("==", None, None), Some(primitive(PrimitiveType::Boolean)));
    }

    #[rstest]
    #[case::negate("-", primitive(PrimitiveType::Byte), Some(int()))]
    #[case::not("!", primitive(PrimitiveType::Boolean), Some(primitive(PrimitiveType::Boolean)))]
    fn types_unary_operators(
        #[case] operator: &str,
        #[case] operand: TypeDescriptor,
        #[case] expected: Option<TypeDescriptor>,
    ) {
        assert_eq!(unary(operator, Some(&operand)), expected);
    }
}
