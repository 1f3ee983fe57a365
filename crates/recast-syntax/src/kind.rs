//! The closed set of Java productions the engine reasons about.
//!
//! Tree-sitter exposes node kinds as strings. The engine maps the productions
//! its predicates and rules care about onto [`SyntaxKind`] variants so that
//! matching on a kind is checked at compile time; every other production is
//! carried verbatim in [`SyntaxKind::Other`].

use std::fmt;

macro_rules! syntax_kinds {
    ($($(#[$meta:meta])* $variant:ident => $grammar:literal,)+) => {
        /// Discriminated kind of a syntax node.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[non_exhaustive]
        pub enum SyntaxKind {
            $($(#[$meta])* $variant,)+
            /// Any other grammar production, identified by its grammar name.
            Other(&'static str),
        }

        impl SyntaxKind {
            /// Maps a Tree-sitter grammar name onto a kind.
            #[must_use]
            pub fn from_grammar(name: &'static str) -> Self {
                match name {
                    $($grammar => Self::$variant,)+
                    other => Self::Other(other),
                }
            }

            /// Returns the Tree-sitter grammar name of this kind.
            #[must_use]
            pub const fn grammar_name(self) -> &'static str {
                match self {
                    $(Self::$variant => $grammar,)+
                    Self::Other(name) => name,
                }
            }
        }
    };
}

syntax_kinds! {
    /// A whole compilation unit.
    Program => "program",
    /// `package a.b;`
    PackageDeclaration => "package_declaration",
    /// `import a.b.C;`
    ImportDeclaration => "import_declaration",
    /// A class declaration.
    ClassDeclaration => "class_declaration",
    /// An interface declaration.
    InterfaceDeclaration => "interface_declaration",
    /// An enum declaration.
    EnumDeclaration => "enum_declaration",
    /// A record declaration.
    RecordDeclaration => "record_declaration",
    /// An `@interface` declaration.
    AnnotationTypeDeclaration => "annotation_type_declaration",
    /// The braced body of a class.
    ClassBody => "class_body",
    /// The braced body of an interface.
    InterfaceBody => "interface_body",
    /// The braced body of an enum.
    EnumBody => "enum_body",
    /// Modifier keywords and annotations.
    Modifiers => "modifiers",
    /// `extends Base` on a class.
    Superclass => "superclass",
    /// `implements A, B` on a class.
    SuperInterfaces => "super_interfaces",
    /// `extends A, B` on an interface.
    ExtendsInterfaces => "extends_interfaces",
    /// A comma separated list of types.
    TypeList => "type_list",
    /// `<T, U>` on a declaration.
    TypeParameters => "type_parameters",
    /// A single type parameter.
    TypeParameter => "type_parameter",
    /// A field declaration.
    FieldDeclaration => "field_declaration",
    /// A method declaration.
    MethodDeclaration => "method_declaration",
    /// A constructor declaration.
    ConstructorDeclaration => "constructor_declaration",
    /// The body of a constructor.
    ConstructorBody => "constructor_body",
    /// A parenthesised parameter list.
    FormalParameters => "formal_parameters",
    /// A single method parameter.
    FormalParameter => "formal_parameter",
    /// `name = value` inside a declaration.
    VariableDeclarator => "variable_declarator",
    /// A local variable declaration statement.
    LocalVariableDeclaration => "local_variable_declaration",
    /// A braced block of statements.
    Block => "block",
    /// An expression followed by `;`.
    ExpressionStatement => "expression_statement",
    /// `return expr;`
    ReturnStatement => "return_statement",
    /// `throw expr;`
    ThrowStatement => "throw_statement",
    /// `if (cond) ...`
    IfStatement => "if_statement",
    /// `try { } catch { }`
    TryStatement => "try_statement",
    /// `try (resources) { }`
    TryWithResourcesStatement => "try_with_resources_statement",
    /// A catch clause of a try statement.
    CatchClause => "catch_clause",
    /// The parameter of a catch clause.
    CatchFormalParameter => "catch_formal_parameter",
    /// The (possibly union) type of a catch parameter.
    CatchType => "catch_type",
    /// `finally { }`
    FinallyClause => "finally_clause",
    /// A `switch` statement or expression.
    SwitchExpression => "switch_expression",
    /// The braced body of a switch.
    SwitchBlock => "switch_block",
    /// Labels and statements of a colon-style switch.
    SwitchBlockStatementGroup => "switch_block_statement_group",
    /// `case x:` or `default:`
    SwitchLabel => "switch_label",
    /// `case x -> ...`
    SwitchRule => "switch_rule",
    /// `break;`
    BreakStatement => "break_statement",
    /// `continue;`
    ContinueStatement => "continue_statement",
    /// `yield expr;`
    YieldStatement => "yield_statement",
    /// `while (cond) ...`
    WhileStatement => "while_statement",
    /// `do ... while (cond);`
    DoStatement => "do_statement",
    /// `for (init; cond; update) ...`
    ForStatement => "for_statement",
    /// `for (T x : xs) ...`
    EnhancedForStatement => "enhanced_for_statement",
    /// `label: statement`
    LabeledStatement => "labeled_statement",
    /// `synchronized (lock) { }`
    SynchronizedStatement => "synchronized_statement",
    /// `a op b`
    BinaryExpression => "binary_expression",
    /// `op a`
    UnaryExpression => "unary_expression",
    /// `a = b`
    AssignmentExpression => "assignment_expression",
    /// `receiver.name(args)`
    MethodInvocation => "method_invocation",
    /// A parenthesised argument list.
    ArgumentList => "argument_list",
    /// `receiver.field`
    FieldAccess => "field_access",
    /// `new T(args)`
    ObjectCreationExpression => "object_creation_expression",
    /// `(expr)`
    ParenthesizedExpression => "parenthesized_expression",
    /// `(T) expr`
    CastExpression => "cast_expression",
    /// `cond ? a : b`
    TernaryExpression => "ternary_expression",
    /// `expr instanceof T`
    InstanceofExpression => "instanceof_expression",
    /// `array[index]`
    ArrayAccess => "array_access",
    /// `(params) -> body`
    LambdaExpression => "lambda_expression",
    /// A plain identifier.
    Identifier => "identifier",
    /// A dotted name such as `java.io`.
    ScopedIdentifier => "scoped_identifier",
    /// A simple type name.
    TypeIdentifier => "type_identifier",
    /// A qualified type name.
    ScopedTypeIdentifier => "scoped_type_identifier",
    /// A type with type arguments.
    GenericType => "generic_type",
    /// `<A, B>` on a type use.
    TypeArguments => "type_arguments",
    /// `T[]`
    ArrayType => "array_type",
    /// `[]` suffixes.
    Dimensions => "dimensions",
    /// `byte`, `short`, `int`, `long` or `char`.
    IntegralType => "integral_type",
    /// `float` or `double`.
    FloatingPointType => "floating_point_type",
    /// `boolean`
    BooleanType => "boolean_type",
    /// `void`
    VoidType => "void_type",
    /// `42`, `42L`
    DecimalIntegerLiteral => "decimal_integer_literal",
    /// `0x2A`
    HexIntegerLiteral => "hex_integer_literal",
    /// `052`
    OctalIntegerLiteral => "octal_integer_literal",
    /// `0b101010`
    BinaryIntegerLiteral => "binary_integer_literal",
    /// `4.2`, `4.2f`
    DecimalFloatingPointLiteral => "decimal_floating_point_literal",
    /// `0x1.8p1`
    HexFloatingPointLiteral => "hex_floating_point_literal",
    /// A string literal.
    StringLiteral => "string_literal",
    /// A text block.
    TextBlock => "text_block",
    /// A character literal.
    CharacterLiteral => "character_literal",
    /// `true`
    True => "true",
    /// `false`
    False => "false",
    /// `null`
    NullLiteral => "null_literal",
    /// `this`
    This => "this",
    /// An annotation with arguments.
    Annotation => "annotation",
    /// An annotation without arguments.
    MarkerAnnotation => "marker_annotation",
    /// A line comment.
    LineComment => "line_comment",
    /// A block comment.
    BlockComment => "block_comment",
}

impl SyntaxKind {
    /// Returns `true` for class-like declarations.
    #[must_use]
    pub const fn is_type_declaration(self) -> bool {
        matches!(
            self,
            Self::ClassDeclaration
                | Self::InterfaceDeclaration
                | Self::EnumDeclaration
                | Self::RecordDeclaration
                | Self::AnnotationTypeDeclaration
        )
    }

    /// Returns `true` for numeric literal kinds.
    #[must_use]
    pub const fn is_numeric_literal(self) -> bool {
        matches!(
            self,
            Self::DecimalIntegerLiteral
                | Self::HexIntegerLiteral
                | Self::OctalIntegerLiteral
                | Self::BinaryIntegerLiteral
                | Self::DecimalFloatingPointLiteral
                | Self::HexFloatingPointLiteral
        )
    }

    /// Returns `true` for kinds whose source text is kept as one token.
    #[must_use]
    pub const fn is_atomic(self) -> bool {
        matches!(
            self,
            Self::StringLiteral | Self::TextBlock | Self::CharacterLiteral
        )
    }

    /// Returns `true` for comment trivia.
    #[must_use]
    pub const fn is_comment(self) -> bool {
        matches!(self, Self::LineComment | Self::BlockComment)
    }
}

impl fmt::Display for SyntaxKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.grammar_name())
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("class_declaration", SyntaxKind::ClassDeclaration)]
    #[case("binary_expression", SyntaxKind::BinaryExpression)]
    #[case("switch_block_statement_group", SyntaxKind::SwitchBlockStatementGroup)]
    #[case("string_literal", SyntaxKind::StringLiteral)]
    fn maps_known_grammar_names(#[case] name: &'static str, #[case] expected: SyntaxKind) {
        assert_eq!(SyntaxKind::from_grammar(name), expected);
        assert_eq!(expected.grammar_name(), name);
    }

    #[test]
    fn unknown_names_are_preserved() {
        let kind = SyntaxKind::from_grammar("module_declaration");
        assert_eq!(kind, SyntaxKind::Other("module_declaration"));
        assert_eq!(kind.to_string(), "module_declaration");
    }

    #[test]
    fn classifies_literals_and_declarations() {
        assert!(SyntaxKind::OctalIntegerLiteral.is_numeric_literal());
        assert!(!SyntaxKind::StringLiteral.is_numeric_literal());
        assert!(SyntaxKind::StringLiteral.is_atomic());
        assert!(SyntaxKind::RecordDeclaration.is_type_declaration());
        assert!(!SyntaxKind::ClassBody.is_type_declaration());
    }
}
