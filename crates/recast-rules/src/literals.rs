//! Numeric literal clean-ups.
//!
//! Both rules replace a literal leaf with another leaf; the literal keeps
//! its leading space and its position.

use std::sync::Arc;

use recast::{MatchResult, Predicate, RewriteContext, Rule, RuleDescriptor, RuleError, RuleOptions};
use recast_syntax::{Node, SyntaxKind, Token};
use tracing::debug;

const LITERALS_TARGET: &str = "recast::rules::literals";

const INT_MAX: u64 = 0x7fff_ffff;
const LONG_MAX: u64 = 0x7fff_ffff_ffff_ffff;

/// Stable name of [`UpperCaseLiteralSuffixes`].
pub const UPPER_CASE_SUFFIXES: &str = "upper-case-literal-suffixes";

/// Stable name of [`OctalToDecimal`].
pub const OCTAL_TO_DECIMAL: &str = "octal-literal-to-decimal";

const INTEGER_KINDS: [SyntaxKind; 4] = [
    SyntaxKind::DecimalIntegerLiteral,
    SyntaxKind::HexIntegerLiteral,
    SyntaxKind::OctalIntegerLiteral,
    SyntaxKind::BinaryIntegerLiteral,
];

const FLOATING_KINDS: [SyntaxKind; 2] = [
    SyntaxKind::DecimalFloatingPointLiteral,
    SyntaxKind::HexFloatingPointLiteral,
];

fn replace_text(node: &Node, kind: SyntaxKind, text: String) -> Arc<Node> {
    Arc::new(Node::leaf(kind, Token::new(node.prefix(), text)))
}

/// Writes `1l` as `1L`, `1.0f` as `1.0F` and `2d` as `2D`.
///
/// A lower-case `l` is easily misread as the digit one.
#[derive(Debug, Clone)]
pub struct UpperCaseLiteralSuffixes {
    predicate: Predicate,
}

impl UpperCaseLiteralSuffixes {
    /// Creates the rule.
    #[must_use]
    pub fn new() -> Self {
        let integers =
            Predicate::kinds(INTEGER_KINDS).and(Predicate::text_with(|text| text.ends_with('l')));
        let floats = Predicate::kinds(FLOATING_KINDS)
            .and(Predicate::text_with(|text| text.ends_with(['f', 'd'])));
        Self {
            predicate: integers.or(floats),
        }
    }
}

impl Default for UpperCaseLiteralSuffixes {
    fn default() -> Self {
        Self::new()
    }
}

impl Rule for UpperCaseLiteralSuffixes {
    fn name(&self) -> &str {
        UPPER_CASE_SUFFIXES
    }

    fn predicate(&self) -> &Predicate {
        &self.predicate
    }

    fn rewrite(
        &self,
        found: &MatchResult,
        _cx: &RewriteContext<'_>,
    ) -> Result<Option<Arc<Node>>, RuleError> {
        let node = found.node();
        let text = node.text();
        let mut chars = text.chars();
        let Some(suffix) = chars.next_back() else {
            return Ok(None);
        };
        let upper = format!("{}{}", chars.as_str(), suffix.to_ascii_uppercase());
        Ok(Some(replace_text(node, node.kind(), upper)))
    }
}

/// Writes octal literals such as `010` in decimal.
///
/// The `l`/`L` suffix is kept as written. Octal literals whose value is
/// negative in their type, such as `037777777777`, have no positive decimal
/// spelling and are left alone.
#[derive(Debug, Clone)]
pub struct OctalToDecimal {
    predicate: Predicate,
}

impl OctalToDecimal {
    /// Creates the rule.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            predicate: Predicate::kind(SyntaxKind::OctalIntegerLiteral),
        }
    }
}

impl Default for OctalToDecimal {
    fn default() -> Self {
        Self::new()
    }
}

/// Converts octal source text to decimal, or `None` when it does not fit.
fn octal_to_decimal(text: &str) -> Option<String> {
    let suffix = text.chars().last().filter(|last| matches!(last, 'l' | 'L'));
    let digits: String = text
        .chars()
        .filter(|ch| ch.is_digit(8))
        .collect();
    let value = u64::from_str_radix(&digits, 8).ok()?;
    let limit = if suffix.is_some() { LONG_MAX } else { INT_MAX };
    (value <= limit).then(|| suffix.map_or_else(|| value.to_string(), |s| format!("{value}{s}")))
}

impl Rule for OctalToDecimal {
    fn name(&self) -> &str {
        OCTAL_TO_DECIMAL
    }

    fn predicate(&self) -> &Predicate {
        &self.predicate
    }

    fn rewrite(
        &self,
        found: &MatchResult,
        _cx: &RewriteContext<'_>,
    ) -> Result<Option<Arc<Node>>, RuleError> {
        let node = found.node();
        let text = node.text();
        let Some(decimal) = octal_to_decimal(&text) else {
            debug!(target: LITERALS_TARGET, literal = %text, "octal literal has no positive decimal form");
            return Ok(None);
        };
        Ok(Some(replace_text(node, SyntaxKind::DecimalIntegerLiteral, decimal)))
    }
}

fn build_upper_case(_options: &RuleOptions) -> Result<Box<dyn Rule>, Vec<String>> {
    Ok(Box::new(UpperCaseLiteralSuffixes::new()))
}

fn build_octal(_options: &RuleOptions) -> Result<Box<dyn Rule>, Vec<String>> {
    Ok(Box::new(OctalToDecimal::new()))
}

pub(crate) const UPPER_CASE_DESCRIPTOR: RuleDescriptor = RuleDescriptor::new(
    UPPER_CASE_SUFFIXES,
    "Writes numeric literal suffixes in upper case.",
    &[],
    build_upper_case,
);

pub(crate) const OCTAL_DESCRIPTOR: RuleDescriptor = RuleDescriptor::new(
    OCTAL_TO_DECIMAL,
    "Writes octal integer literals in decimal.",
    &[],
    build_octal,
);
