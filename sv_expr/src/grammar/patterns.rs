//! Compiled lexical patterns for literals, operators and identifiers
//!
//! Patterns are compiled once per process and shared read-only by every
//! tokenizer and helper call.
use super::operators::Operator;
use regex::Regex;
use std::sync::OnceLock;

// ============================================================================
// PATTERN SOURCES
// ============================================================================

/// Real number: optional sign, digits, decimal point, digits
pub const REAL_NUMBER: &str = r"[+-]?[0-9][0-9_]*\.[0-9][0-9_]*";

/// Optional `size'` prefix with optional signedness flag
const SIZE_PREFIX: &str = r"(?:[1-9][0-9_]*)?'[sS]?";

/// Sized/based integer, first match wins: hex, octal, binary, then decimal.
///
/// Digit limits keep every literal inside the signed 64-bit range of its
/// base: 15 hex digits, 20 octal digits, 62 binary digits, 18 decimal digits.
/// Longer digit runs are not literals at all.
pub fn integral_number() -> String {
    format!(
        "[+-]?(?:{p}[hH][0-9a-fA-F]_*(?:[0-9a-fA-F]_*){{0,14}}\
         |{p}[oO][0-7]_*(?:[0-7]_*){{0,19}}\
         |{p}[bB][01]_*(?:[01]_*){{0,61}}\
         |(?:{p}[dD]?)?[0-9]_*(?:[0-9]_*){{0,17}})",
        p = SIZE_PREFIX
    )
}

/// `true` / `false` in any letter case
pub const BOOLEAN_VALUE: &str = r"(?i:true|false)\b";

/// Double-quoted text without nested quotes
pub const STRING_LITERAL: &str = r#""[^"]*""#;

/// Identifier shape accepted for symbol references
pub const IDENTIFIER: &str = r"[A-Za-z_][A-Za-z0-9_]*";

/// Alternation of every spelled operator, longest spelling first
pub fn any_operator() -> String {
    Operator::SPELLED
        .iter()
        .map(|op| regex::escape(op.as_str()))
        .collect::<Vec<_>>()
        .join("|")
}

// ============================================================================
// COMPILED PATTERN SET
// ============================================================================

/// Immutable compiled grammar shared by the tokenizer and numeric helpers
#[derive(Debug)]
pub struct GrammarPatterns {
    /// Any literal (real, integral, boolean, string) at the start of the input
    pub leading_literal: Regex,
    /// Any operator at the start of the input
    pub leading_operator: Regex,
    /// Whole text is a numeric literal, surrounding whitespace allowed
    pub numeric_literal: Regex,
    /// Whole text is a quoted string literal
    pub string_literal: Regex,
    /// Whole text is a boolean literal
    pub boolean_literal: Regex,
    /// Whole text is an identifier
    pub identifier: Regex,
    /// `size'[s]base` prefix of a based literal, capturing the base letter
    pub base_prefix: Regex,
}

static PATTERNS: OnceLock<GrammarPatterns> = OnceLock::new();

/// Access the process-wide compiled grammar
pub fn patterns() -> &'static GrammarPatterns {
    PATTERNS.get_or_init(|| {
        GrammarPatterns::compile().expect("built-in grammar patterns must compile")
    })
}

impl GrammarPatterns {
    fn compile() -> Result<Self, regex::Error> {
        let integral = integral_number();

        Ok(Self {
            // A numeric literal must end at a word boundary so that one running
            // past its digit limit is not split into two operands
            leading_literal: Regex::new(&format!(
                r"^(?:(?:{}|{})\b|{}|{})",
                REAL_NUMBER, integral, BOOLEAN_VALUE, STRING_LITERAL
            ))?,
            leading_operator: Regex::new(&format!("^(?:{})", any_operator()))?,
            numeric_literal: Regex::new(&format!(r"^\s*(?:{}|{})\s*$", REAL_NUMBER, integral))?,
            string_literal: Regex::new(&format!("^{}$", STRING_LITERAL))?,
            boolean_literal: Regex::new(&format!("^{}$", BOOLEAN_VALUE))?,
            identifier: Regex::new(&format!("^{}$", IDENTIFIER))?,
            base_prefix: Regex::new(r"^(?:[1-9][0-9_]*)?'[sS]?([dDbBoOhH]?)")?,
        })
    }
}

// ============================================================================
// MATCHING HELPERS
// ============================================================================

/// Length in bytes of the literal starting `input`, if any
pub fn match_literal(input: &str) -> Option<usize> {
    patterns().leading_literal.find(input).map(|m| m.end())
}

/// Operator starting `input` with its length in bytes, if any
pub fn match_operator(input: &str) -> Option<(Operator, usize)> {
    let found = patterns().leading_operator.find(input)?;
    Operator::from_spelling(found.as_str()).map(|op| (op, found.end()))
}

pub fn is_numeric_literal(text: &str) -> bool {
    patterns().numeric_literal.is_match(text)
}

pub fn is_string_literal(text: &str) -> bool {
    patterns().string_literal.is_match(text)
}

pub fn is_boolean_literal(text: &str) -> bool {
    patterns().boolean_literal.is_match(text)
}

pub fn is_identifier(text: &str) -> bool {
    patterns().identifier.is_match(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leading_literal_lengths() {
        let cases = [
            ("10_000 + 1", Some(6)),
            ("-1.0*2", Some(4)),
            ("8'sd8 + 8'sd9", Some(5)),
            ("'h1_F)", Some(5)),
            ("3'o011", Some(6)),
            ("'2", Some(2)),
            ("TRUe", Some(4)),
            ("\"text\" == 1", Some(6)),
            ("$clog2(3)", None),
            ("ff", None),
            ("trueish", None),
        ];

        for (input, expected) in cases {
            assert_eq!(match_literal(input), expected, "input: {}", input);
        }
    }

    #[test]
    fn test_literal_digit_limits() {
        assert_eq!(match_literal("'hFFFFFFFFFFFFFFF"), Some(17));
        assert_eq!(match_literal("'hFFFFFFFFFFFFFFFF"), None);
        assert_eq!(match_literal("999999999999999999 + 1"), Some(18));
        assert_eq!(match_literal("1234567890123456789"), None);
        assert_eq!(match_literal("99999999999999999999 + 1"), None);
        let bits = format!("'b{}", "1".repeat(62));
        assert_eq!(match_literal(&bits), Some(64));
        let bits = format!("'b{}", "1".repeat(65));
        assert_eq!(match_literal(&bits), None);
    }

    #[test]
    fn test_literal_must_end_at_word_boundary() {
        assert_eq!(match_literal("12abc"), None);
        assert_eq!(match_literal("8'hFF+1"), Some(5));
        assert_eq!(match_literal("1.5)"), Some(3));
        assert_eq!(match_literal("\"a\"b"), Some(3));
    }

    #[test]
    fn test_operator_prefers_longest_spelling() {
        let cases = [
            ("**2", Operator::Power, 2),
            ("*2", Operator::Multiply, 1),
            ("===1", Operator::CaseEqual, 3),
            ("==1", Operator::Equal, 2),
            ("!==1", Operator::CaseNotEqual, 3),
            ("<<2", Operator::ShiftLeft, 2),
            ("<=2", Operator::LessEqual, 2),
            ("&&1", Operator::LogicalAnd, 2),
            ("$clog2(8)", Operator::Clog2, 6),
            ("$pow(2,3)", Operator::Pow, 4),
            ("?1:2", Operator::Question, 1),
        ];

        for (input, op, len) in cases {
            assert_eq!(match_operator(input), Some((op, len)), "input: {}", input);
        }
        assert_eq!(match_operator("!1"), None);
        assert_eq!(match_operator("(1)"), None);
    }

    #[test]
    fn test_whole_text_classification() {
        assert!(is_numeric_literal("  1  "));
        assert!(is_numeric_literal("-999999999999999999"));
        assert!(is_numeric_literal("8'hFF"));
        assert!(!is_numeric_literal("(8 + 2)"));
        assert!(!is_numeric_literal("\"text\""));
        assert!(is_string_literal("\"text\""));
        assert!(!is_string_literal("\"text"));
        assert!(is_boolean_literal("False"));
        assert!(is_identifier("param_1"));
        assert!(!is_identifier("1param"));
    }
}
