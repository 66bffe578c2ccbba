//! Numeric helpers: literal classification, constant decoding, radix and
//! decimal-precision rules
//!
//! Evaluation values travel as strings so that precision survives every
//! step; [`Number`] is the short-lived numeric view an operator takes of one.
use crate::grammar::{self, patterns};

// ============================================================================
// LITERAL CLASSIFICATION AND DECODING
// ============================================================================

/// True when the whole text (surrounding whitespace allowed) is a real or
/// sized/based integer literal
pub fn is_literal(text: &str) -> bool {
    grammar::is_numeric_literal(text)
}

/// Decode a numeric literal into plain decimal text
///
/// Reals are returned unchanged apart from digit separators and a leading
/// `+`. Integers lose their `size'[s]base` prefix and are converted from
/// their base; the size is not applied, so `4'd10` decodes to `10`. Returns
/// `None` for anything that is not a literal in the signed 64-bit range.
pub fn parse_constant(token: &str) -> Option<String> {
    let token = token.trim();
    if !is_literal(token) {
        return None;
    }

    if token.contains('.') {
        let real: String = token
            .trim_start_matches('+')
            .chars()
            .filter(|c| *c != '_')
            .collect();
        return Some(real);
    }

    let (negative, body) = match token.as_bytes().first() {
        Some(b'-') => (true, &token[1..]),
        Some(b'+') => (false, &token[1..]),
        _ => (false, token),
    };

    let prefix_len = patterns()
        .base_prefix
        .find(body)
        .map(|m| m.end())
        .unwrap_or(0);
    let digits: String = body[prefix_len..].chars().filter(|c| *c != '_').collect();
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }

    let magnitude = i64::from_str_radix(&digits, base_of(body)).ok()?;
    let value = if negative {
        magnitude.checked_neg()?
    } else {
        magnitude
    };

    Some(value.to_string())
}

/// Radix declared by a literal's base letter; 10 when there is none
pub fn base_of(token: &str) -> u32 {
    let body = token.trim().trim_start_matches(['+', '-']);
    let letter = patterns()
        .base_prefix
        .captures(body)
        .and_then(|captures| captures.get(1))
        .map(|m| m.as_str())
        .unwrap_or("");

    match letter {
        "h" | "H" => 16,
        "o" | "O" => 8,
        "b" | "B" => 2,
        _ => 10,
    }
}

/// Digits after the decimal point; 0 for integers
pub fn precision_of(value: &str) -> usize {
    let mantissa = value.split(['e', 'E']).next().unwrap_or(value);
    mantissa
        .split_once('.')
        .map(|(_, fraction)| fraction.len())
        .unwrap_or(0)
}

// ============================================================================
// NUMERIC VIEW OF A VALUE STRING
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    Integer(i64),
    Real { value: f64, precision: usize },
}

impl Number {
    /// Interpret an evaluated value; `None` for strings, arrays and the sentinel
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        // Six-digit general format yields values like `1e+06`
        if text.contains(['.', 'e', 'E']) {
            let value: f64 = text.parse().ok()?;
            if !value.is_finite() {
                return None;
            }
            Some(Self::Real {
                value,
                precision: precision_of(text),
            })
        } else {
            text.parse::<i64>().ok().map(Self::Integer)
        }
    }

    pub fn as_f64(self) -> f64 {
        match self {
            Self::Integer(value) => value as f64,
            Self::Real { value, .. } => value,
        }
    }

    pub fn as_integer(self) -> Option<i64> {
        match self {
            Self::Integer(value) => Some(value),
            Self::Real { .. } => None,
        }
    }

    pub fn is_real(self) -> bool {
        matches!(self, Self::Real { .. })
    }

    pub fn precision(self) -> usize {
        match self {
            Self::Integer(_) => 0,
            Self::Real { precision, .. } => precision,
        }
    }

    /// Truth value after truncation toward zero
    pub fn is_truthy(self) -> bool {
        match self {
            Self::Integer(value) => value != 0,
            Self::Real { value, .. } => value.trunc() != 0.0,
        }
    }
}

// ============================================================================
// RENDERING
// ============================================================================

/// Fixed-point text with exactly `precision` decimals, never `-0`
pub fn format_real(value: f64, precision: usize) -> String {
    let rendered = format!("{:.*}", precision, value);
    match rendered.strip_prefix('-') {
        Some(magnitude) if magnitude.chars().all(|c| c == '0' || c == '.') => {
            magnitude.to_string()
        }
        _ => rendered,
    }
}

/// General format with six significant digits, trailing zeros removed;
/// scientific notation for decimal exponents below -4 or from 6 upward
pub fn format_general(value: f64) -> String {
    if value == 0.0 {
        return "0".to_string();
    }

    let scientific = format!("{:.5e}", value);
    let Some((mantissa, exponent)) = scientific.split_once('e') else {
        return value.to_string();
    };
    let exponent: i32 = exponent.parse().unwrap_or(0);

    if !(-4..6).contains(&exponent) {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!("{}e{}{:02}", trim_fraction(mantissa), sign, exponent.abs())
    } else {
        let decimals = usize::try_from(5 - exponent).unwrap_or(0);
        trim_fraction(&format!("{:.*}", decimals, value)).to_string()
    }
}

fn trim_fraction(text: &str) -> &str {
    if text.contains('.') {
        text.trim_end_matches('0').trim_end_matches('.')
    } else {
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_constant() {
        let cases = [
            ("+1", Some("1")),
            ("'sd2", Some("2")),
            ("1'd3", Some("3")),
            ("'2", Some("2")),
            ("10_000", Some("10000")),
            ("-1.0", Some("-1.0")),
            ("'h1_F", Some("31")),
            ("'b1_1", Some("3")),
            ("3'o011", Some("9")),
            ("4'd10", Some("10")),
            ("8'hFF", Some("255")),
            ("-'h10", Some("-16")),
            ("+2.5", Some("2.5")),
            ("ff", None),
            ("text", None),
            ("\"text\"", None),
            ("'hZZ", None),
            (".3", None),
        ];

        for (input, expected) in cases {
            assert_eq!(
                parse_constant(input).as_deref(),
                expected,
                "input: {}",
                input
            );
        }
    }

    #[test]
    fn test_parse_constant_range() {
        assert_eq!(
            parse_constant("-999999999999999999").as_deref(),
            Some("-999999999999999999")
        );
        assert_eq!(
            parse_constant("'h7FFFFFFFFFFFFFF").as_deref(),
            Some("576460752303423487")
        );
    }

    #[test]
    fn test_base_of() {
        assert_eq!(base_of("8'hFF"), 16);
        assert_eq!(base_of("'o17"), 8);
        assert_eq!(base_of("4'B1010"), 2);
        assert_eq!(base_of("'sd5"), 10);
        assert_eq!(base_of("'5"), 10);
        assert_eq!(base_of("10"), 10);
        assert_eq!(base_of("1.5"), 10);
        assert_eq!(base_of("-'h10"), 16);
    }

    #[test]
    fn test_precision_of() {
        assert_eq!(precision_of("1.0000"), 4);
        assert_eq!(precision_of("-0.5"), 1);
        assert_eq!(precision_of("42"), 0);
        assert_eq!(precision_of("1.2026e+06"), 4);
        assert_eq!(precision_of("1e+06"), 0);
        assert_eq!(precision_of("1.234e-05"), 3);
    }

    #[test]
    fn test_number_view() {
        assert_eq!(Number::parse("-3"), Some(Number::Integer(-3)));
        assert_eq!(
            Number::parse("2.50"),
            Some(Number::Real {
                value: 2.5,
                precision: 2
            })
        );
        assert_eq!(Number::parse("\"text\""), None);
        assert_eq!(Number::parse("{1,2}"), None);
        assert_eq!(Number::parse("x"), None);
        assert_eq!(
            Number::parse("1.2026e+06"),
            Some(Number::Real {
                value: 1_202_600.0,
                precision: 4
            })
        );
        assert_eq!(
            Number::parse("1e+06"),
            Some(Number::Real {
                value: 1_000_000.0,
                precision: 0
            })
        );
        assert_eq!(Number::parse("true"), None);
        assert!(Number::parse("0.7").map(Number::is_truthy) == Some(false));
        assert!(Number::parse("-2").map(Number::is_truthy) == Some(true));
    }

    #[test]
    fn test_format_real() {
        assert_eq!(format_real(0.0504, 3), "0.050");
        assert_eq!(format_real(200022000.2, 1), "200022000.2");
        assert_eq!(format_real(-0.0001, 2), "0.00");
        assert_eq!(format_real(-1.5, 2), "-1.50");
    }

    #[test]
    fn test_format_general() {
        let cases = [
            (1.0, "1"),
            (2.0, "2"),
            (std::f64::consts::E, "2.71828"),
            ((-2.0f64).exp(), "0.135335"),
            (0.0001, "0.0001"),
            (123456.0, "123456"),
            (1_000_000.0, "1e+06"),
            (0.00001234, "1.234e-05"),
            (-2.5, "-2.5"),
        ];

        for (value, expected) in cases {
            assert_eq!(format_general(value), expected, "value: {}", value);
        }
    }
}
