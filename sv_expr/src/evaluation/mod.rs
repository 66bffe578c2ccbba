//! Postfix evaluation
//!
//! Reduces a [`PostfixSequence`] to a single value string with an explicit
//! value stack. Failures are [`EvalError`]s internally and collapse into the
//! `("x", false)` pair at the public boundary.

pub mod evaluator;
pub mod operations;

use crate::lexical::ConversionError;
use crate::logging::codes;
use crate::symbols::SymbolResolver;
use crate::tokens::{PostfixSequence, SENTINEL};
use serde::Serialize;

pub use evaluator::{EvaluationMetrics, Evaluator};

/// Why an expression has no valid value
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EvalError {
    #[error(transparent)]
    Conversion(#[from] ConversionError),

    /// The sequence is the placeholder left by a failed conversion
    #[error("Expression could not be converted to postfix")]
    Unconvertible,

    // Structural
    #[error("Operator '{operator}' is missing an operand")]
    MissingOperand { operator: String },

    #[error("Conditional operator '?' without matching ':' (balance {balance})")]
    UnbalancedTernary { balance: i64 },

    #[error("Array open and close markers do not pair up")]
    UnterminatedArray,

    // Operands
    #[error("Invalid constant '{text}'")]
    InvalidConstant { text: String },

    #[error("Operator '{operator}' requires numeric operands, found '{operand}'")]
    NonNumericOperand { operator: String, operand: String },

    #[error("Operator '{operator}' requires integer operands, found '{operand}'")]
    NonIntegerOperand { operator: String, operand: String },

    #[error("Operator '{operator}' is not defined for string operands")]
    UnsupportedStringOperation { operator: String },

    #[error("Symbol '{symbol}' resolved to an invalid value")]
    InvalidSymbolValue { symbol: String },

    // Arithmetic
    #[error("Division by zero in '{operator}'")]
    DivisionByZero { operator: String },

    #[error("Operand '{operand}' is outside the domain of '{operator}'")]
    DomainError { operator: String, operand: String },

    #[error("Result of '{operator}' overflows")]
    ArithmeticOverflow { operator: String },

    #[error("Operator '{operator}' cannot be applied here")]
    UnsupportedOperator { operator: String },
}

impl EvalError {
    pub fn error_code(&self) -> crate::logging::Code {
        match self {
            EvalError::Conversion(error) => error.error_code(),
            EvalError::Unconvertible => codes::conversion::UNCONVERTIBLE_EXPRESSION,
            EvalError::MissingOperand { .. } => codes::evaluation::MISSING_OPERAND,
            EvalError::UnbalancedTernary { .. } => codes::evaluation::UNBALANCED_TERNARY,
            EvalError::UnterminatedArray => codes::evaluation::UNTERMINATED_ARRAY,
            EvalError::InvalidConstant { .. } => codes::evaluation::INVALID_CONSTANT,
            EvalError::NonNumericOperand { .. } => codes::evaluation::NON_NUMERIC_OPERAND,
            EvalError::NonIntegerOperand { .. } => codes::evaluation::NON_INTEGER_OPERAND,
            EvalError::UnsupportedStringOperation { .. } => {
                codes::evaluation::UNSUPPORTED_STRING_OPERATION
            }
            EvalError::InvalidSymbolValue { .. } => codes::symbols::INVALID_SYMBOL_VALUE,
            EvalError::DivisionByZero { .. } => codes::evaluation::DIVISION_BY_ZERO,
            EvalError::DomainError { .. } => codes::evaluation::DOMAIN_ERROR,
            EvalError::ArithmeticOverflow { .. } => codes::evaluation::ARITHMETIC_OVERFLOW,
            EvalError::UnsupportedOperator { .. } => codes::system::INTERNAL_ERROR,
        }
    }
}

/// Outward result: value text plus validity flag
///
/// An invalid result always carries the sentinel `"x"`. A valid result whose
/// text is literally `"x"` cannot occur with the built-in grammar, but a
/// resolver that returns such text would make the two indistinguishable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Evaluation {
    pub value: String,
    pub is_valid: bool,
}

impl Evaluation {
    pub fn valid(value: String) -> Self {
        Self {
            value,
            is_valid: true,
        }
    }

    pub fn invalid() -> Self {
        Self {
            value: SENTINEL.to_string(),
            is_valid: false,
        }
    }
}

impl From<Result<String, EvalError>> for Evaluation {
    fn from(result: Result<String, EvalError>) -> Self {
        match result {
            Ok(value) => Self::valid(value),
            Err(_) => Self::invalid(),
        }
    }
}

/// True if any element of a (possibly array) value is the sentinel
pub fn contains_sentinel(value: &str) -> bool {
    value
        .split(['{', '}', ','])
        .any(|part| part.trim() == SENTINEL)
}

/// Evaluate a postfix sequence against a resolver
pub fn evaluate<R>(postfix: &PostfixSequence, resolver: &R) -> Evaluation
where
    R: SymbolResolver + ?Sized,
{
    Evaluator::new(resolver).evaluate(postfix).into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexical::to_postfix;
    use crate::symbols::NoSymbols;

    #[test]
    fn test_contains_sentinel() {
        assert!(contains_sentinel("x"));
        assert!(contains_sentinel("{1, x}"));
        assert!(contains_sentinel("{{x},2}"));
        assert!(!contains_sentinel("\"x\""));
        assert!(!contains_sentinel("{1,2}"));
        assert!(!contains_sentinel(""));
    }

    #[test]
    fn test_evaluate_contract() {
        assert_eq!(
            evaluate(&to_postfix("2+3*4"), &NoSymbols),
            Evaluation::valid("14".to_string())
        );
        assert_eq!(evaluate(&to_postfix("1/0"), &NoSymbols), Evaluation::invalid());
        assert_eq!(evaluate(&to_postfix("(1+2"), &NoSymbols), Evaluation::invalid());
    }

    #[test]
    fn test_error_codes_route_to_categories() {
        let error = EvalError::DivisionByZero {
            operator: "/".to_string(),
        };
        assert_eq!(error.error_code().as_str(), "E030");

        let error = EvalError::from(ConversionError::StraySeparator { offset: 0 });
        assert_eq!(error.error_code(), codes::conversion::STRAY_SEPARATOR);

        let error = EvalError::InvalidSymbolValue {
            symbol: "width".to_string(),
        };
        assert_eq!(crate::logging::codes::get_category(error.error_code().as_str()), "Symbols");
    }

    #[test]
    fn test_evaluation_serializes() {
        let json = serde_json::to_string(&Evaluation::valid("16".to_string())).unwrap();
        assert_eq!(json, r#"{"value":"16","is_valid":true}"#);
    }
}
