//! Tokenization and infix-to-postfix conversion
//!
//! Turns raw expression text into a [`PostfixSequence`]. Structural problems
//! never escape as panics: [`to_postfix`] returns the sentinel sequence and
//! [`convert`] reports the cause.

pub mod converter;

use crate::config::compile_time::expression::*;
use crate::tokens::PostfixSequence;

pub use converter::{ConversionError, ConversionMetrics, PostfixConverter};

// ============================================================================
// MODULE API
// ============================================================================

/// Convert to postfix, yielding the sentinel sequence on structural failure
pub fn to_postfix(expression: &str) -> PostfixSequence {
    PostfixConverter::new().to_postfix(expression)
}

/// Convert to postfix, reporting why conversion failed
pub fn convert(expression: &str) -> Result<PostfixSequence, ConversionError> {
    PostfixConverter::new().convert(expression)
}

// ============================================================================
// MODULE INITIALIZATION AND VALIDATION
// ============================================================================

/// Validate conversion error codes and limits (for system startup)
pub fn init_conversion_logging() -> Result<(), String> {
    let required_codes = [
        crate::logging::codes::conversion::UNBALANCED_BRACKETS,
        crate::logging::codes::conversion::UNMATCHED_CLOSING_BRACKET,
        crate::logging::codes::conversion::MISMATCHED_BRACKETS,
        crate::logging::codes::conversion::STRAY_SEPARATOR,
        crate::logging::codes::conversion::EXPRESSION_TOO_LONG,
        crate::logging::codes::conversion::TOO_MANY_TOKENS,
        crate::logging::codes::conversion::UNCONVERTIBLE_EXPRESSION,
    ];

    for code in &required_codes {
        if crate::logging::codes::get_error_metadata(code.as_str()).is_none() {
            return Err(format!(
                "Conversion error code {} not found in metadata registry",
                code.as_str()
            ));
        }
    }

    if MAX_TOKEN_COUNT == 0 || MAX_EXPRESSION_LENGTH == 0 {
        return Err("Expression limits cannot be zero".to_string());
    }

    crate::log_debug!("Conversion limits initialized",
        "max_expression_length" => MAX_EXPRESSION_LENGTH,
        "max_token_count" => MAX_TOKEN_COUNT
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_module_api() {
        assert_eq!(to_postfix("1+2").to_string(), "1 2 +");
        assert!(to_postfix("(1+2").is_sentinel());
        assert!(convert("(1+2").is_err());
    }

    #[test]
    fn test_init_conversion_logging() {
        assert!(init_conversion_logging().is_ok());
    }
}
