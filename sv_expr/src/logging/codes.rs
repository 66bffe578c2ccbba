//! Consolidated diagnostic codes and classification system
//!
//! Single source of truth for all error codes, their metadata, and classification functions.
//! This module combines code constants with their behavioral metadata in one place.

use std::collections::HashMap;
use std::sync::OnceLock;

// ============================================================================
// CODE WRAPPER TYPE
// ============================================================================

/// Universal code wrapper for both error and success codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Code(&'static str);

impl Code {
    pub const fn new(code: &'static str) -> Self {
        Self(code)
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl std::fmt::Display for Code {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// ERROR CLASSIFICATION TYPES
// ============================================================================

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Critical = 0,
    High = 1,
    Medium = 2,
    Low = 3,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "Critical",
            Severity::High => "High",
            Severity::Medium => "Medium",
            Severity::Low => "Low",
        }
    }
}

/// Complete metadata for a diagnostic code
#[derive(Debug, Clone)]
pub struct ErrorMetadata {
    pub code: &'static str,
    pub category: &'static str,
    pub severity: Severity,
    pub recoverable: bool,
    pub requires_halt: bool,
    pub description: &'static str,
    pub recommended_action: &'static str,
}

impl ErrorMetadata {
    pub fn new(
        code: &'static str,
        category: &'static str,
        severity: Severity,
        recoverable: bool,
        requires_halt: bool,
        description: &'static str,
        recommended_action: &'static str,
    ) -> Self {
        Self {
            code,
            category,
            severity,
            recoverable,
            requires_halt,
            description,
            recommended_action,
        }
    }
}

// ============================================================================
// ERROR CODE CONSTANTS
// ============================================================================

/// System error codes
pub mod system {
    use super::Code;

    pub const INTERNAL_ERROR: Code = Code::new("ERR001");
    pub const INITIALIZATION_FAILURE: Code = Code::new("ERR002");
    pub const CONFIGURATION_ERROR: Code = Code::new("ERR003");
}

/// Infix-to-postfix conversion error codes
pub mod conversion {
    use super::Code;

    pub const UNBALANCED_BRACKETS: Code = Code::new("E010");
    pub const UNMATCHED_CLOSING_BRACKET: Code = Code::new("E011");
    pub const MISMATCHED_BRACKETS: Code = Code::new("E012");
    pub const EXPRESSION_TOO_LONG: Code = Code::new("E013");
    pub const TOO_MANY_TOKENS: Code = Code::new("E014");
    pub const STRAY_SEPARATOR: Code = Code::new("E015");
    pub const UNCONVERTIBLE_EXPRESSION: Code = Code::new("E016");
}

/// Postfix evaluation error codes
pub mod evaluation {
    use super::Code;

    // Structural
    pub const MISSING_OPERAND: Code = Code::new("E020");
    pub const UNBALANCED_TERNARY: Code = Code::new("E021");
    pub const UNTERMINATED_ARRAY: Code = Code::new("E022");

    // Operands
    pub const INVALID_CONSTANT: Code = Code::new("E023");
    pub const NON_NUMERIC_OPERAND: Code = Code::new("E024");
    pub const NON_INTEGER_OPERAND: Code = Code::new("E025");
    pub const UNSUPPORTED_STRING_OPERATION: Code = Code::new("E026");

    // Arithmetic
    pub const DIVISION_BY_ZERO: Code = Code::new("E030");
    pub const DOMAIN_ERROR: Code = Code::new("E031");
    pub const ARITHMETIC_OVERFLOW: Code = Code::new("E032");
}

/// Symbol resolution error codes
pub mod symbols {
    use super::Code;

    pub const CIRCULAR_REFERENCE: Code = Code::new("E040");
    pub const RECURSION_LIMIT_EXCEEDED: Code = Code::new("E041");
    pub const INVALID_IDENTIFIER: Code = Code::new("E042");
    pub const INVALID_SYMBOL_VALUE: Code = Code::new("E043");
}

// ============================================================================
// SUCCESS CODE CONSTANTS
// ============================================================================

/// Success codes
pub mod success {
    use super::Code;

    pub const OPERATION_COMPLETED_SUCCESSFULLY: Code = Code::new("I001");
    pub const SYSTEM_INITIALIZATION_COMPLETED: Code = Code::new("I004");
    pub const CONVERSION_COMPLETE: Code = Code::new("I010");
    pub const EVALUATION_COMPLETE: Code = Code::new("I020");
    pub const SYMBOL_TABLE_LOADED: Code = Code::new("I040");
}

// ============================================================================
// ERROR METADATA REGISTRY
// ============================================================================

/// Error metadata registry using OnceLock for thread safety
static ERROR_REGISTRY: OnceLock<HashMap<&'static str, ErrorMetadata>> = OnceLock::new();

/// Initialize and get the error registry
fn get_error_registry() -> &'static HashMap<&'static str, ErrorMetadata> {
    ERROR_REGISTRY.get_or_init(|| {
        let mut registry = HashMap::new();

        // System errors
        registry.insert(
            "ERR001",
            ErrorMetadata::new(
                "ERR001",
                "System",
                Severity::Critical,
                false,
                true,
                "Critical internal system error",
                "File a bug report with the failing expression",
            ),
        );
        registry.insert(
            "ERR002",
            ErrorMetadata::new(
                "ERR002",
                "System",
                Severity::Critical,
                false,
                true,
                "System initialization failure",
                "Check logging configuration and start-up order",
            ),
        );
        registry.insert(
            "ERR003",
            ErrorMetadata::new(
                "ERR003",
                "System",
                Severity::High,
                false,
                true,
                "Runtime configuration could not be loaded",
                "Check the configuration file path and TOML syntax",
            ),
        );

        // Conversion errors
        registry.insert(
            "E010",
            ErrorMetadata::new(
                "E010",
                "Conversion",
                Severity::Medium,
                true,
                false,
                "Expression has an opening bracket that is never closed",
                "Add the missing ')' or '}'",
            ),
        );
        registry.insert(
            "E011",
            ErrorMetadata::new(
                "E011",
                "Conversion",
                Severity::Medium,
                true,
                false,
                "Closing bracket without a matching opening bracket",
                "Remove the extra ')' or '}' or add its opener",
            ),
        );
        registry.insert(
            "E012",
            ErrorMetadata::new(
                "E012",
                "Conversion",
                Severity::Medium,
                true,
                false,
                "Closing bracket does not match the innermost opening bracket",
                "Pair '(' with ')' and '{' with '}'",
            ),
        );
        registry.insert(
            "E013",
            ErrorMetadata::new(
                "E013",
                "Conversion",
                Severity::High,
                true,
                false,
                "Expression exceeds maximum length limit",
                "Shorten the expression or raise the configured limit",
            ),
        );
        registry.insert(
            "E014",
            ErrorMetadata::new(
                "E014",
                "Conversion",
                Severity::High,
                true,
                false,
                "Expression produces more tokens than allowed",
                "Split the expression into parameters",
            ),
        );

        registry.insert(
            "E015",
            ErrorMetadata::new(
                "E015",
                "Conversion",
                Severity::Medium,
                true,
                false,
                "Comma outside of an array or function argument list",
                "Wrap the list in '{...}' or remove the comma",
            ),
        );
        registry.insert(
            "E016",
            ErrorMetadata::new(
                "E016",
                "Conversion",
                Severity::Medium,
                true,
                false,
                "Expression could not be converted and has no postfix form",
                "Evaluate the expression text to see the structural error",
            ),
        );

        // Evaluation errors

        registry.insert(
            "E020",
            ErrorMetadata::new(
                "E020",
                "Evaluation",
                Severity::Medium,
                true,
                false,
                "Operator is missing one or more operands",
                "Check for dangling operators such as '1+'",
            ),
        );
        registry.insert(
            "E021",
            ErrorMetadata::new(
                "E021",
                "Evaluation",
                Severity::Medium,
                true,
                false,
                "Conditional operator '?' and ':' are not paired",
                "Write conditionals as 'cond ? a : b'",
            ),
        );
        registry.insert(
            "E022",
            ErrorMetadata::new(
                "E022",
                "Evaluation",
                Severity::Medium,
                true,
                false,
                "Array close marker without matching array open marker",
                "Check array braces",
            ),
        );
        registry.insert(
            "E023",
            ErrorMetadata::new(
                "E023",
                "Evaluation",
                Severity::Low,
                true,
                false,
                "Token is neither a literal nor a known symbol",
                "Check spelling of numbers and parameter names",
            ),
        );
        registry.insert(
            "E024",
            ErrorMetadata::new(
                "E024",
                "Evaluation",
                Severity::Low,
                true,
                false,
                "Numeric operator applied to a non-numeric value",
                "Use numeric operands; arrays and strings are not arithmetic",
            ),
        );
        registry.insert(
            "E025",
            ErrorMetadata::new(
                "E025",
                "Evaluation",
                Severity::Low,
                true,
                false,
                "Integer-only operator applied to a real value",
                "Use integer operands for %, shifts and bitwise operators",
            ),
        );
        registry.insert(
            "E026",
            ErrorMetadata::new(
                "E026",
                "Evaluation",
                Severity::Low,
                true,
                false,
                "Operator is not defined for string operands",
                "Only == and != compare strings",
            ),
        );
        registry.insert(
            "E030",
            ErrorMetadata::new(
                "E030",
                "Evaluation",
                Severity::Low,
                true,
                false,
                "Division or remainder by zero",
                "Check the divisor",
            ),
        );
        registry.insert(
            "E031",
            ErrorMetadata::new(
                "E031",
                "Evaluation",
                Severity::Low,
                true,
                false,
                "Operand outside the domain of the operation",
                "Check for negative square roots, logarithms or zero to a negative power",
            ),
        );
        registry.insert(
            "E032",
            ErrorMetadata::new(
                "E032",
                "Evaluation",
                Severity::Low,
                true,
                false,
                "Result does not fit the numeric range",
                "Reduce operand magnitude",
            ),
        );

        // Symbol errors
        registry.insert(
            "E040",
            ErrorMetadata::new(
                "E040",
                "Symbols",
                Severity::High,
                true,
                false,
                "Symbol definition refers back to itself",
                "Break the reference cycle between parameters",
            ),
        );
        registry.insert(
            "E041",
            ErrorMetadata::new(
                "E041",
                "Symbols",
                Severity::High,
                true,
                false,
                "Symbol reference chain exceeds recursion limit",
                "Flatten parameter definitions or raise the limit",
            ),
        );
        registry.insert(
            "E042",
            ErrorMetadata::new(
                "E042",
                "Symbols",
                Severity::Medium,
                true,
                false,
                "Symbol identifier is empty or too long",
                "Use a non-empty identifier within the configured length",
            ),
        );
        registry.insert(
            "E043",
            ErrorMetadata::new(
                "E043",
                "Symbols",
                Severity::Medium,
                true,
                false,
                "Symbol definition is not a string expression",
                "Quote parameter expressions in the TOML table",
            ),
        );

        // Success codes
        registry.insert(
            "I001",
            ErrorMetadata::new(
                "I001",
                "System",
                Severity::Low,
                true,
                false,
                "Operation completed successfully",
                "No action required",
            ),
        );
        registry.insert(
            "I004",
            ErrorMetadata::new(
                "I004",
                "System",
                Severity::Low,
                true,
                false,
                "System initialization completed",
                "No action required",
            ),
        );
        registry.insert(
            "I010",
            ErrorMetadata::new(
                "I010",
                "Conversion",
                Severity::Low,
                true,
                false,
                "Expression converted to postfix form",
                "Continue to evaluation",
            ),
        );
        registry.insert(
            "I020",
            ErrorMetadata::new(
                "I020",
                "Evaluation",
                Severity::Low,
                true,
                false,
                "Expression evaluated",
                "No action required",
            ),
        );
        registry.insert(
            "I040",
            ErrorMetadata::new(
                "I040",
                "Symbols",
                Severity::Low,
                true,
                false,
                "Symbol table loaded",
                "No action required",
            ),
        );

        registry
    })
}

// ============================================================================
// CLASSIFICATION FUNCTIONS
// ============================================================================

/// Get error metadata for a specific error code
pub fn get_error_metadata(code: &str) -> Option<&'static ErrorMetadata> {
    get_error_registry().get(code)
}

/// Get error severity from error code
pub fn get_severity(code: &str) -> Severity {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.severity)
        .unwrap_or(Severity::Medium)
}

/// Check if error is recoverable
pub fn is_recoverable(code: &str) -> bool {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.recoverable)
        .unwrap_or(true)
}

/// Check if error requires immediate halt
pub fn requires_halt(code: &str) -> bool {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.requires_halt)
        .unwrap_or(false)
}

/// Get human-readable description for error code
pub fn get_description(code: &str) -> &'static str {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.description)
        .unwrap_or("Unknown error")
}

/// Get recommended action for error code
pub fn get_action(code: &str) -> &'static str {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.recommended_action)
        .unwrap_or("No specific action available")
}

/// Get error category from error code
pub fn get_category(code: &str) -> &'static str {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.category)
        .unwrap_or("Unknown")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_constant_is_registered() {
        let all = [
            system::INTERNAL_ERROR,
            system::INITIALIZATION_FAILURE,
            system::CONFIGURATION_ERROR,
            conversion::UNBALANCED_BRACKETS,
            conversion::UNMATCHED_CLOSING_BRACKET,
            conversion::MISMATCHED_BRACKETS,
            conversion::EXPRESSION_TOO_LONG,
            conversion::TOO_MANY_TOKENS,
            conversion::STRAY_SEPARATOR,
            conversion::UNCONVERTIBLE_EXPRESSION,
            evaluation::MISSING_OPERAND,
            evaluation::UNBALANCED_TERNARY,
            evaluation::UNTERMINATED_ARRAY,
            evaluation::INVALID_CONSTANT,
            evaluation::NON_NUMERIC_OPERAND,
            evaluation::NON_INTEGER_OPERAND,
            evaluation::UNSUPPORTED_STRING_OPERATION,
            evaluation::DIVISION_BY_ZERO,
            evaluation::DOMAIN_ERROR,
            evaluation::ARITHMETIC_OVERFLOW,
            symbols::CIRCULAR_REFERENCE,
            symbols::RECURSION_LIMIT_EXCEEDED,
            symbols::INVALID_IDENTIFIER,
            symbols::INVALID_SYMBOL_VALUE,
            success::OPERATION_COMPLETED_SUCCESSFULLY,
            success::SYSTEM_INITIALIZATION_COMPLETED,
            success::CONVERSION_COMPLETE,
            success::EVALUATION_COMPLETE,
            success::SYMBOL_TABLE_LOADED,
        ];

        for code in all {
            let metadata = get_error_metadata(code.as_str());
            assert!(metadata.is_some(), "missing metadata for {}", code);
            assert_eq!(metadata.unwrap().code, code.as_str());
        }
    }

    #[test]
    fn test_classification_defaults_for_unknown_codes() {
        assert_eq!(get_description("Z999"), "Unknown error");
        assert_eq!(get_category("Z999"), "Unknown");
        assert_eq!(get_severity("Z999"), Severity::Medium);
        assert!(is_recoverable("Z999"));
        assert!(!requires_halt("Z999"));
    }

    #[test]
    fn test_system_errors_halt() {
        assert!(requires_halt(system::INTERNAL_ERROR.as_str()));
        assert_eq!(get_severity("ERR001"), Severity::Critical);
        assert!(!requires_halt(evaluation::DIVISION_BY_ZERO.as_str()));
        assert_eq!(get_category("E030"), "Evaluation");
    }
}
