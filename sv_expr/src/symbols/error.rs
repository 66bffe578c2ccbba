//! Error types for symbol definition and resolution

use crate::evaluation::EvalError;
use crate::logging::codes;

pub type SymbolResult<T> = Result<T, SymbolError>;

#[derive(Debug, thiserror::Error)]
pub enum SymbolError {
    #[error("Circular symbol definition: {}", cycle.join(" -> "))]
    CircularReference { cycle: Vec<String> },

    #[error("Resolving '{symbol}' exceeds the recursion limit of {limit}")]
    RecursionLimitExceeded { symbol: String, limit: usize },

    #[error("'{identifier}' is not a valid symbol identifier")]
    InvalidIdentifier { identifier: String },

    #[error("Symbol '{symbol}' is not defined")]
    UndefinedSymbol { symbol: String },

    #[error("Definition of '{symbol}' does not evaluate: {source}")]
    InvalidDefinition {
        symbol: String,
        #[source]
        source: EvalError,
    },

    #[error("Symbol '{symbol}' has a {kind} value; expected an expression string or number")]
    UnsupportedValue { symbol: String, kind: String },

    #[error("Failed to read symbol table '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid symbol table document: {0}")]
    Toml(#[from] toml::de::Error),
}

impl SymbolError {
    pub fn circular_reference(chain: &[String], symbol: &str) -> Self {
        let mut cycle = chain.to_vec();
        cycle.push(symbol.to_string());
        Self::CircularReference { cycle }
    }

    pub fn recursion_limit_exceeded(symbol: &str, limit: usize) -> Self {
        Self::RecursionLimitExceeded {
            symbol: symbol.to_string(),
            limit,
        }
    }

    pub fn invalid_identifier(identifier: &str) -> Self {
        Self::InvalidIdentifier {
            identifier: identifier.to_string(),
        }
    }

    pub fn error_code(&self) -> crate::logging::Code {
        match self {
            SymbolError::CircularReference { .. } => codes::symbols::CIRCULAR_REFERENCE,
            SymbolError::RecursionLimitExceeded { .. } => codes::symbols::RECURSION_LIMIT_EXCEEDED,
            SymbolError::InvalidIdentifier { .. } => codes::symbols::INVALID_IDENTIFIER,
            SymbolError::UndefinedSymbol { .. }
            | SymbolError::InvalidDefinition { .. }
            | SymbolError::UnsupportedValue { .. } => codes::symbols::INVALID_SYMBOL_VALUE,
            SymbolError::Io { .. } | SymbolError::Toml(_) => codes::system::CONFIGURATION_ERROR,
        }
    }

    /// Whether this error closes a definition loop rather than a bad value
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            SymbolError::CircularReference { .. } | SymbolError::RecursionLimitExceeded { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycle_message_lists_path() {
        let chain = vec!["first".to_string(), "second".to_string()];
        let error = SymbolError::circular_reference(&chain, "first");
        assert_eq!(
            error.to_string(),
            "Circular symbol definition: first -> second -> first"
        );
        assert_eq!(error.error_code(), codes::symbols::CIRCULAR_REFERENCE);
        assert!(error.is_structural());
    }

    #[test]
    fn test_definition_error_keeps_source() {
        use std::error::Error;

        let error = SymbolError::InvalidDefinition {
            symbol: "ratio".to_string(),
            source: EvalError::DivisionByZero {
                operator: "/".to_string(),
            },
        };
        assert!(error.source().is_some());
        assert!(!error.is_structural());
    }
}
