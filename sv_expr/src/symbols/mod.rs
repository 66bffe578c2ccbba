//! Symbol resolution hook
//!
//! The evaluator never decides on its own what an identifier means. It asks
//! a [`SymbolResolver`]; the default [`NoSymbols`] knows nothing, a
//! [`SymbolTable`] holds parameter definitions, and any
//! `Fn(&str) -> Option<String>` closure works as an ad-hoc lookup.

pub mod error;
pub mod table;

pub use error::{SymbolError, SymbolResult};
pub use table::SymbolTable;

/// Lookup consulted for tokens that are not literals
///
/// Implementations are read-only during evaluation; a resolver that is
/// `Sync` can be shared by concurrent evaluations.
pub trait SymbolResolver {
    /// Whether `token` names a known symbol
    fn is_symbol(&self, token: &str) -> bool;

    /// Current value of a known symbol; `"x"` when it has none
    fn resolve(&self, token: &str) -> String;

    /// Display base of a symbol's value, 0 when it carries none
    fn base_for_symbol(&self, _token: &str) -> u32 {
        0
    }
}

/// Resolver with no symbols at all
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSymbols;

impl SymbolResolver for NoSymbols {
    fn is_symbol(&self, _token: &str) -> bool {
        false
    }

    fn resolve(&self, token: &str) -> String {
        token.to_string()
    }
}

impl<F> SymbolResolver for F
where
    F: Fn(&str) -> Option<String>,
{
    fn is_symbol(&self, token: &str) -> bool {
        self(token).is_some()
    }

    fn resolve(&self, token: &str) -> String {
        self(token).unwrap_or_else(|| crate::tokens::SENTINEL.to_string())
    }
}

// ============================================================================
// MODULE INITIALIZATION AND VALIDATION
// ============================================================================

/// Validate symbol error codes and limits (for system startup)
pub fn init_symbol_logging() -> Result<(), String> {
    use crate::config::compile_time::symbols::*;
    use crate::logging::codes;

    let required_codes = [
        codes::symbols::CIRCULAR_REFERENCE,
        codes::symbols::RECURSION_LIMIT_EXCEEDED,
        codes::symbols::INVALID_IDENTIFIER,
        codes::symbols::INVALID_SYMBOL_VALUE,
    ];

    for code in &required_codes {
        if codes::get_error_metadata(code.as_str()).is_none() {
            return Err(format!(
                "Symbol error code {} not found in metadata registry",
                code.as_str()
            ));
        }
    }

    if MAX_RECURSION_DEPTH == 0 || MAX_SYMBOL_IDENTIFIER_LENGTH == 0 {
        return Err("Symbol limits cannot be zero".to_string());
    }

    crate::log_debug!("Symbol limits initialized",
        "max_recursion_depth" => MAX_RECURSION_DEPTH,
        "max_symbol_identifier_length" => MAX_SYMBOL_IDENTIFIER_LENGTH
    );

    Ok(())
}
