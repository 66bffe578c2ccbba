//! Lexical grammar of SystemVerilog-style expressions
//!
//! Literal shapes, operator vocabulary and structural symbols. Nothing here
//! has behavior beyond recognition; the converter and numeric helpers
//! consult it as the single source of truth.

pub mod operators;
pub mod patterns;

pub use operators::{Arity, Operator};
pub use patterns::{
    is_boolean_literal, is_identifier, is_numeric_literal, is_string_literal, match_literal,
    match_operator, patterns, GrammarPatterns,
};

/// Characters with fixed structural meaning
pub mod structural {
    pub const OPEN_PAREN: char = '(';
    pub const CLOSE_PAREN: char = ')';
    pub const OPEN_ARRAY: char = '{';
    pub const CLOSE_ARRAY: char = '}';
    pub const SEPARATOR: char = ',';

    pub fn is_structural(ch: char) -> bool {
        matches!(
            ch,
            OPEN_PAREN | CLOSE_PAREN | OPEN_ARRAY | CLOSE_ARRAY | SEPARATOR
        )
    }
}
