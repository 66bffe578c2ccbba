//! Operator vocabulary of the expression language
//!
//! Every operator the tokenizer can produce is a variant here; precedence
//! and arity are exhaustive matches so adding a variant forces both tables
//! to be updated.
use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of operands an operator consumes from the evaluation stack
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Arity {
    Unary,
    Binary,
    /// `?` consumes nothing; `:` consumes condition and both branches
    Ternary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operator {
    // === TERNARY ===
    Question,
    Colon,

    // === LOGICAL ===
    LogicalOr,
    LogicalAnd,

    // === BITWISE ===
    BitOr,
    BitXor,
    BitAnd,

    // === EQUALITY ===
    Equal,
    NotEqual,
    CaseEqual,
    CaseNotEqual,

    // === RELATIONAL ===
    Less,
    LessEqual,
    Greater,
    GreaterEqual,

    // === SHIFT ===
    ShiftLeft,
    ShiftRight,

    // === ARITHMETIC ===
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    Power,

    /// Prefix `-` that does not start a signed literal
    Negate,

    // === FUNCTIONS AND UNARY ===
    BitNot,
    Clog2,
    Exp,
    Sqrt,
    Pow,
}

impl Operator {
    /// All operators with a source spelling, longest spelling first within
    /// each shared prefix so greedy matching picks `**` over `*`.
    /// Negate shares the `-` spelling and is never matched from source text.
    pub const SPELLED: [Operator; 28] = [
        Self::CaseEqual,
        Self::CaseNotEqual,
        Self::Power,
        Self::ShiftLeft,
        Self::ShiftRight,
        Self::LessEqual,
        Self::GreaterEqual,
        Self::Equal,
        Self::NotEqual,
        Self::LogicalAnd,
        Self::LogicalOr,
        Self::Clog2,
        Self::Sqrt,
        Self::Exp,
        Self::Pow,
        Self::Multiply,
        Self::Divide,
        Self::Modulo,
        Self::Add,
        Self::Subtract,
        Self::Less,
        Self::Greater,
        Self::BitAnd,
        Self::BitOr,
        Self::BitXor,
        Self::BitNot,
        Self::Question,
        Self::Colon,
    ];

    /// Exact spelling as it appears in expression text
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Question => "?",
            Self::Colon => ":",
            Self::LogicalOr => "||",
            Self::LogicalAnd => "&&",
            Self::BitOr => "|",
            Self::BitXor => "^",
            Self::BitAnd => "&",
            Self::Equal => "==",
            Self::NotEqual => "!=",
            Self::CaseEqual => "===",
            Self::CaseNotEqual => "!==",
            Self::Less => "<",
            Self::LessEqual => "<=",
            Self::Greater => ">",
            Self::GreaterEqual => ">=",
            Self::ShiftLeft => "<<",
            Self::ShiftRight => ">>",
            Self::Add => "+",
            Self::Subtract => "-",
            Self::Multiply => "*",
            Self::Divide => "/",
            Self::Modulo => "%",
            Self::Power => "**",
            Self::Negate => "-",
            Self::BitNot => "~",
            Self::Clog2 => "$clog2",
            Self::Exp => "$exp",
            Self::Sqrt => "$sqrt",
            Self::Pow => "$pow",
        }
    }

    /// Parse an operator from its exact spelling
    ///
    /// `-` always parses as [`Operator::Subtract`]; the converter decides
    /// when it is a prefix negation instead.
    pub fn from_spelling(spelling: &str) -> Option<Self> {
        match spelling {
            "?" => Some(Self::Question),
            ":" => Some(Self::Colon),
            "||" => Some(Self::LogicalOr),
            "&&" => Some(Self::LogicalAnd),
            "|" => Some(Self::BitOr),
            "^" => Some(Self::BitXor),
            "&" => Some(Self::BitAnd),
            "==" => Some(Self::Equal),
            "!=" => Some(Self::NotEqual),
            "===" => Some(Self::CaseEqual),
            "!==" => Some(Self::CaseNotEqual),
            "<" => Some(Self::Less),
            "<=" => Some(Self::LessEqual),
            ">" => Some(Self::Greater),
            ">=" => Some(Self::GreaterEqual),
            "<<" => Some(Self::ShiftLeft),
            ">>" => Some(Self::ShiftRight),
            "+" => Some(Self::Add),
            "-" => Some(Self::Subtract),
            "*" => Some(Self::Multiply),
            "/" => Some(Self::Divide),
            "%" => Some(Self::Modulo),
            "**" => Some(Self::Power),
            "~" => Some(Self::BitNot),
            "$clog2" => Some(Self::Clog2),
            "$exp" => Some(Self::Exp),
            "$sqrt" => Some(Self::Sqrt),
            "$pow" => Some(Self::Pow),
            _ => None,
        }
    }

    /// Binding strength; higher binds tighter
    pub const fn precedence(self) -> u8 {
        match self {
            Self::Colon => 1,
            Self::Question => 2,
            Self::LogicalOr => 3,
            Self::LogicalAnd => 4,
            Self::BitOr => 5,
            Self::BitXor => 6,
            Self::BitAnd => 7,
            Self::Equal | Self::NotEqual | Self::CaseEqual | Self::CaseNotEqual => 8,
            Self::Less | Self::LessEqual | Self::Greater | Self::GreaterEqual => 9,
            Self::ShiftLeft | Self::ShiftRight => 10,
            Self::Add | Self::Subtract => 11,
            Self::Multiply | Self::Divide | Self::Modulo => 12,
            Self::Power | Self::Negate => 13,
            Self::BitNot | Self::Clog2 | Self::Exp | Self::Sqrt | Self::Pow => 14,
        }
    }

    pub const fn arity(self) -> Arity {
        match self {
            Self::Question | Self::Colon => Arity::Ternary,
            Self::Negate | Self::BitNot | Self::Clog2 | Self::Exp | Self::Sqrt => Arity::Unary,
            _ => Arity::Binary,
        }
    }

    /// Operators written before their operand(s): `~x`, `$clog2(x)`, `$pow(a, b)`
    pub const fn is_function_like(self) -> bool {
        matches!(
            self,
            Self::Negate | Self::BitNot | Self::Clog2 | Self::Exp | Self::Sqrt | Self::Pow
        )
    }

    pub const fn is_comparison(self) -> bool {
        matches!(
            self,
            Self::Equal
                | Self::NotEqual
                | Self::CaseEqual
                | Self::CaseNotEqual
                | Self::Less
                | Self::LessEqual
                | Self::Greater
                | Self::GreaterEqual
        )
    }

    /// Operators defined only on integer operands
    pub const fn requires_integers(self) -> bool {
        matches!(
            self,
            Self::Modulo
                | Self::ShiftLeft
                | Self::ShiftRight
                | Self::BitOr
                | Self::BitXor
                | Self::BitAnd
                | Self::BitNot
        )
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spelling_round_trips() {
        for op in Operator::SPELLED {
            assert_eq!(Operator::from_spelling(op.as_str()), Some(op));
        }
        assert_eq!(Operator::from_spelling("!"), None);
        assert_eq!(Operator::from_spelling("$ipxact_port_value"), None);
    }

    #[test]
    fn test_precedence_ordering() {
        let ladder = [
            Operator::Colon,
            Operator::Question,
            Operator::LogicalOr,
            Operator::LogicalAnd,
            Operator::BitOr,
            Operator::BitXor,
            Operator::BitAnd,
            Operator::Equal,
            Operator::Less,
            Operator::ShiftLeft,
            Operator::Add,
            Operator::Multiply,
            Operator::Power,
            Operator::Clog2,
        ];
        for pair in ladder.windows(2) {
            assert!(
                pair[0].precedence() < pair[1].precedence(),
                "{} should bind looser than {}",
                pair[0],
                pair[1]
            );
        }
        assert_eq!(Operator::Negate.precedence(), Operator::Power.precedence());
        assert_eq!(Operator::CaseEqual.precedence(), Operator::Equal.precedence());
    }

    #[test]
    fn test_arity() {
        assert_eq!(Operator::Clog2.arity(), Arity::Unary);
        assert_eq!(Operator::Pow.arity(), Arity::Binary);
        assert_eq!(Operator::Colon.arity(), Arity::Ternary);
        assert!(Operator::Pow.is_function_like());
        assert!(!Operator::Subtract.is_function_like());
    }
}
