//! Token and postfix-sequence types produced by the converter
use crate::grammar::{self, Operator};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Text of the invalid-expression sentinel
pub const SENTINEL: &str = "x";

/// Shape of a literal token's text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LiteralKind {
    /// Real or sized/based integer
    Numeric,
    Boolean,
    /// Double-quoted text, quotes included
    Text,
}

/// A classified unit of expression text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Token {
    /// Numeric, boolean or string literal, original spelling kept
    Literal(String),
    Operator(Operator),
    OpenParen,
    CloseParen,
    OpenArray,
    CloseArray,
    Comma,
    /// Identifier-shaped text handed to the symbol resolver
    Symbol(String),
    /// Any other unrecognised text
    Unknown(String),
}

/// Coarse token categories used for metrics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TokenClass {
    Literal,
    Operator,
    Structural,
    Symbol,
    Unknown,
}

impl Token {
    /// Classify leftover text as a symbol reference or unknown text
    pub fn from_unrecognized(text: &str) -> Self {
        if grammar::is_identifier(text) {
            Self::Symbol(text.to_string())
        } else {
            Self::Unknown(text.to_string())
        }
    }

    pub fn token_class(&self) -> TokenClass {
        match self {
            Self::Literal(_) => TokenClass::Literal,
            Self::Operator(_) => TokenClass::Operator,
            Self::OpenParen | Self::CloseParen | Self::OpenArray | Self::CloseArray | Self::Comma => {
                TokenClass::Structural
            }
            Self::Symbol(_) => TokenClass::Symbol,
            Self::Unknown(_) => TokenClass::Unknown,
        }
    }

    /// Literal shape, for literal tokens only
    pub fn literal_kind(&self) -> Option<LiteralKind> {
        let Self::Literal(text) = self else {
            return None;
        };

        if grammar::is_string_literal(text) {
            Some(LiteralKind::Text)
        } else if grammar::is_boolean_literal(text) {
            Some(LiteralKind::Boolean)
        } else {
            Some(LiteralKind::Numeric)
        }
    }

    pub fn is_literal(&self) -> bool {
        matches!(self, Self::Literal(_))
    }

    /// Source text of this token
    pub fn as_text(&self) -> &str {
        match self {
            Self::Literal(text) | Self::Symbol(text) | Self::Unknown(text) => text,
            Self::Operator(op) => op.as_str(),
            Self::OpenParen => "(",
            Self::CloseParen => ")",
            Self::OpenArray => "{",
            Self::CloseArray => "}",
            Self::Comma => ",",
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // Distinguish prefix negation from subtraction in printed postfix
            Self::Operator(Operator::Negate) => write!(f, "neg"),
            _ => write!(f, "{}", self.as_text()),
        }
    }
}

// ============================================================================
// POSTFIX SEQUENCE
// ============================================================================

/// Tokens in reverse-polish order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostfixSequence {
    tokens: Vec<Token>,
}

impl PostfixSequence {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens }
    }

    /// The one-token sequence signalling an unparseable expression
    pub fn sentinel() -> Self {
        Self {
            tokens: vec![Token::Unknown(SENTINEL.to_string())],
        }
    }

    pub fn is_sentinel(&self) -> bool {
        matches!(self.tokens.as_slice(), [Token::Unknown(text)] if text == SENTINEL)
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Token> {
        self.tokens.iter()
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn into_tokens(self) -> Vec<Token> {
        self.tokens
    }
}

impl<'a> IntoIterator for &'a PostfixSequence {
    type Item = &'a Token;
    type IntoIter = std::slice::Iter<'a, Token>;

    fn into_iter(self) -> Self::IntoIter {
        self.tokens.iter()
    }
}

impl fmt::Display for PostfixSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for token in &self.tokens {
            if !first {
                write!(f, " ")?;
            }
            write!(f, "{}", token)?;
            first = false;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unrecognized_classification() {
        assert_eq!(
            Token::from_unrecognized("data_width"),
            Token::Symbol("data_width".to_string())
        );
        assert_eq!(
            Token::from_unrecognized("#"),
            Token::Unknown("#".to_string())
        );
    }

    #[test]
    fn test_literal_kinds() {
        let cases = [
            ("8'hFF", LiteralKind::Numeric),
            ("-1.0", LiteralKind::Numeric),
            ("TRUE", LiteralKind::Boolean),
            ("\"text\"", LiteralKind::Text),
        ];
        for (text, kind) in cases {
            assert_eq!(Token::Literal(text.to_string()).literal_kind(), Some(kind));
        }
        assert_eq!(Token::OpenArray.literal_kind(), None);
    }

    #[test]
    fn test_sentinel_sequence() {
        let sentinel = PostfixSequence::sentinel();
        assert!(sentinel.is_sentinel());
        assert_eq!(sentinel.to_string(), "x");
        assert!(!PostfixSequence::new(vec![Token::Symbol("x".to_string())]).is_sentinel());
    }

    #[test]
    fn test_display_marks_negation() {
        let sequence = PostfixSequence::new(vec![
            Token::Literal("32".to_string()),
            Token::Operator(Operator::Clog2),
            Token::Operator(Operator::Negate),
        ]);
        assert_eq!(sequence.to_string(), "32 $clog2 neg");
    }

    #[test]
    fn test_token_serializes_as_tagged_enum() {
        let json = serde_json::to_string(&Token::Operator(Operator::Power)).unwrap();
        assert_eq!(json, r#"{"Operator":"Power"}"#);
    }
}
