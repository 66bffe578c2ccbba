//! Tokenizer and infix-to-postfix converter
//!
//! Single left-to-right scan using the shunting-yard algorithm. Literals are
//! only recognised where an operand is expected, which is what lets `-1`
//! read as a signed literal at the start of an operand but as subtraction
//! after one.

use crate::config::compile_time::expression::*;
use crate::config::runtime::EvaluationPreferences;
use crate::grammar::{self, structural, Operator};
use crate::logging::codes;
use crate::tokens::{PostfixSequence, Token, TokenClass};
use crate::utils::Span;
use crate::log_debug;
use serde::Serialize;
use std::collections::BTreeMap;

/// Structural failures detected while converting to postfix
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConversionError {
    #[error("Unclosed '{bracket}' opened at offset {offset}")]
    UnbalancedBrackets { bracket: char, offset: usize },

    #[error("Closing '{bracket}' at offset {offset} has no matching opener")]
    UnmatchedClosingBracket { bracket: char, offset: usize },

    #[error("Closing '{found}' at offset {offset} does not match the open '{expected}'")]
    MismatchedBrackets {
        expected: char,
        found: char,
        offset: usize,
    },

    #[error("Separator ',' at offset {offset} is outside any array or argument list")]
    StraySeparator { offset: usize },

    #[error("Expression too long: {length} bytes (max {limit})")]
    ExpressionTooLong { length: usize, limit: usize },

    #[error("Too many tokens: {count} (max {MAX_TOKEN_COUNT})")]
    TooManyTokens { count: usize },
}

impl ConversionError {
    pub fn error_code(&self) -> crate::logging::Code {
        match self {
            ConversionError::UnbalancedBrackets { .. } => codes::conversion::UNBALANCED_BRACKETS,
            ConversionError::UnmatchedClosingBracket { .. } => {
                codes::conversion::UNMATCHED_CLOSING_BRACKET
            }
            ConversionError::MismatchedBrackets { .. } => codes::conversion::MISMATCHED_BRACKETS,
            ConversionError::StraySeparator { .. } => codes::conversion::STRAY_SEPARATOR,
            ConversionError::ExpressionTooLong { .. } => codes::conversion::EXPRESSION_TOO_LONG,
            ConversionError::TooManyTokens { .. } => codes::conversion::TOO_MANY_TOKENS,
        }
    }

    /// Byte offset of the offending character, when there is one
    pub fn offset(&self) -> Option<usize> {
        match self {
            ConversionError::UnbalancedBrackets { offset, .. }
            | ConversionError::UnmatchedClosingBracket { offset, .. }
            | ConversionError::MismatchedBrackets { offset, .. }
            | ConversionError::StraySeparator { offset } => Some(*offset),
            ConversionError::ExpressionTooLong { .. } | ConversionError::TooManyTokens { .. } => {
                None
            }
        }
    }
}

/// Token statistics for the most recent conversion
#[derive(Debug, Default, Clone, Serialize)]
pub struct ConversionMetrics {
    pub total_tokens: usize,
    pub literal_tokens: usize,
    pub operator_tokens: usize,
    pub structural_tokens: usize,
    pub symbol_tokens: usize,
    pub unknown_tokens: usize,
    pub max_bracket_depth: usize,

    // Runtime preference-controlled metrics
    pub operator_usage: BTreeMap<String, usize>,
}

impl ConversionMetrics {
    pub(crate) fn record_token(&mut self, token: &Token, preferences: &EvaluationPreferences) {
        self.total_tokens += 1;

        match token.token_class() {
            TokenClass::Literal => self.literal_tokens += 1,
            TokenClass::Operator => {
                self.operator_tokens += 1;

                if preferences.track_operator_usage {
                    let name = token.to_string();
                    *self.operator_usage.entry(name).or_insert(0) += 1;
                }
            }
            TokenClass::Structural => self.structural_tokens += 1,
            TokenClass::Symbol => self.symbol_tokens += 1,
            TokenClass::Unknown => self.unknown_tokens += 1,
        }
    }

    pub(crate) fn record_depth(&mut self, depth: usize) {
        self.max_bracket_depth = self.max_bracket_depth.max(depth);
    }
}

/// Pending entries on the operator stack
#[derive(Debug, Clone, Copy)]
enum StackEntry {
    Operator(Operator),
    Paren { offset: usize },
    /// Innermost open array; the open marker itself is already in the output
    ArrayFence { offset: usize },
}

/// Shunting-yard converter with per-call metrics
pub struct PostfixConverter {
    metrics: ConversionMetrics,
    preferences: EvaluationPreferences,
}

impl PostfixConverter {
    pub fn new() -> Self {
        Self::with_preferences(EvaluationPreferences::default())
    }

    pub fn with_preferences(preferences: EvaluationPreferences) -> Self {
        Self {
            metrics: ConversionMetrics::default(),
            preferences,
        }
    }

    pub fn metrics(&self) -> &ConversionMetrics {
        &self.metrics
    }

    /// Convert, collapsing any structural failure into the sentinel sequence
    pub fn to_postfix(&mut self, expression: &str) -> PostfixSequence {
        match self.convert(expression) {
            Ok(sequence) => sequence,
            Err(error) => {
                match error.offset() {
                    Some(offset) => log_debug!(code = error.error_code(), "Expression could not be converted",
                        span = Span::of(expression, offset, offset + 1),
                        "error" => &error
                    ),
                    None => log_debug!(code = error.error_code(), "Expression could not be converted",
                        "error" => &error
                    ),
                }
                PostfixSequence::sentinel()
            }
        }
    }

    /// Convert an infix expression into postfix order
    pub fn convert(&mut self, expression: &str) -> Result<PostfixSequence, ConversionError> {
        self.metrics = ConversionMetrics::default();

        let limit = self.preferences.effective_max_expression_length();
        if expression.len() > limit {
            return Err(ConversionError::ExpressionTooLong {
                length: expression.len(),
                limit,
            });
        }

        let mut output: Vec<Token> = Vec::new();
        let mut stack: Vec<StackEntry> = Vec::new();
        let mut expect_operand = true;
        let mut depth = 0usize;
        let mut index = 0usize;

        while let Some(ch) = expression[index..].chars().next() {
            let rest = &expression[index..];

            if ch.is_whitespace() {
                index += ch.len_utf8();
                continue;
            }

            if expect_operand {
                if let Some(length) = grammar::match_literal(rest) {
                    output.push(Token::Literal(rest[..length].to_string()));
                    check_token_count(&output)?;
                    index += length;
                    expect_operand = false;
                    continue;
                }
            }

            if let Some((op, length)) = grammar::match_operator(rest) {
                let op = if expect_operand && op == Operator::Subtract {
                    Operator::Negate
                } else {
                    op
                };

                // A prefix operator has no left operand, so nothing pending can bind to it yet
                if !expect_operand {
                    pop_operators(&mut stack, &mut output, Some(op));
                    check_token_count(&output)?;
                }
                stack.push(StackEntry::Operator(op));
                index += length;
                expect_operand = true;
                continue;
            }

            match ch {
                structural::OPEN_PAREN => {
                    stack.push(StackEntry::Paren { offset: index });
                    depth += 1;
                    self.metrics.record_depth(depth);
                    expect_operand = true;
                }
                structural::CLOSE_PAREN => {
                    close_group(&mut stack, &mut output, structural::CLOSE_PAREN, index)?;
                    depth = depth.saturating_sub(1);
                    expect_operand = false;
                }
                structural::OPEN_ARRAY => {
                    output.push(Token::OpenArray);
                    stack.push(StackEntry::ArrayFence { offset: index });
                    depth += 1;
                    self.metrics.record_depth(depth);
                    expect_operand = true;
                }
                structural::CLOSE_ARRAY => {
                    close_group(&mut stack, &mut output, structural::CLOSE_ARRAY, index)?;
                    output.push(Token::CloseArray);
                    depth = depth.saturating_sub(1);
                    expect_operand = false;
                }
                structural::SEPARATOR => {
                    pop_operators(&mut stack, &mut output, None);
                    if stack.is_empty() {
                        return Err(ConversionError::StraySeparator { offset: index });
                    }
                    expect_operand = true;
                }
                _ => {
                    let length = unrecognized_length(rest);
                    output.push(Token::from_unrecognized(rest[..length].trim()));
                    index += length;
                    expect_operand = false;
                    check_token_count(&output)?;
                    continue;
                }
            }

            check_token_count(&output)?;
            index += ch.len_utf8();
        }

        while let Some(entry) = stack.pop() {
            match entry {
                StackEntry::Operator(op) => output.push(Token::Operator(op)),
                StackEntry::Paren { offset } => {
                    return Err(ConversionError::UnbalancedBrackets {
                        bracket: structural::OPEN_PAREN,
                        offset,
                    })
                }
                StackEntry::ArrayFence { offset } => {
                    return Err(ConversionError::UnbalancedBrackets {
                        bracket: structural::OPEN_ARRAY,
                        offset,
                    })
                }
            }
        }
        check_token_count(&output)?;

        for token in &output {
            self.metrics.record_token(token, &self.preferences);
        }

        log_debug!(code = codes::success::CONVERSION_COMPLETE, "Converted expression to postfix",
            "tokens" => self.metrics.total_tokens,
            "max_depth" => self.metrics.max_bracket_depth
        );

        Ok(PostfixSequence::new(output))
    }
}

impl Default for PostfixConverter {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// STACK HELPERS
// ============================================================================

/// Move pending operators to the output
///
/// With an incoming infix operator, stops at the first operator that binds
/// looser than it or at a pending `?`, so each `:` pairs with the nearest
/// open condition. Without one (separators and closers), pops every operator
/// down to the nearest bracket.
fn pop_operators(stack: &mut Vec<StackEntry>, output: &mut Vec<Token>, incoming: Option<Operator>) {
    while let Some(StackEntry::Operator(top)) = stack.last().copied() {
        if let Some(op) = incoming {
            if top == Operator::Question || top.precedence() < op.precedence() {
                break;
            }
        }
        output.push(Token::Operator(top));
        stack.pop();
    }
}

fn close_group(
    stack: &mut Vec<StackEntry>,
    output: &mut Vec<Token>,
    closer: char,
    offset: usize,
) -> Result<(), ConversionError> {
    loop {
        match stack.pop() {
            Some(StackEntry::Operator(op)) => output.push(Token::Operator(op)),
            Some(StackEntry::Paren { .. }) if closer == structural::CLOSE_PAREN => return Ok(()),
            Some(StackEntry::ArrayFence { .. }) if closer == structural::CLOSE_ARRAY => {
                return Ok(())
            }
            Some(StackEntry::Paren { .. }) => {
                return Err(ConversionError::MismatchedBrackets {
                    expected: structural::CLOSE_PAREN,
                    found: closer,
                    offset,
                })
            }
            Some(StackEntry::ArrayFence { .. }) => {
                return Err(ConversionError::MismatchedBrackets {
                    expected: structural::CLOSE_ARRAY,
                    found: closer,
                    offset,
                })
            }
            None => {
                return Err(ConversionError::UnmatchedClosingBracket {
                    bracket: closer,
                    offset,
                })
            }
        }
    }
}

/// Bytes of unrecognised text up to the next operator or structural character
fn unrecognized_length(rest: &str) -> usize {
    rest.char_indices()
        .skip(1)
        .find(|&(offset, ch)| {
            structural::is_structural(ch) || grammar::match_operator(&rest[offset..]).is_some()
        })
        .map(|(offset, _)| offset)
        .unwrap_or(rest.len())
}

fn check_token_count(output: &[Token]) -> Result<(), ConversionError> {
    if output.len() > MAX_TOKEN_COUNT {
        return Err(ConversionError::TooManyTokens {
            count: output.len(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn postfix(expression: &str) -> String {
        PostfixConverter::new().to_postfix(expression).to_string()
    }

    #[test]
    fn test_precedence_and_grouping() {
        let cases = [
            ("2+3*4", "2 3 4 * +"),
            ("(2+3)*4", "2 3 + 4 *"),
            ("6/2*4*3/1", "6 2 / 4 * 3 * 1 /"),
            ("2**2**2", "2 2 ** 2 **"),
            ("1 << 2 + 1", "1 2 1 + <<"),
            ("a == b && c", "a b == c &&"),
        ];

        for (input, expected) in cases {
            assert_eq!(postfix(input), expected, "input: {}", input);
        }
    }

    #[test]
    fn test_signed_literals_and_negation() {
        let cases = [
            ("-1-2", "-1 2 -"),
            ("-2*-2", "-2 -2 *"),
            ("-1**2", "-1 2 **"),
            ("2 ** -1", "2 -1 **"),
            ("-$clog2(32)", "32 $clog2 neg"),
            ("-(1)", "1 neg"),
            ("1 - 2", "1 2 -"),
        ];

        for (input, expected) in cases {
            assert_eq!(postfix(input), expected, "input: {}", input);
        }
    }

    #[test]
    fn test_functions_and_arrays() {
        let cases = [
            ("$pow(2,3)+1", "2 3 $pow 1 +"),
            ("{1,2,3}", "{ 1 2 3 }"),
            ("{1,{1,1}}", "{ 1 { 1 1 } }"),
            ("{$clog2(3),1}", "{ 3 $clog2 1 }"),
            ("{1+2, 3}", "{ 1 2 + 3 }"),
            ("()", ""),
        ];

        for (input, expected) in cases {
            assert_eq!(postfix(input), expected, "input: {}", input);
        }
    }

    #[test]
    fn test_ternary_pairs_with_nearest_condition() {
        let cases = [
            ("1-1?2:3+1", "1 1 - 2 3 1 + : ?"),
            ("1?11:2?12:0", "1 11 2 12 0 : ? : ?"),
            ("1?12?1:0:22", "1 12 1 0 : 22 : ? ?"),
        ];

        for (input, expected) in cases {
            assert_eq!(postfix(input), expected, "input: {}", input);
        }
    }

    #[test]
    fn test_unrecognized_text() {
        let mut converter = PostfixConverter::new();
        let sequence = converter.to_postfix("text + 2");
        assert_eq!(
            sequence.tokens(),
            &[
                Token::Symbol("text".to_string()),
                Token::Literal("2".to_string()),
                Token::Operator(Operator::Add),
            ]
        );

        let sequence = converter.to_postfix("{1,1,#}");
        assert!(sequence.tokens().contains(&Token::Unknown("#".to_string())));
    }

    #[test]
    fn test_structural_errors() {
        let mut converter = PostfixConverter::new();

        assert_matches!(
            converter.convert("(1+2"),
            Err(ConversionError::UnbalancedBrackets { bracket: '(', offset: 0 })
        );
        assert_matches!(
            converter.convert("(1))"),
            Err(ConversionError::UnmatchedClosingBracket { bracket: ')', offset: 3 })
        );
        assert_matches!(
            converter.convert(")1("),
            Err(ConversionError::UnmatchedClosingBracket { offset: 0, .. })
        );
        assert_matches!(
            converter.convert("(1}"),
            Err(ConversionError::MismatchedBrackets { expected: ')', found: '}', .. })
        );
        assert_matches!(
            converter.convert(",1}"),
            Err(ConversionError::StraySeparator { offset: 0 })
        );
        assert_matches!(
            converter.convert("{1,2"),
            Err(ConversionError::UnbalancedBrackets { bracket: '{', .. })
        );
    }

    #[test]
    fn test_errors_collapse_to_sentinel() {
        let mut converter = PostfixConverter::new();
        for input in ["((1)", "(1))", ")1(", ",1}", "{1"] {
            assert!(converter.to_postfix(input).is_sentinel(), "input: {}", input);
        }
    }

    #[test]
    fn test_error_codes() {
        let error = ConversionError::StraySeparator { offset: 2 };
        assert_eq!(error.error_code(), codes::conversion::STRAY_SEPARATOR);
        assert_eq!(error.offset(), Some(2));

        let error = ConversionError::TooManyTokens { count: 5 };
        assert_eq!(error.error_code().as_str(), "E014");
        assert_eq!(error.offset(), None);
    }

    #[test]
    fn test_length_and_token_limits() {
        let mut converter = PostfixConverter::new();

        let too_long = "1".repeat(MAX_EXPRESSION_LENGTH + 1);
        assert_matches!(
            converter.convert(&too_long),
            Err(ConversionError::ExpressionTooLong { .. })
        );

        let too_many = format!("{}1", "1+".repeat(MAX_TOKEN_COUNT / 2 + 1));
        assert_matches!(
            converter.convert(&too_many),
            Err(ConversionError::TooManyTokens { .. })
        );
    }

    #[test]
    fn test_metrics() {
        let preferences = EvaluationPreferences {
            track_operator_usage: true,
            ..Default::default()
        };
        let mut converter = PostfixConverter::with_preferences(preferences);
        converter.to_postfix("((1+2)*{3, x})+4");

        let metrics = converter.metrics();
        assert_eq!(metrics.literal_tokens, 4);
        assert_eq!(metrics.symbol_tokens, 1);
        assert_eq!(metrics.structural_tokens, 2);
        assert_eq!(metrics.operator_tokens, 3);
        assert_eq!(metrics.max_bracket_depth, 2);
        assert_eq!(metrics.operator_usage.get("+"), Some(&2));
    }
}
