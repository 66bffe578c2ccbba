//! Stack machine over postfix tokens

use super::operations::{apply_binary, apply_unary, select_branch};
use super::{contains_sentinel, EvalError};
use crate::config::runtime::EvaluationPreferences;
use crate::grammar::{Arity, Operator};
use crate::log_debug;
use crate::numeric;
use crate::symbols::SymbolResolver;
use crate::tokens::{LiteralKind, PostfixSequence, Token};
use serde::Serialize;

/// Entry on the value stack
#[derive(Debug, Clone, PartialEq)]
enum StackValue {
    /// Marker left by `{` until the matching `}` collects the elements
    ArrayOpen,
    Value(String),
}

#[derive(Debug, Default, Clone, Serialize)]
pub struct EvaluationMetrics {
    pub operators_applied: usize,
    pub symbols_resolved: usize,
    pub literals_decoded: usize,
    pub arrays_built: usize,
    pub max_stack_depth: usize,
}

pub struct Evaluator<'a, R: SymbolResolver + ?Sized> {
    resolver: &'a R,
    metrics: EvaluationMetrics,
    preferences: EvaluationPreferences,
}

impl<'a, R: SymbolResolver + ?Sized> Evaluator<'a, R> {
    pub fn new(resolver: &'a R) -> Self {
        Self::with_preferences(resolver, EvaluationPreferences::default())
    }

    pub fn with_preferences(resolver: &'a R, preferences: EvaluationPreferences) -> Self {
        Self {
            resolver,
            metrics: EvaluationMetrics::default(),
            preferences,
        }
    }

    pub fn metrics(&self) -> &EvaluationMetrics {
        &self.metrics
    }

    /// Reduce `postfix` to a single value string
    ///
    /// Whatever remains on the stack at the end is concatenated, so an empty
    /// sequence yields the empty string.
    pub fn evaluate(&mut self, postfix: &PostfixSequence) -> Result<String, EvalError> {
        self.metrics = EvaluationMetrics::default();

        let result = self.run(postfix);
        if let Err(error) = &result {
            if self.preferences.log_failures {
                log_debug!(code = error.error_code(), "Expression evaluation failed",
                    "error" => error,
                    "postfix" => postfix
                );
            }
        }
        result
    }

    fn run(&mut self, postfix: &PostfixSequence) -> Result<String, EvalError> {
        // The placeholder token must never reach the resolver
        if postfix.is_sentinel() {
            return Err(EvalError::Unconvertible);
        }

        let mut stack: Vec<StackValue> = Vec::new();
        // Each ':' opens a pending conditional, each '?' settles one
        let mut ternary_balance: i64 = 0;

        for token in postfix {
            match token {
                Token::Literal(text) => {
                    stack.push(StackValue::Value(self.decode_literal(token, text)?));
                }
                Token::Symbol(text) | Token::Unknown(text) => {
                    stack.push(StackValue::Value(self.resolve(text)?));
                }
                Token::OpenArray => stack.push(StackValue::ArrayOpen),
                Token::CloseArray => {
                    let array = collect_array(&mut stack)?;
                    self.metrics.arrays_built += 1;
                    stack.push(StackValue::Value(array));
                }
                Token::Operator(Operator::Question) => ternary_balance -= 1,
                Token::Operator(Operator::Colon) => {
                    let when_false = pop_value(&mut stack, Operator::Colon)?;
                    let when_true = pop_value(&mut stack, Operator::Colon)?;
                    let condition = pop_value(&mut stack, Operator::Colon)?;
                    stack.push(StackValue::Value(select_branch(
                        &condition, when_true, when_false,
                    )?));
                    ternary_balance += 1;
                    self.metrics.operators_applied += 1;
                }
                Token::Operator(op) => {
                    let result = match op.arity() {
                        Arity::Unary => {
                            let operand = pop_value(&mut stack, *op)?;
                            apply_unary(*op, &operand)?
                        }
                        Arity::Binary | Arity::Ternary => {
                            let right = pop_value(&mut stack, *op)?;
                            let left = pop_value(&mut stack, *op)?;
                            apply_binary(*op, &left, &right)?
                        }
                    };
                    stack.push(StackValue::Value(result));
                    self.metrics.operators_applied += 1;
                }
                Token::OpenParen | Token::CloseParen | Token::Comma => {
                    return Err(EvalError::UnsupportedOperator {
                        operator: token.to_string(),
                    })
                }
            }
            self.metrics.max_stack_depth = self.metrics.max_stack_depth.max(stack.len());
        }

        if ternary_balance != 0 {
            return Err(EvalError::UnbalancedTernary {
                balance: ternary_balance,
            });
        }

        let mut value = String::new();
        for entry in stack {
            match entry {
                StackValue::Value(text) => value.push_str(&text),
                StackValue::ArrayOpen => return Err(EvalError::UnterminatedArray),
            }
        }
        Ok(value)
    }

    fn decode_literal(&mut self, token: &Token, text: &str) -> Result<String, EvalError> {
        self.metrics.literals_decoded += 1;

        match token.literal_kind() {
            Some(LiteralKind::Boolean) => {
                let value = if text.eq_ignore_ascii_case("true") { "1" } else { "0" };
                Ok(value.to_string())
            }
            Some(LiteralKind::Text) => Ok(text.to_string()),
            _ => numeric::parse_constant(text).ok_or_else(|| EvalError::InvalidConstant {
                text: text.to_string(),
            }),
        }
    }

    /// Substitute a symbol's value, or read unrecognised text as a constant
    fn resolve(&mut self, text: &str) -> Result<String, EvalError> {
        if self.resolver.is_symbol(text) {
            let value = self.resolver.resolve(text);
            if contains_sentinel(&value) {
                return Err(EvalError::InvalidSymbolValue {
                    symbol: text.to_string(),
                });
            }
            self.metrics.symbols_resolved += 1;
            return Ok(value);
        }

        numeric::parse_constant(text).ok_or_else(|| EvalError::InvalidConstant {
            text: text.to_string(),
        })
    }
}

fn pop_value(stack: &mut Vec<StackValue>, op: Operator) -> Result<String, EvalError> {
    match stack.pop() {
        Some(StackValue::Value(value)) => Ok(value),
        _ => Err(EvalError::MissingOperand {
            operator: op.to_string(),
        }),
    }
}

/// Pop elements down to the nearest open marker and render `{a,b,...}`
fn collect_array(stack: &mut Vec<StackValue>) -> Result<String, EvalError> {
    let mut elements = Vec::new();
    loop {
        match stack.pop() {
            Some(StackValue::Value(value)) => elements.push(value),
            Some(StackValue::ArrayOpen) => break,
            None => return Err(EvalError::UnterminatedArray),
        }
    }
    elements.reverse();
    Ok(format!("{{{}}}", elements.join(",")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexical::to_postfix;
    use crate::symbols::{NoSymbols, SymbolTable};
    use assert_matches::assert_matches;

    fn eval(expression: &str) -> Result<String, EvalError> {
        Evaluator::new(&NoSymbols).evaluate(&to_postfix(expression))
    }

    #[test]
    fn test_literals() {
        assert_eq!(eval("8'hFF").unwrap(), "255");
        assert_eq!(eval("TRUE").unwrap(), "1");
        assert_eq!(eval("false").unwrap(), "0");
        assert_eq!(eval("\"text\"").unwrap(), "\"text\"");
        assert_eq!(eval("").unwrap(), "");
    }

    #[test]
    fn test_arrays() {
        assert_eq!(eval("{1,1}").unwrap(), "{1,1}");
        assert_eq!(eval("{1+1, 2*3}").unwrap(), "{2,6}");
        assert_eq!(eval("{{1},2}").unwrap(), "{{1},2}");
        assert_eq!(eval("{}").unwrap(), "{}");
    }

    #[test]
    fn test_ternary() {
        assert_eq!(eval("1 ? 2 : 3").unwrap(), "2");
        assert_eq!(eval("0 ? 2 : 0 ? 3 : 4").unwrap(), "4");
        assert_matches!(eval("1 ? 2"), Err(EvalError::UnbalancedTernary { balance: -1 }));
        assert_matches!(eval("1 : 2"), Err(EvalError::MissingOperand { .. }));
    }

    #[test]
    fn test_failures() {
        assert_matches!(eval("ff"), Err(EvalError::InvalidConstant { .. }));
        assert_matches!(eval("(1"), Err(EvalError::Unconvertible));
        assert_matches!(eval("1 +"), Err(EvalError::MissingOperand { .. }));
        assert_matches!(eval("1/0"), Err(EvalError::DivisionByZero { .. }));
        assert_matches!(eval("{1}+1"), Err(EvalError::NonNumericOperand { .. }));
    }

    #[test]
    fn test_unbalanced_array_markers() {
        let postfix = PostfixSequence::new(vec![Token::OpenArray, Token::Literal("1".to_string())]);
        assert_matches!(
            Evaluator::new(&NoSymbols).evaluate(&postfix),
            Err(EvalError::UnterminatedArray)
        );

        let postfix = PostfixSequence::new(vec![Token::CloseArray]);
        assert_matches!(
            Evaluator::new(&NoSymbols).evaluate(&postfix),
            Err(EvalError::UnterminatedArray)
        );
    }

    #[test]
    fn test_symbols_substitute_values() {
        let mut table = SymbolTable::new();
        table.define("width", "8").unwrap();
        table.define("broken", "1/0").unwrap();

        let mut evaluator = Evaluator::new(&table);
        assert_eq!(evaluator.evaluate(&to_postfix("width * 2")).unwrap(), "16");
        assert_eq!(evaluator.metrics().symbols_resolved, 1);

        assert_matches!(
            evaluator.evaluate(&to_postfix("broken + 1")),
            Err(EvalError::InvalidSymbolValue { .. })
        );
    }

    #[test]
    fn test_failed_conversion_never_resolves() {
        let mut table = SymbolTable::new();
        table.define("x", "5").unwrap();

        let mut evaluator = Evaluator::new(&table);
        assert_matches!(
            evaluator.evaluate(&PostfixSequence::sentinel()),
            Err(EvalError::Unconvertible)
        );
        assert_eq!(evaluator.metrics().symbols_resolved, 0);
        assert_eq!(evaluator.evaluate(&to_postfix("x + 1")).unwrap(), "6");
    }

    #[test]
    fn test_metrics() {
        let mut evaluator = Evaluator::new(&NoSymbols);
        evaluator.evaluate(&to_postfix("{1+2, 3}")).unwrap();

        let metrics = evaluator.metrics();
        assert_eq!(metrics.literals_decoded, 3);
        assert_eq!(metrics.operators_applied, 1);
        assert_eq!(metrics.arrays_built, 1);
        assert_eq!(metrics.max_stack_depth, 3);
    }
}
