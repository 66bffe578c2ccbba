//! Public expression entry points
//!
//! Ties the converter and the evaluator together behind the four queries
//! callers need: evaluate an expression, check whether it is an array,
//! check whether it is already a plain value, and find its display base.

use crate::config::runtime::EvaluationPreferences;
use crate::evaluation::{contains_sentinel, EvalError, Evaluation, EvaluationMetrics, Evaluator};
use crate::grammar::{self, structural};
use crate::lexical::{ConversionMetrics, PostfixConverter};
use crate::logging::{self, codes};
use crate::numeric;
use crate::symbols::{NoSymbols, SymbolResolver};
use crate::tokens::{PostfixSequence, Token};
use crate::{log_debug, log_performance};
use std::time::Instant;

/// Expression parser bound to one symbol resolver
///
/// Keeps the metrics of the most recent call for diagnostics.
pub struct ExpressionParser<'a, R: SymbolResolver + ?Sized> {
    resolver: &'a R,
    preferences: EvaluationPreferences,
    conversion_metrics: ConversionMetrics,
    evaluation_metrics: EvaluationMetrics,
}

impl<'a, R: SymbolResolver + ?Sized> ExpressionParser<'a, R> {
    pub fn new(resolver: &'a R) -> Self {
        Self::with_preferences(resolver, EvaluationPreferences::default())
    }

    pub fn with_preferences(resolver: &'a R, preferences: EvaluationPreferences) -> Self {
        Self {
            resolver,
            preferences,
            conversion_metrics: ConversionMetrics::default(),
            evaluation_metrics: EvaluationMetrics::default(),
        }
    }

    pub fn conversion_metrics(&self) -> &ConversionMetrics {
        &self.conversion_metrics
    }

    pub fn evaluation_metrics(&self) -> &EvaluationMetrics {
        &self.evaluation_metrics
    }

    /// Evaluate to the outward `(value, is_valid)` pair
    pub fn parse(&mut self, expression: &str) -> Evaluation {
        self.try_parse(expression).into()
    }

    /// Evaluate, reporting why the expression has no value
    pub fn try_parse(&mut self, expression: &str) -> Result<String, EvalError> {
        logging::with_expression_context(expression, || {
            let started = Instant::now();

            let mut converter = PostfixConverter::with_preferences(self.preferences.clone());
            let converted = converter.convert(expression);
            self.conversion_metrics = converter.metrics().clone();

            let postfix = match converted {
                Ok(postfix) => postfix,
                Err(error) => {
                    if self.preferences.log_failures {
                        log_debug!(code = error.error_code(), "Expression could not be converted",
                            "error" => &error
                        );
                    }
                    return Err(error.into());
                }
            };

            let mut evaluator =
                Evaluator::with_preferences(self.resolver, self.preferences.clone());
            let evaluated = evaluator.evaluate(&postfix);
            self.evaluation_metrics = evaluator.metrics().clone();

            let value = evaluated?;
            if contains_sentinel(&value) {
                return Err(EvalError::InvalidConstant { text: value });
            }

            if self.preferences.log_performance {
                log_performance!(codes::success::EVALUATION_COMPLETE, "Expression evaluated",
                    duration = started.elapsed(),
                    "tokens" => postfix.len(),
                    "operators" => self.evaluation_metrics.operators_applied
                );
            }

            Ok(value)
        })
    }

    /// Postfix form, or the sentinel sequence when conversion fails
    pub fn to_postfix(&self, expression: &str) -> PostfixSequence {
        PostfixConverter::with_preferences(self.preferences.clone()).to_postfix(expression)
    }

    /// Greatest base of any literal or symbol in the expression, 0 if none
    pub fn base_for_expression(&self, expression: &str) -> u32 {
        base_for_postfix(&self.to_postfix(expression), self.resolver)
    }
}

/// Greatest display base over the numeric literals and known symbols of a
/// postfix sequence
pub fn base_for_postfix<R>(postfix: &PostfixSequence, resolver: &R) -> u32
where
    R: SymbolResolver + ?Sized,
{
    if postfix.is_sentinel() {
        return 0;
    }

    postfix
        .iter()
        .map(|token| match token {
            Token::Literal(text) if numeric::is_literal(text) => numeric::base_of(text),
            Token::Symbol(text) | Token::Unknown(text) if resolver.is_symbol(text) => {
                resolver.base_for_symbol(text)
            }
            _ => 0,
        })
        .max()
        .unwrap_or(0)
}

// ============================================================================
// MODULE API
// ============================================================================

/// Evaluate an expression that references no symbols
pub fn parse_expression(expression: &str) -> Evaluation {
    ExpressionParser::new(&NoSymbols).parse(expression)
}

/// Evaluate an expression against a resolver
pub fn parse_expression_with<R>(expression: &str, resolver: &R) -> Evaluation
where
    R: SymbolResolver + ?Sized,
{
    ExpressionParser::new(resolver).parse(expression)
}

pub fn try_parse_expression(expression: &str) -> Result<String, EvalError> {
    ExpressionParser::new(&NoSymbols).try_parse(expression)
}

/// Cheap syntactic check: the text contains both array braces
pub fn is_array_expression(expression: &str) -> bool {
    expression.contains(structural::OPEN_ARRAY) && expression.contains(structural::CLOSE_ARRAY)
}

/// True for empty text, a single numeric literal or a quoted string
pub fn is_plain_value(expression: &str) -> bool {
    expression.is_empty()
        || numeric::is_literal(expression)
        || grammar::is_string_literal(expression)
}

pub fn base_for_expression(expression: &str) -> u32 {
    ExpressionParser::new(&NoSymbols).base_for_expression(expression)
}

pub fn base_for_expression_with<R>(expression: &str, resolver: &R) -> u32
where
    R: SymbolResolver + ?Sized,
{
    ExpressionParser::new(resolver).base_for_expression(expression)
}
