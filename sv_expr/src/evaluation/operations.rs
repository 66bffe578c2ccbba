//! Operator semantics over value strings
//!
//! Each function takes operands in their textual form and returns the
//! textual result. Integers stay exact (checked `i64`), anything with a
//! decimal point is computed in `f64` and rendered with the larger of the
//! operands' decimal-digit counts.

use super::EvalError;
use crate::grammar::Operator;
use crate::numeric::{format_general, format_real, Number};
use std::cmp::Ordering;

// ============================================================================
// BINARY OPERATORS
// ============================================================================

pub fn apply_binary(op: Operator, left: &str, right: &str) -> Result<String, EvalError> {
    if is_quoted(left) && is_quoted(right) {
        return compare_strings(op, left, right);
    }

    let l = operand(op, left)?;
    let r = operand(op, right)?;

    if op.requires_integers() {
        let a = integer_operand(op, l, left)?;
        let b = integer_operand(op, r, right)?;
        return integer_operation(op, a, b);
    }

    match op {
        Operator::Add | Operator::Subtract | Operator::Multiply => arithmetic(op, l, r),
        Operator::Divide => divide(l, r),
        Operator::Power | Operator::Pow => power(op, l, r),
        Operator::LogicalOr => Ok(truth(l.is_truthy() || r.is_truthy())),
        Operator::LogicalAnd => Ok(truth(l.is_truthy() && r.is_truthy())),
        _ if op.is_comparison() => Ok(truth(compare(op, l, r))),
        _ => Err(EvalError::UnsupportedOperator {
            operator: op.to_string(),
        }),
    }
}

fn arithmetic(op: Operator, l: Number, r: Number) -> Result<String, EvalError> {
    if let (Number::Integer(a), Number::Integer(b)) = (l, r) {
        let result = match op {
            Operator::Add => a.checked_add(b),
            Operator::Subtract => a.checked_sub(b),
            _ => a.checked_mul(b),
        };
        return result
            .map(|value| value.to_string())
            .ok_or_else(|| overflow(op));
    }

    let (a, b) = (l.as_f64(), r.as_f64());
    let value = match op {
        Operator::Add => a + b,
        Operator::Subtract => a - b,
        _ => a * b,
    };
    real_result(op, value, l.precision().max(r.precision()))
}

/// Division truncates whenever the dividend is an integer
fn divide(l: Number, r: Number) -> Result<String, EvalError> {
    if r.as_f64() == 0.0 {
        return Err(EvalError::DivisionByZero {
            operator: Operator::Divide.to_string(),
        });
    }

    match (l, r) {
        (Number::Integer(a), Number::Integer(b)) => a
            .checked_div(b)
            .map(|value| value.to_string())
            .ok_or_else(|| overflow(Operator::Divide)),
        (Number::Integer(a), Number::Real { value: b, .. }) => {
            truncated(Operator::Divide, a as f64 / b)
        }
        (Number::Real { value: a, .. }, _) => real_result(
            Operator::Divide,
            a / r.as_f64(),
            l.precision().max(r.precision()),
        ),
    }
}

/// `**` and `$pow`; a negative exponent on an integer base truncates
fn power(op: Operator, l: Number, r: Number) -> Result<String, EvalError> {
    let exponent = r.as_f64();
    if l.as_f64() == 0.0 && exponent < 0.0 {
        return Err(EvalError::DomainError {
            operator: op.to_string(),
            operand: "0".to_string(),
        });
    }

    if let (Number::Integer(base), Number::Integer(exp)) = (l, r) {
        if exp >= 0 {
            return u32::try_from(exp)
                .ok()
                .and_then(|exp| base.checked_pow(exp))
                .map(|value| value.to_string())
                .ok_or_else(|| overflow(op));
        }
    }

    let base = l.as_f64();
    let value = match r {
        Number::Integer(exp) => match i32::try_from(exp) {
            Ok(exp) => base.powi(exp),
            Err(_) => base.powf(exponent),
        },
        Number::Real { value, .. } => base.powf(value),
    };

    if value.is_nan() {
        return Err(EvalError::DomainError {
            operator: op.to_string(),
            operand: exponent.to_string(),
        });
    }

    if !l.is_real() && exponent < 0.0 {
        truncated(op, value)
    } else {
        real_result(op, value, l.precision().max(r.precision()))
    }
}

fn compare(op: Operator, l: Number, r: Number) -> bool {
    let ordering = match (l, r) {
        (Number::Integer(a), Number::Integer(b)) => Some(a.cmp(&b)),
        _ => l.as_f64().partial_cmp(&r.as_f64()),
    };

    match (op, ordering) {
        (Operator::Equal | Operator::CaseEqual, Some(order)) => order == Ordering::Equal,
        (Operator::NotEqual | Operator::CaseNotEqual, order) => order != Some(Ordering::Equal),
        (Operator::Less, Some(order)) => order == Ordering::Less,
        (Operator::LessEqual, Some(order)) => order != Ordering::Greater,
        (Operator::Greater, Some(order)) => order == Ordering::Greater,
        (Operator::GreaterEqual, Some(order)) => order != Ordering::Less,
        _ => false,
    }
}

fn integer_operation(op: Operator, a: i64, b: i64) -> Result<String, EvalError> {
    let value = match op {
        Operator::Modulo => {
            if b == 0 {
                return Err(EvalError::DivisionByZero {
                    operator: op.to_string(),
                });
            }
            a.checked_rem(b).ok_or_else(|| overflow(op))?
        }
        Operator::ShiftLeft | Operator::ShiftRight => {
            let amount = u32::try_from(b).ok().filter(|amount| *amount < i64::BITS);
            let Some(amount) = amount else {
                return Err(EvalError::DomainError {
                    operator: op.to_string(),
                    operand: b.to_string(),
                });
            };
            if op == Operator::ShiftLeft {
                a.checked_shl(amount).ok_or_else(|| overflow(op))?
            } else {
                a.checked_shr(amount).ok_or_else(|| overflow(op))?
            }
        }
        Operator::BitAnd => a & b,
        Operator::BitOr => a | b,
        Operator::BitXor => a ^ b,
        _ => {
            return Err(EvalError::UnsupportedOperator {
                operator: op.to_string(),
            })
        }
    };

    Ok(value.to_string())
}

fn compare_strings(op: Operator, left: &str, right: &str) -> Result<String, EvalError> {
    match op {
        Operator::Equal | Operator::CaseEqual => Ok(truth(left == right)),
        Operator::NotEqual | Operator::CaseNotEqual => Ok(truth(left != right)),
        _ => Err(EvalError::UnsupportedStringOperation {
            operator: op.to_string(),
        }),
    }
}

// ============================================================================
// UNARY OPERATORS
// ============================================================================

pub fn apply_unary(op: Operator, text: &str) -> Result<String, EvalError> {
    let value = operand(op, text)?;

    match op {
        Operator::Negate => match value {
            Number::Integer(i) => i
                .checked_neg()
                .map(|negated| negated.to_string())
                .ok_or_else(|| overflow(op)),
            Number::Real { value, precision } => Ok(format_real(-value, precision)),
        },
        Operator::BitNot => Ok((!integer_operand(op, value, text)?).to_string()),
        Operator::Clog2 => clog2(value.as_f64()),
        Operator::Exp => {
            let result = value.as_f64().exp();
            if !result.is_finite() {
                return Err(overflow(op));
            }
            Ok(format_general(result))
        }
        Operator::Sqrt => {
            let n = value.as_f64();
            if n < 0.0 {
                return Err(EvalError::DomainError {
                    operator: op.to_string(),
                    operand: text.to_string(),
                });
            }
            Ok(format_general(n.sqrt()))
        }
        _ => Err(EvalError::UnsupportedOperator {
            operator: op.to_string(),
        }),
    }
}

/// Ceiling of log2 by repeated halving; 1 maps to 1
fn clog2(n: f64) -> Result<String, EvalError> {
    if n < 0.0 {
        return Err(EvalError::DomainError {
            operator: Operator::Clog2.to_string(),
            operand: n.to_string(),
        });
    }
    if n == 1.0 {
        return Ok("1".to_string());
    }

    let mut remaining = n;
    let mut bits = 0u32;
    while remaining > 1.0 {
        remaining /= 2.0;
        bits += 1;
    }
    Ok(bits.to_string())
}

// ============================================================================
// TERNARY
// ============================================================================

/// Pick a branch of `condition ? when_true : when_false`
pub fn select_branch(
    condition: &str,
    when_true: String,
    when_false: String,
) -> Result<String, EvalError> {
    let condition = operand(Operator::Question, condition)?;
    Ok(if condition.is_truthy() {
        when_true
    } else {
        when_false
    })
}

// ============================================================================
// HELPERS
// ============================================================================

fn is_quoted(text: &str) -> bool {
    text.len() >= 2 && text.starts_with('"') && text.ends_with('"')
}

fn operand(op: Operator, text: &str) -> Result<Number, EvalError> {
    Number::parse(text).ok_or_else(|| EvalError::NonNumericOperand {
        operator: op.to_string(),
        operand: text.to_string(),
    })
}

fn integer_operand(op: Operator, value: Number, text: &str) -> Result<i64, EvalError> {
    value.as_integer().ok_or_else(|| EvalError::NonIntegerOperand {
        operator: op.to_string(),
        operand: text.to_string(),
    })
}

fn truth(value: bool) -> String {
    let text = if value { "1" } else { "0" };
    text.to_string()
}

fn overflow(op: Operator) -> EvalError {
    EvalError::ArithmeticOverflow {
        operator: op.to_string(),
    }
}

fn real_result(op: Operator, value: f64, precision: usize) -> Result<String, EvalError> {
    if !value.is_finite() {
        return Err(overflow(op));
    }
    Ok(format_real(value, precision))
}

/// Integer rendering of a real result, rounding toward zero
fn truncated(op: Operator, value: f64) -> Result<String, EvalError> {
    let value = value.trunc();
    if !value.is_finite() || value.abs() >= i64::MAX as f64 {
        return Err(overflow(op));
    }
    Ok((value as i64).to_string())
}
