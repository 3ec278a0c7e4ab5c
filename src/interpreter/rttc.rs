//! Runtime type checks and operator evaluation
//!
//! Operands are checked after they are fully reduced and before the
//! operation is computed. A failed check is a [`RuntimeError::TypeError`].

use std::cmp::Ordering;

use crate::ast::{BinaryOp, UnaryOp};
use crate::error::RuntimeError;
use crate::lexer::Span;
use crate::value::{SourceString, Value};

const LEFT: &str = " on left hand side of operation";
const RIGHT: &str = " on right hand side of operation";
const CONDITION: &str = " as condition";

fn type_error(expected: &'static str, position: &'static str, got: &Value, span: Span) -> RuntimeError {
    RuntimeError::TypeError {
        expected,
        position,
        got: got.type_name(),
        span,
    }
}

fn number(value: &Value, position: &'static str, span: Span) -> Result<f64, RuntimeError> {
    value
        .as_number()
        .ok_or_else(|| type_error("number", position, value, span))
}

/// Guard of `if`, `?:`, `&&` and `||`.
pub fn condition(value: &Value, span: Span) -> Result<bool, RuntimeError> {
    value
        .as_bool()
        .ok_or_else(|| type_error("boolean", CONDITION, value, span))
}

pub fn unary(operator: UnaryOp, operand: &Value, span: Span) -> Result<Value, RuntimeError> {
    match operator {
        UnaryOp::Not => operand
            .as_bool()
            .map(|b| Value::Boolean(!b))
            .ok_or_else(|| type_error("boolean", "", operand, span)),
        UnaryOp::Minus => Ok(Value::Number(-number(operand, "", span)?)),
        UnaryOp::Plus => Ok(Value::Number(number(operand, "", span)?)),
        UnaryOp::Typeof => Err(RuntimeError::unsupported("typeof operator", span)),
    }
}

/// Operands of `+` and the comparisons: both numbers or both strings.
enum Comparable<'a> {
    Numbers(f64, f64),
    Strings(&'a SourceString, &'a SourceString),
}

fn comparable<'a>(left: &'a Value, right: &'a Value, span: Span) -> Result<Comparable<'a>, RuntimeError> {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => Ok(Comparable::Numbers(*a, *b)),
        (Value::String(a), Value::String(b)) => Ok(Comparable::Strings(a, b)),
        (Value::Number(_), _) => Err(type_error("number", RIGHT, right, span)),
        (Value::String(_), _) => Err(type_error("string", RIGHT, right, span)),
        _ => Err(type_error("string or number", LEFT, left, span)),
    }
}

pub fn binary(operator: BinaryOp, left: &Value, right: &Value, span: Span) -> Result<Value, RuntimeError> {
    let arithmetic = |op: fn(f64, f64) -> f64| -> Result<Value, RuntimeError> {
        let a = number(left, LEFT, span)?;
        let b = number(right, RIGHT, span)?;
        Ok(Value::Number(op(a, b)))
    };
    let compare = |test: fn(Ordering) -> bool| -> Result<Value, RuntimeError> {
        let ordering = match comparable(left, right, span)? {
            Comparable::Numbers(a, b) => a.partial_cmp(&b),
            Comparable::Strings(a, b) => Some(a.as_str().cmp(b.as_str())),
        };
        // comparisons with NaN are false
        Ok(Value::Boolean(ordering.is_some_and(test)))
    };

    match operator {
        BinaryOp::Add => Ok(match comparable(left, right, span)? {
            Comparable::Numbers(a, b) => Value::Number(a + b),
            Comparable::Strings(a, b) => {
                let mut joined = String::with_capacity(a.len() + b.len());
                joined.push_str(a.as_str());
                joined.push_str(b.as_str());
                Value::from(joined)
            }
        }),
        BinaryOp::Sub => arithmetic(|a, b| a - b),
        BinaryOp::Mul => arithmetic(|a, b| a * b),
        BinaryOp::Div => arithmetic(|a, b| a / b),
        BinaryOp::Mod => arithmetic(|a, b| a % b),
        BinaryOp::Lt => compare(Ordering::is_lt),
        BinaryOp::LtEq => compare(Ordering::is_le),
        BinaryOp::Gt => compare(Ordering::is_gt),
        BinaryOp::GtEq => compare(Ordering::is_ge),
        BinaryOp::StrictEq => Ok(Value::Boolean(left.strict_equals(right))),
        BinaryOp::StrictNotEq => Ok(Value::Boolean(!left.strict_equals(right))),
        BinaryOp::Eq | BinaryOp::NotEq => Err(RuntimeError::unsupported(
            format!("{operator} operator"),
            span,
        )),
    }
}
