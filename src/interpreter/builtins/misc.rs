//! Display, type predicates and miscellaneous builtins

use crate::error::RuntimeError;
use crate::interpreter::Interpreter;
use crate::value::{Arity, Callee, Value};

use super::{Builtins, arg, number_arg, string_arg};

pub fn register(builtins: &mut Builtins) {
    builtins
        .define_native("display", Arity::Minimum(1), display)
        .define_native("raw_display", Arity::Minimum(1), raw_display)
        .define_native("stringify", Arity::Exact(1), stringify)
        .define_native("error", Arity::Minimum(1), error)
        .define_native("is_number", Arity::Exact(1), is_number)
        .define_native("is_string", Arity::Exact(1), is_string)
        .define_native("is_function", Arity::Exact(1), is_function)
        .define_native("is_boolean", Arity::Exact(1), is_boolean)
        .define_native("is_undefined", Arity::Exact(1), is_undefined)
        .define_native("is_cont", Arity::Exact(1), is_cont)
        .define_native("arity", Arity::Exact(1), arity)
        .define_native("parse_int", Arity::Exact(2), parse_int)
        .define_native("char_at", Arity::Exact(2), char_at)
        .define_native("get_time", Arity::Exact(0), get_time)
        .define_constant("undefined", Value::Undefined)
        .define_constant("NaN", Value::Number(f64::NAN))
        .define_constant("Infinity", Value::Number(f64::INFINITY));
}

/// `"prefix text"` when a string prefix was given, else `text`.
fn with_prefix(name: &str, args: &[Value], text: String) -> Result<String, RuntimeError> {
    if args.len() < 2 {
        return Ok(text);
    }
    let prefix = string_arg(name, args, 1)?;
    Ok(format!("{prefix} {text}"))
}

/// `display(v)` / `display(v, prefix)`: print `v` stringified, return `v`.
pub fn display(interp: &mut Interpreter, args: &[Value]) -> Result<Value, RuntimeError> {
    let value = arg(args, 0);
    let line = with_prefix("display", args, value.stringify())?;
    interp.console().write(&line);
    Ok(value)
}

/// Like `display` but strings are printed without quotes.
pub fn raw_display(interp: &mut Interpreter, args: &[Value]) -> Result<Value, RuntimeError> {
    let value = arg(args, 0);
    let line = with_prefix("raw_display", args, value.to_display_string())?;
    interp.console().write(&line);
    Ok(value)
}

pub fn stringify(_interp: &mut Interpreter, args: &[Value]) -> Result<Value, RuntimeError> {
    Ok(Value::from(arg(args, 0).stringify()))
}

/// `error(v)` / `error(v, prefix)`: abort the program with a runtime error.
pub fn error(_interp: &mut Interpreter, args: &[Value]) -> Result<Value, RuntimeError> {
    let message = with_prefix("error", args, arg(args, 0).to_display_string())?;
    Err(RuntimeError::builtin("error", message))
}

pub fn is_number(_interp: &mut Interpreter, args: &[Value]) -> Result<Value, RuntimeError> {
    Ok(Value::Boolean(matches!(arg(args, 0), Value::Number(_))))
}

pub fn is_string(_interp: &mut Interpreter, args: &[Value]) -> Result<Value, RuntimeError> {
    Ok(Value::Boolean(matches!(arg(args, 0), Value::String(_))))
}

pub fn is_function(_interp: &mut Interpreter, args: &[Value]) -> Result<Value, RuntimeError> {
    Ok(Value::Boolean(arg(args, 0).is_function()))
}

pub fn is_boolean(_interp: &mut Interpreter, args: &[Value]) -> Result<Value, RuntimeError> {
    Ok(Value::Boolean(matches!(arg(args, 0), Value::Boolean(_))))
}

pub fn is_undefined(_interp: &mut Interpreter, args: &[Value]) -> Result<Value, RuntimeError> {
    Ok(Value::Boolean(matches!(arg(args, 0), Value::Undefined)))
}

pub fn is_cont(_interp: &mut Interpreter, args: &[Value]) -> Result<Value, RuntimeError> {
    Ok(Value::Boolean(matches!(arg(args, 0), Value::Continuation(_))))
}

/// Number of required parameters; rest parameters are not counted.
pub fn arity(_interp: &mut Interpreter, args: &[Value]) -> Result<Value, RuntimeError> {
    let value = arg(args, 0);
    let count = match value.as_callee() {
        Some(Callee::Closure(c)) => c.arity().required(),
        Some(Callee::Builtin(b)) => b.arity.required(),
        Some(Callee::Continuation(_)) => 1,
        None => {
            return Err(RuntimeError::builtin(
                "arity",
                format!("expected a function, got {}", value.type_name()),
            ));
        }
    };
    Ok(Value::Number(count as f64))
}

/// `parse_int(str, radix)`: the whole string (after trimming whitespace)
/// must be an optionally signed integer in `radix`, otherwise `NaN`.
pub fn parse_int(_interp: &mut Interpreter, args: &[Value]) -> Result<Value, RuntimeError> {
    let text = string_arg("parse_int", args, 0)?;
    let radix = number_arg("parse_int", args, 1)?;
    if radix.fract() != 0.0 || !(2.0..=36.0).contains(&radix) {
        return Err(RuntimeError::builtin(
            "parse_int",
            "radix must be an integer between 2 and 36",
        ));
    }
    let radix = radix as u32;

    let text = text.trim();
    let (negative, digits) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text.strip_prefix('+').unwrap_or(text)),
    };
    if digits.is_empty() {
        return Ok(Value::Number(f64::NAN));
    }

    let mut result = 0.0_f64;
    for ch in digits.chars() {
        match ch.to_digit(radix) {
            Some(d) => result = result * f64::from(radix) + f64::from(d),
            None => return Ok(Value::Number(f64::NAN)),
        }
    }
    Ok(Value::Number(if negative { -result } else { result }))
}

/// `char_at(str, i)`: the character at index `i`, or `undefined` past the end.
pub fn char_at(_interp: &mut Interpreter, args: &[Value]) -> Result<Value, RuntimeError> {
    let text = string_arg("char_at", args, 0)?;
    let index = number_arg("char_at", args, 1)?;
    if index.fract() != 0.0 || index < 0.0 {
        return Err(RuntimeError::builtin(
            "char_at",
            "index must be a non-negative integer",
        ));
    }
    Ok(text
        .chars()
        .nth(index as usize)
        .map_or(Value::Undefined, |c| Value::from(c.to_string())))
}

/// Milliseconds since the Unix epoch.
pub fn get_time(interp: &mut Interpreter, _args: &[Value]) -> Result<Value, RuntimeError> {
    Ok(Value::Number(interp.time().now_millis() as f64))
}
