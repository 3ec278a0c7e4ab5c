//! Pair and list primitives

use std::rc::Rc;

use rustc_hash::FxHashSet;

use crate::error::RuntimeError;
use crate::interpreter::Interpreter;
use crate::value::{Arity, Pair, Value};

use super::{Builtins, arg};

pub fn register(builtins: &mut Builtins) {
    builtins
        .define_native("pair", Arity::Exact(2), pair)
        .define_native("head", Arity::Exact(1), head)
        .define_native("tail", Arity::Exact(1), tail)
        .define_native("set_head", Arity::Exact(2), set_head)
        .define_native("set_tail", Arity::Exact(2), set_tail)
        .define_native("is_pair", Arity::Exact(1), is_pair)
        .define_native("is_null", Arity::Exact(1), is_null)
        .define_native("is_list", Arity::Exact(1), is_list)
        .define_native("list", Arity::Minimum(0), list);
}

fn expect_pair(name: &str, value: &Value) -> Result<Rc<Pair>, RuntimeError> {
    match value {
        Value::Pair(p) => Ok(Rc::clone(p)),
        other => Err(RuntimeError::builtin(
            name,
            format!("expected a pair, got {}", other.stringify()),
        )),
    }
}

pub fn pair(_interp: &mut Interpreter, args: &[Value]) -> Result<Value, RuntimeError> {
    Ok(Value::pair(arg(args, 0), arg(args, 1)))
}

pub fn head(_interp: &mut Interpreter, args: &[Value]) -> Result<Value, RuntimeError> {
    Ok(expect_pair("head", &arg(args, 0))?.head())
}

pub fn tail(_interp: &mut Interpreter, args: &[Value]) -> Result<Value, RuntimeError> {
    Ok(expect_pair("tail", &arg(args, 0))?.tail())
}

pub fn set_head(_interp: &mut Interpreter, args: &[Value]) -> Result<Value, RuntimeError> {
    expect_pair("set_head", &arg(args, 0))?.set_head(arg(args, 1));
    Ok(Value::Undefined)
}

pub fn set_tail(_interp: &mut Interpreter, args: &[Value]) -> Result<Value, RuntimeError> {
    expect_pair("set_tail", &arg(args, 0))?.set_tail(arg(args, 1));
    Ok(Value::Undefined)
}

pub fn is_pair(_interp: &mut Interpreter, args: &[Value]) -> Result<Value, RuntimeError> {
    Ok(Value::Boolean(matches!(arg(args, 0), Value::Pair(_))))
}

pub fn is_null(_interp: &mut Interpreter, args: &[Value]) -> Result<Value, RuntimeError> {
    Ok(Value::Boolean(matches!(arg(args, 0), Value::Null)))
}

/// A list is `null` or a pair whose tail is a list. Circular tails are not
/// lists.
pub fn is_list(_interp: &mut Interpreter, args: &[Value]) -> Result<Value, RuntimeError> {
    let mut seen = FxHashSet::default();
    let mut current = arg(args, 0);
    loop {
        match current {
            Value::Null => return Ok(Value::Boolean(true)),
            Value::Pair(p) => {
                if !seen.insert(Rc::as_ptr(&p)) {
                    return Ok(Value::Boolean(false));
                }
                current = p.tail();
            }
            _ => return Ok(Value::Boolean(false)),
        }
    }
}

pub fn list(_interp: &mut Interpreter, args: &[Value]) -> Result<Value, RuntimeError> {
    Ok(Value::list(args.iter().cloned()))
}
