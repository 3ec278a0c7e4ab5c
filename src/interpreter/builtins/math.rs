//! `math_*` builtins and numeric constants

use crate::error::RuntimeError;
use crate::interpreter::Interpreter;
use crate::value::{Arity, Value};

use super::{Builtins, number_arg};

pub fn register(builtins: &mut Builtins) {
    builtins
        .define_constant("math_PI", Value::Number(std::f64::consts::PI))
        .define_constant("math_E", Value::Number(std::f64::consts::E))
        .define_constant("math_LN2", Value::Number(std::f64::consts::LN_2))
        .define_constant("math_LN10", Value::Number(std::f64::consts::LN_10))
        .define_constant("math_SQRT2", Value::Number(std::f64::consts::SQRT_2));

    // Rounding
    builtins
        .define_native("math_abs", Arity::Exact(1), math_abs)
        .define_native("math_floor", Arity::Exact(1), math_floor)
        .define_native("math_ceil", Arity::Exact(1), math_ceil)
        .define_native("math_round", Arity::Exact(1), math_round)
        .define_native("math_trunc", Arity::Exact(1), math_trunc)
        .define_native("math_sign", Arity::Exact(1), math_sign);

    // Min/max
    builtins
        .define_native("math_min", Arity::Minimum(0), math_min)
        .define_native("math_max", Arity::Minimum(0), math_max);

    // Powers, roots and logarithms
    builtins
        .define_native("math_pow", Arity::Exact(2), math_pow)
        .define_native("math_sqrt", Arity::Exact(1), math_sqrt)
        .define_native("math_cbrt", Arity::Exact(1), math_cbrt)
        .define_native("math_hypot", Arity::Minimum(0), math_hypot)
        .define_native("math_exp", Arity::Exact(1), math_exp)
        .define_native("math_log", Arity::Exact(1), math_log)
        .define_native("math_log2", Arity::Exact(1), math_log2)
        .define_native("math_log10", Arity::Exact(1), math_log10);

    // Trigonometric
    builtins
        .define_native("math_sin", Arity::Exact(1), math_sin)
        .define_native("math_cos", Arity::Exact(1), math_cos)
        .define_native("math_tan", Arity::Exact(1), math_tan)
        .define_native("math_asin", Arity::Exact(1), math_asin)
        .define_native("math_acos", Arity::Exact(1), math_acos)
        .define_native("math_atan", Arity::Exact(1), math_atan)
        .define_native("math_atan2", Arity::Exact(2), math_atan2);

    builtins.define_native("math_random", Arity::Exact(0), math_random);
}

fn unary(name: &str, args: &[Value], op: fn(f64) -> f64) -> Result<Value, RuntimeError> {
    Ok(Value::Number(op(number_arg(name, args, 0)?)))
}

fn numbers(name: &str, args: &[Value]) -> Result<Vec<f64>, RuntimeError> {
    (0..args.len()).map(|i| number_arg(name, args, i)).collect()
}

pub fn math_abs(_interp: &mut Interpreter, args: &[Value]) -> Result<Value, RuntimeError> {
    unary("math_abs", args, f64::abs)
}

pub fn math_floor(_interp: &mut Interpreter, args: &[Value]) -> Result<Value, RuntimeError> {
    unary("math_floor", args, f64::floor)
}

pub fn math_ceil(_interp: &mut Interpreter, args: &[Value]) -> Result<Value, RuntimeError> {
    unary("math_ceil", args, f64::ceil)
}

/// Rounds half-way cases towards positive infinity (`-2.5` → `-2`).
pub fn math_round(_interp: &mut Interpreter, args: &[Value]) -> Result<Value, RuntimeError> {
    unary("math_round", args, |n| {
        if n.is_finite() { (n + 0.5).floor() } else { n }
    })
}

pub fn math_trunc(_interp: &mut Interpreter, args: &[Value]) -> Result<Value, RuntimeError> {
    unary("math_trunc", args, f64::trunc)
}

pub fn math_sign(_interp: &mut Interpreter, args: &[Value]) -> Result<Value, RuntimeError> {
    unary("math_sign", args, |n| {
        if n.is_nan() || n == 0.0 {
            n
        } else if n > 0.0 {
            1.0
        } else {
            -1.0
        }
    })
}

pub fn math_min(_interp: &mut Interpreter, args: &[Value]) -> Result<Value, RuntimeError> {
    let mut min = f64::INFINITY;
    for n in numbers("math_min", args)? {
        if n.is_nan() {
            return Ok(Value::Number(f64::NAN));
        }
        min = min.min(n);
    }
    Ok(Value::Number(min))
}

pub fn math_max(_interp: &mut Interpreter, args: &[Value]) -> Result<Value, RuntimeError> {
    let mut max = f64::NEG_INFINITY;
    for n in numbers("math_max", args)? {
        if n.is_nan() {
            return Ok(Value::Number(f64::NAN));
        }
        max = max.max(n);
    }
    Ok(Value::Number(max))
}

pub fn math_pow(_interp: &mut Interpreter, args: &[Value]) -> Result<Value, RuntimeError> {
    let base = number_arg("math_pow", args, 0)?;
    let exp = number_arg("math_pow", args, 1)?;
    Ok(Value::Number(base.powf(exp)))
}

pub fn math_sqrt(_interp: &mut Interpreter, args: &[Value]) -> Result<Value, RuntimeError> {
    unary("math_sqrt", args, f64::sqrt)
}

pub fn math_cbrt(_interp: &mut Interpreter, args: &[Value]) -> Result<Value, RuntimeError> {
    unary("math_cbrt", args, f64::cbrt)
}

pub fn math_hypot(_interp: &mut Interpreter, args: &[Value]) -> Result<Value, RuntimeError> {
    let sum: f64 = numbers("math_hypot", args)?.iter().map(|n| n * n).sum();
    Ok(Value::Number(sum.sqrt()))
}

pub fn math_exp(_interp: &mut Interpreter, args: &[Value]) -> Result<Value, RuntimeError> {
    unary("math_exp", args, f64::exp)
}

pub fn math_log(_interp: &mut Interpreter, args: &[Value]) -> Result<Value, RuntimeError> {
    unary("math_log", args, f64::ln)
}

pub fn math_log2(_interp: &mut Interpreter, args: &[Value]) -> Result<Value, RuntimeError> {
    unary("math_log2", args, f64::log2)
}

pub fn math_log10(_interp: &mut Interpreter, args: &[Value]) -> Result<Value, RuntimeError> {
    unary("math_log10", args, f64::log10)
}

pub fn math_sin(_interp: &mut Interpreter, args: &[Value]) -> Result<Value, RuntimeError> {
    unary("math_sin", args, f64::sin)
}

pub fn math_cos(_interp: &mut Interpreter, args: &[Value]) -> Result<Value, RuntimeError> {
    unary("math_cos", args, f64::cos)
}

pub fn math_tan(_interp: &mut Interpreter, args: &[Value]) -> Result<Value, RuntimeError> {
    unary("math_tan", args, f64::tan)
}

pub fn math_asin(_interp: &mut Interpreter, args: &[Value]) -> Result<Value, RuntimeError> {
    unary("math_asin", args, f64::asin)
}

pub fn math_acos(_interp: &mut Interpreter, args: &[Value]) -> Result<Value, RuntimeError> {
    unary("math_acos", args, f64::acos)
}

pub fn math_atan(_interp: &mut Interpreter, args: &[Value]) -> Result<Value, RuntimeError> {
    unary("math_atan", args, f64::atan)
}

pub fn math_atan2(_interp: &mut Interpreter, args: &[Value]) -> Result<Value, RuntimeError> {
    let y = number_arg("math_atan2", args, 0)?;
    let x = number_arg("math_atan2", args, 1)?;
    Ok(Value::Number(y.atan2(x)))
}

pub fn math_random(interp: &mut Interpreter, _args: &[Value]) -> Result<Value, RuntimeError> {
    Ok(Value::Number(interp.random_mut().random()))
}
