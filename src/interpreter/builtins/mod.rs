//! Builtin functions and constants
//!
//! A [`Builtins`] table is built once and installed into the global
//! environment of every interpreter created from it.

pub mod list;
pub mod math;
pub mod misc;
pub mod prelude;

use std::rc::Rc;

use indexmap::IndexMap;
use rustc_hash::FxBuildHasher;

use crate::error::RuntimeError;
use crate::value::{Arity, Builtin, BuiltinFunction, CheapClone, ControlOperator, NativeFn, SourceString, Value};

use super::environment::Environment;

/// Registration table for the global environment.
#[derive(Clone, Default)]
pub struct Builtins {
    entries: IndexMap<SourceString, Value, FxBuildHasher>,
}

impl Builtins {
    /// An empty table.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Control operators, the native libraries and their constants.
    pub fn standard() -> Self {
        let mut builtins = Self::empty();
        for operator in [
            ControlOperator::CallCc,
            ControlOperator::Reset,
            ControlOperator::Shift,
        ] {
            builtins.define_control(operator);
        }
        misc::register(&mut builtins);
        list::register(&mut builtins);
        math::register(&mut builtins);
        builtins
    }

    pub fn define_native(&mut self, name: &str, arity: Arity, function: NativeFn) -> &mut Self {
        self.insert_builtin(name, arity, BuiltinFunction::Native(function))
    }

    pub fn define_control(&mut self, operator: ControlOperator) -> &mut Self {
        self.insert_builtin(operator.name(), Arity::Exact(1), BuiltinFunction::Control(operator))
    }

    pub fn define_constant(&mut self, name: &str, value: Value) -> &mut Self {
        self.entries.insert(SourceString::from(name), value);
        self
    }

    fn insert_builtin(&mut self, name: &str, arity: Arity, function: BuiltinFunction) -> &mut Self {
        let name = SourceString::from(name);
        let builtin = Builtin {
            name: name.cheap_clone(),
            arity,
            function,
        };
        self.entries.insert(name, Value::Builtin(Rc::new(builtin)));
        self
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(SourceString::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Bind every entry as a constant in `env`.
    pub(crate) fn install(&self, env: &Environment) {
        for (name, value) in &self.entries {
            env.define(name, value.cheap_clone(), false);
        }
    }
}

// ═══════════════════════════════════════════════════════════════
// Argument helpers shared by the native libraries
// ═══════════════════════════════════════════════════════════════

pub(crate) fn arg(args: &[Value], index: usize) -> Value {
    args.get(index).cloned().unwrap_or_default()
}

pub(crate) fn number_arg(name: &str, args: &[Value], index: usize) -> Result<f64, RuntimeError> {
    match args.get(index) {
        Some(Value::Number(n)) => Ok(*n),
        other => Err(RuntimeError::builtin(
            name,
            format!(
                "expected a number as argument {}, got {}",
                index + 1,
                other.map_or("undefined", Value::type_name)
            ),
        )),
    }
}

pub(crate) fn string_arg<'a>(name: &str, args: &'a [Value], index: usize) -> Result<&'a str, RuntimeError> {
    match args.get(index) {
        Some(Value::String(s)) => Ok(s.as_str()),
        other => Err(RuntimeError::builtin(
            name,
            format!(
                "expected a string as argument {}, got {}",
                index + 1,
                other.map_or("undefined", Value::type_name)
            ),
        )),
    }
}
