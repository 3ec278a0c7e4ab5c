//! Source value representation
//!
//! The [`Value`] type and the callable kinds a program can hold: closures,
//! native builtins and captured continuations.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use rustc_hash::FxHashSet;
use serde::ser::{Error as _, Serialize, SerializeSeq, Serializer};

use crate::error::RuntimeError;
use crate::interpreter::Interpreter;
use crate::interpreter::closure::Closure;
use crate::interpreter::stack::CapturedContinuation;

/// Trait for types that have cheap (O(1), reference-counted) clones.
///
/// Makes it explicit at call sites when a clone only bumps a reference count.
/// Types implementing this trait should have O(1) clones, typically because
/// they are `Rc`-backed.
pub trait CheapClone: Clone {
    fn cheap_clone(&self) -> Self {
        self.clone()
    }
}

impl<T: ?Sized> CheapClone for Rc<T> {}

/// A Source value
#[derive(Clone, Default)]
pub enum Value {
    #[default]
    Undefined,
    Null,
    Boolean(bool),
    Number(f64),
    String(SourceString),
    Pair(Rc<Pair>),
    Closure(Rc<Closure>),
    Builtin(Rc<Builtin>),
    Continuation(Rc<CapturedContinuation>),
}

impl CheapClone for Value {}

/// The three kinds of callable value, borrowed out of a [`Value`].
pub enum Callee<'a> {
    Closure(&'a Rc<Closure>),
    Builtin(&'a Rc<Builtin>),
    Continuation(&'a Rc<CapturedContinuation>),
}

impl Value {
    pub fn pair(head: Value, tail: Value) -> Value {
        Value::Pair(Rc::new(Pair::new(head, tail)))
    }

    /// Build a null-terminated list from `items`.
    pub fn list(items: impl DoubleEndedIterator<Item = Value>) -> Value {
        items.rev().fold(Value::Null, |tail, head| Value::pair(head, tail))
    }

    pub fn as_callee(&self) -> Option<Callee<'_>> {
        match self {
            Value::Closure(c) => Some(Callee::Closure(c)),
            Value::Builtin(b) => Some(Callee::Builtin(b)),
            Value::Continuation(k) => Some(Callee::Continuation(k)),
            _ => None,
        }
    }

    pub fn is_function(&self) -> bool {
        self.as_callee().is_some()
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Type name used in runtime type errors.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Undefined => "undefined",
            Value::Null => "null",
            Value::Boolean(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Pair(_) => "pair",
            Value::Closure(_) | Value::Builtin(_) | Value::Continuation(_) => "function",
        }
    }

    /// Strict equality (`===`). Pairs and callables compare by identity.
    pub fn strict_equals(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Undefined, Value::Undefined) => true,
            (Value::Null, Value::Null) => true,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            // NaN !== NaN
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Pair(a), Value::Pair(b)) => Rc::ptr_eq(a, b),
            (Value::Closure(a), Value::Closure(b)) => Rc::ptr_eq(a, b),
            (Value::Builtin(a), Value::Builtin(b)) => Rc::ptr_eq(a, b),
            (Value::Continuation(a), Value::Continuation(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// Render the value the way `stringify` does: strings quoted, lists as
    /// nested `[head, tail]` pairs.
    pub fn stringify(&self) -> String {
        let mut out = String::new();
        write_value(&mut out, self);
        out
    }

    /// Like [`Value::stringify`] but strings are written without quotes.
    pub fn to_display_string(&self) -> String {
        match self {
            Value::String(s) => s.as_str().to_string(),
            other => other.stringify(),
        }
    }
}

fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
    } else if n == 0.0 {
        "0".to_string()
    } else {
        n.to_string()
    }
}

/// Work left for [`write_value`].
enum Pending {
    Value(Value),
    Text(&'static str),
    /// The pair's brackets are closed; it may appear again without a cycle.
    Leave(*const Pair),
}

/// Pairs are expanded onto an explicit work list, so neither long lists nor
/// deeply nested heads recurse; `ancestors` guards against cycles built with
/// `set_head`/`set_tail`.
fn write_value(out: &mut String, value: &Value) {
    let mut ancestors: FxHashSet<*const Pair> = FxHashSet::default();
    let mut pending = vec![Pending::Value(value.cheap_clone())];

    while let Some(item) = pending.pop() {
        let value = match item {
            Pending::Text(text) => {
                out.push_str(text);
                continue;
            }
            Pending::Leave(ptr) => {
                ancestors.remove(&ptr);
                continue;
            }
            Pending::Value(value) => value,
        };

        match value {
            Value::Undefined => out.push_str("undefined"),
            Value::Null => out.push_str("null"),
            Value::Boolean(b) => out.push_str(if b { "true" } else { "false" }),
            Value::Number(n) => out.push_str(&format_number(n)),
            Value::String(s) => {
                out.push('"');
                for ch in s.as_str().chars() {
                    match ch {
                        '"' => out.push_str("\\\""),
                        '\\' => out.push_str("\\\\"),
                        '\n' => out.push_str("\\n"),
                        '\t' => out.push_str("\\t"),
                        c => out.push(c),
                    }
                }
                out.push('"');
            }
            Value::Pair(pair) => {
                let ptr = Rc::as_ptr(&pair);
                if !ancestors.insert(ptr) {
                    out.push_str("...<circular>");
                    continue;
                }
                out.push('[');
                // popped in reverse: head, separator, tail, bracket
                pending.push(Pending::Leave(ptr));
                pending.push(Pending::Text("]"));
                pending.push(Pending::Value(pair.tail()));
                pending.push(Pending::Text(", "));
                pending.push(Pending::Value(pair.head()));
            }
            Value::Closure(c) => {
                out.push_str("[Function: ");
                out.push_str(c.display_name().as_str());
                out.push(']');
            }
            Value::Builtin(b) => {
                out.push_str("[Builtin: ");
                out.push_str(b.name.as_str());
                out.push(']');
            }
            Value::Continuation(k) => {
                out.push_str("[Continuation: ");
                out.push_str(k.kind().as_str());
                out.push(']');
            }
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.strict_equals(other)
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.stringify())
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.stringify())
    }
}

/// Deepest pair nesting [`Value`] serializes; serializers recurse once per
/// level, so anything deeper fails with a serializer error instead.
pub const MAX_SERIALIZE_DEPTH: usize = 1_000;

/// Serializes as JSON-compatible data: pairs become two-element arrays,
/// callables their stringified form, `undefined` becomes `null`.
impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        Nested {
            value: self,
            depth: 0,
        }
        .serialize(serializer)
    }
}

struct Nested<'a> {
    value: &'a Value,
    depth: usize,
}

impl Serialize for Nested<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.value {
            Value::Undefined | Value::Null => serializer.serialize_unit(),
            Value::Boolean(b) => serializer.serialize_bool(*b),
            Value::Number(n) => serializer.serialize_f64(*n),
            Value::String(s) => serializer.serialize_str(s.as_str()),
            Value::Pair(p) => {
                if self.depth >= MAX_SERIALIZE_DEPTH {
                    return Err(S::Error::custom(format!(
                        "pairs nested deeper than {MAX_SERIALIZE_DEPTH} levels"
                    )));
                }
                let (head, tail) = (p.head(), p.tail());
                let mut seq = serializer.serialize_seq(Some(2))?;
                seq.serialize_element(&Nested {
                    value: &head,
                    depth: self.depth + 1,
                })?;
                seq.serialize_element(&Nested {
                    value: &tail,
                    depth: self.depth + 1,
                })?;
                seq.end()
            }
            callable => serializer.serialize_str(&callable.stringify()),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(n as f64)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(SourceString::from(s))
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(SourceString::from(s))
    }
}

impl From<SourceString> for Value {
    fn from(s: SourceString) -> Self {
        Value::String(s)
    }
}

/// A mutable pair cell (`set_head`/`set_tail` write through).
pub struct Pair {
    head: RefCell<Value>,
    tail: RefCell<Value>,
}

impl Pair {
    pub fn new(head: Value, tail: Value) -> Self {
        Self {
            head: RefCell::new(head),
            tail: RefCell::new(tail),
        }
    }

    pub fn head(&self) -> Value {
        self.head.borrow().cheap_clone()
    }

    pub fn tail(&self) -> Value {
        self.tail.borrow().cheap_clone()
    }

    pub fn set_head(&self, value: Value) {
        *self.head.borrow_mut() = value;
    }

    pub fn set_tail(&self, value: Value) {
        *self.tail.borrow_mut() = value;
    }
}

/// Unlinks uniquely owned heads and tails onto a work list so dropping a long
/// list or a deeply nested structure does not recurse once per pair.
impl Drop for Pair {
    fn drop(&mut self) {
        fn unlink(pair: &Pair, pending: &mut Vec<Rc<Pair>>) {
            for value in [pair.head.take(), pair.tail.take()] {
                if let Value::Pair(child) = value {
                    pending.push(child);
                }
            }
        }

        let mut pending = Vec::new();
        unlink(self, &mut pending);
        while let Some(pair) = pending.pop() {
            if let Ok(inner) = Rc::try_unwrap(pair) {
                unlink(&inner, &mut pending);
            }
        }
    }
}

/// Native function signature
pub type NativeFn = fn(&mut Interpreter, &[Value]) -> Result<Value, RuntimeError>;

/// Argument-count contract of a builtin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Exact(usize),
    /// Variadic with a required minimum
    Minimum(usize),
}

impl Arity {
    pub fn accepts(self, count: usize) -> bool {
        match self {
            Arity::Exact(n) => count == n,
            Arity::Minimum(n) => count >= n,
        }
    }

    pub fn required(self) -> usize {
        match self {
            Arity::Exact(n) | Arity::Minimum(n) => n,
        }
    }

    pub fn is_variadic(self) -> bool {
        matches!(self, Arity::Minimum(_))
    }
}

/// Operators on the continuation stack. They cannot be ordinary natives
/// because they read and rewrite the machine state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlOperator {
    CallCc,
    Reset,
    Shift,
}

impl ControlOperator {
    pub fn name(self) -> &'static str {
        match self {
            ControlOperator::CallCc => "call_cc",
            ControlOperator::Reset => "reset",
            ControlOperator::Shift => "shift",
        }
    }
}

#[derive(Clone, Copy)]
pub enum BuiltinFunction {
    Native(NativeFn),
    Control(ControlOperator),
}

pub struct Builtin {
    pub name: SourceString,
    pub arity: Arity,
    pub function: BuiltinFunction,
}

/// Reference-counted string used for identifiers and string values
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SourceString(Rc<str>);

impl CheapClone for SourceString {}

impl SourceString {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl AsRef<str> for SourceString {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::borrow::Borrow<str> for SourceString {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for SourceString {
    fn eq(&self, other: &str) -> bool {
        self.0.as_ref() == other
    }
}

impl PartialEq<&str> for SourceString {
    fn eq(&self, other: &&str) -> bool {
        self.0.as_ref() == *other
    }
}

impl From<&str> for SourceString {
    fn from(s: &str) -> Self {
        SourceString(s.into())
    }
}

impl From<String> for SourceString {
    fn from(s: String) -> Self {
        SourceString(s.into())
    }
}

impl fmt::Debug for SourceString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{}\"", self.0)
    }
}

impl fmt::Display for SourceString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
