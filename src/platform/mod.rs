//! Platform abstraction traits.
//!
//! Builtins that touch the outside world (`display`, `get_time`,
//! `math_random`) go through these providers so hosts and tests can replace
//! them.

use std::cell::RefCell;
use std::rc::Rc;

mod std_impl;

pub use std_impl::{StdConsoleProvider, StdRandomProvider, StdTimeProvider};

pub trait TimeProvider {
    /// Current time as milliseconds since the Unix epoch. Used for `get_time()`.
    fn now_millis(&self) -> i64;
}

pub trait RandomProvider {
    /// A random f64 in the range [0, 1). Used for `math_random()`.
    fn random(&mut self) -> f64;
}

/// Sink for `display` and `raw_display` output.
pub trait ConsoleProvider {
    fn write(&self, message: &str);
}

/// A time provider frozen at a fixed instant.
pub struct FixedTimeProvider(pub i64);

impl TimeProvider for FixedTimeProvider {
    fn now_millis(&self) -> i64 {
        self.0
    }
}

/// A random provider that always returns the same value.
pub struct FixedRandomProvider(pub f64);

impl RandomProvider for FixedRandomProvider {
    fn random(&mut self) -> f64 {
        self.0
    }
}

/// A console provider that discards all output.
pub struct NoOpConsoleProvider;

impl ConsoleProvider for NoOpConsoleProvider {
    fn write(&self, _message: &str) {}
}

/// A console provider that keeps every line written to it.
///
/// Clones share the same buffer, so a host can keep one handle and give the
/// other to the interpreter.
#[derive(Clone, Default)]
pub struct BufferedConsoleProvider {
    lines: Rc<RefCell<Vec<String>>>,
}

impl BufferedConsoleProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.borrow().clone()
    }

    pub fn take(&self) -> Vec<String> {
        std::mem::take(&mut *self.lines.borrow_mut())
    }
}

impl ConsoleProvider for BufferedConsoleProvider {
    fn write(&self, message: &str) {
        self.lines.borrow_mut().push(message.to_string());
    }
}
