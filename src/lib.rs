//! Step-wise evaluator for Source, a teaching subset of JavaScript, with
//! first-class continuations (`call_cc`) and delimited control
//! (`shift`/`reset`).
//!
//! # Example
//!
//! ```
//! use sourcerun::{Runtime, Value};
//!
//! let mut runtime = Runtime::new();
//! let result = runtime.eval("1 + 2 * 3;").unwrap();
//! assert_eq!(result, Value::Number(7.0));
//!
//! let result = runtime.eval("100 + reset(() => 1 + shift(k => k(2)) + 3);").unwrap();
//! assert_eq!(result, Value::Number(106.0));
//! ```

pub mod ast;
pub mod error;
pub mod interpreter;
pub mod lexer;
pub mod parser;
pub mod platform;
pub mod string_dict;
pub mod value;

pub use error::{Error, RuntimeError};
pub use interpreter::builtins::Builtins;
pub use interpreter::{Control, Interpreter, InterpreterConfig, Outcome, StepResult};
pub use value::{Arity, CheapClone, SourceString, Value};

/// The main entry point for running Source programs
///
/// Wraps an [`Interpreter`]; programs evaluated by the same runtime share
/// their top-level bindings.
pub struct Runtime {
    interpreter: Interpreter,
}

impl Runtime {
    /// Create a runtime with the standard builtins and preludes
    pub fn new() -> Self {
        Self {
            interpreter: Interpreter::new(),
        }
    }

    pub fn with_config(config: InterpreterConfig) -> Self {
        Self {
            interpreter: Interpreter::with_config(config),
        }
    }

    /// Create a runtime whose global environment holds exactly `builtins`
    pub fn with_builtins(config: InterpreterConfig, builtins: &Builtins) -> Self {
        Self {
            interpreter: Interpreter::with_builtins(config, builtins),
        }
    }

    /// Evaluate a program to completion, returning its final value
    pub fn eval(&mut self, source: &str) -> Result<Value, Error> {
        self.interpreter.eval(source)
    }

    /// Evaluate a program, taking at most `max_steps` transitions.
    ///
    /// Returns [`Outcome::Suspended`] when the budget runs out; the program
    /// can then be continued with [`Runtime::resume`].
    pub fn eval_with_budget(&mut self, source: &str, max_steps: u64) -> Outcome {
        if let Err(e) = self.interpreter.prepare(source) {
            return Outcome::Error(e);
        }
        self.interpreter.run(Some(max_steps))
    }

    /// Continue a suspended program. `None` runs until it finishes.
    pub fn resume(&mut self, max_steps: Option<u64>) -> Outcome {
        self.interpreter.run(max_steps)
    }

    /// Every runtime error raised so far, oldest first
    pub fn errors(&self) -> &[RuntimeError] {
        self.interpreter.errors()
    }

    pub fn interpreter(&self) -> &Interpreter {
        &self.interpreter
    }

    pub fn interpreter_mut(&mut self) -> &mut Interpreter {
        &mut self.interpreter
    }
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new()
    }
}
