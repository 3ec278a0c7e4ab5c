//! Integration tests for the interpreter, organized by feature
//!
//! These tests exercise the interpreter through the public API. Every helper
//! builds a fresh context with the standard builtins and both preludes.

mod basics;
mod block_scoping;
mod context;
mod continuations;
mod errors;
mod functions;
mod prelude;
mod step;

use sourcerun::platform::BufferedConsoleProvider;
use sourcerun::{Error, Interpreter, InterpreterConfig, StepResult, Value};

/// Create a new interpreter whose console output is captured in `console`.
pub fn create_test_runtime(console: &BufferedConsoleProvider) -> Interpreter {
    Interpreter::with_config(InterpreterConfig {
        console: Box::new(console.clone()),
        ..InterpreterConfig::default()
    })
}

/// Run an interpreter to completion using the step-based API.
/// Returns the final StepResult (Complete or Done).
pub fn run_to_completion(interp: &mut Interpreter) -> Result<StepResult, Error> {
    loop {
        match interp.step()? {
            StepResult::Continue => continue,
            result => return Ok(result),
        }
    }
}

/// Helper function to evaluate Source code.
#[allow(clippy::expect_used)]
pub fn eval(source: &str) -> Value {
    eval_result(source).expect("eval failed")
}

/// Helper function to evaluate and return Result for error testing.
pub fn eval_result(source: &str) -> Result<Value, Error> {
    eval_with_output(source).0
}

/// Evaluate `source`, returning the result together with every line written
/// by `display`/`raw_display`.
pub fn eval_with_output(source: &str) -> (Result<Value, Error>, Vec<String>) {
    let console = BufferedConsoleProvider::new();
    let mut interp = create_test_runtime(&console);

    let result = interp.prepare(source).and_then(|()| {
        match run_to_completion(&mut interp)? {
            StepResult::Complete(value) => Ok(value),
            _ => Ok(Value::Undefined),
        }
    });
    (result, console.lines())
}

/// Helper to check if evaluation fails with an error containing a specific message
pub fn throws_error(source: &str, error_contains: &str) -> bool {
    match eval_result(source) {
        Err(e) => e.to_string().contains(error_contains),
        Ok(_) => false,
    }
}

/// The rendered error of a failing program, or `"<ok>"`.
pub fn error_message(source: &str) -> String {
    match eval_result(source) {
        Err(e) => e.to_string(),
        Ok(_) => String::from("<ok>"),
    }
}
