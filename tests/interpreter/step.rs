//! Tests for the step-based execution API

use super::run_to_completion;
use sourcerun::interpreter::stack::Continuation;
use sourcerun::{Control, Interpreter, InterpreterConfig, Outcome, StepResult, Value};

fn bare() -> Interpreter {
    Interpreter::with_config(InterpreterConfig {
        load_prelude: false,
        ..InterpreterConfig::default()
    })
}

#[test]
fn test_step_returns_complete_for_simple_expression() {
    let mut interp = bare();
    interp.prepare("1 + 2;").unwrap();

    let result = run_to_completion(&mut interp).unwrap();
    assert!(matches!(result, StepResult::Complete(Value::Number(n)) if n == 3.0));
    // stepping a finished program keeps reporting its value
    assert!(matches!(interp.step(), Ok(StepResult::Complete(Value::Number(n))) if n == 3.0));
}

#[test]
fn test_step_before_prepare_is_done() {
    let mut interp = bare();
    assert!(matches!(interp.step(), Ok(StepResult::Done)));
}

#[test]
fn test_first_step_enters_program() {
    let mut interp = bare();
    interp.prepare("1;").unwrap();
    assert!(matches!(interp.control(), Some(Control::Program(_))));
    assert_eq!(interp.stack_depth(), 1);

    assert!(matches!(interp.step(), Ok(StepResult::Continue)));
    assert!(matches!(interp.control(), Some(Control::Statement(_))));
    assert_eq!(interp.outer_count(), 2);
}

#[test]
fn test_each_statement_is_scheduled_as_exec_frame() {
    let mut interp = bare();
    interp.prepare("1; 2; 3;").unwrap();
    interp.step().unwrap();

    // two statements wait above the terminal frame
    let tags: Vec<_> = interp.stack().iter().map(Continuation::tag).collect();
    assert_eq!(tags, vec!["Exec", "Exec", "Empty"]);
}

#[test]
fn test_reset_leaves_delimiter_on_stack() {
    let mut interp = bare();
    interp.prepare("reset(() => 1);").unwrap();

    let mut saw_delimiter = false;
    loop {
        match interp.step().unwrap() {
            StepResult::Continue => {
                saw_delimiter |= interp.stack().iter().any(|c| c.tag() == "Delimiter");
            }
            StepResult::Complete(value) => {
                assert_eq!(value, Value::Number(1.0));
                break;
            }
            StepResult::Done => panic!("program ended without a value"),
        }
    }
    assert!(saw_delimiter);
    assert!(interp.is_final());
}

#[test]
fn test_step_counter() {
    let mut interp = bare();
    interp.prepare("1 + 2;").unwrap();
    run_to_completion(&mut interp).unwrap();
    let steps = interp.steps();
    assert!(steps > 3, "took {steps} steps");

    // a new program restarts the count
    interp.prepare("1;").unwrap();
    assert_eq!(interp.steps(), 0);
}

#[test]
fn test_budget_suspends_and_resumes() {
    let mut interp = bare();
    interp
        .prepare("function f(n) { return n === 0 ? 'done' : f(n - 1); } f(100);")
        .unwrap();

    let mut suspensions = 0;
    let value = loop {
        match interp.run(Some(50)) {
            Outcome::Suspended => {
                assert!(interp.is_running());
                suspensions += 1;
            }
            Outcome::Finished(value) => break value,
            Outcome::Error(e) => panic!("unexpected error: {e}"),
        }
    };
    assert_eq!(value, Value::from("done"));
    assert!(suspensions > 1);
    assert!(!interp.is_running());
}

#[test]
fn test_error_stops_the_machine() {
    let mut interp = bare();
    interp.prepare("1;\nundefined_name;\n2;").unwrap();
    let err = run_to_completion(&mut interp).unwrap_err();
    assert_eq!(err.to_string(), "Line 2: Name undefined_name not declared.");
    assert!(interp.control().is_none());
    assert!(!interp.is_running());
    assert!(matches!(interp.step(), Ok(StepResult::Done)));
}
