//! Evaluation context: persistence across programs, error recording,
//! configuration and host-registered builtins

use sourcerun::platform::{BufferedConsoleProvider, FixedRandomProvider, FixedTimeProvider};
use sourcerun::{
    Arity, Builtins, Error, Interpreter, InterpreterConfig, Runtime, RuntimeError, Value,
};

#[test]
fn test_programs_share_top_level_bindings() {
    let mut runtime = Runtime::new();
    runtime.eval("function square(x) { return x * x; }").unwrap();
    runtime.eval("const nine = square(3);").unwrap();
    assert_eq!(runtime.eval("nine + square(2);").unwrap(), Value::Number(13.0));
}

#[test]
fn test_later_programs_may_shadow_earlier_bindings() {
    let mut runtime = Runtime::new();
    runtime.eval("const x = 1;").unwrap();
    runtime.eval("const x = 2;").unwrap();
    assert_eq!(runtime.eval("x;").unwrap(), Value::Number(2.0));
}

#[test]
fn test_context_is_reusable_after_error() {
    let mut runtime = Runtime::new();
    runtime.eval("const a = 1;").unwrap();
    assert!(runtime.eval("a(1);").is_err());
    assert_eq!(runtime.eval("a + 1;").unwrap(), Value::Number(2.0));
}

#[test]
fn test_errors_accumulate_in_order() {
    let mut runtime = Runtime::new();
    assert!(runtime.eval("nope;").is_err());
    assert!(runtime.eval("1 + true;").is_err());
    assert!(runtime.eval("const = 1;").is_err());

    let errors = runtime.errors();
    assert_eq!(errors.len(), 2);
    assert!(matches!(errors.first(), Some(RuntimeError::UndefinedVariable { .. })));
    assert!(matches!(errors.get(1), Some(RuntimeError::TypeError { .. })));
}

#[test]
fn test_outer_environments_counted() {
    let mut interp = Interpreter::with_config(InterpreterConfig {
        load_prelude: false,
        ..InterpreterConfig::default()
    });
    assert_eq!(interp.outer_count(), 1);
    interp.eval("1;").unwrap();
    interp.eval("2;").unwrap();
    assert_eq!(interp.outer_count(), 3);

    let mut with_prelude = Interpreter::new();
    with_prelude.eval("1;").unwrap();
    // global, both preludes, the program
    assert_eq!(with_prelude.outer_count(), 4);
}

#[test]
fn test_prelude_can_be_disabled() {
    let mut interp = Interpreter::with_config(InterpreterConfig {
        load_prelude: false,
        ..InterpreterConfig::default()
    });
    let err = interp.eval("length(list(1));").unwrap_err();
    assert_eq!(err.to_string(), "Line 1: Name length not declared.");
    // native builtins are still there
    assert_eq!(interp.eval("head(list(1));").unwrap(), Value::Number(1.0));
}

#[test]
fn test_display_goes_to_console_provider() {
    let console = BufferedConsoleProvider::new();
    let mut runtime = Runtime::with_config(InterpreterConfig {
        console: Box::new(console.clone()),
        ..InterpreterConfig::default()
    });
    let value = runtime
        .eval("display(list(1, 2)); raw_display('plain', 'label:'); display('quoted');")
        .unwrap();
    assert_eq!(value, Value::from("quoted"));
    assert_eq!(console.lines(), vec!["[1, [2, null]]", "label: plain", "\"quoted\""]);
}

#[test]
fn test_time_and_random_providers() {
    let mut runtime = Runtime::with_config(InterpreterConfig {
        time: Box::new(FixedTimeProvider(1_000)),
        random: Box::new(FixedRandomProvider(0.5)),
        ..InterpreterConfig::default()
    });
    assert_eq!(runtime.eval("get_time();").unwrap(), Value::Number(1000.0));
    assert_eq!(runtime.eval("math_random();").unwrap(), Value::Number(0.5));
}

#[test]
fn test_max_stack_depth_config() {
    let mut interp = Interpreter::with_config(InterpreterConfig {
        max_stack_depth: 200,
        load_prelude: false,
        ..InterpreterConfig::default()
    });
    let source = "function count(n) { return n === 0 ? 0 : 1 + count(n - 1); }";
    interp.eval(source).unwrap();
    assert_eq!(interp.eval("count(10);").unwrap(), Value::Number(10.0));

    let err = interp.eval("count(1000);").unwrap_err();
    assert!(matches!(err, Error::StackOverflow { .. }));
    // stack overflow is not one of the recorded errors
    assert!(interp.errors().is_empty());
    // and the context is still usable
    assert_eq!(interp.eval("count(5);").unwrap(), Value::Number(5.0));
}

fn double(_interp: &mut Interpreter, args: &[Value]) -> Result<Value, RuntimeError> {
    match args.first() {
        Some(Value::Number(n)) => Ok(Value::Number(n * 2.0)),
        _ => Err(RuntimeError::builtin("double", "expected a number")),
    }
}

#[test]
fn test_host_registered_builtins() {
    let mut builtins = Builtins::standard();
    builtins
        .define_native("double", Arity::Exact(1), double)
        .define_constant("answer", Value::Number(42.0));

    let mut runtime = Runtime::with_builtins(InterpreterConfig::default(), &builtins);
    assert_eq!(runtime.eval("double(answer);").unwrap(), Value::Number(84.0));
    assert_eq!(
        runtime.eval("double('x');").unwrap_err().to_string(),
        "Line 1: double: expected a number"
    );
    // builtins are constants
    assert!(runtime.eval("answer = 1;").is_err());
}

#[test]
fn test_contexts_are_isolated() {
    let mut first = Runtime::new();
    let mut second = Runtime::new();
    first.eval("const only_here = 1;").unwrap();
    assert!(second.eval("only_here;").is_err());
}

#[test]
fn test_escaping_continuation_across_programs() {
    let mut runtime = Runtime::new();
    runtime
        .eval("let saved = null; let count = 0; const v = call_cc(k => { saved = k; return 0; }); count = count + 1;")
        .unwrap();
    assert_eq!(runtime.eval("count;").unwrap(), Value::Number(1.0));

    // re-entering the first program runs its remaining statements again
    assert_eq!(runtime.eval("saved(5);").unwrap(), Value::Undefined);
    assert_eq!(runtime.eval("v + count;").unwrap(), Value::Number(7.0));
}

#[test]
fn test_long_result_serializes_without_overflow() {
    let mut runtime = Runtime::new();
    let xs = runtime.eval("enum_list(1, 30000);").unwrap();
    // too deep for JSON output, reported as an error rather than a crash
    assert!(serde_json::to_value(&xs).is_err());
    assert!(xs.stringify().starts_with("[1, [2, [3, "));

    let short = runtime.eval("enum_list(1, 3);").unwrap();
    assert_eq!(
        serde_json::to_value(&short).unwrap(),
        serde_json::json!([1.0, [2.0, [3.0, null]]])
    );
}
