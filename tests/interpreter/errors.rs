//! Unsupported constructs, builtin failures and syntax errors

use super::{error_message, eval_result, throws_error};
use sourcerun::{Error, RuntimeError};

#[test]
fn test_unsupported_statements() {
    let cases = [
        ("while (true) { 1; }", "while loop is not supported."),
        ("do { 1; } while (false);", "do-while loop is not supported."),
        ("for (let i = 0; i < 3; i = i + 1) { i; }", "for loop is not supported."),
        ("for (const x of xs) { x; }", "for-of loop is not supported."),
        ("throw 1;", "throw statement is not supported."),
        ("try { 1; } catch (e) { 2; }", "try statement is not supported."),
        ("class A { }", "class declaration is not supported."),
        ("import x from \"y\";", "import declaration is not supported."),
    ];
    for (source, message) in cases {
        assert_eq!(error_message(source), format!("Line 1: {message}"), "{source}");
    }
}

#[test]
fn test_break_outside_loop_is_unsupported() {
    assert!(throws_error("function f() { break; } f();", "break statement is not supported."));
}

#[test]
fn test_unsupported_expressions() {
    let cases = [
        ("[1, 2];", "array expression is not supported."),
        ("({ a: 1 });", "object expression is not supported."),
        ("const p = pair(1, 2); p.head;", "member access is not supported."),
        ("new Thing();", "new expression is not supported."),
        ("let i = 0; i++;", "update expression is not supported."),
        ("`text`;", "template literal is not supported."),
        ("this;", "this is not supported."),
        ("typeof 1;", "typeof operator is not supported."),
        ("1 == 1;", "== operator is not supported."),
        ("1 != 2;", "!= operator is not supported."),
        ("null ?? 1;", "?? operator is not supported."),
        ("let x = 1; x += 1;", "+= assignment is not supported."),
    ];
    for (source, message) in cases {
        assert_eq!(error_message(source), format!("Line 1: {message}"), "{source}");
    }
}

#[test]
fn test_unsupported_construct_is_reported_when_reached() {
    // the loop is never executed, so the program succeeds
    assert!(eval_result("function f() { while (true) { 1; } } 42;").is_ok());
}

#[test]
fn test_error_builtin() {
    assert_eq!(error_message("error('boom');"), "Line 1: error: boom");
    assert_eq!(
        error_message("error(42, 'bad value:');"),
        "Line 1: error: bad value: 42"
    );
}

#[test]
fn test_builtin_argument_errors() {
    assert_eq!(
        error_message("head(1);"),
        "Line 1: head: expected a pair, got 1"
    );
    assert_eq!(
        error_message("\n\nmath_sqrt('4');"),
        "Line 3: math_sqrt: expected a number as argument 1, got string"
    );
}

#[test]
fn test_undefined_variable() {
    assert_eq!(error_message("nope;"), "Line 1: Name nope not declared.");
    assert_eq!(error_message("nope = 1;"), "Line 1: Name nope not declared.");
}

#[test]
fn test_return_outside_function() {
    assert_eq!(
        error_message("return 1;"),
        "Line 1: Illegal return statement outside of a function."
    );
}

#[test]
fn test_runtime_errors_carry_their_kind() {
    let err = eval_result("const x = 1;\n\nx(1);");
    match err {
        Err(Error::Runtime(RuntimeError::CallingNonFunctionValue { value, span })) => {
            assert_eq!(value, "1");
            assert_eq!(span.line, 3);
        }
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn test_syntax_errors() {
    assert!(matches!(eval_result("const = 1;"), Err(Error::Syntax { .. })));
    assert!(throws_error("let x;", "Missing initializer in let declaration"));
    assert!(throws_error("var x = 1;", "\"var\" is not allowed"));
    assert!(throws_error("const a = 1, b = 2;", "Only one variable may be declared"));
    assert!(throws_error("1 +;", "SyntaxError"));
    assert!(throws_error("function f(a, a) { }", "Duplicate parameter name \"a\""));
    assert!(throws_error("'unterminated", "Unterminated string literal"));
}

#[test]
fn test_stack_overflow_is_reported() {
    let result = eval_result("function f(n) { return 1 + f(n + 1); } f(0);");
    assert!(result.as_ref().is_err_and(Error::is_stack_overflow));
}
