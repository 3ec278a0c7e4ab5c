//! Function declarations, arrow functions, closures and application

use super::{error_message, eval, throws_error};
use sourcerun::Value;

#[test]
fn test_function() {
    assert_eq!(eval("function add(a, b) { return a + b; } add(2, 3);"), Value::Number(5.0));
}

#[test]
fn test_arrow_functions() {
    assert_eq!(eval("const sq = x => x * x; sq(4);"), Value::Number(16.0));
    assert_eq!(eval("const add = (a, b) => a + b; add(1, 2);"), Value::Number(3.0));
    assert_eq!(eval("const k = () => 7; k();"), Value::Number(7.0));
    assert_eq!(eval("const f = x => { return x + 1; }; f(1);"), Value::Number(2.0));
}

#[test]
fn test_function_expression() {
    assert_eq!(eval("const f = function (x) { return x * 2; }; f(21);"), Value::Number(42.0));
}

#[test]
fn test_body_without_return_yields_last_statement() {
    assert_eq!(eval("function f() { 1; 2; } f();"), Value::Number(2.0));
    assert_eq!(eval("function f() { } f();"), Value::Undefined);
}

#[test]
fn test_return_without_argument() {
    assert_eq!(eval("function f() { return; } f();"), Value::Undefined);
}

#[test]
fn test_early_return_skips_remaining_statements() {
    let source = "
        function sign(x) {
            if (x > 0) {
                return 'pos';
            } else {}
            return 'non-pos';
        }
    ";
    assert_eq!(eval(&format!("{source} sign(1);")), Value::from("pos"));
    assert_eq!(eval(&format!("{source} sign(-1);")), Value::from("non-pos"));
}

#[test]
fn test_return_from_nested_block() {
    assert_eq!(
        eval("function f() { { { return 1; } } return 2; } f() + 10;"),
        Value::Number(11.0)
    );
}

#[test]
fn test_recursion() {
    assert_eq!(
        eval("function fact(n) { return n === 0 ? 1 : n * fact(n - 1); } fact(10);"),
        Value::Number(3628800.0)
    );
}

#[test]
fn test_mutual_recursion() {
    assert_eq!(
        eval(
            "function is_even(n) { return n === 0 ? true : is_odd(n - 1); }
            function is_odd(n) { return n === 0 ? false : is_even(n - 1); }
            is_even(10);"
        ),
        Value::Boolean(true)
    );
}

#[test]
fn test_closure_captures_defining_environment() {
    assert_eq!(
        eval(
            "function make_adder(n) { return x => x + n; }
            const add5 = make_adder(5);
            const n = 100;
            add5(1);"
        ),
        Value::Number(6.0)
    );
}

#[test]
fn test_closure_with_mutable_state() {
    assert_eq!(
        eval(
            "function make_counter() {
                let n = 0;
                return () => {
                    n = n + 1;
                    return n;
                };
            }
            const c = make_counter();
            c();
            c();
            c();"
        ),
        Value::Number(3.0)
    );
}

#[test]
fn test_higher_order_functions() {
    assert_eq!(
        eval("function twice(f, x) { return f(f(x)); } twice(x => x + 3, 1);"),
        Value::Number(7.0)
    );
}

#[test]
fn test_parameters_are_reassignable() {
    assert_eq!(eval("function f(x) { x = x + 1; return x; } f(1);"), Value::Number(2.0));
}

#[test]
fn test_rest_parameters() {
    let source = "function f(a, ...rest) { return rest; }";
    assert_eq!(
        eval(&format!("{source} stringify(f(1, 2, 3));")),
        Value::from("[2, [3, null]]")
    );
    assert_eq!(eval(&format!("{source} is_null(f(1));")), Value::Boolean(true));
}

#[test]
fn test_arity_enforcement() {
    let source = "function f(a, b) { return a; }";
    assert_eq!(
        error_message(&format!("{source} f(1);")),
        "Line 1: Expected 2 arguments, but got 1."
    );
    assert_eq!(
        error_message(&format!("{source} f(1, 2, 3);")),
        "Line 1: Expected 2 arguments, but got 3."
    );
    assert_eq!(
        error_message("function g(a, b, ...c) { return a; } g(1);"),
        "Line 1: Expected 2 or more arguments, but got 1."
    );
}

#[test]
fn test_builtin_arity() {
    assert!(throws_error("pair(1);", "Expected 2 arguments, but got 1."));
    assert!(throws_error("display();", "Expected 1 or more arguments, but got 0."));
}

#[test]
fn test_calling_non_function() {
    assert_eq!(
        error_message("const x = 1; x(2);"),
        "Line 1: Calling non-function value 1."
    );
    assert!(throws_error("'f'();", "Calling non-function value \"f\"."));
}

#[test]
fn test_function_values() {
    assert_eq!(eval("function foo() { return 1; } stringify(foo);"), Value::from("[Function: foo]"));
    assert_eq!(eval("stringify(x => x);"), Value::from("[Function: x => ...]"));
    assert_eq!(eval("stringify(pair);"), Value::from("[Builtin: pair]"));
    assert_eq!(eval("arity((a, b) => a);"), Value::Number(2.0));
    assert_eq!(eval("is_function(display);"), Value::Boolean(true));
}

#[test]
fn test_deep_recursion_within_limit() {
    assert_eq!(
        eval("function count(n) { return n === 0 ? 0 : 1 + count(n - 1); } count(2000);"),
        Value::Number(2000.0)
    );
}
