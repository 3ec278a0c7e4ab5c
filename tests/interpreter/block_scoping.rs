//! Block scoping and temporal dead zone

use super::{error_message, eval};
use sourcerun::Value;

#[test]
fn test_standalone_block_statements() {
    assert_eq!(
        eval(
            "function test() {
                const x = true;
                {
                    const x = false;
                }
                return x;
            }
            test();"
        ),
        Value::Boolean(true)
    );
}

#[test]
fn test_const_uses_block_scoping() {
    assert_eq!(
        eval(
            "function test() {
                const x = true;
                if (true) {
                    const x = false;
                } else {
                    const x = false;
                }
                return x;
            }
            test();"
        ),
        Value::Boolean(true)
    );
}

#[test]
fn test_let_uses_block_scoping() {
    assert_eq!(
        eval(
            "function test() {
                let x = true;
                if (true) {
                    let x = false;
                } else {
                    let x = false;
                }
                return x;
            }
            test();"
        ),
        Value::Boolean(true)
    );
}

#[test]
fn test_inner_block_sees_outer_bindings() {
    assert_eq!(eval("const a = 1; { const b = 2; a + b; }"), Value::Number(3.0));
    assert_eq!(eval("let a = 1; { a = 5; } a;"), Value::Number(5.0));
}

#[test]
fn test_no_hoisting_of_function_bodies() {
    assert_eq!(
        error_message(
            "const v = f();
            function f() {
                return 1;
            }
            v;"
        ),
        "Line 1: Name f declared later in current scope but not yet assigned"
    );
}

#[test]
fn test_function_declared_later_is_usable_after_declaration() {
    assert_eq!(
        eval(
            "function g() { return f(); }
            function f() { return 1; }
            g();"
        ),
        Value::Number(1.0)
    );
}

#[test]
fn test_error_when_accessing_temporal_dead_zone() {
    assert_eq!(
        error_message(
            "const a = 1;
            function f() {
                display(a);
                const a = 5;
            }
            f();"
        ),
        "Line 3: Name a declared later in current scope but not yet assigned"
    );
}

#[test]
fn test_block_bindings_inaccessible_until_defined() {
    assert_eq!(
        error_message(
            "const a = 1;
            {
                a + a;
                const a = 10;
            }"
        ),
        "Line 3: Name a declared later in current scope but not yet assigned"
    );
}

#[test]
fn test_shadowed_variables_not_assignable_until_declared() {
    assert_eq!(
        error_message(
            "let variable = 1;
            function test() {
                variable = 100;
                let variable = true;
                return variable;
            }
            test();"
        ),
        "Line 3: Name variable not declared."
    );
}

#[test]
fn test_redeclaration_in_same_block() {
    assert_eq!(
        error_message("const x = 1; const x = 2;"),
        "Line 1: Cannot redeclare constant x."
    );
    assert_eq!(
        error_message("let y = 1;\nlet y = 2;"),
        "Line 2: Cannot redeclare variable y."
    );
}

#[test]
fn test_const_assignment() {
    assert_eq!(
        error_message("const x = 1; x = 2;"),
        "Line 1: Cannot assign new value to constant x."
    );
}

#[test]
fn test_parameters_can_be_shadowed_in_body() {
    assert_eq!(eval("function f(x) { const x = 2; return x; } f(1);"), Value::Number(2.0));
}
