//! Literals, operators, statements and program values

use super::{eval, throws_error};
use sourcerun::Value;

fn num(n: f64) -> Value {
    Value::Number(n)
}

fn string(s: &str) -> Value {
    Value::from(s)
}

#[test]
fn test_arithmetic() {
    assert_eq!(eval("1 + 2 * 3 - 4 / 2;"), num(5.0));
    assert_eq!(eval("(1 + 2) * 3;"), num(9.0));
    assert_eq!(eval("7 % 3;"), num(1.0));
    assert_eq!(eval("-(3);"), num(-3.0));
    assert_eq!(eval("+5;"), num(5.0));
    assert_eq!(eval("0x10 + 0.5;"), num(16.5));
}

#[test]
fn test_division_by_zero() {
    assert_eq!(eval("1 / 0;"), num(f64::INFINITY));
    assert!(matches!(eval("0 / 0;"), Value::Number(n) if n.is_nan()));
}

#[test]
fn test_string_concatenation() {
    assert_eq!(eval("'ab' + \"cd\";"), string("abcd"));
    assert_eq!(eval("'a\\tb';"), string("a\tb"));
}

#[test]
fn test_comparison() {
    assert_eq!(eval("1 < 2;"), Value::Boolean(true));
    assert_eq!(eval("2 <= 2;"), Value::Boolean(true));
    assert_eq!(eval("3 > 4;"), Value::Boolean(false));
    assert_eq!(eval("'apple' < 'banana';"), Value::Boolean(true));
    assert_eq!(eval("'b' >= 'a';"), Value::Boolean(true));
}

#[test]
fn test_strict_equality() {
    assert_eq!(eval("1 === 1;"), Value::Boolean(true));
    assert_eq!(eval("1 !== 2;"), Value::Boolean(true));
    assert_eq!(eval("'a' === 'a';"), Value::Boolean(true));
    assert_eq!(eval("null === undefined;"), Value::Boolean(false));
    assert_eq!(eval("1 === '1';"), Value::Boolean(false));
    assert_eq!(eval("NaN === NaN;"), Value::Boolean(false));
}

#[test]
fn test_identity_equality_of_pairs_and_functions() {
    assert_eq!(eval("const p = pair(1, 2); p === p;"), Value::Boolean(true));
    assert_eq!(eval("pair(1, 2) === pair(1, 2);"), Value::Boolean(false));
    assert_eq!(eval("const f = x => x; f === f;"), Value::Boolean(true));
    assert_eq!(eval("(x => x) === (x => x);"), Value::Boolean(false));
}

#[test]
fn test_logical_operators() {
    assert_eq!(eval("true && false;"), Value::Boolean(false));
    assert_eq!(eval("true && true;"), Value::Boolean(true));
    assert_eq!(eval("false || true;"), Value::Boolean(true));
    assert_eq!(eval("!true;"), Value::Boolean(false));
}

#[test]
fn test_logical_operators_short_circuit() {
    // the right operand would fail if it were evaluated
    assert_eq!(eval("false && missing_name;"), Value::Boolean(false));
    assert_eq!(eval("true || missing_name;"), Value::Boolean(true));
    // the right operand is returned as is
    assert_eq!(eval("true && 5;"), num(5.0));
}

#[test]
fn test_conditional_expression() {
    assert_eq!(eval("true ? 1 : 2;"), num(1.0));
    assert_eq!(eval("1 > 2 ? 'a' : 2 > 1 ? 'b' : 'c';"), string("b"));
}

#[test]
fn test_if_statement_value() {
    assert_eq!(eval("if (1 < 2) { 'yes'; } else { 'no'; }"), string("yes"));
    assert_eq!(eval("if (1 > 2) { 'yes'; } else { 'no'; }"), string("no"));
    assert_eq!(eval("if (false) { 1; }"), Value::Undefined);
    assert_eq!(
        eval("const x = 5; if (x < 0) { 'neg'; } else if (x === 0) { 'zero'; } else { 'pos'; }"),
        string("pos")
    );
}

#[test]
fn test_program_value_is_last_statement() {
    assert_eq!(eval("1; 2; 3;"), num(3.0));
    assert_eq!(eval(""), Value::Undefined);
    assert_eq!(eval("{}"), Value::Undefined);
    assert_eq!(eval("1; {}"), Value::Undefined);
}

#[test]
fn test_declarations_and_assignments_are_undefined() {
    assert_eq!(eval("const x = 1;"), Value::Undefined);
    assert_eq!(eval("let x = 1; x = 2;"), Value::Undefined);
    assert_eq!(eval("function f() { return 1; }"), Value::Undefined);
}

#[test]
fn test_let_reassignment() {
    assert_eq!(eval("let x = 1; x = x + 41; x;"), num(42.0));
}

#[test]
fn test_automatic_semicolon_insertion() {
    assert_eq!(eval("const a = 1\nconst b = 2\na + b"), num(3.0));
}

#[test]
fn test_comments() {
    assert_eq!(eval("// line\n1 + /* inline */ 2; /* trailing */"), num(3.0));
}

#[test]
fn test_operand_type_errors() {
    assert!(throws_error("1 + 'a';", "Expected number on right hand side of operation, got string."));
    assert!(throws_error("'a' - 1;", "Expected number on left hand side of operation, got string."));
    assert!(throws_error("!1;", "Expected boolean, got number."));
    assert!(throws_error("-'a';", "Expected number, got string."));
    assert!(throws_error("if (1) { 2; }", "Expected boolean as condition, got number."));
    assert!(throws_error("1 ? 2 : 3;", "Expected boolean as condition, got number."));
    assert!(throws_error("1 && true;", "Expected boolean as condition, got number."));
}
