//! call_cc, shift and reset

use super::{error_message, eval};
use sourcerun::Value;

const ANY: &str = "
function any(predicate, lst) {
    const found = call_cc(k => {
        map(val => {
            if (predicate(val)) {
                k(true); // short-circuit
            } else {}
        }, lst);
        return false;
    });

    return found;
}
";

#[test]
fn test_call_cc_any_true() {
    assert_eq!(
        eval(&format!("{ANY} any(x => x > 2, list(1, 4, 6, 3));")),
        Value::Boolean(true)
    );
}

#[test]
fn test_call_cc_any_false() {
    assert_eq!(
        eval(&format!("{ANY} any(x => x > 10, list(1, 4, 6, 3));")),
        Value::Boolean(false)
    );
}

#[test]
fn test_call_cc_short_circuit_skips_remaining_work() {
    let (result, output) = super::eval_with_output(&format!(
        "{ANY} any(x => display(x) > 2, list(1, 4, 6, 3));"
    ));
    assert_eq!(result.ok(), Some(Value::Boolean(true)));
    assert_eq!(output, vec!["1", "4"]);
}

#[test]
fn test_call_cc_multiply_with_zero() {
    assert_eq!(
        eval(
            "const multiply = numbers => call_cc(k => multiply_helper(numbers, k));

            const multiply_helper = (numbers, k) =>
                numbers === null
                ? 1
                : head(numbers) === 0
                ? k(0)
                : head(numbers) * multiply_helper(tail(numbers), k);

            multiply(list(1, 2, 0, 4, 5));"
        ),
        Value::Number(0.0)
    );
}

#[test]
fn test_call_cc_capture_and_reenter() {
    assert_eq!(
        eval(
            "const x = call_cc(k => k);
            if (is_cont(x)) {
                x(10);
            } else {
                x;
            }"
        ),
        Value::Number(10.0)
    );
}

#[test]
fn test_call_cc_returning_normally() {
    assert_eq!(eval("1 + call_cc(k => 41);"), Value::Number(42.0));
    assert_eq!(eval("1 + call_cc(k => k(2) + 1000);"), Value::Number(3.0));
}

#[test]
fn test_shift_reset_invoke() {
    // 100 + (1 + 2 + 3)
    assert_eq!(
        eval("100 + reset(() => 1 + shift(k => k(2)) + 3);"),
        Value::Number(106.0)
    );
}

#[test]
fn test_shift_reset_return() {
    // 100 + (2)
    assert_eq!(
        eval("100 + reset(() => 1 + shift(k => 2) + 3);"),
        Value::Number(102.0)
    );
}

#[test]
fn test_shift_reset_return_different_type() {
    assert_eq!(
        eval("reset(() => 2 + shift(k => \"hello\") + 1);"),
        Value::from("hello")
    );
}

#[test]
fn test_reset_without_shift() {
    assert_eq!(eval("reset(() => 5);"), Value::Number(5.0));
    assert_eq!(eval("1 + reset(() => 2 * 3);"), Value::Number(7.0));
}

#[test]
fn test_resumed_segment_falls_through_to_call_site() {
    // no return in the delimited body: the spliced `1 + _` hands its result
    // to the `_ + 10` waiting where k was called
    assert_eq!(
        eval("reset(() => { 1 + shift(k => k(2) + 10); });"),
        Value::Number(13.0)
    );
}

#[test]
fn test_return_in_resumed_segment_jumps_to_original_call() {
    // the arrow body is `return 1 + _`, whose return point was captured when
    // the thunk was called by reset, so `+ 10` is skipped
    assert_eq!(
        eval("reset(() => 1 + shift(k => k(2) + 10));"),
        Value::Number(3.0)
    );
}

const SHIFT_RESET_MULTIPLY: &str = "
const multiply = (lst) =>
    lst === null
    ? 1
    : head(lst) === 0
    ? shift(k => 0)
    : head(lst) * multiply(tail(lst));
";

#[test]
fn test_shift_reset_multiply_no_zero() {
    assert_eq!(
        eval(&format!("{SHIFT_RESET_MULTIPLY} reset(() => multiply(list(1, 2, 3, 4, 5)));")),
        Value::Number(120.0)
    );
}

#[test]
fn test_shift_reset_multiply_with_zero() {
    assert_eq!(
        eval(&format!("{SHIFT_RESET_MULTIPLY} reset(() => multiply(list(1, 2, 0, 4, 5)));")),
        Value::Number(0.0)
    );
}

#[test]
fn test_captured_continuations_are_values() {
    assert_eq!(eval("is_cont(call_cc(k => k));"), Value::Boolean(true));
    assert_eq!(eval("is_cont(reset(() => shift(k => k)));"), Value::Boolean(true));
    assert_eq!(eval("is_function(call_cc(k => k));"), Value::Boolean(true));
    assert_eq!(
        eval("stringify(reset(() => shift(k => k)));"),
        Value::from("[Continuation: delimited]")
    );
}

#[test]
fn test_shift_without_reset() {
    assert_eq!(
        error_message("1 + shift(k => k(1));"),
        "Line 1: shift called without an enclosing reset."
    );
}

#[test]
fn test_continuation_takes_exactly_one_argument() {
    assert_eq!(
        error_message("const k = call_cc(k => k);\nis_cont(k) ? k(1, 2) : k;"),
        "Line 2: Expected 1 arguments, but got 2."
    );
}
