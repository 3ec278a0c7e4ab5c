//! List prelude and the control constructs built on continuations

use super::{eval, eval_with_output};
use sourcerun::Value;

fn string(s: &str) -> Value {
    Value::from(s)
}

// ═══════════════════════════════════════════════════════════════
// List prelude
// ═══════════════════════════════════════════════════════════════

#[test]
fn test_stringify_deep_structures() {
    let depth = 10_000;
    let nested = eval(&format!(
        "function nest(n) {{ return n === 0 ? null : pair(nest(n - 1), null); }}
         stringify(nest({depth}));"
    ));
    let expected = format!("{}null, null]{}", "[".repeat(depth), ", null]".repeat(depth - 1));
    assert_eq!(nested, string(&expected));

    let long = eval("stringify(enum_list(1, 10000));");
    assert!(matches!(&long, Value::String(s) if s.as_str().starts_with("[1, [2, ") && s.as_str().contains("[10000, null]]")));
}

#[test]
fn test_length_map_filter() {
    assert_eq!(eval("length(list(1, 2, 3));"), Value::Number(3.0));
    assert_eq!(
        eval("stringify(map(x => x * 2, list(1, 2, 3)));"),
        string("[2, [4, [6, null]]]")
    );
    assert_eq!(
        eval("stringify(filter(x => x % 2 === 0, enum_list(1, 6)));"),
        string("[2, [4, [6, null]]]")
    );
}

#[test]
fn test_accumulate_and_build_list() {
    assert_eq!(
        eval("accumulate((x, acc) => x + acc, 0, list(1, 2, 3, 4));"),
        Value::Number(10.0)
    );
    assert_eq!(
        eval("stringify(build_list(i => i * i, 4));"),
        string("[0, [1, [4, [9, null]]]]")
    );
}

#[test]
fn test_reverse_append_list_ref() {
    assert_eq!(eval("stringify(reverse(list(1, 2, 3)));"), string("[3, [2, [1, null]]]"));
    assert_eq!(
        eval("stringify(append(list(1), list(2, 3)));"),
        string("[1, [2, [3, null]]]")
    );
    assert_eq!(eval("list_ref(list('a', 'b', 'c'), 2);"), string("c"));
}

#[test]
fn test_member_and_remove() {
    assert_eq!(eval("stringify(member(2, list(1, 2, 3)));"), string("[2, [3, null]]"));
    assert_eq!(eval("is_null(member(9, list(1, 2, 3)));"), Value::Boolean(true));
    assert_eq!(eval("stringify(remove(1, list(1, 2, 1)));"), string("[2, [1, null]]"));
    assert_eq!(eval("stringify(remove_all(1, list(1, 2, 1)));"), string("[2, null]"));
}

#[test]
fn test_equal() {
    assert_eq!(eval("equal(list(1, list(2)), list(1, list(2)));"), Value::Boolean(true));
    assert_eq!(eval("equal(list(1, 2), list(1, 3));"), Value::Boolean(false));
}

#[test]
fn test_for_each_displays_in_order() {
    let (result, output) = eval_with_output("for_each(x => display(x), list(1, 2, 3));");
    assert_eq!(result.ok(), Some(Value::Boolean(true)));
    assert_eq!(output, vec!["1", "2", "3"]);
}

// ═══════════════════════════════════════════════════════════════
// Continuation prelude
// ═══════════════════════════════════════════════════════════════

#[test]
fn test_loop_with_break() {
    assert_eq!(
        eval(
            "let i = 0;
            loop((brk, cont) => {
                i = i + 1;
                if (i >= 5) {
                    brk(null);
                } else {}
            });
            i;"
        ),
        Value::Number(5.0)
    );
}

#[test]
fn test_tryc_catches_thrown_value() {
    assert_eq!(
        eval("tryc(thrw => { thrw('oops'); return 1; }, e => 'caught ' + e);"),
        string("caught oops")
    );
}

#[test]
fn test_tryc_without_throw() {
    assert_eq!(
        eval("tryc(thrw => 1, e => 'caught ' + e);"),
        Value::Number(1.0)
    );
}

#[test]
fn test_try_no_c() {
    assert_eq!(eval("try_no_c(thrw => thrw(5) + 100);"), Value::Number(5.0));
}

#[test]
fn test_logic_finds_first_solution() {
    assert_eq!(
        eval(
            "logic((amb, assert) => {
                const x = amb(list(1, 2, 3));
                assert(() => x > 1);
                return x;
            });"
        ),
        Value::Number(2.0)
    );
}

#[test]
fn test_logic_without_solution() {
    assert_eq!(
        eval(
            "logic((amb, assert) => {
                const x = amb(list(1, 2));
                assert(() => x > 5);
                return x;
            });"
        ),
        Value::Boolean(false)
    );
}

#[test]
fn test_threads_interleave_at_yield() {
    assert_eq!(
        eval(
            "let log = null;
            const result = threads((spawn, start_threads, yld) => {
                spawn(() => {
                    log = pair(1, log);
                    yld();
                    log = pair(3, log);
                });
                spawn(() => {
                    log = pair(2, log);
                    yld();
                    log = pair(4, log);
                });
                start_threads();
                return 'done';
            });
            stringify(pair(result, reverse(log)));"
        ),
        string("[\"done\", [1, [2, [3, [4, null]]]]]")
    );
}

#[test]
fn test_make_generator() {
    assert_eq!(
        eval(
            "function walk_list(yld, xs) {
                if (is_null(xs)) {
                    return null;
                } else {
                    yld(head(xs));
                    return walk_list(yld, tail(xs));
                }
            }
            const next = make_generator(list('a', 'b', 'c'), walk_list);
            const first = next();
            const second = next();
            const third = next();
            first + second + third;"
        ),
        string("abc")
    );
}
