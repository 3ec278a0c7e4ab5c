//! Library functions written in Source itself
//!
//! Evaluated in order before the first user program, each into its own
//! program environment.

pub const LIST_PRELUDE: &str = r#"
function equal(xs, ys) {
    return is_pair(xs)
        ? is_pair(ys) && equal(head(xs), head(ys)) && equal(tail(xs), tail(ys))
        : xs === ys;
}

function length(xs) {
    return is_null(xs) ? 0 : 1 + length(tail(xs));
}

function map(f, xs) {
    return is_null(xs) ? null : pair(f(head(xs)), map(f, tail(xs)));
}

function build_list(fun, n) {
    function build(i) {
        return i >= n ? null : pair(fun(i), build(i + 1));
    }
    return build(0);
}

function for_each(fun, xs) {
    if (is_null(xs)) {
        return true;
    } else {
        fun(head(xs));
        return for_each(fun, tail(xs));
    }
}

function list_to_string(xs) {
    return stringify(xs);
}

function reverse(xs) {
    function rev(original, reversed) {
        return is_null(original)
            ? reversed
            : rev(tail(original), pair(head(original), reversed));
    }
    return rev(xs, null);
}

function append(xs, ys) {
    return is_null(xs) ? ys : pair(head(xs), append(tail(xs), ys));
}

function member(v, xs) {
    return is_null(xs)
        ? null
        : v === head(xs)
        ? xs
        : member(v, tail(xs));
}

function remove(v, xs) {
    return is_null(xs)
        ? null
        : v === head(xs)
        ? tail(xs)
        : pair(head(xs), remove(v, tail(xs)));
}

function remove_all(v, xs) {
    return is_null(xs)
        ? null
        : v === head(xs)
        ? remove_all(v, tail(xs))
        : pair(head(xs), remove_all(v, tail(xs)));
}

function filter(pred, xs) {
    return is_null(xs)
        ? null
        : pred(head(xs))
        ? pair(head(xs), filter(pred, tail(xs)))
        : filter(pred, tail(xs));
}

function enum_list(start, end) {
    return start > end ? null : pair(start, enum_list(start + 1, end));
}

function list_ref(xs, n) {
    return n === 0 ? head(xs) : list_ref(tail(xs), n - 1);
}

function accumulate(f, initial, xs) {
    return is_null(xs) ? initial : f(head(xs), accumulate(f, initial, tail(xs)));
}
"#;

/// Control constructs built from `call_cc`, `shift` and `reset`.
pub const CONTINUATION_PRELUDE: &str = r#"
function loop(f) {
    let step = false;

    call_cc(brake => {
        call_cc(kontinue => {
            f(brake, kontinue);
        });
        step = true;
    });

    return step ? loop(f) : null;
}

function try_no_c(body) {
    call_cc(resume => {
        const exception = call_cc(thrw => {
            const res = body(thrw);
            resume(res);
        });

        resume(exception);
    });
}

function tryc(body, ctch) {
    call_cc(resume => {
        const exception = call_cc(thrw => {
            const res = body(thrw);
            resume(res);
        });

        resume(ctch(exception));
    });
}

function logic(body) {
    let fail_stack = null;

    function fail() {
        if (!is_pair(fail_stack)) {
            shift(k => false);
        } else {
            let back_track_point = head(fail_stack);
            fail_stack = tail(fail_stack);
            back_track_point(back_track_point);
        }
    }

    function amb(choices) {
        let cc = call_cc(k => k);
        if (is_null(choices)) {
            fail();
        } else {
            let choice = head(choices);
            choices = tail(choices);
            fail_stack = pair(cc, fail_stack);
            return choice;
        }
    }

    function assert(condition) {
        return condition() ? true : fail();
    }

    return reset(() => body(amb, assert));
}

function threads(body) {
    let thread_queue = null;
    let halt = null;

    function spawn(proc) {
        let cc = call_cc(k => k);
        if (is_cont(cc)) {
            thread_queue = append(thread_queue, list(cc));
        } else {
            proc();
            quit();
        }
    }

    function yld() {
        let cc = call_cc(k => k);
        if (is_cont(cc) && !is_null(thread_queue)) {
            let next_thread = head(thread_queue);
            thread_queue = append(tail(thread_queue), list(cc));
            next_thread(null);
        }
    }

    function quit() {
        if (!is_null(thread_queue)) {
            let next_thread = head(thread_queue);
            thread_queue = tail(thread_queue);
            next_thread(null);
        } else {
            halt();
        }
    }

    function start_threads() {
        let cc = call_cc(k => k);
        if (is_cont(cc)) {
            halt = () => cc(false);
            if (!is_null(thread_queue)) {
                let next_thread = head(thread_queue);
                thread_queue = tail(thread_queue);
                next_thread(null);
            }
        }
    }

    return body(spawn, start_threads, yld);
}

function make_generator(data, walk) {
    let cc = null;

    function yld(val) {
        shift(k => {
            cc = k;
            return val;
        });
    }

    function it() {
        return reset(() => !is_cont(cc) ? walk(yld, data) : cc(null));
    }

    return it;
}
"#;

/// Preludes in load order. The continuation prelude uses `append`.
pub const PRELUDES: &[(&str, &str)] = &[
    ("list", LIST_PRELUDE),
    ("continuation", CONTINUATION_PRELUDE),
];
