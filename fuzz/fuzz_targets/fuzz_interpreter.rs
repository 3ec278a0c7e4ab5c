#![no_main]

use libfuzzer_sys::fuzz_target;
use sourcerun::{Interpreter, InterpreterConfig, Outcome};

const MAX_STEPS: u64 = 100_000;

fuzz_target!(|data: &[u8]| {
    // Only process valid UTF-8
    let Ok(source) = std::str::from_utf8(data) else {
        return;
    };

    // Smaller limit for interpreter (more expensive per byte)
    if source.len() > 10_000 {
        return;
    }

    let mut interp = Interpreter::with_config(InterpreterConfig {
        max_stack_depth: 2_000,
        ..InterpreterConfig::default()
    });

    // Prepare should return Ok or Err
    if interp.prepare(source).is_err() {
        return;
    }

    // Budget guards against non-terminating programs
    match interp.run(Some(MAX_STEPS)) {
        Outcome::Finished(_) | Outcome::Suspended | Outcome::Error(_) => {}
    }

    // The context must stay usable after whatever happened
    let _ = interp.eval("1;");
});
