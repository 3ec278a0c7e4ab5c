//! CLI tool for running Source programs
//!
//! Usage: sourcerun [options] [FILE | -e CODE]
//!
//! Options:
//!   --max-depth <n>    Maximum continuation stack depth (default: 100000)
//!   --max-steps <n>    Stop after this many machine steps (default: unlimited)
//!   --no-prelude       Do not load the list and continuation preludes
//!   --json             Print the outcome as a JSON object
//!
//! With neither FILE nor -e the program is read from stdin.

use std::env;
use std::fs;
use std::io::Read;

use serde_json::json;
use sourcerun::interpreter::DEFAULT_MAX_STACK_DEPTH;
use sourcerun::{Error, Interpreter, InterpreterConfig, Outcome};
use tracing::warn;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    match run() {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

enum Input {
    File(String),
    Inline(String),
    Stdin,
}

/// CLI configuration
struct Config {
    input: Input,
    max_depth: usize,
    max_steps: Option<u64>,
    load_prelude: bool,
    json: bool,
}

fn parse_args() -> Result<Config, String> {
    let args: Vec<String> = env::args().collect();
    let program_name = args.first().map_or("sourcerun", |s| s.as_str());
    let usage = format!(
        "Usage: {} [--max-depth <n>] [--max-steps <n>] [--no-prelude] [--json] [FILE | -e CODE]",
        program_name
    );

    let mut config = Config {
        input: Input::Stdin,
        max_depth: DEFAULT_MAX_STACK_DEPTH,
        max_steps: None,
        load_prelude: true,
        json: false,
    };

    let mut rest = args.iter().skip(1);
    while let Some(arg) = rest.next() {
        match arg.as_str() {
            "--max-depth" => {
                config.max_depth = rest
                    .next()
                    .ok_or_else(|| "--max-depth requires a value".to_string())?
                    .parse::<usize>()
                    .map_err(|_| "--max-depth must be a positive integer".to_string())?;
            }
            "--max-steps" => {
                config.max_steps = Some(
                    rest.next()
                        .ok_or_else(|| "--max-steps requires a value".to_string())?
                        .parse::<u64>()
                        .map_err(|_| "--max-steps must be a positive integer".to_string())?,
                );
            }
            "--no-prelude" => config.load_prelude = false,
            "--json" => config.json = true,
            "-e" => {
                let code = rest.next().ok_or_else(|| "-e requires a program".to_string())?;
                config.input = Input::Inline(code.clone());
            }
            "-h" | "--help" => return Err(usage),
            other if other.starts_with('-') => {
                return Err(format!("Unknown option: {}\n{}", other, usage));
            }
            path => config.input = Input::File(path.to_string()),
        }
    }

    Ok(config)
}

/// Returns whether the program finished without error.
fn run() -> Result<bool, Box<dyn std::error::Error>> {
    let config = parse_args()?;

    let source = match &config.input {
        Input::File(path) => fs::read_to_string(path).map_err(|e| format!("Cannot read {}: {}", path, e))?,
        Input::Inline(code) => code.clone(),
        Input::Stdin => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };

    let mut interp = Interpreter::with_config(InterpreterConfig {
        max_stack_depth: config.max_depth,
        load_prelude: config.load_prelude,
        ..InterpreterConfig::default()
    });

    let outcome = match interp.prepare(&source) {
        Ok(()) => interp.run(config.max_steps),
        Err(e) => Outcome::Error(e),
    };

    if config.json {
        println!("{}", outcome_to_json(&outcome, &interp));
    } else {
        match &outcome {
            Outcome::Finished(value) => println!("{}", value.stringify()),
            Outcome::Error(e) => eprintln!("{}", e),
            Outcome::Suspended => eprintln!("Suspended after {} steps", interp.steps()),
        }
    }

    Ok(!matches!(outcome, Outcome::Error(_)))
}

fn outcome_to_json(outcome: &Outcome, interp: &Interpreter) -> serde_json::Value {
    match outcome {
        Outcome::Finished(value) => {
            // pairs nested past the serializer limit are still in "display"
            let serialized = serde_json::to_value(value).unwrap_or_else(|e| {
                warn!("result not serialized: {}", e);
                serde_json::Value::Null
            });
            json!({
                "status": "finished",
                "value": serialized,
                "display": value.stringify(),
                "steps": interp.steps(),
            })
        }
        Outcome::Error(e) => {
            let errors: Vec<String> = match e {
                // Syntax errors and stack overflow are not among the recorded errors
                Error::Syntax { .. } | Error::StackOverflow { .. } => vec![e.to_string()],
                Error::Runtime(_) => interp.errors().iter().map(|e| e.to_string()).collect(),
            };
            json!({
                "status": "error",
                "errors": errors,
            })
        }
        Outcome::Suspended => json!({
            "status": "suspended",
            "steps": interp.steps(),
        }),
    }
}
