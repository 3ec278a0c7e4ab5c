//! The CEK machine: execution context and driver
//!
//! An [`Interpreter`] owns the three registers of the machine (control,
//! environment, continuation stack) and advances them one transition at a
//! time. [`Interpreter::step`] performs a single transition,
//! [`Interpreter::run`] drives until the program finishes, fails, or a step
//! budget runs out.

mod apply;
pub mod builtins;
pub mod closure;
pub mod environment;
pub mod rttc;
pub mod stack;
mod step;

use std::rc::Rc;

use tracing::{debug, trace};

use crate::ast::{Expression, Program, Statement};
use crate::error::{Error, RuntimeError};
use crate::parser::Parser;
use crate::platform::{
    ConsoleProvider, RandomProvider, StdConsoleProvider, StdRandomProvider, StdTimeProvider,
    TimeProvider,
};
use crate::string_dict::StringDict;
use crate::value::{CheapClone, Value};

use builtins::Builtins;
use environment::{Environment, EnvironmentTracker};
use stack::{Continuation, ContinuationStack};

/// Name of the hidden binding holding a function's return point. `*` cannot
/// appear in an identifier, so user code can never read or shadow it.
pub(crate) const RETURN_POINT: &str = "*return*";

/// The control register: either something still to be reduced or a value.
#[derive(Debug, Clone)]
pub enum Control {
    Program(Rc<Program>),
    Statement(Statement),
    Expression(Expression),
    Value(Value),
}

impl Control {
    pub fn kind(&self) -> &'static str {
        match self {
            Control::Program(_) => "program",
            Control::Statement(_) => "statement",
            Control::Expression(_) => "expression",
            Control::Value(_) => "value",
        }
    }

    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Control::Value(v) => Some(v),
            _ => None,
        }
    }
}

impl From<Value> for Control {
    fn from(value: Value) -> Self {
        Control::Value(value)
    }
}

/// Result of a single [`Interpreter::step`].
#[derive(Debug)]
pub enum StepResult {
    /// A transition was made; more remain
    Continue,
    /// The control is a value and only the terminal frame is left
    Complete(Value),
    /// Nothing is loaded (no program prepared, or the last one failed)
    Done,
}

/// Result of driving a program with [`Interpreter::run`].
#[derive(Debug)]
pub enum Outcome {
    Finished(Value),
    Error(Error),
    /// The step budget ran out; call `run` again to continue
    Suspended,
}

impl Outcome {
    pub fn into_result(self) -> Option<Result<Value, Error>> {
        match self {
            Outcome::Finished(v) => Some(Ok(v)),
            Outcome::Error(e) => Some(Err(e)),
            Outcome::Suspended => None,
        }
    }
}

/// Settings fixed when an [`Interpreter`] is built.
pub struct InterpreterConfig {
    /// Longest continuation stack allowed before aborting with
    /// [`Error::StackOverflow`]
    pub max_stack_depth: usize,
    /// Evaluate the list and continuation preludes before the first program
    pub load_prelude: bool,
    pub console: Box<dyn ConsoleProvider>,
    pub time: Box<dyn TimeProvider>,
    pub random: Box<dyn RandomProvider>,
}

pub const DEFAULT_MAX_STACK_DEPTH: usize = 100_000;

impl Default for InterpreterConfig {
    fn default() -> Self {
        Self {
            max_stack_depth: DEFAULT_MAX_STACK_DEPTH,
            load_prelude: true,
            console: Box::new(StdConsoleProvider),
            time: Box::new(StdTimeProvider),
            random: Box::new(StdRandomProvider::new()),
        }
    }
}

/// An execution context plus its driver.
///
/// Top-level bindings persist between programs evaluated in the same
/// interpreter: each program runs in a fresh child of the previous
/// program's environment.
pub struct Interpreter {
    control: Option<Control>,
    env: Environment,
    stack: ContinuationStack,
    /// Global environment first, then one environment per finished program
    outer: Vec<Environment>,
    errors: Vec<RuntimeError>,
    running: bool,
    steps: u64,

    max_stack_depth: usize,
    load_prelude: bool,
    prelude_loaded: bool,

    console: Box<dyn ConsoleProvider>,
    time: Box<dyn TimeProvider>,
    random: Box<dyn RandomProvider>,

    string_dict: StringDict,
    environments: EnvironmentTracker,
}

impl Interpreter {
    pub fn new() -> Self {
        Self::with_config(InterpreterConfig::default())
    }

    pub fn with_config(config: InterpreterConfig) -> Self {
        Self::with_builtins(config, &Builtins::standard())
    }

    /// Build a context whose global environment holds exactly `builtins`.
    pub fn with_builtins(config: InterpreterConfig, builtins: &Builtins) -> Self {
        let global = Environment::global();
        builtins.install(&global);

        let mut environments = EnvironmentTracker::new();
        environments.track(&global);

        Self {
            control: None,
            env: global.cheap_clone(),
            stack: ContinuationStack::new(),
            outer: vec![global],
            errors: Vec::new(),
            running: false,
            steps: 0,
            max_stack_depth: config.max_stack_depth,
            load_prelude: config.load_prelude,
            prelude_loaded: false,
            console: config.console,
            time: config.time,
            random: config.random,
            string_dict: StringDict::with_common_strings(),
            environments,
        }
    }

    // ═══════════════════════════════════════════════════════════════
    // Driver
    // ═══════════════════════════════════════════════════════════════

    /// Parse `source` and load it as the next program to run.
    pub fn prepare(&mut self, source: &str) -> Result<(), Error> {
        if self.load_prelude && !self.prelude_loaded {
            self.prelude_loaded = true;
            self.load_preludes()?;
        }
        self.install(source)
    }

    fn install(&mut self, source: &str) -> Result<(), Error> {
        let program = Parser::new(source, &mut self.string_dict).parse_program()?;
        debug!(statements = program.body.len(), "program prepared");

        self.control = Some(Control::Program(Rc::new(program)));
        self.stack = ContinuationStack::new();
        self.running = true;
        self.steps = 0;
        Ok(())
    }

    fn load_preludes(&mut self) -> Result<(), Error> {
        for (name, source) in builtins::prelude::PRELUDES {
            self.install(source)?;
            match self.run(None) {
                Outcome::Finished(_) | Outcome::Suspended => {}
                Outcome::Error(e) => return Err(e),
            }
            debug!(prelude = name, steps = self.steps, "prelude loaded");
        }
        Ok(())
    }

    /// Perform one machine transition.
    pub fn step(&mut self) -> Result<StepResult, Error> {
        let Some(control) = self.control.take() else {
            return Ok(StepResult::Done);
        };

        if let Control::Value(value) = &control {
            if matches!(self.stack.peek(), Some(Continuation::Empty)) {
                let value = value.cheap_clone();
                if self.running {
                    self.running = false;
                    debug!(steps = self.steps, "program finished");
                }
                self.control = Some(control);
                return Ok(StepResult::Complete(value));
            }
        }

        self.steps += 1;
        trace!(
            step = self.steps,
            control = control.kind(),
            depth = self.stack.len(),
            "step"
        );

        match self.transition(control) {
            Ok(next) => {
                self.control = Some(next);
                let depth = self.stack.len();
                if depth > self.max_stack_depth {
                    debug!(depth, steps = self.steps, "stack overflow");
                    self.reset_machine();
                    return Err(Error::StackOverflow { depth });
                }
                Ok(StepResult::Continue)
            }
            Err(e) => Err(self.raise(e)),
        }
    }

    /// Drive the loaded program. With `max_steps`, at most that many
    /// transitions are made before returning [`Outcome::Suspended`].
    pub fn run(&mut self, max_steps: Option<u64>) -> Outcome {
        let mut budget = max_steps;
        loop {
            if budget == Some(0) {
                return Outcome::Suspended;
            }
            match self.step() {
                Ok(StepResult::Continue) => {
                    if let Some(remaining) = budget.as_mut() {
                        *remaining -= 1;
                    }
                }
                Ok(StepResult::Complete(value)) => return Outcome::Finished(value),
                Ok(StepResult::Done) => return Outcome::Finished(Value::Undefined),
                Err(e) => return Outcome::Error(e),
            }
        }
    }

    /// Prepare and run `source` to completion.
    pub fn eval(&mut self, source: &str) -> Result<Value, Error> {
        self.prepare(source)?;
        match self.run(None) {
            Outcome::Finished(value) => Ok(value),
            Outcome::Error(e) => Err(e),
            Outcome::Suspended => Ok(Value::Undefined),
        }
    }

    /// The single funnel for modeled runtime errors: record, unwind the
    /// machine to the outermost preserved environment, stop.
    fn raise(&mut self, error: RuntimeError) -> Error {
        debug!(steps = self.steps, error = %error, "program aborted");
        self.errors.push(error.clone());
        self.reset_machine();
        Error::Runtime(error)
    }

    fn reset_machine(&mut self) {
        if let Some(outermost) = self.outer.last() {
            self.env = outermost.cheap_clone();
        }
        self.stack = ContinuationStack::new();
        self.control = None;
        self.running = false;
    }

    // ═══════════════════════════════════════════════════════════════
    // Inspection
    // ═══════════════════════════════════════════════════════════════

    pub fn control(&self) -> Option<&Control> {
        self.control.as_ref()
    }

    pub fn environment(&self) -> &Environment {
        &self.env
    }

    pub fn stack(&self) -> &ContinuationStack {
        &self.stack
    }

    pub fn stack_depth(&self) -> usize {
        self.stack.len()
    }

    /// Every runtime error raised in this context, oldest first.
    pub fn errors(&self) -> &[RuntimeError] {
        &self.errors
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Transitions taken by the current (or last) program.
    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Number of preserved outer environments: global plus one per program
    /// that has been started.
    pub fn outer_count(&self) -> usize {
        self.outer.len()
    }

    /// True when the control is a value and only the terminal frame remains.
    pub fn is_final(&self) -> bool {
        matches!(self.control, Some(Control::Value(_)))
            && matches!(self.stack.peek(), Some(Continuation::Empty))
    }

    // ═══════════════════════════════════════════════════════════════
    // Host services used by builtins
    // ═══════════════════════════════════════════════════════════════

    pub(crate) fn console(&self) -> &dyn ConsoleProvider {
        self.console.as_ref()
    }

    pub(crate) fn time(&self) -> &dyn TimeProvider {
        self.time.as_ref()
    }

    pub(crate) fn random_mut(&mut self) -> &mut dyn RandomProvider {
        self.random.as_mut()
    }

    /// Create a child of `parent` that is released with this context.
    pub(crate) fn new_environment(&mut self, parent: &Environment, name: &str) -> Environment {
        let env = parent.child(self.string_dict.get_or_insert(name));
        self.environments.track(&env);
        env
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Interpreter {
    fn drop(&mut self) {
        self.environments.release_all();
    }
}
