//! Continuation frames and the continuation stack
//!
//! The stack is a persistent singly linked list: capturing it for `call_cc`
//! or a function's return point is an O(1) reference-count bump, and frames
//! shared with a capture are copied lazily when popped.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::ast::{BinaryExpression, CallExpression, Expression, Identifier, Statement, UnaryExpression};
use crate::lexer::Span;
use crate::value::{CheapClone, Value};

use super::Control;
use super::environment::Environment;

/// What to do with the next value the machine produces.
///
/// Every frame except `Empty` and `Delimiter` remembers the environment that
/// was current when it was pushed.
#[derive(Clone)]
pub enum Continuation {
    /// Bottom of every complete stack
    Empty,
    /// Run the next statement of a block
    Exec { statement: Statement, env: Environment },
    UnaryArg {
        node: Rc<UnaryExpression>,
        env: Environment,
    },
    /// Left operand pending, right not yet evaluated
    BinaryRight {
        node: Rc<BinaryExpression>,
        env: Environment,
    },
    /// Left operand known, waiting for the right one
    BinaryBoth {
        node: Rc<BinaryExpression>,
        left: Value,
        env: Environment,
    },
    VarDecl {
        id: Identifier,
        mutable: bool,
        env: Environment,
    },
    Assign { id: Identifier, env: Environment },
    /// Waiting for the callee of a call expression
    CallExpr {
        call: Rc<CallExpression>,
        env: Environment,
    },
    /// Collecting arguments; `arguments[next..]` are still unevaluated
    FnArg {
        arguments: Rc<[Expression]>,
        next: usize,
        evaluated: Vec<Value>,
        callee: Value,
        span: Span,
        env: Environment,
    },
    /// Callee and arguments ready
    FnEval {
        callee: Value,
        args: Vec<Value>,
        span: Span,
        env: Environment,
    },
    /// Shared by `if` statements, conditional and logical expressions
    If {
        consequent: Control,
        alternate: Control,
        span: Span,
        env: Environment,
    },
    /// Marker pushed by `reset`
    Delimiter,
}

impl Continuation {
    pub fn env(&self) -> Option<&Environment> {
        match self {
            Continuation::Empty | Continuation::Delimiter => None,
            Continuation::Exec { env, .. }
            | Continuation::UnaryArg { env, .. }
            | Continuation::BinaryRight { env, .. }
            | Continuation::BinaryBoth { env, .. }
            | Continuation::VarDecl { env, .. }
            | Continuation::Assign { env, .. }
            | Continuation::CallExpr { env, .. }
            | Continuation::FnArg { env, .. }
            | Continuation::FnEval { env, .. }
            | Continuation::If { env, .. } => Some(env),
        }
    }

    pub fn tag(&self) -> &'static str {
        match self {
            Continuation::Empty => "Empty",
            Continuation::Exec { .. } => "Exec",
            Continuation::UnaryArg { .. } => "UnaryArg",
            Continuation::BinaryRight { .. } => "BinaryRight",
            Continuation::BinaryBoth { .. } => "BinaryBoth",
            Continuation::VarDecl { .. } => "VarDecl",
            Continuation::Assign { .. } => "Assign",
            Continuation::CallExpr { .. } => "CallExpr",
            Continuation::FnArg { .. } => "FnArg",
            Continuation::FnEval { .. } => "FnEval",
            Continuation::If { .. } => "If",
            Continuation::Delimiter => "Delimiter",
        }
    }
}

struct Link {
    continuation: Continuation,
    next: Option<Rc<Link>>,
}

/// Stack of continuation frames, top first.
///
/// `ContinuationStack::new()` starts with the `Empty` terminal frame; a
/// segment cut out by `shift` has no terminal frame of its own.
#[derive(Clone)]
pub struct ContinuationStack {
    head: Option<Rc<Link>>,
    len: usize,
}

impl CheapClone for ContinuationStack {}

impl ContinuationStack {
    pub fn new() -> Self {
        let mut stack = Self::segment();
        stack.push(Continuation::Empty);
        stack
    }

    fn segment() -> Self {
        Self { head: None, len: 0 }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn push(&mut self, continuation: Continuation) {
        let next = self.head.take();
        self.head = Some(Rc::new(Link { continuation, next }));
        self.len += 1;
    }

    pub fn pop(&mut self) -> Option<Continuation> {
        let link = self.head.take()?;
        self.len -= 1;
        match Rc::try_unwrap(link) {
            Ok(Link { continuation, next }) => {
                self.head = next;
                Some(continuation)
            }
            // shared with a captured continuation
            Err(shared) => {
                self.head = shared.next.clone();
                Some(shared.continuation.clone())
            }
        }
    }

    pub fn peek(&self) -> Option<&Continuation> {
        self.head.as_deref().map(|link| &link.continuation)
    }

    /// Frames from top to bottom.
    pub fn iter(&self) -> impl Iterator<Item = &Continuation> {
        std::iter::successors(self.head.as_deref(), |link| link.next.as_deref())
            .map(|link| &link.continuation)
    }

    /// Remove every frame above the nearest `Delimiter`, then the delimiter
    /// itself, returning the removed frames as a segment. Returns `None` and
    /// leaves the stack untouched when there is no delimiter.
    pub fn split_at_delimiter(&mut self) -> Option<ContinuationStack> {
        let position = self
            .iter()
            .position(|c| matches!(c, Continuation::Delimiter))?;

        let mut frames = Vec::with_capacity(position);
        for _ in 0..position {
            frames.extend(self.pop());
        }
        self.pop();

        let mut segment = Self::segment();
        for frame in frames.into_iter().rev() {
            segment.push(frame);
        }
        Some(segment)
    }

    /// Push a copy of `segment` on top of this stack, preserving its order.
    pub fn splice(&mut self, segment: &ContinuationStack) {
        let frames: Vec<Continuation> = segment.iter().cloned().collect();
        for frame in frames.into_iter().rev() {
            self.push(frame);
        }
    }
}

impl Default for ContinuationStack {
    fn default() -> Self {
        Self::new()
    }
}

thread_local! {
    static DEFERRED_FRAMES: RefCell<Vec<Continuation>> = const { RefCell::new(Vec::new()) };
    static DRAINING: Cell<bool> = const { Cell::new(false) };
}

/// Frames own environments, which own captured stacks, which own frames. To
/// keep teardown of a deep stack from recursing through that chain, uniquely
/// owned frames are queued and dropped by a single loop on the outermost
/// drop.
impl Drop for ContinuationStack {
    fn drop(&mut self) {
        let mut released = Vec::new();
        let mut next = self.head.take();
        while let Some(link) = next {
            match Rc::try_unwrap(link) {
                Ok(Link {
                    continuation,
                    next: rest,
                }) => {
                    released.push(continuation);
                    next = rest;
                }
                Err(_) => break,
            }
        }
        if released.is_empty() {
            return;
        }

        let queued = DEFERRED_FRAMES
            .try_with(|queue| queue.borrow_mut().append(&mut released))
            .is_ok();
        if !queued || DRAINING.get() {
            return;
        }

        DRAINING.set(true);
        loop {
            let batch = DEFERRED_FRAMES
                .try_with(|queue| std::mem::take(&mut *queue.borrow_mut()))
                .unwrap_or_default();
            if batch.is_empty() {
                break;
            }
            drop(batch);
        }
        DRAINING.set(false);
    }
}

/// Which of the two capture disciplines produced a continuation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContinuationKind {
    /// Whole stack, from `call_cc` or a return point; invoking it replaces
    /// the current stack
    Undelimited,
    /// Frames up to a `reset`, from `shift`; invoking it pushes them on top of
    /// the current stack
    Delimited,
}

impl ContinuationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ContinuationKind::Undelimited => "undelimited",
            ContinuationKind::Delimited => "delimited",
        }
    }
}

/// A first-class continuation value.
pub struct CapturedContinuation {
    kind: ContinuationKind,
    env: Environment,
    frames: ContinuationStack,
}

impl CapturedContinuation {
    pub fn new(kind: ContinuationKind, env: Environment, frames: ContinuationStack) -> Self {
        Self { kind, env, frames }
    }

    pub fn kind(&self) -> ContinuationKind {
        self.kind
    }

    pub fn env(&self) -> &Environment {
        &self.env
    }

    pub fn frames(&self) -> &ContinuationStack {
        &self.frames
    }
}
