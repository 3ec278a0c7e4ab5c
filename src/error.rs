//! Error types for the Source interpreter

use thiserror::Error;

use crate::lexer::Span;
use crate::value::SourceString;

/// Source location information for syntax errors
#[derive(Debug, Clone, PartialEq)]
pub struct SourceLocation {
    pub line: u32,
    pub column: u32,
}

impl std::fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Errors raised while stepping a program.
///
/// Every variant carries the span of the node that raised it; the `Display`
/// form is prefixed with the line number.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RuntimeError {
    #[error("Line {}: Cannot redeclare {} {name}.", .span.line, binding_kind(.mutable))]
    VariableRedeclaration {
        name: SourceString,
        mutable: bool,
        span: Span,
    },

    #[error("Line {}: Name {name} declared later in current scope but not yet assigned", .span.line)]
    UnassignedVariable { name: SourceString, span: Span },

    #[error("Line {}: Name {name} not declared.", .span.line)]
    UndefinedVariable { name: SourceString, span: Span },

    #[error("Line {}: Cannot assign new value to constant {name}.", .span.line)]
    ConstAssignment { name: SourceString, span: Span },

    #[error("Line {}: Expected {expected}{} arguments, but got {got}.", .span.line, or_more(.variadic))]
    InvalidNumberOfArguments {
        expected: usize,
        got: usize,
        variadic: bool,
        span: Span,
    },

    #[error("Line {}: Calling non-function value {value}.", .span.line)]
    CallingNonFunctionValue { value: String, span: Span },

    #[error("Line {}: Continuation stack exhausted unexpectedly.", .span.line)]
    InvalidContinuationStack { span: Span },

    #[error("Line {}: shift called without an enclosing reset.", .span.line)]
    ShiftWithoutReset { span: Span },

    #[error("Line {}: Expected {expected}{position}, got {got}.", .span.line)]
    TypeError {
        expected: &'static str,
        position: &'static str,
        got: &'static str,
        span: Span,
    },

    #[error("Line {}: {construct} is not supported.", .span.line)]
    UnsupportedConstruct {
        construct: String,
        span: Span,
    },

    #[error("Line {}: Illegal return statement outside of a function.", .span.line)]
    ReturnOutsideFunction { span: Span },

    #[error("Line {}: {name}: {message}", .span.line)]
    Builtin {
        name: SourceString,
        message: String,
        span: Span,
    },
}

fn binding_kind(mutable: &bool) -> &'static str {
    if *mutable { "variable" } else { "constant" }
}

fn or_more(variadic: &bool) -> &'static str {
    if *variadic { " or more" } else { "" }
}

impl RuntimeError {
    /// Error raised from inside a native builtin. The span is filled in by the
    /// call site.
    pub fn builtin(name: &str, message: impl Into<String>) -> Self {
        RuntimeError::Builtin {
            name: SourceString::from(name),
            message: message.into(),
            span: Span::default(),
        }
    }

    pub fn unsupported(construct: impl Into<String>, span: Span) -> Self {
        RuntimeError::UnsupportedConstruct {
            construct: construct.into(),
            span,
        }
    }

    /// Attach the call-site span to an error raised by a builtin.
    pub fn at(mut self, call_span: Span) -> Self {
        if let RuntimeError::Builtin { span, .. } = &mut self {
            *span = call_span;
        }
        self
    }

    pub fn span(&self) -> Span {
        match self {
            RuntimeError::VariableRedeclaration { span, .. }
            | RuntimeError::UnassignedVariable { span, .. }
            | RuntimeError::UndefinedVariable { span, .. }
            | RuntimeError::ConstAssignment { span, .. }
            | RuntimeError::InvalidNumberOfArguments { span, .. }
            | RuntimeError::CallingNonFunctionValue { span, .. }
            | RuntimeError::InvalidContinuationStack { span }
            | RuntimeError::ShiftWithoutReset { span }
            | RuntimeError::TypeError { span, .. }
            | RuntimeError::UnsupportedConstruct { span, .. }
            | RuntimeError::ReturnOutsideFunction { span }
            | RuntimeError::Builtin { span, .. } => *span,
        }
    }
}

/// Top-level error type returned by the parser, driver and `Runtime`.
#[derive(Debug, Error)]
pub enum Error {
    #[error("SyntaxError: {message} at {location}")]
    Syntax {
        message: String,
        location: SourceLocation,
    },

    #[error(transparent)]
    Runtime(#[from] RuntimeError),

    /// The continuation stack grew past the configured limit. Not recorded
    /// among the context's runtime errors.
    #[error("Maximum call stack size exceeded (stack depth {depth})")]
    StackOverflow { depth: usize },
}

impl Error {
    pub fn syntax_error(message: impl Into<String>, line: u32, column: u32) -> Self {
        Error::Syntax {
            message: message.into(),
            location: SourceLocation { line, column },
        }
    }

    pub fn is_stack_overflow(&self) -> bool {
        matches!(self, Error::StackOverflow { .. })
    }

    pub fn as_runtime(&self) -> Option<&RuntimeError> {
        match self {
            Error::Runtime(e) => Some(e),
            _ => None,
        }
    }
}
