//! Function application
//!
//! The callee of a `FnEval` frame is a closure, a builtin or a captured
//! continuation. `call_cc`, `reset` and `shift` are builtins whose
//! implementation needs the machine registers, so they are handled here
//! rather than through the native calling convention.

use std::rc::Rc;

use tracing::trace;

use crate::ast::Statement;
use crate::error::RuntimeError;
use crate::lexer::Span;
use crate::value::{
    Arity, Builtin, BuiltinFunction, Callee, CheapClone, ControlOperator, SourceString, Value,
};

use super::closure::Closure;
use super::stack::{CapturedContinuation, Continuation, ContinuationKind, ContinuationStack};
use super::{Control, Interpreter, RETURN_POINT};

fn check_arity(arity: Arity, got: usize, span: Span) -> Result<(), RuntimeError> {
    if arity.accepts(got) {
        Ok(())
    } else {
        Err(RuntimeError::InvalidNumberOfArguments {
            expected: arity.required(),
            got,
            variadic: arity.is_variadic(),
            span,
        })
    }
}

impl Interpreter {
    pub(super) fn apply(
        &mut self,
        callee: &Value,
        args: Vec<Value>,
        span: Span,
    ) -> Result<Control, RuntimeError> {
        match callee.as_callee() {
            Some(Callee::Closure(closure)) => self.apply_closure(closure, args, span),
            Some(Callee::Builtin(builtin)) => self.apply_builtin(builtin, args, span),
            Some(Callee::Continuation(k)) => self.resume(k, args, span),
            None => Err(RuntimeError::CallingNonFunctionValue {
                value: callee.stringify(),
                span,
            }),
        }
    }

    fn apply_closure(
        &mut self,
        closure: &Rc<Closure>,
        args: Vec<Value>,
        span: Span,
    ) -> Result<Control, RuntimeError> {
        check_arity(closure.arity(), args.len(), span)?;

        let call_env = self.new_environment(closure.env(), closure.display_name().as_str());
        let mut args = args.into_iter();
        for param in closure.params() {
            let value = if param.is_rest {
                Value::list(args.by_ref())
            } else {
                args.next().unwrap_or_default()
            };
            call_env.define(&param.name.name, value, true);
        }

        // Returning jumps back to the stack as it is right now, with the
        // caller's environment.
        let return_point = CapturedContinuation::new(
            ContinuationKind::Undelimited,
            self.env.cheap_clone(),
            self.stack.cheap_clone(),
        );
        call_env.define(
            &SourceString::from(RETURN_POINT),
            Value::Continuation(Rc::new(return_point)),
            false,
        );

        self.env = call_env;
        Ok(Control::Statement(Statement::Block(closure.body().cheap_clone())))
    }

    fn apply_builtin(
        &mut self,
        builtin: &Rc<Builtin>,
        args: Vec<Value>,
        span: Span,
    ) -> Result<Control, RuntimeError> {
        check_arity(builtin.arity, args.len(), span)?;

        match builtin.function {
            BuiltinFunction::Native(f) => {
                let result = f(self, &args).map_err(|e| e.at(span))?;
                Ok(Control::Value(result))
            }
            BuiltinFunction::Control(operator) => {
                let f = args.into_iter().next().unwrap_or_default();
                self.apply_control(operator, f, span)
            }
        }
    }

    fn apply_control(
        &mut self,
        operator: ControlOperator,
        f: Value,
        span: Span,
    ) -> Result<Control, RuntimeError> {
        match operator {
            ControlOperator::CallCc => {
                let k = self.capture(ContinuationKind::Undelimited, self.stack.cheap_clone());
                Ok(self.call_with(f, vec![k], span))
            }
            ControlOperator::Reset => {
                self.stack.push(Continuation::Delimiter);
                Ok(self.call_with(f, Vec::new(), span))
            }
            ControlOperator::Shift => {
                let segment = self
                    .stack
                    .split_at_delimiter()
                    .ok_or(RuntimeError::ShiftWithoutReset { span })?;
                let k = self.capture(ContinuationKind::Delimited, segment);
                Ok(self.call_with(f, vec![k], span))
            }
        }
    }

    fn capture(&self, kind: ContinuationKind, frames: ContinuationStack) -> Value {
        trace!(kind = kind.as_str(), frames = frames.len(), "continuation captured");
        Value::Continuation(Rc::new(CapturedContinuation::new(
            kind,
            self.env.cheap_clone(),
            frames,
        )))
    }

    /// Schedule `callee(args)` as the next application.
    fn call_with(&mut self, callee: Value, args: Vec<Value>, span: Span) -> Control {
        self.stack.push(Continuation::FnEval {
            callee: callee.cheap_clone(),
            args,
            span,
            env: self.env.cheap_clone(),
        });
        Control::Value(callee)
    }

    fn resume(
        &mut self,
        k: &Rc<CapturedContinuation>,
        args: Vec<Value>,
        span: Span,
    ) -> Result<Control, RuntimeError> {
        check_arity(Arity::Exact(1), args.len(), span)?;
        trace!(
            kind = k.kind().as_str(),
            frames = k.frames().len(),
            "continuation resumed"
        );

        self.env = k.env().cheap_clone();
        match k.kind() {
            ContinuationKind::Undelimited => self.stack = k.frames().cheap_clone(),
            ContinuationKind::Delimited => self.stack.splice(k.frames()),
        }
        Ok(Control::Value(args.into_iter().next().unwrap_or_default()))
    }
}
