//! Machine transitions
//!
//! Unreduced control is dispatched on node kind and pushes the frame that
//! will receive its subexpression's value. A value is handed to the frame on
//! top of the stack.

use std::rc::Rc;

use crate::ast::{
    AssignmentOp, AssignmentTarget, BinaryOp, Expression, LiteralValue,
    LogicalOp, Program, Statement, UnaryOp,
};
use crate::error::RuntimeError;
use crate::lexer::Span;
use crate::value::{CheapClone, Value};

use super::closure::Closure;
use super::environment::Environment;
use super::rttc;
use super::stack::Continuation;
use super::{Control, Interpreter, RETURN_POINT};

impl Interpreter {
    pub(super) fn transition(&mut self, control: Control) -> Result<Control, RuntimeError> {
        match control {
            Control::Program(program) => self.enter_program(&program),
            Control::Statement(statement) => self.step_statement(statement),
            Control::Expression(expression) => self.step_expression(expression),
            Control::Value(value) => self.continue_with(value),
        }
    }

    fn enter_program(&mut self, program: &Program) -> Result<Control, RuntimeError> {
        let parent = self.outer.last().cloned().unwrap_or_else(|| self.env.cheap_clone());
        let program_env = self.new_environment(&parent, "programEnvironment");
        self.outer.push(program_env.cheap_clone());
        // top-level declarations live in the program environment itself so
        // that later programs can see them
        self.schedule(program_env, &program.body)
    }

    /// Push a block environment and run `body` in it.
    fn enter_block(&mut self, body: &Rc<[Statement]>) -> Result<Control, RuntimeError> {
        let parent = self.env.cheap_clone();
        let block_env = self.new_environment(&parent, "blockEnvironment");
        self.schedule(block_env, body)
    }

    /// Hoist the declarations of `body` into `env` and schedule its
    /// statements as `Exec` frames.
    fn schedule(&mut self, env: Environment, body: &Rc<[Statement]>) -> Result<Control, RuntimeError> {
        hoist(&env, body)?;
        self.env = env;

        let Some((first, rest)) = body.split_first() else {
            return Ok(Control::Value(Value::Undefined));
        };
        for statement in rest.iter().rev() {
            self.stack.push(Continuation::Exec {
                statement: statement.cheap_clone(),
                env: self.env.cheap_clone(),
            });
        }
        Ok(Control::Statement(first.cheap_clone()))
    }

    fn step_statement(&mut self, statement: Statement) -> Result<Control, RuntimeError> {
        match statement {
            Statement::VariableDeclaration(decl) => {
                let mutable = decl.kind.is_mutable();
                self.env.check_unassigned(&decl.id, mutable)?;
                self.stack.push(Continuation::VarDecl {
                    id: decl.id.cheap_clone(),
                    mutable,
                    env: self.env.cheap_clone(),
                });
                Ok(Control::Expression(decl.init.cheap_clone()))
            }

            Statement::FunctionDeclaration(function) => {
                let Some(id) = function.id.clone() else {
                    return Err(RuntimeError::unsupported(
                        "anonymous function declaration",
                        function.span,
                    ));
                };
                self.env.check_unassigned(&id, false)?;
                self.stack.push(Continuation::VarDecl {
                    id,
                    mutable: false,
                    env: self.env.cheap_clone(),
                });
                let closure = Closure::new(function, self.env.cheap_clone());
                Ok(Control::Value(Value::Closure(Rc::new(closure))))
            }

            Statement::Block(block) => self.enter_block(&block.body),

            Statement::If(node) => {
                self.stack.push(Continuation::If {
                    consequent: Control::Statement(node.consequent.cheap_clone()),
                    alternate: match &node.alternate {
                        Some(alternate) => Control::Statement(alternate.cheap_clone()),
                        None => Control::Value(Value::Undefined),
                    },
                    span: node.test.span(),
                    env: self.env.cheap_clone(),
                });
                Ok(Control::Expression(node.test.cheap_clone()))
            }

            Statement::Return(node) => {
                let Some(return_point) = self.env.lookup(RETURN_POINT) else {
                    return Err(RuntimeError::ReturnOutsideFunction { span: node.span });
                };
                // `return e` is a one-argument call of the return point
                self.stack.push(Continuation::FnArg {
                    arguments: Rc::from(Vec::new()),
                    next: 0,
                    evaluated: Vec::with_capacity(1),
                    callee: return_point,
                    span: node.span,
                    env: self.env.cheap_clone(),
                });
                Ok(match &node.argument {
                    Some(argument) => Control::Expression(argument.cheap_clone()),
                    None => Control::Value(Value::Undefined),
                })
            }

            Statement::Expression(node) => Ok(Control::Expression(node.expression.cheap_clone())),

            other => Err(RuntimeError::unsupported(
                other.unsupported_name().unwrap_or("statement"),
                other.span(),
            )),
        }
    }

    fn step_expression(&mut self, expression: Expression) -> Result<Control, RuntimeError> {
        match expression {
            Expression::Literal(literal) => Ok(Control::Value(match literal.value {
                LiteralValue::Null => Value::Null,
                LiteralValue::Boolean(b) => Value::Boolean(b),
                LiteralValue::Number(n) => Value::Number(n),
                LiteralValue::String(s) => Value::String(s),
            })),

            Expression::Identifier(id) => Ok(Control::Value(self.env.get(&id)?)),

            Expression::Function(function) => Ok(Control::Value(Value::Closure(Rc::new(
                Closure::new(function, self.env.cheap_clone()),
            )))),

            Expression::Call(call) => {
                let callee = call.callee.cheap_clone();
                self.stack.push(Continuation::CallExpr {
                    call,
                    env: self.env.cheap_clone(),
                });
                Ok(Control::Expression(callee))
            }

            Expression::Unary(node) => {
                if node.operator == UnaryOp::Typeof {
                    return Err(RuntimeError::unsupported("typeof operator", node.span));
                }
                let argument = node.argument.cheap_clone();
                self.stack.push(Continuation::UnaryArg {
                    node,
                    env: self.env.cheap_clone(),
                });
                Ok(Control::Expression(argument))
            }

            Expression::Binary(node) => {
                if matches!(node.operator, BinaryOp::Eq | BinaryOp::NotEq) {
                    return Err(RuntimeError::unsupported(
                        format!("{} operator", node.operator),
                        node.span,
                    ));
                }
                let left = node.left.cheap_clone();
                self.stack.push(Continuation::BinaryRight {
                    node,
                    env: self.env.cheap_clone(),
                });
                Ok(Control::Expression(left))
            }

            // a && b  =>  a ? b : false
            // a || b  =>  a ? true : b
            Expression::Logical(node) => {
                let right = Control::Expression(node.right.cheap_clone());
                let (consequent, alternate) = match node.operator {
                    LogicalOp::And => (right, Control::Value(Value::Boolean(false))),
                    LogicalOp::Or => (Control::Value(Value::Boolean(true)), right),
                    LogicalOp::NullishCoalescing => {
                        return Err(RuntimeError::unsupported("?? operator", node.span));
                    }
                };
                self.push_branch(consequent, alternate, node.left.span());
                Ok(Control::Expression(node.left.cheap_clone()))
            }

            Expression::Conditional(node) => {
                self.push_branch(
                    Control::Expression(node.consequent.cheap_clone()),
                    Control::Expression(node.alternate.cheap_clone()),
                    node.test.span(),
                );
                Ok(Control::Expression(node.test.cheap_clone()))
            }

            Expression::Assignment(node) => {
                let id = match (&node.operator, &node.target) {
                    (AssignmentOp::Assign, AssignmentTarget::Identifier(id)) => id.cheap_clone(),
                    (AssignmentOp::Assign, AssignmentTarget::Member(_)) => {
                        return Err(RuntimeError::unsupported("member assignment", node.span));
                    }
                    (op, _) => {
                        return Err(RuntimeError::unsupported(
                            format!("{op} assignment"),
                            node.span,
                        ));
                    }
                };
                self.stack.push(Continuation::Assign {
                    id,
                    env: self.env.cheap_clone(),
                });
                Ok(Control::Expression(node.value.cheap_clone()))
            }

            other => Err(RuntimeError::unsupported(
                other.unsupported_name().unwrap_or("expression"),
                other.span(),
            )),
        }
    }

    fn push_branch(&mut self, consequent: Control, alternate: Control, span: Span) {
        self.stack.push(Continuation::If {
            consequent,
            alternate,
            span,
            env: self.env.cheap_clone(),
        });
    }

    /// Hand a reduced value to the frame on top of the stack.
    fn continue_with(&mut self, value: Value) -> Result<Control, RuntimeError> {
        let Some(frame) = self.stack.pop() else {
            return Err(RuntimeError::InvalidContinuationStack {
                span: Span::default(),
            });
        };
        if let Some(env) = frame.env() {
            self.env = env.cheap_clone();
        }

        match frame {
            Continuation::Empty => {
                // terminal frame stays in place
                self.stack.push(Continuation::Empty);
                Ok(Control::Value(value))
            }

            Continuation::Exec { statement, .. } => Ok(Control::Statement(statement)),

            Continuation::UnaryArg { node, .. } => {
                Ok(Control::Value(rttc::unary(node.operator, &value, node.span)?))
            }

            Continuation::BinaryRight { node, env } => {
                let right = node.right.cheap_clone();
                self.stack.push(Continuation::BinaryBoth {
                    node,
                    left: value,
                    env,
                });
                Ok(Control::Expression(right))
            }

            Continuation::BinaryBoth { node, left, .. } => Ok(Control::Value(rttc::binary(
                node.operator,
                &left,
                &value,
                node.span,
            )?)),

            Continuation::VarDecl { id, mutable, env } => {
                env.define(&id.name, value, mutable);
                Ok(Control::Value(Value::Undefined))
            }

            Continuation::Assign { id, env } => {
                env.set(&id, value)?;
                Ok(Control::Value(Value::Undefined))
            }

            Continuation::CallExpr { call, env } => {
                let Some(first) = call.arguments.first() else {
                    self.stack.push(Continuation::FnEval {
                        callee: value.cheap_clone(),
                        args: Vec::new(),
                        span: call.span,
                        env,
                    });
                    return Ok(Control::Value(value));
                };
                let first = first.cheap_clone();
                self.stack.push(Continuation::FnArg {
                    arguments: call.arguments.cheap_clone(),
                    next: 1,
                    evaluated: Vec::with_capacity(call.arguments.len()),
                    callee: value,
                    span: call.span,
                    env,
                });
                Ok(Control::Expression(first))
            }

            Continuation::FnArg {
                arguments,
                next,
                mut evaluated,
                callee,
                span,
                env,
            } => {
                evaluated.push(value);
                if let Some(argument) = arguments.get(next) {
                    let argument = argument.cheap_clone();
                    self.stack.push(Continuation::FnArg {
                        arguments,
                        next: next + 1,
                        evaluated,
                        callee,
                        span,
                        env,
                    });
                    return Ok(Control::Expression(argument));
                }
                self.stack.push(Continuation::FnEval {
                    callee: callee.cheap_clone(),
                    args: evaluated,
                    span,
                    env,
                });
                Ok(Control::Value(callee))
            }

            Continuation::FnEval {
                callee, args, span, ..
            } => self.apply(&callee, args, span),

            Continuation::If {
                consequent,
                alternate,
                span,
                ..
            } => {
                if rttc::condition(&value, span)? {
                    Ok(consequent)
                } else {
                    Ok(alternate)
                }
            }

            Continuation::Delimiter => Ok(Control::Value(value)),
        }
    }
}

/// Pre-declare the `let`/`const` names and function declaration names at the
/// top level of a block. Nested blocks hoist on their own entry.
fn hoist(env: &Environment, body: &[Statement]) -> Result<(), RuntimeError> {
    for statement in body {
        match statement {
            Statement::VariableDeclaration(decl) => env.declare(&decl.id, decl.kind.is_mutable())?,
            Statement::FunctionDeclaration(function) => {
                if let Some(id) = &function.id {
                    env.declare(id, false)?;
                }
            }
            _ => {}
        }
    }
    Ok(())
}
