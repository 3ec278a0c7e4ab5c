//! User-defined function values

use std::rc::Rc;

use crate::ast::{BlockStatement, Function, FunctionParam};
use crate::lexer::Span;
use crate::value::{Arity, SourceString};

use super::environment::Environment;

/// A function value: the function node, the environment it was created in,
/// and the name it is displayed under. Immutable once built.
pub struct Closure {
    function: Rc<Function>,
    env: Environment,
    display_name: SourceString,
}

impl Closure {
    pub fn new(function: Rc<Function>, env: Environment) -> Self {
        let display_name = match &function.id {
            Some(id) => id.name.clone(),
            None => SourceString::from(anonymous_signature(&function)),
        };
        Self {
            function,
            env,
            display_name,
        }
    }

    pub fn params(&self) -> &[FunctionParam] {
        &self.function.params
    }

    pub fn body(&self) -> &Rc<BlockStatement> {
        &self.function.body
    }

    pub fn env(&self) -> &Environment {
        &self.env
    }

    pub fn display_name(&self) -> &SourceString {
        &self.display_name
    }

    pub fn span(&self) -> Span {
        self.function.span
    }

    /// A trailing rest parameter turns the count of the others into a minimum.
    pub fn arity(&self) -> Arity {
        let params = self.params();
        match params.last() {
            Some(last) if last.is_rest => Arity::Minimum(params.len() - 1),
            _ => Arity::Exact(params.len()),
        }
    }
}

/// `x => ...` for a single plain parameter, `(a, ...rest) => ...` otherwise.
fn anonymous_signature(function: &Function) -> String {
    let params: Vec<String> = function
        .params
        .iter()
        .map(|p| {
            if p.is_rest {
                format!("...{}", p.name.name)
            } else {
                p.name.name.to_string()
            }
        })
        .collect();

    match params.as_slice() {
        [single] if function.is_arrow && !single.starts_with("...") => format!("{single} => ..."),
        _ if function.is_arrow => format!("({}) => ...", params.join(", ")),
        _ => format!("function ({}) {{...}}", params.join(", ")),
    }
}
