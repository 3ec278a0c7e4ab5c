//! Lexical environments
//!
//! An [`Environment`] is one frame of bindings plus a link to its parent.
//! Frames are shared (`Rc`) between the closures and continuation frames that
//! captured them, and only ever grow or update slots in place.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use indexmap::IndexMap;
use rustc_hash::FxBuildHasher;

use crate::ast::Identifier;
use crate::error::RuntimeError;
use crate::value::{CheapClone, SourceString, Value};

pub type Frame = IndexMap<SourceString, Slot, FxBuildHasher>;

/// A binding in a frame.
#[derive(Clone)]
pub enum Slot {
    /// Declared by hoisting, initializer not yet run (temporal dead zone)
    Unassigned,
    Value { value: Value, mutable: bool },
}

pub struct EnvironmentNode {
    name: SourceString,
    tail: Option<Environment>,
    frame: RefCell<Frame>,
}

#[derive(Clone)]
pub struct Environment(Rc<EnvironmentNode>);

impl CheapClone for Environment {}

impl Environment {
    pub fn global() -> Self {
        Self::new(SourceString::from("global"), None)
    }

    fn new(name: SourceString, tail: Option<Environment>) -> Self {
        Environment(Rc::new(EnvironmentNode {
            name,
            tail,
            frame: RefCell::new(Frame::default()),
        }))
    }

    /// Create a new environment whose parent is `self`.
    pub fn child(&self, name: impl Into<SourceString>) -> Environment {
        Self::new(name.into(), Some(self.cheap_clone()))
    }

    pub fn name(&self) -> &SourceString {
        &self.0.name
    }

    pub fn tail(&self) -> Option<&Environment> {
        self.0.tail.as_ref()
    }

    pub fn ptr_eq(&self, other: &Environment) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Number of frames from this one up to the root, inclusive.
    pub fn depth(&self) -> usize {
        self.ancestors().count()
    }

    fn ancestors(&self) -> impl Iterator<Item = &Environment> {
        std::iter::successors(Some(self), |env| env.tail())
    }

    /// Insert an unassigned slot for a hoisted name. Fails if the name is
    /// already bound in this exact frame.
    pub fn declare(&self, id: &Identifier, mutable: bool) -> Result<(), RuntimeError> {
        let mut frame = self.0.frame.borrow_mut();
        if frame.contains_key(&id.name) {
            return Err(RuntimeError::VariableRedeclaration {
                name: id.name.cheap_clone(),
                mutable,
                span: id.span,
            });
        }
        frame.insert(id.name.cheap_clone(), Slot::Unassigned);
        Ok(())
    }

    /// A declaring statement may only run while its hoisted slot is still
    /// unassigned; running it again in the same frame is a redeclaration.
    pub fn check_unassigned(&self, id: &Identifier, mutable: bool) -> Result<(), RuntimeError> {
        match self.0.frame.borrow().get(&id.name) {
            Some(Slot::Value { .. }) => Err(RuntimeError::VariableRedeclaration {
                name: id.name.cheap_clone(),
                mutable,
                span: id.span,
            }),
            Some(Slot::Unassigned) | None => Ok(()),
        }
    }

    /// Bind `name` in this frame, replacing whatever slot was there.
    pub fn define(&self, name: &SourceString, value: Value, mutable: bool) {
        self.0
            .frame
            .borrow_mut()
            .insert(name.cheap_clone(), Slot::Value { value, mutable });
    }

    pub fn get(&self, id: &Identifier) -> Result<Value, RuntimeError> {
        for env in self.ancestors() {
            match env.0.frame.borrow().get(&id.name) {
                Some(Slot::Value { value, .. }) => return Ok(value.cheap_clone()),
                Some(Slot::Unassigned) => {
                    return Err(RuntimeError::UnassignedVariable {
                        name: id.name.cheap_clone(),
                        span: id.span,
                    });
                }
                None => {}
            }
        }
        Err(RuntimeError::UndefinedVariable {
            name: id.name.cheap_clone(),
            span: id.span,
        })
    }

    /// Overwrite the nearest initialized binding of `id`.
    ///
    /// An unassigned slot shadows outer bindings, so writing to a name whose
    /// declaration in the current scope has not run yet is an undefined
    /// variable error rather than a write to the outer binding.
    pub fn set(&self, id: &Identifier, value: Value) -> Result<(), RuntimeError> {
        for env in self.ancestors() {
            let mut frame = env.0.frame.borrow_mut();
            match frame.get_mut(&id.name) {
                Some(Slot::Value {
                    value: slot,
                    mutable: true,
                }) => {
                    *slot = value;
                    return Ok(());
                }
                Some(Slot::Value { mutable: false, .. }) => {
                    return Err(RuntimeError::ConstAssignment {
                        name: id.name.cheap_clone(),
                        span: id.span,
                    });
                }
                Some(Slot::Unassigned) => break,
                None => {}
            }
        }
        Err(RuntimeError::UndefinedVariable {
            name: id.name.cheap_clone(),
            span: id.span,
        })
    }

    /// Look up an initialized binding without raising, for internal names.
    pub fn lookup(&self, name: &str) -> Option<Value> {
        self.ancestors()
            .find_map(|env| match env.0.frame.borrow().get(name) {
                Some(Slot::Value { value, .. }) => Some(value.cheap_clone()),
                _ => None,
            })
    }

    /// Snapshot of this frame's bindings in declaration order. `None` marks an
    /// unassigned slot.
    pub fn bindings(&self) -> Vec<(SourceString, Option<Value>)> {
        self.0
            .frame
            .borrow()
            .iter()
            .map(|(name, slot)| {
                let value = match slot {
                    Slot::Unassigned => None,
                    Slot::Value { value, .. } => Some(value.cheap_clone()),
                };
                (name.cheap_clone(), value)
            })
            .collect()
    }

    pub(crate) fn downgrade(&self) -> Weak<EnvironmentNode> {
        Rc::downgrade(&self.0)
    }
}

/// Weak registry of every environment an interpreter created.
///
/// Closures stored in the frame that defined them form `Rc` cycles; clearing
/// the frames of all still-live environments when the interpreter goes away
/// breaks them.
pub(crate) struct EnvironmentTracker {
    live: Vec<Weak<EnvironmentNode>>,
    prune_at: usize,
}

const MIN_PRUNE_THRESHOLD: usize = 1024;

impl EnvironmentTracker {
    pub fn new() -> Self {
        Self {
            live: Vec::new(),
            prune_at: MIN_PRUNE_THRESHOLD,
        }
    }

    pub fn track(&mut self, env: &Environment) {
        if self.live.len() >= self.prune_at {
            self.live.retain(|weak| weak.strong_count() > 0);
            self.prune_at = (self.live.len() * 2).max(MIN_PRUNE_THRESHOLD);
        }
        self.live.push(env.downgrade());
    }

    pub fn release_all(&mut self) {
        for weak in self.live.drain(..) {
            if let Some(node) = weak.upgrade() {
                let frame = std::mem::take(&mut *node.frame.borrow_mut());
                drop(frame);
            }
        }
    }
}
