//! Per-thread evaluation state.
//!
//! A `Context` owns everything one evaluation thread mutates: the frame
//! stack (scopes, defers and positions), the last computed value, the
//! pending control-flow signal and the module's export object. Shared
//! state lives on the `Runtime`.
//!
//! # Control flow
//!
//! `break`, `continue` and `return` do not unwind through `Result`. They
//! set `flow`; blocks stop after the statement that set it, loops consume
//! matching break/continue signals and function calls consume `Return`.
//! Errors travel through `Err` and are never mixed with flow signals.

mod frames;
mod invoke;
mod members;
mod modules;
mod spawn;

use std::sync::Arc;

use zgg_ir::{Name, Position};

use crate::environment::{BindError, SharedScope};
use crate::errors::{self, EvalError};
use crate::runtime::Runtime;
use crate::value::{Object, ObjectRef, Value};

pub(crate) use frames::FrameKind;
use frames::Frame;

/// Pending control-flow signal.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Flow {
    #[default]
    Normal,
    Break(Option<Name>),
    Continue(Option<Name>),
    Return,
}

impl Flow {
    #[inline]
    pub fn is_normal(&self) -> bool {
        matches!(self, Flow::Normal)
    }
}

pub struct Context {
    runtime: Arc<Runtime>,
    frames: Vec<Frame>,
    /// Value of the last evaluated statement or `return`.
    pub(crate) ret_val: Value,
    pub(crate) flow: Flow,
    exports: ObjectRef,
    call_depth: usize,
}

impl Context {
    /// A fresh context whose root scope sits directly below the globals.
    pub fn new(runtime: Arc<Runtime>) -> Self {
        let scope = SharedScope::child(runtime.globals());
        Context {
            runtime,
            frames: vec![Frame::new(FrameKind::Root, scope, Position::UNKNOWN)],
            ret_val: Value::Undefined,
            flow: Flow::Normal,
            exports: Object::plain(),
            call_depth: 0,
        }
    }

    /// A context for another thread: same runtime, fresh frames and flags.
    /// The root frame starts at this context's current position.
    pub fn fork(&self) -> Self {
        let mut child = Context::new(Arc::clone(&self.runtime));
        child.set_position(self.position());
        child
    }

    #[inline]
    pub fn runtime(&self) -> &Arc<Runtime> {
        &self.runtime
    }

    /// Value of the last evaluated statement.
    pub fn ret_val(&self) -> &Value {
        &self.ret_val
    }

    pub fn flow(&self) -> &Flow {
        &self.flow
    }

    /// The export object filled by `export` statements.
    pub fn exports(&self) -> &ObjectRef {
        &self.exports
    }

    pub fn call_depth(&self) -> usize {
        self.call_depth
    }

    /// Write text through the runtime's print handler.
    pub fn print(&self, text: &str) {
        self.runtime.print_handler().print(text);
    }

    pub fn println(&self, text: &str) {
        self.runtime.print_handler().println(text);
    }

    // Scopes

    #[inline]
    pub fn scope(&self) -> &SharedScope {
        // The root frame is pushed in `new` and never popped.
        &self.frames[self.frames.len() - 1].scope
    }

    /// Resolve a variable; unbound names read as `Undefined`.
    pub fn lookup(&self, name: &str) -> Value {
        self.scope().lookup(name).unwrap_or_default()
    }

    /// `:=` in the current scope.
    pub fn define_local(&self, name: &Name, value: Value) -> Result<(), EvalError> {
        self.scope()
            .define(name.clone(), value)
            .map_err(|_| errors::variable_redefined(name.as_str()))
    }

    /// Loop variables and bindings made by the evaluator itself.
    pub fn force_local(&self, name: impl Into<Name>, value: Value) {
        self.scope().force_define(name.into(), value);
    }

    /// `name = value`: overwrite the nearest existing binding.
    pub fn assign_var(&self, name: &str, value: Value) -> Result<(), EvalError> {
        self.scope().assign(name, value).map_err(|e| match e {
            BindError::Undefined => errors::undefined_variable(name),
            BindError::Redefined => errors::variable_redefined(name),
        })
    }

    // Positions

    pub fn position(&self) -> &Position {
        &self.frames[self.frames.len() - 1].position
    }

    pub(crate) fn set_position(&mut self, pos: &Position) {
        let last = self.frames.len() - 1;
        if self.frames[last].position != *pos {
            self.frames[last].position = pos.clone();
        }
    }

    /// Attach the current position and backtrace to an error that has none.
    pub(crate) fn locate(&self, mut err: EvalError) -> EvalError {
        if err.position.is_none() {
            err.position = Some(self.position().clone());
        }
        if err.backtrace.is_none() {
            err.backtrace = Some(self.backtrace());
        }
        err
    }
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("frames", &self.frames.len())
            .field("flow", &self.flow)
            .field("call_depth", &self.call_depth)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests;
