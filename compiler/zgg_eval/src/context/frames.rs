//! Frame stack: scope entry/exit and deferred calls.
//!
//! Every block, loop iteration, function call and comprehension runs inside
//! `with_frame`. The frame is popped on every exit path (normal, flow
//! signal or error) and its deferred calls run at that point, LIFO.

use std::mem;

use zgg_ir::{Name, Position};

use super::{Context, Flow};
use crate::environment::SharedScope;
use crate::errors::{self, BacktraceFrame, EvalBacktrace, EvalError};
use crate::value::Value;

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum FrameKind {
    Root,
    Block,
    Function { name: Name },
}

/// A call registered by `defer`, `block defer` or `use`.
struct DeferCall {
    callee: Value,
    args: Vec<Value>,
    /// Skipped silently if `callee` turns out not to be callable.
    optional: bool,
}

pub(super) struct Frame {
    pub(super) scope: SharedScope,
    pub(super) position: Position,
    kind: FrameKind,
    defers: Vec<DeferCall>,
}

impl Frame {
    pub(super) fn new(kind: FrameKind, scope: SharedScope, position: Position) -> Self {
        Frame {
            scope,
            position,
            kind,
            defers: Vec::new(),
        }
    }

    fn is_function_boundary(&self) -> bool {
        matches!(self.kind, FrameKind::Root | FrameKind::Function { .. })
    }
}

impl Context {
    /// Run `f` in a new block frame nested in the current scope.
    pub(crate) fn with_block<R>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<R, EvalError>,
    ) -> Result<R, EvalError> {
        let scope = SharedScope::child(self.scope());
        self.with_frame(FrameKind::Block, scope, f)
    }

    /// Push a frame over `scope`, run `f`, then pop it and run its defers.
    ///
    /// A body error wins over a defer error; otherwise the first defer
    /// error is returned.
    pub(crate) fn with_frame<R>(
        &mut self,
        kind: FrameKind,
        scope: SharedScope,
        f: impl FnOnce(&mut Self) -> Result<R, EvalError>,
    ) -> Result<R, EvalError> {
        let position = self.position().clone();
        self.frames.push(Frame::new(kind, scope, position));
        let result = f(self);
        let defers = match self.frames.pop() {
            Some(frame) => frame.defers,
            None => return Err(errors::internal("frame stack underflow")),
        };
        let deferred = self.run_defers(defers);
        match (result, deferred) {
            (Err(e), _) | (Ok(_), Err(e)) => Err(e),
            (Ok(r), Ok(())) => Ok(r),
        }
    }

    /// Run the defers registered at module level.
    pub(crate) fn run_root_defers(&mut self) -> Result<(), EvalError> {
        let defers = self
            .frames
            .first_mut()
            .map(|frame| mem::take(&mut frame.defers))
            .unwrap_or_default();
        self.run_defers(defers)
    }

    fn run_defers(&mut self, defers: Vec<DeferCall>) -> Result<(), EvalError> {
        if defers.is_empty() {
            return Ok(());
        }
        let saved_flow = mem::take(&mut self.flow);
        let saved_ret = self.ret_val.clone();
        let mut first_err = None;
        for call in defers.into_iter().rev() {
            if !self.is_callable(&call.callee) {
                if !call.optional && first_err.is_none() {
                    first_err = Some(self.locate(errors::defer_not_callable()));
                }
                continue;
            }
            if let Err(e) = self.invoke(&call.callee, Value::Undefined, call.args) {
                tracing::debug!(error = %e, "deferred call failed");
                if first_err.is_none() {
                    first_err = Some(e);
                }
            }
            self.flow = Flow::Normal;
        }
        self.flow = saved_flow;
        self.ret_val = saved_ret;
        first_err.map_or(Ok(()), Err)
    }

    /// Register a call to run when the enclosing function (or module) exits.
    pub fn add_defer(&mut self, callee: Value, args: Vec<Value>) {
        let call = DeferCall {
            callee,
            args,
            optional: false,
        };
        if let Some(frame) = self.frames.iter_mut().rev().find(|f| f.is_function_boundary()) {
            frame.defers.push(call);
        }
    }

    /// Register a call to run when the current block exits.
    pub fn add_block_defer(&mut self, callee: Value, args: Vec<Value>, optional: bool) {
        let call = DeferCall {
            callee,
            args,
            optional,
        };
        if let Some(frame) = self.frames.last_mut() {
            frame.defers.push(call);
        }
    }

    /// True while executing a module's top-level block (or a block nested
    /// in it without an intervening function call).
    pub(crate) fn is_module_top(&self) -> bool {
        self.frames.len() <= 2 && !self.frames.iter().any(|f| matches!(f.kind, FrameKind::Function { .. }))
    }

    /// Function activations, innermost first, each with the position of
    /// the statement it was executing.
    pub fn backtrace(&self) -> EvalBacktrace {
        let mut frames = Vec::new();
        let mut segment_pos: Option<&Position> = None;
        for frame in self.frames.iter().rev() {
            let pos = *segment_pos.get_or_insert(&frame.position);
            match &frame.kind {
                FrameKind::Function { name } => {
                    frames.push(BacktraceFrame {
                        function: name.to_string(),
                        position: pos.clone(),
                    });
                    segment_pos = None;
                }
                FrameKind::Root => frames.push(BacktraceFrame {
                    function: "<module>".to_string(),
                    position: pos.clone(),
                }),
                FrameKind::Block => {}
            }
        }
        EvalBacktrace::new(frames)
    }
}
