//! `spawn`: evaluation on a new OS thread.
//!
//! The thread runs on a forked `Context` (same runtime, fresh frames and
//! flow state) and sends its outcome over a one-slot channel. The script
//! side gets a `Thread` object whose host payload is the join state.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};
use std::thread;

use crossbeam::channel::{self, Receiver};
use parking_lot::Mutex;

use super::Context;
use crate::builtins::ClassBuilder;
use crate::errors::{self, EvalError};
use crate::value::{Object, ObjectRef, TypeRef, Value};
use crate::EvalResult;

static THREAD_COUNTER: AtomicUsize = AtomicUsize::new(0);

enum JoinSlot {
    Pending(Receiver<Result<Value, EvalError>>),
    Done(Result<Value, EvalError>),
}

/// Outcome of a spawned thread, received once and cached.
pub(crate) struct JoinState {
    slot: Mutex<JoinSlot>,
}

impl JoinState {
    fn wait(&self) -> Result<Value, EvalError> {
        let mut slot = self.slot.lock();
        if let JoinSlot::Pending(rx) = &*slot {
            let outcome = rx
                .recv()
                .unwrap_or_else(|_| Err(errors::internal("spawned thread exited without a result")));
            *slot = JoinSlot::Done(outcome);
        }
        match &*slot {
            JoinSlot::Done(outcome) => outcome.clone(),
            JoinSlot::Pending(_) => Err(errors::internal("join state still pending")),
        }
    }
}

fn join_state(this: &ObjectRef) -> Result<Arc<JoinState>, EvalError> {
    this.reserved_as::<JoinState>()
        .ok_or_else(|| errors::internal("Thread object without join state"))
}

fn thread_type() -> &'static TypeRef {
    static THREAD: OnceLock<TypeRef> = OnceLock::new();
    THREAD.get_or_init(|| {
        let join = |_: &mut Context, this: &ObjectRef, _: &[Value]| {
            join_state(this)?.wait().map_err(|e| errors::thread_failed(&e))
        };
        ClassBuilder::new("Thread")
            .method("join", join, &[])
            .method("await", join, &[])
            .method(
                "error",
                |_, this, _| match join_state(this)?.wait() {
                    Ok(_) => Ok(Value::Nil),
                    Err(e) => Ok(e.to_value()),
                },
                &[],
            )
            .build()
    })
}

impl Context {
    /// Run `callee(args)` on a new thread and return its join handle.
    pub fn start_thread(&mut self, callee: Value, args: Vec<Value>) -> EvalResult {
        if !self.is_callable(&callee) {
            return Err(errors::not_callable(&callee));
        }
        let mut child = self.fork();
        let (tx, rx) = channel::bounded(1);
        let n = THREAD_COUNTER.fetch_add(1, Ordering::Relaxed);
        let name = format!("{}-{n}", self.runtime.config().thread_name_prefix);

        thread::Builder::new()
            .name(name.clone())
            .spawn(move || {
                let outcome = child
                    .invoke(&callee, Value::Undefined, args)
                    .map_err(|e| child.locate(e));
                if let Err(e) = &outcome {
                    tracing::warn!(error = %e, "spawned thread failed");
                }
                // The handle may already be gone; nobody is waiting then.
                let _ = tx.send(outcome);
            })
            .map_err(|e| EvalError::new(format!("cannot spawn thread: {e}")))?;
        tracing::debug!(thread = %name, "thread spawned");

        let handle = Object::new(Arc::clone(thread_type()));
        handle.set_reserved(Arc::new(JoinState {
            slot: Mutex::new(JoinSlot::Pending(rx)),
        }));
        Ok(Value::Object(handle))
    }

    /// Wait for a handle returned by `spawn` and return the thread's value.
    pub fn join_value(&mut self, handle: &Value) -> EvalResult {
        let obj = handle
            .as_object()
            .ok_or_else(|| errors::type_mismatch("a Thread handle", handle))?;
        join_state(obj)?.wait().map_err(|e| errors::thread_failed(&e))
    }
}
