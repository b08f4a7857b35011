//! Host-side class construction.

use std::sync::Arc;

use parking_lot::Mutex;
use zgg_ir::Name;

use crate::context::Context;
use crate::errors::{self, EvalError};
use crate::value::{BuiltinFn, ObjectRef, TypeDef, TypeRef, Value};
use crate::EvalResult;

/// Builds a `Type` whose members are host functions.
///
/// ```ignore
/// let counter = ClassBuilder::new("Counter")
///     .constructor(|_, this, _| {
///         this.set("n", Value::Int(0));
///         Ok(())
///     })
///     .method("inc", |_, this, _| { /* ... */ Ok(Value::Nil) }, &[])
///     .build();
/// ```
#[must_use]
pub struct ClassBuilder {
    name: Name,
    bases: Vec<TypeRef>,
    members: Vec<(Name, Value)>,
    statics: Vec<(Name, Value)>,
}

impl ClassBuilder {
    pub fn new(name: impl Into<Name>) -> Self {
        ClassBuilder {
            name: name.into(),
            bases: Vec::new(),
            members: Vec::new(),
            statics: Vec::new(),
        }
    }

    pub fn base(mut self, base: &TypeRef) -> Self {
        self.bases.push(Arc::clone(base));
        self
    }

    /// Installed as `__init__`; receives the new instance.
    pub fn constructor(
        mut self,
        f: impl Fn(&mut Context, &ObjectRef, &[Value]) -> Result<(), EvalError> + Send + Sync + 'static,
    ) -> Self {
        let name = format!("{}.__init__", self.name);
        let init = BuiltinFn::new(name, move |ctx, this, args| {
            let obj = expect_instance(this)?;
            f(ctx, obj, args)?;
            Ok(Value::Undefined)
        });
        self.members.push((Name::from("__init__"), Value::builtin(init)));
        self
    }

    /// A method receiving the instance it was called on.
    pub fn method(
        mut self,
        name: &str,
        f: impl Fn(&mut Context, &ObjectRef, &[Value]) -> EvalResult + Send + Sync + 'static,
        arg_names: &[&str],
    ) -> Self {
        let method = BuiltinFn::new(format!("{}.{name}", self.name), move |ctx, this, args| {
            f(ctx, expect_instance(this)?, args)
        })
        .with_arg_names(arg_names);
        self.members.push((Name::from(name), Value::builtin(method)));
        self
    }

    pub fn static_member(mut self, name: &str, value: Value) -> Self {
        self.statics.push((Name::from(name), value));
        self
    }

    pub fn build(self) -> TypeRef {
        let ty = TypeDef::new_class(self.name, self.bases);
        for (name, value) in self.members {
            ty.set_member(name, value);
        }
        for (name, value) in self.statics {
            ty.set_static(name, value);
        }
        ty
    }
}

fn expect_instance(this: &Value) -> Result<&ObjectRef, EvalError> {
    this.as_object()
        .ok_or_else(|| errors::type_mismatch("an instance as receiver", this))
}

/// State behind a host iterator.
struct HostIterator<F> {
    next: F,
    done: bool,
}

/// An object implementing the `__iter__` protocol over a host closure.
/// The closure returns `Ok(None)` once exhausted and is not called again.
pub fn make_iterator(
    next: impl FnMut(&mut Context) -> Result<Option<Value>, EvalError> + Send + 'static,
) -> Value {
    let state = Arc::new(Mutex::new(HostIterator { next, done: false }));
    let step = Value::native("next", move |ctx, _, _| {
        let mut state = state.lock();
        if !state.done {
            if let Some(v) = (state.next)(ctx)? {
                return Ok(Value::array(vec![v, Value::Bool(true)]));
            }
            state.done = true;
        }
        Ok(Value::array(vec![Value::Undefined, Value::Bool(false)]))
    });
    Value::object([(
        "__iter__",
        Value::native("__iter__", move |_, _, _| Ok(step.clone())),
    )])
}
