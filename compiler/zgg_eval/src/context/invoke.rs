//! The call protocol.

use std::mem;
use std::sync::Arc;

use zgg_ir::Name;

use super::{Context, Flow, FrameKind};
use crate::environment::SharedScope;
use crate::errors;
use crate::value::{FuncValue, Object, TypeRef, Value};
use crate::EvalResult;

impl Context {
    /// Call `callee` with `this` as receiver.
    ///
    /// Functions, host functions, bound methods (their receiver replaces
    /// `this`), types (construction) and objects whose type defines
    /// `__call__` are callable.
    pub fn invoke(&mut self, callee: &Value, this: Value, args: Vec<Value>) -> EvalResult {
        match callee {
            Value::Func(func) => self.invoke_func(func, this, args),
            Value::Builtin(builtin) => {
                let limit = self.runtime.config().max_call_depth;
                if self.call_depth >= limit {
                    return Err(errors::stack_overflow(limit));
                }
                self.call_depth += 1;
                let result = builtin.call(self, &this, &args);
                self.call_depth -= 1;
                result
            }
            Value::Bound(bound) => self.invoke(&bound.callee, bound.receiver.clone(), args),
            Value::Type(ty) => self.construct(ty, args),
            Value::Object(_) if self.is_callable(callee) => {
                let call = self.get_member(callee, "__call__")?;
                self.invoke(&call, Value::Undefined, args)
            }
            _ => Err(errors::not_callable(callee)),
        }
    }

    /// Whether `invoke` would accept `value`.
    pub fn is_callable(&self, value: &Value) -> bool {
        match value {
            Value::Object(obj) => {
                obj.contains("__call__") || obj.ty().find_member("__call__").is_some()
            }
            other => other.is_callable_kind(),
        }
    }

    /// Declared parameter names, used to place keyword arguments.
    pub fn arg_names(&self, callee: &Value) -> Vec<Name> {
        match callee {
            Value::Func(func) => func.params().to_vec(),
            Value::Builtin(builtin) => builtin.arg_names().to_vec(),
            Value::Bound(bound) => self.arg_names(&bound.callee),
            Value::Type(ty) => ty
                .find_member("__init__")
                .map(|init| self.arg_names(&init))
                .unwrap_or_default(),
            _ => Vec::new(),
        }
    }

    fn invoke_func(&mut self, func: &Arc<FuncValue>, this: Value, args: Vec<Value>) -> EvalResult {
        let limit = self.runtime.config().max_call_depth;
        if self.call_depth >= limit {
            return Err(errors::stack_overflow(limit));
        }

        let scope = SharedScope::child(func.env());
        let this = match (func.belong_type(), this) {
            (Some(owner), Value::Object(obj)) => {
                scope.force_define(Name::from("super"), Value::Object(obj.super_view(&owner)));
                Value::Object(obj.real_this())
            }
            (_, this) => this,
        };
        scope.force_define(Name::from("this"), this);
        scope.force_define(Name::from("arguments"), Value::array(args.clone()));
        bind_params(&scope, func, args);

        let saved_flow = mem::take(&mut self.flow);
        let saved_ret = mem::take(&mut self.ret_val);
        self.call_depth += 1;
        tracing::trace!(function = %func.display_name(), depth = self.call_depth, "call");

        let kind = FrameKind::Function {
            name: func.display_name(),
        };
        let result = self.with_frame(kind, scope, |ctx| {
            ctx.exec_stmts(&func.def().body.stmts)?;
            match mem::take(&mut ctx.flow) {
                Flow::Normal | Flow::Return => Ok(()),
                Flow::Break(label) => Err(ctx.locate(errors::unmatched_label(
                    "break",
                    label.as_ref().map(Name::as_str),
                ))),
                Flow::Continue(label) => Err(ctx.locate(errors::unmatched_label(
                    "continue",
                    label.as_ref().map(Name::as_str),
                ))),
            }
        });

        self.call_depth -= 1;
        self.flow = saved_flow;
        let ret = mem::replace(&mut self.ret_val, saved_ret);
        result.map(|()| ret)
    }

    /// `T(args)` / `new T(args)`: a new instance initialised by `__init__`.
    pub fn construct(&mut self, ty: &TypeRef, args: Vec<Value>) -> EvalResult {
        let instance = Value::Object(Object::new(Arc::clone(ty)));
        let init = self.get_member(&instance, "__init__")?;
        if self.is_callable(&init) {
            self.invoke(&init, Value::Undefined, args)?;
        }
        Ok(instance)
    }

    /// Call with a single argument; the shape every operator hook uses.
    pub(crate) fn call_hook(&mut self, hook: &Value, arg: Value) -> EvalResult {
        self.invoke(hook, Value::Undefined, vec![arg])
    }
}

/// Bind parameters; missing ones are `Undefined`, a rest parameter
/// collects what is left.
fn bind_params(scope: &SharedScope, func: &FuncValue, args: Vec<Value>) {
    let def = func.def();
    let fixed = if def.expand_last {
        def.params.len().saturating_sub(1)
    } else {
        def.params.len()
    };
    let mut args = args.into_iter();
    for name in &def.params[..fixed] {
        scope.force_define(name.clone(), args.next().unwrap_or_default());
    }
    if def.expand_last {
        if let Some(rest) = def.params.last() {
            scope.force_define(rest.clone(), Value::array(args.collect()));
        }
    }
}
