//! Callable values: script closures, host functions and bound methods.

use std::fmt;
use std::sync::{Arc, Weak};

use zgg_ir::{FuncDef, Name};

use super::{TypeDef, TypeRef, Value};
use crate::environment::SharedScope;
use crate::{Context, EvalResult};

/// A function literal closed over the scope it was evaluated in.
///
/// The captured scope is live: later writes to captured variables are seen
/// by every closure sharing that scope.
pub struct FuncValue {
    def: Arc<FuncDef>,
    env: SharedScope,
    /// Class the function was declared in; enables `super`. Weak because
    /// the class's member table holds the function.
    belong_type: Option<Weak<TypeDef>>,
}

impl FuncValue {
    pub fn new(def: Arc<FuncDef>, env: SharedScope) -> Self {
        FuncValue {
            def,
            env,
            belong_type: None,
        }
    }

    /// The same closure, recorded as a method of `ty`.
    pub fn with_belong_type(&self, ty: &TypeRef) -> Self {
        FuncValue {
            def: Arc::clone(&self.def),
            env: self.env.clone(),
            belong_type: Some(Arc::downgrade(ty)),
        }
    }

    pub fn def(&self) -> &Arc<FuncDef> {
        &self.def
    }

    pub fn env(&self) -> &SharedScope {
        &self.env
    }

    pub fn belong_type(&self) -> Option<TypeRef> {
        self.belong_type.as_ref().and_then(Weak::upgrade)
    }

    pub fn name(&self) -> Option<&Name> {
        self.def.name.as_ref()
    }

    /// Name used in backtraces.
    pub fn display_name(&self) -> Name {
        self.def
            .name
            .clone()
            .unwrap_or_else(|| Name::from("<anonymous function>"))
    }

    pub fn params(&self) -> &[Name] {
        &self.def.params
    }
}

/// Signature of host functions: context, receiver, arguments.
pub type NativeFn = dyn Fn(&mut Context, &Value, &[Value]) -> EvalResult + Send + Sync;

/// A function implemented by the host.
pub struct BuiltinFn {
    name: Name,
    arg_names: Vec<Name>,
    f: Box<NativeFn>,
}

impl BuiltinFn {
    pub fn new(
        name: impl Into<Name>,
        f: impl Fn(&mut Context, &Value, &[Value]) -> EvalResult + Send + Sync + 'static,
    ) -> Self {
        BuiltinFn {
            name: name.into(),
            arg_names: Vec::new(),
            f: Box::new(f),
        }
    }

    /// Declare parameter names so keyword arguments can be placed.
    #[must_use]
    pub fn with_arg_names(mut self, names: &[&str]) -> Self {
        self.arg_names = names.iter().copied().map(Name::from).collect();
        self
    }

    pub fn name(&self) -> &Name {
        &self.name
    }

    pub fn arg_names(&self) -> &[Name] {
        &self.arg_names
    }

    #[inline]
    pub fn call(&self, ctx: &mut Context, this: &Value, args: &[Value]) -> EvalResult {
        (self.f)(ctx, this, args)
    }
}

/// A callable paired with the receiver it was read from.
pub struct BoundMethod {
    pub receiver: Value,
    pub callee: Value,
}

impl fmt::Debug for FuncValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<func {}>", self.display_name())
    }
}

impl fmt::Debug for BuiltinFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<builtin {}>", self.name)
    }
}

impl fmt::Debug for BoundMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<bound {:?}>", self.callee)
    }
}
