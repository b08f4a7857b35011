//! `class` and `extend`.

use std::sync::Arc;

use zgg_ir::{ClassDef, ClassMember, ExtendDef, Name};

use crate::context::Context;
use crate::errors::{self, EvalError};
use crate::value::{TypeDef, TypeRef, Value};

/// Unwrap a bound method so `Base` read through an object still names
/// the type.
fn unbind(value: Value) -> Value {
    match value {
        Value::Bound(bound) => bound.callee.clone(),
        other => other,
    }
}

impl Context {
    pub(super) fn exec_class(&mut self, def: &ClassDef) -> Result<(), EvalError> {
        if def.exported && !self.is_module_top() {
            return Err(errors::export_outside_module());
        }

        let mut bases = Vec::with_capacity(def.bases.len());
        for expr in &def.bases {
            match unbind(self.eval_expr(expr)?) {
                Value::Type(ty) => bases.push(ty),
                other => return Err(errors::type_mismatch("a type as base class", &other)),
            }
        }

        let ty = TypeDef::new_class(def.name.clone(), bases);
        let class = Value::Type(Arc::clone(&ty));
        // Visible to its own methods (recursion, statics) before the body runs.
        self.define_local(&def.name, class.clone())?;

        for (key, value) in self.eval_members(&def.members, &ty)? {
            ty.set_member(key, value);
        }
        for (key, value) in self.eval_members(&def.statics, &ty)? {
            ty.set_static(key, value);
        }
        tracing::debug!(class = %def.name, id = ty.id(), "class defined");

        if def.exported {
            self.exports().set(def.name.clone(), class.clone());
        }
        self.ret_val = class;
        Ok(())
    }

    /// Evaluate member definitions. Functions are marked as belonging to
    /// `owner` so `super` resolves from its bases.
    fn eval_members(&mut self, members: &[ClassMember], owner: &TypeRef) -> Result<Vec<(Name, Value)>, EvalError> {
        let mut out = Vec::with_capacity(members.len());
        for member in members {
            let key = self.eval_expr(&member.key)?;
            let key = Name::from(self.stringify(&key)?);
            let value = match self.eval_expr(&member.value)? {
                Value::Func(func) => Value::func(func.with_belong_type(owner)),
                other => other,
            };
            out.push((key, value));
        }
        Ok(out)
    }

    pub(super) fn exec_extend(&mut self, def: &ExtendDef) -> Result<(), EvalError> {
        if def.exported && !self.is_module_top() {
            return Err(errors::export_outside_module());
        }
        let target = unbind(self.eval_expr(&def.target)?);
        let Value::Type(ty) = &target else {
            return Err(errors::type_mismatch("a type to extend", &target));
        };
        for item in &def.items {
            let key = self.eval_expr(&item.key)?;
            let key = Name::from(self.stringify(&key)?);
            let value = self.eval_expr(&item.value)?;
            if def.exported {
                self.exports()
                    .set(format!("{}#{key}", ty.id()), value.clone());
            }
            self.runtime().extend(ty.id(), key, value);
        }
        self.ret_val = target.clone();
        Ok(())
    }
}
