//! Assignment, local definitions and increment/decrement.

use zgg_ir::{AssignShape, BinaryOp, Expr, LocalAssign, Lval};

use crate::context::Context;
use crate::errors::{self, EvalError};
use crate::value::Value;
use crate::EvalResult;

impl Context {
    /// Write through an assignable target. Identifiers must already exist
    /// in some enclosing frame.
    pub(super) fn assign_lval(&mut self, target: &Lval, value: Value) -> Result<(), EvalError> {
        match target {
            Lval::Ident(name) => self.assign_var(name, value),
            Lval::Member { owner, name } => {
                let owner = self.eval_expr(owner)?;
                self.set_member(&owner, name, value)
            }
            Lval::Index { owner, index } => {
                let owner = self.eval_expr(owner)?;
                let index = self.eval_expr(index)?;
                self.set_index(&owner, &index, value)
            }
        }
    }

    /// `:=` in its three shapes. Yields the right-hand value.
    pub(super) fn eval_local_assign(&mut self, assign: &LocalAssign) -> EvalResult {
        let value = self.eval_expr(&assign.value)?;
        match assign.shape {
            AssignShape::Single => {
                if let Some(name) = assign.names.first() {
                    self.define_local(name, value.clone())?;
                }
            }
            AssignShape::DeArray { expand_last } => {
                let items = value
                    .array_items()
                    .ok_or_else(|| errors::type_mismatch("Array to destructure", &value))?;
                let fixed = if expand_last {
                    assign.names.len().saturating_sub(1)
                } else {
                    assign.names.len()
                };
                let mut items = items.into_iter();
                for name in &assign.names[..fixed] {
                    self.define_local(name, items.next().unwrap_or_default())?;
                }
                if expand_last {
                    if let Some(rest) = assign.names.last() {
                        self.define_local(rest, Value::array(items.collect()))?;
                    }
                }
            }
            AssignShape::DeObject => {
                for name in &assign.names {
                    let member = self.get_member(&value, name)?;
                    self.define_local(name, member)?;
                }
            }
        }
        Ok(value)
    }

    /// `:= obj` defines every key of `obj` as a local.
    pub(super) fn eval_local_new_assign(&mut self, value: &Expr) -> EvalResult {
        let value = self.eval_expr(value)?;
        let Value::Object(obj) = &value else {
            return Err(errors::type_mismatch("Object", &value));
        };
        for (name, member) in obj.entries() {
            self.define_local(&name, member)?;
        }
        Ok(value)
    }

    /// `++x` yields the new value, `x++` the old one. The addition goes
    /// through the regular `+` so `__add__` applies.
    pub(super) fn eval_inc_dec(&mut self, target: &Lval, delta: i64, pre: bool) -> EvalResult {
        let old = self.eval_expr(&target.to_expr())?;
        let new = self.binary_values(BinaryOp::Add, &old, &Value::Int(delta))?;
        self.assign_lval(target, new.clone())?;
        Ok(if pre { new } else { old })
    }
}
