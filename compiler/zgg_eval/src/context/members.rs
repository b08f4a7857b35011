//! Member and index access.
//!
//! Lookup order for `owner.name`:
//! 1. own members (objects) or statics (types)
//! 2. the type's member table, bases depth-first, left to right
//! 3. a callable `__getAttr__` on the type chain, called with the name
//! 4. the common members `must` and `notNil`
//! 5. `extend` registrations for the type and its bases
//!
//! Callables found this way come back bound to `owner`.

use zgg_ir::Name;

use super::Context;
use crate::errors::{self, EvalError};
use crate::value::{builtin_types, TypeRef, Value};
use crate::EvalResult;

/// Bind callable members to their owner. Objects stay unbound even when
/// they define `__call__`.
pub fn make_member(owner: &Value, member: Value) -> Value {
    if member.is_callable_kind() {
        Value::bound(owner.clone(), member)
    } else {
        member
    }
}

/// Normalise a possibly negative index against `len`.
pub(crate) fn normalize_index(index: i64, len: usize) -> Option<usize> {
    let len_i = i64::try_from(len).ok()?;
    let i = if index < 0 { index + len_i } else { index };
    if (0..len_i).contains(&i) {
        usize::try_from(i).ok()
    } else {
        None
    }
}

impl Context {
    pub fn get_member(&mut self, owner: &Value, name: &str) -> EvalResult {
        match owner {
            Value::Object(obj) => {
                if let Some(v) = obj.get(name) {
                    return Ok(make_member(owner, v));
                }
            }
            Value::Type(ty) => return self.get_static(ty, ty, name),
            Value::Func(func) => match name {
                "__name__" => {
                    return Ok(Value::str(func.name().map_or("anonymous", Name::as_str)));
                }
                "__args__" => {
                    let args = func.params().iter().map(|p| Value::str(p.as_str())).collect();
                    return Ok(Value::array(args));
                }
                _ => {}
            },
            _ => {}
        }
        self.member_by_type(owner, name)
    }

    fn member_by_type(&mut self, owner: &Value, name: &str) -> EvalResult {
        let ty = owner.type_of();
        if let Some(member) = ty.find_member(name) {
            return Ok(make_member(owner, member));
        }
        if let Some(get_attr) = ty.find_member("__getAttr__") {
            if self.is_callable(&get_attr) {
                let v = self.invoke(&get_attr, owner.clone(), vec![Value::str(name)])?;
                if !v.is_undefined() {
                    return Ok(make_member(owner, v));
                }
            }
        }
        if let Some(common) = common_member(name) {
            return Ok(make_member(owner, common));
        }
        if let Some(ext) = self.runtime.find_extension(&ty, name) {
            return Ok(make_member(owner, ext));
        }
        Ok(Value::Undefined)
    }

    /// Statics of `ty` and its bases. A static `__getAttr__` answers for
    /// its level before the bases are searched.
    fn get_static(&mut self, view: &TypeRef, ty: &TypeRef, name: &str) -> EvalResult {
        if let Some(v) = ty.own_static(name) {
            return Ok(v);
        }
        if let Some(get_attr) = ty.own_static("__getAttr__") {
            if self.is_callable(&get_attr) {
                return self.invoke(&get_attr, Value::Type(view.clone()), vec![Value::str(name)]);
            }
        }
        for base in ty.bases() {
            let v = self.get_static(view, base, name)?;
            if !v.is_undefined() {
                return Ok(v);
            }
        }
        if view.id() != ty.id() {
            return Ok(Value::Undefined);
        }
        let owner = Value::Type(view.clone());
        Ok(self
            .runtime
            .find_extension(&builtin_types().type_, name)
            .map_or(Value::Undefined, |ext| make_member(&owner, ext)))
    }

    /// Operator hook lookup: own members, the type chain, then extensions.
    /// `__getAttr__` is not consulted.
    pub(crate) fn find_hook(&self, owner: &Value, name: &str) -> Option<Value> {
        let member = owner.as_object().and_then(|obj| obj.get(name));
        let ty = owner.type_of();
        let member = member
            .or_else(|| ty.find_member(name))
            .or_else(|| self.runtime.find_extension(&ty, name))?;
        self.is_callable(&member).then(|| make_member(owner, member))
    }

    /// `owner.name = value`. Writes never climb the type chain.
    pub fn set_member(&mut self, owner: &Value, name: &str, value: Value) -> Result<(), EvalError> {
        match owner {
            Value::Object(obj) => {
                obj.set(name, value);
                Ok(())
            }
            Value::Type(ty) => {
                ty.set_static(name, value);
                Ok(())
            }
            other => Err(errors::type_mismatch("an object to set member", other)),
        }
    }

    /// `owner[index]`. String indexes are member lookups; out-of-range
    /// reads yield `Undefined`.
    pub fn get_index(&mut self, owner: &Value, index: &Value) -> EvalResult {
        if let Value::Str(name) = index {
            return self.get_member(owner, name);
        }
        match owner {
            Value::Array(items) => {
                let i = require_int(index)?;
                let items = items.read();
                Ok(normalize_index(i, items.len()).map_or(Value::Undefined, |i| items[i].clone()))
            }
            Value::Bytes(data) => {
                let i = require_int(index)?;
                let data = data.read();
                Ok(normalize_index(i, data.len()).map_or(Value::Undefined, |i| Value::Int(i64::from(data[i]))))
            }
            Value::Str(s) => {
                let i = require_int(index)?;
                let len = s.chars().count();
                Ok(normalize_index(i, len)
                    .and_then(|i| s.chars().nth(i))
                    .map_or(Value::Undefined, |c| Value::string(c.to_string())))
            }
            Value::Object(_) => {
                let get_item = self.get_member(owner, "__getItem__")?;
                if self.is_callable(&get_item) {
                    self.invoke(&get_item, Value::Undefined, vec![index.clone()])
                } else {
                    Ok(Value::Undefined)
                }
            }
            Value::Type(_) => Ok(Value::Undefined),
            other => Err(errors::type_mismatch("an indexable value", other)),
        }
    }

    /// `owner[index] = value`. Out-of-range writes raise.
    pub fn set_index(&mut self, owner: &Value, index: &Value, value: Value) -> Result<(), EvalError> {
        if let Value::Str(name) = index {
            return self.set_member(owner, name, value);
        }
        match owner {
            Value::Array(items) => {
                let i = require_int(index)?;
                let mut items = items.write();
                let len = items.len();
                let slot = normalize_index(i, len).ok_or_else(|| errors::index_out_of_bounds(i, len))?;
                items[slot] = value;
                Ok(())
            }
            Value::Bytes(data) => {
                let i = require_int(index)?;
                let byte = value
                    .as_int()
                    .and_then(|b| u8::try_from(b).ok())
                    .ok_or_else(|| errors::type_mismatch("a byte value", &value))?;
                let mut data = data.write();
                let len = data.len();
                let slot = normalize_index(i, len).ok_or_else(|| errors::index_out_of_bounds(i, len))?;
                data[slot] = byte;
                Ok(())
            }
            Value::Object(_) => {
                let set_item = self.get_member(owner, "__setItem__")?;
                if self.is_callable(&set_item) {
                    self.invoke(&set_item, Value::Undefined, vec![index.clone(), value])?;
                    Ok(())
                } else {
                    Err(errors::type_mismatch("an object with __setItem__", owner))
                }
            }
            other => Err(errors::type_mismatch("an indexable value", other)),
        }
    }
}

fn require_int(index: &Value) -> Result<i64, EvalError> {
    index
        .as_int()
        .ok_or_else(|| errors::type_mismatch("Int index", index))
}

/// Members every value answers to when nothing else matched.
fn common_member(name: &str) -> Option<Value> {
    match name {
        "must" => Some(Value::native("must", |ctx, this, args| {
            for check in args {
                let ok = if ctx.is_callable(check) {
                    let r = ctx.invoke(check, Value::Undefined, vec![this.clone()])?;
                    ctx.is_truthy(&r)?
                } else {
                    ctx.values_equal(this, check)?
                };
                if !ok {
                    return Err(errors::assertion_failed("'must' failed"));
                }
            }
            Ok(this.clone())
        })),
        "notNil" => Some(Value::native("notNil", |_, this, _| {
            if this.is_nil_or_undefined() {
                Err(errors::type_mismatch("a non-nil value", this))
            } else {
                Ok(this.clone())
            }
        })),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_indexes_count_from_end() {
        assert_eq!(normalize_index(0, 3), Some(0));
        assert_eq!(normalize_index(-1, 3), Some(2));
        assert_eq!(normalize_index(-3, 3), Some(0));
        assert_eq!(normalize_index(-4, 3), None);
        assert_eq!(normalize_index(3, 3), None);
        assert_eq!(normalize_index(0, 0), None);
    }

    #[test]
    fn only_callables_are_bound() {
        let owner = Value::Int(1);
        assert!(matches!(make_member(&owner, Value::Int(2)), Value::Int(2)));
        let f = Value::native("f", |_, _, _| Ok(Value::Nil));
        assert!(matches!(make_member(&owner, f), Value::Bound(_)));
    }
}
