//! Methods of the builtin types.
//!
//! They are ordinary type members, so `extend` registrations and user
//! hooks see them like any class member. Callbacks run on a snapshot of
//! the receiver; no lock is held while user code executes.

use std::fmt::Write as _;

use crate::context::Context;
use crate::errors::{self, EvalError};
use crate::value::{BuiltinTypes, TypeRef, Value};
use crate::EvalResult;

type Method = fn(&mut Context, &Value, &[Value]) -> EvalResult;

pub(crate) fn install(types: &BuiltinTypes) {
    let methods: [(&TypeRef, &str, Method); 23] = [
        (&types.array, "len", array_len),
        (&types.array, "push", array_push),
        (&types.array, "pop", array_pop),
        (&types.array, "map", array_map),
        (&types.array, "filter", array_filter),
        (&types.array, "join", array_join),
        (&types.array, "contains", array_contains),
        (&types.str, "len", str_len),
        (&types.str, "upper", str_upper),
        (&types.str, "lower", str_lower),
        (&types.str, "split", str_split),
        (&types.str, "trim", str_trim),
        (&types.str, "startsWith", str_starts_with),
        (&types.str, "endsWith", str_ends_with),
        (&types.str, "contains", str_contains),
        (&types.object, "keys", object_keys),
        (&types.object, "values", object_values),
        (&types.object, "pairs", object_pairs),
        (&types.object, "each", object_each),
        (&types.int, "times", int_times),
        (&types.bytes, "len", bytes_len),
        (&types.bytes, "hex", bytes_hex),
        (&types.bytes, "contains", bytes_contains),
    ];
    for (ty, name, f) in methods {
        let full_name = format!("{}.{name}", ty.name());
        ty.set_member(name, Value::native(&full_name, f));
    }
}

fn arg(args: &[Value], i: usize) -> Value {
    args.get(i).cloned().unwrap_or_default()
}

fn str_arg<'a>(args: &'a [Value], i: usize, what: &str) -> Result<&'a str, EvalError> {
    match args.get(i) {
        Some(Value::Str(s)) => Ok(s),
        other => Err(errors::type_mismatch(
            &format!("Str argument '{what}'"),
            other.unwrap_or(&Value::Undefined),
        )),
    }
}

fn callable_arg(ctx: &Context, args: &[Value], i: usize, what: &str) -> Result<Value, EvalError> {
    let f = arg(args, i);
    if ctx.is_callable(&f) {
        Ok(f)
    } else {
        Err(errors::type_mismatch(&format!("callable argument '{what}'"), &f))
    }
}

fn this_str(this: &Value) -> Result<&str, EvalError> {
    this.as_str().ok_or_else(|| errors::type_mismatch("Str receiver", this))
}

fn this_items(this: &Value) -> Result<Vec<Value>, EvalError> {
    this.array_items()
        .ok_or_else(|| errors::type_mismatch("Array receiver", this))
}

fn int(n: usize) -> Value {
    Value::Int(i64::try_from(n).unwrap_or(i64::MAX))
}

// Array

fn array_len(_: &mut Context, this: &Value, _: &[Value]) -> EvalResult {
    Ok(int(this_items(this)?.len()))
}

fn array_push(_: &mut Context, this: &Value, args: &[Value]) -> EvalResult {
    let Value::Array(items) = this else {
        return Err(errors::type_mismatch("Array receiver", this));
    };
    items.write().extend(args.iter().cloned());
    Ok(this.clone())
}

fn array_pop(_: &mut Context, this: &Value, _: &[Value]) -> EvalResult {
    let Value::Array(items) = this else {
        return Err(errors::type_mismatch("Array receiver", this));
    };
    Ok(items.write().pop().unwrap_or_default())
}

/// `map(f)` calls `f(item, index)`; `map("name")` and `map(i)` pick a
/// member or an index of every item.
fn array_map(ctx: &mut Context, this: &Value, args: &[Value]) -> EvalResult {
    let items = this_items(this)?;
    let mapper = arg(args, 0);
    let mut out = Vec::with_capacity(items.len());
    for (i, item) in items.into_iter().enumerate() {
        let v = match &mapper {
            Value::Str(name) => ctx.get_member(&item, name)?,
            Value::Int(_) => ctx.get_index(&item, &mapper)?,
            f if ctx.is_callable(f) => ctx.invoke(f, Value::Undefined, vec![item, int(i)])?,
            other => return Err(errors::type_mismatch("callable, Str or Int mapper", other)),
        };
        out.push(v);
    }
    Ok(Value::array(out))
}

fn array_filter(ctx: &mut Context, this: &Value, args: &[Value]) -> EvalResult {
    let items = this_items(this)?;
    let f = callable_arg(ctx, args, 0, "predicate")?;
    let mut out = Vec::new();
    for (i, item) in items.into_iter().enumerate() {
        let keep = ctx.invoke(&f, Value::Undefined, vec![item.clone(), int(i)])?;
        if ctx.is_truthy(&keep)? {
            out.push(item);
        }
    }
    Ok(Value::array(out))
}

fn array_join(ctx: &mut Context, this: &Value, args: &[Value]) -> EvalResult {
    let items = this_items(this)?;
    let sep = if args.is_empty() { " " } else { str_arg(args, 0, "separator")? };
    let mut parts = Vec::with_capacity(items.len());
    for item in &items {
        parts.push(ctx.stringify(item)?);
    }
    Ok(Value::string(parts.join(sep)))
}

fn array_contains(ctx: &mut Context, this: &Value, args: &[Value]) -> EvalResult {
    let needle = arg(args, 0);
    for item in this_items(this)? {
        if ctx.values_equal(&item, &needle)? {
            return Ok(Value::Bool(true));
        }
    }
    Ok(Value::Bool(false))
}

// Str

fn str_len(_: &mut Context, this: &Value, _: &[Value]) -> EvalResult {
    Ok(int(this_str(this)?.chars().count()))
}

fn str_upper(_: &mut Context, this: &Value, _: &[Value]) -> EvalResult {
    Ok(Value::string(this_str(this)?.to_uppercase()))
}

fn str_lower(_: &mut Context, this: &Value, _: &[Value]) -> EvalResult {
    Ok(Value::string(this_str(this)?.to_lowercase()))
}

fn str_trim(_: &mut Context, this: &Value, _: &[Value]) -> EvalResult {
    Ok(Value::str(this_str(this)?.trim()))
}

fn str_starts_with(_: &mut Context, this: &Value, args: &[Value]) -> EvalResult {
    Ok(Value::Bool(this_str(this)?.starts_with(str_arg(args, 0, "prefix")?)))
}

fn str_ends_with(_: &mut Context, this: &Value, args: &[Value]) -> EvalResult {
    Ok(Value::Bool(this_str(this)?.ends_with(str_arg(args, 0, "suffix")?)))
}

fn str_contains(_: &mut Context, this: &Value, args: &[Value]) -> EvalResult {
    Ok(Value::Bool(this_str(this)?.contains(str_arg(args, 0, "substring")?)))
}

/// `split()` splits on whitespace, `split(sep)` on `sep`, and
/// `split(sep, limit)` returns at most `limit` pieces.
fn str_split(_: &mut Context, this: &Value, args: &[Value]) -> EvalResult {
    let s = this_str(this)?;
    let parts: Vec<Value> = match args.len() {
        0 => s.split_whitespace().map(Value::str).collect(),
        _ => {
            let sep = str_arg(args, 0, "separator")?;
            match args.get(1).and_then(Value::as_int) {
                Some(limit) if limit > 0 => s
                    .splitn(usize::try_from(limit).unwrap_or(usize::MAX), sep)
                    .map(Value::str)
                    .collect(),
                _ => s.split(sep).map(Value::str).collect(),
            }
        }
    };
    Ok(Value::array(parts))
}

// Object

fn object_entries(this: &Value) -> Result<Vec<(zgg_ir::Name, Value)>, EvalError> {
    this.as_object()
        .map(|obj| obj.entries())
        .ok_or_else(|| errors::type_mismatch("Object receiver", this))
}

fn object_keys(_: &mut Context, this: &Value, _: &[Value]) -> EvalResult {
    let keys = object_entries(this)?.into_iter().map(|(k, _)| Value::str(&k)).collect();
    Ok(Value::array(keys))
}

fn object_values(_: &mut Context, this: &Value, _: &[Value]) -> EvalResult {
    let values = object_entries(this)?.into_iter().map(|(_, v)| v).collect();
    Ok(Value::array(values))
}

/// `[{key, value}, ...]`
fn object_pairs(_: &mut Context, this: &Value, _: &[Value]) -> EvalResult {
    let pairs = object_entries(this)?
        .into_iter()
        .map(|(k, v)| Value::object([("key", Value::str(&k)), ("value", v)]))
        .collect();
    Ok(Value::array(pairs))
}

fn object_each(ctx: &mut Context, this: &Value, args: &[Value]) -> EvalResult {
    let f = callable_arg(ctx, args, 0, "handler")?;
    for (key, value) in object_entries(this)? {
        ctx.invoke(&f, this.clone(), vec![Value::str(&key), value])?;
    }
    Ok(Value::Undefined)
}

// Int

/// `n.times(f)` calls `f(i)` for `i` in `0..n`; without `f` it returns
/// that range as an array.
fn int_times(ctx: &mut Context, this: &Value, args: &[Value]) -> EvalResult {
    let n = this.as_int().ok_or_else(|| errors::type_mismatch("Int receiver", this))?;
    if n < 0 {
        return Err(EvalError::new(format!("int.times count must not be negative, got {n}")));
    }
    if args.is_empty() {
        return Ok(Value::array((0..n).map(Value::Int).collect()));
    }
    let f = callable_arg(ctx, args, 0, "callback")?;
    for i in 0..n {
        ctx.invoke(&f, Value::Undefined, vec![Value::Int(i)])?;
    }
    Ok(Value::Undefined)
}

// Bytes

fn bytes_len(_: &mut Context, this: &Value, _: &[Value]) -> EvalResult {
    match this {
        Value::Bytes(data) => Ok(int(data.read().len())),
        other => Err(errors::type_mismatch("Bytes receiver", other)),
    }
}

fn bytes_contains(_: &mut Context, this: &Value, args: &[Value]) -> EvalResult {
    let Value::Bytes(data) = this else {
        return Err(errors::type_mismatch("Bytes receiver", this));
    };
    let byte = arg(args, 0);
    let found = byte
        .as_int()
        .and_then(|b| u8::try_from(b).ok())
        .is_some_and(|b| data.read().contains(&b));
    Ok(Value::Bool(found))
}

fn bytes_hex(_: &mut Context, this: &Value, _: &[Value]) -> EvalResult {
    let Value::Bytes(data) = this else {
        return Err(errors::type_mismatch("Bytes receiver", this));
    };
    let data = data.read();
    let mut out = String::with_capacity(data.len() * 2);
    for b in data.iter() {
        let _ = write!(out, "{b:02x}");
    }
    Ok(Value::string(out))
}
