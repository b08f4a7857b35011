//! Global builtin functions and the builtin-type method tables.

mod class_builder;
pub(crate) mod methods;

use zgg_ir::Name;

use crate::context::Context;
use crate::environment::SharedScope;
use crate::errors::{self, EvalError};
use crate::value::{BuiltinFn, Value};
use crate::EvalResult;

pub use class_builder::{make_iterator, ClassBuilder};

type Builtin = fn(&mut Context, &Value, &[Value]) -> EvalResult;

/// Install the global builtin functions into `globals`.
pub(crate) fn register(globals: &SharedScope) {
    let functions: [(&str, Builtin, &[&str]); 17] = [
        ("println", builtin_println, &[]),
        ("print", builtin_print, &[]),
        ("str", builtin_str, &["value"]),
        ("int", builtin_int, &["value"]),
        ("float", builtin_float, &["value"]),
        ("len", builtin_len, &["value"]),
        ("type", builtin_type, &["value"]),
        ("typeName", builtin_type_name, &["value"]),
        ("range", builtin_range, &["begin", "end", "step"]),
        ("isUndefined", builtin_is_undefined, &["value"]),
        ("isCallable", builtin_is_callable, &["value"]),
        ("isArray", builtin_is_array, &["value"]),
        ("isObject", builtin_is_object, &["value"]),
        ("spawn", builtin_spawn, &[]),
        ("import", builtin_import, &["name", "forceReload"]),
        ("min", builtin_min, &[]),
        ("max", builtin_max, &[]),
    ];
    for (name, f, arg_names) in functions {
        let f = BuiltinFn::new(name, f).with_arg_names(arg_names);
        globals.force_define(Name::from(name), Value::builtin(f));
    }
}

fn arg(args: &[Value], i: usize) -> Value {
    args.get(i).cloned().unwrap_or_default()
}

fn join_args(ctx: &mut Context, args: &[Value]) -> Result<String, EvalError> {
    let mut parts = Vec::with_capacity(args.len());
    for a in args {
        parts.push(ctx.stringify(a)?);
    }
    Ok(parts.join(" "))
}

fn builtin_println(ctx: &mut Context, _: &Value, args: &[Value]) -> EvalResult {
    let line = join_args(ctx, args)?;
    ctx.println(&line);
    Ok(Value::Undefined)
}

fn builtin_print(ctx: &mut Context, _: &Value, args: &[Value]) -> EvalResult {
    let text = join_args(ctx, args)?;
    ctx.print(&text);
    Ok(Value::Undefined)
}

fn builtin_str(ctx: &mut Context, _: &Value, args: &[Value]) -> EvalResult {
    Ok(Value::string(ctx.stringify(&arg(args, 0))?))
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "int() truncates toward zero and saturates"
)]
fn float_to_int(f: f64) -> i64 {
    f as i64
}

fn builtin_int(_: &mut Context, _: &Value, args: &[Value]) -> EvalResult {
    let v = arg(args, 0);
    let i = match &v {
        Value::Int(i) => Some(*i),
        Value::Float(f) => Some(float_to_int(*f)),
        Value::BigNum(b) => b.with_scale(0).to_string().parse().ok(),
        Value::Bool(b) => Some(i64::from(*b)),
        Value::Str(s) => s.trim().parse().ok(),
        _ => None,
    };
    i.map(Value::Int)
        .ok_or_else(|| errors::type_mismatch("a value convertible to Int", &v))
}

#[expect(clippy::cast_precision_loss, reason = "float() of a large Int rounds")]
fn builtin_float(_: &mut Context, _: &Value, args: &[Value]) -> EvalResult {
    let v = arg(args, 0);
    let f = match &v {
        Value::Int(i) => Some(*i as f64),
        Value::Float(f) => Some(*f),
        Value::BigNum(b) => b.to_string().parse().ok(),
        Value::Str(s) => s.trim().parse().ok(),
        _ => None,
    };
    f.map(Value::Float)
        .ok_or_else(|| errors::type_mismatch("a value convertible to Float", &v))
}

fn builtin_len(_: &mut Context, _: &Value, args: &[Value]) -> EvalResult {
    let v = arg(args, 0);
    v.len()
        .map(|n| Value::Int(i64::try_from(n).unwrap_or(i64::MAX)))
        .ok_or_else(|| errors::type_mismatch("a value with a length", &v))
}

fn builtin_type(_: &mut Context, _: &Value, args: &[Value]) -> EvalResult {
    Ok(Value::Type(arg(args, 0).type_of()))
}

fn builtin_type_name(_: &mut Context, _: &Value, args: &[Value]) -> EvalResult {
    Ok(Value::str(&arg(args, 0).type_name()))
}

fn builtin_is_undefined(_: &mut Context, _: &Value, args: &[Value]) -> EvalResult {
    Ok(Value::Bool(arg(args, 0).is_undefined()))
}

fn builtin_is_array(_: &mut Context, _: &Value, args: &[Value]) -> EvalResult {
    Ok(Value::Bool(matches!(arg(args, 0), Value::Array(_))))
}

fn builtin_is_object(_: &mut Context, _: &Value, args: &[Value]) -> EvalResult {
    Ok(Value::Bool(matches!(arg(args, 0), Value::Object(_))))
}

fn builtin_is_callable(ctx: &mut Context, _: &Value, args: &[Value]) -> EvalResult {
    Ok(Value::Bool(ctx.is_callable(&arg(args, 0))))
}

/// `range(n)`, `range(a, b)` or `range(a, b, step)` as an array.
fn builtin_range(_: &mut Context, _: &Value, args: &[Value]) -> EvalResult {
    let mut ints = Vec::with_capacity(args.len());
    for a in args {
        ints.push(a.as_int().ok_or_else(|| errors::type_mismatch("Int range bound", a))?);
    }
    let (begin, end, step) = match ints.as_slice() {
        [end] => (0, *end, 1),
        [begin, end] => (*begin, *end, 1),
        [begin, end, step] => (*begin, *end, *step),
        _ => return Err(EvalError::new("range usage: range([begin,] end[, step])")),
    };
    if step == 0 {
        return Err(EvalError::new("range step must not be 0"));
    }
    let mut out = Vec::new();
    let mut i = begin;
    while (step > 0 && i < end) || (step < 0 && i > end) {
        out.push(Value::Int(i));
        match i.checked_add(step) {
            Some(next) => i = next,
            None => break,
        }
    }
    Ok(Value::array(out))
}

fn builtin_spawn(ctx: &mut Context, _: &Value, args: &[Value]) -> EvalResult {
    let Some((callee, rest)) = args.split_first() else {
        return Err(EvalError::new("spawn requires a callable"));
    };
    ctx.start_thread(callee.clone(), rest.to_vec())
}

fn builtin_import(ctx: &mut Context, _: &Value, args: &[Value]) -> EvalResult {
    let name = arg(args, 0);
    let name = name
        .as_str()
        .ok_or_else(|| errors::type_mismatch("Str module name", &name))?;
    let force = arg(args, 1).is_true();
    ctx.import_module(name, force)
}

/// `min(a, b, ...)` or `min(array)`; Undefined when empty.
fn pick(ctx: &mut Context, args: &[Value], want_greater: bool) -> EvalResult {
    let items = match args {
        [Value::Array(items)] => items.read().clone(),
        _ => args.to_vec(),
    };
    let mut best: Option<Value> = None;
    for item in items {
        best = Some(match best {
            None => item,
            Some(current) => {
                let c = ctx.compare_values(&item, &current)?;
                let better = if want_greater { c.is_greater() } else { c.is_less() };
                if better {
                    item
                } else {
                    current
                }
            }
        });
    }
    Ok(best.unwrap_or_default())
}

fn builtin_min(ctx: &mut Context, _: &Value, args: &[Value]) -> EvalResult {
    pick(ctx, args, false)
}

fn builtin_max(ctx: &mut Context, _: &Value, args: &[Value]) -> EvalResult {
    pick(ctx, args, true)
}
