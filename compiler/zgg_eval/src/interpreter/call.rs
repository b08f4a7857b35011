//! Call expressions, argument placement and partial application.

use smallvec::SmallVec;
use zgg_ir::{CallArg, CallExpr, Expr, Name};

use crate::context::Context;
use crate::errors::{self, EvalError};
use crate::value::Value;
use crate::EvalResult;

/// An argument after its expression ran, before placement.
enum ArgValue {
    Positional(Value),
    Keyword(Name, Value),
    Expand(Value),
    Hole(i32),
}

type ArgValues = SmallVec<[ArgValue; 4]>;

impl Context {
    pub(super) fn eval_call(&mut self, call: &CallExpr) -> EvalResult {
        let callee = self.eval_expr(&call.callee)?;
        let pending = self.eval_arg_values(&call.args)?;
        if call.is_bind() {
            let optional = call.optional;
            return Ok(Value::native("", move |ctx, _, bound| {
                invoke_with(ctx, &callee, &pending, bound, optional)
            }));
        }
        invoke_with(self, &callee, &pending, &[], call.optional)
    }

    /// `new T(args)`.
    pub(super) fn eval_new(&mut self, class: &Expr, args: &[CallArg]) -> EvalResult {
        let class = self.eval_expr(class)?;
        let class = match class {
            Value::Bound(bound) => bound.callee.clone(),
            other => other,
        };
        let Value::Type(ty) = &class else {
            return Err(errors::type_mismatch("a type after 'new'", &class));
        };
        let pending = self.eval_arg_values(args)?;
        let args = place_args(self, &class, &pending, &[])?;
        self.construct(ty, args)
    }

    /// Evaluate and place arguments for `callee`; placeholders are not
    /// allowed here.
    pub(crate) fn eval_args(
        &mut self,
        callee: &Value,
        args: &[CallArg],
        bound: &[Value],
    ) -> Result<Vec<Value>, EvalError> {
        let pending = self.eval_arg_values(args)?;
        place_args(self, callee, &pending, bound)
    }

    fn eval_arg_values(&mut self, args: &[CallArg]) -> Result<ArgValues, EvalError> {
        let mut out = ArgValues::with_capacity(args.len());
        for arg in args {
            out.push(match arg {
                CallArg::Positional(expr) => ArgValue::Positional(self.eval_expr(expr)?),
                CallArg::Keyword(name, expr) => ArgValue::Keyword(name.clone(), self.eval_expr(expr)?),
                CallArg::Expand(expr) => ArgValue::Expand(self.eval_expr(expr)?),
                CallArg::Hole(i) => ArgValue::Hole(*i),
            });
        }
        Ok(out)
    }
}

fn invoke_with(
    ctx: &mut Context,
    callee: &Value,
    pending: &[ArgValue],
    bound: &[Value],
    optional: bool,
) -> EvalResult {
    if !ctx.is_callable(callee) {
        if optional {
            return Ok(Value::Undefined);
        }
        return Err(errors::not_callable(callee));
    }
    let args = place_args(ctx, callee, pending, bound)?;
    ctx.invoke(callee, Value::Undefined, args)
}

/// Lay out the final argument list. Keywords land at their parameter's
/// position (padding with Undefined); an Undefined keyword value is
/// ignored.
fn place_args(
    ctx: &Context,
    callee: &Value,
    pending: &[ArgValue],
    bound: &[Value],
) -> Result<Vec<Value>, EvalError> {
    let mut args = Vec::with_capacity(pending.len());
    let mut names: Option<Vec<Name>> = None;
    for arg in pending {
        match arg {
            ArgValue::Positional(v) => args.push(v.clone()),
            ArgValue::Hole(i) => args.push(fill_hole(*i, bound)?),
            ArgValue::Expand(v) => {
                let items = v
                    .array_items()
                    .ok_or_else(|| errors::type_mismatch("Array for expanded arguments", v))?;
                args.extend(items);
            }
            ArgValue::Keyword(name, v) => {
                let names = names.get_or_insert_with(|| ctx.arg_names(callee));
                let pos = names
                    .iter()
                    .position(|n| n == name)
                    .ok_or_else(|| errors::invalid_keyword(name, &callee_name(callee)))?;
                if v.is_undefined() {
                    continue;
                }
                if pos < args.len() {
                    args[pos] = v.clone();
                } else {
                    args.resize(pos, Value::Undefined);
                    args.push(v.clone());
                }
            }
        }
    }
    Ok(args)
}

fn fill_hole(index: i32, bound: &[Value]) -> Result<Value, EvalError> {
    let len = i64::try_from(bound.len()).unwrap_or(i64::MAX);
    let i = i64::from(index);
    let i = if i < 0 { i + len } else { i };
    usize::try_from(i)
        .ok()
        .and_then(|i| bound.get(i))
        .cloned()
        .ok_or_else(|| EvalError::new("placeholder value not given"))
}

fn callee_name(callee: &Value) -> String {
    match callee {
        Value::Func(f) => f.display_name().to_string(),
        Value::Builtin(b) => b.name().to_string(),
        Value::Bound(b) => callee_name(&b.callee),
        Value::Type(t) => t.name().to_string(),
        other => other.type_name().to_string(),
    }
}
