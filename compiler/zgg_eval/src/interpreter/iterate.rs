//! Iteration shared by `for ... in` and comprehensions.
//!
//! Sources, in order of precedence:
//! - an integer range `a..b` / `a..=b`
//! - a value with a callable `__iter__`: it returns a step function whose
//!   results are `[value, hasMore]` pairs; iteration ends at the first
//!   result that is not a two-element array with a truthy second item
//! - Int `n` (`0..n`), Object (key, value), Array, Str (chars), Bytes

use zgg_ir::{ArrayComprehension, Comprehension, IterSource, ObjectComprehension};

use crate::context::Context;
use crate::errors::{self, EvalError};
use crate::value::Value;
use crate::EvalResult;

/// Called with `(index, value)`; returning `false` stops the iteration.
pub(crate) type Visit<'a> = dyn FnMut(&mut Context, Value, Value) -> Result<bool, EvalError> + 'a;

impl Context {
    pub(crate) fn iterate_source(&mut self, source: &IterSource, visit: &mut Visit<'_>) -> Result<(), EvalError> {
        match source {
            IterSource::Range {
                begin,
                end,
                inclusive,
            } => {
                let b = self.eval_expr(begin)?;
                let begin = b
                    .as_int()
                    .ok_or_else(|| errors::type_mismatch("Int range begin", &b))?;
                let e = self.eval_expr(end)?;
                let end = e
                    .as_int()
                    .ok_or_else(|| errors::type_mismatch("Int range end", &e))?;
                let mut index = 0;
                let mut current = begin;
                while current < end || (*inclusive && current == end) {
                    if !visit(self, Value::Int(index), Value::Int(current))? {
                        break;
                    }
                    index += 1;
                    match current.checked_add(1) {
                        Some(next) => current = next,
                        None => break,
                    }
                }
                Ok(())
            }
            IterSource::Iterable(expr) => {
                let iterable = self.eval_expr(expr)?;
                self.iterate_value(&iterable, visit)
            }
        }
    }

    /// Iterate any iterable value.
    pub fn iterate_value(&mut self, iterable: &Value, visit: &mut Visit<'_>) -> Result<(), EvalError> {
        if let Some(get_iter) = self.find_hook(iterable, "__iter__") {
            return self.iterate_custom(&get_iter, visit);
        }
        match iterable {
            Value::Int(n) => {
                for i in 0..*n {
                    if !visit(self, Value::Int(i), Value::Int(i))? {
                        break;
                    }
                }
            }
            Value::Object(obj) => {
                for (key, value) in obj.entries() {
                    if !visit(self, Value::str(&key), value)? {
                        break;
                    }
                }
            }
            Value::Array(_) | Value::Str(_) | Value::Bytes(_) => {
                let len = iterable.len().unwrap_or(0);
                for i in 0..len {
                    let i = i64::try_from(i).unwrap_or(i64::MAX);
                    let item = self.get_index(iterable, &Value::Int(i))?;
                    if !visit(self, Value::Int(i), item)? {
                        break;
                    }
                }
            }
            other => return Err(errors::not_iterable(other)),
        }
        Ok(())
    }

    fn iterate_custom(&mut self, get_iter: &Value, visit: &mut Visit<'_>) -> Result<(), EvalError> {
        let step = self.invoke(get_iter, Value::Undefined, Vec::new())?;
        if !self.is_callable(&step) {
            return Err(EvalError::new("__iter__ should return a callable value"));
        }
        let mut index = 0;
        loop {
            let r = self.invoke(&step, Value::Undefined, Vec::new())?;
            let Some(pair) = r.array_items() else {
                break;
            };
            let [value, more] = pair.as_slice() else {
                break;
            };
            if !self.is_truthy(more)? {
                break;
            }
            if !visit(self, Value::Int(index), value.clone())? {
                break;
            }
            index += 1;
        }
        Ok(())
    }

    /// Drive a comprehension head inside one frame, calling `emit` for
    /// every item that passes the filter.
    fn comprehend(
        &mut self,
        head: &Comprehension,
        emit: &mut dyn FnMut(&mut Context) -> Result<(), EvalError>,
    ) -> Result<(), EvalError> {
        self.with_block(|ctx| {
            ctx.iterate_source(&head.source, &mut |ctx, index, value| {
                ctx.force_local(head.value.clone(), value);
                if let Some(index_name) = &head.index {
                    ctx.force_local(index_name.clone(), index);
                }
                if let Some(filter) = &head.filter {
                    let keep = ctx.eval_expr(filter)?;
                    if !ctx.is_truthy(&keep)? {
                        return Ok(true);
                    }
                }
                emit(ctx)?;
                Ok(true)
            })
        })
    }

    pub(super) fn eval_array_comprehension(&mut self, comp: &ArrayComprehension) -> EvalResult {
        let mut items = Vec::new();
        self.comprehend(&comp.head, &mut |ctx| {
            items.push(ctx.eval_expr(&comp.item)?);
            Ok(())
        })?;
        Ok(Value::array(items))
    }

    pub(super) fn eval_object_comprehension(&mut self, comp: &ObjectComprehension) -> EvalResult {
        let mut entries = Vec::new();
        self.comprehend(&comp.head, &mut |ctx| {
            let key = ctx.eval_expr(&comp.key)?;
            let key = ctx.stringify(&key)?;
            entries.push((key, ctx.eval_expr(&comp.value)?));
            Ok(())
        })?;
        Ok(Value::object(entries))
    }
}
