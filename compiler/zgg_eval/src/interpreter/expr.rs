//! Expression evaluation.

use std::str::FromStr;
use std::sync::Arc;

use bigdecimal::BigDecimal;
use zgg_ir::{ArrayItem, Expr, ObjectItem, UseCloser, UseExpr, ValueCondition};

use crate::context::Context;
use crate::errors::{self, EvalError};
use crate::value::{FuncValue, Value};
use crate::EvalResult;

impl Context {
    pub(super) fn eval_expr_inner(&mut self, expr: &Expr) -> EvalResult {
        match expr {
            Expr::Int(i) => Ok(Value::Int(*i)),
            Expr::Float(f) => Ok(Value::Float(*f)),
            Expr::BigNum(text) => BigDecimal::from_str(text)
                .map(Value::bignum)
                .map_err(|_| errors::type_mismatch("a decimal literal", &Value::str(text))),
            Expr::Str(s) => Ok(Value::Str(Arc::clone(s))),
            Expr::Bytes(b) => Ok(Value::bytes(b.to_vec())),
            Expr::Bool(b) => Ok(Value::Bool(*b)),
            Expr::Nil => Ok(Value::Nil),
            Expr::Undefined => Ok(Value::Undefined),

            Expr::ToStr(inner) => {
                let v = self.eval_expr(inner)?;
                Ok(Value::string(self.stringify(&v)?))
            }
            Expr::Array(items) => self.eval_array(items),
            Expr::Object(items) => self.eval_object(items),
            Expr::Func(def) => Ok(Value::func(FuncValue::new(
                Arc::clone(def),
                self.scope().clone(),
            ))),

            Expr::Ident(name) => Ok(self.lookup(name)),
            Expr::Member { owner, name } => {
                let owner = self.eval_expr(owner)?;
                self.get_member(&owner, name)
            }
            Expr::Index { owner, index } => {
                let owner = self.eval_expr(owner)?;
                let index = self.eval_expr(index)?;
                self.get_index(&owner, &index)
            }
            Expr::Slice {
                container,
                begin,
                end,
            } => {
                let container = self.eval_expr(container)?;
                let begin = self.eval_slice_bound(begin.as_deref())?;
                let end = self.eval_slice_bound(end.as_deref())?;
                slice_value(&container, begin, end)
            }

            Expr::Call(call) => self.eval_call(call),
            Expr::New { class, args } => self.eval_new(class, args),

            Expr::Binary { op, left, right } => self.eval_binary(*op, left, right),
            Expr::Unary { op, operand } => {
                let v = self.eval_expr(operand)?;
                self.eval_unary(*op, &v)
            }
            Expr::Compare { first, rest } => self.eval_compare_chain(first, rest),

            Expr::Assign { target, value } => {
                let value = self.eval_expr(value)?;
                self.assign_lval(target, value.clone())?;
                Ok(value)
            }
            Expr::LocalAssign(assign) => self.eval_local_assign(assign),
            Expr::LocalNewAssign(value) => self.eval_local_new_assign(value),
            Expr::IncDec { target, delta, pre } => self.eval_inc_dec(target, *delta, *pre),

            Expr::ArrayComprehension(comp) => self.eval_array_comprehension(comp),
            Expr::ObjectComprehension(comp) => self.eval_object_comprehension(comp),

            Expr::When(when) => {
                for case in &when.cases {
                    let cond = self.eval_expr(&case.condition)?;
                    if self.is_truthy(&cond)? {
                        return self.eval_expr(&case.action);
                    }
                }
                self.eval_optional(when.otherwise.as_ref())
            }
            Expr::WhenValue(when) => {
                let input = self.eval_expr(&when.input)?;
                for case in &when.cases {
                    if self.value_matches(&case.condition, &input)? {
                        return self.eval_expr(&case.result);
                    }
                }
                self.eval_optional(when.otherwise.as_ref())
            }

            Expr::Use(use_expr) => self.eval_use(use_expr),
            Expr::Import(path) => self.import_module(path, false),
        }
    }

    fn eval_optional(&mut self, expr: Option<&Expr>) -> EvalResult {
        match expr {
            Some(expr) => self.eval_expr(expr),
            None => Ok(Value::Undefined),
        }
    }

    fn eval_array(&mut self, items: &[ArrayItem]) -> EvalResult {
        let mut out = Vec::with_capacity(items.len());
        for item in items {
            if let Some(cond) = &item.condition {
                let c = self.eval_expr(cond)?;
                if !self.is_truthy(&c)? {
                    continue;
                }
            }
            let v = self.eval_expr(&item.value)?;
            if item.expand {
                let spread = v
                    .array_items()
                    .ok_or_else(|| errors::type_mismatch("Array to expand", &v))?;
                out.extend(spread);
            } else {
                out.push(v);
            }
        }
        Ok(Value::array(out))
    }

    fn eval_object(&mut self, items: &[ObjectItem]) -> EvalResult {
        let obj = Value::object(std::iter::empty::<(&str, Value)>());
        let Value::Object(target) = &obj else {
            return Err(errors::internal("object literal is not an object"));
        };
        for item in items {
            match item {
                ObjectItem::KeyValue { key, value } => {
                    let key = self.eval_expr(key)?;
                    let key = self.stringify(&key)?;
                    let value = self.eval_expr(value)?;
                    target.set(key.as_str(), value);
                }
                ObjectItem::Expand(source) => {
                    let source = self.eval_expr(source)?;
                    let Value::Object(src) = &source else {
                        return Err(errors::type_mismatch("Object to expand", &source));
                    };
                    for (k, v) in src.entries() {
                        target.set(k, v);
                    }
                }
            }
        }
        Ok(obj)
    }

    fn eval_slice_bound(&mut self, expr: Option<&Expr>) -> Result<Option<i64>, EvalError> {
        let Some(expr) = expr else {
            return Ok(None);
        };
        match self.eval_expr(expr)? {
            Value::Int(i) => Ok(Some(i)),
            Value::Undefined | Value::Nil => Ok(None),
            other => Err(errors::type_mismatch("Int slice bound", &other)),
        }
    }

    /// Whether `input` satisfies a `when value`/`switch` condition.
    pub(crate) fn value_matches(
        &mut self,
        condition: &ValueCondition,
        input: &Value,
    ) -> Result<bool, EvalError> {
        match condition {
            ValueCondition::InList(values) => {
                for expr in values {
                    let candidate = self.eval_expr(expr)?;
                    if self.values_equal(input, &candidate)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
            ValueCondition::InRange {
                min,
                max,
                include_min,
                include_max,
            } => {
                if let Some(min) = min {
                    let min = self.eval_expr(min)?;
                    let c = self.compare_values(input, &min)?;
                    if c.is_less() || (c.is_equal() && !include_min) || c.to_ordering().is_none() {
                        return Ok(false);
                    }
                }
                if let Some(max) = max {
                    let max = self.eval_expr(max)?;
                    let c = self.compare_values(input, &max)?;
                    if c.is_greater() || (c.is_equal() && !include_max) || c.to_ordering().is_none() {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
        }
    }

    /// `use value [as method | with func]`: registers a block-scoped
    /// release call and yields the value.
    fn eval_use(&mut self, use_expr: &UseExpr) -> EvalResult {
        let value = self.eval_expr(&use_expr.value)?;
        let closer = match &use_expr.closer {
            UseCloser::Func(def) => {
                Value::func(FuncValue::new(Arc::clone(def), self.scope().clone()))
            }
            UseCloser::Method(name) => {
                let closer = self.get_member(&value, name)?;
                if !self.is_callable(&closer) {
                    return Err(EvalError::new(format!(
                        "use value without {name} method"
                    )));
                }
                closer
            }
            UseCloser::Default => {
                let mut found = None;
                for name in ["close", "Close"] {
                    let closer = self.get_member(&value, name)?;
                    if self.is_callable(&closer) {
                        found = Some(closer);
                        break;
                    }
                }
                found.ok_or_else(|| EvalError::new("use value without close/Close method"))?
            }
        };
        let args = match &use_expr.closer {
            UseCloser::Func(_) => vec![value.clone()],
            UseCloser::Method(_) | UseCloser::Default => Vec::new(),
        };
        self.add_block_defer(closer, args, true);
        Ok(value)
    }
}

/// Resolve `[begin:end]` against `len`: negative bounds count from the
/// end, everything is clamped into range and an inverted range is empty.
pub(crate) fn slice_range(len: usize, begin: Option<i64>, end: Option<i64>) -> (usize, usize) {
    let len_i = i64::try_from(len).unwrap_or(i64::MAX);
    let fix = |i: i64| -> usize {
        let i = if i < 0 { i + len_i } else { i };
        usize::try_from(i.clamp(0, len_i)).unwrap_or(0)
    };
    let begin = begin.map_or(0, fix);
    let end = end.map_or(len, fix);
    (begin, end.max(begin))
}

fn slice_value(container: &Value, begin: Option<i64>, end: Option<i64>) -> EvalResult {
    match container {
        Value::Str(s) => {
            let chars: Vec<char> = s.chars().collect();
            let (b, e) = slice_range(chars.len(), begin, end);
            Ok(Value::string(chars[b..e].iter().collect()))
        }
        Value::Array(items) => {
            let items = items.read();
            let (b, e) = slice_range(items.len(), begin, end);
            Ok(Value::array(items[b..e].to_vec()))
        }
        Value::Bytes(data) => {
            let data = data.read();
            let (b, e) = slice_range(data.len(), begin, end);
            Ok(Value::bytes(data[b..e].to_vec()))
        }
        other => Err(errors::type_mismatch("Str, Array or Bytes to slice", other)),
    }
}
