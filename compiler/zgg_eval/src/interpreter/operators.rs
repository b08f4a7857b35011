//! Operator semantics.
//!
//! Builtin combinations are applied first. When none matches, the hook
//! named by the operator (`__add__`, `__lt__`, ...) is looked up on the
//! left operand and called with the right operand. `+` with a string on the
//! right falls back to concatenation after the hook.

use std::str::FromStr;

use bigdecimal::num_bigint::BigInt;
use bigdecimal::BigDecimal;
use zgg_ir::{BinaryOp, CompareOp, Expr, UnaryOp};

use crate::context::Context;
use crate::errors::{self, EvalError, EvalNote};
use crate::value::{CompareResult, Value};
use crate::EvalResult;

/// A numeric operand after promotion.
enum Num {
    Int(i64, i64),
    Float(f64, f64),
    Big(BigDecimal, BigDecimal),
}

#[expect(clippy::cast_precision_loss, reason = "Int to Float promotion is lossy by definition")]
fn int_to_float(i: i64) -> f64 {
    i as f64
}

fn to_float(v: &Value) -> Option<f64> {
    match v {
        Value::Int(i) => Some(int_to_float(*i)),
        Value::Float(f) => Some(*f),
        Value::BigNum(b) => b.to_string().parse().ok(),
        _ => None,
    }
}

fn to_big(v: &Value) -> Option<BigDecimal> {
    match v {
        Value::Int(i) => Some(BigDecimal::from(*i)),
        Value::Float(f) if f.is_finite() => BigDecimal::from_str(&f.to_string()).ok(),
        Value::BigNum(b) => Some((**b).clone()),
        _ => None,
    }
}

/// Int with Int stays Int, a BigNum on either side promotes to BigNum,
/// otherwise Float.
fn promote(left: &Value, right: &Value) -> Option<Num> {
    match (left, right) {
        (Value::Int(a), Value::Int(b)) => Some(Num::Int(*a, *b)),
        (Value::BigNum(_), Value::Int(_) | Value::Float(_) | Value::BigNum(_))
        | (Value::Int(_) | Value::Float(_), Value::BigNum(_)) => match (to_big(left), to_big(right)) {
            (Some(a), Some(b)) => Some(Num::Big(a, b)),
            _ => Some(Num::Float(to_float(left)?, to_float(right)?)),
        },
        (Value::Int(_) | Value::Float(_), Value::Int(_) | Value::Float(_)) => {
            Some(Num::Float(to_float(left)?, to_float(right)?))
        }
        _ => None,
    }
}

/// Square-and-multiply with fixed-width wraparound.
fn wrapping_pow(mut base: i64, mut exp: u64) -> i64 {
    let mut acc: i64 = 1;
    while exp > 0 {
        if exp & 1 == 1 {
            acc = acc.wrapping_mul(base);
        }
        base = base.wrapping_mul(base);
        exp >>= 1;
    }
    acc
}

fn float_pow(a: f64, b: f64) -> f64 {
    a.powf(b)
}

fn shift(op: BinaryOp, value: i64, count: i64) -> Result<i64, EvalError> {
    let count = u32::try_from(count)
        .map_err(|_| errors::type_mismatch("a non-negative shift count", &Value::Int(count)))?;
    Ok(match op {
        BinaryOp::Shl => value.checked_shl(count).unwrap_or(0),
        _ => value
            .checked_shr(count)
            .unwrap_or(if value < 0 { -1 } else { 0 }),
    })
}

/// Upper bound on the elements (or bytes) `Str * Int` and `Array * Int`
/// may produce.
const MAX_REPEAT_LEN: usize = 1 << 28;

/// Copies of a `unit`-long value to produce; negative counts give none.
fn repeat_count(unit: usize, n: i64) -> Result<usize, EvalError> {
    let count = usize::try_from(n).unwrap_or(0);
    if unit == 0 {
        return Ok(0);
    }
    match unit.checked_mul(count) {
        Some(total) if total <= MAX_REPEAT_LEN => Ok(count),
        _ => Err(errors::repeat_too_large(n, MAX_REPEAT_LEN)),
    }
}

impl Context {
    pub(super) fn eval_binary(&mut self, op: BinaryOp, left: &Expr, right: &Expr) -> EvalResult {
        match op {
            BinaryOp::And | BinaryOp::Or => self.eval_logical(op, left, right),
            BinaryOp::Coalesce => self.eval_coalesce(left, right),
            _ => {
                let l = self.eval_expr(left)?;
                let r = self.eval_expr(right)?;
                self.binary_values(op, &l, &r)
            }
        }
    }

    /// Apply a non-short-circuit binary operator to two values.
    pub fn binary_values(&mut self, op: BinaryOp, left: &Value, right: &Value) -> EvalResult {
        if op == BinaryOp::Is {
            return self.type_test(left, right);
        }
        if let Some(v) = self.builtin_binary(op, left, right)? {
            return Ok(v);
        }
        if let Some(hook) = op.hook_name().and_then(|name| self.find_hook(left, name)) {
            return self.call_hook(&hook, right.clone());
        }
        if op == BinaryOp::Add && matches!(right, Value::Str(_)) {
            let mut s = self.stringify(left)?;
            s.push_str(&self.stringify(right)?);
            return Ok(Value::string(s));
        }
        Err(self.with_host_types(errors::binary_type_mismatch(op, left, right), &[left, right]))
    }

    /// In debug mode, name the Rust type behind each host operand.
    fn with_host_types(&self, err: EvalError, operands: &[&Value]) -> EvalError {
        if !self.runtime().config().debug {
            return err;
        }
        operands.iter().fold(err, |err, v| match v {
            Value::Host(h) => err.with_note(EvalNote::new(format!(
                "host value {} holds {}",
                h.name(),
                h.rust_type()
            ))),
            _ => err,
        })
    }

    fn builtin_binary(
        &mut self,
        op: BinaryOp,
        left: &Value,
        right: &Value,
    ) -> Result<Option<Value>, EvalError> {
        if let Some(num) = promote(left, right) {
            return self.arith(op, num);
        }
        let v = match (op, left, right) {
            (BinaryOp::Add, Value::Str(a), _) => {
                let mut s = a.to_string();
                s.push_str(&self.stringify(right)?);
                Value::string(s)
            }
            (BinaryOp::Add, Value::Array(a), Value::Array(b)) => {
                let mut items = a.read().clone();
                items.extend(b.read().iter().cloned());
                Value::array(items)
            }
            (BinaryOp::Add, Value::Bytes(a), Value::Bytes(b)) => {
                let mut data = a.read().clone();
                data.extend_from_slice(&b.read());
                Value::bytes(data)
            }
            (BinaryOp::Mul, Value::Str(s), Value::Int(n)) => {
                Value::string(s.repeat(repeat_count(s.len(), *n)?))
            }
            (BinaryOp::Mul, Value::Array(a), Value::Int(n)) => {
                let items = a.read().clone();
                let count = repeat_count(items.len(), *n)?;
                let mut out = Vec::with_capacity(items.len() * count);
                for _ in 0..count {
                    out.extend(items.iter().cloned());
                }
                Value::array(out)
            }
            (BinaryOp::Mod, Value::Str(template), args) => {
                let args = args.array_items().unwrap_or_else(|| vec![args.clone()]);
                Value::string(self.format_template(template, &args)?)
            }
            _ => return Ok(None),
        };
        Ok(Some(v))
    }

    fn arith(&mut self, op: BinaryOp, num: Num) -> Result<Option<Value>, EvalError> {
        let v = match num {
            Num::Int(a, b) => match op {
                BinaryOp::Add => Value::Int(a.wrapping_add(b)),
                BinaryOp::Sub => Value::Int(a.wrapping_sub(b)),
                BinaryOp::Mul => Value::Int(a.wrapping_mul(b)),
                BinaryOp::Div | BinaryOp::Mod if b == 0 => return Err(errors::division_by_zero()),
                BinaryOp::Div => Value::Int(a.wrapping_div(b)),
                BinaryOp::Mod => Value::Int(a.wrapping_rem(b)),
                BinaryOp::Pow => match u64::try_from(b) {
                    Ok(exp) => Value::Int(wrapping_pow(a, exp)),
                    Err(_) => Value::Float(float_pow(int_to_float(a), int_to_float(b))),
                },
                BinaryOp::BitAnd => Value::Int(a & b),
                BinaryOp::BitOr => Value::Int(a | b),
                BinaryOp::BitXor => Value::Int(a ^ b),
                BinaryOp::Shl | BinaryOp::Shr => Value::Int(shift(op, a, b)?),
                _ => return Ok(None),
            },
            Num::Float(a, b) => match op {
                BinaryOp::Add => Value::Float(a + b),
                BinaryOp::Sub => Value::Float(a - b),
                BinaryOp::Mul => Value::Float(a * b),
                BinaryOp::Div | BinaryOp::Mod if b == 0.0 => return Err(errors::division_by_zero()),
                BinaryOp::Div => Value::Float(a / b),
                BinaryOp::Mod => Value::Float(a % b),
                BinaryOp::Pow => Value::Float(float_pow(a, b)),
                _ => return Ok(None),
            },
            Num::Big(a, b) => {
                let r = match op {
                    BinaryOp::Add => &a + &b,
                    BinaryOp::Sub => &a - &b,
                    BinaryOp::Mul => &a * &b,
                    BinaryOp::Div | BinaryOp::Mod if b == BigDecimal::from(0) => {
                        return Err(errors::division_by_zero());
                    }
                    BinaryOp::Div => self.big_div(&a, &b),
                    BinaryOp::Mod => &a % &b,
                    BinaryOp::Pow => return Ok(Some(self.big_pow(&a, &b))),
                    _ => return Ok(None),
                };
                Value::bignum(self.round_big(r))
            }
        };
        Ok(Some(v))
    }

    fn round_big(&self, v: BigDecimal) -> BigDecimal {
        let precision = self.runtime().config().bignum_precision;
        if v.digits() > precision {
            v.with_prec(precision)
        } else {
            v
        }
    }

    /// `a / b` to `bignum_precision` significant digits. The quotient is
    /// taken on the integer mantissas, with the dividend scaled up far
    /// enough to leave a couple of guard digits. `b` must be non-zero.
    fn big_div(&self, a: &BigDecimal, b: &BigDecimal) -> BigDecimal {
        let precision = i64::try_from(self.runtime().config().bignum_precision).unwrap_or(i64::MAX / 4);
        let (num, num_scale) = a.as_bigint_and_exponent();
        let (den, den_scale) = b.as_bigint_and_exponent();
        let a_digits = i64::try_from(a.digits()).unwrap_or(0);
        let b_digits = i64::try_from(b.digits()).unwrap_or(0);
        let shift = u32::try_from((precision + b_digits - a_digits + 2).max(0)).unwrap_or(u32::MAX);
        let quotient = num * BigInt::from(10u8).pow(shift) / den;
        let q = BigDecimal::new(quotient, num_scale - den_scale + i64::from(shift)).normalized();
        // Exact quotients such as 6 / 3 keep a non-negative scale.
        let q = if q.as_bigint_and_exponent().1 < 0 { q.with_scale(0) } else { q };
        self.round_big(q)
    }

    /// Integral exponents stay exact; anything else goes through Float.
    fn big_pow(&self, base: &BigDecimal, exp: &BigDecimal) -> Value {
        let integral = exp.is_integer();
        let n = exp.with_scale(0).to_string().parse::<i64>().ok();
        match n {
            Some(n) if integral => {
                let mut acc = BigDecimal::from(1);
                let mut sq = base.clone();
                let mut e = n.unsigned_abs();
                while e > 0 {
                    if e & 1 == 1 {
                        acc = self.round_big(&acc * &sq);
                    }
                    sq = self.round_big(&sq * &sq);
                    e >>= 1;
                }
                if n < 0 && acc != BigDecimal::from(0) {
                    acc = self.big_div(&BigDecimal::from(1), &acc);
                }
                Value::bignum(acc)
            }
            _ => {
                let a = to_float(&Value::bignum(base.clone())).unwrap_or(f64::NAN);
                let b = to_float(&Value::bignum(exp.clone())).unwrap_or(f64::NAN);
                Value::Float(float_pow(a, b))
            }
        }
    }

    /// `&&`/`||` return one of their operands. A `__and__`/`__or__` hook
    /// on the left operand receives the eagerly evaluated right operand.
    fn eval_logical(&mut self, op: BinaryOp, left: &Expr, right: &Expr) -> EvalResult {
        let l = self.eval_expr(left)?;
        if let Some(hook) = op.hook_name().and_then(|name| self.find_hook(&l, name)) {
            let r = self.eval_expr(right)?;
            return self.call_hook(&hook, r);
        }
        let truthy = self.is_truthy(&l)?;
        match (op, truthy) {
            (BinaryOp::And, false) | (BinaryOp::Or, true) => Ok(l),
            _ => self.eval_expr(right),
        }
    }

    /// `left ?? right`: the right side runs when the left raises a
    /// catchable error or yields Nil/Undefined; `__err__` holds the
    /// exception object (or Nil).
    fn eval_coalesce(&mut self, left: &Expr, right: &Expr) -> EvalResult {
        let err = match self.eval_expr(left) {
            Ok(v) if !v.is_nil_or_undefined() => return Ok(v),
            Ok(_) => Value::Nil,
            Err(e) if !e.is_fatal() => e.to_value(),
            Err(e) => return Err(e),
        };
        self.with_block(|ctx| {
            ctx.force_local("__err__", err);
            ctx.eval_expr(right)
        })
    }

    fn type_test(&mut self, left: &Value, right: &Value) -> EvalResult {
        if let Some(hook) = self.find_hook(left, "__is__") {
            return self.call_hook(&hook, right.clone());
        }
        let target = match right {
            Value::Bound(bound) => &bound.callee,
            other => other,
        };
        match target {
            Value::Type(ty) => Ok(Value::Bool(left.type_of().is_sub_of(ty))),
            other => Err(errors::type_mismatch("a type on the right of 'is'", other)),
        }
    }

    pub(super) fn eval_unary(&mut self, op: UnaryOp, operand: &Value) -> EvalResult {
        match (op, operand) {
            (UnaryOp::Not, v) => Ok(Value::Bool(!self.is_truthy(v)?)),
            (UnaryOp::Neg, Value::Int(i)) => Ok(Value::Int(i.wrapping_neg())),
            (UnaryOp::Neg, Value::Float(f)) => Ok(Value::Float(-f)),
            (UnaryOp::Neg, Value::BigNum(b)) => Ok(Value::bignum(-(**b).clone())),
            (UnaryOp::BitNot, Value::Int(i)) => Ok(Value::Int(!i)),
            (op, v) => {
                let err = errors::unary_type_mismatch(op.as_symbol(), v);
                Err(self.with_host_types(err, &[v]))
            }
        }
    }

    /// `a < b <= c`: every link must hold; evaluation stops at the first
    /// false link.
    pub(super) fn eval_compare_chain(&mut self, first: &Expr, rest: &[(CompareOp, Expr)]) -> EvalResult {
        let mut left = self.eval_expr(first)?;
        for (op, expr) in rest {
            let right = self.eval_expr(expr)?;
            if !self.compare_op(*op, &left, &right)? {
                return Ok(Value::Bool(false));
            }
            left = right;
        }
        Ok(Value::Bool(true))
    }

    /// One comparison. A hook named after the operator wins; `!=` also
    /// accepts a negated `__eq__`.
    pub fn compare_op(&mut self, op: CompareOp, left: &Value, right: &Value) -> Result<bool, EvalError> {
        if let Some(hook) = self.find_hook(left, op.hook_name()) {
            let r = self.call_hook(&hook, right.clone())?;
            return self.is_truthy(&r);
        }
        if op == CompareOp::Ne {
            return Ok(!self.values_equal(left, right)?);
        }
        if op == CompareOp::Eq {
            return self.values_equal(left, right);
        }
        let c = self.compare_values(left, right)?;
        Ok(match op {
            CompareOp::Lt => c.is_less(),
            CompareOp::Le => c.is_any_of(CompareResult::LESS | CompareResult::EQUAL),
            CompareOp::Gt => c.is_greater(),
            CompareOp::Ge => c.is_any_of(CompareResult::GREATER | CompareResult::EQUAL),
            CompareOp::Eq | CompareOp::Ne => c.is_equal(),
        })
    }

    /// Equality honouring `__eq__`.
    pub fn values_equal(&mut self, left: &Value, right: &Value) -> Result<bool, EvalError> {
        if let Some(hook) = self.find_hook(left, "__eq__") {
            let r = self.call_hook(&hook, right.clone())?;
            return self.is_truthy(&r);
        }
        Ok(self.compare_values(left, right)?.is_equal())
    }

    /// Three-way comparison without operator hooks (object members are
    /// still compared with `values_equal`).
    pub fn compare_values(&mut self, left: &Value, right: &Value) -> Result<CompareResult, EvalError> {
        let result = match (left, right) {
            (Value::Int(a), Value::Int(b)) => CompareResult::from_ordering(a.cmp(b)),
            (Value::Int(_) | Value::Float(_) | Value::BigNum(_), Value::Int(_) | Value::Float(_) | Value::BigNum(_)) => {
                match promote(left, right) {
                    Some(Num::Big(a, b)) => CompareResult::from_ordering(a.cmp(&b)),
                    Some(Num::Float(a, b)) => CompareResult::from_partial(a.partial_cmp(&b)),
                    Some(Num::Int(a, b)) => CompareResult::from_ordering(a.cmp(&b)),
                    None => CompareResult::NOT_EQUAL,
                }
            }
            (Value::Str(a), Value::Str(b)) => CompareResult::from_ordering(a.cmp(b)),
            (Value::Bytes(a), Value::Bytes(b)) => {
                if a.ptr_eq(b) {
                    return Ok(CompareResult::EQUAL);
                }
                CompareResult::from_ordering(a.read().as_slice().cmp(b.read().as_slice()))
            }
            (Value::Array(a), Value::Array(b)) => {
                if a.ptr_eq(b) {
                    return Ok(CompareResult::EQUAL);
                }
                let (a, b) = (a.read().clone(), b.read().clone());
                for (x, y) in a.iter().zip(&b) {
                    let c = self.compare_values(x, y)?;
                    if !c.is_equal() {
                        return Ok(c);
                    }
                }
                CompareResult::from_ordering(a.len().cmp(&b.len()))
            }
            (Value::Object(a), Value::Object(b)) => {
                if a.same_instance(b) {
                    return Ok(CompareResult::EQUAL);
                }
                let (a, b) = (a.entries(), b.entries());
                if a.len() != b.len() {
                    return Ok(CompareResult::NOT_EQUAL);
                }
                for (key, x) in &a {
                    let Some((_, y)) = b.iter().find(|(k, _)| k == key) else {
                        return Ok(CompareResult::NOT_EQUAL);
                    };
                    if !self.values_equal(x, y)? {
                        return Ok(CompareResult::NOT_EQUAL);
                    }
                }
                CompareResult::EQUAL
            }
            (Value::Bool(a), Value::Bool(b)) => CompareResult::from_ordering(a.cmp(b)),
            (Value::Nil, Value::Nil) | (Value::Undefined, Value::Undefined) => CompareResult::EQUAL,
            (Value::Type(_) | Value::Func(_) | Value::Builtin(_) | Value::Bound(_) | Value::Host(_), _) => {
                if left == right {
                    CompareResult::EQUAL
                } else {
                    CompareResult::NOT_EQUAL
                }
            }
            _ => CompareResult::NOT_EQUAL,
        };
        Ok(result)
    }

    /// Truthiness honouring `__true__`.
    pub fn is_truthy(&mut self, value: &Value) -> Result<bool, EvalError> {
        if let Value::Object(_) = value {
            if let Some(hook) = self.find_hook(value, "__true__") {
                let r = self.invoke(&hook, Value::Undefined, Vec::new())?;
                return Ok(r.is_true());
            }
        }
        Ok(value.is_true())
    }

    /// String conversion honouring `__str__`, applied recursively inside
    /// arrays and objects.
    pub fn stringify(&mut self, value: &Value) -> Result<String, EvalError> {
        match value {
            Value::Str(s) => Ok(s.to_string()),
            Value::Array(items) => {
                let items = items.read().clone();
                let mut parts = Vec::with_capacity(items.len());
                for item in &items {
                    parts.push(self.stringify(item)?);
                }
                Ok(format!("[{}]", parts.join(", ")))
            }
            Value::Object(obj) => {
                if let Some(hook) = self.find_hook(value, "__str__") {
                    let r = self.invoke(&hook, Value::Undefined, Vec::new())?;
                    return Ok(r.to_string());
                }
                let mut parts = Vec::with_capacity(obj.len());
                for (key, member) in obj.entries() {
                    parts.push(format!("{key}: {}", self.stringify(&member)?));
                }
                Ok(format!("{{{}}}", parts.join(", ")))
            }
            other => match self.find_hook(other, "__str__") {
                Some(hook) => Ok(self.invoke(&hook, Value::Undefined, Vec::new())?.to_string()),
                None => Ok(other.to_string()),
            },
        }
    }

    /// `"a {} b %v" % [x, y]`. Each of `{}`, `%v`, `%s` and `%d` takes the
    /// next argument; `%%` is a literal percent sign. Placeholders without
    /// an argument are kept as written.
    fn format_template(&mut self, template: &str, args: &[Value]) -> Result<String, EvalError> {
        let mut out = String::with_capacity(template.len());
        let mut args = args.iter();
        let mut chars = template.chars().peekable();
        while let Some(c) = chars.next() {
            let placeholder = match (c, chars.peek()) {
                ('{', Some(&'}')) => Some("{}"),
                ('%', Some(&'v')) => Some("%v"),
                ('%', Some(&'s')) => Some("%s"),
                ('%', Some(&'d')) => Some("%d"),
                ('%', Some(&'%')) => {
                    chars.next();
                    out.push('%');
                    continue;
                }
                _ => None,
            };
            let Some(placeholder) = placeholder else {
                out.push(c);
                continue;
            };
            chars.next();
            match args.next() {
                Some(arg) => out.push_str(&self.stringify(arg)?),
                None => out.push_str(placeholder),
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::{shift, wrapping_pow};
    use zgg_ir::BinaryOp;

    #[test]
    fn pow_wraps() {
        assert_eq!(wrapping_pow(2, 10), 1024);
        assert_eq!(wrapping_pow(3, 0), 1);
        assert_eq!(wrapping_pow(2, 64), 0);
        assert_eq!(wrapping_pow(-1, 1_000_001), -1);
        assert_eq!(wrapping_pow(2, 63), i64::MIN);
    }

    #[test]
    fn wide_shifts_saturate() {
        assert_eq!(shift(BinaryOp::Shl, 1, 3).ok(), Some(8));
        assert_eq!(shift(BinaryOp::Shl, 1, 64).ok(), Some(0));
        assert_eq!(shift(BinaryOp::Shr, -8, 1).ok(), Some(-4));
        assert_eq!(shift(BinaryOp::Shr, -8, 99).ok(), Some(-1));
        assert!(shift(BinaryOp::Shl, 1, -1).is_err());
    }
}
