//! Runtime values.
//!
//! `Value` is a closed sum of every kind the evaluator manipulates. Scalars
//! are stored inline; shared kinds (arrays, bytes, objects, callables,
//! types) are reference counted so cloning a `Value` never copies payload
//! and mutation through one handle is visible through all of them.
//!
//! Behaviour that can run user code (hooks such as `__str__`, `__eq__`,
//! `__true__`) lives on `Context`; the methods here are the hook-free base
//! semantics.

mod compare;
mod function;
mod heap;
mod host;
mod members;
mod object;
mod types;

use std::fmt;
use std::sync::Arc;

use bigdecimal::BigDecimal;
use parking_lot::RwLock;
use zgg_ir::Name;

pub use compare::CompareResult;
pub use function::{BoundMethod, BuiltinFn, FuncValue, NativeFn};
pub use heap::Heap;
pub use host::HostValue;
pub use members::OrderedMembers;
pub use object::{Object, ObjectRef, Reserved};
pub use types::{builtin_types, type_id, BuiltinTypes, TypeDef, TypeRef};

pub type ArrayCell = RwLock<Vec<Value>>;
pub type BytesCell = RwLock<Vec<u8>>;

#[derive(Clone, Default)]
pub enum Value {
    #[default]
    Undefined,
    Nil,
    Bool(bool),
    Int(i64),
    Float(f64),
    BigNum(Heap<BigDecimal>),
    Str(Arc<str>),
    Bytes(Heap<BytesCell>),
    Array(Heap<ArrayCell>),
    Object(ObjectRef),
    Func(Arc<FuncValue>),
    Builtin(Arc<BuiltinFn>),
    Bound(Arc<BoundMethod>),
    Type(TypeRef),
    Host(Arc<HostValue>),
}

// Factories

impl Value {
    #[inline]
    pub fn str(s: &str) -> Self {
        Value::Str(Arc::from(s))
    }

    #[inline]
    pub fn string(s: String) -> Self {
        Value::Str(Arc::from(s))
    }

    pub fn bignum(v: BigDecimal) -> Self {
        Value::BigNum(Heap::new(v))
    }

    pub fn array(items: Vec<Value>) -> Self {
        Value::Array(Heap::new(RwLock::new(items)))
    }

    pub fn bytes(data: Vec<u8>) -> Self {
        Value::Bytes(Heap::new(RwLock::new(data)))
    }

    /// A plain object with the given members, in order.
    pub fn object<N: Into<Name>>(members: impl IntoIterator<Item = (N, Value)>) -> Self {
        let members = members.into_iter().map(|(k, v)| (k.into(), v)).collect();
        Value::Object(Object::with_members(
            Arc::clone(&builtin_types().object),
            members,
        ))
    }

    pub fn func(f: FuncValue) -> Self {
        Value::Func(Arc::new(f))
    }

    pub fn builtin(f: BuiltinFn) -> Self {
        Value::Builtin(Arc::new(f))
    }

    /// Shorthand for a host function value.
    pub fn native(
        name: &str,
        f: impl Fn(&mut crate::Context, &Value, &[Value]) -> crate::EvalResult + Send + Sync + 'static,
    ) -> Self {
        Value::builtin(BuiltinFn::new(name, f))
    }

    pub fn bound(receiver: Value, callee: Value) -> Self {
        Value::Bound(Arc::new(BoundMethod { receiver, callee }))
    }

    pub fn host<T: std::any::Any + Send + Sync>(name: &str, value: T) -> Self {
        Value::Host(Arc::new(HostValue::new(name, value)))
    }
}

// Inspection

impl Value {
    pub fn type_of(&self) -> TypeRef {
        let types = builtin_types();
        let ty = match self {
            Value::Undefined => &types.undefined,
            Value::Nil => &types.nil,
            Value::Bool(_) => &types.bool,
            Value::Int(_) => &types.int,
            Value::Float(_) => &types.float,
            Value::BigNum(_) => &types.bignum,
            Value::Str(_) => &types.str,
            Value::Bytes(_) => &types.bytes,
            Value::Array(_) => &types.array,
            Value::Object(obj) => return Arc::clone(obj.ty()),
            Value::Func(_) | Value::Builtin(_) | Value::Bound(_) => &types.func,
            Value::Type(_) => &types.type_,
            Value::Host(_) => &types.host_value,
        };
        Arc::clone(ty)
    }

    pub fn type_name(&self) -> Name {
        self.type_of().name().clone()
    }

    #[inline]
    pub fn is_undefined(&self) -> bool {
        matches!(self, Value::Undefined)
    }

    #[inline]
    pub fn is_nil_or_undefined(&self) -> bool {
        matches!(self, Value::Undefined | Value::Nil)
    }

    /// Kinds that can be invoked without consulting `__call__`.
    pub fn is_callable_kind(&self) -> bool {
        matches!(
            self,
            Value::Func(_) | Value::Builtin(_) | Value::Bound(_) | Value::Type(_)
        )
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            Value::Object(o) => Some(o),
            _ => None,
        }
    }

    pub fn as_type(&self) -> Option<&TypeRef> {
        match self {
            Value::Type(t) => Some(t),
            _ => None,
        }
    }

    /// Snapshot of an array's items.
    pub fn array_items(&self) -> Option<Vec<Value>> {
        match self {
            Value::Array(a) => Some(a.read().clone()),
            _ => None,
        }
    }

    /// Truthiness without the `__true__` hook.
    pub fn is_true(&self) -> bool {
        match self {
            Value::Undefined | Value::Nil => false,
            Value::Bool(b) => *b,
            Value::Int(i) => *i != 0,
            Value::Float(f) => *f != 0.0,
            Value::BigNum(b) => **b != BigDecimal::from(0),
            Value::Str(s) => !s.is_empty(),
            Value::Bytes(b) => !b.read().is_empty(),
            Value::Array(a) => !a.read().is_empty(),
            Value::Object(o) => !o.is_empty(),
            Value::Func(_)
            | Value::Builtin(_)
            | Value::Bound(_)
            | Value::Type(_)
            | Value::Host(_) => true,
        }
    }

    /// Length of sized values.
    pub fn len(&self) -> Option<usize> {
        match self {
            Value::Str(s) => Some(s.chars().count()),
            Value::Bytes(b) => Some(b.read().len()),
            Value::Array(a) => Some(a.read().len()),
            Value::Object(o) => Some(o.len()),
            _ => None,
        }
    }
}

pub(crate) fn format_float(f: f64) -> String {
    if f.is_nan() {
        "NaN".to_string()
    } else if f.is_infinite() {
        if f > 0.0 { "+Inf" } else { "-Inf" }.to_string()
    } else {
        f.to_string()
    }
}

pub(crate) fn format_bytes(data: &[u8]) -> String {
    let mut out = String::with_capacity(data.len() + 3);
    out.push_str("b\"");
    for &b in data {
        match b {
            b'"' => out.push_str("\\\""),
            b'\\' => out.push_str("\\\\"),
            0x20..=0x7e => out.push(char::from(b)),
            _ => out.push_str(&format!("\\x{b:02x}")),
        }
    }
    out.push('"');
    out
}

/// Hook-free rendering; `Context::stringify` adds `__str__`.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => f.write_str("undefined"),
            Value::Nil => f.write_str("nil"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(x) => f.write_str(&format_float(*x)),
            Value::BigNum(b) => write!(f, "{}", **b),
            Value::Str(s) => f.write_str(s),
            Value::Bytes(b) => f.write_str(&format_bytes(&b.read())),
            Value::Array(a) => {
                f.write_str("[")?;
                for (i, item) in a.read().iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Value::Object(o) => {
                f.write_str("{")?;
                for (i, (k, v)) in o.entries().iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{k}: {v}")?;
                }
                f.write_str("}")
            }
            Value::Func(func) => match func.name() {
                Some(name) => write!(f, "<func {name}>"),
                None => f.write_str("<anonymous function>"),
            },
            Value::Builtin(b) => write!(f, "<builtin {}>", b.name()),
            Value::Bound(b) => write!(f, "<bound method {}>", b.callee),
            Value::Type(t) => write!(f, "<type {}>", t.name()),
            Value::Host(h) => write!(f, "<host {}>", h.name()),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => f.write_str("Undefined"),
            Value::Nil => f.write_str("Nil"),
            Value::Bool(b) => write!(f, "Bool({b})"),
            Value::Int(i) => write!(f, "Int({i})"),
            Value::Float(x) => write!(f, "Float({x:?})"),
            Value::BigNum(b) => write!(f, "BigNum({})", **b),
            Value::Str(s) => write!(f, "Str({:?})", &**s),
            Value::Bytes(b) => write!(f, "Bytes({})", format_bytes(&b.read())),
            Value::Array(a) => f.debug_list().entries(a.read().iter()).finish(),
            Value::Object(o) => write!(f, "Object({:?})", **o),
            Value::Func(func) => write!(f, "{func:?}"),
            Value::Builtin(b) => write!(f, "{b:?}"),
            Value::Bound(b) => write!(f, "{b:?}"),
            Value::Type(t) => write!(f, "{t:?}"),
            Value::Host(h) => write!(f, "{h:?}"),
        }
    }
}

/// Structural equality for host code and tests. Script-level `==` goes
/// through `Context::values_equal`, which also honours `__eq__`.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Undefined, Value::Undefined) | (Value::Nil, Value::Nil) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::BigNum(a), Value::BigNum(b)) => **a == **b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Bytes(a), Value::Bytes(b)) => a.ptr_eq(b) || *a.read() == *b.read(),
            (Value::Array(a), Value::Array(b)) => a.ptr_eq(b) || *a.read() == *b.read(),
            (Value::Object(a), Value::Object(b)) => {
                a.same_instance(b) || (a.ty().id() == b.ty().id() && a.entries() == b.entries())
            }
            (Value::Func(a), Value::Func(b)) => Arc::ptr_eq(a, b),
            (Value::Builtin(a), Value::Builtin(b)) => Arc::ptr_eq(a, b),
            (Value::Bound(a), Value::Bound(b)) => {
                Arc::ptr_eq(a, b) || (a.receiver == b.receiver && a.callee == b.callee)
            }
            (Value::Type(a), Value::Type(b)) => a.id() == b.id(),
            (Value::Host(a), Value::Host(b)) => a.same_value(b),
            _ => false,
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::str(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::string(v)
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Value::array(v)
    }
}

#[cfg(test)]
mod tests;
