//! Type descriptors.
//!
//! A `TypeDef` is created once (class definition, `ClassBuilder`, or the
//! builtin table) and shared by every instance. Member and static tables
//! are locked maps so `ClassBuilder` and static assignment can fill them
//! after the `Arc` exists; `extend` never touches them (see `Runtime`).

use std::fmt;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, OnceLock};

use parking_lot::RwLock;
use zgg_ir::Name;

use super::{BuiltinFn, OrderedMembers, Value};

pub type TypeRef = Arc<TypeDef>;

/// Fixed ids of the builtin types.
pub mod type_id {
    pub const UNDEFINED: i64 = 0;
    pub const NIL: i64 = 1;
    pub const INT: i64 = 2;
    pub const FLOAT: i64 = 3;
    pub const BIGNUM: i64 = 4;
    pub const BOOL: i64 = 5;
    pub const STR: i64 = 6;
    pub const BYTES: i64 = 7;
    pub const FUNC: i64 = 8;
    pub const ARRAY: i64 = 9;
    pub const OBJECT: i64 = 10;
    pub const TYPE: i64 = 12;
    pub const HOST_VALUE: i64 = 13;

    /// User types are numbered from here.
    pub const FIRST_USER: i64 = 100_000;
}

static NEXT_TYPE_ID: AtomicI64 = AtomicI64::new(type_id::FIRST_USER);

fn next_type_id() -> i64 {
    NEXT_TYPE_ID.fetch_add(1, Ordering::Relaxed) + 1
}

pub struct TypeDef {
    id: i64,
    name: Name,
    bases: Vec<TypeRef>,
    members: RwLock<OrderedMembers>,
    statics: RwLock<OrderedMembers>,
    super_type: OnceLock<TypeRef>,
}

impl TypeDef {
    pub fn new(id: i64, name: impl Into<Name>, bases: Vec<TypeRef>) -> TypeRef {
        let name = name.into();
        let mut statics = OrderedMembers::new();
        statics.set(Name::from("__name__"), Value::str(name.as_str()));
        Arc::new(TypeDef {
            id,
            name,
            bases,
            members: RwLock::new(OrderedMembers::new()),
            statics: RwLock::new(statics),
            super_type: OnceLock::new(),
        })
    }

    /// A user type with a fresh id. No bases means `Object`.
    pub fn new_class(name: impl Into<Name>, bases: Vec<TypeRef>) -> TypeRef {
        let bases = if bases.is_empty() {
            vec![Arc::clone(&builtin_types().object)]
        } else {
            bases
        };
        TypeDef::new(next_type_id(), name, bases)
    }

    #[inline]
    pub fn id(&self) -> i64 {
        self.id
    }

    #[inline]
    pub fn name(&self) -> &Name {
        &self.name
    }

    pub fn bases(&self) -> &[TypeRef] {
        &self.bases
    }

    /// Member declared on this type itself.
    pub fn own_member(&self, name: &str) -> Option<Value> {
        self.members.read().get(name).cloned()
    }

    /// Member lookup through the bases, depth-first, left to right.
    /// The first match wins, including across diamond-shaped hierarchies.
    pub fn find_member(&self, name: &str) -> Option<Value> {
        if let Some(v) = self.own_member(name) {
            return Some(v);
        }
        self.bases.iter().find_map(|b| b.find_member(name))
    }

    pub fn set_member(&self, name: impl Into<Name>, value: Value) {
        self.members.write().set(name.into(), value);
    }

    pub fn member_names(&self) -> Vec<Name> {
        self.members.read().keys().cloned().collect()
    }

    pub fn own_static(&self, name: &str) -> Option<Value> {
        self.statics.read().get(name).cloned()
    }

    pub fn set_static(&self, name: impl Into<Name>, value: Value) {
        self.statics.write().set(name.into(), value);
    }

    /// Whether `self` is `other` or derives from it.
    pub fn is_sub_of(&self, other: &TypeDef) -> bool {
        self.id == other.id || self.bases.iter().any(|b| b.is_sub_of(other))
    }

    /// Negative ids mark the lookup view used for `super`.
    pub fn is_super_view(&self) -> bool {
        self.id < 0
    }

    /// The type `super` resolves through inside this type's methods.
    ///
    /// It shares this type's bases and carries a single `__init__` that
    /// runs every base initialiser in declaration order.
    pub fn super_type(self: &Arc<Self>) -> TypeRef {
        if self.is_super_view() {
            return Arc::clone(self);
        }
        Arc::clone(self.super_type.get_or_init(|| {
            let bases = self.bases.clone();
            let init_bases = bases.clone();
            let init = BuiltinFn::new(format!("{}.super.__init__", self.name), move |ctx, this, args| {
                if let Value::Object(obj) = this {
                    for base in &init_bases {
                        if let Some(init) = base.find_member("__init__") {
                            if init.is_callable_kind() {
                                let view = obj.view_as(Arc::clone(base));
                                ctx.invoke(&init, Value::Object(view), args.to_vec())?;
                            }
                        }
                    }
                }
                Ok(Value::Undefined)
            });
            let sup = TypeDef::new(-self.id, format!("{}.super", self.name), bases);
            sup.set_member("__init__", Value::builtin(init));
            sup
        }))
    }
}

impl fmt::Debug for TypeDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<type {}#{}>", self.name, self.id)
    }
}

/// The builtin type table, shared by every runtime in the process.
pub struct BuiltinTypes {
    pub undefined: TypeRef,
    pub nil: TypeRef,
    pub int: TypeRef,
    pub float: TypeRef,
    pub bignum: TypeRef,
    pub bool: TypeRef,
    pub str: TypeRef,
    pub bytes: TypeRef,
    pub func: TypeRef,
    pub array: TypeRef,
    pub object: TypeRef,
    pub type_: TypeRef,
    pub host_value: TypeRef,
}

impl BuiltinTypes {
    fn create() -> Self {
        let types = BuiltinTypes {
            undefined: TypeDef::new(type_id::UNDEFINED, "Undefined", Vec::new()),
            nil: TypeDef::new(type_id::NIL, "Nil", Vec::new()),
            int: TypeDef::new(type_id::INT, "Int", Vec::new()),
            float: TypeDef::new(type_id::FLOAT, "Float", Vec::new()),
            bignum: TypeDef::new(type_id::BIGNUM, "BigNum", Vec::new()),
            bool: TypeDef::new(type_id::BOOL, "Bool", Vec::new()),
            str: TypeDef::new(type_id::STR, "Str", Vec::new()),
            bytes: TypeDef::new(type_id::BYTES, "Bytes", Vec::new()),
            func: TypeDef::new(type_id::FUNC, "Func", Vec::new()),
            array: TypeDef::new(type_id::ARRAY, "Array", Vec::new()),
            object: TypeDef::new(type_id::OBJECT, "Object", Vec::new()),
            type_: TypeDef::new(type_id::TYPE, "Type", Vec::new()),
            host_value: TypeDef::new(type_id::HOST_VALUE, "HostValue", Vec::new()),
        };
        crate::builtins::methods::install(&types);
        types
    }

    pub fn all(&self) -> [&TypeRef; 13] {
        [
            &self.undefined,
            &self.nil,
            &self.int,
            &self.float,
            &self.bignum,
            &self.bool,
            &self.str,
            &self.bytes,
            &self.func,
            &self.array,
            &self.object,
            &self.type_,
            &self.host_value,
        ]
    }
}

pub fn builtin_types() -> &'static BuiltinTypes {
    static TYPES: OnceLock<BuiltinTypes> = OnceLock::new();
    TYPES.get_or_init(BuiltinTypes::create)
}
