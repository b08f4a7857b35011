//! Object instances.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use zgg_ir::Name;

use super::{builtin_types, OrderedMembers, TypeRef, Value};

pub type ObjectRef = Arc<Object>;

/// Host payload stored in an instance of a native-backed class.
pub type Reserved = Arc<dyn Any + Send + Sync>;

/// An object: its type, an ordered member table and an optional host payload.
///
/// A `super` view shares the member table and payload with the object it
/// was made from but resolves type members through a different type;
/// `this` then points back at the real instance.
pub struct Object {
    ty: TypeRef,
    members: Arc<RwLock<OrderedMembers>>,
    reserved: Arc<RwLock<Option<Reserved>>>,
    this: Option<ObjectRef>,
}

impl Object {
    pub fn new(ty: TypeRef) -> ObjectRef {
        Self::with_members(ty, OrderedMembers::new())
    }

    /// A plain `Object`-typed instance.
    pub fn plain() -> ObjectRef {
        Self::new(Arc::clone(&builtin_types().object))
    }

    pub fn with_members(ty: TypeRef, members: OrderedMembers) -> ObjectRef {
        Arc::new(Object {
            ty,
            members: Arc::new(RwLock::new(members)),
            reserved: Arc::new(RwLock::new(None)),
            this: None,
        })
    }

    #[inline]
    pub fn ty(&self) -> &TypeRef {
        &self.ty
    }

    pub fn get(&self, name: &str) -> Option<Value> {
        self.members.read().get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.members.read().contains(name)
    }

    /// Own-member write. `Undefined` removes the member.
    pub fn set(&self, name: impl Into<Name>, value: Value) {
        self.members.write().set(name.into(), value);
    }

    pub fn len(&self) -> usize {
        self.members.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.read().is_empty()
    }

    pub fn keys(&self) -> Vec<Name> {
        self.members.read().keys().cloned().collect()
    }

    /// Snapshot of the members in definition order.
    pub fn entries(&self) -> Vec<(Name, Value)> {
        self.members
            .read()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    pub fn reserved(&self) -> Option<Reserved> {
        self.reserved.read().clone()
    }

    pub fn set_reserved(&self, payload: Reserved) {
        *self.reserved.write() = Some(payload);
    }

    /// Downcast the host payload.
    pub fn reserved_as<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        self.reserved().and_then(|r| r.downcast::<T>().ok())
    }

    /// The real instance behind a `super` view (or the object itself).
    pub fn real_this(self: &Arc<Self>) -> ObjectRef {
        self.this.clone().unwrap_or_else(|| Arc::clone(self))
    }

    /// A view of this object resolving type members through `ty`.
    pub fn view_as(self: &Arc<Self>, ty: TypeRef) -> ObjectRef {
        Arc::new(Object {
            ty,
            members: Arc::clone(&self.members),
            reserved: Arc::clone(&self.reserved),
            this: Some(self.real_this()),
        })
    }

    /// The `super` view for a method defined on `owner`.
    pub fn super_view(self: &Arc<Self>, owner: &TypeRef) -> ObjectRef {
        self.view_as(owner.super_type())
    }

    /// Whether both handles see the same member table.
    pub fn same_instance(&self, other: &Object) -> bool {
        Arc::ptr_eq(&self.members, &other.members)
    }
}

impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let members = self.members.read();
        let mut map = f.debug_map();
        for (k, v) in members.iter() {
            map.entry(&k.as_str(), v);
        }
        map.finish()
    }
}
