//! Opaque host values.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use zgg_ir::Name;

/// A host object carried through the value space untouched.
pub struct HostValue {
    name: Name,
    rust_type: &'static str,
    value: Arc<dyn Any + Send + Sync>,
}

impl HostValue {
    pub fn new<T: Any + Send + Sync>(name: impl Into<Name>, value: T) -> Self {
        HostValue {
            name: name.into(),
            rust_type: std::any::type_name::<T>(),
            value: Arc::new(value),
        }
    }

    /// Display name of the wrapped host type.
    pub fn name(&self) -> &Name {
        &self.name
    }

    /// Rust type of the payload, for diagnostics.
    pub fn rust_type(&self) -> &'static str {
        self.rust_type
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.value.downcast_ref::<T>()
    }

    pub fn same_value(&self, other: &HostValue) -> bool {
        Arc::ptr_eq(&self.value, &other.value)
    }
}

impl fmt::Debug for HostValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<host {}>", self.name)
    }
}
