//! Lexical scopes.
//!
//! A scope is a shared, lockable map of bindings with a parent link.
//! Closures hold the scope they were created in, not a copy, so a write to
//! a captured variable is seen by every closure sharing that scope. The
//! chain ends at the runtime's global scope, which every context and
//! spawned thread shares.

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use zgg_ir::Name;

use crate::value::Value;

/// Error returned by `SharedScope::define` and `SharedScope::assign`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BindError {
    /// `:=` on a name already bound in the same scope.
    Redefined,
    /// Assignment to a name bound nowhere on the chain.
    Undefined,
}

/// A single scope containing variable bindings.
#[derive(Default)]
pub struct Scope {
    bindings: FxHashMap<Name, Value>,
    parent: Option<SharedScope>,
}

impl Scope {
    pub fn with_parent(parent: SharedScope) -> Self {
        Scope {
            bindings: FxHashMap::default(),
            parent: Some(parent),
        }
    }

    #[inline]
    pub fn get_own(&self, name: &str) -> Option<&Value> {
        self.bindings.get(name)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

/// A thread-safe handle to a scope.
///
/// All scope allocations go through `new_root` and `child`. The wrapper has
/// the layout of the `Arc` it wraps.
#[repr(transparent)]
pub struct SharedScope(Arc<RwLock<Scope>>);

impl SharedScope {
    /// A scope with no parent.
    pub fn new_root() -> Self {
        SharedScope(Arc::new(RwLock::new(Scope::default())))
    }

    /// A new scope nested in `parent`.
    pub fn child(parent: &SharedScope) -> Self {
        SharedScope(Arc::new(RwLock::new(Scope::with_parent(parent.clone()))))
    }

    pub fn parent(&self) -> Option<SharedScope> {
        self.0.read().parent.clone()
    }

    /// Resolve `name` walking outward. `_` never resolves.
    pub fn lookup(&self, name: &str) -> Option<Value> {
        if name == "_" {
            return None;
        }
        let mut current = self.clone();
        loop {
            let next = {
                let scope = current.0.read();
                if let Some(v) = scope.bindings.get(name) {
                    return Some(v.clone());
                }
                scope.parent.clone()
            };
            current = next?;
        }
    }

    /// Bind `name` in this scope; fails if it is already bound here.
    pub fn define(&self, name: Name, value: Value) -> Result<(), BindError> {
        if name.is_placeholder() {
            return Ok(());
        }
        let mut scope = self.0.write();
        if scope.bindings.contains_key(&name) {
            return Err(BindError::Redefined);
        }
        scope.bindings.insert(name, value);
        Ok(())
    }

    /// Bind `name` in this scope, replacing an existing binding.
    pub fn force_define(&self, name: Name, value: Value) {
        if name.is_placeholder() {
            return;
        }
        self.0.write().bindings.insert(name, value);
    }

    /// Overwrite the nearest binding of `name`.
    pub fn assign(&self, name: &str, value: Value) -> Result<(), BindError> {
        if name == "_" {
            return Ok(());
        }
        let mut current = self.clone();
        loop {
            let next = {
                let mut scope = current.0.write();
                if let Some(slot) = scope.bindings.get_mut(name) {
                    *slot = value;
                    return Ok(());
                }
                scope.parent.clone()
            };
            match next {
                Some(parent) => current = parent,
                None => return Err(BindError::Undefined),
            }
        }
    }

    /// Read access to this scope's own bindings.
    pub fn read(&self) -> parking_lot::RwLockReadGuard<'_, Scope> {
        self.0.read()
    }

    #[inline]
    pub fn ptr_eq(&self, other: &SharedScope) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Clone for SharedScope {
    #[inline]
    fn clone(&self) -> Self {
        SharedScope(Arc::clone(&self.0))
    }
}

impl fmt::Debug for SharedScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let scope = self.0.read();
        let mut names: Vec<&str> = scope.bindings.keys().map(Name::as_str).collect();
        names.sort_unstable();
        f.debug_struct("SharedScope")
            .field("bindings", &names)
            .field("has_parent", &scope.parent.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests;
