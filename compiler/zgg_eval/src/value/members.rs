//! Insertion-ordered member tables.
//!
//! Objects, type member tables and type statics all keep their keys in
//! the order they were first defined. Redefining a key keeps its slot;
//! writing `Undefined` removes it.

use rustc_hash::FxHashMap;
use zgg_ir::Name;

use super::Value;

#[derive(Clone, Default)]
pub struct OrderedMembers {
    entries: Vec<(Name, Value)>,
    index: FxHashMap<Name, usize>,
}

impl OrderedMembers {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.index.get(name).map(|&i| &self.entries[i].1)
    }

    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Insert or overwrite. `Undefined` deletes the key instead.
    pub fn set(&mut self, name: Name, value: Value) {
        if value.is_undefined() {
            self.remove(&name);
            return;
        }
        if let Some(&i) = self.index.get(&name) {
            self.entries[i].1 = value;
        } else {
            self.index.insert(name.clone(), self.entries.len());
            self.entries.push((name, value));
        }
    }

    pub fn remove(&mut self, name: &str) -> Option<Value> {
        let i = self.index.remove(name)?;
        let (_, value) = self.entries.remove(i);
        for slot in self.index.values_mut() {
            if *slot > i {
                *slot -= 1;
            }
        }
        Some(value)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Name, &Value)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &Name> {
        self.entries.iter().map(|(k, _)| k)
    }
}

impl FromIterator<(Name, Value)> for OrderedMembers {
    fn from_iter<I: IntoIterator<Item = (Name, Value)>>(iter: I) -> Self {
        let mut members = OrderedMembers::new();
        for (name, value) in iter {
            members.set(name, value);
        }
        members
    }
}
