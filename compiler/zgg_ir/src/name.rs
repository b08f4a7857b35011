//! Identifier names.
//!
//! A `Name` is a reference-counted string. Cloning is a pointer copy, and
//! `Borrow<str>` lets hash maps keyed by `Name` be queried with `&str`.

use std::borrow::Borrow;
use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

/// An identifier: variable, member, label or type name.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Name(Arc<str>);

impl Name {
    /// Create a name from any string-like value.
    pub fn new(s: impl AsRef<str>) -> Self {
        Name(Arc::from(s.as_ref()))
    }

    /// The placeholder name `_`, which is never bound.
    pub fn is_placeholder(&self) -> bool {
        &*self.0 == "_"
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for Name {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl Deref for Name {
    type Target = str;

    #[inline]
    fn deref(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Name {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Name {
    fn from(s: &str) -> Self {
        Name::new(s)
    }
}

impl From<String> for Name {
    fn from(s: String) -> Self {
        Name(Arc::from(s))
    }
}

impl PartialEq<str> for Name {
    fn eq(&self, other: &str) -> bool {
        &*self.0 == other
    }
}

impl PartialEq<&str> for Name {
    fn eq(&self, other: &&str) -> bool {
        &*self.0 == *other
    }
}

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Name({:?})", &*self.0)
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn lookup_by_str() {
        let mut map = HashMap::new();
        map.insert(Name::new("answer"), 42);
        assert_eq!(map.get("answer"), Some(&42));
        assert_eq!(map.get("question"), None);
    }

    #[test]
    fn placeholder() {
        assert!(Name::new("_").is_placeholder());
        assert!(!Name::new("x").is_placeholder());
    }

    #[test]
    fn display_is_raw_text() {
        assert_eq!(Name::from("self").to_string(), "self");
        assert_eq!(format!("{:?}", Name::from("a")), "Name(\"a\")");
    }
}
