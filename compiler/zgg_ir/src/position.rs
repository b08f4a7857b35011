//! Source positions.
//!
//! Statements carry a file name and line number. The evaluator records the
//! position of the statement it is about to run so raised errors can report
//! where they happened.

use std::fmt;

use crate::Name;

/// Location of a statement in its source file.
#[derive(Clone, PartialEq, Eq, Hash, Default)]
pub struct Position {
    pub file: Option<Name>,
    pub line: u32,
}

impl Position {
    /// Position for generated code or trees built without a parser.
    pub const UNKNOWN: Position = Position {
        file: None,
        line: 0,
    };

    pub fn new(file: impl Into<Name>, line: u32) -> Self {
        Position {
            file: Some(file.into()),
            line,
        }
    }

    /// File name, or `<unknown>` when the tree had none.
    pub fn file_name(&self) -> &str {
        self.file.as_ref().map_or("<unknown>", Name::as_str)
    }

    pub fn is_unknown(&self) -> bool {
        self.file.is_none() && self.line == 0
    }
}

impl fmt::Debug for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file_name(), self.line)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file_name(), self.line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display() {
        assert_eq!(Position::new("main.zgg", 12).to_string(), "main.zgg:12");
        assert_eq!(Position::UNKNOWN.to_string(), "<unknown>:0");
    }

    #[test]
    fn unknown() {
        assert!(Position::UNKNOWN.is_unknown());
        assert!(Position::default().is_unknown());
        assert!(!Position::new("a", 0).is_unknown());
    }
}
