//! Three-way comparison results.

use std::cmp::Ordering;

use bitflags::bitflags;

bitflags! {
    /// Outcome of comparing two values.
    ///
    /// Exactly one flag is set for comparable values; the empty set means
    /// the values are unequal and unordered. `<=` is `LESS | EQUAL`.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct CompareResult: u8 {
        const EQUAL = 1;
        const LESS = 1 << 1;
        const GREATER = 1 << 2;
    }
}

impl CompareResult {
    pub const NOT_EQUAL: CompareResult = CompareResult::empty();

    pub fn from_ordering(ord: Ordering) -> Self {
        match ord {
            Ordering::Less => Self::LESS,
            Ordering::Equal => Self::EQUAL,
            Ordering::Greater => Self::GREATER,
        }
    }

    /// `None` compares as not equal.
    pub fn from_partial(ord: Option<Ordering>) -> Self {
        ord.map_or(Self::NOT_EQUAL, Self::from_ordering)
    }

    pub fn to_ordering(self) -> Option<Ordering> {
        if self == Self::LESS {
            Some(Ordering::Less)
        } else if self == Self::EQUAL {
            Some(Ordering::Equal)
        } else if self == Self::GREATER {
            Some(Ordering::Greater)
        } else {
            None
        }
    }

    #[inline]
    pub fn is_equal(self) -> bool {
        self == Self::EQUAL
    }

    #[inline]
    pub fn is_less(self) -> bool {
        self == Self::LESS
    }

    #[inline]
    pub fn is_greater(self) -> bool {
        self == Self::GREATER
    }

    /// True when the result is one of the flags in `accepted`.
    #[inline]
    pub fn is_any_of(self, accepted: CompareResult) -> bool {
        !self.is_empty() && accepted.contains(self)
    }
}
