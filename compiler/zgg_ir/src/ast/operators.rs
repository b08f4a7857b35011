//! Binary, Comparison and Unary Operators
//!
//! Every overridable operator knows the member name the evaluator probes on
//! the left operand (`__add__`, `__lt__`, ...) before applying builtin
//! semantics.

/// Binary operators.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum BinaryOp {
    // Arithmetic
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Pow,

    // Bitwise
    BitAnd,
    BitOr,
    BitXor,
    Shl,
    Shr,

    // Logical (short-circuit unless overridden)
    And,
    Or,

    // Other
    Coalesce,
    Is,
}

impl BinaryOp {
    /// Returns the source-level symbol for this operator.
    ///
    /// Used in error messages to show the exact operator that failed.
    pub const fn as_symbol(self) -> &'static str {
        match self {
            // Arithmetic
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Mod => "%",
            Self::Pow => "**",
            // Bitwise
            Self::BitAnd => "&",
            Self::BitOr => "|",
            Self::BitXor => "^",
            Self::Shl => "<<",
            Self::Shr => ">>",
            // Logical
            Self::And => "&&",
            Self::Or => "||",
            // Other
            Self::Coalesce => "??",
            Self::Is => "is",
        }
    }

    /// Member consulted on the left operand to override this operator.
    ///
    /// `??` cannot be overridden.
    pub const fn hook_name(self) -> Option<&'static str> {
        match self {
            Self::Add => Some("__add__"),
            Self::Sub => Some("__sub__"),
            Self::Mul => Some("__mul__"),
            Self::Div => Some("__div__"),
            Self::Mod => Some("__mod__"),
            Self::Pow => Some("__pow__"),
            Self::BitAnd => Some("__bitAnd__"),
            Self::BitOr => Some("__bitOr__"),
            Self::BitXor => Some("__bitXor__"),
            Self::Shl => Some("__shl__"),
            Self::Shr => Some("__shr__"),
            Self::And => Some("__and__"),
            Self::Or => Some("__or__"),
            Self::Is => Some("__is__"),
            Self::Coalesce => None,
        }
    }

    /// Verb used in "Cannot <verb> between A and B" messages.
    pub const fn verb(self) -> &'static str {
        match self {
            Self::Add => "plus",
            Self::Sub => "minus",
            Self::Mul => "times",
            Self::Div => "div",
            Self::Mod => "mod",
            Self::Pow => "pow",
            Self::BitAnd => "bit-and",
            Self::BitOr => "bit-or",
            Self::BitXor => "bit-xor",
            Self::Shl => "shift-left",
            Self::Shr => "shift-right",
            Self::And => "and",
            Self::Or => "or",
            Self::Coalesce => "fallback",
            Self::Is => "type-test",
        }
    }

    /// `&&` and `||` evaluate their right operand lazily.
    pub const fn is_short_circuit(self) -> bool {
        matches!(self, Self::And | Self::Or)
    }
}

/// Comparison operators. They chain: `a < b <= c`.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl CompareOp {
    pub const fn as_symbol(self) -> &'static str {
        match self {
            Self::Eq => "==",
            Self::Ne => "!=",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
        }
    }

    pub const fn hook_name(self) -> &'static str {
        match self {
            Self::Eq => "__eq__",
            Self::Ne => "__ne__",
            Self::Lt => "__lt__",
            Self::Le => "__le__",
            Self::Gt => "__gt__",
            Self::Ge => "__ge__",
        }
    }
}

/// Unary operators.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum UnaryOp {
    /// Arithmetic negation: `-x`
    Neg,
    /// Logical not: `!x`
    Not,
    /// Bitwise not: `~x`
    BitNot,
}

impl UnaryOp {
    pub const fn as_symbol(self) -> &'static str {
        match self {
            Self::Neg => "-",
            Self::Not => "!",
            Self::BitNot => "~",
        }
    }
}
