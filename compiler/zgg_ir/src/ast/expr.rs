//! Expression nodes.
//!
//! Every expression evaluates to exactly one value. Expressions carry no
//! position of their own; errors are reported at the enclosing statement.

use std::sync::Arc;

use super::operators::{BinaryOp, CompareOp, UnaryOp};
use super::stmt::Block;
use crate::Name;

/// Expression node.
#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    // Literals
    Int(i64),
    Float(f64),
    /// Decimal literal text, parsed at evaluation time.
    BigNum(Arc<str>),
    Str(Arc<str>),
    Bytes(Arc<[u8]>),
    Bool(bool),
    Nil,
    Undefined,

    /// String conversion used by interpolation: `"a{x}b"` joins `ToStr` parts.
    ToStr(Box<Expr>),
    /// `[a, b if cond, ...rest]`
    Array(Vec<ArrayItem>),
    /// `{k: v, ...other}`
    Object(Vec<ObjectItem>),
    /// Function literal; evaluates to a closure over the current scope.
    Func(Arc<FuncDef>),

    // Access
    Ident(Name),
    /// `owner.name`
    Member {
        owner: Box<Expr>,
        name: Name,
    },
    /// `owner[index]`; a string index resolves as a member name.
    Index {
        owner: Box<Expr>,
        index: Box<Expr>,
    },
    /// `container[begin:end]`
    Slice {
        container: Box<Expr>,
        begin: Option<Box<Expr>>,
        end: Option<Box<Expr>>,
    },

    // Calls
    Call(Box<CallExpr>),
    /// `new T(args)`
    New {
        class: Box<Expr>,
        args: Vec<CallArg>,
    },

    // Operators
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    /// `first op0 e0 op1 e1 ...`; stops at the first false link.
    Compare {
        first: Box<Expr>,
        rest: Vec<(CompareOp, Expr)>,
    },

    // Assignment
    /// `lval = value`
    Assign {
        target: Lval,
        value: Box<Expr>,
    },
    /// `a := v`, `[a, b, ...c] := v`, `{a, b} := v`
    LocalAssign(Box<LocalAssign>),
    /// `:= obj` binds every key of the object as a local.
    LocalNewAssign(Box<Expr>),
    /// `++x`, `x--`, ...
    IncDec {
        target: Lval,
        delta: i64,
        pre: bool,
    },

    // Comprehensions
    ArrayComprehension(Box<ArrayComprehension>),
    ObjectComprehension(Box<ObjectComprehension>),

    // Conditionals
    When(Box<WhenExpr>),
    WhenValue(Box<WhenValueExpr>),

    /// `use expr [as method | with func]`
    Use(Box<UseExpr>),
    /// Short import: `@path`
    Import(Arc<str>),
}

/// A function literal.
#[derive(Clone, Debug, PartialEq)]
pub struct FuncDef {
    pub name: Option<Name>,
    pub params: Vec<Name>,
    /// The last parameter collects the remaining arguments into an array.
    pub expand_last: bool,
    pub body: Block,
}

/// Array literal item.
#[derive(Clone, Debug, PartialEq)]
pub struct ArrayItem {
    pub value: Expr,
    /// Item is skipped when the condition is falsy.
    pub condition: Option<Expr>,
    /// `...value` splices an array.
    pub expand: bool,
}

/// Object literal item.
#[derive(Clone, Debug, PartialEq)]
pub enum ObjectItem {
    KeyValue { key: Expr, value: Expr },
    Expand(Expr),
}

/// An assignable target.
#[derive(Clone, Debug, PartialEq)]
pub enum Lval {
    Ident(Name),
    Member { owner: Box<Expr>, name: Name },
    Index { owner: Box<Expr>, index: Box<Expr> },
}

/// Call argument.
#[derive(Clone, Debug, PartialEq)]
pub enum CallArg {
    Positional(Expr),
    /// `name=value`
    Keyword(Name, Expr),
    /// `...array`
    Expand(Expr),
    /// Placeholder filled when the bound function is called: `f(_1, x)`.
    /// Negative indexes count from the end of the supplied arguments.
    Hole(i32),
}

/// `callee(args)`
#[derive(Clone, Debug, PartialEq)]
pub struct CallExpr {
    pub callee: Expr,
    pub args: Vec<CallArg>,
    /// `f?.()` yields Undefined instead of raising for a non-callable.
    pub optional: bool,
}

impl CallExpr {
    /// A call containing placeholders produces a partially applied function.
    pub fn is_bind(&self) -> bool {
        self.args.iter().any(|a| matches!(a, CallArg::Hole(_)))
    }
}

/// Destructuring shape of a local definition.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AssignShape {
    Single,
    /// Positional; with `expand_last` the last name takes the rest.
    DeArray { expand_last: bool },
    /// Each name takes the same-named member.
    DeObject,
}

#[derive(Clone, Debug, PartialEq)]
pub struct LocalAssign {
    pub names: Vec<Name>,
    pub shape: AssignShape,
    pub value: Expr,
}

/// Where a loop or comprehension draws its items from.
#[derive(Clone, Debug, PartialEq)]
pub enum IterSource {
    Iterable(Expr),
    Range {
        begin: Expr,
        end: Expr,
        inclusive: bool,
    },
}

/// Head shared by array and object comprehensions.
#[derive(Clone, Debug, PartialEq)]
pub struct Comprehension {
    pub value: Name,
    pub index: Option<Name>,
    pub source: IterSource,
    pub filter: Option<Expr>,
}

/// `[item for value, index in source if filter]`
#[derive(Clone, Debug, PartialEq)]
pub struct ArrayComprehension {
    pub head: Comprehension,
    pub item: Expr,
}

/// `{key: value for ...}`
#[derive(Clone, Debug, PartialEq)]
pub struct ObjectComprehension {
    pub head: Comprehension,
    pub key: Expr,
    pub value: Expr,
}

#[derive(Clone, Debug, PartialEq)]
pub struct WhenCase {
    pub condition: Expr,
    pub action: Expr,
}

/// `when { cond -> a, ..., else -> b }`
#[derive(Clone, Debug, PartialEq)]
pub struct WhenExpr {
    pub cases: Vec<WhenCase>,
    pub otherwise: Option<Expr>,
}

/// Match condition used by `when value` and `switch`.
#[derive(Clone, Debug, PartialEq)]
pub enum ValueCondition {
    /// Matches when the input equals any listed value.
    InList(Vec<Expr>),
    /// Matches when the input lies in the range; open ends are `None`.
    InRange {
        min: Option<Expr>,
        max: Option<Expr>,
        include_min: bool,
        include_max: bool,
    },
}

#[derive(Clone, Debug, PartialEq)]
pub struct WhenValueCase {
    pub condition: ValueCondition,
    pub result: Expr,
}

/// `when input { 1, 2 -> a, 3..5 -> b, else -> c }`
#[derive(Clone, Debug, PartialEq)]
pub struct WhenValueExpr {
    pub input: Expr,
    pub cases: Vec<WhenValueCase>,
    pub otherwise: Option<Expr>,
}

/// How a `use` expression releases its resource.
#[derive(Clone, Debug, PartialEq)]
pub enum UseCloser {
    /// `close` or `Close` member.
    Default,
    /// `use x as release`
    Method(Name),
    /// `use x with func(v) { ... }`
    Func(Arc<FuncDef>),
}

#[derive(Clone, Debug, PartialEq)]
pub struct UseExpr {
    pub value: Expr,
    pub closer: UseCloser,
}
