//! Statement nodes.

use super::expr::{CallExpr, Expr, IterSource, ValueCondition};
use crate::{Name, Position};

/// A braced statement list. Entering a block opens a scope frame.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct Block {
    pub pos: Position,
    pub stmts: Vec<Stmt>,
}

/// A statement and where it came from.
#[derive(Clone, Debug, PartialEq)]
pub struct Stmt {
    pub pos: Position,
    pub kind: StmtKind,
}

#[derive(Clone, Debug, PartialEq)]
pub enum StmtKind {
    Expr(Expr),
    Block(Block),
    If(IfStmt),
    For(ForStmt),
    ForEach(ForEachStmt),
    While(WhileStmt),
    DoWhile(WhileStmt),
    Break(Option<Name>),
    Continue(Option<Name>),
    Return(Option<Expr>),
    Switch(SwitchStmt),
    /// `export name = value`; only valid at module top.
    Export {
        name: Name,
        value: Expr,
    },
    Class(ClassDef),
    Extend(ExtendDef),
    /// Runs when the enclosing function returns.
    Defer(CallExpr),
    /// Runs when the enclosing block exits.
    BlockDefer(CallExpr),
    Try(TryStmt),
    /// `stmt fallback { ... }`; `__err__` holds the exception.
    Fallback {
        stmt: Box<Stmt>,
        fallback: Block,
    },
    Assert {
        condition: Expr,
        message: Option<Expr>,
    },
    /// Raises a user exception carrying the value.
    Throw(Expr),
}

/// One `if`/`elif` arm. `init` runs in a frame that stays open until the
/// whole statement finishes, so later arms see its bindings.
#[derive(Clone, Debug, PartialEq)]
pub struct IfCase {
    pub init: Option<Expr>,
    pub condition: Expr,
    pub body: Block,
}

#[derive(Clone, Debug, PartialEq)]
pub struct IfStmt {
    pub cases: Vec<IfCase>,
    pub else_body: Option<Block>,
}

/// `for init; check; next { body }`
#[derive(Clone, Debug, PartialEq)]
pub struct ForStmt {
    pub label: Option<Name>,
    pub init: Option<Expr>,
    pub check: Option<Expr>,
    pub next: Option<Expr>,
    pub body: Block,
}

/// `for index, value in source { body }`
#[derive(Clone, Debug, PartialEq)]
pub struct ForEachStmt {
    pub label: Option<Name>,
    pub index: Option<Name>,
    pub value: Name,
    pub source: IterSource,
    pub body: Block,
}

/// Shared by `while` and `do ... while`.
#[derive(Clone, Debug, PartialEq)]
pub struct WhileStmt {
    pub label: Option<Name>,
    pub check: Expr,
    pub body: Block,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SwitchCase {
    pub condition: ValueCondition,
    pub body: Block,
    /// Keep matching later cases (and the default) after this one runs.
    pub fallthrough: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SwitchStmt {
    pub value: Expr,
    pub cases: Vec<SwitchCase>,
    pub default: Option<Block>,
}

/// A class member or static: `key: value`. Keys are expressions so they
/// may be computed.
#[derive(Clone, Debug, PartialEq)]
pub struct ClassMember {
    pub key: Expr,
    pub value: Expr,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ClassDef {
    pub name: Name,
    pub exported: bool,
    pub bases: Vec<Expr>,
    pub members: Vec<ClassMember>,
    pub statics: Vec<ClassMember>,
}

/// `extend T { name: value, ... }`
#[derive(Clone, Debug, PartialEq)]
pub struct ExtendDef {
    pub exported: bool,
    pub target: Expr,
    pub items: Vec<ClassMember>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct CatchClause {
    pub name: Name,
    pub body: Block,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TryStmt {
    pub body: Block,
    pub catch: Option<CatchClause>,
    pub finally: Option<Block>,
}
