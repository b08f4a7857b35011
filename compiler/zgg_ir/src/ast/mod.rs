//! AST node set.
//!
//! - `Module` is the evaluation root: a top-level `Block` whose `export`
//!   statements fill the module's export object.
//! - `Stmt` carries a `Position`; `Expr` does not.
//! - Function bodies are `Arc<FuncDef>` so closures can share them.

mod expr;
mod operators;
mod stmt;

pub use expr::{
    ArrayComprehension, ArrayItem, AssignShape, CallArg, CallExpr, Comprehension, Expr, FuncDef,
    IterSource, LocalAssign, Lval, ObjectComprehension, ObjectItem, UseCloser, UseExpr,
    ValueCondition, WhenCase, WhenExpr, WhenValueCase, WhenValueExpr,
};
pub use operators::{BinaryOp, CompareOp, UnaryOp};
pub use stmt::{
    Block, CatchClause, ClassDef, ClassMember, ExtendDef, ForEachStmt, ForStmt, IfCase, IfStmt,
    Stmt, StmtKind, SwitchCase, SwitchStmt, TryStmt, WhileStmt,
};

/// Root of an evaluation.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct Module {
    pub block: Block,
}

impl Module {
    pub fn new(block: Block) -> Self {
        Module { block }
    }
}

impl Lval {
    /// Read-side expression for this target (used by `++`/`--`).
    pub fn to_expr(&self) -> Expr {
        match self {
            Lval::Ident(name) => Expr::Ident(name.clone()),
            Lval::Member { owner, name } => Expr::Member {
                owner: owner.clone(),
                name: name.clone(),
            },
            Lval::Index { owner, index } => Expr::Index {
                owner: owner.clone(),
                index: index.clone(),
            },
        }
    }
}
