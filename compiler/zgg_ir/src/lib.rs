//! zgg IR - Syntax tree for the zgg evaluator
//!
//! This crate contains the data structures the evaluator walks:
//! - Names for identifiers (cheaply clonable, shareable across threads)
//! - Positions for statement locations (file + line)
//! - AST nodes (Module, Block, Stmt, Expr, Lval, ...)
//! - Operator enums with their source symbols and override hook names
//! - A `build` module for assembling trees without a parser
//!
//! # Design Philosophy
//!
//! - **Owned trees**: nodes own their children (`Box`/`Vec`); function
//!   bodies sit behind `Arc` because closures outlive the tree walk and
//!   travel to spawned threads.
//! - **Well-formed input**: the evaluator trusts the tree shape; there is
//!   no error-recovery node.
//! - **Send + Sync**: every node is plain data so a module can be evaluated
//!   from several threads at once.

pub mod ast;
pub mod build;
mod name;
mod position;

pub use ast::{
    ArrayComprehension,
    ArrayItem,
    AssignShape,
    BinaryOp,
    Block,
    CallArg,
    CallExpr,
    CatchClause,
    ClassDef,
    ClassMember,
    CompareOp,
    Comprehension,
    Expr,
    ExtendDef,
    ForEachStmt,
    ForStmt,
    FuncDef,
    IfCase,
    IfStmt,
    IterSource,
    LocalAssign,
    Lval,
    Module,
    ObjectComprehension,
    ObjectItem,
    Stmt,
    StmtKind,
    SwitchCase,
    SwitchStmt,
    TryStmt,
    UnaryOp,
    UseCloser,
    UseExpr,
    ValueCondition,
    WhenCase,
    WhenExpr,
    WhenValueCase,
    WhenValueExpr,
    WhileStmt,
};
pub use name::Name;
pub use position::Position;
