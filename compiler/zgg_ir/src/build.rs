//! Tree construction helpers.
//!
//! Hosts without a parser (and the evaluator's tests) assemble trees with
//! these functions instead of spelling out nested struct literals. Every
//! statement built here has an unknown position; use [`at`] to attach one.

use std::sync::Arc;

use crate::ast::{
    ArrayComprehension, ArrayItem, AssignShape, BinaryOp, Block, CallArg, CallExpr, CatchClause,
    ClassDef, ClassMember, CompareOp, Comprehension, Expr, ExtendDef, ForEachStmt, ForStmt,
    FuncDef, IfCase, IfStmt, IterSource, LocalAssign, Lval, Module, ObjectComprehension,
    ObjectItem, Stmt, StmtKind, TryStmt, UnaryOp, UseCloser, UseExpr, WhileStmt,
};
use crate::{Name, Position};

// Structure

pub fn module(stmts: Vec<Stmt>) -> Module {
    Module::new(block(stmts))
}

pub fn block(stmts: Vec<Stmt>) -> Block {
    Block {
        pos: Position::UNKNOWN,
        stmts,
    }
}

pub fn stmt(kind: StmtKind) -> Stmt {
    Stmt {
        pos: Position::UNKNOWN,
        kind,
    }
}

/// Attach a source position to a statement.
pub fn at(file: &str, line: u32, mut s: Stmt) -> Stmt {
    s.pos = Position::new(file, line);
    s
}

pub fn expr_stmt(e: Expr) -> Stmt {
    stmt(StmtKind::Expr(e))
}

pub fn block_stmt(stmts: Vec<Stmt>) -> Stmt {
    stmt(StmtKind::Block(block(stmts)))
}

// Literals

pub fn int(v: i64) -> Expr {
    Expr::Int(v)
}

pub fn float(v: f64) -> Expr {
    Expr::Float(v)
}

pub fn bignum(literal: &str) -> Expr {
    Expr::BigNum(Arc::from(literal))
}

pub fn str(v: &str) -> Expr {
    Expr::Str(Arc::from(v))
}

pub fn bytes(v: &[u8]) -> Expr {
    Expr::Bytes(Arc::from(v))
}

pub fn bool(v: bool) -> Expr {
    Expr::Bool(v)
}

pub fn nil() -> Expr {
    Expr::Nil
}

pub fn undefined() -> Expr {
    Expr::Undefined
}

/// Interpolated string: each part is converted with `ToStr` and joined.
pub fn interpolate(parts: Vec<Expr>) -> Expr {
    parts
        .into_iter()
        .map(|p| Expr::ToStr(Box::new(p)))
        .reduce(|acc, p| binary(BinaryOp::Add, acc, p))
        .unwrap_or_else(|| str(""))
}

pub fn array(items: Vec<Expr>) -> Expr {
    Expr::Array(
        items
            .into_iter()
            .map(|value| ArrayItem {
                value,
                condition: None,
                expand: false,
            })
            .collect(),
    )
}

pub fn array_items(items: Vec<ArrayItem>) -> Expr {
    Expr::Array(items)
}

pub fn spread(value: Expr) -> ArrayItem {
    ArrayItem {
        value,
        condition: None,
        expand: true,
    }
}

pub fn object(pairs: Vec<(&str, Expr)>) -> Expr {
    Expr::Object(
        pairs
            .into_iter()
            .map(|(k, value)| ObjectItem::KeyValue { key: str(k), value })
            .collect(),
    )
}

pub fn object_items(items: Vec<ObjectItem>) -> Expr {
    Expr::Object(items)
}

// Functions

pub fn func_def(name: Option<&str>, params: &[&str], body: Vec<Stmt>) -> Arc<FuncDef> {
    Arc::new(FuncDef {
        name: name.map(Name::from),
        params: params.iter().copied().map(Name::from).collect(),
        expand_last: false,
        body: block(body),
    })
}

/// Anonymous function literal.
pub fn func(params: &[&str], body: Vec<Stmt>) -> Expr {
    Expr::Func(func_def(None, params, body))
}

pub fn named_func(name: &str, params: &[&str], body: Vec<Stmt>) -> Expr {
    Expr::Func(func_def(Some(name), params, body))
}

/// Function whose last parameter collects the remaining arguments.
pub fn variadic_func(params: &[&str], body: Vec<Stmt>) -> Expr {
    Expr::Func(Arc::new(FuncDef {
        name: None,
        params: params.iter().copied().map(Name::from).collect(),
        expand_last: !params.is_empty(),
        body: block(body),
    }))
}

/// `fn name(params) { body }` as a statement: `name := func`.
pub fn func_decl(name: &str, params: &[&str], body: Vec<Stmt>) -> Stmt {
    expr_stmt(local(name, named_func(name, params, body)))
}

pub fn ret(value: Expr) -> Stmt {
    stmt(StmtKind::Return(Some(value)))
}

pub fn ret_none() -> Stmt {
    stmt(StmtKind::Return(None))
}

// Access

pub fn ident(name: &str) -> Expr {
    Expr::Ident(Name::from(name))
}

pub fn member(owner: Expr, name: &str) -> Expr {
    Expr::Member {
        owner: Box::new(owner),
        name: Name::from(name),
    }
}

pub fn index(owner: Expr, idx: Expr) -> Expr {
    Expr::Index {
        owner: Box::new(owner),
        index: Box::new(idx),
    }
}

pub fn slice(container: Expr, begin: Option<Expr>, end: Option<Expr>) -> Expr {
    Expr::Slice {
        container: Box::new(container),
        begin: begin.map(Box::new),
        end: end.map(Box::new),
    }
}

// Calls

pub fn call_expr(callee: Expr, args: Vec<CallArg>) -> CallExpr {
    CallExpr {
        callee,
        args,
        optional: false,
    }
}

pub fn call(callee: Expr, args: Vec<Expr>) -> Expr {
    Expr::Call(Box::new(call_expr(
        callee,
        args.into_iter().map(CallArg::Positional).collect(),
    )))
}

pub fn call_with(callee: Expr, args: Vec<CallArg>) -> Expr {
    Expr::Call(Box::new(call_expr(callee, args)))
}

pub fn optional_call(callee: Expr, args: Vec<Expr>) -> Expr {
    let mut c = call_expr(callee, args.into_iter().map(CallArg::Positional).collect());
    c.optional = true;
    Expr::Call(Box::new(c))
}

pub fn method_call(owner: Expr, name: &str, args: Vec<Expr>) -> Expr {
    call(member(owner, name), args)
}

pub fn new(class: Expr, args: Vec<Expr>) -> Expr {
    Expr::New {
        class: Box::new(class),
        args: args.into_iter().map(CallArg::Positional).collect(),
    }
}

// Operators

pub fn binary(op: BinaryOp, left: Expr, right: Expr) -> Expr {
    Expr::Binary {
        op,
        left: Box::new(left),
        right: Box::new(right),
    }
}

pub fn add(left: Expr, right: Expr) -> Expr {
    binary(BinaryOp::Add, left, right)
}

pub fn sub(left: Expr, right: Expr) -> Expr {
    binary(BinaryOp::Sub, left, right)
}

pub fn mul(left: Expr, right: Expr) -> Expr {
    binary(BinaryOp::Mul, left, right)
}

pub fn unary(op: UnaryOp, operand: Expr) -> Expr {
    Expr::Unary {
        op,
        operand: Box::new(operand),
    }
}

pub fn not(operand: Expr) -> Expr {
    unary(UnaryOp::Not, operand)
}

pub fn compare(left: Expr, op: CompareOp, right: Expr) -> Expr {
    Expr::Compare {
        first: Box::new(left),
        rest: vec![(op, right)],
    }
}

pub fn compare_chain(first: Expr, rest: Vec<(CompareOp, Expr)>) -> Expr {
    Expr::Compare {
        first: Box::new(first),
        rest,
    }
}

// Assignment

/// `name := value`
pub fn local(name: &str, value: Expr) -> Expr {
    Expr::LocalAssign(Box::new(LocalAssign {
        names: vec![Name::from(name)],
        shape: AssignShape::Single,
        value,
    }))
}

/// `[a, b, ...rest] := value`
pub fn local_array(names: &[&str], expand_last: bool, value: Expr) -> Expr {
    Expr::LocalAssign(Box::new(LocalAssign {
        names: names.iter().copied().map(Name::from).collect(),
        shape: AssignShape::DeArray { expand_last },
        value,
    }))
}

/// `{a, b} := value`
pub fn local_object(names: &[&str], value: Expr) -> Expr {
    Expr::LocalAssign(Box::new(LocalAssign {
        names: names.iter().copied().map(Name::from).collect(),
        shape: AssignShape::DeObject,
        value,
    }))
}

pub fn let_(name: &str, value: Expr) -> Stmt {
    expr_stmt(local(name, value))
}

pub fn assign(target: Lval, value: Expr) -> Expr {
    Expr::Assign {
        target,
        value: Box::new(value),
    }
}

pub fn set(name: &str, value: Expr) -> Stmt {
    expr_stmt(assign(Lval::Ident(Name::from(name)), value))
}

pub fn set_member(owner: Expr, name: &str, value: Expr) -> Stmt {
    expr_stmt(assign(
        Lval::Member {
            owner: Box::new(owner),
            name: Name::from(name),
        },
        value,
    ))
}

pub fn set_index(owner: Expr, idx: Expr, value: Expr) -> Stmt {
    expr_stmt(assign(
        Lval::Index {
            owner: Box::new(owner),
            index: Box::new(idx),
        },
        value,
    ))
}

/// `x++` / `x--` / `++x` / `--x` on an identifier.
pub fn inc_dec(name: &str, delta: i64, pre: bool) -> Expr {
    Expr::IncDec {
        target: Lval::Ident(Name::from(name)),
        delta,
        pre,
    }
}

// Comprehensions

pub fn iterable(source: Expr) -> IterSource {
    IterSource::Iterable(source)
}

pub fn range(begin: Expr, end: Expr, inclusive: bool) -> IterSource {
    IterSource::Range {
        begin,
        end,
        inclusive,
    }
}

pub fn comprehension(value: &str, source: IterSource, filter: Option<Expr>) -> Comprehension {
    Comprehension {
        value: Name::from(value),
        index: None,
        source,
        filter,
    }
}

pub fn array_comp(item: Expr, head: Comprehension) -> Expr {
    Expr::ArrayComprehension(Box::new(ArrayComprehension { head, item }))
}

pub fn object_comp(key: Expr, value: Expr, head: Comprehension) -> Expr {
    Expr::ObjectComprehension(Box::new(ObjectComprehension { head, key, value }))
}

// Control flow

pub fn if_(cond: Expr, then: Vec<Stmt>, otherwise: Option<Vec<Stmt>>) -> Stmt {
    stmt(StmtKind::If(IfStmt {
        cases: vec![IfCase {
            init: None,
            condition: cond,
            body: block(then),
        }],
        else_body: otherwise.map(block),
    }))
}

pub fn for_(
    label: Option<&str>,
    init: Option<Expr>,
    check: Option<Expr>,
    next: Option<Expr>,
    body: Vec<Stmt>,
) -> Stmt {
    stmt(StmtKind::For(ForStmt {
        label: label.map(Name::from),
        init,
        check,
        next,
        body: block(body),
    }))
}

pub fn for_each(
    label: Option<&str>,
    index: Option<&str>,
    value: &str,
    source: IterSource,
    body: Vec<Stmt>,
) -> Stmt {
    stmt(StmtKind::ForEach(ForEachStmt {
        label: label.map(Name::from),
        index: index.map(Name::from),
        value: Name::from(value),
        source,
        body: block(body),
    }))
}

pub fn while_(label: Option<&str>, check: Expr, body: Vec<Stmt>) -> Stmt {
    stmt(StmtKind::While(WhileStmt {
        label: label.map(Name::from),
        check,
        body: block(body),
    }))
}

pub fn do_while(label: Option<&str>, check: Expr, body: Vec<Stmt>) -> Stmt {
    stmt(StmtKind::DoWhile(WhileStmt {
        label: label.map(Name::from),
        check,
        body: block(body),
    }))
}

pub fn break_(label: Option<&str>) -> Stmt {
    stmt(StmtKind::Break(label.map(Name::from)))
}

pub fn continue_(label: Option<&str>) -> Stmt {
    stmt(StmtKind::Continue(label.map(Name::from)))
}

pub fn try_(body: Vec<Stmt>, catch: Option<(&str, Vec<Stmt>)>, finally: Option<Vec<Stmt>>) -> Stmt {
    stmt(StmtKind::Try(TryStmt {
        body: block(body),
        catch: catch.map(|(name, stmts)| CatchClause {
            name: Name::from(name),
            body: block(stmts),
        }),
        finally: finally.map(block),
    }))
}

pub fn throw(value: Expr) -> Stmt {
    stmt(StmtKind::Throw(value))
}

pub fn defer(callee: Expr, args: Vec<Expr>) -> Stmt {
    stmt(StmtKind::Defer(call_expr(
        callee,
        args.into_iter().map(CallArg::Positional).collect(),
    )))
}

pub fn block_defer(callee: Expr, args: Vec<Expr>) -> Stmt {
    stmt(StmtKind::BlockDefer(call_expr(
        callee,
        args.into_iter().map(CallArg::Positional).collect(),
    )))
}

pub fn use_(value: Expr, closer: UseCloser) -> Expr {
    Expr::Use(Box::new(UseExpr { value, closer }))
}

pub fn export(name: &str, value: Expr) -> Stmt {
    stmt(StmtKind::Export {
        name: Name::from(name),
        value,
    })
}

// Classes

pub fn class_member(name: &str, value: Expr) -> ClassMember {
    ClassMember {
        key: str(name),
        value,
    }
}

/// Method member: `name(params) { body }`.
pub fn method(name: &str, params: &[&str], body: Vec<Stmt>) -> ClassMember {
    class_member(name, named_func(name, params, body))
}

pub fn class(name: &str, bases: Vec<Expr>, members: Vec<ClassMember>) -> Stmt {
    class_with_statics(name, bases, members, Vec::new())
}

pub fn class_with_statics(
    name: &str,
    bases: Vec<Expr>,
    members: Vec<ClassMember>,
    statics: Vec<ClassMember>,
) -> Stmt {
    stmt(StmtKind::Class(ClassDef {
        name: Name::from(name),
        exported: false,
        bases,
        members,
        statics,
    }))
}

pub fn extend(target: Expr, items: Vec<ClassMember>) -> Stmt {
    stmt(StmtKind::Extend(ExtendDef {
        exported: false,
        target,
        items,
    }))
}
