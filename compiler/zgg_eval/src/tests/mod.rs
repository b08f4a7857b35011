//! Evaluation tests over trees assembled with `zgg_ir::build`.
//!
//! Each file covers one area of the language; they share the runners
//! below, which evaluate on a fresh runtime with captured output.

#![allow(clippy::unwrap_used, clippy::expect_used, reason = "Tests can panic")]

mod exception_tests;
mod module_tests;
mod operators_tests;
mod spawn_tests;

use std::sync::Arc;

use zgg_ir::build::{block, call, expr_stmt, ident, module};
use zgg_ir::{Expr, Stmt};

use crate::print_handler::buffer_handler;
use crate::{Context, EvalError, EvalResult, Runtime, Value};

pub(crate) fn runtime() -> Arc<Runtime> {
    Runtime::builder().print_handler(buffer_handler()).build()
}

/// Run `stmts` as a module on `runtime`; returns the exports (or the
/// error) and everything printed.
pub(crate) fn run_in(runtime: &Arc<Runtime>, stmts: Vec<Stmt>) -> (EvalResult, String) {
    let mut ctx = Context::new(Arc::clone(runtime));
    let result = ctx.run_module(&module(stmts));
    (result, runtime.print_handler().take_output())
}

pub(crate) fn run(stmts: Vec<Stmt>) -> (EvalResult, String) {
    run_in(&runtime(), stmts)
}

/// Printed output of a module that must succeed.
pub(crate) fn output(stmts: Vec<Stmt>) -> String {
    let (result, out) = run(stmts);
    if let Err(e) = result {
        panic!("evaluation failed: {}\n{out}", e.message_with_stack());
    }
    out
}

/// The error a module must raise.
pub(crate) fn failure(stmts: Vec<Stmt>) -> EvalError {
    match run(stmts).0 {
        Ok(v) => panic!("expected an error, got {v:?}"),
        Err(e) => e,
    }
}

/// Value of the last statement.
pub(crate) fn eval(stmts: Vec<Stmt>) -> Value {
    let mut ctx = Context::new(runtime());
    ctx.eval_block(&block(stmts)).expect("evaluation failed")
}

pub(crate) fn eval_expr(e: Expr) -> Value {
    eval(vec![expr_stmt(e)])
}

/// `println(args...)`
pub(crate) fn println(args: Vec<Expr>) -> Stmt {
    expr_stmt(call(ident("println"), args))
}
