//! Tree-walking evaluator.
//!
//! Evaluation is a set of `Context` methods split by concern:
//!
//! - `stmt` - statements, blocks, loops, `try`, `switch`, `defer`
//! - `expr` - expression dispatch, literals, access, `when`, `use`
//! - `operators` - binary/unary/compare dispatch, truthiness, stringify
//! - `assign` - `=`, `:=` shapes, `++`/`--`
//! - `call` - argument lists, keyword placement, partial application
//! - `iterate` - the iteration protocol shared by loops and comprehensions
//! - `class` - `class` and `extend`
//!
//! Expressions return their value; statements store theirs in `ret_val`
//! so a function body's last statement can be its result. Both go through
//! `ensure_sufficient_stack`.

mod assign;
mod call;
mod class;
mod expr;
mod iterate;
mod operators;
mod stmt;

use zgg_ir::{Block, Module, Name, Stmt};

use crate::context::{Context, Flow};
use crate::errors::{self, EvalError};
use crate::stack::ensure_sufficient_stack;
use crate::value::Value;
use crate::EvalResult;

impl Context {
    /// Evaluate a module's top-level block and return its export object.
    ///
    /// Module-level defers run after the block, on success and on error.
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn run_module(&mut self, module: &Module) -> EvalResult {
        let result = self
            .exec_stmts(&module.block.stmts)
            .and_then(|()| self.finish_top_level_flow());
        let deferred = self.run_root_defers();
        result.and(deferred)?;
        let exports = Value::Object(self.exports().clone());
        self.ret_val = exports.clone();
        Ok(exports)
    }

    /// Run top-level statements without collecting exports (REPL-style).
    /// Returns the value of the last statement.
    pub fn eval_block(&mut self, block: &Block) -> EvalResult {
        self.exec_stmts(&block.stmts)?;
        self.finish_top_level_flow()?;
        Ok(self.ret_val.clone())
    }

    /// A `return` at top level just ends the block; a break or continue
    /// that no loop consumed is fatal.
    fn finish_top_level_flow(&mut self) -> Result<(), EvalError> {
        match std::mem::take(&mut self.flow) {
            Flow::Normal | Flow::Return => Ok(()),
            Flow::Break(label) => Err(self.locate(errors::unmatched_label(
                "break",
                label.as_ref().map(Name::as_str),
            ))),
            Flow::Continue(label) => Err(self.locate(errors::unmatched_label(
                "continue",
                label.as_ref().map(Name::as_str),
            ))),
        }
    }

    /// Run statements in the current frame until one raises or sets a
    /// flow signal.
    pub(crate) fn exec_stmts(&mut self, stmts: &[Stmt]) -> Result<(), EvalError> {
        for stmt in stmts {
            self.exec_stmt(stmt)?;
            if !self.flow.is_normal() {
                break;
            }
        }
        Ok(())
    }

    /// Run a block in its own frame.
    pub(crate) fn exec_block(&mut self, block: &Block) -> Result<(), EvalError> {
        self.with_block(|ctx| ctx.exec_stmts(&block.stmts))
    }

    #[tracing::instrument(level = "trace", skip_all)]
    pub fn exec_stmt(&mut self, stmt: &Stmt) -> Result<(), EvalError> {
        self.set_position(&stmt.pos);
        let result = ensure_sufficient_stack(|| self.exec_stmt_kind(&stmt.kind));
        result.map_err(|e| self.locate(e))
    }

    #[tracing::instrument(level = "trace", skip_all)]
    pub fn eval_expr(&mut self, expr: &zgg_ir::Expr) -> EvalResult {
        ensure_sufficient_stack(|| self.eval_expr_inner(expr))
    }
}
