//! Statement execution.

use std::mem;

use zgg_ir::{
    Block, CallExpr, ForEachStmt, ForStmt, IfCase, Name, Stmt, StmtKind, SwitchStmt, TryStmt,
    WhileStmt,
};

use crate::context::{Context, Flow};
use crate::errors::{self, EvalError};
use crate::value::Value;

impl Context {
    pub(super) fn exec_stmt_kind(&mut self, kind: &StmtKind) -> Result<(), EvalError> {
        match kind {
            StmtKind::Expr(expr) => {
                self.ret_val = self.eval_expr(expr)?;
                Ok(())
            }
            StmtKind::Block(block) => self.exec_block(block),
            StmtKind::If(stmt) => self.exec_if(&stmt.cases, stmt.else_body.as_ref()),
            StmtKind::For(stmt) => self.exec_for(stmt),
            StmtKind::ForEach(stmt) => self.exec_for_each(stmt),
            StmtKind::While(stmt) => self.exec_while(stmt),
            StmtKind::DoWhile(stmt) => self.exec_do_while(stmt),
            StmtKind::Break(label) => {
                self.flow = Flow::Break(label.clone());
                Ok(())
            }
            StmtKind::Continue(label) => {
                self.flow = Flow::Continue(label.clone());
                Ok(())
            }
            StmtKind::Return(value) => {
                self.ret_val = match value {
                    Some(expr) => self.eval_expr(expr)?,
                    None => Value::Undefined,
                };
                self.flow = Flow::Return;
                Ok(())
            }
            StmtKind::Switch(stmt) => self.exec_switch(stmt),
            StmtKind::Export { name, value } => {
                if !self.is_module_top() {
                    return Err(errors::export_outside_module());
                }
                let value = self.eval_expr(value)?;
                self.exports().set(name.clone(), value.clone());
                self.ret_val = value;
                Ok(())
            }
            StmtKind::Class(def) => self.exec_class(def),
            StmtKind::Extend(def) => self.exec_extend(def),
            StmtKind::Defer(call) => self.exec_defer(call, false),
            StmtKind::BlockDefer(call) => self.exec_defer(call, true),
            StmtKind::Try(stmt) => self.exec_try(stmt),
            StmtKind::Fallback { stmt, fallback } => self.exec_fallback(stmt, fallback),
            StmtKind::Assert { condition, message } => {
                let ok = self.eval_expr(condition)?;
                if self.is_truthy(&ok)? {
                    return Ok(());
                }
                let message = match message {
                    Some(expr) => {
                        let v = self.eval_expr(expr)?;
                        self.stringify(&v)?
                    }
                    None => String::new(),
                };
                Err(errors::assertion_failed(&message))
            }
            StmtKind::Throw(expr) => {
                let value = self.eval_expr(expr)?;
                let message = self.stringify(&value)?;
                Err(errors::user_exception(message, value))
            }
        }
    }

    /// Run `if`/`elif` arms. An arm's init runs in a frame that stays open
    /// for the remaining arms and the `else`.
    fn exec_if(&mut self, cases: &[IfCase], else_body: Option<&Block>) -> Result<(), EvalError> {
        let Some((case, rest)) = cases.split_first() else {
            return match else_body {
                Some(block) => self.exec_block(block),
                None => Ok(()),
            };
        };
        match &case.init {
            Some(init) => self.with_block(|ctx| {
                ctx.eval_expr(init)?;
                ctx.exec_if_arm(case, rest, else_body)
            }),
            None => self.exec_if_arm(case, rest, else_body),
        }
    }

    fn exec_if_arm(
        &mut self,
        case: &IfCase,
        rest: &[IfCase],
        else_body: Option<&Block>,
    ) -> Result<(), EvalError> {
        let cond = self.eval_expr(&case.condition)?;
        if self.is_truthy(&cond)? {
            self.exec_block(&case.body)
        } else {
            self.exec_if(rest, else_body)
        }
    }

    /// Consume a break/continue aimed at this loop and report whether the
    /// loop has to stop. An unlabelled signal targets the innermost loop.
    fn loop_should_exit(&mut self, label: Option<&Name>) -> bool {
        let targets_me = |target: &Option<Name>| target.is_none() || target.as_ref() == label;
        match &self.flow {
            Flow::Normal => false,
            Flow::Break(target) => {
                if targets_me(target) {
                    self.flow = Flow::Normal;
                }
                true
            }
            Flow::Continue(target) => {
                if targets_me(target) {
                    self.flow = Flow::Normal;
                    false
                } else {
                    true
                }
            }
            Flow::Return => true,
        }
    }

    fn exec_for(&mut self, stmt: &ForStmt) -> Result<(), EvalError> {
        self.with_block(|ctx| {
            if let Some(init) = &stmt.init {
                ctx.eval_expr(init)?;
            }
            loop {
                if let Some(check) = &stmt.check {
                    let v = ctx.eval_expr(check)?;
                    if !ctx.is_truthy(&v)? {
                        break;
                    }
                }
                ctx.exec_block(&stmt.body)?;
                if ctx.loop_should_exit(stmt.label.as_ref()) {
                    break;
                }
                if let Some(next) = &stmt.next {
                    ctx.eval_expr(next)?;
                }
            }
            Ok(())
        })
    }

    /// Loop variables live in one frame around the whole loop; the body
    /// gets a fresh frame per iteration.
    fn exec_for_each(&mut self, stmt: &ForEachStmt) -> Result<(), EvalError> {
        self.with_block(|ctx| {
            ctx.iterate_source(&stmt.source, &mut |ctx, index, value| {
                ctx.force_local(stmt.value.clone(), value);
                if let Some(index_name) = &stmt.index {
                    ctx.force_local(index_name.clone(), index);
                }
                ctx.exec_block(&stmt.body)?;
                Ok(!ctx.loop_should_exit(stmt.label.as_ref()))
            })
        })
    }

    fn exec_while(&mut self, stmt: &WhileStmt) -> Result<(), EvalError> {
        loop {
            let v = self.eval_expr(&stmt.check)?;
            if !self.is_truthy(&v)? {
                return Ok(());
            }
            self.exec_block(&stmt.body)?;
            if self.loop_should_exit(stmt.label.as_ref()) {
                return Ok(());
            }
        }
    }

    fn exec_do_while(&mut self, stmt: &WhileStmt) -> Result<(), EvalError> {
        loop {
            self.exec_block(&stmt.body)?;
            if self.loop_should_exit(stmt.label.as_ref()) {
                return Ok(());
            }
            let v = self.eval_expr(&stmt.check)?;
            if !self.is_truthy(&v)? {
                return Ok(());
            }
        }
    }

    /// The first matching case runs; with `fallthrough` matching continues
    /// with the later cases and then the default.
    fn exec_switch(&mut self, stmt: &SwitchStmt) -> Result<(), EvalError> {
        let value = self.eval_expr(&stmt.value)?;
        for case in &stmt.cases {
            if self.value_matches(&case.condition, &value)? {
                self.exec_block(&case.body)?;
                if !case.fallthrough || !self.flow.is_normal() {
                    return Ok(());
                }
            }
        }
        match &stmt.default {
            Some(block) => self.exec_block(block),
            None => Ok(()),
        }
    }

    fn exec_defer(&mut self, call: &CallExpr, block_scoped: bool) -> Result<(), EvalError> {
        let callee = self.eval_expr(&call.callee)?;
        if !self.is_callable(&callee) {
            if call.optional {
                return Ok(());
            }
            return Err(errors::not_callable(&callee));
        }
        let args = self.eval_args(&callee, &call.args, &[])?;
        if block_scoped {
            self.add_block_defer(callee, args, call.optional);
        } else {
            self.add_defer(callee, args);
        }
        Ok(())
    }

    /// `try`/`catch`/`finally`.
    ///
    /// `ret_val` ends up as the try (or catch) result. `finally` always
    /// runs; a flow signal it sets replaces the pending one and discards a
    /// pending error.
    fn exec_try(&mut self, stmt: &TryStmt) -> Result<(), EvalError> {
        let mut outcome = self.exec_block(&stmt.body);
        let caught = match &outcome {
            Err(err) if !err.is_fatal() => Some(err.to_value()),
            _ => None,
        };
        if let (Some(exception), Some(catch)) = (caught, &stmt.catch) {
            tracing::trace!("exception caught");
            outcome = self.with_block(|ctx| {
                ctx.force_local(catch.name.clone(), exception);
                ctx.exec_stmts(&catch.body.stmts)
            });
        }
        let ret = self.ret_val.clone();

        if let Some(finally) = &stmt.finally {
            let pending = mem::take(&mut self.flow);
            self.exec_block(finally)?;
            if !self.flow.is_normal() {
                return Ok(());
            }
            self.flow = pending;
            self.ret_val = ret;
        }
        outcome
    }

    /// `stmt fallback { ... }`: on a catchable error run the fallback
    /// block with the exception bound to `__err__`.
    fn exec_fallback(&mut self, stmt: &Stmt, fallback: &Block) -> Result<(), EvalError> {
        match self.exec_stmt(stmt) {
            Err(err) if !err.is_fatal() => {
                let exception = err.to_value();
                self.with_block(|ctx| {
                    ctx.force_local("__err__", exception);
                    ctx.exec_stmts(&fallback.stmts)
                })
            }
            other => other,
        }
    }
}
