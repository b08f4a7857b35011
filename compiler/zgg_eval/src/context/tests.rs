use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};

use pretty_assertions::assert_eq;

use super::*;
use crate::print_handler::buffer_handler;
use crate::runtime::ModuleInfo;

fn capturing() -> Context {
    Context::new(Runtime::builder().print_handler(buffer_handler()).build())
}

fn output(ctx: &Context) -> String {
    ctx.runtime().print_handler().output()
}

fn printer(text: &'static str) -> Value {
    Value::native(text, move |ctx, _, _| {
        ctx.print(text);
        Ok(Value::Undefined)
    })
}

#[test]
fn block_bindings_end_with_the_block() {
    let mut ctx = capturing();
    let seen = ctx.with_block(|ctx| {
        ctx.define_local(&Name::from("x"), Value::Int(1))?;
        Ok(ctx.lookup("x"))
    });
    assert_eq!(seen.ok(), Some(Value::Int(1)));
    assert_eq!(ctx.lookup("x"), Value::Undefined);
}

#[test]
fn redefinition_in_one_scope_is_an_error() {
    let ctx = capturing();
    let x = Name::from("x");
    assert!(ctx.define_local(&x, Value::Int(1)).is_ok());
    let err = ctx.define_local(&x, Value::Int(2)).err();
    assert!(err.is_some_and(|e| matches!(e.kind, crate::errors::EvalErrorKind::VariableRedefined { .. })));
    assert!(ctx.assign_var("x", Value::Int(3)).is_ok());
    assert_eq!(ctx.lookup("x"), Value::Int(3));
    assert!(ctx.assign_var("nope", Value::Nil).is_err());
}

#[test]
fn block_defers_run_lifo_on_exit() {
    let mut ctx = capturing();
    let result = ctx.with_block(|ctx| {
        ctx.add_block_defer(printer("1"), Vec::new(), false);
        ctx.add_block_defer(printer("2"), Vec::new(), false);
        ctx.print("body ");
        Ok(())
    });
    assert!(result.is_ok());
    assert_eq!(output(&ctx), "body 21");
}

#[test]
fn block_defers_run_when_the_body_fails() {
    let mut ctx = capturing();
    let result: Result<(), EvalError> = ctx.with_block(|ctx| {
        ctx.add_block_defer(printer("cleanup"), Vec::new(), false);
        Err(EvalError::new("boom"))
    });
    assert_eq!(result.err().map(|e| e.message), Some("boom".to_string()));
    assert_eq!(output(&ctx), "cleanup");
}

#[test]
fn function_defers_skip_block_frames() {
    let mut ctx = capturing();
    let result = ctx.with_block(|ctx| {
        ctx.add_defer(printer("late"), Vec::new());
        Ok(())
    });
    assert!(result.is_ok());
    assert_eq!(output(&ctx), "");
    assert!(ctx.run_root_defers().is_ok());
    assert_eq!(output(&ctx), "late");
}

#[test]
fn optional_defers_skip_non_callables() {
    let mut ctx = capturing();
    let result = ctx.with_block(|ctx| {
        ctx.add_block_defer(Value::Int(1), Vec::new(), true);
        Ok(())
    });
    assert!(result.is_ok());

    let result = ctx.with_block(|ctx| {
        ctx.add_block_defer(Value::Int(1), Vec::new(), false);
        Ok(())
    });
    assert!(result.is_err());
}

#[test]
fn defers_keep_the_pending_flow() {
    let mut ctx = capturing();
    let result = ctx.with_block(|ctx| {
        ctx.add_block_defer(printer("d"), Vec::new(), false);
        ctx.ret_val = Value::Int(7);
        ctx.flow = Flow::Return;
        Ok(())
    });
    assert!(result.is_ok());
    assert_eq!(ctx.flow(), &Flow::Return);
    assert_eq!(ctx.ret_val(), &Value::Int(7));
}

#[test]
fn backtrace_lists_function_frames_innermost_first() {
    let mut ctx = capturing();
    ctx.set_position(&Position::new("main.zgg", 3));
    let scope = SharedScope::child(ctx.scope());
    let frames = ctx.with_frame(
        FrameKind::Function {
            name: Name::from("inner"),
        },
        scope,
        |ctx| {
            ctx.with_block(|ctx| {
                ctx.set_position(&Position::new("main.zgg", 9));
                Ok(ctx.backtrace())
            })
        },
    );
    let frames = frames.map(|bt| bt.frames().to_vec()).unwrap_or_default();
    let summary: Vec<_> = frames
        .iter()
        .map(|f| (f.function.as_str(), f.position.line))
        .collect();
    assert_eq!(summary, [("inner", 9), ("<module>", 3)]);
}

#[test]
fn locate_fills_missing_position_only() {
    let mut ctx = capturing();
    ctx.set_position(&Position::new("a.zgg", 4));
    let located = ctx.locate(EvalError::new("x"));
    assert_eq!(located.position, Some(Position::new("a.zgg", 4)));

    let kept = ctx.locate(EvalError::new("y").with_position(Position::new("b.zgg", 1)));
    assert_eq!(kept.position, Some(Position::new("b.zgg", 1)));
}

#[test]
fn imports_are_cached_until_forgotten() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let runtime = Runtime::builder()
        .print_handler(buffer_handler())
        .importer(
            move |_ctx: &mut Context,
                  name: &str,
                  _cached: i64|
                  -> Result<Option<ModuleInfo>, EvalError> {
                if name == "missing" {
                    return Ok(None);
                }
                let n = counter.fetch_add(1, Ordering::SeqCst);
                Ok(Some(ModuleInfo {
                    value: Value::object([("load", Value::Int(i64::try_from(n).unwrap_or(0)))]),
                    modified: 0,
                }))
            },
        )
        .build();
    let mut ctx = Context::new(runtime);

    let first = ctx.import_module("m", false).unwrap_or_default();
    let second = ctx.import_module("m", true).unwrap_or_default();
    assert_eq!(first, second);
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    assert!(ctx.forget_module("m").is_some());
    let third = ctx.import_module("m", false).unwrap_or_default();
    assert_ne!(first, third);
    assert_eq!(calls.load(Ordering::SeqCst), 2);

    assert!(ctx.import_module("missing", false).is_err());
}

#[test]
fn forced_reload_keeps_cache_when_timestamp_matches() {
    let stamp = Arc::new(AtomicI64::new(10));
    let current = Arc::clone(&stamp);
    let runtime = Runtime::builder()
        .print_handler(buffer_handler())
        .importer(
            move |_ctx: &mut Context,
                  _name: &str,
                  _cached: i64|
                  -> Result<Option<ModuleInfo>, EvalError> {
                let modified = current.load(Ordering::SeqCst);
                Ok(Some(ModuleInfo {
                    value: Value::object([("version", Value::Int(modified))]),
                    modified,
                }))
            },
        )
        .build();
    let mut ctx = Context::new(runtime);

    let first = ctx.import_module("m", false).unwrap_or_default();
    let same = ctx.import_module("m", true).unwrap_or_default();
    assert!(matches!((&first, &same), (Value::Object(a), Value::Object(b)) if a.same_instance(b)));

    stamp.store(11, Ordering::SeqCst);
    let newer = ctx.import_module("m", true).unwrap_or_default();
    assert_eq!(newer, Value::object([("version", Value::Int(11))]));
}

#[test]
fn import_without_importer_fails() {
    let mut ctx = capturing();
    assert!(ctx.import_module("anything", false).is_err());
}

#[test]
fn forked_contexts_share_the_runtime() {
    let ctx = capturing();
    ctx.runtime().set_global("shared", Value::Int(5));
    let other = ctx.fork();
    assert_eq!(other.lookup("shared"), Value::Int(5));
    assert_eq!(other.call_depth(), 0);
}

#[test]
fn forked_contexts_start_at_the_parent_position() {
    let mut ctx = capturing();
    ctx.set_position(&Position::new("main.zgg", 7));
    let other = ctx.fork();
    assert_eq!(other.position(), &Position::new("main.zgg", 7));
    assert_eq!(other.backtrace().frames()[0].position, Position::new("main.zgg", 7));
}
