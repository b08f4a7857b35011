//! Engine integration tests: running modules, host bindings, imports and
//! error mapping.

#![allow(clippy::unwrap_used, clippy::expect_used, reason = "Tests can panic")]

use pretty_assertions::assert_eq;
use zgg::ir::build::{
    add, at, block, break_, call, export, expr_stmt, func, func_decl, ident, int, let_, member,
    method_call, module, mul, new, ret, str, throw,
};
use zgg::ir::Module;
use zgg::{
    buffer_handler, ClassBuilder, Context, Engine, Error, EvalError, ModuleInfo, RuntimeConfig,
    Value,
};

fn capturing() -> Engine {
    Engine::builder().print_handler(buffer_handler()).build()
}

fn println(args: Vec<zgg::ir::Expr>) -> zgg::ir::Stmt {
    expr_stmt(call(ident("println"), args))
}

#[test]
fn run_returns_exports_and_captures_output() {
    let engine = capturing();
    let exports = engine
        .run(&module(vec![
            println(vec![str("hello"), int(1)]),
            export("answer", int(42)),
        ]))
        .unwrap();
    assert_eq!(exports.as_object().unwrap().get("answer"), Some(Value::Int(42)));
    assert_eq!(engine.output().as_deref(), Some("hello 1\n"));
    assert_eq!(engine.output().as_deref(), Some(""));
    assert_eq!(Engine::new().output(), None);
}

#[test]
fn runs_do_not_share_top_level_bindings() {
    let engine = capturing();
    let m = module(vec![let_("x", int(1))]);
    assert!(engine.run(&m).is_ok());
    assert!(engine.run(&m).is_ok());
}

#[test]
fn globals_reach_scripts() {
    let engine = Engine::builder()
        .print_handler(buffer_handler())
        .global("base", Value::Int(40))
        .global(
            "hostAdd",
            Value::native("hostAdd", |_, _, args| {
                Ok(Value::Int(args.iter().filter_map(Value::as_int).sum()))
            }),
        )
        .build();
    engine.set_global("two", Value::Int(2));
    assert_eq!(engine.get_global("two"), Some(Value::Int(2)));

    engine
        .run(&module(vec![println(vec![call(
            ident("hostAdd"),
            vec![ident("base"), ident("two")],
        )])]))
        .unwrap();
    assert_eq!(engine.output().unwrap(), "42\n");
}

#[test]
fn host_classes() {
    let counter = ClassBuilder::new("Counter")
        .constructor(|_, this, _| {
            this.set("n", Value::Int(0));
            Ok(())
        })
        .method(
            "bump",
            |_, this, args| {
                let by = args.first().and_then(Value::as_int).unwrap_or(1);
                let n = this.get("n").and_then(|v| v.as_int()).unwrap_or(0) + by;
                this.set("n", Value::Int(n));
                Ok(Value::Int(n))
            },
            &["by"],
        )
        .build();
    let engine = Engine::builder()
        .print_handler(buffer_handler())
        .global("Counter", Value::Type(counter))
        .build();
    engine
        .run(&module(vec![
            let_("c", new(ident("Counter"), Vec::new())),
            expr_stmt(method_call(ident("c"), "bump", Vec::new())),
            println(vec![method_call(ident("c"), "bump", vec![int(5)])]),
        ]))
        .unwrap();
    assert_eq!(engine.output().unwrap(), "6\n");
}

fn library() -> Module {
    module(vec![
        println(vec![str("init lib")]),
        export("greet", func(&["who"], vec![ret(add(str("hi "), ident("who")))])),
    ])
}

#[test]
fn importer_serves_modules() {
    let engine = Engine::builder()
        .print_handler(buffer_handler())
        .importer(
            |ctx: &mut Context, name: &str, _cached: i64| -> Result<Option<ModuleInfo>, EvalError> {
                if name != "lib" {
                    return Ok(None);
                }
                let value = ctx.fork().run_module(&library())?;
                Ok(Some(ModuleInfo { value, modified: 0 }))
            },
        )
        .build();
    let main = module(vec![
        let_("lib", call(ident("import"), vec![str("lib")])),
        println(vec![call(member(ident("lib"), "greet"), vec![str("there")])]),
    ]);
    engine.run(&main).unwrap();
    engine.run(&main).unwrap();
    assert_eq!(engine.output().unwrap(), "init lib\nhi there\nhi there\n");

    let err = engine
        .run(&module(vec![expr_stmt(call(ident("import"), vec![str("other")]))]))
        .unwrap_err();
    assert!(matches!(err, Error::Runtime { .. }));
}

#[test]
fn uncaught_exceptions_map_to_runtime_errors() {
    let engine = capturing();
    let err = engine
        .run(&module(vec![
            at("main.zgg", 1, func_decl("f", &[], vec![at("main.zgg", 2, throw(str("nope")))])),
            at("main.zgg", 3, expr_stmt(call(ident("f"), Vec::new()))),
        ]))
        .unwrap_err();
    assert!(matches!(err, Error::Runtime { .. }));
    assert!(!err.is_fatal());
    assert_eq!(err.message(), "nope");
    assert_eq!(err.position().map(|p| p.line), Some(2));
    assert_eq!(err.to_string(), "nope (at main.zgg:2)");
    assert_eq!(err.backtrace(), "  main.zgg line 2 (f)\n  main.zgg line 3 (<module>)\n");
    assert_eq!(err.eval_error().payload, Some(Value::str("nope")));
}

#[test]
fn fatal_and_thread_errors() {
    let engine = capturing();
    let err = engine.run(&module(vec![break_(None)])).unwrap_err();
    assert!(err.is_fatal());
    assert!(err.to_string().starts_with("fatal: break outside of a loop"));

    let failing = call(ident("spawn"), vec![func(&[], vec![throw(str("in thread"))])]);
    let err = engine
        .run(&module(vec![expr_stmt(method_call(failing, "join", Vec::new()))]))
        .unwrap_err();
    assert!(matches!(err, Error::Thread { .. }));
    assert_eq!(err.message(), "in thread");
}

#[test]
fn configured_call_depth() {
    let engine = Engine::builder()
        .print_handler(buffer_handler())
        .config(RuntimeConfig {
            max_call_depth: 32,
            ..RuntimeConfig::default()
        })
        .with_tracing(true)
        .build();
    let err = engine
        .run(&module(vec![
            func_decl("loop", &[], vec![expr_stmt(call(ident("loop"), Vec::new()))]),
            expr_stmt(call(ident("loop"), Vec::new())),
        ]))
        .unwrap_err();
    assert_eq!(err.message(), "maximum call depth exceeded (limit: 32)");
}

#[test]
fn contexts_evaluate_blocks_directly() {
    let engine = capturing();
    let mut ctx = engine.context();
    let v = ctx
        .eval_block(&block(vec![let_("x", int(20)), expr_stmt(mul(ident("x"), int(2)))]))
        .unwrap();
    assert_eq!(v, Value::Int(40));
}
