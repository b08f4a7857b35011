//! Exports, `import` and the module cache.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use pretty_assertions::assert_eq;
use zgg_ir::build::{
    block_stmt, call, export, expr_stmt, func, ident, int, let_, member, module, str,
};
use zgg_ir::Expr;

use super::{output, println, run, run_in};
use crate::{Context, EvalError, EvalErrorKind, ModuleInfo, Runtime, Value};

#[test]
fn run_module_returns_the_exports() {
    let (result, _) = run(vec![
        export("answer", int(42)),
        let_("hidden", int(1)),
        block_stmt(vec![export("nested", str("ok"))]),
    ]);
    let exports = result.unwrap();
    let exports = exports.as_object().unwrap();
    assert_eq!(exports.keys().len(), 2);
    assert_eq!(exports.get("answer"), Some(Value::Int(42)));
    assert_eq!(exports.get("nested"), Some(Value::str("ok")));
}

#[test]
fn export_inside_a_function_is_fatal() {
    let (result, _) = run(vec![expr_stmt(call(
        func(&[], vec![export("x", int(1))]),
        Vec::new(),
    ))]);
    let err = result.unwrap_err();
    assert_eq!(err.kind, EvalErrorKind::ExportOutsideModule);
    assert!(err.is_fatal());
}

/// A runtime whose importer knows one module, `lib`, exporting `twice`.
/// Loading it prints `loading`; `loads` counts importer calls.
fn runtime_with_lib(loads: Arc<AtomicUsize>) -> Arc<Runtime> {
    let importer = move |ctx: &mut Context, name: &str, _cached: i64| -> Result<Option<ModuleInfo>, EvalError> {
        loads.fetch_add(1, Ordering::SeqCst);
        if name != "lib" {
            return Ok(None);
        }
        let lib = module(vec![
            println(vec![str("loading")]),
            export(
                "twice",
                func(&["x"], vec![zgg_ir::build::ret(zgg_ir::build::mul(ident("x"), int(2)))]),
            ),
        ]);
        let value = ctx.fork().run_module(&lib)?;
        Ok(Some(ModuleInfo { value, modified: 0 }))
    };
    Runtime::builder()
        .print_handler(crate::buffer_handler())
        .importer(importer)
        .build()
}

#[test]
fn imports_load_once_and_share_the_instance() {
    let loads = Arc::new(AtomicUsize::new(0));
    let runtime = runtime_with_lib(Arc::clone(&loads));
    let (result, out) = run_in(
        &runtime,
        vec![
            let_("a", call(ident("import"), vec![str("lib")])),
            let_("b", Expr::Import(Arc::from("lib"))),
            println(vec![call(member(ident("a"), "twice"), vec![int(21)])]),
            export("a", ident("a")),
            export("b", ident("b")),
        ],
    );
    assert_eq!(out, "loading\n42\n");
    assert_eq!(loads.load(Ordering::SeqCst), 1);

    let exports = result.unwrap();
    let exports = exports.as_object().unwrap();
    let (a, b) = (exports.get("a").unwrap(), exports.get("b").unwrap());
    assert!(a.as_object().unwrap().same_instance(b.as_object().unwrap()));
}

#[test]
fn modules_are_cached_across_contexts() {
    let loads = Arc::new(AtomicUsize::new(0));
    let runtime = runtime_with_lib(Arc::clone(&loads));
    let import_lib = || vec![expr_stmt(call(ident("import"), vec![str("lib"), zgg_ir::build::bool(true)]))];
    assert!(run_in(&runtime, import_lib()).0.is_ok());
    assert!(run_in(&runtime, import_lib()).0.is_ok());
    // Timestamp zero: even a forced reload keeps the cached copy.
    assert_eq!(loads.load(Ordering::SeqCst), 1);
}

#[test]
fn missing_modules_fail_to_import() {
    let runtime = runtime_with_lib(Arc::new(AtomicUsize::new(0)));
    let (result, _) = run_in(&runtime, vec![let_("m", Expr::Import(Arc::from("nope")))]);
    assert!(matches!(
        result.unwrap_err().kind,
        EvalErrorKind::ImportFailed { ref module } if module == "nope"
    ));

    let out = output(vec![zgg_ir::build::try_(
        vec![expr_stmt(call(ident("import"), vec![str("lib")]))],
        Some(("e", vec![println(vec![str("no importer")])])),
        None,
    )]);
    assert_eq!(out, "no importer\n");
}
