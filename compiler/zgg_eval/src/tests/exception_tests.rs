//! `throw`, `try`/`catch`/`finally`, fallback blocks, assertions and
//! error locations.

use pretty_assertions::assert_eq;
use zgg_ir::build::{
    at, binary, block, call, expr_stmt, func, func_decl, ident, int, member, ret, stmt, str,
    throw, try_,
};
use zgg_ir::{BinaryOp, StmtKind};

use super::{failure, output, println, run, run_in};
use crate::errors::division_by_zero;
use crate::{EvalErrorKind, Runtime, RuntimeConfig, Value};

#[test]
fn catch_binds_the_exception_object() {
    let out = output(vec![try_(
        vec![throw(str("bad"))],
        Some((
            "e",
            vec![
                println(vec![member(ident("e"), "message")]),
                println(vec![member(ident("e"), "value")]),
            ],
        )),
        None,
    )]);
    assert_eq!(out, "bad\nbad\n");
}

#[test]
fn thrown_values_keep_their_type() {
    let err = failure(vec![throw(zgg_ir::build::array(vec![int(1), int(2)]))]);
    assert_eq!(err.kind, EvalErrorKind::UserException);
    assert_eq!(err.message, "[1, 2]");
    assert_eq!(
        err.payload,
        Some(Value::array(vec![Value::Int(1), Value::Int(2)]))
    );
}

#[test]
fn finally_runs_exactly_once() {
    let out = output(vec![
        try_(vec![println(vec![str("body")])], None, Some(vec![println(vec![str("finally")])])),
        try_(
            vec![throw(int(1))],
            Some(("e", vec![println(vec![str("caught")])])),
            Some(vec![println(vec![str("finally")])]),
        ),
    ]);
    assert_eq!(out, "body\nfinally\ncaught\nfinally\n");

    let (result, out) = run(vec![try_(
        vec![throw(int(1))],
        None,
        Some(vec![println(vec![str("finally")])]),
    )]);
    assert!(result.is_err());
    assert_eq!(out, "finally\n");
}

#[test]
fn finally_keeps_a_pending_return() {
    let out = output(vec![
        func_decl(
            "f",
            &[],
            vec![try_(
                vec![ret(int(1))],
                None,
                Some(vec![println(vec![str("cleanup")])]),
            )],
        ),
        println(vec![call(ident("f"), Vec::new())]),
    ]);
    assert_eq!(out, "cleanup\n1\n");
}

#[test]
fn return_in_finally_discards_the_error() {
    let out = output(vec![
        func_decl(
            "f",
            &[],
            vec![try_(vec![throw(str("lost"))], None, Some(vec![ret(int(2))]))],
        ),
        println(vec![call(ident("f"), Vec::new())]),
    ]);
    assert_eq!(out, "2\n");
}

#[test]
fn errors_in_catch_propagate() {
    let err = failure(vec![try_(
        vec![throw(int(1))],
        Some(("e", vec![throw(int(2))])),
        None,
    )]);
    assert_eq!(err.payload, Some(Value::Int(2)));
}

#[test]
fn fallback_runs_with_err_bound() {
    let out = output(vec![stmt(StmtKind::Fallback {
        stmt: Box::new(expr_stmt(binary(BinaryOp::Div, int(1), int(0)))),
        fallback: block(vec![println(vec![member(ident("__err__"), "message")])]),
    })]);
    assert_eq!(out, format!("{}\n", division_by_zero().message));
}

#[test]
fn fatal_errors_are_never_caught() {
    let exporter = func(&[], vec![zgg_ir::build::export("x", int(1))]);
    let (result, out) = run(vec![try_(
        vec![expr_stmt(call(exporter, Vec::new()))],
        Some(("e", vec![println(vec![str("caught")])])),
        None,
    )]);
    let err = result.err().unwrap();
    assert_eq!(err.kind, EvalErrorKind::ExportOutsideModule);
    assert!(err.is_fatal());
    assert_eq!(out, "");
}

#[test]
fn assertions() {
    let check = |ok, message| {
        stmt(StmtKind::Assert {
            condition: zgg_ir::build::bool(ok),
            message,
        })
    };
    assert_eq!(output(vec![check(true, None)]), "");
    let err = failure(vec![check(false, Some(str("nope")))]);
    assert_eq!(
        err.kind,
        EvalErrorKind::AssertionFailed {
            message: "nope".to_string()
        }
    );
    assert!(!err.is_fatal());
}

#[test]
fn errors_carry_position_and_backtrace() {
    let err = failure(vec![
        at(
            "main.zgg",
            1,
            func_decl("f", &[], vec![at("main.zgg", 2, throw(str("x")))]),
        ),
        at("main.zgg", 4, expr_stmt(call(ident("f"), Vec::new()))),
    ]);
    assert_eq!(err.position.as_ref().map(|p| p.line), Some(2));
    let frames: Vec<_> = err
        .backtrace
        .as_ref()
        .unwrap()
        .frames()
        .iter()
        .map(|f| (f.function.clone(), f.position.line))
        .collect();
    assert_eq!(frames, [("f".to_string(), 2), ("<module>".to_string(), 4)]);

    let stack = err.to_value();
    let stack = stack.as_object().and_then(|o| o.get("stack")).unwrap();
    assert_eq!(stack.len(), Some(2));
}

#[test]
fn runaway_recursion_is_a_catchable_overflow() {
    let runtime = Runtime::builder()
        .config(RuntimeConfig {
            max_call_depth: 64,
            ..RuntimeConfig::default()
        })
        .print_handler(crate::buffer_handler())
        .build();
    let (result, out) = run_in(
        &runtime,
        vec![
            func_decl("f", &[], vec![ret(call(ident("f"), Vec::new()))]),
            try_(
                vec![expr_stmt(call(ident("f"), Vec::new()))],
                Some(("e", vec![println(vec![str("overflow")])])),
                None,
            ),
        ],
    );
    assert!(result.is_ok());
    assert_eq!(out, "overflow\n");

    let (result, _) = run_in(
        &runtime,
        vec![
            func_decl("g", &[], vec![ret(call(ident("g"), Vec::new()))]),
            expr_stmt(call(ident("g"), Vec::new())),
        ],
    );
    assert_eq!(
        result.err().map(|e| e.kind),
        Some(EvalErrorKind::StackOverflow { depth: 64 })
    );
}
