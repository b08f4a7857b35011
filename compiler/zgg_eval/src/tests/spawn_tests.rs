//! `spawn` and thread handles.

use pretty_assertions::assert_eq;
use zgg_ir::build::{
    array, call, class_member, expr_stmt, extend, for_each, func, ident, int, let_, member,
    method_call, mul, range, ret, str, throw, try_,
};

use super::{eval, failure, output, println, runtime};
use crate::{Context, EvalErrorKind, Value};

fn spawn(args: Vec<zgg_ir::Expr>) -> zgg_ir::Expr {
    call(ident("spawn"), args)
}

#[test]
fn join_returns_the_thread_result() {
    let double = func(&["x"], vec![ret(mul(ident("x"), int(2)))]);
    let v = eval(vec![
        let_("t", spawn(vec![double, int(21)])),
        expr_stmt(method_call(ident("t"), "join", Vec::new())),
    ]);
    assert_eq!(v, Value::Int(42));
}

#[test]
fn join_result_is_cached() {
    let out = output(vec![
        let_("t", spawn(vec![func(&[], vec![println(vec![str("ran")]), ret(int(1))])])),
        println(vec![
            method_call(ident("t"), "join", Vec::new()),
            method_call(ident("t"), "await", Vec::new()),
        ]),
    ]);
    assert_eq!(out, "ran\n1 1\n");
}

#[test]
fn thread_errors_are_raised_by_join() {
    let failing = || spawn(vec![func(&[], vec![throw(str("bad"))])]);
    let out = output(vec![
        let_("t", failing()),
        try_(
            vec![expr_stmt(method_call(ident("t"), "join", Vec::new()))],
            Some((
                "e",
                vec![println(vec![member(ident("e"), "message"), member(ident("e"), "value")])],
            )),
            None,
        ),
        println(vec![member(method_call(ident("t"), "error", Vec::new()), "message")]),
        println(vec![method_call(
            spawn(vec![func(&[], Vec::new())]),
            "error",
            Vec::new(),
        )]),
    ]);
    assert_eq!(out, "bad bad\nbad\nnil\n");

    let err = failure(vec![expr_stmt(method_call(failing(), "join", Vec::new()))]);
    assert_eq!(err.kind, EvalErrorKind::ThreadFailed);
    assert_eq!(err.payload, Some(Value::str("bad")));
}

#[test]
fn threads_share_captured_values() {
    let pusher = func(&["n"], vec![expr_stmt(method_call(ident("xs"), "push", vec![ident("n")]))]);
    let v = eval(vec![
        let_("xs", array(Vec::new())),
        let_("ts", array(Vec::new())),
        for_each(
            None,
            None,
            "i",
            range(int(0), int(4), false),
            vec![expr_stmt(method_call(
                ident("ts"),
                "push",
                vec![spawn(vec![pusher, ident("i")])],
            ))],
        ),
        for_each(
            None,
            None,
            "t",
            zgg_ir::build::iterable(ident("ts")),
            vec![expr_stmt(method_call(ident("t"), "join", Vec::new()))],
        ),
        expr_stmt(call(ident("len"), vec![ident("xs")])),
    ]);
    assert_eq!(v, Value::Int(4));
}

#[test]
fn extensions_made_in_a_thread_are_visible_after_join() {
    let extender = func(
        &[],
        vec![extend(
            ident("Int"),
            vec![class_member("triple", func(&[], vec![ret(mul(ident("this"), int(3)))]))],
        )],
    );
    let v = eval(vec![
        expr_stmt(method_call(spawn(vec![extender]), "join", Vec::new())),
        expr_stmt(method_call(int(5), "triple", Vec::new())),
    ]);
    assert_eq!(v, Value::Int(15));
}

#[test]
fn concurrent_extends_all_land() {
    let names = ["m0", "m1", "m2", "m3", "m4", "m5", "m6", "m7"];
    let mut stmts = vec![let_("ts", array(Vec::new()))];
    for (n, name) in (0i64..).zip(names) {
        let extender = func(
            &[],
            vec![extend(
                ident("Int"),
                vec![class_member(name, func(&[], vec![ret(mul(ident("this"), int(n)))]))],
            )],
        );
        stmts.push(expr_stmt(method_call(ident("ts"), "push", vec![spawn(vec![extender])])));
    }
    stmts.push(for_each(
        None,
        None,
        "t",
        zgg_ir::build::iterable(ident("ts")),
        vec![expr_stmt(method_call(ident("t"), "join", Vec::new()))],
    ));
    stmts.push(expr_stmt(array(
        names.iter().map(|name| method_call(int(2), name, Vec::new())).collect(),
    )));
    let expected = (0..8).map(|n| Value::Int(2 * n)).collect();
    assert_eq!(eval(stmts), Value::array(expected));
}

#[test]
fn spawning_a_non_callable_fails() {
    let err = failure(vec![expr_stmt(spawn(vec![int(1)]))]);
    assert!(matches!(err.kind, EvalErrorKind::NotCallable { .. }));
}

#[test]
fn host_code_can_join_handles() {
    let mut ctx = Context::new(runtime());
    let work = Value::native("work", |_, _, args| {
        Ok(Value::Int(args.iter().filter_map(Value::as_int).sum()))
    });
    let handle = ctx
        .start_thread(work, vec![Value::Int(1), Value::Int(2)])
        .unwrap();
    assert_eq!(ctx.join_value(&handle).unwrap(), Value::Int(3));
    assert!(ctx.join_value(&Value::Int(0)).is_err());
}
