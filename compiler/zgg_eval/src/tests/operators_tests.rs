//! Binary, unary and comparison operators.

use std::str::FromStr;

use bigdecimal::BigDecimal;
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use zgg_ir::build::{
    add, array, bignum, binary, bool, compare, compare_chain, expr_stmt, float, ident, int, let_,
    mul, nil, not, str, sub, unary,
};
use zgg_ir::{BinaryOp, CompareOp, UnaryOp};

use super::{eval, eval_expr, failure, runtime};
use crate::{Context, EvalErrorKind, Value};

fn big(text: &str) -> Value {
    Value::bignum(BigDecimal::from_str(text).unwrap())
}

#[test]
fn int_arithmetic() {
    assert_eq!(eval_expr(add(int(2), mul(int(3), int(4)))), Value::Int(14));
    assert_eq!(eval_expr(sub(int(2), int(5))), Value::Int(-3));
    assert_eq!(eval_expr(binary(BinaryOp::Div, int(7), int(2))), Value::Int(3));
    assert_eq!(eval_expr(binary(BinaryOp::Mod, int(-7), int(2))), Value::Int(-1));
    assert_eq!(eval_expr(binary(BinaryOp::Pow, int(2), int(10))), Value::Int(1024));
    assert_eq!(eval_expr(binary(BinaryOp::BitXor, int(6), int(3))), Value::Int(5));
    assert_eq!(eval_expr(binary(BinaryOp::Shl, int(1), int(4))), Value::Int(16));
}

#[test]
fn int_overflow_wraps() {
    assert_eq!(eval_expr(add(int(i64::MAX), int(1))), Value::Int(i64::MIN));
    assert_eq!(eval_expr(unary(UnaryOp::Neg, int(i64::MIN))), Value::Int(i64::MIN));
    assert_eq!(eval_expr(binary(BinaryOp::Div, int(i64::MIN), int(-1))), Value::Int(i64::MIN));
}

#[test]
fn mixed_numbers_promote() {
    assert_eq!(eval_expr(add(int(1), float(0.5))), Value::Float(1.5));
    assert_eq!(eval_expr(binary(BinaryOp::Div, float(7.0), int(2))), Value::Float(3.5));
    assert_eq!(eval_expr(add(bignum("0.1"), bignum("0.2"))), big("0.3"));
    assert_eq!(eval_expr(add(float(0.5), bignum("1"))), big("1.5"));
    assert_eq!(eval_expr(mul(int(3), bignum("1.25"))), big("3.75"));
    assert_eq!(eval_expr(binary(BinaryOp::Pow, bignum("1.5"), int(2))), big("2.25"));
}

#[test]
fn division_by_zero_is_catchable() {
    for (l, r) in [(int(1), int(0)), (float(1.0), float(0.0)), (bignum("1"), int(0))] {
        let err = failure(vec![expr_stmt(binary(BinaryOp::Div, l, r))]);
        assert_eq!(err.kind, EvalErrorKind::DivisionByZero);
        assert!(!err.is_fatal());
    }
}

#[test]
fn string_and_collection_operators() {
    assert_eq!(eval_expr(add(str("a"), int(1))), Value::str("a1"));
    assert_eq!(eval_expr(add(int(1), str("a"))), Value::str("1a"));
    assert_eq!(eval_expr(mul(str("ab"), int(3))), Value::str("ababab"));
    assert_eq!(eval_expr(mul(str("ab"), int(-1))), Value::str(""));
    assert_eq!(
        eval_expr(add(array(vec![int(1)]), array(vec![int(2)]))),
        Value::array(vec![Value::Int(1), Value::Int(2)])
    );
    assert_eq!(
        eval_expr(mul(array(vec![int(0)]), int(2))),
        Value::array(vec![Value::Int(0), Value::Int(0)])
    );
}

#[test]
fn format_operator() {
    let e = binary(
        BinaryOp::Mod,
        str("{}-%d-%s 100%% %v"),
        array(vec![int(1), int(2), str("x")]),
    );
    assert_eq!(eval_expr(e), Value::str("1-2-x 100% %v"));
    assert_eq!(
        eval_expr(binary(BinaryOp::Mod, str("<%v>"), int(5))),
        Value::str("<5>")
    );
}

#[test]
fn type_mismatch_names_both_operands() {
    let err = failure(vec![expr_stmt(sub(str("a"), int(1)))]);
    assert!(matches!(
        err.kind,
        EvalErrorKind::BinaryTypeMismatch { ref left, ref right, .. } if left == "Str" && right == "Int"
    ));
}

#[test]
fn logical_operators_return_operands() {
    assert_eq!(eval_expr(binary(BinaryOp::And, int(0), ident("boom"))), Value::Int(0));
    assert_eq!(eval_expr(binary(BinaryOp::Or, str("x"), ident("boom"))), Value::str("x"));
    assert_eq!(eval_expr(binary(BinaryOp::Or, nil(), int(2))), Value::Int(2));
    assert_eq!(eval_expr(not(str(""))), Value::Bool(true));
}

#[test]
fn coalesce_covers_nil_and_errors() {
    assert_eq!(eval_expr(binary(BinaryOp::Coalesce, nil(), int(2))), Value::Int(2));
    assert_eq!(eval_expr(binary(BinaryOp::Coalesce, int(0), int(2))), Value::Int(0));
    let raising = binary(BinaryOp::Div, int(1), int(0));
    let caught = eval_expr(binary(BinaryOp::Coalesce, raising, ident("__err__")));
    assert!(caught.as_object().is_some_and(|err| err.contains("message")));
}

#[test]
fn is_tests_types_and_bases() {
    assert_eq!(eval_expr(binary(BinaryOp::Is, int(1), ident("Int"))), Value::Bool(true));
    assert_eq!(eval_expr(binary(BinaryOp::Is, int(1), ident("Str"))), Value::Bool(false));
    let err = failure(vec![expr_stmt(binary(BinaryOp::Is, int(1), int(2)))]);
    assert!(matches!(err.kind, EvalErrorKind::TypeMismatch { .. }));
}

#[test]
fn compare_chains_stop_at_the_first_false_link() {
    let chain = compare_chain(int(1), vec![(CompareOp::Lt, int(2)), (CompareOp::Le, int(2))]);
    assert_eq!(eval_expr(chain), Value::Bool(true));
    let chain = compare_chain(int(3), vec![(CompareOp::Lt, int(2)), (CompareOp::Lt, ident("boom"))]);
    assert_eq!(eval_expr(chain), Value::Bool(false));
}

#[test]
fn equality_is_structural() {
    assert_eq!(eval_expr(compare(int(1), CompareOp::Eq, float(1.0))), Value::Bool(true));
    assert_eq!(eval_expr(compare(str("a"), CompareOp::Ne, str("b"))), Value::Bool(true));
    assert_eq!(eval_expr(compare(bool(true), CompareOp::Eq, int(1))), Value::Bool(false));
    assert_eq!(
        eval_expr(compare(
            array(vec![int(1), array(vec![str("x")])]),
            CompareOp::Eq,
            array(vec![int(1), array(vec![str("x")])]),
        )),
        Value::Bool(true)
    );
    assert_eq!(
        eval(vec![
            let_("a", array(vec![int(1)])),
            expr_stmt(compare(ident("a"), CompareOp::Eq, ident("a"))),
        ]),
        Value::Bool(true)
    );
    assert_eq!(
        eval_expr(compare(array(vec![int(1), int(2)]), CompareOp::Lt, array(vec![int(1), int(3)]))),
        Value::Bool(true)
    );
}

proptest! {
    #[test]
    fn int_ops_match_wrapping_arithmetic(a in any::<i64>(), b in any::<i64>()) {
        let mut ctx = Context::new(runtime());
        let (l, r) = (Value::Int(a), Value::Int(b));
        prop_assert_eq!(ctx.binary_values(BinaryOp::Add, &l, &r).unwrap(), Value::Int(a.wrapping_add(b)));
        prop_assert_eq!(ctx.binary_values(BinaryOp::Sub, &l, &r).unwrap(), Value::Int(a.wrapping_sub(b)));
        prop_assert_eq!(ctx.binary_values(BinaryOp::Mul, &l, &r).unwrap(), Value::Int(a.wrapping_mul(b)));
        if b != 0 {
            prop_assert_eq!(ctx.binary_values(BinaryOp::Div, &l, &r).unwrap(), Value::Int(a.wrapping_div(b)));
        }
    }

    #[test]
    fn int_compare_matches_ord(a in any::<i64>(), b in any::<i64>()) {
        let mut ctx = Context::new(runtime());
        let (l, r) = (Value::Int(a), Value::Int(b));
        prop_assert_eq!(ctx.compare_op(CompareOp::Lt, &l, &r).unwrap(), a < b);
        prop_assert_eq!(ctx.compare_op(CompareOp::Ge, &l, &r).unwrap(), a >= b);
        prop_assert_eq!(ctx.compare_op(CompareOp::Eq, &l, &r).unwrap(), a == b);
        prop_assert_eq!(ctx.compare_op(CompareOp::Ne, &l, &r).unwrap(), a != b);
    }

    #[test]
    fn mixed_compare_is_antisymmetric(a in -1_000_000i64..1_000_000, b in -1.0e6f64..1.0e6) {
        let mut ctx = Context::new(runtime());
        let (l, r) = (Value::Int(a), Value::Float(b));
        let lt = ctx.compare_op(CompareOp::Lt, &l, &r).unwrap();
        let gt = ctx.compare_op(CompareOp::Gt, &r, &l).unwrap();
        prop_assert_eq!(lt, gt);
    }
}

struct Handle;

#[test]
fn debug_mode_names_host_types_in_operator_errors() {
    let handle = Value::host("Handle", Handle);
    let err = Context::new(runtime())
        .binary_values(BinaryOp::Sub, &handle, &Value::Int(1))
        .unwrap_err();
    assert!(err.notes.is_empty());

    let debug = crate::Runtime::builder()
        .config(crate::RuntimeConfig {
            debug: true,
            ..crate::RuntimeConfig::default()
        })
        .build();
    let err = Context::new(debug)
        .binary_values(BinaryOp::Sub, &handle, &Value::Int(1))
        .unwrap_err();
    assert_eq!(err.notes.len(), 1);
    assert!(err.notes[0].message.starts_with("host value Handle holds "));
    assert!(err.notes[0].message.ends_with("Handle"));
}

#[test]
fn comparing_a_bytes_value_with_itself_takes_no_lock() {
    let bytes = Value::bytes(b"abc".to_vec());
    let Value::Bytes(cell) = &bytes else {
        unreachable!()
    };
    let _held = cell.write();
    let result = Context::new(runtime()).compare_values(&bytes, &bytes).unwrap();
    assert!(result.is_equal());
}

#[test]
fn bignum_division_keeps_the_configured_precision() {
    let third = eval_expr(binary(BinaryOp::Div, bignum("1"), bignum("3")));
    let Value::BigNum(b) = &third else {
        panic!("expected a BigNum, got {third:?}")
    };
    assert_eq!(b.digits(), 308);
    assert!(third.to_string().starts_with("0.33333333333333333333"));

    assert_eq!(eval_expr(binary(BinaryOp::Div, bignum("6"), bignum("3"))).to_string(), "2");
    assert_eq!(eval_expr(binary(BinaryOp::Div, bignum("1000"), int(1))).to_string(), "1000");
    assert_eq!(eval_expr(binary(BinaryOp::Pow, bignum("2"), int(-2))), big("0.25"));

    let Value::BigNum(inv) = eval_expr(binary(BinaryOp::Pow, bignum("3"), int(-1))) else {
        panic!("expected a BigNum")
    };
    assert_eq!(inv.digits(), 308);
}

#[test]
fn oversized_repeats_raise_instead_of_allocating() {
    let err = failure(vec![expr_stmt(mul(array(vec![int(1), int(2)]), int(i64::MAX)))]);
    assert!(matches!(err.kind, EvalErrorKind::RepeatTooLarge { count: i64::MAX, .. }));
    assert!(!err.is_fatal());

    let err = failure(vec![expr_stmt(mul(str("ab"), int(i64::MAX / 2)))]);
    assert!(matches!(err.kind, EvalErrorKind::RepeatTooLarge { .. }));

    assert_eq!(eval_expr(mul(str("ab"), int(3))), Value::str("ababab"));
    assert_eq!(eval_expr(mul(str(""), int(i64::MAX))), Value::str(""));
    assert_eq!(
        eval_expr(mul(array(Vec::new()), int(i64::MAX))),
        Value::array(Vec::new())
    );
    assert_eq!(eval_expr(mul(str("ab"), int(-1))), Value::str(""));
}
