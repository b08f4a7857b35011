use super::*;
use pretty_assertions::assert_eq;

#[test]
fn base_truthiness() {
    let falsy = [
        Value::Undefined,
        Value::Nil,
        Value::Bool(false),
        Value::Int(0),
        Value::Float(0.0),
        Value::bignum(BigDecimal::from(0)),
        Value::str(""),
        Value::bytes(Vec::new()),
        Value::array(Vec::new()),
        Value::object(Vec::<(Name, Value)>::new()),
    ];
    for v in &falsy {
        assert!(!v.is_true(), "{v:?} should be falsy");
    }

    let truthy = [
        Value::Bool(true),
        Value::Int(-1),
        Value::Float(0.5),
        Value::str("0"),
        Value::bytes(vec![0]),
        Value::array(vec![Value::Nil]),
        Value::object([("a", Value::Nil)]),
        Value::Type(Arc::clone(&builtin_types().int)),
    ];
    for v in &truthy {
        assert!(v.is_true(), "{v:?} should be truthy");
    }
}

#[test]
fn display_formats() {
    assert_eq!(Value::Undefined.to_string(), "undefined");
    assert_eq!(Value::Nil.to_string(), "nil");
    assert_eq!(Value::Float(f64::INFINITY).to_string(), "+Inf");
    assert_eq!(Value::Float(f64::NEG_INFINITY).to_string(), "-Inf");
    assert_eq!(Value::Float(f64::NAN).to_string(), "NaN");
    assert_eq!(Value::Float(1.5).to_string(), "1.5");
    assert_eq!(Value::bytes(b"a\"\x01".to_vec()).to_string(), r#"b"a\"\x01""#);
    assert_eq!(
        Value::array(vec![Value::Int(1), Value::str("x"), Value::Nil]).to_string(),
        "[1, x, nil]"
    );
    assert_eq!(
        Value::object([("a", Value::Int(1)), ("b", Value::Bool(true))]).to_string(),
        "{a: 1, b: true}"
    );
    assert_eq!(
        Value::Type(Arc::clone(&builtin_types().str)).to_string(),
        "<type Str>"
    );
}

#[test]
fn ordered_members_keep_first_slot() {
    let mut members = OrderedMembers::new();
    members.set(Name::from("b"), Value::Int(1));
    members.set(Name::from("a"), Value::Int(2));
    members.set(Name::from("c"), Value::Int(3));
    members.set(Name::from("b"), Value::Int(4));

    let keys: Vec<_> = members.keys().map(|k| k.to_string()).collect();
    assert_eq!(keys, ["b", "a", "c"]);
    assert_eq!(members.get("b"), Some(&Value::Int(4)));

    members.set(Name::from("a"), Value::Undefined);
    assert!(!members.contains("a"));
    assert_eq!(members.get("c"), Some(&Value::Int(3)));
    let keys: Vec<_> = members.keys().map(|k| k.to_string()).collect();
    assert_eq!(keys, ["b", "c"]);
}

#[test]
fn type_of_uses_builtin_ids() {
    assert_eq!(Value::Int(1).type_of().id(), type_id::INT);
    assert_eq!(Value::str("s").type_of().id(), type_id::STR);
    assert_eq!(Value::array(Vec::new()).type_of().id(), type_id::ARRAY);
    assert_eq!(Value::Nil.type_of().id(), type_id::NIL);
    assert_eq!(&*Value::Float(1.0).type_name(), "Float");
}

#[test]
fn class_ids_are_fresh_and_subtyping_follows_bases() {
    let a = TypeDef::new_class("A", Vec::new());
    let b = TypeDef::new_class("B", vec![Arc::clone(&a)]);
    assert!(a.id() > type_id::FIRST_USER);
    assert_ne!(a.id(), b.id());

    assert!(b.is_sub_of(&a));
    assert!(b.is_sub_of(&builtin_types().object));
    assert!(!a.is_sub_of(&b));
}

#[test]
fn member_lookup_is_depth_first() {
    let left = TypeDef::new_class("Left", Vec::new());
    let right = TypeDef::new_class("Right", Vec::new());
    left.set_member("who", Value::str("left"));
    right.set_member("who", Value::str("right"));
    right.set_member("only", Value::Int(1));

    let child = TypeDef::new_class("Child", vec![left, right]);
    assert_eq!(child.find_member("who"), Some(Value::str("left")));
    assert_eq!(child.find_member("only"), Some(Value::Int(1)));
    assert_eq!(child.find_member("missing"), None);
}

#[test]
fn super_view_shares_state() {
    let base = TypeDef::new_class("Base", Vec::new());
    let derived = TypeDef::new_class("Derived", vec![Arc::clone(&base)]);
    let obj = Object::new(Arc::clone(&derived));
    obj.set("x", Value::Int(1));

    let view = obj.super_view(&derived);
    assert!(view.ty().is_super_view());
    assert!(view.same_instance(&obj));
    view.set("x", Value::Int(2));
    assert_eq!(obj.get("x"), Some(Value::Int(2)));
    assert!(Arc::ptr_eq(&view.real_this(), &obj));
}

#[test]
fn shared_kinds_alias() {
    let a = Value::array(vec![Value::Int(1)]);
    let b = a.clone();
    if let Value::Array(cell) = &a {
        cell.write().push(Value::Int(2));
    }
    assert_eq!(b.len(), Some(2));
    assert_eq!(a, b);
}

#[test]
fn structural_equality() {
    assert_eq!(Value::object([("k", Value::Int(1))]), Value::object([("k", Value::Int(1))]));
    assert_ne!(Value::Int(1), Value::Float(1.0));
    assert_eq!(Value::str("é").len(), Some(1));
}
