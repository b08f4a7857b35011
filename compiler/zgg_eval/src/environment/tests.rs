use super::*;
use pretty_assertions::assert_eq;

#[test]
fn define_lookup() {
    let scope = SharedScope::new_root();
    assert_eq!(scope.define(Name::from("x"), Value::Int(42)), Ok(()));
    assert_eq!(scope.lookup("x"), Some(Value::Int(42)));
    assert_eq!(scope.lookup("y"), None);
}

#[test]
fn redefinition_in_same_scope_fails() {
    let scope = SharedScope::new_root();
    assert_eq!(scope.define(Name::from("x"), Value::Int(1)), Ok(()));
    assert_eq!(
        scope.define(Name::from("x"), Value::Int(2)),
        Err(BindError::Redefined)
    );
    scope.force_define(Name::from("x"), Value::Int(3));
    assert_eq!(scope.lookup("x"), Some(Value::Int(3)));
}

#[test]
fn child_shadows_parent() {
    let parent = SharedScope::new_root();
    parent.force_define(Name::from("x"), Value::Int(1));

    let child = SharedScope::child(&parent);
    assert_eq!(child.lookup("x"), Some(Value::Int(1)));
    assert_eq!(child.define(Name::from("x"), Value::Int(2)), Ok(()));
    assert_eq!(child.lookup("x"), Some(Value::Int(2)));
    assert_eq!(parent.lookup("x"), Some(Value::Int(1)));
}

#[test]
fn assign_walks_outward() {
    let parent = SharedScope::new_root();
    parent.force_define(Name::from("x"), Value::Int(1));
    let child = SharedScope::child(&parent);

    assert_eq!(child.assign("x", Value::Int(5)), Ok(()));
    assert_eq!(parent.lookup("x"), Some(Value::Int(5)));
    assert_eq!(child.read().len(), 0);

    assert_eq!(child.assign("missing", Value::Nil), Err(BindError::Undefined));
}

#[test]
fn placeholder_is_never_bound() {
    let scope = SharedScope::new_root();
    assert_eq!(scope.define(Name::from("_"), Value::Int(1)), Ok(()));
    scope.force_define(Name::from("_"), Value::Int(1));
    assert_eq!(scope.lookup("_"), None);
    assert!(scope.read().is_empty());
}

#[test]
fn clones_share_bindings() {
    let scope = SharedScope::new_root();
    let alias = scope.clone();
    alias.force_define(Name::from("v"), Value::str("shared"));
    assert!(alias.ptr_eq(&scope));
    assert_eq!(scope.lookup("v"), Some(Value::str("shared")));
}
