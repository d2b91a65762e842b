// Tests for the scope chain and the host-object facade.

use crate::esl_error::EslErrorKind;
use crate::esl_value::{EslTable, EslValue};
use crate::host::HostObjectBuilder;
use crate::namespace::Namespace;

#[test]
fn test_get_defaults_to_nil() {
    let ns = Namespace::new();
    assert_eq!(ns.get_var("missing"), EslValue::Nil);
}

#[test]
fn test_set_in_root() {
    let ns = Namespace::new();
    ns.set_var("a", EslValue::Int(1), false);
    assert_eq!(ns.get_var("a"), EslValue::Int(1));
}

#[test]
fn test_child_reads_through_chain() {
    let root = Namespace::new();
    root.set_var("a", EslValue::Int(1), false);
    let child = root.child();
    let grandchild = child.child();
    assert_eq!(grandchild.get_var("a"), EslValue::Int(1));
}

#[test]
fn test_plain_write_modifies_nearest_binding() {
    let root = Namespace::new();
    root.set_var("a", EslValue::Int(1), false);

    let child = root.child();
    child.set_var("a", EslValue::Int(2), false);

    // The write went to the root binding, not a new child slot.
    assert_eq!(root.get_var("a"), EslValue::Int(2));
}

#[test]
fn test_local_write_shadows() {
    let root = Namespace::new();
    root.set_var("a", EslValue::Int(1), false);

    let child = root.child();
    child.set_var("a", EslValue::Int(2), true);

    assert_eq!(child.get_var("a"), EslValue::Int(2));
    assert_eq!(root.get_var("a"), EslValue::Int(1));
}

#[test]
fn test_local_then_plain_write_stays_local() {
    let root = Namespace::new();
    let child = root.child();
    child.set_var("a", EslValue::Int(1), true);
    child.set_var("a", EslValue::Int(2), false);

    assert_eq!(child.get_var("a"), EslValue::Int(2));
    assert_eq!(root.get_var("a"), EslValue::Nil);
}

#[test]
fn test_del_var_removes_nearest_binding() {
    let root = Namespace::new();
    root.set_var("a", EslValue::Int(1), false);
    let child = root.child();
    child.set_var("a", EslValue::Int(2), true);

    child.del_var("a");
    assert_eq!(child.get_var("a"), EslValue::Int(1));

    child.del_var("a");
    assert_eq!(child.get_var("a"), EslValue::Nil);
}

#[test]
fn test_underscore_names_bind_as_variables() {
    // The denial rule applies at the facade, not at variable binding.
    let ns = Namespace::new();
    ns.set_var("_x", EslValue::Int(1), false);
    assert_eq!(ns.get_var("_x"), EslValue::Int(1));
}

#[test]
fn test_facade_denies_underscore_keys() {
    let ns = Namespace::new();
    let table = EslValue::table(EslTable::new());

    let err = ns.get_item(&table, &EslValue::string("_secret")).unwrap_err();
    assert_eq!(err.kind(), EslErrorKind::Access);

    let err = ns
        .set_item(&table, &EslValue::string("_secret"), EslValue::Int(1))
        .unwrap_err();
    assert_eq!(err.kind(), EslErrorKind::Access);

    let obj = EslValue::Object(HostObjectBuilder::new(()).build());
    let err = ns.get_attribute(&obj, "_internal").unwrap_err();
    assert_eq!(err.kind(), EslErrorKind::Access);
    let err = ns.del_attribute(&obj, "_internal").unwrap_err();
    assert_eq!(err.kind(), EslErrorKind::Access);
}

#[test]
fn test_item_access_on_scalar_is_a_type_error() {
    let ns = Namespace::new();
    let err = ns
        .get_item(&EslValue::Int(5), &EslValue::Int(1))
        .unwrap_err();
    assert_eq!(err.kind(), EslErrorKind::Type);

    let err = ns.get_attribute(&EslValue::Nil, "x").unwrap_err();
    assert_eq!(err.kind(), EslErrorKind::Type);
}

#[test]
fn test_item_facade_on_table() {
    let ns = Namespace::new();
    let table = EslValue::table(EslTable::new());

    ns.set_item(&table, &EslValue::Int(1), EslValue::Int(10))
        .unwrap();
    assert_eq!(
        ns.get_item(&table, &EslValue::Int(1)).unwrap(),
        EslValue::Int(10)
    );
    assert!(ns.has_item(&table, &EslValue::Int(1)).unwrap());

    ns.del_item(&table, &EslValue::Int(1)).unwrap();
    assert!(!ns.has_item(&table, &EslValue::Int(1)).unwrap());
}
