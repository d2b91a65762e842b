// Tests for the host bridge: attribute access, the `_`-prefix denial,
// item fallback and host method calls.

use std::any::Any;
use std::cell::Cell;
use std::rc::Rc;

use crate::esl_error::{EslErrorKind, EslResult};
use crate::esl_value::EslValue;
use crate::host::{HostFunction, HostObject, HostObjectBuilder, downcast_object};
use crate::namespace::Namespace;

use super::{eval_err, eval_ok_with};

fn int(n: i64) -> EslValue {
    EslValue::Int(n)
}

fn s(text: &str) -> EslValue {
    EslValue::string(text)
}

#[tokio::test]
async fn test_attribute_reads_via_dot() {
    let child = HostObjectBuilder::new(())
        .type_name("a")
        .getter("x", |_| EslValue::string("7"))
        .build();
    let parent = HostObjectBuilder::new(())
        .type_name("a")
        .getter("x", |_| EslValue::string("c"))
        .getter("s", move |_| EslValue::Object(child.clone()))
        .build();

    let ns = Namespace::new();
    ns.set_var("a", EslValue::Object(parent), false);

    assert_eq!(eval_ok_with("return a.x;", ns.clone()).await, s("c"));
    assert_eq!(eval_ok_with("return a.s.x;", ns.clone()).await, s("7"));
    // Missing attributes read as nil.
    assert_eq!(eval_ok_with("return a.zzz;", ns).await, EslValue::Nil);
}

#[tokio::test]
async fn test_underscore_attribute_is_denied() {
    let obj = HostObjectBuilder::new(())
        .getter("_x", |_| EslValue::string("denied"))
        .build();
    let ns = Namespace::new();
    ns.set_var("a", EslValue::Object(obj), false);

    match crate::execute_with_namespace("return a._x;", ns).await {
        Err(crate::EslError::Runtime(err)) => assert_eq!(err.kind(), EslErrorKind::Access),
        other => panic!("expected access error, got {:?}", other.map(|v| v.to_string())),
    }
}

#[tokio::test]
async fn test_attribute_assignment() {
    struct State {
        b: String,
    }

    let obj = HostObjectBuilder::new(State { b: "zzz".into() })
        .type_name("a")
        .getter("b", |state| EslValue::string(state.b.clone()))
        .setter("b", |state, value| {
            state.b = value.to_string();
            Ok(())
        })
        .build();
    let ns = Namespace::new();
    ns.set_var("a", EslValue::Object(obj), false);

    assert_eq!(
        eval_ok_with("a.b = \"d\"; return a.b", ns.clone()).await,
        s("d")
    );
    assert_eq!(
        eval_ok_with("z, a.b = \"z\", \"b\"; return z, a.b", ns).await,
        EslValue::values(vec![s("z"), s("b")])
    );
}

#[tokio::test]
async fn test_item_write_falls_back_to_attribute() {
    // The builder object has no item access, so `a["b"] = v` lands on
    // the attribute setter.
    let obj = HostObjectBuilder::new(Cell::new(0i64))
        .getter("b", |cell| EslValue::Int(cell.get()))
        .setter("b", |cell, value| {
            cell.set(value.as_int().unwrap_or(0));
            Ok(())
        })
        .build();
    let ns = Namespace::new();
    ns.set_var("a", EslValue::Object(obj), false);

    assert_eq!(
        eval_ok_with("a[\"b\"] = 42; return a.b", ns).await,
        int(42)
    );
}

#[tokio::test]
async fn test_setting_unknown_attribute_fails() {
    let ns = Namespace::new();
    ns.set_var(
        "a",
        EslValue::Object(HostObjectBuilder::new(()).build()),
        false,
    );
    match crate::execute_with_namespace("a.b = 1", ns).await {
        Err(crate::EslError::Runtime(err)) => assert_eq!(err.kind(), EslErrorKind::Type),
        other => panic!("expected type error, got {:?}", other.map(|v| v.to_string())),
    }
}

#[tokio::test]
async fn test_indexing_scalars_fails() {
    assert_eq!(eval_err("a = 5; return a.b").await, EslErrorKind::Type);
    assert_eq!(eval_err("return x.y").await, EslErrorKind::Type);
}

/// Host object with a method attribute. The method receives the receiver
/// as its first argument on `:`-calls.
struct Acc {
    value: i64,
}

impl HostObject for Acc {
    fn type_name(&self) -> &str {
        "acc"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn get_attr(&self, name: &str) -> EslResult<EslValue> {
        Ok(match name {
            "value" => EslValue::Int(self.value),
            "test" => EslValue::Callable(HostFunction::sync("test", |args| {
                let increment = args.get(1).and_then(|v| v.as_int()).unwrap_or(0);
                let value = match args.first() {
                    Some(EslValue::Table(t)) => {
                        t.borrow().get_str("value").as_int().unwrap_or(0)
                    }
                    Some(receiver) => downcast_object::<Acc>(receiver)
                        .map(|acc| acc.value)
                        .unwrap_or(0),
                    None => 0,
                };
                Ok(EslValue::Int(value + increment))
            })),
            _ => EslValue::Nil,
        })
    }

    fn has_attr(&self, name: &str) -> bool {
        matches!(name, "value" | "test")
    }
}

#[tokio::test]
async fn test_host_method_calls() {
    let ns = Namespace::new();
    ns.set_var("a", EslValue::Object(Rc::new(Acc { value: 1 })), false);

    // Colon call: the receiver rides along as the first argument.
    assert_eq!(eval_ok_with("return a:test(10)", ns.clone()).await, int(11));

    // Dot call: arguments pass through unchanged.
    let code = r#"
        b = {value=2}
        return a.test(b, 20)
    "#;
    assert_eq!(eval_ok_with(code, ns).await, int(22));
}

#[tokio::test]
async fn test_length_of_host_object() {
    struct Fixed;
    impl HostObject for Fixed {
        fn as_any(&self) -> &dyn Any {
            self
        }
        fn length(&self) -> EslResult<i64> {
            Ok(3)
        }
    }

    let ns = Namespace::new();
    ns.set_var("a", EslValue::Object(Rc::new(Fixed)), false);
    assert_eq!(eval_ok_with("return #a", ns).await, int(3));
}

#[tokio::test]
async fn test_host_object_identity_equality() {
    let obj: Rc<dyn HostObject> = Rc::new(Acc { value: 1 });
    let ns = Namespace::new();
    ns.set_var("a", EslValue::Object(obj.clone()), false);
    ns.set_var("b", EslValue::Object(obj), false);
    ns.set_var("c", EslValue::Object(Rc::new(Acc { value: 1 })), false);

    assert_eq!(
        eval_ok_with("return a == b", ns.clone()).await,
        EslValue::Bool(true)
    );
    assert_eq!(
        eval_ok_with("return a == c", ns).await,
        EslValue::Bool(false)
    );
}
