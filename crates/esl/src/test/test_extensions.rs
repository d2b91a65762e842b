// Tests for the bundled extension modules.

use crate::esl_error::EslErrorKind;
use crate::esl_value::EslValue;

use super::{eval_err, eval_ok, eval_ok_with};

fn int(n: i64) -> EslValue {
    EslValue::Int(n)
}

fn s(text: &str) -> EslValue {
    EslValue::string(text)
}

#[tokio::test]
async fn test_pairs_enumeration_order() {
    // Positional entries first, keyed entries in insertion order.
    let code = r#"
        t = {10, 20, 30, a = 1, b = 2}
        out = ""
        for k, v in pairs(t) do
            out = out .. k .. "=" .. v .. ";"
        end
        return out
    "#;
    assert_eq!(eval_ok(code).await, s("1=10;2=20;3=30;a=1;b=2;"));
}

#[tokio::test]
async fn test_next() {
    let code = r#"
        t = {5, 6}
        k, v = 0, 0
        r = next(t)
        return r
    "#;
    assert_eq!(
        eval_ok(code).await,
        EslValue::values(vec![int(1), int(5)])
    );

    assert_eq!(eval_ok("return next({}, nil)").await, EslValue::Nil);
    assert_eq!(eval_err("return next(5)").await, EslErrorKind::Type);
}

#[tokio::test]
async fn test_ipairs_over_table() {
    let code = r#"
        sum = 0
        for _, v in ipairs({7, 8, 9, x = 100}) do
            sum = sum + v
        end
        return sum
    "#;
    // Only the positional run is visited.
    assert_eq!(eval_ok(code).await, int(24));
}

#[tokio::test]
async fn test_error_raises() {
    match crate::execute("error(\"boom\")").await {
        Err(crate::EslError::Runtime(err)) => {
            assert_eq!(err.kind(), EslErrorKind::Script);
            assert_eq!(err.message(), "boom");
        }
        other => panic!("expected script error, got {:?}", other.map(|v| v.to_string())),
    }
}

#[tokio::test]
async fn test_assert() {
    assert_eq!(eval_ok("return assert(41 + 1, \"unused\")").await, int(42));
    assert_eq!(
        eval_err("assert(1 == 2, \"mismatch\")").await,
        EslErrorKind::Script
    );
    assert_eq!(eval_err("assert(nil)").await, EslErrorKind::Script);
    // Zero is truthy, so the assertion holds.
    assert_eq!(eval_ok("return assert(0)").await, int(0));
}

#[tokio::test]
async fn test_tostring_and_type() {
    assert_eq!(eval_ok("return tostring(123)").await, s("123"));
    assert_eq!(eval_ok("return tostring(nil)").await, s("nil"));
    assert_eq!(eval_ok("return tostring(true)").await, s("true"));
    assert_eq!(eval_ok("return type(nil)").await, s("nil"));
    assert_eq!(eval_ok("return type(42)").await, s("number"));
    assert_eq!(eval_ok("return type(\"x\")").await, s("string"));
    assert_eq!(eval_ok("return type({})").await, s("table"));
    assert_eq!(eval_ok("return type(pairs)").await, s("function"));
}

#[tokio::test]
async fn test_table_insert() {
    let code = r#"
        t = {1, 2}
        table.insert(t, 3)
        table.insert(t, 4)
        return #t
    "#;
    assert_eq!(eval_ok(code).await, int(4));

    let code = r#"
        t = {}
        table.insert(t, "only")
        return t[1]
    "#;
    assert_eq!(eval_ok(code).await, s("only"));
}

#[tokio::test]
async fn test_table_remove() {
    let code = r#"
        t = {1, 2, 3}
        removed = table.remove(t, 2)
        return removed, #t, t[2]
    "#;
    assert_eq!(
        eval_ok(code).await,
        EslValue::values(vec![int(2), int(2), int(3)])
    );

    // Defaults to the last element.
    assert_eq!(eval_ok("t = {1, 2, 3}; return table.remove(t)").await, int(3));
}

#[tokio::test]
async fn test_table_concat() {
    assert_eq!(
        eval_ok(r#"return table.concat({"a", "b", "c"}, "-")"#).await,
        s("a-b-c")
    );
    assert_eq!(eval_ok("return table.concat({1, 2, 3})").await, s("123"));
    assert_eq!(
        eval_err("return table.concat({{}, 2})").await,
        EslErrorKind::Type
    );
}

#[tokio::test]
async fn test_math_module() {
    assert_eq!(eval_ok("return math.round(7)").await, int(7));
    assert_eq!(eval_ok("return math.abs(0 - 9)").await, int(9));
    assert_eq!(eval_ok("return math.max(3, 8)").await, int(8));
    assert_eq!(eval_ok("return math.min(3, 8)").await, int(3));
    assert_eq!(eval_err("return math.round(\"x\")").await, EslErrorKind::Type);
}

#[tokio::test]
async fn test_list_module() {
    let code = r#"
        l = list.new({1, 2, 3})
        list.append(l, 4)
        return list.len(l), l[4]
    "#;
    assert_eq!(
        eval_ok(code).await,
        EslValue::values(vec![int(4), int(4)])
    );

    // Lists enumerate through pairs and iterate through ipairs.
    let code = r#"
        l = list.new({1, 2, 3, 4, 5})
        result = 0
        for k, v in pairs(l) do
            result = result + v
        end
        return result
    "#;
    assert_eq!(eval_ok(code).await, int(15));

    let code = r#"
        l = list.new({2, 4, 6})
        result = 0
        for _, v in ipairs(l) do
            result = result + v
        end
        return result
    "#;
    assert_eq!(eval_ok(code).await, int(12));

    // `#` works through the host length capability.
    assert_eq!(eval_ok("return #list.new({9, 9})").await, int(2));

    // Keyed table entries are carried over by value.
    assert_eq!(
        eval_ok("l = list.new({1, x = 10}); return l[2]").await,
        int(10)
    );
}

#[tokio::test]
async fn test_list_item_writes() {
    let code = r#"
        l = list.new({1, 2, 3})
        l[2] = 20
        return l[2]
    "#;
    assert_eq!(eval_ok(code).await, int(20));

    assert_eq!(
        eval_err("l = list.new({1}); l[5] = 1").await,
        EslErrorKind::Value
    );
}

#[tokio::test]
async fn test_datetime_module() {
    let code = r#"
        dt = datetime.parse("2019-04-02 12:30:45", "%Y-%m-%d %H:%M:%S")
        return dt.year, dt.month, dt.day, dt.hour, dt.minute, dt.second
    "#;
    assert_eq!(
        eval_ok(code).await,
        EslValue::values(vec![int(2019), int(4), int(2), int(12), int(30), int(45)])
    );

    let code = r#"
        dt = datetime.parse("2019-04-02 12:30:45", "%Y-%m-%d %H:%M:%S")
        return datetime.strftime(dt, "%d.%m.%Y")
    "#;
    assert_eq!(eval_ok(code).await, s("02.04.2019"));

    assert_eq!(
        eval_err(r#"return datetime.parse("garbage", "%Y")"#).await,
        EslErrorKind::Value
    );
}

#[tokio::test]
async fn test_timedelta() {
    let code = r#"
        td = datetime.timedelta(1, 2, 30, 0)
        return td.hours, td.total_seconds
    "#;
    // One day plus 2:30:00.
    assert_eq!(
        eval_ok(code).await,
        EslValue::values(vec![int(26), int(95400)])
    );

    let code = r#"
        dt = datetime.parse("2019-04-02 00:00:00", "%Y-%m-%d %H:%M:%S")
        shifted = datetime.add(dt, datetime.timedelta(40, 0, 0, 0))
        return shifted.month, shifted.day
    "#;
    assert_eq!(
        eval_ok(code).await,
        EslValue::values(vec![int(5), int(12)])
    );
}

#[tokio::test]
async fn test_datetime_now_is_an_object() {
    assert_eq!(eval_ok("return type(datetime.now())").await, s("datetime"));
}

#[tokio::test]
async fn test_custom_extension_module() {
    let mut registry = crate::ExtensionRegistry::new();
    registry.register(crate::ext_module!("host", {
        "answer" => |_args| Ok(EslValue::Int(42)),
    }));

    let ns = crate::Namespace::new();
    registry.load_all(&ns);
    assert!(registry.get_module("host").is_some());

    assert_eq!(eval_ok_with("return host.answer()", ns).await, int(42));
}
