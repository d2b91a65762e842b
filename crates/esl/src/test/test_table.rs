// Tests for the dual-store table: positional run, keyed store,
// absorption, deletion shifts and the stateless `next` walk.

use crate::esl_value::{EslTable, EslValue};

fn int(n: i64) -> EslValue {
    EslValue::Int(n)
}

fn s(text: &str) -> EslValue {
    EslValue::string(text)
}

#[test]
fn test_set_get() {
    let mut t = EslTable::new();
    t.set(&int(1), int(1)).unwrap();
    t.set(&int(2), int(2)).unwrap();
    t.set(&s("zed"), s("alive")).unwrap();

    assert_eq!(t.get(&int(1)), int(1));
    assert_eq!(t.get(&int(2)), int(2));
    assert_eq!(t.get(&s("zed")), s("alive"));
    assert_eq!(t.get(&int(99)), EslValue::Nil);
    assert_eq!(t.get(&s("missing")), EslValue::Nil);

    assert_eq!(t.iter_pairs(), vec![
        (int(1), int(1)),
        (int(2), int(2)),
        (s("zed"), s("alive")),
    ]);
}

#[test]
fn test_gap_is_stashed_then_absorbed() {
    let mut t = EslTable::new();
    t.set(&int(1), int(1)).unwrap();
    t.set(&int(2), int(2)).unwrap();

    // Key 4 is not the next positional slot; it parks in the keyed store.
    t.set(&int(4), int(4)).unwrap();
    assert_eq!(t.len(), 2);

    // Key 3 closes the gap and the stashed 4 is absorbed.
    t.set(&int(3), int(3)).unwrap();
    assert_eq!(t.len(), 4);
    assert_eq!(t.get(&int(4)), int(4));
}

#[test]
fn test_length_invariant() {
    // After t = {1,2,3}; t[4]=4; t[6]=6 the border is 4; t[5]=5 extends
    // it to 6.
    let mut t = EslTable::new();
    for n in 1..=3 {
        t.set(&int(n), int(n)).unwrap();
    }
    t.set(&int(4), int(4)).unwrap();
    t.set(&int(6), int(6)).unwrap();
    assert_eq!(t.len(), 4);

    t.set(&int(5), int(5)).unwrap();
    assert_eq!(t.len(), 6);
}

#[test]
fn test_nil_deletes_and_shifts() {
    let mut t = EslTable::new();
    for n in 1..=4 {
        t.set(&int(n), int(n * 10)).unwrap();
    }

    t.set(&int(2), EslValue::Nil).unwrap();
    assert_eq!(t.len(), 3);
    assert_eq!(t.get(&int(2)), int(30));
    assert_eq!(t.get(&int(3)), int(40));

    t.set(&s("k"), int(1)).unwrap();
    t.set(&s("k"), EslValue::Nil).unwrap();
    assert!(!t.contains(&s("k")));
}

#[test]
fn test_invalid_key_class() {
    let mut t = EslTable::new();
    assert!(t.set(&EslValue::Bool(true), int(1)).is_err());
    assert_eq!(t.get(&EslValue::Bool(true)), EslValue::Nil);
}

#[test]
fn test_next_walks_positional_then_keyed() {
    let mut t = EslTable::new();
    t.set(&int(1), int(10)).unwrap();
    t.set(&int(2), int(20)).unwrap();
    t.set(&int(3), int(30)).unwrap();
    t.set(&s("a"), int(1)).unwrap();
    t.set(&s("b"), int(2)).unwrap();

    let mut walked = Vec::new();
    let mut key = EslValue::Nil;
    while let Some((k, v)) = t.next(&key) {
        walked.push((k.clone(), v));
        key = k;
    }

    assert_eq!(walked, t.iter_pairs());
    assert_eq!(walked[0], (int(1), int(10)));
    assert_eq!(walked[3], (s("a"), int(1)));
    assert_eq!(walked[4], (s("b"), int(2)));
}

#[test]
fn test_next_on_empty_table() {
    let t = EslTable::new();
    assert_eq!(t.next(&EslValue::Nil), None);
}

#[test]
fn test_keyed_store_keeps_insertion_order() {
    let mut t = EslTable::new();
    t.set(&s("z"), int(1)).unwrap();
    t.set(&s("a"), int(2)).unwrap();
    t.set(&s("m"), int(3)).unwrap();
    // Overwriting does not move the entry.
    t.set(&s("a"), int(4)).unwrap();

    let keys: Vec<EslValue> = t.iter_pairs().into_iter().map(|(k, _)| k).collect();
    assert_eq!(keys, vec![s("z"), s("a"), s("m")]);
}

#[test]
fn test_non_positive_integer_keys_stay_keyed() {
    let mut t = EslTable::new();
    t.set(&int(0), int(1)).unwrap();
    t.set(&int(-5), int(2)).unwrap();
    assert_eq!(t.len(), 0);
    assert_eq!(t.get(&int(0)), int(1));
    assert_eq!(t.get(&int(-5)), int(2));
}

#[test]
fn test_remove_at() {
    let mut t = EslTable::new();
    for n in 1..=3 {
        t.set(&int(n), int(n)).unwrap();
    }
    assert_eq!(t.remove_at(2), int(2));
    assert_eq!(t.len(), 2);
    assert_eq!(t.remove_at(10), EslValue::Nil);
}
