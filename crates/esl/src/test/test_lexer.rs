// Tests for the lexer: token classification, long brackets, line
// tracking and error reporting.

use crate::esl_error::EslSyntaxError;
use crate::parser::{EslTokenKind, tokenize};

use EslTokenKind::*;

/// Token kinds with trivia stripped.
fn kinds(code: &str) -> Vec<EslTokenKind> {
    tokenize(code)
        .expect("lex failed")
        .into_iter()
        .map(|t| t.kind)
        .filter(|k| !k.is_trivia())
        .collect()
}

#[test]
fn test_keywords_and_names() {
    assert_eq!(
        kinds("local function android() return nil end"),
        vec![TkLocal, TkFunction, TkName, TkLeftParen, TkRightParen, TkReturn, TkNil, TkEnd]
    );
    // Keyword override applies to exact matches only.
    assert_eq!(kinds("android and orchid or nothing"), vec![
        TkName, TkAnd, TkName, TkOr, TkName
    ]);
    assert!(TkLocal.is_keyword());
    assert!(!TkName.is_keyword());
}

#[test]
fn test_operators_longest_match() {
    assert_eq!(
        kinds("a = b == c <= d >= e ~= f < g > h"),
        vec![
            TkName, TkAssign, TkName, TkEq, TkName, TkLe, TkName, TkGe, TkName, TkNe, TkName,
            TkLt, TkName, TkGt, TkName
        ]
    );
    assert_eq!(kinds("a .. b . c ... "), vec![
        TkName, TkConcat, TkName, TkDot, TkName, TkDots
    ]);
    assert_eq!(kinds("# - + * / % ^"), vec![
        TkLen, TkMinus, TkPlus, TkMul, TkDiv, TkMod, TkPow
    ]);
}

#[test]
fn test_integer_literals_round_trip() {
    for n in [0i64, 1, 7, 42, 1024, 123456789, i64::MAX] {
        let source = n.to_string();
        let tokens = tokenize(&source).expect("lex failed");
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].kind, TkInt);
        let text = &source[tokens[0].range.start..tokens[0].range.end()];
        assert_eq!(text.parse::<i64>().unwrap(), n);
    }
}

#[test]
fn test_short_string() {
    assert_eq!(kinds(r#"s = "hello world""#), vec![TkName, TkAssign, TkString]);
    // No escape processing: a backslash is an ordinary character.
    assert_eq!(kinds(r#"s = "a\nb""#), vec![TkName, TkAssign, TkString]);
}

#[test]
fn test_long_bracket_string_levels() {
    assert_eq!(kinds("s = [[plain]]"), vec![TkName, TkAssign, TkLongString]);
    // A level-2 closer inside a level-1 string does not terminate it.
    assert_eq!(kinds("s = [=[ a ]] b ]=]"), vec![TkName, TkAssign, TkLongString]);
    assert_eq!(kinds("s = [==[ x ]=] y ]==]"), vec![TkName, TkAssign, TkLongString]);
}

#[test]
fn test_comments() {
    assert_eq!(kinds("a = 1 -- trailing comment"), vec![TkName, TkAssign, TkInt]);
    assert_eq!(kinds("--[[ block\ncomment ]] a = 1"), vec![TkName, TkAssign, TkInt]);
    assert_eq!(kinds("--[=[ a[b[\"c\"]] = 5 ]=] x = 2"), vec![
        TkName, TkAssign, TkInt
    ]);
    // `--[=` without the second bracket is a plain short comment.
    assert_eq!(kinds("--[= not a long comment\na = 1"), vec![TkName, TkAssign, TkInt]);
}

#[test]
fn test_line_tracking() {
    let tokens = tokenize("a = 1\nb = 2\r\nc = 3").expect("lex failed");
    let lines: Vec<u32> = tokens
        .iter()
        .filter(|t| t.kind == TkName)
        .map(|t| t.line)
        .collect();
    assert_eq!(lines, vec![1, 2, 3]);
}

#[test]
fn test_newlines_inside_long_bracket_bump_lines() {
    let tokens = tokenize("s = [[a\nb\nc]]\nd = 1").expect("lex failed");
    let d = tokens
        .iter()
        .find(|t| t.kind == TkName && t.line > 1)
        .expect("second name");
    assert_eq!(d.line, 4);
}

#[test]
fn test_lex_errors() {
    let err = tokenize("a = $").unwrap_err();
    assert!(matches!(err, EslSyntaxError::Lex { line: 1, .. }));

    let err = tokenize("a = \"unfinished").unwrap_err();
    assert!(matches!(err, EslSyntaxError::Lex { .. }));

    let err = tokenize("a = \"broken\nstring\"").unwrap_err();
    assert!(matches!(err, EslSyntaxError::Lex { line: 1, .. }));

    let err = tokenize("s = [=[ never closed ]]").unwrap_err();
    assert!(matches!(err, EslSyntaxError::Lex { .. }));

    let err = tokenize("a ~ b").unwrap_err();
    assert!(matches!(err, EslSyntaxError::Lex { .. }));

    let err = tokenize("line1\nline2 ?").unwrap_err();
    assert!(matches!(err, EslSyntaxError::Lex { line: 2, .. }));
}
