//! Bundled extension modules: plain data bound into the root namespace.
//!
//! These sit outside the engine core; scripts only meet them through the
//! ordinary host-callable protocol.

pub mod basic;
pub mod datetime;
pub mod list;
pub mod math;
pub mod table;

use crate::esl_error::{EslResult, EslRuntimeError};
use crate::esl_value::{EslValue, TableRef};

/// Positional argument, `Nil` when absent.
pub(crate) fn arg(args: &[EslValue], index: usize) -> EslValue {
    args.get(index).cloned().unwrap_or(EslValue::Nil)
}

pub(crate) fn int_arg(args: &[EslValue], index: usize, func: &str) -> EslResult<i64> {
    match args.get(index) {
        Some(EslValue::Int(n)) => Ok(*n),
        other => Err(EslRuntimeError::type_error(format!(
            "bad argument #{} to '{}' (number expected, got {})",
            index + 1,
            func,
            other.map(|v| v.type_name()).unwrap_or("no value")
        ))),
    }
}

pub(crate) fn opt_int_arg(
    args: &[EslValue],
    index: usize,
    func: &str,
    default: i64,
) -> EslResult<i64> {
    match args.get(index) {
        None | Some(EslValue::Nil) => Ok(default),
        _ => int_arg(args, index, func),
    }
}

pub(crate) fn str_arg<'a>(args: &'a [EslValue], index: usize, func: &str) -> EslResult<&'a str> {
    match args.get(index) {
        Some(EslValue::Str(s)) => Ok(s.as_str()),
        other => Err(EslRuntimeError::type_error(format!(
            "bad argument #{} to '{}' (string expected, got {})",
            index + 1,
            func,
            other.map(|v| v.type_name()).unwrap_or("no value")
        ))),
    }
}

pub(crate) fn table_arg<'a>(
    args: &'a [EslValue],
    index: usize,
    func: &str,
) -> EslResult<&'a TableRef> {
    match args.get(index) {
        Some(EslValue::Table(t)) => Ok(t),
        other => Err(EslRuntimeError::type_error(format!(
            "bad argument #{} to '{}' (table expected, got {})",
            index + 1,
            func,
            other.map(|v| v.type_name()).unwrap_or("no value")
        ))),
    }
}
