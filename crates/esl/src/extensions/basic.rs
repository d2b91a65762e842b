// Basic library
// Implements the iteration protocol entry points plus error/assert,
// registered directly into the root namespace.

use std::any::Any;
use std::cell::Cell;
use std::rc::Rc;

use crate::esl_error::{EslResult, EslRuntimeError};
use crate::esl_value::{EslValue, TableRef};
use crate::host::{HostFunction, HostObject, IterStep};
use crate::lib_registry::{ExtensionModule, GLOBAL_MODULE};

use super::arg;

pub fn create_basic_module() -> ExtensionModule {
    crate::ext_module!(GLOBAL_MODULE, {
        "next" => basic_next,
        "pairs" => basic_pairs,
        "ipairs" => basic_ipairs,
        "error" => basic_error,
        "assert" => basic_assert,
        "tostring" => basic_tostring,
        "type" => basic_type,
    })
}

/// next(t, key?) - one step of stateless enumeration: positional entries
/// in order, then keyed entries in insertion order.
fn basic_next(args: Vec<EslValue>) -> EslResult<EslValue> {
    let obj = arg(&args, 0);
    let key = arg(&args, 1);

    let pair = match &obj {
        EslValue::Table(t) => t.borrow().next(&key),
        EslValue::Object(o) => o.next_pair(&key)?,
        other => {
            return Err(EslRuntimeError::type_error(format!(
                "{} is not iterable",
                other.type_name()
            )));
        }
    };

    Ok(match pair {
        Some((key, value)) => EslValue::values(vec![key, value]),
        None => EslValue::Nil,
    })
}

/// pairs(t) - the `(fun, state, key)` triple driving generic for.
fn basic_pairs(args: Vec<EslValue>) -> EslResult<EslValue> {
    let target = arg(&args, 0);
    Ok(EslValue::values(vec![
        EslValue::Callable(HostFunction::sync("next", basic_next)),
        target,
        EslValue::Nil,
    ]))
}

/// ipairs(v) - a sequential iterator over positional values. Host objects
/// advertising an iterator capability are their own iterator; tables get
/// a cursor over the positional run.
fn basic_ipairs(args: Vec<EslValue>) -> EslResult<EslValue> {
    let target = arg(&args, 0);

    let iterator = match &target {
        EslValue::Table(t) => EslValue::Object(Rc::new(TableValuesIter {
            table: t.clone(),
            index: Cell::new(0),
        })),
        EslValue::Object(_) => target.clone(),
        other => {
            return Err(EslRuntimeError::type_error(format!(
                "{} is not iterable",
                other.type_name()
            )));
        }
    };

    Ok(EslValue::values(vec![iterator, target, EslValue::Int(0)]))
}

fn basic_error(args: Vec<EslValue>) -> EslResult<EslValue> {
    // An optional level argument is accepted and ignored.
    let message = arg(&args, 0);
    Err(EslRuntimeError::script_error(message.to_string()))
}

fn basic_assert(args: Vec<EslValue>) -> EslResult<EslValue> {
    let cond = arg(&args, 0);
    if cond.truthy() {
        return Ok(cond);
    }

    let message = arg(&args, 1);
    Err(EslRuntimeError::script_error(if message.is_nil() {
        "assertion failed!".to_string()
    } else {
        message.to_string()
    }))
}

fn basic_tostring(args: Vec<EslValue>) -> EslResult<EslValue> {
    Ok(EslValue::string(arg(&args, 0).to_string()))
}

fn basic_type(args: Vec<EslValue>) -> EslResult<EslValue> {
    let value = arg(&args, 0);
    Ok(EslValue::string(match &value {
        EslValue::Object(o) => o.type_name().to_string(),
        other => other.type_name().to_string(),
    }))
}

/// Cursor over a table's positional run, handed out by `ipairs`.
struct TableValuesIter {
    table: TableRef,
    index: Cell<usize>,
}

impl HostObject for TableValuesIter {
    fn type_name(&self) -> &str {
        "iterator"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn sync_next(&self) -> Option<EslResult<IterStep>> {
        let index = self.index.get();
        let table = self.table.borrow();
        Some(Ok(if index < table.len() {
            self.index.set(index + 1);
            IterStep::Value(table.positional()[index].clone())
        } else {
            IterStep::Done
        }))
    }
}
