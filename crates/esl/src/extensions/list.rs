// List library: a host-object sequence with 1-based item access.
// Exists alongside tables so scripts can hand plain sequences back and
// forth with the host without the dual-store semantics.

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::esl_error::{EslResult, EslRuntimeError};
use crate::esl_value::EslValue;
use crate::host::{HostObject, IterStep, downcast_object};
use crate::lib_registry::ExtensionModule;

use super::arg;

pub fn create_list_module() -> ExtensionModule {
    crate::ext_module!("list", {
        "new" => list_new,
        "append" => list_append,
        "len" => list_len,
    })
}

pub struct EslList {
    items: RefCell<Vec<EslValue>>,
    // ipairs cursor; reset when iteration completes
    cursor: Cell<usize>,
}

impl EslList {
    pub fn new(items: Vec<EslValue>) -> Self {
        EslList {
            items: RefCell::new(items),
            cursor: Cell::new(0),
        }
    }

    pub fn push(&self, value: EslValue) {
        self.items.borrow_mut().push(value);
    }

    pub fn len(&self) -> usize {
        self.items.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.borrow().is_empty()
    }
}

impl HostObject for EslList {
    fn type_name(&self) -> &str {
        "list"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn get_item(&self, key: &EslValue) -> EslResult<EslValue> {
        match key.as_int() {
            Some(k) if k >= 1 && (k as usize) <= self.len() => {
                Ok(self.items.borrow()[(k - 1) as usize].clone())
            }
            Some(_) => Ok(EslValue::Nil),
            None => Err(EslRuntimeError::type_error(format!(
                "list indices must be numbers, got {}",
                key.type_name()
            ))),
        }
    }

    fn set_item(&self, key: &EslValue, value: EslValue) -> EslResult<()> {
        let Some(k) = key.as_int() else {
            return Err(EslRuntimeError::type_error(format!(
                "list indices must be numbers, got {}",
                key.type_name()
            )));
        };
        let len = self.len() as i64;
        if k >= 1 && k <= len {
            if value.is_nil() {
                self.items.borrow_mut().remove((k - 1) as usize);
            } else {
                self.items.borrow_mut()[(k - 1) as usize] = value;
            }
            Ok(())
        } else if k == len + 1 && !value.is_nil() {
            self.push(value);
            Ok(())
        } else {
            Err(EslRuntimeError::value_error("list index out of range"))
        }
    }

    fn del_item(&self, key: &EslValue) -> EslResult<()> {
        match key.as_int() {
            Some(k) if k >= 1 && (k as usize) <= self.len() => {
                self.items.borrow_mut().remove((k - 1) as usize);
                Ok(())
            }
            _ => Err(EslRuntimeError::value_error("list index out of range")),
        }
    }

    fn has_item(&self, key: &EslValue) -> EslResult<bool> {
        Ok(matches!(key.as_int(), Some(k) if k >= 1 && (k as usize) <= self.len()))
    }

    fn next_pair(&self, key: &EslValue) -> EslResult<Option<(EslValue, EslValue)>> {
        let next = match key {
            EslValue::Nil => 1,
            EslValue::Int(k) => k + 1,
            _ => return Ok(None),
        };
        if next >= 1 && (next as usize) <= self.len() {
            Ok(Some((
                EslValue::Int(next),
                self.items.borrow()[(next - 1) as usize].clone(),
            )))
        } else {
            Ok(None)
        }
    }

    fn length(&self) -> EslResult<i64> {
        Ok(self.len() as i64)
    }

    fn sync_next(&self) -> Option<EslResult<IterStep>> {
        let index = self.cursor.get();
        Some(Ok(if index < self.len() {
            self.cursor.set(index + 1);
            IterStep::Value(self.items.borrow()[index].clone())
        } else {
            self.cursor.set(0);
            IterStep::Done
        }))
    }
}

/// list.new(t?) - a fresh list, optionally seeded with a table's values
/// in iteration order.
fn list_new(args: Vec<EslValue>) -> EslResult<EslValue> {
    let items = match args.first() {
        None | Some(EslValue::Nil) => Vec::new(),
        Some(EslValue::Table(t)) => t
            .borrow()
            .iter_pairs()
            .into_iter()
            .map(|(_, value)| value)
            .collect(),
        Some(other) => {
            return Err(EslRuntimeError::type_error(format!(
                "bad argument #1 to 'new' (table expected, got {})",
                other.type_name()
            )));
        }
    };
    Ok(EslValue::Object(Rc::new(EslList::new(items))))
}

fn list_append(args: Vec<EslValue>) -> EslResult<EslValue> {
    let value = arg(&args, 1);
    match args.first().and_then(downcast_object::<EslList>) {
        Some(list) => {
            list.push(value);
            Ok(EslValue::Nil)
        }
        None => Err(EslRuntimeError::type_error(
            "bad argument #1 to 'append' (list expected)",
        )),
    }
}

fn list_len(args: Vec<EslValue>) -> EslResult<EslValue> {
    match args.first().and_then(downcast_object::<EslList>) {
        Some(list) => Ok(EslValue::Int(list.len() as i64)),
        None => Err(EslRuntimeError::type_error(
            "bad argument #1 to 'len' (list expected)",
        )),
    }
}
