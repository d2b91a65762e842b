// Table library
// Implements: insert, remove, concat

use crate::esl_error::{EslResult, EslRuntimeError};
use crate::esl_value::EslValue;
use crate::lib_registry::ExtensionModule;

use super::{arg, opt_int_arg, table_arg};

pub fn create_table_module() -> ExtensionModule {
    crate::ext_module!("table", {
        "insert" => table_insert,
        "remove" => table_remove,
        "concat" => table_concat,
    })
}

/// table.insert(t, v) - append at `#t + 1`.
fn table_insert(args: Vec<EslValue>) -> EslResult<EslValue> {
    let table = table_arg(&args, 0, "insert")?;
    let value = arg(&args, 1);

    let key = EslValue::Int(table.borrow().len() as i64 + 1);
    table.borrow_mut().set(&key, value)?;
    Ok(EslValue::Nil)
}

/// table.remove(t, i?) - remove and return the positional element at `i`
/// (last by default), shifting the rest down.
fn table_remove(args: Vec<EslValue>) -> EslResult<EslValue> {
    let table = table_arg(&args, 0, "remove")?;
    let len = table.borrow().len() as i64;
    let index = opt_int_arg(&args, 1, "remove", len)?;
    Ok(table.borrow_mut().remove_at(index))
}

/// table.concat(t, sep?) - join the positional run of strings/numbers.
fn table_concat(args: Vec<EslValue>) -> EslResult<EslValue> {
    let table = table_arg(&args, 0, "concat")?;
    let sep = match args.get(1) {
        None | Some(EslValue::Nil) => "",
        Some(EslValue::Str(s)) => s.as_str(),
        Some(other) => {
            return Err(EslRuntimeError::type_error(format!(
                "bad argument #2 to 'concat' (string expected, got {})",
                other.type_name()
            )));
        }
    };

    let mut parts = Vec::new();
    for (index, value) in table.borrow().positional().iter().enumerate() {
        match value {
            EslValue::Str(_) | EslValue::Int(_) => parts.push(value.to_string()),
            other => {
                return Err(EslRuntimeError::type_error(format!(
                    "bad value at index {} in 'concat' (string expected, got {})",
                    index + 1,
                    other.type_name()
                )));
            }
        }
    }

    Ok(EslValue::string(parts.join(sep)))
}
