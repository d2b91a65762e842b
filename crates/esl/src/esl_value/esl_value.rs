use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use smol_str::SmolStr;

use crate::host::{HostFunction, HostObject};

use super::esl_function::EslFunction;
use super::esl_table::EslTable;

pub type TableRef = Rc<RefCell<EslTable>>;

/// Runtime value: a closed sum bridging script and host worlds.
///
/// `Values` is engine-internal plumbing for multiple-value results
/// (multi-value `return`, the `(fun, state, key)` triple produced by
/// `pairs`); it is flattened wherever the language flattens sequences and
/// never becomes a table key.
#[derive(Clone)]
pub enum EslValue {
    Nil,
    Bool(bool),
    Int(i64),
    Str(SmolStr),
    Table(TableRef),
    Function(Rc<EslFunction>),
    Callable(HostFunction),
    Object(Rc<dyn HostObject>),
    Values(Rc<Vec<EslValue>>),
}

impl EslValue {
    pub fn table(table: EslTable) -> Self {
        EslValue::Table(Rc::new(RefCell::new(table)))
    }

    pub fn string(s: impl Into<SmolStr>) -> Self {
        EslValue::Str(s.into())
    }

    pub fn values(values: Vec<EslValue>) -> Self {
        EslValue::Values(Rc::new(values))
    }

    #[inline]
    pub fn is_nil(&self) -> bool {
        matches!(self, EslValue::Nil)
    }

    /// Only `nil` and `false` are falsy; zero, the empty string and empty
    /// tables are truthy.
    #[inline]
    pub fn truthy(&self) -> bool {
        !matches!(self, EslValue::Nil | EslValue::Bool(false))
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            EslValue::Nil => "nil",
            EslValue::Bool(_) => "boolean",
            EslValue::Int(_) => "number",
            EslValue::Str(_) => "string",
            EslValue::Table(_) => "table",
            EslValue::Function(_) | EslValue::Callable(_) => "function",
            EslValue::Object(_) => "object",
            EslValue::Values(_) => "values",
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            EslValue::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            EslValue::Str(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_table(&self) -> Option<&TableRef> {
        match self {
            EslValue::Table(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_function(&self) -> Option<&Rc<EslFunction>> {
        match self {
            EslValue::Function(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Rc<dyn HostObject>> {
        match self {
            EslValue::Object(o) => Some(o),
            _ => None,
        }
    }
}

impl Default for EslValue {
    fn default() -> Self {
        EslValue::Nil
    }
}

impl From<i64> for EslValue {
    fn from(n: i64) -> Self {
        EslValue::Int(n)
    }
}

impl From<bool> for EslValue {
    fn from(b: bool) -> Self {
        EslValue::Bool(b)
    }
}

impl From<&str> for EslValue {
    fn from(s: &str) -> Self {
        EslValue::Str(SmolStr::new(s))
    }
}

impl From<String> for EslValue {
    fn from(s: String) -> Self {
        EslValue::Str(SmolStr::new(s))
    }
}

impl From<SmolStr> for EslValue {
    fn from(s: SmolStr) -> Self {
        EslValue::Str(s)
    }
}

impl PartialEq for EslValue {
    /// `==` semantics: scalars by value, reference values by identity,
    /// multiple-value sequences element-wise.
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (EslValue::Nil, EslValue::Nil) => true,
            (EslValue::Bool(a), EslValue::Bool(b)) => a == b,
            (EslValue::Int(a), EslValue::Int(b)) => a == b,
            (EslValue::Str(a), EslValue::Str(b)) => a == b,
            (EslValue::Table(a), EslValue::Table(b)) => Rc::ptr_eq(a, b),
            (EslValue::Function(a), EslValue::Function(b)) => Rc::ptr_eq(a, b),
            (EslValue::Callable(a), EslValue::Callable(b)) => a.ptr_eq(b),
            (EslValue::Object(a), EslValue::Object(b)) => {
                Rc::as_ptr(a) as *const () == Rc::as_ptr(b) as *const ()
            }
            (EslValue::Values(a), EslValue::Values(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for EslValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EslValue::Nil => write!(f, "nil"),
            EslValue::Bool(b) => write!(f, "{}", if *b { "true" } else { "false" }),
            EslValue::Int(n) => {
                let mut buffer = itoa::Buffer::new();
                write!(f, "{}", buffer.format(*n))
            }
            EslValue::Str(s) => write!(f, "{}", s),
            EslValue::Table(t) => write!(f, "table: {:p}", Rc::as_ptr(t)),
            EslValue::Function(func) => write!(f, "function: {}", func.name),
            EslValue::Callable(func) => write!(f, "function: {}", func.name()),
            EslValue::Object(o) => write!(f, "{}: {:p}", o.type_name(), Rc::as_ptr(o)),
            EslValue::Values(values) => {
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", value)?;
                }
                Ok(())
            }
        }
    }
}

impl fmt::Debug for EslValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EslValue::Str(s) => write!(f, "{:?}", s),
            EslValue::Values(values) => f.debug_list().entries(values.iter()).finish(),
            other => write!(f, "{}", other),
        }
    }
}
