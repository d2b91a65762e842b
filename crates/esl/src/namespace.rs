//! Chained scope frames and the attribute/item facade over host values.

use std::cell::RefCell;
use std::rc::Rc;

use ahash::AHashMap;
use smol_str::SmolStr;

use crate::esl_error::{EslResult, EslRuntimeError};
use crate::esl_value::EslValue;

/// One frame of the scope chain.
///
/// Writes follow the local-vs-inherited discipline: a write lands in this
/// frame when it is declared `local`, when the frame is the root, or when
/// the name is already bound here; otherwise it is delegated to the
/// parent. Reads walk the chain and default to `Nil`.
pub struct Namespace {
    vars: RefCell<AHashMap<SmolStr, EslValue>>,
    parent: Option<Rc<Namespace>>,
}

impl Namespace {
    /// A fresh root frame.
    pub fn new() -> Rc<Self> {
        Rc::new(Namespace {
            vars: RefCell::new(AHashMap::new()),
            parent: None,
        })
    }

    /// A root frame pre-populated with host bindings.
    pub fn with_vars<S, I>(vars: I) -> Rc<Self>
    where
        S: Into<SmolStr>,
        I: IntoIterator<Item = (S, EslValue)>,
    {
        let ns = Namespace::new();
        for (name, value) in vars {
            ns.set_var(&name.into(), value, false);
        }
        ns
    }

    pub fn with_parent(parent: Rc<Namespace>) -> Rc<Self> {
        Rc::new(Namespace {
            vars: RefCell::new(AHashMap::new()),
            parent: Some(parent),
        })
    }

    /// A child frame whose parent is this one; entering a block clones
    /// the current frame this way.
    pub fn child(self: &Rc<Self>) -> Rc<Namespace> {
        Namespace::with_parent(self.clone())
    }

    // ---- variables ----------------------------------------------------

    pub fn set_var(&self, name: &str, value: EslValue, local: bool) {
        if local || self.parent.is_none() || self.vars.borrow().contains_key(name) {
            self.vars.borrow_mut().insert(SmolStr::new(name), value);
        } else if let Some(parent) = &self.parent {
            parent.set_var(name, value, false);
        }
    }

    pub fn get_var(&self, name: &str) -> EslValue {
        if let Some(value) = self.vars.borrow().get(name) {
            return value.clone();
        }
        match &self.parent {
            Some(parent) => parent.get_var(name),
            None => EslValue::Nil,
        }
    }

    /// Remove the nearest binding of `name`, if any.
    pub fn del_var(&self, name: &str) {
        if self.vars.borrow_mut().remove(name).is_none() {
            if let Some(parent) = &self.parent {
                parent.del_var(name);
            }
        }
    }

    // ---- host object facade -------------------------------------------

    // Attribute and item keys beginning with `_` are refused; this is the
    // engine's only sandbox against reaching host internals.

    fn check_name(name: &str) -> EslResult<()> {
        if name.starts_with('_') {
            return Err(EslRuntimeError::access_error("access denied"));
        }
        Ok(())
    }

    fn check_key(key: &EslValue) -> EslResult<()> {
        if let EslValue::Str(s) = key {
            Self::check_name(s)?;
        }
        Ok(())
    }

    pub fn get_item(&self, obj: &EslValue, key: &EslValue) -> EslResult<EslValue> {
        Self::check_key(key)?;
        match obj {
            EslValue::Table(t) => Ok(t.borrow().get(key)),
            EslValue::Object(o) => o.get_item(key),
            other => Err(EslRuntimeError::not_indexable(other.type_name())),
        }
    }

    pub fn set_item(&self, obj: &EslValue, key: &EslValue, value: EslValue) -> EslResult<()> {
        Self::check_key(key)?;
        match obj {
            EslValue::Table(t) => t.borrow_mut().set(key, value),
            EslValue::Object(o) => o.set_item(key, value),
            other => Err(EslRuntimeError::not_indexable(other.type_name())),
        }
    }

    pub fn del_item(&self, obj: &EslValue, key: &EslValue) -> EslResult<()> {
        Self::check_key(key)?;
        match obj {
            EslValue::Table(t) => {
                t.borrow_mut().delete(key);
                Ok(())
            }
            EslValue::Object(o) => o.del_item(key),
            other => Err(EslRuntimeError::not_indexable(other.type_name())),
        }
    }

    pub fn has_item(&self, obj: &EslValue, key: &EslValue) -> EslResult<bool> {
        match obj {
            EslValue::Table(t) => Ok(t.borrow().contains(key)),
            EslValue::Object(o) => o.has_item(key),
            other => Err(EslRuntimeError::not_indexable(other.type_name())),
        }
    }

    pub fn get_attribute(&self, obj: &EslValue, name: &str) -> EslResult<EslValue> {
        Self::check_name(name)?;
        match obj {
            EslValue::Object(o) => o.get_attr(name),
            other => Err(EslRuntimeError::not_indexable(other.type_name())),
        }
    }

    pub fn set_attribute(&self, obj: &EslValue, name: &str, value: EslValue) -> EslResult<()> {
        Self::check_name(name)?;
        match obj {
            EslValue::Object(o) => o.set_attr(name, value),
            other => Err(EslRuntimeError::not_indexable(other.type_name())),
        }
    }

    pub fn del_attribute(&self, obj: &EslValue, name: &str) -> EslResult<()> {
        Self::check_name(name)?;
        match obj {
            EslValue::Object(o) => o.del_attr(name),
            other => Err(EslRuntimeError::not_indexable(other.type_name())),
        }
    }

    pub fn has_attribute(&self, obj: &EslValue, name: &str) -> bool {
        match obj {
            EslValue::Object(o) => o.has_attr(name),
            _ => false,
        }
    }
}
