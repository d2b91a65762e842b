//! Host bridge: the contract between the engine and the embedding
//! application.
//!
//! The engine recognises three host capabilities: callables (sync or
//! async), attribute/item-accessible objects, and iterables (sync or
//! async). [`HostFunction`] wraps callables; [`HostObject`] is the trait
//! host values implement; [`HostObjectBuilder`] exposes fields of types
//! you don't control without hand-writing an impl.

use std::any::Any;
use std::cell::RefCell;
use std::collections::HashMap;
use std::future::Future;
use std::rc::Rc;

use futures::future::LocalBoxFuture;
use smol_str::SmolStr;

use crate::esl_error::{EslResult, EslRuntimeError};
use crate::esl_value::EslValue;

/// One step of host-driven iteration. `Done` is the end-of-iteration
/// sentinel.
pub enum IterStep {
    Value(EslValue),
    Done,
}

type SyncFn = dyn Fn(Vec<EslValue>) -> EslResult<EslValue>;
type AsyncFn = dyn Fn(Vec<EslValue>) -> LocalBoxFuture<'static, EslResult<EslValue>>;

#[derive(Clone)]
enum HostFnKind {
    Sync(Rc<SyncFn>),
    Async(Rc<AsyncFn>),
}

/// A host-supplied callable with a diagnostic name.
///
/// The evaluator awaits async callables at a suspension point; sync
/// callables complete immediately.
#[derive(Clone)]
pub struct HostFunction {
    name: SmolStr,
    kind: HostFnKind,
}

impl HostFunction {
    pub fn sync<F>(name: impl Into<SmolStr>, f: F) -> Self
    where
        F: Fn(Vec<EslValue>) -> EslResult<EslValue> + 'static,
    {
        HostFunction {
            name: name.into(),
            kind: HostFnKind::Sync(Rc::new(f)),
        }
    }

    pub fn async_fn<F, Fut>(name: impl Into<SmolStr>, f: F) -> Self
    where
        F: Fn(Vec<EslValue>) -> Fut + 'static,
        Fut: Future<Output = EslResult<EslValue>> + 'static,
    {
        let wrapped = move |args: Vec<EslValue>| -> LocalBoxFuture<'static, EslResult<EslValue>> {
            Box::pin(f(args))
        };
        HostFunction {
            name: name.into(),
            kind: HostFnKind::Async(Rc::new(wrapped)),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_async(&self) -> bool {
        matches!(self.kind, HostFnKind::Async(_))
    }

    pub async fn call(&self, args: Vec<EslValue>) -> EslResult<EslValue> {
        match &self.kind {
            HostFnKind::Sync(f) => f(args),
            HostFnKind::Async(f) => f(args).await,
        }
    }

    pub(crate) fn ptr_eq(&self, other: &HostFunction) -> bool {
        match (&self.kind, &other.kind) {
            (HostFnKind::Sync(a), HostFnKind::Sync(b)) => Rc::ptr_eq(a, b),
            (HostFnKind::Async(a), HostFnKind::Async(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

/// A host value visible to scripts.
///
/// Every method has a conservative default: attributes read as `Nil`,
/// writes and item access raise a type error (which is what lets the
/// evaluator fall back from item access to attribute access), and the
/// iteration capabilities are absent. Implementations override what the
/// value actually supports. Interior mutability is the implementor's
/// concern; all methods take `&self`.
pub trait HostObject {
    fn type_name(&self) -> &str {
        "object"
    }

    /// Downcast support for host callables that receive the object back
    /// as an argument.
    fn as_any(&self) -> &dyn Any;

    fn get_attr(&self, _name: &str) -> EslResult<EslValue> {
        Ok(EslValue::Nil)
    }

    fn set_attr(&self, name: &str, _value: EslValue) -> EslResult<()> {
        Err(EslRuntimeError::type_error(format!(
            "cannot set attribute `{}' on {}",
            name,
            self.type_name()
        )))
    }

    fn del_attr(&self, name: &str) -> EslResult<()> {
        Err(EslRuntimeError::type_error(format!(
            "cannot delete attribute `{}' on {}",
            name,
            self.type_name()
        )))
    }

    fn has_attr(&self, _name: &str) -> bool {
        false
    }

    fn get_item(&self, _key: &EslValue) -> EslResult<EslValue> {
        Err(EslRuntimeError::not_indexable(self.type_name()))
    }

    fn set_item(&self, _key: &EslValue, _value: EslValue) -> EslResult<()> {
        Err(EslRuntimeError::not_indexable(self.type_name()))
    }

    fn del_item(&self, _key: &EslValue) -> EslResult<()> {
        Err(EslRuntimeError::not_indexable(self.type_name()))
    }

    fn has_item(&self, _key: &EslValue) -> EslResult<bool> {
        Err(EslRuntimeError::not_indexable(self.type_name()))
    }

    /// Enumeration for the `next`/`pairs` protocol: given the previous
    /// key (`Nil` to start), produce the next `(key, value)` pair, or
    /// `None` when exhausted.
    fn next_pair(&self, _key: &EslValue) -> EslResult<Option<(EslValue, EslValue)>> {
        Err(EslRuntimeError::type_error(format!(
            "{} is not iterable",
            self.type_name()
        )))
    }

    /// Number of elements, when the value has a meaningful length.
    fn length(&self) -> EslResult<i64> {
        Err(EslRuntimeError::type_error(format!(
            "{} has no length",
            self.type_name()
        )))
    }

    /// Synchronous iterator capability. `None` means the capability is
    /// absent, not that iteration ended; the end is `IterStep::Done`.
    fn sync_next(&self) -> Option<EslResult<IterStep>> {
        None
    }

    /// Asynchronous iterator capability. Implementations must not advance
    /// their state before the returned future is polled.
    fn async_next(&self) -> Option<LocalBoxFuture<'_, EslResult<IterStep>>> {
        None
    }
}

/// Downcast a script value to a concrete host type.
pub fn downcast_object<T: 'static>(value: &EslValue) -> Option<&T> {
    match value {
        EslValue::Object(o) => o.as_any().downcast_ref::<T>(),
        _ => None,
    }
}

type Getter<T> = Box<dyn Fn(&T) -> EslValue>;
type Setter<T> = Box<dyn Fn(&mut T, EslValue) -> EslResult<()>>;

/// Builder-pattern wrapper exposing fields of an arbitrary Rust value as
/// host-object attributes.
///
/// ```ignore
/// let user = HostObjectBuilder::new(user)
///     .type_name("user")
///     .getter("name", |u| EslValue::string(u.name.clone()))
///     .getter("age", |u| EslValue::Int(u.age))
///     .setter("age", |u, v| { u.age = v.as_int().unwrap_or(0); Ok(()) })
///     .build();
/// namespace.set_var("user", EslValue::Object(user), false);
/// ```
pub struct HostObjectBuilder<T: 'static> {
    value: T,
    type_name: &'static str,
    getters: HashMap<String, Getter<T>>,
    setters: HashMap<String, Setter<T>>,
}

impl<T: 'static> HostObjectBuilder<T> {
    pub fn new(value: T) -> Self {
        HostObjectBuilder {
            value,
            type_name: "object",
            getters: HashMap::new(),
            setters: HashMap::new(),
        }
    }

    pub fn type_name(mut self, name: &'static str) -> Self {
        self.type_name = name;
        self
    }

    /// Register a readable field.
    pub fn getter<F>(mut self, name: &str, f: F) -> Self
    where
        F: Fn(&T) -> EslValue + 'static,
    {
        self.getters.insert(name.to_owned(), Box::new(f));
        self
    }

    /// Register a writable field. The setter receives the new value and
    /// may reject it with a runtime error.
    pub fn setter<F>(mut self, name: &str, f: F) -> Self
    where
        F: Fn(&mut T, EslValue) -> EslResult<()> + 'static,
    {
        self.setters.insert(name.to_owned(), Box::new(f));
        self
    }

    pub fn build(self) -> Rc<dyn HostObject> {
        Rc::new(BuiltObject {
            value: RefCell::new(self.value),
            type_name: self.type_name,
            getters: self.getters,
            setters: self.setters,
        })
    }
}

struct BuiltObject<T: 'static> {
    value: RefCell<T>,
    type_name: &'static str,
    getters: HashMap<String, Getter<T>>,
    setters: HashMap<String, Setter<T>>,
}

impl<T: 'static> HostObject for BuiltObject<T> {
    fn type_name(&self) -> &str {
        self.type_name
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn get_attr(&self, name: &str) -> EslResult<EslValue> {
        match self.getters.get(name) {
            Some(getter) => Ok(getter(&self.value.borrow())),
            None => Ok(EslValue::Nil),
        }
    }

    fn set_attr(&self, name: &str, value: EslValue) -> EslResult<()> {
        match self.setters.get(name) {
            Some(setter) => setter(&mut self.value.borrow_mut(), value),
            None => Err(EslRuntimeError::type_error(format!(
                "cannot set attribute `{}' on {}",
                name, self.type_name
            ))),
        }
    }

    fn has_attr(&self, name: &str) -> bool {
        self.getters.contains_key(name)
    }
}
