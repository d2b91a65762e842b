//! The async tree-walking evaluator.
//!
//! One [`Interpreter`] owns one script: its source, the lazily parsed
//! chunk, the root namespace and the per-run control state. Evaluation is
//! cooperative: the walker suspends exactly where it awaits a host
//! callable or the next element of an async host iterator.

mod exec_expr;
mod exec_stmt;

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use smol_str::SmolStr;

use crate::esl_error::{EslError, EslRuntimeError};
use crate::esl_value::EslValue;
use crate::lib_registry;
use crate::namespace::Namespace;
use crate::parser::ast::Chunk;
use crate::parser::parse_chunk;

pub struct Interpreter {
    code: String,
    chunk: RefCell<Option<Rc<Chunk>>>,
    namespace: Rc<Namespace>,
    debug: bool,

    // Per-run control flags and diagnostic stacks. The stacks are reset
    // at the start of every run; on the error path they are intentionally
    // left as-is so the failure report can render them.
    pub(crate) line_stack: RefCell<Vec<u32>>,
    pub(crate) call_stack: RefCell<Vec<(SmolStr, u32)>>,
    pub(crate) loop_stack: RefCell<Vec<u32>>,
    pub(crate) breaking: Cell<bool>,
    pub(crate) returning: Cell<bool>,
}

impl Interpreter {
    /// Create an interpreter over `code` with a fresh root namespace and
    /// the bundled extension modules loaded.
    pub fn new(code: impl Into<String>) -> Self {
        Self::with_namespace(code, Namespace::new())
    }

    /// Create an interpreter over `code` running against a host-provided
    /// root namespace. The bundled extension modules are loaded into it.
    pub fn with_namespace(code: impl Into<String>, namespace: Rc<Namespace>) -> Self {
        let interpreter = Interpreter {
            code: code.into(),
            chunk: RefCell::new(None),
            namespace,
            debug: false,
            line_stack: RefCell::new(Vec::new()),
            call_stack: RefCell::new(Vec::new()),
            loop_stack: RefCell::new(Vec::new()),
            breaking: Cell::new(false),
            returning: Cell::new(false),
        };
        lib_registry::create_standard_registry().load_all(&interpreter.namespace);
        interpreter
    }

    /// Enable debug reporting: failed runs additionally log the rendered
    /// script call stack and the offending source line.
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn namespace(&self) -> &Rc<Namespace> {
        &self.namespace
    }

    /// Bind additional host values into the root namespace.
    pub fn add_extensions<S, I>(&self, extensions: I)
    where
        S: Into<SmolStr>,
        I: IntoIterator<Item = (S, EslValue)>,
    {
        for (name, value) in extensions {
            self.namespace.set_var(&name.into(), value, false);
        }
    }

    /// Parse (on first call) and evaluate the script. Returns the value
    /// produced by a top-level `return`, else `Nil`.
    pub async fn run(&self) -> Result<EslValue, EslError> {
        let chunk = {
            let mut slot = self.chunk.borrow_mut();
            if slot.is_none() {
                *slot = Some(Rc::new(parse_chunk(&self.code)?));
            }
            slot.as_ref().unwrap().clone()
        };

        self.line_stack.borrow_mut().clear();
        self.call_stack.borrow_mut().clear();
        self.loop_stack.borrow_mut().clear();
        self.breaking.set(false);
        self.returning.set(false);

        match self.exec_block(&chunk.block, &self.namespace).await {
            Ok(value) => Ok(value),
            Err(err) => {
                self.report_failure(&err);
                Err(EslError::Runtime(err))
            }
        }
    }

    // ---- diagnostics ---------------------------------------------------

    #[inline]
    pub(crate) fn push_line(&self, lineno: u32) {
        self.line_stack.borrow_mut().push(lineno);
    }

    #[inline]
    pub(crate) fn pop_line(&self) {
        self.line_stack.borrow_mut().pop();
    }

    pub(crate) fn current_line(&self) -> u32 {
        self.line_stack.borrow().last().copied().unwrap_or(1)
    }

    /// Log a failed run. The error message is always reported; the
    /// rendered script call stack and the offending source line prefix
    /// are emitted only in debug mode.
    fn report_failure(&self, err: &EslRuntimeError) {
        log::error!("Error: {}", err.message());

        if !self.debug {
            return;
        }

        let lines: Vec<&str> = self.code.split('\n').collect();

        let mut parent: String = "<main>".into();
        for (fun, lineno) in self.call_stack.borrow().iter() {
            log::error!("... {} line {}: {}()", parent, lineno, fun);
            parent = fun.to_string();
        }

        if let Some(&lastline) = self.line_stack.borrow().last() {
            if lastline >= 1 && (lastline as usize) <= lines.len() {
                let line: String = lines[lastline as usize - 1].trim().chars().take(50).collect();
                log::error!("... {} line {}: {} ...", parent, lastline, line);
            } else {
                log::error!("... {} line {}: can't find source line", parent, lastline);
            }
        }

        log::debug!("error class: {}", err.kind());
    }
}

/// Parse and run `source` against a fresh namespace with the bundled
/// extensions loaded.
pub async fn execute(source: &str) -> Result<EslValue, EslError> {
    Interpreter::new(source).run().await
}

/// Parse and run `source` against a host-provided namespace.
pub async fn execute_with_namespace(
    source: &str,
    namespace: Rc<Namespace>,
) -> Result<EslValue, EslError> {
    Interpreter::with_namespace(source, namespace).run().await
}
