// Error taxonomy at the embedding boundary.
//
// Script failures split into two families: syntax errors produced while
// turning source text into an AST, and runtime errors produced while the
// evaluator walks it. `EslError` is the umbrella the host sees.

use thiserror::Error;

pub type EslResult<T> = Result<T, EslRuntimeError>;

/// Top-level error returned from [`Interpreter::run`](crate::Interpreter::run).
#[derive(Debug, Clone, Error)]
pub enum EslError {
    #[error(transparent)]
    Syntax(#[from] EslSyntaxError),
    #[error(transparent)]
    Runtime(#[from] EslRuntimeError),
}

/// Lexing or parsing failure, with the source line it was detected on.
#[derive(Debug, Clone, Error)]
pub enum EslSyntaxError {
    #[error("lex error at line {line}: {message}")]
    Lex { line: u32, message: String },
    #[error("parse error at line {line}, column {column} near `{near}'")]
    Parse {
        line: u32,
        column: u32,
        near: String,
    },
}

/// Classification of a runtime failure.
///
/// The evaluator dispatches on `Type` to fall back from item access to
/// attribute access; everything else is purely diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EslErrorKind {
    /// Undefined name where one was required (e.g. a function path root).
    Name,
    /// Operator or operation applied to an incompatible value class.
    Type,
    /// `_`-prefixed attribute or item key refused by the namespace facade.
    Access,
    /// Domain error: assignment count mismatch, arithmetic overflow.
    Value,
    /// Error raised from script code via `error(msg)` / `assert(...)`.
    Script,
    /// Run aborted by the host at a suspension point.
    Cancelled,
}

impl std::fmt::Display for EslErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            EslErrorKind::Name => "name error",
            EslErrorKind::Type => "type error",
            EslErrorKind::Access => "access error",
            EslErrorKind::Value => "value error",
            EslErrorKind::Script => "script error",
            EslErrorKind::Cancelled => "cancelled",
        };
        write!(f, "{}", name)
    }
}

/// A script execution failure: a kind plus the human-readable message.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct EslRuntimeError {
    pub kind: EslErrorKind,
    pub message: String,
}

impl EslRuntimeError {
    pub fn new(kind: EslErrorKind, message: impl Into<String>) -> Self {
        EslRuntimeError {
            kind,
            message: message.into(),
        }
    }

    pub fn name_error(message: impl Into<String>) -> Self {
        Self::new(EslErrorKind::Name, message)
    }

    pub fn type_error(message: impl Into<String>) -> Self {
        Self::new(EslErrorKind::Type, message)
    }

    pub fn access_error(message: impl Into<String>) -> Self {
        Self::new(EslErrorKind::Access, message)
    }

    pub fn value_error(message: impl Into<String>) -> Self {
        Self::new(EslErrorKind::Value, message)
    }

    pub fn script_error(message: impl Into<String>) -> Self {
        Self::new(EslErrorKind::Script, message)
    }

    pub fn cancelled() -> Self {
        Self::new(EslErrorKind::Cancelled, "run cancelled by host")
    }

    #[inline]
    pub fn kind(&self) -> EslErrorKind {
        self.kind
    }

    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Error for calling a value that is not callable; renders `Nil`
    /// specially so scripts see `nil is not callable`.
    pub fn not_callable(type_name: &str) -> Self {
        Self::type_error(format!("{} is not callable", type_name))
    }

    /// Error for indexing a value class with no item or attribute access.
    pub fn not_indexable(type_name: &str) -> Self {
        Self::type_error(format!("attempt to index a {} value", type_name))
    }
}
