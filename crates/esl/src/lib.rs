// ESL - an embeddable scripting language
// Lua-derived surface syntax, an async tree-walking evaluator, and a host
// bridge for calling into the embedding application.

#[cfg(test)]
mod test;

pub mod esl_error;
pub mod esl_value;
pub mod extensions;
pub mod host;
pub mod interp;
pub mod lib_registry;
pub mod namespace;
pub mod parser;

pub use esl_error::{EslError, EslErrorKind, EslResult, EslRuntimeError, EslSyntaxError};
pub use esl_value::{EslFunction, EslTable, EslTableKey, EslValue, TableRef};
pub use host::{HostFunction, HostObject, HostObjectBuilder, IterStep, downcast_object};
pub use interp::{Interpreter, execute, execute_with_namespace};
pub use lib_registry::{ExtensionModule, ExtensionRegistry, create_standard_registry};
pub use namespace::Namespace;
