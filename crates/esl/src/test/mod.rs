mod test_extensions;
mod test_host;
mod test_lexer;
mod test_namespace;
mod test_table;

use crate::*;

/// Run a script with the bundled extensions and unwrap the result.
pub(crate) async fn eval_ok(code: &str) -> EslValue {
    execute(code).await.expect("script failed")
}

/// Run a script against a prepared namespace and unwrap the result.
pub(crate) async fn eval_ok_with(code: &str, ns: std::rc::Rc<Namespace>) -> EslValue {
    execute_with_namespace(code, ns)
        .await
        .expect("script failed")
}

/// Run a script, expecting a runtime failure; returns its kind.
pub(crate) async fn eval_err(code: &str) -> EslErrorKind {
    match execute(code).await {
        Err(EslError::Runtime(err)) => err.kind(),
        Err(EslError::Syntax(err)) => panic!("expected runtime error, got syntax error: {}", err),
        Ok(value) => panic!("expected error, got {:?}", value),
    }
}
