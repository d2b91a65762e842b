use std::cell::RefCell;
use std::rc::Rc;

use smol_str::SmolStr;

use crate::parser::ast::FunctionBody;

use super::esl_value::EslValue;

/// A function defined in script code: parameter list, body AST and, for
/// `function t:m()` declarations, the receiver captured at declaration
/// time. A `:`-form call binds the receiver as the local `self`.
pub struct EslFunction {
    pub name: SmolStr,
    pub body: Rc<FunctionBody>,
    receiver: RefCell<EslValue>,
}

impl EslFunction {
    pub fn new(name: impl Into<SmolStr>, body: Rc<FunctionBody>) -> Self {
        EslFunction {
            name: name.into(),
            body,
            receiver: RefCell::new(EslValue::Nil),
        }
    }

    pub fn params(&self) -> &[SmolStr] {
        &self.body.params
    }

    pub fn bind_receiver(&self, receiver: EslValue) {
        *self.receiver.borrow_mut() = receiver;
    }

    pub fn receiver(&self) -> EslValue {
        self.receiver.borrow().clone()
    }
}
