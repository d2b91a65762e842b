//! Expression evaluation and call dispatch.

use std::rc::Rc;

use async_recursion::async_recursion;

use crate::esl_error::{EslErrorKind, EslResult, EslRuntimeError};
use crate::esl_value::{EslFunction, EslTable, EslValue};
use crate::namespace::Namespace;
use crate::parser::ast::{ArithOp, CompareOp, Expr, ExprKind, FieldKey, LogicalOp, UnaryOp};

use super::Interpreter;

impl Interpreter {
    #[async_recursion(?Send)]
    pub(crate) async fn eval_expr(&self, expr: &Expr, ns: &Rc<Namespace>) -> EslResult<EslValue> {
        match &expr.kind {
            ExprKind::Nil => Ok(EslValue::Nil),
            ExprKind::True => Ok(EslValue::Bool(true)),
            ExprKind::False => Ok(EslValue::Bool(false)),
            ExprKind::Int(n) => Ok(EslValue::Int(*n)),
            ExprKind::Str(s) => Ok(EslValue::Str(s.clone())),

            // Reading an undefined name yields nil, not an error.
            ExprKind::Name(name) => Ok(ns.get_var(name)),

            ExprKind::Index { object, key } => {
                let obj = self.eval_expr(object, ns).await?;
                let key = self.eval_index_key(key, ns).await?;
                self.read_index(ns, &obj, &key)
            }

            ExprKind::Logical { op, lhs, rhs } => {
                let left = self.eval_expr(lhs, ns).await?;
                match op {
                    LogicalOp::And if !left.truthy() => Ok(left),
                    LogicalOp::Or if left.truthy() => Ok(left),
                    _ => self.eval_expr(rhs, ns).await,
                }
            }

            ExprKind::Compare { op, lhs, rhs } => {
                let left = self.eval_expr(lhs, ns).await?;
                let right = self.eval_expr(rhs, ns).await?;
                compare(*op, &left, &right)
            }

            ExprKind::Concat { lhs, rhs } => {
                let left = self.eval_expr(lhs, ns).await?;
                let right = self.eval_expr(rhs, ns).await?;
                concat(&left, &right)
            }

            ExprKind::Arith { op, lhs, rhs } => {
                let left = self.eval_expr(lhs, ns).await?;
                let right = self.eval_expr(rhs, ns).await?;
                arith(*op, &left, &right)
            }

            ExprKind::Unary { op, expr } => {
                let value = self.eval_expr(expr, ns).await?;
                unary(*op, &value)
            }

            ExprKind::Call {
                callee,
                method,
                args,
                colon,
            } => {
                self.push_line(expr.lineno);
                let result = self
                    .eval_call(callee, method.as_deref(), args, *colon, ns)
                    .await?;
                self.pop_line();
                Ok(result)
            }

            ExprKind::Function(body) => Ok(EslValue::Function(Rc::new(EslFunction::new(
                "<anonymous>",
                body.clone(),
            )))),

            ExprKind::Table(fields) => {
                let mut table = EslTable::new();
                let mut index: i64 = 1;
                for field in fields {
                    let key = match &field.key {
                        None => {
                            let key = EslValue::Int(index);
                            index += 1;
                            key
                        }
                        Some(FieldKey::Name(name)) => EslValue::Str(name.clone()),
                        Some(FieldKey::Expr(expr)) => self.eval_expr(expr, ns).await?,
                    };
                    let value = self.eval_expr(&field.value, ns).await?;
                    table.set(&key, value)?;
                }
                Ok(EslValue::table(table))
            }
        }
    }

    /// Read through the item facade, falling back to attribute access for
    /// string keys when the target's class has no item support.
    pub(crate) fn read_index(
        &self,
        ns: &Namespace,
        obj: &EslValue,
        key: &EslValue,
    ) -> EslResult<EslValue> {
        match ns.get_item(obj, key) {
            Ok(value) => Ok(value),
            Err(err) if err.kind() == EslErrorKind::Type => match key {
                EslValue::Str(name) => ns.get_attribute(obj, name),
                _ => Err(err),
            },
            Err(err) => Err(err),
        }
    }

    async fn eval_call(
        &self,
        callee: &Expr,
        method: Option<&str>,
        args: &[Expr],
        colon: bool,
        ns: &Rc<Namespace>,
    ) -> EslResult<EslValue> {
        let obj = self.eval_expr(callee, ns).await?;

        let func = match method {
            None => obj.clone(),
            Some(name) => match &obj {
                EslValue::Table(t) => t.borrow().get_str(name),
                EslValue::Object(_) => ns.get_attribute(&obj, name)?,
                other => return Err(EslRuntimeError::not_indexable(other.type_name())),
            },
        };

        // A `:`-call on a host object passes the receiver as the first
        // positional argument of the host method.
        let mut call_args = Vec::with_capacity(args.len() + 1);
        if colon && matches!(obj, EslValue::Object(_)) && matches!(func, EslValue::Callable(_)) {
            call_args.push(obj.clone());
        }
        for arg in args {
            call_args.push(self.eval_expr(arg, ns).await?);
        }

        match &func {
            EslValue::Function(f) => self.call_script_function(f, call_args, colon, ns).await,
            EslValue::Callable(f) => {
                let result = f.call(call_args).await?;
                self.returning.set(false);
                Ok(result)
            }
            other => Err(EslRuntimeError::not_callable(if other.is_nil() {
                "nil"
            } else {
                other.type_name()
            })),
        }
    }

    /// Call a script function: push the call stack, clone the caller's
    /// frame, bind `self` for method calls and the parameters
    /// positionally. Missing arguments bind to nil; surplus arguments are
    /// ignored. The `returning` flag is cleared when the call completes.
    pub(crate) async fn call_script_function(
        &self,
        func: &Rc<EslFunction>,
        args: Vec<EslValue>,
        bind_self: bool,
        ns: &Rc<Namespace>,
    ) -> EslResult<EslValue> {
        self.call_stack
            .borrow_mut()
            .push((func.name.clone(), self.current_line()));

        let frame = ns.child();
        if bind_self {
            frame.set_var("self", func.receiver(), true);
        }

        let mut args = args.into_iter();
        for param in func.params() {
            frame.set_var(param, args.next().unwrap_or(EslValue::Nil), true);
        }

        let result = self.exec_block(&func.body.body, &frame).await;
        self.returning.set(false);
        if result.is_ok() {
            self.call_stack.borrow_mut().pop();
        }
        result
    }

    /// Dispatch a call on an arbitrary value; used where the callee is
    /// not syntactically a call expression (the generic-for protocol).
    pub(crate) async fn call_value(
        &self,
        func: &EslValue,
        args: Vec<EslValue>,
        ns: &Rc<Namespace>,
    ) -> EslResult<EslValue> {
        match func {
            EslValue::Function(f) => self.call_script_function(f, args, false, ns).await,
            EslValue::Callable(f) => f.call(args).await,
            other => Err(EslRuntimeError::not_callable(if other.is_nil() {
                "nil"
            } else {
                other.type_name()
            })),
        }
    }
}

// ---- operators ---------------------------------------------------------

fn compare(op: CompareOp, left: &EslValue, right: &EslValue) -> EslResult<EslValue> {
    let result = match op {
        CompareOp::Eq => left == right,
        CompareOp::Ne => left != right,
        _ => {
            let ordering = match (left, right) {
                (EslValue::Int(a), EslValue::Int(b)) => a.cmp(b),
                (EslValue::Str(a), EslValue::Str(b)) => a.cmp(b),
                _ => {
                    return Err(EslRuntimeError::type_error(format!(
                        "attempt to compare {} with {}",
                        left.type_name(),
                        right.type_name()
                    )));
                }
            };
            match op {
                CompareOp::Lt => ordering.is_lt(),
                CompareOp::Gt => ordering.is_gt(),
                CompareOp::Le => ordering.is_le(),
                CompareOp::Ge => ordering.is_ge(),
                CompareOp::Eq | CompareOp::Ne => unreachable!(),
            }
        }
    };
    Ok(EslValue::Bool(result))
}

fn concat(left: &EslValue, right: &EslValue) -> EslResult<EslValue> {
    let mut out = String::new();
    push_concat(&mut out, left)?;
    push_concat(&mut out, right)?;
    Ok(EslValue::string(out))
}

fn push_concat(out: &mut String, value: &EslValue) -> EslResult<()> {
    match value {
        EslValue::Int(n) => {
            let mut buffer = itoa::Buffer::new();
            out.push_str(buffer.format(*n));
            Ok(())
        }
        EslValue::Str(s) => {
            out.push_str(s);
            Ok(())
        }
        other => Err(EslRuntimeError::type_error(format!(
            "attempt to concatenate a {} value",
            other.type_name()
        ))),
    }
}

fn arith(op: ArithOp, left: &EslValue, right: &EslValue) -> EslResult<EslValue> {
    // `+` doubles as string concatenation when both operands are strings.
    if let (EslValue::Str(a), EslValue::Str(b)) = (left, right) {
        if op == ArithOp::Add {
            return Ok(EslValue::string(format!("{}{}", a, b)));
        }
    }

    let (Some(a), Some(b)) = (left.as_int(), right.as_int()) else {
        let offender = if left.as_int().is_none() { left } else { right };
        return Err(EslRuntimeError::type_error(format!(
            "attempt to perform arithmetic on a {} value",
            offender.type_name()
        )));
    };

    let result = match op {
        ArithOp::Add => a.checked_add(b),
        ArithOp::Sub => a.checked_sub(b),
        ArithOp::Mul => a.checked_mul(b),
        ArithOp::Div => {
            if b == 0 {
                return Err(EslRuntimeError::type_error("attempt to divide by zero"));
            }
            // Integer division truncating toward zero.
            a.checked_div(b)
        }
        ArithOp::Mod => {
            if b == 0 {
                return Err(EslRuntimeError::type_error("attempt to take modulo zero"));
            }
            a.checked_rem(b)
        }
        ArithOp::Pow => {
            if b < 0 {
                return Err(EslRuntimeError::type_error(
                    "attempt to raise to a negative power",
                ));
            }
            u32::try_from(b)
                .ok()
                .and_then(|exp| a.checked_pow(exp))
        }
    };

    result
        .map(EslValue::Int)
        .ok_or_else(|| EslRuntimeError::value_error("integer overflow"))
}

fn unary(op: UnaryOp, value: &EslValue) -> EslResult<EslValue> {
    match op {
        UnaryOp::Not => Ok(EslValue::Bool(!value.truthy())),
        UnaryOp::Neg => match value.as_int() {
            Some(n) => n
                .checked_neg()
                .map(EslValue::Int)
                .ok_or_else(|| EslRuntimeError::value_error("integer overflow")),
            None => Err(EslRuntimeError::type_error(format!(
                "attempt to negate a {} value",
                value.type_name()
            ))),
        },
        UnaryOp::Len => match value {
            // Codepoint length, not byte length.
            EslValue::Str(s) => Ok(EslValue::Int(s.chars().count() as i64)),
            EslValue::Table(t) => Ok(EslValue::Int(t.borrow().len() as i64)),
            EslValue::Object(o) => o.length().map(EslValue::Int),
            other => Err(EslRuntimeError::type_error(format!(
                "attempt to get length of a {} value",
                other.type_name()
            ))),
        },
    }
}
