//! Statement evaluation.

use std::rc::Rc;

use async_recursion::async_recursion;
use smol_str::SmolStr;

use crate::esl_error::{EslErrorKind, EslResult, EslRuntimeError};
use crate::esl_value::{EslFunction, EslValue};
use crate::host::IterStep;
use crate::namespace::Namespace;
use crate::parser::ast::{
    Block, ElseIf, Expr, FuncPath, IndexKey, Stat, StatKind, Target, TargetKind,
};

use super::Interpreter;

impl Interpreter {
    /// Run a block in a fresh child frame; stops early once a `break` or
    /// `return` is in flight and yields the last executed statement's
    /// value.
    #[async_recursion(?Send)]
    pub(crate) async fn exec_block(&self, block: &Block, ns: &Rc<Namespace>) -> EslResult<EslValue> {
        self.push_line(block.lineno);

        let ns = ns.child();

        let mut result = EslValue::Nil;
        for stat in &block.stats {
            if self.returning.get() || self.breaking.get() {
                break;
            }
            result = self.exec_stat(stat, &ns).await?;
        }

        self.pop_line();
        Ok(result)
    }

    #[async_recursion(?Send)]
    pub(crate) async fn exec_stat(&self, stat: &Stat, ns: &Rc<Namespace>) -> EslResult<EslValue> {
        self.push_line(stat.lineno);

        let result = match &stat.kind {
            StatKind::Assign {
                targets,
                values,
                local,
            } => {
                self.exec_assign(targets, values, *local, ns).await?;
                EslValue::Nil
            }
            StatKind::Do(body) => self.exec_block(body, ns).await?,
            StatKind::While {
                cond,
                body,
                check_before,
            } => {
                self.exec_while(cond, body, *check_before, stat.lineno, ns)
                    .await?
            }
            StatKind::If {
                cond,
                body,
                elseifs,
                else_body,
            } => {
                self.exec_if(cond, body, elseifs, else_body.as_ref(), ns)
                    .await?
            }
            StatKind::NumericFor {
                name,
                start,
                limit,
                step,
                body,
            } => {
                self.exec_numeric_for(name, start, limit, step.as_ref(), body, stat.lineno, ns)
                    .await?
            }
            StatKind::GenericFor { names, exprs, body } => {
                self.exec_generic_for(names, exprs, body, stat.lineno, ns)
                    .await?
            }
            StatKind::Function { path, body, local } => {
                self.exec_function_decl(path, body.clone(), *local, ns)
                    .await?;
                EslValue::Nil
            }
            StatKind::Call(expr) => self.eval_expr(expr, ns).await?,
            StatKind::Break => {
                self.breaking.set(true);
                EslValue::Nil
            }
            StatKind::Return(exprs) => {
                let mut results = Vec::with_capacity(exprs.len());
                for expr in exprs {
                    results.push(self.eval_expr(expr, ns).await?);
                }
                self.returning.set(true);
                match results.len() {
                    0 => EslValue::Nil,
                    1 => results.pop().unwrap(),
                    _ => EslValue::values(results),
                }
            }
        };

        self.pop_line();
        Ok(result)
    }

    /// Equal-count multi-assignment: all RHS expressions are evaluated
    /// left-to-right before any target is written.
    async fn exec_assign(
        &self,
        targets: &[Target],
        values: &[Expr],
        local: bool,
        ns: &Rc<Namespace>,
    ) -> EslResult<()> {
        let count = targets.len();
        if !values.is_empty() && values.len() != count {
            return Err(EslRuntimeError::value_error(
                "incorrect count of values in assignment",
            ));
        }

        let mut evaluated = Vec::with_capacity(count);
        if values.is_empty() {
            evaluated.resize(count, EslValue::Nil);
        } else {
            for expr in values {
                evaluated.push(self.eval_expr(expr, ns).await?);
            }
        }

        for (target, value) in targets.iter().zip(evaluated) {
            match &target.kind {
                TargetKind::Name(name) => ns.set_var(name, value, local),
                TargetKind::Index { object, key } => {
                    let obj = self.eval_expr(object, ns).await?;
                    let key = self.eval_index_key(key, ns).await?;
                    self.assign_index(ns, &obj, &key, value)?;
                }
            }
        }

        Ok(())
    }

    pub(crate) async fn eval_index_key(
        &self,
        key: &IndexKey,
        ns: &Rc<Namespace>,
    ) -> EslResult<EslValue> {
        match key {
            IndexKey::Attr(name) => Ok(EslValue::Str(name.clone())),
            IndexKey::Expr(expr) => self.eval_expr(expr, ns).await,
        }
    }

    /// Write through the item facade, falling back to attribute access
    /// when the target's class has no item support. Writing `nil` deletes
    /// the slot.
    pub(crate) fn assign_index(
        &self,
        ns: &Namespace,
        obj: &EslValue,
        key: &EslValue,
        value: EslValue,
    ) -> EslResult<()> {
        if value.is_nil() {
            return match ns.has_item(obj, key) {
                Ok(true) => ns.del_item(obj, key),
                Ok(false) => Ok(()),
                Err(err) if err.kind() == EslErrorKind::Type => match key {
                    EslValue::Str(name) if ns.has_attribute(obj, name) => ns.del_attribute(obj, name),
                    EslValue::Str(_) => Ok(()),
                    _ => Err(err),
                },
                Err(err) => Err(err),
            };
        }

        match ns.set_item(obj, key, value.clone()) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == EslErrorKind::Type => match key {
                EslValue::Str(name) => ns.set_attribute(obj, name, value),
                _ => Err(err),
            },
            Err(err) => Err(err),
        }
    }

    /// `while`/`repeat-until` share one node: `check_before` selects
    /// test-then-run or run-then-test. The loop continues while the
    /// expression is truthy and has no implicit iteration cap.
    async fn exec_while(
        &self,
        cond: &Expr,
        body: &Block,
        check_before: bool,
        lineno: u32,
        ns: &Rc<Namespace>,
    ) -> EslResult<EslValue> {
        self.loop_stack.borrow_mut().push(lineno);

        let mut result = EslValue::Nil;
        loop {
            if check_before && !self.eval_expr(cond, ns).await?.truthy() {
                break;
            }

            result = self.exec_block(body, ns).await?;
            if self.breaking.get() || self.returning.get() {
                break;
            }

            if !check_before && !self.eval_expr(cond, ns).await?.truthy() {
                break;
            }
        }
        self.breaking.set(false);

        self.loop_stack.borrow_mut().pop();
        Ok(result)
    }

    async fn exec_if(
        &self,
        cond: &Expr,
        body: &Block,
        elseifs: &[ElseIf],
        else_body: Option<&Block>,
        ns: &Rc<Namespace>,
    ) -> EslResult<EslValue> {
        if self.eval_expr(cond, ns).await?.truthy() {
            return self.exec_block(body, ns).await;
        }

        for elseif in elseifs {
            if self.eval_expr(&elseif.cond, ns).await?.truthy() {
                return self.exec_block(&elseif.body, ns).await;
            }
        }

        match else_body {
            Some(body) => self.exec_block(body, ns).await,
            None => Ok(EslValue::Nil),
        }
    }

    async fn exec_numeric_for(
        &self,
        name: &str,
        start: &Expr,
        limit: &Expr,
        step: Option<&Expr>,
        body: &Block,
        lineno: u32,
        ns: &Rc<Namespace>,
    ) -> EslResult<EslValue> {
        let start = self.for_bound(start, "initial value", ns).await?;
        let limit = self.for_bound(limit, "limit", ns).await?;
        let step = match step {
            Some(expr) => self.for_bound(expr, "step", ns).await?,
            None => 1,
        };

        self.loop_stack.borrow_mut().push(lineno);
        let ns = ns.child();

        let mut result = EslValue::Nil;
        let mut i = start;
        while (step > 0 && i <= limit) || (step <= 0 && i >= limit) {
            if self.breaking.get() {
                break;
            }
            ns.set_var(name, EslValue::Int(i), true);

            result = self.exec_block(body, &ns).await?;
            if self.returning.get() {
                break;
            }

            match i.checked_add(step) {
                Some(next) => i = next,
                None => break,
            }
        }
        self.breaking.set(false);

        self.loop_stack.borrow_mut().pop();
        Ok(result)
    }

    async fn for_bound(&self, expr: &Expr, what: &str, ns: &Rc<Namespace>) -> EslResult<i64> {
        let value = self.eval_expr(expr, ns).await?;
        value.as_int().ok_or_else(|| {
            EslRuntimeError::type_error(format!(
                "'for' {} must be a number, got {}",
                what,
                value.type_name()
            ))
        })
    }

    /// Generic for: evaluate the expression list, flatten multi-value
    /// results and pad to the `(fun, state, key)` triple. Host values
    /// advertising an iterator capability are driven directly; anything
    /// else is called with `(state, key)` until it produces `nil`.
    async fn exec_generic_for(
        &self,
        names: &[SmolStr],
        exprs: &[Expr],
        body: &Block,
        lineno: u32,
        ns: &Rc<Namespace>,
    ) -> EslResult<EslValue> {
        self.loop_stack.borrow_mut().push(lineno);
        let ns = ns.child();

        let mut params: Vec<EslValue> = Vec::new();
        for expr in exprs {
            match self.eval_expr(expr, &ns).await? {
                EslValue::Values(values) => params.extend(values.iter().cloned()),
                other => params.push(other),
            }
        }
        while params.len() < 3 {
            params.push(EslValue::Nil);
        }

        let fun = params[0].clone();
        let state = params[1].clone();
        let mut key = params[2].clone();

        let mut result = EslValue::Nil;
        loop {
            if self.breaking.get() {
                break;
            }

            let Some(values) = self.generic_for_step(&fun, &state, &key, &ns).await? else {
                break;
            };

            for (name, value) in names.iter().zip(values.iter()) {
                ns.set_var(name, value.clone(), true);
            }
            key = values.first().cloned().unwrap_or(EslValue::Nil);

            result = self.exec_block(body, &ns).await?;
            if self.returning.get() {
                break;
            }
        }
        self.breaking.set(false);

        self.loop_stack.borrow_mut().pop();
        Ok(result)
    }

    /// One emission of a generic-for loop, or `None` on exhaustion.
    async fn generic_for_step(
        &self,
        fun: &EslValue,
        state: &EslValue,
        key: &EslValue,
        ns: &Rc<Namespace>,
    ) -> EslResult<Option<Vec<EslValue>>> {
        if let EslValue::Object(object) = fun {
            if let Some(step) = object.async_next() {
                return Ok(match step.await? {
                    IterStep::Value(value) => Some(vec![EslValue::Nil, value]),
                    IterStep::Done => None,
                });
            }
            if let Some(step) = object.sync_next() {
                return Ok(match step? {
                    IterStep::Value(value) => Some(vec![EslValue::Nil, value]),
                    IterStep::Done => None,
                });
            }
        }

        let produced = self
            .call_value(fun, vec![state.clone(), key.clone()], ns)
            .await?;
        Ok(match produced {
            EslValue::Nil => None,
            EslValue::Values(values) => Some(values.as_ref().clone()),
            other => Some(vec![other]),
        })
    }

    /// Bind a function statement under its declaration path. Method-form
    /// declarations capture the owning table as the function's receiver.
    async fn exec_function_decl(
        &self,
        path: &FuncPath,
        body: Rc<crate::parser::ast::FunctionBody>,
        local: bool,
        ns: &Rc<Namespace>,
    ) -> EslResult<()> {
        let func = Rc::new(EslFunction::new(path.display_name(), body));

        if local {
            ns.set_var(&path.parts[0], EslValue::Function(func), true);
            return Ok(());
        }

        if path.parts.len() == 1 && path.method.is_none() {
            ns.set_var(&path.parts[0], EslValue::Function(func), false);
            return Ok(());
        }

        let (owner_parts, name) = match &path.method {
            Some(method) => (&path.parts[..], method.clone()),
            None => (
                &path.parts[..path.parts.len() - 1],
                path.parts.last().unwrap().clone(),
            ),
        };

        let mut owner = ns.get_var(&owner_parts[0]);
        if owner.is_nil() {
            return Err(EslRuntimeError::name_error("function not found"));
        }
        for part in &owner_parts[1..] {
            owner = self.read_index(ns, &owner, &EslValue::Str(part.clone()))?;
            if owner.is_nil() {
                return Err(EslRuntimeError::name_error("function not found"));
            }
        }

        if path.method.is_some() {
            func.bind_receiver(owner.clone());
        }
        self.assign_index(ns, &owner, &EslValue::Str(name), EslValue::Function(func))
    }
}
