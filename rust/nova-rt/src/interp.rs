//! Tree-walking evaluator: dispatches on AST variants against the
//! environment chain.
//!
//! Statement evaluation threads a [`Completion`] upward; `throw` travels as
//! the `Err` arm of every result so `try`/`catch` can intercept it.
//! Expression evaluation returns a plain value.

use crate::env::{EnvError, EnvRef, Frame};
use crate::value::{
    compare, loose_eq, strict_eq, to_number, FunctionBody, FunctionValue, Value,
};
use nova_compiler::compiler::ast::*;
use nova_compiler::compiler::tokens::Span;
use std::cmp::Ordering;
use std::collections::HashSet;
use std::rc::Rc;

/// Calls nest on the host stack; past this depth a runtime error surfaces
/// instead of a stack overflow. Each user call costs several host frames,
/// so the practical bound is kept conservative.
const MAX_CALL_DEPTH: usize = 300;

/// Result of evaluating a statement.
#[derive(Debug)]
pub enum Completion {
    Normal(Value),
    Return(Value),
    Break,
    Continue,
}

/// An in-flight `throw`. Runtime errors raised by the interpreter are
/// ordinary throws carrying a message string, so user code can catch them.
#[derive(Debug, Clone)]
pub struct Thrown {
    pub value: Value,
    pub span: Span,
}

impl Thrown {
    pub fn error(message: impl Into<String>, span: Span) -> Self {
        Thrown {
            value: Value::string(message.into()),
            span,
        }
    }

    fn from_env(err: EnvError, span: Span) -> Self {
        Thrown::error(err.to_string(), span)
    }
}

#[derive(Clone, Copy)]
enum BindMode {
    Declare { mutable: bool },
    Assign,
}

pub(crate) struct Evaluator {
    depth: usize,
}

impl Evaluator {
    pub(crate) fn new() -> Self {
        Evaluator { depth: 0 }
    }

    /// Run a whole program; the value of the final statement is the result
    /// (useful in a REPL). A control signal escaping the program is an
    /// error.
    pub(crate) fn run_program(
        &mut self,
        program: &Program,
        env: &EnvRef,
    ) -> Result<Value, Thrown> {
        self.hoist_functions(&program.body, env)?;
        let mut last = Value::Undefined;
        for stmt in &program.body {
            match self.exec_stmt(stmt, env)? {
                Completion::Normal(value) => last = value,
                Completion::Return(_) => {
                    return Err(Thrown::error("illegal return outside function", stmt.span()))
                }
                Completion::Break => {
                    return Err(Thrown::error("illegal break outside loop", stmt.span()))
                }
                Completion::Continue => {
                    return Err(Thrown::error("illegal continue outside loop", stmt.span()))
                }
            }
        }
        Ok(last)
    }

    /// Function declarations bind before any statement in their block runs.
    fn hoist_functions(&mut self, stmts: &[Stmt], env: &EnvRef) -> Result<(), Thrown> {
        for stmt in stmts {
            if let Stmt::FunctionDecl(decl) = stmt {
                let func = Value::Function(Rc::new(FunctionValue {
                    name: Some(decl.name.clone()),
                    params: decl.params.clone(),
                    body: FunctionBody::Block(decl.body.clone()),
                    env: Rc::clone(env),
                }));
                Frame::declare(env, &decl.name, func, true)
                    .map_err(|e| Thrown::from_env(e, decl.span))?;
            }
        }
        Ok(())
    }

    /// Hoist, then execute statements in order; the first non-normal
    /// completion short-circuits.
    fn exec_stmts(&mut self, stmts: &[Stmt], env: &EnvRef) -> Result<Completion, Thrown> {
        self.hoist_functions(stmts, env)?;
        for stmt in stmts {
            match self.exec_stmt(stmt, env)? {
                Completion::Normal(_) => {}
                other => return Ok(other),
            }
        }
        Ok(Completion::Normal(Value::Undefined))
    }

    fn exec_stmt(&mut self, stmt: &Stmt, env: &EnvRef) -> Result<Completion, Thrown> {
        match stmt {
            Stmt::Expr(s) => {
                let value = self.eval_expr(&s.expr, env)?;
                Ok(Completion::Normal(value))
            }
            Stmt::VarDecl(s) => {
                self.exec_var_decl(s, env)?;
                Ok(Completion::Normal(Value::Undefined))
            }
            // Bound during hoisting.
            Stmt::FunctionDecl(_) => Ok(Completion::Normal(Value::Undefined)),
            Stmt::Block(s) => {
                let scope = Frame::child(env);
                self.exec_stmts(&s.body, &scope)
            }
            Stmt::If(s) => {
                if self.eval_expr(&s.test, env)?.is_truthy() {
                    self.exec_stmt(&s.then_branch, env)
                } else if let Some(else_branch) = &s.else_branch {
                    self.exec_stmt(else_branch, env)
                } else {
                    Ok(Completion::Normal(Value::Undefined))
                }
            }
            Stmt::While(s) => {
                while self.eval_expr(&s.test, env)?.is_truthy() {
                    match self.exec_stmt(&s.body, env)? {
                        Completion::Break => break,
                        Completion::Continue | Completion::Normal(_) => {}
                        ret @ Completion::Return(_) => return Ok(ret),
                    }
                }
                Ok(Completion::Normal(Value::Undefined))
            }
            Stmt::DoWhile(s) => {
                loop {
                    match self.exec_stmt(&s.body, env)? {
                        Completion::Break => break,
                        Completion::Continue | Completion::Normal(_) => {}
                        ret @ Completion::Return(_) => return Ok(ret),
                    }
                    if !self.eval_expr(&s.test, env)?.is_truthy() {
                        break;
                    }
                }
                Ok(Completion::Normal(Value::Undefined))
            }
            Stmt::For(s) => {
                // The header gets its own frame; `let` bindings there are
                // visible to test, update, and body.
                let header = Frame::child(env);
                match &s.init {
                    Some(ForInit::VarDecl(decl)) => self.exec_var_decl(decl, &header)?,
                    Some(ForInit::Expr(expr)) => {
                        self.eval_expr(expr, &header)?;
                    }
                    None => {}
                }
                loop {
                    if let Some(test) = &s.test {
                        if !self.eval_expr(test, &header)?.is_truthy() {
                            break;
                        }
                    }
                    match self.exec_stmt(&s.body, &header)? {
                        Completion::Break => break,
                        Completion::Continue | Completion::Normal(_) => {}
                        ret @ Completion::Return(_) => return Ok(ret),
                    }
                    if let Some(update) = &s.update {
                        self.eval_expr(update, &header)?;
                    }
                }
                Ok(Completion::Normal(Value::Undefined))
            }
            Stmt::Return(s) => {
                let value = match &s.value {
                    Some(expr) => self.eval_expr(expr, env)?,
                    None => Value::Undefined,
                };
                Ok(Completion::Return(value))
            }
            Stmt::Break(_) => Ok(Completion::Break),
            Stmt::Continue(_) => Ok(Completion::Continue),
            Stmt::Switch(s) => self.exec_switch(s, env),
            Stmt::Try(s) => self.exec_try(s, env),
            Stmt::Throw(s) => {
                let value = self.eval_expr(&s.value, env)?;
                Err(Thrown {
                    value,
                    span: s.span,
                })
            }
        }
    }

    fn exec_var_decl(&mut self, decl: &VarDeclStmt, env: &EnvRef) -> Result<(), Thrown> {
        let mutable = decl.kind == DeclKind::Let;
        for declarator in &decl.declarators {
            let value = match &declarator.init {
                Some(init) => self.eval_expr(init, env)?,
                None => Value::Undefined,
            };
            self.bind_pattern(
                &declarator.pattern,
                value,
                env,
                BindMode::Declare { mutable },
            )?;
        }
        Ok(())
    }

    fn exec_switch(&mut self, stmt: &SwitchStmt, env: &EnvRef) -> Result<Completion, Thrown> {
        let discriminant = self.eval_expr(&stmt.discriminant, env)?;
        let scope = Frame::child(env);
        for case in &stmt.cases {
            self.hoist_functions(&case.body, &scope)?;
        }
        // Case tests run in order under `===`; `default` matches only when
        // no case does, wherever it appears.
        let mut matched = None;
        for (i, case) in stmt.cases.iter().enumerate() {
            if let Some(test) = &case.test {
                let test_value = self.eval_expr(test, &scope)?;
                if strict_eq(&discriminant, &test_value) {
                    matched = Some(i);
                    break;
                }
            }
        }
        if matched.is_none() {
            matched = stmt.cases.iter().position(|case| case.test.is_none());
        }
        let Some(start) = matched else {
            return Ok(Completion::Normal(Value::Undefined));
        };
        // Fall through until `break` or the end of the case list.
        for case in &stmt.cases[start..] {
            for body_stmt in &case.body {
                match self.exec_stmt(body_stmt, &scope)? {
                    Completion::Normal(_) => {}
                    Completion::Break => return Ok(Completion::Normal(Value::Undefined)),
                    other => return Ok(other),
                }
            }
        }
        Ok(Completion::Normal(Value::Undefined))
    }

    fn exec_try(&mut self, stmt: &TryStmt, env: &EnvRef) -> Result<Completion, Thrown> {
        let scope = Frame::child(env);
        let mut outcome = self.exec_stmts(&stmt.block, &scope);
        if let (Err(thrown), Some(handler)) = (&outcome, &stmt.handler) {
            let catch_scope = Frame::child(env);
            Frame::declare(&catch_scope, &handler.param, thrown.value.clone(), true)
                .map_err(|e| Thrown::from_env(e, handler.span))?;
            outcome = self.exec_stmts(&handler.body, &catch_scope);
        }
        if let Some(finalizer) = &stmt.finalizer {
            let finally_scope = Frame::child(env);
            match self.exec_stmts(finalizer, &finally_scope) {
                // A normal finally preserves the pending outcome; anything
                // else replaces it.
                Ok(Completion::Normal(_)) => {}
                other => outcome = other,
            }
        }
        outcome
    }

    // ── Expressions ──

    pub(crate) fn eval_expr(&mut self, expr: &Expr, env: &EnvRef) -> Result<Value, Thrown> {
        match expr {
            Expr::NumberLit(n, _) => Ok(Value::Number(*n)),
            Expr::StringLit(s, _) => Ok(Value::string(s.clone())),
            // Interpolation is deferred; the raw text is the value.
            Expr::TemplateLit(s, _) => Ok(Value::string(s.clone())),
            Expr::BoolLit(b, _) => Ok(Value::Bool(*b)),
            Expr::NullLit(_) => Ok(Value::Null),
            Expr::UndefinedLit(_) => Ok(Value::Undefined),
            Expr::Ident(name, span) => Frame::lookup(env, name)
                .ok_or_else(|| Thrown::error(format!("undefined variable '{}'", name), *span)),
            Expr::ArrayLit(elements, _) => {
                let mut items = Vec::with_capacity(elements.len());
                for element in elements {
                    match element {
                        None => items.push(Value::Undefined),
                        Some(Expr::Spread(inner, span)) => {
                            let value = self.eval_expr(inner, env)?;
                            items.extend(self.expand_iterable(value, *span)?);
                        }
                        Some(expr) => items.push(self.eval_expr(expr, env)?),
                    }
                }
                Ok(Value::new_array(items))
            }
            Expr::ObjectLit(props, _) => {
                let mut map = indexmap::IndexMap::new();
                for prop in props {
                    match prop {
                        ObjectProp::KeyValue { key, value, .. } => {
                            let value = self.eval_expr(value, env)?;
                            map.insert(key.clone(), value);
                        }
                        ObjectProp::Shorthand { name, span } => {
                            let value = Frame::lookup(env, name).ok_or_else(|| {
                                Thrown::error(format!("undefined variable '{}'", name), *span)
                            })?;
                            map.insert(name.clone(), value);
                        }
                        ObjectProp::Spread { value, span } => {
                            match self.eval_expr(value, env)? {
                                Value::Object(src) => {
                                    for (k, v) in src.borrow().iter() {
                                        map.insert(k.clone(), v.clone());
                                    }
                                }
                                // Spreading nothing copies nothing.
                                Value::Null | Value::Undefined => {}
                                other => {
                                    return Err(Thrown::error(
                                        format!(
                                            "cannot spread {} into an object",
                                            other.type_name()
                                        ),
                                        *span,
                                    ))
                                }
                            }
                        }
                    }
                }
                Ok(Value::new_object(map))
            }
            Expr::Unary(op, operand, _) => {
                let value = self.eval_expr(operand, env)?;
                Ok(match op {
                    UnaryOp::Not => Value::Bool(!value.is_truthy()),
                    UnaryOp::Neg => Value::Number(-to_number(&value)),
                    UnaryOp::Pos => Value::Number(to_number(&value)),
                })
            }
            Expr::Binary(lhs, op, rhs, _) => {
                let a = self.eval_expr(lhs, env)?;
                let b = self.eval_expr(rhs, env)?;
                Ok(apply_binary(*op, &a, &b))
            }
            Expr::Logical(lhs, op, rhs, _) => {
                let a = self.eval_expr(lhs, env)?;
                let take_left = match op {
                    LogicalOp::And => !a.is_truthy(),
                    LogicalOp::Or => a.is_truthy(),
                    LogicalOp::Coalesce => !matches!(a, Value::Null | Value::Undefined),
                };
                if take_left {
                    Ok(a)
                } else {
                    self.eval_expr(rhs, env)
                }
            }
            Expr::Assign {
                target, op, value, ..
            } => self.eval_assign(target, *op, value, env),
            Expr::Conditional {
                test,
                then_val,
                else_val,
                ..
            } => {
                if self.eval_expr(test, env)?.is_truthy() {
                    self.eval_expr(then_val, env)
                } else {
                    self.eval_expr(else_val, env)
                }
            }
            Expr::Call(callee, args, span) => {
                let callee = self.eval_expr(callee, env)?;
                let mut evaluated = Vec::with_capacity(args.len());
                for arg in args {
                    match arg {
                        Expr::Spread(inner, spread_span) => {
                            let value = self.eval_expr(inner, env)?;
                            evaluated.extend(self.expand_iterable(value, *spread_span)?);
                        }
                        other => evaluated.push(self.eval_expr(other, env)?),
                    }
                }
                self.call_value(&callee, evaluated, env, *span)
            }
            Expr::Member(object, property, span) => {
                let object = self.eval_expr(object, env)?;
                get_member(&object, property, *span)
            }
            Expr::Index(object, index, span) => {
                let object = self.eval_expr(object, env)?;
                let index = self.eval_expr(index, env)?;
                get_index(&object, &index, *span)
            }
            Expr::Function {
                name, params, body, ..
            } => Ok(Value::Function(Rc::new(FunctionValue {
                name: name.clone(),
                params: params.clone(),
                body: FunctionBody::Block(body.clone()),
                env: Rc::clone(env),
            }))),
            Expr::Arrow { params, body, .. } => {
                let body = match body {
                    ArrowBody::Expr(expr) => FunctionBody::Expr(expr.clone()),
                    ArrowBody::Block(stmts) => FunctionBody::Block(stmts.clone()),
                };
                Ok(Value::Function(Rc::new(FunctionValue {
                    name: None,
                    params: params.clone(),
                    body,
                    env: Rc::clone(env),
                })))
            }
            // The parser only produces spread inside calls, arrays, objects,
            // and patterns, which are expanded in place above.
            Expr::Spread(_, span) => {
                Err(Thrown::error("unexpected spread element", *span))
            }
        }
    }

    fn eval_assign(
        &mut self,
        target: &AssignTarget,
        op: AssignOp,
        value: &Expr,
        env: &EnvRef,
    ) -> Result<Value, Thrown> {
        match target {
            AssignTarget::Ident(name, span) => {
                // Constness is checked before the right side runs, so a
                // rejected write has no observable effect.
                Frame::check_assignable(env, name).map_err(|err| Thrown::from_env(err, *span))?;
                let new_value = match op {
                    AssignOp::Assign => self.eval_expr(value, env)?,
                    AssignOp::Add | AssignOp::Sub => {
                        let current = Frame::lookup(env, name).unwrap_or(Value::Undefined);
                        let rhs = self.eval_expr(value, env)?;
                        let bin = if op == AssignOp::Add {
                            BinOp::Add
                        } else {
                            BinOp::Sub
                        };
                        apply_binary(bin, &current, &rhs)
                    }
                };
                Frame::assign(env, name, new_value.clone())
                    .map_err(|err| Thrown::from_env(err, *span))?;
                Ok(new_value)
            }
            AssignTarget::Member(object_expr, property, span) => {
                let object = self.eval_expr(object_expr, env)?;
                let new_value = match op {
                    AssignOp::Assign => self.eval_expr(value, env)?,
                    AssignOp::Add | AssignOp::Sub => {
                        let current = get_member(&object, property, *span)?;
                        let rhs = self.eval_expr(value, env)?;
                        let bin = if op == AssignOp::Add {
                            BinOp::Add
                        } else {
                            BinOp::Sub
                        };
                        apply_binary(bin, &current, &rhs)
                    }
                };
                set_member(&object, property, new_value.clone(), *span)?;
                Ok(new_value)
            }
            AssignTarget::Index(object_expr, index_expr, span) => {
                let object = self.eval_expr(object_expr, env)?;
                let index = self.eval_expr(index_expr, env)?;
                let new_value = match op {
                    AssignOp::Assign => self.eval_expr(value, env)?,
                    AssignOp::Add | AssignOp::Sub => {
                        let current = get_index(&object, &index, *span)?;
                        let rhs = self.eval_expr(value, env)?;
                        let bin = if op == AssignOp::Add {
                            BinOp::Add
                        } else {
                            BinOp::Sub
                        };
                        apply_binary(bin, &current, &rhs)
                    }
                };
                set_index(&object, &index, new_value.clone(), *span)?;
                Ok(new_value)
            }
            AssignTarget::Pattern(pattern) => {
                let rhs = self.eval_expr(value, env)?;
                self.bind_pattern(pattern, rhs.clone(), env, BindMode::Assign)?;
                Ok(rhs)
            }
        }
    }

    fn bind_name(
        &self,
        name: &str,
        value: Value,
        env: &EnvRef,
        mode: BindMode,
        span: Span,
    ) -> Result<(), Thrown> {
        match mode {
            BindMode::Declare { mutable } => Frame::declare(env, name, value, mutable),
            BindMode::Assign => Frame::assign(env, name, value),
        }
        .map_err(|err| Thrown::from_env(err, span))
    }

    /// Match `value` against `pattern`, binding names in `env`.
    fn bind_pattern(
        &mut self,
        pattern: &Pattern,
        value: Value,
        env: &EnvRef,
        mode: BindMode,
    ) -> Result<(), Thrown> {
        match pattern {
            Pattern::Ident(name, span) => self.bind_name(name, value, env, mode, *span),
            Pattern::Default {
                inner,
                value: default,
                ..
            } => {
                // Defaults apply only to missing positions.
                let bound = if matches!(value, Value::Undefined) {
                    self.eval_expr(default, env)?
                } else {
                    value
                };
                self.bind_pattern(inner, bound, env, mode)
            }
            Pattern::Array {
                elements,
                rest,
                span,
            } => {
                let Value::Array(source) = &value else {
                    return Err(Thrown::error(
                        format!("cannot destructure {} as an array", value.type_name()),
                        *span,
                    ));
                };
                let items = source.borrow().clone();
                for (i, element) in elements.iter().enumerate() {
                    if let Some(p) = element {
                        let item = items.get(i).cloned().unwrap_or(Value::Undefined);
                        self.bind_pattern(p, item, env, mode)?;
                    }
                }
                if let Some(rest_name) = rest {
                    let tail: Vec<Value> = items.iter().skip(elements.len()).cloned().collect();
                    self.bind_name(rest_name, Value::new_array(tail), env, mode, *span)?;
                }
                Ok(())
            }
            Pattern::Object { props, rest, span } => {
                let Value::Object(source) = &value else {
                    return Err(Thrown::error(
                        format!("cannot destructure {} as an object", value.type_name()),
                        *span,
                    ));
                };
                let map = source.borrow().clone();
                for prop in props {
                    let bound = map.get(&prop.key).cloned().unwrap_or(Value::Undefined);
                    self.bind_pattern(&prop.binding, bound, env, mode)?;
                }
                if let Some(rest_name) = rest {
                    let consumed: HashSet<&str> = props.iter().map(|p| p.key.as_str()).collect();
                    let remaining: indexmap::IndexMap<String, Value> = map
                        .iter()
                        .filter(|(k, _)| !consumed.contains(k.as_str()))
                        .map(|(k, v)| (k.clone(), v.clone()))
                        .collect();
                    self.bind_name(rest_name, Value::new_object(remaining), env, mode, *span)?;
                }
                Ok(())
            }
        }
    }

    pub(crate) fn call_value(
        &mut self,
        callee: &Value,
        args: Vec<Value>,
        env: &EnvRef,
        span: Span,
    ) -> Result<Value, Thrown> {
        match callee {
            Value::Function(func) => {
                if self.depth >= MAX_CALL_DEPTH {
                    return Err(Thrown::error("maximum call depth exceeded", span));
                }
                self.depth += 1;
                let result = self.call_function(func, &args, span);
                self.depth -= 1;
                result
            }
            Value::Native(native) => {
                (native.func)(&args, env).map_err(|message| Thrown::error(message, span))
            }
            other => Err(Thrown::error(
                format!("{} is not callable", other.type_name()),
                span,
            )),
        }
    }

    fn call_function(
        &mut self,
        func: &FunctionValue,
        args: &[Value],
        span: Span,
    ) -> Result<Value, Thrown> {
        let frame = Frame::child(&func.env);
        for (i, param) in func.params.params.iter().enumerate() {
            let value = args.get(i).cloned().unwrap_or(Value::Undefined);
            self.bind_pattern(param, value, &frame, BindMode::Declare { mutable: true })?;
        }
        if let Some(rest) = &func.params.rest {
            let extra: Vec<Value> = args.iter().skip(func.params.params.len()).cloned().collect();
            Frame::declare(&frame, rest, Value::new_array(extra), true)
                .map_err(|err| Thrown::from_env(err, span))?;
        }
        match &func.body {
            FunctionBody::Expr(expr) => self.eval_expr(expr, &frame),
            FunctionBody::Block(stmts) => match self.exec_stmts(stmts, &frame)? {
                Completion::Return(value) => Ok(value),
                Completion::Normal(_) => Ok(Value::Undefined),
                Completion::Break => Err(Thrown::error("illegal break outside loop", span)),
                Completion::Continue => {
                    Err(Thrown::error("illegal continue outside loop", span))
                }
            },
        }
    }

    fn expand_iterable(&self, value: Value, span: Span) -> Result<Vec<Value>, Thrown> {
        match value {
            Value::Array(items) => Ok(items.borrow().clone()),
            Value::Str(s) => Ok(s.chars().map(|c| Value::string(c.to_string())).collect()),
            other => Err(Thrown::error(
                format!("{} is not iterable", other.type_name()),
                span,
            )),
        }
    }
}

/// `+` concatenates when either operand is a string, array, or object
/// (compounds stringify through their bracketed display form); every other
/// operator coerces to number and follows IEEE-754.
fn apply_binary(op: BinOp, a: &Value, b: &Value) -> Value {
    let stringish =
        |v: &Value| matches!(v, Value::Str(_) | Value::Array(_) | Value::Object(_));
    match op {
        BinOp::Add => {
            if stringish(a) || stringish(b) {
                Value::string(format!("{}{}", a.as_string(), b.as_string()))
            } else {
                Value::Number(to_number(a) + to_number(b))
            }
        }
        BinOp::Sub => Value::Number(to_number(a) - to_number(b)),
        BinOp::Mul => Value::Number(to_number(a) * to_number(b)),
        BinOp::Div => Value::Number(to_number(a) / to_number(b)),
        BinOp::Mod => Value::Number(to_number(a) % to_number(b)),
        BinOp::Pow => Value::Number(to_number(a).powf(to_number(b))),
        BinOp::Eq => Value::Bool(loose_eq(a, b)),
        BinOp::NotEq => Value::Bool(!loose_eq(a, b)),
        BinOp::StrictEq => Value::Bool(strict_eq(a, b)),
        BinOp::StrictNotEq => Value::Bool(!strict_eq(a, b)),
        BinOp::Lt => Value::Bool(compare(a, b) == Some(Ordering::Less)),
        BinOp::LtEq => Value::Bool(matches!(
            compare(a, b),
            Some(Ordering::Less | Ordering::Equal)
        )),
        BinOp::Gt => Value::Bool(compare(a, b) == Some(Ordering::Greater)),
        BinOp::GtEq => Value::Bool(matches!(
            compare(a, b),
            Some(Ordering::Greater | Ordering::Equal)
        )),
    }
}

fn get_member(object: &Value, property: &str, span: Span) -> Result<Value, Thrown> {
    match object {
        Value::Object(map) => Ok(map.borrow().get(property).cloned().unwrap_or(Value::Undefined)),
        // Arrays expose `length`; everything else by name is undefined.
        Value::Array(items) => {
            if property == "length" {
                Ok(Value::Number(items.borrow().len() as f64))
            } else {
                Ok(Value::Undefined)
            }
        }
        other => Err(Thrown::error(
            format!("cannot read property '{}' of {}", property, other.type_name()),
            span,
        )),
    }
}

fn set_member(object: &Value, property: &str, value: Value, span: Span) -> Result<(), Thrown> {
    match object {
        Value::Object(map) => {
            map.borrow_mut().insert(property.to_string(), value);
            Ok(())
        }
        Value::Array(_) => Err(Thrown::error(
            format!("cannot set property '{}' on array", property),
            span,
        )),
        other => Err(Thrown::error(
            format!("cannot set property '{}' on {}", property, other.type_name()),
            span,
        )),
    }
}

fn get_index(object: &Value, index: &Value, span: Span) -> Result<Value, Thrown> {
    match object {
        Value::Array(items) => {
            let idx = to_number(index);
            let items = items.borrow();
            if idx.fract() == 0.0 && idx >= 0.0 && (idx as usize) < items.len() {
                Ok(items[idx as usize].clone())
            } else {
                Ok(Value::Undefined)
            }
        }
        Value::Object(map) => Ok(map
            .borrow()
            .get(&index.as_string())
            .cloned()
            .unwrap_or(Value::Undefined)),
        other => Err(Thrown::error(
            format!("{} is not indexable", other.type_name()),
            span,
        )),
    }
}

fn set_index(object: &Value, index: &Value, value: Value, span: Span) -> Result<(), Thrown> {
    match object {
        Value::Array(items) => {
            let idx = to_number(index);
            if !(idx.is_finite() && idx.fract() == 0.0 && idx >= 0.0) {
                return Err(Thrown::error(
                    format!("invalid array index {}", index.as_string()),
                    span,
                ));
            }
            let idx = idx as usize;
            let mut items = items.borrow_mut();
            if idx < items.len() {
                items[idx] = value;
            } else {
                // Growing past `length` fills the gap with undefined.
                items.resize(idx, Value::Undefined);
                items.push(value);
            }
            Ok(())
        }
        Value::Object(map) => {
            map.borrow_mut().insert(index.as_string(), value);
            Ok(())
        }
        other => Err(Thrown::error(
            format!("{} is not indexable", other.type_name()),
            span,
        )),
    }
}
