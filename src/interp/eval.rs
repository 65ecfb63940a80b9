//! Tree-walking evaluator
//!
//! Walks a checked [`Source`] directly. Scoping mirrors the checker's
//! frame discipline on a runtime [`ScopeArena`]: one root frame holds the
//! fields and methods, each call, branch, and loop iteration opens a child
//! frame, and a method body runs in a child of the frame the method was
//! defined in. `RETURN` is modeled as the [`Flow::Return`] variant threaded
//! back through every statement, never as a panic.

use crate::ast::{BinaryOp, Expr, Literal, Method, Source, Stmt};
use crate::diagnostics::{Error, Result};
use crate::interp::value::{self, Value};
use crate::scope::{FrameId, ScopeArena};
use bigdecimal::{BigDecimal, RoundingMode};
use num_traits::Zero;
use rustc_hash::FxHashMap;
use std::cmp::Ordering;
use std::io::Write;
use std::rc::Rc;

type Frame = FrameId<Value, Callable>;

/// A host-provided method, dispatched by (type name, method name, arity).
pub type NativeMethod = Rc<dyn Fn(&Value, &[Value]) -> Result<Value>>;

/// A callable bound in a scope frame.
#[derive(Clone)]
enum Callable {
    /// The built-in `print`.
    Print,
    /// A source method closed over its defining frame.
    Method { method: Rc<Method>, defining: Frame },
}

/// Outcome of executing one statement.
enum Flow {
    Normal,
    Return(Value),
}

/// Evaluator state; `print` output goes to `out` line by line.
pub struct Interpreter<W: Write> {
    out: W,
    scopes: ScopeArena<Value, Callable>,
    root: Frame,
    natives: FxHashMap<(String, String, usize), NativeMethod>,
}

impl<W: Write> Interpreter<W> {
    pub fn new(out: W) -> Self {
        let (mut scopes, root) = ScopeArena::new();
        scopes.define_function(root, "print", 1, Callable::Print);
        Self {
            out,
            scopes,
            root,
            natives: FxHashMap::default(),
        }
    }

    /// Predefine a variable in the root frame before running.
    pub fn define_variable(&mut self, name: impl Into<String>, value: Value) {
        self.scopes.define_variable(self.root, name, value);
    }

    /// Register a host method for object values of `type_name`.
    pub fn define_method(
        &mut self,
        type_name: impl Into<String>,
        name: impl Into<String>,
        arity: usize,
        method: NativeMethod,
    ) {
        self.natives
            .insert((type_name.into(), name.into(), arity), method);
    }

    /// Evaluate the program: fields, then method bindings, then `main()`.
    /// The returned value is `main`'s result.
    pub fn run(&mut self, source: &Source) -> Result<Value> {
        for field in &source.fields {
            let value = match &field.value {
                Some(expr) => self.eval(self.root, expr)?,
                None => Value::Nil,
            };
            self.scopes
                .define_variable(self.root, field.name.clone(), value);
        }

        for method in &source.methods {
            let callable = Callable::Method {
                method: Rc::new(method.clone()),
                defining: self.root,
            };
            self.scopes
                .define_function(self.root, method.name.clone(), method.parameters.len(), callable);
        }

        let main = self
            .scopes
            .lookup_function(self.root, "main", 0)
            .cloned()
            .ok_or_else(|| Error::runtime("no `main` method with zero parameters"))?;
        let result = self.call(main, Vec::new())?;
        tracing::debug!(result = %result, "evaluation finished");
        Ok(result)
    }

    // ==================== CALLS ====================

    fn call(&mut self, callable: Callable, arguments: Vec<Value>) -> Result<Value> {
        match callable {
            Callable::Print => {
                let [value] = arguments.as_slice() else {
                    return Err(Error::runtime("`print` takes exactly one argument"));
                };
                writeln!(self.out, "{value}")
                    .map_err(|e| Error::runtime(format!("write failed: {e}")))?;
                Ok(Value::Nil)
            }
            Callable::Method { method, defining } => {
                if arguments.len() != method.parameters.len() {
                    return Err(Error::runtime(format!(
                        "`{}` takes {} arguments, got {}",
                        method.name,
                        method.parameters.len(),
                        arguments.len()
                    )));
                }
                let frame = self.scopes.push(defining);
                for (parameter, value) in method.parameters.iter().zip(arguments) {
                    self.scopes
                        .define_variable(frame, parameter.name.clone(), value);
                }
                match self.exec_all(frame, &method.statements)? {
                    Flow::Return(value) => Ok(value),
                    Flow::Normal => Ok(Value::Nil),
                }
            }
        }
    }

    // ==================== STATEMENTS ====================

    /// Run statements in order, stopping at the first `RETURN`.
    fn exec_all(&mut self, frame: Frame, statements: &[Stmt]) -> Result<Flow> {
        for statement in statements {
            if let Flow::Return(value) = self.exec(frame, statement)? {
                return Ok(Flow::Return(value));
            }
        }
        Ok(Flow::Normal)
    }

    fn exec(&mut self, frame: Frame, statement: &Stmt) -> Result<Flow> {
        match statement {
            Stmt::Expression { expr } => {
                self.eval(frame, expr)?;
                Ok(Flow::Normal)
            }
            Stmt::Declaration { name, value, .. } => {
                let value = match value {
                    Some(expr) => self.eval(frame, expr)?,
                    None => Value::Nil,
                };
                self.scopes.define_variable(frame, name.clone(), value);
                Ok(Flow::Normal)
            }
            Stmt::Assignment { receiver, value } => {
                let supplied = self.eval(frame, value)?;
                self.assign(frame, receiver, supplied)?;
                Ok(Flow::Normal)
            }
            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                let branch = if self.condition(frame, condition)? {
                    then_branch
                } else {
                    else_branch
                };
                let inner = self.scopes.push(frame);
                self.exec_all(inner, branch)
            }
            Stmt::For {
                name,
                iterable,
                body,
            } => {
                let elements = match self.eval(frame, iterable)? {
                    Value::List(elements) => elements,
                    other => {
                        return Err(Error::runtime(format!(
                            "FOR needs an iterable, found {}",
                            other.describe()
                        )));
                    }
                };
                for element in elements.iter() {
                    let iteration = self.scopes.push(frame);
                    self.scopes
                        .define_variable(iteration, name.clone(), element.clone());
                    if let Flow::Return(value) = self.exec_all(iteration, body)? {
                        return Ok(Flow::Return(value));
                    }
                }
                Ok(Flow::Normal)
            }
            Stmt::While { condition, body } => {
                while self.condition(frame, condition)? {
                    let iteration = self.scopes.push(frame);
                    if let Flow::Return(value) = self.exec_all(iteration, body)? {
                        return Ok(Flow::Return(value));
                    }
                }
                Ok(Flow::Normal)
            }
            Stmt::Return { value } => {
                let value = self.eval(frame, value)?;
                Ok(Flow::Return(value))
            }
        }
    }

    fn assign(&mut self, frame: Frame, receiver: &Expr, supplied: Value) -> Result<()> {
        let Expr::Access {
            receiver: target,
            name,
            ..
        } = receiver
        else {
            return Err(Error::runtime("only a variable or field can be assigned"));
        };

        match target {
            None => {
                let slot = self
                    .scopes
                    .lookup_variable_mut(frame, name)
                    .ok_or_else(|| Error::runtime(format!("undefined variable `{name}`")))?;
                *slot = supplied;
                Ok(())
            }
            Some(target) => match self.eval(frame, target)? {
                Value::Object(object) => {
                    object.fields.borrow_mut().insert(name.clone(), supplied);
                    Ok(())
                }
                other => Err(Error::runtime(format!(
                    "cannot assign a field of {}",
                    other.describe()
                ))),
            },
        }
    }

    fn condition(&mut self, frame: Frame, condition: &Expr) -> Result<bool> {
        match self.eval(frame, condition)? {
            Value::Boolean(b) => Ok(b),
            other => Err(Error::runtime(format!(
                "a condition must be a Boolean, found {}",
                other.describe()
            ))),
        }
    }

    // ==================== EXPRESSIONS ====================

    fn eval(&mut self, frame: Frame, expr: &Expr) -> Result<Value> {
        match expr {
            Expr::Literal { value, .. } => Ok(match value {
                Literal::Nil => Value::Nil,
                Literal::Boolean(b) => Value::Boolean(*b),
                Literal::Character(c) => Value::Character(*c),
                Literal::String(s) => Value::String(s.clone()),
                Literal::Integer(v) => Value::Integer(v.clone()),
                Literal::Decimal(v) => Value::Decimal(v.clone()),
            }),
            Expr::Group { expr, .. } => self.eval(frame, expr),
            Expr::Binary {
                op, left, right, ..
            } => self.eval_binary(frame, *op, left, right),
            Expr::Access { receiver, name, .. } => {
                self.eval_access(frame, receiver.as_deref(), name)
            }
            Expr::Call {
                receiver,
                name,
                arguments,
                ..
            } => self.eval_call(frame, receiver.as_deref(), name, arguments),
        }
    }

    fn eval_binary(
        &mut self,
        frame: Frame,
        op: BinaryOp,
        left: &Expr,
        right: &Expr,
    ) -> Result<Value> {
        // AND / OR short-circuit: the right operand is untouched when the
        // left already decides.
        if matches!(op, BinaryOp::And | BinaryOp::Or) {
            let l = self.condition(frame, left)?;
            return match (op, l) {
                (BinaryOp::And, false) => Ok(Value::Boolean(false)),
                (BinaryOp::Or, true) => Ok(Value::Boolean(true)),
                _ => Ok(Value::Boolean(self.condition(frame, right)?)),
            };
        }

        let l = self.eval(frame, left)?;
        let r = self.eval(frame, right)?;

        match op {
            BinaryOp::Eq => Ok(Value::Boolean(l == r)),
            BinaryOp::Ne => Ok(Value::Boolean(l != r)),
            BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge => {
                let ordering = value::compare(&l, &r).ok_or_else(|| {
                    Error::runtime(format!(
                        "cannot order {} against {}",
                        l.describe(),
                        r.describe()
                    ))
                })?;
                let holds = match op {
                    BinaryOp::Lt => ordering == Ordering::Less,
                    BinaryOp::Le => ordering != Ordering::Greater,
                    BinaryOp::Gt => ordering == Ordering::Greater,
                    _ => ordering != Ordering::Less,
                };
                Ok(Value::Boolean(holds))
            }
            BinaryOp::Add => match (l, r) {
                (Value::String(l), r) => Ok(Value::String(format!("{l}{r}"))),
                (l, Value::String(r)) => Ok(Value::String(format!("{l}{r}"))),
                (Value::Integer(l), Value::Integer(r)) => Ok(Value::Integer(l + r)),
                (Value::Decimal(l), Value::Decimal(r)) => Ok(Value::Decimal(l + r)),
                (l, r) => Err(Self::arithmetic_mismatch(op, &l, &r)),
            },
            BinaryOp::Sub => match (l, r) {
                (Value::Integer(l), Value::Integer(r)) => Ok(Value::Integer(l - r)),
                (Value::Decimal(l), Value::Decimal(r)) => Ok(Value::Decimal(l - r)),
                (l, r) => Err(Self::arithmetic_mismatch(op, &l, &r)),
            },
            BinaryOp::Mul => match (l, r) {
                (Value::Integer(l), Value::Integer(r)) => Ok(Value::Integer(l * r)),
                (Value::Decimal(l), Value::Decimal(r)) => Ok(Value::Decimal(l * r)),
                (l, r) => Err(Self::arithmetic_mismatch(op, &l, &r)),
            },
            BinaryOp::Div => match (l, r) {
                (Value::Integer(l), Value::Integer(r)) => {
                    if r.is_zero() {
                        return Err(Error::runtime("division by zero"));
                    }
                    // BigInt division truncates toward zero.
                    Ok(Value::Integer(l / r))
                }
                (Value::Decimal(l), Value::Decimal(r)) => {
                    if r.is_zero() {
                        return Err(Error::runtime("division by zero"));
                    }
                    Ok(Value::Decimal(divide_decimals(&l, &r)))
                }
                (l, r) => Err(Self::arithmetic_mismatch(op, &l, &r)),
            },
            BinaryOp::And | BinaryOp::Or => unreachable!("handled above"),
        }
    }

    fn arithmetic_mismatch(op: BinaryOp, l: &Value, r: &Value) -> Error {
        Error::runtime(format!(
            "`{op}` cannot combine {} and {}",
            l.describe(),
            r.describe()
        ))
    }

    fn eval_access(&mut self, frame: Frame, receiver: Option<&Expr>, name: &str) -> Result<Value> {
        match receiver {
            None => self
                .scopes
                .lookup_variable(frame, name)
                .cloned()
                .ok_or_else(|| Error::runtime(format!("undefined variable `{name}`"))),
            Some(receiver) => match self.eval(frame, receiver)? {
                Value::Object(object) => {
                    object.fields.borrow().get(name).cloned().ok_or_else(|| {
                        Error::runtime(format!(
                            "object `{}` has no field `{name}`",
                            object.type_name
                        ))
                    })
                }
                other => Err(Error::runtime(format!(
                    "{} has no fields",
                    other.describe()
                ))),
            },
        }
    }

    fn eval_call(
        &mut self,
        frame: Frame,
        receiver: Option<&Expr>,
        name: &str,
        arguments: &[Expr],
    ) -> Result<Value> {
        match receiver {
            None => {
                let callable = self
                    .scopes
                    .lookup_function(frame, name, arguments.len())
                    .cloned()
                    .ok_or_else(|| {
                        Error::runtime(format!("undefined function `{name}/{}`", arguments.len()))
                    })?;
                let arguments = self.eval_arguments(frame, arguments)?;
                self.call(callable, arguments)
            }
            Some(receiver) => {
                let on = self.eval(frame, receiver)?;
                let Value::Object(object) = &on else {
                    return Err(Error::runtime(format!(
                        "{} has no methods",
                        on.describe()
                    )));
                };
                let key = (object.type_name.clone(), name.to_string(), arguments.len());
                let native = self.natives.get(&key).cloned().ok_or_else(|| {
                    Error::runtime(format!(
                        "object `{}` has no method `{name}/{}`",
                        object.type_name,
                        arguments.len()
                    ))
                })?;
                let arguments = self.eval_arguments(frame, arguments)?;
                native(&on, &arguments)
            }
        }
    }

    fn eval_arguments(&mut self, frame: Frame, arguments: &[Expr]) -> Result<Vec<Value>> {
        arguments.iter().map(|a| self.eval(frame, a)).collect()
    }
}

/// Decimal division rounds half-to-even at the dividend's fractional digit
/// count, so `1.00 / 8.0` is `0.12`.
fn divide_decimals(l: &BigDecimal, r: &BigDecimal) -> BigDecimal {
    (l / r).with_scale_round(l.fractional_digit_count().max(0), RoundingMode::HalfEven)
}
