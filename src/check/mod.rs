//! Static analysis for the Brio language
//!
//! A single pass over the parsed [`Source`] that resolves every name,
//! assigns a static type to every expression, and rejects programs that
//! break the language's rules. Results go into an [`Analysis`] side table
//! keyed by [`NodeId`]; the AST itself is never mutated. Interpretation and
//! code generation both require a successful analysis.
//!
//! Scope discipline: the root frame predefines `print`; top-level fields
//! live in a child of the root and see only earlier fields; methods live in
//! a child of the field frame, so bodies see every field; each body,
//! branch, and loop iteration scope is a further child frame. Methods bind
//! in source order, and a method is visible inside its own body, so direct
//! recursion works but forward references do not.

use crate::ast::{BinaryOp, Expr, Field, Literal, Method, Source, Stmt};
use crate::common::NodeId;
use crate::diagnostics::{Error, Result};
use crate::scope::{FrameId, ScopeArena};
use crate::types::{self, Function, Type, TypeRegistry, Variable};
use num_traits::ToPrimitive;
use rustc_hash::FxHashMap;

type Scope = FrameId<Variable, Function>;

/// Everything the checker learned, keyed by AST node id.
///
/// `expr_types` holds a type for every expression; `variables` a binding
/// for every access, field, and declaration; `functions` a binding for
/// every call and method.
#[derive(Debug, Default, Clone)]
pub struct Analysis {
    pub expr_types: FxHashMap<NodeId, Type>,
    pub variables: FxHashMap<NodeId, Variable>,
    pub functions: FxHashMap<NodeId, Function>,
}

impl Analysis {
    pub fn type_of(&self, id: NodeId) -> Option<&Type> {
        self.expr_types.get(&id)
    }

    pub fn variable(&self, id: NodeId) -> Option<&Variable> {
        self.variables.get(&id)
    }

    pub fn function(&self, id: NodeId) -> Option<&Function> {
        self.functions.get(&id)
    }
}

/// Analyze `source` with the default environment.
pub fn check(source: &Source) -> Result<Analysis> {
    Checker::new().check(source)
}

/// Checker state
///
/// Construct one, optionally predefine types and variables for an
/// embedding, then call [`check`](Checker::check) once.
pub struct Checker {
    registry: TypeRegistry,
    scopes: ScopeArena<Variable, Function>,
    root: Scope,
    analysis: Analysis,
    return_type: Option<Type>,
}

impl Checker {
    pub fn new() -> Self {
        let registry = TypeRegistry::new();
        let (mut scopes, root) = ScopeArena::new();

        let print = Function::new(
            "print",
            vec![registry.builtin(types::ANY)],
            registry.builtin(types::NIL),
        )
        .with_external("System.out.println");
        scopes.define_function(root, "print", 1, print);

        Self {
            registry,
            scopes,
            root,
            analysis: Analysis::default(),
            return_type: None,
        }
    }

    /// Register a type so programs can name it and resolve its members.
    pub fn define_type(&mut self, ty: Type) {
        self.registry.define(ty);
    }

    /// Predefine a variable in the root frame.
    pub fn define_variable(&mut self, variable: Variable) {
        self.scopes
            .define_variable(self.root, variable.name.clone(), variable);
    }

    /// Analyze the whole program. Consumes the checker; the returned
    /// [`Analysis`] is immutable from here on.
    pub fn check(mut self, source: &Source) -> Result<Analysis> {
        let fields = self.scopes.push(self.root);
        for field in &source.fields {
            self.check_field(fields, field)?;
        }

        let methods = self.scopes.push(fields);
        for method in &source.methods {
            self.check_method(methods, method)?;
        }

        let main = self
            .scopes
            .lookup_function(methods, "main", 0)
            .ok_or_else(|| Error::type_error("no `main` method with zero parameters"))?;
        if !self.registry.builtin(types::INTEGER).accepts(&main.ret) {
            return Err(Error::type_error(format!(
                "`main` must return `Integer`, found `{}`",
                main.ret
            )));
        }

        tracing::debug!(
            expressions = self.analysis.expr_types.len(),
            variables = self.analysis.variables.len(),
            functions = self.analysis.functions.len(),
            "analysis complete"
        );
        Ok(self.analysis)
    }

    // ==================== DECLARATIONS ====================

    fn check_field(&mut self, scope: Scope, field: &Field) -> Result<()> {
        self.check_declaration(
            scope,
            field.id,
            &field.name,
            field.type_name.as_deref(),
            field.value.as_ref(),
        )
    }

    /// Shared by fields and local `LET` statements.
    fn check_declaration(
        &mut self,
        scope: Scope,
        id: NodeId,
        name: &str,
        type_name: Option<&str>,
        value: Option<&Expr>,
    ) -> Result<()> {
        if self.scopes.is_defined_here(scope, name) {
            return Err(Error::type_error(format!(
                "`{name}` is already defined in this scope"
            )));
        }

        let declared = type_name.map(|n| self.registry.resolve(n)).transpose()?;
        let initializer = value.map(|e| self.check_expr(scope, e)).transpose()?;

        let ty = match (declared, initializer) {
            (Some(declared), Some(initializer)) => {
                if !declared.accepts(&initializer) {
                    return Err(Error::type_error(format!(
                        "cannot initialize `{name}: {declared}` with a `{initializer}` value"
                    )));
                }
                declared
            }
            (Some(declared), None) => declared,
            (None, Some(initializer)) => initializer,
            (None, None) => {
                return Err(Error::type_error(format!(
                    "declaration of `{name}` needs a type or an initializer"
                )));
            }
        };

        let variable = Variable::new(name, ty);
        self.scopes.define_variable(scope, name, variable.clone());
        self.analysis.variables.insert(id, variable);
        Ok(())
    }

    fn check_method(&mut self, scope: Scope, method: &Method) -> Result<()> {
        let arity = method.parameters.len();
        if self.scopes.is_function_defined_here(scope, &method.name, arity) {
            return Err(Error::type_error(format!(
                "method `{}/{arity}` is already defined",
                method.name
            )));
        }

        let parameters = method
            .parameters
            .iter()
            .map(|p| self.registry.resolve(&p.type_name))
            .collect::<Result<Vec<_>>>()?;
        let ret = match &method.return_type_name {
            Some(name) => self.registry.resolve(name)?,
            None => self.registry.builtin(types::NIL),
        };

        // Bound before the body is checked, so the method can call itself.
        let function = Function::new(&method.name, parameters, ret.clone());
        self.scopes
            .define_function(scope, &method.name, arity, function.clone());
        self.analysis.functions.insert(method.id, function.clone());

        let body = self.scopes.push(scope);
        for (parameter, ty) in method.parameters.iter().zip(&function.parameters) {
            if self.scopes.is_defined_here(body, &parameter.name) {
                return Err(Error::type_error(format!(
                    "duplicate parameter `{}` in method `{}`",
                    parameter.name, method.name
                )));
            }
            self.scopes
                .define_variable(body, &parameter.name, Variable::new(&parameter.name, ty.clone()));
        }

        let enclosing = self.return_type.replace(ret);
        let result = self.check_statements(body, &method.statements);
        self.return_type = enclosing;
        result
    }

    // ==================== STATEMENTS ====================

    /// Check `statements` in a fresh child frame of `parent`.
    fn check_block(&mut self, parent: Scope, statements: &[Stmt]) -> Result<()> {
        let scope = self.scopes.push(parent);
        self.check_statements(scope, statements)
    }

    fn check_statements(&mut self, scope: Scope, statements: &[Stmt]) -> Result<()> {
        for statement in statements {
            self.check_statement(scope, statement)?;
        }
        Ok(())
    }

    fn check_statement(&mut self, scope: Scope, statement: &Stmt) -> Result<()> {
        match statement {
            Stmt::Expression { expr } => {
                if !matches!(expr, Expr::Call { .. }) {
                    return Err(Error::type_error(
                        "an expression statement must be a call",
                    ));
                }
                self.check_expr(scope, expr)?;
                Ok(())
            }
            Stmt::Declaration {
                id,
                name,
                type_name,
                value,
            } => self.check_declaration(scope, *id, name, type_name.as_deref(), value.as_ref()),
            Stmt::Assignment { receiver, value } => {
                if !matches!(receiver, Expr::Access { .. }) {
                    return Err(Error::type_error(
                        "only a variable or field can be assigned",
                    ));
                }
                let target = self.check_expr(scope, receiver)?;
                let supplied = self.check_expr(scope, value)?;
                if !target.accepts(&supplied) {
                    return Err(Error::type_error(format!(
                        "cannot assign a `{supplied}` value to a `{target}` slot"
                    )));
                }
                Ok(())
            }
            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                self.require_condition(scope, condition)?;
                if then_branch.is_empty() {
                    return Err(Error::type_error(
                        "an IF needs at least one statement in its then-branch",
                    ));
                }
                self.check_block(scope, then_branch)?;
                self.check_block(scope, else_branch)
            }
            Stmt::For {
                name,
                iterable,
                body,
            } => {
                let supplied = self.check_expr(scope, iterable)?;
                if !supplied.is(types::INTEGER_ITERABLE) {
                    return Err(Error::type_error(format!(
                        "FOR iterates an `IntegerIterable`, found `{supplied}`"
                    )));
                }
                if body.is_empty() {
                    return Err(Error::type_error(
                        "a FOR needs at least one statement in its body",
                    ));
                }
                // The induction variable is scoped to the loop body.
                let frame = self.scopes.push(scope);
                let integer = self.registry.builtin(types::INTEGER);
                self.scopes
                    .define_variable(frame, name, Variable::new(name, integer));
                self.check_statements(frame, body)
            }
            Stmt::While { condition, body } => {
                self.require_condition(scope, condition)?;
                self.check_block(scope, body)
            }
            Stmt::Return { value } => {
                let supplied = self.check_expr(scope, value)?;
                let expected = self
                    .return_type
                    .clone()
                    .ok_or_else(|| Error::type_error("RETURN outside of a method"))?;
                if !expected.accepts(&supplied) {
                    return Err(Error::type_error(format!(
                        "cannot return `{supplied}` from a method declared to return `{expected}`"
                    )));
                }
                Ok(())
            }
        }
    }

    fn require_condition(&mut self, scope: Scope, condition: &Expr) -> Result<()> {
        let supplied = self.check_expr(scope, condition)?;
        if !supplied.is(types::BOOLEAN) {
            return Err(Error::type_error(format!(
                "a condition must be `Boolean`, found `{supplied}`"
            )));
        }
        Ok(())
    }

    // ==================== EXPRESSIONS ====================

    fn check_expr(&mut self, scope: Scope, expr: &Expr) -> Result<Type> {
        let ty = match expr {
            Expr::Literal { value, .. } => self.check_literal(value)?,
            Expr::Group { expr: inner, .. } => {
                if !matches!(inner.as_ref(), Expr::Binary { .. }) {
                    return Err(Error::type_error(
                        "a group must contain a binary expression",
                    ));
                }
                self.check_expr(scope, inner)?
            }
            Expr::Binary {
                op, left, right, ..
            } => self.check_binary(scope, *op, left, right)?,
            Expr::Access { id, receiver, name } => {
                self.check_access(scope, *id, receiver.as_deref(), name)?
            }
            Expr::Call {
                id,
                receiver,
                name,
                arguments,
            } => self.check_call(scope, *id, receiver.as_deref(), name, arguments)?,
        };
        self.analysis.expr_types.insert(expr.id(), ty.clone());
        Ok(ty)
    }

    fn check_literal(&self, value: &Literal) -> Result<Type> {
        let name = match value {
            Literal::Nil => types::NIL,
            Literal::Boolean(_) => types::BOOLEAN,
            Literal::Character(_) => types::CHARACTER,
            Literal::String(_) => types::STRING,
            Literal::Integer(v) => {
                if v.to_i32().is_none() {
                    return Err(Error::type_error(format!(
                        "integer literal `{v}` is out of range"
                    )));
                }
                types::INTEGER
            }
            Literal::Decimal(v) => {
                if !v.to_f64().is_some_and(f64::is_finite) {
                    return Err(Error::type_error(format!(
                        "decimal literal `{v}` is out of range"
                    )));
                }
                types::DECIMAL
            }
        };
        Ok(self.registry.builtin(name))
    }

    /// One result type per operator: logical operators take and yield
    /// `Boolean`, comparisons take two `Comparable` operands of the same
    /// type and yield `Boolean`, `+` concatenates when either side is a
    /// `String`, and the arithmetic operators stay within one numeric type.
    fn check_binary(&mut self, scope: Scope, op: BinaryOp, left: &Expr, right: &Expr) -> Result<Type> {
        let l = self.check_expr(scope, left)?;
        let r = self.check_expr(scope, right)?;

        match op {
            BinaryOp::And | BinaryOp::Or => {
                if !l.is(types::BOOLEAN) || !r.is(types::BOOLEAN) {
                    return Err(Error::type_error(format!(
                        "`{op}` needs `Boolean` operands, found `{l}` and `{r}`"
                    )));
                }
                Ok(self.registry.builtin(types::BOOLEAN))
            }
            BinaryOp::Lt
            | BinaryOp::Le
            | BinaryOp::Gt
            | BinaryOp::Ge
            | BinaryOp::Eq
            | BinaryOp::Ne => {
                let comparable = self.registry.builtin(types::COMPARABLE);
                if !comparable.accepts(&l) || !comparable.accepts(&r) {
                    return Err(Error::type_error(format!(
                        "`{op}` needs `Comparable` operands, found `{l}` and `{r}`"
                    )));
                }
                if l != r {
                    return Err(Error::type_error(format!(
                        "`{op}` needs operands of the same type, found `{l}` and `{r}`"
                    )));
                }
                Ok(self.registry.builtin(types::BOOLEAN))
            }
            BinaryOp::Add if l.is(types::STRING) || r.is(types::STRING) => {
                Ok(self.registry.builtin(types::STRING))
            }
            BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div => {
                if l.is(types::INTEGER) && r.is(types::INTEGER) {
                    Ok(self.registry.builtin(types::INTEGER))
                } else if l.is(types::DECIMAL) && r.is(types::DECIMAL) {
                    Ok(self.registry.builtin(types::DECIMAL))
                } else {
                    Err(Error::type_error(format!(
                        "`{op}` needs two `Integer` or two `Decimal` operands, found `{l}` and `{r}`"
                    )))
                }
            }
        }
    }

    fn check_access(
        &mut self,
        scope: Scope,
        id: NodeId,
        receiver: Option<&Expr>,
        name: &str,
    ) -> Result<Type> {
        let variable = match receiver {
            None => self
                .scopes
                .lookup_variable(scope, name)
                .cloned()
                .ok_or_else(|| Error::type_error(format!("undefined variable `{name}`")))?,
            Some(receiver) => {
                let on = self.check_expr(scope, receiver)?;
                on.fields.get(name).cloned().ok_or_else(|| {
                    Error::type_error(format!("type `{on}` has no field `{name}`"))
                })?
            }
        };
        let ty = variable.ty.clone();
        self.analysis.variables.insert(id, variable);
        Ok(ty)
    }

    fn check_call(
        &mut self,
        scope: Scope,
        id: NodeId,
        receiver: Option<&Expr>,
        name: &str,
        arguments: &[Expr],
    ) -> Result<Type> {
        let arity = arguments.len();
        let function = match receiver {
            None => self
                .scopes
                .lookup_function(scope, name, arity)
                .cloned()
                .ok_or_else(|| {
                    Error::type_error(format!("undefined function `{name}/{arity}`"))
                })?,
            Some(receiver) => {
                let on = self.check_expr(scope, receiver)?;
                on.methods
                    .get(&(name.to_string(), arity))
                    .cloned()
                    .ok_or_else(|| {
                        Error::type_error(format!("type `{on}` has no method `{name}/{arity}`"))
                    })?
            }
        };

        for (argument, parameter) in arguments.iter().zip(&function.parameters) {
            let supplied = self.check_expr(scope, argument)?;
            if !parameter.accepts(&supplied) {
                return Err(Error::type_error(format!(
                    "cannot pass a `{supplied}` argument where `{parameter}` is expected in `{name}`"
                )));
            }
        }

        let ty = function.ret.clone();
        self.analysis.functions.insert(id, function);
        Ok(ty)
    }
}

impl Default for Checker {
    fn default() -> Self {
        Self::new()
    }
}
