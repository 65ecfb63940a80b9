//! Abstract Syntax Tree for the Brio language
//!
//! This module defines the node types produced by the parser. Nodes own
//! their children exclusively (a tree, no sharing). They carry no resolved
//! state: the checker records types and bindings in an [`Analysis`] side
//! table keyed by each node's [`NodeId`].
//!
//! [`Analysis`]: crate::check::Analysis

use crate::common::NodeId;
use bigdecimal::BigDecimal;
use num_bigint::BigInt;
use serde::{Deserialize, Serialize};

/// A whole compilation unit: fields first, then methods.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Source {
    pub fields: Vec<Field>,
    pub methods: Vec<Method>,
}

/// Top-level `LET name [: Type] [= expr];`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub id: NodeId,
    pub name: String,
    pub type_name: Option<String>,
    pub value: Option<Expr>,
}

/// `DEF name(params) [: Type] DO statements END`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Method {
    pub id: NodeId,
    pub name: String,
    pub parameters: Vec<Parameter>,
    pub return_type_name: Option<String>,
    pub statements: Vec<Stmt>,
}

/// `name : Type` in a method's parameter list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    pub type_name: String,
}

/// Statement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Stmt {
    /// An expression evaluated for its effect: `expr;`
    Expression { expr: Expr },
    /// `LET name [: Type] [= expr];`
    Declaration {
        id: NodeId,
        name: String,
        type_name: Option<String>,
        value: Option<Expr>,
    },
    /// `receiver = value;`
    Assignment { receiver: Expr, value: Expr },
    /// `IF cond DO ... [ELSE ...] END`
    If {
        condition: Expr,
        then_branch: Vec<Stmt>,
        else_branch: Vec<Stmt>,
    },
    /// `FOR name IN iterable DO ... END`
    For {
        name: String,
        iterable: Expr,
        body: Vec<Stmt>,
    },
    /// `WHILE cond DO ... END`
    While { condition: Expr, body: Vec<Stmt> },
    /// `RETURN value;`
    Return { value: Expr },
}

/// Expression
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    /// Literal value
    Literal { id: NodeId, value: Literal },
    /// Parenthesized group
    Group { id: NodeId, expr: Box<Expr> },
    /// Binary operation
    Binary {
        id: NodeId,
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    /// Variable or field access: `name` or `receiver.name`
    Access {
        id: NodeId,
        receiver: Option<Box<Expr>>,
        name: String,
    },
    /// Function or method call: `name(args)` or `receiver.name(args)`
    Call {
        id: NodeId,
        receiver: Option<Box<Expr>>,
        name: String,
        arguments: Vec<Expr>,
    },
}

impl Expr {
    pub fn id(&self) -> NodeId {
        match self {
            Expr::Literal { id, .. }
            | Expr::Group { id, .. }
            | Expr::Binary { id, .. }
            | Expr::Access { id, .. }
            | Expr::Call { id, .. } => *id,
        }
    }
}

/// Literal values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Literal {
    Nil,
    Boolean(bool),
    Character(char),
    String(String),
    /// Arbitrary-precision integer; the checker enforces the i32 range.
    Integer(BigInt),
    /// Arbitrary-precision decimal; the checker enforces the f64 range.
    Decimal(BigDecimal),
}

/// Binary operators, lowest precedence first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinaryOp {
    And,
    Or,
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
    Add,
    Sub,
    Mul,
    Div,
}

impl BinaryOp {
    /// The operator's source spelling.
    pub fn as_str(&self) -> &'static str {
        match self {
            BinaryOp::And => "AND",
            BinaryOp::Or => "OR",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
        }
    }
}

impl std::fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
