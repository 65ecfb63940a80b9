//! Runtime values

use bigdecimal::BigDecimal;
use indexmap::IndexMap;
use num_bigint::BigInt;
use std::cell::RefCell;
use std::cmp::Ordering;
use std::fmt;
use std::rc::Rc;

/// A value produced by evaluation.
///
/// Numbers are arbitrary precision. `List` is the iterable-of-integers a
/// `FOR` consumes; the language has no list literals, so lists only enter a
/// program through the embedding. `Object` instances are shared by
/// reference and compare by identity.
#[derive(Debug, Clone)]
pub enum Value {
    Nil,
    Boolean(bool),
    Character(char),
    String(String),
    Integer(BigInt),
    Decimal(BigDecimal),
    List(Rc<Vec<Value>>),
    Object(Rc<Object>),
}

/// An instance with mutable named fields.
#[derive(Debug)]
pub struct Object {
    pub type_name: String,
    pub fields: RefCell<IndexMap<String, Value>>,
}

impl Object {
    pub fn new(type_name: impl Into<String>, fields: IndexMap<String, Value>) -> Self {
        Self {
            type_name: type_name.into(),
            fields: RefCell::new(fields),
        }
    }
}

impl Value {
    /// The kind of value, for error messages.
    pub fn describe(&self) -> &'static str {
        match self {
            Value::Nil => "NIL",
            Value::Boolean(_) => "a Boolean",
            Value::Character(_) => "a Character",
            Value::String(_) => "a String",
            Value::Integer(_) => "an Integer",
            Value::Decimal(_) => "a Decimal",
            Value::List(_) => "a list",
            Value::Object(_) => "an object",
        }
    }
}

/// Ordering for the five orderable kinds; `None` for everything else and
/// for mixed operand kinds.
pub fn compare(left: &Value, right: &Value) -> Option<Ordering> {
    match (left, right) {
        (Value::Boolean(l), Value::Boolean(r)) => l.partial_cmp(r),
        (Value::Character(l), Value::Character(r)) => l.partial_cmp(r),
        (Value::String(l), Value::String(r)) => l.partial_cmp(r),
        (Value::Integer(l), Value::Integer(r)) => l.partial_cmp(r),
        (Value::Decimal(l), Value::Decimal(r)) => l.partial_cmp(r),
        _ => None,
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Nil, Value::Nil) => true,
            (Value::Boolean(l), Value::Boolean(r)) => l == r,
            (Value::Character(l), Value::Character(r)) => l == r,
            (Value::String(l), Value::String(r)) => l == r,
            (Value::Integer(l), Value::Integer(r)) => l == r,
            (Value::Decimal(l), Value::Decimal(r)) => l == r,
            (Value::List(l), Value::List(r)) => l == r,
            (Value::Object(l), Value::Object(r)) => Rc::ptr_eq(l, r),
            _ => false,
        }
    }
}

/// Rendering used by `print` and string concatenation: source-language
/// spelling for `NIL`/`TRUE`/`FALSE`, bare text for characters and strings.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => write!(f, "NIL"),
            Value::Boolean(true) => write!(f, "TRUE"),
            Value::Boolean(false) => write!(f, "FALSE"),
            Value::Character(c) => write!(f, "{c}"),
            Value::String(s) => write!(f, "{s}"),
            Value::Integer(v) => write!(f, "{v}"),
            Value::Decimal(v) => write!(f, "{v}"),
            Value::List(values) => {
                write!(f, "[")?;
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{value}")?;
                }
                write!(f, "]")
            }
            Value::Object(object) => write!(f, "{}", object.type_name),
        }
    }
}
