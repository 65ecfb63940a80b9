//! Static type model
//!
//! Types are nominal: two types are the same exactly when their names are.
//! Each type carries an `external` name, the spelling the code generator
//! uses on its Java target (`Integer` becomes `int`, `Nil` becomes `Void`).
//! Record types additionally carry field and method tables for resolving
//! dotted access; the built-ins have empty tables.

use crate::diagnostics::{Error, Result};
use indexmap::IndexMap;
use std::rc::Rc;

pub const ANY: &str = "Any";
pub const NIL: &str = "Nil";
pub const INTEGER_ITERABLE: &str = "IntegerIterable";
pub const COMPARABLE: &str = "Comparable";
pub const BOOLEAN: &str = "Boolean";
pub const INTEGER: &str = "Integer";
pub const DECIMAL: &str = "Decimal";
pub const CHARACTER: &str = "Character";
pub const STRING: &str = "String";

/// A nominal type with its target-language name and member tables.
#[derive(Debug, Clone)]
pub struct Type {
    pub name: String,
    pub external: String,
    pub fields: Rc<IndexMap<String, Variable>>,
    pub methods: Rc<IndexMap<(String, usize), Function>>,
}

impl Type {
    /// A type with no members.
    pub fn simple(name: impl Into<String>, external: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            external: external.into(),
            fields: Rc::new(IndexMap::new()),
            methods: Rc::new(IndexMap::new()),
        }
    }

    pub fn record(
        name: impl Into<String>,
        external: impl Into<String>,
        fields: IndexMap<String, Variable>,
        methods: IndexMap<(String, usize), Function>,
    ) -> Self {
        Self {
            name: name.into(),
            external: external.into(),
            fields: Rc::new(fields),
            methods: Rc::new(methods),
        }
    }

    pub fn is(&self, name: &str) -> bool {
        self.name == name
    }

    /// Whether a value of type `value` may be assigned to a slot of this
    /// type: `Any` accepts everything, `Comparable` accepts every concrete
    /// type except `Any`, `Nil`, and `IntegerIterable` (registered record
    /// types included), anything else requires the same name.
    pub fn accepts(&self, value: &Type) -> bool {
        match self.name.as_str() {
            ANY => true,
            COMPARABLE => !matches!(value.name.as_str(), ANY | NIL | INTEGER_ITERABLE),
            _ => self.name == value.name,
        }
    }
}

impl PartialEq for Type {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl std::fmt::Display for Type {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// A named slot (field, parameter, or local) with its resolved type.
#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    pub name: String,
    pub external: String,
    pub ty: Type,
}

impl Variable {
    pub fn new(name: impl Into<String>, ty: Type) -> Self {
        let name = name.into();
        Self {
            external: name.clone(),
            name,
            ty,
        }
    }
}

/// A callable with its resolved signature.
#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    pub name: String,
    pub external: String,
    pub parameters: Vec<Type>,
    pub ret: Type,
}

impl Function {
    pub fn new(name: impl Into<String>, parameters: Vec<Type>, ret: Type) -> Self {
        let name = name.into();
        Self {
            external: name.clone(),
            name,
            parameters,
            ret,
        }
    }

    pub fn with_external(mut self, external: impl Into<String>) -> Self {
        self.external = external.into();
        self
    }

    pub fn arity(&self) -> usize {
        self.parameters.len()
    }
}

/// The set of types a program may name.
///
/// Seeded with the nine built-ins; embedders may [`define`] record types
/// before checking so dotted access against them resolves.
///
/// [`define`]: TypeRegistry::define
#[derive(Debug, Clone)]
pub struct TypeRegistry {
    types: IndexMap<String, Type>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        let mut registry = Self {
            types: IndexMap::new(),
        };
        registry.define(Type::simple(ANY, "Object"));
        registry.define(Type::simple(NIL, "Void"));
        registry.define(Type::simple(INTEGER_ITERABLE, "Iterable<Integer>"));
        registry.define(Type::simple(COMPARABLE, "Comparable"));
        registry.define(Type::simple(BOOLEAN, "boolean"));
        registry.define(Type::simple(INTEGER, "int"));
        registry.define(Type::simple(DECIMAL, "double"));
        registry.define(Type::simple(CHARACTER, "char"));
        registry.define(Type::simple(STRING, "String"));
        registry
    }

    pub fn define(&mut self, ty: Type) {
        self.types.insert(ty.name.clone(), ty);
    }

    pub fn get(&self, name: &str) -> Option<&Type> {
        self.types.get(name)
    }

    /// A known type by name, for the nine built-in names the registry is
    /// seeded with. Unknown names fall back to an opaque nominal type.
    pub fn builtin(&self, name: &str) -> Type {
        self.get(name)
            .cloned()
            .unwrap_or_else(|| Type::simple(name, name))
    }

    /// Resolve a type name appearing in source, or fail the check.
    pub fn resolve(&self, name: &str) -> Result<Type> {
        self.get(name)
            .cloned()
            .ok_or_else(|| Error::type_error(format!("unknown type `{name}`")))
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn any_accepts_everything() {
        let registry = TypeRegistry::new();
        let any = registry.resolve(ANY).unwrap();
        for name in [NIL, INTEGER_ITERABLE, COMPARABLE, BOOLEAN, INTEGER] {
            assert!(any.accepts(&registry.resolve(name).unwrap()), "{name}");
        }
    }

    #[test]
    fn comparable_rejects_only_the_unordered_builtins() {
        let registry = TypeRegistry::new();
        let comparable = registry.resolve(COMPARABLE).unwrap();
        for name in [BOOLEAN, INTEGER, DECIMAL, CHARACTER, STRING, COMPARABLE] {
            assert!(comparable.accepts(&registry.resolve(name).unwrap()), "{name}");
        }
        for name in [ANY, NIL, INTEGER_ITERABLE] {
            assert!(!comparable.accepts(&registry.resolve(name).unwrap()), "{name}");
        }
    }

    #[test]
    fn comparable_accepts_registered_record_types() {
        let mut registry = TypeRegistry::new();
        registry.define(Type::simple("Point", "Point"));
        let comparable = registry.resolve(COMPARABLE).unwrap();
        assert!(comparable.accepts(&registry.resolve("Point").unwrap()));
    }

    #[test]
    fn assignability_is_reflexive() {
        let registry = TypeRegistry::new();
        for name in [
            ANY,
            NIL,
            INTEGER_ITERABLE,
            COMPARABLE,
            BOOLEAN,
            INTEGER,
            DECIMAL,
            CHARACTER,
            STRING,
        ] {
            let ty = registry.resolve(name).unwrap();
            assert!(ty.accepts(&ty), "{name}");
        }
    }

    #[test]
    fn other_types_require_name_equality() {
        let registry = TypeRegistry::new();
        let integer = registry.resolve(INTEGER).unwrap();
        assert!(integer.accepts(&registry.resolve(INTEGER).unwrap()));
        assert!(!integer.accepts(&registry.resolve(DECIMAL).unwrap()));
        assert!(!integer.accepts(&registry.resolve(ANY).unwrap()));
    }

    #[test]
    fn unknown_type_names_fail_resolution() {
        let registry = TypeRegistry::new();
        assert!(registry.resolve("Widget").is_err());
    }
}
