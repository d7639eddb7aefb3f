use std::fmt;

use async_graphql_parser::types::{BaseType, Type};

/// An output or input type position: a named type wrapped in any number of
/// list and non-null modifiers.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TypeReference {
    Named(String),
    List(Box<TypeReference>),
    NonNull(Box<TypeReference>),
}

impl TypeReference {
    pub fn named(name: impl Into<String>) -> Self {
        TypeReference::Named(name.into())
    }

    pub fn non_null(self) -> Self {
        match self {
            TypeReference::NonNull(_) => self,
            other => TypeReference::NonNull(Box::new(other)),
        }
    }

    pub fn list(self) -> Self {
        TypeReference::List(Box::new(self))
    }

    pub fn is_nullable(&self) -> bool {
        !matches!(self, TypeReference::NonNull(_))
    }

    pub fn is_non_null(&self) -> bool {
        !self.is_nullable()
    }

    pub fn is_list(&self) -> bool {
        match self {
            TypeReference::List(_) => true,
            TypeReference::NonNull(inner) => inner.is_list(),
            TypeReference::Named(_) => false,
        }
    }

    /// The innermost named type, stripped of all wrappers.
    pub fn named_type(&self) -> &str {
        match self {
            TypeReference::Named(name) => name,
            TypeReference::List(inner) | TypeReference::NonNull(inner) => inner.named_type(),
        }
    }
}

impl fmt::Display for TypeReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeReference::Named(name) => f.write_str(name),
            TypeReference::List(inner) => write!(f, "[{inner}]"),
            TypeReference::NonNull(inner) => write!(f, "{inner}!"),
        }
    }
}

impl From<&Type> for TypeReference {
    fn from(ty: &Type) -> Self {
        let base = match &ty.base {
            BaseType::Named(name) => TypeReference::Named(name.to_string()),
            BaseType::List(inner) => TypeReference::List(Box::new(inner.as_ref().into())),
        };
        if ty.nullable {
            base
        } else {
            TypeReference::NonNull(Box::new(base))
        }
    }
}

/// Parses the usual SDL notation, `[Int!]!` and friends. Malformed input falls
/// back to a named type holding the raw text, which the binder reports as unknown.
impl From<&str> for TypeReference {
    fn from(value: &str) -> Self {
        match Type::new(value) {
            Some(ty) => (&ty).into(),
            None => TypeReference::Named(value.to_string()),
        }
    }
}
