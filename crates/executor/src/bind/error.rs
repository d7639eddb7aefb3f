#[derive(Debug, thiserror::Error, PartialEq)]
pub enum BindError {
    #[error("type `{0}` is not defined in the schema")]
    UnknownType(String),
    #[error("`{type_name}` is not an object type and cannot be bound to {host}")]
    NotAnObject { type_name: String, host: String },
    #[error("{host} has no method or field matching `{location}`")]
    MissingCapability { location: String, host: String },
    #[error("`{location}` expects {expected} but is bound to {found}")]
    WrongShape {
        location: String,
        expected: String,
        found: String,
    },
    #[error("`{location}` is non-null but is bound to {found}, which may be null")]
    NullableBinding { location: String, found: String },
    #[error("`{location}` declares arguments but its resolver takes none")]
    TooFewParameters { location: String },
    #[error("the resolver of `{location}` takes arguments but the field declares none")]
    TooManyParameters { location: String },
    #[error("`{type_name}` is not a possible type of `{abstract_type}`")]
    UnknownPossibleType { abstract_type: String, type_name: String },
    #[error("subscription field `{location}` must resolve to an event stream")]
    NotAStream { location: String },
    #[error("`{location}` resolves to an event stream outside of a subscription root field")]
    UnexpectedStream { location: String },
    #[error("the schema defines a {operation} type `{type_name}` but no {operation} root value was provided")]
    MissingRootValue { operation: &'static str, type_name: String },
    #[error("a {operation} root value was provided but the schema has no {operation} type")]
    UnexpectedRootValue { operation: &'static str },
}
