use error::{ErrorCode, GraphqlError, Location};

/// Reasons an operation can't be executed at all. They all surface as a
/// request error, without `data`.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum PlanError {
    #[error("Operation name required in request.")]
    OperationNameRequired,
    #[error("Unknown operation named \"{0}\".")]
    UnknownOperation(String),
    #[error("Schema is not configured for {0}s.")]
    UnsupportedOperation(&'static str),
    #[error("Unknown fragment \"{name}\".")]
    UnknownFragment { name: String, location: Location },
    #[error("Cannot query field \"{field}\" on type \"{type_name}\".")]
    UnknownField {
        field: String,
        type_name: String,
        location: Location,
    },
    #[error("Variable \"${name}\" of required type \"{ty}\" was not provided.")]
    MissingVariable {
        name: String,
        ty: String,
        location: Location,
    },
    #[error("Argument \"if\" of directive \"@{directive}\" must be a boolean.")]
    InvalidDirectiveArgument { directive: String, location: Location },
    #[error("Subscription operations must select exactly one top level field, found {count}.")]
    SubscriptionFieldCount { count: usize, location: Location },
    #[error("Unauthorized for introspection.")]
    IntrospectionDisabled { location: Location },
}

impl PlanError {
    pub fn code(&self) -> ErrorCode {
        match self {
            PlanError::MissingVariable { .. } => ErrorCode::VariableError,
            PlanError::IntrospectionDisabled { .. } => ErrorCode::Unauthorized,
            _ => ErrorCode::OperationPlanningError,
        }
    }

    fn location(&self) -> Option<Location> {
        match self {
            PlanError::UnknownFragment { location, .. }
            | PlanError::UnknownField { location, .. }
            | PlanError::MissingVariable { location, .. }
            | PlanError::InvalidDirectiveArgument { location, .. }
            | PlanError::SubscriptionFieldCount { location, .. }
            | PlanError::IntrospectionDisabled { location } => Some(*location),
            _ => None,
        }
    }
}

impl From<PlanError> for GraphqlError {
    fn from(error: PlanError) -> Self {
        let code = error.code();
        let location = error.location();
        GraphqlError::new(error.to_string(), code).with_locations(location)
    }
}
