use strum::EnumCount;

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    serde::Serialize,
    serde::Deserialize,
    strum::Display,
    strum::AsRefStr,
    strum::IntoStaticStr,
    strum::FromRepr,
    strum_macros::EnumCount,
    strum::EnumIter,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[non_exhaustive]
pub enum ErrorCode {
    BadRequest,
    InternalServerError,
    // Operation preparation phases
    OperationParsingError,
    OperationPlanningError,
    VariableError,
    // Field resolution
    ResolverError,
    ResolverPanic,
    TypeMismatch,
    // Context
    OperationCancelled,
    OperationTimeout,
    // Introspection
    Unauthorized,
}

impl ErrorCode {
    pub fn count() -> usize {
        Self::COUNT
    }
}
