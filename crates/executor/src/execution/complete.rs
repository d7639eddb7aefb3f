use std::sync::Arc;

use ::error::{ErrorCode, ErrorPath, GraphqlError};
use async_recursion::async_recursion;

use super::{
    container::{merge_failures, resolve_container, ExecutionMode},
    Ctx, ExecutionError,
};
use crate::{
    bind::{BoundType, EnumBinding, ScalarKind},
    plan::{SelectionField, SubSelection},
    response::ResponseValue,
    HostValue,
};

/// Checks `value` against the bound type of its position and writes it out,
/// descending into objects and lists.
#[async_recursion]
pub(super) async fn complete_value(
    ctx: &Ctx,
    ty: &BoundType,
    selection: &SubSelection,
    value: HostValue,
    path: &ErrorPath,
    field: &SelectionField,
) -> Result<ResponseValue, ExecutionError> {
    match ty {
        BoundType::NonNull(inner) => {
            let value = complete_value(ctx, inner, selection, value, path, field).await?;
            if value.is_null() {
                return Err(field_error(
                    field,
                    path,
                    format!(
                        "An error occurred while fetching `{}`, a non-nullable value was expected but no value was found.",
                        field.field.name
                    ),
                    ErrorCode::ResolverError,
                ));
            }
            Ok(value)
        }
        _ if value.is_null() => Ok(ResponseValue::Null),
        BoundType::List(inner) => complete_list(ctx, inner, selection, value, path, field).await,
        BoundType::Scalar(kind) => {
            serialize_scalar(kind, value).map_err(|message| field_error(field, path, message, ErrorCode::TypeMismatch))
        }
        BoundType::Enum(binding) => {
            serialize_enum(binding, value).map_err(|message| field_error(field, path, message, ErrorCode::TypeMismatch))
        }
        BoundType::Object(_) => {
            let SubSelection::Object(set) = selection else {
                return Err(internal_error(field, path));
            };
            let object = resolve_container(ctx, set.clone(), value, path.clone(), ExecutionMode::Concurrent).await?;
            Ok(ResponseValue::Object(object))
        }
        BoundType::Abstract(binding) => {
            let SubSelection::Abstract(sets) = selection else {
                return Err(internal_error(field, path));
            };
            let Some(set) = binding.select(&value).and_then(|index| sets.get(index)) else {
                return Err(field_error(
                    field,
                    path,
                    format!("{} does not match any possible type of `{}`", value.kind(), binding.name),
                    ErrorCode::TypeMismatch,
                ));
            };
            let object = resolve_container(ctx, set.clone(), value, path.clone(), ExecutionMode::Concurrent).await?;
            Ok(ResponseValue::Object(object))
        }
        BoundType::Verbatim => match value {
            HostValue::Json(json) => Ok(ResponseValue::Json(
                Arc::try_unwrap(json).unwrap_or_else(|json| json.as_ref().clone()),
            )),
            _ => Err(internal_error(field, path)),
        },
    }
}

async fn complete_list(
    ctx: &Ctx,
    inner: &BoundType,
    selection: &SubSelection,
    value: HostValue,
    path: &ErrorPath,
    field: &SelectionField,
) -> Result<ResponseValue, ExecutionError> {
    ctx.check_cancelled()?;

    let items = match value {
        HostValue::List(items) => items,
        other => {
            return Err(field_error(
                field,
                path,
                format!("Encountered {} where a list was expected", other.kind()),
                ErrorCode::TypeMismatch,
            ))
        }
    };

    let nullable_items = inner.is_nullable();
    let complete_item = |index: usize, item: HostValue| {
        let path = path.child(index);
        async move {
            match complete_value(ctx, inner, selection, item, &path, field).await {
                Err(ExecutionError::Field(error)) if nullable_items => {
                    ctx.add_error(error);
                    Ok(ResponseValue::Null)
                }
                other => other,
            }
        }
    };

    if !selection.is_async() {
        let mut values = Vec::with_capacity(items.len());
        for (index, item) in items.into_iter().enumerate() {
            values.push(complete_item(index, item).await?);
        }
        return Ok(ResponseValue::List(values));
    }

    let results =
        futures_util::future::join_all(items.into_iter().enumerate().map(|(index, item)| complete_item(index, item)))
            .await;

    let mut values = Vec::with_capacity(results.len());
    let mut failure = None;
    for result in results {
        match result {
            Ok(value) => values.push(value),
            Err(error) => failure = Some(merge_failures(ctx, failure, error)),
        }
    }

    match failure {
        Some(error) => Err(error),
        None => Ok(ResponseValue::List(values)),
    }
}

fn serialize_scalar(kind: &ScalarKind, value: HostValue) -> Result<ResponseValue, String> {
    let value = match (kind, value) {
        (ScalarKind::Int, HostValue::Int(value)) => {
            if i32::try_from(value).is_err() {
                return Err(format!("Int cannot represent non 32-bit signed integer value: {value}"));
            }
            ResponseValue::Int(value)
        }
        (ScalarKind::Float, HostValue::Float(value)) if value.is_finite() => ResponseValue::Float(value),
        (ScalarKind::Float, HostValue::Int(value)) => ResponseValue::Float(value as f64),
        (ScalarKind::String | ScalarKind::Id, HostValue::String(value)) => ResponseValue::String(value),
        (ScalarKind::Id, HostValue::Int(value)) => ResponseValue::String(value.to_string()),
        (ScalarKind::Boolean, HostValue::Boolean(value)) => ResponseValue::Boolean(value),
        (ScalarKind::Custom(name), HostValue::Scalar(scalar)) if scalar.name() == name.as_ref() => {
            ResponseValue::Json(scalar.to_json())
        }
        (ScalarKind::Custom(_), HostValue::Boolean(value)) => ResponseValue::Boolean(value),
        (ScalarKind::Custom(_), HostValue::Int(value)) => ResponseValue::Int(value),
        (ScalarKind::Custom(_), HostValue::Float(value)) => ResponseValue::Float(value),
        (ScalarKind::Custom(_), HostValue::String(value)) => ResponseValue::String(value),
        (ScalarKind::Custom(_), HostValue::Json(json)) => ResponseValue::Json(json.as_ref().clone()),
        (kind, other) => return Err(format!("{} cannot represent {}", kind.name(), other.kind())),
    };
    Ok(value)
}

fn serialize_enum(binding: &EnumBinding, value: HostValue) -> Result<ResponseValue, String> {
    match value {
        HostValue::String(name) if binding.values.contains(&name) => Ok(ResponseValue::String(name)),
        HostValue::String(name) => Err(format!("Enum `{}` has no value `{name}`", binding.name)),
        other => Err(format!("Enum `{}` cannot represent {}", binding.name, other.kind())),
    }
}

fn field_error(field: &SelectionField, path: &ErrorPath, message: String, code: ErrorCode) -> ExecutionError {
    ExecutionError::Field(
        GraphqlError::new(message, code)
            .with_location(field.location)
            .with_path(path.clone()),
    )
}

fn internal_error(field: &SelectionField, path: &ErrorPath) -> ExecutionError {
    tracing::warn!(%path, field = %field.field.trace_label, "selection doesn't match the bound type");
    ExecutionError::Field(
        GraphqlError::internal_server_error()
            .with_location(field.location)
            .with_path(path.clone()),
    )
}

#[cfg(test)]
mod tests {
    use indexmap::IndexSet;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(ScalarKind::Int, HostValue::Int(42), Ok(ResponseValue::Int(42)))]
    #[case(ScalarKind::Int, HostValue::Int(1 << 40), Err("Int cannot represent non 32-bit signed integer value: 1099511627776"))]
    #[case(ScalarKind::Float, HostValue::Int(3), Ok(ResponseValue::Float(3.0)))]
    #[case(ScalarKind::Float, HostValue::Float(f64::NAN), Err("Float cannot represent a float"))]
    #[case(ScalarKind::Id, HostValue::Int(1000), Ok(ResponseValue::String("1000".into())))]
    #[case(ScalarKind::String, HostValue::Boolean(true), Err("String cannot represent a boolean"))]
    #[case(ScalarKind::Custom("Date".into()), HostValue::String("2024-01-01".into()), Ok(ResponseValue::String("2024-01-01".into())))]
    fn scalars(#[case] kind: ScalarKind, #[case] value: HostValue, #[case] expected: Result<ResponseValue, &str>) {
        assert_eq!(serialize_scalar(&kind, value), expected.map_err(str::to_string));
    }

    #[test]
    fn enums_are_checked_against_their_values() {
        let binding = EnumBinding {
            name: "Episode".into(),
            values: IndexSet::from(["NEWHOPE".to_string(), "EMPIRE".to_string(), "JEDI".to_string()]),
        };

        assert_eq!(
            serialize_enum(&binding, HostValue::String("JEDI".into())),
            Ok(ResponseValue::String("JEDI".into()))
        );
        assert_eq!(
            serialize_enum(&binding, HostValue::String("CLONES".into())).unwrap_err(),
            "Enum `Episode` has no value `CLONES`"
        );
    }
}
