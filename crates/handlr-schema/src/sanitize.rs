//! Concurrent input sanitization.
//!
//! [`sanitize`] runs one task per declared field. Tasks are plain futures
//! joined on the calling task; none depends on another's result.
//!
//! Join semantics:
//!
//! - A task that fails with a [`HandlrError`] aborts the join immediately and
//!   the error propagates unchanged.
//! - Declarative rejections (`required`, validator messages, bad arrays) are
//!   ordinary task results. Once every task has finished, they are reported
//!   together as one [`HandlrError::Validation`].

use futures_util::future::try_join_all;
use handlr_core::{path, FieldFailure, HandlrError, HandlrResult, Map, ValidationFailure, Value};

use crate::chain::{BoxFuture, DEFAULT_MESSAGE};
use crate::compile::{FieldSpec, Schema, Shape};

/// The result of sanitizing one field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldOutcome {
    /// The sanitized value.
    Value(Value),
    /// The field is absent and optional; it is omitted from the output.
    Absent,
    /// The field was rejected.
    Failed(FieldFailure),
}

/// Sanitizes `input` against a compiled schema.
///
/// Returns the sanitized tree, holding only declared fields.
///
/// # Errors
///
/// - [`HandlrError::Validation`] whose cause maps each rejected field (or its
///   `name` alias) to its failure.
/// - Any fault raised by a formatter or validator, unchanged.
///
/// # Example
///
/// ```
/// use handlr_schema::{compile, sanitize, FieldDef, SchemaDescription};
/// use serde_json::json;
///
/// # tokio_test::block_on(async {
/// let schema = compile(&SchemaDescription::new()
///     .field("a", FieldDef::new().required())
///     .field("b", FieldDef::new().required()))
///     .unwrap();
///
/// let err = sanitize(&schema, &json!({})).await.unwrap_err();
/// let failure = err.failure().unwrap();
/// assert_eq!(failure.keys().collect::<Vec<_>>(), vec!["a", "b"]);
/// # });
/// ```
pub async fn sanitize(schema: &Schema, input: &Value) -> HandlrResult<Map<String, Value>> {
    sanitize_tree(schema, input).await
}

fn sanitize_tree<'a>(schema: &'a Schema, input: &'a Value) -> BoxFuture<'a, HandlrResult<Map<String, Value>>> {
    Box::pin(async move {
        let tasks = schema.iter().map(|(field, spec)| async move {
            let outcome = sanitize_field(spec, path::pick(input, field)).await?;
            Ok::<_, HandlrError>((field, spec, outcome))
        });
        let results = try_join_all(tasks).await?;

        let mut sanitized = Map::new();
        let mut failures = ValidationFailure::new();
        for (field, spec, outcome) in results {
            match outcome {
                FieldOutcome::Value(value) => path::put(&mut sanitized, field, value),
                FieldOutcome::Absent => {}
                FieldOutcome::Failed(failure) => failures.insert(spec.failure_key(field), failure),
            }
        }

        if failures.is_empty() {
            Ok(sanitized)
        } else {
            tracing::debug!(fields = failures.len(), "input rejected by schema");
            Err(HandlrError::validation(failures))
        }
    })
}

/// Sanitizes a single value against one field spec.
///
/// `None` and JSON `null` are both treated as absent.
pub fn sanitize_field<'a>(
    spec: &'a FieldSpec,
    value: Option<&'a Value>,
) -> BoxFuture<'a, HandlrResult<FieldOutcome>> {
    Box::pin(async move {
        let value = match value {
            Some(value) if !value.is_null() => value,
            _ => return Ok(absent(spec)),
        };

        let mut value = match spec.shape() {
            Shape::Scalar => value.clone(),
            Shape::Object(properties) => match sanitize_tree(properties, value).await {
                Ok(nested) => Value::Object(nested),
                Err(HandlrError::Validation { cause, .. }) => {
                    return Ok(FieldOutcome::Failed(FieldFailure::Nested(cause)))
                }
                Err(fault) => return Err(fault),
            },
            Shape::Array(element) => {
                let Value::Array(items) = value else {
                    return Ok(FieldOutcome::Failed(DEFAULT_MESSAGE.into()));
                };
                match sanitize_elements(element, items).await? {
                    Ok(items) => Value::Array(items),
                    Err(failure) => return Ok(FieldOutcome::Failed(failure)),
                }
            }
        };

        for formatter in spec.formatters() {
            value = formatter.apply(value).await?;
        }

        for validator in spec.validators() {
            if !validator.check(&value).await? {
                return Ok(FieldOutcome::Failed(validator.message().into()));
            }
        }

        Ok(FieldOutcome::Value(value))
    })
}

/// Sanitizes every element concurrently, preserving order.
///
/// Any rejected element rejects the whole sequence with a single message:
/// the element's own message, or `"invalid"` for a nested failure map.
async fn sanitize_elements(
    element: &FieldSpec,
    items: &[Value],
) -> HandlrResult<Result<Vec<Value>, FieldFailure>> {
    let outcomes = try_join_all(items.iter().map(|item| sanitize_field(element, Some(item)))).await?;

    let mut sanitized = Vec::with_capacity(outcomes.len());
    for outcome in outcomes {
        match outcome {
            FieldOutcome::Value(value) => sanitized.push(value),
            FieldOutcome::Absent => sanitized.push(Value::Null),
            FieldOutcome::Failed(FieldFailure::Message(message)) => {
                return Ok(Err(FieldFailure::Message(message)))
            }
            FieldOutcome::Failed(FieldFailure::Nested(_)) => return Ok(Err(DEFAULT_MESSAGE.into())),
        }
    }
    Ok(Ok(sanitized))
}

fn absent(spec: &FieldSpec) -> FieldOutcome {
    match (spec.required().message(), spec.default_value()) {
        (None, _) => FieldOutcome::Absent,
        (Some(_), Some(default)) => FieldOutcome::Value(default.clone()),
        (Some(message), None) => FieldOutcome::Failed(message.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::{Formatter, Predicate};
    use crate::compile::compile;
    use crate::description::{FieldDef, SchemaDescription};
    use serde_json::json;

    fn schema(description: SchemaDescription) -> Schema {
        compile(&description).expect("schema should compile")
    }

    #[tokio::test]
    async fn test_optional_absent_field_is_omitted() {
        let schema = schema(SchemaDescription::fields(["a", "b"]));
        let sanitized = sanitize(&schema, &json!({ "a": 1, "c": 3 })).await.unwrap();
        assert_eq!(Value::Object(sanitized), json!({ "a": 1 }));
    }

    #[tokio::test]
    async fn test_null_counts_as_absent() {
        let schema = schema(SchemaDescription::new().field("a", FieldDef::new().required()));
        let err = sanitize(&schema, &json!({ "a": null })).await.unwrap_err();
        assert_eq!(err.failure().unwrap().message_at("a"), Some("required"));
    }

    #[tokio::test]
    async fn test_custom_required_message() {
        let schema = schema(SchemaDescription::new().field("a", FieldDef::new().required_with("give me a")));
        let err = sanitize(&schema, &json!({})).await.unwrap_err();
        assert_eq!(err.failure().unwrap().message_at("a"), Some("give me a"));
    }

    #[tokio::test]
    async fn test_default_only_applies_to_required_fields() {
        let schema = schema(
            SchemaDescription::new()
                .field("a", FieldDef::new().required().default(json!(0)))
                .field("b", FieldDef::new().default(json!(5))),
        );
        let sanitized = sanitize(&schema, &json!({})).await.unwrap();
        assert_eq!(Value::Object(sanitized), json!({ "a": 0 }));
    }

    #[tokio::test]
    async fn test_default_skips_formatters_and_validators() {
        let schema = schema(SchemaDescription::new().field(
            "a",
            FieldDef::new()
                .required()
                .default(json!(-1))
                .validator((Predicate::new(|v| v.as_i64().is_some_and(|n| n >= 0)), "negative")),
        ));
        let sanitized = sanitize(&schema, &json!({})).await.unwrap();
        assert_eq!(sanitized["a"], json!(-1));
    }

    #[tokio::test]
    async fn test_formatters_apply_in_order() {
        let schema = schema(SchemaDescription::new().field(
            "n",
            FieldDef::new()
                .formatter(Formatter::new(|v| json!(v.as_i64().unwrap_or(0) + 1)))
                .formatter(Formatter::new(|v| json!(v.as_i64().unwrap_or(0) * 10))),
        ));
        let sanitized = sanitize(&schema, &json!({ "n": 2 })).await.unwrap();
        assert_eq!(sanitized["n"], json!(30));
    }

    #[tokio::test]
    async fn test_validators_see_formatted_value_and_short_circuit() {
        use std::sync::atomic::{AtomicUsize, Ordering};
        use std::sync::Arc;

        let later_calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&later_calls);
        let schema = schema(SchemaDescription::new().field(
            "s",
            FieldDef::new()
                .formatter(Formatter::new(|v| json!(v.as_str().unwrap_or_default().trim())))
                .validator((Predicate::new(|v| v.as_str().is_some_and(|s| !s.is_empty())), "empty"))
                .validator(Predicate::new(move |_| {
                    counter.fetch_add(1, Ordering::SeqCst);
                    true
                })),
        ));

        let err = sanitize(&schema, &json!({ "s": "   " })).await.unwrap_err();
        assert_eq!(err.failure().unwrap().message_at("s"), Some("empty"));
        assert_eq!(later_calls.load(Ordering::SeqCst), 0);

        let sanitized = sanitize(&schema, &json!({ "s": "  hi " })).await.unwrap();
        assert_eq!(sanitized["s"], json!("hi"));
        assert_eq!(later_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_nested_properties_replace_raw_value() {
        let schema = schema(SchemaDescription::new().field(
            "user",
            FieldDef::new().properties(
                SchemaDescription::new()
                    .field("name", FieldDef::new().formatter(Formatter::new(|v| {
                        json!(v.as_str().unwrap_or_default().to_uppercase())
                    })))
                    .field("role", FieldDef::new().required().default(json!("member"))),
            ),
        ));
        let sanitized = sanitize(&schema, &json!({ "user": { "name": "ada", "extra": true } }))
            .await
            .unwrap();
        assert_eq!(
            Value::Object(sanitized),
            json!({ "user": { "name": "ADA", "role": "member" } })
        );
    }

    #[tokio::test]
    async fn test_array_requires_sequence() {
        let schema = schema(SchemaDescription::new().field("a", FieldDef::new().array(true)));
        let err = sanitize(&schema, &json!({ "a": "nope" })).await.unwrap_err();
        assert_eq!(err.failure().unwrap().message_at("a"), Some("invalid"));
    }

    #[tokio::test]
    async fn test_array_keeps_absent_elements_as_null() {
        let schema = schema(SchemaDescription::new().field("a", FieldDef::new().array(true)));
        let sanitized = sanitize(&schema, &json!({ "a": [1, null, 3] })).await.unwrap();
        assert_eq!(sanitized["a"], json!([1, null, 3]));
    }

    #[tokio::test]
    async fn test_array_of_objects_collapses_nested_failure() {
        let schema = schema(SchemaDescription::new().field(
            "items",
            FieldDef::new().array(FieldDef::new().properties(
                SchemaDescription::new().field("id", FieldDef::new().required()),
            )),
        ));
        let err = sanitize(&schema, &json!({ "items": [{ "id": 1 }, {}] }))
            .await
            .unwrap_err();
        assert_eq!(err.failure().unwrap().message_at("items"), Some("invalid"));
    }

    #[tokio::test]
    async fn test_dotted_field_names() {
        let schema = schema(
            SchemaDescription::new()
                .field("user.email", FieldDef::new().required())
                .field("user.name", true),
        );
        let sanitized = sanitize(&schema, &json!({ "user": { "email": "a@b.c", "name": "ada" } }))
            .await
            .unwrap();
        assert_eq!(
            Value::Object(sanitized),
            json!({ "user": { "email": "a@b.c", "name": "ada" } })
        );

        let err = sanitize(&schema, &json!({ "user": {} })).await.unwrap_err();
        assert_eq!(err.failure().unwrap().keys().collect::<Vec<_>>(), vec!["user.email"]);
    }

    #[tokio::test]
    async fn test_failure_reported_under_alias() {
        let schema = schema(SchemaDescription::new().field("e", FieldDef::new().required().name("email")));
        let err = sanitize(&schema, &json!({})).await.unwrap_err();
        assert_eq!(err.failure().unwrap().keys().collect::<Vec<_>>(), vec!["email"]);
    }

    #[tokio::test]
    async fn test_formatter_fault_propagates() {
        let schema = schema(SchemaDescription::new().field(
            "a",
            FieldDef::new().formatter(Formatter::fallible(|_| Err(HandlrError::value("cannot parse")))),
        ));
        let err = sanitize(&schema, &json!({ "a": "x" })).await.unwrap_err();
        assert_eq!(err.name(), "value_error");
        assert_eq!(err.to_string(), "cannot parse");
    }

    #[tokio::test]
    async fn test_non_object_input_has_no_fields() {
        let schema = schema(SchemaDescription::new().field("a", FieldDef::new().required()));
        let err = sanitize(&schema, &json!([1, 2])).await.unwrap_err();
        assert_eq!(err.failure().unwrap().message_at("a"), Some("required"));
    }
}
