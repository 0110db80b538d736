//! Raw schema descriptions, as written by handler authors.
//!
//! A [`SchemaDescription`] is either a list of field names (each field is
//! "present, unconstrained") or an ordered map from field name to
//! [`RawField`]. Descriptions are compiled into a [`Schema`](crate::Schema)
//! with [`compile`](crate::compile).
//!
//! Purely declarative descriptions (no predicates or transforms) can also be
//! read from JSON with [`SchemaDescription::from_value`], so schemas may live
//! in configuration files:
//!
//! ```
//! use handlr_schema::SchemaDescription;
//! use serde_json::json;
//!
//! let description = SchemaDescription::from_value(&json!({
//!     "email": { "required": "email is mandatory" },
//!     "page": { "required": true, "default": 1 },
//!     "tags": { "array": true },
//!     "note": true
//! }))
//! .unwrap();
//! assert_eq!(description.len(), 4);
//! ```

use handlr_core::Value;
use indexmap::IndexMap;

use crate::chain::{Formatter, Predicate};
use crate::compile::{Required, SchemaError};

/// An uncompiled schema.
#[derive(Debug, Clone)]
pub enum SchemaDescription {
    /// Field names, each present and unconstrained.
    Fields(Vec<String>),
    /// Field name to raw field spec, in declaration order.
    Map(IndexMap<String, RawField>),
}

impl Default for SchemaDescription {
    fn default() -> Self {
        Self::Map(IndexMap::new())
    }
}

impl SchemaDescription {
    /// Creates an empty map-shaped description.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a list-shaped description from field names.
    pub fn fields<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Fields(names.into_iter().map(Into::into).collect())
    }

    /// Adds a field, converting a list-shaped description into a map.
    pub fn field(self, name: impl Into<String>, spec: impl Into<RawField>) -> Self {
        let mut map = match self {
            Self::Map(map) => map,
            Self::Fields(names) => names.into_iter().map(|n| (n, RawField::Any)).collect(),
        };
        map.insert(name.into(), spec.into());
        Self::Map(map)
    }

    /// Returns the number of declared fields.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Fields(names) => names.len(),
            Self::Map(map) => map.len(),
        }
    }

    /// Returns `true` if no fields are declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Reads a declarative description from JSON.
    ///
    /// An array must hold field names; an object maps field names to raw
    /// specs; any other value describes an empty schema.
    pub fn from_value(value: &Value) -> Result<Self, SchemaError> {
        match value {
            Value::Array(items) => items
                .iter()
                .map(|item| {
                    item.as_str().map(ToString::to_string).ok_or_else(|| {
                        SchemaError::malformed("", format!("field name must be a string, got {item}"))
                    })
                })
                .collect::<Result<Vec<_>, _>>()
                .map(Self::Fields),
            Value::Object(fields) => fields
                .iter()
                .map(|(name, raw)| Ok((name.clone(), RawField::from_value(name, raw)?)))
                .collect::<Result<IndexMap<_, _>, SchemaError>>()
                .map(Self::Map),
            _ => Ok(Self::default()),
        }
    }
}

impl<S: Into<String>> FromIterator<(S, RawField)> for SchemaDescription {
    fn from_iter<I: IntoIterator<Item = (S, RawField)>>(iter: I) -> Self {
        Self::Map(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

impl From<Vec<&str>> for SchemaDescription {
    fn from(names: Vec<&str>) -> Self {
        Self::fields(names)
    }
}

impl<const N: usize> From<[&str; N]> for SchemaDescription {
    fn from(names: [&str; N]) -> Self {
        Self::fields(names)
    }
}

/// The raw spec of one field.
#[derive(Debug, Clone)]
pub enum RawField {
    /// Not a field definition; compiles to an unconstrained field.
    Any,
    /// A field definition.
    Def(Box<FieldDef>),
}

impl RawField {
    fn from_value(field: &str, value: &Value) -> Result<Self, SchemaError> {
        let Value::Object(spec) = value else {
            return Ok(Self::Any);
        };

        let mut def = FieldDef::new();
        for (key, entry) in spec {
            match key.as_str() {
                "required" => {
                    def.required = match entry {
                        Value::Bool(true) => Required::Yes,
                        Value::Bool(false) | Value::Null => Required::No,
                        Value::String(message) => Required::with_message(message.as_str()),
                        other => {
                            return Err(SchemaError::malformed(
                                field,
                                format!("`required` must be a boolean or a message, got {other}"),
                            ))
                        }
                    };
                }
                "default" => def.default = Some(entry.clone()),
                "name" => {
                    def.name = Some(
                        entry
                            .as_str()
                            .ok_or_else(|| SchemaError::malformed(field, "`name` must be a string"))?
                            .to_string(),
                    );
                }
                "properties" => def.properties = Some(SchemaDescription::from_value(entry)?),
                "array" => def.array = Some(Box::new(Self::from_value(field, entry)?)),
                "validators" | "formatters" => {
                    return Err(SchemaError::malformed(
                        field,
                        format!("`{key}` cannot be declared in JSON"),
                    ))
                }
                _ => {}
            }
        }
        Ok(Self::Def(Box::new(def)))
    }
}

impl From<FieldDef> for RawField {
    fn from(def: FieldDef) -> Self {
        Self::Def(Box::new(def))
    }
}

impl From<bool> for RawField {
    fn from(_: bool) -> Self {
        Self::Any
    }
}

/// A validator as written in a field definition.
#[derive(Debug, Clone)]
pub enum ValidatorEntry {
    /// A bare predicate, reported as `"invalid"`.
    Bare(Predicate),
    /// A predicate with its rejection message.
    Pair(Predicate, String),
}

impl From<Predicate> for ValidatorEntry {
    fn from(predicate: Predicate) -> Self {
        Self::Bare(predicate)
    }
}

impl From<(Predicate, &str)> for ValidatorEntry {
    fn from((predicate, message): (Predicate, &str)) -> Self {
        Self::Pair(predicate, message.to_string())
    }
}

impl From<(Predicate, String)> for ValidatorEntry {
    fn from((predicate, message): (Predicate, String)) -> Self {
        Self::Pair(predicate, message)
    }
}

/// Builder for one field's raw spec.
///
/// ```
/// use handlr_schema::{FieldDef, Formatter, Predicate};
/// use serde_json::json;
///
/// let page = FieldDef::new()
///     .required()
///     .default(json!(1))
///     .formatter(Formatter::new(|v| json!(v.as_i64().unwrap_or(1))))
///     .validator((Predicate::new(|v| v.as_i64().is_some_and(|n| n > 0)), "must be positive"));
/// # let _ = page;
/// ```
#[derive(Debug, Clone, Default)]
pub struct FieldDef {
    pub(crate) required: Required,
    pub(crate) default: Option<Value>,
    pub(crate) name: Option<String>,
    pub(crate) properties: Option<SchemaDescription>,
    pub(crate) array: Option<Box<RawField>>,
    pub(crate) formatters: Vec<Formatter>,
    pub(crate) validators: Vec<ValidatorEntry>,
}

impl FieldDef {
    /// Creates an unconstrained field definition.
    #[must_use]
    pub fn new() -> Self {
        <Self as Default>::default()
    }

    /// Marks the field as required, reported as `"required"`.
    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = Required::Yes;
        self
    }

    /// Marks the field as required with a custom message. An empty message
    /// leaves the field optional.
    #[must_use]
    pub fn required_with(mut self, message: impl Into<String>) -> Self {
        self.required = Required::with_message(message);
        self
    }

    /// Sets the value used when a required field is absent.
    #[must_use]
    pub fn default(mut self, value: Value) -> Self {
        self.default = Some(value);
        self
    }

    /// Reports failures of this field under `name` instead of its key.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Declares the field as an object with the given nested schema.
    #[must_use]
    pub fn properties(mut self, properties: impl Into<SchemaDescription>) -> Self {
        self.properties = Some(properties.into());
        self
    }

    /// Declares the field as a sequence whose elements follow `element`.
    #[must_use]
    pub fn array(mut self, element: impl Into<RawField>) -> Self {
        self.array = Some(Box::new(element.into()));
        self
    }

    /// Appends a formatter.
    #[must_use]
    pub fn formatter(mut self, formatter: Formatter) -> Self {
        self.formatters.push(formatter);
        self
    }

    /// Appends a validator.
    #[must_use]
    pub fn validator(mut self, validator: impl Into<ValidatorEntry>) -> Self {
        self.validators.push(validator.into());
        self
    }
}
