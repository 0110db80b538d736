//! Schema compilation.
//!
//! [`compile`] normalizes a [`SchemaDescription`] into an immutable
//! [`Schema`]. Compilation is pure: it inspects only the description, never
//! input values.

use handlr_core::{HandlrError, Value};
use indexmap::IndexMap;
use thiserror::Error;

use crate::chain::{Formatter, Validator, DEFAULT_MESSAGE};
use crate::description::{FieldDef, RawField, SchemaDescription, ValidatorEntry};

/// Message reported for an absent required field without a custom message.
pub const REQUIRED_MESSAGE: &str = "required";

/// Caller configuration errors found while compiling a schema.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    /// A field declares both `properties` and `array`.
    #[error("field `{field}` declares both `properties` and `array`")]
    AmbiguousShape {
        /// Path of the offending field.
        field: String,
    },

    /// A validator was paired with an empty message.
    #[error("validator #{index} of field `{field}` has an empty message")]
    EmptyMessage {
        /// Path of the offending field.
        field: String,
        /// Position of the validator in the field's list.
        index: usize,
    },

    /// The description has an unusable shape.
    #[error("malformed schema at `{field}`: {reason}")]
    Malformed {
        /// Path of the offending field.
        field: String,
        /// What is wrong.
        reason: String,
    },
}

impl SchemaError {
    /// Creates a malformed-shape error.
    pub fn malformed(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Malformed {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

impl From<SchemaError> for HandlrError {
    fn from(err: SchemaError) -> Self {
        Self::other(err)
    }
}

/// Whether a field must be present.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Required {
    /// Absent values are omitted from the output.
    #[default]
    No,
    /// Absent values fail with `"required"`.
    Yes,
    /// Absent values fail with this message.
    Message(String),
}

impl Required {
    /// Requires the field with a custom message. An empty message leaves
    /// the field optional.
    pub fn with_message(message: impl Into<String>) -> Self {
        let message = message.into();
        if message.is_empty() {
            Self::No
        } else {
            Self::Message(message)
        }
    }

    /// Returns `true` unless the field is optional.
    #[must_use]
    pub const fn is_required(&self) -> bool {
        !matches!(self, Self::No)
    }

    /// Returns the message reported for an absent value, if required.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::No => None,
            Self::Yes => Some(REQUIRED_MESSAGE),
            Self::Message(message) => Some(message),
        }
    }
}

/// The structural shape of a field.
#[derive(Debug, Clone, Default)]
pub enum Shape {
    /// A plain value.
    #[default]
    Scalar,
    /// An object sanitized with a nested schema.
    Object(Schema),
    /// A sequence whose elements follow one spec.
    Array(Box<FieldSpec>),
}

/// The compiled rules for one field.
#[derive(Debug, Clone, Default)]
pub struct FieldSpec {
    required: Required,
    default: Option<Value>,
    name: Option<String>,
    shape: Shape,
    formatters: Vec<Formatter>,
    validators: Vec<Validator>,
}

impl FieldSpec {
    /// Returns the presence rule.
    #[must_use]
    pub const fn required(&self) -> &Required {
        &self.required
    }

    /// Returns the value substituted for an absent required field.
    #[must_use]
    pub const fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    /// Returns the key under which this field's failures are reported.
    #[must_use]
    pub fn failure_key<'a>(&'a self, field: &'a str) -> &'a str {
        self.name.as_deref().unwrap_or(field)
    }

    /// Returns the field shape.
    #[must_use]
    pub const fn shape(&self) -> &Shape {
        &self.shape
    }

    /// Returns the nested schema of an object-shaped field.
    #[must_use]
    pub const fn properties(&self) -> Option<&Schema> {
        match &self.shape {
            Shape::Object(schema) => Some(schema),
            _ => None,
        }
    }

    /// Returns the element spec of an array-shaped field.
    #[must_use]
    pub fn array(&self) -> Option<&FieldSpec> {
        match &self.shape {
            Shape::Array(element) => Some(element),
            _ => None,
        }
    }

    /// Returns the formatters, in application order.
    #[must_use]
    pub fn formatters(&self) -> &[Formatter] {
        &self.formatters
    }

    /// Returns the validators, in evaluation order.
    #[must_use]
    pub fn validators(&self) -> &[Validator] {
        &self.validators
    }
}

/// A compiled schema: field name (or dotted path) to [`FieldSpec`].
#[derive(Debug, Clone, Default)]
pub struct Schema {
    fields: IndexMap<String, FieldSpec>,
}

impl Schema {
    /// Compiles a description. Equivalent to [`compile`].
    pub fn compile(description: &SchemaDescription) -> Result<Self, SchemaError> {
        compile(description)
    }

    /// Returns the spec of a field.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&FieldSpec> {
        self.fields.get(field)
    }

    /// Iterates over fields in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldSpec)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Returns the number of declared fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns `true` if no fields are declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Compiles a schema description.
///
/// # Errors
///
/// Returns [`SchemaError`] when a field declares both `properties` and
/// `array`, or pairs a validator with an empty message.
///
/// # Example
///
/// ```
/// use handlr_schema::{compile, FieldDef, SchemaDescription};
///
/// let schema = compile(&SchemaDescription::fields(["a", "b"])).unwrap();
/// assert_eq!(schema.len(), 2);
///
/// let nested = SchemaDescription::new()
///     .field("a", FieldDef::new().properties(["b"]).array(true));
/// assert!(compile(&nested).is_err());
/// ```
pub fn compile(description: &SchemaDescription) -> Result<Schema, SchemaError> {
    compile_at("", description)
}

fn compile_at(prefix: &str, description: &SchemaDescription) -> Result<Schema, SchemaError> {
    let fields: IndexMap<String, FieldSpec> = match description {
        SchemaDescription::Fields(names) => names
            .iter()
            .map(|name| (name.clone(), FieldSpec::default()))
            .collect(),
        SchemaDescription::Map(map) => map
            .iter()
            .map(|(name, raw)| Ok((name.clone(), compile_field(&join(prefix, name), raw)?)))
            .collect::<Result<_, SchemaError>>()?,
    };
    Ok(Schema { fields })
}

fn compile_field(path: &str, raw: &RawField) -> Result<FieldSpec, SchemaError> {
    let def: &FieldDef = match raw {
        RawField::Any => return Ok(FieldSpec::default()),
        RawField::Def(def) => def,
    };

    let shape = match (&def.properties, &def.array) {
        (Some(_), Some(_)) => {
            return Err(SchemaError::AmbiguousShape {
                field: path.to_string(),
            })
        }
        (Some(properties), None) => Shape::Object(compile_at(path, properties)?),
        (None, Some(element)) => Shape::Array(Box::new(compile_field(&format!("{path}[]"), element)?)),
        (None, None) => Shape::Scalar,
    };

    let validators = def
        .validators
        .iter()
        .enumerate()
        .map(|(index, entry)| match entry {
            ValidatorEntry::Bare(predicate) => Ok(Validator::new(predicate.clone(), DEFAULT_MESSAGE)),
            ValidatorEntry::Pair(_, message) if message.is_empty() => Err(SchemaError::EmptyMessage {
                field: path.to_string(),
                index,
            }),
            ValidatorEntry::Pair(predicate, message) => Ok(Validator::new(predicate.clone(), message.clone())),
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(FieldSpec {
        required: def.required.clone(),
        default: def.default.clone().filter(|v| !v.is_null()),
        name: def.name.clone(),
        shape,
        formatters: def.formatters.clone(),
        validators,
    })
}

fn join(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{prefix}.{name}")
    }
}
