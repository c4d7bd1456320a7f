//! Contract validation.
//!
//! [`validate`] checks an input value against a [`Schema`] and returns either
//! the coerced mapping or every violation found, in pre-order schema
//! traversal.
//!
//! Paths use `.` between nested mapping fields and `[index]` for sequence
//! elements, e.g. `reviews[0].user.name`. A top-level input that is not a
//! mapping is reported at `$`.
//!
//! # Example
//!
//! ```
//! use menagerie_core::schema::{Kind, Schema};
//! use menagerie_core::validate::{validate, ValidationResult};
//! use serde_json::json;
//!
//! let schema = Schema::builder("GetAllPets")
//!     .required("page", Kind::Integer)
//!     .optional("q", Kind::String)
//!     .build()
//!     .unwrap();
//!
//! match validate(&schema, &json!({ "page": "2", "extra": true })) {
//!     ValidationResult::Valid(params) => assert_eq!(params["page"], 2),
//!     ValidationResult::Invalid(errors) => panic!("{errors}"),
//! }
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::fault::FieldErrors;
use crate::schema::{Kind, Schema};

/// Path reported for a top-level value that is not a mapping.
pub const ROOT_PATH: &str = "$";

/// What to do with input keys the schema does not declare.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownFieldsPolicy {
    /// Drop them from the output without reporting.
    #[default]
    Ignore,
    /// Report each one as `unknown field <path>`.
    Reject,
}

/// Outcome of validating one input.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationResult {
    /// The coerced mapping, holding only declared fields in declaration order.
    Valid(Map<String, Value>),
    /// Every violation found.
    Invalid(FieldErrors),
}

impl ValidationResult {
    /// Returns `true` for [`ValidationResult::Valid`].
    #[must_use]
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid(_))
    }

    /// Converts into a `Result`.
    pub fn into_result(self) -> Result<Map<String, Value>, FieldErrors> {
        match self {
            Self::Valid(map) => Ok(map),
            Self::Invalid(errors) => Err(errors),
        }
    }
}

/// Validates `input` against `schema`, ignoring unknown fields.
#[must_use]
pub fn validate(schema: &Schema, input: &Value) -> ValidationResult {
    validate_with(schema, input, UnknownFieldsPolicy::default())
}

/// Validates `input` against `schema` with an explicit unknown-fields policy.
#[must_use]
pub fn validate_with(schema: &Schema, input: &Value, policy: UnknownFieldsPolicy) -> ValidationResult {
    let mut errors = FieldErrors::new();

    let Some(map) = input.as_object() else {
        errors.add(ROOT_PATH, mismatch(ROOT_PATH));
        return ValidationResult::Invalid(errors);
    };

    let output = Walker {
        policy,
        errors: &mut errors,
    }
    .object(schema, map, None);

    if errors.is_empty() {
        ValidationResult::Valid(output)
    } else {
        ValidationResult::Invalid(errors)
    }
}

struct Walker<'a> {
    policy: UnknownFieldsPolicy,
    errors: &'a mut FieldErrors,
}

impl Walker<'_> {
    fn object(&mut self, schema: &Schema, input: &Map<String, Value>, prefix: Option<&str>) -> Map<String, Value> {
        let mut output = Map::new();

        for field in schema.fields() {
            let path = join(prefix, field.name());
            match input.get(field.name()) {
                Some(value) => {
                    if let Some(coerced) = self.value(field.kind(), value, &path) {
                        output.insert(field.name().to_string(), coerced);
                    }
                }
                None if field.is_required() => {
                    self.errors.add(&path, format!("missing required field {path}"));
                }
                None => {}
            }
        }

        if self.policy == UnknownFieldsPolicy::Reject {
            for key in input.keys().filter(|k| schema.field(k).is_none()) {
                let path = join(prefix, key);
                self.errors.add(&path, format!("unknown field {path}"));
            }
        }

        output
    }

    fn value(&mut self, kind: &Kind, value: &Value, path: &str) -> Option<Value> {
        let coerced = match kind {
            Kind::Integer => coerce_integer(value),
            Kind::String => value.is_string().then(|| value.clone()),
            Kind::Boolean => coerce_boolean(value).map(Value::Bool),
            Kind::Object(schema) => value
                .as_object()
                .map(|map| Value::Object(self.object(schema, map, Some(path)))),
            Kind::Array(items) => value.as_array().map(|elements| {
                let coerced = elements
                    .iter()
                    .enumerate()
                    .filter_map(|(i, element)| self.value(items, element, &format!("{path}[{i}]")))
                    .collect();
                Value::Array(coerced)
            }),
        };

        if coerced.is_none() {
            self.errors.add(path, mismatch(path));
        }
        coerced
    }
}

fn join(prefix: Option<&str>, name: &str) -> String {
    match prefix {
        Some(prefix) => format!("{prefix}.{name}"),
        None => name.to_string(),
    }
}

fn mismatch(path: &str) -> String {
    format!("invalid type at {path}")
}

fn coerce_integer(value: &Value) -> Option<Value> {
    match value {
        Value::Number(n) if n.is_i64() || n.is_u64() => Some(value.clone()),
        Value::String(s) => s.parse::<i64>().ok().map(Value::from),
        _ => None,
    }
}

fn coerce_boolean(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::String(s) => match s.as_str() {
            "true" | "1" => Some(true),
            "false" | "0" => Some(false),
            _ => None,
        },
        _ => None,
    }
}
