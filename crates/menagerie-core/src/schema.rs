//! Declarative schema definitions.
//!
//! A [`Schema`] is a named tree of [`Field`] descriptors. Each field carries a
//! name, a required flag and a [`Kind`]; mapping kinds embed a nested schema,
//! so the whole tree is owned and acyclic by construction.
//!
//! Schemas are built once at startup through [`SchemaBuilder`] and are never
//! mutated afterwards.
//!
//! # Example
//!
//! ```
//! use menagerie_core::schema::{Kind, Schema};
//!
//! let owner = Schema::builder("Owner")
//!     .optional("age", Kind::Integer)
//!     .optional("id", Kind::String)
//!     .optional("name", Kind::String)
//!     .build()
//!     .unwrap();
//!
//! let pet = Schema::builder("Pet")
//!     .optional("id", Kind::Integer)
//!     .required("name", Kind::String)
//!     .optional("nicknames", Kind::array(Kind::String))
//!     .optional("owners", Kind::array(Kind::object(owner)))
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(pet.fields().len(), 4);
//! assert!(pet.field("name").unwrap().is_required());
//! ```

use std::fmt;

use thiserror::Error;

/// Errors raised while building a schema.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// Two fields of the same schema share a name.
    #[error("schema '{schema}' declares field '{field}' more than once")]
    DuplicateField {
        /// Name of the offending schema.
        schema: String,
        /// The repeated field name.
        field: String,
    },

    /// A field was declared with an empty name.
    #[error("schema '{schema}' declares a field with an empty name")]
    EmptyFieldName {
        /// Name of the offending schema.
        schema: String,
    },
}

/// The kind of value a field accepts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Kind {
    /// A whole number. Numeric strings are coerced.
    Integer,
    /// A string. Other kinds are never coerced into strings.
    String,
    /// A boolean. `"true"`, `"false"`, `"1"` and `"0"` are coerced.
    Boolean,
    /// A mapping validated against a nested schema.
    Object(Schema),
    /// An ordered sequence whose elements share one kind.
    Array(Box<Kind>),
}

impl Kind {
    /// Creates a sequence kind.
    #[must_use]
    pub fn array(items: Kind) -> Self {
        Self::Array(Box::new(items))
    }

    /// Creates a mapping kind from a nested schema.
    #[must_use]
    pub fn object(schema: Schema) -> Self {
        Self::Object(schema)
    }

    /// Short name used in log output.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Integer => "integer",
            Self::String => "string",
            Self::Boolean => "boolean",
            Self::Object(_) => "object",
            Self::Array(_) => "array",
        }
    }
}

/// A single declared field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    name: String,
    required: bool,
    kind: Kind,
}

impl Field {
    /// Creates a required field.
    #[must_use]
    pub fn required(name: impl Into<String>, kind: Kind) -> Self {
        Self {
            name: name.into(),
            required: true,
            kind,
        }
    }

    /// Creates an optional field.
    #[must_use]
    pub fn optional(name: impl Into<String>, kind: Kind) -> Self {
        Self {
            name: name.into(),
            required: false,
            kind,
        }
    }

    /// Returns the field name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns whether the field must be present.
    #[must_use]
    pub fn is_required(&self) -> bool {
        self.required
    }

    /// Returns the accepted kind.
    #[must_use]
    pub fn kind(&self) -> &Kind {
        &self.kind
    }
}

/// A named, ordered collection of fields.
///
/// Field order is the declaration order and is preserved by validation
/// output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    name: String,
    fields: Vec<Field>,
}

impl Schema {
    /// Creates a new schema builder.
    #[must_use]
    pub fn builder(name: impl Into<String>) -> SchemaBuilder {
        SchemaBuilder::new(name)
    }

    /// Creates a schema with no fields.
    ///
    /// Validating against an empty schema always succeeds with an empty
    /// mapping (unknown fields are stripped).
    #[must_use]
    pub fn empty(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    /// Returns the schema name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the fields in declaration order.
    #[must_use]
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Looks up a field by name.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Returns `true` if the schema declares no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterates over the names of required fields.
    pub fn required_fields(&self) -> impl Iterator<Item = &str> {
        self.fields
            .iter()
            .filter(|f| f.required)
            .map(|f| f.name.as_str())
    }
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {{", self.name)?;
        for (i, field) in self.fields.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            let marker = if field.required { "" } else { "?" };
            write!(f, " {}{}: {}", field.name, marker, field.kind.name())?;
        }
        write!(f, " }}")
    }
}

/// Builder for [`Schema`].
#[derive(Debug, Clone)]
pub struct SchemaBuilder {
    name: String,
    fields: Vec<Field>,
}

impl SchemaBuilder {
    /// Creates a builder for a schema with the given name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    /// Declares a required field.
    #[must_use]
    pub fn required(self, name: impl Into<String>, kind: Kind) -> Self {
        self.field(Field::required(name, kind))
    }

    /// Declares an optional field.
    #[must_use]
    pub fn optional(self, name: impl Into<String>, kind: Kind) -> Self {
        self.field(Field::optional(name, kind))
    }

    /// Appends a prebuilt field.
    #[must_use]
    pub fn field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    /// Builds the schema, rejecting empty or repeated field names.
    pub fn build(self) -> Result<Schema, SchemaError> {
        for (i, field) in self.fields.iter().enumerate() {
            if field.name.is_empty() {
                return Err(SchemaError::EmptyFieldName { schema: self.name });
            }
            if self.fields[..i].iter().any(|f| f.name == field.name) {
                return Err(SchemaError::DuplicateField {
                    field: field.name.clone(),
                    schema: self.name,
                });
            }
        }

        Ok(Schema {
            name: self.name,
            fields: self.fields,
        })
    }
}
