//! Field schemas
//!
//! A schema is the ordered, fixed list of fields an edit session tracks.
//! Field indices are positions in that list and decide where each field's
//! dirty bit lives, so a schema never changes after it is built. Sessions
//! share one schema through an `Arc`.

mod config;
mod error;
mod field;
mod value;

pub use config::{FieldConfig, SchemaConfig};
pub use error::SchemaError;
pub use field::{case_insensitive_eq, exact_eq, Field, FieldEquality, FieldKind};
pub use value::FieldValue;

use std::collections::HashMap;
use std::path::Path;

/// Ordered, immutable list of named, typed fields
#[derive(Clone, Debug)]
pub struct FieldSchema {
    name: String,
    fields: Vec<Field>,
    by_name: HashMap<String, usize>,
}

impl FieldSchema {
    /// Build a schema, rejecting duplicate field names
    pub fn new(name: impl Into<String>, fields: Vec<Field>) -> Result<Self, SchemaError> {
        let mut by_name = HashMap::with_capacity(fields.len());
        for (index, field) in fields.iter().enumerate() {
            if by_name.insert(field.name.clone(), index).is_some() {
                return Err(SchemaError::DuplicateFieldName(field.name.clone()));
            }
        }
        Ok(Self {
            name: name.into(),
            fields,
            by_name,
        })
    }

    pub fn builder(name: impl Into<String>) -> SchemaBuilder {
        SchemaBuilder {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    pub fn from_config(config: &SchemaConfig) -> Result<Self, SchemaError> {
        let fields = config
            .fields
            .iter()
            .map(FieldConfig::to_field)
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(config.name.clone(), fields)
    }

    pub fn from_json_str(json: &str) -> Result<Self, SchemaError> {
        let config: SchemaConfig = serde_json::from_str(json)?;
        Self::from_config(&config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, SchemaError> {
        let data = std::fs::read_to_string(path)?;
        Self::from_json_str(&data)
    }

    /// Export the structural part of the schema. Custom comparators that are
    /// not one of the named ones are written as "exact".
    pub fn to_config(&self) -> SchemaConfig {
        SchemaConfig {
            name: self.name.clone(),
            fields: self
                .fields
                .iter()
                .map(|f| FieldConfig {
                    name: f.name.clone(),
                    kind: f.kind,
                    optional: f.optional,
                    comparator: None,
                })
                .collect(),
        }
    }

    /// Name of the adapted type
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    pub fn field_at(&self, index: usize) -> Option<&Field> {
        self.fields.get(index)
    }

    pub fn fields(&self) -> impl Iterator<Item = &Field> {
        self.fields.iter()
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.by_name.get(name).copied()
    }

    /// Compare two values of field `index` with that field's comparator.
    /// Out-of-range indices compare structurally.
    pub fn equals(&self, index: usize, a: &FieldValue, b: &FieldValue) -> bool {
        match self.fields.get(index) {
            Some(field) => field.equals(a, b),
            None => a == b,
        }
    }

    /// Check that `value` may be stored in field `index`
    /// Convert a deserialized value to the variant field `index` stores, then check it
    pub fn conform(&self, index: usize, value: FieldValue) -> Result<FieldValue, SchemaError> {
        let value = match self.fields.get(index) {
            Some(field) => field.kind.conform(value),
            None => value,
        };
        self.check(index, &value)?;
        Ok(value)
    }

    pub fn check(&self, index: usize, value: &FieldValue) -> Result<(), SchemaError> {
        let field = self.fields.get(index).ok_or(SchemaError::FieldOutOfRange {
            index,
            count: self.fields.len(),
        })?;
        if field.admits(value) {
            Ok(())
        } else {
            Err(SchemaError::TypeMismatch {
                field: field.name.clone(),
                expected: field.kind.to_string(),
                found: value.kind_name(),
            })
        }
    }
}

/// Incremental schema construction
pub struct SchemaBuilder {
    name: String,
    fields: Vec<Field>,
}

impl SchemaBuilder {
    pub fn field(mut self, name: impl Into<String>, kind: FieldKind) -> Self {
        self.fields.push(Field::new(name, kind));
        self
    }

    pub fn optional_field(mut self, name: impl Into<String>, kind: FieldKind) -> Self {
        self.fields.push(Field::optional(name, kind));
        self
    }

    pub fn with_field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    pub fn build(self) -> Result<FieldSchema, SchemaError> {
        FieldSchema::new(self.name, self.fields)
    }
}
