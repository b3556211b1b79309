//! Snapshot types
//!
//! A snapshot is the immutable value an [`EditSession`] wraps. Typed structs
//! implement [`Snapshot`] by mapping field indices onto their members;
//! [`Record`] covers schemas that only exist at runtime.

use crate::schema::{FieldSchema, FieldValue, SchemaError};
use crate::session::EditSession;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Index-addressed access to the fields of an immutable value.
///
/// Indices follow the order of the [`FieldSchema`] the value is edited
/// against. `set` is only ever called on a private clone while merging.
pub trait Snapshot: Clone {
    /// Current value of field `index`, `None` if the index is unknown
    fn get(&self, index: usize) -> Option<FieldValue>;

    /// Replace field `index` on this copy
    fn set(&mut self, index: usize, value: FieldValue) -> Result<(), SchemaError>;
}

/// A snapshot type that knows its own schema
pub trait Contract: Snapshot {
    fn schema() -> Arc<FieldSchema>;
}

/// Wrap contract values in edit sessions
pub trait ToEditable: Contract + Sized {
    fn to_editable(self) -> EditSession<Self> {
        EditSession::new(Self::schema(), self)
    }
}

impl<T: Contract> ToEditable for T {}

/// Wrap each contract value of a list in its own session
pub fn to_editable_list<T, I>(items: I) -> Vec<EditSession<T>>
where
    T: Contract,
    I: IntoIterator<Item = T>,
{
    let schema = T::schema();
    items
        .into_iter()
        .map(|item| EditSession::new(schema.clone(), item))
        .collect()
}

/// Field values of a runtime schema, in schema order
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    values: Vec<FieldValue>,
}

impl Record {
    /// Build a record, checking arity and field kinds against `schema`
    pub fn new(schema: &FieldSchema, values: Vec<FieldValue>) -> Result<Self, SchemaError> {
        if values.len() != schema.field_count() {
            return Err(SchemaError::ArityMismatch {
                expected: schema.field_count(),
                actual: values.len(),
            });
        }
        for (index, value) in values.iter().enumerate() {
            schema.check(index, value)?;
        }
        Ok(Self { values })
    }

    /// Build a record from named values; unnamed fields start as `Null`
    pub fn from_pairs<K, V, I>(schema: &FieldSchema, pairs: I) -> Result<Self, SchemaError>
    where
        K: AsRef<str>,
        V: Into<FieldValue>,
        I: IntoIterator<Item = (K, V)>,
    {
        let mut values = vec![FieldValue::Null; schema.field_count()];
        for (name, value) in pairs {
            let name = name.as_ref();
            let index = schema
                .index_of(name)
                .ok_or_else(|| SchemaError::UnknownField(name.to_string()))?;
            values[index] = value.into();
        }
        Self::new(schema, values)
    }

    /// Check a record that did not come through `new` without converting anything
    pub fn validate(&self, schema: &FieldSchema) -> Result<(), SchemaError> {
        Self::new(schema, self.values.clone()).map(|_| ())
    }

    /// Convert a deserialized record to the variants `schema` stores.
    ///
    /// JSON carries timestamps and uuids as strings and bytes as number
    /// arrays; this turns them back into their field kinds and checks the
    /// result.
    pub fn conform(self, schema: &FieldSchema) -> Result<Self, SchemaError> {
        if self.values.len() != schema.field_count() {
            return Err(SchemaError::ArityMismatch {
                expected: schema.field_count(),
                actual: self.values.len(),
            });
        }
        let values = self
            .values
            .into_iter()
            .enumerate()
            .map(|(index, value)| schema.conform(index, value))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { values })
    }

    /// Parse a JSON array written by `serde_json::to_string` and conform it to `schema`
    pub fn from_json_str(schema: &FieldSchema, json: &str) -> Result<Self, SchemaError> {
        let record: Record = serde_json::from_str(json)?;
        record.conform(schema)
    }

    pub fn values(&self) -> &[FieldValue] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn into_values(self) -> Vec<FieldValue> {
        self.values
    }
}

impl Snapshot for Record {
    fn get(&self, index: usize) -> Option<FieldValue> {
        self.values.get(index).cloned()
    }

    fn set(&mut self, index: usize, value: FieldValue) -> Result<(), SchemaError> {
        let count = self.values.len();
        let slot = self
            .values
            .get_mut(index)
            .ok_or(SchemaError::FieldOutOfRange { index, count })?;
        *slot = value;
        Ok(())
    }
}
