//! Serializable schema descriptors
//!
//! A runtime schema can be described as JSON and turned into a
//! [`FieldSchema`](super::FieldSchema):
//!
//! ```text
//! {
//!   "name": "EditablePerson",
//!   "fields": [
//!     { "name": "Name", "kind": "string" },
//!     { "name": "FavouriteColor", "kind": "string", "comparator": "case_insensitive" },
//!     { "name": "BirthDay", "kind": "timestamp", "optional": true }
//!   ]
//! }
//! ```

use super::error::SchemaError;
use super::field::{case_insensitive_eq, exact_eq, Field, FieldEquality, FieldKind};
use serde::{Deserialize, Serialize};

/// Configuration for a whole schema.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SchemaConfig {
    /// Display name of the adapted type, used in messages and `Display`
    pub name: String,

    pub fields: Vec<FieldConfig>,
}

/// Configuration for a single field.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FieldConfig {
    pub name: String,

    #[serde(default = "default_kind")]
    pub kind: FieldKind,

    #[serde(default)]
    pub optional: bool,

    /// "exact" or "case_insensitive"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comparator: Option<String>,
}

fn default_kind() -> FieldKind {
    FieldKind::Any
}

impl FieldConfig {
    pub(crate) fn to_field(&self) -> Result<Field, SchemaError> {
        let equals: FieldEquality = match self.comparator.as_deref() {
            None | Some("exact") => exact_eq,
            Some("case_insensitive") => case_insensitive_eq,
            Some(other) => return Err(SchemaError::UnknownComparator(other.to_string())),
        };
        let field = if self.optional {
            Field::optional(self.name.clone(), self.kind)
        } else {
            Field::new(self.name.clone(), self.kind)
        };
        Ok(field.with_equality(equals))
    }
}
