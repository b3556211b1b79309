//! Field descriptors: name, semantic kind and equality

use super::value::FieldValue;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Equality used to decide whether a write actually changes a field
pub type FieldEquality = fn(&FieldValue, &FieldValue) -> bool;

/// Structural equality, the default comparator
pub fn exact_eq(a: &FieldValue, b: &FieldValue) -> bool {
    a == b
}

/// Case-insensitive comparison for string values; anything else compares structurally
pub fn case_insensitive_eq(a: &FieldValue, b: &FieldValue) -> bool {
    match (a, b) {
        (FieldValue::String(x), FieldValue::String(y)) => x.to_lowercase() == y.to_lowercase(),
        _ => a == b,
    }
}

/// Semantic type of a field
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Any,
    Bool,
    Int,
    String,
    Bytes,
    Timestamp,
    Uuid,
    List,
    Map,
}

impl FieldKind {
    /// Whether a value of this shape may be stored in a field of this kind
    pub fn admits(&self, value: &FieldValue) -> bool {
        match (self, value) {
            (FieldKind::Any, _) => true,
            (FieldKind::Bool, FieldValue::Bool(_)) => true,
            (FieldKind::Int, FieldValue::Int(_)) => true,
            (FieldKind::String, FieldValue::String(_)) => true,
            (FieldKind::Bytes, FieldValue::Bytes(_)) => true,
            (FieldKind::Timestamp, FieldValue::Timestamp(_)) => true,
            (FieldKind::Uuid, FieldValue::Uuid(_)) => true,
            (FieldKind::List, FieldValue::List(_)) => true,
            (FieldKind::Map, FieldValue::Map(_)) => true,
            _ => false,
        }
    }

    /// Recover the variant this kind stores from its serialized shape.
    ///
    /// Timestamp and uuid fields parse strings, bytes fields take a list of
    /// numbers in `0..=255`. Anything that does not parse is returned as is
    /// and left for [`admits`](Self::admits) to reject.
    pub fn conform(&self, value: FieldValue) -> FieldValue {
        match (self, value) {
            (FieldKind::Timestamp, FieldValue::String(s)) => {
                match DateTime::parse_from_rfc3339(&s) {
                    Ok(t) => FieldValue::Timestamp(t.with_timezone(&Utc)),
                    Err(_) => FieldValue::String(s),
                }
            }
            (FieldKind::Uuid, FieldValue::String(s)) => match Uuid::parse_str(&s) {
                Ok(id) => FieldValue::Uuid(id),
                Err(_) => FieldValue::String(s),
            },
            (FieldKind::Bytes, FieldValue::List(items)) => {
                let bytes: Option<Vec<u8>> = items
                    .iter()
                    .map(|item| item.as_int().and_then(|n| u8::try_from(n).ok()))
                    .collect();
                match bytes {
                    Some(bytes) => FieldValue::Bytes(bytes),
                    None => FieldValue::List(items),
                }
            }
            (_, value) => value,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            FieldKind::Any => "any",
            FieldKind::Bool => "bool",
            FieldKind::Int => "int",
            FieldKind::String => "string",
            FieldKind::Bytes => "bytes",
            FieldKind::Timestamp => "timestamp",
            FieldKind::Uuid => "uuid",
            FieldKind::List => "list",
            FieldKind::Map => "map",
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Descriptor for one field of a snapshot type
#[derive(Clone)]
pub struct Field {
    pub name: String,
    pub kind: FieldKind,
    /// `Null` is admitted in addition to `kind`
    pub optional: bool,
    equals: FieldEquality,
}

impl Field {
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
            optional: false,
            equals: exact_eq,
        }
    }

    pub fn optional(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            optional: true,
            ..Self::new(name, kind)
        }
    }

    /// Replace the comparator used for change detection
    pub fn with_equality(mut self, equals: FieldEquality) -> Self {
        self.equals = equals;
        self
    }

    pub fn equals(&self, a: &FieldValue, b: &FieldValue) -> bool {
        (self.equals)(a, b)
    }

    pub fn admits(&self, value: &FieldValue) -> bool {
        (self.optional && value.is_null()) || self.kind.admits(value)
    }
}

impl fmt::Debug for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("optional", &self.optional)
            .finish_non_exhaustive()
    }
}
