//! Values carried across the schema boundary

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

/// A value that can be stored in a snapshot field or a shadow slot.
///
/// Serialized untagged: timestamps and uuids are written as strings, bytes
/// as an array of numbers. Deserializing keeps the plain JSON shape, so a
/// string always comes back as `String`; [`FieldKind::conform`] restores
/// the richer variants once the field's kind is known.
///
/// [`FieldKind::conform`]: super::FieldKind::conform
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Null,
    Bool(bool),
    Int(i64),
    Timestamp(DateTime<Utc>),
    Uuid(Uuid),
    String(String),
    Bytes(Vec<u8>),
    List(Vec<FieldValue>),
    Map(BTreeMap<String, FieldValue>),
}

impl FieldValue {
    pub fn string(s: impl Into<String>) -> Self {
        FieldValue::String(s.into())
    }

    pub fn int(n: i64) -> Self {
        FieldValue::Int(n)
    }

    pub fn bool(b: bool) -> Self {
        FieldValue::Bool(b)
    }

    pub fn timestamp(t: DateTime<Utc>) -> Self {
        FieldValue::Timestamp(t)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            FieldValue::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FieldValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_timestamp(&self) -> Option<DateTime<Utc>> {
        match self {
            FieldValue::Timestamp(t) => Some(*t),
            _ => None,
        }
    }

    /// Short name of the variant, used in type mismatch messages
    pub fn kind_name(&self) -> &'static str {
        match self {
            FieldValue::Null => "null",
            FieldValue::Bool(_) => "bool",
            FieldValue::Int(_) => "int",
            FieldValue::Timestamp(_) => "timestamp",
            FieldValue::Uuid(_) => "uuid",
            FieldValue::String(_) => "string",
            FieldValue::Bytes(_) => "bytes",
            FieldValue::List(_) => "list",
            FieldValue::Map(_) => "map",
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Null => f.write_str("null"),
            FieldValue::Bool(b) => write!(f, "{}", b),
            FieldValue::Int(n) => write!(f, "{}", n),
            FieldValue::Timestamp(t) => write!(f, "{}", t.to_rfc3339()),
            FieldValue::Uuid(id) => write!(f, "{}", id),
            FieldValue::String(s) => f.write_str(s),
            FieldValue::Bytes(b) => write!(f, "0x{}", hex::encode(b)),
            FieldValue::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str("]")
            }
            FieldValue::Map(entries) => {
                f.write_str("{")?;
                for (i, (k, v)) in entries.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}: {}", k, v)?;
                }
                f.write_str("}")
            }
        }
    }
}

impl<'de> Deserialize<'de> for FieldValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        serde_json::Value::deserialize(deserializer).map(FieldValue::from)
    }
}

impl From<serde_json::Value> for FieldValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => FieldValue::Null,
            serde_json::Value::Bool(b) => FieldValue::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => FieldValue::Int(i),
                // no float variant; keep the digits
                None => FieldValue::String(n.to_string()),
            },
            serde_json::Value::String(s) => FieldValue::String(s),
            serde_json::Value::Array(items) => {
                FieldValue::List(items.into_iter().map(FieldValue::from).collect())
            }
            serde_json::Value::Object(entries) => FieldValue::Map(
                entries
                    .into_iter()
                    .map(|(k, v)| (k, FieldValue::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::String(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::String(s)
    }
}

impl From<i64> for FieldValue {
    fn from(n: i64) -> Self {
        FieldValue::Int(n)
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        FieldValue::Bool(b)
    }
}

impl From<DateTime<Utc>> for FieldValue {
    fn from(t: DateTime<Utc>) -> Self {
        FieldValue::Timestamp(t)
    }
}

impl From<Uuid> for FieldValue {
    fn from(id: Uuid) -> Self {
        FieldValue::Uuid(id)
    }
}

impl<V: Into<FieldValue>> From<Option<V>> for FieldValue {
    fn from(v: Option<V>) -> Self {
        v.map(Into::into).unwrap_or(FieldValue::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::FieldKind;
    use chrono::TimeZone;

    #[test]
    fn test_display_nested() {
        let mut map = BTreeMap::new();
        map.insert("a".to_string(), FieldValue::int(1));
        let value = FieldValue::List(vec![FieldValue::string("x"), FieldValue::Map(map)]);
        assert_eq!(value.to_string(), "[x, {a: 1}]");
    }

    #[test]
    fn test_option_conversion() {
        let none: Option<i64> = None;
        assert_eq!(FieldValue::from(none), FieldValue::Null);
        assert_eq!(FieldValue::from(Some(3i64)), FieldValue::Int(3));
    }

    #[test]
    fn test_timestamp_reads_back_as_string() {
        let t = Utc.with_ymd_and_hms(1981, 4, 2, 12, 0, 0).unwrap();
        let json = serde_json::to_string(&FieldValue::timestamp(t)).unwrap();
        let back: FieldValue = serde_json::from_str(&json).unwrap();
        assert!(matches!(back, FieldValue::String(_)));
        assert_eq!(FieldKind::Timestamp.conform(back).as_timestamp(), Some(t));
    }

    #[test]
    fn test_date_like_text_stays_a_string() {
        let text = FieldValue::string("2021-01-01T00:00:00Z");
        let json = serde_json::to_string(&text).unwrap();
        assert_eq!(serde_json::from_str::<FieldValue>(&json).unwrap(), text);

        let id = FieldValue::string(Uuid::nil().to_string());
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(serde_json::from_str::<FieldValue>(&json).unwrap(), id);
    }

    #[test]
    fn test_small_int_list_stays_a_list() {
        let list = FieldValue::List(vec![FieldValue::int(1), FieldValue::int(2)]);
        let back: FieldValue = serde_json::from_str(&serde_json::to_string(&list).unwrap()).unwrap();
        assert_eq!(back, list);
    }
}
