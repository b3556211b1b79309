//! Runtime schemas loaded from JSON configuration

use snapedit::{EditSession, FieldSchema, FieldValue, Record, SchemaError};
use std::io::Write;
use std::sync::Arc;
use tempfile::NamedTempFile;

const PERSON: &str = r#"{
    "name": "EditablePerson",
    "fields": [
        { "name": "Name", "kind": "string" },
        { "name": "FavouriteColor", "kind": "string", "comparator": "case_insensitive" },
        { "name": "BirthDay", "kind": "timestamp", "optional": true }
    ]
}"#;

fn write_config(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn load_schema_from_file_and_edit() {
    let file = write_config(PERSON);
    let schema = Arc::new(FieldSchema::from_json_file(file.path()).unwrap());
    let record = Record::from_pairs(
        &schema,
        [("Name", FieldValue::string("Max")), ("FavouriteColor", FieldValue::string("Green"))],
    )
    .unwrap();
    let mut session = EditSession::new(schema, record);

    session.begin_edit().unwrap();
    // Case-insensitive comparator: not a change
    session.set_field_by_name("FavouriteColor", "GREEN").unwrap();
    assert!(!session.is_field_changed_by_name("FavouriteColor"));
    session.set_field_by_name("FavouriteColor", "Blue").unwrap();
    session.end_edit().unwrap();

    assert_eq!(
        session.unedited().values(),
        &[
            FieldValue::string("Max"),
            FieldValue::string("Blue"),
            FieldValue::Null,
        ]
    );
}

#[test]
fn duplicate_names_in_config_rejected() {
    let file = write_config(
        r#"{ "name": "Broken", "fields": [ { "name": "A" }, { "name": "A" } ] }"#,
    );
    let err = FieldSchema::from_json_file(file.path()).unwrap_err();
    assert!(matches!(err, SchemaError::DuplicateFieldName(name) if name == "A"));
}

#[test]
fn malformed_config_is_a_config_error() {
    let file = write_config(r#"{ "name": "Broken", "fields": [ { "kind": "string" } ] }"#);
    let err = FieldSchema::from_json_file(file.path()).unwrap_err();
    assert!(matches!(err, SchemaError::Config(_)));
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = FieldSchema::from_json_file(dir.path().join("absent.json")).unwrap_err();
    assert!(matches!(err, SchemaError::Io(_)));
}
