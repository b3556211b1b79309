//! Schemas wider than one flag word

mod common;

use common::*;
use snapedit::{EditSession, FieldSchema, FieldValue, Record};
use std::sync::Arc;

#[test]
fn fields_63_and_64_use_different_words() {
    let mut session = wide_session(70);
    assert_eq!(session.flags().word_count(), 2);

    session.begin_edit().unwrap();
    session.set_field(63, 1000i64).unwrap();
    assert_eq!(session.flags().word(0), 1u64 << 63);
    assert_eq!(session.flags().word(1), 0);

    session.set_field(64, 2000i64).unwrap();
    assert_eq!(session.flags().word(0), 1u64 << 63);
    assert_eq!(session.flags().word(1), 1);

    assert_eq!(session.changed_fields().collect::<Vec<_>>(), vec![63, 64]);
}

#[test]
fn cross_word_bits_clear_independently() {
    let mut session = wide_session(70);
    session.begin_edit().unwrap();
    session.set_field(63, -1i64).unwrap();
    session.set_field(64, -2i64).unwrap();
    session.set_field(69, -3i64).unwrap();

    // Writing back the committed value keeps the bit: the shadow is still authoritative
    session.set_field(63, 63i64).unwrap();
    assert!(session.is_field_changed(63));
    assert!(session.is_field_changed(64));

    session.end_edit().unwrap();
    let values = session.unedited().values();
    assert_eq!(values[63], FieldValue::int(63));
    assert_eq!(values[64], FieldValue::int(-2));
    assert_eq!(values[69], FieldValue::int(-3));
    assert_eq!(values[0], FieldValue::int(0));
    assert_eq!(session.flags().word(0), 0);
    assert_eq!(session.flags().word(1), 0);
}

#[test]
fn cancel_on_wide_schema_clears_every_word() {
    let mut session = wide_session(200);
    assert_eq!(session.flags().word_count(), 4);
    session.begin_edit().unwrap();
    for i in (0..200).step_by(7) {
        session.set_field(i, 10_000i64 + i as i64).unwrap();
    }
    assert_eq!(session.changed_fields().count(), (0..200).step_by(7).count());

    session.cancel_edit().unwrap();
    assert_eq!(session.changed_fields().count(), 0);
    for i in 0..200 {
        assert_eq!(session.field(i), Some(FieldValue::int(i as i64)));
    }
}

#[test]
fn empty_schema_still_edits() {
    let schema = Arc::new(FieldSchema::new("Unit", Vec::new()).unwrap());
    let record = Record::new(&schema, Vec::new()).unwrap();
    let mut session = EditSession::new(schema, record);
    assert_eq!(session.flags().word_count(), 1);

    session.begin_edit().unwrap();
    assert!(session.is_editing());
    assert!(session.set_field(0, FieldValue::Null).is_err());
    session.end_edit().unwrap();
    assert!(!session.is_editing());
    assert_eq!(session.to_string(), "Unit {}");
}
