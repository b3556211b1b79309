#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use snapedit::{
    Contract, EditSession, EditedEvent, FieldKind, FieldSchema, FieldValue, Property, Record,
    SchemaError, Snapshot,
};
use std::sync::{Arc, Mutex, OnceLock};

// ---------------------------------------------------------------------------
// A typed contract: {Name: string, BirthDay: timestamp}
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Person {
    pub name: String,
    pub birth_day: DateTime<Utc>,
}

pub const NAME: usize = 0;
pub const BIRTH_DAY: usize = 1;

pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(1981, 4, 2, 8, 30, 0).unwrap()
}

pub fn max() -> Person {
    Person {
        name: "Max".into(),
        birth_day: t0(),
    }
}

impl Snapshot for Person {
    fn get(&self, index: usize) -> Option<FieldValue> {
        match index {
            NAME => Some(FieldValue::string(self.name.clone())),
            BIRTH_DAY => Some(FieldValue::timestamp(self.birth_day)),
            _ => None,
        }
    }

    fn set(&mut self, index: usize, value: FieldValue) -> Result<(), SchemaError> {
        let schema = Self::schema();
        schema.check(index, &value)?;
        match (index, value) {
            (NAME, FieldValue::String(name)) => self.name = name,
            (BIRTH_DAY, FieldValue::Timestamp(t)) => self.birth_day = t,
            _ => unreachable!("checked against the schema"),
        }
        Ok(())
    }
}

impl Contract for Person {
    fn schema() -> Arc<FieldSchema> {
        static SCHEMA: OnceLock<Arc<FieldSchema>> = OnceLock::new();
        SCHEMA
            .get_or_init(|| {
                Arc::new(
                    FieldSchema::builder("EditablePerson")
                        .field("Name", FieldKind::String)
                        .field("BirthDay", FieldKind::Timestamp)
                        .build()
                        .expect("person schema"),
                )
            })
            .clone()
    }
}

// ---------------------------------------------------------------------------
// A wide runtime schema for multi-word tests
// ---------------------------------------------------------------------------

pub fn wide_schema(fields: usize) -> Arc<FieldSchema> {
    let mut builder = FieldSchema::builder("Wide");
    for i in 0..fields {
        builder = builder.field(format!("f{}", i), FieldKind::Int);
    }
    Arc::new(builder.build().expect("wide schema"))
}

pub fn wide_session(fields: usize) -> EditSession<Record> {
    let schema = wide_schema(fields);
    let values = (0..fields as i64).map(FieldValue::int).collect();
    let record = Record::new(&schema, values).expect("wide record");
    EditSession::new(schema, record)
}

// ---------------------------------------------------------------------------
// Notification capture
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq)]
pub enum Note {
    Changing(Property),
    Changed(Property),
    Edited(EditedEvent<Person>),
    Once(&'static str, EditedEvent<Person>),
}

pub type Journal = Arc<Mutex<Vec<Note>>>;

pub fn journal(session: &mut EditSession<Person>) -> Journal {
    let journal: Journal = Arc::new(Mutex::new(Vec::new()));
    let j = journal.clone();
    session.on_changing(move |_, p| j.lock().unwrap().push(Note::Changing(p)));
    let j = journal.clone();
    session.on_changed(move |_, p| j.lock().unwrap().push(Note::Changed(p)));
    let j = journal.clone();
    session.on_edited(move |_, e| j.lock().unwrap().push(Note::Edited(e.clone())));
    journal
}

pub fn field_notes(journal: &Journal) -> Vec<Note> {
    journal
        .lock()
        .unwrap()
        .iter()
        .filter(|n| {
            matches!(
                n,
                Note::Changing(Property::Field(_)) | Note::Changed(Property::Field(_))
            )
        })
        .cloned()
        .collect()
}
