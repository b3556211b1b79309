//! Walk through an edit session over a runtime `Person` schema.
//!
//! Run with:
//!   RUST_LOG=snapedit=trace cargo run --example person_edit

use anyhow::Result;
use chrono::{Duration, Utc};
use snapedit::{EditSession, FieldKind, FieldSchema, FieldValue, Property, Record};
use std::sync::Arc;

fn main() -> Result<()> {
    env_logger::init();

    let schema = Arc::new(
        FieldSchema::builder("EditablePerson")
            .field("Name", FieldKind::String)
            .field("FavouriteColor", FieldKind::String)
            .field("BirthDay", FieldKind::Timestamp)
            .build()?,
    );
    let person = Record::from_pairs(
        &schema,
        [
            ("Name", FieldValue::string("Max")),
            ("FavouriteColor", FieldValue::string("Green")),
            ("BirthDay", FieldValue::timestamp(Utc::now() - Duration::days(43 * 365))),
        ],
    )?;

    let mut editable = EditSession::new(schema.clone(), person);
    let names = schema.clone();
    editable.on_changed(move |session, property| {
        if let Property::Field(index) = property {
            if let Some(field) = names.field_at(index) {
                println!(
                    "  {} -> {}",
                    field.name,
                    session.field(index).unwrap_or(FieldValue::Null)
                );
            }
        }
    });
    editable.on_edited(|session, event| {
        let changed: Vec<&str> = session.changed_field_names().collect();
        println!(
            "edited (cancelled_or_unchanged = {}), changed: {:?}",
            event.cancelled_or_unchanged, changed
        );
    });

    println!("before: {}", editable);

    editable.begin_edit()?;
    editable.set_field_by_name("Name", "Müller")?;
    editable.register_once(|_, event| {
        println!("one-shot: {} values committed", event.new_value.len());
    });
    editable.end_edit()?;
    println!("after end:    {}", editable);

    editable.begin_edit()?;
    editable.set_field_by_name("FavouriteColor", "Blue")?;
    editable.cancel_edit()?;
    println!("after cancel: {}", editable);

    if let Err(e) = editable.end_edit() {
        println!("rejected: {}", e);
    }

    Ok(())
}
