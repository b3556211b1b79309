// Snapedit - editable sessions over immutable snapshots
//
// A schema names and types the fields of a snapshot; an edit session
// stages field writes over one snapshot, tracks which fields are dirty in a
// packed bitset and merges them into a new snapshot when the edit ends.

pub mod schema;
pub mod session;
pub mod snapshot;

pub use schema::{Field, FieldKind, FieldSchema, FieldValue, SchemaConfig, SchemaError};
pub use session::{EditError, EditSession, EditedEvent, Property, SubscriptionId};
pub use snapshot::{to_editable_list, Contract, Record, Snapshot, ToEditable};
