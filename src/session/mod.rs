//! Edit sessions over immutable snapshots
//!
//! An [`EditSession`] wraps one snapshot and lets callers stage per-field
//! writes between [`begin_edit`](EditSession::begin_edit) and
//! [`end_edit`](EditSession::end_edit) or
//! [`cancel_edit`](EditSession::cancel_edit).
//!
//! # States
//!
//! ```text
//!              begin_edit
//!   NotEditing ----------> Editing ---+ set_field
//!       ^  |                 |   ^----+
//!       |  | replace_snapshot|
//!       |  +--+              | end_edit / cancel_edit
//!       +-----+--------------+
//! ```
//!
//! # Notifications
//!
//! Every logical operation raises "changing" for its whole batch of
//! [`Property`] values, mutates, then raises "changed" for the same batch
//! in the same order. Closing an edit raises one [`EditedEvent`] and then
//! drains the one-shot queue with the same payload.
//!
//! Edited listeners and one-shot callbacks get `&mut EditSession` and may
//! start a new edit. The session is already `NotEditing` when they run;
//! after `end_edit` the merged snapshot is installed once they return, or
//! earlier if one of them calls `begin_edit` or `replace_snapshot`.
//!
//! The one-shot queue is detached when a closure starts notifying, so
//! callbacks registered meanwhile, or a nested edit closed by a listener,
//! never consume it. A nested closure reaches every Edited listener; the
//! listener that is still running gets it right after it returns.
//!
//! A session is not internally synchronized. Wrap it in a lock or keep it
//! on one task if it has to be shared.

mod error;
mod events;
mod flags;

pub use error::{EditError, SessionState};
pub use events::{
    EditedEvent, EditedListener, OnceCallback, Property, PropertyListener, SubscriptionId,
};
pub use flags::{DirtyFlags, DirtyIter};

use crate::schema::{FieldSchema, FieldValue, SchemaError};
use crate::snapshot::Snapshot;
use events::Registry;
use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;

/// Transactional, change-tracking adapter over one snapshot value
pub struct EditSession<T: Snapshot> {
    schema: Arc<FieldSchema>,
    unedited: T,
    shadow: Vec<Option<FieldValue>>,
    flags: DirtyFlags,
    /// Merged snapshot waiting to replace `unedited` after `end_edit` notified
    pending: Option<T>,
    changing: Registry<PropertyListener<T>>,
    changed: Registry<PropertyListener<T>>,
    edited: Registry<EditedListener<T>>,
    once: VecDeque<OnceCallback<T>>,
    /// Edited events raised while their listener was busy
    deferred: VecDeque<(SubscriptionId, EditedEvent<T>)>,
}

impl<T: Snapshot> EditSession<T> {
    pub fn new(schema: Arc<FieldSchema>, initial: T) -> Self {
        let field_count = schema.field_count();
        Self {
            schema,
            unedited: initial,
            shadow: vec![None; field_count],
            flags: DirtyFlags::new(field_count),
            pending: None,
            changing: Registry::new(),
            changed: Registry::new(),
            edited: Registry::new(),
            once: VecDeque::new(),
            deferred: VecDeque::new(),
        }
    }

    pub fn schema(&self) -> &Arc<FieldSchema> {
        &self.schema
    }

    /// The committed snapshot
    pub fn unedited(&self) -> &T {
        &self.unedited
    }

    pub fn into_unedited(mut self) -> T {
        self.settle();
        self.unedited
    }

    pub fn flags(&self) -> &DirtyFlags {
        &self.flags
    }

    pub fn is_editing(&self) -> bool {
        self.flags.is_editing()
    }

    /// Effective value of field `index`: the shadow value if dirty, else the snapshot's
    pub fn field(&self, index: usize) -> Option<FieldValue> {
        if self.flags.is_dirty(index) {
            self.shadow[index].clone()
        } else {
            self.unedited.get(index)
        }
    }

    pub fn field_by_name(&self, name: &str) -> Option<FieldValue> {
        self.schema.index_of(name).and_then(|index| self.field(index))
    }

    pub fn is_field_changed(&self, index: usize) -> bool {
        self.flags.is_dirty(index)
    }

    pub fn is_field_changed_by_name(&self, name: &str) -> bool {
        self.schema
            .index_of(name)
            .is_some_and(|index| self.flags.is_dirty(index))
    }

    /// Dirty field indices in ascending order. The iterator is `Clone`, so
    /// it can be walked again.
    pub fn changed_fields(&self) -> DirtyIter<'_> {
        self.flags.iter_dirty()
    }

    /// Names of the dirty fields, in schema order
    pub fn changed_field_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.changed_fields()
            .filter_map(move |index| self.schema.field_at(index).map(|f| f.name.as_str()))
    }

    pub fn begin_edit(&mut self) -> Result<(), EditError> {
        self.ensure_state(SessionState::NotEditing, "begin an edit")?;
        self.settle();
        self.flags.set_editing(true);
        log::debug!("{}: edit started", self.schema.name());
        Ok(())
    }

    /// Stage a new value for field `index`.
    ///
    /// The value is kept as the field's shadow. Only a value that differs
    /// from the current effective value (under the field's comparator)
    /// marks the field dirty and raises notifications.
    pub fn set_field(&mut self, index: usize, value: impl Into<FieldValue>) -> Result<(), EditError> {
        self.ensure_state(SessionState::Editing, "set a field")?;
        let value = value.into();
        self.schema.check(index, &value)?;

        let differs = match self.field(index) {
            Some(current) => !self.schema.equals(index, &current, &value),
            None => true,
        };
        if !differs {
            log::trace!("{}: field {} unchanged", self.schema.name(), index);
            self.shadow[index] = Some(value);
            return Ok(());
        }

        let mut batch = vec![Property::Field(index)];
        if !self.flags.is_dirty(index) {
            batch.push(Property::Dirty(index));
        }
        self.raise_changing(&batch);
        self.shadow[index] = Some(value);
        self.flags.set_dirty(index, true);
        log::trace!("{}: field {} staged", self.schema.name(), index);
        self.raise_changed(&batch);
        Ok(())
    }

    pub fn set_field_by_name(
        &mut self,
        name: &str,
        value: impl Into<FieldValue>,
    ) -> Result<(), EditError> {
        self.ensure_state(SessionState::Editing, "set a field")?;
        let index = self
            .schema
            .index_of(name)
            .ok_or_else(|| SchemaError::UnknownField(name.to_string()))?;
        self.set_field(index, value)
    }

    /// Discard every staged value and close the edit
    pub fn cancel_edit(&mut self) -> Result<(), EditError> {
        self.ensure_state(SessionState::Editing, "cancel an edit")?;
        self.flags.set_editing(false);

        let dirty: Vec<usize> = self.flags.iter_dirty().collect();
        let batch: Vec<Property> = dirty
            .iter()
            .map(|&i| Property::Field(i))
            .chain(dirty.iter().map(|&i| Property::Dirty(i)))
            .collect();
        self.raise_changing(&batch);
        self.clear_shadow();
        self.raise_changed(&batch);
        log::debug!(
            "{}: edit cancelled, {} field(s) discarded",
            self.schema.name(),
            dirty.len()
        );

        let event = EditedEvent::unchanged(&self.unedited);
        self.raise_edited(&event);
        Ok(())
    }

    /// Merge staged values into a new snapshot and close the edit.
    ///
    /// The edited notification fires before the new snapshot replaces the
    /// old one, so listeners still see the old snapshot and the staged
    /// values. With nothing dirty the snapshot is kept as is.
    pub fn end_edit(&mut self) -> Result<(), EditError> {
        self.ensure_state(SessionState::Editing, "end an edit")?;

        if !self.flags.any_dirty() {
            self.flags.set_editing(false);
            self.clear_shadow();
            log::debug!("{}: edit ended without changes", self.schema.name());
            let event = EditedEvent::unchanged(&self.unedited);
            self.raise_edited(&event);
            return Ok(());
        }

        let edited = self.merge()?;
        self.flags.set_editing(false);
        log::debug!(
            "{}: edit ended, merging {} field(s)",
            self.schema.name(),
            self.flags.dirty_count()
        );

        let event = EditedEvent::new(self.unedited.clone(), edited.clone(), false);
        self.pending = Some(edited);
        self.raise_edited(&event);
        self.settle();
        Ok(())
    }

    /// Replace the committed snapshot outside of an edit
    pub fn replace_snapshot(&mut self, value: T) -> Result<(), EditError> {
        self.ensure_state(SessionState::NotEditing, "replace the snapshot")?;
        self.settle();

        let mut batch: Vec<Property> = self
            .diff(&value)
            .into_iter()
            .map(Property::Field)
            .collect();
        if !batch.is_empty() {
            batch.push(Property::Unedited);
        }
        self.raise_changing(&batch);
        self.unedited = value;
        self.raise_changed(&batch);
        log::debug!(
            "{}: snapshot replaced, {} field(s) differ",
            self.schema.name(),
            batch.len().saturating_sub(1)
        );
        Ok(())
    }

    pub fn on_changing<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: FnMut(&EditSession<T>, Property) + Send + 'static,
    {
        self.changing.subscribe(Box::new(listener))
    }

    pub fn on_changed<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: FnMut(&EditSession<T>, Property) + Send + 'static,
    {
        self.changed.subscribe(Box::new(listener))
    }

    pub fn on_edited<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: FnMut(&mut EditSession<T>, &EditedEvent<T>) + Send + 'static,
    {
        self.edited.subscribe(Box::new(listener))
    }

    /// Remove a listener registered with any of the `on_*` methods
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.changing.unsubscribe(id) || self.changed.unsubscribe(id) || self.edited.unsubscribe(id)
    }

    /// Run `callback` once, at the next `cancel_edit` or `end_edit`
    pub fn register_once<F>(&mut self, callback: F)
    where
        F: FnOnce(&mut EditSession<T>, &EditedEvent<T>) + Send + 'static,
    {
        self.once.push_back(Box::new(callback));
    }

    pub fn pending_once_count(&self) -> usize {
        self.once.len()
    }

    fn ensure_state(&self, required: SessionState, operation: &'static str) -> Result<(), EditError> {
        let state = if self.is_editing() {
            SessionState::Editing
        } else {
            SessionState::NotEditing
        };
        if state == required {
            return Ok(());
        }
        log::debug!("{}: rejected '{}' while {}", self.schema.name(), operation, state);
        Err(EditError::InvalidState {
            type_name: self.schema.name().to_string(),
            operation,
            state,
        })
    }

    /// Indices whose values differ between the committed snapshot and `other`
    fn diff(&self, other: &T) -> Vec<usize> {
        (0..self.schema.field_count())
            .filter(|&index| match (self.unedited.get(index), other.get(index)) {
                (Some(a), Some(b)) => !self.schema.equals(index, &a, &b),
                (a, b) => a != b,
            })
            .collect()
    }

    /// Copy of the committed snapshot with every dirty field replaced by its shadow value
    fn merge(&self) -> Result<T, EditError> {
        let mut edited = self.unedited.clone();
        for index in self.flags.iter_dirty() {
            if let Some(value) = &self.shadow[index] {
                edited.set(index, value.clone())?;
            }
        }
        Ok(edited)
    }

    fn clear_shadow(&mut self) {
        for slot in &mut self.shadow {
            *slot = None;
        }
        self.flags.clear_fields();
    }

    /// Install a merged snapshot left by `end_edit`
    fn settle(&mut self) {
        let Some(edited) = self.pending.take() else {
            return;
        };
        let mut batch: Vec<Property> = self
            .diff(&edited)
            .into_iter()
            .map(Property::Field)
            .collect();
        batch.extend(self.flags.iter_dirty().map(Property::Dirty));
        batch.push(Property::Unedited);

        self.raise_changing(&batch);
        self.unedited = edited;
        self.clear_shadow();
        self.raise_changed(&batch);
    }

    fn raise_changing(&mut self, batch: &[Property]) {
        self.raise_property(|s| &mut s.changing, batch);
    }

    fn raise_changed(&mut self, batch: &[Property]) {
        self.raise_property(|s| &mut s.changed, batch);
    }

    fn raise_property(
        &mut self,
        registry: fn(&mut Self) -> &mut Registry<PropertyListener<T>>,
        batch: &[Property],
    ) {
        if batch.is_empty() || registry(self).is_empty() {
            return;
        }
        let ids = registry(self).ids();
        for property in batch {
            for id in &ids {
                let Some(mut listener) = registry(self).take(id) else {
                    continue;
                };
                listener(&*self, *property);
                registry(self).put_back(*id, listener);
            }
        }
    }

    fn raise_edited(&mut self, event: &EditedEvent<T>) {
        // Callbacks registered from here on wait for the next closure.
        let queue = std::mem::take(&mut self.once);

        for id in self.edited.ids() {
            self.notify_edited(id, event);
        }

        if !queue.is_empty() {
            log::trace!("{}: running {} one-shot callback(s)", self.schema.name(), queue.len());
        }
        for callback in queue {
            callback(self, event);
        }
    }

    fn notify_edited(&mut self, id: SubscriptionId, event: &EditedEvent<T>) {
        if self.edited.is_busy(&id) {
            self.deferred.push_back((id, event.clone()));
            return;
        }
        let Some(mut listener) = self.edited.take(&id) else {
            return;
        };
        listener(self, event);
        while self.edited.contains(&id) {
            let Some(pos) = self.deferred.iter().position(|(entry, _)| *entry == id) else {
                break;
            };
            let Some((_, nested)) = self.deferred.remove(pos) else {
                break;
            };
            listener(self, &nested);
        }
        self.deferred.retain(|(entry, _)| *entry != id);
        self.edited.put_back(id, listener);
    }
}

impl<T: Snapshot> fmt::Display for EditSession<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {{", self.schema.name())?;
        for (index, field) in self.schema.fields().enumerate() {
            if index > 0 {
                f.write_str(",")?;
            }
            match self.field(index) {
                Some(value) => write!(f, " {} = {}", field.name, value)?,
                None => write!(f, " {} = ?", field.name)?,
            }
        }
        if self.schema.field_count() > 0 {
            f.write_str(" ")?;
        }
        f.write_str("}")
    }
}

impl<T: Snapshot + fmt::Debug> fmt::Debug for EditSession<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EditSession")
            .field("schema", &self.schema.name())
            .field("unedited", &self.unedited)
            .field("editing", &self.is_editing())
            .field("changed_fields", &self.changed_fields().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}
