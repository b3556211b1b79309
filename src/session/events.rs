//! Notification payloads and listener registries

use super::EditSession;
use uuid::Uuid;

/// Handle returned by every subscribe call
pub type SubscriptionId = Uuid;

/// What a changing/changed notification is about
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Property {
    /// The effective value of a field
    Field(usize),
    /// Whether a field is dirty
    Dirty(usize),
    /// The committed snapshot itself
    Unedited,
}

/// Payload of the "edited" notification and of one-shot callbacks
#[derive(Clone, Debug, PartialEq)]
pub struct EditedEvent<T> {
    pub old_value: T,
    pub new_value: T,
    /// True when the edit was cancelled or ended without dirty fields
    pub cancelled_or_unchanged: bool,
}

impl<T: Clone> EditedEvent<T> {
    pub fn new(old_value: T, new_value: T, cancelled_or_unchanged: bool) -> Self {
        Self {
            old_value,
            new_value,
            cancelled_or_unchanged,
        }
    }

    pub(crate) fn unchanged(value: &T) -> Self {
        Self::new(value.clone(), value.clone(), true)
    }
}

pub type PropertyListener<T> = dyn FnMut(&EditSession<T>, Property) + Send;
pub type EditedListener<T> = dyn FnMut(&mut EditSession<T>, &EditedEvent<T>) + Send;
pub type OnceCallback<T> = Box<dyn FnOnce(&mut EditSession<T>, &EditedEvent<T>) + Send>;

/// Ordered listener list.
///
/// Dispatch walks a copy of the ids and takes each listener out only while
/// it runs, so a listener may subscribe, unsubscribe, or trigger a nested
/// dispatch. Ids subscribed mid-dispatch are not in the copy and first run
/// on the next dispatch. A listener that is running is busy and is not
/// handed out again until it is put back.
pub(crate) struct Registry<F: ?Sized> {
    entries: Vec<(SubscriptionId, Option<Box<F>>)>,
}

impl<F: ?Sized> Registry<F> {
    pub(crate) fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub(crate) fn subscribe(&mut self, listener: Box<F>) -> SubscriptionId {
        let id = Uuid::new_v4();
        self.entries.push((id, Some(listener)));
        id
    }

    pub(crate) fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry, _)| *entry != id);
        self.entries.len() != before
    }

    pub(crate) fn contains(&self, id: &SubscriptionId) -> bool {
        self.entries.iter().any(|(entry, _)| entry == id)
    }

    /// Subscribed but currently taken out for a call
    pub(crate) fn is_busy(&self, id: &SubscriptionId) -> bool {
        self.entries
            .iter()
            .any(|(entry, listener)| entry == id && listener.is_none())
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn ids(&self) -> Vec<SubscriptionId> {
        self.entries.iter().map(|(id, _)| *id).collect()
    }

    pub(crate) fn take(&mut self, id: &SubscriptionId) -> Option<Box<F>> {
        self.entries
            .iter_mut()
            .find(|(entry, _)| entry == id)
            .and_then(|(_, listener)| listener.take())
    }

    /// Return a listener after its call; dropped if it was unsubscribed meanwhile
    pub(crate) fn put_back(&mut self, id: SubscriptionId, listener: Box<F>) {
        if let Some((_, slot)) = self.entries.iter_mut().find(|(entry, _)| *entry == id) {
            *slot = Some(listener);
        }
    }
}
