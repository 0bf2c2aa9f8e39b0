//! Change notifications emitted by the note store.

use crate::model::note::{Note, NoteId};

/// One applied mutation of the note collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreEvent {
    NoteCreated(NoteId),
    NoteUpdated(NoteId),
    /// Emitted only when a note was actually removed.
    NoteDeleted(NoteId),
}

impl StoreEvent {
    /// Id of the note this event refers to.
    pub fn note_id(&self) -> NoteId {
        match self {
            Self::NoteCreated(id) | Self::NoteUpdated(id) | Self::NoteDeleted(id) => *id,
        }
    }

    /// Stable event name used in log lines.
    pub fn name(&self) -> &'static str {
        match self {
            Self::NoteCreated(_) => "note_created",
            Self::NoteUpdated(_) => "note_updated",
            Self::NoteDeleted(_) => "note_deleted",
        }
    }
}

/// Observer of note collection changes.
///
/// Listeners run synchronously after the mutation and after write-through,
/// in subscription order.
pub trait StoreListener {
    fn on_change(&mut self, event: &StoreEvent, notes: &[Note]);
}

impl<F> StoreListener for F
where
    F: FnMut(&StoreEvent, &[Note]),
{
    fn on_change(&mut self, event: &StoreEvent, notes: &[Note]) {
        self(event, notes)
    }
}

/// Handle returned by `NoteStore::subscribe`, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(pub(crate) u64);
