//! Owned note collection with write-through persistence.
//!
//! # Responsibility
//! - Provide create/update/delete/list/filter over the note collection.
//! - Load the collection from storage and apply the configured load policy.
//! - Run the write-through subscriber, then user listeners, after each change.
//!   Write-through is owned by the store rather than boxed with the others
//!   so its write error can be returned to the caller of the mutation.
//!
//! # Invariants
//! - New notes are prepended; the collection is never re-sorted.
//! - `created_at` of a stored note never changes.
//! - Delete of a missing id is a no-op that still re-writes the snapshot.

use super::codec::decode_notes;
use super::events::{StoreEvent, StoreListener, SubscriptionId};
use super::write_through::WriteThrough;
use super::{NoteStoreError, NoteStoreResult};
use crate::clock::{Clock, SystemClock};
use crate::config::{CoreConfig, LoadPolicy};
use crate::model::note::{validate_title, Note, NoteId};
use crate::search::filter::filter_notes;
use crate::storage::KvStore;
use log::{info, warn};
use std::time::Instant;

/// How the stored collection was read at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Nothing was stored under the key yet.
    Missing,
    /// The stored collection was read completely.
    Clean { count: usize },
    /// Part or all of the stored collection was unreadable.
    Recovered(RecoveryReport),
}

/// Details of a recovered load, for surfacing a warning to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecoveryReport {
    /// Notes that survived the load.
    pub kept: usize,
    /// Key holding an untouched copy of the damaged blob.
    pub backup_key: String,
    /// Human-readable description of the damage.
    pub reason: String,
}

/// The note collection, its persistence and its subscribers.
pub struct NoteStore<S: KvStore, C: Clock = SystemClock> {
    notes: Vec<Note>,
    persistence: WriteThrough<S>,
    clock: C,
    listeners: Vec<(SubscriptionId, Box<dyn StoreListener>)>,
    next_subscription: u64,
}

impl<S: KvStore> NoteStore<S, SystemClock> {
    /// Loads the collection from `backend` using wall-clock time.
    pub fn load(backend: S, config: &CoreConfig) -> NoteStoreResult<(Self, LoadOutcome)> {
        Self::load_with_clock(backend, config, SystemClock)
    }
}

impl<S: KvStore, C: Clock> NoteStore<S, C> {
    /// Loads the collection from `backend` with an explicit time source.
    ///
    /// # Errors
    /// - [`NoteStoreError::Load`] when storage cannot be read, or when the
    ///   backup copy of a damaged blob cannot be written.
    /// - [`NoteStoreError::Corrupt`] when the blob is damaged and
    ///   `config.load_policy` is [`LoadPolicy::Strict`].
    pub fn load_with_clock(
        backend: S,
        config: &CoreConfig,
        clock: C,
    ) -> NoteStoreResult<(Self, LoadOutcome)> {
        let started_at = Instant::now();
        let mut persistence = WriteThrough::new(
            backend,
            config.storage_key.clone(),
            config.max_write_attempts,
        );

        let (notes, outcome) = match persistence.read_raw()? {
            None => (Vec::new(), LoadOutcome::Missing),
            Some(raw) => match decode_notes(&raw) {
                Ok(decoded) if !decoded.is_lossy() => {
                    let count = decoded.notes.len();
                    (decoded.notes, LoadOutcome::Clean { count })
                }
                Ok(decoded) => {
                    let reason = format!(
                        "{} unreadable and {} duplicate records skipped",
                        decoded.invalid, decoded.duplicates
                    );
                    recover(
                        &mut persistence,
                        config.load_policy,
                        &raw,
                        decoded.notes,
                        reason,
                    )?
                }
                Err(err) => recover(
                    &mut persistence,
                    config.load_policy,
                    &raw,
                    Vec::new(),
                    format!("blob is not a note list: {err}"),
                )?,
            },
        };

        info!(
            "event=notes_load module=store status=ok outcome={} count={} duration_ms={}",
            outcome_name(&outcome),
            notes.len(),
            started_at.elapsed().as_millis()
        );

        Ok((
            Self {
                notes,
                persistence,
                clock,
                listeners: Vec::new(),
                next_subscription: 0,
            },
            outcome,
        ))
    }

    /// All notes in collection order (newest-created first).
    pub fn list(&self) -> &[Note] {
        &self.notes
    }

    pub fn get(&self, id: NoteId) -> Option<&Note> {
        self.notes.iter().find(|note| note.id == id)
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    /// Creates a note at the front of the collection.
    ///
    /// # Errors
    /// - [`NoteStoreError::Validation`] for a blank title; nothing changes.
    /// - [`NoteStoreError::Persist`] when the note was added but not saved.
    pub fn create(
        &mut self,
        title: impl Into<String>,
        content: impl Into<String>,
    ) -> NoteStoreResult<Note> {
        let note = match Note::new(title, content, self.clock.now_ms()) {
            Ok(note) => note,
            Err(err) => {
                warn!("event=note_create module=store status=rejected reason={err}");
                return Err(err.into());
            }
        };

        self.notes.insert(0, note.clone());
        info!(
            "event=note_create module=store status=ok note_id={} count={}",
            note.id,
            self.notes.len()
        );
        self.after_change(Some(StoreEvent::NoteCreated(note.id)))?;
        Ok(note)
    }

    /// Replaces title and content of an existing note in place.
    ///
    /// # Errors
    /// - [`NoteStoreError::Validation`] for a blank title; nothing changes.
    /// - [`NoteStoreError::NotFound`] for an unknown id; nothing changes.
    /// - [`NoteStoreError::Persist`] when the edit was applied but not saved.
    pub fn update(
        &mut self,
        id: NoteId,
        title: impl Into<String>,
        content: impl Into<String>,
    ) -> NoteStoreResult<Note> {
        let title = title.into();
        if let Err(err) = validate_title(&title) {
            warn!("event=note_update module=store status=rejected note_id={id} reason={err}");
            return Err(err.into());
        }

        let now_ms = self.clock.now_ms();
        let Some(note) = self.notes.iter_mut().find(|note| note.id == id) else {
            warn!("event=note_update module=store status=not_found note_id={id}");
            return Err(NoteStoreError::NotFound(id));
        };
        note.revise(title, content, now_ms)?;
        let updated = note.clone();

        info!("event=note_update module=store status=ok note_id={id}");
        self.after_change(Some(StoreEvent::NoteUpdated(id)))?;
        Ok(updated)
    }

    /// Removes the note with `id` and returns it, or `None` when absent.
    ///
    /// # Errors
    /// - [`NoteStoreError::Persist`] when storage could not be updated; the
    ///   removal (if any) still stands.
    pub fn delete(&mut self, id: NoteId) -> NoteStoreResult<Option<Note>> {
        let removed = self
            .notes
            .iter()
            .position(|note| note.id == id)
            .map(|index| self.notes.remove(index));

        let event = removed.as_ref().map(|_| StoreEvent::NoteDeleted(id));
        info!(
            "event=note_delete module=store status=ok note_id={} removed={}",
            id,
            removed.is_some()
        );
        self.after_change(event)?;
        Ok(removed)
    }

    /// Notes whose title or content contains `query`, ignoring case.
    pub fn filter(&self, query: &str) -> Vec<&Note> {
        filter_notes(&self.notes, query)
    }

    /// Re-sends the full collection to storage.
    pub fn flush(&mut self) -> NoteStoreResult<()> {
        self.persistence
            .persist(&self.notes)
            .map_err(|source| NoteStoreError::Persist {
                applied: None,
                source,
            })
    }

    /// Whether storage may be behind memory after a failed write.
    pub fn is_dirty(&self) -> bool {
        self.persistence.is_dirty()
    }

    pub fn persistence(&self) -> &WriteThrough<S> {
        &self.persistence
    }

    pub fn persistence_mut(&mut self) -> &mut WriteThrough<S> {
        &mut self.persistence
    }

    /// Registers a listener called after every applied change.
    pub fn subscribe(&mut self, listener: impl StoreListener + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Removes a listener; returns `false` when `id` was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(current, _)| *current != id);
        self.listeners.len() != before
    }

    fn after_change(&mut self, event: Option<StoreEvent>) -> NoteStoreResult<()> {
        let persisted = match event.as_ref() {
            Some(event) => {
                self.persistence.on_change(event, &self.notes);
                self.persistence.take_failure().map_or(Ok(()), Err)
            }
            // A delete that removed nothing still re-writes the snapshot.
            None => self.persistence.persist(&self.notes),
        };
        if let Some(event) = event.as_ref() {
            for (_, listener) in &mut self.listeners {
                listener.on_change(event, &self.notes);
            }
        }
        persisted.map_err(|source| NoteStoreError::Persist {
            applied: event,
            source,
        })
    }
}

fn recover<S: KvStore>(
    persistence: &mut WriteThrough<S>,
    policy: LoadPolicy,
    raw: &str,
    kept: Vec<Note>,
    reason: String,
) -> NoteStoreResult<(Vec<Note>, LoadOutcome)> {
    if policy == LoadPolicy::Strict {
        warn!("event=notes_load module=store status=error policy=strict reason={reason}");
        return Err(NoteStoreError::Corrupt {
            key: persistence.key().to_string(),
            message: reason,
        });
    }

    let backup_key = persistence.backup_raw(raw)?;
    warn!(
        "event=notes_load module=store status=recovered kept={} backup_key={} reason={}",
        kept.len(),
        backup_key,
        reason
    );
    let report = RecoveryReport {
        kept: kept.len(),
        backup_key,
        reason,
    };
    Ok((kept, LoadOutcome::Recovered(report)))
}

fn outcome_name(outcome: &LoadOutcome) -> &'static str {
    match outcome {
        LoadOutcome::Missing => "missing",
        LoadOutcome::Clean { .. } => "clean",
        LoadOutcome::Recovered(_) => "recovered",
    }
}

#[cfg(test)]
mod tests {
    use super::{LoadOutcome, NoteStore};
    use crate::clock::ManualClock;
    use crate::config::CoreConfig;
    use crate::model::note::Note;
    use crate::storage::MemoryKvStore;
    use crate::store::events::StoreEvent;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn empty_store() -> NoteStore<MemoryKvStore, ManualClock> {
        let (store, outcome) = NoteStore::load_with_clock(
            MemoryKvStore::new(),
            &CoreConfig::default(),
            ManualClock::new(1_000),
        )
        .unwrap();
        assert_eq!(outcome, LoadOutcome::Missing);
        store
    }

    #[test]
    fn listeners_receive_events_until_unsubscribed() {
        let mut store = empty_store();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let subscription = store.subscribe(move |event: &StoreEvent, notes: &[Note]| {
            sink.borrow_mut().push((event.name(), notes.len()));
        });

        let note = store.create("a", "").unwrap();
        store.update(note.id, "b", "").unwrap();
        assert!(store.unsubscribe(subscription));
        store.delete(note.id).unwrap();

        assert_eq!(
            *seen.borrow(),
            vec![("note_created", 1), ("note_updated", 1)]
        );
        assert!(!store.unsubscribe(subscription));
    }

    #[test]
    fn delete_of_missing_id_emits_nothing_but_rewrites_snapshot() {
        let mut store = empty_store();
        let events = Rc::new(RefCell::new(0));
        let counter = Rc::clone(&events);
        store.subscribe(move |_: &StoreEvent, _: &[Note]| {
            *counter.borrow_mut() += 1;
        });

        assert_eq!(store.delete(uuid::Uuid::now_v7()).unwrap(), None);
        assert_eq!(*events.borrow(), 0);
        assert_eq!(store.persistence().backend().peek("notes"), Some("[]"));
    }
}
