//! Write-through persistence subscriber.
//!
//! # Responsibility
//! - Serialize the full collection to one storage key after every mutation.
//! - Retry failing writes and remember when memory is ahead of storage.
//! - Act as the store's first [`StoreListener`]; the outcome of the write it
//!   made for an event is kept until the store takes it with
//!   [`WriteThrough::take_failure`].
//!
//! # Invariants
//! - Every write is a full snapshot, so one successful write repairs any
//!   earlier failed one.
//! - Writes are issued synchronously, in mutation order.
//! - `take_failure` only ever reports the most recent event's write.

use super::codec::encode_notes;
use super::events::{StoreEvent, StoreListener};
use super::{NoteStoreError, NoteStoreResult};
use crate::model::note::Note;
use crate::storage::{KvStore, StorageError};
use log::{debug, warn};

/// Persists the note collection into a [`KvStore`] after each change.
#[derive(Debug)]
pub struct WriteThrough<S: KvStore> {
    backend: S,
    key: String,
    max_attempts: u32,
    dirty: bool,
    failure: Option<StorageError>,
}

impl<S: KvStore> WriteThrough<S> {
    /// `max_attempts` below 1 is treated as 1.
    pub fn new(backend: S, key: impl Into<String>, max_attempts: u32) -> Self {
        Self {
            backend,
            key: key.into(),
            max_attempts: max_attempts.max(1),
            dirty: false,
            failure: None,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn backend(&self) -> &S {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut S {
        &mut self.backend
    }

    /// Whether the last write failed and storage may be stale.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Writes the full collection, retrying up to `max_attempts` times.
    pub fn persist(&mut self, notes: &[Note]) -> Result<(), StorageError> {
        let blob = match encode_notes(notes) {
            Ok(blob) => blob,
            Err(err) => {
                // Notes are plain strings and integers; encoding cannot fail in practice.
                self.dirty = true;
                return Err(StorageError::Io {
                    key: self.key.clone(),
                    source: std::io::Error::new(std::io::ErrorKind::InvalidData, err),
                });
            }
        };

        let mut attempt = 1;
        loop {
            match self.backend.set(&self.key, &blob) {
                Ok(()) => {
                    self.dirty = false;
                    debug!(
                        "event=notes_persist module=store status=ok count={} attempt={}",
                        notes.len(),
                        attempt
                    );
                    return Ok(());
                }
                Err(err) if attempt < self.max_attempts => {
                    warn!(
                        "event=notes_persist module=store status=retry attempt={} error={}",
                        attempt, err
                    );
                    attempt += 1;
                }
                Err(err) => {
                    self.dirty = true;
                    warn!(
                        "event=notes_persist module=store status=error attempts={} error={}",
                        attempt, err
                    );
                    return Err(err);
                }
            }
        }
    }

    /// Error of the write made for the last event, if it failed.
    pub fn take_failure(&mut self) -> Option<StorageError> {
        self.failure.take()
    }

    /// Reads the raw blob stored under the collection key.
    pub(crate) fn read_raw(&self) -> NoteStoreResult<Option<String>> {
        self.backend.get(&self.key).map_err(NoteStoreError::Load)
    }

    /// Copies a damaged blob aside before it gets overwritten.
    pub(crate) fn backup_raw(&mut self, raw: &str) -> NoteStoreResult<String> {
        let backup_key = format!("{}.corrupt", self.key);
        self.backend
            .set(&backup_key, raw)
            .map_err(NoteStoreError::Load)?;
        Ok(backup_key)
    }
}

impl<S: KvStore> StoreListener for WriteThrough<S> {
    fn on_change(&mut self, event: &StoreEvent, notes: &[Note]) {
        self.failure = self.persist(notes).err();
        debug!(
            "event=notes_write_through module=store status={} trigger={} note_id={}",
            if self.failure.is_some() { "error" } else { "ok" },
            event.name(),
            event.note_id()
        );
    }
}
