//! Note collection ownership and persistence synchronization.
//!
//! # Responsibility
//! - Own the ordered in-memory note collection.
//! - Write the collection through to blob storage after every mutation.
//! - Notify subscribers of applied changes.
//!
//! # Invariants
//! - No two notes in the collection share an id.
//! - A rejected operation (validation, not found) never mutates the
//!   collection and never writes to storage.

use crate::model::note::{NoteId, NoteValidationError};
use crate::storage::StorageError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod codec;
pub mod events;
pub mod note_store;
pub mod write_through;

pub type NoteStoreResult<T> = Result<T, NoteStoreError>;

/// Note store error.
#[derive(Debug)]
pub enum NoteStoreError {
    /// Input rejected; nothing changed.
    Validation(NoteValidationError),
    /// No note with this id; nothing changed.
    NotFound(NoteId),
    /// The in-memory change in `applied` stands, but storage could not be
    /// updated. The store stays dirty until a later write or `flush` succeeds.
    Persist {
        applied: Option<events::StoreEvent>,
        source: StorageError,
    },
    /// Reading the stored collection failed.
    Load(StorageError),
    /// Stored collection is damaged and the load policy is strict.
    Corrupt { key: String, message: String },
}

impl NoteStoreError {
    /// Whether the requested change is live in memory despite the error.
    pub fn mutation_applied(&self) -> bool {
        matches!(self, Self::Persist { applied: Some(_), .. })
    }
}

impl Display for NoteStoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "note not found: {id}"),
            Self::Persist { source, .. } => {
                write!(f, "change kept in memory but not saved: {source}")
            }
            Self::Load(err) => write!(f, "failed to load notes: {err}"),
            Self::Corrupt { key, message } => {
                write!(f, "stored notes under `{key}` are unreadable: {message}")
            }
        }
    }
}

impl Error for NoteStoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Persist { source, .. } => Some(source),
            Self::Load(err) => Some(err),
            Self::NotFound(_) | Self::Corrupt { .. } => None,
        }
    }
}

impl From<NoteValidationError> for NoteStoreError {
    fn from(value: NoteValidationError) -> Self {
        Self::Validation(value)
    }
}
