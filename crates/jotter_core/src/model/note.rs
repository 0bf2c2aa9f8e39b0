//! Note domain model.
//!
//! # Responsibility
//! - Define the canonical persisted note record.
//! - Own title validation shared by create and update paths.
//!
//! # Invariants
//! - `id` is stable and never reused for another note.
//! - `created_at` is set once and never changes afterwards.
//! - `updated_at >= created_at` for notes produced by the store.
//! - A stored note always has a title that is non-empty after trimming.

use serde::{Deserialize, Deserializer, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::{Builder, NoContext, Timestamp, Uuid};

/// Stable identifier for one note.
///
/// UUIDv7 keeps ids unique and sortable by creation time.
pub type NoteId = Uuid;

/// Canonical record for one persisted note.
///
/// Field names are serialized in camelCase to stay compatible with blobs
/// written by earlier front-ends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    /// Accepts both UUID strings and legacy epoch-millisecond numbers.
    #[serde(deserialize_with = "deserialize_note_id")]
    pub id: NoteId,
    /// Display title as typed by the user (not trimmed).
    pub title: String,
    /// Plain text body with lightweight inline markers.
    #[serde(default)]
    pub content: String,
    /// Unix epoch milliseconds.
    pub created_at: i64,
    /// Unix epoch milliseconds, refreshed on every successful save.
    pub updated_at: i64,
}

impl Note {
    /// Creates a note with a fresh time-ordered id stamped from `now_ms`.
    ///
    /// # Errors
    /// - Returns [`NoteValidationError::EmptyTitle`] when `title` is blank.
    pub fn new(
        title: impl Into<String>,
        content: impl Into<String>,
        now_ms: i64,
    ) -> Result<Self, NoteValidationError> {
        let title = title.into();
        validate_title(&title)?;
        Ok(Self {
            id: note_id_at(now_ms),
            title,
            content: content.into(),
            created_at: now_ms,
            updated_at: now_ms,
        })
    }

    /// Replaces title and content and refreshes `updated_at`.
    ///
    /// The note is left untouched when validation fails. `updated_at` never
    /// moves before `created_at`, even if the clock stepped backwards.
    pub fn revise(
        &mut self,
        title: impl Into<String>,
        content: impl Into<String>,
        now_ms: i64,
    ) -> Result<(), NoteValidationError> {
        let title = title.into();
        validate_title(&title)?;
        self.title = title;
        self.content = content.into();
        self.updated_at = now_ms.max(self.created_at);
        Ok(())
    }

    /// Validates invariants of an already-built record (e.g. one loaded from
    /// storage).
    pub fn validate(&self) -> Result<(), NoteValidationError> {
        validate_title(&self.title)?;
        if self.updated_at < self.created_at {
            return Err(NoteValidationError::UpdatedBeforeCreated {
                created_at: self.created_at,
                updated_at: self.updated_at,
            });
        }
        Ok(())
    }

    /// Returns whether `needle_lower` occurs in title or content.
    ///
    /// `needle_lower` must already be lowercase.
    pub(crate) fn matches_lowercase(&self, needle_lower: &str) -> bool {
        self.title.to_lowercase().contains(needle_lower)
            || self.content.to_lowercase().contains(needle_lower)
    }
}

/// Validation failures for note fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteValidationError {
    /// Title is empty after trimming.
    EmptyTitle,
    /// Loaded record claims it was updated before it was created.
    UpdatedBeforeCreated { created_at: i64, updated_at: i64 },
}

impl Display for NoteValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "note title cannot be empty"),
            Self::UpdatedBeforeCreated {
                created_at,
                updated_at,
            } => write!(
                f,
                "note updated_at ({updated_at}) is earlier than created_at ({created_at})"
            ),
        }
    }
}

impl Error for NoteValidationError {}

/// Checks the title rule used by both create and update.
pub fn validate_title(title: &str) -> Result<(), NoteValidationError> {
    if title.trim().is_empty() {
        return Err(NoteValidationError::EmptyTitle);
    }
    Ok(())
}

/// New random UUIDv7 whose timestamp is `epoch_ms` (clamped at the epoch).
fn note_id_at(epoch_ms: i64) -> NoteId {
    let epoch_ms = epoch_ms.max(0);
    let seconds = (epoch_ms / 1_000) as u64;
    let subsec_nanos = (epoch_ms % 1_000) as u32 * 1_000_000;
    Uuid::new_v7(Timestamp::from_unix(NoContext, seconds, subsec_nanos))
}

/// Maps a legacy epoch-millisecond id onto a deterministic UUIDv7.
///
/// Random bits are zeroed so the same legacy id always maps to the same UUID.
pub fn legacy_note_id(epoch_ms: u64) -> NoteId {
    Builder::from_unix_timestamp_millis(epoch_ms, &[0u8; 10]).into_uuid()
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawNoteId {
    Uuid(Uuid),
    Legacy(u64),
}

fn deserialize_note_id<'de, D>(deserializer: D) -> Result<NoteId, D::Error>
where
    D: Deserializer<'de>,
{
    match RawNoteId::deserialize(deserializer)? {
        RawNoteId::Uuid(id) => Ok(id),
        RawNoteId::Legacy(epoch_ms) => Ok(legacy_note_id(epoch_ms)),
    }
}

#[cfg(test)]
mod tests {
    use super::{legacy_note_id, Note, NoteValidationError};

    #[test]
    fn new_id_carries_creation_time() {
        let first = Note::new("a", "", 1_700_000_000_123).unwrap();
        let second = Note::new("b", "", 1_700_000_000_123).unwrap();
        assert_eq!(first.id.get_version_num(), 7);
        assert_ne!(first.id, second.id);
        assert_eq!(
            first.id.get_timestamp().unwrap().to_unix(),
            (1_700_000_000, 123_000_000)
        );
    }

    #[test]
    fn new_rejects_whitespace_title() {
        let err = Note::new("   \t", "body", 1).unwrap_err();
        assert_eq!(err, NoteValidationError::EmptyTitle);
    }

    #[test]
    fn new_sets_both_timestamps() {
        let note = Note::new("Title", "", 42).unwrap();
        assert_eq!(note.created_at, 42);
        assert_eq!(note.updated_at, 42);
        assert_eq!(note.id.get_version_num(), 7);
    }

    #[test]
    fn revise_keeps_note_unchanged_on_validation_error() {
        let mut note = Note::new("Title", "body", 10).unwrap();
        let before = note.clone();
        assert!(note.revise(" ", "other", 20).is_err());
        assert_eq!(note, before);
    }

    #[test]
    fn revise_refreshes_updated_at_only() {
        let mut note = Note::new("Title", "body", 10).unwrap();
        note.revise("New", "other", 20).unwrap();
        assert_eq!(note.title, "New");
        assert_eq!(note.content, "other");
        assert_eq!(note.created_at, 10);
        assert_eq!(note.updated_at, 20);
    }

    #[test]
    fn legacy_ids_are_deterministic() {
        assert_eq!(
            legacy_note_id(1_700_000_000_000),
            legacy_note_id(1_700_000_000_000)
        );
        assert_ne!(
            legacy_note_id(1_700_000_000_000),
            legacy_note_id(1_700_000_000_001)
        );
    }

    #[test]
    fn deserializes_camel_case_with_legacy_numeric_id() {
        let json = r#"{"id":1700000000000,"title":"Old","content":"x","createdAt":1,"updatedAt":2}"#;
        let note: Note = serde_json::from_str(json).unwrap();
        assert_eq!(note.id, legacy_note_id(1_700_000_000_000));
        assert_eq!(note.created_at, 1);
        assert_eq!(note.updated_at, 2);
    }
}
