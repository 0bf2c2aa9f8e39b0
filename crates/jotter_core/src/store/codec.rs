//! JSON encoding of the persisted note collection.
//!
//! # Invariants
//! - The blob is a JSON array of note objects, newest first.
//! - Decoding never reorders records.
//! - A decoded collection never holds two notes with the same id.

use crate::model::note::Note;
use serde_json::Value;
use std::collections::HashSet;

/// Result of decoding a stored blob.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedNotes {
    /// Valid, de-duplicated notes in stored order.
    pub notes: Vec<Note>,
    /// Records that did not parse or failed validation.
    pub invalid: usize,
    /// Records whose id repeated an earlier record.
    pub duplicates: usize,
}

impl DecodedNotes {
    /// Whether any stored record had to be discarded.
    pub fn is_lossy(&self) -> bool {
        self.invalid > 0 || self.duplicates > 0
    }
}

/// Serializes the collection for write-through.
pub fn encode_notes(notes: &[Note]) -> serde_json::Result<String> {
    serde_json::to_string(notes)
}

/// Parses a stored blob.
///
/// Individual bad records are skipped and counted. The whole blob is rejected
/// only when it is not a JSON array.
pub fn decode_notes(text: &str) -> serde_json::Result<DecodedNotes> {
    let records: Vec<Value> = serde_json::from_str(text)?;
    let mut seen = HashSet::with_capacity(records.len());
    let mut decoded = DecodedNotes {
        notes: Vec::with_capacity(records.len()),
        invalid: 0,
        duplicates: 0,
    };

    for record in records {
        let note = match serde_json::from_value::<Note>(record) {
            Ok(note) if note.validate().is_ok() => note,
            _ => {
                decoded.invalid += 1;
                continue;
            }
        };
        if !seen.insert(note.id) {
            decoded.duplicates += 1;
            continue;
        }
        decoded.notes.push(note);
    }

    Ok(decoded)
}
