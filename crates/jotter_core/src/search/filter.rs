//! Case-insensitive substring filtering over the note collection.
//!
//! # Invariants
//! - An empty query returns every note.
//! - Matching preserves collection order.
//! - The query is matched as typed; surrounding whitespace is significant.

use crate::model::note::Note;

/// Returns notes whose title or content contains `query`, ignoring case.
pub fn filter_notes<'a>(notes: &'a [Note], query: &str) -> Vec<&'a Note> {
    if query.is_empty() {
        return notes.iter().collect();
    }

    let needle = query.to_lowercase();
    notes
        .iter()
        .filter(|note| note.matches_lowercase(&needle))
        .collect()
}

/// Cached filter result for the current search query.
///
/// Owners call [`FilteredView::refresh`] whenever the collection or the query
/// changes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilteredView {
    query: String,
    notes: Vec<Note>,
}

impl FilteredView {
    pub fn new(notes: &[Note], query: impl Into<String>) -> Self {
        let mut view = Self {
            query: query.into(),
            notes: Vec::new(),
        };
        view.refresh(notes);
        view
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    /// Replaces the query and recomputes.
    pub fn set_query(&mut self, notes: &[Note], query: impl Into<String>) {
        self.query = query.into();
        self.refresh(notes);
    }

    /// Recomputes against the current collection.
    pub fn refresh(&mut self, notes: &[Note]) {
        self.notes = filter_notes(notes, &self.query)
            .into_iter()
            .cloned()
            .collect();
    }
}
