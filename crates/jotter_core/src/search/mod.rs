//! Search and display helpers over the note collection.
//!
//! # Responsibility
//! - Filter notes by a free-text query for the list view.
//! - Derive plain-text previews for note cards.

pub mod filter;
pub mod preview;
