//! Note editing: the draft session and its text formatting commands.
//!
//! # Responsibility
//! - Keep transient draft state separate from committed notes.
//! - Provide toolkit-independent selection formatting.

pub mod format;
pub mod session;
