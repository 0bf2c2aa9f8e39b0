//! Core domain logic for Jotter.
//! This crate is the single source of truth for note invariants.

pub mod app;
pub mod clock;
pub mod config;
pub mod editor;
pub mod logging;
pub mod model;
pub mod search;
pub mod storage;
pub mod store;

pub use app::{AppError, AppOutcome, NotesApp, UiEvent};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{ConfigError, CoreConfig, LoadPolicy};
pub use editor::format::{apply_inline_format, FormatKind, FormatResult, UnknownFormatKind};
pub use editor::session::{Draft, EditorSession, SessionError};
pub use logging::{
    default_log_level, init_logging, init_logging_with_config, logging_status, LoggingError,
};
pub use model::note::{Note, NoteId, NoteValidationError};
pub use search::filter::{filter_notes, FilteredView};
pub use search::preview::derive_preview;
pub use storage::{FileKvStore, KvStore, MemoryKvStore, StorageError, StorageResult};
pub use store::events::{StoreEvent, StoreListener, SubscriptionId};
pub use store::note_store::{LoadOutcome, NoteStore, RecoveryReport};
pub use store::write_through::WriteThrough;
pub use store::{NoteStoreError, NoteStoreResult};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
