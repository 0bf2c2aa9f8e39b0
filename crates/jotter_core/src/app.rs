//! UI-facing controller tying the note store to the editor session.
//!
//! # Responsibility
//! - Translate UI events into store and session calls.
//! - Route store events to the editor session (delete closes an open draft).
//! - Keep the filtered list view current for rendering.
//!
//! # Invariants
//! - The filtered view is recomputed after every collection or query change.
//! - At most one editor session exists; it is owned here.

use crate::clock::{Clock, SystemClock};
use crate::config::CoreConfig;
use crate::editor::format::{FormatKind, FormatResult};
use crate::editor::session::{EditorSession, SessionError};
use crate::model::note::{Note, NoteId, NoteValidationError};
use crate::search::filter::FilteredView;
use crate::storage::KvStore;
use crate::store::events::StoreEvent;
use crate::store::note_store::{LoadOutcome, NoteStore};
use crate::store::NoteStoreError;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// User interaction delivered by the UI layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    CreateNew,
    OpenForEdit(NoteId),
    EditTitle(String),
    EditContent(String),
    Format {
        kind: FormatKind,
        start: usize,
        end: usize,
    },
    Save,
    Delete(NoteId),
    Close,
    SearchChanged(String),
}

/// Result of a successfully handled [`UiEvent`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppOutcome {
    EditorOpened,
    DraftChanged,
    /// New content and selection to restore in the text control.
    Formatted(FormatResult),
    Saved(Note),
    /// `removed` is `false` when the id was already gone.
    Deleted { removed: bool },
    EditorClosed,
    SearchUpdated { matches: usize },
}

/// Controller error surfaced to the UI.
#[derive(Debug)]
pub enum AppError {
    NoteNotFound(NoteId),
    Session(SessionError),
    Store(NoteStoreError),
}

impl AppError {
    /// Validation failure the user can fix by editing the draft.
    pub fn validation(&self) -> Option<NoteValidationError> {
        match self {
            Self::Session(SessionError::Store(NoteStoreError::Validation(err)))
            | Self::Store(NoteStoreError::Validation(err)) => Some(*err),
            _ => None,
        }
    }
}

impl Display for AppError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoteNotFound(id) => write!(f, "note not found: {id}"),
            Self::Session(err) => write!(f, "{err}"),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for AppError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::NoteNotFound(_) => None,
            Self::Session(err) => Some(err),
            Self::Store(err) => Some(err),
        }
    }
}

impl From<SessionError> for AppError {
    fn from(value: SessionError) -> Self {
        Self::Session(value)
    }
}

impl From<NoteStoreError> for AppError {
    fn from(value: NoteStoreError) -> Self {
        Self::Store(value)
    }
}

/// Application state behind the note list and the editor.
pub struct NotesApp<S: KvStore, C: Clock = SystemClock> {
    store: NoteStore<S, C>,
    session: EditorSession,
    view: FilteredView,
}

impl<S: KvStore> NotesApp<S, SystemClock> {
    /// Loads the store from `backend` and builds the app around it.
    pub fn open(backend: S, config: &CoreConfig) -> Result<(Self, LoadOutcome), AppError> {
        let (store, outcome) = NoteStore::load(backend, config)?;
        Ok((Self::new(store), outcome))
    }
}

impl<S: KvStore, C: Clock> NotesApp<S, C> {
    pub fn new(store: NoteStore<S, C>) -> Self {
        let view = FilteredView::new(store.list(), "");
        Self {
            store,
            session: EditorSession::new(),
            view,
        }
    }

    /// Handles one UI event to completion.
    pub fn dispatch(&mut self, event: UiEvent) -> Result<AppOutcome, AppError> {
        match event {
            UiEvent::CreateNew => {
                self.session.open_for_create();
                Ok(AppOutcome::EditorOpened)
            }
            UiEvent::OpenForEdit(id) => {
                let note = self.store.get(id).ok_or(AppError::NoteNotFound(id))?;
                self.session.open_for_edit(note);
                Ok(AppOutcome::EditorOpened)
            }
            UiEvent::EditTitle(text) => {
                self.session.update_draft_title(text)?;
                Ok(AppOutcome::DraftChanged)
            }
            UiEvent::EditContent(text) => {
                self.session.update_draft_content(text)?;
                Ok(AppOutcome::DraftChanged)
            }
            UiEvent::Format { kind, start, end } => {
                let result = self.session.apply_inline_format(kind, start, end)?;
                Ok(AppOutcome::Formatted(result))
            }
            UiEvent::Save => self.save(),
            UiEvent::Delete(id) => self.delete(id),
            UiEvent::Close => {
                self.session.close();
                Ok(AppOutcome::EditorClosed)
            }
            UiEvent::SearchChanged(query) => {
                self.view.set_query(self.store.list(), query);
                Ok(AppOutcome::SearchUpdated {
                    matches: self.view.notes().len(),
                })
            }
        }
    }

    pub fn notes(&self) -> &[Note] {
        self.store.list()
    }

    /// Notes matching the current search query, in collection order.
    pub fn filtered(&self) -> &[Note] {
        self.view.notes()
    }

    pub fn search_query(&self) -> &str {
        self.view.query()
    }

    pub fn editor(&self) -> &EditorSession {
        &self.session
    }

    pub fn store(&self) -> &NoteStore<S, C> {
        &self.store
    }

    /// Retries persistence after an earlier write failure.
    pub fn flush(&mut self) -> Result<(), AppError> {
        self.store.flush().map_err(AppError::from)
    }

    fn save(&mut self) -> Result<AppOutcome, AppError> {
        let result = self.session.commit(&mut self.store);
        self.view.refresh(self.store.list());
        Ok(AppOutcome::Saved(result?))
    }

    fn delete(&mut self, id: NoteId) -> Result<AppOutcome, AppError> {
        let result = self.store.delete(id);
        let applied = match &result {
            Ok(Some(_)) => Some(StoreEvent::NoteDeleted(id)),
            Err(NoteStoreError::Persist { applied, .. }) => *applied,
            _ => None,
        };
        if let Some(event) = applied {
            self.session.handle_store_event(&event);
        }
        self.view.refresh(self.store.list());

        let removed = result?;
        Ok(AppOutcome::Deleted {
            removed: removed.is_some(),
        })
    }
}
