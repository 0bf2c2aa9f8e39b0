//! Single active editor session.
//!
//! # Responsibility
//! - Hold the draft title/content for the note being created or edited.
//! - Commit the draft into the note store as a create or an update.
//!
//! # Invariants
//! - At most one draft exists; opening a session discards the previous one.
//! - Draft fields never touch the stored note until `commit` succeeds.
//! - The session closes only via successful `commit`, `close`, or a
//!   `NoteDeleted` event for its target note.

use super::format::{apply_inline_format, FormatKind, FormatResult};
use crate::clock::Clock;
use crate::model::note::{Note, NoteId};
use crate::storage::KvStore;
use crate::store::events::StoreEvent;
use crate::store::note_store::NoteStore;
use crate::store::NoteStoreError;
use log::{debug, info};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Draft state of an open session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Draft {
    /// `None` means the draft will create a new note.
    pub target_note_id: Option<NoteId>,
    pub title: String,
    pub content: String,
}

/// Editor session error.
#[derive(Debug)]
pub enum SessionError {
    /// No draft is open.
    NotOpen,
    /// The store rejected or could not persist the commit.
    Store(NoteStoreError),
}

impl Display for SessionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotOpen => write!(f, "no note is open for editing"),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for SessionError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::NotOpen => None,
            Self::Store(err) => Some(err),
        }
    }
}

impl From<NoteStoreError> for SessionError {
    fn from(value: NoteStoreError) -> Self {
        Self::Store(value)
    }
}

/// Editor state: closed, or open with one draft.
#[derive(Debug, Default)]
pub struct EditorSession {
    draft: Option<Draft>,
}

impl EditorSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_open(&self) -> bool {
        self.draft.is_some()
    }

    pub fn draft(&self) -> Option<&Draft> {
        self.draft.as_ref()
    }

    /// Target of the open draft; `None` when closed or creating.
    pub fn target_note_id(&self) -> Option<NoteId> {
        self.draft.as_ref().and_then(|draft| draft.target_note_id)
    }

    /// Opens an empty draft for a new note.
    pub fn open_for_create(&mut self) {
        self.draft = Some(Draft::default());
        debug!("event=editor_open module=editor mode=create");
    }

    /// Opens a draft seeded from `note`.
    pub fn open_for_edit(&mut self, note: &Note) {
        self.draft = Some(Draft {
            target_note_id: Some(note.id),
            title: note.title.clone(),
            content: note.content.clone(),
        });
        debug!(
            "event=editor_open module=editor mode=edit note_id={}",
            note.id
        );
    }

    pub fn update_draft_title(&mut self, text: impl Into<String>) -> Result<(), SessionError> {
        self.draft_mut()?.title = text.into();
        Ok(())
    }

    pub fn update_draft_content(&mut self, text: impl Into<String>) -> Result<(), SessionError> {
        self.draft_mut()?.content = text.into();
        Ok(())
    }

    /// Formats the selected range of the draft content in place.
    pub fn apply_inline_format(
        &mut self,
        kind: FormatKind,
        selection_start: usize,
        selection_end: usize,
    ) -> Result<FormatResult, SessionError> {
        let draft = self.draft_mut()?;
        let result = apply_inline_format(&draft.content, selection_start, selection_end, kind);
        draft.content = result.text.clone();
        Ok(result)
    }

    /// Saves the draft as a new note or as an update of its target.
    ///
    /// On validation or not-found errors the draft stays open for correction.
    /// When the store applied the change but could not persist it, the
    /// session still closes, so a retry cannot create a duplicate note.
    pub fn commit<S: KvStore, C: Clock>(
        &mut self,
        store: &mut NoteStore<S, C>,
    ) -> Result<Note, SessionError> {
        let draft = self.draft.as_ref().ok_or(SessionError::NotOpen)?;
        let result = match draft.target_note_id {
            None => store.create(draft.title.as_str(), draft.content.as_str()),
            Some(id) => store.update(id, draft.title.as_str(), draft.content.as_str()),
        };

        match result {
            Ok(note) => {
                self.close();
                Ok(note)
            }
            Err(err) if err.mutation_applied() => {
                self.close();
                Err(err.into())
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Discards the draft. Closing a closed session is a no-op.
    pub fn close(&mut self) {
        if self.draft.take().is_some() {
            debug!("event=editor_close module=editor");
        }
    }

    /// Reacts to store changes; returns `true` when the session closed.
    pub fn handle_store_event(&mut self, event: &StoreEvent) -> bool {
        match event {
            StoreEvent::NoteDeleted(id) if self.target_note_id() == Some(*id) => {
                self.close();
                info!("event=editor_close module=editor reason=note_deleted note_id={id}");
                true
            }
            _ => false,
        }
    }

    fn draft_mut(&mut self) -> Result<&mut Draft, SessionError> {
        self.draft.as_mut().ok_or(SessionError::NotOpen)
    }
}

#[cfg(test)]
mod tests {
    use super::{EditorSession, SessionError};
    use crate::editor::format::FormatKind;
    use crate::model::note::Note;
    use crate::store::events::StoreEvent;

    #[test]
    fn opening_discards_previous_draft() {
        let mut session = EditorSession::new();
        session.open_for_create();
        session.update_draft_title("unsaved").unwrap();

        let note = Note::new("Existing", "body", 1).unwrap();
        session.open_for_edit(&note);
        let draft = session.draft().unwrap();
        assert_eq!(draft.title, "Existing");
        assert_eq!(draft.target_note_id, Some(note.id));

        session.open_for_create();
        assert_eq!(session.draft().unwrap().title, "");
        assert_eq!(session.target_note_id(), None);
    }

    #[test]
    fn edits_require_open_session() {
        let mut session = EditorSession::new();
        assert!(matches!(
            session.update_draft_content("x"),
            Err(SessionError::NotOpen)
        ));
        assert!(matches!(
            session.apply_inline_format(FormatKind::Bold, 0, 0),
            Err(SessionError::NotOpen)
        ));
    }

    #[test]
    fn format_updates_draft_content() {
        let mut session = EditorSession::new();
        session.open_for_create();
        session.update_draft_content("the cat sat").unwrap();
        let result = session
            .apply_inline_format(FormatKind::Bold, 4, 7)
            .unwrap();
        assert_eq!(result.text, "the **cat** sat");
        assert_eq!(session.draft().unwrap().content, "the **cat** sat");
    }

    #[test]
    fn closes_only_for_deletion_of_its_target() {
        let note = Note::new("Target", "", 1).unwrap();
        let other = Note::new("Other", "", 1).unwrap();
        let mut session = EditorSession::new();
        session.open_for_edit(&note);

        assert!(!session.handle_store_event(&StoreEvent::NoteDeleted(other.id)));
        assert!(!session.handle_store_event(&StoreEvent::NoteUpdated(note.id)));
        assert!(session.is_open());

        assert!(session.handle_store_event(&StoreEvent::NoteDeleted(note.id)));
        assert!(!session.is_open());
    }
}
