//! Command execution against a directory-backed note store.

use crate::cli::{Command, NoteCommand, CONFIG_FILE_NAME};
use jotter_core::{
    apply_inline_format, derive_preview, AppError, AppOutcome, ConfigError, CoreConfig,
    FileKvStore, LoadOutcome, Note, NoteId, NotesApp, StorageError, UiEvent,
};
use log::warn;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io::Write;
use std::path::Path;

#[derive(Debug)]
pub enum CliError {
    Config(ConfigError),
    ReadConfig(std::io::Error),
    Storage(StorageError),
    App(AppError),
    InvalidId(String),
    Output(std::io::Error),
}

impl Display for CliError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(err) => write!(f, "{err}"),
            Self::ReadConfig(err) => write!(f, "cannot read {CONFIG_FILE_NAME}: {err}"),
            Self::Storage(err) => write!(f, "{err}"),
            Self::App(err) => write!(f, "{err}"),
            Self::InvalidId(value) => write!(f, "`{value}` is not a note id"),
            Self::Output(err) => write!(f, "cannot write output: {err}"),
        }
    }
}

impl Error for CliError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Config(err) => Some(err),
            Self::ReadConfig(err) | Self::Output(err) => Some(err),
            Self::Storage(err) => Some(err),
            Self::App(err) => Some(err),
            Self::InvalidId(_) => None,
        }
    }
}

impl From<AppError> for CliError {
    fn from(value: AppError) -> Self {
        Self::App(value)
    }
}

impl From<std::io::Error> for CliError {
    fn from(value: std::io::Error) -> Self {
        Self::Output(value)
    }
}

/// Reads `jotter.json` from `data_dir`, falling back to defaults when absent.
pub fn load_config(data_dir: &Path) -> Result<CoreConfig, CliError> {
    match std::fs::read_to_string(data_dir.join(CONFIG_FILE_NAME)) {
        Ok(text) => CoreConfig::from_json_str(&text).map_err(CliError::Config),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(CoreConfig::default()),
        Err(err) => Err(CliError::ReadConfig(err)),
    }
}

/// Runs one command, writing user-facing output to `out`.
pub fn run(
    data_dir: &Path,
    config: &CoreConfig,
    command: Command,
    out: &mut impl Write,
) -> Result<(), CliError> {
    match command {
        Command::Format {
            kind,
            start,
            end,
            text,
        } => {
            let result = apply_inline_format(&text, start, end, kind);
            writeln!(out, "{}", result.text)?;
            writeln!(
                out,
                "selection={}..{}",
                result.selection_start, result.selection_end
            )?;
            Ok(())
        }
        Command::Notes(command) => run_note_command(data_dir, config, command, out),
    }
}

fn run_note_command(
    data_dir: &Path,
    config: &CoreConfig,
    command: NoteCommand,
    out: &mut impl Write,
) -> Result<(), CliError> {
    let backend = FileKvStore::open(data_dir).map_err(CliError::Storage)?;
    let (mut app, outcome) = NotesApp::open(backend, config)?;
    if let LoadOutcome::Recovered(report) = &outcome {
        warn!(
            "event=cli_load module=cli status=recovered kept={} backup_key={}",
            report.kept, report.backup_key
        );
        writeln!(
            out,
            "warning: stored notes were damaged ({}); a copy was kept under `{}`",
            report.reason, report.backup_key
        )?;
    }

    match command {
        NoteCommand::List => write_notes(out, app.notes())?,
        NoteCommand::Add { title, content } => {
            app.dispatch(UiEvent::CreateNew)?;
            app.dispatch(UiEvent::EditTitle(title))?;
            app.dispatch(UiEvent::EditContent(content))?;
            if let AppOutcome::Saved(note) = app.dispatch(UiEvent::Save)? {
                writeln!(out, "{}", note.id)?;
            }
        }
        NoteCommand::Edit { id, title, content } => {
            let id = parse_id(&id)?;
            app.dispatch(UiEvent::OpenForEdit(id))?;
            app.dispatch(UiEvent::EditTitle(title))?;
            if let Some(content) = content {
                app.dispatch(UiEvent::EditContent(content))?;
            }
            app.dispatch(UiEvent::Save)?;
            writeln!(out, "updated {id}")?;
        }
        NoteCommand::Search { query } => {
            app.dispatch(UiEvent::SearchChanged(query))?;
            write_notes(out, app.filtered())?;
        }
        NoteCommand::Delete { id } => {
            let id = parse_id(&id)?;
            match app.dispatch(UiEvent::Delete(id))? {
                AppOutcome::Deleted { removed: true } => writeln!(out, "deleted {id}")?,
                _ => writeln!(out, "no note {id}")?,
            }
        }
    }
    Ok(())
}

fn parse_id(value: &str) -> Result<NoteId, CliError> {
    value
        .trim()
        .parse::<NoteId>()
        .map_err(|_| CliError::InvalidId(value.to_string()))
}

fn write_notes(out: &mut impl Write, notes: &[Note]) -> Result<(), CliError> {
    for note in notes {
        let preview = derive_preview(&note.content).unwrap_or_default();
        writeln!(out, "{}\t{}\t{}", note.id, note.title, preview)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{load_config, run, CliError};
    use crate::cli::{Command, NoteCommand};
    use jotter_core::{AppError, CoreConfig, FormatKind};
    use std::path::Path;

    fn exec(dir: &Path, command: Command) -> Result<String, CliError> {
        let mut out = Vec::new();
        run(dir, &CoreConfig::default(), command, &mut out)?;
        Ok(String::from_utf8(out).unwrap())
    }

    fn exec_notes(dir: &Path, command: NoteCommand) -> Result<String, CliError> {
        exec(dir, Command::Notes(command))
    }

    #[test]
    fn add_list_search_delete_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let id = exec_notes(
            dir.path(),
            NoteCommand::Add {
                title: "Groceries".to_string(),
                content: "milk **eggs** bread".to_string(),
            },
        )
        .unwrap()
        .trim()
        .to_string();
        exec_notes(
            dir.path(),
            NoteCommand::Add {
                title: "Work".to_string(),
                content: String::new(),
            },
        )
        .unwrap();

        let listed = exec_notes(dir.path(), NoteCommand::List).unwrap();
        let lines: Vec<&str> = listed.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("\tWork\t"));
        assert_eq!(lines[1], format!("{id}\tGroceries\tmilk eggs bread"));

        let found = exec_notes(
            dir.path(),
            NoteCommand::Search {
                query: "EGGS".to_string(),
            },
        )
        .unwrap();
        assert_eq!(found.lines().count(), 1);

        let deleted = exec_notes(dir.path(), NoteCommand::Delete { id: id.clone() }).unwrap();
        assert_eq!(deleted.trim(), format!("deleted {id}"));
        let again = exec_notes(dir.path(), NoteCommand::Delete { id: id.clone() }).unwrap();
        assert_eq!(again.trim(), format!("no note {id}"));
    }

    #[test]
    fn edit_keeps_content_when_omitted() {
        let dir = tempfile::tempdir().unwrap();
        let id = exec_notes(
            dir.path(),
            NoteCommand::Add {
                title: "Draft".to_string(),
                content: "body".to_string(),
            },
        )
        .unwrap()
        .trim()
        .to_string();

        exec_notes(
            dir.path(),
            NoteCommand::Edit {
                id,
                title: "Final".to_string(),
                content: None,
            },
        )
        .unwrap();
        let listed = exec_notes(dir.path(), NoteCommand::List).unwrap();
        assert!(listed.contains("\tFinal\tbody"));
    }

    #[test]
    fn blank_title_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let err = exec_notes(
            dir.path(),
            NoteCommand::Add {
                title: " ".to_string(),
                content: String::new(),
            },
        )
        .unwrap_err();
        assert!(matches!(err, CliError::App(ref app) if app.validation().is_some()));
    }

    #[test]
    fn rejects_malformed_id_and_unknown_note() {
        let dir = tempfile::tempdir().unwrap();
        let err = exec_notes(
            dir.path(),
            NoteCommand::Delete {
                id: "42".to_string(),
            },
        )
        .unwrap_err();
        assert!(matches!(err, CliError::InvalidId(_)));

        let err = exec_notes(
            dir.path(),
            NoteCommand::Edit {
                id: "0190b6a2-2c1e-7000-8000-000000000000".to_string(),
                title: "x".to_string(),
                content: None,
            },
        )
        .unwrap_err();
        assert!(matches!(err, CliError::App(AppError::NoteNotFound(_))));
    }

    #[test]
    fn format_prints_text_and_selection_without_opening_store() {
        let dir = tempfile::tempdir().unwrap();
        let data_dir = dir.path().join("unused");
        let output = exec(
            &data_dir,
            Command::Format {
                kind: FormatKind::Bold,
                start: 4,
                end: 7,
                text: "the cat sat".to_string(),
            },
        )
        .unwrap();
        assert_eq!(output, "the **cat** sat\nselection=6..9\n");
        assert!(!data_dir.exists());
    }

    #[test]
    fn config_file_overrides_storage_key() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(load_config(dir.path()).unwrap(), CoreConfig::default());

        std::fs::write(dir.path().join("jotter.json"), r#"{"storage_key":"inbox"}"#).unwrap();
        let config = load_config(dir.path()).unwrap();
        assert_eq!(config.storage_key, "inbox");

        std::fs::write(dir.path().join("jotter.json"), "{").unwrap();
        assert!(matches!(load_config(dir.path()), Err(CliError::Config(_))));
    }
}
