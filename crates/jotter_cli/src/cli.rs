use clap::{Parser, Subcommand};
use jotter_core::FormatKind;
use std::path::PathBuf;

/// File name of the optional config document inside the data directory.
pub const CONFIG_FILE_NAME: &str = "jotter.json";

#[derive(Clone, Debug, Eq, Parser, PartialEq)]
#[command(version, about = "Keep short plain-text notes in a local directory")]
pub struct Cli {
    /// Directory holding the notes blob, config and logs.
    pub data_dir: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Clone, Debug, Eq, PartialEq, Subcommand)]
pub enum Command {
    #[command(flatten)]
    Notes(NoteCommand),
    /// Apply an inline format to a char range of TEXT and print the result.
    Format {
        #[arg(value_parser = parse_format_kind)]
        kind: FormatKind,
        start: usize,
        end: usize,
        text: String,
    },
}

/// Commands that read or change the stored notes.
#[derive(Clone, Debug, Eq, PartialEq, Subcommand)]
pub enum NoteCommand {
    /// List all notes, newest first.
    List,
    /// Create a note.
    Add {
        title: String,
        #[arg(default_value = "")]
        content: String,
    },
    /// Replace title (and optionally content) of a note.
    Edit {
        id: String,
        title: String,
        content: Option<String>,
    },
    /// List notes whose title or content contains the query.
    Search { query: String },
    /// Delete a note; deleting a missing id is not an error.
    Delete { id: String },
}

fn parse_format_kind(value: &str) -> Result<FormatKind, String> {
    value.parse::<FormatKind>().map_err(|err| err.to_string())
}

#[cfg(test)]
mod tests {
    use super::{Cli, Command, NoteCommand};
    use clap::Parser;
    use jotter_core::FormatKind;

    #[test]
    fn parses_format_command() {
        let cli = Cli::try_parse_from([
            "jotter",
            "/tmp/notes",
            "format",
            "bold",
            "4",
            "7",
            "the cat sat",
        ])
        .unwrap();
        assert_eq!(
            cli.command,
            Command::Format {
                kind: FormatKind::Bold,
                start: 4,
                end: 7,
                text: "the cat sat".to_string(),
            }
        );
    }

    #[test]
    fn add_content_defaults_to_empty() {
        let cli = Cli::try_parse_from(["jotter", "/tmp/notes", "add", "Title"]).unwrap();
        assert_eq!(
            cli.command,
            Command::Notes(NoteCommand::Add {
                title: "Title".to_string(),
                content: String::new(),
            })
        );
    }

    #[test]
    fn rejects_unknown_format_kind() {
        let parsed =
            Cli::try_parse_from(["jotter", "/tmp/notes", "format", "strike", "0", "1", "x"]);
        assert!(parsed.is_err());
    }
}
