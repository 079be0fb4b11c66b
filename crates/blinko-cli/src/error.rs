use std::io;

use blinko_core::NoteId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] blinko_core::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
    #[error("No note content provided")]
    EmptyContent,
    #[error("Note not found: {0}")]
    NoteNotFound(NoteId),
    #[error("Note {0} has no draft")]
    NoDraft(NoteId),
    #[error("Editor command failed: {0}")]
    EditorFailed(String),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Credential storage error: {0}")]
    Credentials(String),
}
