use blinko_core::models::NoteMetadata;
use blinko_core::{Note, NoteListSession};

use crate::commands::common::{resolve_note_content, CliContext};
use crate::error::CliError;

pub async fn run_add(context: &CliContext, content_parts: &[String]) -> Result<(), CliError> {
    let session = context.open_session().await?;
    let content = resolve_note_content(content_parts, &session.compose_draft())?;

    let note = create_note(&session, content).await?;
    println!("{}", note.id);
    Ok(())
}

/// Save `content` as the compose draft and create a note from it.
///
/// A failed create leaves the compose draft behind for the next attempt.
pub async fn create_note(session: &NoteListSession, content: String) -> Result<Note, CliError> {
    session.set_compose_draft(content);
    let note = session
        .commit_compose(NoteMetadata::default())?
        .wait()
        .await?;
    Ok(note)
}
