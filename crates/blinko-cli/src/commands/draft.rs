use blinko_core::models::{DraftKey, NoteMetadata};
use blinko_core::{Note, NoteId, NoteListSession};
use serde::Serialize;

use crate::cli::DraftCommands;
use crate::commands::common::{
    capture_editor_input_with_initial, preview_text, require_note, CliContext,
};
use crate::error::CliError;

#[derive(Debug, Serialize)]
pub struct DraftItem {
    pub key: String,
    pub note_id: Option<i64>,
    pub content: String,
}

pub async fn run_draft(context: &CliContext, command: DraftCommands) -> Result<(), CliError> {
    match command {
        DraftCommands::Set { id, content } => {
            let mut session = context.load_session().await?;
            let initial = session.get_draft_or_fallback(id);
            let content = match draft_content_from_args(&content) {
                Some(content) => content,
                None => {
                    capture_editor_input_with_initial(&initial)?.ok_or(CliError::EmptyContent)?
                }
            };
            set_draft(&mut session, id, content)?;
            println!("{id}");
        }
        DraftCommands::Show { id } => {
            let mut session = context.open_session().await?;
            let filter = session.default_filter();
            // An unreachable store still leaves local drafts readable
            session.refresh(&filter).await.ok();
            println!("{}", session.get_draft_or_fallback(id));
        }
        DraftCommands::Commit { id } => {
            let mut session = context.load_session().await?;
            let note = commit_draft(&mut session, id).await?;
            println!("{}", note.id);
        }
        DraftCommands::Discard { id } => {
            let mut session = context.open_session().await?;
            if !session.discard_draft(id) {
                return Err(CliError::NoDraft(id));
            }
            println!("{id}");
        }
        DraftCommands::List { json } => {
            let session = context.open_session().await?;
            let items = draft_items(&session);
            if json {
                println!("{}", serde_json::to_string_pretty(&items)?);
            } else {
                for item in &items {
                    println!("{:<10}  {}", item.key, preview_text(&item.content, 60));
                }
            }
        }
    }
    Ok(())
}

/// Draft text given on the command line. Any argument, even `""`, counts as
/// content, so an empty draft can be stored; only no arguments opens the editor.
pub fn draft_content_from_args(parts: &[String]) -> Option<String> {
    if parts.is_empty() {
        None
    } else {
        Some(parts.join(" ").trim().to_string())
    }
}

/// Store a draft for a note that is present in the loaded list.
pub fn set_draft(
    session: &mut NoteListSession,
    id: NoteId,
    content: String,
) -> Result<(), CliError> {
    require_note(session, id)?;
    session.set_draft(id, content);
    Ok(())
}

/// Push a note's draft and adopt the saved copy.
pub async fn commit_draft(session: &mut NoteListSession, id: NoteId) -> Result<Note, CliError> {
    if !session.has_draft(id) {
        return Err(CliError::NoDraft(id));
    }
    Ok(session.save_draft(id, NoteMetadata::default()).await?)
}

pub fn draft_items(session: &NoteListSession) -> Vec<DraftItem> {
    session
        .drafts()
        .into_iter()
        .map(|draft| DraftItem {
            key: match draft.key {
                DraftKey::Note(id) => id.to_string(),
                DraftKey::Compose => draft.key.to_string(),
            },
            note_id: draft.key.note_id().map(NoteId::get),
            content: draft.content,
        })
        .collect()
}
