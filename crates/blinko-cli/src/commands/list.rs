use std::collections::HashSet;

use blinko_core::models::NoteSortConfig;
use blinko_core::{Note, NoteFilter, NoteId};

use crate::commands::common::{
    drafted_ids, format_note_lines, note_to_list_item, CliContext, NoteListItem,
};
use crate::error::CliError;

/// A reconciled page of notes and which of them carry drafts.
pub struct ListedNotes {
    pub notes: Vec<Note>,
    pub drafted: HashSet<NoteId>,
}

pub async fn run_list(
    context: &CliContext,
    limit: Option<usize>,
    tag: Option<String>,
    sort: Option<NoteSortConfig>,
    as_json: bool,
) -> Result<(), CliError> {
    let listed = list_notes(context, limit, tag, sort).await?;

    if as_json {
        let json_items = listed
            .notes
            .iter()
            .map(|note| note_to_list_item(note, &listed.drafted))
            .collect::<Vec<NoteListItem>>();
        println!("{}", serde_json::to_string_pretty(&json_items)?);
    } else {
        for line in format_note_lines(&listed.notes, &listed.drafted) {
            println!("{line}");
        }
    }

    Ok(())
}

pub async fn list_notes(
    context: &CliContext,
    limit: Option<usize>,
    tag: Option<String>,
    sort: Option<NoteSortConfig>,
) -> Result<ListedNotes, CliError> {
    let mut session = context.open_session().await?;

    let mut filter = NoteFilter::new(limit.unwrap_or(session.config().page_size));
    if let Some(tag) = tag {
        filter = filter.with_tag(tag);
    }
    if let Some(sort) = sort {
        filter = filter.with_sort(sort);
    }

    session.refresh(&filter).await?;
    Ok(ListedNotes {
        notes: session.current_order().to_vec(),
        drafted: drafted_ids(&session),
    })
}
