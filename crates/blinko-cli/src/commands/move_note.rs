use blinko_core::drag::CancelReason;
use blinko_core::{DragResolution, NoteId, NoteListSession};

use crate::commands::common::{drafted_ids, format_note_lines, CliContext};
use crate::error::CliError;

/// What a move request did to the list.
#[derive(Debug, PartialEq, Eq)]
pub enum MoveOutcome {
    Moved { from_index: usize, to_index: usize },
    Unchanged,
}

pub async fn run_move(context: &CliContext, id: NoteId, onto: NoteId) -> Result<(), CliError> {
    let mut session = context.load_session().await?;

    match move_note(&mut session, id, onto).await? {
        MoveOutcome::Moved {
            from_index,
            to_index,
        } => {
            println!("Moved note {id} from position {from_index} to {to_index}");
            let drafted = drafted_ids(&session);
            for line in format_note_lines(session.current_order(), &drafted) {
                println!("{line}");
            }
        }
        MoveOutcome::Unchanged => println!("Note {id} is already at that position"),
    }
    Ok(())
}

/// Drag `id` onto `onto` within a loaded session and wait for the order push.
pub async fn move_note(
    session: &mut NoteListSession,
    id: NoteId,
    onto: NoteId,
) -> Result<MoveOutcome, CliError> {
    if !session.begin_drag(id) {
        return Err(CliError::NoteNotFound(id));
    }
    session.update_drag_target(Some(onto));

    match session.end_drag(Some(onto)) {
        DragResolution::Moved {
            from_index,
            to_index,
            dispatch,
            ..
        } => {
            dispatch.wait().await?;
            Ok(MoveOutcome::Moved {
                from_index,
                to_index,
            })
        }
        DragResolution::Cancelled(CancelReason::TargetMissing) => {
            Err(CliError::NoteNotFound(onto))
        }
        DragResolution::Cancelled(CancelReason::ActiveMissing) => Err(CliError::NoteNotFound(id)),
        DragResolution::Cancelled(reason) => {
            tracing::debug!("Move of note {} not applied: {:?}", id, reason);
            Ok(MoveOutcome::Unchanged)
        }
    }
}
