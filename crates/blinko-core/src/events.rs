//! Session lifecycle events.

use std::fmt;

use tokio::sync::broadcast;

use crate::drag::CancelReason;
use crate::models::{DraftKey, Note, NoteId};

/// Events buffered per subscriber before the oldest are dropped.
pub const EVENT_CAPACITY: usize = 64;

/// Remote write a dispatch was carrying.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchKind {
    Order,
    Content(NoteId),
    Create,
    AttachmentOrder,
}

impl fmt::Display for DispatchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Order => f.write_str("order update"),
            Self::Content(id) => write!(f, "content save for note {id}"),
            Self::Create => f.write_str("note create"),
            Self::AttachmentOrder => f.write_str("attachment order update"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// The rendered order changed; ids in display order.
    OrderChanged { ids: Vec<NoteId> },
    DragCancelled { id: NoteId, reason: CancelReason },
    /// A draft was saved and cleared; `note` is the server's copy.
    DraftSaved { key: DraftKey, note: Note },
    DispatchFailed { kind: DispatchKind, message: String },
}

pub type EventSender = broadcast::Sender<SessionEvent>;

pub fn channel() -> EventSender {
    broadcast::channel(EVENT_CAPACITY).0
}

/// Publish `event`; having no subscribers is not an error.
pub(crate) fn emit(events: &EventSender, event: SessionEvent) {
    let _ = events.send(event);
}
