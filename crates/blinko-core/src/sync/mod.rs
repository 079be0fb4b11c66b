//! Sync dispatcher: pushes local intent to the remote store.
//!
//! Every push runs on its own Tokio task and returns a [`DispatchHandle`] the
//! caller may await or drop. Failures are logged and broadcast; nothing is
//! retried or rolled back, so local state stays ahead of the server until the
//! next successful fetch.

use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::drafts::{lock_drafts, SharedDraftStore};
use crate::error::{Error, Result};
use crate::events::{emit, DispatchKind, EventSender, SessionEvent};
use crate::models::{AttachmentOrderUpdate, DraftKey, Note, NoteId, NoteMetadata, OrderUpdate};
use crate::remote::RemoteStore;

/// Completion of a dispatched write. Dropping it does not cancel the write.
#[derive(Debug)]
pub struct DispatchHandle<T> {
    task: JoinHandle<Result<T>>,
}

impl<T> DispatchHandle<T> {
    /// Wait for the remote write to finish.
    pub async fn wait(self) -> Result<T> {
        self.task
            .await
            .map_err(|error| Error::Dispatch(error.to_string()))?
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

#[derive(Clone)]
pub struct SyncDispatcher {
    remote: Arc<dyn RemoteStore>,
    drafts: SharedDraftStore,
    events: EventSender,
}

impl SyncDispatcher {
    pub fn new(remote: Arc<dyn RemoteStore>, drafts: SharedDraftStore, events: EventSender) -> Self {
        Self {
            remote,
            drafts,
            events,
        }
    }

    /// Persist a new order.
    pub fn push_order(&self, updates: Vec<OrderUpdate>) -> DispatchHandle<()> {
        let remote = Arc::clone(&self.remote);
        let events = self.events.clone();
        let task = tokio::spawn(async move {
            let result = remote.update_order(&updates).await;
            report(&events, DispatchKind::Order, &result);
            result
        });
        DispatchHandle { task }
    }

    /// Save note content; the note's draft is cleared once the server accepts it.
    pub fn push_content(
        &self,
        id: NoteId,
        content: String,
        metadata: NoteMetadata,
    ) -> DispatchHandle<Note> {
        let remote = Arc::clone(&self.remote);
        let drafts = Arc::clone(&self.drafts);
        let events = self.events.clone();
        let task = tokio::spawn(async move {
            let result = remote.update_content(id, &content, &metadata).await;
            if let Ok(note) = &result {
                settle_draft(&drafts, &events, DraftKey::Note(id), &content, note);
            }
            report(&events, DispatchKind::Content(id), &result);
            result
        });
        DispatchHandle { task }
    }

    /// Create a note from the compose draft.
    pub fn push_new_note(&self, content: String, metadata: NoteMetadata) -> DispatchHandle<Note> {
        let remote = Arc::clone(&self.remote);
        let drafts = Arc::clone(&self.drafts);
        let events = self.events.clone();
        let task = tokio::spawn(async move {
            let result = remote.create_note(&content, &metadata).await;
            if let Ok(note) = &result {
                settle_draft(&drafts, &events, DraftKey::Compose, &content, note);
            }
            report(&events, DispatchKind::Create, &result);
            result
        });
        DispatchHandle { task }
    }

    pub fn push_attachment_order(
        &self,
        note_id: NoteId,
        updates: Vec<AttachmentOrderUpdate>,
    ) -> DispatchHandle<()> {
        let remote = Arc::clone(&self.remote);
        let events = self.events.clone();
        let task = tokio::spawn(async move {
            let result = remote.update_attachments_order(note_id, &updates).await;
            report(&events, DispatchKind::AttachmentOrder, &result);
            result
        });
        DispatchHandle { task }
    }
}

/// Clear the draft at `key` unless it was edited again while the save was in flight.
fn settle_draft(
    drafts: &SharedDraftStore,
    events: &EventSender,
    key: DraftKey,
    saved_content: &str,
    note: &Note,
) {
    {
        let mut store = lock_drafts(drafts);
        match store.draft(key) {
            Some(current) if current != saved_content => {
                tracing::debug!("Keeping {} draft edited during save", key);
            }
            _ => {
                store.clear(key);
            }
        }
    }
    tracing::info!("Saved note {}", note.id);
    emit(
        events,
        SessionEvent::DraftSaved {
            key,
            note: note.clone(),
        },
    );
}

fn report<T>(events: &EventSender, kind: DispatchKind, result: &Result<T>) {
    if let Err(error) = result {
        tracing::warn!("Remote {} failed: {}", kind, error);
        emit(
            events,
            SessionEvent::DispatchFailed {
                kind,
                message: error.to_string(),
            },
        );
    }
}
