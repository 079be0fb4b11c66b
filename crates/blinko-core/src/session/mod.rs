//! Note list session.
//!
//! One [`NoteListSession`] owns the rendered order of a signed-in user's note
//! list and everything that overlays it: the active drag gesture, unsaved
//! drafts, and the writes in flight to the remote store. Construct one at
//! sign-in and drop it at sign-out.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::broadcast;

use crate::config::SessionConfig;
use crate::drafts::{lock_drafts, DraftStore, SharedDraftStore};
use crate::drag::{
    reorder_attachments, ActivationGate, CancelReason, DragController, DragOutcome, GestureEvent,
    Point,
};
use crate::error::{Error, Result};
use crate::events::{self, emit, EventSender, SessionEvent};
use crate::models::{Attachment, AttachmentKind, Draft, DraftKey, Note, NoteId, NoteMetadata};
use crate::reconcile::{LocalOverlay, OrderedListReconciler};
use crate::remote::{NoteFilter, RemoteStore};
use crate::storage::LocalStorage;
use crate::sync::{DispatchHandle, SyncDispatcher};

/// How a released drag gesture ended.
#[derive(Debug)]
pub enum DragResolution {
    /// The list was reordered locally and the new order is being pushed.
    Moved {
        moved: NoteId,
        from_index: usize,
        to_index: usize,
        dispatch: DispatchHandle<()>,
    },
    Cancelled(CancelReason),
}

/// How a pointer release ended a press.
#[derive(Debug)]
pub enum GestureEnd {
    /// Released before the hold threshold: a tap on this note.
    Tap(NoteId),
    /// Released while dragging.
    Released(DragResolution),
    /// No press or drag was in progress.
    Nothing,
}

pub struct NoteListSession {
    config: SessionConfig,
    remote: Arc<dyn RemoteStore>,
    drafts: SharedDraftStore,
    reconciler: OrderedListReconciler,
    drag: DragController,
    gate: ActivationGate,
    dispatcher: SyncDispatcher,
    events: EventSender,
    order: Vec<Note>,
}

impl NoteListSession {
    /// Create a session; drafts persisted in `storage` are restored.
    pub fn new(
        config: SessionConfig,
        remote: Arc<dyn RemoteStore>,
        storage: Arc<dyn LocalStorage>,
    ) -> Self {
        let drafts = DraftStore::load(storage, config.empty_draft_policy).into_shared();
        let events = events::channel();
        let dispatcher = SyncDispatcher::new(
            Arc::clone(&remote),
            Arc::clone(&drafts),
            events.clone(),
        );
        let gate = ActivationGate::new(&config.drag_activation);

        Self {
            config,
            remote,
            drafts,
            reconciler: OrderedListReconciler::new(),
            drag: DragController::new(),
            gate,
            dispatcher,
            events,
            order: Vec::new(),
        }
    }

    pub const fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// The order to render, with draft content overlaid.
    pub fn current_order(&self) -> &[Note] {
        &self.order
    }

    pub const fn is_dragging(&self) -> bool {
        self.drag.is_dragging()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    /// Default filter for this session's page size.
    pub fn default_filter(&self) -> NoteFilter {
        NoteFilter::new(self.config.page_size)
    }

    /// Fetch the list and reconcile it. Returns whether the rendered order changed.
    ///
    /// Drafts of notes missing from the result are only dropped when the
    /// fetch covered the whole list.
    pub async fn refresh(&mut self, filter: &NoteFilter) -> Result<bool> {
        let snapshot = match self.remote.fetch_ordered_list(filter).await {
            Ok(snapshot) => snapshot,
            Err(error) => {
                tracing::warn!("Note list fetch failed: {}", error);
                return Err(error);
            }
        };
        let complete =
            filter.offset == 0 && filter.tag.is_none() && snapshot.len() < filter.limit;
        Ok(self.apply(snapshot, complete))
    }

    /// Reconcile a full server snapshot into the rendered order.
    pub fn apply_snapshot(&mut self, snapshot: Vec<Note>) -> bool {
        self.apply(snapshot, true)
    }

    fn apply(&mut self, snapshot: Vec<Note>, complete: bool) -> bool {
        let present = snapshot.iter().map(|note| note.id).collect::<HashSet<_>>();

        if let Some(active) = self.drag.active() {
            if !present.contains(&active) {
                self.cancel_drag(CancelReason::ActiveMissing);
            }
        }

        let overlay = {
            let mut drafts = lock_drafts(&self.drafts);
            if complete {
                drafts.retain_notes(&present);
            }
            drafts.overlay()
        };

        let reconciled = self.reconciler.reconcile(
            &snapshot,
            &self.order,
            &LocalOverlay {
                dragging: self.drag.active(),
                drafts: Some(&overlay),
            },
        );
        if reconciled.changed {
            self.order = reconciled.notes;
            self.emit_order_changed();
        }
        reconciled.changed
    }

    /// Pointer went down on a note. Nothing is dragged until the hold
    /// threshold is met.
    pub fn press(&mut self, id: NoteId, at_point: Point, at: Instant) {
        self.gate.press(id, at_point, at);
    }

    /// Pointer moved; may start the drag or abort a pending press.
    pub fn pointer_moved(&mut self, to: Point, at: Instant) -> GestureEvent {
        let event = self.gate.pointer_moved(to, at);
        self.on_gesture(event, at)
    }

    /// Timer tick while a press is pending; starts the drag once held long enough.
    pub fn poll_activation(&mut self, at: Instant) -> GestureEvent {
        let event = self.gate.poll(at);
        self.on_gesture(event, at)
    }

    /// Pointer released over `target`.
    pub fn release(&mut self, target: Option<NoteId>, at: Instant) -> GestureEnd {
        let was_active = self.gate.is_active();
        match self.gate.release(at) {
            GestureEvent::Tap(id) => GestureEnd::Tap(id),
            _ if was_active && self.drag.is_dragging() => {
                GestureEnd::Released(self.end_drag(target))
            }
            _ => GestureEnd::Nothing,
        }
    }

    fn on_gesture(&mut self, event: GestureEvent, at: Instant) -> GestureEvent {
        match event {
            GestureEvent::Activate(id) if !self.begin_drag(id) => {
                self.gate.release(at);
                GestureEvent::Abort
            }
            event => event,
        }
    }

    /// Pick up a note immediately, skipping the hold threshold (keyboard and
    /// scripted moves). Returns `false` when the note is not in the list.
    pub fn begin_drag(&mut self, id: NoteId) -> bool {
        let previous = self.drag.active();
        if !self.drag.begin_drag(id, &self.order) {
            return false;
        }
        if let Some(previous) = previous.filter(|previous| *previous != id) {
            emit(
                &self.events,
                SessionEvent::DragCancelled {
                    id: previous,
                    reason: CancelReason::Superseded,
                },
            );
        }
        true
    }

    pub fn update_drag_target(&mut self, candidate: Option<NoteId>) {
        self.drag.update_drag_target(candidate, &self.order);
    }

    /// Insertion preview index for the current gesture.
    pub const fn drag_candidate_index(&self) -> Option<usize> {
        self.drag.candidate_index()
    }

    /// Release the gesture over `target`.
    pub fn end_drag(&mut self, target: Option<NoteId>) -> DragResolution {
        let active = self.drag.active();
        match self.drag.end_drag(target, &self.order) {
            DragOutcome::Dropped(dropped) => {
                let updates = dropped.updates();
                self.order = dropped.notes;
                self.reconciler.rebase(&self.order);
                self.emit_order_changed();

                DragResolution::Moved {
                    moved: dropped.moved,
                    from_index: dropped.from_index,
                    to_index: dropped.to_index,
                    dispatch: self.dispatcher.push_order(updates),
                }
            }
            DragOutcome::Cancelled(reason) => {
                if let Some(id) = active {
                    emit(&self.events, SessionEvent::DragCancelled { id, reason });
                }
                DragResolution::Cancelled(reason)
            }
        }
    }

    /// Abandon the current gesture, if any.
    pub fn cancel_drag(&mut self, reason: CancelReason) {
        if let Some(id) = self.drag.cancel(reason) {
            emit(&self.events, SessionEvent::DragCancelled { id, reason });
        }
    }

    /// Draft content for `id`, else the last-known server content.
    pub fn get_draft_or_fallback(&self, id: NoteId) -> String {
        lock_drafts(&self.drafts).get(
            DraftKey::Note(id),
            self.reconciler.last_server_content(id),
        )
    }

    /// Every stored draft, compose draft included.
    pub fn drafts(&self) -> Vec<Draft> {
        lock_drafts(&self.drafts).drafts().collect()
    }

    pub fn has_draft(&self, id: NoteId) -> bool {
        lock_drafts(&self.drafts).contains(DraftKey::Note(id))
    }

    /// Store an unsaved edit; it overlays the note until committed or discarded.
    pub fn set_draft(&mut self, id: NoteId, content: impl Into<String>) {
        lock_drafts(&self.drafts).set(DraftKey::Note(id), content);
        self.show_visible_content(id);
    }

    /// Drop an unsaved edit. Returns whether one was present.
    pub fn discard_draft(&mut self, id: NoteId) -> bool {
        let removed = lock_drafts(&self.drafts).clear(DraftKey::Note(id));
        if removed {
            self.show_visible_content(id);
        }
        removed
    }

    /// Push a note's draft to the remote store.
    ///
    /// The draft stays in place until the server accepts it, so a failed save
    /// loses nothing. The rendered note keeps its old server copy until the
    /// returned note is passed to [`Self::apply_saved`]; [`Self::save_draft`]
    /// does both.
    pub fn commit_draft(
        &self,
        id: NoteId,
        metadata: NoteMetadata,
    ) -> Result<DispatchHandle<Note>> {
        let content = {
            let drafts = lock_drafts(&self.drafts);
            if !drafts.contains(DraftKey::Note(id)) {
                return Err(Error::NotFound(format!("No draft for note {id}")));
            }
            drafts.get(DraftKey::Note(id), self.reconciler.last_server_content(id))
        };
        tracing::debug!("Committing draft for note {}", id);
        Ok(self.dispatcher.push_content(id, content, metadata))
    }

    /// Commit a note's draft, wait for the server, and adopt the saved copy.
    pub async fn save_draft(&mut self, id: NoteId, metadata: NoteMetadata) -> Result<Note> {
        let note = self.commit_draft(id, metadata)?.wait().await?;
        self.apply_saved(&note);
        Ok(note)
    }

    /// Content of the draft for a note that has not been created yet.
    pub fn compose_draft(&self) -> String {
        lock_drafts(&self.drafts).get(DraftKey::Compose, None)
    }

    pub fn set_compose_draft(&self, content: impl Into<String>) {
        lock_drafts(&self.drafts).set(DraftKey::Compose, content);
    }

    /// Create a note from the compose draft.
    pub fn commit_compose(&self, metadata: NoteMetadata) -> Result<DispatchHandle<Note>> {
        let content = self.compose_draft();
        if content.trim().is_empty() {
            return Err(Error::InvalidInput(
                "Note content cannot be empty".to_string(),
            ));
        }
        Ok(self.dispatcher.push_new_note(content, metadata))
    }

    /// Adopt a save response as the local copy of that note.
    ///
    /// The note keeps its current position; a draft written after the save
    /// started still overlays the saved content.
    pub fn apply_saved(&mut self, note: &Note) {
        self.reconciler.record_saved(note);
        let content =
            lock_drafts(&self.drafts).get(DraftKey::Note(note.id), Some(note.content.as_str()));
        if let Some(local) = self.order.iter_mut().find(|local| local.id == note.id) {
            local.content = content;
            local.updated_at = note.updated_at;
        }
    }

    /// Move attachment `active` onto `over` within one kind of `note_id`'s
    /// attachments and push the new order.
    ///
    /// Returns `None` (and writes nothing) when the move is a no-op.
    pub fn reorder_attachments(
        &self,
        note_id: NoteId,
        attachments: &[Attachment],
        kind: AttachmentKind,
        active: &str,
        over: Option<&str>,
    ) -> Option<(Vec<Attachment>, DispatchHandle<()>)> {
        let reorder = reorder_attachments(attachments, kind, active, over)?;
        let dispatch = self.dispatcher.push_attachment_order(note_id, reorder.updates);
        Some((reorder.attachments, dispatch))
    }

    fn show_visible_content(&mut self, id: NoteId) {
        let content = self.get_draft_or_fallback(id);
        if let Some(note) = self.order.iter_mut().find(|note| note.id == id) {
            note.content = content;
        }
    }

    fn emit_order_changed(&self) {
        emit(
            &self.events,
            SessionEvent::OrderChanged {
                ids: self.order.iter().map(|note| note.id).collect(),
            },
        );
    }
}
