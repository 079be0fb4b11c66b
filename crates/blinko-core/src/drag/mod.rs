//! Drag session controller.
//!
//! Tracks a single reorder gesture from pick-up to drop:
//! `Idle -> Dragging -> (Dropped | Cancelled) -> Idle`. Positions are always
//! resolved by id against the list current at the time of the call, never
//! cached from the start of the gesture.

mod activation;
mod attachments;

use crate::models::{renumber_dense, Note, NoteId, OrderUpdate};

pub use activation::{ActivationGate, GestureEvent, Point};
pub use attachments::{reorder_attachments, AttachmentReorder};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DragState {
    #[default]
    Idle,
    Dragging {
        active: NoteId,
        /// View hint only; never persisted.
        candidate_index: Option<usize>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelReason {
    /// Released with no drop target.
    NoTarget,
    /// Released over the note's own position.
    SamePosition,
    /// The dragged note is no longer in the list.
    ActiveMissing,
    /// The drop target is no longer in the list.
    TargetMissing,
    /// A new gesture replaced this one.
    Superseded,
    /// The list changed underneath the gesture.
    ListChanged,
}

/// New order produced by a successful drop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DroppedOrder {
    pub moved: NoteId,
    pub from_index: usize,
    pub to_index: usize,
    /// Full list with dense 0-based `sort_order`.
    pub notes: Vec<Note>,
}

impl DroppedOrder {
    pub fn updates(&self) -> Vec<OrderUpdate> {
        self.notes.iter().map(Note::order_update).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DragOutcome {
    Dropped(DroppedOrder),
    Cancelled(CancelReason),
}

#[derive(Debug, Default)]
pub struct DragController {
    state: DragState,
}

impl DragController {
    pub fn new() -> Self {
        Self::default()
    }

    pub const fn state(&self) -> DragState {
        self.state
    }

    pub const fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging { .. })
    }

    pub const fn active(&self) -> Option<NoteId> {
        match self.state {
            DragState::Dragging { active, .. } => Some(active),
            DragState::Idle => None,
        }
    }

    pub const fn candidate_index(&self) -> Option<usize> {
        match self.state {
            DragState::Dragging {
                candidate_index, ..
            } => candidate_index,
            DragState::Idle => None,
        }
    }

    /// Pick up `id`. Fails (and stays as-is) if `id` is not in `order`.
    ///
    /// Picking up while already dragging supersedes the previous gesture.
    pub fn begin_drag(&mut self, id: NoteId, order: &[Note]) -> bool {
        if !order.iter().any(|note| note.id == id) {
            tracing::debug!("Ignoring drag start on unknown note {}", id);
            return false;
        }
        if let Some(previous) = self.active() {
            tracing::debug!("Drag of note {} superseded by note {}", previous, id);
        }
        self.state = DragState::Dragging {
            active: id,
            candidate_index: None,
        };
        true
    }

    /// Update the insertion preview while hovering over `candidate`.
    pub fn update_drag_target(&mut self, candidate: Option<NoteId>, order: &[Note]) {
        if let DragState::Dragging {
            candidate_index, ..
        } = &mut self.state
        {
            *candidate_index =
                candidate.and_then(|id| order.iter().position(|note| note.id == id));
        }
    }

    /// Release the gesture over `target` and compute the resulting order.
    pub fn end_drag(&mut self, target: Option<NoteId>, order: &[Note]) -> DragOutcome {
        let Some(active) = self.active() else {
            return DragOutcome::Cancelled(CancelReason::NoTarget);
        };
        self.state = DragState::Idle;

        let outcome = Self::resolve_drop(active, target, order);
        match &outcome {
            DragOutcome::Dropped(dropped) => tracing::info!(
                "Moved note {} from position {} to {}",
                dropped.moved,
                dropped.from_index,
                dropped.to_index
            ),
            DragOutcome::Cancelled(reason) => {
                tracing::debug!("Drag of note {} cancelled: {:?}", active, reason);
            }
        }
        outcome
    }

    /// Abandon the gesture without producing an order.
    pub fn cancel(&mut self, reason: CancelReason) -> Option<NoteId> {
        let active = self.active();
        if let Some(id) = active {
            tracing::debug!("Drag of note {} cancelled: {:?}", id, reason);
        }
        self.state = DragState::Idle;
        active
    }

    fn resolve_drop(active: NoteId, target: Option<NoteId>, order: &[Note]) -> DragOutcome {
        let Some(target) = target else {
            return DragOutcome::Cancelled(CancelReason::NoTarget);
        };
        if target == active {
            return DragOutcome::Cancelled(CancelReason::SamePosition);
        }
        let Some(from_index) = order.iter().position(|note| note.id == active) else {
            return DragOutcome::Cancelled(CancelReason::ActiveMissing);
        };
        let Some(to_index) = order.iter().position(|note| note.id == target) else {
            return DragOutcome::Cancelled(CancelReason::TargetMissing);
        };

        let mut notes = order.to_vec();
        array_move(&mut notes, from_index, to_index);
        renumber_dense(&mut notes);

        DragOutcome::Dropped(DroppedOrder {
            moved: active,
            from_index,
            to_index,
            notes,
        })
    }
}

/// Move the element at `from` so it ends up at index `to`.
///
/// The element is removed first, so indices after `from` shift down by one
/// before the insertion at `to` is applied.
pub fn array_move<T>(items: &mut Vec<T>, from: usize, to: usize) {
    if from >= items.len() || from == to {
        return;
    }
    let item = items.remove(from);
    let to = to.min(items.len());
    items.insert(to, item);
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::BTreeSet;

    fn list(ids: &[i64]) -> Vec<Note> {
        ids.iter()
            .enumerate()
            .map(|(index, id)| Note {
                id: NoteId::new(*id),
                content: format!("note {id}"),
                sort_order: i64::try_from(index).unwrap(),
                updated_at: 1,
            })
            .collect()
    }

    fn pairs(notes: &[Note]) -> Vec<(i64, i64)> {
        notes
            .iter()
            .map(|note| (note.id.get(), note.sort_order))
            .collect()
    }

    #[test]
    fn drag_first_onto_last() {
        let order = list(&[1, 2, 3]);
        let mut controller = DragController::new();
        assert!(controller.begin_drag(NoteId::new(1), &order));
        controller.update_drag_target(Some(NoteId::new(3)), &order);
        assert_eq!(controller.candidate_index(), Some(2));

        let DragOutcome::Dropped(dropped) = controller.end_drag(Some(NoteId::new(3)), &order)
        else {
            panic!("expected drop");
        };
        assert_eq!(pairs(&dropped.notes), vec![(2, 0), (3, 1), (1, 2)]);
        assert_eq!(controller.state(), DragState::Idle);
    }

    #[test]
    fn drag_last_onto_first() {
        let order = list(&[1, 2, 3]);
        let mut controller = DragController::new();
        controller.begin_drag(NoteId::new(3), &order);
        let DragOutcome::Dropped(dropped) = controller.end_drag(Some(NoteId::new(1)), &order)
        else {
            panic!("expected drop");
        };
        assert_eq!(pairs(&dropped.notes), vec![(3, 0), (1, 1), (2, 2)]);
        assert_eq!(dropped.updates().len(), 3);
    }

    #[test]
    fn every_drop_is_a_dense_permutation() {
        let ids = [10, 20, 30, 40, 50];
        let order = list(&ids);
        for from in ids {
            for to in ids {
                let mut controller = DragController::new();
                controller.begin_drag(NoteId::new(from), &order);
                match controller.end_drag(Some(NoteId::new(to)), &order) {
                    DragOutcome::Dropped(dropped) => {
                        let seen: BTreeSet<i64> =
                            dropped.notes.iter().map(|note| note.id.get()).collect();
                        assert_eq!(seen, ids.into_iter().collect());
                        for (index, note) in dropped.notes.iter().enumerate() {
                            assert_eq!(note.sort_order, i64::try_from(index).unwrap());
                        }
                        assert_eq!(dropped.notes[dropped.to_index].id, NoteId::new(from));
                    }
                    DragOutcome::Cancelled(reason) => {
                        assert_eq!(from, to);
                        assert_eq!(reason, CancelReason::SamePosition);
                    }
                }
            }
        }
    }

    #[test]
    fn release_without_target_cancels() {
        let order = list(&[1, 2]);
        let mut controller = DragController::new();
        controller.begin_drag(NoteId::new(1), &order);
        assert_eq!(
            controller.end_drag(None, &order),
            DragOutcome::Cancelled(CancelReason::NoTarget)
        );
        assert!(!controller.is_dragging());
    }

    #[test]
    fn vanished_ids_cancel_at_drop_time() {
        let order = list(&[1, 2, 3]);
        let mut controller = DragController::new();
        controller.begin_drag(NoteId::new(2), &order);

        let shrunk = list(&[1, 3]);
        assert_eq!(
            controller.end_drag(Some(NoteId::new(3)), &shrunk),
            DragOutcome::Cancelled(CancelReason::ActiveMissing)
        );

        controller.begin_drag(NoteId::new(1), &order);
        assert_eq!(
            controller.end_drag(Some(NoteId::new(2)), &shrunk),
            DragOutcome::Cancelled(CancelReason::TargetMissing)
        );
    }

    #[test]
    fn begin_drag_rejects_unknown_note() {
        let order = list(&[1]);
        let mut controller = DragController::new();
        assert!(!controller.begin_drag(NoteId::new(9), &order));
        assert!(!controller.is_dragging());
    }

    #[test]
    fn hover_over_unknown_target_clears_candidate() {
        let order = list(&[1, 2]);
        let mut controller = DragController::new();
        controller.begin_drag(NoteId::new(1), &order);
        controller.update_drag_target(Some(NoteId::new(2)), &order);
        controller.update_drag_target(Some(NoteId::new(7)), &order);
        assert_eq!(controller.candidate_index(), None);
    }

    #[test]
    fn cancel_returns_to_idle() {
        let order = list(&[1, 2]);
        let mut controller = DragController::new();
        controller.begin_drag(NoteId::new(2), &order);
        assert_eq!(controller.cancel(CancelReason::ListChanged), Some(NoteId::new(2)));
        assert_eq!(controller.state(), DragState::Idle);
        assert_eq!(controller.cancel(CancelReason::ListChanged), None);
    }

    #[test]
    fn array_move_semantics() {
        let mut items = vec!['a', 'b', 'c', 'd'];
        array_move(&mut items, 0, 2);
        assert_eq!(items, vec!['b', 'c', 'a', 'd']);
        array_move(&mut items, 3, 0);
        assert_eq!(items, vec!['d', 'b', 'c', 'a']);
        array_move(&mut items, 9, 0);
        assert_eq!(items, vec!['d', 'b', 'c', 'a']);
    }
}
