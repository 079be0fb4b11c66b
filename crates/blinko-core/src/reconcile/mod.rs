//! Ordered list reconciliation.
//!
//! Merges a server-supplied note list into the locally rendered order. An
//! incoming snapshot whose revision marker matches the current baseline is a
//! no-op, so a redundant refresh never disturbs an in-progress drag.

use std::collections::hash_map::DefaultHasher;
use std::collections::{HashMap, HashSet};
use std::hash::{Hash, Hasher};

use crate::models::{sort_for_display, Note, NoteId};

/// Order-sensitive fingerprint of `(id, sort_order, updated_at)` over a list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RevisionMarker(u64);

impl RevisionMarker {
    pub fn of(notes: &[Note]) -> Self {
        let mut hasher = DefaultHasher::new();
        notes.len().hash(&mut hasher);
        for note in notes {
            note.id.hash(&mut hasher);
            note.sort_order.hash(&mut hasher);
            note.updated_at.hash(&mut hasher);
        }
        Self(hasher.finish())
    }
}

/// Local state that survives a server refresh.
#[derive(Debug, Default)]
pub struct LocalOverlay<'a> {
    /// Note being dragged; keeps its local index.
    pub dragging: Option<NoteId>,
    /// Draft content per note; replaces server content.
    pub drafts: Option<&'a HashMap<NoteId, String>>,
}

/// Result of a reconciliation pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciled {
    pub notes: Vec<Note>,
    /// `false` when the snapshot matched the baseline and `notes` is the
    /// previous local order untouched.
    pub changed: bool,
}

#[derive(Debug, Default)]
pub struct OrderedListReconciler {
    baseline: Option<RevisionMarker>,
    server_content: HashMap<NoteId, String>,
}

impl OrderedListReconciler {
    pub fn new() -> Self {
        Self::default()
    }

    pub const fn baseline(&self) -> Option<RevisionMarker> {
        self.baseline
    }

    /// Merge `snapshot` into `previous`.
    ///
    /// The marker is taken over the snapshot in display order, so a server
    /// that returns the same notes in a different sequence is not a change.
    pub fn reconcile(
        &mut self,
        snapshot: &[Note],
        previous: &[Note],
        overlay: &LocalOverlay<'_>,
    ) -> Reconciled {
        let mut seen = HashSet::with_capacity(snapshot.len());
        let mut notes = snapshot
            .iter()
            .filter(|note| seen.insert(note.id))
            .cloned()
            .collect::<Vec<_>>();
        sort_for_display(&mut notes);

        let marker = RevisionMarker::of(&notes);
        if self.baseline == Some(marker) {
            tracing::debug!("Snapshot matches baseline; keeping local order");
            return Reconciled {
                notes: previous.to_vec(),
                changed: false,
            };
        }

        self.server_content = notes
            .iter()
            .map(|note| (note.id, note.content.clone()))
            .collect();

        if let Some(drafts) = overlay.drafts {
            for note in &mut notes {
                if let Some(content) = drafts.get(&note.id) {
                    note.content.clone_from(content);
                }
            }
        }

        let pinned = overlay
            .dragging
            .is_some_and(|active| pin_to_local_index(&mut notes, previous, active));

        tracing::debug!(
            "Reconciled {} server note(s) into {} local note(s)",
            snapshot.len(),
            notes.len()
        );
        if pinned {
            // The rendered order is not the server's; the next snapshot must
            // be applied again once the gesture is over.
            self.baseline = None;
            let changed = notes != previous;
            return Reconciled { notes, changed };
        }

        self.baseline = Some(marker);
        Reconciled {
            notes,
            changed: true,
        }
    }

    /// Adopt a locally produced order (e.g. after a drop) as the baseline.
    pub fn rebase(&mut self, local: &[Note]) {
        self.baseline = Some(RevisionMarker::of(local));
    }

    /// Record a saved note's server content without touching the baseline.
    pub fn record_saved(&mut self, note: &Note) {
        self.server_content.insert(note.id, note.content.clone());
    }

    /// Content of `id` in the last applied server snapshot.
    pub fn last_server_content(&self, id: NoteId) -> Option<&str> {
        self.server_content.get(&id).map(String::as_str)
    }

    /// Forget the baseline so the next snapshot is always applied.
    pub fn reset(&mut self) {
        self.baseline = None;
        self.server_content.clear();
    }
}

/// Move `active` back to its index in `previous`. Returns whether it moved.
fn pin_to_local_index(notes: &mut Vec<Note>, previous: &[Note], active: NoteId) -> bool {
    let Some(local_index) = previous.iter().position(|note| note.id == active) else {
        return false;
    };
    let Some(server_index) = notes.iter().position(|note| note.id == active) else {
        return false;
    };
    let target = local_index.min(notes.len() - 1);
    if target == server_index {
        return false;
    }

    let pinned = notes.remove(server_index);
    notes.insert(target, pinned);
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn note(id: i64, sort_order: i64, updated_at: i64) -> Note {
        Note {
            id: NoteId::new(id),
            content: format!("note {id}"),
            sort_order,
            updated_at,
        }
    }

    fn ids(notes: &[Note]) -> Vec<i64> {
        notes.iter().map(|note| note.id.get()).collect()
    }

    #[test]
    fn marker_is_order_sensitive() {
        let a = vec![note(1, 0, 1), note(2, 1, 1)];
        let b = vec![note(2, 1, 1), note(1, 0, 1)];
        assert_ne!(RevisionMarker::of(&a), RevisionMarker::of(&b));
        assert_eq!(RevisionMarker::of(&a), RevisionMarker::of(&a.clone()));
    }

    #[test]
    fn marker_ignores_content() {
        let a = vec![note(1, 0, 1)];
        let mut b = a.clone();
        b[0].content = "edited locally".to_string();
        assert_eq!(RevisionMarker::of(&a), RevisionMarker::of(&b));
    }

    #[test]
    fn unchanged_snapshot_is_a_no_op() {
        let mut reconciler = OrderedListReconciler::new();
        let snapshot = vec![note(1, 0, 1), note(2, 1, 1)];
        let first = reconciler.reconcile(&snapshot, &[], &LocalOverlay::default());
        assert!(first.changed);

        let local = vec![note(2, 0, 9), note(1, 1, 9)];
        let second = reconciler.reconcile(&snapshot, &local, &LocalOverlay::default());
        assert!(!second.changed);
        assert_eq!(second.notes, local);
    }

    #[test]
    fn snapshot_sequence_does_not_affect_baseline() {
        let mut reconciler = OrderedListReconciler::new();
        let local = vec![note(2, 0, 5), note(1, 1, 5)];
        reconciler.rebase(&local);

        let shuffled = vec![note(1, 1, 5), note(2, 0, 5)];
        assert!(!reconciler.reconcile(&shuffled, &local, &LocalOverlay::default()).changed);
    }

    #[test]
    fn changed_snapshot_is_sorted_with_id_tie_break() {
        let mut reconciler = OrderedListReconciler::new();
        let snapshot = vec![note(3, 1, 1), note(1, 2, 1), note(2, 1, 1)];
        let result = reconciler.reconcile(&snapshot, &[], &LocalOverlay::default());
        assert_eq!(ids(&result.notes), vec![2, 3, 1]);
    }

    #[test]
    fn vanished_notes_are_dropped_and_duplicates_collapsed() {
        let mut reconciler = OrderedListReconciler::new();
        let previous = vec![note(1, 0, 1), note(2, 1, 1), note(3, 2, 1)];
        let snapshot = vec![note(1, 0, 2), note(3, 2, 2), note(3, 2, 2)];
        let result = reconciler.reconcile(&snapshot, &previous, &LocalOverlay::default());
        assert_eq!(ids(&result.notes), vec![1, 3]);
    }

    #[test]
    fn drafted_notes_keep_local_content() {
        let mut reconciler = OrderedListReconciler::new();
        let drafts = HashMap::from([(NoteId::new(2), "my edit".to_string())]);
        let overlay = LocalOverlay {
            dragging: None,
            drafts: Some(&drafts),
        };
        let snapshot = vec![note(1, 0, 1), note(2, 1, 1)];
        let result = reconciler.reconcile(&snapshot, &[], &overlay);

        assert_eq!(result.notes[1].content, "my edit");
        assert_eq!(reconciler.last_server_content(NoteId::new(2)), Some("note 2"));
    }

    #[test]
    fn dragged_note_keeps_local_position() {
        let mut reconciler = OrderedListReconciler::new();
        let previous = vec![note(3, 0, 1), note(1, 1, 1), note(2, 2, 1)];
        let overlay = LocalOverlay {
            dragging: Some(NoteId::new(3)),
            drafts: None,
        };
        let snapshot = vec![note(1, 0, 2), note(2, 1, 2), note(3, 2, 2)];
        let result = reconciler.reconcile(&snapshot, &previous, &overlay);
        assert_eq!(ids(&result.notes), vec![3, 1, 2]);
    }

    #[test]
    fn pinned_order_is_not_kept_as_baseline() {
        let mut reconciler = OrderedListReconciler::new();
        let previous = vec![note(1, 0, 1), note(2, 1, 1), note(3, 2, 1)];
        reconciler.rebase(&previous);
        let dragging = LocalOverlay {
            dragging: Some(NoteId::new(1)),
            drafts: None,
        };
        let snapshot = vec![note(2, 0, 2), note(3, 1, 2), note(1, 2, 2)];

        let during = reconciler.reconcile(&snapshot, &previous, &dragging);
        assert_eq!(ids(&during.notes), vec![1, 2, 3]);
        assert_eq!(reconciler.baseline(), None);

        let repeated = reconciler.reconcile(&snapshot, &during.notes, &dragging);
        assert!(!repeated.changed);

        let after = reconciler.reconcile(&snapshot, &during.notes, &LocalOverlay::default());
        assert!(after.changed);
        assert_eq!(ids(&after.notes), vec![2, 3, 1]);
    }

    #[test]
    fn rebase_makes_matching_snapshot_a_no_op() {
        let mut reconciler = OrderedListReconciler::new();
        let local = vec![note(2, 0, 5), note(1, 1, 5)];
        reconciler.rebase(&local);

        let result = reconciler.reconcile(&local.clone(), &local, &LocalOverlay::default());
        assert!(!result.changed);
    }

    #[test]
    fn reset_forces_next_snapshot() {
        let mut reconciler = OrderedListReconciler::new();
        let snapshot = vec![note(1, 0, 1)];
        reconciler.reconcile(&snapshot, &[], &LocalOverlay::default());
        reconciler.reset();
        let result = reconciler.reconcile(&snapshot, &[], &LocalOverlay::default());
        assert!(result.changed);
    }
}
