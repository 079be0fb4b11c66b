//! Draft store: per-note overlay of edited-but-unsaved content.
//!
//! Drafts are held in memory and written through to [`LocalStorage`] on every
//! mutation, so an abrupt exit never loses an acknowledged edit. Storage
//! failures are logged and do not fail the edit; the in-memory copy stays
//! authoritative for the rest of the session.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::config::EmptyDraftPolicy;
use crate::models::{Draft, DraftKey, NoteId};
use crate::storage::LocalStorage;

const DRAFTS_KEY: &str = "drafts";

/// Draft store shared between a session and its dispatcher.
pub type SharedDraftStore = Arc<Mutex<DraftStore>>;

/// Lock a shared draft store, recovering from a poisoned lock.
pub fn lock_drafts(store: &SharedDraftStore) -> MutexGuard<'_, DraftStore> {
    store.lock().unwrap_or_else(PoisonError::into_inner)
}

pub struct DraftStore {
    storage: Arc<dyn LocalStorage>,
    drafts: BTreeMap<DraftKey, String>,
    policy: EmptyDraftPolicy,
}

impl DraftStore {
    /// Create a store, restoring drafts persisted by a previous process.
    pub fn load(storage: Arc<dyn LocalStorage>, policy: EmptyDraftPolicy) -> Self {
        let drafts = match storage.get(DRAFTS_KEY) {
            Ok(Some(raw)) => match serde_json::from_str::<Vec<Draft>>(&raw) {
                Ok(drafts) => drafts
                    .into_iter()
                    .map(|draft| (draft.key, draft.content))
                    .collect(),
                Err(error) => {
                    tracing::warn!("Discarding unreadable persisted drafts: {}", error);
                    BTreeMap::new()
                }
            },
            Ok(None) => BTreeMap::new(),
            Err(error) => {
                tracing::warn!("Failed to read persisted drafts: {}", error);
                BTreeMap::new()
            }
        };

        tracing::debug!("Loaded {} draft(s)", drafts.len());
        Self {
            storage,
            drafts,
            policy,
        }
    }

    /// Wrap in the shared handle used by sessions and dispatchers.
    pub fn into_shared(self) -> SharedDraftStore {
        Arc::new(Mutex::new(self))
    }

    pub const fn policy(&self) -> EmptyDraftPolicy {
        self.policy
    }

    /// Draft content if it should be shown, else `server_content`, else `""`.
    pub fn get(&self, key: DraftKey, server_content: Option<&str>) -> String {
        self.visible_draft(key)
            .or(server_content)
            .unwrap_or_default()
            .to_string()
    }

    /// The raw stored draft, regardless of policy.
    pub fn draft(&self, key: DraftKey) -> Option<&str> {
        self.drafts.get(&key).map(String::as_str)
    }

    pub fn contains(&self, key: DraftKey) -> bool {
        self.drafts.contains_key(&key)
    }

    /// Upsert a draft and write it through to storage.
    pub fn set(&mut self, key: DraftKey, content: impl Into<String>) {
        self.drafts.insert(key, content.into());
        self.flush();
    }

    /// Remove a draft. Returns whether one was present.
    pub fn clear(&mut self, key: DraftKey) -> bool {
        let removed = self.drafts.remove(&key).is_some();
        if removed {
            self.flush();
        }
        removed
    }

    /// Drop drafts of notes missing from `present`. Returns the dropped ids.
    pub fn retain_notes(&mut self, present: &HashSet<NoteId>) -> Vec<NoteId> {
        let stale = self
            .drafts
            .keys()
            .filter_map(|key| key.note_id())
            .filter(|id| !present.contains(id))
            .collect::<Vec<_>>();

        if !stale.is_empty() {
            for id in &stale {
                self.drafts.remove(&DraftKey::Note(*id));
            }
            tracing::debug!("Dropped drafts for {} vanished note(s)", stale.len());
            self.flush();
        }
        stale
    }

    /// Note drafts that override server content under the current policy.
    pub fn overlay(&self) -> HashMap<NoteId, String> {
        self.drafts
            .keys()
            .filter_map(|key| {
                let id = key.note_id()?;
                self.visible_draft(*key)
                    .map(|content| (id, content.to_string()))
            })
            .collect()
    }

    pub fn drafts(&self) -> impl Iterator<Item = Draft> + '_ {
        self.drafts.iter().map(|(key, content)| Draft {
            key: *key,
            content: content.clone(),
        })
    }

    pub fn len(&self) -> usize {
        self.drafts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.drafts.is_empty()
    }

    fn visible_draft(&self, key: DraftKey) -> Option<&str> {
        let content = self.drafts.get(&key)?;
        match self.policy {
            EmptyDraftPolicy::FallBackToServer if content.is_empty() => None,
            _ => Some(content.as_str()),
        }
    }

    fn flush(&self) {
        let drafts = self.drafts().collect::<Vec<_>>();
        let result = serde_json::to_string(&drafts)
            .map_err(crate::Error::from)
            .and_then(|serialized| self.storage.set(DRAFTS_KEY, &serialized));
        if let Err(error) = result {
            tracing::warn!("Failed to persist drafts: {}", error);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;
    use crate::Error;

    fn note(id: i64) -> DraftKey {
        DraftKey::Note(NoteId::new(id))
    }

    fn store_with(storage: Arc<dyn LocalStorage>, policy: EmptyDraftPolicy) -> DraftStore {
        DraftStore::load(storage, policy)
    }

    struct BrokenStorage;

    impl LocalStorage for BrokenStorage {
        fn get(&self, _key: &str) -> crate::Result<Option<String>> {
            Err(Error::Storage("disk gone".to_string()))
        }

        fn set(&self, _key: &str, _value: &str) -> crate::Result<()> {
            Err(Error::Storage("disk gone".to_string()))
        }

        fn remove(&self, _key: &str) -> crate::Result<()> {
            Err(Error::Storage("disk gone".to_string()))
        }
    }

    #[test]
    fn get_prefers_draft_then_server_then_empty() {
        let mut store = store_with(Arc::new(MemoryStorage::new()), EmptyDraftPolicy::default());
        assert_eq!(store.get(note(1), None), "");
        assert_eq!(store.get(note(1), Some("server")), "server");

        store.set(note(1), "local");
        assert_eq!(store.get(note(1), Some("server")), "local");
    }

    #[test]
    fn empty_draft_falls_back_by_default() {
        let mut store = store_with(Arc::new(MemoryStorage::new()), EmptyDraftPolicy::default());
        store.set(note(1), "");
        assert_eq!(store.get(note(1), Some("server")), "server");
        assert!(store.overlay().is_empty());
        assert!(store.contains(note(1)));
    }

    #[test]
    fn empty_draft_is_kept_when_configured() {
        let mut store = store_with(Arc::new(MemoryStorage::new()), EmptyDraftPolicy::KeepEmpty);
        store.set(note(1), "");
        assert_eq!(store.get(note(1), Some("server")), "");
        assert_eq!(store.overlay().get(&NoteId::new(1)).map(String::as_str), Some(""));
    }

    #[test]
    fn drafts_survive_reload() {
        let storage: Arc<dyn LocalStorage> = Arc::new(MemoryStorage::new());
        {
            let mut store = store_with(Arc::clone(&storage), EmptyDraftPolicy::default());
            store.set(note(5), "draft text");
            store.set(DraftKey::Compose, "new idea");
        }

        let reloaded = store_with(storage, EmptyDraftPolicy::default());
        assert_eq!(reloaded.draft(note(5)), Some("draft text"));
        assert_eq!(reloaded.draft(DraftKey::Compose), Some("new idea"));
    }

    #[test]
    fn clear_removes_and_persists() {
        let storage: Arc<dyn LocalStorage> = Arc::new(MemoryStorage::new());
        let mut store = store_with(Arc::clone(&storage), EmptyDraftPolicy::default());
        store.set(note(5), "x");
        assert!(store.clear(note(5)));
        assert!(!store.clear(note(5)));

        let reloaded = store_with(storage, EmptyDraftPolicy::default());
        assert!(reloaded.is_empty());
    }

    #[test]
    fn retain_notes_drops_vanished_ids_only() {
        let mut store = store_with(Arc::new(MemoryStorage::new()), EmptyDraftPolicy::default());
        store.set(note(1), "keep");
        store.set(note(2), "drop");
        store.set(DraftKey::Compose, "compose");

        let present = HashSet::from([NoteId::new(1)]);
        let dropped = store.retain_notes(&present);

        assert_eq!(dropped, vec![NoteId::new(2)]);
        assert_eq!(store.len(), 2);
        assert!(store.contains(DraftKey::Compose));
    }

    #[test]
    fn storage_failures_do_not_lose_in_memory_drafts() {
        let mut store = store_with(Arc::new(BrokenStorage), EmptyDraftPolicy::default());
        store.set(note(3), "still here");
        assert_eq!(store.get(note(3), None), "still here");
    }

    #[test]
    fn unreadable_persisted_drafts_are_discarded() {
        let storage = Arc::new(MemoryStorage::new());
        storage.set(DRAFTS_KEY, "{not json").unwrap();
        let store = store_with(storage, EmptyDraftPolicy::default());
        assert!(store.is_empty());
    }
}
