//! Authoritative note store consumed by sessions.
//!
//! Every write is idempotent from the caller's perspective: re-issuing the
//! same payload leaves the store in the same state.

mod http;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::models::{AttachmentOrderUpdate, Note, NoteId, NoteMetadata, NoteSortConfig, OrderUpdate};

pub use http::HttpRemoteStore;

/// Which notes to fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteFilter {
    #[serde(rename = "size")]
    pub limit: usize,
    #[serde(skip)]
    pub offset: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<NoteSortConfig>,
}

impl NoteFilter {
    pub const fn new(limit: usize) -> Self {
        Self {
            limit,
            offset: 0,
            tag: None,
            sort: None,
        }
    }

    #[must_use]
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    #[must_use]
    pub const fn with_sort(mut self, sort: NoteSortConfig) -> Self {
        self.sort = Some(sort);
        self
    }

    #[must_use]
    pub const fn with_offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }

    /// 1-based page number for page-oriented APIs.
    pub const fn page(&self) -> usize {
        if self.limit == 0 {
            1
        } else {
            self.offset / self.limit + 1
        }
    }
}

impl Default for NoteFilter {
    fn default() -> Self {
        Self::new(30)
    }
}

#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Fetch the current ordered note list.
    async fn fetch_ordered_list(&self, filter: &NoteFilter) -> Result<Vec<Note>>;

    /// Persist new `sort_order` values.
    async fn update_order(&self, updates: &[OrderUpdate]) -> Result<()>;

    /// Save new content for an existing note and return the stored note.
    async fn update_content(
        &self,
        id: NoteId,
        content: &str,
        metadata: &NoteMetadata,
    ) -> Result<Note>;

    /// Create a note and return it with its server-assigned id.
    async fn create_note(&self, content: &str, metadata: &NoteMetadata) -> Result<Note>;

    /// Persist new `sort_order` values for the attachments of one note.
    async fn update_attachments_order(
        &self,
        note_id: NoteId,
        updates: &[AttachmentOrderUpdate],
    ) -> Result<()>;
}
