//! Note model

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;
use std::sync::LazyLock;

static TAG_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"#([a-zA-Z][a-zA-Z0-9_-]*)").expect("Invalid regex"));

/// Server-assigned note identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NoteId(i64);

impl NoteId {
    #[must_use]
    pub const fn new(raw: i64) -> Self {
        Self(raw)
    }

    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for NoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for NoteId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.trim().parse()?))
    }
}

impl From<i64> for NoteId {
    fn from(raw: i64) -> Self {
        Self(raw)
    }
}

/// A note as the server last reported it, possibly overlaid with local state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    /// Server-assigned identifier
    pub id: NoteId,
    /// Markdown content
    pub content: String,
    /// Display position among sibling notes
    pub sort_order: i64,
    /// Last update timestamp (Unix ms)
    pub updated_at: i64,
}

impl Note {
    #[must_use]
    pub fn new(id: impl Into<NoteId>, content: impl Into<String>, sort_order: i64) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
            sort_order,
            updated_at: chrono::Utc::now().timestamp_millis(),
        }
    }

    /// Extract #tags from content
    #[must_use]
    pub fn tags(&self) -> Vec<String> {
        extract_tags(&self.content)
    }

    /// Get first line as title preview, truncated to `max_len` characters
    #[must_use]
    pub fn title_preview(&self, max_len: usize) -> String {
        self.content
            .lines()
            .next()
            .unwrap_or("")
            .chars()
            .take(max_len)
            .collect()
    }

    /// Check if note content is empty (whitespace-only counts as empty)
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.content.trim().is_empty()
    }

    /// The `(id, sort_order)` pair pushed when the list order changes.
    #[must_use]
    pub const fn order_update(&self) -> OrderUpdate {
        OrderUpdate {
            id: self.id,
            sort_order: self.sort_order,
        }
    }
}

/// Display ordering: ascending `sort_order`, ties broken by ascending id.
pub fn display_order(a: &Note, b: &Note) -> Ordering {
    a.sort_order
        .cmp(&b.sort_order)
        .then_with(|| a.id.cmp(&b.id))
}

/// Sort notes in place by [`display_order`].
pub fn sort_for_display(notes: &mut [Note]) {
    notes.sort_by(display_order);
}

/// Rewrite `sort_order` as a dense 0-based sequence matching list positions.
pub fn renumber_dense(notes: &mut [Note]) {
    for (index, note) in notes.iter_mut().enumerate() {
        note.sort_order = i64::try_from(index).unwrap_or(i64::MAX);
    }
}

/// A single entry of an order push.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderUpdate {
    pub id: NoteId,
    pub sort_order: i64,
}

/// Metadata forwarded alongside a content save.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteMetadata {
    /// Blinko note type (0 = blinko, 1 = note, 2 = todo)
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub note_type: Option<i32>,
    /// Ids of notes referenced by this one
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub references: Vec<NoteId>,
    /// Free-form metadata passed through untouched
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub extra: serde_json::Value,
}

/// Extract #tags from text
///
/// Valid tags match the pattern: `#[a-zA-Z][a-zA-Z0-9_-]*`
/// Tags are returned in lowercase and deduplicated.
///
/// # Examples
///
/// ```
/// use blinko_core::models::extract_tags;
///
/// let tags = extract_tags("Hello #world this is #Rust-lang");
/// assert!(tags.contains(&"world".to_string()));
/// assert!(tags.contains(&"rust-lang".to_string()));
/// ```
#[must_use]
pub fn extract_tags(text: &str) -> Vec<String> {
    TAG_PATTERN
        .captures_iter(text)
        .map(|cap| cap[1].to_lowercase())
        .collect::<HashSet<_>>()
        .into_iter()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_note_id_parse() {
        let parsed: NoteId = " 42 ".parse().unwrap();
        assert_eq!(parsed, NoteId::new(42));
        assert!("abc".parse::<NoteId>().is_err());
    }

    #[test]
    fn test_note_deserializes_camel_case_fields() {
        let note: Note = serde_json::from_str(
            r#"{"id": 7, "content": "hi", "sortOrder": 3, "updatedAt": 1000}"#,
        )
        .unwrap();
        assert_eq!(note.id, NoteId::new(7));
        assert_eq!(note.sort_order, 3);
        assert_eq!(note.updated_at, 1000);
    }

    #[test]
    fn test_note_rejects_missing_fields() {
        let result = serde_json::from_str::<Note>(r#"{"id": 7, "content": "hi"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_sort_for_display_breaks_ties_by_id() {
        let mut notes = vec![
            Note::new(NoteId::new(3), "c", 1),
            Note::new(NoteId::new(2), "b", 1),
            Note::new(NoteId::new(1), "a", 5),
        ];
        sort_for_display(&mut notes);
        let ids: Vec<i64> = notes.iter().map(|note| note.id.get()).collect();
        assert_eq!(ids, vec![2, 3, 1]);
    }

    #[test]
    fn test_renumber_dense() {
        let mut notes = vec![Note::new(NoteId::new(1), "a", 10), Note::new(NoteId::new(2), "b", 10)];
        renumber_dense(&mut notes);
        assert_eq!(notes[0].sort_order, 0);
        assert_eq!(notes[1].sort_order, 1);
    }

    #[test]
    fn test_metadata_omits_empty_fields() {
        let json = serde_json::to_string(&NoteMetadata::default()).unwrap();
        assert_eq!(json, "{}");
    }

    #[test]
    fn test_extract_tags_deduplication() {
        let tags = extract_tags("#hello #Hello #HELLO");
        assert_eq!(tags, vec!["hello".to_string()]);
    }

    #[test]
    fn test_extract_tags_invalid() {
        // Tags starting with numbers are invalid
        let tags = extract_tags("#123 #456test");
        assert!(tags.is_empty());
    }

    #[test]
    fn test_title_preview() {
        let note = Note::new(NoteId::new(1), "First line\nSecond line", 0);
        assert_eq!(note.title_preview(50), "First line");
        assert_eq!(note.title_preview(5), "First");
    }
}
