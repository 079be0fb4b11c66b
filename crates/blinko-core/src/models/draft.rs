//! Draft model

use serde::{Deserialize, Serialize};
use std::fmt;

use super::note::NoteId;

/// Which content a draft overlays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DraftKey {
    /// Edit-mode draft of an existing note
    Note(NoteId),
    /// Create-mode draft of a note that has not been saved yet
    Compose,
}

impl DraftKey {
    #[must_use]
    pub const fn note_id(self) -> Option<NoteId> {
        match self {
            Self::Note(id) => Some(id),
            Self::Compose => None,
        }
    }
}

impl From<NoteId> for DraftKey {
    fn from(id: NoteId) -> Self {
        Self::Note(id)
    }
}

impl fmt::Display for DraftKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Note(id) => write!(f, "note:{id}"),
            Self::Compose => f.write_str("compose"),
        }
    }
}

/// Edited-but-unsaved content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Draft {
    pub key: DraftKey,
    pub content: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draft_key_serializes_compactly() {
        let note = serde_json::to_string(&DraftKey::Note(NoteId::new(5))).unwrap();
        let compose = serde_json::to_string(&DraftKey::Compose).unwrap();
        assert_eq!(note, r#"{"note":5}"#);
        assert_eq!(compose, r#""compose""#);
    }

    #[test]
    fn draft_key_display() {
        assert_eq!(DraftKey::Note(NoteId::new(9)).to_string(), "note:9");
        assert_eq!(DraftKey::Compose.note_id(), None);
    }
}
