//! Attachment model

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// How an attachment is previewed; reordering never crosses kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttachmentKind {
    Image,
    Other,
}

impl AttachmentKind {
    /// Classify by MIME type.
    #[must_use]
    pub fn from_mime(mime_type: &str) -> Self {
        if mime_type.trim().to_ascii_lowercase().starts_with("image/") {
            Self::Image
        } else {
            Self::Other
        }
    }
}

/// Attachment metadata as carried on a note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    /// File name, unique within a note
    pub name: String,
    /// Server upload path
    pub path: String,
    /// Size in bytes
    pub size: i64,
    /// Preview kind
    #[serde(rename = "previewType")]
    pub kind: AttachmentKind,
    /// Position within the note's attachment list
    pub sort_order: i64,
}

impl Attachment {
    /// Create attachment metadata, rejecting blank names and negative sizes.
    pub fn new(
        name: impl Into<String>,
        path: impl Into<String>,
        size: i64,
        kind: AttachmentKind,
    ) -> Result<Self> {
        let name = name.into().trim().to_string();
        if name.is_empty() {
            return Err(Error::InvalidInput(
                "Attachment name cannot be empty".to_string(),
            ));
        }
        if size < 0 {
            return Err(Error::InvalidInput(
                "Attachment size cannot be negative".to_string(),
            ));
        }

        Ok(Self {
            name,
            path: path.into(),
            size,
            kind,
            sort_order: 0,
        })
    }
}

/// A single entry of an attachment order push.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachmentOrderUpdate {
    pub name: String,
    pub sort_order: i64,
}
