//! Data models for Blinko notes

mod attachment;
mod draft;
mod note;
mod sort;

pub use attachment::{Attachment, AttachmentKind, AttachmentOrderUpdate};
pub use draft::{Draft, DraftKey};
pub use note::{
    display_order, extract_tags, renumber_dense, sort_for_display, Note, NoteId, NoteMetadata,
    OrderUpdate,
};
pub use sort::{NoteSortConfig, SortDirection, SortField};
