//! blinko-core - Core library for Blinko note lists
//!
//! Keeps a locally rendered, manually ordered note list consistent with the
//! server while the user drags notes around and edits drafts. Clients build a
//! [`NoteListSession`] over a [`RemoteStore`] and a [`LocalStorage`].

pub mod config;
pub mod db;
pub mod drafts;
pub mod drag;
pub mod error;
pub mod events;
pub mod models;
pub mod reconcile;
pub mod remote;
pub mod session;
pub mod storage;
pub mod sync;
mod util;

pub use config::SessionConfig;
pub use error::{Error, Result};
pub use events::SessionEvent;
pub use models::{Note, NoteId};
pub use remote::{NoteFilter, RemoteStore};
pub use session::{DragResolution, GestureEnd, NoteListSession};
pub use storage::LocalStorage;
