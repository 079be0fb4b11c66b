pub mod add;
pub mod common;
pub mod completions;
pub mod config;
pub mod draft;
pub mod list;
pub mod move_note;
