//! libSQL-backed note store

#![allow(clippy::cast_possible_wrap)] // SQLite uses i64 for LIMIT/OFFSET

use std::sync::Arc;

use async_trait::async_trait;
use libsql::{params, Connection};
use tokio::sync::Mutex;

use super::Database;
use crate::error::{Error, Result};
use crate::models::{
    Attachment, AttachmentKind, AttachmentOrderUpdate, Note, NoteId, NoteMetadata,
    NoteSortConfig, OrderUpdate, SortDirection, SortField,
};
use crate::remote::{NoteFilter, RemoteStore};
use crate::util::unix_millis_now;

const NOTE_COLUMNS: &str = "id, content, sort_order, updated_at";

/// Thread-safe note store over a local libSQL database.
#[derive(Clone)]
pub struct LibSqlNoteStore {
    db: Arc<Mutex<Database>>,
}

impl LibSqlNoteStore {
    pub fn new(db: Database) -> Self {
        Self {
            db: Arc::new(Mutex::new(db)),
        }
    }

    /// Open a store at the given filesystem path.
    pub async fn open_path(path: impl AsRef<std::path::Path>) -> Result<Self> {
        Ok(Self::new(Database::open(path).await?))
    }

    /// Open an in-memory store (primarily for tests).
    pub async fn open_in_memory() -> Result<Self> {
        Ok(Self::new(Database::open_in_memory().await?))
    }

    /// Fetch a note by id.
    pub async fn get_note(&self, id: NoteId) -> Result<Option<Note>> {
        let db = self.db.lock().await;
        fetch_note(db.connection(), id).await
    }

    /// Soft-delete a note.
    pub async fn delete_note(&self, id: NoteId) -> Result<()> {
        let db = self.db.lock().await;
        let affected = db
            .connection()
            .execute(
                "UPDATE notes SET is_deleted = 1, updated_at = ? WHERE id = ? AND is_deleted = 0",
                params![unix_millis_now(), id.get()],
            )
            .await?;
        if affected == 0 {
            return Err(Error::NotFound(id.to_string()));
        }
        Ok(())
    }

    /// Attach file metadata to a note, appended after existing attachments.
    pub async fn add_attachment(&self, note_id: NoteId, attachment: &Attachment) -> Result<()> {
        let db = self.db.lock().await;
        db.connection()
            .execute(
                "INSERT OR REPLACE INTO attachments (note_id, name, path, size, preview_type, sort_order)
                 VALUES (?, ?, ?, ?, ?,
                    (SELECT COALESCE(MAX(sort_order) + 1, 0) FROM attachments WHERE note_id = ?))",
                params![
                    note_id.get(),
                    attachment.name.as_str(),
                    attachment.path.as_str(),
                    attachment.size,
                    kind_to_str(attachment.kind),
                    note_id.get()
                ],
            )
            .await?;
        Ok(())
    }

    /// Attachments of a note in display order.
    pub async fn list_attachments(&self, note_id: NoteId) -> Result<Vec<Attachment>> {
        let db = self.db.lock().await;
        let mut rows = db
            .connection()
            .query(
                "SELECT name, path, size, preview_type, sort_order FROM attachments
                 WHERE note_id = ? ORDER BY sort_order ASC, name ASC",
                params![note_id.get()],
            )
            .await?;

        let mut attachments = Vec::new();
        while let Some(row) = rows.next().await? {
            let kind: String = row.get(3)?;
            attachments.push(Attachment {
                name: row.get(0)?,
                path: row.get(1)?,
                size: row.get(2)?,
                kind: kind_from_str(&kind),
                sort_order: row.get(4)?,
            });
        }
        Ok(attachments)
    }
}

#[async_trait]
impl RemoteStore for LibSqlNoteStore {
    async fn fetch_ordered_list(&self, filter: &NoteFilter) -> Result<Vec<Note>> {
        let db = self.db.lock().await;
        let order_by = order_clause(filter.sort);

        let mut rows = if let Some(tag) = filter.tag.as_deref() {
            let pattern = format!("%#{}%", tag.trim_start_matches('#'));
            db.connection()
                .query(
                    &format!(
                        "SELECT {NOTE_COLUMNS} FROM notes
                         WHERE is_deleted = 0 AND content LIKE ? COLLATE NOCASE
                         ORDER BY {order_by} LIMIT ? OFFSET ?"
                    ),
                    params![pattern, filter.limit as i64, filter.offset as i64],
                )
                .await?
        } else {
            db.connection()
                .query(
                    &format!(
                        "SELECT {NOTE_COLUMNS} FROM notes
                         WHERE is_deleted = 0
                         ORDER BY {order_by} LIMIT ? OFFSET ?"
                    ),
                    params![filter.limit as i64, filter.offset as i64],
                )
                .await?
        };

        let mut notes = Vec::new();
        while let Some(row) = rows.next().await? {
            notes.push(parse_note(&row)?);
        }
        Ok(notes)
    }

    async fn update_order(&self, updates: &[OrderUpdate]) -> Result<()> {
        if updates.is_empty() {
            return Ok(());
        }
        let db = self.db.lock().await;
        let conn = db.connection();
        conn.execute("BEGIN TRANSACTION", ()).await?;
        for update in updates {
            if let Err(e) = conn
                .execute(
                    "UPDATE notes SET sort_order = ? WHERE id = ?",
                    params![update.sort_order, update.id.get()],
                )
                .await
            {
                conn.execute("ROLLBACK", ()).await.ok();
                return Err(e.into());
            }
        }
        commit(conn).await?;
        tracing::debug!("Stored order for {} note(s)", updates.len());
        Ok(())
    }

    async fn update_content(
        &self,
        id: NoteId,
        content: &str,
        _metadata: &NoteMetadata,
    ) -> Result<Note> {
        let db = self.db.lock().await;
        let affected = db
            .connection()
            .execute(
                "UPDATE notes SET content = ?, updated_at = ? WHERE id = ? AND is_deleted = 0",
                params![content, unix_millis_now(), id.get()],
            )
            .await?;
        if affected == 0 {
            return Err(Error::NotFound(id.to_string()));
        }

        fetch_note(db.connection(), id)
            .await?
            .ok_or_else(|| Error::NotFound(id.to_string()))
    }

    async fn create_note(&self, content: &str, _metadata: &NoteMetadata) -> Result<Note> {
        let db = self.db.lock().await;
        let now = unix_millis_now();
        db.connection()
            .execute(
                "INSERT INTO notes (content, sort_order, created_at, updated_at)
                 VALUES (?, (SELECT COALESCE(MAX(sort_order) + 1, 0) FROM notes WHERE is_deleted = 0), ?, ?)",
                params![content, now, now],
            )
            .await?;
        let id = NoteId::new(db.connection().last_insert_rowid());

        fetch_note(db.connection(), id)
            .await?
            .ok_or_else(|| Error::Database(format!("Created note {id} could not be read back")))
    }

    async fn update_attachments_order(
        &self,
        note_id: NoteId,
        updates: &[AttachmentOrderUpdate],
    ) -> Result<()> {
        if updates.is_empty() {
            return Ok(());
        }
        let db = self.db.lock().await;
        let conn = db.connection();
        conn.execute("BEGIN TRANSACTION", ()).await?;
        for update in updates {
            if let Err(e) = conn
                .execute(
                    "UPDATE attachments SET sort_order = ? WHERE note_id = ? AND name = ?",
                    params![update.sort_order, note_id.get(), update.name.as_str()],
                )
                .await
            {
                conn.execute("ROLLBACK", ()).await.ok();
                return Err(e.into());
            }
        }
        commit(conn).await
    }
}

async fn commit(conn: &Connection) -> Result<()> {
    if let Err(e) = conn.execute("COMMIT", ()).await {
        conn.execute("ROLLBACK", ()).await.ok();
        return Err(e.into());
    }
    Ok(())
}

async fn fetch_note(conn: &Connection, id: NoteId) -> Result<Option<Note>> {
    let mut rows = conn
        .query(
            &format!("SELECT {NOTE_COLUMNS} FROM notes WHERE id = ? AND is_deleted = 0"),
            params![id.get()],
        )
        .await?;

    match rows.next().await? {
        Some(row) => Ok(Some(parse_note(&row)?)),
        None => Ok(None),
    }
}

fn parse_note(row: &libsql::Row) -> Result<Note> {
    Ok(Note {
        id: NoteId::new(row.get(0)?),
        content: row.get(1)?,
        sort_order: row.get(2)?,
        updated_at: row.get(3)?,
    })
}

fn order_clause(sort: Option<NoteSortConfig>) -> &'static str {
    let Some(sort) = sort else {
        return "sort_order ASC, id ASC";
    };
    match (sort.sort_by, sort.direction) {
        (SortField::CreatedAt, SortDirection::Asc) => "created_at ASC, id ASC",
        (SortField::CreatedAt, SortDirection::Desc) => "created_at DESC, id DESC",
        (SortField::UpdatedAt, SortDirection::Asc) => "updated_at ASC, id ASC",
        (SortField::UpdatedAt, SortDirection::Desc) => "updated_at DESC, id DESC",
        (SortField::Content, SortDirection::Asc) => "content ASC, id ASC",
        (SortField::Content, SortDirection::Desc) => "content DESC, id DESC",
    }
}

const fn kind_to_str(kind: AttachmentKind) -> &'static str {
    match kind {
        AttachmentKind::Image => "image",
        AttachmentKind::Other => "other",
    }
}

fn kind_from_str(value: &str) -> AttachmentKind {
    if value == "image" {
        AttachmentKind::Image
    } else {
        AttachmentKind::Other
    }
}
