//! Database migrations

use crate::error::Result;
use libsql::Connection;

/// One schema step: the version it produces and the statements that get there.
struct Migration {
    version: i32,
    summary: &'static str,
    statements: &'static [&'static str],
}

const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        summary: "notes with a persisted display order",
        statements: &[
            "CREATE TABLE IF NOT EXISTS schema_version (
                version INTEGER PRIMARY KEY
            )",
            "CREATE TABLE IF NOT EXISTS notes (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                content TEXT NOT NULL,
                sort_order INTEGER NOT NULL DEFAULT 0,
                created_at INTEGER NOT NULL,
                updated_at INTEGER NOT NULL,
                is_deleted INTEGER NOT NULL DEFAULT 0
            )",
            "CREATE INDEX IF NOT EXISTS idx_notes_sort_order ON notes(sort_order, id)",
            "CREATE INDEX IF NOT EXISTS idx_notes_updated ON notes(updated_at DESC)",
            "CREATE INDEX IF NOT EXISTS idx_notes_created ON notes(created_at DESC)",
            "CREATE INDEX IF NOT EXISTS idx_notes_deleted ON notes(is_deleted)",
        ],
    },
    Migration {
        version: 2,
        summary: "attachment metadata with per-note order",
        statements: &[
            "CREATE TABLE IF NOT EXISTS attachments (
                note_id INTEGER NOT NULL REFERENCES notes(id) ON DELETE CASCADE,
                name TEXT NOT NULL,
                path TEXT NOT NULL,
                size INTEGER NOT NULL,
                preview_type TEXT NOT NULL,
                sort_order INTEGER NOT NULL DEFAULT 0,
                PRIMARY KEY (note_id, name)
            )",
            "CREATE INDEX IF NOT EXISTS idx_attachments_name ON attachments(name)",
        ],
    },
];

/// Latest schema version
const CURRENT_VERSION: i32 = 2;

/// Apply every migration newer than the database's recorded version.
pub async fn run(conn: &Connection) -> Result<()> {
    let version = get_version(conn).await?;

    for migration in MIGRATIONS.iter().filter(|m| m.version > version) {
        apply(conn, migration).await?;
        tracing::info!(
            "Migrated database to version {} ({})",
            migration.version,
            migration.summary
        );
    }

    Ok(())
}

/// Recorded schema version, 0 for a fresh database.
async fn get_version(conn: &Connection) -> Result<i32> {
    let mut rows = conn
        .query(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name = 'schema_version'",
            (),
        )
        .await?;
    if rows.next().await?.is_none() {
        return Ok(0);
    }

    let mut rows = conn
        .query("SELECT COALESCE(MAX(version), 0) FROM schema_version", ())
        .await?;
    match rows.next().await? {
        Some(row) => Ok(row.get(0)?),
        None => Ok(0),
    }
}

/// Run one migration and record its version in a single transaction.
///
/// libsql has no `execute_batch`, so each statement runs separately.
async fn apply(conn: &Connection, migration: &Migration) -> Result<()> {
    conn.execute("BEGIN TRANSACTION", ()).await?;

    for stmt in migration.statements {
        if let Err(e) = conn.execute(stmt, ()).await {
            conn.execute("ROLLBACK", ()).await.ok();
            return Err(e.into());
        }
    }

    let recorded = conn
        .execute(
            "INSERT INTO schema_version (version) VALUES (?1)",
            libsql::params![migration.version],
        )
        .await;
    if let Err(e) = recorded {
        conn.execute("ROLLBACK", ()).await.ok();
        return Err(e.into());
    }

    if let Err(e) = conn.execute("COMMIT", ()).await {
        conn.execute("ROLLBACK", ()).await.ok();
        return Err(e.into());
    }

    Ok(())
}
