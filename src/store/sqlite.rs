use std::path::Path;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, ErrorCode, OptionalExtension, Row};
use tokio::sync::Mutex;

use super::{prepare_text_update, NoteStore};
use crate::entity::{ContentType, Note};
use crate::error::{PhyslinkError, Result};

/// SQLite note store for local development.
///
/// A single connection behind an async mutex: every operation is one short
/// statement, so a pool of one is enough.
pub struct SqliteNoteStore {
    conn: Mutex<Connection>,
}

impl SqliteNoteStore {
    /// Open or create the database file
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        Self::with_connection(conn)
    }

    /// Open a private in-memory database
    pub fn open_in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        init_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS notes (
            id TEXT PRIMARY KEY,
            content_type TEXT NOT NULL,
            content TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )",
        [],
    )?;
    Ok(())
}

fn select_note(conn: &Connection, id: &str) -> Result<Option<Note>> {
    let row = conn
        .query_row(
            "SELECT id, content_type, content, created_at, updated_at FROM notes WHERE id = ?1",
            [id],
            read_row,
        )
        .optional()?;

    row.map(NoteRow::into_note).transpose()
}

struct NoteRow {
    id: String,
    content_type: String,
    content: String,
    created_at: String,
    updated_at: String,
}

fn read_row(row: &Row<'_>) -> rusqlite::Result<NoteRow> {
    Ok(NoteRow {
        id: row.get(0)?,
        content_type: row.get(1)?,
        content: row.get(2)?,
        created_at: row.get(3)?,
        updated_at: row.get(4)?,
    })
}

impl NoteRow {
    fn into_note(self) -> Result<Note> {
        let content_type: ContentType = self.content_type.parse().map_err(|_| {
            PhyslinkError::Storage(format!(
                "note {} has unknown content type '{}'",
                self.id, self.content_type
            ))
        })?;
        Ok(Note {
            content_type,
            content: self.content,
            created_at: parse_timestamp(&self.created_at)?,
            updated_at: parse_timestamp(&self.updated_at)?,
            id: self.id,
        })
    }
}

fn parse_timestamp(s: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| PhyslinkError::Storage(format!("invalid timestamp '{}': {}", s, e)))
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _) if e.code == ErrorCode::ConstraintViolation
    )
}

#[async_trait]
impl NoteStore for SqliteNoteStore {
    async fn get(&self, id: &str) -> Result<Option<Note>> {
        let conn = self.conn.lock().await;
        select_note(&conn, id)
    }

    async fn create(&self, id: &str, content_type: ContentType, content: String) -> Result<Note> {
        let note = Note::new(id, content_type, content)?;

        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT INTO notes (id, content_type, content, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                note.id,
                note.content_type.as_str(),
                note.content,
                note.created_at.to_rfc3339(),
                note.updated_at.to_rfc3339(),
            ],
        )
        .map_err(|e| {
            if is_unique_violation(&e) {
                PhyslinkError::NoteExists(id.to_string())
            } else {
                PhyslinkError::from(e)
            }
        })?;

        Ok(note)
    }

    async fn update_text(&self, id: &str, content: String) -> Result<Note> {
        // Held across read and write so the type check cannot go stale.
        let conn = self.conn.lock().await;
        let updated = prepare_text_update(id, select_note(&conn, id)?, content)?;

        conn.execute(
            "UPDATE notes SET content = ?2, updated_at = ?3 WHERE id = ?1 AND content_type = 'text'",
            params![updated.id, updated.content, updated.updated_at.to_rfc3339()],
        )?;

        Ok(updated)
    }
}
