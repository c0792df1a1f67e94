use std::time::Duration;

use async_trait::async_trait;
use deadpool_postgres::{
    Config, ManagerConfig, Pool, PoolConfig, RecyclingMethod, Runtime, Timeouts,
};
use tokio_postgres::error::SqlState;
use tokio_postgres::Row;

use super::{prepare_text_update, tls, NoteStore};
use crate::entity::{ContentType, Note};
use crate::error::{PhyslinkError, Result};

/// Connections kept open. Sized for serverless / low-concurrency deployments.
const POOL_MAX_SIZE: usize = 1;
const CONNECT_TIMEOUT: Duration = Duration::from_secs(60);
const POOL_WAIT_TIMEOUT: Duration = Duration::from_secs(30);

const SELECT_NOTE: &str =
    "SELECT id, content_type, content, created_at, updated_at FROM notes WHERE id = $1";

/// Note store on a direct PostgreSQL connection pool.
#[derive(Clone)]
pub struct PostgresNoteStore {
    pool: Pool,
}

impl PostgresNoteStore {
    /// Build a pool from a connection string. Connections are opened lazily.
    ///
    /// TLS follows the string's `sslmode` (default `prefer`).
    pub fn connect(database_url: &str) -> Result<Self> {
        let mut cfg = Config::new();
        cfg.url = Some(database_url.to_string());
        cfg.connect_timeout = Some(CONNECT_TIMEOUT);

        // Verified: run a liveness query before handing out a pooled
        // connection, since idle connections go stale.
        cfg.manager = Some(ManagerConfig {
            recycling_method: RecyclingMethod::Verified,
        });
        cfg.pool = Some(PoolConfig {
            max_size: POOL_MAX_SIZE,
            timeouts: Timeouts {
                wait: Some(POOL_WAIT_TIMEOUT),
                create: Some(CONNECT_TIMEOUT),
                recycle: Some(CONNECT_TIMEOUT),
            },
            ..PoolConfig::default()
        });

        let pool = cfg
            .create_pool(Some(Runtime::Tokio1), tls::connector()?)
            .map_err(|e| PhyslinkError::Config(format!("Failed to create pool: {}", e)))?;

        Ok(Self { pool })
    }

    /// Create the notes table if it does not exist.
    pub async fn ensure_schema(&self) -> Result<()> {
        let client = self.pool.get().await?;
        client
            .batch_execute(
                "CREATE TABLE IF NOT EXISTS notes (
                    id TEXT PRIMARY KEY,
                    content_type TEXT NOT NULL CHECK (content_type IN ('url', 'text', 'image')),
                    content TEXT NOT NULL,
                    created_at TIMESTAMPTZ NOT NULL,
                    updated_at TIMESTAMPTZ NOT NULL
                )",
            )
            .await?;
        Ok(())
    }
}

fn note_from_row(row: &Row) -> Result<Note> {
    let id: String = row.try_get("id")?;
    let content_type: String = row.try_get("content_type")?;
    let content_type: ContentType = content_type.parse().map_err(|_| {
        PhyslinkError::Storage(format!(
            "note {} has unknown content type '{}'",
            id, content_type
        ))
    })?;

    Ok(Note {
        id,
        content_type,
        content: row.try_get("content")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

#[async_trait]
impl NoteStore for PostgresNoteStore {
    async fn get(&self, id: &str) -> Result<Option<Note>> {
        let client = self.pool.get().await?;
        let row = client.query_opt(SELECT_NOTE, &[&id]).await?;
        row.as_ref().map(note_from_row).transpose()
    }

    async fn create(&self, id: &str, content_type: ContentType, content: String) -> Result<Note> {
        let note = Note::new(id, content_type, content)?;

        let client = self.pool.get().await?;
        client
            .execute(
                "INSERT INTO notes (id, content_type, content, created_at, updated_at)
                 VALUES ($1, $2, $3, $4, $5)",
                &[
                    &note.id,
                    &note.content_type.as_str(),
                    &note.content,
                    &note.created_at,
                    &note.updated_at,
                ],
            )
            .await
            .map_err(|e| {
                if e.code() == Some(&SqlState::UNIQUE_VIOLATION) {
                    PhyslinkError::NoteExists(id.to_string())
                } else {
                    PhyslinkError::from(e)
                }
            })?;

        Ok(note)
    }

    async fn update_text(&self, id: &str, content: String) -> Result<Note> {
        let client = self.pool.get().await?;
        let existing = client
            .query_opt(SELECT_NOTE, &[&id])
            .await?
            .as_ref()
            .map(note_from_row)
            .transpose()?;
        let updated = prepare_text_update(id, existing, content)?;

        let changed = client
            .execute(
                "UPDATE notes SET content = $2, updated_at = $3
                 WHERE id = $1 AND content_type = 'text'",
                &[&updated.id, &updated.content, &updated.updated_at],
            )
            .await?;
        if changed == 0 {
            return Err(PhyslinkError::NoteNotFound(id.to_string()));
        }

        Ok(updated)
    }
}
