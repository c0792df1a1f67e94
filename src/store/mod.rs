//! Note persistence.
//!
//! Every backend honours the same contract: lookups of unknown identifiers
//! return `Ok(None)`, creation is insert-or-fail, and only text notes can be
//! updated.

mod hosted;
mod postgres;
mod sqlite;
mod tls;

pub use hosted::HostedNoteStore;
pub use postgres::PostgresNoteStore;
pub use sqlite::SqliteNoteStore;

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::{Config, StoreBackend};
use crate::entity::{ContentType, Note};
use crate::error::{PhyslinkError, Result};
use crate::hosted::HostedClient;

pub const NOTES_TABLE: &str = "notes";

#[async_trait]
pub trait NoteStore: Send + Sync {
    /// Look up a note by exact identifier.
    async fn get(&self, id: &str) -> Result<Option<Note>>;

    /// Create a note. Fails with `NoteExists` if the identifier is taken.
    async fn create(&self, id: &str, content_type: ContentType, content: String) -> Result<Note>;

    /// Replace the content of a text note.
    async fn update_text(&self, id: &str, content: String) -> Result<Note>;
}

/// Open the note store selected by the configuration.
pub async fn open(config: &Config) -> Result<Arc<dyn NoteStore>> {
    match &config.store {
        StoreBackend::Sqlite { path } => {
            tracing::info!(path = %path.display(), "using SQLite note store");
            Ok(Arc::new(SqliteNoteStore::open(path)?))
        }
        StoreBackend::Postgres { url } => {
            tracing::info!("using PostgreSQL note store");
            let store = PostgresNoteStore::connect(url)?;
            if !config.is_production() {
                store.ensure_schema().await?;
            }
            Ok(Arc::new(store))
        }
        StoreBackend::Hosted => {
            let hosted = config.hosted.as_ref().ok_or_else(|| {
                PhyslinkError::Config("hosted note store requires SUPABASE_URL and SUPABASE_KEY".to_string())
            })?;
            tracing::info!(url = %hosted.url, "using hosted note store");
            Ok(Arc::new(HostedNoteStore::new(HostedClient::new(hosted)?)))
        }
    }
}

/// Apply a text update to a looked-up note, shared by all backends.
pub(crate) fn prepare_text_update(id: &str, existing: Option<Note>, content: String) -> Result<Note> {
    existing
        .ok_or_else(|| PhyslinkError::NoteNotFound(id.to_string()))?
        .with_text(content)
}
