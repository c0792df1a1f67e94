use std::path::{Path, PathBuf};

use async_trait::async_trait;

use super::{stored_filename, BlobStore, UPLOADS_DIR};
use crate::error::Result;

/// Writes uploads under the static root so the static mount serves them.
pub struct LocalBlobStore {
    dir: PathBuf,
}

impl LocalBlobStore {
    pub fn new(static_dir: &Path) -> Self {
        Self {
            dir: static_dir.join(UPLOADS_DIR),
        }
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    async fn save(
        &self,
        bytes: &[u8],
        filename_hint: &str,
        _mime: Option<&str>,
        owner_id: &str,
    ) -> Result<String> {
        let filename = stored_filename(owner_id, filename_hint);

        tokio::fs::create_dir_all(&self.dir).await?;
        tokio::fs::write(self.dir.join(&filename), bytes).await?;
        tracing::debug!(%filename, size = bytes.len(), "stored upload on disk");

        Ok(format!("/static/{}/{}", UPLOADS_DIR, filename))
    }
}
