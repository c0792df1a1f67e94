//! Uploaded image storage.

mod hosted;
mod local;

pub use hosted::HostedBlobStore;
pub use local::LocalBlobStore;

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;

use crate::config::Config;
use crate::error::{PhyslinkError, Result};
use crate::hosted::HostedClient;

pub const UPLOADS_DIR: &str = "uploads";
const MAX_EXTENSION_LEN: usize = 8;

#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store an upload for a note and return a URL the browser can load.
    ///
    /// Uploads for the same owner share a filename; the last write wins.
    async fn save(
        &self,
        bytes: &[u8],
        filename_hint: &str,
        mime: Option<&str>,
        owner_id: &str,
    ) -> Result<String>;
}

/// Open the blob store for the configured environment: local disk in
/// development, hosted storage in production.
pub fn open(config: &Config) -> Result<Arc<dyn BlobStore>> {
    if config.is_production() {
        let hosted = config.hosted.as_ref().ok_or_else(|| {
            PhyslinkError::Config("hosted storage requires SUPABASE_URL and SUPABASE_KEY".to_string())
        })?;
        tracing::info!(bucket = %hosted.bucket, "using hosted blob store");
        Ok(Arc::new(HostedBlobStore::new(
            HostedClient::new(hosted)?,
            hosted.bucket.clone(),
            hosted.storage_base_url.clone(),
        )))
    } else {
        tracing::info!(dir = %config.static_dir.join(UPLOADS_DIR).display(), "using local blob store");
        Ok(Arc::new(LocalBlobStore::new(&config.static_dir)))
    }
}

/// Stored filename: the owner id plus the upload's extension, if sane.
pub fn stored_filename(owner_id: &str, filename_hint: &str) -> String {
    let extension = Path::new(filename_hint)
        .extension()
        .and_then(|e| e.to_str())
        .filter(|e| {
            !e.is_empty()
                && e.len() <= MAX_EXTENSION_LEN
                && e.chars().all(|c| c.is_ascii_alphanumeric())
        });

    match extension {
        Some(ext) => format!("{}.{}", owner_id, ext.to_ascii_lowercase()),
        None => owner_id.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stored_filename_keeps_extension() {
        assert_eq!(stored_filename("abc", "photo.PNG"), "abc.png");
        assert_eq!(stored_filename("abc", "archive.tar.gz"), "abc.gz");
    }

    #[test]
    fn test_stored_filename_drops_odd_extensions() {
        assert_eq!(stored_filename("abc", "noext"), "abc");
        assert_eq!(stored_filename("abc", ""), "abc");
        assert_eq!(stored_filename("abc", "x.ver$ion"), "abc");
        assert_eq!(stored_filename("abc", "x.waytoolongext"), "abc");
    }

    #[test]
    fn test_stored_filename_ignores_hint_directories() {
        assert_eq!(stored_filename("abc", "../../etc/passwd.jpg"), "abc.jpg");
    }
}
