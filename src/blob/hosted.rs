use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use serde_json::json;

use super::{stored_filename, BlobStore};
use crate::error::{PhyslinkError, Result};
use crate::hosted::{check_status, HostedClient};

const DEFAULT_MIME: &str = "application/octet-stream";

/// Stores uploads in a hosted storage bucket.
pub struct HostedBlobStore {
    client: HostedClient,
    bucket: String,
    storage_base_url: String,
    bucket_ready: AtomicBool,
}

impl HostedBlobStore {
    pub fn new(client: HostedClient, bucket: String, storage_base_url: String) -> Self {
        Self {
            client,
            bucket,
            storage_base_url: storage_base_url.trim_end_matches('/').to_string(),
            bucket_ready: AtomicBool::new(false),
        }
    }

    /// URL used when the service cannot confirm the public URL.
    pub fn fallback_url(&self, filename: &str) -> String {
        format!("{}/{}/{}", self.storage_base_url, self.bucket, filename)
    }

    fn public_url(&self, filename: &str) -> String {
        self.client
            .storage_url(&format!("object/public/{}/{}", self.bucket, filename))
    }

    /// Create the bucket if the lookup says it does not exist.
    async fn ensure_bucket(&self) -> Result<()> {
        if self.bucket_ready.load(Ordering::Acquire) {
            return Ok(());
        }

        let lookup = self
            .client
            .request(
                Method::GET,
                &self.client.storage_url(&format!("bucket/{}", self.bucket)),
            )
            .send()
            .await?;

        let status = lookup.status();
        if !status.is_success() {
            let body = lookup.text().await.unwrap_or_default();
            if !is_not_found(status, &body) {
                return Err(PhyslinkError::Hosted {
                    status: status.as_u16(),
                    message: body,
                });
            }

            tracing::info!(bucket = %self.bucket, "creating storage bucket");
            let response = self
                .client
                .request(Method::POST, &self.client.storage_url("bucket"))
                .json(&json!({ "id": self.bucket, "name": self.bucket, "public": true }))
                .send()
                .await?;
            check_status(response).await?;
        }

        self.bucket_ready.store(true, Ordering::Release);
        Ok(())
    }

    async fn resolve_url(&self, filename: &str) -> String {
        let url = self.public_url(filename);
        match self.client.request(Method::HEAD, &url).send().await {
            Ok(response) if response.status().is_success() => url,
            Ok(response) => {
                tracing::warn!(status = %response.status(), %filename, "public URL not reachable, using fallback");
                self.fallback_url(filename)
            }
            Err(e) => {
                tracing::warn!(error = %e, %filename, "public URL resolution failed, using fallback");
                self.fallback_url(filename)
            }
        }
    }
}

/// The storage API answers a missing bucket with 404, or 400 and a
/// "not found" message.
fn is_not_found(status: StatusCode, body: &str) -> bool {
    status == StatusCode::NOT_FOUND
        || (status == StatusCode::BAD_REQUEST && body.to_ascii_lowercase().contains("not found"))
}

#[async_trait]
impl BlobStore for HostedBlobStore {
    async fn save(
        &self,
        bytes: &[u8],
        filename_hint: &str,
        mime: Option<&str>,
        owner_id: &str,
    ) -> Result<String> {
        self.ensure_bucket().await?;

        let filename = stored_filename(owner_id, filename_hint);
        let response = self
            .client
            .request(
                Method::POST,
                &self
                    .client
                    .storage_url(&format!("object/{}/{}", self.bucket, filename)),
            )
            .header(reqwest::header::CONTENT_TYPE, mime.unwrap_or(DEFAULT_MIME))
            .header("x-upsert", "true")
            .body(bytes.to_vec())
            .send()
            .await?;
        check_status(response).await?;
        tracing::debug!(%filename, size = bytes.len(), "uploaded to hosted storage");

        Ok(self.resolve_url(&filename).await)
    }
}
