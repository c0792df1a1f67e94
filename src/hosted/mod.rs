//! Client for the hosted table + storage service (PostgREST and Storage APIs).

use reqwest::{Method, RequestBuilder, Response};

use crate::config::HostedConfig;
use crate::error::{PhyslinkError, Result};

/// Connect timeout for hosted-service requests.
const CONNECT_TIMEOUT_SECS: u64 = 60;

/// Authenticated HTTP client shared by the hosted note and blob stores.
#[derive(Clone)]
pub struct HostedClient {
    http: reqwest::Client,
    base_url: String,
    key: String,
}

impl HostedClient {
    pub fn new(config: &HostedConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .connect_timeout(std::time::Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .build()?;
        Ok(Self {
            http,
            base_url: config.url.trim_end_matches('/').to_string(),
            key: config.key.clone(),
        })
    }

    /// `{base}/rest/v1/{table}`
    pub fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    /// `{base}/storage/v1/{path}`
    pub fn storage_url(&self, path: &str) -> String {
        format!("{}/storage/v1/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Start a request carrying the service credentials.
    pub fn request(&self, method: Method, url: &str) -> RequestBuilder {
        self.http
            .request(method, url)
            .header("apikey", &self.key)
            .bearer_auth(&self.key)
    }
}

/// Turn a non-success response into `PhyslinkError::Hosted`.
pub async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = response.text().await.unwrap_or_default();
    Err(PhyslinkError::Hosted {
        status: status.as_u16(),
        message,
    })
}

/// Local stand-in for the hosted service, for tests.
#[cfg(test)]
pub(crate) mod testing {
    use axum::Router;

    use super::HostedClient;
    use crate::config::HostedConfig;

    pub const TEST_KEY: &str = "secret";

    /// Serve `app` on an ephemeral loopback port and return a client for it.
    pub async fn serve(app: Router) -> (HostedClient, String) {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let client = HostedClient::new(&HostedConfig {
            url: base_url.clone(),
            key: TEST_KEY.to_string(),
            bucket: "b".to_string(),
            storage_base_url: "https://cdn.example.com".to_string(),
        })
        .unwrap();
        (client, base_url)
    }
}
