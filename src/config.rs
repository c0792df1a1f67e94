//! Runtime configuration.
//!
//! Everything is read from the environment once at startup and passed
//! explicitly into the note store and blob store constructors.

use std::net::SocketAddr;
use std::path::PathBuf;

use crate::error::{PhyslinkError, Result};

/// Storage bucket used by the hosted blob store.
pub const STORAGE_BUCKET: &str = "physical-hyperlinks";

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_SQLITE_PATH: &str = "physical_hyperlinks.db";
pub const DEFAULT_STATIC_DIR: &str = "static";
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

/// Which note store backend to open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    Sqlite { path: PathBuf },
    Postgres { url: String },
    Hosted,
}

/// Credentials and endpoints for the hosted table + storage service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostedConfig {
    /// Service root, e.g. `https://xyz.supabase.co` (no trailing slash)
    pub url: String,
    /// Service API key, sent as `apikey` and bearer token
    pub key: String,
    pub bucket: String,
    /// Base for constructed public object URLs when resolution fails
    pub storage_base_url: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub environment: Environment,
    pub store: StoreBackend,
    pub hosted: Option<HostedConfig>,
    pub static_dir: PathBuf,
    pub bind_addr: SocketAddr,
}

impl Config {
    /// Load configuration from process environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    ///
    /// Empty values are treated as unset. Missing required values are fatal.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let environment = if get("VERCEL_ENV").is_some() {
            Environment::Production
        } else {
            Environment::Development
        };

        let hosted = match (get("SUPABASE_URL"), get("SUPABASE_KEY")) {
            (Some(url), Some(key)) => {
                let url = url.trim_end_matches('/').to_string();
                let storage_base_url = get("STORAGE_BASE_URL")
                    .map(|s| s.trim_end_matches('/').to_string())
                    .unwrap_or_else(|| format!("{}/storage/v1/object/public", url));
                Some(HostedConfig {
                    url,
                    key,
                    bucket: STORAGE_BUCKET.to_string(),
                    storage_base_url,
                })
            }
            (None, None) => None,
            _ => {
                return Err(PhyslinkError::Config(
                    "SUPABASE_URL and SUPABASE_KEY must be set together".to_string(),
                ))
            }
        };

        let store_name = get("NOTE_STORE").unwrap_or_else(|| match environment {
            Environment::Development => "sqlite".to_string(),
            Environment::Production => "hosted".to_string(),
        });

        let store = match store_name.as_str() {
            "sqlite" => StoreBackend::Sqlite {
                path: PathBuf::from(
                    get("SQLITE_PATH").unwrap_or_else(|| DEFAULT_SQLITE_PATH.to_string()),
                ),
            },
            "postgres" => StoreBackend::Postgres {
                url: get("DATABASE_URL").ok_or_else(|| {
                    PhyslinkError::Config(
                        "DATABASE_URL is required for the postgres note store".to_string(),
                    )
                })?,
            },
            "hosted" => {
                if hosted.is_none() {
                    return Err(PhyslinkError::Config(
                        "SUPABASE_URL and SUPABASE_KEY are required for the hosted note store"
                            .to_string(),
                    ));
                }
                StoreBackend::Hosted
            }
            other => {
                return Err(PhyslinkError::Config(format!(
                    "Invalid NOTE_STORE '{}'. Valid values: sqlite, postgres, hosted",
                    other
                )))
            }
        };

        // Production keeps uploads in hosted storage.
        if environment == Environment::Production && hosted.is_none() {
            return Err(PhyslinkError::Config(
                "SUPABASE_URL and SUPABASE_KEY must be set in production".to_string(),
            ));
        }

        let host = get("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = match get("PORT") {
            Some(p) => p
                .parse::<u16>()
                .map_err(|_| PhyslinkError::Config(format!("Invalid port value: {}", p)))?,
            None => DEFAULT_PORT,
        };
        let addr = format!("{}:{}", host, port);
        let bind_addr = addr
            .parse::<SocketAddr>()
            .map_err(|e| PhyslinkError::Config(format!("Invalid bind address {}: {}", addr, e)))?;

        Ok(Self {
            environment,
            store,
            hosted,
            static_dir: PathBuf::from(
                get("STATIC_DIR").unwrap_or_else(|| DEFAULT_STATIC_DIR.to_string()),
            ),
            bind_addr,
        })
    }

    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }
}

/// Resolve the base URL encoded into QR payloads.
///
/// Order: explicit value, `VERCEL_URL` (given a scheme if it lacks one),
/// `BASE_URL`, then the localhost fallback.
pub fn resolve_base_url<F>(explicit: Option<&str>, lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(url) = explicit.filter(|u| !u.trim().is_empty()) {
        return url.to_string();
    }
    if let Some(url) = get("VERCEL_URL") {
        return if url.contains("://") {
            url
        } else {
            format!("https://{}", url)
        };
    }
    get("BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
}
