//! Client Configuration
//!
//! Loads configuration from environment variables.

use anyhow::{Context, Result};
use std::env;
use std::time::Duration;

/// Client configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the hosted backend (e.g., `https://xyz.example.co`)
    pub data_api_url: String,

    /// Public (anon) API key sent with every data API request
    pub data_api_key: String,

    /// HTTP request timeout in seconds (default: 30)
    pub http_timeout_secs: u64,

    /// Name of the permission table (default: `permissions`)
    pub permissions_table: String,

    /// S3-compatible storage endpoint
    pub storage_endpoint: Option<String>,

    /// Storage bucket for attachments
    pub storage_bucket: String,

    /// Base URL under which stored objects are publicly readable
    pub storage_public_url: Option<String>,

    /// Storage region (default: us-east-1)
    pub storage_region: String,

    /// Maximum attachment size in bytes (default: 20MB)
    pub max_upload_size: usize,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// A `.env` file in the working directory is read first when present.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Self {
            data_api_url: env::var("DATA_API_URL").context("DATA_API_URL must be set")?,
            data_api_key: env::var("DATA_API_KEY").context("DATA_API_KEY must be set")?,
            http_timeout_secs: env::var("HTTP_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(30),
            permissions_table: env::var("PERMISSIONS_TABLE")
                .unwrap_or_else(|_| "permissions".into()),
            storage_endpoint: env::var("STORAGE_ENDPOINT").ok(),
            storage_bucket: env::var("STORAGE_BUCKET").unwrap_or_else(|_| "attachments".into()),
            storage_public_url: env::var("STORAGE_PUBLIC_URL").ok(),
            storage_region: env::var("STORAGE_REGION").unwrap_or_else(|_| "us-east-1".into()),
            max_upload_size: env::var("MAX_UPLOAD_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(20 * 1024 * 1024), // 20MB
        })
    }

    /// HTTP timeout as a `Duration`.
    #[must_use]
    pub const fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    /// Check if object storage is configured.
    #[must_use]
    pub const fn has_storage(&self) -> bool {
        self.storage_endpoint.is_some()
    }

    /// Base URL for public object links, falling back to the storage endpoint.
    #[must_use]
    pub fn public_base_url(&self) -> Option<&str> {
        self.storage_public_url
            .as_deref()
            .or(self.storage_endpoint.as_deref())
            .map(|u| u.trim_end_matches('/'))
    }

    /// Create a default configuration for testing.
    #[must_use]
    pub fn default_for_test() -> Self {
        Self {
            data_api_url: "http://127.0.0.1:54321".into(),
            data_api_key: "test-anon-key".into(),
            http_timeout_secs: 5,
            permissions_table: "permissions".into(),
            storage_endpoint: None,
            storage_bucket: "test-bucket".into(),
            storage_public_url: None,
            storage_region: "us-east-1".into(),
            max_upload_size: 1024 * 1024,
        }
    }
}
