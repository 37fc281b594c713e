//! Attachment Storage
//!
//! Uploads document and decision attachments to S3-compatible managed
//! storage and hands back the public URL saved on the record.

use aws_config::Region;
use aws_sdk_s3::{
    config::{Credentials, IdentityCache, SharedCredentialsProvider, StalledStreamProtectionConfig},
    primitives::ByteStream,
    Client,
};
use serde::{Deserialize, Serialize};
use tracing::{error, info};
use uuid::Uuid;

use crate::config::Config;
use crate::error::{ClientError, ClientResult};

/// Location of an uploaded object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredObject {
    /// Object key inside the bucket.
    pub key: String,
    /// Public URL to store on the record.
    pub url: String,
}

/// S3 client wrapper for attachments.
#[derive(Clone)]
pub struct StorageClient {
    client: Client,
    bucket: String,
    public_base: String,
    max_upload_size: usize,
}

impl StorageClient {
    /// Create a storage client from configuration.
    ///
    /// Requires `STORAGE_ENDPOINT`. Uses path-style addressing, which most
    /// S3-compatible backends expect.
    pub fn new(config: &Config) -> ClientResult<Self> {
        let endpoint = config
            .storage_endpoint
            .as_deref()
            .ok_or_else(|| ClientError::Storage("storage endpoint not configured".into()))?;
        let public_base = config
            .public_base_url()
            .unwrap_or(endpoint)
            .to_string();

        let mut builder = aws_sdk_s3::Config::builder()
            .region(Region::new(config.storage_region.clone()))
            .stalled_stream_protection(StalledStreamProtectionConfig::disabled())
            .identity_cache(IdentityCache::no_cache())
            .endpoint_url(endpoint)
            .force_path_style(true);

        if let (Ok(access_key), Ok(secret_key)) = (
            std::env::var("STORAGE_ACCESS_KEY_ID"),
            std::env::var("STORAGE_SECRET_ACCESS_KEY"),
        ) {
            let credentials = Credentials::new(access_key, secret_key, None, None, "environment");
            builder = builder.credentials_provider(SharedCredentialsProvider::new(credentials));
        }

        info!(
            bucket = %config.storage_bucket,
            endpoint,
            "Storage client initialized"
        );

        Ok(Self {
            client: Client::from_conf(builder.build()),
            bucket: config.storage_bucket.clone(),
            public_base,
            max_upload_size: config.max_upload_size,
        })
    }

    /// Upload `data` under `folder` and return its key and public URL.
    ///
    /// Empty files and files over the configured limit are rejected before
    /// any request is made.
    pub async fn upload(
        &self,
        folder: &str,
        file_name: &str,
        data: Vec<u8>,
    ) -> ClientResult<StoredObject> {
        check_size(data.len(), self.max_upload_size)?;

        let key = object_key(folder, file_name, Uuid::now_v7());
        let content_type = mime_guess::from_path(file_name)
            .first_or_octet_stream()
            .to_string();
        let size = data.len();

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .body(ByteStream::from(data))
            .content_type(&content_type)
            .send()
            .await
            .map_err(|e| {
                error!(key = %key, error = %e, "Failed to upload attachment");
                ClientError::Storage(format!("Failed to upload file: {e}"))
            })?;

        info!(key = %key, size, content_type = %content_type, "Attachment uploaded");
        let url = public_url(&self.public_base, &self.bucket, &key);
        Ok(StoredObject { key, url })
    }

    /// Delete an object by key.
    pub async fn delete(&self, key: &str) -> ClientResult<()> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                error!(key, error = %e, "Failed to delete attachment");
                ClientError::Storage(format!("Failed to delete file: {e}"))
            })?;

        info!(key, "Attachment deleted");
        Ok(())
    }

    /// Recover the object key from a URL returned by [`Self::upload`].
    pub fn object_key_from_url(&self, url: &str) -> Option<String> {
        object_key_from_url(&self.public_base, &self.bucket, url)
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }
}

fn check_size(size: usize, max: usize) -> ClientResult<()> {
    if size == 0 {
        return Err(ClientError::Storage("File is empty".into()));
    }
    if size > max {
        return Err(ClientError::Storage(format!(
            "File too large: {size} bytes (max {max})"
        )));
    }
    Ok(())
}

/// Strip directory components and anything outside `[A-Za-z0-9._-]`.
///
/// Falls back to `file` when nothing usable remains.
pub fn sanitize_file_name(file_name: &str) -> String {
    let name = std::path::Path::new(file_name)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("");

    let cleaned: String = name
        .chars()
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'))
        .take(255)
        .collect();

    if cleaned.trim_matches('.').is_empty() {
        "file".to_string()
    } else {
        cleaned
    }
}

/// `{folder}/{id}-{sanitized name}`.
pub fn object_key(folder: &str, file_name: &str, id: Uuid) -> String {
    let folder = folder.trim_matches('/');
    let name = sanitize_file_name(file_name);
    if folder.is_empty() {
        format!("{id}-{name}")
    } else {
        format!("{folder}/{id}-{name}")
    }
}

/// Public URL of `key` under a path-style base.
pub fn public_url(base: &str, bucket: &str, key: &str) -> String {
    format!("{}/{bucket}/{key}", base.trim_end_matches('/'))
}

/// Inverse of [`public_url`]. `None` for URLs outside `base`/`bucket`.
pub fn object_key_from_url(base: &str, bucket: &str, url: &str) -> Option<String> {
    let prefix = format!("{}/{bucket}/", base.trim_end_matches('/'));
    let key = url.strip_prefix(&prefix)?;
    let key = key.split(['?', '#']).next().unwrap_or_default();
    if key.is_empty() {
        None
    } else {
        Some(key.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_file_name() {
        assert_eq!(sanitize_file_name("report.pdf"), "report.pdf");
        assert_eq!(sanitize_file_name("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_file_name("quyet dinh 12.docx"), "quyet_dinh_12.docx");
        assert_eq!(sanitize_file_name("test<script>.png"), "testscript.png");
    }

    #[test]
    fn test_sanitize_falls_back_for_unusable_names() {
        assert_eq!(sanitize_file_name(""), "file");
        assert_eq!(sanitize_file_name("công"), "cng");
        assert_eq!(sanitize_file_name("văn"), "vn");
        assert_eq!(sanitize_file_name("ả"), "file");
    }

    #[test]
    fn test_object_key_layout() {
        let id = Uuid::nil();
        assert_eq!(
            object_key("cong-van/", "CV 01.pdf", id),
            "cong-van/00000000-0000-0000-0000-000000000000-CV_01.pdf"
        );
        assert_eq!(
            object_key("", "a.pdf", id),
            "00000000-0000-0000-0000-000000000000-a.pdf"
        );
    }

    #[test]
    fn test_url_and_key_are_inverse() {
        let url = public_url("https://files.example.com/", "attachments", "rewards/x-a.pdf");
        assert_eq!(url, "https://files.example.com/attachments/rewards/x-a.pdf");
        assert_eq!(
            object_key_from_url("https://files.example.com", "attachments", &url).as_deref(),
            Some("rewards/x-a.pdf")
        );
    }

    #[test]
    fn test_foreign_url_has_no_key() {
        assert_eq!(
            object_key_from_url("https://files.example.com", "attachments", "https://other.example.com/attachments/a.pdf"),
            None
        );
        assert_eq!(
            object_key_from_url("https://files.example.com", "attachments", "https://files.example.com/attachments/"),
            None
        );
        assert_eq!(
            object_key_from_url("https://files.example.com", "attachments", "https://files.example.com/attachments/a.pdf?v=2")
                .as_deref(),
            Some("a.pdf")
        );
    }

    #[test]
    fn test_size_limits() {
        assert!(check_size(10, 10).is_ok());
        assert!(matches!(check_size(11, 10), Err(ClientError::Storage(_))));
        assert!(matches!(check_size(0, 10), Err(ClientError::Storage(_))));
    }

    #[tokio::test]
    async fn test_new_requires_endpoint() {
        assert!(StorageClient::new(&Config::default_for_test()).is_err());

        let config = Config {
            storage_endpoint: Some("http://127.0.0.1:9000".into()),
            ..Config::default_for_test()
        };
        let client = StorageClient::new(&config).unwrap();
        assert_eq!(client.bucket(), "test-bucket");
        assert_eq!(
            client
                .object_key_from_url("http://127.0.0.1:9000/test-bucket/cong-van/a.pdf")
                .as_deref(),
            Some("cong-van/a.pdf")
        );
    }
}
