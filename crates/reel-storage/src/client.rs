//! S3-compatible store client implementation.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_credential_types::Credentials;
use aws_sdk_s3::config::{Builder, Region};
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use tracing::{debug, info};

use reel_models::RunId;

use crate::error::{StorageError, StorageResult};

/// Object key for a run's finished film.
pub fn film_key(run_id: &RunId) -> String {
    format!("{}/film.mp4", run_id)
}

/// Configuration for the artifact store.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// S3 API endpoint URL
    pub endpoint_url: String,
    /// Access key ID
    pub access_key_id: String,
    /// Secret access key
    pub secret_access_key: String,
    /// Bucket name
    pub bucket_name: String,
    /// Region ("auto" for R2-style deployments)
    pub region: String,
}

impl StoreConfig {
    /// Create config from environment variables.
    pub fn from_env() -> StorageResult<Self> {
        Ok(Self {
            endpoint_url: std::env::var("STORE_ENDPOINT_URL")
                .map_err(|_| StorageError::config_error("STORE_ENDPOINT_URL not set"))?,
            access_key_id: std::env::var("STORE_ACCESS_KEY_ID")
                .map_err(|_| StorageError::config_error("STORE_ACCESS_KEY_ID not set"))?,
            secret_access_key: std::env::var("STORE_SECRET_ACCESS_KEY")
                .map_err(|_| StorageError::config_error("STORE_SECRET_ACCESS_KEY not set"))?,
            bucket_name: std::env::var("STORE_BUCKET_NAME")
                .map_err(|_| StorageError::config_error("STORE_BUCKET_NAME not set"))?,
            region: std::env::var("STORE_REGION").unwrap_or_else(|_| "auto".to_string()),
        })
    }
}

/// Store operations the pipeline depends on.
///
/// Trait seam so phase drivers can run against an in-memory double.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Upload bytes under the given key.
    async fn put_bytes(&self, key: &str, data: Vec<u8>, content_type: &str) -> StorageResult<()>;

    /// Generate a time-limited signed GET URL for the given key.
    async fn presign_get(&self, key: &str, expires_in: Duration) -> StorageResult<String>;
}

/// S3-compatible artifact store client.
#[derive(Clone)]
pub struct ArtifactStore {
    client: Client,
    bucket: String,
}

impl ArtifactStore {
    /// Create a new store client from configuration.
    pub async fn new(config: StoreConfig) -> StorageResult<Self> {
        let credentials = Credentials::new(
            &config.access_key_id,
            &config.secret_access_key,
            None,
            None,
            "storyreel",
        );

        let sdk_config = Builder::new()
            .behavior_version(BehaviorVersion::latest())
            .endpoint_url(&config.endpoint_url)
            .region(Region::new(config.region))
            .credentials_provider(credentials)
            .force_path_style(true)
            .build();

        let client = Client::from_conf(sdk_config);

        Ok(Self {
            client,
            bucket: config.bucket_name,
        })
    }

    /// Create from environment variables.
    pub async fn from_env() -> StorageResult<Self> {
        let config = StoreConfig::from_env()?;
        Self::new(config).await
    }

    /// Upload a file from disk.
    pub async fn upload_file(
        &self,
        path: impl AsRef<Path>,
        key: &str,
        content_type: &str,
    ) -> StorageResult<()> {
        let path = path.as_ref();
        debug!("Uploading {} to {}", path.display(), key);

        let body = ByteStream::from_path(path)
            .await
            .map_err(|e| StorageError::upload_failed(e.to_string()))?;

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(body)
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| StorageError::upload_failed(e.to_string()))?;

        info!("Uploaded {} to {}", path.display(), key);
        Ok(())
    }
}

#[async_trait]
impl ObjectStore for ArtifactStore {
    async fn put_bytes(&self, key: &str, data: Vec<u8>, content_type: &str) -> StorageResult<()> {
        debug!("Uploading {} bytes to {}", data.len(), key);

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(data))
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| StorageError::upload_failed(e.to_string()))?;

        Ok(())
    }

    async fn presign_get(&self, key: &str, expires_in: Duration) -> StorageResult<String> {
        let presign_config = PresigningConfig::expires_in(expires_in)
            .map_err(|e| StorageError::PresignFailed(e.to_string()))?;

        let presigned = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .presigned(presign_config)
            .await
            .map_err(|e| StorageError::PresignFailed(e.to_string()))?;

        Ok(presigned.uri().to_string())
    }
}
