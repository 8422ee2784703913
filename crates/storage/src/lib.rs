//! Bouquet Asset Storage
//!
//! Provides durable transfer of uploaded images with support for:
//! - Supabase Storage HTTP integration for production
//! - Mock transfer service for testing and development
//! - Content-addressed object keys under a caller-supplied namespace

pub mod mock;
pub mod supabase;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransferError {
    #[error("Storage configuration error: {0}")]
    Configuration(String),

    #[error("Invalid namespace: {0}")]
    Namespace(String),

    #[error("Storage request error: {0}")]
    Request(String),

    #[error("Storage response error: {0}")]
    Response(String),
}

impl From<TransferError> for bouquet_common::Error {
    fn from(err: TransferError) -> Self {
        bouquet_common::Error::Transfer(err.to_string())
    }
}

/// A local file picked by the user, not yet stored anywhere durable
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    pub fn new(name: impl Into<String>, content_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            content_type: content_type.into(),
            bytes,
        }
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    /// File extension derived from the content type
    pub fn extension(&self) -> &'static str {
        match self.content_type.as_str() {
            "image/jpeg" => "jpg",
            "image/png" => "png",
            "image/webp" => "webp",
            "image/gif" => "gif",
            _ => "bin",
        }
    }
}

/// Stable reference returned once a transfer completes
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DurableRef(pub String);

impl DurableRef {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for DurableRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Reject namespaces that would escape the bucket layout
pub fn validate_namespace(namespace: &str) -> Result<(), TransferError> {
    if namespace.is_empty() {
        return Err(TransferError::Namespace("namespace is empty".to_string()));
    }
    if namespace.starts_with('/') || namespace.ends_with('/') {
        return Err(TransferError::Namespace(format!(
            "namespace must not start or end with '/': {namespace}"
        )));
    }
    if namespace.split('/').any(|segment| segment.is_empty() || segment == "..") {
        return Err(TransferError::Namespace(format!(
            "namespace has an invalid segment: {namespace}"
        )));
    }
    Ok(())
}

/// Object key for `file` under `namespace`: `{namespace}/{digest}-{uuid}.{ext}`
pub fn object_key(namespace: &str, file: &UploadFile) -> Result<String, TransferError> {
    validate_namespace(namespace)?;
    Ok(format!(
        "{}/{}-{}.{}",
        namespace,
        bouquet_common::compute_hash_prefix(&file.bytes, 12),
        Uuid::new_v4().simple(),
        file.extension()
    ))
}

/// Storage service configuration
#[derive(Clone)]
pub struct StorageConfig {
    /// Storage provider (supabase, mock)
    pub provider: String,
    pub base_url: String,
    pub service_key: String,
    pub bucket: String,
}

impl std::fmt::Debug for StorageConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageConfig")
            .field("provider", &self.provider)
            .field("base_url", &self.base_url)
            .field("service_key", &"[REDACTED]")
            .field("bucket", &self.bucket)
            .finish()
    }
}

impl StorageConfig {
    /// Build storage config from the shared application config
    pub fn from_config(config: &bouquet_common::Config) -> Self {
        Self {
            provider: config.storage_provider.clone(),
            base_url: config.supabase_url.clone().unwrap_or_default(),
            service_key: config.supabase_service_role_key.clone().unwrap_or_default(),
            bucket: config.storage_bucket.clone(),
        }
    }
}

/// Durable storage for uploaded assets
#[async_trait::async_trait]
pub trait AssetTransferService: Send + Sync {
    /// Store `file` under `namespace` and return its durable reference.
    async fn transfer(&self, file: &UploadFile, namespace: &str)
        -> Result<DurableRef, TransferError>;
}

/// Factory for creating AssetTransferService implementations
pub struct StorageServiceFactory;

impl StorageServiceFactory {
    pub fn create(config: StorageConfig) -> Result<Box<dyn AssetTransferService>, TransferError> {
        match config.provider.as_str() {
            "supabase" => {
                tracing::info!(bucket = %config.bucket, "Creating Supabase storage service");
                if config.base_url.is_empty() || config.service_key.is_empty() {
                    return Err(TransferError::Configuration(
                        "SUPABASE_URL and SUPABASE_SERVICE_ROLE_KEY are required for Supabase storage"
                            .to_string(),
                    ));
                }
                Ok(Box::new(supabase::SupabaseStorageClient::new(config)))
            }
            "mock" => {
                tracing::info!("Creating mock storage service");
                Ok(Box::new(mock::MockTransferService::new()))
            }
            provider => Err(TransferError::Configuration(format!(
                "Unknown storage provider: {}. Supported providers: supabase, mock",
                provider
            ))),
        }
    }
}
