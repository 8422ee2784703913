//! Domain entities for the Assets domain

use bouquet_common::config::DEFAULT_MAX_UPLOAD_BYTES;
use bouquet_common::{Config, Error, Result};
use bouquet_storage::{DurableRef, UploadFile};
use serde::{Deserialize, Serialize};

/// Content types accepted for invitation images
pub const ALLOWED_IMAGE_TYPES: [&str; 4] = ["image/jpeg", "image/png", "image/webp", "image/gif"];

/// What an image field currently shows
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "url", rename_all = "snake_case")]
pub enum AssetRef {
    /// Local preview, gone once the upload settles
    Ephemeral(String),
    Durable(DurableRef),
}

impl AssetRef {
    pub fn as_str(&self) -> &str {
        match self {
            AssetRef::Ephemeral(url) => url,
            AssetRef::Durable(durable) => durable.as_str(),
        }
    }

    pub fn is_durable(&self) -> bool {
        matches!(self, AssetRef::Durable(_))
    }

    pub fn durable(&self) -> Option<&DurableRef> {
        match self {
            AssetRef::Durable(durable) => Some(durable),
            AssetRef::Ephemeral(_) => None,
        }
    }
}

impl From<DurableRef> for AssetRef {
    fn from(durable: DurableRef) -> Self {
        AssetRef::Durable(durable)
    }
}

/// Upload acceptance rules, checked before any side effect
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageRules {
    pub max_bytes: u64,
}

impl Default for ImageRules {
    fn default() -> Self {
        Self {
            max_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

impl ImageRules {
    pub fn new(max_bytes: u64) -> Self {
        Self { max_bytes }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.max_upload_bytes)
    }

    pub fn validate(&self, file: &UploadFile) -> Result<()> {
        if file.bytes.is_empty() {
            return Err(Error::Validation(format!("{} is empty", file.name)));
        }
        if !ALLOWED_IMAGE_TYPES.contains(&file.content_type.as_str()) {
            return Err(Error::Validation(format!(
                "{} is not a supported image ({}). Use JPEG, PNG, WebP or GIF.",
                file.name, file.content_type
            )));
        }
        if file.size() > self.max_bytes {
            return Err(Error::Validation(format!(
                "{} is {} bytes; the limit is {} bytes",
                file.name,
                file.size(),
                self.max_bytes
            )));
        }
        Ok(())
    }
}
