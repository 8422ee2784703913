//! Supabase Storage HTTP Client Implementation
//!
//! Uploads objects with `POST {base_url}/storage/v1/object/{bucket}/{key}` and
//! returns the public object URL as the durable reference.

use crate::{object_key, AssetTransferService, DurableRef, StorageConfig, TransferError, UploadFile};

/// Real Supabase Storage client.
pub struct SupabaseStorageClient {
    http: reqwest::Client,
    base_url: String,
    service_key: String,
    bucket: String,
}

impl SupabaseStorageClient {
    pub fn new(config: StorageConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            service_key: config.service_key,
            bucket: config.bucket,
        }
    }

    fn upload_url(&self, key: &str) -> String {
        format!("{}/storage/v1/object/{}/{}", self.base_url, self.bucket, key)
    }

    fn public_url(&self, key: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.base_url, self.bucket, key
        )
    }
}

#[async_trait::async_trait]
impl AssetTransferService for SupabaseStorageClient {
    async fn transfer(
        &self,
        file: &UploadFile,
        namespace: &str,
    ) -> Result<DurableRef, TransferError> {
        let key = object_key(namespace, file)?;

        let response = self
            .http
            .post(self.upload_url(&key))
            .bearer_auth(&self.service_key)
            .header("apikey", &self.service_key)
            .header(reqwest::header::CONTENT_TYPE, &file.content_type)
            .header("x-upsert", "false")
            .body(file.bytes.clone())
            .send()
            .await
            .map_err(|e| TransferError::Request(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read response body".to_string());
            return Err(TransferError::Response(format!(
                "Supabase Storage returned {}: {}",
                status, body
            )));
        }

        tracing::debug!(key = %key, size = file.size(), "Asset stored");
        Ok(DurableRef(self.public_url(&key)))
    }
}
