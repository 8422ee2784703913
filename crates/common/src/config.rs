//! Configuration management following 12-factor app principles
//!
//! All configuration is loaded from environment variables to ensure
//! clean separation between code and config.

use anyhow::Result;
use std::env;

/// Default upload ceiling (10 MiB)
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

#[derive(Clone)]
pub struct Config {
    /// Postgres connection URL; the in-memory store is used when absent
    pub database_url: Option<String>,

    /// Asset storage provider (supabase, mock)
    pub storage_provider: String,
    pub supabase_url: Option<String>,
    pub supabase_service_role_key: Option<String>,
    pub storage_bucket: String,

    /// Largest accepted image upload in bytes
    pub max_upload_bytes: u64,

    /// Runtime configuration
    pub rust_log: String,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field(
                "database_url",
                &self.database_url.as_ref().map(|_| "[REDACTED]"),
            )
            .field("storage_provider", &self.storage_provider)
            .field("supabase_url", &self.supabase_url)
            .field(
                "supabase_service_role_key",
                &self.supabase_service_role_key.as_ref().map(|_| "[REDACTED]"),
            )
            .field("storage_bucket", &self.storage_bucket)
            .field("max_upload_bytes", &self.max_upload_bytes)
            .field("rust_log", &self.rust_log)
            .finish()
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // Load .env file if it exists

        let storage_provider =
            env::var("STORAGE_PROVIDER").unwrap_or_else(|_| "mock".to_string());

        let supabase_url = env::var("SUPABASE_URL").ok();
        let supabase_service_role_key = env::var("SUPABASE_SERVICE_ROLE_KEY").ok();

        if storage_provider == "supabase" {
            if supabase_url.is_none() {
                return Err(anyhow::anyhow!(
                    "SUPABASE_URL is required for the supabase storage provider"
                ));
            }
            if supabase_service_role_key.is_none() {
                return Err(anyhow::anyhow!(
                    "SUPABASE_SERVICE_ROLE_KEY is required for the supabase storage provider"
                ));
            }
        }

        let max_upload_bytes = match env::var("MAX_UPLOAD_BYTES") {
            Ok(raw) => raw
                .parse()
                .map_err(|_| anyhow::anyhow!("MAX_UPLOAD_BYTES must be a byte count: {raw}"))?,
            Err(_) => DEFAULT_MAX_UPLOAD_BYTES,
        };

        let config = Self {
            database_url: env::var("DATABASE_URL").ok().filter(|url| !url.is_empty()),
            storage_provider,
            supabase_url,
            supabase_service_role_key,
            storage_bucket: env::var("STORAGE_BUCKET")
                .unwrap_or_else(|_| "invitations".to_string()),
            max_upload_bytes,
            rust_log: env::var("RUST_LOG").unwrap_or_else(|_| "bouquet=info".to_string()),
        };

        Ok(config)
    }
}
