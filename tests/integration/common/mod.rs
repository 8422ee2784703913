//! Common test utilities and fixtures for integration tests
//!
//! Sessions run against the in-memory invitation store and the mock transfer
//! service so failures and slow uploads can be scripted. The Postgres store
//! tests read `TEST_DATABASE_URL` and are skipped when it is unset.

#![allow(dead_code)]

use std::env;
use std::sync::{Arc, Once};

use bouquet_app::Services;
use bouquet_auth::{Actor, ActorProfile};
use bouquet_common::config::{Config, DEFAULT_MAX_UPLOAD_BYTES};
use bouquet_invitations::{InMemoryInvitationStore, InvitationRecord};
use bouquet_storage::mock::MockTransferService;
use bouquet_storage::UploadFile;
use uuid::Uuid;

static INIT: Once = Once::new();

/// Test environment configuration
#[derive(Debug, Clone)]
pub struct TestConfig {
    pub database_url: Option<String>,
}

impl TestConfig {
    pub fn from_env() -> Self {
        INIT.call_once(|| {
            dotenvy::from_filename(".env.test").ok();
            dotenvy::dotenv().ok();
        });

        Self {
            database_url: env::var("TEST_DATABASE_URL").ok(),
        }
    }
}

/// One app instance wired to scriptable collaborators
pub struct TestSession {
    pub services: Services,
    pub store: InMemoryInvitationStore,
    pub storage: MockTransferService,
    pub owner: Actor,
    pub admin: Actor,
}

impl TestSession {
    pub fn new() -> Self {
        let store = InMemoryInvitationStore::new();
        let storage = MockTransferService::new();
        let config = Config {
            database_url: None,
            storage_provider: "mock".to_string(),
            supabase_url: None,
            supabase_service_role_key: None,
            storage_bucket: "invitations".to_string(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            rust_log: "bouquet=debug".to_string(),
        };

        Self {
            services: Services::assemble(
                Arc::new(store.clone()),
                Arc::new(storage.clone()),
                &config,
            ),
            store,
            storage,
            owner: complete_owner(),
            admin: Actor::admin(Uuid::new_v4()),
        }
    }

    /// Draft invitation saved by the session owner
    pub async fn draft(&self, slug: &str) -> InvitationRecord {
        self.services
            .workflow
            .save_content(
                &self.owner,
                slug,
                serde_json::json!({"groom": "Lee Minho", "bride": "Kim Jisoo"}),
            )
            .await
            .expect("draft should save")
    }

    /// Wait until the mock storage has seen `count` transfers
    pub async fn transfers_started(&self, count: usize) {
        while self.storage.recorded_transfers().len() < count {
            tokio::task::yield_now().await;
        }
    }
}

pub fn complete_owner() -> Actor {
    Actor::owner(Uuid::new_v4()).with_profile(ActorProfile::new("Kim Jisoo", "010-1234-5678"))
}

pub fn jpeg(name: &str) -> UploadFile {
    UploadFile::new(name, "image/jpeg", vec![0xff, 0xd8, 0xff, 0xe0, 0x00, 0x10])
}

pub fn jpegs(prefix: &str, count: usize) -> Vec<UploadFile> {
    (0..count).map(|i| jpeg(&format!("{prefix}-{i}.jpg"))).collect()
}
