//! Bouquet application composition root
//!
//! Wires the persistence and storage collaborators chosen by `Config` into
//! the workflow, dashboard coordinator and asset pipeline.

use std::sync::Arc;

use bouquet_assets::{ImageRules, PipelineContext};
use bouquet_auth::Actor;
use bouquet_common::{Config, NoticeBus};
use bouquet_invitations::{
    ActionCoordinator, ApprovalWorkflow, InMemoryInvitationStore, InvitationStore,
    PgInvitationStore,
};
use bouquet_storage::{AssetTransferService, StorageConfig, StorageServiceFactory};
use sqlx::PgPool;

/// Collaborators shared by every session of the process
#[derive(Clone)]
pub struct Services {
    pub store: Arc<dyn InvitationStore>,
    pub workflow: ApprovalWorkflow,
    pub transfer: Arc<dyn AssetTransferService>,
    pub notices: NoticeBus,
    pub rules: ImageRules,
}

impl Services {
    /// Build services from configuration, connecting and migrating Postgres
    /// when `DATABASE_URL` is set
    pub async fn from_config(config: &Config) -> Result<Self, anyhow::Error> {
        let store = create_store(config).await?;
        let transfer = StorageServiceFactory::create(StorageConfig::from_config(config))?;
        Ok(Self::assemble(store, Arc::from(transfer), config))
    }

    pub fn assemble(
        store: Arc<dyn InvitationStore>,
        transfer: Arc<dyn AssetTransferService>,
        config: &Config,
    ) -> Self {
        Self {
            workflow: ApprovalWorkflow::new(Arc::clone(&store)),
            store,
            transfer,
            notices: NoticeBus::new(),
            rules: ImageRules::from_config(config),
        }
    }

    /// Dashboard coordinator scoped to one session actor
    pub fn coordinator(&self, actor: Actor) -> ActionCoordinator {
        ActionCoordinator::new(self.workflow.clone(), actor, self.notices.clone())
    }

    /// Upload pipeline for slots and galleries
    pub fn pipeline(&self) -> PipelineContext {
        PipelineContext::new(Arc::clone(&self.transfer), self.notices.clone())
            .with_rules(self.rules)
    }
}

async fn create_store(config: &Config) -> Result<Arc<dyn InvitationStore>, anyhow::Error> {
    let Some(database_url) = &config.database_url else {
        tracing::warn!("DATABASE_URL not set, using the in-memory invitation store");
        return Ok(Arc::new(InMemoryInvitationStore::new()));
    };

    let pool = PgPool::connect(database_url).await.map_err(|e| {
        tracing::error!("Failed to connect to database: {}", e);
        anyhow::anyhow!("Database connection failed: {}", e)
    })?;
    let store = PgInvitationStore::new(pool);
    store.migrate().await?;

    tracing::info!("Database connection established");
    Ok(Arc::new(store))
}

/// Interpret a y/N answer; anything but yes declines
pub fn confirmed(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}
