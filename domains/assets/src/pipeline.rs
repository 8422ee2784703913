//! Collaborators shared by every slot and gallery of a session

use std::sync::Arc;

use bouquet_common::NoticeBus;
use bouquet_storage::AssetTransferService;

use crate::domain::entities::ImageRules;
use crate::preview::PreviewRegistry;

#[derive(Clone)]
pub struct PipelineContext {
    pub transfer: Arc<dyn AssetTransferService>,
    pub notices: NoticeBus,
    pub previews: PreviewRegistry,
    pub rules: ImageRules,
}

impl PipelineContext {
    pub fn new(transfer: Arc<dyn AssetTransferService>, notices: NoticeBus) -> Self {
        Self {
            transfer,
            notices,
            previews: PreviewRegistry::new(),
            rules: ImageRules::default(),
        }
    }

    pub fn with_rules(mut self, rules: ImageRules) -> Self {
        self.rules = rules;
        self
    }
}
