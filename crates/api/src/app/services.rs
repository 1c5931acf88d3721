//! Service wiring: the store every handler shares.

use std::sync::Arc;

use stockroom_infra::{InventoryStore, StoreConfig, StoreResult};

#[derive(Debug, Clone)]
pub struct AppServices {
    pub store: Arc<InventoryStore>,
}

impl AppServices {
    pub fn new(store: InventoryStore) -> Self {
        Self {
            store: Arc::new(store),
        }
    }
}

pub fn build_services(config: &StoreConfig) -> StoreResult<AppServices> {
    let store = InventoryStore::from_config(config)?;
    tracing::info!(seeded = config.seed, "inventory store ready");
    Ok(AppServices::new(store))
}
