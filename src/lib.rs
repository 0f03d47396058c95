pub mod catalog;
pub mod chat;
pub mod clients;
pub mod config;
pub mod error;
pub mod http;
pub mod query;
pub mod quiz;
pub mod seed;
pub mod store;

use crate::config::{Config, StoreBackend};
use crate::seed::SeedData;
use crate::store::{CatalogStore, MemoryStore, SurrealStore};
use std::sync::Arc;
use tracing::{info, warn};

/// Open the configured catalog store. The SurrealDB backend connects in the background,
/// so this never waits on the database.
pub fn open_store(config: &Config) -> error::Result<Arc<dyn CatalogStore>> {
    match config.runtime.store_backend {
        StoreBackend::Memory => {
            let seed = match &config.runtime.seed_dir {
                Some(dir) => SeedData::load_dir(dir)?,
                None => {
                    warn!("CAREER_STORE=memory without CAREER_SEED_DIR; catalog is empty");
                    SeedData::default()
                }
            };
            Ok(Arc::new(MemoryStore::new(seed)))
        }
        StoreBackend::Surreal => {
            info!(
                "Using SurrealDB at {} (ns={}, db={})",
                config.database.url, config.database.namespace, config.database.database
            );
            Ok(Arc::new(SurrealStore::connect_in_background(config)))
        }
    }
}
