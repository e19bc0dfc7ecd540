//! In-memory product catalog for tests and local development.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::domain::foundation::{AuctionId, Timestamp};
use crate::ports::{AuctionInfo, CatalogError, ProductCatalog};

/// Catalog backed by a process-local map.
#[derive(Default)]
pub struct InMemoryProductCatalog {
    auctions: RwLock<HashMap<AuctionId, AuctionInfo>>,
}

impl InMemoryProductCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make an auction discoverable, with the given closing time.
    pub fn add_auction(&self, id: AuctionId, ends_at: Timestamp) {
        self.auctions
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(id, AuctionInfo { id, ends_at });
    }
}

#[async_trait]
impl ProductCatalog for InMemoryProductCatalog {
    async fn find_auction(&self, id: AuctionId) -> Result<Option<AuctionInfo>, CatalogError> {
        Ok(self
            .auctions
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(&id)
            .copied())
    }
}
