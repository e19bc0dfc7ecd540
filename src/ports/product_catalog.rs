//! ProductCatalog port - auction lookup for the subscription path.
//!
//! The HTTP layer checks an auction exists (and learns its closing time)
//! before upgrading the connection, so `AuctionNotFound` is surfaced
//! without any room interaction.

use async_trait::async_trait;

use crate::domain::foundation::{AuctionId, Timestamp};

/// The slice of a product record the auction core needs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AuctionInfo {
    pub id: AuctionId,
    /// When the auction closes; the room binds its deadline to this.
    pub ends_at: Timestamp,
}

/// Errors from catalog lookups.
#[derive(Debug, Clone, thiserror::Error)]
pub enum CatalogError {
    #[error("product catalog unavailable: {0}")]
    Unavailable(String),
}

/// Port for resolving an auction id against the product store.
#[async_trait]
pub trait ProductCatalog: Send + Sync {
    /// Look up an auction by id.
    ///
    /// Returns `Ok(None)` when no such product exists.
    async fn find_auction(&self, id: AuctionId) -> Result<Option<AuctionInfo>, CatalogError>;
}
