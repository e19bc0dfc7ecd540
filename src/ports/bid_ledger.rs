//! BidLedger port - durable bid acceptance for the auction core.
//!
//! The room loop funnels every bid through this seam. Whatever backs it
//! (Postgres in production, an in-memory map in tests) must linearize
//! concurrent `place_bid` calls for the same auction so that "strictly
//! higher than the current floor" is well-defined.

use async_trait::async_trait;

use crate::domain::auction::Bid;
use crate::domain::foundation::{AuctionId, UserId};

/// Errors a bid attempt can surface.
#[derive(Debug, Clone, thiserror::Error)]
pub enum LedgerError {
    /// The amount did not strictly exceed the current floor. Equality
    /// counts as too low.
    #[error("bid amount is too low")]
    BidTooLow,

    /// The ledger could not process the attempt. The bid fails; the
    /// auction itself keeps running.
    #[error("bid ledger unavailable: {0}")]
    Unavailable(String),
}

/// Port for recording bids against durable storage.
///
/// # Contract
///
/// Implementations must:
/// - Linearize concurrent calls per auction (no two bids below each
///   other's amount both succeed)
/// - Accept only amounts strictly above the prior floor
/// - Return the submitted amount unmodified on success
#[async_trait]
pub trait BidLedger: Send + Sync {
    /// Record a bid for `auction_id` by `bidder_id`.
    ///
    /// # Returns
    ///
    /// * `Ok(Bid)` - the accepted bid, amount exactly as submitted
    /// * `Err(LedgerError::BidTooLow)` - amount did not beat the floor
    /// * `Err(LedgerError::Unavailable)` - transient ledger fault
    async fn place_bid(
        &self,
        auction_id: AuctionId,
        bidder_id: UserId,
        amount: f64,
    ) -> Result<Bid, LedgerError>;
}
