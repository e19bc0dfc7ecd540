//! Accepted bid record.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{AuctionId, BidId, Timestamp, UserId};

/// A bid accepted by the ledger.
///
/// Append-only from the core's perspective: the room fans it out but never
/// mutates it. The amount is exactly the amount the bidder submitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bid {
    pub id: BidId,
    pub auction_id: AuctionId,
    pub bidder_id: UserId,
    pub amount: f64,
    pub placed_at: Timestamp,
}

impl Bid {
    /// Creates a bid record accepted at the current moment.
    pub fn accepted(auction_id: AuctionId, bidder_id: UserId, amount: f64) -> Self {
        Self {
            id: BidId::new(),
            auction_id,
            bidder_id,
            amount,
            placed_at: Timestamp::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepted_bid_preserves_submitted_amount() {
        let auction = AuctionId::new();
        let bidder = UserId::new();

        let bid = Bid::accepted(auction, bidder, 150.0);

        assert_eq!(bid.auction_id, auction);
        assert_eq!(bid.bidder_id, bidder);
        assert_eq!(bid.amount, 150.0);
    }

    #[test]
    fn accepted_bids_get_unique_ids() {
        let auction = AuctionId::new();
        let bidder = UserId::new();

        let first = Bid::accepted(auction, bidder, 100.0);
        let second = Bid::accepted(auction, bidder, 110.0);

        assert_ne!(first.id, second.id);
    }
}
