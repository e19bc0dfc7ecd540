//! In-memory BidLedger for tests and local development.
//!
//! Linearizes concurrent bids per process behind one async mutex: the
//! floor check and the floor update are a single critical section, so
//! no two bids below each other's amount can both succeed.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::auction::Bid;
use crate::domain::foundation::{AuctionId, UserId};
use crate::ports::{BidLedger, LedgerError};

struct AuctionBook {
    floor: f64,
    bids: Vec<Bid>,
}

/// In-memory ledger keyed by auction, seeded with each auction's base
/// price as the initial floor.
#[derive(Default)]
pub struct InMemoryBidLedger {
    books: Mutex<HashMap<AuctionId, AuctionBook>>,
}

impl InMemoryBidLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an auction and its base price. The first accepted bid
    /// must strictly exceed this amount.
    pub async fn open_auction(&self, auction_id: AuctionId, base_price: f64) {
        self.books.lock().await.insert(
            auction_id,
            AuctionBook { floor: base_price, bids: Vec::new() },
        );
    }

    /// Current floor for an auction, if registered.
    pub async fn floor(&self, auction_id: AuctionId) -> Option<f64> {
        self.books.lock().await.get(&auction_id).map(|b| b.floor)
    }

    /// All accepted bids for an auction, in acceptance order.
    pub async fn bids(&self, auction_id: AuctionId) -> Vec<Bid> {
        self.books
            .lock()
            .await
            .get(&auction_id)
            .map(|b| b.bids.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl BidLedger for InMemoryBidLedger {
    async fn place_bid(
        &self,
        auction_id: AuctionId,
        bidder_id: UserId,
        amount: f64,
    ) -> Result<Bid, LedgerError> {
        let mut books = self.books.lock().await;
        let book = books
            .get_mut(&auction_id)
            .ok_or_else(|| LedgerError::Unavailable("auction not registered".to_string()))?;

        // Strict increase: matching the floor is still too low.
        if amount <= book.floor {
            return Err(LedgerError::BidTooLow);
        }

        let bid = Bid::accepted(auction_id, bidder_id, amount);
        book.floor = amount;
        book.bids.push(bid.clone());
        Ok(bid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn first_bid_must_beat_the_base_price() {
        let ledger = InMemoryBidLedger::new();
        let auction = AuctionId::new();
        ledger.open_auction(auction, 100.0).await;

        let too_low = ledger.place_bid(auction, UserId::new(), 100.0).await;
        assert!(matches!(too_low, Err(LedgerError::BidTooLow)));

        let accepted = ledger.place_bid(auction, UserId::new(), 100.01).await.unwrap();
        assert_eq!(accepted.amount, 100.01);
    }

    #[tokio::test]
    async fn accepted_amount_is_exactly_the_submitted_amount() {
        let ledger = InMemoryBidLedger::new();
        let auction = AuctionId::new();
        ledger.open_auction(auction, 0.0).await;

        let bid = ledger.place_bid(auction, UserId::new(), 123.45).await.unwrap();
        assert_eq!(bid.amount, 123.45);
    }

    #[tokio::test]
    async fn lower_or_equal_bids_are_rejected_after_acceptance() {
        let ledger = InMemoryBidLedger::new();
        let auction = AuctionId::new();
        ledger.open_auction(auction, 100.0).await;

        ledger.place_bid(auction, UserId::new(), 150.0).await.unwrap();

        for amount in [120.0, 150.0] {
            let result = ledger.place_bid(auction, UserId::new(), amount).await;
            assert!(matches!(result, Err(LedgerError::BidTooLow)));
        }
        assert_eq!(ledger.floor(auction).await, Some(150.0));
    }

    #[tokio::test]
    async fn unregistered_auction_is_reported_as_unavailable() {
        let ledger = InMemoryBidLedger::new();
        let result = ledger.place_bid(AuctionId::new(), UserId::new(), 10.0).await;
        assert!(matches!(result, Err(LedgerError::Unavailable(_))));
    }

    #[tokio::test]
    async fn concurrent_bids_are_linearized() {
        let ledger = Arc::new(InMemoryBidLedger::new());
        let auction = AuctionId::new();
        ledger.open_auction(auction, 0.0).await;

        let mut tasks = Vec::new();
        for i in 1..=50u32 {
            let ledger = Arc::clone(&ledger);
            tasks.push(tokio::spawn(async move {
                ledger.place_bid(auction, UserId::new(), f64::from(i)).await
            }));
        }
        for task in tasks {
            let _ = task.await.unwrap();
        }

        // Whatever interleaving happened, the accepted sequence is
        // strictly increasing.
        let bids = ledger.bids(auction).await;
        assert!(!bids.is_empty());
        assert!(bids.windows(2).all(|w| w[0].amount < w[1].amount));
    }

    proptest! {
        #[test]
        fn accepted_bids_are_strictly_increasing_over_the_floor(
            base in 0.0f64..1000.0,
            amounts in proptest::collection::vec(0.0f64..2000.0, 1..50),
        ) {
            let rt = tokio::runtime::Builder::new_current_thread()
                .build()
                .unwrap();
            rt.block_on(async {
                let ledger = InMemoryBidLedger::new();
                let auction = AuctionId::new();
                ledger.open_auction(auction, base).await;

                let mut floor = base;
                for amount in amounts {
                    match ledger.place_bid(auction, UserId::new(), amount).await {
                        Ok(bid) => {
                            prop_assert!(bid.amount > floor);
                            floor = bid.amount;
                        }
                        Err(LedgerError::BidTooLow) => prop_assert!(amount <= floor),
                        Err(err) => return Err(TestCaseError::fail(err.to_string())),
                    }
                }
                prop_assert_eq!(ledger.floor(auction).await, Some(floor));
                Ok(())
            })?;
        }
    }
}
