//! Process-wide auction room registry.
//!
//! Maps an auction id to its live room and guarantees at most one room
//! per auction. The registry is the only data structure in the crate
//! touched from more than one task, so it sits behind a single mutex
//! held just long enough for a map read or write — never across a
//! channel send or any other await point.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use axum::extract::ws::WebSocket;
use tokio::sync::mpsc;

use crate::config::WebSocketConfig;
use crate::domain::foundation::{AuctionId, ConnectionId, UserId};
use crate::ports::{AuctionInfo, BidLedger};

use super::client::Client;
use super::room::{AuctionRoom, RoomClient, RoomHandle};

/// Why a subscription attempt was refused.
#[derive(Debug, Clone, Copy, thiserror::Error)]
pub enum SubscribeError {
    /// The room closed between lookup and registration.
    #[error("auction is already closed")]
    RoomClosed,
}

type Registry = Arc<Mutex<HashMap<AuctionId, RoomHandle>>>;

/// Registry of live auction rooms.
pub struct AuctionLobby {
    rooms: Registry,
    ledger: Arc<dyn BidLedger>,
    config: WebSocketConfig,
}

impl AuctionLobby {
    pub fn new(ledger: Arc<dyn BidLedger>, config: WebSocketConfig) -> Self {
        Self {
            rooms: Arc::new(Mutex::new(HashMap::new())),
            ledger,
            config,
        }
    }

    /// Connection tuning shared with the transport layer.
    pub fn config(&self) -> &WebSocketConfig {
        &self.config
    }

    /// Return the room for `auction`, creating and starting it when
    /// absent. Check-and-insert happens atomically under the registry
    /// lock, so concurrent callers always get the same room.
    pub fn get_or_create_room(&self, auction: AuctionInfo) -> RoomHandle {
        let mut rooms = lock_registry(&self.rooms);
        if let Some(handle) = rooms.get(&auction.id) {
            return handle.clone();
        }

        let (room, handle) = AuctionRoom::new(auction, Arc::clone(&self.ledger));
        rooms.insert(auction.id, handle.clone());

        // The loop runs as its own task; when it ends (deadline or
        // cancellation) the registry entry goes with it.
        let registry = Arc::clone(&self.rooms);
        tokio::spawn(async move {
            room.run().await;
            lock_registry(&registry).remove(&auction.id);
        });

        handle
    }

    /// Drop the registry entry for an auction. Idempotent; removing an
    /// id with no room is a no-op.
    pub fn remove_room(&self, auction_id: AuctionId) {
        lock_registry(&self.rooms).remove(&auction_id);
    }

    /// Administratively close an auction ahead of its deadline.
    ///
    /// Returns false when no room is live for the id.
    pub fn cancel_auction(&self, auction_id: AuctionId) -> bool {
        let handle = lock_registry(&self.rooms).get(&auction_id).cloned();
        match handle {
            Some(handle) => {
                handle.cancel();
                true
            }
            None => false,
        }
    }

    /// Number of live rooms (for monitoring).
    pub fn room_count(&self) -> usize {
        lock_registry(&self.rooms).len()
    }

    /// Attach an upgraded connection to an auction room.
    ///
    /// Called by the transport layer after it has validated the auction
    /// id and authenticated the caller. Registers the client's mailbox
    /// with the room, then starts the client actor's pumps.
    pub async fn subscribe(
        &self,
        auction: AuctionInfo,
        user_id: UserId,
        socket: WebSocket,
    ) -> Result<(), SubscribeError> {
        let handle = self.get_or_create_room(auction);

        let connection_id = ConnectionId::new();
        let (mailbox_tx, mailbox_rx) = mpsc::channel(self.config.mailbox_capacity);
        handle
            .register(RoomClient {
                user_id,
                connection_id,
                mailbox: mailbox_tx,
            })
            .await
            .map_err(|_| SubscribeError::RoomClosed)?;

        Client::new(user_id, connection_id, handle).run(socket, mailbox_rx, &self.config);
        Ok(())
    }
}

/// Lock the registry, recovering from a poisoned lock. The registry
/// holds only cloneable handles, so a panicking holder cannot leave it
/// half-written.
fn lock_registry(rooms: &Registry) -> MutexGuard<'_, HashMap<AuctionId, RoomHandle>> {
    rooms.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::Timestamp;
    use crate::ports::LedgerError;
    use async_trait::async_trait;
    use std::time::Duration;
    use tokio::time::timeout;

    struct AcceptAllLedger;

    #[async_trait]
    impl BidLedger for AcceptAllLedger {
        async fn place_bid(
            &self,
            auction_id: AuctionId,
            bidder_id: UserId,
            amount: f64,
        ) -> Result<crate::domain::auction::Bid, LedgerError> {
            Ok(crate::domain::auction::Bid::accepted(auction_id, bidder_id, amount))
        }
    }

    fn lobby() -> Arc<AuctionLobby> {
        Arc::new(AuctionLobby::new(
            Arc::new(AcceptAllLedger),
            WebSocketConfig::default(),
        ))
    }

    fn open_auction(secs: u64) -> AuctionInfo {
        AuctionInfo {
            id: AuctionId::new(),
            ends_at: Timestamp::now().plus_secs(secs),
        }
    }

    #[tokio::test]
    async fn get_or_create_returns_same_room_for_same_auction() {
        let lobby = lobby();
        let auction = open_auction(60);

        let first = lobby.get_or_create_room(auction);
        let second = lobby.get_or_create_room(auction);

        assert!(first.same_room(&second));
        assert_eq!(lobby.room_count(), 1);
    }

    #[tokio::test]
    async fn concurrent_callers_never_create_two_rooms() {
        let lobby = lobby();
        let auction = open_auction(60);

        let mut handles = Vec::new();
        for _ in 0..16 {
            let lobby = Arc::clone(&lobby);
            handles.push(tokio::spawn(async move {
                lobby.get_or_create_room(auction)
            }));
        }

        let mut rooms = Vec::new();
        for task in handles {
            rooms.push(task.await.unwrap());
        }
        let first = &rooms[0];
        assert!(rooms.iter().all(|r| r.same_room(first)));
        assert_eq!(lobby.room_count(), 1);
    }

    #[tokio::test]
    async fn distinct_auctions_get_distinct_rooms() {
        let lobby = lobby();

        let a = lobby.get_or_create_room(open_auction(60));
        let b = lobby.get_or_create_room(open_auction(60));

        assert!(!a.same_room(&b));
        assert_eq!(lobby.room_count(), 2);
    }

    #[tokio::test]
    async fn remove_room_is_idempotent() {
        let lobby = lobby();
        let auction = open_auction(60);
        lobby.get_or_create_room(auction);

        lobby.remove_room(auction.id);
        lobby.remove_room(auction.id);
        lobby.remove_room(AuctionId::new());

        assert_eq!(lobby.room_count(), 0);
    }

    #[tokio::test]
    async fn closed_room_is_dropped_from_registry() {
        let lobby = lobby();
        let auction = open_auction(3600);
        lobby.get_or_create_room(auction);
        assert_eq!(lobby.room_count(), 1);

        assert!(lobby.cancel_auction(auction.id));

        // The loop exits and its cleanup task removes the entry.
        timeout(Duration::from_secs(1), async {
            while lobby.room_count() != 0 {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .expect("registry entry was never removed");
    }

    #[tokio::test]
    async fn cancel_unknown_auction_reports_false() {
        let lobby = lobby();
        assert!(!lobby.cancel_auction(AuctionId::new()));
    }

    #[tokio::test]
    async fn expired_deadline_removes_room_without_cancellation() {
        let lobby = lobby();
        let auction = AuctionInfo {
            id: AuctionId::new(),
            ends_at: Timestamp::now(),
        };
        lobby.get_or_create_room(auction);

        timeout(Duration::from_secs(1), async {
            while lobby.room_count() != 0 {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .expect("room for an already-ended auction should close itself");
    }
}
