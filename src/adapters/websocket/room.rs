//! Per-auction broadcast hub.
//!
//! One `AuctionRoom` runs as a single task that owns the authoritative
//! client set for one auction and serializes every mutation — join,
//! leave, bid — through its input channels. That single consumer is the
//! linearization point for bids: no per-field locking, no data races,
//! because nothing outside the loop ever touches the client set.
//!
//! ```text
//!  register ──┐
//!  unregister ─┼─► AuctionRoom loop ──► ledger.place_bid
//!  broadcast ──┘         │
//!  closing ──────────────┘ fan-out ──► client mailboxes (try_send)
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, watch};

use crate::domain::foundation::{AuctionId, ConnectionId, Timestamp, UserId};
use crate::ports::{AuctionInfo, BidLedger, LedgerError};

use super::messages::{Message, MessageKind};

/// Buffer for the room's own input channels. Senders suspend when the
/// loop falls this far behind, which is the backpressure we want for
/// inbound traffic (unlike client mailboxes, which must never block the
/// loop).
const ROOM_INPUT_BUFFER: usize = 64;

/// Membership entry for one connected client.
///
/// The mailbox sender is the only path into that client; nobody writes
/// to the underlying connection except the client's own outbound pump.
#[derive(Debug, Clone)]
pub struct RoomClient {
    pub user_id: UserId,
    pub connection_id: ConnectionId,
    pub mailbox: mpsc::Sender<Message>,
}

/// The room no longer accepts input.
#[derive(Debug, Clone, Copy, thiserror::Error)]
#[error("auction room is closed")]
pub struct RoomClosed;

/// Cloneable handle for sending into a room's event loop.
#[derive(Clone)]
pub struct RoomHandle {
    auction_id: AuctionId,
    register_tx: mpsc::Sender<RoomClient>,
    unregister_tx: mpsc::Sender<(UserId, ConnectionId)>,
    broadcast_tx: mpsc::Sender<Message>,
    cancel_tx: Arc<watch::Sender<bool>>,
}

impl RoomHandle {
    /// The auction this handle belongs to.
    pub fn auction_id(&self) -> AuctionId {
        self.auction_id
    }

    /// Add a client to the room, replacing any prior connection for the
    /// same user.
    pub async fn register(&self, client: RoomClient) -> Result<(), RoomClosed> {
        self.register_tx.send(client).await.map_err(|_| RoomClosed)
    }

    /// Remove a client. A no-op when the user is absent or has since
    /// been replaced by a newer connection.
    pub async fn unregister(&self, user_id: UserId, connection_id: ConnectionId) {
        // A closed room already dropped its membership; nothing to undo.
        let _ = self.unregister_tx.send((user_id, connection_id)).await;
    }

    /// Forward an inbound client message to the room loop.
    pub async fn broadcast(&self, message: Message) -> Result<(), RoomClosed> {
        self.broadcast_tx.send(message).await.map_err(|_| RoomClosed)
    }

    /// Fire the room's one-shot cancellation signal (administrative
    /// close ahead of the auction deadline). Not reversible.
    pub fn cancel(&self) {
        let _ = self.cancel_tx.send(true);
    }

    /// Whether two handles point at the same room instance.
    pub fn same_room(&self, other: &RoomHandle) -> bool {
        self.broadcast_tx.same_channel(&other.broadcast_tx)
    }
}

/// Single-threaded event loop owning one auction's client set.
pub struct AuctionRoom {
    id: AuctionId,
    ends_at: Timestamp,
    clients: HashMap<UserId, RoomClient>,
    ledger: Arc<dyn BidLedger>,
    register_rx: mpsc::Receiver<RoomClient>,
    unregister_rx: mpsc::Receiver<(UserId, ConnectionId)>,
    broadcast_rx: mpsc::Receiver<Message>,
    cancel_rx: watch::Receiver<bool>,
}

impl AuctionRoom {
    /// Build a room for `auction` and the handle used to reach it.
    ///
    /// The loop does not run until [`AuctionRoom::run`] is awaited;
    /// the lobby spawns it as an independent task.
    pub fn new(auction: AuctionInfo, ledger: Arc<dyn BidLedger>) -> (Self, RoomHandle) {
        let (register_tx, register_rx) = mpsc::channel(ROOM_INPUT_BUFFER);
        let (unregister_tx, unregister_rx) = mpsc::channel(ROOM_INPUT_BUFFER);
        let (broadcast_tx, broadcast_rx) = mpsc::channel(ROOM_INPUT_BUFFER);
        let (cancel_tx, cancel_rx) = watch::channel(false);

        let room = Self {
            id: auction.id,
            ends_at: auction.ends_at,
            clients: HashMap::new(),
            ledger,
            register_rx,
            unregister_rx,
            broadcast_rx,
            cancel_rx,
        };
        let handle = RoomHandle {
            auction_id: auction.id,
            register_tx,
            unregister_tx,
            broadcast_tx,
            cancel_tx: Arc::new(cancel_tx),
        };
        (room, handle)
    }

    /// Run the event loop until the auction deadline or cancellation.
    ///
    /// Returning drops the input receivers, so any later send through a
    /// stale handle fails with an ordinary send error instead of
    /// reaching a dead room.
    pub async fn run(mut self) {
        tracing::info!(auction_id = %self.id, ends_at = %self.ends_at, "auction room opened");

        let closing = tokio::time::sleep(self.ends_at.until());
        tokio::pin!(closing);

        // Biased polling order: closure signals win over pending traffic,
        // and a queued registration is always applied before any bid
        // queued behind it, so a client's first bid cannot outrun its
        // own join.
        loop {
            tokio::select! {
                biased;
                _ = &mut closing => break,
                _ = self.cancel_rx.changed() => break,
                Some(client) = self.register_rx.recv() => self.register(client),
                Some((user_id, connection_id)) = self.unregister_rx.recv() => {
                    self.unregister(user_id, connection_id);
                }
                Some(message) = self.broadcast_rx.recv() => self.dispatch(message).await,
            }
        }

        self.close();
    }

    /// Insert a client, last-writer-wins on reconnect.
    fn register(&mut self, client: RoomClient) {
        tracing::info!(
            auction_id = %self.id,
            user_id = %client.user_id,
            connection_id = %client.connection_id,
            "client joined auction"
        );
        self.clients.insert(client.user_id, client);
    }

    /// Remove a client. Only the connection that owns the entry may
    /// remove it; an unregister from a replaced connection is a no-op,
    /// as is one for an absent user.
    fn unregister(&mut self, user_id: UserId, connection_id: ConnectionId) {
        let owns_entry = self
            .clients
            .get(&user_id)
            .map_or(false, |c| c.connection_id == connection_id);
        if owns_entry {
            self.clients.remove(&user_id);
            tracing::info!(auction_id = %self.id, %user_id, "client left auction");
        }
    }

    async fn dispatch(&mut self, message: Message) {
        match message.kind {
            MessageKind::PlaceBidRequest => self.handle_bid(message).await,
            MessageKind::MalformedInput => {
                let Some(user_id) = message.user_id else { return };
                match self.clients.get(&user_id) {
                    Some(client) => self.deliver(client, message),
                    None => {
                        tracing::debug!(auction_id = %self.id, %user_id, "malformed-input sender no longer connected");
                    }
                }
            }
            kind => {
                tracing::debug!(auction_id = %self.id, ?kind, "ignoring unsupported inbound message kind");
            }
        }
    }

    async fn handle_bid(&mut self, message: Message) {
        // Stamped by the inbound pump; a message without it never came
        // through a registered connection.
        let Some(user_id) = message.user_id else {
            tracing::warn!(auction_id = %self.id, "dropping bid request without user id");
            return;
        };
        let Some(amount) = message.amount else {
            if let Some(client) = self.clients.get(&user_id) {
                self.deliver(client, Message::bid_rejected(user_id, "bid amount is required"));
            }
            return;
        };

        match self.ledger.place_bid(self.id, user_id, amount).await {
            Ok(bid) => {
                tracing::info!(auction_id = %self.id, %user_id, amount, "bid accepted");
                // The requester's acceptance is enqueued before any peer
                // broadcast for the same bid.
                if let Some(client) = self.clients.get(&user_id) {
                    self.deliver(client, Message::bid_accepted(&bid));
                }
                for (id, client) in &self.clients {
                    if *id == user_id {
                        continue;
                    }
                    self.deliver(client, Message::bid_broadcast(&bid));
                }
            }
            Err(LedgerError::BidTooLow) => {
                if let Some(client) = self.clients.get(&user_id) {
                    self.deliver(client, Message::bid_rejected(user_id, LedgerError::BidTooLow.to_string()));
                }
            }
            Err(err) => {
                // The attempt fails; the auction keeps running.
                tracing::error!(auction_id = %self.id, %user_id, error = %err, "ledger rejected bid attempt");
                if let Some(client) = self.clients.get(&user_id) {
                    self.deliver(client, Message::bid_rejected(user_id, "bid could not be processed, try again"));
                }
            }
        }
    }

    /// Non-blocking mailbox delivery. A stalled client never stalls the
    /// room: on overflow, closure notices are retried from a detached
    /// task and everything else is dropped.
    fn deliver(&self, client: &RoomClient, message: Message) {
        match client.mailbox.try_send(message) {
            Ok(()) => {}
            Err(TrySendError::Full(message)) => {
                if message.kind == MessageKind::AuctionClosed {
                    let mailbox = client.mailbox.clone();
                    tokio::spawn(async move {
                        let _ = mailbox.send(message).await;
                    });
                } else {
                    tracing::warn!(
                        auction_id = %self.id,
                        user_id = %client.user_id,
                        kind = ?message.kind,
                        "client mailbox full, dropping message"
                    );
                }
            }
            // Pump already gone; its unregister is on the way.
            Err(TrySendError::Closed(_)) => {}
        }
    }

    /// Terminal transition: notify everyone, then let the loop return
    /// and drop the input channels.
    fn close(&mut self) {
        tracing::info!(auction_id = %self.id, clients = self.clients.len(), "auction closed");
        for client in self.clients.values() {
            self.deliver(client, Message::auction_closed());
        }
    }
}
