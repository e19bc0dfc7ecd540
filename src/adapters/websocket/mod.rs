//! Real-time auction room subsystem.
//!
//! The hub-and-actor core of the marketplace: every auction gets one
//! single-threaded room loop that owns membership and serializes bids,
//! every connection gets one client actor with a bounded mailbox, and a
//! process-wide lobby maps auction ids to live rooms.
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────┐
//! │                       AuctionLobby                         │
//! │   auction-1 → RoomHandle    auction-2 → RoomHandle         │
//! └───────────────────────────────────────────────────────────┘
//!                  │ register / broadcast / unregister
//!                  ▼
//! ┌───────────────────────────────────────────────────────────┐
//! │            AuctionRoom loop (one task per auction)         │
//! │   clients: user → mailbox          ledger.place_bid        │
//! └───────────────────────────────────────────────────────────┘
//!                  │ try_send into mailboxes
//!                  ▼
//! ┌───────────────────────────────────────────────────────────┐
//! │   Client actors: inbound pump ▲ / outbound pump ▼ per conn │
//! └───────────────────────────────────────────────────────────┘
//! ```
//!
//! # Components
//!
//! - [`messages`] - wire protocol and room message types
//! - [`room`] - per-auction event loop
//! - [`client`] - per-connection actor (pumps, mailbox, keepalive)
//! - [`lobby`] - process-wide room registry and subscription entry point
//! - [`handler`] - axum WebSocket upgrade handler

pub mod client;
pub mod handler;
pub mod lobby;
pub mod messages;
pub mod room;

pub use client::Client;
pub use handler::{websocket_router, ws_handler, WebSocketState};
pub use lobby::{AuctionLobby, SubscribeError};
pub use messages::{Message, MessageKind};
pub use room::{AuctionRoom, RoomClient, RoomHandle};
