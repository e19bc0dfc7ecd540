//! Per-connection client actor.
//!
//! A client pairs one authenticated user with one live connection to one
//! auction room. It owns a bounded mailbox and two pumps:
//!
//! - the inbound pump decodes wire frames, stamps the connection's user
//!   id over anything the client claimed, and forwards to the room
//! - the outbound pump drains the mailbox onto the wire and keeps the
//!   peer alive with protocol pings when idle
//!
//! The pumps are generic over the split socket halves so they can be
//! driven by channel-backed mocks in tests. A supervisor task waits for
//! either pump to finish, aborts the other, and unregisters exactly once.
//! No failure in here ever reaches the room loop as anything other than
//! that unregistration.

use std::time::Duration;

use axum::extract::ws::{Message as WsMessage, WebSocket};
use futures::{Sink, SinkExt, Stream, StreamExt};
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;

use crate::config::WebSocketConfig;
use crate::domain::foundation::{ConnectionId, UserId};

use super::messages::{Message, MessageKind};
use super::room::RoomHandle;

/// Actor for one (auction, user) connection.
pub struct Client {
    user_id: UserId,
    connection_id: ConnectionId,
    room: RoomHandle,
}

impl Client {
    pub fn new(user_id: UserId, connection_id: ConnectionId, room: RoomHandle) -> Self {
        Self { user_id, connection_id, room }
    }

    /// Start both pumps on their own tasks and supervise them.
    ///
    /// `mailbox` is the receiving half of the channel whose sender was
    /// registered with the room; the room is the only producer into it.
    pub fn run(self, socket: WebSocket, mailbox: mpsc::Receiver<Message>, config: &WebSocketConfig) {
        let read_timeout = config.read_timeout();
        let write_timeout = config.write_timeout();
        let ping_period = config.ping_period();

        tokio::spawn(async move {
            let (sink, stream) = socket.split();

            let mut inbound = tokio::spawn(inbound_pump(
                stream,
                self.user_id,
                self.room.clone(),
                read_timeout,
            ));
            let mut outbound = tokio::spawn(outbound_pump(
                sink,
                mailbox,
                self.user_id,
                ping_period,
                write_timeout,
            ));

            // Whichever pump stops first takes the other down with it.
            tokio::select! {
                _ = &mut inbound => outbound.abort(),
                _ = &mut outbound => inbound.abort(),
            }

            self.room.unregister(self.user_id, self.connection_id).await;
            tracing::debug!(
                auction_id = %self.room.auction_id(),
                user_id = %self.user_id,
                connection_id = %self.connection_id,
                "client actor stopped"
            );
        });
    }
}

/// Read frames from the connection and forward them to the room.
///
/// Terminates on close frame, read error, read-deadline expiry, or a
/// closed room. The deadline is re-armed by every inbound frame,
/// including pongs answering our keepalive pings.
pub(crate) async fn inbound_pump<S, E>(
    mut stream: S,
    user_id: UserId,
    room: RoomHandle,
    read_timeout: Duration,
) where
    S: Stream<Item = Result<WsMessage, E>> + Unpin,
    E: std::fmt::Display,
{
    loop {
        let frame = match tokio::time::timeout(read_timeout, stream.next()).await {
            Err(_) => {
                tracing::debug!(%user_id, "read deadline expired, dropping connection");
                return;
            }
            Ok(None) => return,
            Ok(Some(Err(err))) => {
                tracing::debug!(%user_id, error = %err, "connection read failed");
                return;
            }
            Ok(Some(Ok(frame))) => frame,
        };

        let message = match frame {
            WsMessage::Text(text) => match Message::decode_frame(&text, user_id) {
                Ok(message) => message,
                Err(err) => {
                    tracing::debug!(%user_id, error = %err, "malformed frame");
                    Message::malformed_input(user_id)
                }
            },
            // Only JSON text frames are part of the protocol.
            WsMessage::Binary(_) => Message::malformed_input(user_id),
            WsMessage::Ping(_) | WsMessage::Pong(_) => continue,
            WsMessage::Close(_) => {
                tracing::debug!(%user_id, "client sent close frame");
                return;
            }
        };

        if room.broadcast(message).await.is_err() {
            // Room closed between our read and this send.
            return;
        }
    }
}

/// Drain the mailbox onto the wire; ping the peer when idle.
///
/// Writing `auction_closed` is the one message that terminates this
/// pump. Every write is bounded by `write_timeout` so a wedged peer
/// cannot pin the task.
pub(crate) async fn outbound_pump<W>(
    mut sink: W,
    mut mailbox: mpsc::Receiver<Message>,
    user_id: UserId,
    ping_period: Duration,
    write_timeout: Duration,
) where
    W: Sink<WsMessage> + Unpin,
    W::Error: std::fmt::Display,
{
    let start = tokio::time::Instant::now() + ping_period;
    let mut keepalive = tokio::time::interval_at(start, ping_period);
    keepalive.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            maybe = mailbox.recv() => {
                let Some(message) = maybe else {
                    // Every sender is gone; say goodbye and stop.
                    let _ = sink.send(WsMessage::Close(None)).await;
                    return;
                };
                let terminal = message.kind == MessageKind::AuctionClosed;
                let frame = match serde_json::to_string(&message) {
                    Ok(json) => WsMessage::Text(json),
                    Err(err) => {
                        tracing::error!(%user_id, error = %err, "failed to encode outbound message");
                        continue;
                    }
                };
                match tokio::time::timeout(write_timeout, sink.send(frame)).await {
                    Ok(Ok(())) => {}
                    Ok(Err(err)) => {
                        tracing::debug!(%user_id, error = %err, "connection write failed");
                        return;
                    }
                    Err(_) => {
                        tracing::debug!(%user_id, "write deadline expired");
                        return;
                    }
                }
                if terminal {
                    let _ = sink.send(WsMessage::Close(None)).await;
                    return;
                }
            }
            _ = keepalive.tick() => {
                match tokio::time::timeout(write_timeout, sink.send(WsMessage::Ping(Vec::new()))).await {
                    Ok(Ok(())) => {}
                    _ => {
                        tracing::debug!(%user_id, "keepalive write failed");
                        return;
                    }
                }
            }
        }
    }
}
