//! Wire and room message protocol for live auctions.
//!
//! One JSON object per frame, in both directions. A single `Message`
//! struct carries every kind: the `kind` tag discriminates, the optional
//! fields are omitted when absent. The `userId` field is server-stamped;
//! whatever a client puts there is discarded by the inbound pump.

use serde::{Deserialize, Serialize};

use crate::domain::auction::Bid;
use crate::domain::foundation::UserId;

/// Discriminant for auction messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    /// Client asks to place a bid (`amount` required).
    PlaceBidRequest,
    /// The requester's bid was accepted.
    BidAccepted,
    /// The requester's bid was rejected (reason in `message`).
    BidRejected,
    /// Someone else's bid was accepted (`amount` only).
    BidBroadcast,
    /// The auction has closed; terminal for the connection.
    AuctionClosed,
    /// The sender's last frame could not be decoded.
    MalformedInput,
}

/// An auction message, immutable once constructed.
///
/// Travels by value over channels and, serialized, over the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub kind: MessageKind,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,

    #[serde(default, rename = "userId", skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,
}

impl Message {
    /// Acceptance reply for the requester's own bid.
    pub fn bid_accepted(bid: &Bid) -> Self {
        Self {
            kind: MessageKind::BidAccepted,
            message: Some("your bid was successfully placed".to_string()),
            amount: Some(bid.amount),
            user_id: Some(bid.bidder_id),
        }
    }

    /// Rejection reply, delivered to the requester only.
    pub fn bid_rejected(user_id: UserId, reason: impl Into<String>) -> Self {
        Self {
            kind: MessageKind::BidRejected,
            message: Some(reason.into()),
            amount: None,
            user_id: Some(user_id),
        }
    }

    /// Fan-out notification of someone else's accepted bid. Carries the
    /// amount only; no hint of what the next bid must be.
    pub fn bid_broadcast(bid: &Bid) -> Self {
        Self {
            kind: MessageKind::BidBroadcast,
            message: Some("a new bid was placed".to_string()),
            amount: Some(bid.amount),
            user_id: Some(bid.bidder_id),
        }
    }

    /// Terminal notification that the auction has closed.
    pub fn auction_closed() -> Self {
        Self {
            kind: MessageKind::AuctionClosed,
            message: Some("auction has been closed".to_string()),
            amount: None,
            user_id: None,
        }
    }

    /// Reply routed back to a sender whose frame could not be decoded.
    pub fn malformed_input(user_id: UserId) -> Self {
        Self {
            kind: MessageKind::MalformedInput,
            message: Some("invalid message".to_string()),
            amount: None,
            user_id: Some(user_id),
        }
    }

    /// Decode one wire frame and stamp the connection's user id over
    /// anything the client supplied.
    pub fn decode_frame(text: &str, user_id: UserId) -> Result<Self, serde_json::Error> {
        let mut message: Message = serde_json::from_str(text)?;
        message.user_id = Some(user_id);
        Ok(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::AuctionId;

    fn sample_bid(amount: f64) -> Bid {
        Bid::accepted(AuctionId::new(), UserId::new(), amount)
    }

    #[test]
    fn kind_serializes_with_snake_case_tag() {
        let json = serde_json::to_string(&MessageKind::PlaceBidRequest).unwrap();
        assert_eq!(json, r#""place_bid_request""#);
    }

    #[test]
    fn bid_accepted_carries_amount_and_bidder() {
        let bid = sample_bid(150.0);
        let msg = Message::bid_accepted(&bid);

        assert_eq!(msg.kind, MessageKind::BidAccepted);
        assert_eq!(msg.amount, Some(150.0));
        assert_eq!(msg.user_id, Some(bid.bidder_id));
    }

    #[test]
    fn optional_fields_are_omitted_from_wire_frames() {
        let msg = Message::auction_closed();
        let json = serde_json::to_string(&msg).unwrap();

        assert!(json.contains(r#""kind":"auction_closed""#));
        assert!(!json.contains("amount"));
        assert!(!json.contains("userId"));
    }

    #[test]
    fn user_id_serializes_in_camel_case() {
        let user = UserId::new();
        let msg = Message::malformed_input(user);
        let json = serde_json::to_string(&msg).unwrap();

        assert!(json.contains(&format!(r#""userId":"{}""#, user)));
    }

    #[test]
    fn decode_frame_parses_place_bid_request() {
        let user = UserId::new();
        let msg = Message::decode_frame(r#"{"kind":"place_bid_request","amount":42.5}"#, user)
            .unwrap();

        assert_eq!(msg.kind, MessageKind::PlaceBidRequest);
        assert_eq!(msg.amount, Some(42.5));
        assert_eq!(msg.user_id, Some(user));
    }

    #[test]
    fn decode_frame_overrides_client_supplied_user_id() {
        let spoofed = UserId::new();
        let real = UserId::new();
        let frame = format!(
            r#"{{"kind":"place_bid_request","amount":10,"userId":"{}"}}"#,
            spoofed
        );

        let msg = Message::decode_frame(&frame, real).unwrap();

        assert_eq!(msg.user_id, Some(real));
    }

    #[test]
    fn decode_frame_rejects_unknown_kind() {
        let result = Message::decode_frame(r#"{"kind":"steal_the_item"}"#, UserId::new());
        assert!(result.is_err());
    }

    #[test]
    fn decode_frame_rejects_non_json() {
        let result = Message::decode_frame("not json at all", UserId::new());
        assert!(result.is_err());
    }

    #[test]
    fn bid_broadcast_has_amount_but_no_floor_guess() {
        let bid = sample_bid(200.0);
        let msg = Message::bid_broadcast(&bid);

        assert_eq!(msg.kind, MessageKind::BidBroadcast);
        assert_eq!(msg.amount, Some(200.0));
    }
}
