//! Foundation value objects shared across the domain.

mod ids;
mod timestamp;

pub use ids::{AuctionId, BidId, ConnectionId, UserId};
pub use timestamp::Timestamp;
