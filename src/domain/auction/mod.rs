//! Auction domain records.

mod bid;

pub use bid::Bid;
