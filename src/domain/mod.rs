//! Domain layer: value objects and auction records.

pub mod auction;
pub mod foundation;
