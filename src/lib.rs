//! bidhall - real-time auction room backend.
//!
//! Clients join an auction over a WebSocket and exchange bid frames with
//! a per-auction room task. The crate is organised hexagonally:
//!
//! - [`domain`] - value objects shared across the system
//! - [`ports`] - trait boundaries to external collaborators
//! - [`adapters`] - the WebSocket subsystem plus in-memory port stand-ins
//! - [`config`] - environment-driven configuration

pub mod adapters;
pub mod config;
pub mod domain;
pub mod ports;
