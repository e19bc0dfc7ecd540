//! Adapters: concrete implementations at the edges of the core.
//!
//! - [`websocket`] - the real-time auction room subsystem
//! - [`ledger`], [`catalog`], [`auth`] - in-memory stand-ins for the
//!   persistence and identity collaborators

pub mod auth;
pub mod catalog;
pub mod ledger;
pub mod websocket;
