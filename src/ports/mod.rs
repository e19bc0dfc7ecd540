//! Ports: trait seams to the external collaborators the auction core
//! consumes. Persistence, identity, and catalog lookups live behind these
//! so the core stays transport- and storage-agnostic.

mod bid_ledger;
mod identity;
mod product_catalog;

pub use bid_ledger::{BidLedger, LedgerError};
pub use identity::{Identity, IdentityError};
pub use product_catalog::{AuctionInfo, CatalogError, ProductCatalog};
