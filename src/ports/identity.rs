//! Identity port - authenticated user resolution.
//!
//! The transport layer resolves the caller's user id through this seam
//! before any connection upgrade. The auction core never sees
//! unauthenticated traffic.

use async_trait::async_trait;

use crate::domain::foundation::UserId;

/// Errors from identity resolution.
#[derive(Debug, Clone, thiserror::Error)]
pub enum IdentityError {
    /// The presented credentials do not map to a user.
    #[error("unauthenticated")]
    Unauthenticated,

    /// The identity provider could not be reached.
    #[error("identity provider unavailable: {0}")]
    Unavailable(String),
}

/// Port for mapping a session token to an authenticated user id.
#[async_trait]
pub trait Identity: Send + Sync {
    /// Resolve a bearer token to the authenticated user id.
    async fn authenticate(&self, token: &str) -> Result<UserId, IdentityError>;
}
