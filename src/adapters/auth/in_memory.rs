//! In-memory identity provider for tests and local development.
//!
//! Maps opaque session tokens to user ids. Production deployments put a
//! real session store behind the same port.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::domain::foundation::UserId;
use crate::ports::{Identity, IdentityError};

/// Identity provider backed by a process-local token table.
#[derive(Default)]
pub struct InMemoryIdentity {
    tokens: RwLock<HashMap<String, UserId>>,
}

impl InMemoryIdentity {
    pub fn new() -> Self {
        Self::default()
    }

    /// Associate a session token with a user id.
    pub fn add_session(&self, token: impl Into<String>, user_id: UserId) {
        self.tokens
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(token.into(), user_id);
    }
}

#[async_trait]
impl Identity for InMemoryIdentity {
    async fn authenticate(&self, token: &str) -> Result<UserId, IdentityError> {
        self.tokens
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(token)
            .copied()
            .ok_or(IdentityError::Unauthenticated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn known_token_resolves_to_its_user() {
        let identity = InMemoryIdentity::new();
        let user = UserId::new();
        identity.add_session("session-abc", user);

        assert_eq!(identity.authenticate("session-abc").await.unwrap(), user);
    }

    #[tokio::test]
    async fn unknown_token_is_unauthenticated() {
        let identity = InMemoryIdentity::new();

        let result = identity.authenticate("nope").await;
        assert!(matches!(result, Err(IdentityError::Unauthenticated)));
    }
}
