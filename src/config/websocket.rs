//! WebSocket connection tuning.

use std::time::Duration;

use serde::Deserialize;

use super::error::ValidationError;

/// Connection tuning for auction WebSockets.
#[derive(Debug, Clone, Deserialize)]
pub struct WebSocketConfig {
    /// Outbound mailbox slots per client. Generous so bursts of bid
    /// broadcasts fit; when it overflows anyway, the room drops
    /// non-critical messages rather than block.
    #[serde(default = "default_mailbox_capacity")]
    pub mailbox_capacity: usize,

    /// Maximum inbound frame size in bytes. Auction frames are a single
    /// small JSON object; anything bigger is garbage.
    #[serde(default = "default_max_frame_bytes")]
    pub max_frame_bytes: usize,

    /// How long a peer may stay silent before its connection is
    /// considered dead.
    #[serde(default = "default_read_timeout_secs")]
    pub read_timeout_secs: u64,

    /// Upper bound on a single write to the peer.
    #[serde(default = "default_write_timeout_secs")]
    pub write_timeout_secs: u64,
}

impl WebSocketConfig {
    pub fn read_timeout(&self) -> Duration {
        Duration::from_secs(self.read_timeout_secs)
    }

    pub fn write_timeout(&self) -> Duration {
        Duration::from_secs(self.write_timeout_secs)
    }

    /// Keepalive probe interval: 9/10 of the read timeout, so a ping
    /// always goes out before an idle peer's deadline expires.
    pub fn ping_period(&self) -> Duration {
        self.read_timeout().mul_f64(0.9)
    }

    /// Validate websocket configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.mailbox_capacity == 0 {
            return Err(ValidationError::InvalidMailboxCapacity);
        }
        if self.max_frame_bytes == 0 {
            return Err(ValidationError::InvalidFrameLimit);
        }
        if self.read_timeout_secs == 0 || self.write_timeout_secs == 0 {
            return Err(ValidationError::InvalidTimeout);
        }
        Ok(())
    }
}

impl Default for WebSocketConfig {
    fn default() -> Self {
        Self {
            mailbox_capacity: default_mailbox_capacity(),
            max_frame_bytes: default_max_frame_bytes(),
            read_timeout_secs: default_read_timeout_secs(),
            write_timeout_secs: default_write_timeout_secs(),
        }
    }
}

fn default_mailbox_capacity() -> usize {
    512
}

fn default_max_frame_bytes() -> usize {
    512
}

fn default_read_timeout_secs() -> u64 {
    60
}

fn default_write_timeout_secs() -> u64 {
    10
}
