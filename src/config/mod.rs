//! Application configuration loaded from environment variables.
//!
//! All settings are read from `BIDHALL__`-prefixed variables, with `__`
//! separating sections from keys (e.g. `BIDHALL__SERVER__PORT=3080`,
//! `BIDHALL__WEBSOCKET__MAILBOX_CAPACITY=512`). A `.env` file is loaded
//! first when present.

mod error;
mod server;
mod websocket;

pub use error::{ConfigError, ValidationError};
pub use server::{Environment, ServerConfig};
pub use websocket::WebSocketConfig;

use serde::Deserialize;

/// Top-level application configuration
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub websocket: WebSocketConfig,
}

impl AppConfig {
    /// Load configuration from environment variables (and `.env` if present).
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::with_prefix("BIDHALL")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let app_config: AppConfig = config.try_deserialize()?;
        app_config.validate()?;
        Ok(app_config)
    }

    /// Validate the full configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.websocket.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // Env vars are process-global; serialize the tests that touch them.
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    fn clear_env() {
        for (key, _) in std::env::vars() {
            if key.starts_with("BIDHALL__") {
                std::env::remove_var(key);
            }
        }
    }

    #[test]
    fn load_with_defaults() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();

        let config = AppConfig::load().unwrap();
        assert_eq!(config.server.port, 3080);
        assert_eq!(config.websocket.mailbox_capacity, 512);
    }

    #[test]
    fn env_overrides_defaults() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();

        std::env::set_var("BIDHALL__SERVER__PORT", "4000");
        std::env::set_var("BIDHALL__WEBSOCKET__READ_TIMEOUT_SECS", "30");

        let config = AppConfig::load().unwrap();
        assert_eq!(config.server.port, 4000);
        assert_eq!(config.websocket.read_timeout_secs, 30);

        clear_env();
    }

    #[test]
    fn load_rejects_invalid_values() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();

        std::env::set_var("BIDHALL__WEBSOCKET__MAILBOX_CAPACITY", "0");

        let result = AppConfig::load();
        assert!(result.is_err());

        clear_env();
    }
}
