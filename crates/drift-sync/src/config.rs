//! Session configuration with environment overrides.
//!
//! All settings have sensible defaults so a session can start with zero
//! configuration.

use drift_core::constants::{MESSAGES_CACHE_KEY, WELCOME_TEXT};

/// Tunables for one chat session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Cache key the serialized message list is stored under.
    /// Env: `DRIFT_CACHE_KEY`
    /// Default: `"messages"`
    pub cache_key: String,

    /// Whether to prepend the local system welcome notice when a session
    /// starts with no prior content.
    /// Env: `DRIFT_WELCOME` (true/false)
    /// Default: `true`
    pub welcome_notice: bool,

    /// Text of the welcome notice.
    pub welcome_text: String,

    /// Depth of the command channel into the session task.
    pub command_buffer: usize,

    /// Depth of the notification channel out of the session task.
    pub notification_buffer: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cache_key: MESSAGES_CACHE_KEY.to_string(),
            welcome_notice: true,
            welcome_text: WELCOME_TEXT.to_string(),
            command_buffer: 32,
            notification_buffer: 64,
        }
    }
}

impl SessionConfig {
    /// Load configuration from environment variables, falling back to
    /// defaults.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(key) = std::env::var("DRIFT_CACHE_KEY") {
            if !key.is_empty() {
                config.cache_key = key;
            }
        }

        if let Ok(val) = std::env::var("DRIFT_WELCOME") {
            config.welcome_notice = val != "false" && val != "0";
        }

        config
    }
}
