/// Application name
pub const APP_NAME: &str = "Drift";

/// Cache key the serialized message list is stored under.
pub const MESSAGES_CACHE_KEY: &str = "messages";

/// Author id substituted for records that arrive without one.
pub const UNKNOWN_AUTHOR_ID: &str = "unknown";

/// Display name substituted for records that arrive without one.
pub const UNKNOWN_AUTHOR_NAME: &str = "Unknown";

/// Author id carried by locally generated session notices.
pub const SYSTEM_AUTHOR_ID: &str = "system";

/// Text of the local welcome notice shown on an empty first session.
pub const WELCOME_TEXT: &str = "You have entered the chat";

/// Maximum attachment upload size in bytes (50 MiB)
pub const MAX_ATTACHMENT_SIZE: usize = 50 * 1024 * 1024;

/// Subdirectory of the platform cache directory holding downloaded audio.
pub const AUDIO_CACHE_SUBDIR: &str = "audio";
