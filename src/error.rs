use thiserror::Error;

/// Problems with the process configuration, fatal at startup
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable {0}")]
    Missing(&'static str),

    #[error("Invalid value {value:?} for {var}: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },

    #[error("CONVERSATION_MAX_ENTRIES and CONVERSATION_IDLE_SECS cannot both be set")]
    ConflictingEviction,
}
