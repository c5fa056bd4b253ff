//! Error types for the outage relay.

use thiserror::Error;

/// Errors that can occur when delivering a message to a channel.
#[derive(Debug, Error)]
pub enum ChannelError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Rate limited by the service
    #[error("Rate limited, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    /// Other error
    #[error("{0}")]
    Other(String),
}

/// Errors raised while loading the relay configuration at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No delivery destination was provided
    #[error("Missing delivery destination: set {0}")]
    MissingWebhook(&'static str),

    /// The delivery destination is not a usable URL
    #[error("Invalid webhook URL `{url}`: {reason}")]
    InvalidWebhook { url: String, reason: String },

    /// The allow-list names an event kind that does not exist
    #[error("Unknown event kind `{0}`")]
    UnknownEventKind(String),

    /// The allow-list was set but names no event kind
    #[error("Event allow-list `{0}` names no event kinds")]
    EmptyEventList(String),

    /// The debounce window is not a positive integer
    #[error("Invalid debounce window `{0}`: expected a positive number of milliseconds")]
    InvalidDebounce(String),

    /// The view link template has no `{id}` placeholder
    #[error("Invalid view URL template `{0}`: missing {{id}} placeholder")]
    InvalidViewUrl(String),
}
