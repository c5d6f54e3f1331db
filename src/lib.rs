//! Driftnet: a continuous origin-level web crawler
//!
//! This crate crawls outward from a seed address, records every origin it
//! discovers in a durable link graph, and builds an inverted tag index from
//! the salient text of each HTML page it visits.

pub mod config;
pub mod crawler;
pub mod output;
pub mod state;
pub mod storage;
pub mod tokenizer;
pub mod url;

use thiserror::Error;

/// Main error type for Driftnet operations
#[derive(Debug, Error)]
pub enum DriftnetError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Transport error: {0}")]
    Transport(#[from] crawler::TransportError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("URL error: {0}")]
    Url(#[from] UrlError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Parse error for {url}: {message}")]
    Parse { url: String, message: String },
}

impl DriftnetError {
    /// Returns true when the failure is a durable negative result for the URL
    ///
    /// Only DNS resolution failures and HTTP statuses of 400 and above count.
    /// Everything else (timeouts, parse failures, store failures) is treated
    /// as transient.
    pub fn is_durable_negative(&self) -> bool {
        matches!(self, Self::Transport(e) if e.is_durable_negative())
    }
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL")]
    MissingHost,
}

/// Result type alias for Driftnet operations
pub type Result<T> = std::result::Result<T, DriftnetError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use state::LinkStatus;
pub use tokenizer::Tokenizer;
pub use url::{is_non_page, origin_of, seed_key};
