use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for Driftnet
///
/// Every section and key has a default, so an empty file (or no file at
/// all) yields a working configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent", default)]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub tokenizer: TokenizerConfig,
}

/// What to do with a link whose response is not HTML
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NonHtmlPolicy {
    /// Release the link back to pending; it is refetched on a later refill
    #[default]
    LeavePending,
    /// Mark the link as skipped so it is never fetched again
    Skip,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Timeout for a single fetch (milliseconds)
    #[serde(rename = "request-timeout-ms")]
    pub request_timeout_ms: u64,

    /// Value of the Accept header sent with every request
    pub accept: String,

    /// Value of the Accept-Language header sent with every request
    #[serde(rename = "accept-language")]
    pub accept_language: String,

    /// Handling of non-HTML responses
    #[serde(rename = "non-html")]
    pub non_html: NonHtmlPolicy,

    /// Number of transient failures after which a link becomes unavailable
    ///
    /// Unset means links are retried forever.
    #[serde(rename = "max-attempts")]
    pub max_attempts: Option<u32>,

    /// Linear backoff applied per failed attempt (milliseconds, 0 disables)
    #[serde(rename = "retry-backoff-ms")]
    pub retry_backoff_ms: u64,

    /// How long to wait before re-polling an empty backlog (milliseconds)
    ///
    /// Unset means the crawl finishes as soon as nothing is pending.
    #[serde(rename = "idle-poll-ms")]
    pub idle_poll_ms: Option<u64>,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            request_timeout_ms: 5000,
            accept: "text/html, application/xhtml+xml".to_string(),
            accept_language: "en".to_string(),
            non_html: NonHtmlPolicy::default(),
            max_attempts: None,
            retry_backoff_ms: 0,
            idle_poll_ms: None,
        }
    }
}

impl CrawlerConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn idle_poll(&self) -> Option<Duration> {
        self.idle_poll_ms.map(Duration::from_millis)
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: "driftnet".to_string(),
            crawler_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

impl UserAgentConfig {
    /// Formats the User-Agent header value: `Name/Version`
    pub fn header_value(&self) -> String {
        format!("{}/{}", self.crawler_name, self.crawler_version)
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Path to the SQLite database file
    #[serde(rename = "database-path")]
    pub database_path: String,

    /// How long a store call waits on a locked database (milliseconds)
    #[serde(rename = "busy-timeout-ms")]
    pub busy_timeout_ms: u64,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            database_path: "driftnet.db".to_string(),
            busy_timeout_ms: 5000,
        }
    }
}

/// Tag extraction configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TokenizerConfig {
    /// Shortest token kept, in characters
    #[serde(rename = "min-token-length")]
    pub min_token_length: usize,

    /// Maximum number of distinct tokens stored per page
    #[serde(rename = "max-tokens")]
    pub max_tokens: usize,

    /// Words dropped in addition to the built-in English list
    #[serde(rename = "extra-stopwords")]
    pub extra_stopwords: Vec<String>,
}

impl Default for TokenizerConfig {
    fn default() -> Self {
        Self {
            min_token_length: crate::tokenizer::DEFAULT_MIN_TOKEN_LENGTH,
            max_tokens: crate::tokenizer::DEFAULT_MAX_TOKENS,
            extra_stopwords: Vec::new(),
        }
    }
}
