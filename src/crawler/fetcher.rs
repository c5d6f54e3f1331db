//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building the HTTP client with the configured headers and timeout
//! - GET requests returning the raw body and its Content-Type
//! - Classifying transport failures
//!
//! The fetcher never retries. Retry policy belongs to the engine.

use crate::config::{CrawlerConfig, UserAgentConfig};
use crate::{ConfigError, DriftnetError};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CONTENT_TYPE};
use reqwest::{Client, StatusCode};
use std::error::Error as StdError;
use thiserror::Error;

/// Failure of a single fetch
#[derive(Debug, Error)]
pub enum TransportError {
    /// The host name could not be resolved
    #[error("Host not found for {url}")]
    NotFound { url: String },

    /// The server answered with an error status (>= 400)
    #[error("HTTP {status} from {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("Timed out fetching {url}")]
    Timeout { url: String },

    #[error("Transport failure for {url}: {message}")]
    Other { url: String, message: String },
}

impl TransportError {
    /// Returns true when retrying the URL is pointless
    pub fn is_durable_negative(&self) -> bool {
        match self {
            Self::NotFound { .. } => true,
            Self::HttpStatus { status, .. } => *status >= 400,
            Self::Timeout { .. } | Self::Other { .. } => false,
        }
    }
}

/// A successfully fetched response
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// Raw response body
    pub body: Vec<u8>,
    /// Content-Type header value, empty when the server sent none
    pub content_type: String,
}

impl FetchedPage {
    /// Returns true when the Content-Type names an HTML media type
    pub fn is_html(&self) -> bool {
        self.content_type.to_ascii_lowercase().contains("html")
    }
}

/// HTTP fetcher bound to one configured client
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
}

impl Fetcher {
    /// Builds a fetcher from the crawler and user agent configuration
    ///
    /// # Arguments
    ///
    /// * `crawler` - Timeout and default request headers
    /// * `user_agent` - Identification sent as `Name/Version`
    ///
    /// # Returns
    ///
    /// * `Ok(Fetcher)` - Successfully built HTTP client
    /// * `Err(DriftnetError)` - A header value is invalid or the client failed to build
    pub fn new(crawler: &CrawlerConfig, user_agent: &UserAgentConfig) -> Result<Self, DriftnetError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, header_value("accept", &crawler.accept)?);
        headers.insert(
            ACCEPT_LANGUAGE,
            header_value("accept-language", &crawler.accept_language)?,
        );

        let client = Client::builder()
            .user_agent(user_agent.header_value())
            .default_headers(headers)
            .timeout(crawler.request_timeout())
            .gzip(true)
            .brotli(true)
            .build()?;

        Ok(Self { client })
    }

    /// Fetches `url` and returns its body and Content-Type
    ///
    /// Redirects are followed by the client. Any status of 400 or above is
    /// an error, as is a body that cannot be read in time.
    pub async fn fetch(&self, url: &str) -> Result<FetchedPage, TransportError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| classify(url, e))?;

        let status = response.status();
        if is_error_status(status) {
            return Err(TransportError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        let body = response.bytes().await.map_err(|e| classify(url, e))?;

        Ok(FetchedPage {
            body: body.to_vec(),
            content_type,
        })
    }
}

fn header_value(name: &str, value: &str) -> Result<HeaderValue, DriftnetError> {
    HeaderValue::from_str(value).map_err(|_| {
        ConfigError::Validation(format!("crawler.{} is not a valid header value", name)).into()
    })
}

/// Any status of 400 or above, including nonstandard codes past 599
fn is_error_status(status: StatusCode) -> bool {
    status.as_u16() >= 400
}

/// Maps a reqwest failure onto a transport error kind
fn classify(url: &str, error: reqwest::Error) -> TransportError {
    let url = url.to_string();

    if error.is_timeout() {
        return TransportError::Timeout { url };
    }

    if is_dns_failure(&error) {
        return TransportError::NotFound { url };
    }

    if let Some(status) = error.status().filter(|s| is_error_status(*s)) {
        return TransportError::HttpStatus {
            url,
            status: status.as_u16(),
        };
    }

    TransportError::Other {
        url,
        message: error.to_string(),
    }
}

/// Resolver failures only surface as text somewhere in the source chain
fn is_dns_failure(error: &reqwest::Error) -> bool {
    let mut source: Option<&(dyn StdError + 'static)> = Some(error);
    while let Some(err) = source {
        let message = err.to_string();
        if message.contains("dns error") || message.contains("failed to lookup address") {
            return true;
        }
        source = err.source();
    }
    false
}
