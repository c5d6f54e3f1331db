//! Configuration module for Driftnet
//!
//! This module handles loading, parsing, and validating TOML configuration
//! files. Every key is optional; omitted keys take the defaults documented
//! on each field.
//!
//! # Example
//!
//! ```no_run
//! use driftnet::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("driftnet.toml")).unwrap();
//! println!("Fetch timeout: {}ms", config.crawler.request_timeout_ms);
//! ```

mod parser;
mod types;
pub mod validation;

// Re-export types
pub use types::{
    Config, CrawlerConfig, NonHtmlPolicy, OutputConfig, TokenizerConfig, UserAgentConfig,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
