//! Output module for reporting on crawl results
//!
//! This module handles:
//! - Loading link, tag and run statistics from storage
//! - Printing them for the `--stats` mode

pub mod stats;

pub use stats::{load_statistics, print_statistics, CrawlStatistics};
