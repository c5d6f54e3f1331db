//! Crawler module for web page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching and failure classification
//! - HTML link and content extraction
//! - The store-backed frontier
//! - The crawl loop and its stop channel

mod control;
mod engine;
mod extractor;
mod fetcher;
mod frontier;

pub use control::{
    parse_command, spawn_control_listener, stdin_lines, ControlCommand, STOP_TOKENS,
};
pub use engine::{CrawlSummary, Engine};
pub use extractor::{extract_content, extract_links};
pub use fetcher::{FetchedPage, Fetcher, TransportError};
pub use frontier::Frontier;

use crate::storage::{StorageError, StorageResult};
use std::sync::{Mutex, MutexGuard};

/// Locks the shared store, mapping a poisoned lock to a storage error
pub(crate) fn lock_store<S>(store: &Mutex<S>) -> StorageResult<MutexGuard<'_, S>> {
    store.lock().map_err(|_| StorageError::Poisoned)
}
