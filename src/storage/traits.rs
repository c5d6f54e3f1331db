//! Storage traits and error types
//!
//! This module defines the trait interface for storage backends and
//! associated error types.

use crate::state::LinkStatus;
use crate::storage::{LinkRecord, RunRecord, RunStatus, TagRecord};
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Link not found: {0}")]
    LinkNotFound(String),

    #[error("Run not found: {0}")]
    RunNotFound(i64),

    #[error("Storage lock poisoned")]
    Poisoned,

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for storage backend implementations
///
/// Every write is atomic at the single-record level. Operations that would
/// otherwise be check-then-act (link discovery, claiming, tag merging) are
/// expressed as single conditional statements so they stay race-free if
/// more than one worker shares the store.
pub trait Storage {
    // ===== Link Repository =====

    /// Gets a link by URL
    fn find_link(&self, url: &str) -> StorageResult<Option<LinkRecord>>;

    /// Creates the link with `status` if absent, otherwise updates its status
    ///
    /// Calling this repeatedly with the same arguments leaves exactly one record.
    fn upsert_link(&mut self, url: &str, status: LinkStatus) -> StorageResult<()>;

    /// Inserts a pending link unless one already exists
    ///
    /// # Returns
    ///
    /// `true` if a new record was created
    fn insert_link_if_absent(&mut self, url: &str) -> StorageResult<bool>;

    /// Gets all pending links that are due for a fetch
    ///
    /// Links whose `retry_after` lies in the future are left out.
    fn find_pending_links(&self) -> StorageResult<Vec<LinkRecord>>;

    /// Atomically moves a link from `Pending` to `InProgress`
    ///
    /// # Returns
    ///
    /// `true` if this caller now owns the link
    fn claim_link(&mut self, url: &str) -> StorageResult<bool>;

    /// Releases a claimed link back to `Pending` after a transient failure
    ///
    /// Increments the attempt counter and records `retry_after`.
    ///
    /// # Returns
    ///
    /// The attempt count after the increment
    fn release_link(
        &mut self,
        url: &str,
        retry_after: Option<DateTime<Utc>>,
    ) -> StorageResult<u32>;

    /// Returns a claimed link to `Pending` without counting an attempt
    fn return_link(&mut self, url: &str) -> StorageResult<()>;

    /// Resets links left `InProgress` by an interrupted process
    ///
    /// # Returns
    ///
    /// The number of links reset
    fn reset_in_progress(&mut self) -> StorageResult<usize>;

    // ===== Tag Repository =====

    /// Gets a tag and all URLs recorded under it
    fn find_tag(&self, name: &str) -> StorageResult<Option<TagRecord>>;

    /// Adds `url` to the tag's URL set, creating the tag if absent
    fn upsert_tag_url(&mut self, name: &str, url: &str) -> StorageResult<()>;

    /// Adds `url` to every tag in `names` inside one transaction
    fn upsert_tag_urls(&mut self, names: &[String], url: &str) -> StorageResult<()>;

    // ===== Run Management =====

    /// Creates a new crawl run
    fn create_run(&mut self, seed: &str, config_hash: &str) -> StorageResult<i64>;

    /// Marks a run as finished with the given status and iteration count
    fn finish_run(&mut self, run_id: i64, status: RunStatus, iterations: u64)
        -> StorageResult<()>;

    /// Gets the most recent run
    fn latest_run(&self) -> StorageResult<Option<RunRecord>>;

    // ===== Statistics =====

    /// Counts links in a specific status
    fn count_links_by_status(&self, status: LinkStatus) -> StorageResult<u64>;

    /// Gets total link count
    fn count_links(&self) -> StorageResult<u64>;

    /// Gets total tag count
    fn count_tags(&self) -> StorageResult<u64>;
}
