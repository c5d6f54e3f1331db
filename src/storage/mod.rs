//! Storage module for persisting crawl data
//!
//! The store is the single source of truth for the crawl:
//! - Link records (one per discovered origin, keyed by URL)
//! - Tag records (inverted index from content word to URLs)
//! - Run bookkeeping (one record per process lifetime)
//!
//! The in-memory frontier is only ever a cache of what this module returns.

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteStorage;
pub use traits::{Storage, StorageError, StorageResult};

use crate::state::LinkStatus;
use crate::DriftnetError;
use chrono::{DateTime, Utc};
use std::collections::BTreeSet;
use std::path::Path;
use std::time::Duration;

/// Initializes or opens a storage database
///
/// # Arguments
///
/// * `path` - Path to the SQLite database file
/// * `busy_timeout` - How long a statement waits on a locked database
pub fn open_storage(path: &Path, busy_timeout: Duration) -> Result<SqliteStorage, DriftnetError> {
    SqliteStorage::open(path, busy_timeout)
}

/// Represents a discovered link in the database
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkRecord {
    pub url: String,
    pub status: LinkStatus,
    /// Transient failures recorded so far
    pub attempts: u32,
    /// Not returned by refill before this instant
    pub retry_after: Option<DateTime<Utc>>,
    pub discovered_at: String,
    pub updated_at: Option<String>,
}

/// Represents one entry of the inverted tag index
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagRecord {
    pub name: String,
    pub urls: BTreeSet<String>,
}

/// Represents a crawl run
#[derive(Debug, Clone)]
pub struct RunRecord {
    pub id: i64,
    pub seed: String,
    pub started_at: String,
    pub finished_at: Option<String>,
    pub config_hash: String,
    pub status: RunStatus,
    pub iterations: u64,
}

/// Status of a crawl run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Running,
    Completed,
    Interrupted,
    Failed,
}

impl RunStatus {
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Interrupted => "interrupted",
            Self::Failed => "failed",
        }
    }

    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "running" => Some(Self::Running),
            "completed" => Some(Self::Completed),
            "interrupted" => Some(Self::Interrupted),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}
