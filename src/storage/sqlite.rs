//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the Storage trait.

use crate::state::LinkStatus;
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{Storage, StorageError, StorageResult};
use crate::storage::{LinkRecord, RunRecord, RunStatus, TagRecord};
use crate::DriftnetError;
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use std::time::Duration;

const LINK_COLUMNS: &str = "url, status, attempts, retry_after, discovered_at, updated_at";

/// Default time a statement waits on a locked database
const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Fixed-width UTC timestamp, so stored values compare lexically
fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn now() -> String {
    timestamp(Utc::now())
}

fn link_from_row(row: &Row<'_>) -> rusqlite::Result<LinkRecord> {
    let retry_after: Option<String> = row.get(3)?;
    Ok(LinkRecord {
        url: row.get(0)?,
        status: LinkStatus::from_db_string(&row.get::<_, String>(1)?)
            .unwrap_or(LinkStatus::Pending),
        attempts: row.get(2)?,
        retry_after: retry_after.and_then(|s| s.parse::<DateTime<Utc>>().ok()),
        discovered_at: row.get(4)?,
        updated_at: row.get(5)?,
    })
}

fn run_from_row(row: &Row<'_>) -> rusqlite::Result<RunRecord> {
    Ok(RunRecord {
        id: row.get(0)?,
        seed: row.get(1)?,
        started_at: row.get(2)?,
        finished_at: row.get(3)?,
        config_hash: row.get(4)?,
        status: RunStatus::from_db_string(&row.get::<_, String>(5)?)
            .unwrap_or(RunStatus::Running),
        iterations: row.get::<_, i64>(6)? as u64,
    })
}

/// SQLite storage backend
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Opens (or creates) a database with the default busy timeout
    pub fn new(path: &Path) -> Result<Self, DriftnetError> {
        Self::open(path, DEFAULT_BUSY_TIMEOUT)
    }

    /// Opens (or creates) a database at `path`
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    /// * `busy_timeout` - How long a statement waits on a locked database
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteStorage)` - Successfully opened/created database
    /// * `Err(DriftnetError)` - Failed to open database
    pub fn open(path: &Path, busy_timeout: Duration) -> Result<Self, DriftnetError> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
            PRAGMA temp_store = MEMORY;
        ",
        )?;
        conn.busy_timeout(busy_timeout)?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database (for tests and dry runs)
    pub fn new_in_memory() -> Result<Self, DriftnetError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }
}

impl Storage for SqliteStorage {
    // ===== Link Repository =====

    fn find_link(&self, url: &str) -> StorageResult<Option<LinkRecord>> {
        let link = self
            .conn
            .query_row(
                &format!("SELECT {} FROM links WHERE url = ?1", LINK_COLUMNS),
                params![url],
                link_from_row,
            )
            .optional()?;
        Ok(link)
    }

    fn upsert_link(&mut self, url: &str, status: LinkStatus) -> StorageResult<()> {
        let now = now();
        self.conn.execute(
            "INSERT INTO links (url, status, discovered_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(url) DO UPDATE SET status = excluded.status, updated_at = ?3",
            params![url, status.to_db_string(), now],
        )?;
        Ok(())
    }

    fn insert_link_if_absent(&mut self, url: &str) -> StorageResult<bool> {
        let inserted = self.conn.execute(
            "INSERT OR IGNORE INTO links (url, status, discovered_at) VALUES (?1, ?2, ?3)",
            params![url, LinkStatus::Pending.to_db_string(), now()],
        )?;
        Ok(inserted == 1)
    }

    fn find_pending_links(&self) -> StorageResult<Vec<LinkRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM links
             WHERE status = ?1 AND (retry_after IS NULL OR retry_after <= ?2)
             ORDER BY rowid",
            LINK_COLUMNS
        ))?;

        let links = stmt
            .query_map(
                params![LinkStatus::Pending.to_db_string(), now()],
                link_from_row,
            )?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(links)
    }

    fn claim_link(&mut self, url: &str) -> StorageResult<bool> {
        let claimed = self.conn.execute(
            "UPDATE links SET status = ?1, updated_at = ?2 WHERE url = ?3 AND status = ?4",
            params![
                LinkStatus::InProgress.to_db_string(),
                now(),
                url,
                LinkStatus::Pending.to_db_string()
            ],
        )?;
        Ok(claimed == 1)
    }

    fn release_link(
        &mut self,
        url: &str,
        retry_after: Option<DateTime<Utc>>,
    ) -> StorageResult<u32> {
        self.conn.execute(
            "UPDATE links SET status = ?1, attempts = attempts + 1, retry_after = ?2, updated_at = ?3
             WHERE url = ?4 AND status = ?5",
            params![
                LinkStatus::Pending.to_db_string(),
                retry_after.map(timestamp),
                now(),
                url,
                LinkStatus::InProgress.to_db_string()
            ],
        )?;

        let attempts: Option<u32> = self
            .conn
            .query_row(
                "SELECT attempts FROM links WHERE url = ?1",
                params![url],
                |row| row.get(0),
            )
            .optional()?;

        attempts.ok_or_else(|| StorageError::LinkNotFound(url.to_string()))
    }

    fn return_link(&mut self, url: &str) -> StorageResult<()> {
        self.conn.execute(
            "UPDATE links SET status = ?1, updated_at = ?2 WHERE url = ?3 AND status = ?4",
            params![
                LinkStatus::Pending.to_db_string(),
                now(),
                url,
                LinkStatus::InProgress.to_db_string()
            ],
        )?;
        Ok(())
    }

    fn reset_in_progress(&mut self) -> StorageResult<usize> {
        let reset = self.conn.execute(
            "UPDATE links SET status = ?1, updated_at = ?2 WHERE status = ?3",
            params![
                LinkStatus::Pending.to_db_string(),
                now(),
                LinkStatus::InProgress.to_db_string()
            ],
        )?;
        Ok(reset)
    }

    // ===== Tag Repository =====

    fn find_tag(&self, name: &str) -> StorageResult<Option<TagRecord>> {
        let exists: Option<String> = self
            .conn
            .query_row(
                "SELECT name FROM tags WHERE name = ?1",
                params![name],
                |row| row.get(0),
            )
            .optional()?;

        let Some(name) = exists else {
            return Ok(None);
        };

        let mut stmt = self
            .conn
            .prepare("SELECT url FROM tag_urls WHERE tag_name = ?1 ORDER BY id")?;
        let urls = stmt
            .query_map(params![name], |row| row.get::<_, String>(0))?
            .collect::<Result<_, _>>()?;

        Ok(Some(TagRecord { name, urls }))
    }

    fn upsert_tag_url(&mut self, name: &str, url: &str) -> StorageResult<()> {
        self.upsert_tag_urls(&[name.to_string()], url)
    }

    fn upsert_tag_urls(&mut self, names: &[String], url: &str) -> StorageResult<()> {
        let now = now();
        let tx = self.conn.transaction()?;
        {
            let mut insert_tag =
                tx.prepare("INSERT OR IGNORE INTO tags (name, created_at) VALUES (?1, ?2)")?;
            let mut insert_url =
                tx.prepare("INSERT OR IGNORE INTO tag_urls (tag_name, url) VALUES (?1, ?2)")?;

            for name in names {
                insert_tag.execute(params![name, now])?;
                insert_url.execute(params![name, url])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    // ===== Run Management =====

    fn create_run(&mut self, seed: &str, config_hash: &str) -> StorageResult<i64> {
        self.conn.execute(
            "INSERT INTO runs (seed, started_at, config_hash, status) VALUES (?1, ?2, ?3, ?4)",
            params![seed, now(), config_hash, RunStatus::Running.to_db_string()],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn finish_run(
        &mut self,
        run_id: i64,
        status: RunStatus,
        iterations: u64,
    ) -> StorageResult<()> {
        let updated = self.conn.execute(
            "UPDATE runs SET status = ?1, finished_at = ?2, iterations = ?3 WHERE id = ?4",
            params![status.to_db_string(), now(), iterations as i64, run_id],
        )?;
        if updated == 0 {
            return Err(StorageError::RunNotFound(run_id));
        }
        Ok(())
    }

    fn latest_run(&self) -> StorageResult<Option<RunRecord>> {
        let run = self
            .conn
            .query_row(
                "SELECT id, seed, started_at, finished_at, config_hash, status, iterations
                 FROM runs ORDER BY id DESC LIMIT 1",
                [],
                run_from_row,
            )
            .optional()?;
        Ok(run)
    }

    // ===== Statistics =====

    fn count_links_by_status(&self, status: LinkStatus) -> StorageResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM links WHERE status = ?1",
            params![status.to_db_string()],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    fn count_links(&self) -> StorageResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM links", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    fn count_tags(&self) -> StorageResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM tags", [], |row| row.get(0))?;
        Ok(count as u64)
    }
}
