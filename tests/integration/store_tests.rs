//! Integration tests for the on-disk store
//!
//! These tests open real database files in temporary directories to check
//! that crawl state survives a restart.

use driftnet::config::load_config_with_hash;
use driftnet::output::load_statistics;
use driftnet::state::LinkStatus;
use driftnet::storage::{open_storage, RunStatus, Storage};
use std::io::Write;
use std::time::Duration;
use tempfile::{NamedTempFile, TempDir};

const BUSY_TIMEOUT: Duration = Duration::from_millis(500);

#[test]
fn test_state_survives_reopen() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("crawl.db");

    {
        let mut storage = open_storage(&db_path, BUSY_TIMEOUT).unwrap();
        storage.upsert_link("http://a.example", LinkStatus::Done).unwrap();
        storage.insert_link_if_absent("http://b.example").unwrap();
        storage.upsert_tag_url("rust", "http://a.example").unwrap();
    }

    let storage = open_storage(&db_path, BUSY_TIMEOUT).unwrap();
    assert_eq!(
        storage.find_link("http://a.example").unwrap().unwrap().status,
        LinkStatus::Done
    );
    assert_eq!(storage.find_pending_links().unwrap().len(), 1);
    assert_eq!(storage.find_tag("rust").unwrap().unwrap().urls.len(), 1);
}

#[test]
fn test_claimed_links_recovered_after_crash() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("crawl.db");

    {
        let mut storage = open_storage(&db_path, BUSY_TIMEOUT).unwrap();
        storage.insert_link_if_absent("http://a.example").unwrap();
        assert!(storage.claim_link("http://a.example").unwrap());
        // Dropped while the link is still claimed
    }

    let mut storage = open_storage(&db_path, BUSY_TIMEOUT).unwrap();
    assert!(storage.find_pending_links().unwrap().is_empty());

    assert_eq!(storage.reset_in_progress().unwrap(), 1);
    assert_eq!(
        storage.find_link("http://a.example").unwrap().unwrap().status,
        LinkStatus::Pending
    );
    assert!(storage.claim_link("http://a.example").unwrap());
}

#[test]
fn test_run_records_config_hash() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("crawl.db");

    let mut config_file = NamedTempFile::new().unwrap();
    config_file
        .write_all(b"[crawler]\nrequest-timeout-ms = 1500\n")
        .unwrap();
    config_file.flush().unwrap();

    let (config, hash) = load_config_with_hash(config_file.path()).unwrap();
    assert_eq!(config.crawler.request_timeout_ms, 1500);
    assert_eq!(hash.len(), 64);

    let mut storage = open_storage(&db_path, BUSY_TIMEOUT).unwrap();
    let run_id = storage.create_run("http://a.example", &hash).unwrap();
    storage.finish_run(run_id, RunStatus::Completed, 3).unwrap();

    let stats = load_statistics(&storage).unwrap();
    let run = stats.latest_run.unwrap();
    assert_eq!(run.config_hash, hash);
    assert_eq!(run.iterations, 3);
    assert_eq!(run.status, RunStatus::Completed);
}
