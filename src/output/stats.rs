//! Statistics generation from the crawl database
//!
//! This module provides functionality for extracting and displaying
//! crawl statistics from the storage layer.

use crate::state::LinkStatus;
use crate::storage::{RunRecord, Storage};
use crate::DriftnetError;
use std::collections::HashMap;

/// Crawl statistics summary
#[derive(Debug, Clone)]
pub struct CrawlStatistics {
    /// Total number of link records
    pub total_links: u64,

    /// Count of links by status (statuses with no links are left out)
    pub links_by_status: HashMap<LinkStatus, u64>,

    /// Number of distinct tags
    pub total_tags: u64,

    /// Most recent run, if any
    pub latest_run: Option<RunRecord>,
}

impl CrawlStatistics {
    pub fn count(&self, status: LinkStatus) -> u64 {
        self.links_by_status.get(&status).copied().unwrap_or(0)
    }

    /// Links in a terminal status
    pub fn settled(&self) -> u64 {
        self.links_by_status
            .iter()
            .filter(|(status, _)| status.is_terminal())
            .map(|(_, count)| count)
            .sum()
    }
}

/// Loads statistics from storage
///
/// # Arguments
///
/// * `storage` - The storage backend to query
///
/// # Returns
///
/// * `Ok(CrawlStatistics)` - Successfully loaded statistics
/// * `Err(DriftnetError)` - Failed to query statistics
pub fn load_statistics(storage: &dyn Storage) -> Result<CrawlStatistics, DriftnetError> {
    let mut links_by_status = HashMap::new();
    for status in LinkStatus::all_statuses() {
        let count = storage.count_links_by_status(status)?;
        if count > 0 {
            links_by_status.insert(status, count);
        }
    }

    Ok(CrawlStatistics {
        total_links: storage.count_links()?,
        links_by_status,
        total_tags: storage.count_tags()?,
        latest_run: storage.latest_run()?,
    })
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &CrawlStatistics) {
    println!("=== Crawl Statistics ===\n");

    println!("Overview:");
    println!("  Links recorded: {}", stats.total_links);
    println!("  Tags recorded: {}", stats.total_tags);
    println!();

    println!("Links by Status:");
    let mut status_counts: Vec<_> = stats.links_by_status.iter().collect();
    status_counts.sort_by(|a, b| b.1.cmp(a.1));

    for (status, count) in status_counts {
        let percentage = if stats.total_links > 0 {
            (*count as f64 / stats.total_links as f64) * 100.0
        } else {
            0.0
        };
        println!("  {}: {} ({:.1}%)", status, count, percentage);
    }
    println!();

    if let Some(run) = &stats.latest_run {
        println!("Latest Run:");
        println!("  Id: {}", run.id);
        println!("  Seed: {}", run.seed);
        println!("  Status: {}", run.status.to_db_string());
        println!("  Started: {}", run.started_at);
        if let Some(finished) = &run.finished_at {
            println!("  Finished: {}", finished);
        }
        println!("  Iterations: {}", run.iterations);
        println!();
    }

    println!(
        "Settled: {} / {} links ({} still pending)",
        stats.settled(),
        stats.total_links,
        stats.count(LinkStatus::Pending)
    );
}
