//! Crawl engine - the main crawl loop
//!
//! Each iteration takes one URL from the frontier, claims it in the store,
//! fetches it and settles its status:
//! - HTML pages have their origins and tags recorded and become `Done`
//! - Non-HTML responses are returned to `Pending` or marked `Skipped`
//! - DNS failures and error statuses mark the URL `Unavailable`
//! - Every other failure releases the URL for another attempt
//!
//! The loop ends when the cancellation token fires or, without an idle
//! poll interval, when nothing is pending.

use crate::config::{Config, CrawlerConfig, NonHtmlPolicy};
use crate::crawler::extractor::{extract_content, extract_links};
use crate::crawler::fetcher::Fetcher;
use crate::crawler::frontier::Frontier;
use crate::crawler::lock_store;
use crate::state::LinkStatus;
use crate::storage::Storage;
use crate::tokenizer::Tokenizer;
use crate::DriftnetError;
use chrono::{DateTime, Utc};
use scraper::Html;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

/// Wait after a failed refill when no idle poll interval is configured
const STORE_RETRY_DELAY: Duration = Duration::from_secs(1);

/// Totals reported when the crawl loop exits
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlSummary {
    /// URLs taken through a full iteration
    pub iterations: u64,
    pub done: u64,
    pub unavailable: u64,
    pub skipped: u64,
    /// Non-HTML responses returned to pending
    pub deferred: u64,
    /// Transient failures released for another attempt
    pub retried: u64,
    /// New link records created from extracted origins
    pub links_discovered: u64,
    /// True when the loop ended on a stop request rather than running dry
    pub stopped: bool,
}

/// How one claimed URL was settled
#[derive(Debug)]
enum Outcome {
    Done { links: usize, created: usize, tags: usize },
    Deferred { content_type: String },
    Skipped { content_type: String },
    Unavailable,
    Retried { attempts: u32 },
    /// The URL was no longer pending when dequeued
    Stale,
    /// The store failed before the URL could be settled
    Unsettled,
}

enum Visit {
    Html { links: usize, created: usize, tags: usize },
    NotHtml { content_type: String },
}

/// Main crawl engine
pub struct Engine<S: Storage> {
    store: Arc<Mutex<S>>,
    frontier: Frontier<S>,
    fetcher: Fetcher,
    tokenizer: Tokenizer,
    config: CrawlerConfig,
    cancel: CancellationToken,
}

impl<S: Storage> Engine<S> {
    /// Creates an engine over `store`
    ///
    /// # Arguments
    ///
    /// * `store` - The shared link and tag store
    /// * `config` - Crawler, user agent and tokenizer settings
    /// * `cancel` - Token that stops the loop after the current iteration
    pub fn new(
        store: Arc<Mutex<S>>,
        config: &Config,
        cancel: CancellationToken,
    ) -> Result<Self, DriftnetError> {
        let fetcher = Fetcher::new(&config.crawler, &config.user_agent)?;

        Ok(Self {
            frontier: Frontier::new(Arc::clone(&store)),
            store,
            fetcher,
            tokenizer: Tokenizer::from_config(&config.tokenizer),
            config: config.crawler.clone(),
            cancel,
        })
    }

    /// Seeds the frontier, returning the stored seed key
    pub fn seed(&mut self, url: &str) -> Result<String, DriftnetError> {
        self.frontier.seed(url)
    }

    /// Runs the crawl loop until stopped or out of work
    pub async fn run(&mut self) -> Result<CrawlSummary, DriftnetError> {
        let mut summary = CrawlSummary::default();
        let start_time = Instant::now();

        tracing::info!("Starting crawl loop");

        loop {
            let url = match self.frontier.next() {
                Ok(Some(url)) => url,
                Ok(None) => match self.config.idle_poll() {
                    None => {
                        tracing::info!("No pending links left, crawl complete");
                        break;
                    }
                    Some(wait) => {
                        tracing::debug!("Nothing pending, waiting {:?}", wait);
                        if self.idle(wait).await {
                            summary.stopped = true;
                            break;
                        }
                        continue;
                    }
                },
                Err(e) => {
                    tracing::warn!("Failed to refill frontier: {}", e);
                    let wait = self.config.idle_poll().unwrap_or(STORE_RETRY_DELAY);
                    if self.idle(wait).await {
                        summary.stopped = true;
                        break;
                    }
                    continue;
                }
            };

            let outcome = self.process_url(&url).await;
            summary.record(&outcome);

            if !matches!(outcome, Outcome::Stale) {
                self.frontier.record_processed();
                summary.iterations += 1;
                self.log_outcome(summary.iterations, &url, &outcome);

                if summary.iterations % 10 == 0 {
                    let rate = summary.iterations as f64 / start_time.elapsed().as_secs_f64();
                    tracing::info!(
                        "Progress: {} URLs processed, {} queued, {:.2} URLs/sec",
                        self.frontier.processed(),
                        self.frontier.len(),
                        rate
                    );
                }
            }

            if self.cancel.is_cancelled() {
                tracing::info!("Stop requested, leaving crawl loop");
                summary.stopped = true;
                break;
            }
        }

        tracing::info!(
            "Crawl finished: {} URLs processed in {:?} ({} done, {} unavailable, {} new links)",
            summary.iterations,
            start_time.elapsed(),
            summary.done,
            summary.unavailable,
            summary.links_discovered
        );

        Ok(summary)
    }

    /// Waits for `wait` or the stop signal; returns true when stopped
    async fn idle(&self, wait: Duration) -> bool {
        tokio::select! {
            _ = self.cancel.cancelled() => {
                tracing::info!("Stop requested while idle");
                true
            }
            _ = tokio::time::sleep(wait) => false,
        }
    }

    /// Claims, fetches and settles a single URL
    async fn process_url(&mut self, url: &str) -> Outcome {
        match lock_store(&self.store).and_then(|mut store| store.claim_link(url)) {
            Ok(true) => {}
            Ok(false) => {
                tracing::debug!("Skipping {}: no longer pending", url);
                return Outcome::Stale;
            }
            Err(e) => {
                tracing::warn!("Failed to claim {}: {}", url, e);
                return Outcome::Unsettled;
            }
        }

        match self.visit(url).await {
            Ok(Visit::Html {
                links,
                created,
                tags,
            }) => Outcome::Done {
                links,
                created,
                tags,
            },
            Ok(Visit::NotHtml { content_type }) => self.settle_non_html(url, content_type),
            Err(e) => self.settle_failure(url, e),
        }
    }

    /// Fetches `url` and, for HTML, records its links and tags
    async fn visit(&mut self, url: &str) -> Result<Visit, DriftnetError> {
        let page = self.fetcher.fetch(url).await?;

        if !page.is_html() {
            return Ok(Visit::NotHtml {
                content_type: page.content_type,
            });
        }

        let body = String::from_utf8_lossy(&page.body);
        let (links, content) = {
            let document = Html::parse_document(&body);
            (extract_links(&document, url)?, extract_content(&document))
        };

        let created = self.frontier.enqueue_discovered(&links)?;
        let tags = self.tokenizer.tokenize(&content);

        let mut store = lock_store(&self.store)?;
        store.upsert_tag_urls(&tags, url)?;
        store.upsert_link(url, LinkStatus::Done)?;

        Ok(Visit::Html {
            links: links.len(),
            created,
            tags: tags.len(),
        })
    }

    fn settle_non_html(&mut self, url: &str, content_type: String) -> Outcome {
        let result = lock_store(&self.store).and_then(|mut store| match self.config.non_html {
            NonHtmlPolicy::LeavePending => store.return_link(url),
            NonHtmlPolicy::Skip => store.upsert_link(url, LinkStatus::Skipped),
        });

        match (result, self.config.non_html) {
            (Err(e), _) => {
                tracing::warn!("Failed to settle non-HTML {}: {}", url, e);
                self.unclaim(url)
            }
            (Ok(()), NonHtmlPolicy::LeavePending) => Outcome::Deferred { content_type },
            (Ok(()), NonHtmlPolicy::Skip) => Outcome::Skipped { content_type },
        }
    }

    fn settle_failure(&mut self, url: &str, error: DriftnetError) -> Outcome {
        if error.is_durable_negative() {
            tracing::warn!("{} unavailable: {}", url, error);
            return match lock_store(&self.store)
                .and_then(|mut store| store.upsert_link(url, LinkStatus::Unavailable))
            {
                Ok(()) => Outcome::Unavailable,
                Err(e) => {
                    tracing::warn!("Failed to mark {} unavailable: {}", url, e);
                    self.unclaim(url)
                }
            };
        }

        tracing::warn!("Failed to process {}: {}", url, error);

        let released = lock_store(&self.store).and_then(|mut store| {
            let previous = store.find_link(url)?.map_or(0, |link| link.attempts);
            let attempts = store.release_link(url, self.retry_after(previous + 1))?;

            match self.config.max_attempts {
                Some(max) if attempts >= max => {
                    store.upsert_link(url, LinkStatus::Unavailable)?;
                    Ok(None)
                }
                _ => Ok(Some(attempts)),
            }
        });

        match released {
            Ok(Some(attempts)) => Outcome::Retried { attempts },
            Ok(None) => {
                tracing::warn!("{} unavailable after repeated failures", url);
                Outcome::Unavailable
            }
            Err(e) => {
                tracing::warn!("Failed to release {}: {}", url, e);
                self.unclaim(url)
            }
        }
    }

    /// Returns a claimed URL to `Pending` after its outcome could not be stored
    ///
    /// If even that fails the URL stays `InProgress` until the next startup
    /// resets it.
    fn unclaim(&self, url: &str) -> Outcome {
        match lock_store(&self.store).and_then(|mut store| store.return_link(url)) {
            Ok(()) => tracing::debug!("Returned {} to pending", url),
            Err(e) => tracing::error!(
                "{} stays in progress until restart, return failed: {}",
                url,
                e
            ),
        }
        Outcome::Unsettled
    }

    /// Linear backoff: the n-th failure waits n times the configured step
    fn retry_after(&self, attempts: u32) -> Option<DateTime<Utc>> {
        if self.config.retry_backoff_ms == 0 {
            return None;
        }
        let delay = Duration::from_millis(
            self.config
                .retry_backoff_ms
                .saturating_mul(u64::from(attempts)),
        );
        chrono::Duration::from_std(delay)
            .ok()
            .and_then(|delay| Utc::now().checked_add_signed(delay))
    }

    fn log_outcome(&self, iteration: u64, url: &str, outcome: &Outcome) {
        match outcome {
            Outcome::Done {
                links,
                created,
                tags,
            } => tracing::info!(
                "[{}] {} done: {} origins ({} new), {} tags",
                iteration,
                url,
                links,
                created,
                tags
            ),
            Outcome::Deferred { content_type } => tracing::info!(
                "[{}] {} is not HTML ({}), left pending",
                iteration,
                url,
                content_type
            ),
            Outcome::Skipped { content_type } => tracing::info!(
                "[{}] {} is not HTML ({}), skipped",
                iteration,
                url,
                content_type
            ),
            Outcome::Unavailable => tracing::info!("[{}] {} unavailable", iteration, url),
            Outcome::Retried { attempts } => tracing::info!(
                "[{}] {} released after attempt {}",
                iteration,
                url,
                attempts
            ),
            Outcome::Unsettled => tracing::info!("[{}] {} left unsettled", iteration, url),
            Outcome::Stale => {}
        }
    }
}

impl CrawlSummary {
    fn record(&mut self, outcome: &Outcome) {
        match outcome {
            Outcome::Done { created, .. } => {
                self.done += 1;
                self.links_discovered += *created as u64;
            }
            Outcome::Deferred { .. } => self.deferred += 1,
            Outcome::Skipped { .. } => self.skipped += 1,
            Outcome::Unavailable => self.unavailable += 1,
            Outcome::Retried { .. } => self.retried += 1,
            Outcome::Stale | Outcome::Unsettled => {}
        }
    }
}
