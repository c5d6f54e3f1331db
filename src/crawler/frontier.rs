//! In-memory work queue backed by the link store
//!
//! The queue is only a cache. Durable truth lives in the store, and the
//! queue is rebuilt from its pending links whenever it runs dry.

use crate::crawler::lock_store;
use crate::storage::{Storage, StorageResult};
use crate::url::seed_key;
use crate::DriftnetError;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Queue of URLs waiting to be dispatched
pub struct Frontier<S: Storage> {
    store: Arc<Mutex<S>>,
    queue: VecDeque<String>,
    processed: u64,
}

impl<S: Storage> Frontier<S> {
    /// Creates an empty frontier over `store`
    pub fn new(store: Arc<Mutex<S>>) -> Self {
        Self {
            store,
            queue: VecDeque::new(),
            processed: 0,
        }
    }

    /// Records the seed as pending and queues it for immediate dispatch
    ///
    /// # Returns
    ///
    /// The key the seed is stored under
    pub fn seed(&mut self, url: &str) -> Result<String, DriftnetError> {
        let key = seed_key(url)?;

        let created = lock_store(&self.store)?.insert_link_if_absent(&key)?;
        if created {
            tracing::debug!("Seed {} recorded as pending", key);
        } else {
            tracing::debug!("Seed {} already known", key);
        }

        self.queue.push_back(key.clone());
        Ok(key)
    }

    /// Pops the next URL, refilling from the store when the queue is empty
    ///
    /// `None` means nothing is pending right now.
    pub fn next(&mut self) -> StorageResult<Option<String>> {
        if self.queue.is_empty() {
            self.refill()?;
        }
        Ok(self.queue.pop_front())
    }

    /// Appends every pending link from the store to the queue
    ///
    /// # Returns
    ///
    /// The number of URLs appended
    pub fn refill(&mut self) -> StorageResult<usize> {
        let pending = lock_store(&self.store)?.find_pending_links()?;
        let count = pending.len();
        self.queue.extend(pending.into_iter().map(|link| link.url));

        if count > 0 {
            tracing::debug!("Refilled frontier with {} pending links", count);
        }
        Ok(count)
    }

    /// Records newly discovered URLs as pending
    ///
    /// URLs already known to the store keep their status. Nothing is pushed
    /// onto the in-memory queue; new links surface on the next refill.
    ///
    /// # Returns
    ///
    /// The number of records created
    pub fn enqueue_discovered(&mut self, urls: &[String]) -> StorageResult<usize> {
        let mut store = lock_store(&self.store)?;
        let mut created = 0;
        for url in urls {
            if store.insert_link_if_absent(url)? {
                created += 1;
            }
        }
        Ok(created)
    }

    pub fn record_processed(&mut self) {
        self.processed += 1;
    }

    /// Number of URLs dispatched so far
    pub fn processed(&self) -> u64 {
        self.processed
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}
