//! State module for tracking crawl progress
//!
//! `LinkStatus` is the per-URL state machine shared by the engine and the
//! store: `Pending -> InProgress -> {Done, Unavailable, Skipped}`, with
//! `InProgress -> Pending` whenever a claim is released.

mod link_status;

pub use link_status::LinkStatus;
