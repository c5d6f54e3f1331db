//! URL handling module for Driftnet
//!
//! Crawling is origin-level: every discovered address is reduced to its
//! scheme, host and port before it is stored. This module provides that
//! reduction, the seed key normalization, and the non-page suffix filter.

mod filter;
mod origin;

pub use filter::is_non_page;
pub use origin::{origin_of, seed_key};
