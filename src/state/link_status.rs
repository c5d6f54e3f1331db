/// Link status definitions for tracking crawl progress
///
/// Every stored link carries exactly one of these statuses.
use std::fmt;

/// Represents the current status of a link in the crawl process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LinkStatus {
    // ===== Active States =====
    /// Link has been discovered and is waiting to be fetched
    Pending,

    /// Link is claimed by the engine and currently being processed
    InProgress,

    // ===== Terminal States =====
    /// Link was fetched as HTML and fully processed
    Done,

    /// Link failed with a durable negative result (DNS failure or HTTP >= 400)
    Unavailable,

    /// Link returned non-HTML content and the skip policy is active
    Skipped,
}

impl LinkStatus {
    /// Returns true if this is a terminal status (the link is never revisited)
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Unavailable | Self::Skipped)
    }

    /// Converts the status to its database string representation
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Done => "done",
            Self::Unavailable => "unavailable",
            Self::Skipped => "skipped",
        }
    }

    /// Parses a status from its database string representation
    ///
    /// Returns None if the string doesn't match any known status.
    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "in_progress" => Some(Self::InProgress),
            "done" => Some(Self::Done),
            "unavailable" => Some(Self::Unavailable),
            "skipped" => Some(Self::Skipped),
            _ => None,
        }
    }

    /// Returns all possible statuses
    pub fn all_statuses() -> Vec<Self> {
        vec![
            Self::Pending,
            Self::InProgress,
            Self::Done,
            Self::Unavailable,
            Self::Skipped,
        ]
    }
}

impl fmt::Display for LinkStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_string())
    }
}
