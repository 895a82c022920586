//! Phase definitions for a crawl run
//!
//! A run moves forward only: `Init -> Sweep -> Discover -> (Resolve -> Gate
//! -> Fetch)* -> Done`. A link that stops early hands over to `Resolve` for
//! the next link.

use std::fmt;

/// Represents the current phase of a crawl run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrawlPhase {
    /// Destination directory is being prepared
    Init,

    /// Stale partial downloads are being removed
    Sweep,

    /// The index page is being fetched and its links extracted
    Discover,

    /// A candidate link is being resolved to a download URL
    Resolve,

    /// The download gate is deciding whether to fetch
    Gate,

    /// A file transfer is in progress
    Fetch,

    /// The run has finished
    Done,
}

impl CrawlPhase {
    /// Returns true if the machine may move from `self` to `next`
    pub fn can_transition_to(&self, next: CrawlPhase) -> bool {
        use CrawlPhase::*;

        matches!(
            (self, next),
            (Init, Sweep)
                | (Init, Discover)
                | (Sweep, Discover)
                | (Discover, Resolve)
                | (Discover, Done)
                | (Resolve, Resolve)
                | (Resolve, Gate)
                | (Resolve, Done)
                | (Gate, Fetch)
                | (Gate, Resolve)
                | (Gate, Done)
                | (Fetch, Resolve)
                | (Fetch, Done)
        )
    }

    /// Returns true once the run can make no further progress
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Init => "init",
            Self::Sweep => "sweep",
            Self::Discover => "discover",
            Self::Resolve => "resolve",
            Self::Gate => "gate",
            Self::Fetch => "fetch",
            Self::Done => "done",
        }
    }
}

impl fmt::Display for CrawlPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
