//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `CrawlPhase`: The linear phase machine a crawl run walks through
//! - `LinkOutcome`: What happened to a single candidate link

mod crawl_phase;
mod link_outcome;

pub use crawl_phase::CrawlPhase;
pub use link_outcome::LinkOutcome;
