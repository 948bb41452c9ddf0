//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `CrawlState`: the pagination state machine driven by the controller
//! - `StopReason`: which of the three stop conditions ended a run

mod crawl_state;

// Re-export main types
pub use crawl_state::{CrawlState, StopReason};
