//! Crawl run state definitions
//!
//! A run walks the listing one page at a time. It is `Running` until one of
//! three distinct stop conditions fires, and every stop keeps the records
//! accumulated so far.

use crate::crawler::FetchError;
use crate::record::DiscountRecord;
use std::fmt;

/// Why a crawl run stopped paginating
#[derive(Debug)]
pub enum StopReason {
    /// The page cursor passed the configured ceiling
    Ceiling,

    /// A fetched page contained no item nodes
    EmptyPage { page: u32 },

    /// A page could not be fetched; terminal for the run
    FetchError(FetchError),
}

impl StopReason {
    /// Returns true if the run ended because of a failure rather than running
    /// out of pages
    pub fn is_error(&self) -> bool {
        matches!(self, Self::FetchError(_))
    }

    /// Short label used in logs and reports
    pub fn label(&self) -> &'static str {
        match self {
            Self::Ceiling => "ceiling",
            Self::EmptyPage { .. } => "empty_page",
            Self::FetchError(_) => "fetch_error",
        }
    }
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ceiling => write!(f, "page ceiling reached"),
            Self::EmptyPage { page } => write!(f, "page {} had no items", page),
            Self::FetchError(e) => write!(f, "{}", e),
        }
    }
}

/// State of a crawl run
#[derive(Debug)]
pub enum CrawlState {
    /// About to fetch `page` (1-based)
    Running {
        page: u32,
        accumulated: Vec<DiscountRecord>,
    },

    /// Pagination halted; `accumulated` is the final result set
    Stopped {
        reason: StopReason,
        accumulated: Vec<DiscountRecord>,
    },
}

impl CrawlState {
    /// The initial state: page 1, nothing accumulated
    pub fn start() -> Self {
        Self::Running {
            page: 1,
            accumulated: Vec::new(),
        }
    }

    /// Returns true once a stop condition has fired
    pub fn is_stopped(&self) -> bool {
        matches!(self, Self::Stopped { .. })
    }

    /// Records accumulated so far, in page order
    pub fn accumulated(&self) -> &[DiscountRecord] {
        match self {
            Self::Running { accumulated, .. } | Self::Stopped { accumulated, .. } => accumulated,
        }
    }

    /// Applies the ceiling check to a running state
    ///
    /// Must be called before each fetch so a page beyond `max_pages` is never
    /// requested.
    pub fn check_ceiling(self, max_pages: u32) -> Self {
        match self {
            Self::Running { page, accumulated } if page > max_pages => Self::Stopped {
                reason: StopReason::Ceiling,
                accumulated,
            },
            other => other,
        }
    }

    /// Transition after a fetch failed on the current page
    pub fn fetch_failed(self, error: FetchError) -> Self {
        match self {
            Self::Running { accumulated, .. } => Self::Stopped {
                reason: StopReason::FetchError(error),
                accumulated,
            },
            stopped => stopped,
        }
    }

    /// Transition after the current page was fetched and extracted
    ///
    /// A page with zero item nodes ends the run; otherwise its records are
    /// appended and the cursor advances.
    pub fn page_extracted(self, item_count: usize, records: Vec<DiscountRecord>) -> Self {
        match self {
            Self::Running { page, accumulated } if item_count == 0 => Self::Stopped {
                reason: StopReason::EmptyPage { page },
                accumulated,
            },
            Self::Running {
                page,
                mut accumulated,
            } => {
                accumulated.extend(records);
                Self::Running {
                    page: page + 1,
                    accumulated,
                }
            }
            stopped => stopped,
        }
    }
}

impl fmt::Display for CrawlState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Running { page, accumulated } => write!(
                f,
                "running (page {}, {} records)",
                page,
                accumulated.len()
            ),
            Self::Stopped {
                reason,
                accumulated,
            } => write!(f, "stopped: {} ({} records)", reason, accumulated.len()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str) -> DiscountRecord {
        DiscountRecord {
            product_name: name.to_string(),
            price_before_discount: "KSh 200".to_string(),
            price_after_discount: "KSh 150".to_string(),
            discount_label: "25%".to_string(),
        }
    }

    #[test]
    fn test_start_state() {
        let state = CrawlState::start();
        assert!(!state.is_stopped());
        assert!(matches!(state, CrawlState::Running { page: 1, .. }));
        assert!(state.accumulated().is_empty());
    }

    #[test]
    fn test_ceiling_stops_past_max() {
        let state = CrawlState::Running {
            page: 26,
            accumulated: vec![record("a")],
        }
        .check_ceiling(25);

        match state {
            CrawlState::Stopped {
                reason: StopReason::Ceiling,
                accumulated,
            } => assert_eq!(accumulated.len(), 1),
            other => panic!("unexpected state: {}", other),
        }
    }

    #[test]
    fn test_ceiling_allows_last_page() {
        let state = CrawlState::Running {
            page: 25,
            accumulated: Vec::new(),
        }
        .check_ceiling(25);
        assert!(!state.is_stopped());
    }

    #[test]
    fn test_page_extracted_advances() {
        let state = CrawlState::start().page_extracted(3, vec![record("a"), record("b")]);
        assert!(matches!(state, CrawlState::Running { page: 2, .. }));
        assert_eq!(state.accumulated().len(), 2);
    }

    #[test]
    fn test_page_with_items_but_no_discounts_still_advances() {
        let state = CrawlState::start().page_extracted(5, Vec::new());
        assert!(matches!(state, CrawlState::Running { page: 2, .. }));
    }

    #[test]
    fn test_empty_page_stops() {
        let state = CrawlState::start()
            .page_extracted(1, vec![record("a")])
            .page_extracted(0, Vec::new());

        match &state {
            CrawlState::Stopped {
                reason: StopReason::EmptyPage { page },
                ..
            } => assert_eq!(*page, 2),
            other => panic!("unexpected state: {}", other),
        }
        assert_eq!(state.accumulated().len(), 1);
    }

    #[test]
    fn test_fetch_failure_keeps_accumulated() {
        let state = CrawlState::start()
            .page_extracted(1, vec![record("a")])
            .fetch_failed(FetchError::Status {
                page: 2,
                status: 503,
            });

        assert!(state.is_stopped());
        assert_eq!(state.accumulated().len(), 1);
        if let CrawlState::Stopped { reason, .. } = state {
            assert!(reason.is_error());
            assert_eq!(reason.label(), "fetch_error");
        }
    }

    #[test]
    fn test_stopped_state_is_absorbing() {
        let state = CrawlState::start()
            .page_extracted(0, Vec::new())
            .page_extracted(4, vec![record("late")]);
        assert!(state.is_stopped());
        assert!(state.accumulated().is_empty());
    }
}
