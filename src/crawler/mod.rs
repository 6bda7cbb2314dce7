//! The crawl-and-merge engine's crawl half
//!
//! One listing (a book status or the quotes feed) is walked page by page:
//! randomized delay, fetch with retry, terminal-marker check, per-row
//! extraction with carry-forward state. Everything here is sequential by
//! design; pacing is the anti-detection mechanism and parallel fetches would
//! defeat it.

pub mod delay;
pub mod extract;
pub mod fetcher;
pub mod pager;
pub mod retry;

pub use delay::DelayScheduler;
pub use extract::{is_bot_check_page, is_empty_page, parse_reading_date};
pub use fetcher::{build_fetcher, HttpFetcher, PageFetcher};
pub use pager::PaginationCrawler;
pub use retry::{RetryPolicy, RetryingFetcher};
