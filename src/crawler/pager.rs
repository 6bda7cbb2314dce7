//! Pagination loop over one listing
//!
//! Drives delay → fetch → extract → accumulate for a book status or the
//! quotes feed until a terminal page marker, the configured page ceiling, or
//! a cancellation request. A failed page is skipped, never fatal: a single
//! bad page must not stop the backup of a large profile.

use std::sync::Arc;

use scraper::Html;
use tokio_util::sync::CancellationToken;

use crate::config::RunConfig;
use crate::crawler::delay::DelayScheduler;
use crate::crawler::extract::{
    booklist_rows, date_header_text, extract_book, extract_quote, is_bot_check_page,
    is_empty_page, parse_reading_date, quote_cards, quote_detail_text,
};
use crate::crawler::fetcher::PageFetcher;
use crate::crawler::retry::{RetryPolicy, RetryingFetcher};
use crate::record::{Book, Identity, Quote, ReadingStatus, TRUNCATED_TEXT_MARKER};

/// Address of the i-th page of a listing.
fn page_url(listing_url: &str, page_idx: u32) -> String {
    format!("{}/~{}", listing_url, page_idx)
}

fn within_limit(page_idx: u32, limit: Option<u32>) -> bool {
    limit.map_or(true, |l| page_idx <= l)
}

/// Sequential crawler over the listings of one profile.
pub struct PaginationCrawler {
    config: Arc<RunConfig>,
    fetcher: RetryingFetcher,
    delay: DelayScheduler,
    cancel: CancellationToken,
}

impl PaginationCrawler {
    pub fn new(
        config: Arc<RunConfig>,
        fetcher: Arc<dyn PageFetcher>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            delay: DelayScheduler::new(config.delay.clone()),
            fetcher: RetryingFetcher::new(fetcher, RetryPolicy::default()),
            config,
            cancel,
        }
    }

    /// Replaces the default retry policy.
    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.fetcher = RetryingFetcher::new(self.fetcher.into_inner(), policy);
        self
    }

    /// Suspends for the next randomized delay.
    async fn pause(&self) {
        let delay = self.delay.next_delay();
        tracing::debug!("Waiting {} sec...", delay.as_secs());
        tokio::time::sleep(delay).await;
    }

    /// Delays, then fetches and parses one page. `None` means the page is
    /// skipped for this run; the retry budget is already spent.
    async fn load_page(&self, url: &str) -> Option<Html> {
        self.pause().await;
        match self.fetcher.fetch(url).await {
            Ok(body) => Some(Html::parse_document(&body)),
            Err(e) => {
                tracing::warn!("Skipping {}: {}", url, e);
                None
            }
        }
    }

    /// Crawls one book listing, accumulating across pages.
    ///
    /// The carried date starts empty per listing and is updated only while
    /// walking the `read` listing, where entries are grouped by month under
    /// a single date header.
    pub async fn crawl_books(&self, status: ReadingStatus) -> Vec<Book> {
        let listing_url = format!("{}/{}", self.config.profile_url, status.as_str());
        let limit = self.config.book_page_limit;

        let mut books: Vec<Book> = Vec::new();
        let mut last_date = String::new();
        let mut page_idx: u32 = 1;

        while within_limit(page_idx, limit) {
            if self.cancel.is_cancelled() {
                tracing::info!("Cancellation requested, stopping '{}' listing", status);
                break;
            }

            let url = page_url(&listing_url, page_idx);
            page_idx += 1;

            let Some(page) = self.load_page(&url).await else {
                continue;
            };

            if is_empty_page(&page) {
                tracing::info!("Reached the end of the '{}' listing", status);
                break;
            }
            if is_bot_check_page(&page) {
                break;
            }

            for row in booklist_rows(&page) {
                // Header check must come first: a header row would otherwise
                // be mis-probed as a malformed book.
                if let Some(header) = date_header_text(row) {
                    if status == ReadingStatus::Read {
                        if let Some(date) = parse_reading_date(&header) {
                            last_date = date;
                        }
                    }
                    continue;
                }

                if let Some(book) = extract_book(row, status, &last_date) {
                    if !books.iter().any(|b| b.identity() == book.identity()) {
                        books.push(book);
                    }
                }
            }
        }

        tracing::info!("'{}' listing: {} records accumulated", status, books.len());
        books
    }

    /// Crawls the quotes listing.
    ///
    /// A quote whose text is the truncation sentinel gets one immediate
    /// delayed fetch of its own page; if that fails the quote is dropped for
    /// this run rather than ever persisting the sentinel as real text.
    pub async fn crawl_quotes(&self) -> Vec<Quote> {
        let listing_url = format!("{}/quotes", self.config.profile_url);
        let limit = self.config.quote_page_limit;

        let mut quotes: Vec<Quote> = Vec::new();
        let mut page_idx: u32 = 1;

        while within_limit(page_idx, limit) {
            if self.cancel.is_cancelled() {
                tracing::info!("Cancellation requested, stopping quotes listing");
                break;
            }

            let url = page_url(&listing_url, page_idx);
            page_idx += 1;

            let Some(page) = self.load_page(&url).await else {
                continue;
            };

            if is_empty_page(&page) {
                tracing::info!("Reached the end of the quotes listing");
                break;
            }
            if is_bot_check_page(&page) {
                break;
            }

            for card in quote_cards(&page) {
                let Some(mut quote) = extract_quote(card) else {
                    continue;
                };
                if quotes.iter().any(|q| q.identity() == quote.identity()) {
                    continue;
                }

                if quote.text == TRUNCATED_TEXT_MARKER {
                    // The follow-up fetch must not stretch a requested stop;
                    // the quote is dropped rather than persisted as sentinel.
                    if self.cancel.is_cancelled() {
                        tracing::info!(
                            "Cancellation requested, dropping truncated quote {}",
                            quote.link()
                        );
                        break;
                    }
                    match self.fetch_full_text(quote.link()).await {
                        Some(text) => quote.set_text(text),
                        None => {
                            tracing::warn!(
                                "Dropping quote {}: full text unavailable",
                                quote.link()
                            );
                            continue;
                        }
                    }
                }

                tracing::info!("Quote processed: {}", quote.link());
                quotes.push(quote);
            }
        }

        tracing::info!("Quotes listing: {} records accumulated", quotes.len());
        quotes
    }

    /// Follow-up fetch of a truncated quote's own page.
    async fn fetch_full_text(&self, link: &str) -> Option<String> {
        let page = self.load_page(link).await?;
        quote_detail_text(&page)
    }
}
