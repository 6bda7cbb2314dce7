//! Domain records captured from listing pages
//!
//! Both record kinds are identified solely by their canonical link; every
//! other field is descriptive and ignored by dedup and merge logic.

pub mod book;
pub mod quote;

pub use book::{Book, ReadingStatus};
pub use quote::Quote;

/// Origin prefixed onto relative links found in page markup.
pub const SITE_ORIGIN: &str = "https://www.livelib.ru";

/// Path under which reader profiles live.
pub const READER_PATH: &str = "/reader";

/// Sentinel stored as quote text when the listing page only shows a preview.
/// It must never reach the backup store; the crawler either replaces it with
/// text from the quote's own page or drops the quote for this run.
pub const TRUNCATED_TEXT_MARKER: &str = "!!!NOT_FULL###";

/// Stable identity key for dedup and incremental merge.
///
/// Explicit accessor rather than `PartialEq` so that identity semantics do
/// not leak into ordered-container behavior.
pub trait Identity {
    fn identity(&self) -> &str;
}

/// Expands a link taken from page markup into its fully-qualified form.
///
/// Listing markup carries site-relative hrefs while backup rows carry
/// absolute ones; normalizing at construction time keeps identity
/// comparisons well-defined for both.
pub fn canonical_link(link: &str) -> String {
    if link.contains(SITE_ORIGIN) {
        link.to_string()
    } else {
        format!("{}{}", SITE_ORIGIN, link)
    }
}
