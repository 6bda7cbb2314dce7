use std::path::PathBuf;
use std::str::FromStr;

use crate::record::{READER_PATH, SITE_ORIGIN};
use crate::ConfigError;

/// Transport backend performing the actual page fetches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transport {
    /// Plain HTTP client (reqwest).
    Http,
}

impl FromStr for Transport {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "http" => Ok(Transport::Http),
            other => Err(ConfigError::UnknownTransport(other.to_string())),
        }
    }
}

/// One of the two listing kinds a run can be told to skip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingKind {
    Books,
    Quotes,
}

impl FromStr for ListingKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "books" => Ok(ListingKind::Books),
            "quotes" => Ok(ListingKind::Quotes),
            other => Err(ConfigError::UnknownListingKind(other.to_string())),
        }
    }
}

/// Inter-request delay bounds in whole seconds.
#[derive(Debug, Clone)]
pub struct DelayBounds {
    pub min: u64,
    /// `None` disables the upper bound; the scheduler then always waits
    /// exactly `min`.
    pub max: Option<u64>,
}

/// Configuration for a single backup run, read-only after validation.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Profile username as it appears in the page address.
    pub user: String,

    /// Fully-qualified profile root, `<origin>/reader/<user>`.
    pub profile_url: String,

    pub delay: DelayBounds,

    /// Listing-page ceiling per book status; `None` is unbounded.
    pub book_page_limit: Option<u32>,

    /// Listing-page ceiling for quotes; `None` is unbounded.
    pub quote_page_limit: Option<u32>,

    pub books_backup: PathBuf,
    pub quotes_backup: PathBuf,

    /// Discard existing backups and write the freshly crawled batch as-is.
    pub rewrite_all: bool,

    pub skip: Option<ListingKind>,
    pub transport: Transport,
}

impl RunConfig {
    /// Profile root address for a username on the live site.
    pub fn profile_url_for(user: &str) -> String {
        format!("{}{}/{}", SITE_ORIGIN, READER_PATH, user)
    }
}
