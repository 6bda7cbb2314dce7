use std::fmt;
use std::str::FromStr;

use crate::record::{canonical_link, Identity};

/// Reading status of a book on the profile; the string forms double as the
/// listing path segments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadingStatus {
    Read,
    Reading,
    Wish,
}

impl ReadingStatus {
    /// All statuses in the order listings are crawled.
    pub const ALL: [ReadingStatus; 3] = [
        ReadingStatus::Read,
        ReadingStatus::Reading,
        ReadingStatus::Wish,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReadingStatus::Read => "read",
            ReadingStatus::Reading => "reading",
            ReadingStatus::Wish => "wish",
        }
    }
}

impl fmt::Display for ReadingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReadingStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "read" => Ok(ReadingStatus::Read),
            "reading" => Ok(ReadingStatus::Reading),
            "wish" => Ok(ReadingStatus::Wish),
            other => Err(format!("unknown reading status: '{}'", other)),
        }
    }
}

/// One book row from a listing page, or one baseline row read back from the
/// backup table.
///
/// Identity is the canonical link; all other fields are descriptive.
#[derive(Debug, Clone)]
pub struct Book {
    link: String,
    pub name: String,
    pub author: String,
    /// `None` for books that only appear attached to a quote, where the
    /// profile does not state a status.
    pub status: Option<ReadingStatus>,
    /// Populated only for `read` listings; empty otherwise.
    pub rating: String,
    /// `YYYY-MM-01` carried forward from the most recent date header, or
    /// empty when no header has been seen.
    pub date: String,
}

impl Book {
    pub fn new(
        link: &str,
        status: Option<ReadingStatus>,
        name: &str,
        author: &str,
        rating: &str,
        date: &str,
    ) -> Self {
        Self {
            link: canonical_link(link),
            name: name.to_string(),
            author: author.to_string(),
            status,
            rating: rating.to_string(),
            date: date.to_string(),
        }
    }

    /// A book known only through a quote card: link plus whatever name and
    /// author the card shows, no status, rating or date.
    pub fn reference(link: &str, name: &str, author: &str) -> Self {
        Self::new(link, None, name, author, "", "")
    }

    pub fn link(&self) -> &str {
        &self.link
    }

    /// Backfill used when a second source disagrees with the listing.
    pub fn set_name(&mut self, name: &str) {
        self.name = name.to_string();
    }

    pub fn set_author(&mut self, author: &str) {
        self.author = author.to_string();
    }

    pub fn status_str(&self) -> &str {
        self.status.map(|s| s.as_str()).unwrap_or("")
    }
}

impl Identity for Book {
    fn identity(&self) -> &str {
        &self.link
    }
}
