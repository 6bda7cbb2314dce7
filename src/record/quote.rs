use crate::record::{canonical_link, Book, Identity};

/// One highlighted quote from the profile's quotes listing.
///
/// Identity is the canonical quote link. The associated book is carried by
/// value and may be a bare reference (link only) when the card shows nothing
/// more.
#[derive(Debug, Clone)]
pub struct Quote {
    link: String,
    pub text: String,
    pub book: Book,
}

impl Quote {
    pub fn new(link: &str, text: &str, book: Book) -> Self {
        Self {
            link: canonical_link(link),
            text: text.to_string(),
            book,
        }
    }

    pub fn link(&self) -> &str {
        &self.link
    }

    /// Replaces truncated preview text with the full text fetched from the
    /// quote's own page. Called at most once per quote.
    pub fn set_text(&mut self, text: String) {
        self.text = text;
    }

    pub fn set_book(&mut self, book: Book) {
        self.book = book;
    }
}

impl Identity for Quote {
    fn identity(&self) -> &str {
        &self.link
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::TRUNCATED_TEXT_MARKER;

    #[test]
    fn test_new_normalizes_link() {
        let quote = Quote::new("/quote/9", "text", Book::reference("/book/1", "", ""));
        assert_eq!(quote.link(), "https://www.livelib.ru/quote/9");
        assert_eq!(quote.identity(), quote.link());
    }

    #[test]
    fn test_set_text_replaces_marker() {
        let mut quote = Quote::new(
            "/quote/9",
            TRUNCATED_TEXT_MARKER,
            Book::reference("/book/1", "", ""),
        );
        quote.set_text("full text".to_string());
        assert_eq!(quote.text, "full text");
    }
}
