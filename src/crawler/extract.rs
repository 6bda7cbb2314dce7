//! Record extraction from listing markup
//!
//! Pure functions over a parsed page. A row or card that cannot yield a
//! valid record is reported through a warning event and skipped; extraction
//! never aborts a listing.

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use crate::record::{Book, Quote, ReadingStatus, TRUNCATED_TEXT_MARKER};

/// Accepted path shapes for a book link.
const BOOK_LINK_PATTERNS: [&str; 2] = ["/book/", "/work/"];

/// Path shape for a quote link.
const QUOTE_LINK_PATTERN: &str = "/quote/";

static YEAR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(\d{4})\b").expect("year pattern is valid"));

/// First element under `node` matching a CSS selector.
fn select_first<'a>(node: ElementRef<'a>, css: &str) -> Option<ElementRef<'a>> {
    let selector = Selector::parse(css).ok()?;
    node.select(&selector).next()
}

/// All elements under the document root matching a CSS selector.
fn select_all<'a>(page: &'a Html, css: &str) -> Vec<ElementRef<'a>> {
    match Selector::parse(css) {
        Ok(selector) => page.select(&selector).collect(),
        Err(_) => Vec::new(),
    }
}

/// Collected trimmed text of an element.
fn element_text(node: ElementRef<'_>) -> String {
    node.text().collect::<String>().trim().to_string()
}

/// Reports a non-fatal extraction failure and yields the skip value.
fn extraction_failure<T>(what: &str, node: ElementRef<'_>) -> Option<T> {
    let snippet: String = node.html().chars().take(200).collect();
    tracing::warn!("Parsing failure ({} not parsed): {}", what, snippet);
    None
}

/// Whether the page carries the "no more entries" marker.
pub fn is_empty_page(page: &Html) -> bool {
    !select_all(page, "div.with-pad").is_empty()
}

/// Whether the page carries the automated-access marker.
///
/// Distinct from a plain end-of-list: the run should stop pressing the site
/// when this appears.
pub fn is_bot_check_page(page: &Html) -> bool {
    let flagged = !select_all(page, "div.page-404").is_empty();
    if flagged {
        tracing::warn!("Bot detection triggered - the site suspects automation");
        tracing::warn!("Reading stopped to avoid being blocked");
    }
    flagged
}

/// Rows of the book listing container in document order.
pub fn booklist_rows<'a>(page: &'a Html) -> Vec<ElementRef<'a>> {
    select_all(page, "div#booklist > div")
}

/// Quote cards of the quotes listing in document order.
pub fn quote_cards<'a>(page: &'a Html) -> Vec<ElementRef<'a>> {
    select_all(page, "article")
}

/// Header text of a date-header row, if this row is one.
///
/// A row is either a date header or a record, never both; the pagination
/// loop checks this before probing the row as a book.
pub fn date_header_text(row: ElementRef<'_>) -> Option<String> {
    select_first(row, "h2").map(element_text)
}

/// Numeric month for a Russian month name; unrecognized names default to
/// January.
fn month_number(raw_month: &str) -> &'static str {
    match raw_month {
        "Январь" => "01",
        "Февраль" => "02",
        "Март" => "03",
        "Апрель" => "04",
        "Май" => "05",
        "Июнь" => "06",
        "Июль" => "07",
        "Август" => "08",
        "Сентябрь" => "09",
        "Октябрь" => "10",
        "Ноябрь" => "11",
        "Декабрь" => "12",
        _ => "01",
    }
}

/// Parses a date header like "Январь 2024 г." into `YYYY-MM-01`.
///
/// The day is never known, only month and year. Returns `None` when no
/// 4-digit year is present.
pub fn parse_reading_date(raw: &str) -> Option<String> {
    let year = YEAR_RE.captures(raw)?.get(1)?.as_str();
    let raw_month = raw.split(' ').next().unwrap_or("");
    Some(format!("{}-{}-01", year, month_number(raw_month)))
}

/// Validates a candidate book href against the accepted path shapes.
pub fn book_link(href: &str) -> Option<&str> {
    if BOOK_LINK_PATTERNS.iter().any(|p| href.contains(p)) {
        Some(href)
    } else {
        None
    }
}

/// Validates a candidate quote href.
fn quote_link(href: &str) -> Option<&str> {
    if href.contains(QUOTE_LINK_PATTERN) {
        Some(href)
    } else {
        None
    }
}

/// Extracts a book from one listing row
///
/// The caller supplies `date` because rows in a `read` listing do not carry
/// their own date; it is carried forward from the most recent date header.
pub fn extract_book(row: ElementRef<'_>, status: ReadingStatus, date: &str) -> Option<Book> {
    let Some(data) = select_first(row, "div.brow-data") else {
        return extraction_failure("book data block", row);
    };

    let Some(name_anchor) = select_first(data, "a.brow-book-name") else {
        return extraction_failure("book name anchor", row);
    };

    let Some(link) = name_anchor.value().attr("href").and_then(book_link) else {
        return extraction_failure("book link", row);
    };

    let name = element_text(name_anchor);

    let authors = match Selector::parse("a.brow-book-author") {
        Ok(selector) => data
            .select(&selector)
            .map(element_text)
            .collect::<Vec<_>>(),
        Err(_) => Vec::new(),
    };
    let author = authors.join(", ");

    // Ratings only exist on the read shelf.
    let mut rating = String::new();
    if status == ReadingStatus::Read {
        if let Some(node) = select_first(data, "div.brow-ratings span span span") {
            rating = element_text(node);
        }
    }

    Some(Book::new(
        link,
        Some(status),
        &name,
        &author,
        &rating,
        date,
    ))
}

/// Extracts a quote from one listing card
///
/// Anchors are scanned in document order; the first quote-shaped and first
/// book-shaped hrefs are captured independently. A `read more` affordance
/// overrides whatever text was found with the truncation sentinel so the
/// crawler knows a follow-up fetch is required.
pub fn extract_quote(card_root: ElementRef<'_>) -> Option<Quote> {
    let Some(card) = select_first(card_root, "div.lenta-card") else {
        return extraction_failure("quote card", card_root);
    };

    let mut link: Option<&str> = None;
    let mut book_href: Option<&str> = None;
    if let Ok(selector) = Selector::parse("a") {
        for anchor in card.select(&selector) {
            let href = anchor.value().attr("href").unwrap_or("");
            if link.is_none() {
                link = quote_link(href);
            }
            if book_href.is_none() {
                book_href = book_link(href);
            }
            if link.is_some() && book_href.is_some() {
                break;
            }
        }
    }

    let mut text = quote_text(card);
    if select_first(card, "a.read-more__link").is_some() {
        text = Some(TRUNCATED_TEXT_MARKER.to_string());
    }

    let book_card = select_first(card, "div.lenta-card-book__wrapper");
    let book_name = book_card
        .and_then(|c| select_first(c, "a.lenta-card__book-title"))
        .map(element_text)
        .unwrap_or_default();
    let book_author = book_card
        .and_then(|c| select_first(c, "p.lenta-card__author-wrap a"))
        .map(element_text)
        .unwrap_or_default();

    match (link, book_href, text) {
        (Some(link), Some(book_href), Some(text)) => Some(Quote::new(
            link,
            &text,
            Book::reference(book_href, &book_name, &book_author),
        )),
        (None, _, _) | (_, None, _) => extraction_failure("quote links", card_root),
        (_, _, None) => extraction_failure("quote text", card_root),
    }
}

/// Quote text by element priority: block quote, then the designated
/// full-text paragraph or div, then any paragraph.
fn quote_text(card: ElementRef<'_>) -> Option<String> {
    let item = select_first(card, "blockquote")
        .or_else(|| select_first(card, "div#lenta-card__text-quote-full > p"))
        .or_else(|| select_first(card, "div#lenta-card__text-quote-full > div"))
        .or_else(|| select_first(card, "p"))?;
    Some(element_text(item))
}

/// Full quote text from the quote's own detail page.
pub fn quote_detail_text(page: &Html) -> Option<String> {
    let card = select_all(page, "article").into_iter().next()?;
    quote_text(card)
}
