//! Record to table-row mapping

use crate::record::{Book, Quote};

/// A record that round-trips through a flat backup table.
///
/// `from_row` is lenient: a row that does not fit the column layout yields
/// `None` and the caller decides whether to skip or fail.
pub trait TableRecord: Clone + Sized {
    const COLUMNS: &'static [&'static str];

    fn to_row(&self) -> Vec<String>;
    fn from_row(row: &[String]) -> Option<Self>;
}

impl TableRecord for Book {
    const COLUMNS: &'static [&'static str] =
        &["Name", "Author", "Status", "My Rating", "Date", "Link"];

    fn to_row(&self) -> Vec<String> {
        vec![
            self.name.clone(),
            self.author.clone(),
            self.status_str().to_string(),
            self.rating.clone(),
            self.date.clone(),
            self.link().to_string(),
        ]
    }

    fn from_row(row: &[String]) -> Option<Self> {
        if row.len() != Self::COLUMNS.len() {
            return None;
        }
        // An unknown status string in a hand-edited backup degrades to "no
        // status" rather than rejecting the whole row.
        let status = row[2].parse().ok();
        Some(Book::new(&row[5], status, &row[0], &row[1], &row[3], &row[4]))
    }
}

impl TableRecord for Quote {
    const COLUMNS: &'static [&'static str] =
        &["Name", "Author", "Quote text", "Book link", "Quote link"];

    fn to_row(&self) -> Vec<String> {
        vec![
            self.book.name.clone(),
            self.book.author.clone(),
            self.text.clone(),
            self.book.link().to_string(),
            self.link().to_string(),
        ]
    }

    fn from_row(row: &[String]) -> Option<Self> {
        if row.len() != Self::COLUMNS.len() {
            return None;
        }
        let book = Book::reference(&row[3], &row[0], &row[1]);
        Some(Quote::new(&row[4], &row[2], book))
    }
}
