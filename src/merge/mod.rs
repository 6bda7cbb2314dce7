//! Baseline merge
//!
//! An incremental run appends only records absent from the existing backup.
//! Membership is decided by [`Identity`] so that relative and absolute forms
//! of the same link compare equal.

use std::collections::HashSet;

use crate::record::Identity;

/// Returns the crawled records not present in the baseline, in crawl order.
///
/// Duplicates inside the crawled batch itself collapse to their first
/// occurrence.
pub fn new_items<T: Identity + Clone>(baseline: &[T], crawled: &[T]) -> Vec<T> {
    let mut seen: HashSet<&str> = baseline.iter().map(|item| item.identity()).collect();

    let mut fresh = Vec::new();
    for item in crawled {
        if seen.insert(item.identity()) {
            fresh.push(item.clone());
        }
    }
    fresh
}
