//! Record collections as listed by the admin screens and the CLI
//!
//! A [`Listing`] ties a record type to its table columns, its free-text
//! search and its status filter tabs.

use crate::table::{Column, TableRecord, DEFAULT_PAGE_SIZE};

pub trait Listing: TableRecord + Clone {
    /// Singular record kind, used in not-found messages
    const KIND: &'static str;
    /// Page heading
    const TITLE: &'static str;

    fn columns() -> Vec<Column<Self>>;

    /// Case-insensitive search; `query` is already lowercased and non-empty
    fn matches_search(&self, query: &str) -> bool;

    /// Status filter tabs as `(value, label)`; "all" is implied
    fn status_filters() -> &'static [(&'static str, &'static str)] {
        &[]
    }

    /// Whether the record belongs under the status tab `status`
    fn matches_status(&self, _status: &str) -> bool {
        true
    }

    /// Label/value pairs for the detail view
    fn detail(&self) -> Vec<(&'static str, String)>;

    fn page_size() -> usize {
        DEFAULT_PAGE_SIZE
    }

    fn empty_message() -> &'static str {
        "No records match your filters"
    }
}

/// Search text plus an optional status tab
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListQuery {
    pub search: String,
    pub status: Option<String>,
}

impl ListQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_search(mut self, search: &str) -> Self {
        self.search = search.to_string();
        self
    }

    pub fn with_status(mut self, status: &str) -> Self {
        self.status = (status != "all" && !status.is_empty()).then(|| status.to_string());
        self
    }

    pub fn is_filtered(&self) -> bool {
        !self.search.trim().is_empty() || self.status.is_some()
    }

    pub fn reset(&mut self) {
        self.search.clear();
        self.status = None;
    }

    pub fn matches<T: Listing>(&self, record: &T) -> bool {
        if let Some(ref status) = self.status {
            if !record.matches_status(status) {
                return false;
            }
        }
        let query = self.search.trim().to_lowercase();
        query.is_empty() || record.matches_search(&query)
    }

    /// Records passing the query, in their original order
    pub fn apply<T: Listing>(&self, records: &[T]) -> Vec<T> {
        records.iter().filter(|r| self.matches(*r)).cloned().collect()
    }
}

/// Record count per status tab, starting with "all"
pub fn status_counts<T: Listing>(records: &[T]) -> Vec<(&'static str, &'static str, usize)> {
    let mut counts = vec![("all", "All", records.len())];
    for &(value, label) in T::status_filters() {
        let n = records.iter().filter(|r| r.matches_status(value)).count();
        counts.push((value, label, n));
    }
    counts
}

/// Case-insensitive substring test against an already lowercased query
pub fn contains(haystack: &str, query: &str) -> bool {
    haystack.to_lowercase().contains(query)
}

/// Field lookup by record id
pub fn find_by_key<'a, T: TableRecord>(records: &'a [T], key: &str) -> Option<&'a T> {
    records.iter().find(|r| r.record_key() == key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::FixtureSet;
    use crate::models::{
        ActivityLog, AdminNotification, Booking, Mechanic, Notification, Transaction, User, Workshop,
    };

    #[test]
    fn test_all_tab_is_no_filter() {
        let query = ListQuery::new().with_status("all");
        assert_eq!(query.status, None);
        assert!(!query.is_filtered());
        assert!(ListQuery::new().with_search("  ").status.is_none());
    }

    #[test]
    fn test_status_counts_match_filtered_rows() {
        let data = FixtureSet::embedded().unwrap();
        let counts = status_counts(&data.bookings);
        assert_eq!(counts[0], ("all", "All", data.bookings.len()));
        for (value, _, n) in counts.into_iter().skip(1) {
            let query = ListQuery::new().with_status(value);
            assert_eq!(query.apply(&data.bookings).len(), n, "tab {}", value);
        }
    }

    #[test]
    fn test_search_is_case_insensitive_and_resets() {
        let data = FixtureSet::embedded().unwrap();
        let mut query = ListQuery::new().with_search("ZZZ-NOTHING-MATCHES");
        assert!(query.apply(&data.bookings).is_empty());
        query.reset();
        assert_eq!(query.apply(&data.bookings).len(), data.bookings.len());
        assert!(contains("Bengkel Jaya", "jaya"));
    }

    #[test]
    fn test_page_sizes_per_listing() {
        assert_eq!(Booking::page_size(), 8);
        assert_eq!(Mechanic::page_size(), 8);
        assert_eq!(Workshop::page_size(), 8);
        assert_eq!(Transaction::page_size(), 8);
        assert_eq!(User::page_size(), 8);
        assert_eq!(Notification::page_size(), 5);
        assert_eq!(AdminNotification::page_size(), DEFAULT_PAGE_SIZE);
        assert_eq!(ActivityLog::page_size(), DEFAULT_PAGE_SIZE);
    }
}
