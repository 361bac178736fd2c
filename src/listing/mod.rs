//! The article list view: one controller shared by the home feed, the
//! articles page and the admin table, parameterised at construction.

mod controller;
mod filter;
mod pagination;

#[cfg(test)]
mod tests;

pub use controller::{ArticleListController, ListView, PresentationSink, SnapshotDelta, ViewParameters};
pub use filter::{compare_titles, sort_articles, CategoryFilter, SortMode};
pub use pagination::{page_label, range_label, total_pages};

/// Page size of the public article listing.
pub const DEFAULT_PAGE_SIZE: usize = 12;

/// Which statuses a controller accepts from its snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusScope {
    /// Public pages: drafts never reach the listing.
    PublishedOnly,
    /// Admin table: drafts included.
    All,
}

#[derive(Debug, Clone, Copy)]
pub struct ListingConfig {
    pub page_size: usize,
    pub scope: StatusScope,
}

impl ListingConfig {
    pub fn public(page_size: usize) -> Self {
        ListingConfig {
            page_size,
            scope: StatusScope::PublishedOnly,
        }
    }

    pub fn admin(page_size: usize) -> Self {
        ListingConfig {
            page_size,
            scope: StatusScope::All,
        }
    }
}

impl Default for ListingConfig {
    fn default() -> Self {
        ListingConfig::public(DEFAULT_PAGE_SIZE)
    }
}
