use serde::Serialize;
use tracing::debug;

use super::filter::{compare_articles, matches_category, matches_query, CategoryFilter, SortMode};
use super::pagination::{clamp_page, page_bounds, page_label, range_label, total_pages};
use super::{ListingConfig, StatusScope};
use crate::article::{ArticleStatus, ArticleSummary};
use crate::TARGET_LISTING;

/// Search, filter, sort and page state driving the derivation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewParameters {
    pub search_query: String,
    pub category_filter: CategoryFilter,
    pub sort_mode: SortMode,
    pub current_page: usize,
    pub page_size: usize,
}

/// One rendered page of the listing, as handed to a presentation sink.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListView {
    pub items: Vec<ArticleSummary>,
    pub total_count: usize,
    pub total_pages: usize,
    pub current_page: usize,
    pub page_size: usize,
    pub range_label: String,
    pub page_label: String,
    pub has_previous: bool,
    pub has_next: bool,
    pub show_pagination: bool,
    pub search_query: String,
    pub category: CategoryFilter,
    pub sort: SortMode,
}

/// Size change caused by a snapshot replacement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SnapshotDelta {
    pub previous: usize,
    pub current: usize,
    pub added: usize,
}

/// Receives the recomputed view after every mutating controller call.
pub trait PresentationSink: Send {
    fn render(&mut self, view: &ListView);
}

impl<F> PresentationSink for F
where
    F: FnMut(&ListView) + Send,
{
    fn render(&mut self, view: &ListView) {
        self(view)
    }
}

/// Owns an article snapshot plus the view parameters, and derives the
/// visible page from them. Every mutation recomputes the whole derivation
/// before returning; there is no incremental state.
pub struct ArticleListController {
    scope: StatusScope,
    raw: Vec<ArticleSummary>,
    params: ViewParameters,
    // Indices into `raw`, filtered and sorted
    filtered: Vec<usize>,
    sinks: Vec<Box<dyn PresentationSink>>,
}

impl ArticleListController {
    pub fn new(config: ListingConfig) -> Self {
        ArticleListController {
            scope: config.scope,
            raw: Vec::new(),
            params: ViewParameters {
                search_query: String::new(),
                category_filter: CategoryFilter::All,
                sort_mode: SortMode::Newest,
                current_page: 1,
                page_size: config.page_size.max(1),
            },
            filtered: Vec::new(),
            sinks: Vec::new(),
        }
    }

    /// Registers a sink; it immediately receives the current view.
    pub fn subscribe(&mut self, mut sink: impl PresentationSink + 'static) {
        sink.render(&self.current_view());
        self.sinks.push(Box::new(sink));
    }

    pub fn parameters(&self) -> &ViewParameters {
        &self.params
    }

    /// Articles held after the status scope was applied.
    pub fn snapshot(&self) -> &[ArticleSummary] {
        &self.raw
    }

    /// Replaces the article collection. The page position survives unless
    /// the new result set is too small for it, in which case it is clamped.
    pub fn load_snapshot(&mut self, articles: Vec<ArticleSummary>) -> SnapshotDelta {
        let previous = self.raw.len();
        self.raw = match self.scope {
            StatusScope::All => articles,
            StatusScope::PublishedOnly => articles
                .into_iter()
                .filter(|article| article.status == ArticleStatus::Published)
                .collect(),
        };
        let current = self.raw.len();
        debug!(target: TARGET_LISTING, "Loaded snapshot with {} articles (previously {})", current, previous);
        self.recompute();
        SnapshotDelta {
            previous,
            current,
            added: current.saturating_sub(previous),
        }
    }

    pub fn set_search_query(&mut self, text: &str) {
        self.params.search_query = text.trim().to_lowercase();
        self.params.current_page = 1;
        self.recompute();
    }

    pub fn set_category_filter(&mut self, filter: impl Into<CategoryFilter>) {
        self.params.category_filter = filter.into();
        self.params.current_page = 1;
        self.recompute();
    }

    pub fn set_sort_mode(&mut self, mode: SortMode) {
        self.params.sort_mode = mode;
        self.params.current_page = 1;
        self.recompute();
    }

    /// Moves to page `n`. Out-of-range pages are ignored and `false` is
    /// returned; callers disable their controls at the boundaries.
    pub fn go_to_page(&mut self, n: usize) -> bool {
        if n < 1 || n > self.total_pages() {
            debug!(target: TARGET_LISTING, "Ignoring navigation to page {} of {}", n, self.total_pages());
            return false;
        }
        self.params.current_page = n;
        self.recompute();
        true
    }

    pub fn total_count(&self) -> usize {
        self.filtered.len()
    }

    pub fn total_pages(&self) -> usize {
        total_pages(self.filtered.len(), self.params.page_size)
    }

    pub fn current_view(&self) -> ListView {
        let total_count = self.filtered.len();
        let total_pages = self.total_pages();
        let current_page = self.params.current_page;
        let page_size = self.params.page_size;
        let items = self.filtered[page_bounds(current_page, page_size, total_count)]
            .iter()
            .map(|&index| self.raw[index].clone())
            .collect();

        ListView {
            items,
            total_count,
            total_pages,
            current_page,
            page_size,
            range_label: range_label(total_count, current_page, page_size),
            page_label: page_label(current_page, total_pages),
            has_previous: current_page > 1,
            has_next: current_page < total_pages,
            show_pagination: total_pages > 1,
            search_query: self.params.search_query.clone(),
            category: self.params.category_filter.clone(),
            sort: self.params.sort_mode,
        }
    }

    fn recompute(&mut self) {
        let query = self.params.search_query.as_str();
        let category = &self.params.category_filter;
        let raw = &self.raw;
        let mut matching: Vec<usize> = raw
            .iter()
            .enumerate()
            .filter(|(_, article)| matches_query(article, query))
            .filter(|(_, article)| matches_category(article, category))
            .map(|(index, _)| index)
            .collect();
        let mode = self.params.sort_mode;
        matching.sort_by(|&a, &b| compare_articles(&raw[a], &raw[b], mode));
        self.filtered = matching;

        self.params.current_page = clamp_page(self.params.current_page, self.total_pages());

        if !self.sinks.is_empty() {
            let view = self.current_view();
            for sink in self.sinks.iter_mut() {
                sink.render(&view);
            }
        }
    }
}
