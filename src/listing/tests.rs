use std::sync::{Arc, Mutex};

use super::*;
use crate::article::{parse_timestamp, ArticleId, ArticleStatus, ArticleSummary};

fn article(id: i64, title: &str, date: &str, category: &str) -> ArticleSummary {
    ArticleSummary {
        id: ArticleId::Int(id),
        title: title.to_string(),
        excerpt: String::new(),
        content: String::new(),
        category_slug: category.to_string(),
        category_label: category.to_string(),
        published_at: parse_timestamp(date).unwrap(),
        tags: Vec::new(),
        status: ArticleStatus::Published,
        author: "Staff".to_string(),
        image_url: crate::article::PLACEHOLDER_IMAGE.to_string(),
    }
}

/// Article `n` is dated `n - 1` days after 2024-01-01, so any count stays valid.
fn numbered(count: i64, category: &str) -> Vec<ArticleSummary> {
    (1..=count)
        .map(|n| {
            let mut summary = article(n, &format!("Article {}", n), "2024-01-01", category);
            summary.published_at += chrono::Duration::days(n - 1);
            summary
        })
        .collect()
}

#[test]
fn test_numbered_dates_roll_past_month_end() {
    let articles = numbered(40, "business");
    assert_eq!(articles.len(), 40);
    assert_eq!(articles[30].published_at.format("%Y-%m-%d").to_string(), "2024-01-31");
    assert_eq!(articles[39].published_at.format("%Y-%m-%d").to_string(), "2024-02-09");
    assert!(articles.windows(2).all(|w| w[0].published_at < w[1].published_at));
}

fn ids(view: &ListView) -> Vec<i64> {
    view.items.iter().filter_map(|a| a.id.as_i64()).collect()
}

fn controller(page_size: usize, articles: Vec<ArticleSummary>) -> ArticleListController {
    let mut controller = ArticleListController::new(ListingConfig::public(page_size));
    controller.load_snapshot(articles);
    controller
}

#[test]
fn test_page_never_exceeds_page_size() {
    for count in [1, 2, 5, 12, 13, 40] {
        for page_size in [1, 2, 5, 12] {
            let mut c = controller(page_size, numbered(count, "business"));
            for page in 1..=c.total_pages() {
                c.go_to_page(page);
                assert!(c.current_view().items.len() <= page_size);
            }
        }
    }
}

#[test]
fn test_total_pages_formula_holds_for_all_parameters() {
    let mut articles = numbered(9, "business");
    articles.extend(numbered(4, "politics").into_iter().map(|mut a| {
        a.id = ArticleId::Int(a.id.as_i64().unwrap() + 100);
        a.title = format!("Ghana {}", a.title);
        a
    }));
    let mut c = controller(2, articles);
    for query in ["", "ghana", "nothing matches this"] {
        for category in ["all", "business", "politics", "society"] {
            for sort in [SortMode::Newest, SortMode::Oldest, SortMode::Title] {
                c.set_search_query(query);
                c.set_category_filter(category);
                c.set_sort_mode(sort);
                let view = c.current_view();
                let expected = view.total_count.div_ceil(2).max(1);
                assert_eq!(view.total_pages, expected);
                assert!(view.current_page >= 1 && view.current_page <= view.total_pages);
            }
        }
    }
}

#[test]
fn test_search_is_idempotent() {
    let mut once = controller(2, numbered(7, "business"));
    once.set_search_query("Article 1");
    let mut twice = controller(2, numbered(7, "business"));
    twice.set_search_query("Article 1");
    twice.set_search_query("Article 1");
    assert_eq!(once.current_view(), twice.current_view());
}

#[test]
fn test_search_filters_by_title() {
    let mut c = controller(
        12,
        vec![
            article(1, "Ghana Economy", "2024-01-10", "business"),
            article(2, "Tech News", "2024-01-11", "technology"),
        ],
    );
    c.set_search_query("ghana");
    assert_eq!(ids(&c.current_view()), vec![1]);

    c.set_search_query("  GHANA  ");
    assert_eq!(c.parameters().search_query, "ghana");
    assert_eq!(ids(&c.current_view()), vec![1]);
}

#[test]
fn test_search_matches_excerpt_content_and_tag_substrings() {
    let mut by_excerpt = article(1, "One", "2024-01-10", "business");
    by_excerpt.excerpt = "Cocoa prices climb".to_string();
    let mut by_content = article(2, "Two", "2024-01-11", "business");
    by_content.content = "<p>The cocoa harvest</p>".to_string();
    let mut by_tag = article(3, "Three", "2024-01-12", "business");
    by_tag.tags = vec!["cocoa-farming".to_string()];
    let unrelated = article(4, "Four", "2024-01-13", "business");

    let mut c = controller(12, vec![by_excerpt, by_content, by_tag, unrelated]);
    c.set_search_query("Cocoa");
    assert_eq!(ids(&c.current_view()), vec![3, 2, 1]);
}

#[test]
fn test_sort_by_date_both_directions() {
    let mut c = controller(
        12,
        vec![
            article(10, "Ten", "2024-01-10", "business"),
            article(15, "Fifteen", "2024-01-15", "business"),
            article(12, "Twelve", "2024-01-12", "business"),
        ],
    );
    c.set_sort_mode(SortMode::Newest);
    assert_eq!(ids(&c.current_view()), vec![15, 12, 10]);
    c.set_sort_mode(SortMode::Oldest);
    assert_eq!(ids(&c.current_view()), vec![10, 12, 15]);
}

#[test]
fn test_sort_ties_keep_input_order() {
    let mut c = controller(
        12,
        vec![
            article(1, "First", "2024-01-10", "business"),
            article(2, "Second", "2024-01-10", "business"),
            article(3, "Third", "2024-01-10", "business"),
        ],
    );
    c.set_sort_mode(SortMode::Newest);
    assert_eq!(ids(&c.current_view()), vec![1, 2, 3]);
    c.set_sort_mode(SortMode::Oldest);
    assert_eq!(ids(&c.current_view()), vec![1, 2, 3]);
}

#[test]
fn test_sort_by_title() {
    let mut c = controller(
        12,
        vec![
            article(1, "youth engagement", "2024-01-10", "politics"),
            article(2, "Économie du Ghana", "2024-01-11", "business"),
            article(3, "Digital media", "2024-01-12", "technology"),
        ],
    );
    c.set_sort_mode(SortMode::Title);
    assert_eq!(ids(&c.current_view()), vec![3, 2, 1]);
}

#[test]
fn test_pagination_boundaries() {
    let mut c = controller(2, numbered(5, "business"));
    assert_eq!(c.total_pages(), 3);

    assert!(c.go_to_page(3));
    let view = c.current_view();
    assert_eq!(view.items.len(), 1);
    assert_eq!(view.current_page, 3);
    assert!(!view.has_next);
    assert!(view.has_previous);

    assert!(!c.go_to_page(4));
    assert_eq!(c.current_view().current_page, 3);
    assert!(!c.go_to_page(0));
    assert_eq!(c.current_view().current_page, 3);
}

#[test]
fn test_range_labels_from_the_controller() {
    let c = controller(12, Vec::new());
    let view = c.current_view();
    assert_eq!(view.range_label, "No articles found");
    assert_eq!(view.total_pages, 1);
    assert_eq!(view.current_page, 1);
    assert!(!view.show_pagination);

    let c = controller(12, numbered(1, "business"));
    assert_eq!(c.current_view().range_label, "Showing 1 article");

    let mut c = controller(12, numbered(20, "business"));
    c.go_to_page(2);
    let view = c.current_view();
    assert_eq!(view.range_label, "Showing 13-20 of 20 articles");
    assert_eq!(view.page_label, "Page 2 of 2");
    assert!(view.show_pagination);
}

#[test]
fn test_filter_change_resets_page() {
    let mut articles = numbered(10, "business");
    articles.extend(numbered(10, "politics"));
    let mut c = controller(2, articles);
    assert!(c.go_to_page(3));

    c.set_category_filter("business");
    assert_eq!(c.current_view().current_page, 1);
    // The business-only set still has five pages
    assert_eq!(c.total_pages(), 5);

    c.go_to_page(3);
    c.set_sort_mode(SortMode::Title);
    assert_eq!(c.current_view().current_page, 1);

    c.go_to_page(3);
    c.set_search_query("article");
    assert_eq!(c.current_view().current_page, 1);
}

#[test]
fn test_category_filter() {
    let mut articles = numbered(3, "business");
    articles.push(article(9, "Vote count", "2024-02-01", "politics"));
    let mut c = controller(12, articles);
    c.set_category_filter("politics");
    assert_eq!(ids(&c.current_view()), vec![9]);
    c.set_category_filter(CategoryFilter::All);
    assert_eq!(c.current_view().total_count, 4);
}

#[test]
fn test_snapshot_replacement_keeps_page_position() {
    let mut c = controller(2, numbered(6, "business"));
    c.set_search_query("article");
    c.go_to_page(2);

    let delta = c.load_snapshot(numbered(8, "business"));
    assert_eq!(delta.added, 2);
    assert_eq!(c.current_view().current_page, 2);
    assert_eq!(c.parameters().search_query, "article");
}

#[test]
fn test_snapshot_replacement_clamps_page() {
    let mut c = controller(2, numbered(6, "business"));
    c.go_to_page(3);

    let delta = c.load_snapshot(numbered(3, "business"));
    assert_eq!(delta.added, 0);
    assert_eq!(c.current_view().current_page, 2);

    c.load_snapshot(Vec::new());
    let view = c.current_view();
    assert_eq!(view.current_page, 1);
    assert_eq!(view.range_label, "No articles found");
}

#[test]
fn test_public_scope_drops_drafts() {
    let mut articles = numbered(3, "business");
    articles[1].status = ArticleStatus::Draft;

    let public = controller(12, articles.clone());
    assert_eq!(public.current_view().total_count, 2);

    let mut admin = ArticleListController::new(ListingConfig::admin(12));
    admin.load_snapshot(articles);
    assert_eq!(admin.current_view().total_count, 3);
}

#[test]
fn test_sinks_receive_every_recompute() {
    let rendered = Arc::new(Mutex::new(Vec::new()));
    let log = Arc::clone(&rendered);

    let mut c = ArticleListController::new(ListingConfig::public(2));
    c.subscribe(move |view: &ListView| {
        log.lock().unwrap().push((view.current_page, view.total_count));
    });
    c.load_snapshot(numbered(5, "business"));
    c.go_to_page(2);
    c.go_to_page(9);
    c.set_search_query("Article 5");

    let rendered = rendered.lock().unwrap();
    assert_eq!(*rendered, vec![(1, 0), (1, 5), (2, 5), (1, 1)]);
}
