use std::ops::Range;

/// Number of pages for `count` items, never less than one.
pub fn total_pages(count: usize, page_size: usize) -> usize {
    count.div_ceil(page_size.max(1)).max(1)
}

/// Pulls `page` back into `[1, total_pages]`.
pub fn clamp_page(page: usize, total_pages: usize) -> usize {
    page.min(total_pages.max(1)).max(1)
}

/// Index range of `page` (1-based) within a list of `count` items.
pub fn page_bounds(page: usize, page_size: usize, count: usize) -> Range<usize> {
    let start = page.saturating_sub(1).saturating_mul(page_size).min(count);
    let end = start.saturating_add(page_size).min(count);
    start..end
}

/// "Showing X-Y of N articles" and its short forms.
pub fn range_label(total_count: usize, current_page: usize, page_size: usize) -> String {
    if total_count == 0 {
        return "No articles found".to_string();
    }
    if total_count <= page_size {
        let plural = if total_count == 1 { "" } else { "s" };
        return format!("Showing {} article{}", total_count, plural);
    }
    let bounds = page_bounds(current_page, page_size, total_count);
    format!(
        "Showing {}-{} of {} articles",
        bounds.start + 1,
        bounds.end,
        total_count
    )
}

pub fn page_label(current_page: usize, total_pages: usize) -> String {
    format!("Page {} of {}", current_page, total_pages)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_pages() {
        assert_eq!(total_pages(0, 12), 1);
        assert_eq!(total_pages(12, 12), 1);
        assert_eq!(total_pages(13, 12), 2);
        assert_eq!(total_pages(5, 2), 3);
    }

    #[test]
    fn test_clamp_page() {
        assert_eq!(clamp_page(0, 3), 1);
        assert_eq!(clamp_page(2, 3), 2);
        assert_eq!(clamp_page(9, 3), 3);
        assert_eq!(clamp_page(4, 0), 1);
    }

    #[test]
    fn test_page_bounds() {
        assert_eq!(page_bounds(1, 2, 5), 0..2);
        assert_eq!(page_bounds(3, 2, 5), 4..5);
        assert_eq!(page_bounds(4, 2, 5), 5..5);
        assert_eq!(page_bounds(1, 12, 0), 0..0);
    }

    #[test]
    fn test_range_label() {
        assert_eq!(range_label(0, 1, 12), "No articles found");
        assert_eq!(range_label(1, 1, 12), "Showing 1 article");
        assert_eq!(range_label(7, 1, 12), "Showing 7 articles");
        assert_eq!(range_label(20, 2, 12), "Showing 13-20 of 20 articles");
        assert_eq!(range_label(30, 1, 12), "Showing 1-12 of 30 articles");
    }

    #[test]
    fn test_page_label() {
        assert_eq!(page_label(2, 5), "Page 2 of 5");
    }
}
