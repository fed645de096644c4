use std::ops::Range;

/// Rows rendered per page of the table viewer
pub const ROWS_PER_PAGE: usize = 50;

/// Page numbers shown on each side of the current page
const PAGE_WINDOW: usize = 2;

/// Pagination state for the current sheet
///
/// `current_page` is 1-based and always within `[1, max(total_pages, 1)]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationCursor {
    current_page: usize,
    total_pages: usize,
    rows_per_page: usize,
}

/// One control in the pagination bar
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageItem {
    Prev { enabled: bool },
    Page { number: usize, active: bool },
    Ellipsis,
    Next { enabled: bool },
}

impl Default for PaginationCursor {
    fn default() -> Self {
        Self {
            current_page: 1,
            total_pages: 1,
            rows_per_page: ROWS_PER_PAGE,
        }
    }
}

impl PaginationCursor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn total_pages(&self) -> usize {
        self.total_pages
    }

    pub fn rows_per_page(&self) -> usize {
        self.rows_per_page
    }

    /// Recompute the page count for `row_count` rows and clamp the cursor
    pub fn recompute(&mut self, row_count: usize) {
        self.total_pages = row_count.div_ceil(self.rows_per_page);
        if self.current_page > self.total_pages {
            self.current_page = self.total_pages.max(1);
        }
        if self.current_page == 0 {
            self.current_page = 1;
        }
    }

    /// Jump to a page, clamped to the valid range
    pub fn go_to(&mut self, page: usize) {
        self.current_page = page.clamp(1, self.total_pages.max(1));
    }

    pub fn reset(&mut self) {
        self.current_page = 1;
    }

    pub fn next(&mut self) -> bool {
        if self.current_page < self.total_pages {
            self.current_page += 1;
            true
        } else {
            false
        }
    }

    pub fn prev(&mut self) -> bool {
        if self.current_page > 1 {
            self.current_page -= 1;
            true
        } else {
            false
        }
    }

    pub fn first(&mut self) {
        self.current_page = 1;
    }

    pub fn last(&mut self) {
        self.current_page = self.total_pages.max(1);
    }

    /// Index range of the rows on the current page
    pub fn row_range(&self, row_count: usize) -> Range<usize> {
        let start = (self.current_page - 1) * self.rows_per_page;
        let end = (start + self.rows_per_page).min(row_count);
        start.min(end)..end
    }

    /// Controls for the pagination bar; empty when there is a single page
    pub fn page_items(&self) -> Vec<PageItem> {
        let total = self.total_pages;
        let current = self.current_page;
        if total <= 1 {
            return Vec::new();
        }

        let mut items = vec![PageItem::Prev {
            enabled: current > 1,
        }];

        let start = current.saturating_sub(PAGE_WINDOW).max(1);
        let end = (current + PAGE_WINDOW).min(total);

        if start > 1 {
            items.push(PageItem::Page {
                number: 1,
                active: false,
            });
            if start > 2 {
                items.push(PageItem::Ellipsis);
            }
        }

        for number in start..=end {
            items.push(PageItem::Page {
                number,
                active: number == current,
            });
        }

        if end < total {
            if end < total - 1 {
                items.push(PageItem::Ellipsis);
            }
            items.push(PageItem::Page {
                number: total,
                active: false,
            });
        }

        items.push(PageItem::Next {
            enabled: current < total,
        });
        items
    }
}
