//! Fixed-size pagination.

/// Rows per table page.
pub const PAGE_SIZE: usize = 50;

/// Page count for `total` rows; an empty table still has one page.
pub fn total_pages(total: usize, page_size: usize) -> usize {
    total.div_ceil(page_size.max(1)).max(1)
}

/// Current page (1-based) plus the row count it was computed for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pager {
    page: usize,
    page_size: usize,
    seen_total: Option<usize>,
}

impl Default for Pager {
    fn default() -> Self {
        Pager::new(PAGE_SIZE)
    }
}

impl Pager {
    pub fn new(page_size: usize) -> Self {
        Pager {
            page: 1,
            page_size: page_size.max(1),
            seen_total: None,
        }
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn reset(&mut self) {
        self.page = 1;
    }

    /// Requests a page; clamped once the row count is known.
    pub fn go_to(&mut self, page: usize) {
        self.page = page.max(1);
        if let Some(total) = self.seen_total {
            self.page = self.page.min(total_pages(total, self.page_size));
        }
    }

    /// Records the filtered row count. A different count means the filtered
    /// set changed, which sends the table back to page 1.
    pub fn observe(&mut self, total: usize) {
        if self.seen_total.is_some_and(|seen| seen != total) {
            self.page = 1;
        }
        self.seen_total = Some(total);
        self.page = self.page.clamp(1, total_pages(total, self.page_size));
    }

    /// Rows of the current page.
    pub fn slice<'a, T>(&self, rows: &'a [T]) -> &'a [T] {
        let start = (self.page - 1) * self.page_size;
        if start >= rows.len() {
            return &[];
        }
        let end = (start + self.page_size).min(rows.len());
        &rows[start..end]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_lengths_follow_total() {
        for total in [0usize, 1, 49, 50, 51, 100, 149] {
            let rows: Vec<usize> = (0..total).collect();
            let pages = total_pages(total, PAGE_SIZE);
            assert_eq!(pages, total.div_ceil(PAGE_SIZE).max(1));

            let mut pager = Pager::default();
            pager.observe(total);
            let mut seen = 0;
            for page in 1..=pages {
                pager.go_to(page);
                let len = pager.slice(&rows).len();
                if page < pages {
                    assert_eq!(len, PAGE_SIZE);
                } else if total > 0 {
                    let rem = total % PAGE_SIZE;
                    assert_eq!(len, if rem == 0 { PAGE_SIZE } else { rem });
                }
                seen += len;
            }
            assert_eq!(seen, total);
        }
    }

    #[test]
    fn page_is_clamped_and_reset_on_new_total() {
        let mut pager = Pager::default();
        pager.observe(120);
        pager.go_to(9);
        assert_eq!(pager.page(), 3);
        pager.go_to(0);
        assert_eq!(pager.page(), 1);

        pager.go_to(2);
        pager.observe(120);
        assert_eq!(pager.page(), 2);
        pager.observe(119);
        assert_eq!(pager.page(), 1);
    }
}
