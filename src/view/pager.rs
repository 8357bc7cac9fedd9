use std::ops::Range;

/// Cursor and page size for a list view.
///
/// The page size comes from the rendered list height divided by the row
/// height of the entity, so it changes on every resize. The current page is
/// always the one holding the cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pager {
    cursor: usize,
    page_size: usize,
}

impl Default for Pager {
    fn default() -> Self {
        Self {
            cursor: 0,
            page_size: 1,
        }
    }
}

impl Pager {
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Recompute the page size from available rows. Never below 1.
    pub fn resize(&mut self, rows: u16, row_height: u16) {
        let per_row = row_height.max(1);
        self.page_size = usize::from(rows / per_row).max(1);
    }

    /// Keep the cursor inside a list of `len` rows.
    pub fn clamp(&mut self, len: usize) {
        self.cursor = self.cursor.min(len.saturating_sub(1));
    }

    pub fn move_by(&mut self, delta: isize, len: usize) {
        if len == 0 {
            self.cursor = 0;
            return;
        }
        let target = self.cursor.saturating_add_signed(delta);
        self.cursor = target.min(len - 1);
    }

    /// Jump a whole page forward or back.
    pub fn page_by(&mut self, pages: isize, len: usize) {
        let step = pages.saturating_mul(self.page_size as isize);
        self.move_by(step, len);
    }

    pub fn reset(&mut self) {
        self.cursor = 0;
    }

    /// Zero-based page holding the cursor.
    pub fn page(&self) -> usize {
        self.cursor / self.page_size
    }

    pub fn page_count(&self, len: usize) -> usize {
        len.div_ceil(self.page_size).max(1)
    }

    /// Index range of the current page within a list of `len` rows.
    pub fn page_range(&self, len: usize) -> Range<usize> {
        let start = (self.page() * self.page_size).min(len);
        let end = (start + self.page_size).min(len);
        start..end
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_page_size_from_rows() {
        let mut pager = Pager::default();
        pager.resize(20, 2);
        assert_eq!(pager.page_size(), 10);
        pager.resize(1, 2);
        assert_eq!(pager.page_size(), 1);
        pager.resize(0, 0);
        assert_eq!(pager.page_size(), 1);
    }

    #[test]
    fn test_cursor_drives_page() {
        let mut pager = Pager::default();
        pager.resize(10, 1);
        pager.move_by(23, 100);
        assert_eq!(pager.page(), 2);
        assert_eq!(pager.page_range(100), 20..30);
        assert_eq!(pager.page_count(100), 10);
    }

    #[test]
    fn test_last_page_is_short() {
        let mut pager = Pager::default();
        pager.resize(10, 1);
        pager.move_by(100, 25);
        assert_eq!(pager.cursor(), 24);
        assert_eq!(pager.page_range(25), 20..25);
    }

    #[test]
    fn test_clamp_after_shrink() {
        let mut pager = Pager::default();
        pager.move_by(9, 10);
        pager.clamp(3);
        assert_eq!(pager.cursor(), 2);
        pager.clamp(0);
        assert_eq!(pager.cursor(), 0);
        assert_eq!(pager.page_range(0), 0..0);
    }

    proptest! {
        #[test]
        fn prop_cursor_stays_on_current_page(
            rows in 0u16..200,
            height in 0u16..4,
            len in 0usize..500,
            moves in proptest::collection::vec(-50isize..50, 0..20),
        ) {
            let mut pager = Pager::default();
            pager.resize(rows, height);
            prop_assert!(pager.page_size() >= 1);
            for delta in moves {
                pager.move_by(delta, len);
            }
            let range = pager.page_range(len);
            if len > 0 {
                prop_assert!(range.contains(&pager.cursor()));
                prop_assert!(range.len() <= pager.page_size());
            } else {
                prop_assert_eq!(pager.cursor(), 0);
            }
        }
    }
}
