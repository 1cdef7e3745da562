//! Page-number pagination helpers for list footers.

use std::num::NonZeroU32;

/// Rows-per-page choices offered by list footers.
pub const ROWS_PER_PAGE_OPTIONS: [u32; 3] = [5, 10, 20];

/// Last reachable page for `count` total rows; zero when `rows_per_page` is
/// zero or there are no rows.
pub fn max_page(count: u64, rows_per_page: u32) -> u64 {
    if rows_per_page == 0 {
        return 0;
    }
    count.div_ceil(u64::from(rows_per_page))
}

/// Footer navigation derived from the last fetched count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageControls {
    page: NonZeroU32,
    max_page: u64,
}

impl PageControls {
    pub fn new(count: u64, page: NonZeroU32, rows_per_page: NonZeroU32) -> Self {
        Self {
            page,
            max_page: max_page(count, rows_per_page.get()),
        }
    }

    pub fn page(&self) -> NonZeroU32 {
        self.page
    }

    pub fn max_page(&self) -> u64 {
        self.max_page
    }

    pub fn first(&self) -> Option<NonZeroU32> {
        (self.page.get() > 1).then_some(NonZeroU32::MIN)
    }

    pub fn previous(&self) -> Option<NonZeroU32> {
        self.page.get().checked_sub(1).and_then(NonZeroU32::new)
    }

    pub fn next(&self) -> Option<NonZeroU32> {
        if u64::from(self.page.get()) >= self.max_page {
            return None;
        }
        self.page.checked_add(1)
    }

    pub fn last(&self) -> Option<NonZeroU32> {
        if u64::from(self.page.get()) >= self.max_page {
            return None;
        }
        self.bounded(self.max_page)
    }

    /// Bound `requested` into `[1, max_page]`, or page 1 when nothing is left.
    pub fn clamp(&self, requested: NonZeroU32) -> NonZeroU32 {
        if self.max_page == 0 {
            return NonZeroU32::MIN;
        }
        if u64::from(requested.get()) <= self.max_page {
            return requested;
        }
        self.bounded(self.max_page).unwrap_or(requested)
    }

    fn bounded(&self, page: u64) -> Option<NonZeroU32> {
        u32::try_from(page).ok().and_then(NonZeroU32::new)
    }
}
