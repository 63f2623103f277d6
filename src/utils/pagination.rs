//! Pagination helpers shared by listing endpoints

use serde::{Deserialize, Serialize};

use crate::constants::MAX_PAGE_SIZE;

/// Normalized `page`/`per_page` pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: u32,
    pub per_page: u32,
}

impl Pagination {
    /// Clamp raw query values: page starts at 1, per_page in `1..=MAX_PAGE_SIZE`
    pub fn new(page: Option<u32>, per_page: Option<u32>, default_per_page: u32) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            per_page: per_page.unwrap_or(default_per_page).clamp(1, MAX_PAGE_SIZE),
        }
    }

    pub fn limit(&self) -> i64 {
        self.per_page as i64
    }

    pub fn offset(&self) -> i64 {
        (self.page as i64 - 1) * self.per_page as i64
    }

    pub fn total_pages(&self, total: i64) -> i64 {
        (total + self.per_page as i64 - 1) / self.per_page as i64
    }

    /// Wrap one page of results with its position metadata
    pub fn page_of<T>(&self, data: Vec<T>, total: i64) -> Paginated<T> {
        Paginated {
            data,
            current_page: self.page,
            per_page: self.per_page,
            total,
            last_page: self.total_pages(total).max(1),
        }
    }
}

/// One page of a listing
#[derive(Debug, Serialize, Deserialize)]
pub struct Paginated<T> {
    pub data: Vec<T>,
    pub current_page: u32,
    pub per_page: u32,
    pub total: i64,
    pub last_page: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_and_clamping() {
        let p = Pagination::new(None, None, 15);
        assert_eq!(p, Pagination { page: 1, per_page: 15 });

        let p = Pagination::new(Some(0), Some(1000), 20);
        assert_eq!(p, Pagination { page: 1, per_page: MAX_PAGE_SIZE });

        let p = Pagination::new(Some(3), Some(0), 20);
        assert_eq!(p.per_page, 1);
    }

    #[test]
    fn test_offset_and_pages() {
        let p = Pagination::new(Some(3), Some(20), 20);
        assert_eq!(p.offset(), 40);
        assert_eq!(p.limit(), 20);
        assert_eq!(p.total_pages(41), 3);
        assert_eq!(p.total_pages(40), 2);
        assert_eq!(p.page_of(Vec::<i32>::new(), 0).last_page, 1);
    }
}
