/// A single stateless page of a larger result set, re-derived per request
#[derive(Debug, Clone)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    /// The page that was actually served, after clamping
    pub page: i64,
    pub per_page: i64,
    pub total_items: i64,
    pub total_pages: i64,
}

impl<T> Paginated<T> {
    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }
}

/// An empty result set still has one (empty) page
pub fn page_count(total_items: i64, per_page: i64) -> i64 {
    ((total_items + per_page - 1) / per_page).max(1)
}

/// Out-of-range page numbers serve the nearest valid page
pub fn clamp_page(requested: i64, total_pages: i64) -> i64 {
    requested.clamp(1, total_pages)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_page_count() {
        assert_eq!(page_count(0, 12), 1);
        assert_eq!(page_count(12, 12), 1);
        assert_eq!(page_count(13, 12), 2);
        assert_eq!(page_count(24, 12), 2);
    }

    #[test]
    fn test_clamp_page() {
        assert_eq!(clamp_page(0, 3), 1);
        assert_eq!(clamp_page(-4, 3), 1);
        assert_eq!(clamp_page(2, 3), 2);
        assert_eq!(clamp_page(9, 3), 3);
    }
}
