use serde::{Deserialize, Serialize};

/// Offset-based pagination parameters
///
/// # Example
/// ```
/// use solar_core_db::repository::pagination::PageRequest;
///
/// let first = PageRequest::new(20, 0);
/// let second = PageRequest::for_page(20, 2);
/// assert_eq!(second.offset, 20);
/// assert_eq!(first.page_number(), 1);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    /// Maximum number of items to return
    pub limit: usize,
    /// Number of items to skip
    pub offset: usize,
}

impl PageRequest {
    pub fn new(limit: usize, offset: usize) -> Self {
        Self { limit, offset }
    }

    /// Page numbers are 1-based; 0 is treated as 1.
    pub fn for_page(page_size: usize, page_number: usize) -> Self {
        let page_number = page_number.max(1);
        Self {
            limit: page_size,
            offset: (page_number - 1) * page_size,
        }
    }

    pub fn page_number(&self) -> usize {
        if self.limit == 0 {
            1
        } else {
            (self.offset / self.limit) + 1
        }
    }

    /// Cuts this page out of an already ordered list.
    pub fn slice<T: Clone>(&self, ordered: &[T]) -> Page<T> {
        let items = ordered
            .iter()
            .skip(self.offset)
            .take(self.limit)
            .cloned()
            .collect();
        Page::new(items, ordered.len(), self.limit, self.offset)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            limit: 20,
            offset: 0,
        }
    }
}

/// One page of results plus the metadata needed to request the next one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Total number of items across all pages
    pub total: usize,
    pub limit: usize,
    pub offset: usize,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: usize, limit: usize, offset: usize) -> Self {
        Self {
            items,
            total,
            limit,
            offset,
        }
    }

    pub fn has_more(&self) -> bool {
        self.offset + self.items.len() < self.total
    }

    pub fn page_number(&self) -> usize {
        if self.limit == 0 {
            1
        } else {
            (self.offset / self.limit) + 1
        }
    }

    pub fn total_pages(&self) -> usize {
        if self.limit == 0 {
            1
        } else {
            self.total.div_ceil(self.limit)
        }
    }

    /// Converts the items while keeping the paging metadata.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            limit: self.limit,
            offset: self.offset,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slice_and_metadata() {
        let all: Vec<u32> = (1..=45).collect();

        let first = PageRequest::for_page(20, 1).slice(&all);
        assert_eq!(first.items.len(), 20);
        assert!(first.has_more());
        assert_eq!(first.total_pages(), 3);

        let last = PageRequest::for_page(20, 3).slice(&all);
        assert_eq!(last.items, vec![41, 42, 43, 44, 45]);
        assert!(!last.has_more());
        assert_eq!(last.page_number(), 3);

        let beyond = PageRequest::for_page(20, 9).slice(&all);
        assert!(beyond.items.is_empty());
        assert_eq!(beyond.total, 45);
    }

    #[test]
    fn test_map_keeps_metadata() {
        let page = PageRequest::new(2, 2).slice(&[1, 2, 3, 4, 5]).map(|n| n * 10);
        assert_eq!(page.items, vec![30, 40]);
        assert_eq!(page.offset, 2);
        assert_eq!(page.total, 5);
    }
}
