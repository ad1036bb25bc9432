//! Paging request and result types

use serde::{Deserialize, Serialize};

/// Invalid paging parameters
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PageError {
    #[error("page number must be at least 1, got {0}")]
    InvalidPageNo(usize),

    #[error("page size must be positive")]
    ZeroPageSize,
}

/// A requested slice of an ordered listing, numbered from page 1
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    page_no: usize,
    page_size: usize,
}

impl PageRequest {
    pub fn new(page_no: usize, page_size: usize) -> Result<Self, PageError> {
        if page_no < 1 {
            return Err(PageError::InvalidPageNo(page_no));
        }
        if page_size == 0 {
            return Err(PageError::ZeroPageSize);
        }
        Ok(Self { page_no, page_size })
    }

    /// First page of `page_size` items
    pub fn first(page_size: usize) -> Result<Self, PageError> {
        Self::new(1, page_size)
    }

    pub fn page_no(&self) -> usize {
        self.page_no
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Number of items preceding this page
    pub fn offset(&self) -> usize {
        (self.page_no - 1).saturating_mul(self.page_size)
    }
}

/// One page of results plus the size of the whole filtered listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    pub content: Vec<T>,
    pub page_no: usize,
    pub page_size: usize,
    pub total_count: usize,
}

impl<T> Page<T> {
    pub fn new(content: Vec<T>, request: PageRequest, total_count: usize) -> Self {
        Self {
            content,
            page_no: request.page_no(),
            page_size: request.page_size(),
            total_count,
        }
    }

    /// Pages needed for `total_count`; 0 when there is nothing to page or
    /// the page was built with a zero size
    pub fn total_pages(&self) -> usize {
        if self.total_count == 0 || self.page_size == 0 {
            return 0;
        }
        self.total_count.div_ceil(self.page_size)
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    pub fn map<U, F>(self, f: F) -> Page<U>
    where
        F: FnMut(T) -> U,
    {
        Page {
            content: self.content.into_iter().map(f).collect(),
            page_no: self.page_no,
            page_size: self.page_size,
            total_count: self.total_count,
        }
    }

    /// Page indicator such as `페이지 : [1] / 2 / 3`, or `None` when there are no pages
    pub fn indicator(&self) -> Option<String> {
        let total = self.total_pages();
        if total == 0 {
            return None;
        }
        let pages: Vec<String> = (1..=total)
            .map(|i| {
                if i == self.page_no {
                    format!("[{i}]")
                } else {
                    i.to_string()
                }
            })
            .collect();
        Some(format!("페이지 : {}", pages.join(" / ")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_validation() {
        assert_eq!(PageRequest::new(0, 5), Err(PageError::InvalidPageNo(0)));
        assert_eq!(PageRequest::new(1, 0), Err(PageError::ZeroPageSize));
        assert!(PageRequest::new(1, 1).is_ok());
    }

    #[test]
    fn test_offset() {
        assert_eq!(PageRequest::new(1, 5).unwrap().offset(), 0);
        assert_eq!(PageRequest::new(3, 5).unwrap().offset(), 10);
    }

    #[test]
    fn test_total_pages() {
        let request = PageRequest::new(1, 2).unwrap();
        assert_eq!(Page::<u8>::new(vec![], request, 0).total_pages(), 0);
        assert_eq!(Page::<u8>::new(vec![], request, 1).total_pages(), 1);
        assert_eq!(Page::<u8>::new(vec![], request, 3).total_pages(), 2);
        assert_eq!(Page::<u8>::new(vec![], request, 4).total_pages(), 2);
    }

    #[test]
    fn test_zero_page_size_has_no_pages() {
        let page: Page<u8> = Page {
            content: vec![],
            page_no: 1,
            page_size: 0,
            total_count: 4,
        };
        assert_eq!(page.total_pages(), 0);
        assert_eq!(page.indicator(), None);
    }

    #[test]
    fn test_map_keeps_paging_fields() {
        let page = Page::new(vec![1, 2], PageRequest::new(2, 2).unwrap(), 5);
        let mapped = page.map(|n| n * 10);

        assert_eq!(mapped.content, vec![10, 20]);
        assert_eq!(mapped.page_no, 2);
        assert_eq!(mapped.page_size, 2);
        assert_eq!(mapped.total_count, 5);
    }

    #[test]
    fn test_indicator() {
        let page = Page::new(vec![1], PageRequest::new(2, 5).unwrap(), 11);
        assert_eq!(page.indicator().as_deref(), Some("페이지 : 1 / [2] / 3"));

        let empty = Page::<u8>::new(vec![], PageRequest::new(1, 5).unwrap(), 0);
        assert_eq!(empty.indicator(), None);
    }
}
