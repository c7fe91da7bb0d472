//! Pagination primitives for record listings.

/// One-based page selector with a bounded page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    number: u32,
    size: u32,
}

impl PageRequest {
    /// Build a page request, clamping page number and size to at least one.
    #[must_use]
    pub fn new(number: u32, size: u32) -> Self {
        Self {
            number: number.max(1),
            size: size.max(1),
        }
    }

    /// One-based page number.
    #[must_use]
    pub fn number(&self) -> u32 {
        self.number
    }

    /// Records per page.
    #[must_use]
    pub fn size(&self) -> u32 {
        self.size
    }

    /// Number of records preceding this page.
    #[must_use]
    pub fn offset(&self) -> usize {
        (self.number as usize - 1) * self.size as usize
    }
}

/// One page of an ordered listing.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    items: Vec<T>,
    page: u32,
    page_size: u32,
    total_items: u64,
    total_pages: u64,
}

impl<T> Page<T> {
    /// Slice an ordered collection into the requested page.
    #[must_use]
    pub fn paginate(all: Vec<T>, request: PageRequest) -> Self {
        let total_items = all.len() as u64;
        let total_pages = total_items.div_ceil(u64::from(request.size()));
        let items = all
            .into_iter()
            .skip(request.offset())
            .take(request.size() as usize)
            .collect();
        Self {
            items,
            page: request.number(),
            page_size: request.size(),
            total_items,
            total_pages,
        }
    }

    /// Records on this page.
    #[must_use]
    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Consume the page, yielding its records.
    #[must_use]
    pub fn into_items(self) -> Vec<T> {
        self.items
    }

    /// One-based page number.
    #[must_use]
    pub fn page(&self) -> u32 {
        self.page
    }

    /// Records per page.
    #[must_use]
    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Total matching records across all pages.
    #[must_use]
    pub fn total_items(&self) -> u64 {
        self.total_items
    }

    /// Total number of pages.
    #[must_use]
    pub fn total_pages(&self) -> u64 {
        self.total_pages
    }

    /// Transform every record on the page, keeping the envelope.
    #[must_use]
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            page_size: self.page_size,
            total_items: self.total_items,
            total_pages: self.total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for pagination arithmetic.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(1, 2, vec![1, 2], 3)]
    #[case(3, 2, vec![5], 3)]
    #[case(4, 2, vec![], 3)]
    fn paginate_slices_and_counts(
        #[case] number: u32,
        #[case] size: u32,
        #[case] expected: Vec<i32>,
        #[case] expected_pages: u64,
    ) {
        let page = Page::paginate(vec![1, 2, 3, 4, 5], PageRequest::new(number, size));
        assert_eq!(page.items(), expected.as_slice());
        assert_eq!(page.total_items(), 5);
        assert_eq!(page.total_pages(), expected_pages);
    }

    #[test]
    fn request_clamps_zero_inputs() {
        let request = PageRequest::new(0, 0);
        assert_eq!(request.number(), 1);
        assert_eq!(request.size(), 1);
        assert_eq!(request.offset(), 0);
    }
}
