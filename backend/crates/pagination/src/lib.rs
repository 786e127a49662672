//! Page request and page envelope primitives shared by listing endpoints.
//!
//! A [`PageRequest`] names a zero-based page index and a bounded page size.
//! Storage adapters answer it with a [`Page`], which echoes the request back
//! alongside the total number of matching items so callers can render
//! navigation without issuing a second count query.

use std::ops::Range;

use serde::{Deserialize, Serialize};

/// Page size applied when the caller does not supply one.
pub const DEFAULT_PAGE_SIZE: u32 = 20;
/// Largest page size a caller may request.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Validation failures raised while building a [`PageRequest`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PageRequestError {
    /// Requested page size falls outside `1..=MAX_PAGE_SIZE`.
    #[error("page size must be between 1 and {max}, got {size}")]
    InvalidSize {
        /// Size supplied by the caller.
        size: u32,
        /// Upper bound enforced by the crate.
        max: u32,
    },
}

/// Zero-based page selector.
///
/// ## Invariants
/// - `size` lies within `1..=MAX_PAGE_SIZE`.
///
/// # Examples
/// ```
/// use pagination::PageRequest;
///
/// let request = PageRequest::new(2, 10).expect("valid request");
/// assert_eq!(request.offset(), 20);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawPageRequest", into = "RawPageRequest")]
pub struct PageRequest {
    page: u32,
    size: u32,
}

impl PageRequest {
    /// Validate and build a page request.
    ///
    /// # Errors
    ///
    /// Returns [`PageRequestError::InvalidSize`] when `size` is zero or larger
    /// than [`MAX_PAGE_SIZE`].
    pub const fn new(page: u32, size: u32) -> Result<Self, PageRequestError> {
        if size == 0 || size > MAX_PAGE_SIZE {
            return Err(PageRequestError::InvalidSize {
                size,
                max: MAX_PAGE_SIZE,
            });
        }
        Ok(Self { page, size })
    }

    /// First page using [`DEFAULT_PAGE_SIZE`].
    #[must_use]
    pub const fn first() -> Self {
        Self {
            page: 0,
            size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Zero-based page index.
    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }

    /// Maximum number of items on the page.
    #[must_use]
    pub const fn size(&self) -> u32 {
        self.size
    }

    /// Number of items preceding this page.
    #[must_use]
    pub fn offset(&self) -> u64 {
        u64::from(self.page) * u64::from(self.size)
    }

    /// Index range this page covers within a collection of `len` items.
    ///
    /// The range is clamped to `len`, so pages past the end yield an empty
    /// range rather than an out-of-bounds slice.
    ///
    /// # Examples
    /// ```
    /// use pagination::PageRequest;
    ///
    /// let request = PageRequest::new(1, 4).expect("valid request");
    /// assert_eq!(request.window(6), 4..6);
    /// assert_eq!(request.window(3), 3..3);
    /// ```
    #[must_use]
    pub fn window(&self, len: usize) -> Range<usize> {
        let start = usize::try_from(self.offset()).map_or(len, |offset| offset.min(len));
        let end = usize::try_from(self.size).map_or(len, |size| start.saturating_add(size).min(len));
        start..end
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::first()
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct RawPageRequest {
    #[serde(default)]
    page: u32,
    #[serde(default = "default_page_size")]
    size: u32,
}

const fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

impl From<PageRequest> for RawPageRequest {
    fn from(value: PageRequest) -> Self {
        Self {
            page: value.page,
            size: value.size,
        }
    }
}

impl TryFrom<RawPageRequest> for PageRequest {
    type Error = PageRequestError;

    fn try_from(value: RawPageRequest) -> Result<Self, Self::Error> {
        Self::new(value.page, value.size)
    }
}

/// A single page of results plus the information needed to navigate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    items: Vec<T>,
    request: PageRequest,
    total_items: u64,
}

impl<T> Page<T> {
    /// Assemble a page from items already sliced by the caller.
    #[must_use]
    pub const fn new(items: Vec<T>, request: PageRequest, total_items: u64) -> Self {
        Self {
            items,
            request,
            total_items,
        }
    }

    /// Page with no items and a zero total.
    #[must_use]
    pub const fn empty(request: PageRequest) -> Self {
        Self::new(Vec::new(), request, 0)
    }

    /// Slice `all` according to `request`, recording the full length as the
    /// total.
    ///
    /// # Examples
    /// ```
    /// use pagination::{Page, PageRequest};
    ///
    /// let request = PageRequest::new(1, 2).expect("valid request");
    /// let page = Page::from_collection(vec![1, 2, 3, 4, 5], request);
    /// assert_eq!(page.items(), &[3, 4]);
    /// assert_eq!(page.total_items(), 5);
    /// assert!(page.has_next());
    /// ```
    #[must_use]
    pub fn from_collection(all: Vec<T>, request: PageRequest) -> Self {
        let total_items = u64::try_from(all.len()).unwrap_or(u64::MAX);
        let window = request.window(all.len());
        let items = all
            .into_iter()
            .skip(window.start)
            .take(window.len())
            .collect();
        Self::new(items, request, total_items)
    }

    /// Items on this page.
    #[must_use]
    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Consume the page and return its items.
    #[must_use]
    pub fn into_items(self) -> Vec<T> {
        self.items
    }

    /// Request that produced this page.
    #[must_use]
    pub const fn request(&self) -> PageRequest {
        self.request
    }

    /// Total number of items across all pages.
    #[must_use]
    pub const fn total_items(&self) -> u64 {
        self.total_items
    }

    /// Number of pages needed to show every item.
    #[must_use]
    pub const fn total_pages(&self) -> u64 {
        self.total_items.div_ceil(self.request.size as u64)
    }

    /// Whether a page follows this one.
    #[must_use]
    pub fn has_next(&self) -> bool {
        let seen = u64::try_from(self.items.len()).unwrap_or(u64::MAX);
        self.request.offset().saturating_add(seen) < self.total_items
    }

    /// Convert every item while keeping the navigation data.
    #[must_use]
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            request: self.request,
            total_items: self.total_items,
        }
    }
}

#[cfg(test)]
mod tests {
    //! Unit coverage for page requests and envelopes.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0)]
    #[case(MAX_PAGE_SIZE + 1)]
    fn rejects_out_of_range_sizes(#[case] size: u32) {
        let err = PageRequest::new(0, size).expect_err("size must be rejected");
        assert_eq!(
            err,
            PageRequestError::InvalidSize {
                size,
                max: MAX_PAGE_SIZE
            }
        );
    }

    #[rstest]
    #[case(0, 10, 25, 0..10)]
    #[case(2, 10, 25, 20..25)]
    #[case(3, 10, 25, 25..25)]
    #[case(u32::MAX, MAX_PAGE_SIZE, 5, 5..5)]
    fn window_is_clamped(
        #[case] page: u32,
        #[case] size: u32,
        #[case] len: usize,
        #[case] expected: Range<usize>,
    ) {
        let request = PageRequest::new(page, size).expect("valid request");
        assert_eq!(request.window(len), expected);
    }

    #[rstest]
    fn last_page_has_no_successor() {
        let request = PageRequest::new(2, 2).expect("valid request");
        let page = Page::from_collection(vec!["a", "b", "c", "d", "e"], request);
        assert_eq!(page.items(), &["e"]);
        assert_eq!(page.total_pages(), 3);
        assert!(!page.has_next());
    }

    #[rstest]
    fn map_keeps_navigation() {
        let request = PageRequest::new(0, 2).expect("valid request");
        let page = Page::from_collection(vec![1, 2, 3], request).map(|n| n * 10);
        assert_eq!(page.items(), &[10, 20]);
        assert_eq!(page.total_items(), 3);
        assert_eq!(page.request(), request);
    }

    #[rstest]
    fn deserialisation_applies_defaults_and_validates() {
        let request: PageRequest = serde_json::from_str("{}").expect("defaults apply");
        assert_eq!(request, PageRequest::first());

        let result = serde_json::from_str::<PageRequest>(r#"{"page":1,"size":0}"#);
        assert!(result.is_err());
    }
}
