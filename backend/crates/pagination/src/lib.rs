//! Page-number pagination shared by Foodgram list endpoints.
//!
//! Clients address pages with a one-based `page` query parameter and size
//! them with `limit`. Responses use the `{count, next, previous, results}`
//! envelope where `next` and `previous` are absolute links built from the
//! request URL, so clients can follow them verbatim.

use serde::Serialize;
use url::Url;

/// Page size used when the client does not supply a usable `limit`.
pub const DEFAULT_LIMIT: u32 = 6;

/// Upper bound applied to client-supplied `limit` values.
pub const MAX_LIMIT: u32 = 100;

/// Query parameter carrying the page number.
pub const PAGE_PARAM: &str = "page";

/// Query parameter carrying the page size.
pub const LIMIT_PARAM: &str = "limit";

/// Errors raised while interpreting pagination parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PaginationError {
    /// The `page` parameter was not a positive integer.
    #[error("page must be a positive integer")]
    InvalidPage,
    /// The requested page lies past the final page of results.
    #[error("page {page} is beyond the last page ({last})")]
    PageOutOfRange {
        /// Requested page number.
        page: u32,
        /// Final page that holds results.
        last: u32,
    },
}

/// Validated page selection.
///
/// # Examples
/// ```
/// use pagination::PageRequest;
///
/// let request = PageRequest::from_query(Some("3"), Some("10")).expect("valid page");
/// assert_eq!(request.offset(), 20);
/// assert_eq!(request.limit(), 10);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    limit: u32,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl PageRequest {
    /// Build a request for `page` holding up to `limit` items.
    ///
    /// `limit` is clamped into `1..=MAX_LIMIT`; a zero limit falls back to
    /// [`DEFAULT_LIMIT`].
    ///
    /// # Errors
    /// Returns [`PaginationError::InvalidPage`] when `page` is zero.
    pub fn new(page: u32, limit: u32) -> Result<Self, PaginationError> {
        if page == 0 {
            return Err(PaginationError::InvalidPage);
        }
        let limit = match limit {
            0 => DEFAULT_LIMIT,
            value => value.min(MAX_LIMIT),
        };
        Ok(Self { page, limit })
    }

    /// Interpret raw `page` and `limit` query values.
    ///
    /// Missing pages default to the first one. Unparseable or zero limits
    /// fall back to [`DEFAULT_LIMIT`] rather than failing the request.
    ///
    /// # Errors
    /// Returns [`PaginationError::InvalidPage`] when `page` is present but is
    /// not a positive integer.
    pub fn from_query(page: Option<&str>, limit: Option<&str>) -> Result<Self, PaginationError> {
        let page = match page.map(str::trim) {
            None | Some("") => 1,
            Some(raw) => raw
                .parse::<u32>()
                .map_err(|_| PaginationError::InvalidPage)?,
        };
        let limit = limit
            .and_then(|raw| raw.trim().parse::<u32>().ok())
            .unwrap_or(DEFAULT_LIMIT);
        Self::new(page, limit)
    }

    /// One-based page number.
    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }

    /// Maximum number of items on the page.
    #[must_use]
    pub const fn limit(&self) -> u32 {
        self.limit
    }

    /// Number of items preceding this page.
    #[must_use]
    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.limit)
    }
}

/// One page of results together with the total number of matches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    items: Vec<T>,
    total: u64,
    request: PageRequest,
}

impl<T> Page<T> {
    /// Wrap the items fetched for `request`.
    #[must_use]
    pub const fn new(items: Vec<T>, total: u64, request: PageRequest) -> Self {
        Self {
            items,
            total,
            request,
        }
    }

    /// Items on this page.
    #[must_use]
    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Consume the page, yielding its items.
    #[must_use]
    pub fn into_items(self) -> Vec<T> {
        self.items
    }

    /// Total number of matching items across every page.
    #[must_use]
    pub const fn total(&self) -> u64 {
        self.total
    }

    /// Request that produced this page.
    #[must_use]
    pub const fn request(&self) -> PageRequest {
        self.request
    }

    /// Final page number; an empty result set still has one page.
    #[must_use]
    pub fn last_page(&self) -> u32 {
        let pages = self.total.div_ceil(u64::from(self.request.limit));
        u32::try_from(pages).unwrap_or(u32::MAX).max(1)
    }

    /// Transform every item while keeping the paging metadata.
    #[must_use]
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            request: self.request,
        }
    }

    /// Reject pages that lie past the end of the result set.
    ///
    /// # Errors
    /// Returns [`PaginationError::PageOutOfRange`] when the requested page is
    /// greater than [`Page::last_page`].
    pub fn ensure_in_range(&self) -> Result<(), PaginationError> {
        let last = self.last_page();
        if self.request.page > last {
            return Err(PaginationError::PageOutOfRange {
                page: self.request.page,
                last,
            });
        }
        Ok(())
    }
}

/// Response envelope for paginated collections.
///
/// # Examples
/// ```
/// use pagination::{Page, PageRequest, Paginated};
/// use url::Url;
///
/// let request = PageRequest::new(1, 2).expect("valid page");
/// let page = Page::new(vec![1, 2], 3, request);
/// let url = Url::parse("http://localhost/api/recipes/?limit=2").expect("url");
/// let body = Paginated::from_page(page, &url).expect("page in range");
/// assert_eq!(
///     body.next.as_deref(),
///     Some("http://localhost/api/recipes/?limit=2&page=2")
/// );
/// assert!(body.previous.is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Paginated<T> {
    /// Total number of matching items.
    pub count: u64,
    /// Absolute link to the following page.
    pub next: Option<String>,
    /// Absolute link to the preceding page.
    pub previous: Option<String>,
    /// Items on the current page.
    pub results: Vec<T>,
}

impl<T> Paginated<T> {
    /// Build the envelope for `page`, deriving links from `current`.
    ///
    /// # Errors
    /// Returns [`PaginationError::PageOutOfRange`] when the page lies past
    /// the final page of results.
    pub fn from_page(page: Page<T>, current: &Url) -> Result<Self, PaginationError> {
        page.ensure_in_range()?;
        let number = page.request.page;
        let next = (number < page.last_page()).then(|| page_link(current, number + 1));
        let previous = (number > 1).then(|| page_link(current, number - 1));
        Ok(Self {
            count: page.total,
            next,
            previous,
            results: page.items,
        })
    }
}

/// Rewrite `current` so that it addresses `page`.
///
/// The first page is addressed by omitting the parameter entirely.
fn page_link(current: &Url, page: u32) -> String {
    let retained: Vec<(String, String)> = current
        .query_pairs()
        .filter(|(key, _)| key != PAGE_PARAM)
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();

    let mut link = current.clone();
    link.set_query(None);
    if !retained.is_empty() || page > 1 {
        let mut pairs = link.query_pairs_mut();
        for (key, value) in &retained {
            pairs.append_pair(key, value);
        }
        if page > 1 {
            pairs.append_pair(PAGE_PARAM, &page.to_string());
        }
    }
    link.to_string()
}
