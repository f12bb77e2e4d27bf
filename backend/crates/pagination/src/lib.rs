//! Page-number pagination for Foodgram list endpoints.
//!
//! A [`PageRequest`] is parsed from the `page` and `limit` query parameters.
//! Repositories answer with a [`PageSlice`] holding one page of rows plus the
//! total row count, and inbound adapters wrap the slice in a [`Paginated`]
//! envelope carrying absolute `next` and `previous` links.
//!
//! ```
//! use pagination::{PageRequest, PageSlice, Paginated};
//! use url::Url;
//!
//! let request = PageRequest::from_params(Some("2"), Some("2")).expect("valid page");
//! let slice = PageSlice::new(vec!["c", "d"], 5);
//! let url = Url::parse("http://localhost/api/v1/recipes?page=2&limit=2").expect("url");
//! let page = Paginated::build(slice, request, &url).expect("page in range");
//!
//! assert_eq!(page.count, 5);
//! assert_eq!(
//!     page.next.as_deref(),
//!     Some("http://localhost/api/v1/recipes?limit=2&page=3")
//! );
//! assert_eq!(
//!     page.previous.as_deref(),
//!     Some("http://localhost/api/v1/recipes?limit=2")
//! );
//! ```

use serde::Serialize;
use url::Url;

/// Page size used when the client does not supply a usable `limit`.
pub const DEFAULT_PAGE_SIZE: u32 = 6;

/// Upper bound applied to client supplied page sizes.
pub const MAX_PAGE_SIZE: u32 = 100;

const PAGE_PARAM: &str = "page";

/// Errors raised while interpreting pagination parameters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PaginationError {
    /// The `page` parameter is not a positive integer.
    #[error("Invalid page.")]
    InvalidPage {
        /// Raw value supplied by the client.
        value: String,
    },
    /// The requested page lies beyond the last page of results.
    #[error("Invalid page.")]
    PageOutOfRange {
        /// Requested page number.
        page: u32,
        /// Last page available for the result set.
        last_page: u64,
    },
}

/// A validated request for one page of results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    limit: u32,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            limit: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PageRequest {
    /// Build a request for `page` (1-based) holding at most `limit` rows.
    ///
    /// `limit` is clamped into `1..=MAX_PAGE_SIZE`.
    ///
    /// # Errors
    ///
    /// Returns [`PaginationError::InvalidPage`] when `page` is zero.
    pub fn new(page: u32, limit: u32) -> Result<Self, PaginationError> {
        if page == 0 {
            return Err(PaginationError::InvalidPage {
                value: page.to_string(),
            });
        }
        Ok(Self {
            page,
            limit: limit.clamp(1, MAX_PAGE_SIZE),
        })
    }

    /// Parse raw `page` and `limit` query values.
    ///
    /// A missing `page` selects the first page. An unusable `limit` (missing,
    /// non-numeric, or zero) falls back to [`DEFAULT_PAGE_SIZE`].
    ///
    /// # Errors
    ///
    /// Returns [`PaginationError::InvalidPage`] when `page` is present but is
    /// not a positive integer.
    pub fn from_params(page: Option<&str>, limit: Option<&str>) -> Result<Self, PaginationError> {
        let page_number = match page.map(str::trim) {
            None | Some("") => 1,
            Some(raw) => raw
                .parse::<u32>()
                .ok()
                .filter(|value| *value > 0)
                .ok_or_else(|| PaginationError::InvalidPage {
                    value: raw.to_owned(),
                })?,
        };
        let page_size = limit
            .and_then(|raw| raw.trim().parse::<u32>().ok())
            .filter(|value| *value > 0)
            .unwrap_or(DEFAULT_PAGE_SIZE);
        Self::new(page_number, page_size)
    }

    /// Requested page number (1-based).
    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }

    /// Maximum number of rows on the page.
    #[must_use]
    pub const fn limit(&self) -> u32 {
        self.limit
    }

    /// Number of rows preceding the requested page.
    #[must_use]
    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.limit)
    }

    /// Last page number for a result set of `total` rows.
    ///
    /// An empty result set still has one (empty) page.
    #[must_use]
    pub fn last_page(&self, total: u64) -> u64 {
        total.div_ceil(u64::from(self.limit)).max(1)
    }

    /// Reject requests pointing past the last page of `total` rows.
    ///
    /// # Errors
    ///
    /// Returns [`PaginationError::PageOutOfRange`] when the page is beyond the
    /// last page.
    pub fn ensure_in_range(&self, total: u64) -> Result<(), PaginationError> {
        let last_page = self.last_page(total);
        if u64::from(self.page) > last_page {
            return Err(PaginationError::PageOutOfRange {
                page: self.page,
                last_page,
            });
        }
        Ok(())
    }
}

/// One page of rows together with the size of the whole result set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageSlice<T> {
    /// Rows on the requested page.
    pub items: Vec<T>,
    /// Number of rows across all pages.
    pub total: u64,
}

impl<T> PageSlice<T> {
    /// Wrap a page of rows and the total row count.
    #[must_use]
    pub const fn new(items: Vec<T>, total: u64) -> Self {
        Self { items, total }
    }

    /// Transform each row while keeping the total.
    #[must_use]
    pub fn map<U, F>(self, f: F) -> PageSlice<U>
    where
        F: FnMut(T) -> U,
    {
        PageSlice {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
        }
    }

    /// Transform each row with a fallible function, keeping the total.
    ///
    /// # Errors
    ///
    /// Returns the first error produced by `f`.
    pub fn try_map<U, E, F>(self, f: F) -> Result<PageSlice<U>, E>
    where
        F: FnMut(T) -> Result<U, E>,
    {
        let items = self.items.into_iter().map(f).collect::<Result<Vec<_>, E>>()?;
        Ok(PageSlice {
            items,
            total: self.total,
        })
    }
}

/// Paginated response envelope: `{count, next, previous, results}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Paginated<T> {
    /// Number of rows across all pages.
    pub count: u64,
    /// Absolute link to the following page, if any.
    pub next: Option<String>,
    /// Absolute link to the preceding page, if any.
    pub previous: Option<String>,
    /// Rows on the current page.
    pub results: Vec<T>,
}

impl<T> Paginated<T> {
    /// Build the envelope for `slice`, deriving links from the request `url`.
    ///
    /// Query parameters other than `page` are preserved. The link to the
    /// first page omits the `page` parameter.
    ///
    /// # Errors
    ///
    /// Returns [`PaginationError::PageOutOfRange`] when the request points past
    /// the last page of the slice's result set.
    pub fn build(
        slice: PageSlice<T>,
        request: PageRequest,
        url: &Url,
    ) -> Result<Self, PaginationError> {
        request.ensure_in_range(slice.total)?;
        let current = u64::from(request.page());
        let last_page = request.last_page(slice.total);
        let next = (current < last_page).then(|| page_link(url, current + 1));
        let previous = (current > 1).then(|| page_link(url, current - 1));
        Ok(Self {
            count: slice.total,
            next,
            previous,
            results: slice.items,
        })
    }
}

fn page_link(url: &Url, page: u64) -> String {
    let retained: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| key != PAGE_PARAM)
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();

    let mut link = url.clone();
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
