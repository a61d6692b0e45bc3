//! Offset pagination shared by the pet catalogue and the admin application listing.

use serde::Serialize;

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_LIMIT: u32 = 10;

/// 1-indexed page window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    limit: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PageRequestError {
    #[error("page must be a positive integer")]
    InvalidPage,
    #[error("limit must be a positive integer")]
    InvalidLimit,
}

impl PageRequest {
    pub fn new(page: u32, limit: u32) -> Result<Self, PageRequestError> {
        if page == 0 {
            return Err(PageRequestError::InvalidPage);
        }
        if limit == 0 {
            return Err(PageRequestError::InvalidLimit);
        }
        Ok(Self { page, limit })
    }

    /// Parse raw query-string values, falling back to the defaults when absent.
    pub fn from_raw(page: Option<&str>, limit: Option<&str>) -> Result<Self, PageRequestError> {
        let page = match page.map(str::trim).filter(|raw| !raw.is_empty()) {
            Some(raw) => raw.parse().map_err(|_| PageRequestError::InvalidPage)?,
            None => DEFAULT_PAGE,
        };
        let limit = match limit.map(str::trim).filter(|raw| !raw.is_empty()) {
            Some(raw) => raw.parse().map_err(|_| PageRequestError::InvalidLimit)?,
            None => DEFAULT_LIMIT,
        };
        Self::new(page, limit)
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn skip(&self) -> usize {
        (self.page as usize - 1).saturating_mul(self.limit as usize)
    }

    /// Cut the requested window out of an already ordered result set.
    pub fn slice<T>(&self, items: Vec<T>) -> Page<T> {
        let total = items.len() as u64;
        let data = items
            .into_iter()
            .skip(self.skip())
            .take(self.limit as usize)
            .collect();
        Page::new(data, total, *self)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub data: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub limit: u32,
    pub total_pages: u64,
}

impl<T> Page<T> {
    pub fn new(data: Vec<T>, total: u64, request: PageRequest) -> Self {
        Self {
            data,
            total,
            page: request.page,
            limit: request.limit,
            total_pages: total.div_ceil(u64::from(request.limit)),
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            data: self.data.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            limit: self.limit,
            total_pages: self.total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_page_of_five_skips_first_five() {
        let request = PageRequest::new(2, 5).expect("valid request");
        let page = request.slice((1..=12).collect::<Vec<_>>());
        assert_eq!(page.data, vec![6, 7, 8, 9, 10]);
        assert_eq!(page.total, 12);
        assert_eq!(page.total_pages, 3);
    }

    #[test]
    fn page_past_the_end_is_empty_but_keeps_totals() {
        let request = PageRequest::new(4, 5).expect("valid request");
        let page = request.slice((1..=12).collect::<Vec<_>>());
        assert!(page.data.is_empty());
        assert_eq!(page.total, 12);
        assert_eq!(page.page, 4);
    }

    #[test]
    fn empty_result_has_zero_pages() {
        let page = PageRequest::default().slice(Vec::<u8>::new());
        assert_eq!(page.total_pages, 0);
        assert_eq!(page.limit, DEFAULT_LIMIT);
    }

    #[test]
    fn raw_values_default_and_validate() {
        assert_eq!(
            PageRequest::from_raw(None, Some("")).expect("defaults"),
            PageRequest::default()
        );
        assert_eq!(
            PageRequest::from_raw(Some("0"), None),
            Err(PageRequestError::InvalidPage)
        );
        assert_eq!(
            PageRequest::from_raw(Some("2"), Some("ten")),
            Err(PageRequestError::InvalidLimit)
        );
    }
}
