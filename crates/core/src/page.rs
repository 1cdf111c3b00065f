//! Pagination view model shared by search and listing endpoints

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Requested page window (1-based)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub page_size: u32,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PageRequest {
    /// Parse `page` / `pageSize` query values, applying defaults and a minimum of 1
    pub fn parse(page: Option<&str>, page_size: Option<&str>) -> Result<Self, CoreError> {
        Ok(Self {
            page: parse_int("page", page, DEFAULT_PAGE)?,
            page_size: parse_int("pageSize", page_size, DEFAULT_PAGE_SIZE)?,
        })
    }

    fn offset(&self) -> usize {
        (self.page as usize - 1).saturating_mul(self.page_size as usize)
    }
}

fn parse_int(name: &str, raw: Option<&str>, default: u32) -> Result<u32, CoreError> {
    let Some(raw) = raw else {
        return Ok(default);
    };
    let value: i64 = raw
        .trim()
        .parse()
        .map_err(|_| CoreError::validation(format!("Parameter {name} must be an integer")))?;
    if value < 1 {
        return Err(CoreError::validation(format!(
            "Parameter {name} must be >= 1"
        )));
    }
    u32::try_from(value)
        .map_err(|_| CoreError::validation(format!("Parameter {name} is too large")))
}

/// One page of results plus the unpaginated total
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub page_size: u32,
    pub total: u64,
}

impl<T> Page<T> {
    /// Cut the requested window out of the full result set
    pub fn slice(all: Vec<T>, request: PageRequest) -> Self {
        let total = all.len() as u64;
        let items = all
            .into_iter()
            .skip(request.offset())
            .take(request.page_size as usize)
            .collect();
        Self {
            items,
            page: request.page,
            page_size: request.page_size,
            total,
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            page_size: self.page_size,
            total: self.total,
        }
    }

    /// 1-based `(from, to)` positions shown as "Mostrando from - to de total"
    pub fn display_range(&self) -> Option<(u64, u64)> {
        // upstream pages are 1-based; anything else has no meaningful range
        if self.items.is_empty() || self.total == 0 || self.page == 0 {
            return None;
        }
        let size = u64::from(self.page_size);
        let from = (u64::from(self.page) - 1).saturating_mul(size).saturating_add(1);
        let to = u64::from(self.page).saturating_mul(size).min(self.total);
        if from > to {
            return None;
        }
        Some((from, to))
    }
}

/// Unpaginated catalog listing
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Listing<T> {
    pub items: Vec<T>,
    pub count: usize,
}

impl<T> From<Vec<T>> for Listing<T> {
    fn from(items: Vec<T>) -> Self {
        let count = items.len();
        Self { items, count }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_defaults() {
        let req = PageRequest::parse(None, None).unwrap();
        assert_eq!(req, PageRequest { page: 1, page_size: 10 });
    }

    #[test]
    fn test_parse_rejects_bad_values() {
        let err = PageRequest::parse(Some("abc"), None).unwrap_err();
        assert_eq!(err.to_string(), "Parameter page must be an integer");

        let err = PageRequest::parse(None, Some("0")).unwrap_err();
        assert_eq!(err.to_string(), "Parameter pageSize must be >= 1");
    }

    #[test]
    fn test_slice_windows() {
        let all: Vec<u32> = (1..=25).collect();
        let page = Page::slice(all.clone(), PageRequest { page: 3, page_size: 10 });
        assert_eq!(page.items, vec![21, 22, 23, 24, 25]);
        assert_eq!(page.total, 25);
        assert_eq!(page.display_range(), Some((21, 25)));

        let beyond = Page::slice(all, PageRequest { page: 9, page_size: 10 });
        assert!(beyond.items.is_empty());
        assert_eq!(beyond.total, 25);
        assert_eq!(beyond.display_range(), None);
    }

    #[test]
    fn test_display_range_ignores_page_zero() {
        let page = Page {
            items: vec!["a"],
            page: 0,
            page_size: 10,
            total: 1,
        };
        assert_eq!(page.display_range(), None);

        let page = Page {
            items: vec!["a"],
            page: 1,
            page_size: 0,
            total: 1,
        };
        assert_eq!(page.display_range(), None);
    }

    #[test]
    fn test_listing_count() {
        let listing = Listing::from(vec!["a", "b"]);
        assert_eq!(listing.count, 2);
    }
}
