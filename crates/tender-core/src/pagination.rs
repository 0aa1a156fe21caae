//! Pagination for list operations.
//!
//! Callers hand over raw `limit`/`offset` values as [`PageParams`]; services resolve
//! them into a validated [`Page`] before touching any store.

use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::constants::{DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT};
use crate::error::AppError;

/// Raw pagination parameters as supplied by the caller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageParams {
    #[serde(default)]
    pub limit: Option<i64>,
    #[serde(default)]
    pub offset: Option<i64>,
}

impl PageParams {
    pub fn new(limit: i64, offset: i64) -> Self {
        Self {
            limit: Some(limit),
            offset: Some(offset),
        }
    }
}

/// A validated window over an ordered result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    limit: i64,
    offset: i64,
}

impl Page {
    pub fn limit(&self) -> i64 {
        self.limit
    }

    pub fn offset(&self) -> i64 {
        self.offset
    }

    /// Apply the window to an already ordered list.
    pub fn apply<T>(&self, items: Vec<T>) -> Vec<T> {
        items
            .into_iter()
            .skip(self.offset as usize)
            .take(self.limit as usize)
            .collect()
    }
}

impl Default for Page {
    fn default() -> Self {
        Self {
            limit: DEFAULT_PAGE_LIMIT,
            offset: 0,
        }
    }
}

/// Pagination defaults and bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    default_limit: i64,
    max_limit: i64,
}

impl Pagination {
    pub fn new(default_limit: i64, max_limit: i64) -> Self {
        Self {
            default_limit,
            max_limit,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.default_page_limit(), config.max_page_limit())
    }

    /// Resolve caller parameters into a page, rejecting `limit <= 0`,
    /// `limit > max` and `offset < 0`.
    pub fn resolve(&self, params: PageParams) -> Result<Page, AppError> {
        let limit = params.limit.unwrap_or(self.default_limit);
        let offset = params.offset.unwrap_or(0);

        if limit <= 0 {
            return Err(AppError::InvalidArgument(
                "Invalid limit parameter: must be positive".to_string(),
            ));
        }
        if limit > self.max_limit {
            return Err(AppError::InvalidArgument(format!(
                "Invalid limit parameter: must not exceed {}",
                self.max_limit
            )));
        }
        if offset < 0 {
            return Err(AppError::InvalidArgument(
                "Invalid offset parameter: must not be negative".to_string(),
            ));
        }

        Ok(Page { limit, offset })
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_apply_when_params_missing() {
        let page = Pagination::default()
            .resolve(PageParams::default())
            .unwrap();
        assert_eq!(page.limit(), 5);
        assert_eq!(page.offset(), 0);
        assert_eq!(page, Page::default());
    }

    #[test]
    fn test_rejects_out_of_range_values() {
        let pagination = Pagination::default();
        for params in [
            PageParams::new(0, 0),
            PageParams::new(-3, 0),
            PageParams::new(5, -1),
            PageParams::new(101, 0),
        ] {
            let err = pagination.resolve(params).unwrap_err();
            assert!(matches!(err, AppError::InvalidArgument(_)), "{:?}", params);
        }
    }

    #[test]
    fn test_apply_windows_the_list() {
        let page = Pagination::default()
            .resolve(PageParams::new(2, 1))
            .unwrap();
        assert_eq!(page.apply(vec![1, 2, 3, 4]), vec![2, 3]);
        assert!(page.apply(Vec::<i32>::new()).is_empty());
    }
}
