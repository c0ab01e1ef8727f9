// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Offset pagination.

use crate::error::DomainError;

/// A validated page request.
///
/// `page` is one-based. `offset = (page - 1) * limit`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: i64,
    limit: i64,
}

impl PageRequest {
    pub const DEFAULT_PAGE: i64 = 1;
    pub const DEFAULT_LIMIT: i64 = 10;
    pub const MAX_LIMIT: i64 = 100;

    /// Builds a page request, filling in defaults for missing values.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidField` if `page < 1`, `limit < 1`, or
    /// `limit` exceeds [`Self::MAX_LIMIT`].
    pub fn new(page: Option<i64>, limit: Option<i64>) -> Result<Self, DomainError> {
        let page = page.unwrap_or(Self::DEFAULT_PAGE);
        let limit = limit.unwrap_or(Self::DEFAULT_LIMIT);

        if page < 1 {
            return Err(DomainError::invalid_field("page", "must be at least 1"));
        }
        if !(1..=Self::MAX_LIMIT).contains(&limit) {
            return Err(DomainError::invalid_field(
                "limit",
                format!("must be between 1 and {}", Self::MAX_LIMIT),
            ));
        }

        Ok(Self { page, limit })
    }

    #[must_use]
    pub const fn page(&self) -> i64 {
        self.page
    }

    #[must_use]
    pub const fn limit(&self) -> i64 {
        self.limit
    }

    /// Number of rows to skip.
    #[must_use]
    pub const fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.limit)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: Self::DEFAULT_PAGE,
            limit: Self::DEFAULT_LIMIT,
        }
    }
}

/// One page of results plus the size of the full filtered set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub rows: Vec<T>,
    pub total_rows: i64,
}

impl<T> Page<T> {
    /// Maps each row, keeping the total.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            rows: self.rows.into_iter().map(f).collect(),
            total_rows: self.total_rows,
        }
    }
}
