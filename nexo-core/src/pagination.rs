use nexo_order::OrderStatus;
use serde::{Deserialize, Serialize};

use crate::OrderError;

/// 1-indexed page window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    limit: u32,
}

impl PageRequest {
    pub const DEFAULT_PAGE: u32 = 1;
    pub const DEFAULT_LIMIT: u32 = 10;

    pub fn new(page: u32, limit: u32) -> Result<Self, OrderError> {
        if page == 0 {
            return Err(OrderError::InvalidRequest("page must be a positive number".to_string()));
        }
        if limit == 0 {
            return Err(OrderError::InvalidRequest("limit must be a positive number".to_string()));
        }
        // The offset must fit the store's signed 64-bit OFFSET.
        if (i64::from(page) - 1).checked_mul(i64::from(limit)).is_none() {
            return Err(OrderError::InvalidRequest(format!(
                "page {} with limit {} is out of range",
                page, limit
            )));
        }
        Ok(Self { page, limit })
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn skip(&self) -> i64 {
        (i64::from(self.page) - 1).saturating_mul(i64::from(self.limit))
    }

    pub fn take(&self) -> i64 {
        i64::from(self.limit)
    }

    /// ceil(total / limit); zero rows means zero pages.
    pub fn last_page(&self, total: i64) -> i64 {
        let limit = i64::from(self.limit);
        (total + limit - 1) / limit
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

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OrderFilter {
    pub status: Option<OrderStatus>,
    pub page: PageRequest,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    pub total: i64,
    pub page: u32,
    pub last_page: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub meta: PageMeta,
}
