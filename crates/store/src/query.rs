use chrono::{DateTime, Utc};
use common::{CustomerId, OrderStatus, TargetType};
use serde::Serialize;

/// Page size used when the caller does not ask for one.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Largest page size a caller may request.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Pagination and free-text search shared by every list operation.
///
/// The search term is matched case-insensitively as a literal substring;
/// regex metacharacters in user input are escaped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    /// 1-based page number.
    pub page: u32,

    /// Number of records per page.
    pub limit: u32,

    /// Optional search term.
    pub search: Option<String>,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            page: 1,
            limit: DEFAULT_PAGE_SIZE,
            search: None,
        }
    }
}

impl ListQuery {
    /// Creates a query for the first page with the default size.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the page number, treating 0 as 1.
    pub fn page(mut self, page: u32) -> Self {
        self.page = page.max(1);
        self
    }

    /// Sets the page size, clamped to `1..=MAX_PAGE_SIZE`.
    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = limit.clamp(1, MAX_PAGE_SIZE);
        self
    }

    /// Sets the search term. Blank terms are ignored.
    pub fn search(mut self, term: impl Into<String>) -> Self {
        let term = term.into();
        let trimmed = term.trim();
        self.search = (!trimmed.is_empty()).then(|| trimmed.to_string());
        self
    }

    /// Number of records to skip.
    pub fn offset(&self) -> u64 {
        u64::from(self.page.max(1) - 1) * u64::from(self.limit)
    }

    /// Returns the search term escaped for use as a regular expression.
    pub fn search_pattern(&self) -> Option<String> {
        self.search.as_deref().map(regex::escape)
    }
}

/// Filters specific to order listings.
#[derive(Debug, Clone, Default)]
pub struct OrderFilter {
    pub status: Option<OrderStatus>,
    pub customer: Option<CustomerId>,
}

/// Filters specific to discount listings.
#[derive(Debug, Clone, Default)]
pub struct DiscountFilter {
    /// Matches discounts targeting this type or `all`.
    pub target: Option<TargetType>,

    /// Matches on the stored `isActive` flag.
    pub active: Option<bool>,

    /// Matches discounts whose date window contains this instant.
    pub running_at: Option<DateTime<Utc>>,
}

/// One page of a list result.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub limit: u32,
    pub total_pages: u64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: u64, query: &ListQuery) -> Self {
        let limit = u64::from(query.limit.max(1));
        Self {
            items,
            total,
            page: query.page,
            limit: query.limit,
            total_pages: total.div_ceil(limit),
        }
    }

    /// Converts the items while keeping the pagination metadata.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            limit: self.limit,
            total_pages: self.total_pages,
        }
    }
}
