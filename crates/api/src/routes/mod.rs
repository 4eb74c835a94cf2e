//! HTTP route handlers.

pub mod customers;
pub mod discounts;
pub mod health;
pub mod metrics;
pub mod orders;
pub mod workers;

use std::str::FromStr;

use store::ListQuery;

use crate::error::ApiError;

/// Parses a path identifier, reporting a 400 on malformed input.
pub(crate) fn parse_id<T: FromStr>(raw: &str, entity: &str) -> Result<T, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::BadRequest(format!("Invalid {entity} id: {raw}")))
}

/// Builds a list query from the common `page`, `limit` and `search` parameters.
pub(crate) fn list_query(
    page: Option<u32>,
    limit: Option<u32>,
    search: Option<&str>,
) -> ListQuery {
    let mut query = ListQuery::new();
    if let Some(page) = page {
        query = query.page(page);
    }
    if let Some(limit) = limit {
        query = query.limit(limit);
    }
    if let Some(search) = search {
        query = query.search(search);
    }
    query
}
