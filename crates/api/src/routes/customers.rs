//! Customer endpoints for staff.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use serde::Deserialize;
use store::{Customer, CustomerId, CustomerRepository, Page, Store};

use super::{list_query, parse_id};
use crate::auth::StaffUser;
use crate::error::ApiError;
use crate::extract::ApiQuery;
use crate::response::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ListCustomersParams {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    /// Matches phone, name or email.
    pub search: Option<String>,
}

/// GET /customers
#[tracing::instrument(skip(state, params))]
pub async fn list<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    _user: StaffUser,
    ApiQuery(params): ApiQuery<ListCustomersParams>,
) -> Result<Json<ApiResponse<Page<Customer>>>, ApiError> {
    let query = list_query(params.page, params.limit, params.search.as_deref());
    let page = state.store.list_customers(&query).await?;
    Ok(Json(ApiResponse::ok(page)))
}

/// GET /customers/{id}
#[tracing::instrument(skip(state))]
pub async fn get<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    _user: StaffUser,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Customer>>, ApiError> {
    let id: CustomerId = parse_id(&id, "customer")?;
    let customer = state
        .store
        .get_customer(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Customer not found: {id}")))?;
    Ok(Json(ApiResponse::ok(customer)))
}
