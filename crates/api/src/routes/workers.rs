//! Worker roster endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use chrono::Utc;
use serde::Deserialize;
use store::{Page, Store, Worker, WorkerKind, WorkerRepository};
use validator::Validate;

use super::list_query;
use crate::auth::{AdminUser, StaffUser};
use crate::error::ApiError;
use crate::extract::{ApiQuery, ValidatedJson};
use crate::response::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateWorkerRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(length(min = 1, max = 32))]
    pub phone: Option<String>,
    pub kind: WorkerKind,
    pub is_available: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListWorkersParams {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub search: Option<String>,
    pub kind: Option<WorkerKind>,
}

/// GET /workers
#[tracing::instrument(skip(state, params))]
pub async fn list<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    _user: StaffUser,
    ApiQuery(params): ApiQuery<ListWorkersParams>,
) -> Result<Json<ApiResponse<Page<Worker>>>, ApiError> {
    let query = list_query(params.page, params.limit, params.search.as_deref());
    let page = state.store.list_workers(&query, params.kind).await?;
    Ok(Json(ApiResponse::ok(page)))
}

/// POST /workers
#[tracing::instrument(skip(state, req))]
pub async fn create<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    _admin: AdminUser,
    ValidatedJson(req): ValidatedJson<CreateWorkerRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Worker>>), ApiError> {
    let mut worker = Worker::new(req.name.trim(), req.kind, Utc::now());
    worker.phone = req.phone;
    worker.is_available = req.is_available.unwrap_or(true);

    state.store.insert_worker(&worker).await?;
    tracing::info!(worker_id = %worker.id, kind = %worker.kind, "worker added");
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(worker).with_message("Worker added")),
    ))
}
