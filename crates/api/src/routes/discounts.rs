//! Discount endpoints: public listing and quotes, admin management.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use domain::{DiscountPatch, DiscountQuote, NewDiscount, is_valid};
use serde::{Deserialize, Deserializer, Serialize};
use store::{Discount, DiscountFilter, DiscountType, Money, Page, Store, TargetType};
use validator::Validate;

use super::{list_query, parse_id};
use crate::auth::AdminUser;
use crate::error::ApiError;
use crate::extract::{ApiQuery, ValidatedJson};
use crate::response::ApiResponse;
use crate::state::AppState;

/// Distinguishes an absent field (`None`) from an explicit `null` (`Some(None)`).
fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

// -- Request types --

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateDiscountRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(length(max = 500))]
    pub description: Option<String>,
    pub discount_type: DiscountType,
    #[validate(range(min = 0.0))]
    pub discount_value: f64,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub is_active: Option<bool>,
    pub target_type: Option<TargetType>,
    #[validate(range(min = 1))]
    pub max_uses: Option<i64>,
}

impl From<CreateDiscountRequest> for NewDiscount {
    fn from(req: CreateDiscountRequest) -> Self {
        NewDiscount {
            name: req.name,
            description: req.description,
            discount_type: req.discount_type,
            discount_value: req.discount_value,
            start_date: req.start_date,
            end_date: req.end_date,
            is_active: req.is_active.unwrap_or(true),
            target_type: req.target_type.unwrap_or_default(),
            max_uses: req.max_uses,
        }
    }
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDiscountRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub description: Option<Option<String>>,
    pub discount_type: Option<DiscountType>,
    #[validate(range(min = 0.0))]
    pub discount_value: Option<f64>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub is_active: Option<bool>,
    pub target_type: Option<TargetType>,
    #[serde(default, deserialize_with = "nullable")]
    pub max_uses: Option<Option<i64>>,
}

impl From<UpdateDiscountRequest> for DiscountPatch {
    fn from(req: UpdateDiscountRequest) -> Self {
        DiscountPatch {
            name: req.name,
            description: req.description,
            discount_type: req.discount_type,
            discount_value: req.discount_value,
            start_date: req.start_date,
            end_date: req.end_date,
            is_active: req.is_active,
            target_type: req.target_type,
            max_uses: req.max_uses,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct QuoteRequest {
    /// Price in minor units.
    #[validate(range(min = 0))]
    pub price: i64,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListDiscountsParams {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub search: Option<String>,
    pub target: Option<TargetType>,
    /// `true` keeps discounts that are switched on and running now.
    pub active: Option<bool>,
}

// -- Response types --

/// A discount with its validity computed at response time.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscountView {
    #[serde(flatten)]
    pub discount: Discount,
    pub is_valid: bool,
}

impl DiscountView {
    fn at(discount: Discount, now: DateTime<Utc>) -> Self {
        let is_valid = is_valid(&discount, now);
        Self { discount, is_valid }
    }
}

// -- Handlers --

/// GET /discounts
#[tracing::instrument(skip(state, params))]
pub async fn list<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    ApiQuery(params): ApiQuery<ListDiscountsParams>,
) -> Result<Json<ApiResponse<Page<DiscountView>>>, ApiError> {
    let now = Utc::now();
    let query = list_query(params.page, params.limit, params.search.as_deref());
    let filter = DiscountFilter {
        target: params.target,
        active: params.active,
        running_at: params.active.filter(|active| *active).map(|_| now),
    };

    let page = state.discounts.list(&query, &filter).await?;
    Ok(Json(ApiResponse::ok(page.map(|d| DiscountView::at(d, now)))))
}

/// GET /discounts/{id}
#[tracing::instrument(skip(state))]
pub async fn get<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<DiscountView>>, ApiError> {
    let discount = state.discounts.require(parse_id(&id, "discount")?).await?;
    Ok(Json(ApiResponse::ok(DiscountView::at(discount, Utc::now()))))
}

/// POST /discounts/{id}/quote: price an amount without redeeming the discount.
#[tracing::instrument(skip(state, req))]
pub async fn quote<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
    ValidatedJson(req): ValidatedJson<QuoteRequest>,
) -> Result<Json<ApiResponse<DiscountQuote>>, ApiError> {
    let quote = state
        .discounts
        .quote(parse_id(&id, "discount")?, Money::from_cents(req.price))
        .await?;
    Ok(Json(ApiResponse::ok(quote)))
}

/// POST /discounts
#[tracing::instrument(skip(state, req))]
pub async fn create<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    _admin: AdminUser,
    ValidatedJson(req): ValidatedJson<CreateDiscountRequest>,
) -> Result<(StatusCode, Json<ApiResponse<DiscountView>>), ApiError> {
    let discount = state.discounts.create(req.into()).await?;
    let view = DiscountView::at(discount, Utc::now());
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(view).with_message("Discount created")),
    ))
}

/// PUT /discounts/{id}
#[tracing::instrument(skip(state, req))]
pub async fn update<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    _admin: AdminUser,
    Path(id): Path<String>,
    ValidatedJson(req): ValidatedJson<UpdateDiscountRequest>,
) -> Result<Json<ApiResponse<DiscountView>>, ApiError> {
    let discount = state
        .discounts
        .update(parse_id(&id, "discount")?, req.into())
        .await?;
    Ok(Json(
        ApiResponse::ok(DiscountView::at(discount, Utc::now())).with_message("Discount updated"),
    ))
}

/// DELETE /discounts/{id}
#[tracing::instrument(skip(state))]
pub async fn delete<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    _admin: AdminUser,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    state.discounts.delete(parse_id(&id, "discount")?).await?;
    Ok(Json(ApiResponse::message("Discount deleted")))
}
