//! Order endpoints: public booking and inquiries, staff management.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use chrono::NaiveDate;
use domain::{ContactDetails, CreateInquiry, CreateOrder, MAX_ORDER_CENTS, OrderPatch};
use notification::ConfirmationOutcome;
use serde::Deserialize;
use store::{CustomerId, DiscountId, Money, Order, OrderFilter, OrderStatus, Page, Store, WorkerId};
use validator::Validate;

use super::{list_query, parse_id};
use crate::auth::StaffUser;
use crate::error::ApiError;
use crate::extract::{ApiQuery, ValidatedJson};
use crate::response::ApiResponse;
use crate::state::AppState;

// -- Request types --

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    #[validate(length(min = 1, max = 32))]
    pub phone: String,
    #[validate(length(max = 100))]
    pub name: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(max = 300))]
    pub address: Option<String>,
    #[validate(length(max = 100))]
    pub city: Option<String>,
    #[validate(length(max = 100))]
    pub district: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub service_type: String,
    pub date: Option<NaiveDate>,
    #[validate(length(max = 20))]
    pub time: Option<String>,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
    /// Price in minor units, before any discount.
    #[serde(default)]
    #[validate(range(min = 0, max = MAX_ORDER_CENTS))]
    pub amount: i64,
    pub selected_worker_id: Option<WorkerId>,
    pub selected_housemaid_id: Option<WorkerId>,
    pub discount_id: Option<DiscountId>,
}

impl CreateOrderRequest {
    fn into_command(self) -> CreateOrder {
        let contact = ContactDetails {
            phone: self.phone,
            name: self.name,
            email: self.email,
            address: self.address.clone(),
            city: self.city.clone(),
            district: self.district.clone(),
        };
        CreateOrder {
            contact,
            service_type: self.service_type,
            date: self.date,
            time: self.time,
            address: self.address,
            city: self.city,
            district: self.district,
            notes: self.notes,
            amount: Money::from_cents(self.amount),
            selected_worker_id: self.selected_worker_id,
            selected_housemaid_id: self.selected_housemaid_id,
            discount_id: self.discount_id,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct InquiryRequest {
    #[validate(length(min = 1, max = 32))]
    pub phone: String,
    #[validate(length(max = 100))]
    pub name: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(max = 100))]
    pub service_type: Option<String>,
    #[validate(length(max = 2000))]
    pub message: Option<String>,
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOrderRequest {
    #[validate(length(min = 1, max = 100))]
    pub service_type: Option<String>,
    pub date: Option<NaiveDate>,
    #[validate(length(max = 20))]
    pub time: Option<String>,
    #[validate(length(max = 300))]
    pub address: Option<String>,
    #[validate(length(max = 100))]
    pub city: Option<String>,
    #[validate(length(max = 100))]
    pub district: Option<String>,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
    #[validate(range(min = 0, max = MAX_ORDER_CENTS))]
    pub amount: Option<i64>,
    pub status: Option<OrderStatus>,
    pub selected_worker_id: Option<WorkerId>,
    pub selected_housemaid_id: Option<WorkerId>,
}

impl From<UpdateOrderRequest> for OrderPatch {
    fn from(req: UpdateOrderRequest) -> Self {
        OrderPatch {
            service_type: req.service_type,
            date: req.date,
            time: req.time,
            address: req.address,
            city: req.city,
            district: req.district,
            notes: req.notes,
            amount: req.amount.map(Money::from_cents),
            status: req.status,
            selected_worker_id: req.selected_worker_id,
            selected_housemaid_id: req.selected_housemaid_id,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ListOrdersParams {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub search: Option<String>,
    pub status: Option<OrderStatus>,
    pub customer: Option<CustomerId>,
}

// -- Handlers --

/// POST /orders: place a booking.
#[tracing::instrument(skip(state, req))]
pub async fn create<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    ValidatedJson(req): ValidatedJson<CreateOrderRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Order>>), ApiError> {
    let order = state.orders.create_order(req.into_command()).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(order).with_message("Order created")),
    ))
}

/// POST /orders/inquiry: record a customer inquiry.
#[tracing::instrument(skip(state, req))]
pub async fn create_inquiry<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    ValidatedJson(req): ValidatedJson<InquiryRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Order>>), ApiError> {
    let cmd = CreateInquiry {
        contact: ContactDetails {
            phone: req.phone,
            name: req.name,
            email: req.email,
            ..Default::default()
        },
        service_type: req.service_type,
        notes: req.message,
    };
    let order = state.orders.create_inquiry(cmd).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(order).with_message("Inquiry received")),
    ))
}

/// GET /orders: paginated order list.
#[tracing::instrument(skip(state, params))]
pub async fn list<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    _user: StaffUser,
    ApiQuery(params): ApiQuery<ListOrdersParams>,
) -> Result<Json<ApiResponse<Page<Order>>>, ApiError> {
    let query = list_query(params.page, params.limit, params.search.as_deref());
    let filter = OrderFilter {
        status: params.status,
        customer: params.customer,
    };
    let page = state.orders.list_orders(&query, &filter).await?;
    Ok(Json(ApiResponse::ok(page)))
}

/// GET /orders/{id}
#[tracing::instrument(skip(state))]
pub async fn get<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    _user: StaffUser,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Order>>, ApiError> {
    let order = state.orders.require_order(parse_id(&id, "order")?).await?;
    Ok(Json(ApiResponse::ok(order)))
}

/// PUT /orders/{id}: staff edit; confirms and notifies when the status moves to confirmed.
#[tracing::instrument(skip(state, req))]
pub async fn update<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    _user: StaffUser,
    Path(id): Path<String>,
    ValidatedJson(req): ValidatedJson<UpdateOrderRequest>,
) -> Result<Json<ApiResponse<ConfirmationOutcome>>, ApiError> {
    let outcome = state
        .confirmations
        .edit_order(parse_id(&id, "order")?, req.into())
        .await?;
    Ok(Json(ApiResponse::ok(outcome).with_message("Order updated")))
}

/// POST /orders/{id}/confirm: confirm, assign staff and notify the customer.
#[tracing::instrument(skip(state))]
pub async fn confirm<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    _user: StaffUser,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<ConfirmationOutcome>>, ApiError> {
    let outcome = state
        .confirmations
        .confirm_order(parse_id(&id, "order")?)
        .await?;
    Ok(Json(ApiResponse::ok(outcome).with_message("Order confirmed")))
}

/// DELETE /orders/{id}
#[tracing::instrument(skip(state))]
pub async fn delete<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    _user: StaffUser,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    state.orders.delete_order(parse_id(&id, "order")?).await?;
    Ok(Json(ApiResponse::message("Order deleted")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn create_request_maps_contact_and_location() {
        let req: CreateOrderRequest = serde_json::from_value(json!({
            "phone": "0501234567",
            "name": "Mona",
            "address": "5 Cedar Road",
            "serviceType": "deep-cleaning",
            "amount": 15000
        }))
        .unwrap();
        assert!(req.validate().is_ok());

        let cmd = req.into_command();
        assert_eq!(cmd.contact.phone, "0501234567");
        assert_eq!(cmd.contact.address.as_deref(), Some("5 Cedar Road"));
        assert_eq!(cmd.address.as_deref(), Some("5 Cedar Road"));
        assert_eq!(cmd.amount, Money::from_major(150));
    }

    #[test]
    fn create_request_validation() {
        let req: CreateOrderRequest = serde_json::from_value(json!({
            "phone": "",
            "email": "not-an-email",
            "serviceType": "regular",
            "amount": -1
        }))
        .unwrap();
        let errors = req.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("phone"));
        assert!(fields.contains_key("email"));
        assert!(fields.contains_key("amount"));
    }

    #[test]
    fn amount_above_order_limit_fails_validation() {
        let req: CreateOrderRequest = serde_json::from_value(json!({
            "phone": "0501234567",
            "serviceType": "regular",
            "amount": MAX_ORDER_CENTS + 1
        }))
        .unwrap();
        let errors = req.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("amount"));

        let update: UpdateOrderRequest =
            serde_json::from_value(json!({ "amount": i64::MAX })).unwrap();
        assert!(update.validate().is_err());
    }

    #[test]
    fn update_request_ignores_immutable_fields() {
        let req: UpdateOrderRequest = serde_json::from_value(json!({
            "status": "in-progress",
            "orderNumber": "ORD-0-0",
            "whatsappSent": true
        }))
        .unwrap();
        let patch = OrderPatch::from(req);
        assert_eq!(
            patch,
            OrderPatch {
                status: Some(OrderStatus::InProgress),
                ..Default::default()
            }
        );
    }
}
