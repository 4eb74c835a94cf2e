//! Persisted document shapes.
//!
//! Field names serialize in camelCase, which is also the JSON shape the
//! HTTP layer returns.

use chrono::{DateTime, NaiveDate, Utc};
use common::{
    CustomerId, DiscountId, DiscountType, Money, OrderId, OrderStatus, TargetType, WorkerId,
    WorkerKind,
};
use serde::{Deserialize, Serialize};

/// A customer, keyed by phone number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: CustomerId,
    pub phone: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub district: Option<String>,
    pub total_orders: i64,
    pub last_order_date: Option<DateTime<Utc>>,
    pub total_spent: Money,
    pub rating: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Customer {
    /// Creates a customer with no contact details and zeroed counters.
    pub fn new(phone: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: CustomerId::new(),
            phone: phone.into(),
            name: None,
            email: None,
            address: None,
            city: None,
            district: None,
            total_orders: 0,
            last_order_date: None,
            total_spent: Money::zero(),
            rating: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Discount applied to an order at creation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppliedDiscount {
    pub discount_id: DiscountId,
    pub original_amount: Money,
    pub discount_amount: Money,
}

/// A booking for cleaning services.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    /// Human-readable number such as `ORD-1700000000000-42`. Never rewritten.
    pub order_number: String,
    pub customer: CustomerId,
    pub service_type: String,
    pub date: Option<NaiveDate>,
    pub time: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub district: Option<String>,
    pub notes: Option<String>,
    /// Amount payable, after any discount.
    pub amount: Money,
    pub discount: Option<AppliedDiscount>,
    pub status: OrderStatus,
    pub selected_worker_id: Option<WorkerId>,
    pub selected_housemaid_id: Option<WorkerId>,
    pub assigned_workers: Vec<WorkerId>,
    pub assigned_housemaids: Vec<WorkerId>,
    /// Confirmation notification flag. Only the notification gate writes it.
    pub whatsapp_sent: bool,
    pub is_inquiry: bool,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A promotional discount.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Discount {
    pub id: DiscountId,
    pub name: String,
    pub description: Option<String>,
    pub discount_type: DiscountType,
    /// Percentage for [`DiscountType::Percentage`], major currency units for
    /// [`DiscountType::Fixed`].
    pub discount_value: f64,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub is_active: bool,
    pub target_type: TargetType,
    pub max_uses: Option<i64>,
    pub current_uses: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A cleaning worker or housemaid that can be assigned to orders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Worker {
    pub id: WorkerId,
    pub name: String,
    pub phone: Option<String>,
    pub kind: WorkerKind,
    pub is_available: bool,
    pub created_at: DateTime<Utc>,
}

impl Worker {
    pub fn new(name: impl Into<String>, kind: WorkerKind, now: DateTime<Utc>) -> Self {
        Self {
            id: WorkerId::new(),
            name: name.into(),
            phone: None,
            kind,
            is_available: true,
            created_at: now,
        }
    }

    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }
}
