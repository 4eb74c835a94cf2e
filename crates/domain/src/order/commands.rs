//! Inputs for order operations.

use chrono::NaiveDate;
use store::{DiscountId, Money, OrderStatus, WorkerId};

use crate::customer::ContactDetails;

/// Places a new order for the customer owning `contact.phone`.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateOrder {
    pub contact: ContactDetails,
    pub service_type: String,
    pub date: Option<NaiveDate>,
    pub time: Option<String>,
    /// Service location. Falls back to the customer's stored address.
    pub address: Option<String>,
    pub city: Option<String>,
    pub district: Option<String>,
    pub notes: Option<String>,
    /// Price before any discount.
    pub amount: Money,
    pub selected_worker_id: Option<WorkerId>,
    pub selected_housemaid_id: Option<WorkerId>,
    pub discount_id: Option<DiscountId>,
}

impl CreateOrder {
    pub fn new(contact: ContactDetails, service_type: impl Into<String>, amount: Money) -> Self {
        Self {
            contact,
            service_type: service_type.into(),
            date: None,
            time: None,
            address: None,
            city: None,
            district: None,
            notes: None,
            amount,
            selected_worker_id: None,
            selected_housemaid_id: None,
            discount_id: None,
        }
    }

    pub fn with_schedule(mut self, date: NaiveDate, time: impl Into<String>) -> Self {
        self.date = Some(date);
        self.time = Some(time.into());
        self
    }

    pub fn with_worker(mut self, worker: WorkerId) -> Self {
        self.selected_worker_id = Some(worker);
        self
    }

    pub fn with_housemaid(mut self, housemaid: WorkerId) -> Self {
        self.selected_housemaid_id = Some(housemaid);
        self
    }

    pub fn with_discount(mut self, discount: DiscountId) -> Self {
        self.discount_id = Some(discount);
        self
    }
}

/// Records a customer inquiry as an order with `is_inquiry` set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CreateInquiry {
    pub contact: ContactDetails,
    pub service_type: Option<String>,
    pub notes: Option<String>,
}

/// Staff edit of an order. `None` leaves a field untouched.
///
/// The order number and notification flag are not editable.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderPatch {
    pub service_type: Option<String>,
    pub date: Option<NaiveDate>,
    pub time: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub district: Option<String>,
    pub notes: Option<String>,
    pub amount: Option<Money>,
    pub status: Option<OrderStatus>,
    pub selected_worker_id: Option<WorkerId>,
    pub selected_housemaid_id: Option<WorkerId>,
}
