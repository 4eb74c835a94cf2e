//! Order workflow: creation, editing, confirmation staging and assignment.

mod assignment;
mod commands;
mod service;
mod state;

pub use assignment::{Assignment, assign_workers};
pub use commands::{CreateInquiry, CreateOrder, OrderPatch};
pub use service::{OrderService, StagedEdit};
pub use state::{stage_confirmation, transition};

use store::{Money, OrderStatus};
use thiserror::Error;

use crate::error::DomainError;

/// Largest accepted order amount, in minor units.
pub const MAX_ORDER_CENTS: i64 = 10_000_000_000;

/// Errors that can occur during order operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum OrderError {
    /// A phone number is required to identify the customer.
    #[error("Customer phone is required")]
    PhoneRequired,

    #[error("Service type is required")]
    ServiceTypeRequired,

    #[error("Invalid amount: {amount} (must not be negative)")]
    NegativeAmount { amount: Money },

    #[error("Invalid amount: {amount} (exceeds the order limit)")]
    AmountTooLarge { amount: Money },

    /// The requested status change is not part of the lifecycle.
    #[error("Invalid state transition: cannot move from {current} to {target}")]
    InvalidStateTransition {
        current: OrderStatus,
        target: OrderStatus,
    },

    #[error("Cannot confirm an order in {current} state")]
    CannotConfirm { current: OrderStatus },
}

impl From<OrderError> for DomainError {
    fn from(e: OrderError) -> Self {
        DomainError::Order(e)
    }
}
