//! Discount eligibility, pricing and administration.

mod eligibility;
mod service;

pub use eligibility::{DiscountQuote, apply_discount, is_valid, validate_discount};
pub use service::{DiscountPatch, DiscountService, NewDiscount};

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::error::DomainError;

/// Rule violations for discount definitions and quotes.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DiscountError {
    #[error("Discount name is required")]
    NameRequired,

    #[error("End date {end} must be after start date {start}")]
    InvalidDateRange {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },

    #[error("Percentage must be between 0 and 100, got {value}")]
    PercentageOutOfRange { value: f64 },

    #[error("Discount value must be a non-negative number, got {value}")]
    InvalidValue { value: f64 },

    #[error("Maximum uses must be positive, got {value}")]
    InvalidMaxUses { value: i64 },

    #[error("Price cannot be negative")]
    NegativePrice,
}

impl From<DiscountError> for DomainError {
    fn from(err: DiscountError) -> Self {
        DomainError::Discount(err)
    }
}
