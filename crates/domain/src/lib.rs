//! Order workflow for the cleaning services back office.
//!
//! This crate provides:
//! - Customer resolution keyed by phone number
//! - Human-readable sequence numbers backed by atomic counters
//! - Discount eligibility and pricing
//! - The order state machine, worker assignment and `OrderService`

pub mod customer;
pub mod discount;
pub mod error;
pub mod order;
pub mod sequence;

pub use customer::{ContactDetails, CustomerResolver};
pub use discount::{
    DiscountError, DiscountPatch, DiscountQuote, DiscountService, NewDiscount, apply_discount,
    is_valid,
};
pub use error::DomainError;
pub use order::{
    Assignment, CreateInquiry, CreateOrder, MAX_ORDER_CENTS, OrderError, OrderPatch, OrderService,
    StagedEdit,
};
pub use sequence::{SequenceGenerator, SequencePrefix};
