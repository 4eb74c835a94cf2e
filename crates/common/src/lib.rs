//! Shared types for the cleaning services back office.
//!
//! Everything here is plain data: identifiers, money, and the enums that
//! records in the store and rules in the domain both need to agree on.

mod money;
mod status;
mod types;

pub use money::Money;
pub use status::{DiscountType, OrderStatus, ParseEnumError, TargetType, WorkerKind};
pub use types::{CustomerId, DiscountId, OrderId, WorkerId};
