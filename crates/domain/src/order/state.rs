//! Order lifecycle transitions.
//!
//! ```text
//! Pending ──► Confirmed ──► InProgress ──► Done
//!    │            │             │
//!    └────────────┴─────────────┴──► Cancelled
//! ```

use chrono::{DateTime, Utc};
use store::{Order, OrderStatus};

use super::OrderError;

/// Moves `order` to `target`.
///
/// Returns `Ok(false)` when the order is already in `target`. Entering
/// `Done` stamps `completed_at`. Nothing is persisted here.
pub fn transition(
    order: &mut Order,
    target: OrderStatus,
    now: DateTime<Utc>,
) -> Result<bool, OrderError> {
    if order.status == target {
        return Ok(false);
    }
    if !order.status.can_transition_to(target) {
        return Err(OrderError::InvalidStateTransition {
            current: order.status,
            target,
        });
    }

    order.status = target;
    if target == OrderStatus::Done {
        order.completed_at = Some(now);
    }
    order.updated_at = now;
    Ok(true)
}

/// Stages an explicit confirm action.
///
/// Accepted from `Pending` and `Confirmed` so that a confirmation whose
/// notification failed can be repeated. Returns true when the status changed.
pub fn stage_confirmation(order: &mut Order, now: DateTime<Utc>) -> Result<bool, OrderError> {
    if !order.status.can_confirm() {
        return Err(OrderError::CannotConfirm {
            current: order.status,
        });
    }
    let changed = order.status != OrderStatus::Confirmed;
    order.status = OrderStatus::Confirmed;
    order.updated_at = now;
    Ok(changed)
}
