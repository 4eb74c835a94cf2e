//! Order confirmation notifications.
//!
//! Customers are messaged once when their order is confirmed. The
//! [`NotificationGate`] guarantees at-most-once dispatch per order by
//! claiming the order's `whatsappSent` flag atomically before calling the
//! [`Notifier`], and releasing it again if the call fails.
//!
//! [`ConfirmationCoordinator`] drives the full confirmation path:
//! state change, worker assignment, the gate, then persistence.

pub mod coordinator;
pub mod error;
pub mod gate;
pub mod notifier;
pub mod templates;

pub use coordinator::{ConfirmationCoordinator, ConfirmationOutcome};
pub use error::NotificationError;
pub use gate::{DEFAULT_DISPATCH_TIMEOUT, GateOutcome, NotificationGate};
pub use notifier::{
    HttpNotifier, HttpNotifierConfig, InMemoryNotifier, NotificationResult, Notifier, SentMessage,
};
pub use templates::{MessageVariant, render_confirmation};
