//! Notification error types.

use std::time::Duration;

use thiserror::Error;

/// Errors raised by notifier implementations.
///
/// The gate never propagates these; they end up as the reason of a
/// failed [`GateOutcome`](crate::GateOutcome).
#[derive(Debug, Error)]
pub enum NotificationError {
    /// The notifier is misconfigured.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The request could not be delivered to the notification service.
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The notification service answered with a non-success status.
    #[error("Notification service returned HTTP {status}: {body}")]
    Rejected { status: u16, body: String },

    /// The notification service did not answer in time.
    #[error("Notification timed out after {0:?}")]
    Timeout(Duration),

    /// Injected failure from the in-memory notifier.
    #[error("Notification failed: {0}")]
    Failed(String),
}

/// Convenience type alias for notifier results.
pub type Result<T> = std::result::Result<T, NotificationError>;
