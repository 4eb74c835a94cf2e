//! At-most-once confirmation dispatch.

use std::sync::Arc;
use std::time::{Duration, Instant};

use domain::Assignment;
use serde::Serialize;
use store::{CustomerRepository, Order, OrderRepository};

use crate::error::NotificationError;
use crate::notifier::Notifier;
use crate::templates::{MessageVariant, render_confirmation};

/// Default bound on a single notifier call.
pub const DEFAULT_DISPATCH_TIMEOUT: Duration = Duration::from_secs(10);

/// What the gate did for one confirmation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "error", rename_all = "kebab-case")]
pub enum GateOutcome {
    /// The flag was already set, or another caller claimed it first.
    AlreadySent,
    /// The message was delivered; the flag stays set.
    Sent,
    /// Dispatch was attempted or aborted; the flag is clear again.
    Failed(String),
}

impl GateOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            GateOutcome::AlreadySent => "already_sent",
            GateOutcome::Sent => "sent",
            GateOutcome::Failed(_) => "failed",
        }
    }
}

/// Decides whether a confirmation message is sent and records success.
///
/// The order's `whatsappSent` flag is claimed with a compare-and-set before
/// dispatch, so concurrent confirmations send at most one message. A failed
/// or timed out dispatch releases the claim so a later confirm can retry.
/// Errors never escape: they are logged and reported as [`GateOutcome::Failed`].
pub struct NotificationGate<R> {
    repo: R,
    notifier: Arc<dyn Notifier>,
    timeout: Duration,
}

impl<R: Clone> Clone for NotificationGate<R> {
    fn clone(&self) -> Self {
        Self {
            repo: self.repo.clone(),
            notifier: Arc::clone(&self.notifier),
            timeout: self.timeout,
        }
    }
}

impl<R> NotificationGate<R>
where
    R: OrderRepository + CustomerRepository,
{
    pub fn new(repo: R, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            repo,
            notifier,
            timeout: DEFAULT_DISPATCH_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Runs the gate for an order entering `Confirmed`.
    #[tracing::instrument(skip_all, fields(order_id = %order.id))]
    pub async fn notify_confirmed(&self, order: &Order, assignment: &Assignment) -> GateOutcome {
        let outcome = self.dispatch_once(order, assignment).await;
        metrics::counter!("notifications_total", "outcome" => outcome.label()).increment(1);
        outcome
    }

    async fn dispatch_once(&self, order: &Order, assignment: &Assignment) -> GateOutcome {
        if order.whatsapp_sent {
            tracing::debug!("confirmation already sent");
            return GateOutcome::AlreadySent;
        }

        let customer = match self.repo.get_customer(order.customer).await {
            Ok(Some(customer)) => customer,
            Ok(None) => {
                tracing::warn!(customer_id = %order.customer, "order customer not found");
                return GateOutcome::Failed("customer not found".to_string());
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to load customer for notification");
                return GateOutcome::Failed(e.to_string());
            }
        };

        match self.repo.claim_notification(order.id).await {
            Ok(true) => {}
            Ok(false) => {
                tracing::debug!("notification claimed by a concurrent confirmation");
                return GateOutcome::AlreadySent;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to claim notification flag");
                return GateOutcome::Failed(e.to_string());
            }
        }

        let variant = MessageVariant::for_assignment(assignment);
        let body = render_confirmation(order, &customer, assignment);

        let started = Instant::now();
        let send = self.notifier.send(&customer.phone, &body);
        let result = tokio::time::timeout(self.timeout, send).await;
        metrics::histogram!("notification_dispatch_seconds")
            .record(started.elapsed().as_secs_f64());

        let reason = match result {
            Ok(Ok(response)) if response.success => {
                tracing::info!(
                    order_number = %order.order_number,
                    variant = variant.as_str(),
                    "confirmation sent"
                );
                return GateOutcome::Sent;
            }
            Ok(Ok(response)) => response
                .error
                .unwrap_or_else(|| "notification service reported failure".to_string()),
            Ok(Err(e)) => e.to_string(),
            Err(_) => NotificationError::Timeout(self.timeout).to_string(),
        };

        tracing::warn!(
            order_number = %order.order_number,
            reason = %reason,
            "confirmation notification failed"
        );
        if let Err(e) = self.repo.release_notification(order.id).await {
            tracing::error!(error = %e, "failed to release notification flag");
        }
        GateOutcome::Failed(reason)
    }
}
