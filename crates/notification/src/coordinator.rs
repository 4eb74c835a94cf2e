//! Confirmation flow: state change, assignment, notification, persistence.

use domain::{DomainError, OrderPatch, OrderService, StagedEdit};
use serde::Serialize;
use store::{Order, OrderId, Store};

use crate::gate::{GateOutcome, NotificationGate};

/// Result of an edit or confirm request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmationOutcome {
    pub order: Order,
    /// Present when the request moved the order into `Confirmed`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notification: Option<GateOutcome>,
}

/// Runs order edits and confirmations through the notification gate.
///
/// On confirmation the staged order is assigned, the gate runs, and only
/// then is the order persisted. Notification failures never fail the
/// request; they show up in [`ConfirmationOutcome::notification`].
#[derive(Clone)]
pub struct ConfirmationCoordinator<S: Store> {
    orders: OrderService<S>,
    gate: NotificationGate<S>,
}

impl<S: Store> ConfirmationCoordinator<S> {
    pub fn new(orders: OrderService<S>, gate: NotificationGate<S>) -> Self {
        Self { orders, gate }
    }

    pub fn orders(&self) -> &OrderService<S> {
        &self.orders
    }

    /// Applies a staff edit, confirming the order if the edit asks for it.
    #[tracing::instrument(skip(self, patch))]
    pub async fn edit_order(
        &self,
        id: OrderId,
        patch: OrderPatch,
    ) -> Result<ConfirmationOutcome, DomainError> {
        let staged = self.orders.stage_edit(id, patch).await?;
        if staged.confirming {
            return self.confirm_staged(staged).await;
        }

        let order = self.orders.commit(&staged.order).await?;
        Ok(ConfirmationOutcome {
            order,
            notification: None,
        })
    }

    /// Explicit confirm. Repeating it retries a failed notification.
    #[tracing::instrument(skip(self))]
    pub async fn confirm_order(&self, id: OrderId) -> Result<ConfirmationOutcome, DomainError> {
        let staged = self.orders.stage_confirm(id).await?;
        self.confirm_staged(staged).await
    }

    async fn confirm_staged(
        &self,
        StagedEdit {
            mut order,
            confirming,
        }: StagedEdit,
    ) -> Result<ConfirmationOutcome, DomainError> {
        let assignment = self.orders.assign(&mut order).await?;
        let notification = self.gate.notify_confirmed(&order, &assignment).await;
        let order = self.orders.commit(&order).await?;

        if confirming {
            metrics::counter!("orders_confirmed_total").increment(1);
        }
        tracing::info!(
            order_number = %order.order_number,
            notification = notification.label(),
            repeat = !confirming,
            "order confirmed"
        );
        Ok(ConfirmationOutcome {
            order,
            notification: Some(notification),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use domain::{ContactDetails, CreateOrder, OrderError};
    use metrics_exporter_prometheus::PrometheusBuilder;
    use store::{InMemoryStore, Money, OrderStatus};

    use crate::notifier::InMemoryNotifier;

    fn coordinator() -> (ConfirmationCoordinator<InMemoryStore>, InMemoryNotifier) {
        let store = InMemoryStore::new();
        let notifier = InMemoryNotifier::new();
        let gate = NotificationGate::new(store.clone(), Arc::new(notifier.clone()));
        (
            ConfirmationCoordinator::new(OrderService::new(store), gate),
            notifier,
        )
    }

    async fn place(coordinator: &ConfirmationCoordinator<InMemoryStore>) -> Order {
        coordinator
            .orders()
            .create_order(CreateOrder::new(
                ContactDetails::new("0501234567"),
                "regular",
                Money::from_major(90),
            ))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn plain_edit_does_not_notify() {
        let (coordinator, notifier) = coordinator();
        let order = place(&coordinator).await;

        let outcome = coordinator
            .edit_order(
                order.id,
                OrderPatch {
                    notes: Some("Gate code 1234".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert!(outcome.notification.is_none());
        assert_eq!(outcome.order.notes.as_deref(), Some("Gate code 1234"));
        assert_eq!(notifier.attempt_count(), 0);
    }

    #[tokio::test]
    async fn confirm_sends_and_persists() {
        let (coordinator, notifier) = coordinator();
        let order = place(&coordinator).await;

        let outcome = coordinator.confirm_order(order.id).await.unwrap();

        assert_eq!(outcome.notification, Some(GateOutcome::Sent));
        assert_eq!(outcome.order.status, OrderStatus::Confirmed);
        assert!(outcome.order.whatsapp_sent);
        assert_eq!(notifier.sent_count(), 1);
    }

    #[test]
    fn repeat_confirm_counts_one_confirmation() {
        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();

        metrics::with_local_recorder(&recorder, || {
            runtime.block_on(async {
                let (coordinator, notifier) = coordinator();
                let order = place(&coordinator).await;

                let first = coordinator.confirm_order(order.id).await.unwrap();
                let second = coordinator.confirm_order(order.id).await.unwrap();
                assert_eq!(first.notification, Some(GateOutcome::Sent));
                assert_eq!(second.notification, Some(GateOutcome::AlreadySent));
                assert_eq!(notifier.sent_count(), 1);
            })
        });

        let rendered = handle.render();
        assert!(
            rendered.lines().any(|line| line == "orders_confirmed_total 1"),
            "{rendered}"
        );
    }

    #[tokio::test]
    async fn confirm_from_terminal_state_fails() {
        let (coordinator, _) = coordinator();
        let order = place(&coordinator).await;
        coordinator
            .edit_order(
                order.id,
                OrderPatch {
                    status: Some(OrderStatus::Cancelled),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let err = coordinator.confirm_order(order.id).await.unwrap_err();
        assert!(matches!(
            err,
            DomainError::Order(OrderError::CannotConfirm { .. })
        ));
    }
}
