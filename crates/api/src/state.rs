//! Shared application state.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::FromRef;
use domain::{DiscountService, OrderService};
use notification::{ConfirmationCoordinator, NotificationGate, Notifier};
use store::Store;

use crate::auth::AuthTokens;

/// Shared application state accessible from all handlers.
pub struct AppState<S: Store> {
    pub orders: OrderService<S>,
    pub confirmations: ConfirmationCoordinator<S>,
    pub discounts: DiscountService<S>,
    pub store: S,
    pub auth: AuthTokens,
}

impl<S: Store> AppState<S> {
    pub fn new(
        store: S,
        notifier: Arc<dyn Notifier>,
        notification_timeout: Duration,
        auth: AuthTokens,
    ) -> Self {
        let orders = OrderService::new(store.clone());
        let gate =
            NotificationGate::new(store.clone(), notifier).with_timeout(notification_timeout);

        Self {
            confirmations: ConfirmationCoordinator::new(orders.clone(), gate),
            discounts: orders.discounts().clone(),
            orders,
            store,
            auth,
        }
    }
}

impl<S: Store> FromRef<Arc<AppState<S>>> for AuthTokens {
    fn from_ref(state: &Arc<AppState<S>>) -> Self {
        state.auth.clone()
    }
}
