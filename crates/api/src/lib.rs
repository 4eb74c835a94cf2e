//! HTTP API server for the cleaning services back office.
//!
//! Provides public booking endpoints, staff order management with
//! confirmation notifications, and discount administration, with
//! structured logging (tracing) and Prometheus metrics.

pub mod auth;
pub mod config;
pub mod error;
pub mod extract;
pub mod response;
pub mod routes;
pub mod state;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use metrics_exporter_prometheus::PrometheusHandle;
use notification::Notifier;
use store::Store;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use auth::AuthTokens;
use config::Config;
use state::AppState;

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<S: Store>(state: Arc<AppState<S>>, metrics_handle: PrometheusHandle) -> Router {
    use routes::{customers, discounts, orders, workers};

    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .route("/orders", post(orders::create::<S>).get(orders::list::<S>))
        .route("/orders/inquiry", post(orders::create_inquiry::<S>))
        .route(
            "/orders/{id}",
            get(orders::get::<S>)
                .put(orders::update::<S>)
                .delete(orders::delete::<S>),
        )
        .route("/orders/{id}/confirm", post(orders::confirm::<S>))
        .route("/customers", get(customers::list::<S>))
        .route("/customers/{id}", get(customers::get::<S>))
        .route(
            "/discounts",
            get(discounts::list::<S>).post(discounts::create::<S>),
        )
        .route(
            "/discounts/{id}",
            get(discounts::get::<S>)
                .put(discounts::update::<S>)
                .delete(discounts::delete::<S>),
        )
        .route("/discounts/{id}/quote", post(discounts::quote::<S>))
        .route("/workers", get(workers::list::<S>).post(workers::create::<S>))
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Creates the application state from configuration.
pub fn create_default_state<S: Store>(
    store: S,
    notifier: Arc<dyn Notifier>,
    config: &Config,
) -> Arc<AppState<S>> {
    let auth = AuthTokens::new(config.staff_token.clone(), config.admin_token.clone());
    if auth.staff.is_none() && auth.admin.is_none() {
        tracing::warn!("no STAFF_TOKEN or ADMIN_TOKEN configured, back-office routes are locked");
    }

    Arc::new(AppState::new(
        store,
        notifier,
        config.notification_timeout,
        auth,
    ))
}
