//! Prometheus exposition of the order workflow metrics.

use axum::extract::State;
use axum::http::StatusCode;
use axum::http::header::CONTENT_TYPE;
use axum::response::IntoResponse;
use metrics::{Unit, describe_counter, describe_histogram};
use metrics_exporter_prometheus::PrometheusHandle;

/// Registers help text for every metric the workflow records.
///
/// Call once after the recorder is installed.
pub fn describe() {
    describe_counter!(
        "orders_created_total",
        "Orders and inquiries placed, labelled by kind"
    );
    describe_counter!(
        "orders_confirmed_total",
        "Orders moved into the confirmed state"
    );
    describe_counter!(
        "notifications_total",
        "Confirmation notifications, labelled by gate outcome"
    );
    describe_counter!(
        "discount_redemptions_total",
        "Discount uses recorded against new orders"
    );
    describe_histogram!(
        "notification_dispatch_seconds",
        Unit::Seconds,
        "Time spent waiting on the notification transport"
    );
}

/// GET /metrics
pub async fn get(State(handle): State<PrometheusHandle>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(CONTENT_TYPE, "text/plain; version=0.0.4; charset=utf-8")],
        handle.render(),
    )
}
