//! Prometheus metrics endpoint and metric descriptions.

use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::IntoResponse;
use metrics::Unit;
use metrics_exporter_prometheus::PrometheusHandle;

const PROMETHEUS_CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

/// Registers help text for the metrics the service records. Call once after
/// the recorder is installed.
pub fn describe() {
    metrics::describe_counter!("orders_created_total", "Orders confirmed and persisted");
    metrics::describe_counter!(
        "order_fulfillment_aborted_total",
        "Order attempts that ended without an order, by reason"
    );
    metrics::describe_histogram!(
        "order_fulfillment_duration_seconds",
        Unit::Seconds,
        "Time from transaction start to commit or abort"
    );
    metrics::describe_counter!(
        "inventory_reservations_total",
        "Successful all-or-nothing stock reservations"
    );
    metrics::describe_counter!(
        "inventory_reservation_conflicts_total",
        "Reservations rejected for insufficient stock"
    );
    metrics::describe_counter!(
        "inventory_releases_total",
        "Reservations returned to stock after a later step failed"
    );
    metrics::describe_counter!("order_store_commits_total", "Orders written to PostgreSQL");
}

/// GET /metrics: renders every recorded metric in the Prometheus text format.
pub async fn get(State(handle): State<PrometheusHandle>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, PROMETHEUS_CONTENT_TYPE)],
        handle.render(),
    )
}
