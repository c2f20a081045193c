//! HTTP API server with observability for the order fulfillment service.
//!
//! Provides REST endpoints for placing and reading orders and for inspecting
//! warehouse stock, with structured logging (tracing) and Prometheus metrics.

pub mod config;
pub mod error;
pub mod routes;
pub mod seed;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use domain::{Catalog, DomainError};
use fulfillment::{HashGeocoder, InventoryLedger, MockPaymentGateway, OrderFulfillment};
use metrics_exporter_prometheus::PrometheusHandle;
use order_store::OrderStore;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use routes::orders::AppState;

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<S: OrderStore + 'static>(
    state: Arc<AppState<S>>,
    metrics_handle: PrometheusHandle,
) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check::<S>))
        .route("/orders", post(routes::orders::create::<S>))
        .route("/orders/{id}", get(routes::orders::get::<S>))
        .route(
            "/warehouses/{id}/inventory",
            get(routes::warehouses::inventory::<S>),
        )
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

/// Creates the application state around `store`, with the hash geocoder and
/// the mock payment gateway. With `seed_demo_data` unset the catalog and
/// ledger start empty.
pub fn create_default_state<S: OrderStore + 'static>(
    store: S,
    seed_demo_data: bool,
) -> Result<Arc<AppState<S>>, DomainError> {
    let (catalog, ledger) = if seed_demo_data {
        (seed::demo_catalog()?, seed::demo_inventory())
    } else {
        (Catalog::default(), InventoryLedger::default())
    };

    let fulfillment = OrderFulfillment::new(
        Arc::new(catalog),
        Arc::new(ledger),
        HashGeocoder::new(),
        MockPaymentGateway::new(),
        store,
    );

    Ok(Arc::new(AppState { fulfillment }))
}
