//! Order placement and lookup endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use common::{CustomerId, OrderId, ProductId, WarehouseId};
use domain::{Order, OrderLine, OrderRequest, OrderStatus, WarehouseSummary};
use fulfillment::{HashGeocoder, MockPaymentGateway, OrderFulfillment};
use order_store::OrderStore;
use serde::Serialize;

use crate::error::ApiError;

/// The fulfillment coordinator as wired into the HTTP server.
pub type AppFulfillment<S> = OrderFulfillment<HashGeocoder, MockPaymentGateway, S>;

/// Shared application state accessible from all handlers.
pub struct AppState<S: OrderStore> {
    pub fulfillment: AppFulfillment<S>,
}

// -- Response types --

#[derive(Debug, Serialize)]
pub struct OrderResponse {
    pub id: OrderId,
    pub customer_id: CustomerId,
    pub warehouse: WarehouseResponse,
    pub shipping_address: String,
    pub total_amount: f64,
    pub payment_id: String,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub items: Vec<OrderItemResponse>,
}

#[derive(Debug, Serialize)]
pub struct WarehouseResponse {
    pub id: WarehouseId,
    pub name: String,
    pub address: String,
}

#[derive(Debug, Serialize)]
pub struct OrderItemResponse {
    pub product_id: ProductId,
    pub product_name: String,
    pub quantity: u32,
    pub unit_price: f64,
}

impl From<Order> for OrderResponse {
    fn from(order: Order) -> Self {
        Self {
            id: order.id,
            customer_id: order.customer_id,
            warehouse: order.warehouse.into(),
            shipping_address: order.shipping_address,
            total_amount: order.total_amount.as_decimal(),
            payment_id: order.payment_id,
            status: order.status,
            created_at: order.created_at,
            items: order.items.into_iter().map(Into::into).collect(),
        }
    }
}

impl From<WarehouseSummary> for WarehouseResponse {
    fn from(warehouse: WarehouseSummary) -> Self {
        Self {
            id: warehouse.id,
            name: warehouse.name,
            address: warehouse.address,
        }
    }
}

impl From<OrderLine> for OrderItemResponse {
    fn from(line: OrderLine) -> Self {
        Self {
            product_id: line.product_id,
            product_name: line.product_name,
            quantity: line.quantity,
            unit_price: line.unit_price.as_decimal(),
        }
    }
}

// -- Handlers --

/// POST /orders: fulfill an order from the nearest warehouse holding every
/// item and return the confirmed order.
#[tracing::instrument(skip_all)]
pub async fn create<S: OrderStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    payload: Result<Json<OrderRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<OrderResponse>), ApiError> {
    let Json(request) = payload.map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;

    let order = state.fulfillment.create_order(&request).await?;

    Ok((StatusCode::CREATED, Json(order.into())))
}

/// GET /orders/{id}: load a confirmed order.
#[tracing::instrument(skip_all)]
pub async fn get<S: OrderStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<OrderResponse>, ApiError> {
    let Path(id) = path.map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;

    let order = state
        .fulfillment
        .get_order(OrderId::new(id))
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Order {id} not found")))?;

    Ok(Json(order.into()))
}
