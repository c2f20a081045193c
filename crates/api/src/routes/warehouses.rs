//! Warehouse stock endpoint.

use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::PathRejection;
use axum::extract::{Path, State};
use common::{ProductId, WarehouseId};
use order_store::OrderStore;
use serde::Serialize;

use crate::error::ApiError;
use crate::routes::orders::AppState;

#[derive(Debug, Serialize)]
pub struct InventoryResponse {
    pub warehouse_id: WarehouseId,
    pub name: String,
    pub items: Vec<StockLevel>,
}

#[derive(Debug, Serialize)]
pub struct StockLevel {
    pub product_id: ProductId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_name: Option<String>,
    pub quantity: u32,
}

/// GET /warehouses/{id}/inventory: current stock levels, by product id.
#[tracing::instrument(skip_all)]
pub async fn inventory<S: OrderStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<InventoryResponse>, ApiError> {
    let Path(id) = path.map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
    let warehouse_id = WarehouseId::new(id);
    let not_found = || ApiError::NotFound(format!("Warehouse {id} not found"));

    let catalog = state.fulfillment.catalog();
    let warehouse = catalog.warehouse(warehouse_id).ok_or_else(not_found)?;
    let stock = state
        .fulfillment
        .ledger()
        .stock(warehouse_id)
        .await
        .ok_or_else(not_found)?;

    let items = stock
        .into_iter()
        .map(|(product_id, quantity)| StockLevel {
            product_id,
            product_name: catalog.product(product_id).map(|p| p.name.clone()),
            quantity,
        })
        .collect();

    Ok(Json(InventoryResponse {
        warehouse_id,
        name: warehouse.name.clone(),
        items,
    }))
}
