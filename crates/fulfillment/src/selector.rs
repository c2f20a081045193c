//! Nearest-eligible-warehouse selection.

use std::cmp::Ordering;
use std::sync::Arc;

use domain::{Catalog, Coordinates, OrderItemRequest, Warehouse};

use crate::error::FulfillmentError;
use crate::geo::haversine_distance;
use crate::inventory::InventoryLedger;

/// The chosen warehouse and its distance to the destination.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub warehouse: Warehouse,
    pub distance_km: f64,
}

/// Picks the closest warehouse able to ship a whole order.
///
/// Eligibility is read from the ledger without reserving anything, so the
/// answer is advisory: stock may move before the caller reserves.
#[derive(Debug, Clone)]
pub struct WarehouseSelector {
    catalog: Arc<Catalog>,
    ledger: Arc<InventoryLedger>,
}

impl WarehouseSelector {
    pub fn new(catalog: Arc<Catalog>, ledger: Arc<InventoryLedger>) -> Self {
        Self { catalog, ledger }
    }

    /// Returns the nearest warehouse that can fulfill every item, breaking
    /// distance ties by lowest warehouse id.
    #[tracing::instrument(skip(self, items), fields(item_count = items.len()))]
    pub async fn select(
        &self,
        items: &[OrderItemRequest],
        destination: Coordinates,
    ) -> Result<Selection, FulfillmentError> {
        let mut eligible = Vec::new();
        for warehouse in self.catalog.warehouses() {
            if self.ledger.can_fulfill(warehouse.id, items).await {
                eligible.push(warehouse);
            }
        }
        tracing::debug!(eligible = eligible.len(), "eligible warehouses");

        let (warehouse, distance_km) =
            nearest(eligible, destination).ok_or(FulfillmentError::NoFulfillingWarehouse)?;
        Ok(Selection {
            warehouse: warehouse.clone(),
            distance_km,
        })
    }
}

/// The candidate closest to `destination`; equal distances go to the lower id.
pub fn nearest<'a>(
    candidates: impl IntoIterator<Item = &'a Warehouse>,
    destination: Coordinates,
) -> Option<(&'a Warehouse, f64)> {
    candidates
        .into_iter()
        .map(|w| (w, haversine_distance(w.location, destination)))
        .min_by(|(a, da), (b, db)| match da.total_cmp(db) {
            Ordering::Equal => a.id.cmp(&b.id),
            other => other,
        })
}
