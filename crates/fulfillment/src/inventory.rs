//! Inventory ledger: per-warehouse stock with all-or-nothing reservations.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};

use common::{ProductId, WarehouseId};
use domain::OrderItemRequest;
use thiserror::Error;
use tokio::sync::Mutex;

/// Errors returned by the inventory ledger.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InventoryError {
    /// The warehouse is not known to the ledger.
    #[error("Unknown warehouse: {0}")]
    UnknownWarehouse(WarehouseId),

    /// The warehouse does not hold enough of a product.
    #[error(
        "Warehouse {warehouse_id} has {available} of product {product_id}, {requested} requested"
    )]
    InsufficientStock {
        warehouse_id: WarehouseId,
        product_id: ProductId,
        requested: u64,
        available: u32,
    },
}

/// Stock debited for one order attempt.
///
/// A handle is not cloneable: it is either passed to
/// [`InventoryLedger::release`] exactly once, or finalized when the order
/// commits.
#[derive(Debug, PartialEq, Eq)]
#[must_use = "a reservation must be released or finalized"]
pub struct ReservationHandle {
    id: String,
    warehouse_id: WarehouseId,
    items: Vec<(ProductId, u32)>,
}

impl ReservationHandle {
    /// The reservation ID.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The warehouse whose stock was debited.
    pub fn warehouse_id(&self) -> WarehouseId {
        self.warehouse_id
    }

    /// Reserved quantities per product.
    pub fn items(&self) -> &[(ProductId, u32)] {
        &self.items
    }

    /// Makes the debit permanent. Returns the reservation ID.
    pub fn finalize(self) -> String {
        self.id
    }
}

type StockTable = HashMap<ProductId, u32>;

/// Tracks available quantity per (warehouse, product).
///
/// Each warehouse's table sits behind its own lock. `reserve` and `release`
/// hold that lock for the whole check-and-update, so concurrent reservations
/// against one warehouse behave as if applied one after another. Orders for
/// different warehouses never contend.
///
/// Quantities are unsigned and only decremented after every item of a
/// reservation has been checked, so stock can never go negative.
#[derive(Debug, Default)]
pub struct InventoryLedger {
    warehouses: HashMap<WarehouseId, Mutex<StockTable>>,
    last_reservation: AtomicU64,
}

impl InventoryLedger {
    /// Starts building a ledger with initial stock levels.
    pub fn builder() -> InventoryLedgerBuilder {
        InventoryLedgerBuilder::default()
    }

    /// Returns true iff the warehouse holds at least the requested quantity
    /// of every item. Never changes stock.
    ///
    /// Unknown warehouses and unstocked products count as zero. Repeated
    /// lines for the same product are summed.
    pub async fn can_fulfill(&self, warehouse_id: WarehouseId, items: &[OrderItemRequest]) -> bool {
        let Some(table) = self.warehouses.get(&warehouse_id) else {
            return false;
        };
        let requested = requested_totals(items);
        let stock = table.lock().await;
        check_stock(warehouse_id, &stock, &requested).is_ok()
    }

    /// Atomically debits every item from the warehouse, or nothing.
    ///
    /// Stock is re-checked under the warehouse lock, so a reservation can fail
    /// even if `can_fulfill` returned true earlier.
    #[tracing::instrument(skip(self, items))]
    pub async fn reserve(
        &self,
        warehouse_id: WarehouseId,
        items: &[OrderItemRequest],
    ) -> Result<ReservationHandle, InventoryError> {
        let table = self
            .warehouses
            .get(&warehouse_id)
            .ok_or(InventoryError::UnknownWarehouse(warehouse_id))?;
        let requested = requested_totals(items);

        let mut stock = table.lock().await;
        let reserved = match check_stock(warehouse_id, &stock, &requested) {
            Ok(reserved) => reserved,
            Err(shortfall) => {
                metrics::counter!("inventory_reservation_conflicts_total").increment(1);
                tracing::debug!(error = %shortfall, "reservation rejected");
                return Err(shortfall);
            }
        };
        for (product_id, quantity) in &reserved {
            if let Some(available) = stock.get_mut(product_id) {
                *available -= quantity;
            }
        }
        drop(stock);

        let n = self.last_reservation.fetch_add(1, Ordering::Relaxed) + 1;
        let handle = ReservationHandle {
            id: format!("RES-{n:04}"),
            warehouse_id,
            items: reserved,
        };
        metrics::counter!("inventory_reservations_total").increment(1);
        tracing::debug!(reservation_id = %handle.id, "stock reserved");
        Ok(handle)
    }

    /// Returns a reservation's quantities to the warehouse.
    #[tracing::instrument(skip(self, handle), fields(reservation_id = %handle.id))]
    pub async fn release(&self, handle: ReservationHandle) -> Result<(), InventoryError> {
        let table = self
            .warehouses
            .get(&handle.warehouse_id)
            .ok_or(InventoryError::UnknownWarehouse(handle.warehouse_id))?;

        let mut stock = table.lock().await;
        for (product_id, quantity) in &handle.items {
            let available = stock.entry(*product_id).or_insert(0);
            *available = available.saturating_add(*quantity);
        }
        drop(stock);

        metrics::counter!("inventory_releases_total").increment(1);
        tracing::debug!("reservation released");
        Ok(())
    }

    /// Current quantity of one product. `None` if the warehouse is unknown;
    /// unstocked products report zero.
    pub async fn available(&self, warehouse_id: WarehouseId, product_id: ProductId) -> Option<u32> {
        let table = self.warehouses.get(&warehouse_id)?;
        let stock = table.lock().await;
        Some(stock.get(&product_id).copied().unwrap_or(0))
    }

    /// Snapshot of a warehouse's stock ordered by product id.
    pub async fn stock(&self, warehouse_id: WarehouseId) -> Option<BTreeMap<ProductId, u32>> {
        let table = self.warehouses.get(&warehouse_id)?;
        let stock = table.lock().await;
        Some(stock.iter().map(|(p, q)| (*p, *q)).collect())
    }

    /// Whether the ledger tracks this warehouse.
    pub fn contains_warehouse(&self, warehouse_id: WarehouseId) -> bool {
        self.warehouses.contains_key(&warehouse_id)
    }
}

/// Builder for [`InventoryLedger`]. Stock can only be set before the ledger
/// is built; afterwards it changes exclusively through reservations.
#[derive(Debug, Default)]
pub struct InventoryLedgerBuilder {
    warehouses: HashMap<WarehouseId, StockTable>,
}

impl InventoryLedgerBuilder {
    /// Registers a warehouse with no stock.
    pub fn warehouse(mut self, warehouse_id: WarehouseId) -> Self {
        self.warehouses.entry(warehouse_id).or_default();
        self
    }

    /// Sets the quantity of a product at a warehouse, registering the
    /// warehouse if needed.
    pub fn stock(mut self, warehouse_id: WarehouseId, product_id: ProductId, quantity: u32) -> Self {
        self.warehouses
            .entry(warehouse_id)
            .or_default()
            .insert(product_id, quantity);
        self
    }

    pub fn build(self) -> InventoryLedger {
        InventoryLedger {
            warehouses: self
                .warehouses
                .into_iter()
                .map(|(id, table)| (id, Mutex::new(table)))
                .collect(),
            last_reservation: AtomicU64::new(0),
        }
    }
}

/// Sums quantities per product, keeping first-seen order.
///
/// Totals are `u64` so repeated lines cannot wrap past what any stock level
/// can hold.
fn requested_totals(items: &[OrderItemRequest]) -> Vec<(ProductId, u64)> {
    let mut positions: HashMap<ProductId, usize> = HashMap::with_capacity(items.len());
    let mut totals: Vec<(ProductId, u64)> = Vec::with_capacity(items.len());
    for item in items {
        let quantity = u64::from(item.quantity);
        match positions.get(&item.product_id) {
            Some(&i) => totals[i].1 = totals[i].1.saturating_add(quantity),
            None => {
                positions.insert(item.product_id, totals.len());
                totals.push((item.product_id, quantity));
            }
        }
    }
    totals
}

/// The quantities to debit, or the first product the warehouse is short of.
fn check_stock(
    warehouse_id: WarehouseId,
    stock: &StockTable,
    requested: &[(ProductId, u64)],
) -> Result<Vec<(ProductId, u32)>, InventoryError> {
    requested
        .iter()
        .map(|&(product_id, quantity)| {
            let available = stock.get(&product_id).copied().unwrap_or(0);
            match u32::try_from(quantity) {
                Ok(quantity) if quantity <= available => Ok((product_id, quantity)),
                _ => Err(InventoryError::InsufficientStock {
                    warehouse_id,
                    product_id,
                    requested: quantity,
                    available,
                }),
            }
        })
        .collect()
}
