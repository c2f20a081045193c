//! Coordinator driving an order request through selection, reservation,
//! payment and persistence.

use std::sync::Arc;
use std::time::Instant;

use common::OrderId;
use domain::{
    Catalog, Coordinates, DomainError, Money, NewOrder, Order, OrderItemRequest, OrderLine, OrderRequest,
    PaymentCard, WarehouseSummary,
};
use order_store::OrderStore;

use crate::error::FulfillmentError;
use crate::events::FulfillmentEvent;
use crate::geo::Geocoder;
use crate::inventory::{InventoryLedger, ReservationHandle};
use crate::payment::{PaymentGateway, PaymentResult};
use crate::selector::{Selection, WarehouseSelector};
use crate::transaction::FulfillmentTransaction;

/// A finished order attempt: its transaction record and what it produced.
#[derive(Debug)]
pub struct Fulfillment {
    pub transaction: FulfillmentTransaction,
    pub outcome: Result<Order, FulfillmentError>,
}

/// Turns order requests into confirmed orders.
///
/// Each attempt runs the steps in a fixed order: select a warehouse, reserve
/// its stock, authorize payment, persist the order. A failure after the
/// reservation releases it before the failure is returned, so a failed
/// attempt never leaves stock debited.
///
/// The coordinator holds no per-request state and can be shared across tasks
/// behind an `Arc`.
pub struct OrderFulfillment<G, P, S>
where
    G: Geocoder,
    P: PaymentGateway,
    S: OrderStore,
{
    catalog: Arc<Catalog>,
    ledger: Arc<InventoryLedger>,
    selector: WarehouseSelector,
    geocoder: G,
    payment: P,
    store: S,
}

impl<G, P, S> OrderFulfillment<G, P, S>
where
    G: Geocoder,
    P: PaymentGateway,
    S: OrderStore,
{
    /// Creates a new coordinator.
    pub fn new(
        catalog: Arc<Catalog>,
        ledger: Arc<InventoryLedger>,
        geocoder: G,
        payment: P,
        store: S,
    ) -> Self {
        let selector = WarehouseSelector::new(Arc::clone(&catalog), Arc::clone(&ledger));
        Self {
            catalog,
            ledger,
            selector,
            geocoder,
            payment,
            store,
        }
    }

    /// Fulfills `request`, returning the confirmed order.
    pub async fn create_order(&self, request: &OrderRequest) -> Result<Order, FulfillmentError> {
        self.execute(request).await?.outcome
    }

    /// Fulfills `request`, returning the full transaction record.
    ///
    /// Returns `Err` only when the request is rejected before a transaction
    /// starts: it is malformed, or the customer or a product is unknown.
    /// Every later failure is reported through [`Fulfillment::outcome`].
    #[tracing::instrument(
        skip(self, request),
        fields(customer_id = %request.customer_id, item_count = request.items.len())
    )]
    pub async fn execute(&self, request: &OrderRequest) -> Result<Fulfillment, FulfillmentError> {
        request.validate()?;
        if self.catalog.customer(request.customer_id).is_none() {
            return Err(FulfillmentError::CustomerNotFound(request.customer_id));
        }
        let missing = self.catalog.missing_products(request.product_ids());
        if !missing.is_empty() {
            return Err(FulfillmentError::ProductNotFound(missing));
        }
        let lines = self.price_lines(&request.items)?;
        let total = OrderLine::checked_total(&lines).ok_or(DomainError::AmountOverflow)?;

        let started = Instant::now();
        let mut transaction = FulfillmentTransaction::start(request.customer_id, lines.len());
        let outcome = self.run(&mut transaction, request, lines, total).await;

        let duration = started.elapsed().as_secs_f64();
        metrics::histogram!("order_fulfillment_duration_seconds").record(duration);
        match &outcome {
            Ok(order) => {
                metrics::counter!("orders_created_total").increment(1);
                tracing::info!(
                    order_id = %order.id,
                    warehouse_id = %order.warehouse.id,
                    total = %order.total_amount,
                    duration,
                    "order confirmed"
                );
            }
            Err(err) => {
                let reason = err.abort_reason().map_or("internal", |r| r.as_str());
                metrics::counter!("order_fulfillment_aborted_total", "reason" => reason)
                    .increment(1);
            }
        }

        Ok(Fulfillment {
            transaction,
            outcome,
        })
    }

    /// Looks up a confirmed order.
    pub async fn get_order(&self, order_id: OrderId) -> order_store::Result<Option<Order>> {
        self.store.get(order_id).await
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn ledger(&self) -> &InventoryLedger {
        &self.ledger
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    async fn run(
        &self,
        tx: &mut FulfillmentTransaction,
        request: &OrderRequest,
        lines: Vec<OrderLine>,
        total: Money,
    ) -> Result<Order, FulfillmentError> {
        let destination = self.geocoder.geocode(&request.shipping_address);

        let selection = match self.select_warehouse(tx, &request.items, destination).await {
            Ok(selection) => selection,
            Err(err) => return Err(self.abort(tx, err)),
        };

        let handle = match self.reserve_stock(tx, &selection, &request.items).await {
            Ok(handle) => handle,
            Err(err) => return Err(self.abort(tx, err)),
        };

        let payment_id = match self
            .authorize_payment(tx, &request.payment_card, total)
            .await
        {
            Ok(payment_id) => payment_id,
            Err(err) => {
                self.release_reservation(tx, handle).await;
                return Err(self.abort(tx, err));
            }
        };

        let new_order = NewOrder {
            customer_id: request.customer_id,
            warehouse: WarehouseSummary::from(&selection.warehouse),
            shipping_address: request.shipping_address.formatted(),
            shipping_location: destination,
            payment_id,
            lines,
        };
        match self.persist(tx, new_order).await {
            Ok(order) => {
                let reservation_id = handle.finalize();
                tracing::debug!(%reservation_id, order_id = %order.id, "reservation finalized");
                Ok(order)
            }
            Err(err) => {
                self.release_reservation(tx, handle).await;
                Err(self.abort(tx, err))
            }
        }
    }

    async fn select_warehouse(
        &self,
        tx: &mut FulfillmentTransaction,
        items: &[OrderItemRequest],
        destination: Coordinates,
    ) -> Result<Selection, FulfillmentError> {
        let selection = self.selector.select(items, destination).await?;
        tx.record(FulfillmentEvent::WarehouseSelected {
            warehouse_id: selection.warehouse.id,
            distance_km: selection.distance_km,
        })?;
        Ok(selection)
    }

    /// Reserves against the selected warehouse only. Losing a race for the
    /// last units aborts the attempt rather than trying the next warehouse.
    async fn reserve_stock(
        &self,
        tx: &mut FulfillmentTransaction,
        selection: &Selection,
        items: &[OrderItemRequest],
    ) -> Result<ReservationHandle, FulfillmentError> {
        let handle = self
            .ledger
            .reserve(selection.warehouse.id, items)
            .await
            .map_err(FulfillmentError::InsufficientStock)?;

        let recorded = tx.record(FulfillmentEvent::StockReserved {
            reservation_id: handle.id().to_string(),
            warehouse_id: handle.warehouse_id(),
        });
        if let Err(err) = recorded {
            self.release_reservation(tx, handle).await;
            return Err(err);
        }
        Ok(handle)
    }

    async fn authorize_payment(
        &self,
        tx: &mut FulfillmentTransaction,
        card: &PaymentCard,
        amount: Money,
    ) -> Result<String, FulfillmentError> {
        match self.payment.authorize(card, amount).await {
            PaymentResult::Approved { payment_id } => {
                tx.record(FulfillmentEvent::PaymentAuthorized {
                    payment_id: payment_id.clone(),
                    amount,
                })?;
                Ok(payment_id)
            }
            PaymentResult::Declined { reason } => Err(FulfillmentError::PaymentDeclined(reason)),
        }
    }

    async fn persist(
        &self,
        tx: &mut FulfillmentTransaction,
        new_order: NewOrder,
    ) -> Result<Order, FulfillmentError> {
        let payment_id = new_order.payment_id.clone();
        match self.store.commit(new_order).await {
            Ok(order) => {
                // The order is saved; it must not take the rollback path.
                if let Err(err) = tx.record(FulfillmentEvent::Committed { order_id: order.id }) {
                    tracing::error!(order_id = %order.id, error = %err, "failed to record commit");
                }
                Ok(order)
            }
            Err(source) => {
                // The gateway has no reversal, so the charge stands.
                tracing::error!(
                    %payment_id,
                    error = %source,
                    "order not saved after payment was authorized; manual reconciliation required"
                );
                Err(FulfillmentError::PersistenceFailure { payment_id, source })
            }
        }
    }

    async fn release_reservation(&self, tx: &mut FulfillmentTransaction, handle: ReservationHandle) {
        let reservation_id = handle.id().to_string();
        let event = match self.ledger.release(handle).await {
            Ok(()) => FulfillmentEvent::ReservationReleased { reservation_id },
            Err(err) => {
                tracing::error!(%reservation_id, error = %err, "failed to release reservation");
                FulfillmentEvent::CompensationFailed {
                    reservation_id,
                    error: err.to_string(),
                }
            }
        };
        if let Err(err) = tx.record(event) {
            tracing::error!(error = %err, "failed to record reservation release");
        }
    }

    fn abort(&self, tx: &mut FulfillmentTransaction, err: FulfillmentError) -> FulfillmentError {
        if let Some(reason) = err.abort_reason() {
            let recorded = tx.record(FulfillmentEvent::Aborted {
                reason,
                message: err.to_string(),
            });
            if let Err(record_err) = recorded {
                tracing::error!(error = %record_err, "failed to record abort");
            }
        }
        tracing::warn!(transaction_id = %tx.id(), error = %err, "fulfillment aborted");
        err
    }

    fn price_lines(&self, items: &[OrderItemRequest]) -> Result<Vec<OrderLine>, FulfillmentError> {
        items
            .iter()
            .map(|item| {
                self.catalog
                    .product(item.product_id)
                    .map(|product| OrderLine::from_product(product, item.quantity))
                    .ok_or_else(|| FulfillmentError::ProductNotFound(vec![item.product_id]))
            })
            .collect()
    }
}
