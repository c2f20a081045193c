//! The record of one order attempt.

use common::{CustomerId, OrderId, WarehouseId};
use serde::Serialize;
use uuid::Uuid;

use crate::error::FulfillmentError;
use crate::events::FulfillmentEvent;
use crate::state::{AbortReason, FulfillmentState};

/// State and history of one order attempt.
///
/// Every change goes through [`record`](Self::record), which rejects events
/// that do not follow from the current state. An attempt holding a
/// reservation cannot be aborted until that reservation has been released
/// (or the release recorded as failed).
#[derive(Debug, Clone, Serialize)]
pub struct FulfillmentTransaction {
    id: Uuid,
    state: FulfillmentState,
    customer_id: CustomerId,
    warehouse_id: Option<WarehouseId>,
    reservation_id: Option<String>,
    /// Set once the reservation is finalized, released, or its release failed.
    reservation_settled: bool,
    payment_id: Option<String>,
    order_id: Option<OrderId>,
    abort_reason: Option<AbortReason>,
    history: Vec<FulfillmentEvent>,
}

impl FulfillmentTransaction {
    /// Opens a transaction in the `Started` state.
    pub fn start(customer_id: CustomerId, item_count: usize) -> Self {
        let id = Uuid::new_v4();
        tracing::info!(transaction_id = %id, %customer_id, item_count, "fulfillment started");
        Self {
            id,
            state: FulfillmentState::Started,
            customer_id,
            warehouse_id: None,
            reservation_id: None,
            reservation_settled: false,
            payment_id: None,
            order_id: None,
            abort_reason: None,
            history: vec![FulfillmentEvent::Started {
                customer_id,
                item_count,
            }],
        }
    }

    /// Applies `event` if it is legal in the current state.
    pub fn record(&mut self, event: FulfillmentEvent) -> Result<(), FulfillmentError> {
        self.check(&event)?;

        match &event {
            FulfillmentEvent::Started { .. } => {}
            FulfillmentEvent::WarehouseSelected { warehouse_id, .. } => {
                self.warehouse_id = Some(*warehouse_id);
            }
            FulfillmentEvent::StockReserved { reservation_id, .. } => {
                self.reservation_id = Some(reservation_id.clone());
            }
            FulfillmentEvent::PaymentAuthorized { payment_id, .. } => {
                self.payment_id = Some(payment_id.clone());
            }
            FulfillmentEvent::Committed { order_id } => {
                self.order_id = Some(*order_id);
                self.reservation_settled = true;
            }
            FulfillmentEvent::ReservationReleased { .. }
            | FulfillmentEvent::CompensationFailed { .. } => {
                self.reservation_settled = true;
            }
            FulfillmentEvent::Aborted { reason, .. } => {
                self.abort_reason = Some(*reason);
            }
        }
        if let Some(next) = event.target_state() {
            self.state = next;
        }

        tracing::info!(
            transaction_id = %self.id,
            event = event.event_type(),
            state = %self.state,
            "fulfillment transition"
        );
        self.history.push(event);
        Ok(())
    }

    fn check(&self, event: &FulfillmentEvent) -> Result<(), FulfillmentError> {
        let invalid = |expected: &str| FulfillmentError::InvalidState {
            expected: expected.to_string(),
            actual: self.state,
        };

        match event {
            FulfillmentEvent::ReservationReleased { reservation_id }
            | FulfillmentEvent::CompensationFailed { reservation_id, .. } => {
                if self.state.is_terminal() || !self.holds_reservation(reservation_id) {
                    return Err(invalid("an unsettled reservation"));
                }
                Ok(())
            }
            FulfillmentEvent::Aborted { .. } if self.reservation_outstanding() => {
                Err(invalid("reservation released before abort"))
            }
            _ => match event.target_state() {
                Some(target) if self.state.can_transition_to(target) => Ok(()),
                Some(target) => Err(invalid(&format!("a state preceding {target}"))),
                None => Ok(()),
            },
        }
    }

    fn holds_reservation(&self, reservation_id: &str) -> bool {
        self.reservation_outstanding() && self.reservation_id.as_deref() == Some(reservation_id)
    }

    fn reservation_outstanding(&self) -> bool {
        self.reservation_id.is_some() && !self.reservation_settled
    }
}

// Query methods
impl FulfillmentTransaction {
    /// Returns the transaction ID.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Returns the current state.
    pub fn state(&self) -> FulfillmentState {
        self.state
    }

    pub fn customer_id(&self) -> CustomerId {
        self.customer_id
    }

    /// Returns the selected warehouse, if any.
    pub fn warehouse_id(&self) -> Option<WarehouseId> {
        self.warehouse_id
    }

    /// Returns the reservation ID, if stock was reserved.
    pub fn reservation_id(&self) -> Option<&str> {
        self.reservation_id.as_deref()
    }

    /// Returns the payment ID, if the charge was approved.
    pub fn payment_id(&self) -> Option<&str> {
        self.payment_id.as_deref()
    }

    /// Returns the committed order's ID.
    pub fn order_id(&self) -> Option<OrderId> {
        self.order_id
    }

    /// Returns why the attempt was aborted.
    pub fn abort_reason(&self) -> Option<AbortReason> {
        self.abort_reason
    }

    /// Returns every recorded event, oldest first.
    pub fn history(&self) -> &[FulfillmentEvent] {
        &self.history
    }

    /// Returns the recorded event type names, oldest first.
    pub fn event_types(&self) -> Vec<&'static str> {
        self.history.iter().map(FulfillmentEvent::event_type).collect()
    }
}
