//! Events recorded while fulfilling an order.

use common::{CustomerId, OrderId, WarehouseId};
use domain::Money;
use serde::{Deserialize, Serialize};

use crate::state::{AbortReason, FulfillmentState};

/// Everything that happens to one order attempt, in order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum FulfillmentEvent {
    /// The request passed validation and catalog lookup.
    Started {
        customer_id: CustomerId,
        item_count: usize,
    },

    /// The nearest eligible warehouse was chosen.
    WarehouseSelected {
        warehouse_id: WarehouseId,
        distance_km: f64,
    },

    /// Stock was debited from the selected warehouse.
    StockReserved {
        reservation_id: String,
        warehouse_id: WarehouseId,
    },

    /// The gateway approved the charge.
    PaymentAuthorized { payment_id: String, amount: Money },

    /// The order was persisted.
    Committed { order_id: OrderId },

    /// A reservation was returned to stock after a later step failed.
    ReservationReleased { reservation_id: String },

    /// Releasing a reservation failed; stock may need manual correction.
    CompensationFailed {
        reservation_id: String,
        error: String,
    },

    /// The attempt ended without an order.
    Aborted {
        reason: AbortReason,
        message: String,
    },
}

impl FulfillmentEvent {
    /// Returns the event type name.
    pub fn event_type(&self) -> &'static str {
        match self {
            FulfillmentEvent::Started { .. } => "Started",
            FulfillmentEvent::WarehouseSelected { .. } => "WarehouseSelected",
            FulfillmentEvent::StockReserved { .. } => "StockReserved",
            FulfillmentEvent::PaymentAuthorized { .. } => "PaymentAuthorized",
            FulfillmentEvent::Committed { .. } => "Committed",
            FulfillmentEvent::ReservationReleased { .. } => "ReservationReleased",
            FulfillmentEvent::CompensationFailed { .. } => "CompensationFailed",
            FulfillmentEvent::Aborted { .. } => "Aborted",
        }
    }

    /// The state this event moves the attempt into, or `None` for
    /// compensation bookkeeping that leaves the state unchanged.
    pub fn target_state(&self) -> Option<FulfillmentState> {
        match self {
            FulfillmentEvent::Started { .. } => Some(FulfillmentState::Started),
            FulfillmentEvent::WarehouseSelected { .. } => Some(FulfillmentState::Selected),
            FulfillmentEvent::StockReserved { .. } => Some(FulfillmentState::Reserved),
            FulfillmentEvent::PaymentAuthorized { .. } => Some(FulfillmentState::PaymentAuthorized),
            FulfillmentEvent::Committed { .. } => Some(FulfillmentState::Committed),
            FulfillmentEvent::Aborted { .. } => Some(FulfillmentState::Aborted),
            FulfillmentEvent::ReservationReleased { .. }
            | FulfillmentEvent::CompensationFailed { .. } => None,
        }
    }
}
