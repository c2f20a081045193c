//! Order fulfillment: warehouse selection and the reservation/payment/commit
//! transaction.
//!
//! An order attempt moves through these steps:
//! 1. Select the nearest warehouse holding every requested item
//! 2. Reserve that warehouse's stock
//! 3. Authorize payment
//! 4. Persist the confirmed order
//!
//! If a step fails after stock was reserved, the reservation is released
//! before the failure is reported.

pub mod coordinator;
pub mod error;
pub mod events;
pub mod geo;
pub mod inventory;
pub mod payment;
pub mod selector;
pub mod state;
pub mod transaction;

pub use coordinator::{Fulfillment, OrderFulfillment};
pub use error::{ErrorKind, FulfillmentError};
pub use events::FulfillmentEvent;
pub use geo::{Geocoder, HashGeocoder, StaticGeocoder, haversine_distance};
pub use inventory::{InventoryError, InventoryLedger, InventoryLedgerBuilder, ReservationHandle};
pub use payment::{MockPaymentGateway, PaymentGateway, PaymentResult};
pub use selector::{Selection, WarehouseSelector};
pub use state::{AbortReason, FulfillmentState};
pub use transaction::FulfillmentTransaction;
