//! Fulfillment error types.

use common::{CustomerId, ProductId};
use domain::DomainError;
use order_store::OrderStoreError;
use thiserror::Error;

use crate::inventory::InventoryError;
use crate::state::{AbortReason, FulfillmentState};

/// Coarse classification of a [`FulfillmentError`], used by callers to pick
/// a response status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    BadRequest,
    PaymentRequired,
    Conflict,
    Internal,
}

/// Errors that can occur while fulfilling an order.
#[derive(Debug, Error)]
pub enum FulfillmentError {
    /// The request is malformed.
    #[error("{0}")]
    InvalidRequest(#[from] DomainError),

    /// The customer does not exist.
    #[error("Customer {0} not found")]
    CustomerNotFound(CustomerId),

    /// One or more requested products do not exist.
    #[error("Products not found: {}", join_ids(.0))]
    ProductNotFound(Vec<ProductId>),

    /// No single warehouse holds every requested item.
    #[error("No warehouse has all requested products in sufficient quantity")]
    NoFulfillingWarehouse,

    /// The selected warehouse ran out between selection and reservation.
    #[error("{0}")]
    InsufficientStock(InventoryError),

    /// The gateway declined the charge.
    #[error("Payment failed: {0}")]
    PaymentDeclined(String),

    /// The charge was approved but the order could not be stored.
    #[error("Order could not be saved after payment {payment_id} was authorized: {source}")]
    PersistenceFailure {
        payment_id: String,
        #[source]
        source: OrderStoreError,
    },

    /// A transition was attempted from the wrong state.
    #[error("Invalid fulfillment state: expected {expected}, actual {actual}")]
    InvalidState {
        expected: String,
        actual: FulfillmentState,
    },
}

impl FulfillmentError {
    /// Returns the error's classification.
    pub fn kind(&self) -> ErrorKind {
        match self {
            FulfillmentError::CustomerNotFound(_) | FulfillmentError::ProductNotFound(_) => {
                ErrorKind::NotFound
            }
            FulfillmentError::InvalidRequest(_) | FulfillmentError::NoFulfillingWarehouse => {
                ErrorKind::BadRequest
            }
            FulfillmentError::PaymentDeclined(_) => ErrorKind::PaymentRequired,
            FulfillmentError::InsufficientStock(_) => ErrorKind::Conflict,
            FulfillmentError::PersistenceFailure { .. } | FulfillmentError::InvalidState { .. } => {
                ErrorKind::Internal
            }
        }
    }

    /// The abort reason recorded when this error ends a started attempt.
    pub fn abort_reason(&self) -> Option<AbortReason> {
        match self {
            FulfillmentError::NoFulfillingWarehouse => Some(AbortReason::NoFulfillingWarehouse),
            FulfillmentError::InsufficientStock(_) => Some(AbortReason::InsufficientStock),
            FulfillmentError::PaymentDeclined(_) => Some(AbortReason::PaymentDeclined),
            FulfillmentError::PersistenceFailure { .. } => Some(AbortReason::PersistenceFailure),
            _ => None,
        }
    }
}

fn join_ids(ids: &[ProductId]) -> String {
    ids.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
