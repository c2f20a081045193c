//! Fulfillment state machine.

use serde::{Deserialize, Serialize};

/// The state of an order attempt.
///
/// State transitions:
/// ```text
/// Started ──► Selected ──► Reserved ──► PaymentAuthorized ──► Committed
///    │           │            │                │
///    └───────────┴────────────┴────────────────┴──► Aborted
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum FulfillmentState {
    /// Request validated; customer and products exist.
    #[default]
    Started,

    /// A warehouse holding every item was chosen.
    Selected,

    /// The chosen warehouse's stock was debited.
    Reserved,

    /// The charge was approved.
    PaymentAuthorized,

    /// The order was persisted (terminal state).
    Committed,

    /// The attempt failed and any reservation was released (terminal state).
    Aborted,
}

impl FulfillmentState {
    /// Returns the state that follows this one on the success path.
    pub fn next(&self) -> Option<FulfillmentState> {
        match self {
            FulfillmentState::Started => Some(FulfillmentState::Selected),
            FulfillmentState::Selected => Some(FulfillmentState::Reserved),
            FulfillmentState::Reserved => Some(FulfillmentState::PaymentAuthorized),
            FulfillmentState::PaymentAuthorized => Some(FulfillmentState::Committed),
            FulfillmentState::Committed | FulfillmentState::Aborted => None,
        }
    }

    /// Returns true if moving to `target` is a legal transition.
    pub fn can_transition_to(&self, target: FulfillmentState) -> bool {
        match target {
            FulfillmentState::Aborted => !self.is_terminal(),
            _ => self.next() == Some(target),
        }
    }

    /// Returns true if this is a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, FulfillmentState::Committed | FulfillmentState::Aborted)
    }

    /// Returns the state name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            FulfillmentState::Started => "Started",
            FulfillmentState::Selected => "Selected",
            FulfillmentState::Reserved => "Reserved",
            FulfillmentState::PaymentAuthorized => "PaymentAuthorized",
            FulfillmentState::Committed => "Committed",
            FulfillmentState::Aborted => "Aborted",
        }
    }
}

impl std::fmt::Display for FulfillmentState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Why an attempt ended in [`FulfillmentState::Aborted`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AbortReason {
    NoFulfillingWarehouse,
    InsufficientStock,
    PaymentDeclined,
    PersistenceFailure,
}

impl AbortReason {
    /// Label used in logs and metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            AbortReason::NoFulfillingWarehouse => "no_fulfilling_warehouse",
            AbortReason::InsufficientStock => "insufficient_stock",
            AbortReason::PaymentDeclined => "payment_declined",
            AbortReason::PersistenceFailure => "persistence_failure",
        }
    }
}

impl std::fmt::Display for AbortReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
