//! Payment gateway trait and mock implementation.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use domain::{Money, PaymentCard};

/// Outcome of a payment authorization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentResult {
    /// The charge was authorized.
    Approved {
        /// Opaque token identifying the charge.
        payment_id: String,
    },
    /// The charge was refused.
    Declined { reason: String },
}

impl PaymentResult {
    pub fn is_approved(&self) -> bool {
        matches!(self, PaymentResult::Approved { .. })
    }

    /// The payment ID for approved charges.
    pub fn payment_id(&self) -> Option<&str> {
        match self {
            PaymentResult::Approved { payment_id } => Some(payment_id),
            PaymentResult::Declined { .. } => None,
        }
    }
}

/// Trait for payment authorization.
///
/// The gateway offers no reversal operation; once a charge is approved it
/// stays approved.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Authorizes a charge of `amount` against `card`.
    async fn authorize(&self, card: &PaymentCard, amount: Money) -> PaymentResult;
}

/// Deterministic stand-in for a real payment processor.
///
/// - Card numbers shorter than 13 characters are declined as invalid
/// - Non-positive amounts are declined
/// - Card numbers starting with `0` are declined by the issuer
/// - Everything else is approved with a `pay_` token
///
/// Clones share their counters.
#[derive(Debug, Clone, Default)]
pub struct MockPaymentGateway {
    approved: Arc<AtomicUsize>,
    declined: Arc<AtomicUsize>,
}

impl MockPaymentGateway {
    /// Creates a new mock gateway.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of approved authorizations.
    pub fn approved_count(&self) -> usize {
        self.approved.load(Ordering::SeqCst)
    }

    /// Returns the number of declined authorizations.
    pub fn declined_count(&self) -> usize {
        self.declined.load(Ordering::SeqCst)
    }

    fn decide(card_number: &str, amount: Money) -> PaymentResult {
        let decline = |reason: &str| PaymentResult::Declined {
            reason: reason.to_string(),
        };

        if card_number.len() < 13 {
            return decline("Invalid card number");
        }
        if !amount.is_positive() {
            return decline("Invalid amount");
        }
        if card_number.starts_with('0') {
            return decline("Card declined by issuer");
        }

        let token = uuid::Uuid::new_v4().simple().to_string();
        PaymentResult::Approved {
            payment_id: format!("pay_{}", &token[..16]),
        }
    }
}

#[async_trait]
impl PaymentGateway for MockPaymentGateway {
    #[tracing::instrument(skip(self, card), fields(card_last4 = card.last4()))]
    async fn authorize(&self, card: &PaymentCard, amount: Money) -> PaymentResult {
        let result = Self::decide(&card.number, amount);
        match &result {
            PaymentResult::Approved { payment_id } => {
                self.approved.fetch_add(1, Ordering::SeqCst);
                tracing::info!(%payment_id, %amount, "payment approved");
            }
            PaymentResult::Declined { reason } => {
                self.declined.fetch_add(1, Ordering::SeqCst);
                tracing::info!(%reason, %amount, "payment declined");
            }
        }
        result
    }
}
