//! Domain error types.

use common::{CustomerId, ProductId};
use thiserror::Error;

/// Errors raised while validating an order request or building the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    /// Customer ID must be positive.
    #[error("Invalid customer id: {0} (must be greater than 0)")]
    InvalidCustomerId(CustomerId),

    /// Product ID must be positive.
    #[error("Invalid product id: {0} (must be greater than 0)")]
    InvalidProductId(ProductId),

    /// Order request has no items.
    #[error("Order must contain at least one item")]
    NoItems,

    /// Invalid quantity.
    #[error("Invalid quantity for product {product_id}: {quantity} (must be greater than 0)")]
    InvalidQuantity { product_id: ProductId, quantity: u32 },

    /// A shipping address field is blank.
    #[error("Shipping address field '{0}' must not be empty")]
    MissingAddressField(&'static str),

    /// The payment card failed format checks.
    #[error("Invalid payment card: {0}")]
    InvalidCard(&'static str),

    /// Product prices cannot be negative.
    #[error("Invalid price for product {product_id}: {cents} cents")]
    NegativePrice { product_id: ProductId, cents: i64 },

    /// The order total does not fit in a money amount.
    #[error("Order total is too large")]
    AmountOverflow,
}
