use common::OrderId;
use thiserror::Error;

/// Errors that can occur when interacting with the order store.
#[derive(Debug, Error)]
pub enum OrderStoreError {
    /// The store cannot accept writes right now.
    #[error("Order store unavailable: {0}")]
    Unavailable(String),

    /// A stored row could not be mapped back to an order.
    #[error("Corrupt order record {order_id}: {reason}")]
    Corrupt { order_id: OrderId, reason: String },

    /// The order has more lines than the `line_no` column can number.
    #[error("Order has {0} lines, too many to store")]
    TooManyLines(usize),

    /// A database error occurred.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A database migration error occurred.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Result type for order store operations.
pub type Result<T> = std::result::Result<T, OrderStoreError>;
