use async_trait::async_trait;
use common::OrderId;
use domain::{NewOrder, Order};

use crate::Result;

/// Core trait for order store implementations.
///
/// All implementations must be thread-safe (Send + Sync).
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Persists an order and its lines atomically.
    ///
    /// The store assigns the order id and `created_at` as part of the same
    /// write. Either the order and all of its lines are stored or nothing is.
    async fn commit(&self, order: NewOrder) -> Result<Order>;

    /// Loads a previously committed order.
    async fn get(&self, order_id: OrderId) -> Result<Option<Order>>;
}
