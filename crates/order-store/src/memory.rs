use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use common::OrderId;
use domain::{NewOrder, Order};
use tokio::sync::RwLock;

use crate::{OrderStoreError, Result, store::OrderStore};

#[derive(Debug, Default)]
struct InMemoryOrderState {
    orders: BTreeMap<OrderId, Order>,
    last_id: i64,
}

/// In-memory order store.
///
/// Ids are assigned sequentially starting at 1. The store can be switched
/// into an unavailable mode to exercise persistence failures.
#[derive(Debug, Clone, Default)]
pub struct InMemoryOrderStore {
    state: Arc<RwLock<InMemoryOrderState>>,
    unavailable: Arc<AtomicBool>,
}

impl InMemoryOrderStore {
    /// Creates a new empty in-memory order store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes subsequent commits fail with [`OrderStoreError::Unavailable`].
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Returns the number of orders stored.
    pub async fn order_count(&self) -> usize {
        self.state.read().await.orders.len()
    }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn commit(&self, order: NewOrder) -> Result<Order> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(OrderStoreError::Unavailable(
                "in-memory store is switched off".to_string(),
            ));
        }

        let mut state = self.state.write().await;
        state.last_id += 1;
        let id = OrderId::new(state.last_id);
        let order = order.into_order(id, Utc::now());
        state.orders.insert(id, order.clone());

        Ok(order)
    }

    async fn get(&self, order_id: OrderId) -> Result<Option<Order>> {
        Ok(self.state.read().await.orders.get(&order_id).cloned())
    }
}
