//! Order store for confirmed orders.
//!
//! The store is append-only: an order is written exactly once, at the end of
//! a successful fulfillment, and is never updated or deleted afterwards.

pub mod error;
pub mod memory;
pub mod postgres;
pub mod store;

pub use error::{OrderStoreError, Result};
pub use memory::InMemoryOrderStore;
pub use postgres::PostgresOrderStore;
pub use store::OrderStore;
