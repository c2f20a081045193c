//! Shared types for the order fulfillment service.

pub mod types;

pub use types::{CustomerId, OrderId, ProductId, WarehouseId};
