//! Domain layer for the order fulfillment service.
//!
//! This crate provides the types shared by every other layer:
//! - Value objects: money, coordinates, shipping address, payment card
//! - Catalog entities: customers, products and warehouses
//! - Order types: the incoming request, committed lines and the confirmed order

pub mod catalog;
pub mod error;
pub mod order;
pub mod value_objects;

pub use catalog::{Catalog, CatalogBuilder, Customer, Product, Warehouse};
pub use common::{CustomerId, OrderId, ProductId, WarehouseId};
pub use error::DomainError;
pub use order::{
    NewOrder, Order, OrderItemRequest, OrderLine, OrderRequest, OrderStatus, WarehouseSummary,
};
pub use value_objects::{Coordinates, Money, PaymentCard, ShippingAddress};
