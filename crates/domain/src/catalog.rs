//! Read-only catalog of customers, products and warehouses.

use std::collections::{BTreeMap, HashMap, HashSet};

use common::{CustomerId, ProductId, WarehouseId};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::value_objects::{Coordinates, Money};

/// A customer who can place orders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub id: CustomerId,
    pub name: String,
    pub email: String,
}

impl Customer {
    pub fn new(id: i64, name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: CustomerId::new(id),
            name: name.into(),
            email: email.into(),
        }
    }
}

/// A sellable product. Immutable once added to the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub unit_price: Money,
}

impl Product {
    pub fn new(id: i64, name: impl Into<String>, unit_price: Money) -> Self {
        Self {
            id: ProductId::new(id),
            name: name.into(),
            unit_price,
        }
    }
}

/// A fulfillment location. Stock levels are owned by the inventory ledger,
/// not by this record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Warehouse {
    pub id: WarehouseId,
    pub name: String,
    pub address: String,
    pub location: Coordinates,
}

impl Warehouse {
    pub fn new(
        id: i64,
        name: impl Into<String>,
        address: impl Into<String>,
        location: Coordinates,
    ) -> Self {
        Self {
            id: WarehouseId::new(id),
            name: name.into(),
            address: address.into(),
            location,
        }
    }
}

/// Immutable lookup tables for the entities an order refers to.
///
/// Warehouses are kept sorted by id so iteration order is deterministic.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    customers: HashMap<CustomerId, Customer>,
    products: HashMap<ProductId, Product>,
    warehouses: BTreeMap<WarehouseId, Warehouse>,
}

impl Catalog {
    /// Starts building a catalog.
    pub fn builder() -> CatalogBuilder {
        CatalogBuilder::default()
    }

    /// Looks up a customer by ID.
    pub fn customer(&self, id: CustomerId) -> Option<&Customer> {
        self.customers.get(&id)
    }

    /// Looks up a product by ID.
    pub fn product(&self, id: ProductId) -> Option<&Product> {
        self.products.get(&id)
    }

    /// Looks up a warehouse by ID.
    pub fn warehouse(&self, id: WarehouseId) -> Option<&Warehouse> {
        self.warehouses.get(&id)
    }

    /// Returns all warehouses in ascending id order.
    pub fn warehouses(&self) -> impl Iterator<Item = &Warehouse> {
        self.warehouses.values()
    }

    /// Returns the ids from `ids` that are not in the catalog, in request
    /// order and without duplicates.
    pub fn missing_products<'a>(
        &self,
        ids: impl IntoIterator<Item = &'a ProductId>,
    ) -> Vec<ProductId> {
        let mut seen = HashSet::new();
        ids.into_iter()
            .filter(|id| !self.products.contains_key(*id) && seen.insert(**id))
            .copied()
            .collect()
    }
}

/// Builder for [`Catalog`].
#[derive(Debug, Default)]
pub struct CatalogBuilder {
    catalog: Catalog,
}

impl CatalogBuilder {
    pub fn customer(mut self, customer: Customer) -> Self {
        self.catalog.customers.insert(customer.id, customer);
        self
    }

    pub fn product(mut self, product: Product) -> Self {
        self.catalog.products.insert(product.id, product);
        self
    }

    pub fn warehouse(mut self, warehouse: Warehouse) -> Self {
        self.catalog.warehouses.insert(warehouse.id, warehouse);
        self
    }

    /// Finishes the catalog, rejecting products with a negative price.
    pub fn build(self) -> Result<Catalog, DomainError> {
        if let Some(product) = self
            .catalog
            .products
            .values()
            .find(|p| p.unit_price.is_negative())
        {
            return Err(DomainError::NegativePrice {
                product_id: product.id,
                cents: product.unit_price.cents(),
            });
        }
        Ok(self.catalog)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Catalog {
        Catalog::builder()
            .customer(Customer::new(1, "Alice Johnson", "alice@example.com"))
            .product(Product::new(1, "Laptop", Money::from_cents(99_999)))
            .product(Product::new(2, "Wireless Mouse", Money::from_cents(2_999)))
            .warehouse(Warehouse::new(
                3,
                "East",
                "789 Industrial Ave",
                Coordinates::new(40.7128, -74.0060),
            ))
            .warehouse(Warehouse::new(
                1,
                "West",
                "123 Tech Blvd",
                Coordinates::new(37.7749, -122.4194),
            ))
            .build()
            .unwrap()
    }

    #[test]
    fn test_lookups() {
        let catalog = catalog();
        assert_eq!(catalog.customer(CustomerId::new(1)).unwrap().name, "Alice Johnson");
        assert!(catalog.customer(CustomerId::new(9)).is_none());
        assert_eq!(catalog.product(ProductId::new(2)).unwrap().name, "Wireless Mouse");
        assert_eq!(catalog.warehouse(WarehouseId::new(3)).unwrap().name, "East");
    }

    #[test]
    fn test_warehouses_iterate_in_id_order() {
        let ids: Vec<_> = catalog().warehouses().map(|w| w.id.as_i64()).collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[test]
    fn test_missing_products_deduplicates() {
        let catalog = catalog();
        let requested = [
            ProductId::new(1),
            ProductId::new(7),
            ProductId::new(7),
            ProductId::new(8),
        ];
        assert_eq!(
            catalog.missing_products(requested.iter()),
            vec![ProductId::new(7), ProductId::new(8)]
        );
    }

    #[test]
    fn test_missing_products_handles_large_requests() {
        let catalog = catalog();
        let requested: Vec<ProductId> = (1..=40_000)
            .chain(1..=40_000)
            .map(ProductId::new)
            .collect();

        let missing = catalog.missing_products(requested.iter());

        assert_eq!(missing.len(), 39_998);
        assert_eq!(missing[0], ProductId::new(3));
        assert_eq!(missing.last(), Some(&ProductId::new(40_000)));
    }

    #[test]
    fn test_negative_price_rejected() {
        let result = Catalog::builder()
            .product(Product::new(1, "Broken", Money::from_cents(-1)))
            .build();
        assert!(matches!(result, Err(DomainError::NegativePrice { .. })));
    }
}
