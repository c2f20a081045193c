//! Demo catalog and stock levels.
//!
//! Three customers, five products and three warehouses. Stock is uneven on
//! purpose: Dallas carries no keyboards and New York has only five laptops.

use common::{ProductId, WarehouseId};
use domain::{Catalog, Coordinates, Customer, DomainError, Money, Product, Warehouse};
use fulfillment::InventoryLedger;

const CUSTOMERS: [(i64, &str, &str); 3] = [
    (1, "Alice Johnson", "alice@example.com"),
    (2, "Bob Smith", "bob@example.com"),
    (3, "Carol Williams", "carol@example.com"),
];

const PRODUCTS: [(i64, &str, i64); 5] = [
    (1, "Laptop", 99_999),
    (2, "Wireless Mouse", 2_999),
    (3, "USB-C Hub", 4_999),
    (4, "Monitor Stand", 7_999),
    (5, "Mechanical Keyboard", 14_999),
];

const WAREHOUSES: [(i64, &str, &str, f64, f64); 3] = [
    (
        1,
        "West Coast Warehouse",
        "123 Tech Blvd, San Francisco, CA 94102, USA",
        37.7749,
        -122.4194,
    ),
    (
        2,
        "Central Warehouse",
        "456 Commerce St, Dallas, TX 75201, USA",
        32.7767,
        -96.7970,
    ),
    (
        3,
        "East Coast Warehouse",
        "789 Industrial Ave, New York, NY 10001, USA",
        40.7128,
        -74.0060,
    ),
];

/// (warehouse, product, quantity)
const STOCK: [(i64, i64, u32); 14] = [
    (1, 1, 50),
    (1, 2, 200),
    (1, 3, 150),
    (1, 4, 100),
    (1, 5, 75),
    (2, 1, 30),
    (2, 2, 250),
    (2, 3, 100),
    (2, 4, 80),
    (3, 1, 5),
    (3, 2, 300),
    (3, 3, 200),
    (3, 4, 120),
    (3, 5, 50),
];

/// Builds the demo catalog.
pub fn demo_catalog() -> Result<Catalog, DomainError> {
    let mut builder = Catalog::builder();
    for (id, name, email) in CUSTOMERS {
        builder = builder.customer(Customer::new(id, name, email));
    }
    for (id, name, cents) in PRODUCTS {
        builder = builder.product(Product::new(id, name, Money::from_cents(cents)));
    }
    for (id, name, address, latitude, longitude) in WAREHOUSES {
        builder = builder.warehouse(Warehouse::new(
            id,
            name,
            address,
            Coordinates::new(latitude, longitude),
        ));
    }
    builder.build()
}

/// Builds a ledger holding the demo stock levels.
pub fn demo_inventory() -> InventoryLedger {
    let mut builder = InventoryLedger::builder();
    for (id, ..) in WAREHOUSES {
        builder = builder.warehouse(WarehouseId::new(id));
    }
    for (warehouse, product, quantity) in STOCK {
        builder = builder.stock(
            WarehouseId::new(warehouse),
            ProductId::new(product),
            quantity,
        );
    }
    builder.build()
}
