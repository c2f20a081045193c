//! Confirmed order and its lines.

use chrono::{DateTime, Utc};
use common::{CustomerId, OrderId, ProductId, WarehouseId};
use serde::{Deserialize, Serialize};

use super::OrderStatus;
use crate::catalog::{Product, Warehouse};
use crate::value_objects::{Coordinates, Money};

/// A committed order line.
///
/// Product name and unit price are copied from the catalog when the order is
/// built, so later catalog changes never alter historical orders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    pub product_id: ProductId,
    pub product_name: String,
    pub quantity: u32,
    pub unit_price: Money,
}

impl OrderLine {
    /// Snapshots a catalog product at the requested quantity.
    pub fn from_product(product: &Product, quantity: u32) -> Self {
        Self {
            product_id: product.id,
            product_name: product.name.clone(),
            quantity,
            unit_price: product.unit_price,
        }
    }

    /// Returns quantity * unit_price.
    pub fn subtotal(&self) -> Money {
        self.unit_price.multiply(self.quantity)
    }

    /// Sums the subtotals of `lines`, or `None` if any step overflows.
    pub fn checked_total(lines: &[OrderLine]) -> Option<Money> {
        lines.iter().try_fold(Money::zero(), |total, line| {
            total.checked_add(line.unit_price.checked_multiply(line.quantity)?)
        })
    }
}

/// The warehouse fields carried on an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WarehouseSummary {
    pub id: WarehouseId,
    pub name: String,
    pub address: String,
}

impl From<&Warehouse> for WarehouseSummary {
    fn from(warehouse: &Warehouse) -> Self {
        Self {
            id: warehouse.id,
            name: warehouse.name.clone(),
            address: warehouse.address.clone(),
        }
    }
}

/// An order ready to be written to the order store. The store assigns the
/// id and creation timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewOrder {
    pub customer_id: CustomerId,
    pub warehouse: WarehouseSummary,
    pub shipping_address: String,
    pub shipping_location: Coordinates,
    pub payment_id: String,
    pub lines: Vec<OrderLine>,
}

impl NewOrder {
    /// Sum of all line subtotals.
    pub fn total_amount(&self) -> Money {
        self.lines.iter().map(OrderLine::subtotal).sum()
    }

    /// Turns this into a persisted order.
    pub fn into_order(self, id: OrderId, created_at: DateTime<Utc>) -> Order {
        let total_amount = self.total_amount();
        Order {
            id,
            customer_id: self.customer_id,
            warehouse: self.warehouse,
            shipping_address: self.shipping_address,
            shipping_location: self.shipping_location,
            total_amount,
            payment_id: self.payment_id,
            status: OrderStatus::Confirmed,
            created_at,
            items: self.lines,
        }
    }
}

/// A persisted, confirmed order. Never modified after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub customer_id: CustomerId,
    pub warehouse: WarehouseSummary,
    pub shipping_address: String,
    pub shipping_location: Coordinates,
    pub total_amount: Money,
    pub payment_id: String,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub items: Vec<OrderLine>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_order() -> NewOrder {
        let laptop = Product::new(1, "Laptop", Money::from_cents(99_999));
        let mouse = Product::new(2, "Wireless Mouse", Money::from_cents(2_999));
        let warehouse = Warehouse::new(
            1,
            "West Coast Warehouse",
            "123 Tech Blvd, San Francisco, CA 94102, USA",
            Coordinates::new(37.7749, -122.4194),
        );
        NewOrder {
            customer_id: CustomerId::new(1),
            warehouse: WarehouseSummary::from(&warehouse),
            shipping_address: "1 Market St, San Francisco, CA 94105, USA".to_string(),
            shipping_location: Coordinates::new(37.79, -122.39),
            payment_id: "pay_0123456789abcdef".to_string(),
            lines: vec![
                OrderLine::from_product(&laptop, 2),
                OrderLine::from_product(&mouse, 1),
            ],
        }
    }

    #[test]
    fn test_line_snapshots_product() {
        let product = Product::new(5, "Mechanical Keyboard", Money::from_cents(14_999));
        let line = OrderLine::from_product(&product, 3);
        assert_eq!(line.product_name, "Mechanical Keyboard");
        assert_eq!(line.unit_price, Money::from_cents(14_999));
        assert_eq!(line.subtotal(), Money::from_cents(44_997));
    }

    #[test]
    fn test_total_amount() {
        assert_eq!(new_order().total_amount(), Money::from_cents(202_997));
    }

    #[test]
    fn test_checked_total() {
        let order = new_order();
        assert_eq!(
            OrderLine::checked_total(&order.lines),
            Some(order.total_amount())
        );

        let line = OrderLine {
            product_id: ProductId::new(9),
            product_name: "Yacht".to_string(),
            quantity: 2,
            unit_price: Money::from_cents(i64::MAX / 2),
        };
        assert!(OrderLine::checked_total(&[line.clone()]).is_some());
        assert_eq!(OrderLine::checked_total(&[line.clone(), line]), None);
    }

    #[test]
    fn test_into_order_confirms() {
        let created_at = Utc::now();
        let order = new_order().into_order(OrderId::new(7), created_at);
        assert_eq!(order.id, OrderId::new(7));
        assert_eq!(order.status, OrderStatus::Confirmed);
        assert_eq!(order.total_amount.cents(), 202_997);
        assert_eq!(order.items.len(), 2);
        assert_eq!(order.created_at, created_at);
        assert_eq!(order.warehouse.name, "West Coast Warehouse");
    }
}
