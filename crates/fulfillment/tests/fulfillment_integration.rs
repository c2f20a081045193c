//! End-to-end tests for order fulfillment against an in-memory store.

use std::collections::BTreeMap;
use std::sync::Arc;

use common::{CustomerId, ProductId, WarehouseId};
use domain::{
    Catalog, Coordinates, Customer, Money, OrderItemRequest, OrderRequest, OrderStatus,
    PaymentCard, Product, ShippingAddress, Warehouse,
};
use fulfillment::{
    AbortReason, ErrorKind, FulfillmentError, FulfillmentState, InventoryLedger,
    MockPaymentGateway, OrderFulfillment, StaticGeocoder,
};
use order_store::InMemoryOrderStore;

type TestFulfillment = OrderFulfillment<StaticGeocoder, MockPaymentGateway, InMemoryOrderStore>;

const VISA: &str = "4111111111111111";

fn san_francisco() -> ShippingAddress {
    ShippingAddress::new("1 Market St", "San Francisco", "CA", "94105", "USA")
}

fn new_york() -> ShippingAddress {
    ShippingAddress::new("350 5th Ave", "New York", "NY", "10118", "USA")
}

fn dallas() -> ShippingAddress {
    ShippingAddress::new("1500 Marilla St", "Dallas", "TX", "75201", "USA")
}

fn catalog() -> Catalog {
    Catalog::builder()
        .customer(Customer::new(1, "Alice Johnson", "alice@example.com"))
        .customer(Customer::new(2, "Bob Smith", "bob@example.com"))
        .product(Product::new(1, "Laptop", Money::from_cents(99_999)))
        .product(Product::new(2, "Wireless Mouse", Money::from_cents(2_999)))
        .product(Product::new(3, "USB-C Hub", Money::from_cents(4_999)))
        .product(Product::new(4, "Monitor Stand", Money::from_cents(7_999)))
        .product(Product::new(5, "Mechanical Keyboard", Money::from_cents(14_999)))
        .warehouse(Warehouse::new(
            1,
            "West Coast Warehouse",
            "123 Tech Blvd, San Francisco, CA 94102, USA",
            Coordinates::new(37.7749, -122.4194),
        ))
        .warehouse(Warehouse::new(
            2,
            "Central Warehouse",
            "456 Commerce St, Dallas, TX 75201, USA",
            Coordinates::new(32.7767, -96.7970),
        ))
        .warehouse(Warehouse::new(
            3,
            "East Coast Warehouse",
            "789 Industrial Ave, New York, NY 10001, USA",
            Coordinates::new(40.7128, -74.0060),
        ))
        .build()
        .unwrap()
}

fn stocked_ledger() -> InventoryLedger {
    let levels: [(i64, [u32; 5]); 3] = [
        (1, [50, 200, 150, 100, 75]),
        (2, [30, 250, 100, 80, 0]),
        (3, [5, 300, 200, 120, 50]),
    ];
    let mut builder = InventoryLedger::builder();
    for (warehouse, quantities) in levels {
        for (product, quantity) in (1..).zip(quantities) {
            if quantity > 0 {
                builder = builder.stock(
                    WarehouseId::new(warehouse),
                    ProductId::new(product),
                    quantity,
                );
            }
        }
    }
    builder.build()
}

struct TestHarness {
    fulfillment: Arc<TestFulfillment>,
    payment: MockPaymentGateway,
    store: InMemoryOrderStore,
}

impl TestHarness {
    fn new() -> Self {
        Self::with_ledger(stocked_ledger())
    }

    fn with_ledger(ledger: InventoryLedger) -> Self {
        let geocoder = StaticGeocoder::new()
            .with(&san_francisco(), Coordinates::new(37.7936, -122.3958))
            .with(&new_york(), Coordinates::new(40.7484, -73.9857))
            .with(&dallas(), Coordinates::new(32.7876, -96.7994));
        let payment = MockPaymentGateway::new();
        let store = InMemoryOrderStore::new();

        let fulfillment = OrderFulfillment::new(
            Arc::new(catalog()),
            Arc::new(ledger),
            geocoder,
            payment.clone(),
            store.clone(),
        );

        Self {
            fulfillment: Arc::new(fulfillment),
            payment,
            store,
        }
    }

    async fn snapshot(&self) -> BTreeMap<WarehouseId, BTreeMap<ProductId, u32>> {
        let mut all = BTreeMap::new();
        for id in 1..=3 {
            let id = WarehouseId::new(id);
            all.insert(id, self.fulfillment.ledger().stock(id).await.unwrap());
        }
        all
    }

    async fn available(&self, warehouse: i64, product: i64) -> u32 {
        self.fulfillment
            .ledger()
            .available(WarehouseId::new(warehouse), ProductId::new(product))
            .await
            .unwrap()
    }
}

fn order_request(
    address: ShippingAddress,
    card: &str,
    items: &[(i64, u32)],
) -> OrderRequest {
    OrderRequest {
        customer_id: CustomerId::new(1),
        shipping_address: address,
        payment_card: PaymentCard::new(card, "12/30", "123"),
        items: items
            .iter()
            .map(|&(product, quantity)| OrderItemRequest::new(product, quantity))
            .collect(),
    }
}

#[tokio::test]
async fn confirmed_order_has_exact_total_and_lines() {
    let harness = TestHarness::new();
    let request = order_request(san_francisco(), VISA, &[(1, 2), (2, 1)]);

    let order = harness.fulfillment.create_order(&request).await.unwrap();

    assert_eq!(order.status, OrderStatus::Confirmed);
    assert_eq!(order.total_amount, Money::from_cents(202_997));
    assert_eq!(order.total_amount.as_decimal(), 2029.97);
    assert_eq!(order.warehouse.id, WarehouseId::new(1));
    assert_eq!(order.warehouse.name, "West Coast Warehouse");
    assert_eq!(
        order.shipping_address,
        "1 Market St, San Francisco, CA 94105, USA"
    );
    assert!(order.payment_id.starts_with("pay_"));

    assert_eq!(order.items.len(), 2);
    assert_eq!(order.items[0].product_name, "Laptop");
    assert_eq!(order.items[0].quantity, 2);
    assert_eq!(order.items[0].unit_price, Money::from_cents(99_999));
    assert_eq!(order.items[1].product_name, "Wireless Mouse");

    assert_eq!(harness.available(1, 1).await, 48);
    assert_eq!(harness.available(1, 2).await, 199);
    assert_eq!(harness.store.order_count().await, 1);
}

#[tokio::test]
async fn nearest_warehouse_is_chosen() {
    let harness = TestHarness::new();

    let order = harness
        .fulfillment
        .create_order(&order_request(new_york(), VISA, &[(2, 1)]))
        .await
        .unwrap();

    assert_eq!(order.warehouse.id, WarehouseId::new(3));
}

#[tokio::test]
async fn nearer_warehouse_without_stock_is_skipped() {
    let harness = TestHarness::new();

    // Dallas carries no keyboards; New York is closer to Dallas than San
    // Francisco is.
    let order = harness
        .fulfillment
        .create_order(&order_request(dallas(), VISA, &[(5, 1)]))
        .await
        .unwrap();

    assert_eq!(order.warehouse.id, WarehouseId::new(3));
    assert_eq!(harness.available(3, 5).await, 49);
}

#[tokio::test]
async fn repeated_lines_are_summed_for_eligibility() {
    let harness = TestHarness::new();

    // New York holds 5 laptops; two lines of 3 need 6.
    let order = harness
        .fulfillment
        .create_order(&order_request(new_york(), VISA, &[(1, 3), (1, 3)]))
        .await
        .unwrap();

    assert_eq!(order.warehouse.id, WarehouseId::new(2));
    assert_eq!(order.items.len(), 2);
    assert_eq!(harness.available(2, 1).await, 24);
    assert_eq!(harness.available(3, 1).await, 5);
}

#[tokio::test]
async fn repeated_lines_exceeding_any_stock_level_are_not_charged() {
    let ledger = InventoryLedger::builder()
        .stock(WarehouseId::new(1), ProductId::new(1), u32::MAX)
        .build();
    let harness = TestHarness::with_ledger(ledger);

    let err = harness
        .fulfillment
        .create_order(&order_request(
            san_francisco(),
            VISA,
            &[(1, u32::MAX), (1, 5)],
        ))
        .await
        .unwrap_err();

    assert!(matches!(err, FulfillmentError::NoFulfillingWarehouse));
    assert_eq!(harness.payment.approved_count(), 0);
    assert_eq!(harness.available(1, 1).await, u32::MAX);
    assert_eq!(harness.store.order_count().await, 0);
}

#[tokio::test]
async fn no_fulfilling_warehouse_leaves_stock_untouched() {
    let harness = TestHarness::new();
    let before = harness.snapshot().await;

    let fulfillment = harness
        .fulfillment
        .execute(&order_request(san_francisco(), VISA, &[(1, 51)]))
        .await
        .unwrap();

    let err = fulfillment.outcome.unwrap_err();
    assert!(matches!(err, FulfillmentError::NoFulfillingWarehouse));
    assert_eq!(err.kind(), ErrorKind::BadRequest);
    assert_eq!(
        fulfillment.transaction.abort_reason(),
        Some(AbortReason::NoFulfillingWarehouse)
    );
    assert_eq!(harness.snapshot().await, before);
    assert_eq!(harness.payment.approved_count(), 0);
}

#[tokio::test]
async fn declined_payment_leaves_stock_untouched() {
    let harness = TestHarness::new();
    let before = harness.snapshot().await;

    let err = harness
        .fulfillment
        .create_order(&order_request(
            san_francisco(),
            "0000000000000000",
            &[(1, 2), (3, 4)],
        ))
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "Payment failed: Card declined by issuer");
    assert_eq!(err.kind(), ErrorKind::PaymentRequired);
    assert_eq!(harness.snapshot().await, before);
    assert_eq!(harness.store.order_count().await, 0);
}

#[tokio::test]
async fn persistence_failure_releases_reservation() {
    let harness = TestHarness::new();
    harness.store.set_unavailable(true);
    let before = harness.snapshot().await;

    let fulfillment = harness
        .fulfillment
        .execute(&order_request(san_francisco(), VISA, &[(1, 1)]))
        .await
        .unwrap();

    let err = fulfillment.outcome.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Internal);
    assert!(matches!(err, FulfillmentError::PersistenceFailure { .. }));
    assert_eq!(fulfillment.transaction.state(), FulfillmentState::Aborted);
    assert!(fulfillment.transaction.payment_id().is_some());
    assert_eq!(harness.snapshot().await, before);

    // The store recovers and the same request now succeeds.
    harness.store.set_unavailable(false);
    let order = harness
        .fulfillment
        .create_order(&order_request(san_francisco(), VISA, &[(1, 1)]))
        .await
        .unwrap();
    assert_eq!(order.id.as_i64(), 1);
    assert_eq!(harness.available(1, 1).await, 49);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_orders_never_overdraw() {
    let ledger = InventoryLedger::builder()
        .stock(WarehouseId::new(1), ProductId::new(1), 5)
        .build();
    let harness = TestHarness::with_ledger(ledger);
    let request = order_request(san_francisco(), VISA, &[(1, 1)]);

    let mut tasks = Vec::new();
    for _ in 0..20 {
        let fulfillment = Arc::clone(&harness.fulfillment);
        let request = request.clone();
        tasks.push(tokio::spawn(async move {
            fulfillment.create_order(&request).await
        }));
    }

    let mut confirmed = 0;
    for task in tasks {
        match task.await.unwrap() {
            Ok(_) => confirmed += 1,
            Err(err) => assert!(
                matches!(
                    err,
                    FulfillmentError::NoFulfillingWarehouse | FulfillmentError::InsufficientStock(_)
                ),
                "unexpected error: {err}"
            ),
        }
    }

    assert_eq!(confirmed, 5);
    assert_eq!(harness.available(1, 1).await, 0);
    assert_eq!(harness.store.order_count().await, 5);
    assert_eq!(harness.payment.approved_count(), 5);
}

#[tokio::test]
async fn unknown_customer_is_not_found() {
    let harness = TestHarness::new();
    let mut request = order_request(san_francisco(), VISA, &[(1, 1)]);
    request.customer_id = CustomerId::new(42);

    let err = harness.fulfillment.create_order(&request).await.unwrap_err();

    assert!(matches!(err, FulfillmentError::CustomerNotFound(_)));
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn unknown_products_are_not_found() {
    let harness = TestHarness::new();
    let before = harness.snapshot().await;

    let err = harness
        .fulfillment
        .create_order(&order_request(san_francisco(), VISA, &[(1, 1), (99, 1)]))
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "Products not found: 99");
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(harness.snapshot().await, before);
}

#[tokio::test]
async fn malformed_request_is_bad_request() {
    let harness = TestHarness::new();
    let request = order_request(san_francisco(), "4111", &[(1, 1)]);

    let err = harness.fulfillment.create_order(&request).await.unwrap_err();

    assert!(matches!(err, FulfillmentError::InvalidRequest(_)));
    assert_eq!(err.kind(), ErrorKind::BadRequest);
    assert_eq!(harness.payment.declined_count(), 0);
}
