use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::{CustomerId, OrderId, ProductId, WarehouseId};
use domain::{Coordinates, Money, NewOrder, Order, OrderLine, OrderStatus, WarehouseSummary};
use sqlx::{PgPool, Row, postgres::PgRow};

use crate::{OrderStoreError, Result, store::OrderStore};

/// PostgreSQL-backed order store.
///
/// An order and its lines are inserted in a single database transaction; the
/// database assigns the id (`BIGSERIAL`) and `created_at`.
#[derive(Clone)]
pub struct PostgresOrderStore {
    pool: PgPool,
}

impl PostgresOrderStore {
    /// Creates a new PostgreSQL order store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("../../migrations").run(&self.pool).await?;
        Ok(())
    }

    fn row_to_line(order_id: OrderId, row: PgRow) -> Result<OrderLine> {
        let quantity: i64 = row.try_get("quantity")?;
        let quantity = u32::try_from(quantity).map_err(|_| OrderStoreError::Corrupt {
            order_id,
            reason: format!("line quantity {quantity} out of range"),
        })?;

        Ok(OrderLine {
            product_id: ProductId::new(row.try_get("product_id")?),
            product_name: row.try_get("product_name")?,
            quantity,
            unit_price: Money::from_cents(row.try_get("unit_price_cents")?),
        })
    }

    fn row_to_order(row: PgRow, items: Vec<OrderLine>) -> Result<Order> {
        let order_id = OrderId::new(row.try_get("id")?);
        let status: String = row.try_get("status")?;
        let status = status
            .parse::<OrderStatus>()
            .map_err(|reason| OrderStoreError::Corrupt { order_id, reason })?;

        Ok(Order {
            id: order_id,
            customer_id: CustomerId::new(row.try_get("customer_id")?),
            warehouse: WarehouseSummary {
                id: WarehouseId::new(row.try_get("warehouse_id")?),
                name: row.try_get("warehouse_name")?,
                address: row.try_get("warehouse_address")?,
            },
            shipping_address: row.try_get("shipping_address")?,
            shipping_location: Coordinates::new(
                row.try_get("shipping_lat")?,
                row.try_get("shipping_lng")?,
            ),
            total_amount: Money::from_cents(row.try_get("total_amount_cents")?),
            payment_id: row.try_get("payment_id")?,
            status,
            created_at: row.try_get("created_at")?,
            items,
        })
    }
}

#[async_trait]
impl OrderStore for PostgresOrderStore {
    #[tracing::instrument(skip(self, order), fields(customer_id = %order.customer_id))]
    async fn commit(&self, order: NewOrder) -> Result<Order> {
        let total_amount = order.total_amount();
        let line_numbers = line_numbers(order.lines.len())?;

        let mut tx = self.pool.begin().await?;

        let row = sqlx::query(
            r#"
            INSERT INTO orders (customer_id, warehouse_id, warehouse_name, warehouse_address,
                                shipping_address, shipping_lat, shipping_lng,
                                total_amount_cents, payment_id, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING id, created_at
            "#,
        )
        .bind(order.customer_id.as_i64())
        .bind(order.warehouse.id.as_i64())
        .bind(&order.warehouse.name)
        .bind(&order.warehouse.address)
        .bind(&order.shipping_address)
        .bind(order.shipping_location.latitude)
        .bind(order.shipping_location.longitude)
        .bind(total_amount.cents())
        .bind(&order.payment_id)
        .bind(OrderStatus::Confirmed.as_str())
        .fetch_one(&mut *tx)
        .await?;

        let order_id = OrderId::new(row.try_get("id")?);
        let created_at: DateTime<Utc> = row.try_get("created_at")?;

        for (line_no, line) in line_numbers.zip(&order.lines) {
            sqlx::query(
                r#"
                INSERT INTO order_lines (order_id, line_no, product_id, product_name, quantity, unit_price_cents)
                VALUES ($1, $2, $3, $4, $5, $6)
                "#,
            )
            .bind(order_id.as_i64())
            .bind(line_no)
            .bind(line.product_id.as_i64())
            .bind(&line.product_name)
            .bind(i64::from(line.quantity))
            .bind(line.unit_price.cents())
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        metrics::counter!("order_store_commits_total").increment(1);
        Ok(order.into_order(order_id, created_at))
    }

    async fn get(&self, order_id: OrderId) -> Result<Option<Order>> {
        let row = sqlx::query(
            r#"
            SELECT id, customer_id, warehouse_id, warehouse_name, warehouse_address,
                   shipping_address, shipping_lat, shipping_lng, total_amount_cents,
                   payment_id, status, created_at
            FROM orders
            WHERE id = $1
            "#,
        )
        .bind(order_id.as_i64())
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let line_rows = sqlx::query(
            r#"
            SELECT product_id, product_name, quantity, unit_price_cents
            FROM order_lines
            WHERE order_id = $1
            ORDER BY line_no ASC
            "#,
        )
        .bind(order_id.as_i64())
        .fetch_all(&self.pool)
        .await?;

        let items = line_rows
            .into_iter()
            .map(|row| Self::row_to_line(order_id, row))
            .collect::<Result<Vec<_>>>()?;

        Self::row_to_order(row, items).map(Some)
    }
}

/// `line_no` values for an order with `count` lines.
fn line_numbers(count: usize) -> Result<std::ops::Range<i32>> {
    let end = i32::try_from(count).map_err(|_| OrderStoreError::TooManyLines(count))?;
    Ok(0..end)
}
