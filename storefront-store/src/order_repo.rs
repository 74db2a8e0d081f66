use async_trait::async_trait;
use chrono::NaiveDateTime;
use sqlx::PgPool;

use storefront_core::repository::OrderRepository;
use storefront_core::{CoreError, CoreResult, Order, Product};

use crate::error::db_error;
use crate::product_repo::ProductRow;

pub struct StoreOrderRepository {
    pool: PgPool,
}

impl StoreOrderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct OrderRow {
    id: i64,
    order_date: NaiveDateTime,
    user_id: i64,
}

impl From<OrderRow> for Order {
    fn from(row: OrderRow) -> Self {
        Order {
            id: row.id,
            order_date: row.order_date,
            user_id: row.user_id,
        }
    }
}

/// A foreign key violation here means a parent row vanished between the
/// caller's existence check and the write.
fn missing_parent(err: sqlx::Error, what: &str) -> CoreError {
    match &err {
        sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation() => {
            CoreError::NotFound(format!("{} not found", what))
        }
        _ => db_error(err),
    }
}

#[async_trait]
impl OrderRepository for StoreOrderRepository {
    async fn create_order(&self, user_id: i64, order_date: NaiveDateTime) -> CoreResult<Order> {
        let row = sqlx::query_as::<_, OrderRow>(
            r#"
            INSERT INTO orders (order_date, user_id)
            VALUES ($1, $2)
            RETURNING id, order_date, user_id
            "#,
        )
        .bind(order_date)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| missing_parent(e, "User"))?;

        Ok(row.into())
    }

    async fn get_order(&self, id: i64) -> CoreResult<Option<Order>> {
        let row = sqlx::query_as::<_, OrderRow>(
            "SELECT id, order_date, user_id FROM orders WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?;

        Ok(row.map(Order::from))
    }

    async fn delete_order(&self, id: i64) -> CoreResult<bool> {
        let mut tx = self.pool.begin().await.map_err(db_error)?;

        sqlx::query("DELETE FROM order_product WHERE order_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(db_error)?;

        let result = sqlx::query("DELETE FROM orders WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(db_error)?;

        tx.commit().await.map_err(db_error)?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_orders_for_user(&self, user_id: i64) -> CoreResult<Vec<Order>> {
        let rows = sqlx::query_as::<_, OrderRow>(
            "SELECT id, order_date, user_id FROM orders WHERE user_id = $1 ORDER BY id ASC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        Ok(rows.into_iter().map(Order::from).collect())
    }

    async fn list_order_products(&self, order_id: i64) -> CoreResult<Vec<Product>> {
        let rows = sqlx::query_as::<_, ProductRow>(
            r#"
            SELECT p.id, p.product_name, p.price
            FROM products p
            JOIN order_product op ON op.product_id = p.id
            WHERE op.order_id = $1
            ORDER BY p.id ASC
            "#,
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        Ok(rows.into_iter().map(Product::from).collect())
    }

    async fn add_order_product(&self, order_id: i64, product_id: i64) -> CoreResult<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO order_product (order_id, product_id)
            VALUES ($1, $2)
            ON CONFLICT (order_id, product_id) DO NOTHING
            "#,
        )
        .bind(order_id)
        .bind(product_id)
        .execute(&self.pool)
        .await
        .map_err(|e| missing_parent(e, "Order or product"))?;

        Ok(result.rows_affected() == 1)
    }

    async fn remove_order_product(&self, order_id: i64, product_id: i64) -> CoreResult<bool> {
        let result = sqlx::query(
            "DELETE FROM order_product WHERE order_id = $1 AND product_id = $2",
        )
        .bind(order_id)
        .bind(product_id)
        .execute(&self.pool)
        .await
        .map_err(db_error)?;

        Ok(result.rows_affected() > 0)
    }
}
