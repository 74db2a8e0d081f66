use async_trait::async_trait;
use sqlx::PgPool;

use storefront_core::pagination::PageRequest;
use storefront_core::repository::ProductRepository;
use storefront_core::{CoreResult, NewProduct, Product};

use crate::error::db_error;

pub struct StoreProductRepository {
    pool: PgPool,
}

impl StoreProductRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
pub(crate) struct ProductRow {
    id: i64,
    product_name: String,
    price: f64,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Product {
            id: row.id,
            product_name: row.product_name,
            price: row.price,
        }
    }
}

#[async_trait]
impl ProductRepository for StoreProductRepository {
    async fn list_products(&self, page: PageRequest) -> CoreResult<(Vec<Product>, u64)> {
        let rows = sqlx::query_as::<_, ProductRow>(
            "SELECT id, product_name, price FROM products ORDER BY id ASC LIMIT $1 OFFSET $2",
        )
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await
            .map_err(db_error)?;

        Ok((rows.into_iter().map(Product::from).collect(), total as u64))
    }

    async fn get_product(&self, id: i64) -> CoreResult<Option<Product>> {
        let row = sqlx::query_as::<_, ProductRow>(
            "SELECT id, product_name, price FROM products WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?;

        Ok(row.map(Product::from))
    }

    async fn create_product(&self, product: &NewProduct) -> CoreResult<Product> {
        let row = sqlx::query_as::<_, ProductRow>(
            r#"
            INSERT INTO products (product_name, price)
            VALUES ($1, $2)
            RETURNING id, product_name, price
            "#,
        )
        .bind(&product.product_name)
        .bind(product.price)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error)?;

        Ok(row.into())
    }

    async fn update_product(&self, product: &Product) -> CoreResult<Option<Product>> {
        let row = sqlx::query_as::<_, ProductRow>(
            r#"
            UPDATE products
            SET product_name = $1, price = $2
            WHERE id = $3
            RETURNING id, product_name, price
            "#,
        )
        .bind(&product.product_name)
        .bind(product.price)
        .bind(product.id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?;

        Ok(row.map(Product::from))
    }

    async fn delete_product(&self, id: i64) -> CoreResult<bool> {
        // order_product rows go with it through ON DELETE CASCADE
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_error)?;

        Ok(result.rows_affected() > 0)
    }
}
