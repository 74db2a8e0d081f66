use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;

use storefront_core::pagination::PageRequest;
use storefront_core::repository::UserRepository;
use storefront_core::user::DUPLICATE_EMAIL;
use storefront_core::{CoreError, CoreResult, NewUser, User};

use crate::error::{db_error, db_error_on_unique};

pub struct StoreUserRepository {
    pool: PgPool,
}

impl StoreUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: i64,
    name: String,
    address: Option<String>,
    email: String,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            name: row.name,
            address: row.address,
            email: row.email,
        }
    }
}

fn duplicate_email(err: sqlx::Error) -> CoreError {
    db_error_on_unique(err, CoreError::Conflict(DUPLICATE_EMAIL.to_string()))
}

#[async_trait]
impl UserRepository for StoreUserRepository {
    async fn list_users(&self, page: PageRequest) -> CoreResult<(Vec<User>, u64)> {
        let rows = sqlx::query_as::<_, UserRow>(
            "SELECT id, name, address, email FROM users ORDER BY id ASC LIMIT $1 OFFSET $2",
        )
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await
            .map_err(db_error)?;

        Ok((rows.into_iter().map(User::from).collect(), total as u64))
    }

    async fn get_user(&self, id: i64) -> CoreResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, name, address, email FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?;

        Ok(row.map(User::from))
    }

    async fn create_user(&self, user: &NewUser) -> CoreResult<User> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (name, address, email)
            VALUES ($1, $2, $3)
            RETURNING id, name, address, email
            "#,
        )
        .bind(&user.name)
        .bind(&user.address)
        .bind(&user.email)
        .fetch_one(&self.pool)
        .await
        .map_err(duplicate_email)?;

        Ok(row.into())
    }

    async fn update_user(&self, user: &User) -> CoreResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            UPDATE users
            SET name = $1, address = $2, email = $3
            WHERE id = $4
            RETURNING id, name, address, email
            "#,
        )
        .bind(&user.name)
        .bind(&user.address)
        .bind(&user.email)
        .bind(user.id)
        .fetch_optional(&self.pool)
        .await
        .map_err(duplicate_email)?;

        Ok(row.map(User::from))
    }

    async fn delete_user(&self, id: i64) -> CoreResult<bool> {
        // Explicit cascade: association rows, then orders, then the user.
        let mut tx = self.pool.begin().await.map_err(db_error)?;

        let links = sqlx::query(
            "DELETE FROM order_product WHERE order_id IN (SELECT id FROM orders WHERE user_id = $1)",
        )
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(db_error)?;

        let orders = sqlx::query("DELETE FROM orders WHERE user_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(db_error)?;

        let users = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(db_error)?;

        tx.commit().await.map_err(db_error)?;

        debug!(
            user_id = id,
            orders = orders.rows_affected(),
            links = links.rows_affected(),
            "Cascade delete finished"
        );
        Ok(users.rows_affected() > 0)
    }
}
