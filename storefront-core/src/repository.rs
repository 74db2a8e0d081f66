use async_trait::async_trait;
use chrono::NaiveDateTime;

use crate::order::Order;
use crate::pagination::PageRequest;
use crate::product::{NewProduct, Product};
use crate::user::{NewUser, User};
use crate::CoreResult;

/// Repository trait for user data access
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// One page of users ordered by id, plus the total count.
    async fn list_users(&self, page: PageRequest) -> CoreResult<(Vec<User>, u64)>;

    async fn get_user(&self, id: i64) -> CoreResult<Option<User>>;

    /// Fails with `Conflict` when the email is already taken.
    async fn create_user(&self, user: &NewUser) -> CoreResult<User>;

    /// Persists every field of `user`. `None` if the row no longer exists.
    async fn update_user(&self, user: &User) -> CoreResult<Option<User>>;

    /// Removes the user, its orders and their association rows in one unit.
    /// Returns whether a user was deleted.
    async fn delete_user(&self, id: i64) -> CoreResult<bool>;
}

/// Repository trait for the product catalog
#[async_trait]
pub trait ProductRepository: Send + Sync {
    async fn list_products(&self, page: PageRequest) -> CoreResult<(Vec<Product>, u64)>;

    async fn get_product(&self, id: i64) -> CoreResult<Option<Product>>;

    async fn create_product(&self, product: &NewProduct) -> CoreResult<Product>;

    async fn update_product(&self, product: &Product) -> CoreResult<Option<Product>>;

    async fn delete_product(&self, id: i64) -> CoreResult<bool>;
}

/// Repository trait for orders and the order/product association
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Fails with `NotFound` if the user disappeared in the meantime.
    async fn create_order(&self, user_id: i64, order_date: NaiveDateTime) -> CoreResult<Order>;

    async fn get_order(&self, id: i64) -> CoreResult<Option<Order>>;

    async fn delete_order(&self, id: i64) -> CoreResult<bool>;

    async fn list_orders_for_user(&self, user_id: i64) -> CoreResult<Vec<Order>>;

    async fn list_order_products(&self, order_id: i64) -> CoreResult<Vec<Product>>;

    /// Links the pair. Returns `false` when it was already linked.
    async fn add_order_product(&self, order_id: i64, product_id: i64) -> CoreResult<bool>;

    /// Unlinks the pair. Returns `false` when it was not linked.
    async fn remove_order_product(&self, order_id: i64, product_id: i64) -> CoreResult<bool>;
}

/// Creates the relational schema if it does not exist yet.
#[async_trait]
pub trait SchemaManager: Send + Sync {
    async fn create_schema(&self) -> CoreResult<()>;
}
