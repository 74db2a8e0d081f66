//! In-process storage backend.
//!
//! Mirrors the relational rules of the PostgreSQL schema: unique emails,
//! composite-key association rows, and cascading deletes from users and
//! products. Selected with `database.backend = "memory"` and used by tests.

use std::collections::{BTreeMap, BTreeSet};

use async_trait::async_trait;
use chrono::NaiveDateTime;
use parking_lot::Mutex;

use crate::order::Order;
use crate::pagination::PageRequest;
use crate::product::{NewProduct, Product};
use crate::repository::{OrderRepository, ProductRepository, SchemaManager, UserRepository};
use crate::user::{NewUser, User, DUPLICATE_EMAIL};
use crate::{CoreError, CoreResult};

#[derive(Default)]
struct Tables {
    users: BTreeMap<i64, User>,
    products: BTreeMap<i64, Product>,
    orders: BTreeMap<i64, Order>,
    // (order_id, product_id)
    order_product: BTreeSet<(i64, i64)>,
    next_user_id: i64,
    next_product_id: i64,
    next_order_id: i64,
}

impl Tables {
    /// Emails are unique ignoring case.
    fn email_taken(&self, email: &str, except: Option<i64>) -> bool {
        let email = email.to_lowercase();
        self.users
            .values()
            .any(|u| u.email.to_lowercase() == email && Some(u.id) != except)
    }

    fn unlink_orders(&mut self, order_ids: &BTreeSet<i64>) {
        self.order_product
            .retain(|(order_id, _)| !order_ids.contains(order_id));
    }
}

fn next_id(counter: &mut i64) -> i64 {
    *counter += 1;
    *counter
}

fn page_of<T: Clone>(rows: &BTreeMap<i64, T>, page: PageRequest) -> (Vec<T>, u64) {
    let items = rows
        .values()
        .skip(page.offset() as usize)
        .take(page.limit() as usize)
        .cloned()
        .collect();
    (items, rows.len() as u64)
}

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of association rows, across all orders.
    pub fn association_count(&self) -> usize {
        self.tables.lock().order_product.len()
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn list_users(&self, page: PageRequest) -> CoreResult<(Vec<User>, u64)> {
        Ok(page_of(&self.tables.lock().users, page))
    }

    async fn get_user(&self, id: i64) -> CoreResult<Option<User>> {
        Ok(self.tables.lock().users.get(&id).cloned())
    }

    async fn create_user(&self, user: &NewUser) -> CoreResult<User> {
        let mut tables = self.tables.lock();
        if tables.email_taken(&user.email, None) {
            return Err(CoreError::Conflict(DUPLICATE_EMAIL.to_string()));
        }
        let user = User {
            id: next_id(&mut tables.next_user_id),
            name: user.name.clone(),
            address: user.address.clone(),
            email: user.email.clone(),
        };
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn update_user(&self, user: &User) -> CoreResult<Option<User>> {
        let mut tables = self.tables.lock();
        if !tables.users.contains_key(&user.id) {
            return Ok(None);
        }
        if tables.email_taken(&user.email, Some(user.id)) {
            return Err(CoreError::Conflict(DUPLICATE_EMAIL.to_string()));
        }
        tables.users.insert(user.id, user.clone());
        Ok(Some(user.clone()))
    }

    async fn delete_user(&self, id: i64) -> CoreResult<bool> {
        let mut tables = self.tables.lock();
        if tables.users.remove(&id).is_none() {
            return Ok(false);
        }
        let owned: BTreeSet<i64> = tables
            .orders
            .values()
            .filter(|o| o.user_id == id)
            .map(|o| o.id)
            .collect();
        tables.unlink_orders(&owned);
        tables.orders.retain(|order_id, _| !owned.contains(order_id));
        Ok(true)
    }
}

#[async_trait]
impl ProductRepository for MemoryStore {
    async fn list_products(&self, page: PageRequest) -> CoreResult<(Vec<Product>, u64)> {
        Ok(page_of(&self.tables.lock().products, page))
    }

    async fn get_product(&self, id: i64) -> CoreResult<Option<Product>> {
        Ok(self.tables.lock().products.get(&id).cloned())
    }

    async fn create_product(&self, product: &NewProduct) -> CoreResult<Product> {
        let mut tables = self.tables.lock();
        let product = Product {
            id: next_id(&mut tables.next_product_id),
            product_name: product.product_name.clone(),
            price: product.price,
        };
        tables.products.insert(product.id, product.clone());
        Ok(product)
    }

    async fn update_product(&self, product: &Product) -> CoreResult<Option<Product>> {
        let mut tables = self.tables.lock();
        match tables.products.get_mut(&product.id) {
            Some(stored) => {
                *stored = product.clone();
                Ok(Some(product.clone()))
            }
            None => Ok(None),
        }
    }

    async fn delete_product(&self, id: i64) -> CoreResult<bool> {
        let mut tables = self.tables.lock();
        if tables.products.remove(&id).is_none() {
            return Ok(false);
        }
        tables
            .order_product
            .retain(|(_, product_id)| *product_id != id);
        Ok(true)
    }
}

#[async_trait]
impl OrderRepository for MemoryStore {
    async fn create_order(&self, user_id: i64, order_date: NaiveDateTime) -> CoreResult<Order> {
        let mut tables = self.tables.lock();
        if !tables.users.contains_key(&user_id) {
            return Err(CoreError::NotFound("User not found".to_string()));
        }
        let order = Order {
            id: next_id(&mut tables.next_order_id),
            order_date,
            user_id,
        };
        tables.orders.insert(order.id, order.clone());
        Ok(order)
    }

    async fn get_order(&self, id: i64) -> CoreResult<Option<Order>> {
        Ok(self.tables.lock().orders.get(&id).cloned())
    }

    async fn delete_order(&self, id: i64) -> CoreResult<bool> {
        let mut tables = self.tables.lock();
        if tables.orders.remove(&id).is_none() {
            return Ok(false);
        }
        tables.unlink_orders(&BTreeSet::from([id]));
        Ok(true)
    }

    async fn list_orders_for_user(&self, user_id: i64) -> CoreResult<Vec<Order>> {
        Ok(self
            .tables
            .lock()
            .orders
            .values()
            .filter(|o| o.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn list_order_products(&self, order_id: i64) -> CoreResult<Vec<Product>> {
        let tables = self.tables.lock();
        Ok(tables
            .order_product
            .range((order_id, i64::MIN)..=(order_id, i64::MAX))
            .filter_map(|(_, product_id)| tables.products.get(product_id).cloned())
            .collect())
    }

    async fn add_order_product(&self, order_id: i64, product_id: i64) -> CoreResult<bool> {
        let mut tables = self.tables.lock();
        if !tables.orders.contains_key(&order_id) {
            return Err(CoreError::NotFound("Order not found".to_string()));
        }
        if !tables.products.contains_key(&product_id) {
            return Err(CoreError::NotFound("Product not found".to_string()));
        }
        Ok(tables.order_product.insert((order_id, product_id)))
    }

    async fn remove_order_product(&self, order_id: i64, product_id: i64) -> CoreResult<bool> {
        Ok(self
            .tables
            .lock()
            .order_product
            .remove(&(order_id, product_id)))
    }
}

#[async_trait]
impl SchemaManager for MemoryStore {
    async fn create_schema(&self) -> CoreResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            name: "Ada".to_string(),
            address: None,
            email: email.to_string(),
        }
    }

    fn date() -> NaiveDateTime {
        chrono::NaiveDate::from_ymd_opt(2025, 9, 6)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts() {
        let store = MemoryStore::new();
        let ada = store.create_user(&new_user("ada@example.com")).await.unwrap();
        assert_eq!(ada.id, 1);

        let err = store.create_user(&new_user("ada@example.com")).await.unwrap_err();
        assert!(matches!(err, CoreError::Conflict(_)));

        let grace = store.create_user(&new_user("grace@example.com")).await.unwrap();
        let mut renamed = grace.clone();
        renamed.email = "ada@example.com".to_string();
        let err = store.update_user(&renamed).await.unwrap_err();
        assert!(matches!(err, CoreError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_email_uniqueness_ignores_case() {
        let store = MemoryStore::new();
        store.create_user(&new_user("ada@example.com")).await.unwrap();

        let err = store.create_user(&new_user("Ada@Example.com")).await.unwrap_err();
        assert!(matches!(err, CoreError::Conflict(_)));

        // changing the case of one's own email is fine
        let mut ada = store.get_user(1).await.unwrap().unwrap();
        ada.email = "ADA@example.com".to_string();
        assert!(store.update_user(&ada).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_pagination_window() {
        let store = MemoryStore::new();
        for i in 0..5 {
            store
                .create_user(&new_user(&format!("user{i}@example.com")))
                .await
                .unwrap();
        }
        let (items, total) = store.list_users(PageRequest::new(2, 2)).await.unwrap();
        assert_eq!(total, 5);
        assert_eq!(items.iter().map(|u| u.id).collect::<Vec<_>>(), vec![3, 4]);
    }

    #[tokio::test]
    async fn test_association_is_unique_per_pair() {
        let store = MemoryStore::new();
        let user = store.create_user(&new_user("ada@example.com")).await.unwrap();
        let order = store.create_order(user.id, date()).await.unwrap();
        let product = store
            .create_product(&NewProduct { product_name: "Mug".to_string(), price: 3.0 })
            .await
            .unwrap();

        assert!(store.add_order_product(order.id, product.id).await.unwrap());
        assert!(!store.add_order_product(order.id, product.id).await.unwrap());
        assert_eq!(store.association_count(), 1);

        assert!(store.remove_order_product(order.id, product.id).await.unwrap());
        assert!(!store.remove_order_product(order.id, product.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_user_delete_cascades() {
        let store = MemoryStore::new();
        let ada = store.create_user(&new_user("ada@example.com")).await.unwrap();
        let grace = store.create_user(&new_user("grace@example.com")).await.unwrap();
        let product = store
            .create_product(&NewProduct { product_name: "Mug".to_string(), price: 3.0 })
            .await
            .unwrap();

        let first = store.create_order(ada.id, date()).await.unwrap();
        let second = store.create_order(ada.id, date()).await.unwrap();
        let kept = store.create_order(grace.id, date()).await.unwrap();
        for order in [&first, &second, &kept] {
            store.add_order_product(order.id, product.id).await.unwrap();
        }

        assert!(store.delete_user(ada.id).await.unwrap());
        assert!(store.get_order(first.id).await.unwrap().is_none());
        assert!(store.get_order(second.id).await.unwrap().is_none());
        assert!(store.get_order(kept.id).await.unwrap().is_some());
        assert_eq!(store.association_count(), 1);

        assert!(!store.delete_user(ada.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_product_delete_unlinks_orders() {
        let store = MemoryStore::new();
        let user = store.create_user(&new_user("ada@example.com")).await.unwrap();
        let order = store.create_order(user.id, date()).await.unwrap();
        let product = store
            .create_product(&NewProduct { product_name: "Mug".to_string(), price: 3.0 })
            .await
            .unwrap();
        store.add_order_product(order.id, product.id).await.unwrap();

        assert!(store.delete_product(product.id).await.unwrap());
        assert!(store.list_order_products(order.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_order_requires_user() {
        let store = MemoryStore::new();
        let err = store.create_order(42, date()).await.unwrap_err();
        assert!(matches!(err, CoreError::NotFound(_)));
    }
}
