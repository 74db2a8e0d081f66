//! Business rules on top of the repositories: input validation, existence
//! preconditions and assembly of response shapes.

use std::sync::Arc;

use tracing::info;
use validator::Validate;

use crate::order::{parse_order_date, price_total, NewOrder, OrderDetails, OrderSummary, OrderTotal};
use crate::pagination::{Page, PageRequest};
use crate::product::{NewProduct, Product, ProductPatch};
use crate::repository::{OrderRepository, ProductRepository, UserRepository};
use crate::user::{NewUser, User, UserPatch};
use crate::{CoreError, CoreResult};

fn user_not_found() -> CoreError {
    CoreError::NotFound("User not found".to_string())
}

fn product_not_found() -> CoreError {
    CoreError::NotFound("Product not found".to_string())
}

fn order_not_found() -> CoreError {
    CoreError::NotFound("Order not found".to_string())
}

#[derive(Clone)]
pub struct UserManager {
    users: Arc<dyn UserRepository>,
}

impl UserManager {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }

    pub async fn list(&self, page: PageRequest) -> CoreResult<Page<User>> {
        let (items, total) = self.users.list_users(page).await?;
        Ok(Page::new(items, page, total))
    }

    pub async fn get(&self, id: i64) -> CoreResult<User> {
        self.users.get_user(id).await?.ok_or_else(user_not_found)
    }

    pub async fn create(&self, new_user: NewUser) -> CoreResult<User> {
        new_user.validate()?;
        let user = self.users.create_user(&new_user).await?;
        info!(user_id = user.id, "User created");
        Ok(user)
    }

    pub async fn update(&self, id: i64, patch: UserPatch) -> CoreResult<User> {
        let mut user = self.get(id).await?;
        user.apply(patch)?;
        user.validate()?;
        self.users
            .update_user(&user)
            .await?
            .ok_or_else(user_not_found)
    }

    /// Deletes the user together with its orders.
    pub async fn delete(&self, id: i64) -> CoreResult<()> {
        if !self.users.delete_user(id).await? {
            return Err(user_not_found());
        }
        info!(user_id = id, "User deleted with its orders");
        Ok(())
    }
}

#[derive(Clone)]
pub struct ProductManager {
    products: Arc<dyn ProductRepository>,
}

impl ProductManager {
    pub fn new(products: Arc<dyn ProductRepository>) -> Self {
        Self { products }
    }

    pub async fn list(&self, page: PageRequest) -> CoreResult<Page<Product>> {
        let (items, total) = self.products.list_products(page).await?;
        Ok(Page::new(items, page, total))
    }

    pub async fn get(&self, id: i64) -> CoreResult<Product> {
        self.products
            .get_product(id)
            .await?
            .ok_or_else(product_not_found)
    }

    pub async fn create(&self, new_product: NewProduct) -> CoreResult<Product> {
        new_product.validate()?;
        let product = self.products.create_product(&new_product).await?;
        info!(product_id = product.id, "Product created");
        Ok(product)
    }

    pub async fn update(&self, id: i64, patch: ProductPatch) -> CoreResult<Product> {
        let mut product = self.get(id).await?;
        product.apply(patch)?;
        product.validate()?;
        self.products
            .update_product(&product)
            .await?
            .ok_or_else(product_not_found)
    }

    pub async fn delete(&self, id: i64) -> CoreResult<()> {
        if !self.products.delete_product(id).await? {
            return Err(product_not_found());
        }
        info!(product_id = id, "Product deleted");
        Ok(())
    }
}

#[derive(Clone)]
pub struct OrderManager {
    orders: Arc<dyn OrderRepository>,
    users: Arc<dyn UserRepository>,
    products: Arc<dyn ProductRepository>,
}

impl OrderManager {
    pub fn new(
        orders: Arc<dyn OrderRepository>,
        users: Arc<dyn UserRepository>,
        products: Arc<dyn ProductRepository>,
    ) -> Self {
        Self { orders, users, products }
    }

    /// Required fields are checked first, then the user, then the date
    /// format. A malformed date for an unknown user is a 404.
    pub async fn create(&self, new_order: NewOrder) -> CoreResult<OrderDetails> {
        let (user_id, raw_date) = new_order.into_parts()?;
        if self.users.get_user(user_id).await?.is_none() {
            return Err(user_not_found());
        }
        let order_date = parse_order_date(&raw_date)?;
        let order = self.orders.create_order(user_id, order_date).await?;
        info!(order_id = order.id, user_id, "Order created");
        Ok(OrderDetails::new(order, Vec::new()))
    }

    pub async fn get(&self, id: i64) -> CoreResult<OrderDetails> {
        let order = self.orders.get_order(id).await?.ok_or_else(order_not_found)?;
        let products = self.orders.list_order_products(order.id).await?;
        Ok(OrderDetails::new(order, products))
    }

    pub async fn delete(&self, id: i64) -> CoreResult<()> {
        if !self.orders.delete_order(id).await? {
            return Err(order_not_found());
        }
        info!(order_id = id, "Order deleted");
        Ok(())
    }

    /// Orders of an existing user, oldest first. Empty when the user has none.
    pub async fn list_for_user(&self, user_id: i64) -> CoreResult<Vec<OrderDetails>> {
        if self.users.get_user(user_id).await?.is_none() {
            return Err(user_not_found());
        }
        let orders = self.orders.list_orders_for_user(user_id).await?;
        let mut details = Vec::with_capacity(orders.len());
        for order in orders {
            let products = self.orders.list_order_products(order.id).await?;
            details.push(OrderDetails::new(order, products));
        }
        Ok(details)
    }

    pub async fn total(&self, order_id: i64) -> CoreResult<OrderTotal> {
        let products = self.list_products(order_id).await?;
        Ok(OrderTotal {
            order_id,
            total: price_total(&products),
        })
    }

    /// Product count and total per order of an existing user.
    pub async fn summary_for_user(&self, user_id: i64) -> CoreResult<Vec<OrderSummary>> {
        if self.users.get_user(user_id).await?.is_none() {
            return Err(user_not_found());
        }
        let orders = self.orders.list_orders_for_user(user_id).await?;
        let mut summary = Vec::with_capacity(orders.len());
        for order in &orders {
            let products = self.orders.list_order_products(order.id).await?;
            summary.push(OrderSummary::new(order, &products));
        }
        Ok(summary)
    }

    async fn require_pair(&self, order_id: i64, product_id: i64) -> CoreResult<()> {
        if self.orders.get_order(order_id).await?.is_none() {
            return Err(order_not_found());
        }
        if self.products.get_product(product_id).await?.is_none() {
            return Err(product_not_found());
        }
        Ok(())
    }

    /// Linking an already linked pair succeeds without a second row.
    pub async fn add_product(&self, order_id: i64, product_id: i64) -> CoreResult<OrderDetails> {
        self.require_pair(order_id, product_id).await?;
        if self.orders.add_order_product(order_id, product_id).await? {
            info!(order_id, product_id, "Product added to order");
        }
        self.get(order_id).await
    }

    /// Unlinking a pair that is not linked succeeds and changes nothing.
    pub async fn remove_product(&self, order_id: i64, product_id: i64) -> CoreResult<OrderDetails> {
        self.require_pair(order_id, product_id).await?;
        if self.orders.remove_order_product(order_id, product_id).await? {
            info!(order_id, product_id, "Product removed from order");
        }
        self.get(order_id).await
    }

    pub async fn list_products(&self, order_id: i64) -> CoreResult<Vec<Product>> {
        if self.orders.get_order(order_id).await?.is_none() {
            return Err(order_not_found());
        }
        self.orders.list_order_products(order_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;

    fn managers() -> (Arc<MemoryStore>, UserManager, ProductManager, OrderManager) {
        let store = Arc::new(MemoryStore::new());
        let users = UserManager::new(store.clone());
        let products = ProductManager::new(store.clone());
        let orders = OrderManager::new(store.clone(), store.clone(), store.clone());
        (store, users, products, orders)
    }

    fn ada() -> NewUser {
        NewUser {
            name: "Ada".to_string(),
            address: Some("London".to_string()),
            email: "ada@example.com".to_string(),
        }
    }

    fn order_for(user_id: i64, date: &str) -> NewOrder {
        NewOrder {
            user_id: Some(user_id),
            order_date: Some(date.to_string()),
        }
    }

    #[tokio::test]
    async fn test_user_lifecycle() {
        let (_, users, _, _) = managers();
        let user = users.create(ada()).await.unwrap();
        assert_eq!(users.get(user.id).await.unwrap(), user);

        let err = users.create(ada()).await.unwrap_err();
        assert!(matches!(err, CoreError::Conflict(_)));

        let updated = users
            .update(user.id, UserPatch { name: Some(Some("Ada L.".to_string())), ..Default::default() })
            .await
            .unwrap();
        assert_eq!(updated.name, "Ada L.");
        assert_eq!(updated.email, "ada@example.com");

        users.delete(user.id).await.unwrap();
        assert!(matches!(users.get(user.id).await, Err(CoreError::NotFound(_))));
        assert!(matches!(users.delete(user.id).await, Err(CoreError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_update_missing_user_is_not_found() {
        let (_, users, _, _) = managers();
        let err = users.update(99, UserPatch::default()).await.unwrap_err();
        assert!(matches!(err, CoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_negative_price_rejected_zero_accepted() {
        let (_, _, products, _) = managers();
        let err = products
            .create(NewProduct { product_name: "Refund".to_string(), price: -1.0 })
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));

        let free = products
            .create(NewProduct { product_name: "Sticker".to_string(), price: 0.0 })
            .await
            .unwrap();
        assert_eq!(free.price, 0.0);

        let err = products
            .update(free.id, ProductPatch { price: Some(Some(-3.0)), ..Default::default() })
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
        assert_eq!(products.get(free.id).await.unwrap().price, 0.0);
    }

    #[tokio::test]
    async fn test_order_for_unknown_user() {
        let (_, _, _, orders) = managers();
        let err = orders.create(order_for(5, "2025-09-06")).await.unwrap_err();
        assert!(matches!(err, CoreError::NotFound(_)));

        // the missing user wins over a malformed date
        let err = orders.create(order_for(5, "next tuesday")).await.unwrap_err();
        assert_eq!(err.to_string(), "User not found");

        // a missing field still wins over the missing user
        let err = orders
            .create(NewOrder { user_id: Some(5), order_date: None })
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
    }

    #[tokio::test]
    async fn test_malformed_date_for_known_user() {
        let (_, users, _, orders) = managers();
        let user = users.create(ada()).await.unwrap();
        let err = orders.create(order_for(user.id, "next tuesday")).await.unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
    }

    #[tokio::test]
    async fn test_update_with_nulls() {
        let (_, users, products, _) = managers();
        let user = users.create(ada()).await.unwrap();

        let cleared = users
            .update(user.id, UserPatch { address: Some(None), ..Default::default() })
            .await
            .unwrap();
        assert_eq!(cleared.address, None);

        let err = users
            .update(user.id, UserPatch { name: Some(None), ..Default::default() })
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
        assert_eq!(users.get(user.id).await.unwrap().name, "Ada");

        let mug = products
            .create(NewProduct { product_name: "Mug".to_string(), price: 3.0 })
            .await
            .unwrap();
        let err = products
            .update(mug.id, ProductPatch { price: Some(None), ..Default::default() })
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
        assert_eq!(products.get(mug.id).await.unwrap().price, 3.0);
    }

    #[tokio::test]
    async fn test_total_and_summary() {
        let (_, users, products, orders) = managers();
        let user = users.create(ada()).await.unwrap();
        let mug = products
            .create(NewProduct { product_name: "Mug".to_string(), price: 9.5 })
            .await
            .unwrap();
        let tea = products
            .create(NewProduct { product_name: "Tea".to_string(), price: 2.25 })
            .await
            .unwrap();
        let first = orders.create(order_for(user.id, "2025-09-06")).await.unwrap();
        let second = orders.create(order_for(user.id, "2025-09-07")).await.unwrap();
        orders.add_product(first.id, mug.id).await.unwrap();
        orders.add_product(first.id, tea.id).await.unwrap();

        let total = orders.total(first.id).await.unwrap();
        assert_eq!(total, OrderTotal { order_id: first.id, total: 11.75 });
        assert_eq!(orders.total(second.id).await.unwrap().total, 0.0);
        assert_eq!(orders.total(999).await.unwrap_err().to_string(), "Order not found");

        let summary = orders.summary_for_user(user.id).await.unwrap();
        assert_eq!(summary.len(), 2);
        assert_eq!(summary[0].order_id, first.id);
        assert_eq!(summary[0].product_count, 2);
        assert_eq!(summary[0].total, 11.75);
        assert_eq!(summary[1].product_count, 0);

        let err = orders.summary_for_user(999).await.unwrap_err();
        assert_eq!(err.to_string(), "User not found");
    }

    #[tokio::test]
    async fn test_add_and_remove_products() {
        let (store, users, products, orders) = managers();
        let user = users.create(ada()).await.unwrap();
        let mug = products
            .create(NewProduct { product_name: "Mug".to_string(), price: 9.5 })
            .await
            .unwrap();
        let order = orders.create(order_for(user.id, "2025-09-06")).await.unwrap();
        assert!(order.products.is_empty());

        orders.add_product(order.id, mug.id).await.unwrap();
        let again = orders.add_product(order.id, mug.id).await.unwrap();
        assert_eq!(again.products, vec![mug.clone()]);
        assert_eq!(store.association_count(), 1);

        let err = orders.add_product(order.id, 404).await.unwrap_err();
        assert_eq!(err.to_string(), "Product not found");
        let err = orders.add_product(404, mug.id).await.unwrap_err();
        assert_eq!(err.to_string(), "Order not found");

        let removed = orders.remove_product(order.id, mug.id).await.unwrap();
        assert!(removed.products.is_empty());
        // removing again is idempotent
        assert!(orders.remove_product(order.id, mug.id).await.is_ok());
        assert!(orders.list_products(order.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_for_user() {
        let (_, users, _, orders) = managers();
        let user = users.create(ada()).await.unwrap();
        assert!(orders.list_for_user(user.id).await.unwrap().is_empty());

        orders.create(order_for(user.id, "2025-09-06")).await.unwrap();
        orders.create(order_for(user.id, "2025-09-07T10:00:00")).await.unwrap();
        let listed = orders.list_for_user(user.id).await.unwrap();
        assert_eq!(listed.len(), 2);
        assert!(listed[0].id < listed[1].id);

        assert!(matches!(orders.list_for_user(999).await, Err(CoreError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_deleting_user_removes_orders() {
        let (_, users, _, orders) = managers();
        let user = users.create(ada()).await.unwrap();
        let order = orders.create(order_for(user.id, "2025-09-06")).await.unwrap();

        users.delete(user.id).await.unwrap();
        assert!(matches!(orders.get(order.id).await, Err(CoreError::NotFound(_))));
    }
}
