use std::sync::Arc;

use storefront_core::repository::{OrderRepository, ProductRepository, SchemaManager, UserRepository};
use storefront_core::{MemoryStore, OrderManager, ProductManager, UserManager};

/// Who may call `POST /init-db`.
#[derive(Clone, Debug, Default)]
pub struct InitDbGuard {
    pub debug: bool,
    pub token: Option<String>,
}

impl InitDbGuard {
    /// Debug mode, or no configured token, lets every caller through.
    pub fn allows(&self, header: Option<&str>) -> bool {
        if self.debug {
            return true;
        }
        match &self.token {
            Some(token) => header == Some(token.as_str()),
            None => true,
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub users: UserManager,
    pub products: ProductManager,
    pub orders: OrderManager,
    pub schema: Arc<dyn SchemaManager>,
    pub init_db: InitDbGuard,
}

impl AppState {
    pub fn new(
        users: Arc<dyn UserRepository>,
        products: Arc<dyn ProductRepository>,
        orders: Arc<dyn OrderRepository>,
        schema: Arc<dyn SchemaManager>,
        init_db: InitDbGuard,
    ) -> Self {
        Self {
            users: UserManager::new(users.clone()),
            products: ProductManager::new(products.clone()),
            orders: OrderManager::new(orders, users, products),
            schema,
            init_db,
        }
    }

    pub fn in_memory(store: Arc<MemoryStore>, init_db: InitDbGuard) -> Self {
        Self::new(store.clone(), store.clone(), store.clone(), store, init_db)
    }
}
