pub mod app_config;
pub mod database;
pub mod error;
pub mod user_repo;
pub mod product_repo;
pub mod order_repo;

pub use database::DbClient;
pub use user_repo::StoreUserRepository;
pub use product_repo::StoreProductRepository;
pub use order_repo::StoreOrderRepository;
