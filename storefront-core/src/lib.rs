pub mod user;
pub mod product;
pub mod order;
pub mod pagination;
mod patch;
pub mod repository;
pub mod manager;
pub mod memory;

pub use user::{NewUser, User, UserPatch};
pub use product::{NewProduct, Product, ProductPatch};
pub use order::{NewOrder, Order, OrderDetails, OrderSummary, OrderTotal};
pub use pagination::{Page, PageMeta, PageRequest};
pub use manager::{OrderManager, ProductManager, UserManager};
pub use memory::MemoryStore;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("Internal service error: {0}")]
    Internal(String),
}

pub type CoreResult<T> = Result<T, CoreError>;

impl From<validator::ValidationErrors> for CoreError {
    fn from(errors: validator::ValidationErrors) -> Self {
        CoreError::Validation(describe_validation_errors(&errors))
    }
}

/// Flattens `validator` output into a single sorted, human readable line.
pub fn describe_validation_errors(errors: &validator::ValidationErrors) -> String {
    let mut parts: Vec<String> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |err| match &err.message {
                Some(message) => message.to_string(),
                None => format!("{}: invalid value ({})", field, err.code),
            })
        })
        .collect();
    parts.sort();
    parts.dedup();
    parts.join("; ")
}
