use serde::{Deserialize, Serialize};
use storefront_core::PageRequest;

use crate::extract::{ApiPath, ApiQuery};

/// Integer path id; anything unparsable is answered with 404.
pub type IdPath = ApiPath<i64>;

/// `(order_id, product_id)` path pair.
pub type PairPath = ApiPath<(i64, i64)>;

pub type PageQuery = ApiQuery<PageParams>;

/// Raw `page` / `per_page` values, kept as strings so junk falls back to
/// defaults instead of failing the request.
#[derive(Debug, Default, Deserialize)]
pub struct PageParams {
    pub page: Option<String>,
    pub per_page: Option<String>,
}

impl PageParams {
    pub fn to_request(&self) -> PageRequest {
        PageRequest::from_query(self.page.as_deref(), self.per_page.as_deref())
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}
