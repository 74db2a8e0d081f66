use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::product::Product;
use crate::{CoreError, CoreResult};

const ORDER_DATE_FORMAT_HINT: &str = "order_date must be ISO format (YYYY-MM-DD or ISO8601).";

/// An order row as stored. Belongs to exactly one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    pub order_date: NaiveDateTime,
    pub user_id: i64,
}

/// An order together with the products linked to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderDetails {
    pub id: i64,
    pub order_date: NaiveDateTime,
    pub user_id: i64,
    pub products: Vec<Product>,
}

impl OrderDetails {
    pub fn new(order: Order, products: Vec<Product>) -> Self {
        Self {
            id: order.id,
            order_date: order.order_date,
            user_id: order.user_id,
            products,
        }
    }
}

/// Sum of the prices of the products linked to an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderTotal {
    pub order_id: i64,
    pub total: f64,
}

/// One line of a user's order summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderSummary {
    pub order_id: i64,
    pub order_date: NaiveDateTime,
    pub product_count: usize,
    pub total: f64,
}

impl OrderSummary {
    pub fn new(order: &Order, products: &[Product]) -> Self {
        Self {
            order_id: order.id,
            order_date: order.order_date,
            product_count: products.len(),
            total: price_total(products),
        }
    }
}

pub fn price_total(products: &[Product]) -> f64 {
    products.iter().map(|p| p.price).sum()
}

/// Body of `POST /orders`.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct NewOrder {
    #[serde(default)]
    #[validate(required(message = "user_id is required"))]
    pub user_id: Option<i64>,
    #[serde(default)]
    #[validate(required(message = "order_date is required (YYYY-MM-DD or ISO8601)."))]
    pub order_date: Option<String>,
}

impl NewOrder {
    /// Checks the required fields only. The raw date is parsed with
    /// [`parse_order_date`] once the user is known to exist.
    pub fn into_parts(self) -> CoreResult<(i64, String)> {
        self.validate()?;
        match (self.user_id, self.order_date) {
            (Some(user_id), Some(order_date)) if !order_date.is_empty() => Ok((user_id, order_date)),
            _ => Err(CoreError::Validation(
                "order_date is required (YYYY-MM-DD or ISO8601).".to_string(),
            )),
        }
    }
}

/// Accepts `YYYY-MM-DD` (midnight) or an ISO-8601 date-time. A trailing UTC
/// offset is folded into the stored value.
pub fn parse_order_date(value: &str) -> CoreResult<NaiveDateTime> {
    let value = value.trim();
    let invalid = || CoreError::Validation(ORDER_DATE_FORMAT_HINT.to_string());

    if value.len() == 10 {
        return NaiveDate::parse_from_str(value, "%Y-%m-%d")
            .ok()
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .ok_or_else(invalid);
    }

    const NAIVE_FORMATS: [&str; 4] = [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M",
    ];
    for format in NAIVE_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(parsed);
        }
    }

    DateTime::parse_from_rfc3339(value)
        .map(|parsed| parsed.naive_utc())
        .map_err(|_| invalid())
}
